use crate::detect::MAX_DENOISE_RADIUS_PX;
use crate::error::{Result, WatchError};
use crate::paths;
use crate::types::{AreaOfInterest, AttributeFilter, Modality, TimeWindow};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Upper bound for any configured window length, about a century.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SiteConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    #[serde(default = "default_aoi")]
    pub aoi: AreaOfInterest,
}

fn default_aoi() -> AreaOfInterest {
    AreaOfInterest {
        min_lon: 30.0,
        min_lat: -2.05,
        max_lon: 30.2,
        max_lat: -1.9,
    }
}

// ---------------------------------------------------------------------------
// DiscoveryConfig
// ---------------------------------------------------------------------------

/// How the scene that triggers a run is found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_primary_modality")]
    pub modality: Modality,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_discovery_filters")]
    pub filters: Vec<AttributeFilter>,
}

fn default_primary_modality() -> Modality {
    Modality::Optical
}

fn default_lookback_days() -> u32 {
    30
}

fn default_discovery_filters() -> Vec<AttributeFilter> {
    vec![AttributeFilter::lt("CLOUDY_PIXEL_PERCENTAGE", 20.0)]
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            modality: default_primary_modality(),
            lookback_days: default_lookback_days(),
            filters: default_discovery_filters(),
        }
    }
}

// ---------------------------------------------------------------------------
// RadarConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaselineWindow {
    /// `[start, end)` calendar dates, UTC midnight.
    Fixed { start: NaiveDate, end: NaiveDate },
    /// The `days` before the current radar acquisition.
    Trailing { days: u32 },
}

impl BaselineWindow {
    pub fn resolve(&self, current_acquisition: DateTime<Utc>) -> TimeWindow {
        match self {
            BaselineWindow::Fixed { start, end } => {
                TimeWindow::new(midnight_utc(*start), midnight_utc(*end))
            }
            BaselineWindow::Trailing { days } => TimeWindow::trailing(current_acquisition, *days),
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarConfig {
    /// Co-polarized intensity band, in dB.
    #[serde(default = "default_radar_band")]
    pub band: String,
    #[serde(default = "default_baseline")]
    pub baseline: BaselineWindow,
    /// Limits how old the "current" reading may be. Unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_lookback_days: Option<u32>,
    #[serde(default = "default_radar_filters")]
    pub filters: Vec<AttributeFilter>,
}

fn default_radar_band() -> String {
    "VV".to_string()
}

fn default_baseline() -> BaselineWindow {
    BaselineWindow::Trailing { days: 365 }
}

fn default_radar_filters() -> Vec<AttributeFilter> {
    vec![AttributeFilter::eq("instrumentMode", "IW")]
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            band: default_radar_band(),
            baseline: default_baseline(),
            current_lookback_days: None,
            filters: default_radar_filters(),
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreUnit {
    Pixels,
    SquareMeters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Minimum backscatter increase, in dB, for a pixel to count as change.
    #[serde(default = "default_threshold_db")]
    pub threshold_db: f32,
    #[serde(default = "default_denoise_radius")]
    pub denoise_radius_m: f64,
    /// Ground size of one pixel edge.
    #[serde(default = "default_scale")]
    pub scale_m: f64,
    #[serde(default = "default_score_unit")]
    pub score_unit: ScoreUnit,
    #[serde(default = "default_max_pixels")]
    pub max_pixels: u64,
}

fn default_threshold_db() -> f32 {
    6.0
}

fn default_denoise_radius() -> f64 {
    15.0
}

fn default_scale() -> f64 {
    10.0
}

fn default_score_unit() -> ScoreUnit {
    ScoreUnit::Pixels
}

fn default_max_pixels() -> u64 {
    10_000_000
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold_db: default_threshold_db(),
            denoise_radius_m: default_denoise_radius(),
            scale_m: default_scale(),
            score_unit: default_score_unit(),
            max_pixels: default_max_pixels(),
        }
    }
}

impl DetectionConfig {
    /// The denoise radius does not scale with output resolution on its own;
    /// it is fixed in meters and converted here.
    pub fn denoise_radius_px(&self) -> f64 {
        self.denoise_radius_m / self.scale_m
    }

    pub fn pixel_area_m2(&self) -> f64 {
        self.scale_m * self.scale_m
    }
}

// ---------------------------------------------------------------------------
// FusionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_nir_band")]
    pub nir_band: String,
    #[serde(default = "default_swir_band")]
    pub swir_band: String,
    /// Index values below this count as vegetation loss.
    #[serde(default = "default_veg_threshold")]
    pub threshold: f32,
}

fn default_true() -> bool {
    true
}

fn default_nir_band() -> String {
    "B8".to_string()
}

fn default_swir_band() -> String {
    "B11".to_string()
}

fn default_veg_threshold() -> f32 {
    0.2
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            nir_band: default_nir_band(),
            swir_band: default_swir_band(),
            threshold: default_veg_threshold(),
        }
    }
}

// ---------------------------------------------------------------------------
// AlertConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// An alert fires when the change score is strictly greater than this.
    #[serde(default = "default_alert_threshold")]
    pub threshold: f64,
    #[serde(default = "default_task_prefix")]
    pub task_prefix: String,
    #[serde(default)]
    pub attach_composite: bool,
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,
}

fn default_alert_threshold() -> f64 {
    5.0
}

fn default_task_prefix() -> String {
    "Final_Alert".to_string()
}

fn default_overlay_opacity() -> f32 {
    0.8
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: default_alert_threshold(),
            task_prefix: default_task_prefix(),
            attach_composite: false,
            overlay_opacity: default_overlay_opacity(),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Asset id prefix; the task label is appended as the last segment.
    #[serde(default = "default_asset_root")]
    pub asset_root: String,
    /// Output resolution. Falls back to `detection.scale_m`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_m: Option<f64>,
    /// Link shown in alerts; `{asset}` is replaced with the asset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_template: Option<String>,
}

fn default_asset_root() -> String {
    "alerts".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            asset_root: default_asset_root(),
            scale_m: None,
            link_template: None,
        }
    }
}

impl ExportConfig {
    pub fn asset_id(&self, task_label: &str) -> String {
        format!("{}/{}", self.asset_root.trim_end_matches('/'), task_label)
    }

    pub fn link_for(&self, asset_id: &str) -> String {
        match &self.link_template {
            Some(t) => t.replace("{asset}", asset_id),
            None => asset_id.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// NotifyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub chat_id: String,
    /// Environment variable holding the bot token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_notify_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_token_env() -> String {
    "SCENEWATCH_BOT_TOKEN".to_string()
}

fn default_notify_timeout() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// ArchiveConfig / LockConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Relative paths resolve against the project root.
    #[serde(default = "default_archive_path")]
    pub path: PathBuf,
}

fn default_archive_path() -> PathBuf {
    PathBuf::from(paths::ARCHIVE_DIR)
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: default_archive_path(),
        }
    }
}

impl ArchiveConfig {
    pub fn resolve(&self, root: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            root.join(&self.path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockConfig {
    #[serde(default = "default_stale_after")]
    pub stale_after_minutes: u32,
}

fn default_stale_after() -> u32 {
    120
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_after_minutes: default_stale_after(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub site: SiteConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub radar: RadarConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub lock: LockConfig,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self {
            version: 1,
            site: SiteConfig {
                name: site_name.into(),
                aoi: default_aoi(),
            },
            discovery: DiscoveryConfig::default(),
            radar: RadarConfig::default(),
            detection: DetectionConfig::default(),
            fusion: FusionConfig::default(),
            alert: AlertConfig::default(),
            export: ExportConfig::default(),
            notify: None,
            archive: ArchiveConfig::default(),
            lock: LockConfig::default(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(WatchError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Output resolution for exported artifacts.
    pub fn export_scale_m(&self) -> f64 {
        self.export.scale_m.unwrap_or(self.detection.scale_m)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut error = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message,
            })
        };

        if !self.site.aoi.is_valid() {
            error(format!(
                "site.aoi is not a valid lon/lat box: {:?}",
                self.site.aoi
            ));
        }
        if self.discovery.lookback_days == 0 {
            error("discovery.lookback_days must be at least 1".to_string());
        }
        if self.discovery.lookback_days > MAX_WINDOW_DAYS {
            error(format!(
                "discovery.lookback_days={} exceeds {MAX_WINDOW_DAYS}",
                self.discovery.lookback_days
            ));
        }
        match &self.radar.baseline {
            BaselineWindow::Fixed { start, end } if start >= end => {
                error(format!("radar.baseline: start {start} is not before end {end}"));
            }
            BaselineWindow::Trailing { days: 0 } => {
                error("radar.baseline.days must be at least 1".to_string());
            }
            BaselineWindow::Trailing { days } if *days > MAX_WINDOW_DAYS => {
                error(format!(
                    "radar.baseline.days={days} exceeds {MAX_WINDOW_DAYS}"
                ));
            }
            _ => {}
        }
        match self.radar.current_lookback_days {
            Some(0) => error("radar.current_lookback_days must be at least 1".to_string()),
            Some(days) if days > MAX_WINDOW_DAYS => error(format!(
                "radar.current_lookback_days={days} exceeds {MAX_WINDOW_DAYS}"
            )),
            _ => {}
        }
        if self.radar.band.trim().is_empty() {
            error("radar.band is empty".to_string());
        }
        if !(self.detection.scale_m > 0.0) {
            error(format!(
                "detection.scale_m must be positive, got {}",
                self.detection.scale_m
            ));
        }
        if !(self.detection.denoise_radius_m >= 0.0) {
            error(format!(
                "detection.denoise_radius_m must not be negative, got {}",
                self.detection.denoise_radius_m
            ));
        } else if self.detection.scale_m > 0.0
            && self.detection.denoise_radius_px() > MAX_DENOISE_RADIUS_PX
        {
            error(format!(
                "detection.denoise_radius_m={} is {} px at scale {} m; the limit is {MAX_DENOISE_RADIUS_PX} px",
                self.detection.denoise_radius_m,
                self.detection.denoise_radius_px(),
                self.detection.scale_m
            ));
        }
        if self.detection.max_pixels == 0 {
            error("detection.max_pixels must be at least 1".to_string());
        }
        if self.fusion.enabled && self.fusion.nir_band == self.fusion.swir_band {
            error(format!(
                "fusion bands must differ, both are '{}'",
                self.fusion.nir_band
            ));
        }
        if !(0.0..=1.0).contains(&self.alert.overlay_opacity) {
            error(format!(
                "alert.overlay_opacity must be within 0..=1, got {}",
                self.alert.overlay_opacity
            ));
        }
        if self.export.enabled && crate::paths::validate_asset_id(&self.export.asset_root).is_err() {
            error(format!(
                "export.asset_root '{}' is not a valid asset id",
                self.export.asset_root
            ));
        }
        if let Some(notify) = &self.notify {
            if notify.chat_id.trim().is_empty() {
                error("notify.chat_id is empty".to_string());
            }
            if !notify.api_base.starts_with("http://") && !notify.api_base.starts_with("https://") {
                error(format!(
                    "notify.api_base '{}' is not an http(s) URL",
                    notify.api_base
                ));
            }
        }

        let mut warn = |message: String| {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message,
            })
        };

        if self.detection.threshold_db <= 0.0 {
            warn(format!(
                "detection.threshold_db={} flags pixels that did not brighten",
                self.detection.threshold_db
            ));
        }
        if self.detection.scale_m > 0.0 && self.detection.denoise_radius_px() < 1.0 {
            warn(format!(
                "detection.denoise_radius_m={} is below one pixel at scale {} m; denoise is a no-op",
                self.detection.denoise_radius_m, self.detection.scale_m
            ));
        }
        if self.fusion.enabled && self.discovery.modality == Modality::Radar {
            warn(
                "fusion is enabled but discovery.modality is radar; no optical scene will be fused"
                    .to_string(),
            );
        }
        if self.detection.score_unit == ScoreUnit::SquareMeters
            && self.detection.scale_m > 0.0
            && self.alert.threshold < self.detection.pixel_area_m2()
        {
            warn(format!(
                "alert.threshold={} m² is below one pixel ({} m²); any single changed pixel alerts",
                self.alert.threshold,
                self.detection.pixel_area_m2()
            ));
        }
        if self.alert.threshold < 0.0 {
            warn(format!(
                "alert.threshold={} fires on every processed scene",
                self.alert.threshold
            ));
        }
        if self.notify.is_none() {
            warn("no notify section; alerts will only be logged".to_string());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn errors(cfg: &Config) -> Vec<String> {
        cfg.validate()
            .into_iter()
            .filter(|w| w.level == WarnLevel::Error)
            .map(|w| w.message)
            .collect()
    }

    #[test]
    fn default_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::new("kigali");
        cfg.save(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.site.name, "kigali");
        assert_eq!(loaded.radar.band, "VV");
        assert_eq!(loaded.detection.threshold_db, 6.0);
        assert_eq!(loaded.alert.threshold, 5.0);
        assert!(loaded.notify.is_none());
    }

    #[test]
    fn missing_config_is_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(WatchError::NotInitialized)
        ));
    }

    #[test]
    fn minimal_yaml_gets_defaults() {
        let yaml = "site:\n  name: kigali\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.discovery.lookback_days, 30);
        assert_eq!(cfg.discovery.modality, Modality::Optical);
        assert_eq!(cfg.radar.baseline, BaselineWindow::Trailing { days: 365 });
        assert_eq!(cfg.detection.score_unit, ScoreUnit::Pixels);
        assert!(cfg.fusion.enabled);
        assert!(errors(&cfg).is_empty());
    }

    #[test]
    fn fixed_baseline_yaml() {
        let yaml = "type: fixed\nstart: 2024-01-01\nend: 2024-12-31\n";
        let window: BaselineWindow = serde_yaml::from_str(yaml).unwrap();
        let resolved = window.resolve(Utc::now());
        assert_eq!(resolved.label(), "2024-01-01 to 2024-12-31");
    }

    #[test]
    fn denoise_radius_converts_to_pixels() {
        let det = DetectionConfig::default();
        assert!((det.denoise_radius_px() - 1.5).abs() < 1e-9);
        assert_eq!(det.pixel_area_m2(), 100.0);
    }

    #[test]
    fn asset_ids_and_links() {
        let mut export = ExportConfig {
            asset_root: "projects/kigali/assets/".to_string(),
            ..ExportConfig::default()
        };
        let id = export.asset_id("Final_Alert_20240101_1200");
        assert_eq!(id, "projects/kigali/assets/Final_Alert_20240101_1200");
        assert_eq!(export.link_for(&id), id);
        export.link_template = Some("https://maps.example/?asset={asset}".to_string());
        assert_eq!(
            export.link_for("a/b"),
            "https://maps.example/?asset=a/b"
        );
    }

    #[test]
    fn validate_flags_errors() {
        let mut cfg = Config::new("kigali");
        cfg.site.aoi.min_lon = 40.0;
        cfg.radar.baseline = BaselineWindow::Trailing { days: 0 };
        cfg.fusion.swir_band = cfg.fusion.nir_band.clone();
        cfg.export.asset_root = "../outside".to_string();
        cfg.notify = Some(NotifyConfig {
            api_base: "ftp://nope".to_string(),
            chat_id: "".to_string(),
            token_env: default_token_env(),
            timeout_secs: 5,
        });
        let errs = errors(&cfg);
        assert_eq!(errs.len(), 6, "{errs:?}");
    }

    #[test]
    fn validate_bounds_window_days() {
        let mut cfg = Config::new("kigali");
        cfg.discovery.lookback_days = u32::MAX;
        cfg.radar.baseline = BaselineWindow::Trailing {
            days: MAX_WINDOW_DAYS + 1,
        };
        cfg.radar.current_lookback_days = Some(u32::MAX);
        let errs = errors(&cfg);
        assert_eq!(errs.len(), 3, "{errs:?}");
        assert!(errs[0].contains("discovery.lookback_days"));
        assert!(errs[1].contains("radar.baseline.days"));
        assert!(errs[2].contains("radar.current_lookback_days"));

        cfg.discovery.lookback_days = MAX_WINDOW_DAYS;
        cfg.radar.baseline = BaselineWindow::Trailing {
            days: MAX_WINDOW_DAYS,
        };
        cfg.radar.current_lookback_days = Some(MAX_WINDOW_DAYS);
        assert!(errors(&cfg).is_empty());
    }

    #[test]
    fn validate_bounds_denoise_radius() {
        let mut cfg = Config::new("kigali");
        cfg.detection.denoise_radius_m = -1.0;
        let errs = errors(&cfg);
        assert_eq!(errs.len(), 1, "{errs:?}");
        assert!(errs[0].contains("must not be negative"));

        cfg.detection.denoise_radius_m = 1_000_000.0;
        let errs = errors(&cfg);
        assert_eq!(errs.len(), 1, "{errs:?}");
        assert!(errs[0].contains("the limit is"));

        cfg.detection.denoise_radius_m = MAX_DENOISE_RADIUS_PX * cfg.detection.scale_m;
        assert!(errors(&cfg).is_empty());
    }

    #[test]
    fn validate_warns_when_area_threshold_is_below_one_pixel() {
        let mut cfg = Config::new("kigali");
        cfg.detection.score_unit = ScoreUnit::SquareMeters;
        let below_pixel = |cfg: &Config| {
            cfg.validate()
                .iter()
                .any(|w| w.level == WarnLevel::Warning && w.message.contains("below one pixel ("))
        };
        assert!(below_pixel(&cfg));

        cfg.alert.threshold = 500.0;
        assert!(!below_pixel(&cfg));

        cfg.detection.score_unit = ScoreUnit::Pixels;
        cfg.alert.threshold = 5.0;
        assert!(!below_pixel(&cfg));
    }

    #[test]
    fn validate_warns_on_radar_primary_with_fusion() {
        let mut cfg = Config::new("kigali");
        cfg.discovery.modality = Modality::Radar;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("fusion")));
    }
}
