//! Radar backscatter change detection with optional optical fusion.
//!
//! Stages: `Idle → BaselineComputed → DiffComputed → Denoised →
//! [FusionApplied] → Scored → Done`. A detector is consumed by one pass, so
//! every run starts again at `Idle`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::config::{BaselineWindow, Config, ScoreUnit};
use crate::error::{Result, WatchError};
use crate::provider::{AggregateQuery, Aggregator, ImagerySession, SceneQuery};
use crate::raster::{Mask, Raster};
use crate::types::{AreaOfInterest, AttributeFilter, Modality, SceneReference, TimeWindow};

// ---------------------------------------------------------------------------
// DetectionStage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStage {
    Idle,
    BaselineComputed,
    DiffComputed,
    Denoised,
    FusionApplied,
    Scored,
    Done,
}

impl DetectionStage {
    pub fn allowed_next(self) -> &'static [DetectionStage] {
        use DetectionStage::*;
        match self {
            Idle => &[BaselineComputed],
            BaselineComputed => &[DiffComputed],
            DiffComputed => &[Denoised],
            Denoised => &[FusionApplied, Scored],
            FusionApplied => &[Scored],
            Scored => &[Done],
            Done => &[],
        }
    }
}

pub fn validate_transition(from: DetectionStage, to: DetectionStage) -> Result<()> {
    if from.allowed_next().contains(&to) {
        Ok(())
    } else {
        Err(WatchError::DetectionCompute(format!(
            "illegal stage transition {from:?} -> {to:?}"
        )))
    }
}

// ---------------------------------------------------------------------------
// ChangeScore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChangeScore {
    pub value: f64,
    pub unit: ScoreUnit,
}

impl ChangeScore {
    pub fn pixels(count: usize) -> Self {
        Self {
            value: count as f64,
            unit: ScoreUnit::Pixels,
        }
    }
}

impl fmt::Display for ChangeScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            ScoreUnit::Pixels => write!(f, "{} px", self.value),
            ScoreUnit::SquareMeters => write!(f, "{:.0} m²", self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionParams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FusionParams {
    pub nir_band: String,
    pub swir_band: String,
    pub threshold: f32,
}

/// Largest focal-mode radius the detector will build a kernel for.
pub const MAX_DENOISE_RADIUS_PX: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParams {
    pub area: AreaOfInterest,
    pub radar_band: String,
    pub radar_filters: Vec<AttributeFilter>,
    pub baseline: BaselineWindow,
    pub current_lookback_days: Option<u32>,
    pub threshold_db: f32,
    pub denoise_radius_px: f64,
    pub fusion: Option<FusionParams>,
    pub score_unit: ScoreUnit,
    pub pixel_area_m2: f64,
    pub max_pixels: u64,
}

impl DetectionParams {
    pub fn from_config(cfg: &Config) -> Self {
        let fusion = cfg.fusion.enabled.then(|| FusionParams {
            nir_band: cfg.fusion.nir_band.clone(),
            swir_band: cfg.fusion.swir_band.clone(),
            threshold: cfg.fusion.threshold,
        });
        Self {
            area: cfg.site.aoi,
            radar_band: cfg.radar.band.clone(),
            radar_filters: cfg.radar.filters.clone(),
            baseline: cfg.radar.baseline.clone(),
            current_lookback_days: cfg.radar.current_lookback_days,
            threshold_db: cfg.detection.threshold_db,
            denoise_radius_px: cfg.detection.denoise_radius_px(),
            fusion,
            score_unit: cfg.detection.score_unit,
            pixel_area_m2: cfg.detection.pixel_area_m2(),
            max_pixels: cfg.detection.max_pixels,
        }
    }

    fn radar_query(&self, window: TimeWindow) -> SceneQuery {
        SceneQuery {
            area: self.area,
            window,
            modality: Modality::Radar,
            filters: self.radar_filters.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// DetectionReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DetectionReport {
    pub current_radar: SceneReference,
    pub baseline_window: TimeWindow,
    /// Pixels over the dB threshold before denoising.
    pub raw_candidates: usize,
    pub denoised_candidates: usize,
    pub fused: bool,
    /// Final change mask; only true pixels carry data.
    pub mask: Mask,
    pub score: ChangeScore,
    /// Current radar reading, kept for alert composites.
    pub background: Raster,
    pub stages: Vec<DetectionStage>,
}

impl DetectionReport {
    /// Label describing which acquisitions were compared.
    pub fn time_span_label(&self) -> String {
        format!(
            "baseline {} vs radar {}",
            self.baseline_window.label(),
            self.current_radar.acquisition_time.format("%Y-%m-%d")
        )
    }
}

// ---------------------------------------------------------------------------
// ChangeDetector
// ---------------------------------------------------------------------------

pub struct ChangeDetector<'a> {
    session: &'a dyn ImagerySession,
    params: &'a DetectionParams,
    stage: DetectionStage,
    stages: Vec<DetectionStage>,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(session: &'a dyn ImagerySession, params: &'a DetectionParams) -> Self {
        Self {
            session,
            params,
            stage: DetectionStage::Idle,
            stages: vec![DetectionStage::Idle],
        }
    }

    pub fn stage(&self) -> DetectionStage {
        self.stage
    }

    fn advance(&mut self, to: DetectionStage) -> Result<()> {
        validate_transition(self.stage, to)?;
        tracing::debug!(from = ?self.stage, to = ?to, "detection stage");
        self.stage = to;
        self.stages.push(to);
        Ok(())
    }

    /// Run one full pass. `optical` is the triggering optical scene, fused
    /// when fusion is enabled.
    ///
    /// A baseline, current reading or fused optical index without a single
    /// valid pixel is `InsufficientData`, never a zero score.
    pub fn detect(
        mut self,
        now: DateTime<Utc>,
        optical: Option<&SceneReference>,
    ) -> Result<DetectionReport> {
        let p = self.params;
        if !(0.0..=MAX_DENOISE_RADIUS_PX).contains(&p.denoise_radius_px) {
            return Err(WatchError::Config(format!(
                "denoise radius of {} px is outside 0..={MAX_DENOISE_RADIUS_PX}",
                p.denoise_radius_px
            )));
        }

        // Current reading: newest radar scene, independent of the baseline.
        let current_window = match p.current_lookback_days {
            Some(days) => TimeWindow::trailing(now, days),
            None => TimeWindow::until(now),
        };
        let current_radar = self
            .session
            .latest(&p.radar_query(current_window))?
            .ok_or_else(|| {
                WatchError::InsufficientData(format!(
                    "no radar scene before {}",
                    now.format("%Y-%m-%d")
                ))
            })?;

        let baseline_window = p.baseline.resolve(current_radar.acquisition_time);
        let baseline = self
            .session
            .historical_aggregate(&AggregateQuery {
                scenes: p.radar_query(baseline_window),
                band: p.radar_band.clone(),
                aggregator: Aggregator::Median,
            })?
            .ok_or_else(|| {
                WatchError::InsufficientData(format!(
                    "no radar scenes in baseline window {}",
                    baseline_window.label()
                ))
            })?;
        if baseline.valid_count() == 0 {
            return Err(WatchError::InsufficientData(format!(
                "baseline {} has no valid pixels",
                baseline_window.label()
            )));
        }
        self.advance(DetectionStage::BaselineComputed)?;

        let current = self.session.fetch_band(&current_radar, &p.radar_band)?;
        if current.len() as u64 > p.max_pixels {
            return Err(WatchError::DetectionCompute(format!(
                "{} pixels exceeds max_pixels={}",
                current.len(),
                p.max_pixels
            )));
        }
        if current.valid_count() == 0 {
            return Err(WatchError::InsufficientData(format!(
                "radar scene '{}' has no valid pixels",
                current_radar.scene_id
            )));
        }
        let diff = current.subtract(&baseline)?;
        if diff.valid_count() == 0 {
            return Err(WatchError::InsufficientData(
                "baseline and current reading share no valid pixels".to_string(),
            ));
        }
        self.advance(DetectionStage::DiffComputed)?;

        let raw = diff.greater_than(p.threshold_db);
        let raw_candidates = raw.count_true();
        let denoised = raw.focal_mode(p.denoise_radius_px).self_mask();
        let denoised_candidates = denoised.count_true();
        self.advance(DetectionStage::Denoised)?;

        let (mask, fused) = match (&p.fusion, optical) {
            (Some(fusion), Some(scene)) if scene.modality == Modality::Optical => {
                let nir = self.session.fetch_band(scene, &fusion.nir_band)?;
                let swir = self.session.fetch_band(scene, &fusion.swir_band)?;
                let index = Raster::normalized_difference(&nir, &swir)?;
                if index.valid_count() == 0 {
                    return Err(WatchError::InsufficientData(format!(
                        "optical scene '{}' has no valid {}/{} pixels",
                        scene.scene_id, fusion.nir_band, fusion.swir_band
                    )));
                }
                let vegetation_loss = index.less_than(fusion.threshold);
                let mask = denoised.and(&vegetation_loss)?.self_mask();
                self.advance(DetectionStage::FusionApplied)?;
                (mask, true)
            }
            _ => (denoised, false),
        };

        let count = mask.count_true();
        let score = match p.score_unit {
            ScoreUnit::Pixels => ChangeScore::pixels(count),
            ScoreUnit::SquareMeters => ChangeScore {
                value: count as f64 * p.pixel_area_m2,
                unit: ScoreUnit::SquareMeters,
            },
        };
        self.advance(DetectionStage::Scored)?;

        tracing::info!(
            radar_scene = %current_radar.scene_id,
            raw_candidates,
            denoised_candidates,
            fused,
            score = score.value,
            "change detection complete"
        );
        self.advance(DetectionStage::Done)?;

        Ok(DetectionReport {
            current_radar,
            baseline_window,
            raw_candidates,
            denoised_candidates,
            fused,
            mask,
            score,
            background: current,
            stages: self.stages,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
