//! In-memory collaborators for unit tests.

use std::cell::{Cell, RefCell};

use chrono::{DateTime, TimeZone, Utc};

use crate::config::{BaselineWindow, Config};
use crate::error::{Result, WatchError};
use crate::export::{ArtifactStore, ExportRequest, ExportTicket};
use crate::notify::Notifier;
use crate::provider::{AggregateQuery, ImageryProvider, ImagerySession, SceneQuery};
use crate::raster::Raster;
use crate::types::{Modality, SceneReference};

pub const SIZE: usize = 20;
pub const OPTICAL_ID: &str = "S2-2024-01-01-001";
pub const RADAR_ID: &str = "S1A-2023-12-30-017";

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap()
}

/// 6 dB threshold, one-pixel denoise radius, alert above 5.
pub fn config() -> Config {
    let mut cfg = Config::new("kigali");
    cfg.detection.threshold_db = 6.0;
    cfg.detection.denoise_radius_m = 10.0;
    cfg.detection.scale_m = 10.0;
    cfg.alert.threshold = 5.0;
    cfg.radar.baseline = BaselineWindow::Trailing { days: 365 };
    cfg.fusion.enabled = false;
    cfg
}

// ---------------------------------------------------------------------------
// FakeSession
// ---------------------------------------------------------------------------

pub struct FakeSession {
    pub optical_latest: Option<SceneReference>,
    pub radar_latest: Option<SceneReference>,
    pub baseline: Option<Raster>,
    pub current: Raster,
    pub nir: Raster,
    pub swir: Raster,
    pub fail_fetch: bool,
    pub radar_queries: Cell<usize>,
    pub aggregate_queries: RefCell<Vec<AggregateQuery>>,
}

impl FakeSession {
    /// Baseline 10 dB everywhere. The current reading is 17 dB over a 5x10
    /// cluster (50 px) and an isolated 2 px pair. Vegetation loss covers the
    /// left half of the cluster only.
    pub fn construction_site() -> Self {
        let mut current = Raster::filled(SIZE, SIZE, 10.0);
        for r in 2..7 {
            for c in 2..12 {
                current.set(r, c, 17.0);
            }
        }
        current.set(15, 15, 17.0);
        current.set(15, 16, 17.0);

        let nir = Raster::filled(SIZE, SIZE, 0.6);
        let mut swir = Raster::filled(SIZE, SIZE, 0.2);
        let mut nir_cleared = nir.clone();
        for r in 2..7 {
            for c in 2..7 {
                nir_cleared.set(r, c, 0.25);
                swir.set(r, c, 0.25);
            }
        }

        Self {
            optical_latest: Some(optical(OPTICAL_ID)),
            radar_latest: Some(SceneReference {
                scene_id: RADAR_ID.to_string(),
                acquisition_time: Utc.with_ymd_and_hms(2023, 12, 30, 16, 0, 0).unwrap(),
                modality: Modality::Radar,
            }),
            baseline: Some(Raster::filled(SIZE, SIZE, 10.0)),
            current,
            nir: nir_cleared,
            swir,
            fail_fetch: false,
            radar_queries: Cell::new(0),
            aggregate_queries: RefCell::new(Vec::new()),
        }
    }

    pub fn optical_scene(&self) -> SceneReference {
        self.optical_latest.clone().unwrap_or_else(|| optical(OPTICAL_ID))
    }

    pub fn current_radar(&self) -> SceneReference {
        self.radar_latest.clone().expect("fixture has a radar scene")
    }
}

pub fn optical(id: &str) -> SceneReference {
    SceneReference {
        scene_id: id.to_string(),
        acquisition_time: Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap(),
        modality: Modality::Optical,
    }
}

impl ImagerySession for FakeSession {
    fn latest(&self, query: &SceneQuery) -> Result<Option<SceneReference>> {
        match query.modality {
            Modality::Optical => Ok(self.optical_latest.clone()),
            Modality::Radar => {
                self.radar_queries.set(self.radar_queries.get() + 1);
                Ok(self.radar_latest.clone())
            }
        }
    }

    fn historical_aggregate(&self, query: &AggregateQuery) -> Result<Option<Raster>> {
        self.aggregate_queries.borrow_mut().push(query.clone());
        Ok(self.baseline.clone())
    }

    fn fetch_band(&self, scene: &SceneReference, band: &str) -> Result<Raster> {
        if self.fail_fetch {
            return Err(WatchError::DetectionCompute("simulated fetch failure".into()));
        }
        match (scene.modality, band) {
            (Modality::Radar, _) => Ok(self.current.clone()),
            (Modality::Optical, "B8") => Ok(self.nir.clone()),
            (Modality::Optical, "B11") => Ok(self.swir.clone()),
            _ => Err(WatchError::Provider(format!("no band {band}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// FakeProvider
// ---------------------------------------------------------------------------

pub struct FakeProvider {
    pub session: FakeSession,
    pub fail_open: bool,
    pub opened: Cell<usize>,
}

impl FakeProvider {
    pub fn new(session: FakeSession) -> Self {
        Self {
            session,
            fail_open: false,
            opened: Cell::new(0),
        }
    }
}

struct Borrowed<'a>(&'a FakeSession);

impl ImagerySession for Borrowed<'_> {
    fn latest(&self, query: &SceneQuery) -> Result<Option<SceneReference>> {
        self.0.latest(query)
    }

    fn historical_aggregate(&self, query: &AggregateQuery) -> Result<Option<Raster>> {
        self.0.historical_aggregate(query)
    }

    fn fetch_band(&self, scene: &SceneReference, band: &str) -> Result<Raster> {
        self.0.fetch_band(scene, band)
    }
}

impl ImageryProvider for FakeProvider {
    fn open_session(&self) -> Result<Box<dyn ImagerySession + '_>> {
        if self.fail_open {
            return Err(WatchError::ProviderInit("credentials rejected".into()));
        }
        self.opened.set(self.opened.get() + 1);
        Ok(Box::new(Borrowed(&self.session)))
    }
}

// ---------------------------------------------------------------------------
// Notifier / ArtifactStore fakes
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    pub messages: RefCell<Vec<String>>,
    pub photos: RefCell<Vec<(Vec<u8>, String)>>,
}

impl Notifier for RecordingNotifier {
    fn send_message(&self, text: &str) -> Result<()> {
        if self.fail {
            return Err(WatchError::Dispatch("transport unreachable".into()));
        }
        self.messages.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn send_photo(&self, png: &[u8], caption: &str) -> Result<()> {
        if self.fail {
            return Err(WatchError::Dispatch("transport unreachable".into()));
        }
        self.photos
            .borrow_mut()
            .push((png.to_vec(), caption.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingStore {
    pub fail: bool,
    pub submitted: RefCell<Vec<String>>,
}

impl ArtifactStore for RecordingStore {
    fn submit(&self, request: &ExportRequest<'_>) -> Result<ExportTicket> {
        if self.fail {
            return Err(WatchError::Export("asset quota exceeded".into()));
        }
        self.submitted
            .borrow_mut()
            .push(request.asset_id.clone());
        Ok(ExportTicket {
            job_id: format!("job-{}", self.submitted.borrow().len()),
            asset_id: request.asset_id.clone(),
        })
    }
}
