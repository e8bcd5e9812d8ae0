use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::detect::ChangeScore;
use crate::error::{Result, WatchError};
use crate::paths;
use crate::raster::{BandFile, Mask};
use crate::types::AreaOfInterest;

// ---------------------------------------------------------------------------
// Request / ticket
// ---------------------------------------------------------------------------

/// A derived change mask to persist under `asset_id`.
#[derive(Debug, Clone)]
pub struct ExportRequest<'a> {
    pub task_label: String,
    pub asset_id: String,
    pub scene_id: String,
    pub scale_m: f64,
    pub region: AreaOfInterest,
    pub score: ChangeScore,
    pub mask: &'a Mask,
}

/// Receipt for a submitted export. Submission is fire-and-forget; nothing
/// waits on the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportTicket {
    pub job_id: String,
    pub asset_id: String,
}

/// Key-addressed write target for derived artifacts.
pub trait ArtifactStore {
    fn submit(&self, request: &ExportRequest<'_>) -> Result<ExportTicket>;
}

// ---------------------------------------------------------------------------
// LocalAssetStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAsset {
    pub asset_id: String,
    pub job_id: String,
    pub task_label: String,
    pub scene_id: String,
    pub scale_m: f64,
    pub region: AreaOfInterest,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub mask: BandFile,
}

/// Writes each asset as one JSON document under `root`.
#[derive(Debug, Clone)]
pub struct LocalAssetStore {
    root: PathBuf,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load(&self, asset_id: &str) -> Result<StoredAsset> {
        paths::validate_asset_id(asset_id)?;
        let data = std::fs::read(paths::asset_file(&self.root, asset_id))?;
        Ok(serde_json::from_slice(&data)?)
    }
}

impl ArtifactStore for LocalAssetStore {
    /// Existing assets are never overwritten.
    fn submit(&self, request: &ExportRequest<'_>) -> Result<ExportTicket> {
        paths::validate_asset_id(&request.asset_id)?;
        let path = paths::asset_file(&self.root, &request.asset_id);
        if path.exists() {
            return Err(WatchError::Export(format!(
                "asset '{}' already exists",
                request.asset_id
            )));
        }
        let job_id = Uuid::new_v4().to_string();
        let asset = StoredAsset {
            asset_id: request.asset_id.clone(),
            job_id: job_id.clone(),
            task_label: request.task_label.clone(),
            scene_id: request.scene_id.clone(),
            scale_m: request.scale_m,
            region: request.region,
            score: request.score.value,
            created_at: Utc::now(),
            mask: BandFile::from_mask(request.mask),
        };
        let data = serde_json::to_vec(&asset)?;
        crate::io::atomic_write(&path, &data)
            .map_err(|e| WatchError::Export(format!("{}: {e}", path.display())))?;
        Ok(ExportTicket {
            job_id,
            asset_id: request.asset_id.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
