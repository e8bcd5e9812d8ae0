use crate::error::Result;
use crate::paths;
use serde::Serialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ProcessingState
// ---------------------------------------------------------------------------

/// The identifier of the last scene that made it through a full pipeline pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessingState {
    pub last_processed_scene_id: Option<String>,
}

impl ProcessingState {
    pub fn is_processed(&self, scene_id: &str) -> bool {
        self.last_processed_scene_id.as_deref() == Some(scene_id)
    }
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// Single-value store: the raw scene id, no delimiter, overwritten wholesale.
///
/// Not safe for concurrent writers; callers serialize runs with
/// [`crate::lock::RunLock`].
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_root(root: &Path) -> Self {
        Self::new(paths::state_path(root))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing or blank record means nothing has been processed yet.
    pub fn load(&self) -> Result<ProcessingState> {
        let last = crate::io::read_optional(&self.path)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(ProcessingState {
            last_processed_scene_id: last,
        })
    }

    /// Must be the last step of a successful run.
    pub fn save(&self, scene_id: &str) -> Result<()> {
        crate::io::atomic_write(&self.path, scene_id.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
