use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("not initialized: run 'scenewatch init'")]
    NotInitialized,

    #[error("provider initialization failed: {0}")]
    ProviderInit(String),

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("detection failed: {0}")]
    DetectionCompute(String),

    #[error("dispatch failed: {0}")]
    Dispatch(String),

    #[error("export failed: {0}")]
    Export(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("invalid asset id '{0}': must be alphanumeric with '_', '-' or '/' separators")]
    InvalidAssetId(String),

    #[error("another run holds the lock at {}", .0.display())]
    RunInProgress(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl WatchError {
    /// True for failures at or before detection completion. These leave the
    /// processing state untouched so the same scene is retried next run.
    pub fn blocks_state_advance(&self) -> bool {
        !matches!(self, WatchError::Dispatch(_) | WatchError::Export(_))
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;
