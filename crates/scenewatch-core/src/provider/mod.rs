//! Imagery query contract.
//!
//! An [`ImageryProvider`] is opened once per run into an [`ImagerySession`];
//! the session is dropped when the run ends. All calls are blocking.
//! "Nothing matched" is an ordinary `Ok(None)`, never an error.

pub mod local;

pub use local::LocalArchive;

use crate::error::Result;
use crate::raster::Raster;
use crate::types::{AreaOfInterest, AttributeFilter, Modality, SceneReference, TimeWindow};

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SceneQuery {
    pub area: AreaOfInterest,
    pub window: TimeWindow,
    pub modality: Modality,
    pub filters: Vec<AttributeFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregator {
    Median,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateQuery {
    pub scenes: SceneQuery,
    pub band: String,
    pub aggregator: Aggregator,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Factory for per-run sessions. Failure to open is fatal for the run and
/// happens before any state is read.
pub trait ImageryProvider {
    fn open_session(&self) -> Result<Box<dyn ImagerySession + '_>>;
}

/// # Contract
///
/// - `latest` sorts strictly descending by acquisition time and breaks
///   timestamp ties deterministically.
/// - `historical_aggregate` reduces every matching scene per pixel;
///   `Ok(None)` when no scene matched.
/// - Returned rasters are independent copies covering the area of interest.
pub trait ImagerySession {
    fn latest(&self, query: &SceneQuery) -> Result<Option<SceneReference>>;

    fn historical_aggregate(&self, query: &AggregateQuery) -> Result<Option<Raster>>;

    fn fetch_band(&self, scene: &SceneReference, band: &str) -> Result<Raster>;
}
