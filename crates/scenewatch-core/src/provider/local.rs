//! Filesystem-backed imagery archive.
//!
//! Layout under the archive directory:
//! ```text
//! catalog.yaml            scene index (see `CatalogEntry`)
//! <band files>.json       `BandFile` rasters, paths relative to the archive
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WatchError};
use crate::paths;
use crate::raster::{BandFile, Raster};
use crate::types::{AreaOfInterest, AttributeValue, Modality, SceneReference};

use super::{Aggregator, AggregateQuery, ImageryProvider, ImagerySession, SceneQuery};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub scenes: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub scene_id: String,
    pub modality: Modality,
    pub acquired_at: DateTime<Utc>,
    pub footprint: AreaOfInterest,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Band name -> file path relative to the archive directory.
    #[serde(default)]
    pub bands: BTreeMap<String, PathBuf>,
}

impl CatalogEntry {
    fn reference(&self) -> SceneReference {
        SceneReference {
            scene_id: self.scene_id.clone(),
            acquisition_time: self.acquired_at,
            modality: self.modality,
        }
    }

    fn matches(&self, query: &SceneQuery) -> bool {
        self.modality == query.modality
            && query.window.contains(self.acquired_at)
            && self.footprint.intersects(&query.area)
            && query
                .filters
                .iter()
                .all(|f| f.matches(self.attributes.get(&f.attribute)))
    }
}

// ---------------------------------------------------------------------------
// LocalArchive
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LocalArchive {
    dir: PathBuf,
}

impl LocalArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_catalog(&self) -> Result<Catalog> {
        let path = paths::catalog_path(&self.dir);
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    /// Write an empty catalog unless one exists. Returns true if written.
    pub fn create(&self) -> Result<bool> {
        let data = serde_yaml::to_string(&Catalog::default())?;
        crate::io::write_if_missing(&paths::catalog_path(&self.dir), data.as_bytes())
    }

    /// Add a scene and its bands, writing band files next to the catalog.
    /// Creates the archive on first use and replaces an entry with the same
    /// `scene_id` and modality.
    pub fn ingest(
        &self,
        mut entry: CatalogEntry,
        bands: &[(&str, &Raster)],
    ) -> Result<()> {
        let catalog_path = paths::catalog_path(&self.dir);
        let mut catalog = if catalog_path.exists() {
            self.read_catalog()?
        } else {
            Catalog::default()
        };

        for (band, raster) in bands {
            let rel = PathBuf::from("bands").join(format!("{}_{}.json", entry.scene_id, band));
            let data = serde_json::to_vec(&BandFile::from_raster(raster))?;
            crate::io::atomic_write(&self.dir.join(&rel), &data)?;
            entry.bands.insert((*band).to_string(), rel);
        }

        catalog
            .scenes
            .retain(|s| !(s.scene_id == entry.scene_id && s.modality == entry.modality));
        catalog.scenes.push(entry);
        let data = serde_yaml::to_string(&catalog)?;
        crate::io::atomic_write(&catalog_path, data.as_bytes())
    }
}

impl ImageryProvider for LocalArchive {
    fn open_session(&self) -> Result<Box<dyn ImagerySession + '_>> {
        let catalog_path = paths::catalog_path(&self.dir);
        let catalog = self.read_catalog().map_err(|e| {
            WatchError::ProviderInit(format!("cannot open {}: {e}", catalog_path.display()))
        })?;
        tracing::debug!(
            archive = %self.dir.display(),
            scenes = catalog.scenes.len(),
            "imagery session opened"
        );
        Ok(Box::new(LocalSession {
            dir: &self.dir,
            catalog,
        }))
    }
}

// ---------------------------------------------------------------------------
// LocalSession
// ---------------------------------------------------------------------------

struct LocalSession<'a> {
    dir: &'a Path,
    catalog: Catalog,
}

impl LocalSession<'_> {
    fn matching<'s>(&'s self, query: &'s SceneQuery) -> impl Iterator<Item = &'s CatalogEntry> {
        self.catalog.scenes.iter().filter(move |s| s.matches(query))
    }

    fn entry(&self, scene: &SceneReference) -> Result<&CatalogEntry> {
        self.catalog
            .scenes
            .iter()
            .find(|s| s.scene_id == scene.scene_id && s.modality == scene.modality)
            .ok_or_else(|| {
                WatchError::Provider(format!(
                    "{} scene '{}' is not in the catalog",
                    scene.modality, scene.scene_id
                ))
            })
    }

    fn load_band(&self, entry: &CatalogEntry, band: &str) -> Result<Raster> {
        let rel = entry.bands.get(band).ok_or_else(|| {
            WatchError::Provider(format!(
                "scene '{}' has no band '{band}'",
                entry.scene_id
            ))
        })?;
        let path = self.dir.join(rel);
        let data = std::fs::read(&path).map_err(|e| {
            WatchError::Provider(format!("cannot read {}: {e}", path.display()))
        })?;
        let file: BandFile = serde_json::from_slice(&data)?;
        file.into_raster()
            .map_err(|e| WatchError::Provider(format!("{}: {e}", path.display())))
    }
}

impl ImagerySession for LocalSession<'_> {
    /// Equal timestamps fall back to the lexicographically greatest scene id.
    fn latest(&self, query: &SceneQuery) -> Result<Option<SceneReference>> {
        Ok(self
            .matching(query)
            .max_by(|a, b| {
                a.acquired_at
                    .cmp(&b.acquired_at)
                    .then_with(|| a.scene_id.cmp(&b.scene_id))
            })
            .map(CatalogEntry::reference))
    }

    fn historical_aggregate(&self, query: &AggregateQuery) -> Result<Option<Raster>> {
        let layers = self
            .matching(&query.scenes)
            .map(|entry| self.load_band(entry, &query.band))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(band = %query.band, scenes = layers.len(), "aggregating history");
        match query.aggregator {
            Aggregator::Median => Raster::median(&layers)
                .map_err(|e| WatchError::Provider(format!("median of '{}': {e}", query.band))),
        }
    }

    fn fetch_band(&self, scene: &SceneReference, band: &str) -> Result<Raster> {
        let entry = self.entry(scene)?;
        self.load_band(entry, band)
    }
}

impl Drop for LocalSession<'_> {
    fn drop(&mut self) {
        tracing::debug!(archive = %self.dir.display(), "imagery session released");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AttributeFilter, TimeWindow};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn aoi() -> AreaOfInterest {
        AreaOfInterest {
            min_lon: 30.0,
            min_lat: -2.0,
            max_lon: 30.2,
            max_lat: -1.9,
        }
    }

    fn entry(id: &str, modality: Modality, day: u32, cloud: f64) -> CatalogEntry {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "CLOUDY_PIXEL_PERCENTAGE".to_string(),
            AttributeValue::Number(cloud),
        );
        CatalogEntry {
            scene_id: id.to_string(),
            modality,
            acquired_at: Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap(),
            footprint: aoi(),
            attributes,
            bands: BTreeMap::new(),
        }
    }

    fn query(modality: Modality) -> SceneQuery {
        SceneQuery {
            area: aoi(),
            window: TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            ),
            modality,
            filters: vec![],
        }
    }

    #[test]
    fn missing_catalog_is_provider_init_error() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        assert!(matches!(
            archive.open_session().map(|_| ()),
            Err(WatchError::ProviderInit(_))
        ));
    }

    #[test]
    fn create_writes_empty_catalog_once() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path().join("archive"));
        assert!(archive.create().unwrap());
        assert!(!archive.create().unwrap());
        let session = archive.open_session().unwrap();
        assert_eq!(session.latest(&query(Modality::Optical)).unwrap(), None);
    }

    #[test]
    fn latest_is_newest_matching_scene() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        let band = Raster::filled(2, 2, 0.3);
        archive.ingest(entry("S2_A", Modality::Optical, 3, 5.0), &[("B8", &band)]).unwrap();
        archive.ingest(entry("S2_B", Modality::Optical, 9, 80.0), &[]).unwrap();
        archive.ingest(entry("S2_C", Modality::Optical, 6, 10.0), &[]).unwrap();
        archive.ingest(entry("S1_X", Modality::Radar, 20, 0.0), &[]).unwrap();

        let session = archive.open_session().unwrap();
        let mut q = query(Modality::Optical);
        assert_eq!(session.latest(&q).unwrap().unwrap().scene_id, "S2_B");

        q.filters.push(AttributeFilter::lt("CLOUDY_PIXEL_PERCENTAGE", 20.0));
        let latest = session.latest(&q).unwrap().unwrap();
        assert_eq!(latest.scene_id, "S2_C");
        assert_eq!(latest.modality, Modality::Optical);
    }

    #[test]
    fn latest_tie_breaks_on_scene_id() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        archive.ingest(entry("S2_B", Modality::Optical, 5, 0.0), &[]).unwrap();
        archive.ingest(entry("S2_A", Modality::Optical, 5, 0.0), &[]).unwrap();
        let session = archive.open_session().unwrap();
        assert_eq!(
            session.latest(&query(Modality::Optical)).unwrap().unwrap().scene_id,
            "S2_B"
        );
    }

    #[test]
    fn latest_outside_window_or_area_is_none() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        let mut far = entry("S2_FAR", Modality::Optical, 5, 0.0);
        far.footprint = AreaOfInterest {
            min_lon: 0.0,
            min_lat: 0.0,
            max_lon: 1.0,
            max_lat: 1.0,
        };
        archive.ingest(far, &[]).unwrap();
        let mut late = entry("S2_LATE", Modality::Optical, 5, 0.0);
        late.acquired_at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        archive.ingest(late, &[]).unwrap();

        let session = archive.open_session().unwrap();
        assert!(session.latest(&query(Modality::Optical)).unwrap().is_none());
    }

    #[test]
    fn aggregate_is_per_pixel_median() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        for (i, v) in [9.0_f32, 10.0, 30.0].iter().enumerate() {
            let id = format!("S1_{i}");
            let raster = Raster::filled(2, 3, *v);
            archive
                .ingest(entry(&id, Modality::Radar, 2 + i as u32, 0.0), &[("VV", &raster)])
                .unwrap();
        }
        let session = archive.open_session().unwrap();
        let agg = session
            .historical_aggregate(&AggregateQuery {
                scenes: query(Modality::Radar),
                band: "VV".to_string(),
                aggregator: Aggregator::Median,
            })
            .unwrap()
            .unwrap();
        assert_eq!(agg.shape(), (2, 3));
        assert_eq!(agg.get(1, 2), Some(10.0));
    }

    #[test]
    fn aggregate_without_matches_is_none() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        archive.ingest(entry("S2_A", Modality::Optical, 3, 0.0), &[]).unwrap();
        let session = archive.open_session().unwrap();
        let agg = session
            .historical_aggregate(&AggregateQuery {
                scenes: query(Modality::Radar),
                band: "VV".to_string(),
                aggregator: Aggregator::Median,
            })
            .unwrap();
        assert!(agg.is_none());
    }

    #[test]
    fn fetch_missing_band_is_provider_error() {
        let dir = TempDir::new().unwrap();
        let archive = LocalArchive::new(dir.path());
        let e = entry("S2_A", Modality::Optical, 3, 0.0);
        let reference = e.reference();
        archive.ingest(e, &[]).unwrap();
        let session = archive.open_session().unwrap();
        assert!(matches!(
            session.fetch_band(&reference, "B11"),
            Err(WatchError::Provider(_))
        ));
    }
}
