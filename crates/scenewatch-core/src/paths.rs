use crate::error::{Result, WatchError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const WATCH_DIR: &str = ".scenewatch";
pub const ARCHIVE_DIR: &str = ".scenewatch/archive";
pub const ASSETS_DIR: &str = ".scenewatch/assets";

pub const CONFIG_FILE: &str = ".scenewatch/config.yaml";
pub const STATE_FILE: &str = ".scenewatch/last_scene";
pub const LOCK_FILE: &str = ".scenewatch/run.lock";

pub const CATALOG_FILE: &str = "catalog.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn watch_dir(root: &Path) -> PathBuf {
    root.join(WATCH_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

pub fn lock_path(root: &Path) -> PathBuf {
    root.join(LOCK_FILE)
}

pub fn catalog_path(archive: &Path) -> PathBuf {
    archive.join(CATALOG_FILE)
}

pub fn assets_dir(root: &Path) -> PathBuf {
    root.join(ASSETS_DIR)
}

/// File backing an exported asset inside a local asset store.
pub fn asset_file(store_root: &Path, asset_id: &str) -> PathBuf {
    store_root.join(format!("{asset_id}.json"))
}

// ---------------------------------------------------------------------------
// Asset id validation
// ---------------------------------------------------------------------------

static ASSET_RE: OnceLock<Regex> = OnceLock::new();

fn asset_re() -> &'static Regex {
    ASSET_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_\-]*(/[A-Za-z0-9][A-Za-z0-9_\-]*)*$").unwrap()
    })
}

/// Asset ids become relative file paths, so `..` and absolute paths are rejected.
pub fn validate_asset_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 256 || !asset_re().is_match(id) {
        return Err(WatchError::InvalidAssetId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_asset_ids() {
        for id in [
            "Final_Alert_20240101_1200",
            "projects/kigali-sync-final/assets/Final_Alert_20240101_1200",
            "a",
        ] {
            validate_asset_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_asset_ids() {
        for id in ["", "/abs/path", "../escape", "a//b", "trailing/", "has space"] {
            assert!(validate_asset_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/site");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/site/.scenewatch/config.yaml")
        );
        assert_eq!(
            state_path(root),
            PathBuf::from("/tmp/site/.scenewatch/last_scene")
        );
        assert_eq!(
            asset_file(&assets_dir(root), "p/assets/x"),
            PathBuf::from("/tmp/site/.scenewatch/assets/p/assets/x.json")
        );
    }
}
