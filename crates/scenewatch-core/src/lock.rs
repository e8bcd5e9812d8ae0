//! Single-instance guard for runs sharing one state record.

use crate::error::{Result, WatchError};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Exclusive lock file. Released (deleted) on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Create `path` exclusively. A lock older than `stale_after` is assumed
    /// to belong to a crashed run and is replaced.
    pub fn acquire(path: &Path, stale_after: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        match Self::create(path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                if !is_stale(path, stale_after)? {
                    return Err(WatchError::RunInProgress(path.to_path_buf()));
                }
                tracing::warn!(lock = %path.display(), "replacing stale run lock");
                std::fs::remove_file(path)?;
                Self::create(path).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::AlreadyExists {
                        WatchError::RunInProgress(path.to_path_buf())
                    } else {
                        e.into()
                    }
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        Self::create_with(path, |f| {
            let now: DateTime<Utc> = Utc::now();
            writeln!(f, "pid={} acquired_at={}", std::process::id(), now.to_rfc3339())
        })
    }

    /// Removes the file again if `write` fails.
    fn create_with(
        path: &Path,
        write: impl FnOnce(&mut std::fs::File) -> std::io::Result<()>,
    ) -> std::io::Result<Self> {
        let mut f = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        if let Err(e) = write(&mut f) {
            drop(f);
            if let Err(rm) = std::fs::remove_file(path) {
                tracing::warn!(lock = %path.display(), error = %rm, "failed to remove partial run lock");
            }
            return Err(e);
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release run lock");
        }
    }
}

fn is_stale(path: &Path, stale_after: Duration) -> Result<bool> {
    let modified = std::fs::metadata(path)?.modified()?;
    let age = modified.elapsed().unwrap_or(Duration::ZERO);
    Ok(age >= stale_after)
}
