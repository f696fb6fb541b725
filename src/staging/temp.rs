use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use uuid::Uuid;

use crate::error::StagingError;
use crate::models::SourceSpec;
use crate::staging::extract::extract_archive;

/// Result of releasing a staging area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Nothing was created, nothing to remove
    NotNeeded,
    /// The temporary directory was removed
    Removed(PathBuf),
    /// Removal failed; the directory may still exist
    Failed { path: PathBuf, reason: String },
}

impl CleanupOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, CleanupOutcome::Failed { .. })
    }
}

impl fmt::Display for CleanupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupOutcome::NotNeeded => write!(f, "no staging directory"),
            CleanupOutcome::Removed(path) => write!(f, "removed {}", path.display()),
            CleanupOutcome::Failed { path, reason } => {
                write!(f, "failed to remove {}: {}", path.display(), reason)
            }
        }
    }
}

/// The directory a listing runs against.
///
/// Either the source itself, or a temporary directory holding an extracted
/// archive. A temporary directory is owned exclusively by this value and is
/// removed by [`StagingArea::release`].
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    temp: Option<PathBuf>,
}

impl StagingArea {
    /// Stage `source`, extracting it into a fresh temporary directory when
    /// `extract` is set and the source is a recognised archive.
    pub fn acquire(source: &SourceSpec, extract: bool) -> Result<Self, StagingError> {
        let format = match source.archive {
            Some(format) if extract && source.is_file() => format,
            _ => {
                return Ok(StagingArea {
                    root: source.path.clone(),
                    temp: None,
                })
            }
        };

        let temp_path = env::temp_dir().join(Uuid::new_v4().to_string());
        clear_dir(&temp_path)?;
        fs::create_dir_all(&temp_path).map_err(|e| {
            StagingError::io(format!("Failed to create staging directory {}", temp_path.display()), e)
        })?;
        debug!("Created staging directory {}", temp_path.display());

        let area = StagingArea {
            root: temp_path.clone(),
            temp: Some(temp_path),
        };

        match extract_archive(&source.path, format, area.root()) {
            Ok(()) => Ok(area),
            Err(e) => {
                let outcome = area.release();
                if outcome.is_failure() {
                    warn!("Staging cleanup after failed extraction: {}", outcome);
                }
                Err(e)
            }
        }
    }

    /// Run `f` against a freshly acquired staging area, releasing it on every
    /// exit path.
    pub fn scoped<T, F>(source: &SourceSpec, extract: bool, f: F) -> Result<(T, CleanupOutcome), StagingError>
    where
        F: FnOnce(&StagingArea) -> Result<T, StagingError>,
    {
        let area = StagingArea::acquire(source, extract)?;
        let result = f(&area);
        let outcome = area.release();

        match result {
            Ok(value) => Ok((value, outcome)),
            Err(e) => {
                if outcome.is_failure() {
                    warn!("Staging cleanup after failure: {}", outcome);
                }
                Err(e)
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_temporary(&self) -> bool {
        self.temp.is_some()
    }

    /// Remove the temporary directory, if any. Never fails; a failed removal
    /// is logged and returned as [`CleanupOutcome::Failed`].
    pub fn release(mut self) -> CleanupOutcome {
        self.release_inner()
    }

    fn release_inner(&mut self) -> CleanupOutcome {
        let Some(path) = self.temp.take() else {
            return CleanupOutcome::NotNeeded;
        };

        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!("Removed staging directory {}", path.display());
                CleanupOutcome::Removed(path)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => CleanupOutcome::Removed(path),
            Err(e) => {
                warn!("Failed to remove staging directory {}: {}", path.display(), e);
                CleanupOutcome::Failed {
                    path,
                    reason: e.to_string(),
                }
            }
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        // Only reached when release() was skipped, e.g. during a panic
        if self.temp.is_some() {
            self.release_inner();
        }
    }
}

fn clear_dir(path: &Path) -> Result<(), StagingError> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|e| {
            StagingError::io(format!("Failed to clear staging directory {}", path.display()), e)
        })?;
    }
    Ok(())
}
