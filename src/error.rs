//! Error types for planning and uploading.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while classifying, staging or listing a source.
///
/// All of these abort plan production before any blob is declared.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("source '{}' is neither an existing file nor an existing directory", .0.display())]
    NotFound(PathBuf),

    #[error("failed to extract archive '{}': {reason}", path.display())]
    ArchiveExtraction { path: PathBuf, reason: String },

    #[error("source '{}' must be an existing (archive) file or folder", .0.display())]
    UnsupportedSource(PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl StagingError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        StagingError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn extraction(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        StagingError::ArchiveExtraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// A single blob that could not be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobFailure {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for BlobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.reason)
    }
}

/// Aggregate failure of an upload run.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{} of {} blobs failed to upload: {}", failures.len(), failures.len() + uploaded, join_failures(failures))]
    Failed {
        failures: Vec<BlobFailure>,
        uploaded: usize,
    },

    #[error("upload cancelled after {uploaded} blobs ({cancelled} not started)")]
    Cancelled { uploaded: usize, cancelled: usize },
}

fn join_failures(failures: &[BlobFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
