use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;

use crate::constants::{ARCHIVE_PROBE_LENGTH, ARCHIVE_SIGNATURES};
use crate::error::StagingError;
use crate::models::{ArchiveFormat, SourceKind, SourceSpec};

/// Classify a source path as a plain file, an archive file or a directory.
///
/// Archive detection sniffs the leading bytes of the file; the extension is
/// never consulted.
pub fn classify(path: &Path) -> Result<SourceSpec, StagingError> {
    if path.as_os_str().is_empty() {
        return Err(StagingError::InvalidArgument("source path is empty".to_string()));
    }

    let metadata = match path.metadata() {
        Ok(metadata) => metadata,
        Err(_) => return Err(StagingError::NotFound(path.to_path_buf())),
    };

    let spec = if metadata.is_file() {
        SourceSpec {
            path: path.to_path_buf(),
            kind: SourceKind::File,
            archive: probe_file(path)?,
        }
    } else if metadata.is_dir() {
        SourceSpec {
            path: path.to_path_buf(),
            kind: SourceKind::Directory,
            archive: None,
        }
    } else {
        return Err(StagingError::UnsupportedSource(path.to_path_buf()));
    };

    debug!("Classified {} as {:?} (archive: {:?})", path.display(), spec.kind, spec.archive);
    Ok(spec)
}

/// Whether the file at `path` starts with a known archive signature.
pub fn is_archive(path: &Path) -> Result<bool, StagingError> {
    Ok(probe_file(path)?.is_some())
}

/// Match leading bytes against the signature table, first hit wins.
///
/// Data shorter than a signature never matches it.
pub fn detect_archive(data: &[u8]) -> Option<ArchiveFormat> {
    ARCHIVE_SIGNATURES
        .iter()
        .find(|(signature, _)| data.starts_with(signature))
        .map(|(_, format)| *format)
}

fn probe_file(path: &Path) -> Result<Option<ArchiveFormat>, StagingError> {
    let file = File::open(path)
        .map_err(|e| StagingError::io(format!("Failed to open {}", path.display()), e))?;

    let mut header = Vec::with_capacity(ARCHIVE_PROBE_LENGTH);
    file.take(ARCHIVE_PROBE_LENGTH as u64)
        .read_to_end(&mut header)
        .map_err(|e| StagingError::io(format!("Failed to read {}", path.display()), e))?;

    Ok(detect_archive(&header))
}
