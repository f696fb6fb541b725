use std::path::{Component, Path};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::StagingError;
use crate::models::FileEntry;

/// Recursively list every regular file under `root`.
///
/// Symlinks are not followed, so link cycles cannot occur and linked files
/// are skipped. The order is whatever the filesystem yields.
pub fn list(root: &Path) -> Result<Vec<FileEntry>, StagingError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            let context = format!("Failed to walk {}", root.display());
            match e.into_io_error() {
                Some(io_error) => StagingError::io(context, io_error),
                None => StagingError::io(context, std::io::Error::other("filesystem loop")),
            }
        })?;

        if !entry.file_type().is_file() {
            if entry.file_type().is_symlink() {
                debug!("Skipping symlink {}", entry.path().display());
            }
            continue;
        }

        let relative_name = match relative_blob_name(root, entry.path()) {
            Some(name) => name,
            None => {
                warn!("Skipping {}: not under {}", entry.path().display(), root.display());
                continue;
            }
        };

        let metadata = entry.metadata().map_err(|e| {
            let context = format!("Failed to read metadata for {}", entry.path().display());
            StagingError::io(context, e.into_io_error().unwrap_or_else(|| std::io::Error::other("metadata")))
        })?;

        entries.push(FileEntry {
            absolute_path: entry.path().to_path_buf(),
            relative_name,
            size_bytes: metadata.len(),
        });
    }

    debug!("Listed {} files under {}", entries.len(), root.display());
    Ok(entries)
}

/// A single file uploaded without extraction is named by its base filename.
pub fn list_single_file(path: &Path) -> Result<Vec<FileEntry>, StagingError> {
    let relative_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| StagingError::InvalidArgument(format!("{} has no file name", path.display())))?;

    let metadata = path
        .metadata()
        .map_err(|e| StagingError::io(format!("Failed to read metadata for {}", path.display()), e))?;

    Ok(vec![FileEntry {
        absolute_path: path.to_path_buf(),
        relative_name,
        size_bytes: metadata.len(),
    }])
}

/// Path of `path` relative to `root`, components joined with `/`.
///
/// Returns `None` when `path` is not below `root` or names `root` itself.
pub fn relative_blob_name(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().replace('\\', "/")),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
