use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;
use std::time::Instant;

use flate2::read::GzDecoder;
use log::{debug, info};
use zip::ZipArchive;

use crate::constants::{TAR_BLOCK_SIZE, TAR_MAGIC, TAR_MAGIC_OFFSET};
use crate::error::StagingError;
use crate::models::ArchiveFormat;

/// Extract every entry of `archive` into `dest`, recursively.
///
/// `dest` must already exist. Entry paths escaping `dest` are rejected by the
/// underlying readers.
pub fn extract_archive(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<(), StagingError> {
    let start = Instant::now();

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest)?,
        ArchiveFormat::Gzip => extract_gzip(archive, dest)?,
        other => {
            return Err(StagingError::extraction(
                archive,
                format!("unsupported archive format: {}", other),
            ))
        }
    }

    info!("Extracted {} archive {} in {:?}", format, archive.display(), start.elapsed());
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<(), StagingError> {
    let file = File::open(archive)
        .map_err(|e| StagingError::io(format!("Failed to open {}", archive.display()), e))?;

    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| StagingError::extraction(archive, e))?;

    debug!("Extracting {} zip entries into {}", zip.len(), dest.display());
    zip.extract(dest).map_err(|e| StagingError::extraction(archive, e))
}

/// Gzip holds either a tarball or a single compressed file.
///
/// The decompressed stream is sniffed for the tar magic and then unpacked or
/// written out directly, so nothing but the archive contents lands in `dest`.
fn extract_gzip(archive: &Path, dest: &Path) -> Result<(), StagingError> {
    let file = File::open(archive)
        .map_err(|e| StagingError::io(format!("Failed to open {}", archive.display()), e))?;

    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut header = Vec::with_capacity(TAR_BLOCK_SIZE);
    (&mut decoder)
        .take(TAR_BLOCK_SIZE as u64)
        .read_to_end(&mut header)
        .map_err(|e| StagingError::extraction(archive, e))?;

    let mut stream = Cursor::new(header).chain(decoder);

    if is_tarball(stream.get_ref().0.get_ref()) {
        debug!("{} holds a tarball, unpacking", archive.display());
        return tar::Archive::new(stream)
            .unpack(dest)
            .map_err(|e| StagingError::extraction(archive, e));
    }

    let inner_name = gunzipped_name(archive);
    let inner_path = dest.join(&inner_name);
    debug!("{} holds a single file, staged as {}", archive.display(), inner_name);

    let mut out = File::create(&inner_path)
        .map_err(|e| StagingError::io(format!("Failed to create {}", inner_path.display()), e))?;
    io::copy(&mut stream, &mut out).map_err(|e| StagingError::extraction(archive, e))?;
    Ok(())
}

fn gunzipped_name(archive: &Path) -> String {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "archive".to_string());

    if let Some(stem) = name.strip_suffix(".tgz") {
        format!("{}.tar", stem)
    } else if let Some(stem) = name.strip_suffix(".gz") {
        stem.to_string()
    } else {
        format!("{}.out", name)
    }
}

fn is_tarball(header: &[u8]) -> bool {
    header
        .get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len())
        .map_or(false, |magic| magic == TAR_MAGIC)
}
