//! Global constants for the blob-collection application.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

use crate::models::ArchiveFormat;

// Archive detection constants
/// Number of leading bytes read from a file when sniffing for an archive signature
pub const ARCHIVE_PROBE_LENGTH: usize = 5;

/// Known compressed/archive container signatures, scanned in order.
///
/// Each signature is matched as an exact prefix of the probed bytes. The zip
/// local file header is matched regardless of its "version needed" byte, so
/// stored (0x0a), deflated (0x14) and zip64 (0x2d) archives all match.
pub const ARCHIVE_SIGNATURES: &[(&[u8], ArchiveFormat)] = &[
    (&[0x50, 0x4b, 0x03, 0x04], ArchiveFormat::Zip),
    (&[0x50, 0x4b, 0x05, 0x06], ArchiveFormat::Zip),
    (&[0x50, 0x4b, 0x07, 0x08], ArchiveFormat::Zip),
    (&[0x1f, 0x8b], ArchiveFormat::Gzip),
    (&[0x1f, 0x9d], ArchiveFormat::UnixCompress),
    (&[0x1f, 0xa0], ArchiveFormat::Lzh),
    (&[0x42, 0x5a, 0x68], ArchiveFormat::Bzip2),
    (&[0x4c, 0x5a, 0x49, 0x50], ArchiveFormat::Lzip),
];

/// Offset of the "ustar" magic inside a tar header block
pub const TAR_MAGIC_OFFSET: usize = 257;

/// The "ustar" magic found in POSIX and GNU tar headers
pub const TAR_MAGIC: &[u8] = b"ustar";

/// Size of one tar header block
pub const TAR_BLOCK_SIZE: usize = 512;

// Storage constants
/// Container Azure serves static websites from
pub const WEB_CONTAINER: &str = "$web";

/// Content type used when the extension is unknown
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Header carrying the blob access tier on Azure put requests
pub const ACCESS_TIER_HEADER: &str = "x-ms-access-tier";

/// Large file threshold for multipart (block list) uploads (50MB)
pub const LARGE_FILE_THRESHOLD: u64 = 50 * 1024 * 1024;

/// Block size used for multipart uploads (8MB)
pub const UPLOAD_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Maximum blocks in flight for a single multipart upload
pub const MULTIPART_CONCURRENCY: usize = 4;

// Upload pool constants
/// Default number of upload workers per CPU core
pub const DEFAULT_WORKERS_PER_CORE: usize = 8;

/// Progress reporting interval for uploads in seconds
pub const UPLOAD_PROGRESS_INTERVAL_SECS: u64 = 5;

// Default file names
pub const DEFAULT_CONFIG_NAME: &str = "blob-collection.yaml";
