//! Turning a source path into a list of files to upload.
//!
//! ## Components
//!
//! - **Probe**: classifies a path as file, archive or directory by sniffing
//!   leading bytes
//! - **Temp**: the staging area, a scoped temporary directory for extracted
//!   archives that is always removed again
//! - **Extract**: zip and gzip/tar.gz extraction into a staging area
//! - **Lister**: walks a staged root and maps files to blob names
//!
//! ```no_run
//! use blob_collection::staging::{probe, lister, StagingArea};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), blob_collection::error::StagingError> {
//! let source = probe::classify(Path::new("/tmp/site.zip"))?;
//! let (entries, _cleanup) = StagingArea::scoped(&source, true, |area| lister::list(area.root()))?;
//! println!("{} files", entries.len());
//! # Ok(())
//! # }
//! ```

/// Archive signature sniffing and source classification
pub mod probe;

/// Scoped temporary staging directories
pub mod temp;

/// Archive extraction
pub mod extract;

/// Directory listing and blob naming
pub mod lister;

pub use temp::{CleanupOutcome, StagingArea};
