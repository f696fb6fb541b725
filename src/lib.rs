//! # blob-collection
//!
//! Upload a local file, folder or archive into an Azure Blob Storage
//! container, optionally extracting archives first.
//!
//! ## Overview
//!
//! An upload runs in two phases. The staging phase turns a source path into an
//! upload plan: the source is classified by magic bytes, an archive is
//! extracted into a temporary directory when asked, the staged tree is listed
//! and zero-byte files are dropped. The upload phase hands one blob
//! declaration per planned file to a [`cloud::BlobStore`] with bounded
//! concurrency.
//!
//! ```text
//! path ──▶ probe ──▶ staging area ──▶ lister ──▶ upload plan ──▶ uploader ──▶ blob store
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use blob_collection::cloud::{upload_all, MemoryBlobStore, UploadOptions};
//! use blob_collection::models::{ArchivePolicy, BlobType, UploadTarget};
//! use blob_collection::plan::{build_upload_specs, with_upload_plan};
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//!
//! # fn main() -> anyhow::Result<()> {
//! let runtime = tokio::runtime::Runtime::new()?;
//! let store = MemoryBlobStore::new();
//! let target = UploadTarget {
//!     account: "mystorage".to_string(),
//!     container: "$web".to_string(),
//!     access_tier: None,
//!     blob_type: BlobType::Block,
//! };
//!
//! let (plan, result) = with_upload_plan(Path::new("site.zip"), ArchivePolicy::Extract, |plan| {
//!     let specs = build_upload_specs(&plan.entries, &target);
//!     Ok(runtime.block_on(upload_all(&store, specs, &UploadOptions::default(), CancellationToken::new())))
//! })?;
//!
//! println!("Planned {} files, uploaded {}", plan.entries.len(), result?.uploaded.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions
//! - [`models`]: Source, entry and blob declaration types
//! - [`error`]: Staging and upload error taxonomy
//! - [`staging`]: Archive probing, temp staging, extraction and listing
//! - [`plan`]: Ties staging together into an upload plan
//! - [`content_type`]: Extension to MIME type lookup
//! - [`cloud`]: Blob stores and the concurrent uploader
//! - [`config`]: YAML configuration and environment variable expansion
//! - [`constants`]: Application-wide constants

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Error types for staging and uploading
pub mod error;

/// Application constants and configuration values
pub mod constants;

/// Source classification, staging and listing
pub mod staging;

/// Upload plan production
pub mod plan;

/// Content type resolution
pub mod content_type;

/// Blob storage backends and uploader
pub mod cloud;

/// Configuration management
pub mod config;
