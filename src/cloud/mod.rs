//! Cloud storage side of an upload.
//!
//! Uploads go through the [`BlobStore`] trait so the concurrent uploader does
//! not care where blobs end up:
//!
//! - **Azure Blob Storage**: [`AzureBlobStore`], built on `object_store`
//! - **In memory**: [`MemoryBlobStore`], for tests and dry runs
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ Upload plan  │────▶│  upload_all  │────▶│ BlobStore        │
//! │ (blob specs) │     │ N in flight  │     │ azure / memory   │
//! └──────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use blob_collection::cloud::{upload_all, MemoryBlobStore, UploadOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example(specs: Vec<blob_collection::models::BlobUploadSpec>) -> anyhow::Result<()> {
//! let store = MemoryBlobStore::new();
//! let report = upload_all(&store, specs, &UploadOptions::default(), CancellationToken::new()).await?;
//! println!("Uploaded {} bytes", report.bytes_uploaded);
//! # Ok(())
//! # }
//! ```

pub mod azure;
pub mod memory;
pub mod store;
pub mod uploader;

pub use azure::AzureBlobStore;
pub use memory::{MemoryBlobStore, StoredBlob};
pub use store::{BlobHandle, BlobStore};
pub use uploader::{upload_all, UploadOptions, UploadReport};
