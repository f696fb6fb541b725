use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::BlobUploadSpec;

/// A blob that exists remotely after a successful declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobHandle {
    pub account: String,
    pub container: String,
    pub name: String,
    pub size_bytes: u64,
    pub e_tag: Option<String>,
}

impl BlobHandle {
    pub fn from_spec(spec: &BlobUploadSpec, e_tag: Option<String>) -> Self {
        BlobHandle {
            account: spec.account.clone(),
            container: spec.container.clone(),
            name: spec.relative_name.clone(),
            size_bytes: spec.size_bytes,
            e_tag,
        }
    }

    pub fn url(&self) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.account, self.container, self.name
        )
    }
}

/// The cloud side of an upload: create a blob, or replace the one with the
/// same name in the same container.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn create_or_update_blob(&self, spec: &BlobUploadSpec) -> Result<BlobHandle>;

    /// Short name for logs
    fn store_name(&self) -> String;
}
