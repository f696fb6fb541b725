use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::debug;

use crate::cloud::store::{BlobHandle, BlobStore};
use crate::models::{AccessTier, BlobUploadSpec};

/// A blob held by [`MemoryBlobStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub content_type: String,
    pub access_tier: Option<AccessTier>,
    pub data: Vec<u8>,
}

/// In-process blob store keyed by (container, name). Re-uploading a name
/// replaces the previous blob.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<(String, String), StoredBlob>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, container: &str, name: &str) -> Option<StoredBlob> {
        self.blobs
            .lock()
            .ok()?
            .get(&(container.to_string(), name.to_string()))
            .cloned()
    }

    /// Sorted blob names within `container`
    pub fn names(&self, container: &str) -> Vec<String> {
        let mut names: Vec<String> = match self.blobs.lock() {
            Ok(blobs) => blobs
                .keys()
                .filter(|(c, _)| c == container)
                .map(|(_, name)| name.clone())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn create_or_update_blob(&self, spec: &BlobUploadSpec) -> Result<BlobHandle> {
        let data = tokio::fs::read(&spec.absolute_path)
            .await
            .context(format!("Failed to read {}", spec.absolute_path.display()))?;

        let blob = StoredBlob {
            content_type: spec.content_type.clone(),
            access_tier: spec.access_tier,
            data,
        };

        debug!("Stored {} ({} bytes) in memory container {}", spec.relative_name, blob.data.len(), spec.container);

        self.blobs
            .lock()
            .map_err(|_| anyhow!("Memory blob store lock poisoned"))?
            .insert((spec.container.clone(), spec.relative_name.clone()), blob);

        Ok(BlobHandle::from_spec(spec, None))
    }

    fn store_name(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    use crate::models::BlobType;

    fn spec_for(path: std::path::PathBuf, name: &str) -> BlobUploadSpec {
        BlobUploadSpec {
            relative_name: name.to_string(),
            size_bytes: fs::metadata(&path).unwrap().len(),
            absolute_path: path,
            content_type: "text/plain".to_string(),
            access_tier: Some(AccessTier::Hot),
            blob_type: BlobType::Block,
            container: "docs".to_string(),
            account: "acct".to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_replace() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.txt");
        fs::write(&path, b"first").unwrap();

        let store = MemoryBlobStore::new();
        store.create_or_update_blob(&spec_for(path.clone(), "a.txt")).await.unwrap();

        fs::write(&path, b"second").unwrap();
        let handle = store.create_or_update_blob(&spec_for(path, "a.txt")).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(handle.name, "a.txt");
        let blob = store.get("docs", "a.txt").unwrap();
        assert_eq!(blob.data, b"second");
        assert_eq!(blob.access_tier, Some(AccessTier::Hot));
    }

    #[tokio::test]
    async fn test_missing_source_file() {
        let store = MemoryBlobStore::new();
        let spec = BlobUploadSpec {
            relative_name: "gone.txt".to_string(),
            absolute_path: "/nonexistent/gone.txt".into(),
            size_bytes: 1,
            content_type: "text/plain".to_string(),
            access_tier: None,
            blob_type: BlobType::Block,
            container: "docs".to_string(),
            account: "acct".to_string(),
        };

        let result = store.create_or_update_blob(&spec).await;
        assert!(result.unwrap_err().to_string().contains("Failed to read"));
        assert!(store.is_empty());
    }
}
