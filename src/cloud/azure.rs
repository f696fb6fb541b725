use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use http::{HeaderMap, HeaderValue};
use log::{debug, warn};
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, PutMultipartOpts, PutOptions, PutPayload,
    RetryConfig, WriteMultipart,
};
use tokio::io::AsyncReadExt;

use crate::cloud::store::{BlobHandle, BlobStore};
use crate::constants::{ACCESS_TIER_HEADER, LARGE_FILE_THRESHOLD, MULTIPART_CONCURRENCY, UPLOAD_CHUNK_SIZE};
use crate::models::{AccessTier, BlobType, BlobUploadSpec};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    account: String,
    container: String,
    access_tier: Option<AccessTier>,
}

impl ClientKey {
    fn for_spec(spec: &BlobUploadSpec) -> Self {
        ClientKey {
            account: spec.account.clone(),
            container: spec.container.clone(),
            access_tier: spec.access_tier,
        }
    }
}

/// Azure Blob Storage backed by `object_store`.
///
/// Credentials come from the environment (`AZURE_STORAGE_ACCOUNT_KEY`,
/// `AZURE_CLIENT_ID`/`AZURE_CLIENT_SECRET`/`AZURE_TENANT_ID`, managed identity,
/// ...). Transient failures are retried by the client itself.
#[derive(Default)]
pub struct AzureBlobStore {
    clients: Mutex<HashMap<ClientKey, Arc<MicrosoftAzure>>>,
}

impl AzureBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One client per account, container and access tier; the tier travels as
    /// a default header on every request the client makes.
    fn client_for(&self, spec: &BlobUploadSpec) -> Result<Arc<MicrosoftAzure>> {
        let key = ClientKey::for_spec(spec);
        let mut clients = self
            .clients
            .lock()
            .map_err(|_| anyhow!("Azure client cache lock poisoned"))?;

        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(build_client(&key)?);
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }
}

fn build_client(key: &ClientKey) -> Result<MicrosoftAzure> {
    let mut options = ClientOptions::new();
    if let Some(tier) = key.access_tier {
        options = options.with_default_headers(access_tier_headers(tier)?);
    }

    debug!(
        "Creating Azure client for account {} container {} (tier: {:?})",
        key.account, key.container, key.access_tier
    );

    MicrosoftAzureBuilder::from_env()
        .with_account(&key.account)
        .with_container_name(&key.container)
        .with_client_options(options)
        .with_retry(RetryConfig::default())
        .build()
        .context(format!(
            "Failed to configure Azure client for {}/{}",
            key.account, key.container
        ))
}

fn access_tier_headers(tier: AccessTier) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&tier.to_string()).context("Invalid access tier header value")?;
    headers.insert(ACCESS_TIER_HEADER, value);
    Ok(headers)
}

/// The blob name as listed; names `object_store` cannot carry verbatim are
/// rejected rather than percent-encoded.
fn blob_location(spec: &BlobUploadSpec) -> Result<ObjectPath> {
    ObjectPath::parse(&spec.relative_name)
        .context(format!("Invalid blob name {:?}", spec.relative_name))
}

fn blob_attributes(spec: &BlobUploadSpec) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, spec.content_type.clone().into());
    attributes
}

#[async_trait]
impl BlobStore for AzureBlobStore {
    async fn create_or_update_blob(&self, spec: &BlobUploadSpec) -> Result<BlobHandle> {
        if spec.blob_type != BlobType::Block {
            bail!("{} blobs are not supported, only Block", spec.blob_type);
        }

        let client = self.client_for(spec)?;
        let location = blob_location(spec)?;
        let start = Instant::now();

        let e_tag = if spec.size_bytes > LARGE_FILE_THRESHOLD {
            upload_large_file(client.as_ref(), &location, spec).await?
        } else {
            upload_small_file(client.as_ref(), &location, spec).await?
        };

        debug!(
            "Uploaded {} to {}/{} in {:?}",
            spec.absolute_path.display(),
            spec.container,
            location,
            start.elapsed()
        );

        Ok(BlobHandle::from_spec(spec, e_tag))
    }

    fn store_name(&self) -> String {
        "azure".to_string()
    }
}

async fn upload_small_file(
    client: &MicrosoftAzure,
    location: &ObjectPath,
    spec: &BlobUploadSpec,
) -> Result<Option<String>> {
    let contents = tokio::fs::read(&spec.absolute_path)
        .await
        .context(format!("Failed to read {} for upload", spec.absolute_path.display()))?;

    let options = PutOptions {
        attributes: blob_attributes(spec),
        ..Default::default()
    };

    let result = client
        .put_opts(location, PutPayload::from(contents), options)
        .await
        .context(format!("Failed to upload {}", spec.relative_name))?;

    Ok(result.e_tag)
}

async fn upload_large_file(
    client: &MicrosoftAzure,
    location: &ObjectPath,
    spec: &BlobUploadSpec,
) -> Result<Option<String>> {
    let options = PutMultipartOpts {
        attributes: blob_attributes(spec),
        ..Default::default()
    };

    let upload = client
        .put_multipart_opts(location, options)
        .await
        .context(format!("Failed to start block upload for {}", spec.relative_name))?;

    let mut writer = WriteMultipart::new_with_chunk_size(upload, UPLOAD_CHUNK_SIZE);

    match copy_into(&mut writer, &spec.absolute_path).await {
        Ok(()) => {
            let result = writer
                .finish()
                .await
                .context(format!("Failed to commit block list for {}", spec.relative_name))?;
            Ok(result.e_tag)
        }
        Err(e) => {
            if let Err(abort_error) = writer.abort().await {
                warn!("Failed to abort block upload for {}: {}", spec.relative_name, abort_error);
            }
            Err(e)
        }
    }
}

async fn copy_into(writer: &mut WriteMultipart, path: &Path) -> Result<()> {
    let mut file = tokio::fs::File::open(path)
        .await
        .context(format!("Failed to open {} for upload", path.display()))?;

    let mut buffer = vec![0u8; UPLOAD_CHUNK_SIZE];
    loop {
        let read = file
            .read(&mut buffer)
            .await
            .context(format!("Failed to read from {}", path.display()))?;

        if read == 0 {
            break;
        }

        writer
            .wait_for_capacity(MULTIPART_CONCURRENCY)
            .await
            .context("Block upload failed")?;
        writer.write(&buffer[..read]);
    }

    Ok(())
}
