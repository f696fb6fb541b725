//! End-to-end uploads into the in-memory blob store.

use std::fs::{self, File};
use std::io::Write;

use anyhow::Result;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use zip::write::FileOptions;
use zip::ZipWriter;

use blob_collection::cloud::{upload_all, MemoryBlobStore, UploadOptions};
use blob_collection::config::UploadConfig;
use blob_collection::constants::WEB_CONTAINER;
use blob_collection::error::UploadError;
use blob_collection::models::{AccessTier, ArchivePolicy};
use blob_collection::plan::{build_upload_specs, with_upload_plan};

fn website_config(source: &str) -> UploadConfig {
    UploadConfig {
        source: source.to_string(),
        account: "mysite".to_string(),
        website: true,
        extract: true,
        access_tier: Some(AccessTier::Hot),
        ..Default::default()
    }
}

#[test]
fn test_extracted_site_lands_in_web_container() -> Result<()> {
    let fixtures = TempDir::new()?;
    let archive = fixtures.path().join("site.zip");
    let mut zip = ZipWriter::new(File::create(&archive)?);
    zip.start_file("index.html", FileOptions::default())?;
    zip.write_all(b"<html><body>hi</body></html>")?;
    zip.start_file("css/app.css", FileOptions::default())?;
    zip.write_all(b"body{}")?;
    zip.start_file("robots.txt", FileOptions::default())?;
    zip.finish()?;

    let config = website_config(&archive.to_string_lossy());
    config.validate()?;
    let target = config.target();

    let runtime = Runtime::new()?;
    let store = MemoryBlobStore::new();

    let (plan, result) = with_upload_plan(&config.source_path(), config.archive_policy(), |plan| {
        let specs = build_upload_specs(&plan.entries, &target);
        Ok(runtime.block_on(upload_all(&store, specs, &UploadOptions::default(), CancellationToken::new())))
    })?;
    let report = result?;

    assert_eq!(plan.skipped_empty, vec!["robots.txt".to_string()]);
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.bytes_uploaded, plan.total_bytes());
    assert_eq!(store.names(WEB_CONTAINER), vec!["css/app.css", "index.html"]);

    let index = store.get(WEB_CONTAINER, "index.html").expect("index.html uploaded");
    assert_eq!(index.content_type, "text/html");
    assert_eq!(index.access_tier, Some(AccessTier::Hot));
    assert_eq!(index.data, b"<html><body>hi</body></html>");

    let css = store.get(WEB_CONTAINER, "css/app.css").expect("css uploaded");
    assert_eq!(css.content_type, "text/css");
    Ok(())
}

#[test]
fn test_folder_upload_replaces_existing_blobs() -> Result<()> {
    let source = TempDir::new()?;
    fs::create_dir_all(source.path().join("data"))?;
    fs::write(source.path().join("data/blob.bin"), [1u8, 2, 3])?;
    fs::write(source.path().join("notes.unknownext"), "v1")?;

    let mut config = website_config(&source.path().to_string_lossy());
    config.website = false;
    config.container = "backups".to_string();
    let target = config.target();

    let runtime = Runtime::new()?;
    let store = MemoryBlobStore::new();
    let upload = |store: &MemoryBlobStore| -> Result<()> {
        let (_, result) = with_upload_plan(source.path(), ArchivePolicy::Opaque, |plan| {
            let specs = build_upload_specs(&plan.entries, &target);
            Ok(runtime.block_on(upload_all(store, specs, &UploadOptions { concurrency: 2 }, CancellationToken::new())))
        })?;
        result?;
        Ok(())
    };

    upload(&store)?;
    fs::write(source.path().join("notes.unknownext"), "v2")?;
    upload(&store)?;

    assert_eq!(store.len(), 2);
    let notes = store.get("backups", "notes.unknownext").expect("notes uploaded");
    assert_eq!(notes.data, b"v2");
    assert_eq!(notes.content_type, "application/octet-stream");
    Ok(())
}

#[test]
fn test_cancelled_upload_still_releases_staging() -> Result<()> {
    let fixtures = TempDir::new()?;
    let archive = fixtures.path().join("bundle.zip");
    let mut zip = ZipWriter::new(File::create(&archive)?);
    zip.start_file("a.txt", FileOptions::default())?;
    zip.write_all(b"a")?;
    zip.finish()?;

    let config = website_config(&archive.to_string_lossy());
    let target = config.target();
    let runtime = Runtime::new()?;
    let store = MemoryBlobStore::new();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (plan, result) = with_upload_plan(&archive, ArchivePolicy::Extract, |plan| {
        let specs = build_upload_specs(&plan.entries, &target);
        Ok(runtime.block_on(upload_all(&store, specs, &UploadOptions::default(), cancel.clone())))
    })?;

    assert!(matches!(result, Err(UploadError::Cancelled { uploaded: 0, cancelled: 1 })));
    assert!(store.is_empty());
    assert!(!plan.entries[0].absolute_path.exists());
    Ok(())
}
