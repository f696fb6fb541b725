//! Integration tests for upload plan production.
//!
//! These build real directory trees and archives on disk and check the
//! blob names a plan produces.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

use blob_collection::error::StagingError;
use blob_collection::models::ArchivePolicy;
use blob_collection::plan::produce_upload_plan;
use blob_collection::staging::probe;

fn name_set(names: Vec<&str>) -> BTreeSet<String> {
    names.into_iter().map(str::to_string).collect()
}

fn write_site_zip(path: &Path) -> Result<()> {
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = FileOptions::default();

    zip.start_file("index.html", options)?;
    zip.write_all(b"<html><body>hello</body></html>")?;
    zip.add_directory("css/", options)?;
    zip.start_file("css/app.css", options)?;
    zip.write_all(b"body { margin: 0 }")?;
    zip.start_file("css/empty.css", options)?;
    zip.finish()?;
    Ok(())
}

fn build_tree(root: &Path) -> Result<()> {
    fs::create_dir_all(root.join("assets/img"))?;
    fs::write(root.join("index.html"), "<html/>")?;
    fs::write(root.join("assets/app.js"), "console.log(1)")?;
    fs::write(root.join("assets/img/logo.png"), [0x89, b'P', b'N', b'G'])?;
    fs::write(root.join("assets/placeholder.txt"), "")?;
    fs::write(root.join("empty.json"), "")?;
    Ok(())
}

/// N files of which M are empty yield N - M entries, the same set every run
#[test]
fn test_directory_plan_excludes_empty_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    build_tree(temp_dir.path())?;

    let first = produce_upload_plan(temp_dir.path(), ArchivePolicy::Opaque)?;
    assert_eq!(first.entries.len(), 5 - 2);
    assert_eq!(
        name_set(first.names()),
        name_set(vec!["index.html", "assets/app.js", "assets/img/logo.png"])
    );

    let second = produce_upload_plan(temp_dir.path(), ArchivePolicy::Opaque)?;
    assert_eq!(name_set(first.names()), name_set(second.names()));
    Ok(())
}

#[test]
fn test_plain_file_is_single_entry() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("reports/2024");
    fs::create_dir_all(&nested)?;
    let report = nested.join("report.pdf");
    fs::write(&report, b"%PDF-1.7 fake report")?;

    let plan = produce_upload_plan(&report, ArchivePolicy::Opaque)?;
    assert_eq!(plan.names(), vec!["report.pdf"]);
    assert_eq!(plan.entries[0].absolute_path, report);
    Ok(())
}

#[test]
fn test_extracted_zip_lists_contents() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("site.zip");
    write_site_zip(&archive)?;

    let plan = produce_upload_plan(&archive, ArchivePolicy::Extract)?;
    assert_eq!(name_set(plan.names()), name_set(vec!["index.html", "css/app.css"]));
    assert_eq!(plan.skipped_empty, vec!["css/empty.css".to_string()]);
    assert!(plan.entries.iter().all(|e| !e.relative_name.contains('\\')));
    Ok(())
}

#[test]
fn test_zip_without_extract_is_one_blob() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("site.zip");
    write_site_zip(&archive)?;

    let plan = produce_upload_plan(&archive, ArchivePolicy::Opaque)?;
    assert_eq!(plan.names(), vec!["site.zip"]);
    assert!(plan.source.is_archive());
    Ok(())
}

#[test]
fn test_zip_extension_without_signature_is_not_archive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fake = temp_dir.path().join("data.zip");
    fs::write(&fake, b"this is plain text, not a zip")?;

    assert!(!probe::is_archive(&fake)?);

    let plan = produce_upload_plan(&fake, ArchivePolicy::Extract)?;
    assert_eq!(plan.names(), vec!["data.zip"]);
    Ok(())
}

#[test]
fn test_signature_without_zip_extension_is_archive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let disguised = temp_dir.path().join("data.bin");
    write_site_zip(&disguised)?;

    assert!(probe::is_archive(&disguised)?);

    let plan = produce_upload_plan(&disguised, ArchivePolicy::Extract)?;
    assert_eq!(name_set(plan.names()), name_set(vec!["index.html", "css/app.css"]));
    Ok(())
}

#[test]
fn test_corrupt_archive_fails_extraction() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let corrupt = temp_dir.path().join("broken.zip");
    let mut bytes = vec![0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
    bytes.extend_from_slice(&[0xFF; 64]);
    fs::write(&corrupt, bytes)?;

    let result = produce_upload_plan(&corrupt, ArchivePolicy::Extract);
    assert!(matches!(result, Err(StagingError::ArchiveExtraction { .. })));
    Ok(())
}

#[test]
fn test_missing_source_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist");

    let result = produce_upload_plan(&missing, ArchivePolicy::Extract);
    match result {
        Err(StagingError::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected NotFound, got {:?}", other.map(|p| p.entries.len())),
    }
}

#[test]
fn test_empty_source_path_is_invalid() {
    let result = produce_upload_plan(Path::new(""), ArchivePolicy::Opaque);
    assert!(matches!(result, Err(StagingError::InvalidArgument(_))));
}

/// Relative names do not depend on where the tree lives
#[test]
fn test_names_stable_under_relocation() -> Result<()> {
    let first = TempDir::new()?;
    let second = TempDir::new()?;
    let relocated = second.path().join("deeper/copy");
    build_tree(first.path())?;
    build_tree(&relocated)?;

    let a = produce_upload_plan(first.path(), ArchivePolicy::Opaque)?;
    let b = produce_upload_plan(&relocated, ArchivePolicy::Opaque)?;
    assert_eq!(name_set(a.names()), name_set(b.names()));
    Ok(())
}

/// A tarball member that shares the name of the decompressed tarball survives
#[test]
fn test_tgz_keeps_member_named_like_the_archive() -> Result<()> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let temp_dir = TempDir::new()?;
    let archive = temp_dir.path().join("site.tgz");
    {
        let encoder = GzEncoder::new(File::create(&archive)?, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in [("site.tar", &b"not really a tar"[..]), ("index.html", &b"<html/>"[..])] {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, content)?;
        }
        builder.into_inner()?.finish()?;
    }

    let plan = produce_upload_plan(&archive, ArchivePolicy::Extract)?;
    assert_eq!(name_set(plan.names()), name_set(vec!["site.tar", "index.html"]));
    Ok(())
}
