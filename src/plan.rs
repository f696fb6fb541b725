use std::path::Path;

use log::{debug, info, warn};
use serde::Serialize;

use crate::content_type::content_type_for;
use crate::error::StagingError;
use crate::models::{ArchivePolicy, BlobUploadSpec, FileEntry, SourceSpec, UploadTarget};
use crate::staging::{lister, probe, CleanupOutcome, StagingArea};

/// The files one source maps to, zero-byte files already removed.
#[derive(Debug, Clone, Serialize)]
pub struct UploadPlan {
    pub source: SourceSpec,
    pub entries: Vec<FileEntry>,
    /// Blob names left out because the file was empty
    pub skipped_empty: Vec<String>,
    /// Entries were listed from an extracted copy of the source
    pub extracted: bool,
    #[serde(skip)]
    pub cleanup: CleanupOutcome,
}

impl UploadPlan {
    pub fn total_bytes(&self) -> u64 {
        self.entries.iter().map(|e| e.size_bytes).sum()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.relative_name.as_str()).collect()
    }

    /// Serializable view of the plan. Local paths are left out when they
    /// pointed into a staging directory that has since been removed.
    pub fn summary(&self) -> PlanSummary<'_> {
        PlanSummary {
            source: &self.source,
            extracted: self.extracted,
            total_bytes: self.total_bytes(),
            entries: self
                .entries
                .iter()
                .map(|entry| EntrySummary {
                    relative_name: &entry.relative_name,
                    size_bytes: entry.size_bytes,
                    absolute_path: (!self.extracted).then_some(entry.absolute_path.as_path()),
                })
                .collect(),
            skipped_empty: &self.skipped_empty,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanSummary<'a> {
    pub source: &'a SourceSpec,
    pub extracted: bool,
    pub total_bytes: u64,
    pub entries: Vec<EntrySummary<'a>>,
    pub skipped_empty: &'a [String],
}

#[derive(Debug, Serialize)]
pub struct EntrySummary<'a> {
    pub relative_name: &'a str,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<&'a Path>,
}

/// Classify, stage, list and filter `source`, then release the staging area.
///
/// When the source is an extracted archive the returned entries point into a
/// directory that no longer exists; use [`with_upload_plan`] to act on the
/// files while they are still staged.
pub fn produce_upload_plan(source: &Path, policy: ArchivePolicy) -> Result<UploadPlan, StagingError> {
    with_upload_plan(source, policy, |_| Ok(())).map(|(plan, ())| plan)
}

/// Build the upload plan for `source` and run `f` against it while the
/// staging area is alive. The staging area is released on every exit path.
pub fn with_upload_plan<T, F>(
    source: &Path,
    policy: ArchivePolicy,
    f: F,
) -> Result<(UploadPlan, T), StagingError>
where
    F: FnOnce(&UploadPlan) -> Result<T, StagingError>,
{
    let spec = probe::classify(source)?;
    let extract = policy == ArchivePolicy::Extract && spec.is_archive();

    if let (Some(format), false) = (spec.archive, extract) {
        info!("{} is a {} archive, uploading it as a single blob", source.display(), format);
    }

    let ((mut plan, value), cleanup) = StagingArea::scoped(&spec, extract, |area| {
        let listed = if spec.is_file() && !area.is_temporary() {
            lister::list_single_file(area.root())?
        } else {
            lister::list(area.root())?
        };

        let (entries, skipped_empty) = filter_empty(listed);
        let plan = UploadPlan {
            source: spec.clone(),
            entries,
            skipped_empty,
            extracted: area.is_temporary(),
            cleanup: CleanupOutcome::NotNeeded,
        };

        let value = f(&plan)?;
        Ok((plan, value))
    })?;

    record_cleanup(&mut plan, cleanup, source);

    info!(
        "Planned {} blobs ({} bytes) from {}, skipped {} empty files",
        plan.entries.len(),
        plan.total_bytes(),
        source.display(),
        plan.skipped_empty.len()
    );
    Ok((plan, value))
}

fn record_cleanup(plan: &mut UploadPlan, cleanup: CleanupOutcome, source: &Path) {
    if cleanup.is_failure() {
        warn!("Upload plan for {} produced, but {}", source.display(), cleanup);
    }
    plan.cleanup = cleanup;
}

/// Zero-byte objects are never uploaded.
fn filter_empty(listed: Vec<FileEntry>) -> (Vec<FileEntry>, Vec<String>) {
    let (empty, entries): (Vec<FileEntry>, Vec<FileEntry>) = listed.into_iter().partition(|e| e.is_empty());

    for entry in &empty {
        debug!("Skipping zero-byte file {}", entry.relative_name);
    }

    (entries, empty.into_iter().map(|e| e.relative_name).collect())
}

/// Map planned entries to blob declarations for `target`.
pub fn build_upload_specs(entries: &[FileEntry], target: &UploadTarget) -> Vec<BlobUploadSpec> {
    entries
        .iter()
        .filter(|entry| !entry.is_empty())
        .map(|entry| BlobUploadSpec {
            relative_name: entry.relative_name.clone(),
            absolute_path: entry.absolute_path.clone(),
            size_bytes: entry.size_bytes,
            content_type: content_type_for(Path::new(&entry.relative_name)),
            access_tier: target.access_tier,
            blob_type: target.blob_type,
            container: target.container.clone(),
            account: target.account.clone(),
        })
        .collect()
}
