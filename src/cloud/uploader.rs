use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cloud::store::{BlobHandle, BlobStore};
use crate::constants::{DEFAULT_WORKERS_PER_CORE, UPLOAD_PROGRESS_INTERVAL_SECS};
use crate::error::{BlobFailure, UploadError};
use crate::models::BlobUploadSpec;

/// Degree of upload concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub concurrency: usize,
}

impl UploadOptions {
    /// `workers_per_core` uploads in flight for every available CPU core.
    pub fn from_workers_per_core(workers_per_core: usize) -> Self {
        UploadOptions {
            concurrency: std::cmp::max(1, workers_per_core.saturating_mul(num_cpus::get())),
        }
    }
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self::from_workers_per_core(DEFAULT_WORKERS_PER_CORE)
    }
}

/// Outcome of a fully successful upload run.
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    pub uploaded: Vec<BlobHandle>,
    pub bytes_uploaded: u64,
}

enum Outcome {
    Uploaded(BlobHandle),
    Failed(BlobFailure),
    Cancelled,
}

/// Upload every spec with bounded concurrency.
///
/// Blobs are independent: a failure is recorded and the remaining uploads
/// carry on. Once `cancel` fires no new upload starts; uploads already in
/// flight run to completion. Every failed blob is reported, not just the first.
pub async fn upload_all<S>(
    store: &S,
    specs: Vec<BlobUploadSpec>,
    options: &UploadOptions,
    cancel: CancellationToken,
) -> Result<UploadReport, UploadError>
where
    S: BlobStore + ?Sized,
{
    let start = Instant::now();
    let total_bytes: u64 = specs.iter().map(|spec| spec.size_bytes).sum();
    let bytes_uploaded = Arc::new(AtomicU64::new(0));
    let concurrency = std::cmp::max(1, options.concurrency);

    info!(
        "Uploading {} blobs ({} bytes) to {} store with concurrency {}",
        specs.len(),
        total_bytes,
        store.store_name(),
        concurrency
    );

    let reporter_stop = CancellationToken::new();
    let reporter = tokio::spawn(report_progress(
        Arc::clone(&bytes_uploaded),
        total_bytes,
        reporter_stop.clone(),
    ));

    let outcomes: Vec<Outcome> = stream::iter(specs.iter())
        .map(|spec| {
            let cancel = cancel.clone();
            let bytes_uploaded = Arc::clone(&bytes_uploaded);
            async move {
                if cancel.is_cancelled() {
                    debug!("Skipping {} after cancellation", spec.relative_name);
                    return Outcome::Cancelled;
                }

                match store.create_or_update_blob(spec).await {
                    Ok(handle) => {
                        bytes_uploaded.fetch_add(spec.size_bytes, Ordering::SeqCst);
                        debug!("Uploaded {}", spec.relative_name);
                        Outcome::Uploaded(handle)
                    }
                    Err(e) => {
                        warn!("Failed to upload {}: {:#}", spec.relative_name, e);
                        Outcome::Failed(BlobFailure {
                            name: spec.relative_name.clone(),
                            reason: format!("{:#}", e),
                        })
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    stop_reporter(reporter, reporter_stop).await;

    let mut report = UploadReport::default();
    let mut failures = Vec::new();
    let mut cancelled = 0;

    for outcome in outcomes {
        match outcome {
            Outcome::Uploaded(handle) => {
                report.bytes_uploaded += handle.size_bytes;
                report.uploaded.push(handle);
            }
            Outcome::Failed(failure) => failures.push(failure),
            Outcome::Cancelled => cancelled += 1,
        }
    }

    if !failures.is_empty() {
        failures.sort_by(|a, b| a.name.cmp(&b.name));
        return Err(UploadError::Failed {
            failures,
            uploaded: report.uploaded.len(),
        });
    }

    if cancelled > 0 {
        return Err(UploadError::Cancelled {
            uploaded: report.uploaded.len(),
            cancelled,
        });
    }

    info!(
        "All {} blobs uploaded successfully: {} bytes in {:?}",
        report.uploaded.len(),
        report.bytes_uploaded,
        start.elapsed()
    );
    Ok(report)
}

async fn stop_reporter(reporter: JoinHandle<()>, stop: CancellationToken) {
    stop.cancel();
    if let Err(e) = reporter.await {
        debug!("Progress reporter ended abnormally: {}", e);
    }
}

async fn report_progress(bytes_uploaded: Arc<AtomicU64>, total_bytes: u64, stop: CancellationToken) {
    let mut last_reported = 0;

    loop {
        tokio::select! {
            _ = stop.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(UPLOAD_PROGRESS_INTERVAL_SECS)) => {}
        }

        let uploaded = bytes_uploaded.load(Ordering::SeqCst);
        if total_bytes > 0 && uploaded != last_reported {
            let percentage = (uploaded as f64 / total_bytes as f64) * 100.0;
            info!("Upload progress: {}/{} bytes ({:.1}%)", uploaded, total_bytes, percentage);
            last_reported = uploaded;
        }
    }
}
