use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use blob_collection::cli::{Args, Commands, UploadOpts};
use blob_collection::cloud::{upload_all, AzureBlobStore, UploadOptions};
use blob_collection::config::{load_config, UploadConfig};
use blob_collection::models::ArchivePolicy;
use blob_collection::plan::{build_upload_specs, produce_upload_plan, with_upload_plan};

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose)?;

    match &args.command {
        Commands::InitConfig { path } => init_config(path),
        Commands::Plan { source, extract, json } => show_plan(source, *extract, *json),
        Commands::Upload(opts) => run_upload(args.config.as_deref(), opts),
    }
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ).context("Failed to initialize logger")?;
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    info!("Creating configuration file at {}", path.display());
    UploadConfig::create_default_config_file(path)?;
    info!("Configuration created successfully");
    Ok(())
}

fn show_plan(source: &Path, extract: bool, json: bool) -> Result<()> {
    let plan = produce_upload_plan(source, ArchivePolicy::from_extract_flag(extract))
        .context(format!("Failed to plan upload of {}", source.display()))?;

    if json {
        let output = serde_json::to_string_pretty(&plan.summary()).context("Failed to serialize upload plan")?;
        println!("{}", output);
        return Ok(());
    }

    for entry in &plan.entries {
        println!("{:>12}  {}", entry.size_bytes, entry.relative_name);
    }
    for name in &plan.skipped_empty {
        println!("{:>12}  {} (empty, skipped)", 0, name);
    }
    println!("{} blobs, {} bytes", plan.entries.len(), plan.total_bytes());
    Ok(())
}

/// Merge file and command-line settings, validate, then upload while the
/// source is staged.
fn load_upload_config(config_path: Option<&Path>, opts: &UploadOpts) -> Result<UploadConfig> {
    let mut config = load_config(config_path)?;
    opts.apply_to(&mut config);
    config.process_environment_variables();
    config.validate().context("Invalid upload configuration")?;
    Ok(config)
}

fn run_upload(config_path: Option<&Path>, opts: &UploadOpts) -> Result<()> {
    let config = load_upload_config(config_path, opts)?;
    let target = config.target();
    let options = UploadOptions::from_workers_per_core(config.workers_per_core);

    info!(
        "Uploading {} to {}/{}",
        config.source, target.account, target.container
    );

    let runtime = Runtime::new().context("Failed to create Tokio runtime")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight uploads and starting no new ones");
            interrupt.cancel();
        }
    });

    let store = AzureBlobStore::new();
    let (plan, result) = with_upload_plan(&config.source_path(), config.archive_policy(), |plan| {
        let specs = build_upload_specs(&plan.entries, &target);
        Ok(runtime.block_on(upload_all(&store, specs, &options, cancel.clone())))
    })
    .context(format!("Failed to prepare {} for upload", config.source))?;

    let report = result.context("Upload did not complete")?;

    if !plan.skipped_empty.is_empty() {
        info!("Skipped {} empty files", plan.skipped_empty.len());
    }
    for handle in &report.uploaded {
        info!("  {}", handle.url());
    }
    info!(
        "Uploaded {} blobs ({} bytes) to {}/{}",
        report.uploaded.len(),
        report.bytes_uploaded,
        target.account,
        target.container
    );
    Ok(())
}
