use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::UploadConfig;
use crate::constants::DEFAULT_CONFIG_NAME;
use crate::models::{AccessTier, BlobType};

/// Command-line arguments for blob-collection.
///
/// Uploads a local file, folder or archive into an Azure Blob Storage
/// container. Settings can come from a YAML file; flags given on the command
/// line win over the file.
#[derive(Parser, Debug)]
#[clap(
    name = "blob-collection",
    about = "Upload a file, folder or archive to Azure Blob Storage"
)]
pub struct Args {
    /// Verbose logging
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration YAML file
    #[clap(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a source into a blob container
    Upload(UploadOpts),

    /// Show which blobs a source would produce, without uploading
    Plan {
        /// Local file, folder or archive
        #[clap(short, long)]
        source: PathBuf,

        /// Extract archives before listing
        #[clap(long)]
        extract: bool,

        /// Print the plan as JSON; local paths are omitted for extracted
        /// archives since the staging directory is gone by then
        #[clap(long)]
        json: bool,
    },

    /// Create a configuration file template
    InitConfig {
        /// Path to output configuration file
        #[clap(default_value = DEFAULT_CONFIG_NAME)]
        path: PathBuf,
    },
}

/// Options for the upload subcommand. Every option may also come from the
/// configuration file.
#[derive(ClapArgs, Debug, Default)]
pub struct UploadOpts {
    /// Local file, folder or archive to upload
    #[clap(short, long)]
    pub source: Option<String>,

    /// Storage account name
    #[clap(short, long)]
    pub account: Option<String>,

    /// Destination container
    #[clap(long)]
    pub container: Option<String>,

    /// Extract archives and upload their contents
    #[clap(long)]
    pub extract: bool,

    /// Access tier for uploaded blobs (hot, cool, archive)
    #[clap(long)]
    pub tier: Option<AccessTier>,

    /// Blob type; only block blobs are supported by Azure uploads
    #[clap(long)]
    pub blob_type: Option<BlobType>,

    /// Concurrent uploads per CPU core
    #[clap(long)]
    pub workers_per_core: Option<usize>,

    /// Upload into the static website container
    #[clap(long)]
    pub website: bool,
}

impl UploadOpts {
    /// Layer command-line values over `config`.
    pub fn apply_to(&self, config: &mut UploadConfig) {
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(account) = &self.account {
            config.account = account.clone();
        }
        if let Some(container) = &self.container {
            config.container = container.clone();
        }
        if self.extract {
            config.extract = true;
        }
        if let Some(tier) = self.tier {
            config.access_tier = Some(tier);
        }
        if let Some(blob_type) = self.blob_type {
            config.blob_type = blob_type;
        }
        if let Some(workers) = self.workers_per_core {
            config.workers_per_core = workers;
        }
        if self.website {
            config.website = true;
        }
    }
}
