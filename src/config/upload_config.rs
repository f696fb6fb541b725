use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::env_vars::expand_path;
use crate::constants::{DEFAULT_WORKERS_PER_CORE, WEB_CONTAINER};
use crate::error::StagingError;
use crate::models::{AccessTier, ArchivePolicy, BlobType, UploadTarget};

fn default_version() -> String {
    "1.0".to_string()
}

fn default_workers_per_core() -> usize {
    DEFAULT_WORKERS_PER_CORE
}

/// Settings for one upload, loadable from YAML and overridable from the
/// command line.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UploadConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Local file, folder or archive. `$VAR`, `${VAR}` and `%VAR%` are expanded.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub container: String,
    #[serde(default)]
    pub extract: bool,
    #[serde(default)]
    pub access_tier: Option<AccessTier>,
    #[serde(default)]
    pub blob_type: BlobType,
    #[serde(default = "default_workers_per_core")]
    pub workers_per_core: usize,
    /// Upload into the static website container instead of `container`
    #[serde(default)]
    pub website: bool,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            version: default_version(),
            source: String::new(),
            account: String::new(),
            container: String::new(),
            extract: false,
            access_tier: None,
            blob_type: BlobType::Block,
            workers_per_core: DEFAULT_WORKERS_PER_CORE,
            website: false,
        }
    }
}

impl UploadConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: UploadConfig = serde_yaml::from_str(&content)
            .context("Failed to parse YAML config")?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_yaml_file(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)
            .context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .context(format!("Failed to write config to {}", path.display()))?;

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Template written by `init-config`.
    pub fn example() -> Self {
        UploadConfig {
            source: "./dist".to_string(),
            account: "mystorageaccount".to_string(),
            container: "uploads".to_string(),
            access_tier: Some(AccessTier::Hot),
            ..Default::default()
        }
    }

    pub fn create_default_config_file(path: &Path) -> Result<()> {
        Self::example().save_to_yaml_file(path)
    }

    /// Expand environment variables in the source path.
    pub fn process_environment_variables(&mut self) {
        let expanded = expand_path(&self.source);
        if expanded != self.source {
            debug!("Expanded source path {} to {}", self.source, expanded);
            self.source = expanded;
        }
    }

    /// Presence checks only; the store rejects anything else it dislikes.
    pub fn validate(&self) -> Result<(), StagingError> {
        if self.source.trim().is_empty() {
            return Err(StagingError::InvalidArgument("source path is required".to_string()));
        }
        if self.account.trim().is_empty() {
            return Err(StagingError::InvalidArgument("storage account is required".to_string()));
        }
        if !self.website && self.container.trim().is_empty() {
            return Err(StagingError::InvalidArgument("container is required".to_string()));
        }
        Ok(())
    }

    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(&self.source)
    }

    pub fn archive_policy(&self) -> ArchivePolicy {
        ArchivePolicy::from_extract_flag(self.extract)
    }

    pub fn target(&self) -> UploadTarget {
        let container = if self.website {
            WEB_CONTAINER.to_string()
        } else {
            self.container.clone()
        };

        UploadTarget {
            account: self.account.clone(),
            container,
            access_tier: self.access_tier,
            blob_type: self.blob_type,
        }
    }
}

/// Load the YAML file when one is given, otherwise start from defaults.
pub fn load_config(config_path: Option<&Path>) -> Result<UploadConfig> {
    match config_path {
        Some(path) => UploadConfig::from_yaml_file(path),
        None => {
            debug!("No config file given, using defaults");
            Ok(UploadConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn complete_config() -> UploadConfig {
        UploadConfig {
            source: "./site".to_string(),
            account: "acct".to_string(),
            container: "docs".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_and_load_yaml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload.yaml");

        let mut config = complete_config();
        config.access_tier = Some(AccessTier::Cool);
        config.extract = true;
        config.save_to_yaml_file(&path).unwrap();

        let loaded = UploadConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("upload.yaml");
        std::fs::write(&path, "source: ./dist\naccount: acct\nwebsite: true\n").unwrap();

        let config = UploadConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.workers_per_core, DEFAULT_WORKERS_PER_CORE);
        assert_eq!(config.blob_type, BlobType::Block);
        assert!(config.validate().is_ok());
        assert_eq!(config.target().container, WEB_CONTAINER);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        std::fs::write(&path, "source: [unclosed").unwrap();

        let error = UploadConfig::from_yaml_file(&path).unwrap_err();
        assert!(error.to_string().contains("Failed to parse YAML config"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(complete_config().validate().is_ok());

        let mut config = complete_config();
        config.source = "  ".to_string();
        assert!(matches!(config.validate(), Err(StagingError::InvalidArgument(_))));

        let mut config = complete_config();
        config.account.clear();
        assert!(matches!(config.validate(), Err(StagingError::InvalidArgument(_))));

        let mut config = complete_config();
        config.container.clear();
        assert!(matches!(config.validate(), Err(StagingError::InvalidArgument(_))));
    }

    #[test]
    fn test_process_environment_variables() {
        std::env::set_var("BC_TEST_CONFIG_ROOT", "/srv");
        let mut config = complete_config();
        config.source = "${BC_TEST_CONFIG_ROOT}/site.zip".to_string();
        config.process_environment_variables();

        if cfg!(windows) {
            assert_eq!(config.source, "\\srv\\site.zip");
        } else {
            assert_eq!(config.source, "/srv/site.zip");
        }
        std::env::remove_var("BC_TEST_CONFIG_ROOT");
    }

    #[test]
    fn test_load_config() {
        assert_eq!(load_config(None).unwrap(), UploadConfig::default());
        assert!(load_config(Some(Path::new("/nonexistent/upload.yaml"))).is_err());

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("init.yaml");
        UploadConfig::create_default_config_file(&path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), UploadConfig::example());
    }
}
