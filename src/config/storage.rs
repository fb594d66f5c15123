//! Config file location and loading

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::types::DeployConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// `<config_dir>/oxidedeploy`
pub fn config_dir() -> Result<PathBuf, StorageError> {
    dirs::config_dir()
        .map(|dir| dir.join("oxidedeploy"))
        .ok_or(StorageError::NoConfigDir)
}

/// Default location of the deploy config
pub fn deploy_config_file() -> Result<PathBuf, StorageError> {
    Ok(config_dir()?.join("deploy.json"))
}

/// Read, parse and validate a deploy config.
pub fn load_config(path: &Path) -> Result<DeployConfig, StorageError> {
    let raw = std::fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: DeployConfig = serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.validate().map_err(StorageError::Invalid)?;
    if config.remote_dir_is_relative() {
        warn!(
            "[config] remote_dir '{}' is relative; index.html will point at a path relative to itself",
            config.remote_dir
        );
    }
    debug!(
        "[config] Loaded {} -> {}:{}",
        path.display(),
        config.display_string(),
        config.remote_dir
    );

    Ok(config)
}
