//! Configuration Management Module
//!
//! Loads the connection settings and target directory for a deploy from a
//! JSON file. Secrets are never stored in the file: key passphrases and
//! passwords are read from environment variables named by the config.

pub mod storage;
pub mod types;

pub use storage::{config_dir, deploy_config_file, load_config, StorageError};
pub use types::{DeployAuth, DeployConfig, SymlinkOrder};
