use thiserror::Error;

use crate::config::StorageError;
use crate::sftp::{ConnectError, SftpError};

/// Deployment errors.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error("Connection failed: {0}")]
    Connection(#[from] ConnectError),

    #[error("Remote operation failed: {0}")]
    Remote(#[from] SftpError),

    #[error("Revision already uploaded.")]
    DuplicateRevision(String),

    #[error("Revision doesn't exist")]
    RevisionNotFound(String),

    #[error("Invalid tag '{tag}': {reason}")]
    InvalidTag { tag: String, reason: &'static str },

    #[error("Local I/O error: {0}")]
    LocalIo(String),

    #[error("Tagging failed: {0}")]
    Tagging(String),

    #[error("Configuration error: {0}")]
    Config(#[from] StorageError),
}

impl DeployError {
    /// Expected outcomes that are reported as a bare message, not a failure trace.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DeployError::DuplicateRevision(_) | DeployError::RevisionNotFound(_)
        )
    }
}
