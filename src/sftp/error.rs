//! SFTP error types

use thiserror::Error;

/// Failures of a single remote file operation.
///
/// Every variant is fatal to the command that issued the call; none of them
/// are retried by the gateway.
#[derive(Debug, Error)]
pub enum SftpError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Channel error: {0}")]
    ChannelError(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Write error: {0}")]
    WriteError(String),

    #[error("Remote call timed out after {0}s")]
    Timeout(u64),

    #[error("SFTP session already closed")]
    SessionClosed,
}

impl SftpError {
    /// Translate a russh-sftp failure on `path` into a gateway error.
    ///
    /// `NoSuchFile` is kept distinct so callers can branch on absence.
    pub(crate) fn from_sftp(path: &str, err: russh_sftp::client::error::Error) -> Self {
        use russh_sftp::client::error::Error;
        use russh_sftp::protocol::StatusCode;

        match err {
            Error::Status(status) => match status.status_code {
                StatusCode::NoSuchFile => SftpError::FileNotFound(path.to_string()),
                StatusCode::PermissionDenied => SftpError::PermissionDenied(path.to_string()),
                _ => SftpError::ProtocolError(format!(
                    "{}: {} ({:?})",
                    path, status.error_message, status.status_code
                )),
            },
            other => SftpError::ProtocolError(format!("{}: {}", path, other)),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SftpError::FileNotFound(_))
    }
}
