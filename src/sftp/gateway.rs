//! Remote file primitives
//!
//! `RemoteFs` is the seam between revision management and the transport.
//! The russh-backed [`SftpGateway`](super::SftpGateway) implements it for real
//! hosts; tests substitute an in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::SftpError;

/// A directory entry exactly as the server reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub filename: String,
    /// Modification time, when the server sent one
    pub modified_at: Option<DateTime<Utc>>,
}

impl RawEntry {
    pub fn new(filename: impl Into<String>, modified_at: Option<DateTime<Utc>>) -> Self {
        Self {
            filename: filename.into(),
            modified_at,
        }
    }
}

/// Primitive operations on one live remote session.
///
/// Each call is a single request/response: it completes once, with either
/// the result or the failure, and is never retried.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    /// List the entries of `path`, excluding `.` and `..`.
    async fn list_dir(&self, path: &str) -> Result<Vec<RawEntry>, SftpError>;

    /// Replace the contents of `path` with `content`.
    ///
    /// Resolves after the server has acknowledged the final close.
    async fn write_content(&self, path: &str, content: &[u8]) -> Result<(), SftpError>;

    /// Remove `path`. A missing file yields [`SftpError::FileNotFound`].
    async fn remove_file(&self, path: &str) -> Result<(), SftpError>;

    /// Create a symbolic link at `link_path` pointing to `target`.
    async fn symlink(&self, target: &str, link_path: &str) -> Result<(), SftpError>;

    /// Tear down the session. Calling it more than once is a no-op.
    async fn close(&self) -> Result<(), SftpError>;
}

/// Join a configured remote directory and a file name.
///
/// A trailing `/` on the directory is tolerated, the root directory keeps
/// its single slash and an empty directory means the login directory.
pub fn join_remote(dir: &str, name: &str) -> String {
    let trimmed = dir.trim_end_matches('/');
    if trimmed.is_empty() {
        if dir.starts_with('/') {
            format!("/{}", name)
        } else {
            name.to_string()
        }
    } else {
        format!("{}/{}", trimmed, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_trailing_slash() {
        assert_eq!(join_remote("remoteDir/", "000000.html"), "remoteDir/000000.html");
        assert_eq!(join_remote("remoteDir", "000000.html"), "remoteDir/000000.html");
        assert_eq!(join_remote("/var/www//", "index.html"), "/var/www/index.html");
    }

    #[test]
    fn test_join_root_and_empty() {
        assert_eq!(join_remote("/", "index.html"), "/index.html");
        assert_eq!(join_remote("", "index.html"), "index.html");
    }
}
