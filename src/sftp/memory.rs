//! In-memory `RemoteFs` that records every call.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::error::SftpError;
use super::gateway::{RawEntry, RemoteFs};

/// A call observed by [`MemoryFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    List(String),
    Write { path: String, content: Vec<u8> },
    Remove(String),
    Symlink { target: String, link_path: String },
    Close,
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Link(String),
}

#[derive(Default)]
struct Inner {
    /// Entries returned by `list_dir`, in listing order
    listing: Vec<RawEntry>,
    /// Full path -> node
    nodes: BTreeMap<String, Node>,
    calls: Vec<FsCall>,
    fail_list: Option<String>,
    fail_remove: Option<String>,
    fail_symlink: Option<String>,
    fail_close: bool,
}

/// Fake remote directory for exercising revision logic without a server.
#[derive(Default)]
pub struct MemoryFs {
    inner: Mutex<Inner>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry to the listing (as the server would order it).
    pub fn with_entry(self, filename: &str, modified_at: Option<DateTime<Utc>>) -> Self {
        self.inner.lock().listing.push(RawEntry::new(filename, modified_at));
        self
    }

    /// Pre-create a node at a full path (e.g. an existing pointer).
    pub fn with_link(self, link_path: &str, target: &str) -> Self {
        self.inner
            .lock()
            .nodes
            .insert(link_path.to_string(), Node::Link(target.to_string()));
        self
    }

    pub fn failing_list(self, reason: &str) -> Self {
        self.inner.lock().fail_list = Some(reason.to_string());
        self
    }

    pub fn failing_remove(self, reason: &str) -> Self {
        self.inner.lock().fail_remove = Some(reason.to_string());
        self
    }

    pub fn failing_symlink(self, reason: &str) -> Self {
        self.inner.lock().fail_symlink = Some(reason.to_string());
        self
    }

    pub fn failing_close(self) -> Self {
        self.inner.lock().fail_close = true;
        self
    }

    pub fn calls(&self) -> Vec<FsCall> {
        self.inner.lock().calls.clone()
    }

    pub fn link_target(&self, link_path: &str) -> Option<String> {
        match self.inner.lock().nodes.get(link_path) {
            Some(Node::Link(target)) => Some(target.clone()),
            _ => None,
        }
    }

    pub fn file_content(&self, path: &str) -> Option<Vec<u8>> {
        match self.inner.lock().nodes.get(path) {
            Some(Node::File(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl RemoteFs for MemoryFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<RawEntry>, SftpError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FsCall::List(path.to_string()));
        if let Some(reason) = &inner.fail_list {
            return Err(SftpError::PermissionDenied(reason.clone()));
        }
        Ok(inner.listing.clone())
    }

    async fn write_content(&self, path: &str, content: &[u8]) -> Result<(), SftpError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FsCall::Write {
            path: path.to_string(),
            content: content.to_vec(),
        });
        inner.nodes.insert(path.to_string(), Node::File(content.to_vec()));

        let filename = path.rsplit('/').next().unwrap_or(path);
        if !inner.listing.iter().any(|entry| entry.filename == filename) {
            inner.listing.push(RawEntry::new(filename, Some(Utc::now())));
        }
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<(), SftpError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FsCall::Remove(path.to_string()));
        if let Some(reason) = &inner.fail_remove {
            return Err(SftpError::PermissionDenied(reason.clone()));
        }
        match inner.nodes.remove(path) {
            Some(_) => Ok(()),
            None => Err(SftpError::FileNotFound(path.to_string())),
        }
    }

    async fn symlink(&self, target: &str, link_path: &str) -> Result<(), SftpError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FsCall::Symlink {
            target: target.to_string(),
            link_path: link_path.to_string(),
        });
        if let Some(reason) = &inner.fail_symlink {
            return Err(SftpError::PermissionDenied(reason.clone()));
        }
        if inner.nodes.contains_key(link_path) {
            return Err(SftpError::ProtocolError(format!("{} already exists", link_path)));
        }
        inner
            .nodes
            .insert(link_path.to_string(), Node::Link(target.to_string()));
        Ok(())
    }

    async fn close(&self) -> Result<(), SftpError> {
        let mut inner = self.inner.lock();
        inner.calls.push(FsCall::Close);
        if inner.fail_close {
            return Err(SftpError::ChannelError("connection reset".to_string()));
        }
        Ok(())
    }
}
