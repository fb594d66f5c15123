//! Tagging providers
//!
//! A tag becomes the stem of a revision file (`<tag>.html`). Providers make no
//! uniqueness promise; the uploader rejects tags that are already deployed.

use std::path::PathBuf;
use std::process::Command;

use chrono::Utc;
use tracing::debug;

use super::error::DeployError;
use super::revisions::{POINTER_FILE, REVISION_SUFFIX};

/// Supplies the tag for a new revision.
pub trait TagProvider: Send + Sync {
    fn create_tag(&self) -> Result<String, DeployError>;
}

/// Short commit hash of `HEAD` in a git working tree.
#[derive(Debug, Clone)]
pub struct GitShaTagger {
    repo_dir: PathBuf,
    length: usize,
}

impl GitShaTagger {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            length: 7,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl TagProvider for GitShaTagger {
    fn create_tag(&self) -> Result<String, DeployError> {
        let output = Command::new("git")
            .arg("rev-parse")
            .arg(format!("--short={}", self.length))
            .arg("HEAD")
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| DeployError::Tagging(format!("failed to run git: {}", e)))?;

        if !output.status.success() {
            return Err(DeployError::Tagging(format!(
                "git rev-parse failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("[deploy] Tag from git HEAD: {}", sha);
        validate_tag(&sha)?;
        Ok(sha)
    }
}

/// UTC timestamp, second resolution (`20240131235959`).
#[derive(Debug, Clone, Default)]
pub struct TimestampTagger;

impl TagProvider for TimestampTagger {
    fn create_tag(&self) -> Result<String, DeployError> {
        Ok(Utc::now().format("%Y%m%d%H%M%S").to_string())
    }
}

/// A tag chosen up front by the caller.
#[derive(Debug, Clone)]
pub struct FixedTagger(String);

impl FixedTagger {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl TagProvider for FixedTagger {
    fn create_tag(&self) -> Result<String, DeployError> {
        validate_tag(&self.0)?;
        Ok(self.0.clone())
    }
}

/// Reject tags that cannot safely name a revision file.
pub fn validate_tag(tag: &str) -> Result<(), DeployError> {
    let reason = if tag.is_empty() {
        Some("tag is empty")
    } else if tag.contains('/') || tag.contains('\\') {
        Some("tag contains a path separator")
    } else if tag.starts_with('.') {
        Some("tag starts with '.'")
    } else if format!("{}{}", tag, REVISION_SUFFIX) == POINTER_FILE {
        Some("tag collides with the activation pointer")
    } else if tag.chars().any(char::is_control) {
        Some("tag contains control characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DeployError::InvalidTag {
            tag: tag.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
