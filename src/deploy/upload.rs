//! Revision Uploader

use tracing::{info, warn};

use super::error::DeployError;
use super::manager::RevisionManager;
use super::tagging::validate_tag;

impl RevisionManager<'_> {
    /// Upload `content` as a new revision and return its id.
    ///
    /// Fails with [`DeployError::DuplicateRevision`] before any write when the
    /// tag is already present. The activation pointer is left untouched.
    pub async fn upload(&self, content: &[u8]) -> Result<String, DeployError> {
        let tag = self.tagger.create_tag()?;
        validate_tag(&tag)?;

        let existing = self.revisions().await?;
        if existing.iter().any(|entry| entry.revision_id() == tag) {
            warn!("[deploy] Revision {} is already uploaded", tag);
            return Err(DeployError::DuplicateRevision(tag));
        }

        let path = self.revision_path(&tag);
        info!("[deploy] Uploading {} bytes to {}", content.len(), path);
        self.fs.write_content(&path, content).await?;
        info!("[deploy] Upload complete: {}", tag);

        Ok(tag)
    }
}
