//! Revision Activator
//!
//! Repoints `index.html` at a previously uploaded revision:
//!
//! 1. Re-list revisions and confirm the requested id exists
//! 2. Remove the current pointer, if there is one
//! 3. Link `index.html` to `<id>.html`
//!
//! Steps 2 and 3 are not atomic; one deploy runs against a directory at a time.

use tracing::{debug, info};

use super::error::DeployError;
use super::manager::RevisionManager;

impl RevisionManager<'_> {
    /// Make `revision_id` the live revision.
    pub async fn activate(&self, revision_id: &str) -> Result<(), DeployError> {
        let revisions = self.revisions().await?;
        if !revisions
            .iter()
            .any(|entry| entry.revision_id() == revision_id)
        {
            return Err(DeployError::RevisionNotFound(revision_id.to_string()));
        }

        let source = self.revision_path(revision_id);
        let destination = self.pointer_path();

        match self.fs.remove_file(&destination).await {
            Ok(()) => debug!("[deploy] Removed previous pointer {}", destination),
            Err(e) if e.is_not_found() => {
                debug!("[deploy] No pointer at {}, first activation", destination)
            }
            Err(e) => return Err(e.into()),
        }

        // A failure here leaves no pointer at all rather than a stale one.
        self.fs.symlink(&source, &destination).await?;
        info!("[deploy] {} -> {}", destination, source);

        self.ui
            .write_line(&format!("Revision activated: {}", revision_id));
        Ok(())
    }
}
