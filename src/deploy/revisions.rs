//! Revision Lister
//!
//! Turns the flat remote directory into an ordered revision history:
//!
//! ```text
//! remoteDir/
//! ├── 3f9c2a1.html   (mtime 12:00)  ─┐
//! ├── 8be01d4.html   (mtime 14:30)   ├─ revisions, newest first: 8be01d4, 3f9c2a1
//! └── index.html  →  8be01d4.html   ─┘  activation pointer, never listed
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::error::DeployError;
use super::manager::RevisionManager;

/// Name of the activation pointer symlink.
pub const POINTER_FILE: &str = "index.html";

/// Extension every revision file carries.
pub const REVISION_SUFFIX: &str = ".html";

/// One uploaded revision as found in the remote directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionEntry {
    pub filename: String,
    pub modified_at: Option<DateTime<Utc>>,
}

impl RevisionEntry {
    /// Filename with the `.html` suffix stripped
    pub fn revision_id(&self) -> &str {
        self.filename
            .strip_suffix(REVISION_SUFFIX)
            .unwrap_or(&self.filename)
    }
}

/// Render the revision report, newest first.
///
/// The header is followed by a blank line, then the ids one per line, then a
/// blank line; with no revisions the two blank lines follow the header directly.
pub fn format_report(revisions: &[RevisionEntry]) -> (String, String) {
    let header = "\nFound the following revisions:\n".to_string();
    let ids: Vec<&str> = revisions.iter().map(RevisionEntry::revision_id).collect();
    (header, format!("{}\n", ids.join("\n")))
}

impl RevisionManager<'_> {
    /// Enumerate revisions, newest first. Produces no display output.
    pub async fn revisions(&self) -> Result<Vec<RevisionEntry>, DeployError> {
        let raw = self.fs.list_dir(&self.remote_dir).await?;

        let mut revisions: Vec<RevisionEntry> = raw
            .into_iter()
            .filter(|entry| {
                if entry.filename == POINTER_FILE {
                    return false;
                }
                if !entry.filename.ends_with(REVISION_SUFFIX) {
                    debug!("[deploy] Ignoring non-revision entry {}", entry.filename);
                    return false;
                }
                true
            })
            .map(|entry| RevisionEntry {
                filename: entry.filename,
                modified_at: entry.modified_at,
            })
            .collect();

        // Stable: equal mtimes keep the server's listing order.
        revisions.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));

        debug!(
            "[deploy] {} revision(s) in {}",
            revisions.len(),
            self.remote_dir
        );
        Ok(revisions)
    }

    /// Enumerate revisions and write the report to the display surface.
    pub async fn list(&self) -> Result<Vec<RevisionEntry>, DeployError> {
        let revisions = self.revisions().await?;
        info!("[deploy] Listing {} revision(s)", revisions.len());

        let (header, body) = format_report(&revisions);
        self.ui.write_line(&header);
        self.ui.write_line(&body);

        Ok(revisions)
    }
}
