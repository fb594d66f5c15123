use crate::sftp::{join_remote, RemoteFs};

use super::revisions::{POINTER_FILE, REVISION_SUFFIX};
use super::tagging::TagProvider;
use super::ui::Ui;

/// Revision lifecycle for one remote directory over one live session.
///
/// The three collaborators are injected: the remote file primitives, the
/// source of new tags and the display surface for status lines.
pub struct RevisionManager<'a> {
    pub(super) fs: &'a dyn RemoteFs,
    pub(super) tagger: &'a dyn TagProvider,
    pub(super) ui: &'a dyn Ui,
    pub(super) remote_dir: String,
}

impl<'a> RevisionManager<'a> {
    pub fn new(
        fs: &'a dyn RemoteFs,
        tagger: &'a dyn TagProvider,
        ui: &'a dyn Ui,
        remote_dir: impl Into<String>,
    ) -> Self {
        Self {
            fs,
            tagger,
            ui,
            remote_dir: remote_dir.into(),
        }
    }

    /// `<remoteDir>/<id>.html`
    pub(super) fn revision_path(&self, revision_id: &str) -> String {
        join_remote(
            &self.remote_dir,
            &format!("{}{}", revision_id, REVISION_SUFFIX),
        )
    }

    /// `<remoteDir>/index.html`
    pub(super) fn pointer_path(&self) -> String {
        join_remote(&self.remote_dir, POINTER_FILE)
    }
}
