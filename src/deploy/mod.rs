//! Revision Deploy Module
//!
//! Manages the revision lifecycle in one remote directory: list what has been
//! uploaded, upload new content under a fresh tag, and activate a revision by
//! repointing `index.html` at it.
//!
//! Uploading and activating both re-read the directory first, so duplicate
//! tags and unknown revisions are rejected before anything is mutated.

mod activate;
mod command;
mod error;
mod manager;
mod revisions;
mod tagging;
mod upload;
mod ui;

pub use command::{execute, Command, CommandOutput};
pub use error::DeployError;
pub use manager::RevisionManager;
pub use revisions::{format_report, RevisionEntry, POINTER_FILE, REVISION_SUFFIX};
pub use tagging::{validate_tag, FixedTagger, GitShaTagger, TagProvider, TimestampTagger};
pub use ui::{BufferUi, ConsoleUi, Ui};
