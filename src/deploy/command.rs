//! Top-level deploy commands
//!
//! Each command runs over one session and the session is closed afterwards,
//! whether the command succeeded or not.

use tracing::{info, warn};

use super::error::DeployError;
use super::manager::RevisionManager;
use super::tagging::TagProvider;
use super::ui::Ui;
use crate::sftp::RemoteFs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Report all revisions, newest first
    List,
    /// Upload a new revision, optionally activating it in the same session
    Upload { content: Vec<u8>, activate: bool },
    /// Point `index.html` at an existing revision
    Activate { revision_id: String },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::List => "list",
            Command::Upload { .. } => "upload",
            Command::Activate { .. } => "activate",
        }
    }
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Listed(Vec<String>),
    Uploaded { revision_id: String, activated: bool },
    Activated(String),
}

/// Run `command` against `fs` and close the session afterwards.
///
/// A failure to close is logged but never replaces the command's result.
pub async fn execute(
    command: Command,
    fs: &dyn RemoteFs,
    tagger: &dyn TagProvider,
    ui: &dyn Ui,
    remote_dir: &str,
) -> Result<CommandOutput, DeployError> {
    let name = command.name();
    let manager = RevisionManager::new(fs, tagger, ui, remote_dir);

    let result = run(&manager, command).await;

    if let Err(e) = fs.close().await {
        warn!("[deploy] Failed to close session after {}: {}", name, e);
    }

    match &result {
        Ok(_) => info!("[deploy] {} finished", name),
        Err(e) => info!("[deploy] {} failed: {}", name, e),
    }
    result
}

async fn run(manager: &RevisionManager<'_>, command: Command) -> Result<CommandOutput, DeployError> {
    match command {
        Command::List => {
            let revisions = manager.list().await?;
            Ok(CommandOutput::Listed(
                revisions
                    .iter()
                    .map(|entry| entry.revision_id().to_string())
                    .collect(),
            ))
        }
        Command::Upload { content, activate } => {
            let revision_id = manager.upload(&content).await?;
            if activate {
                manager.activate(&revision_id).await?;
            }
            Ok(CommandOutput::Uploaded {
                revision_id,
                activated: activate,
            })
        }
        Command::Activate { revision_id } => {
            manager.activate(&revision_id).await?;
            Ok(CommandOutput::Activated(revision_id))
        }
    }
}
