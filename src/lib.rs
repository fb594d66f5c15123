//! OxideDeploy
//!
//! Revision-based deploys of a single HTML entry point over SFTP. Each upload
//! lands as `<tag>.html` in the remote directory; activation repoints the
//! `index.html` symlink at one of them.

pub mod config;
pub mod deploy;
pub mod sftp;

pub use config::DeployConfig;
pub use deploy::{execute, Command, CommandOutput, DeployError};
pub use sftp::{RemoteFs, SftpGateway};
