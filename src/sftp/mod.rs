//! SFTP Session Gateway
//!
//! Owns the single live connection used by a deploy command and exposes the
//! four primitives revision management is built on: list, write, unlink and
//! symlink.

mod error;
mod gateway;
#[cfg(test)]
pub(crate) mod memory;
mod session;

pub use error::SftpError;
pub use gateway::{join_remote, RawEntry, RemoteFs};
pub use session::{ConnectError, SftpGateway};
