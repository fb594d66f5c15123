//! russh-backed SFTP session
//!
//! One `SftpGateway` owns one SSH connection and the SFTP subsystem channel
//! opened on it. A deploy command connects once, issues all of its calls
//! through the same gateway and closes it when the command ends.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use russh::client::{self, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey};
use russh::Disconnect;
use russh_sftp::client::SftpSession;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::error::SftpError;
use super::gateway::{RawEntry, RemoteFs};
use crate::config::{DeployAuth, DeployConfig, SymlinkOrder};

/// Failures while establishing the session. Nothing remote has been touched.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("SSH connection to {host} failed: {reason}")]
    Network { host: String, reason: String },

    #[error("Host key for {0} is not trusted")]
    UntrustedHost(String),

    #[error("Failed to load private key: {0}")]
    KeyLoad(String),

    #[error("Environment variable {0} is not set")]
    MissingSecret(String),

    #[error("Authentication rejected for {0}")]
    AuthRejected(String),

    #[error("SFTP subsystem not available: {0}")]
    SubsystemNotAvailable(String),

    #[error("Timed out connecting to {0}")]
    Timeout(String),
}

/// Client-side handler: only host key verification matters here.
struct DeployClient {
    host: String,
    port: u16,
    strict: bool,
}

impl client::Handler for DeployClient {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        if !self.strict {
            warn!(
                "[sftp] Host key checking disabled, accepting key for {}",
                self.host
            );
            return Ok(true);
        }

        match russh::keys::check_known_hosts(&self.host, self.port, server_public_key) {
            Ok(known) => {
                if !known {
                    warn!("[sftp] {} is not in known_hosts", self.host);
                }
                Ok(known)
            }
            Err(e) => {
                warn!("[sftp] Host key check for {} failed: {}", self.host, e);
                Ok(false)
            }
        }
    }
}

/// Live SFTP session over a single SSH connection.
pub struct SftpGateway {
    handle: Handle<DeployClient>,
    sftp: SftpSession,
    timeout: Duration,
    symlink_order: SymlinkOrder,
    closed: AtomicBool,
}

impl SftpGateway {
    /// Connect, authenticate and open the SFTP subsystem.
    pub async fn connect(config: &DeployConfig) -> Result<Self, ConnectError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let target = config.display_string();

        match tokio::time::timeout(timeout, Self::establish(config)).await {
            Ok(result) => {
                let (handle, sftp) = result?;
                info!("[sftp] Connected to {}", target);
                Ok(Self {
                    handle,
                    sftp,
                    timeout,
                    symlink_order: config.symlink_order,
                    closed: AtomicBool::new(false),
                })
            }
            Err(_) => Err(ConnectError::Timeout(target)),
        }
    }

    async fn establish(
        config: &DeployConfig,
    ) -> Result<(Handle<DeployClient>, SftpSession), ConnectError> {
        let network = |e: russh::Error| ConnectError::Network {
            host: config.host.clone(),
            reason: e.to_string(),
        };

        let ssh_config = Arc::new(client::Config::default());
        let handler = DeployClient {
            host: config.host.clone(),
            port: config.port,
            strict: config.strict_host_key_checking,
        };

        let mut handle = client::connect(ssh_config, (config.host.as_str(), config.port), handler)
            .await
            .map_err(|e| match e {
                russh::Error::UnknownKey => ConnectError::UntrustedHost(config.host.clone()),
                other => network(other),
            })?;

        let authenticated = match &config.auth {
            DeployAuth::Key { passphrase_env, .. } => {
                let passphrase = passphrase_env.as_deref().map(read_secret).transpose()?;
                let key_path = config
                    .auth
                    .resolved_key_path()
                    .ok_or_else(|| ConnectError::KeyLoad("no key path configured".to_string()))?;
                let key = russh::keys::load_secret_key(&key_path, passphrase.as_deref())
                    .map_err(|e| ConnectError::KeyLoad(format!("{}: {}", key_path.display(), e)))?;

                let hash_alg = handle.best_supported_rsa_hash().await.map_err(network)?.flatten();
                handle
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await
                    .map_err(network)?
                    .success()
            }
            DeployAuth::Password { password_env } => {
                let password = read_secret(password_env)?;
                handle
                    .authenticate_password(&config.username, password)
                    .await
                    .map_err(network)?
                    .success()
            }
        };

        if !authenticated {
            return Err(ConnectError::AuthRejected(config.display_string()));
        }
        debug!("[sftp] Authenticated as {}", config.username);

        let channel = handle.channel_open_session().await.map_err(network)?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| ConnectError::SubsystemNotAvailable(e.to_string()))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| ConnectError::SubsystemNotAvailable(e.to_string()))?;

        Ok((handle, sftp))
    }

    /// Run one remote call under the per-call timeout.
    async fn timed<T, F>(&self, call: F) -> Result<T, SftpError>
    where
        F: Future<Output = Result<T, SftpError>> + Send,
    {
        if self.closed.load(Ordering::Acquire) {
            return Err(SftpError::SessionClosed);
        }
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SftpError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// Send SSH_FXP_SYMLINK with the argument order the server expects.
///
/// OpenSSH's sftp-server reads the first string as the link target and the
/// second as the link path, the reverse of the draft protocol.
pub(crate) async fn request_symlink(
    sftp: &SftpSession,
    order: SymlinkOrder,
    target: &str,
    link_path: &str,
) -> Result<(), SftpError> {
    let (first, second) = match order {
        SymlinkOrder::Openssh => (target, link_path),
        SymlinkOrder::Draft => (link_path, target),
    };
    sftp.symlink(first, second)
        .await
        .map_err(|e| SftpError::from_sftp(link_path, e))
}

fn read_secret(var: &str) -> Result<String, ConnectError> {
    std::env::var(var).map_err(|_| ConnectError::MissingSecret(var.to_string()))
}

#[async_trait]
impl RemoteFs for SftpGateway {
    async fn list_dir(&self, path: &str) -> Result<Vec<RawEntry>, SftpError> {
        self.timed(async {
            let entries = self
                .sftp
                .read_dir(path)
                .await
                .map_err(|e| SftpError::from_sftp(path, e))?;

            Ok(entries
                .filter(|entry| {
                    let name = entry.file_name();
                    name != "." && name != ".."
                })
                .map(|entry| {
                    let modified_at = entry
                        .metadata()
                        .mtime
                        .and_then(|secs| DateTime::from_timestamp(i64::from(secs), 0));
                    RawEntry::new(entry.file_name(), modified_at)
                })
                .collect())
        })
        .await
    }

    async fn write_content(&self, path: &str, content: &[u8]) -> Result<(), SftpError> {
        self.timed(async {
            let mut file = self
                .sftp
                .create(path)
                .await
                .map_err(|e| SftpError::from_sftp(path, e))?;

            file.write_all(content)
                .await
                .map_err(|e| SftpError::WriteError(format!("{}: {}", path, e)))?;
            file.flush()
                .await
                .map_err(|e| SftpError::WriteError(format!("{}: {}", path, e)))?;
            // The handle close is what the server acknowledges as completion.
            file.shutdown()
                .await
                .map_err(|e| SftpError::WriteError(format!("{}: {}", path, e)))?;

            debug!("[sftp] Wrote {} bytes to {}", content.len(), path);
            Ok(())
        })
        .await
    }

    async fn remove_file(&self, path: &str) -> Result<(), SftpError> {
        self.timed(async {
            self.sftp
                .remove_file(path)
                .await
                .map_err(|e| SftpError::from_sftp(path, e))
        })
        .await
    }

    async fn symlink(&self, target: &str, link_path: &str) -> Result<(), SftpError> {
        self.timed(request_symlink(&self.sftp, self.symlink_order, target, link_path))
            .await
    }

    async fn close(&self) -> Result<(), SftpError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let sftp_result = tokio::time::timeout(self.timeout, self.sftp.close()).await;
        let disconnect = self
            .handle
            .disconnect(Disconnect::ByApplication, "deploy finished", "en")
            .await;
        info!("[sftp] Session closed");

        match sftp_result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(SftpError::ChannelError(e.to_string())),
            Err(_) => return Err(SftpError::Timeout(self.timeout.as_secs())),
        }
        disconnect.map_err(|e| SftpError::ChannelError(e.to_string()))
    }
}
