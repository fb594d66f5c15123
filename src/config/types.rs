//! Configuration Types
//!
//! Connection and target-directory settings for a deploy, read from JSON.

use std::path::PathBuf;

use serde::Deserialize;

/// Authentication method for the deploy connection
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeployAuth {
    /// SSH key file
    Key {
        /// Path to private key file (`~/` is expanded)
        key_path: String,
        /// Environment variable holding the key passphrase, if the key is encrypted
        #[serde(default)]
        passphrase_env: Option<String>,
    },
    /// Password read from an environment variable
    Password { password_env: String },
}

impl DeployAuth {
    /// Key path with a leading `~/` resolved against the home directory.
    pub fn resolved_key_path(&self) -> Option<PathBuf> {
        match self {
            DeployAuth::Key { key_path, .. } => Some(expand_home(key_path)),
            DeployAuth::Password { .. } => None,
        }
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

/// Argument order for SSH_FXP_SYMLINK requests.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymlinkOrder {
    /// Target first, then link path (OpenSSH sftp-server)
    #[default]
    Openssh,
    /// Link path first, then target (draft-ietf-secsh-filexfer)
    Draft,
}

/// Everything needed to reach one remote revision directory.
#[derive(Debug, Clone, Deserialize)]
pub struct DeployConfig {
    /// SSH host
    pub host: String,

    /// SSH port (default 22)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SSH username
    pub username: String,

    /// Authentication method
    pub auth: DeployAuth,

    /// Directory holding `<tag>.html` revisions and the `index.html` pointer
    pub remote_dir: String,

    /// Per-call timeout for remote operations
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Verify the host key against `~/.ssh/known_hosts`
    #[serde(default = "default_strict")]
    pub strict_host_key_checking: bool,

    /// How the server expects symlink arguments
    #[serde(default)]
    pub symlink_order: SymlinkOrder,
}

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_strict() -> bool {
    true
}

impl DeployConfig {
    /// Create a key-authenticated config with default options
    pub fn new_key(
        host: impl Into<String>,
        username: impl Into<String>,
        key_path: impl Into<String>,
        remote_dir: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: default_port(),
            username: username.into(),
            auth: DeployAuth::Key {
                key_path: key_path.into(),
                passphrase_env: None,
            },
            remote_dir: remote_dir.into(),
            timeout_secs: default_timeout_secs(),
            strict_host_key_checking: default_strict(),
            symlink_order: SymlinkOrder::default(),
        }
    }

    /// Get display string (user@host:port)
    pub fn display_string(&self) -> String {
        if self.port == 22 {
            format!("{}@{}", self.username, self.host)
        } else {
            format!("{}@{}:{}", self.username, self.host, self.port)
        }
    }

    /// A relative directory resolves against the login directory, but the
    /// pointer's target is then resolved against the pointer's own directory.
    pub fn remote_dir_is_relative(&self) -> bool {
        !self.remote_dir.starts_with('/')
    }

    /// Check the fields a connection cannot work without.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.username.trim().is_empty() {
            return Err("username must not be empty".to_string());
        }
        if self.remote_dir.trim().is_empty() {
            return Err("remote_dir must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than zero".to_string());
        }
        match &self.auth {
            DeployAuth::Key { key_path, .. } if key_path.trim().is_empty() => {
                Err("auth.key_path must not be empty".to_string())
            }
            DeployAuth::Password { password_env } if password_env.trim().is_empty() => {
                Err("auth.password_env must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_string() {
        let mut config = DeployConfig::new_key("example.com", "deploy", "~/.ssh/id_ed25519", "www/");
        assert_eq!(config.display_string(), "deploy@example.com");

        config.port = 2222;
        assert_eq!(config.display_string(), "deploy@example.com:2222");
    }

    #[test]
    fn test_defaults_from_json() {
        let config: DeployConfig = serde_json::from_str(
            r#"{
                "host": "host",
                "username": "username",
                "remote_dir": "remoteDir/",
                "auth": { "type": "key", "key_path": "./privateKeyFile.txt" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.port, 22);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.strict_host_key_checking);
        assert_eq!(config.symlink_order, SymlinkOrder::Openssh);
        assert_eq!(
            config.auth,
            DeployAuth::Key {
                key_path: "./privateKeyFile.txt".into(),
                passphrase_env: None,
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_symlink_order_from_json() {
        let order: SymlinkOrder = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(order, SymlinkOrder::Draft);
        let order: SymlinkOrder = serde_json::from_str("\"openssh\"").unwrap();
        assert_eq!(order, SymlinkOrder::Openssh);
    }

    #[test]
    fn test_relative_remote_dir_detection() {
        let config = DeployConfig::new_key("host", "user", "key", "remoteDir/");
        assert!(config.remote_dir_is_relative());

        let config = DeployConfig::new_key("host", "user", "key", "/srv/site/");
        assert!(!config.remote_dir_is_relative());
    }

    #[test]
    fn test_password_auth_json() {
        let auth: DeployAuth =
            serde_json::from_str(r#"{ "type": "password", "password_env": "DEPLOY_PW" }"#).unwrap();
        assert_eq!(
            auth,
            DeployAuth::Password {
                password_env: "DEPLOY_PW".into()
            }
        );
        assert!(auth.resolved_key_path().is_none());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = DeployConfig::new_key("host", "user", "key", "dir");
        config.remote_dir = "  ".into();
        assert!(config.validate().unwrap_err().contains("remote_dir"));

        let mut config = DeployConfig::new_key("host", "user", "key", "dir");
        config.timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("timeout_secs"));

        let config = DeployConfig::new_key("", "user", "key", "dir");
        assert!(config.validate().unwrap_err().contains("host"));
    }

    #[test]
    fn test_key_path_expansion() {
        let auth = DeployAuth::Key {
            key_path: "/etc/deploy/key".into(),
            passphrase_env: None,
        };
        assert_eq!(auth.resolved_key_path(), Some(PathBuf::from("/etc/deploy/key")));

        if let Some(home) = dirs::home_dir() {
            let auth = DeployAuth::Key {
                key_path: "~/.ssh/id_ed25519".into(),
                passphrase_env: None,
            };
            assert_eq!(auth.resolved_key_path(), Some(home.join(".ssh/id_ed25519")));
        }
    }
}
