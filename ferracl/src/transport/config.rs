//! Connection settings and login credentials.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// What to do with a device's host key; `host_key_verification` in job files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKeyVerification {
    /// Only hosts already in known_hosts, with the recorded key.
    Strict,

    /// First contact records the key; a changed key is refused.
    #[default]
    AcceptNew,

    /// No checking at all.
    Disabled,
}

/// Everything needed to reach and log in to one device.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Hostname or address, as written in the inventory.
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,

    /// Connect timeout, also used as the default read timeout.
    pub timeout: Duration,

    /// PTY size; wide enough that long ACL entries do not wrap.
    pub terminal_width: u32,
    pub terminal_height: u32,

    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file (`~/.ssh/known_hosts` when unset).
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// `host:port`, for logs.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Username and secret collected once per job and reused for every device.
///
/// Cloning shares nothing mutable; the secret never appears in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub secret: SecretString,
}

impl Credential {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: SecretString::from(secret.into()),
        }
    }
}

/// How the transport logs in.
///
/// Network gear in this tool's scope authenticates with the operator's
/// username and password, so only password auth is offered.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No authentication (lab devices only).
    None,

    /// Password authentication. The secret is redacted from `Debug` output.
    Password(SecretString),
}
