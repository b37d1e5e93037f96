//! russh-backed connection to one device.

use std::path::Path;
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use russh::client::{self, Handle};
use russh::keys::PublicKey;
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::channel::PtyChannel;
use crate::error::{ChannelError, Result, TransportError};

/// Slot the handler fills when it refuses a host key.
type Rejection = Arc<Mutex<Option<TransportError>>>;

/// An authenticated SSH connection to one device.
pub struct SshTransport {
    handle: Handle<DeviceHandler>,
    config: SshConfig,
}

impl SshTransport {
    /// Connect and log in.
    ///
    /// TCP connect plus key exchange, and then authentication, are each
    /// bounded by `config.timeout`.
    pub async fn connect(config: SshConfig) -> Result<Self> {
        let rejection = Rejection::default();
        let handler = DeviceHandler {
            host: config.host.clone(),
            port: config.port,
            policy: config.host_key_verification,
            known_hosts: config.known_hosts_path.clone(),
            rejection: Arc::clone(&rejection),
        };
        let russh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..client::Config::default()
        });

        debug!("connecting to {}", config.socket_addr());
        let connecting = client::connect(russh_config, (config.host.as_str(), config.port), handler);
        let outcome = tokio::time::timeout(config.timeout, connecting)
            .await
            .map_err(|_| TransportError::Timeout(config.timeout))?;

        let mut handle = match outcome {
            Ok(handle) => handle,
            Err(e) => {
                // russh reports a refused key generically; the handler knows why.
                let refused = rejection.lock().ok().and_then(|mut slot| slot.take());
                return Err(match (refused, e) {
                    (Some(reason), _) => reason,
                    (None, russh::Error::IO(source)) => TransportError::ConnectionFailed {
                        host: config.host.clone(),
                        port: config.port,
                        source,
                    },
                    (None, other) => TransportError::Ssh(other),
                }
                .into());
            }
        };

        tokio::time::timeout(config.timeout, login(&mut handle, &config))
            .await
            .map_err(|_| TransportError::Timeout(config.timeout))??;

        Ok(Self { handle, config })
    }

    /// Open an interactive shell with a PTY sized from the config.
    pub async fn open_shell(&self) -> Result<PtyChannel> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|_| ChannelError::PtyOpenFailed)?;

        let (width, height) = (self.config.terminal_width, self.config.terminal_height);
        channel
            .request_pty(true, "xterm", width, height, 0, 0, &[])
            .await
            .map_err(|_| ChannelError::PtyOpenFailed)?;
        channel
            .request_shell(true)
            .await
            .map_err(|_| ChannelError::ShellRequestFailed)?;

        Ok(PtyChannel::new(channel))
    }

    pub async fn close(self) -> Result<()> {
        self.handle
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(TransportError::Ssh)?;
        Ok(())
    }
}

async fn login(handle: &mut Handle<DeviceHandler>, config: &SshConfig) -> Result<()> {
    let user = config.username.as_str();
    let accepted = match &config.auth {
        AuthMethod::Password(secret) => handle
            .authenticate_password(user, secret.expose_secret())
            .await
            .map_err(TransportError::Ssh)?
            .success(),
        AuthMethod::None => handle
            .authenticate_none(user)
            .await
            .map_err(TransportError::Ssh)?
            .success(),
    };

    if accepted {
        debug!("{}: logged in as {}", config.host, user);
        Ok(())
    } else {
        Err(TransportError::AuthenticationFailed {
            user: user.to_string(),
        }
        .into())
    }
}

/// `Ok(true)` when known_hosts has a matching key, `Ok(false)` when the
/// host is not listed.
fn lookup_known_host(
    host: &str,
    port: u16,
    key: &PublicKey,
    file: Option<&Path>,
) -> std::result::Result<bool, TransportError> {
    let found = match file {
        Some(path) => russh::keys::check_known_hosts_path(host, port, key, path),
        None => russh::keys::check_known_hosts(host, port, key),
    };
    found.map_err(|e| match e {
        russh::keys::Error::KeyChanged { line } => TransportError::HostKeyChanged {
            host: host.to_string(),
            port,
            line,
        },
        other => TransportError::KnownHosts(other.to_string()),
    })
}

fn remember_known_host(
    host: &str,
    port: u16,
    key: &PublicKey,
    file: Option<&Path>,
) -> std::result::Result<(), TransportError> {
    let written = match file {
        Some(path) => russh::keys::known_hosts::learn_known_hosts_path(host, port, key, path),
        None => russh::keys::known_hosts::learn_known_hosts(host, port, key),
    };
    written.map_err(|e| TransportError::KnownHosts(e.to_string()))
}

struct DeviceHandler {
    host: String,
    port: u16,
    policy: HostKeyVerification,
    known_hosts: Option<std::path::PathBuf>,
    rejection: Rejection,
}

impl DeviceHandler {
    fn refuse(&self, reason: TransportError) -> bool {
        warn!("{}: host key refused: {}", self.host, reason);
        if let Ok(mut slot) = self.rejection.lock() {
            *slot = Some(reason);
        }
        false
    }

    fn verify(&self, key: &PublicKey) -> bool {
        if self.policy == HostKeyVerification::Disabled {
            return true;
        }
        let file = self.known_hosts.as_deref();
        match (self.policy, lookup_known_host(&self.host, self.port, key, file)) {
            (_, Ok(true)) => true,
            (HostKeyVerification::AcceptNew, Ok(false)) => {
                if let Err(e) = remember_known_host(&self.host, self.port, key, file) {
                    warn!("{}: could not record host key: {}", self.host, e);
                }
                true
            }
            (_, Ok(false)) => self.refuse(TransportError::HostKeyUnknown {
                host: self.host.clone(),
                port: self.port,
            }),
            (_, Err(reason)) => self.refuse(reason),
        }
    }
}

impl client::Handler for DeviceHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, key: &PublicKey) -> std::result::Result<bool, Self::Error> {
        Ok(self.verify(key))
    }
}
