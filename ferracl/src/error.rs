//! Error types for ferracl.
//!
//! Each layer has its own enum; [`Error`] wraps them all and displays the
//! inner message unchanged, so device failures read the same in logs and in
//! the job report.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Job(#[from] JobError),
}

impl Error {
    /// Whether the device rejected the supplied credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::AuthenticationFailed { .. })
        )
    }

    /// Whether the operation gave up waiting on the device.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::Timeout(_))
                | Error::Channel(ChannelError::PatternTimeout(_))
        )
    }
}

/// Connecting and logging in.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot reach {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("ssh: {0}")]
    Ssh(russh::Error),

    #[error("authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// Strict host key checking and the host has no known_hosts entry.
    #[error("no known_hosts entry for {host}:{port}")]
    HostKeyUnknown { host: String, port: u16 },

    #[error("host key for {host}:{port} does not match known_hosts line {line}")]
    HostKeyChanged { host: String, port: u16, line: usize },

    #[error("known_hosts: {0}")]
    KnownHosts(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// The interactive shell on an open connection.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("could not open a PTY session")]
    PtyOpenFailed,

    #[error("device refused the shell request")]
    ShellRequestFailed,

    /// No prompt arrived in time.
    #[error("no prompt within {0:?}")]
    PatternTimeout(Duration),

    #[error("shell closed by device")]
    Closed,

    #[error("ssh channel: {0}")]
    Ssh(russh::Error),

    #[error("bad prompt pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// CLI session handling.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("session is not open")]
    NotConnected,

    #[error("session is already open")]
    AlreadyConnected,

    /// The device answered with one of its error markers.
    #[error("'{command}' rejected: {message}")]
    CommandFailed { command: String, message: String },

    #[error("prompt did not change to '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    #[error("invalid session settings: {message}")]
    InvalidConfig { message: String },

    #[error("unrecognised prompt '{prompt}'")]
    UnknownPrivilege { prompt: String },

    #[error("no way from '{from}' mode to '{to}' mode")]
    NoPrivilegePath { from: String, to: String },
}

#[derive(Error, Debug)]
pub enum PlatformError {
    /// The inventory names a device type with no command sequencer.
    #[error("unsupported device type '{name}'")]
    Unsupported { name: String },
}

/// Loading the job file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{path}: expected a .yaml, .yml, .toml or .json job file")]
    UnsupportedFormat { path: PathBuf },

    #[error("'{field}' {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Whole-job failures. All but `Export` stop the job before any device
/// is changed.
#[derive(Error, Debug)]
pub enum JobError {
    #[error("SSH timed out on {host}")]
    CanaryTimeout { host: String },

    /// The canary failed for a reason other than a bad credential.
    #[error("credential check against {host} failed: {source}")]
    Canary {
        host: String,
        #[source]
        source: Box<Error>,
    },

    #[error("prompt: {0}")]
    Prompt(String),

    #[error("cannot export results to {path}: {message}")]
    Export { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
