//! Job file: what to change, where, and how hard to push.
//!
//! Accepted as YAML, TOML or JSON, chosen by file extension:
//!
//! ```toml
//! acl_name = "BLOCK_TELNET"
//! acl_lines = """
//! deny tcp any any eq 23
//! permit ip any any
//! """
//! append = false
//! extended = true
//! threads = 8
//! export_result = true
//!
//! [[device_list]]
//! hostname = "sw1.example.net"
//! device_type = "cisco_ios"
//!
//! [[device_list]]
//! hostname = "nx1.example.net"
//! device_type = "cisco_nxos"
//! ```

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::device::Device;
use crate::acl::{AclChangeRequest, AclMode, DEFAULT_NXOS_DELAY_FACTOR, SequencerOptions};
use crate::driver::SessionOptions;
use crate::error::{ConfigError, Result};
use crate::transport::HostKeyVerification;

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub acl_name: String,
    /// Literal ACL body, one entry per line.
    pub acl_lines: String,
    pub append: bool,
    #[serde(default)]
    pub extended: bool,
    /// Maximum number of devices worked on at once.
    pub threads: usize,
    pub device_list: Vec<Device>,
    #[serde(default)]
    pub export_result: bool,
    /// Directory for the results file; the working directory if unset.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    #[serde(default = "default_nxos_delay_factor")]
    pub nxos_delay_factor: u32,
    #[serde(default)]
    pub ssh: SshSettings,
}

/// Longest accepted `ssh.timeout_secs`.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Longest accepted `ssh.line_delay_ms`.
pub const MAX_LINE_DELAY_MS: u64 = 60_000;

/// Largest accepted `nxos_delay_factor`.
pub const MAX_NXOS_DELAY_FACTOR: u32 = 100;

fn default_nxos_delay_factor() -> u32 {
    DEFAULT_NXOS_DELAY_FACTOR
}

/// Connection settings applied to every device.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SshSettings {
    pub port: u16,
    pub timeout_secs: u64,
    pub line_delay_ms: u64,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SshSettings {
    fn default() -> Self {
        let defaults = SessionOptions::default();
        Self {
            port: defaults.port,
            timeout_secs: defaults.timeout.as_secs(),
            line_delay_ms: u64::try_from(defaults.line_delay.as_millis()).unwrap_or(MAX_LINE_DELAY_MS),
            host_key_verification: defaults.host_key_verification,
            known_hosts_path: None,
        }
    }
}

impl JobConfig {
    /// Read and validate a job file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: JobConfig = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&text).map_err(ConfigError::Yaml)?,
            Some("toml") => toml::from_str(&text).map_err(ConfigError::Toml)?,
            Some("json") => serde_json::from_str(&text).map_err(ConfigError::Json)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat {
                    path: path.to_path_buf(),
                }
                .into());
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the job cannot run with.
    ///
    /// Unknown `device_type`s are allowed here; they fail per device at run time.
    pub fn validate(&self) -> Result<()> {
        if self.acl_name.trim().is_empty() {
            return Err(invalid("acl_name", "must not be empty"));
        }
        if self.acl_name.chars().any(char::is_whitespace) {
            return Err(invalid("acl_name", "must not contain whitespace"));
        }
        if self.threads == 0 {
            return Err(invalid("threads", "must be at least 1"));
        }
        if self.device_list.is_empty() {
            return Err(invalid("device_list", "must name at least one device"));
        }
        if let Some(position) = self
            .device_list
            .iter()
            .position(|d| d.hostname.trim().is_empty())
        {
            return Err(invalid(
                "device_list",
                format!("entry {} has an empty hostname", position + 1),
            ));
        }
        if !(1..=MAX_NXOS_DELAY_FACTOR).contains(&self.nxos_delay_factor) {
            return Err(invalid(
                "nxos_delay_factor",
                format!("must be between 1 and {MAX_NXOS_DELAY_FACTOR}"),
            ));
        }
        if !(1..=MAX_TIMEOUT_SECS).contains(&self.ssh.timeout_secs) {
            return Err(invalid(
                "ssh.timeout_secs",
                format!("must be between 1 and {MAX_TIMEOUT_SECS}"),
            ));
        }
        if self.ssh.line_delay_ms > MAX_LINE_DELAY_MS {
            return Err(invalid(
                "ssh.line_delay_ms",
                format!("must be at most {MAX_LINE_DELAY_MS}"),
            ));
        }
        Ok(())
    }

    pub fn mode(&self) -> AclMode {
        AclMode::from_append(self.append)
    }

    pub fn change_request(&self) -> AclChangeRequest {
        AclChangeRequest::new(&self.acl_name, &self.acl_lines, self.mode(), self.extended)
    }

    pub fn sequencer_options(&self) -> SequencerOptions {
        SequencerOptions {
            nxos_delay_factor: self.nxos_delay_factor,
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            port: self.ssh.port,
            timeout: Duration::from_secs(self.ssh.timeout_secs),
            line_delay: Duration::from_millis(self.ssh.line_delay_ms),
            host_key_verification: self.ssh.host_key_verification,
            known_hosts_path: self.ssh.known_hosts_path.clone(),
        }
    }

    pub fn max_concurrency(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.threads).ok_or_else(|| invalid("threads", "must be at least 1"))
    }

    /// The device the credential is checked against before fan-out.
    pub fn canary(&self) -> Option<&Device> {
        self.device_list.first()
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> crate::Error {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
    .into()
}
