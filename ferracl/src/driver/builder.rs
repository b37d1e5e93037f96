//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use super::generic::GenericDriver;
use crate::error::{DriverError, Result};
use crate::platform::Platform;
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};
use crate::transport::Credential;

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use ferracl::driver::{Driver, DriverBuilder};
/// use ferracl::platform::Platform;
/// use ferracl::transport::Credential;
///
/// # async fn example() -> Result<(), ferracl::Error> {
/// let credential = Credential::new("netops", "secret");
/// let mut driver = DriverBuilder::new("sw1.example.net")
///     .credential(&credential)
///     .platform(Platform::CiscoIos)
///     .build()?;
/// driver.open().await?;
/// let response = driver.send_command("show ip access-list").await?;
/// println!("{}", response);
/// driver.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    platform: Option<Platform>,
    timeout: Duration,
    line_delay: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl DriverBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            platform: None,
            timeout: Duration::from_secs(30),
            line_delay: Duration::from_millis(50),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Authenticate with a username and password.
    pub fn credential(mut self, credential: &Credential) -> Self {
        self.username = Some(credential.username.clone());
        self.auth = AuthMethod::Password(credential.secret.clone());
        self
    }

    /// Username without a password (lab devices only).
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Connect and per-read timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base pause after each configuration line (default: 50ms).
    pub fn line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = delay;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Build the driver. Does not connect; call `open()` on the result.
    pub fn build(self) -> Result<GenericDriver> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "Username is required".to_string(),
        })?;
        let platform = self
            .platform
            .ok_or_else(|| DriverError::InvalidConfig {
                message: "Platform must be specified".to_string(),
            })?
            .definition();

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        GenericDriver::new(ssh_config, platform, self.line_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;

    #[test]
    fn test_build_requires_username() {
        let result = DriverBuilder::new("sw1").platform(Platform::CiscoIos).build();
        assert!(matches!(
            result,
            Err(crate::Error::Driver(DriverError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_build_requires_platform() {
        let credential = Credential::new("netops", "pw");
        let result = DriverBuilder::new("sw1").credential(&credential).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_uses_platform() {
        let credential = Credential::new("netops", "pw");
        let driver = DriverBuilder::new("nx1")
            .credential(&credential)
            .platform(Platform::CiscoNxos)
            .port(8022)
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(driver.platform().name, "cisco_nxos");
        assert_eq!(driver.host(), "nx1");
    }
}
