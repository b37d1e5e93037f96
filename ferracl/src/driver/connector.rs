//! SSH implementation of [`Connector`].

use std::path::PathBuf;
use std::time::Duration;

use log::debug;

use super::builder::DriverBuilder;
use super::generic::GenericDriver;
use super::{Connector, Driver};
use crate::error::Result;
use crate::platform::Platform;
use crate::transport::{Credential, HostKeyVerification};

/// Connection settings shared by every device in a job.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub port: u16,
    pub timeout: Duration,
    /// Base pause after each configuration line.
    pub line_delay: Duration,
    pub host_key_verification: HostKeyVerification,
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            port: 22,
            timeout: Duration::from_secs(30),
            line_delay: Duration::from_millis(50),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

/// Opens [`GenericDriver`] sessions over SSH.
#[derive(Debug, Clone, Default)]
pub struct SshConnector {
    options: SessionOptions,
}

impl SshConnector {
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    fn builder(&self, host: &str, platform: Platform, credential: &Credential) -> DriverBuilder {
        let builder = DriverBuilder::new(host)
            .port(self.options.port)
            .credential(credential)
            .platform(platform)
            .timeout(self.options.timeout)
            .line_delay(self.options.line_delay)
            .host_key_verification(self.options.host_key_verification);

        match self.options.known_hosts_path {
            Some(ref path) => builder.known_hosts_path(path.clone()),
            None => builder,
        }
    }
}

impl Connector for SshConnector {
    type Session = GenericDriver;

    async fn connect(
        &self,
        host: &str,
        platform: Platform,
        credential: &Credential,
    ) -> Result<GenericDriver> {
        debug!("opening {} session to {}", platform, host);
        let mut driver = self.builder(host, platform, credential).build()?;
        driver.open().await?;
        Ok(driver)
    }
}
