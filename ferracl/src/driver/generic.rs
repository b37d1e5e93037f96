//! SSH-backed driver for any [`PlatformDefinition`].

use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use super::Driver;
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::PtyChannel;
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::config::{AuthMethod, SshConfig};
use crate::transport::SshTransport;

/// Interactive CLI session on one device.
///
/// Handles:
/// - SSH transport and shell lifetime
/// - Prompt-terminated command execution
/// - Privilege navigation (`enable`, `configure terminal`, `end`)
/// - Paced configuration pushes
pub struct GenericDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    transport: Option<SshTransport>,
    channel: Option<PtyChannel>,
    privilege_manager: PrivilegeManager,
    timeout: Duration,
    /// Base pause after each configuration line, scaled by the delay factor.
    line_delay: Duration,
    /// Matches the prompt of any privilege level.
    prompt_pattern: Regex,
}

impl GenericDriver {
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition, line_delay: Duration) -> Result<Self> {
        let timeout = ssh_config.timeout;
        let prompt_pattern = Self::build_combined_pattern(&platform)?;
        let privilege_manager = PrivilegeManager::new(platform.privilege_levels.clone());

        Ok(Self {
            ssh_config,
            platform,
            transport: None,
            channel: None,
            privilege_manager,
            timeout,
            line_delay,
            prompt_pattern,
        })
    }

    /// Alternation of every privilege level's prompt.
    fn build_combined_pattern(platform: &PlatformDefinition) -> Result<Regex> {
        let combined = platform
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Regex::new(&combined).map_err(ChannelError::InvalidPattern)?)
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn host(&self) -> &str {
        &self.ssh_config.host
    }

    fn channel_mut(&mut self) -> Result<&mut PtyChannel> {
        self.channel
            .as_mut()
            .ok_or_else(|| DriverError::NotConnected.into())
    }

    /// Read up to the next prompt, returning (output, prompt line).
    async fn read_until_prompt(&mut self, timeout: Duration) -> Result<(String, String)> {
        let pattern = self.prompt_pattern.clone();
        let data = self
            .channel_mut()?
            .read_until_pattern(&pattern, timeout)
            .await?;

        let output = String::from_utf8_lossy(&data).to_string();
        let prompt = output
            .rsplit('\n')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        self.privilege_manager.update_from_prompt(&prompt);

        Ok((output, prompt))
    }

    async fn send_command_with_timeout(&mut self, command: &str, timeout: Duration) -> Result<Response> {
        let start = Instant::now();
        self.channel_mut()?.send(command).await?;
        let (raw_result, prompt) = self.read_until_prompt(timeout).await?;

        let result = self.platform.normalize_output(&raw_result, command);
        let response = Response::new(command, result, raw_result, prompt, start.elapsed());

        match self.platform.detect_failure(&response.result) {
            Some(marker) => {
                let marker = marker.to_string();
                debug!("{}: '{}' rejected ({})", self.host(), command, marker);
                Ok(response.with_failure(marker))
            }
            None => Ok(response),
        }
    }

    /// Walk the privilege tree to `target`, answering an enable password
    /// prompt with the login secret when one appears.
    pub async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        self.channel_mut()?;
        let current = self
            .privilege_manager
            .current_name()
            .unwrap_or_default()
            .to_string();
        if current == target {
            return Ok(());
        }

        let path = self.privilege_manager.find_path(&current, target)?;

        for step in path.windows(2) {
            let (from, to) = (&step[0], &step[1]);
            let transition = self
                .privilege_manager
                .get_transition(from, to)
                .ok_or_else(|| DriverError::NoPrivilegePath {
                    from: from.clone(),
                    to: to.clone(),
                })?;

            debug!("{}: {} -> {} via '{}'", self.host(), from, to, transition.command);
            self.channel_mut()?.send(&transition.command).await?;

            if let Some(auth_prompt) = transition.auth_prompt {
                let either = Regex::new(&format!(
                    "(?:{})|(?:{})",
                    auth_prompt.as_str(),
                    self.prompt_pattern.as_str()
                ))
                .map_err(ChannelError::InvalidPattern)?;
                let timeout = self.timeout;
                let data = self.channel_mut()?.read_until_pattern(&either, timeout).await?;

                if auth_prompt.is_match(&data) {
                    let secret = match &self.ssh_config.auth {
                        AuthMethod::Password(secret) => secret.expose_secret().to_string(),
                        AuthMethod::None => String::new(),
                    };
                    self.channel_mut()?.send_hidden(&secret).await?;
                    self.read_until_prompt(timeout).await?;
                } else {
                    let output = String::from_utf8_lossy(&data).to_string();
                    let prompt = output.rsplit('\n').next().unwrap_or_default().trim().to_string();
                    self.privilege_manager.update_from_prompt(&prompt);
                }
            } else {
                self.read_until_prompt(self.timeout).await?;
            }

            if self.privilege_manager.current_name() != Some(to.as_str()) {
                return Err(DriverError::PrivilegeAcquisitionFailed { target: to.clone() }.into());
            }
        }

        Ok(())
    }

    async fn open_shell(&mut self) -> Result<()> {
        let transport = SshTransport::connect(self.ssh_config.clone()).await?;
        let channel = transport.open_shell().await?;
        self.transport = Some(transport);
        self.channel = Some(channel);

        // Login banner, then the first prompt.
        let (_, prompt) = self.read_until_prompt(self.timeout).await?;
        debug!("{}: initial prompt '{}' ({})", self.host(), prompt, self.platform().name);

        let default_privilege = self.platform.default_privilege.clone();
        self.acquire_privilege(&default_privilege).await?;

        for command in self.platform.on_open_commands.clone() {
            self.send_command(&command).await?.into_result()?;
        }
        Ok(())
    }
}

impl Driver for GenericDriver {
    async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        if let Err(e) = self.open_shell().await {
            if let Err(close_err) = self.close().await {
                debug!("{}: cleanup after failed open: {}", self.host(), close_err);
            }
            return Err(e);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("{}: closing shell: {}", self.host(), e);
            }
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        self.send_command_with_timeout(command, self.timeout).await
    }

    async fn send_config(&mut self, lines: &[String], delay_factor: Option<u32>) -> Result<Vec<Response>> {
        self.channel_mut()?;
        let (line_timeout, pause) = config_pacing(self.timeout, self.line_delay, delay_factor);

        let original = self
            .privilege_manager
            .current_name()
            .unwrap_or(self.platform.default_privilege.as_str())
            .to_string();
        let config_privilege = self.platform.config_privilege.clone();
        self.acquire_privilege(&config_privilege).await?;

        let mut responses = Vec::with_capacity(lines.len());
        for line in lines {
            trace!("{}: config line '{}'", self.host(), line);
            responses.push(self.send_command_with_timeout(line, line_timeout).await?);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        self.acquire_privilege(&original).await?;
        Ok(responses)
    }
}

/// Per-line read timeout and post-line pause for a configuration push.
fn config_pacing(timeout: Duration, line_delay: Duration, delay_factor: Option<u32>) -> (Duration, Duration) {
    let factor = delay_factor.unwrap_or(1).max(1);
    (timeout.saturating_mul(factor), line_delay.saturating_mul(factor))
}

impl Drop for GenericDriver {
    fn drop(&mut self) {
        // The russh session ends once its handle is dropped.
        if self.transport.is_some() {
            warn!("{}: session dropped without close()", self.ssh_config.host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;
    use crate::transport::HostKeyVerification;

    fn driver(platform: Platform) -> GenericDriver {
        let ssh_config = SshConfig {
            host: "sw1".to_string(),
            port: 22,
            username: "netops".to_string(),
            auth: AuthMethod::None,
            timeout: Duration::from_secs(5),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::Disabled,
            known_hosts_path: None,
        };
        GenericDriver::new(ssh_config, platform.definition(), Duration::from_millis(50)).unwrap()
    }

    #[test]
    fn test_combined_prompt_pattern() {
        for platform in Platform::ALL {
            let driver = driver(platform);
            let pattern = &driver.prompt_pattern;
            assert!(pattern.is_match(b"sw1>"));
            assert!(pattern.is_match(b"sw1#"));
            assert!(pattern.is_match(b"sw1(config)#"));
            assert!(!pattern.is_match(b"Username: "));
        }
    }

    #[test]
    fn test_new_driver_is_closed() {
        let driver = driver(Platform::CiscoNxos);
        assert!(driver.privilege_manager.current_name().is_none());
        assert!(driver.transport.is_none());
        assert_eq!(driver.host(), "sw1");
    }

    #[tokio::test]
    async fn test_commands_require_open() {
        let mut driver = driver(Platform::CiscoIos);
        let err = driver.send_command("show version").await.unwrap_err();
        assert!(matches!(err, crate::Error::Driver(DriverError::NotConnected)));

        let err = driver
            .send_config(&["ip access-list standard X".to_string()], None)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Driver(DriverError::NotConnected)));
    }

    #[test]
    fn test_config_pacing() {
        let timeout = Duration::from_secs(30);
        let delay = Duration::from_millis(50);
        assert_eq!(config_pacing(timeout, delay, None), (timeout, delay));
        assert_eq!(config_pacing(timeout, delay, Some(0)), (timeout, delay));
        assert_eq!(
            config_pacing(timeout, delay, Some(10)),
            (Duration::from_secs(300), Duration::from_millis(500))
        );
        assert_eq!(
            config_pacing(Duration::MAX, Duration::MAX, Some(10)),
            (Duration::MAX, Duration::MAX)
        );
    }

    #[tokio::test]
    async fn test_close_without_open_is_noop() {
        let mut driver = driver(Platform::CiscoIos);
        tokio_test::assert_ok!(driver.close().await);
    }
}
