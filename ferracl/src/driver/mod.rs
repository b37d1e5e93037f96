//! Remote session client.
//!
//! [`Driver`] is one open CLI session on a device; [`Connector`] opens
//! authenticated sessions. The job layer only ever talks to these two
//! traits, so the SSH implementation ([`SshConnector`] / [`GenericDriver`])
//! can be swapped for an in-memory fake in tests.

mod builder;
mod connector;
mod generic;
mod privilege;
mod response;

pub use builder::DriverBuilder;
pub use connector::{SessionOptions, SshConnector};
pub use generic::GenericDriver;
pub use privilege::{PrivilegeManager, Transition};
pub use response::Response;

use std::future::Future;

use crate::error::Result;
use crate::platform::Platform;
use crate::transport::Credential;

/// An interactive CLI session on one device.
pub trait Driver: Send {
    /// Open the connection to the device.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection. Closing a session that is not open is a no-op.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send configuration lines from configuration mode, one response per line.
    ///
    /// Enters configuration mode, sends each line in order, and returns to
    /// the previous privilege level. `delay_factor` scales both the pause
    /// after each line and the per-line read timeout; `None` uses the
    /// platform's normal pacing.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use ferracl::driver::Driver;
    ///
    /// # async fn example(driver: &mut impl Driver) -> Result<(), ferracl::Error> {
    /// let lines = vec![
    ///     "ip access-list extended BLOCK_TELNET".to_string(),
    ///     "deny tcp any any eq 23".to_string(),
    ///     "permit ip any any".to_string(),
    /// ];
    /// let responses = driver.send_config(&lines, None).await?;
    /// assert!(responses.iter().all(|r| r.is_success()));
    /// # Ok(())
    /// # }
    /// ```
    fn send_config(
        &mut self,
        lines: &[String],
        delay_factor: Option<u32>,
    ) -> impl Future<Output = Result<Vec<Response>>> + Send;
}

/// Opens authenticated sessions to devices.
///
/// Implementations must be shareable across concurrently running device
/// tasks; each call returns a session owned exclusively by its caller.
pub trait Connector: Send + Sync {
    type Session: Driver + 'static;

    /// Open a session to `host`, ready for commands.
    fn connect(
        &self,
        host: &str,
        platform: Platform,
        credential: &Credential,
    ) -> impl Future<Output = Result<Self::Session>> + Send;
}
