//! # ferracl
//!
//! Bulk ACL changes for Cisco IOS and NX-OS devices over SSH.
//!
//! One job applies a single named ACL (appended to, or replacing, what is
//! on the device) to every device in an inventory, a bounded number at a
//! time. Each device's outcome is collected independently, and the
//! read-back from devices of the same platform is compared for consistency.
//!
//! ## Layers
//!
//! - [`transport`] / [`channel`]: russh connection and a PTY shell with
//!   tail-search prompt matching
//! - [`platform`]: prompt patterns, privilege levels and error markers for
//!   each supported dialect
//! - [`driver`]: interactive session ([`Driver`]) and session factory
//!   ([`Connector`])
//! - [`acl`]: per-dialect command sequences for a change
//! - [`job`]: credential check, fan-out, validation and reporting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use ferracl::job::{self, JobConfig, TerminalPrompt};
//! use ferracl::SshConnector;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ferracl::Error> {
//!     let config = JobConfig::load("block-telnet.toml")?;
//!     let connector = Arc::new(SshConnector::new(config.session_options()));
//!
//!     let report = job::run_job(&config, connector, &mut TerminalPrompt).await?;
//!     println!("{}", report.render());
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod channel;
pub mod driver;
pub mod error;
pub mod job;
pub mod platform;
pub mod transport;

#[cfg(test)]
mod testing;

pub use acl::{AclChangeRequest, AclMode, CommandSequence, build_sequence};
pub use driver::{Connector, Driver, DriverBuilder, GenericDriver, Response, SshConnector};
pub use error::{Error, Result};
pub use job::{Device, DeviceResult, JobConfig, JobReport, Outcome, ValidationSummary};
pub use platform::Platform;
pub use transport::Credential;
