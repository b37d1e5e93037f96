//! SSH transport layer wrapping russh.
//!
//! Connection setup, host key verification and password authentication.
//! The interactive shell opened on top of a connection is handed to the
//! [`channel`](crate::channel) layer.

pub mod config;
mod ssh;

pub use config::{AuthMethod, Credential, HostKeyVerification, SshConfig};
pub use ssh::SshTransport;
