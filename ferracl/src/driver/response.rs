//! Output of a single command sent to a device.

use std::time::Duration;

use crate::error::{DriverError, Result};

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was sent.
    pub command: String,

    /// Output with the command echo and trailing prompt removed.
    pub result: String,

    /// Output exactly as read, prompt included.
    pub raw_result: String,

    /// The prompt the read stopped at.
    pub prompt: String,

    pub elapsed: Duration,

    /// Failure marker found in the output, if the device rejected the command.
    pub failure_message: Option<String>,
}

impl Response {
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark this response as rejected by the device.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a rejected response into a [`DriverError::CommandFailed`].
    pub fn into_result(self) -> Result<Response> {
        match self.failure_message {
            None => Ok(self),
            Some(message) => Err(DriverError::CommandFailed {
                command: self.command,
                message: format!("{}: {}", message, self.result.trim()),
            }
            .into()),
        }
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passes_through() {
        let response = Response::new(
            "show ip access-list X",
            "IP access list X\n  10 permit ip any any",
            "",
            "nx1#",
            Duration::from_millis(12),
        );
        assert!(response.is_success());
        let response = response.into_result().unwrap();
        assert_eq!(response.to_string(), "IP access list X\n  10 permit ip any any");
    }

    #[test]
    fn test_failure_becomes_error() {
        let response = Response::new(
            "permit ipv9 any any",
            "% Invalid input detected at '^' marker.\n",
            "",
            "sw1(config-ext-nacl)#",
            Duration::ZERO,
        )
        .with_failure("% Invalid input detected");
        assert!(!response.is_success());

        let err = response.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("permit ipv9 any any"));
        assert!(message.contains("% Invalid input detected"));
    }
}
