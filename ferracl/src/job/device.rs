//! Device descriptors and per-device results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PlatformError;
use crate::platform::Platform;

/// One inventory entry.
///
/// `device_type` is kept as written in the job file so that an unknown
/// type reaches the task runner and is reported as a failure for that
/// device instead of rejecting the whole job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub hostname: String,
    pub device_type: String,
}

impl Device {
    pub fn new(hostname: impl Into<String>, device_type: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            device_type: device_type.into(),
        }
    }

    pub fn platform(&self) -> Result<Platform, PlatformError> {
        self.device_type.parse()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.hostname, self.device_type)
    }
}

/// Where a device's run went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The session could not be opened (auth, timeout, refused, host key).
    Connection,
    /// The session opened but pushing or reading back the ACL failed.
    Execution,
    /// The inventory named a device type with no command sequencer.
    UnsupportedPlatform,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Connection => f.write_str("connection"),
            FailureKind::Execution => f.write_str("execution"),
            FailureKind::UnsupportedPlatform => f.write_str("unsupported platform"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Read-back of the ACL after the change.
    Success { output: String },
    Failure { kind: FailureKind, error: String },
}

/// Terminal result of one device's run. Exactly one per inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceResult {
    #[serde(flatten)]
    pub device: Device,
    pub outcome: Outcome,
}

impl DeviceResult {
    pub fn success(device: Device, output: impl Into<String>) -> Self {
        Self {
            device,
            outcome: Outcome::Success {
                output: output.into(),
            },
        }
    }

    pub fn failure(device: Device, kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            device,
            outcome: Outcome::Failure {
                kind,
                error: error.into(),
            },
        }
    }

    pub fn hostname(&self) -> &str {
        &self.device.hostname
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Number of lines in the read-back; failures count as zero.
    pub fn line_count(&self) -> usize {
        match &self.outcome {
            Outcome::Success { output } => output.lines().count(),
            Outcome::Failure { .. } => 0,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.outcome {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(kind),
        }
    }
}
