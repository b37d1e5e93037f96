//! ACL change requests and the per-vendor command sequences that apply them.
//!
//! ACL bodies are opaque: lines are pushed verbatim, never parsed.

mod ios;
mod nxos;

use std::fmt;

use serde::Serialize;

use crate::platform::Platform;

/// Default multiplier for NX-OS line pacing.
///
/// NX-OS drops input that arrives faster than it can process ACL entries,
/// so configuration lines are sent slower than on IOS.
pub const DEFAULT_NXOS_DELAY_FACTOR: u32 = 10;

/// Whether the new entries are added to the existing ACL or replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclMode {
    Append,
    Replace,
}

impl AclMode {
    /// `append = true` in the job file selects [`AclMode::Append`].
    pub fn from_append(append: bool) -> Self {
        if append { AclMode::Append } else { AclMode::Replace }
    }
}

impl fmt::Display for AclMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AclMode::Append => f.write_str("append"),
            AclMode::Replace => f.write_str("replace"),
        }
    }
}

/// The single logical change applied to every device in a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclChangeRequest {
    pub acl_name: String,
    /// ACL entries, one configuration line each.
    pub acl_body: Vec<String>,
    pub mode: AclMode,
    /// IOS only: extended rather than standard ACL.
    pub extended: bool,
}

impl AclChangeRequest {
    /// Build a request from a literal multi-line ACL body.
    pub fn new(acl_name: impl Into<String>, acl_lines: &str, mode: AclMode, extended: bool) -> Self {
        Self {
            acl_name: acl_name.into(),
            acl_body: acl_lines.lines().map(str::to_string).collect(),
            mode,
            extended,
        }
    }
}

/// Commands for one device: what to push and how to read the result back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSequence {
    /// Configuration lines, sent as one configuration push.
    pub setup: Vec<String>,
    /// Show command whose output is the device's result.
    pub verify: String,
    /// Pacing multiplier for the push; `None` means platform default pacing.
    pub delay_factor: Option<u32>,
}

/// Tunables for sequence generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerOptions {
    pub nxos_delay_factor: u32,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            nxos_delay_factor: DEFAULT_NXOS_DELAY_FACTOR,
        }
    }
}

/// Produce the command sequence that applies `request` on `platform`.
pub fn build_sequence(
    platform: Platform,
    request: &AclChangeRequest,
    options: &SequencerOptions,
) -> CommandSequence {
    match platform {
        Platform::CiscoIos => ios::build_sequence(request),
        Platform::CiscoNxos => nxos::build_sequence(request, options.nxos_delay_factor),
    }
}

fn verify_command(acl_name: &str) -> String {
    format!("show ip access-list {}", acl_name)
}
