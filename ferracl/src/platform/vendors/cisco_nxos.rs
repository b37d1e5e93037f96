//! Cisco NX-OS platform definition.
//!
//! NX-OS sessions normally land directly in `privilege_exec`; `exec` is kept
//! for role-restricted accounts.
//!
//! # Prompt Examples
//!
//! ```text
//! nx1>                         # exec mode
//! nx1#                         # privilege_exec mode
//! nx1(config)#                 # configuration mode
//! nx1(config-acl)#             # ACL sub-mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Platform name for Cisco NX-OS.
pub const PLATFORM_NAME: &str = "cisco_nxos";

/// Create the Cisco NX-OS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?mi)^password:\s?$")
        .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(config[\w.\-@/:+]{0,63}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Invalid parameter detected")
        .with_failure_pattern("% Permission denied")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
}
