//! Cisco IOS / IOS-XE platform definition.
//!
//! Privilege levels:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Configuration mode with `(config*)#` prompt
//!
//! # Prompt Examples
//!
//! ```text
//! sw1>                         # exec mode
//! sw1#                         # privilege_exec mode
//! sw1(config)#                 # configuration mode
//! sw1(config-ext-nacl)#        # extended ACL sub-mode
//! sw1(config-std-nacl)#        # standard ACL sub-mode
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├──────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │   disable   │       #        │        end           │  (config*)#   │
//! └──────┘◄────────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

/// Platform name for Cisco IOS.
pub const PLATFORM_NAME: &str = "cisco_ios";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?mi)^password:\s?$")
        .unwrap();

    // Covers ACL sub-modes such as (config-ext-nacl) as well.
    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,63}\)#\s?$",
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
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
}
