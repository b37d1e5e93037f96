//! Platform definitions for the supported Cisco dialects.
//!
//! [`Platform`] is the closed set of device types the tool knows how to
//! drive. Each variant maps to a [`PlatformDefinition`] describing its
//! prompts, privilege graph and failure markers.

mod definition;
mod privilege_level;
pub mod vendors;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;

use crate::error::PlatformError;

/// A supported device platform, named as in the job inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Cisco IOS / IOS-XE (`cisco_ios`).
    CiscoIos,
    /// Cisco NX-OS (`cisco_nxos`).
    CiscoNxos,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 2] = [Platform::CiscoIos, Platform::CiscoNxos];

    /// Inventory name of this platform.
    pub fn name(self) -> &'static str {
        match self {
            Platform::CiscoIos => vendors::cisco_ios::PLATFORM_NAME,
            Platform::CiscoNxos => vendors::cisco_nxos::PLATFORM_NAME,
        }
    }

    /// Build the prompt/privilege definition for this platform.
    pub fn definition(self) -> PlatformDefinition {
        match self {
            Platform::CiscoIos => vendors::cisco_ios::platform(),
            Platform::CiscoNxos => vendors::cisco_nxos::platform(),
        }
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| PlatformError::Unsupported {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_inventory_names() {
        assert_eq!("cisco_ios".parse::<Platform>().unwrap(), Platform::CiscoIos);
        assert_eq!("cisco_nxos".parse::<Platform>().unwrap(), Platform::CiscoNxos);
    }

    #[test]
    fn test_parse_unknown_platform() {
        let err = "juniper_junos".parse::<Platform>().unwrap_err();
        assert!(matches!(err, PlatformError::Unsupported { ref name } if name == "juniper_junos"));
        assert!("CISCO_IOS".parse::<Platform>().is_err());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for platform in Platform::ALL {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform));
        }
    }

    #[test]
    fn test_definition_names() {
        for platform in Platform::ALL {
            assert_eq!(platform.definition().name, platform.name());
        }
    }
}
