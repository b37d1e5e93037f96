//! Platform definition for vendor-specific prompt handling.

use indexmap::IndexMap;

use super::privilege_level::PrivilegeLevel;

/// Name of the privilege level commands are normally run from.
pub const PRIVILEGE_EXEC: &str = "privilege_exec";

/// Name of the global configuration privilege level.
pub const CONFIGURATION: &str = "configuration";

/// Everything the driver needs to know to talk to one kind of device.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name as used in the inventory (e.g., "cisco_ios").
    pub name: String,

    /// Privilege levels, in prompt-matching order.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level commands are sent from after login.
    pub default_privilege: String,

    /// Level configuration lines are sent from.
    pub config_privilege: String,

    /// Output substrings that mark a command as rejected.
    pub failed_when_contains: Vec<String>,

    /// Commands run once right after login.
    pub on_open_commands: Vec<String>,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: PRIVILEGE_EXEC.to_string(),
            config_privilege: CONFIGURATION.to_string(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// First failure marker contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<&str> {
        self.failed_when_contains
            .iter()
            .find(|pattern| output.contains(pattern.as_str()))
            .map(String::as_str)
    }

    /// Strip the echoed command from the front of `raw` and the trailing
    /// prompt line from its end.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = raw.trim_start_matches('\n');
        let output = output
            .strip_prefix(command)
            .unwrap_or(output)
            .trim_start_matches('\n');

        match output.rfind('\n') {
            Some(pos) => output[..pos].to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> PlatformDefinition {
        PlatformDefinition::new("test")
            .with_failure_pattern("% Invalid input")
            .with_failure_pattern("% Incomplete command")
    }

    #[test]
    fn test_defaults() {
        let def = PlatformDefinition::new("test");
        assert_eq!(def.default_privilege, "privilege_exec");
        assert_eq!(def.config_privilege, "configuration");
        assert_eq!(def.terminal_width, 511);
    }

    #[test]
    fn test_detect_failure() {
        let def = definition();
        assert_eq!(
            def.detect_failure("deny tcp any any eq 42\n% Invalid input detected at '^' marker."),
            Some("% Invalid input")
        );
        assert_eq!(def.detect_failure("permit ip any any"), None);
    }

    #[test]
    fn test_normalize_strips_echo_and_prompt() {
        let def = definition();
        let raw = "show ip access-list X\nExtended IP access list X\n    10 permit ip any any\nsw1#";
        assert_eq!(
            def.normalize_output(raw, "show ip access-list X"),
            "Extended IP access list X\n    10 permit ip any any"
        );
    }

    #[test]
    fn test_normalize_prompt_only() {
        let def = definition();
        assert_eq!(def.normalize_output("terminal length 0\nsw1#", "terminal length 0"), "");
        assert_eq!(def.normalize_output("sw1#", "anything"), "");
    }
}
