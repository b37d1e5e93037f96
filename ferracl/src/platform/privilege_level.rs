//! Privilege level definition.

use regex::bytes::Regex;

/// One CLI mode of a device, identified by its prompt.
///
/// Levels form a tree through `parent`: each level knows the command that
/// enters it from its parent and the command that returns to the parent.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Level name (e.g., "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Prompt regex for this level.
    pub pattern: Regex,

    /// Parent level; `None` for the root.
    pub parent: Option<String>,

    /// Command that enters this level from the parent.
    pub escalate_command: Option<String>,

    /// Command that returns from this level to the parent.
    pub deescalate_command: Option<String>,

    /// Prompt the device shows when escalation asks for a password.
    pub escalate_auth_prompt: Option<Regex>,
}

impl PrivilegeLevel {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            parent: None,
            escalate_command: None,
            deescalate_command: None,
            escalate_auth_prompt: None,
        })
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_escalate(mut self, command: impl Into<String>) -> Self {
        self.escalate_command = Some(command.into());
        self
    }

    pub fn with_deescalate(mut self, command: impl Into<String>) -> Self {
        self.deescalate_command = Some(command.into());
        self
    }

    /// Escalation may stop at a password prompt matching `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_auth_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Check if this privilege level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt.as_bytes())
    }
}
