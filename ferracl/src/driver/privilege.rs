//! Privilege level tracking and navigation.

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and plans moves between levels.
///
/// Levels form a tree through their `parent` links, so the route between
/// two levels climbs to their closest shared ancestor and descends again.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,
    current: Option<String>,
}

impl PrivilegeManager {
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        Self {
            levels,
            current: None,
        }
    }

    /// Identify the level whose prompt pattern matches `prompt`.
    ///
    /// Levels are tried in definition order.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Re-derive the current level from a prompt; unknown prompts leave it unchanged.
    pub fn update_from_prompt(&mut self, prompt: &str) -> Option<&str> {
        let name = self.determine_from_prompt(prompt).ok()?.name.clone();
        self.current = Some(name);
        self.current.as_deref()
    }

    /// `name` followed by its parent, grandparent, ... up to the root.
    fn ancestry(&self, name: &str) -> Result<Vec<String>> {
        let mut chain = Vec::new();
        let mut node = Some(name.to_string());
        while let Some(current) = node {
            let level = self
                .levels
                .get(&current)
                .ok_or_else(|| DriverError::UnknownPrivilege {
                    prompt: current.clone(),
                })?;
            if chain.contains(&current) {
                break;
            }
            node = level.parent.clone();
            chain.push(current);
        }
        Ok(chain)
    }

    /// Levels to traverse from `from` to `to`, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let up = self.ancestry(from)?;
        let down = self.ancestry(to)?;

        let (up_idx, down_idx) = up
            .iter()
            .enumerate()
            .find_map(|(i, name)| down.iter().position(|n| n == name).map(|j| (i, j)))
            .ok_or_else(|| DriverError::NoPrivilegePath {
                from: from.to_string(),
                to: to.to_string(),
            })?;

        let mut path: Vec<String> = up[..=up_idx].to_vec();
        path.extend(down[..down_idx].iter().rev().cloned());
        Ok(path)
    }

    /// Command (and optional password prompt) for one step between adjacent levels.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<Transition> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.parent.as_deref() == Some(from) {
            return Some(Transition {
                command: to_level.escalate_command.clone()?,
                auth_prompt: to_level.escalate_auth_prompt.clone(),
            });
        }

        if from_level.parent.as_deref() == Some(to) {
            return Some(Transition {
                command: from_level.deescalate_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }
}

/// One privilege step.
#[derive(Debug, Clone)]
pub struct Transition {
    pub command: String,

    /// Password prompt the device may show after `command`.
    pub auth_prompt: Option<Regex>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn manager() -> PrivilegeManager {
        PrivilegeManager::new(Platform::CiscoIos.definition().privilege_levels)
    }

    #[test]
    fn test_determine_privilege() {
        let manager = manager();
        assert_eq!(manager.determine_from_prompt("sw1>").unwrap().name, "exec");
        assert_eq!(
            manager.determine_from_prompt("sw1#").unwrap().name,
            "privilege_exec"
        );
        assert_eq!(
            manager
                .determine_from_prompt("sw1(config-ext-nacl)#")
                .unwrap()
                .name,
            "configuration"
        );
        assert!(manager.determine_from_prompt("Username:").is_err());
    }

    #[test]
    fn test_find_path() {
        let manager = manager();
        assert_eq!(
            manager.find_path("exec", "configuration").unwrap(),
            vec!["exec", "privilege_exec", "configuration"]
        );
        assert_eq!(
            manager.find_path("configuration", "exec").unwrap(),
            vec!["configuration", "privilege_exec", "exec"]
        );
        assert_eq!(
            manager.find_path("privilege_exec", "privilege_exec").unwrap(),
            vec!["privilege_exec"]
        );
        assert!(manager.find_path("exec", "shell").is_err());
    }

    #[test]
    fn test_find_path_between_siblings() {
        let levels: IndexMap<String, PrivilegeLevel> = [
            PrivilegeLevel::new("root", r">$").unwrap(),
            PrivilegeLevel::new("a", r"a#$").unwrap().with_parent("root"),
            PrivilegeLevel::new("b", r"b#$").unwrap().with_parent("root"),
        ]
        .into_iter()
        .map(|level| (level.name.clone(), level))
        .collect();
        let manager = PrivilegeManager::new(levels);
        assert_eq!(manager.find_path("a", "b").unwrap(), vec!["a", "root", "b"]);
    }

    #[test]
    fn test_get_transition() {
        let manager = manager();

        let up = manager.get_transition("exec", "privilege_exec").unwrap();
        assert_eq!(up.command, "enable");
        assert!(up.auth_prompt.is_some());

        let up = manager
            .get_transition("privilege_exec", "configuration")
            .unwrap();
        assert_eq!(up.command, "configure terminal");
        assert!(up.auth_prompt.is_none());

        let down = manager
            .get_transition("configuration", "privilege_exec")
            .unwrap();
        assert_eq!(down.command, "end");

        assert!(manager.get_transition("exec", "configuration").is_none());
    }

    #[test]
    fn test_update_from_prompt() {
        let mut manager = manager();
        assert!(manager.current_name().is_none());
        assert_eq!(manager.update_from_prompt("sw1(config)#"), Some("configuration"));
        assert_eq!(manager.update_from_prompt("garbage"), None);
        assert_eq!(manager.current_name(), Some("configuration"));
    }
}
