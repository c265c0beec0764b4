//! Privilege level tracking and navigation.

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and plans moves between levels.
///
/// Levels form a tree through `previous_priv`. A move from one level to
/// another climbs to the closest common ancestor and descends from there,
/// so every hop is a single escalate or deescalate command.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,
    current: Option<String>,
}

/// One hop between adjacent privilege levels.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Command to send.
    pub command: String,

    /// Password prompt the hop may raise.
    pub auth_prompt: Option<Regex>,
}

impl PrivilegeManager {
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        Self {
            levels,
            current: None,
        }
    }

    /// Find the level whose pattern matches the prompt.
    ///
    /// Levels are tried in definition order; the first match wins.
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

    pub fn current(&self) -> Option<&PrivilegeLevel> {
        self.current.as_deref().and_then(|name| self.levels.get(name))
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn set_current(&mut self, name: &str) -> Result<()> {
        if !self.levels.contains_key(name) {
            return Err(DriverError::UnknownPrivilege {
                prompt: name.to_string(),
            }
            .into());
        }
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Forget the current level (e.g. after the session closes).
    pub fn reset(&mut self) {
        self.current = None;
    }

    pub fn get(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// Levels visited moving from `from` to `to`, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let no_path = || -> crate::Error {
            DriverError::NoPrivilegePath {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into()
        };

        let up = self.ancestors(from).ok_or_else(no_path)?;
        let down = self.ancestors(to).ok_or_else(no_path)?;

        let (up_idx, down_idx) = up
            .iter()
            .enumerate()
            .find_map(|(i, name)| down.iter().position(|d| d == name).map(|j| (i, j)))
            .ok_or_else(no_path)?;

        let mut path: Vec<String> = up[..=up_idx].iter().map(|s| s.to_string()).collect();
        path.extend(down[..down_idx].iter().rev().map(|s| s.to_string()));
        Ok(path)
    }

    /// The hop between two adjacent levels.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<Transition> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.previous_priv.as_deref() == Some(from) {
            return Some(Transition {
                command: to_level.escalate_command.clone()?,
                auth_prompt: to_level.escalate_prompt.clone(),
            });
        }

        if from_level.previous_priv.as_deref() == Some(to) {
            return Some(Transition {
                command: from_level.deescalate_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }

    /// `name` followed by its parents up to the root.
    ///
    /// `None` when a name is undefined or the parent links loop.
    fn ancestors<'a>(&'a self, name: &'a str) -> Option<Vec<&'a str>> {
        let mut chain = vec![];
        let mut cursor = Some(name);

        while let Some(level_name) = cursor {
            let level = self.levels.get(level_name)?;
            if chain.contains(&level_name) || chain.len() > self.levels.len() {
                return None;
            }
            chain.push(level_name);
            cursor = level.previous_priv.as_deref();
        }

        Some(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::freertr;

    fn manager() -> PrivilegeManager {
        PrivilegeManager::new(freertr::platform().unwrap().privilege_levels)
    }

    #[test]
    fn test_determine_from_prompt() {
        let pm = manager();
        assert_eq!(pm.determine_from_prompt("rtr1>").unwrap().name, "exec");
        assert_eq!(pm.determine_from_prompt("rtr1#").unwrap().name, "privilege_exec");
        assert_eq!(
            pm.determine_from_prompt("rtr1(cfg-if)#").unwrap().name,
            "configuration"
        );
        assert!(pm.determine_from_prompt("$ ").is_err());
    }

    #[test]
    fn test_path_up_and_down() {
        let pm = manager();
        assert_eq!(
            pm.find_path("exec", "configuration").unwrap(),
            vec!["exec", "privilege_exec", "configuration"]
        );
        assert_eq!(
            pm.find_path("configuration", "exec").unwrap(),
            vec!["configuration", "privilege_exec", "exec"]
        );
        assert_eq!(pm.find_path("exec", "exec").unwrap(), vec!["exec"]);
    }

    #[test]
    fn test_path_between_siblings() {
        let mut levels = freertr::platform().unwrap().privilege_levels;
        levels.insert(
            "shell".to_string(),
            PrivilegeLevel::new("shell", r"(?m)^\$\s?$")
                .unwrap()
                .with_parent("privilege_exec")
                .with_escalate("start shell")
                .with_deescalate("exit"),
        );
        let pm = PrivilegeManager::new(levels);
        assert_eq!(
            pm.find_path("shell", "configuration").unwrap(),
            vec!["shell", "privilege_exec", "configuration"]
        );
    }

    #[test]
    fn test_unknown_level_has_no_path() {
        assert!(manager().find_path("exec", "nowhere").is_err());
    }

    #[test]
    fn test_transitions() {
        let pm = manager();
        let up = pm.get_transition("exec", "privilege_exec").unwrap();
        assert_eq!(up.command, "enable");
        assert!(up.auth_prompt.is_some());

        let down = pm.get_transition("configuration", "privilege_exec").unwrap();
        assert_eq!(down.command, "end");
        assert!(down.auth_prompt.is_none());

        assert!(pm.get_transition("exec", "configuration").is_none());
    }

    #[test]
    fn test_set_current() {
        let mut pm = manager();
        assert!(pm.current().is_none());
        pm.set_current("privilege_exec").unwrap();
        assert_eq!(pm.current_name(), Some("privilege_exec"));
        assert!(pm.set_current("bogus").is_err());
        pm.reset();
        assert!(pm.current_name().is_none());
    }
}
