//! Privilege level definition.

use regex::bytes::Regex;

/// A privilege level of the router CLI.
///
/// Levels form a tree through `previous_priv`; moving between two levels
/// walks that tree one escalate/deescalate command at a time.
#[derive(Debug, Clone)]
pub struct PrivilegeLevel {
    /// Name of this level (e.g. "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Prompt pattern for this level.
    pub pattern: Regex,

    /// Parent level, `None` for the root.
    pub previous_priv: Option<String>,

    /// Command that enters this level from the parent.
    pub escalate_command: Option<String>,

    /// Command that leaves this level for the parent.
    pub deescalate_command: Option<String>,

    /// Whether escalation asks for a password.
    pub escalate_auth: bool,

    /// Password prompt shown during escalation.
    pub escalate_prompt: Option<Regex>,
}

impl PrivilegeLevel {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            previous_priv: None,
            escalate_command: None,
            deescalate_command: None,
            escalate_auth: false,
            escalate_prompt: None,
        })
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.previous_priv = Some(parent.into());
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

    /// Mark escalation as password-protected.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.escalate_auth = true;
        self.escalate_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Check if this level matches a prompt.
    pub fn matches(&self, prompt: &str) -> bool {
        self.pattern.is_match(prompt.as_bytes())
    }
}
