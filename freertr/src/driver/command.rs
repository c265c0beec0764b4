//! Commands sent to the router.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One CLI command, optionally answering an interactive prompt.
///
/// Deserializes from either a bare string or a map:
///
/// ```rust
/// use freertr::Command;
///
/// let plain: Command = serde_json::from_str(r#""show platform""#).unwrap();
/// assert_eq!(plain.command, "show platform");
///
/// let confirm: Command = serde_json::from_str(
///     r#"{"command": "reload", "prompt": "\\[confirm yes/no\\]:", "answer": "yes"}"#,
/// ).unwrap();
/// assert!(confirm.is_interactive());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommandSpec")]
pub struct Command {
    /// Command text.
    pub command: String,

    /// Pattern of the prompt the command is expected to raise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    /// Text sent when `prompt` appears.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl Command {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            prompt: None,
            answer: None,
        }
    }

    /// Attach an expected prompt and its answer.
    pub fn with_prompt(mut self, prompt: impl Into<String>, answer: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self.answer = Some(answer.into());
        self
    }

    /// Whether this command carries both a prompt and an answer.
    pub fn is_interactive(&self) -> bool {
        self.prompt.is_some() && self.answer.is_some()
    }

    /// Command text with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.command.trim()
    }
}

impl From<&str> for Command {
    fn from(command: &str) -> Self {
        Self::new(command)
    }
}

impl From<String> for Command {
    fn from(command: String) -> Self {
        Self::new(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)
    }
}

/// Build a command list from plain strings.
pub fn to_commands<I, S>(commands: I) -> Vec<Command>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    commands.into_iter().map(|c| Command::new(c)).collect()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommandSpec {
    Text(String),
    Full {
        command: String,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        answer: Option<String>,
    },
}

impl From<CommandSpec> for Command {
    fn from(spec: CommandSpec) -> Self {
        match spec {
            CommandSpec::Text(command) => Command::new(command),
            CommandSpec::Full {
                command,
                prompt,
                answer,
            } => Command {
                command,
                prompt,
                answer,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_list() {
        let commands: Vec<Command> = serde_json::from_str(
            r#"["show platform", {"command": "copy running-config startup-config", "prompt": "confirm", "answer": "yes"}]"#,
        )
        .unwrap();
        assert_eq!(commands.len(), 2);
        assert!(!commands[0].is_interactive());
        assert_eq!(commands[1].answer.as_deref(), Some("yes"));
    }

    #[test]
    fn test_prompt_without_answer_is_not_interactive() {
        let command: Command =
            serde_json::from_str(r#"{"command": "reload", "prompt": "confirm"}"#).unwrap();
        assert!(!command.is_interactive());
    }

    #[test]
    fn test_serialize_skips_empty_prompt() {
        let json = serde_json::to_string(&Command::new("show version")).unwrap();
        assert_eq!(json, r#"{"command":"show version"}"#);
    }

    #[test]
    fn test_to_commands() {
        let commands = to_commands(["show interfaces", "show ipv4 interface"]);
        assert_eq!(commands[1], Command::new("show ipv4 interface"));
    }
}
