//! Commands that raise prompts.
//!
//! Some FreeRTR commands stop and ask before acting:
//! - `copy running-config startup-config` asks `[confirm yes/no]:`
//! - `enable` asks for a password when one is set
//!
//! [`CliDriver::send_interactive`](super::CliDriver::send_interactive)
//! sends a sequence of inputs, waiting for a pattern after each one.

use std::time::Duration;

use regex::bytes::Regex;

use super::command::Command;
use crate::channel::compile_prompt_pattern;

/// One input of an interactive sequence.
///
/// ```rust
/// use freertr::driver::InteractiveEvent;
///
/// let events = vec![
///     InteractiveEvent::try_new("copy running-config startup-config", r"\[confirm yes/no\]:\s?$")?,
///     InteractiveEvent::until_prompt("yes"),
/// ];
/// # Ok::<(), regex::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct InteractiveEvent {
    /// Text to send.
    pub input: String,

    /// Pattern to wait for after sending; `None` waits for the device prompt.
    pub pattern: Option<Regex>,

    /// Keep the input out of the logs.
    pub hidden: bool,

    /// Timeout override for this event.
    pub timeout: Option<Duration>,
}

impl InteractiveEvent {
    /// Send `input` and wait for `pattern` at the end of the output.
    pub fn try_new(input: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            input: input.into(),
            pattern: Some(compile_prompt_pattern(pattern)?),
            hidden: false,
            timeout: None,
        })
    }

    /// Send `input` and wait for the device prompt.
    pub fn until_prompt(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            pattern: None,
            hidden: false,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// The two-step sequence for a command carrying a prompt and answer.
    ///
    /// Returns `None` when the command is not interactive.
    pub fn from_command(command: &Command) -> Option<Result<Vec<Self>, regex::Error>> {
        let (prompt, answer) = command.prompt.as_deref().zip(command.answer.as_deref())?;
        Some(
            Self::try_new(command.text(), prompt)
                .map(|first| vec![first, Self::until_prompt(answer)]),
        )
    }
}

/// Output collected for one event.
#[derive(Debug, Clone)]
pub struct InteractiveStep {
    pub input: String,
    pub output: String,
    pub failed: bool,
}

/// Result of an interactive sequence.
#[derive(Debug, Clone)]
pub struct InteractiveResult {
    pub steps: Vec<InteractiveStep>,
    pub elapsed: Duration,
    pub failed: bool,
}

impl InteractiveResult {
    pub fn new(steps: Vec<InteractiveStep>, elapsed: Duration) -> Self {
        let failed = steps.iter().any(|s| s.failed);
        Self {
            steps,
            elapsed,
            failed,
        }
    }

    pub fn final_output(&self) -> Option<&str> {
        self.steps.last().map(|s| s.output.as_str())
    }

    /// Outputs of every step, one after the other.
    pub fn full_output(&self) -> String {
        self.steps
            .iter()
            .map(|s| s.output.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command() {
        let command = Command::new("copy running-config startup-config")
            .with_prompt(r"\[confirm yes/no\]:\s?$", "yes");
        let events = InteractiveEvent::from_command(&command).unwrap().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].pattern.as_ref().unwrap().is_match(b"[confirm yes/no]: "));
        assert_eq!(events[1].input, "yes");
        assert!(events[1].pattern.is_none());
    }

    #[test]
    fn test_prompt_must_end_output() {
        let command = Command::new("copy running-config startup-config")
            .with_prompt(r"\[confirm yes/no\]:", "yes");
        let events = InteractiveEvent::from_command(&command).unwrap().unwrap();
        let pattern = events[0].pattern.as_ref().unwrap();
        assert!(pattern.is_match(b"overwrite? [confirm yes/no]: "));
        assert!(!pattern.is_match(b"[confirm yes/no]: was disabled\nrtr1#"));
    }

    #[test]
    fn test_from_plain_command() {
        assert!(InteractiveEvent::from_command(&Command::new("show platform")).is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let command = Command::new("reload").with_prompt("([", "yes");
        assert!(InteractiveEvent::from_command(&command).unwrap().is_err());
    }

    #[test]
    fn test_full_output_skips_empty_steps() {
        let result = InteractiveResult::new(
            vec![
                InteractiveStep {
                    input: "copy".into(),
                    output: String::new(),
                    failed: false,
                },
                InteractiveStep {
                    input: "yes".into(),
                    output: "saved".into(),
                    failed: false,
                },
            ],
            Duration::ZERO,
        );
        assert_eq!(result.full_output(), "saved");
        assert!(!result.failed);
    }
}
