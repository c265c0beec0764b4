//! Read-only command execution with optional wait conditions.
//!
//! Commands are run in order and, when `wait_for` is set, re-run until the
//! conditions hold or the retries are used up.
//!
//! ```rust,no_run
//! # async fn demo(driver: &mut freertr::CliDriver) -> freertr::Result<()> {
//! use freertr::commands::{CommandRequest, run};
//!
//! let request = CommandRequest::new(["show platform"])
//!     .wait_for(["result[0] contains freeRouter"]);
//! let outcome = run(driver, &request).await?;
//! println!("{}", outcome.stdout[0]);
//! # Ok(())
//! # }
//! ```

mod conditional;

pub use conditional::{Conditional, Operator};

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};

use crate::driver::{Command, CommandRunner};
use crate::error::{CommandError, Result};

/// How many `wait_for` expressions must hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    #[default]
    All,
    Any,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub commands: Vec<Command>,
    #[serde(default)]
    pub wait_for: Vec<String>,
    #[serde(default, rename = "match")]
    pub match_policy: MatchPolicy,
    #[serde(default = "default_retries")]
    pub retries: u32,
    /// Pause between rounds; whole seconds when deserialized.
    #[serde(default = "default_interval", deserialize_with = "seconds")]
    pub interval: Duration,
    #[serde(default)]
    pub dry_run: bool,
}

fn default_retries() -> u32 {
    10
}

fn default_interval() -> Duration {
    Duration::from_secs(1)
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

impl CommandRequest {
    pub fn new<I, C>(commands: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            wait_for: vec![],
            match_policy: MatchPolicy::All,
            retries: default_retries(),
            interval: default_interval(),
            dry_run: false,
        }
    }

    pub fn wait_for<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wait_for = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub stdout: Vec<String>,
    pub stdout_lines: Vec<Vec<String>>,
    pub warnings: Vec<String>,
}

/// Commands that may be sent, plus warnings for those that were dropped.
///
/// In dry-run only `show` commands survive. Otherwise any `conf...`
/// command rejects the whole request.
pub fn filter_commands(commands: &[Command], dry_run: bool) -> Result<(Vec<Command>, Vec<String>)> {
    let mut kept = Vec::with_capacity(commands.len());
    let mut warnings = vec![];

    for command in commands {
        let text = command.text();
        if dry_run && !text.starts_with("show") {
            warnings.push(format!("only show commands are supported in dry-run mode, not executing `{}`", text));
        } else if text.starts_with("conf") {
            return Err(CommandError::ConfigModeNotAllowed {
                command: text.to_string(),
            }
            .into());
        } else {
            kept.push(command.clone());
        }
    }

    Ok((kept, warnings))
}

/// Run `request` against `runner`, polling until its conditions hold.
pub async fn run<R: CommandRunner>(runner: &mut R, request: &CommandRequest) -> Result<CommandOutcome> {
    let (commands, warnings) = filter_commands(&request.commands, request.dry_run)?;
    for warning in &warnings {
        warn!("{}", warning);
    }

    let mut pending = request
        .wait_for
        .iter()
        .map(|expr| expr.parse::<Conditional>())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut outputs = vec![];
    let mut round = 0;
    while round < request.retries.max(1) {
        round += 1;
        outputs = runner.run_commands(&commands, true).await?;

        if pending.is_empty() {
            break;
        }

        match request.match_policy {
            MatchPolicy::Any if pending.iter().any(|c| c.evaluate(&outputs)) => pending.clear(),
            MatchPolicy::Any => {}
            MatchPolicy::All => pending.retain(|c| !c.evaluate(&outputs)),
        }

        if pending.is_empty() {
            break;
        }

        debug!("round {}: {} condition(s) unmet", round, pending.len());
        if round < request.retries && !request.interval.is_zero() {
            tokio::time::sleep(request.interval).await;
        }
    }

    if !pending.is_empty() {
        return Err(CommandError::ConditionsNotMet {
            failed: pending.iter().map(|c| c.raw().to_string()).collect(),
        }
        .into());
    }

    let stdout_lines = outputs
        .iter()
        .map(|out| out.split('\n').map(str::to_string).collect())
        .collect();

    Ok(CommandOutcome {
        stdout: outputs,
        stdout_lines,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conf_commands_rejected() {
        let commands = vec![Command::new("show version"), Command::new("configure terminal")];
        let err = filter_commands(&commands, false).unwrap_err();
        assert!(err.to_string().contains("configure terminal"));
    }

    #[test]
    fn test_dry_run_keeps_only_show() {
        let commands = vec![Command::new("show version"), Command::new("clear counters")];
        let (kept, warnings) = filter_commands(&commands, true).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text(), "show version");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("clear counters"));
    }

    #[test]
    fn test_request_deserialize_defaults() {
        let request: CommandRequest = serde_json::from_value(serde_json::json!({
            "commands": ["show platform", {"command": "ping 1.1.1.1", "prompt": "\\?", "answer": "y"}],
            "match": "any",
            "interval": 0
        }))
        .unwrap();

        assert_eq!(request.commands.len(), 2);
        assert!(request.commands[1].is_interactive());
        assert_eq!(request.match_policy, MatchPolicy::Any);
        assert_eq!(request.retries, 10);
        assert_eq!(request.interval, Duration::ZERO);
        assert!(!request.dry_run);
    }
}
