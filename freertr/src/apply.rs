//! Pushing configuration to the router.
//!
//! [`apply_config`] builds a candidate from `lines`/`parents` or a full
//! `src` blob, diffs it against the running configuration, wraps the result
//! in `before`/`after` commands and sends it inside a configuration session.
//! Optionally the running configuration is backed up first and saved to
//! startup afterwards.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::cache::ResponseCache;
use crate::config::{ConfigSource, DiffOptions, MatchMode, NetworkConfig, ReplaceMode, get_config};
use crate::driver::{Command, CommandRunner};
use crate::error::{ConfigError, Result};

/// Command that copies the running configuration to startup.
pub const SAVE_COMMAND: &str = "copy running-config startup-config";

/// Prompt raised by [`SAVE_COMMAND`].
pub const SAVE_PROMPT: &str = r"\[confirm yes/no\]:\s?$";

const DEFAULT_BACKUP_DIR: &str = "backup";

/// Whether changes are sent or only computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    #[default]
    Merge,
    Check,
}

/// Where a configuration backup is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BackupOptions {
    pub filename: Option<String>,
    pub dir_path: Option<PathBuf>,
}

impl BackupOptions {
    /// `dir_path/filename`, defaulting to `backup/<host>_config.<unix-seconds>`.
    pub fn resolve(&self, host: &str) -> PathBuf {
        let dir = self
            .dir_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BACKUP_DIR));
        let filename = self.filename.clone().unwrap_or_else(|| {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            format!("{}_config.{}", host, secs)
        });
        dir.join(filename)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigRequest {
    #[serde(alias = "commands")]
    pub lines: Vec<Command>,
    pub parents: Vec<String>,
    /// A complete configuration blob, parsed with one-space indentation.
    pub src: Option<String>,
    pub before: Vec<Command>,
    pub after: Vec<Command>,
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
    #[serde(rename = "replace")]
    pub replace_mode: ReplaceMode,
    pub update: UpdateMode,
    pub save: bool,
    /// Running configuration to diff against instead of reading it.
    #[serde(alias = "config")]
    pub running_config: Option<String>,
    pub backup: bool,
    pub backup_options: Option<BackupOptions>,
    /// Host name used in the default backup file name.
    pub host: Option<String>,
    pub dry_run: bool,
}

impl ConfigRequest {
    pub fn lines<I, C>(lines: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Command>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Default::default()
        }
    }

    pub fn parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    /// Reject option pairs that cannot be combined.
    pub fn validate(&self) -> Result<()> {
        if self.src.is_some() {
            if !self.lines.is_empty() {
                return Err(ConfigError::MutuallyExclusive {
                    first: "lines",
                    second: "src",
                }
                .into());
            }
            if !self.parents.is_empty() {
                return Err(ConfigError::MutuallyExclusive {
                    first: "parents",
                    second: "src",
                }
                .into());
            }
        }
        Ok(())
    }

    /// The desired configuration as a tree.
    pub fn candidate(&self) -> NetworkConfig {
        let mut candidate = NetworkConfig::new(1);
        if let Some(src) = &self.src {
            candidate.load(src);
        } else if !self.lines.is_empty() {
            let lines: Vec<&str> = self.lines.iter().map(Command::text).collect();
            candidate.add(&lines, &self.parents);
        }
        candidate
    }

    fn has_input(&self) -> bool {
        !self.lines.is_empty() || self.src.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOutcome {
    pub changed: bool,
    pub saved: bool,
    /// Commands sent, or that would have been sent.
    pub commands: Vec<String>,
    /// Running configuration captured before any change.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
    pub warnings: Vec<String>,
}

/// Apply `request` through `runner`.
///
/// Running configuration reads go through `cache`.
pub async fn apply_config<R: CommandRunner>(
    runner: &mut R,
    cache: &mut ResponseCache,
    request: &ConfigRequest,
) -> Result<ConfigOutcome> {
    request.validate()?;

    let mut outcome = ConfigOutcome::default();
    let candidate = request.candidate();

    // The backup always reflects the device, never a supplied running_config.
    if request.backup && !request.dry_run {
        let running = get_config(runner, cache, ConfigSource::Running, &[] as &[&str]).await?;
        let host = request.host.as_deref().unwrap_or("freertr");
        let path = request.backup_options.clone().unwrap_or_default().resolve(host);
        write_backup(&path, &running).await?;
        info!("configuration backed up to {}", path.display());
        outcome.backup = Some(running);
        outcome.backup_path = Some(path);
    }

    if request.has_input() {
        let updates = if request.match_mode == MatchMode::None {
            candidate.objects().commands()
        } else {
            let running = running_config(runner, cache, request).await?;
            let running = NetworkConfig::parse(&running, 1);
            let options = DiffOptions::new(request.match_mode, request.replace_mode)
                .with_path(request.parents.clone());
            candidate.difference(&running, &options).commands()
        };

        if !updates.is_empty() {
            let commands: Vec<Command> = request
                .before
                .iter()
                .cloned()
                .chain(updates.into_iter().map(|text| carry_prompt(&request.lines, text)))
                .chain(request.after.iter().cloned())
                .collect();

            if !request.dry_run && request.update == UpdateMode::Merge {
                runner.edit_config(&commands).await?;
            } else {
                debug!("not sending {} commands", commands.len());
            }

            outcome.changed = true;
            outcome.commands = commands.into_iter().map(|c| c.command).collect();
        }
    }

    if request.save {
        outcome.changed = true;
        if request.dry_run {
            let warning = format!(
                "Skipping command `{}` due to dry run. Configuration not copied to non-volatile storage",
                SAVE_COMMAND
            );
            warn!("{}", warning);
            outcome.warnings.push(warning);
        } else {
            let save = Command::new(SAVE_COMMAND).with_prompt(SAVE_PROMPT, "yes");
            runner.run_command(&save).await?.into_checked()?;
            outcome.saved = true;
        }
    }

    Ok(outcome)
}

async fn running_config<R: CommandRunner>(
    runner: &mut R,
    cache: &mut ResponseCache,
    request: &ConfigRequest,
) -> Result<String> {
    match &request.running_config {
        Some(config) => Ok(config.clone()),
        None => get_config(runner, cache, ConfigSource::Running, &[] as &[&str]).await,
    }
}

/// The emitted command for `text`, keeping any prompt the matching input
/// line carried.
fn carry_prompt(lines: &[Command], text: String) -> Command {
    lines
        .iter()
        .find(|line| line.is_interactive() && line.text() == text.trim())
        .map(|line| Command {
            command: text.clone(),
            prompt: line.prompt.clone(),
            answer: line.answer.clone(),
        })
        .unwrap_or_else(|| Command::new(text))
}

async fn write_backup(path: &Path, contents: &str) -> Result<()> {
    let io_err = |source| ConfigError::Backup {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    }
    tokio::fs::write(path, contents).await.map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutually_exclusive() {
        let mut request = ConfigRequest::src("hostname r1\n");
        request.lines = vec![Command::new("hostname r2")];
        assert!(matches!(
            request.validate(),
            Err(crate::Error::Config(ConfigError::MutuallyExclusive { first: "lines", .. }))
        ));

        let request = ConfigRequest::src("hostname r1\n").parents(["interface ethernet1"]);
        assert!(matches!(
            request.validate(),
            Err(crate::Error::Config(ConfigError::MutuallyExclusive { first: "parents", .. }))
        ));
    }

    #[test]
    fn test_candidate_from_lines() {
        let request = ConfigRequest::lines(["mtu 9000", "description uplink"]).parents(["interface ethernet1"]);
        let candidate = request.candidate();
        let texts: Vec<&str> = candidate.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["interface ethernet1", "mtu 9000", "description uplink"]);
    }

    #[test]
    fn test_carry_prompt() {
        let lines = vec![Command::new("crypto key generate rsa").with_prompt(r"\[yes/no\]", "yes")];
        let cmd = carry_prompt(&lines, "crypto key generate rsa".to_string());
        assert!(cmd.is_interactive());
        assert!(!carry_prompt(&lines, "hostname r1".to_string()).is_interactive());
    }

    #[test]
    fn test_backup_path() {
        let options = BackupOptions {
            filename: Some("r1.cfg".into()),
            dir_path: Some(PathBuf::from("/tmp/backups")),
        };
        assert_eq!(options.resolve("r1"), PathBuf::from("/tmp/backups/r1.cfg"));

        let path = BackupOptions::default().resolve("r1");
        assert!(path.starts_with("backup"));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("r1_config."));
    }

    #[test]
    fn test_request_deserialize() {
        let request: ConfigRequest = serde_json::from_value(serde_json::json!({
            "lines": ["mtu 9000"],
            "parents": ["interface ethernet1"],
            "match": "strict",
            "replace": "block",
            "update": "check",
        }))
        .unwrap();
        assert_eq!(request.match_mode, MatchMode::Strict);
        assert_eq!(request.replace_mode, ReplaceMode::Block);
        assert_eq!(request.update, UpdateMode::Check);
        assert!(!request.save);
    }
}
