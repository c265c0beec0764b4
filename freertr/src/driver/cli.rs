//! SSH CLI driver for FreeRTR routers.

use std::time::{Duration, Instant};

use log::{debug, info, trace};
use regex::bytes::Regex;
use secrecy::{ExposeSecret, SecretString};

use super::CommandRunner;
use super::command::Command;
use super::config_session::ConfigSession;
use super::interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::{DEFAULT_SEARCH_DEPTH, PtyChannel, combine_patterns};
use crate::error::{ChannelError, DriverError, Result};
use crate::platform::PlatformDefinition;
use crate::platform::freertr::CONFIG_PROMPT_SUFFIX;
use crate::transport::SshTransport;
use crate::transport::config::SshConfig;

/// Upper bound on `exit` commands sent while leaving nested config blocks.
const MAX_CONFIG_DEPTH: usize = 16;

/// Driver for one router session over SSH.
///
/// Handles:
/// - SSH transport and the interactive shell channel
/// - Command execution with prompt detection
/// - Privilege level navigation, including `enable` authentication
pub struct CliDriver {
    ssh_config: SshConfig,
    platform: PlatformDefinition,
    transport: Option<SshTransport>,
    channel: Option<PtyChannel>,
    privilege_manager: PrivilegeManager,
    timeout: Duration,
    prompt_pattern: Regex,
    search_depth: usize,
    authorize: bool,
    enable_password: Option<SecretString>,
}

impl CliDriver {
    pub fn new(ssh_config: SshConfig, platform: PlatformDefinition) -> Result<Self> {
        let prompt_pattern = platform
            .prompt_pattern()
            .map_err(ChannelError::InvalidPattern)?;

        Ok(Self {
            timeout: ssh_config.timeout,
            privilege_manager: PrivilegeManager::new(platform.privilege_levels.clone()),
            ssh_config,
            platform,
            transport: None,
            channel: None,
            prompt_pattern,
            search_depth: DEFAULT_SEARCH_DEPTH,
            authorize: false,
            enable_password: None,
        })
    }

    pub(crate) fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    pub(crate) fn with_authorize(mut self, authorize: bool, password: Option<SecretString>) -> Self {
        self.authorize = authorize;
        self.enable_password = password;
        self
    }

    /// Connect, settle at a known prompt and prepare the terminal.
    ///
    /// Leaves any configuration block the login landed in, then enters
    /// privileged mode when the driver was built with `authorize`.
    pub async fn open(&mut self) -> Result<()> {
        if self.transport.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        info!(
            "connecting to {} as {}",
            self.ssh_config.socket_addr(),
            self.ssh_config.username
        );

        let transport = SshTransport::connect(self.ssh_config.clone()).await?;
        let mut channel = PtyChannel::new(transport.open_channel().await?, self.search_depth);

        let banner = channel.read_until(&self.prompt_pattern, self.timeout).await?;
        self.transport = Some(transport);
        self.channel = Some(channel);

        let prompt = last_line(&String::from_utf8_lossy(&banner)).to_string();
        self.track_prompt(&prompt)?;

        let mut prompt = prompt;
        for _ in 0..MAX_CONFIG_DEPTH {
            if !prompt.ends_with(CONFIG_PROMPT_SUFFIX) {
                break;
            }
            prompt = self.send_command("exit").await?.prompt;
        }

        for command in self.platform.on_open_commands.clone() {
            self.send_command(&command).await?.into_checked()?;
        }

        if self.authorize {
            let target = self.platform.default_privilege.clone();
            self.acquire_privilege(&target).await?;
        }

        debug!(
            "session open at privilege {:?}",
            self.privilege_manager.current_name()
        );
        Ok(())
    }

    pub async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            channel.close().await?;
        }
        if let Some(transport) = self.transport.take() {
            transport.close().await?;
        }
        self.privilege_manager.reset();
        Ok(())
    }

    /// Send one line and wait for the prompt.
    ///
    /// Output matching a platform failure marker yields a failed
    /// [`Response`], not an error.
    pub async fn send_command(&mut self, command: &str) -> Result<Response> {
        let start = Instant::now();
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        channel.write(command).await?;
        let raw = channel.read_until(&self.prompt_pattern, self.timeout).await?;
        let elapsed = start.elapsed();

        let raw = String::from_utf8_lossy(&raw).into_owned();
        let prompt = last_line(&raw).to_string();
        self.track_prompt(&prompt)?;

        let result = self.platform.normalize_output(&raw, command);
        debug!("{:?} completed in {:?}", command, elapsed);

        let response = Response::new(command, result, raw, prompt, elapsed);
        Ok(match self.platform.detect_failure(&response.result) {
            Some(marker) => response.with_failure(marker),
            None => response,
        })
    }

    /// Send a sequence of inputs, waiting for each event's pattern.
    pub async fn send_interactive(&mut self, events: &[InteractiveEvent]) -> Result<InteractiveResult> {
        let start = Instant::now();
        let mut steps = Vec::with_capacity(events.len());

        for event in events {
            let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
            if event.hidden {
                trace!("sending hidden input");
            } else {
                trace!("sending {:?}", event.input);
            }

            channel.write(&event.input).await?;
            let timeout = event.timeout.unwrap_or(self.timeout);
            let pattern = event.pattern.as_ref().unwrap_or(&self.prompt_pattern);
            let raw = channel.read_until(pattern, timeout).await?;
            let raw = String::from_utf8_lossy(&raw).into_owned();

            let output = self.platform.normalize_output(&raw, &event.input);
            let failed = self.platform.detect_failure(&output).is_some();
            steps.push(InteractiveStep {
                input: if event.hidden {
                    "<hidden>".to_string()
                } else {
                    event.input.clone()
                },
                output,
                failed,
            });

            if event.pattern.is_none() {
                self.track_prompt(last_line(&raw))?;
            }
        }

        let result = InteractiveResult::new(steps, start.elapsed());
        debug!("interactive sequence completed in {:?}", result.elapsed);
        Ok(result)
    }

    /// Move to the named privilege level one hop at a time.
    pub async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        let current = self
            .privilege_manager
            .current_name()
            .ok_or(DriverError::NotConnected)?
            .to_string();
        if current == target {
            return Ok(());
        }

        let path = self.privilege_manager.find_path(&current, target)?;
        debug!("privilege path {:?}", path);

        for hop in path.windows(2) {
            let transition = self
                .privilege_manager
                .get_transition(&hop[0], &hop[1])
                .ok_or_else(|| DriverError::NoPrivilegePath {
                    from: hop[0].clone(),
                    to: hop[1].clone(),
                })?;

            let prompt = match transition.auth_prompt {
                Some(auth_prompt) => self.escalate_with_auth(&transition.command, &auth_prompt).await?,
                None => self.send_command(&transition.command).await?.prompt,
            };

            let reached = self.privilege_manager.determine_from_prompt(&prompt)?.name.clone();
            if reached != hop[1] {
                return Err(DriverError::PrivilegeAcquisitionFailed {
                    target: target.to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Enter configuration mode behind an RAII guard.
    pub async fn config_session(&mut self) -> Result<ConfigSession<'_>> {
        ConfigSession::new(self).await
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_some()
    }

    /// Whether the SSH session is still up.
    pub fn is_alive(&self) -> bool {
        self.transport.as_ref().is_some_and(SshTransport::is_alive)
    }

    pub fn current_privilege(&self) -> Option<&str> {
        self.privilege_manager.current_name()
    }

    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    pub fn ssh_config(&self) -> &SshConfig {
        &self.ssh_config
    }

    pub fn privilege_manager(&self) -> &PrivilegeManager {
        &self.privilege_manager
    }

    /// Send an escalate command that may ask for a password.
    ///
    /// Returns the prompt reached afterwards.
    async fn escalate_with_auth(&mut self, command: &str, auth_prompt: &Regex) -> Result<String> {
        let either = combine_patterns([auth_prompt, &self.prompt_pattern])
            .map_err(ChannelError::InvalidPattern)?;
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;

        channel.write(command).await?;
        let raw = channel.read_until(&either, self.timeout).await?;

        let raw = if auth_prompt.is_match(&raw) {
            let password = self.enable_password.as_ref().ok_or_else(|| {
                DriverError::PrivilegeAcquisitionFailed {
                    target: format!("{} (password required)", command),
                }
            })?;
            trace!("sending enable password");
            channel.write(password.expose_secret()).await?;
            channel.read_until(&self.prompt_pattern, self.timeout).await?
        } else {
            raw
        };

        let prompt = last_line(&String::from_utf8_lossy(&raw)).to_string();
        self.track_prompt(&prompt)?;
        Ok(prompt)
    }

    fn track_prompt(&mut self, prompt: &str) -> Result<()> {
        let name = self.privilege_manager.determine_from_prompt(prompt)?.name.clone();
        trace!("prompt {:?} is {}", prompt, name);
        self.privilege_manager.set_current(&name)
    }
}

impl CommandRunner for CliDriver {
    async fn run_command(&mut self, command: &Command) -> Result<Response> {
        let Some(events) = InteractiveEvent::from_command(command) else {
            return self.send_command(command.text()).await;
        };

        let events = events.map_err(ChannelError::InvalidPattern)?;
        let result = self.send_interactive(&events).await?;
        let output = result.full_output();

        let response = Response::new(
            command.text(),
            output.clone(),
            output,
            self.current_privilege().unwrap_or_default(),
            result.elapsed,
        );
        Ok(match self.platform.detect_failure(&response.result) {
            Some(marker) => response.with_failure(marker),
            None => response,
        })
    }

    async fn edit_config(&mut self, commands: &[Command]) -> Result<Vec<Response>> {
        let mut session = self.config_session().await?;
        let mut responses = Vec::with_capacity(commands.len());

        for command in commands.iter().filter(|c| c.text() != "end") {
            match session.run_command(command).await?.into_checked() {
                Ok(response) => responses.push(response),
                Err(e) => {
                    session.commit().await?;
                    return Err(e);
                }
            }
        }

        session.commit().await?;
        Ok(responses)
    }
}

/// Last non-empty line of device output, trimmed.
fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
}
