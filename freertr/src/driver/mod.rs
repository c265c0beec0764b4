//! Command execution against a router.
//!
//! [`CommandRunner`] is the seam between the facts, config and commands
//! layers and the device. [`CliDriver`] implements it over SSH; tests
//! implement it over canned output.

mod builder;
mod cli;
mod command;
pub mod config_session;
mod interactive;
mod privilege;
mod response;

pub use builder::DriverBuilder;
pub use cli::CliDriver;
pub use command::{Command, to_commands};
pub use config_session::ConfigSession;
pub use interactive::{InteractiveEvent, InteractiveResult, InteractiveStep};
pub use privilege::{PrivilegeManager, Transition};
pub use response::Response;

use std::future::Future;

use log::debug;

use crate::error::Result;

/// Something that runs CLI commands and returns their output.
pub trait CommandRunner: Send {
    /// Run one command and return its response.
    ///
    /// A command whose output carries a failure marker is returned as a
    /// failed [`Response`], not an error.
    fn run_command(&mut self, command: &Command) -> impl Future<Output = Result<Response>> + Send;

    /// Run commands in order and return their outputs.
    ///
    /// With `check`, the first failed response stops the run with
    /// [`DriverError::CommandFailed`](crate::error::DriverError::CommandFailed).
    fn run_commands(
        &mut self,
        commands: &[Command],
        check: bool,
    ) -> impl Future<Output = Result<Vec<String>>> + Send {
        async move {
            let mut outputs = Vec::with_capacity(commands.len());
            for command in commands {
                let response = self.run_command(command).await?;
                let response = if check {
                    response.into_checked()?
                } else {
                    response
                };
                outputs.push(response.result);
            }
            Ok(outputs)
        }
    }

    /// Apply configuration lines inside `configure terminal` ... `end`.
    ///
    /// Literal `end` lines in `commands` are skipped; the session is always
    /// closed with a single `end`. The first failed line stops the edit.
    fn edit_config(
        &mut self,
        commands: &[Command],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send {
        async move {
            self.run_command(&Command::new("configure terminal"))
                .await?
                .into_checked()?;

            let mut responses = Vec::with_capacity(commands.len());
            let mut failure = None;
            for command in commands.iter().filter(|c| c.text() != "end") {
                match self.run_command(command).await?.into_checked() {
                    Ok(response) => responses.push(response),
                    Err(e) => {
                        failure = Some(e);
                        break;
                    }
                }
            }

            self.run_command(&Command::new("end")).await?;
            debug!("applied {} configuration lines", responses.len());

            match failure {
                Some(e) => Err(e),
                None => Ok(responses),
            }
        }
    }
}
