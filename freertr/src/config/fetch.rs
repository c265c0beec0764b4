//! Reading configuration from the router.

use serde::{Deserialize, Serialize};

use crate::cache::ResponseCache;
use crate::driver::CommandRunner;
use crate::error::{ConfigError, Error, Result};

/// Which configuration to read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    #[default]
    Running,
    Startup,
}

impl ConfigSource {
    /// `show running-config [flags]` or `show startup-config`.
    pub fn command<S: AsRef<str>>(self, flags: &[S]) -> String {
        match self {
            ConfigSource::Running => std::iter::once("show running-config")
                .chain(flags.iter().map(|f| f.as_ref()))
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string(),
            ConfigSource::Startup => "show startup-config".to_string(),
        }
    }
}

/// Configuration text with surrounding whitespace removed.
///
/// Each distinct command is sent at most once per `cache`.
pub async fn get_config<R, S>(
    runner: &mut R,
    cache: &mut ResponseCache,
    source: ConfigSource,
    flags: &[S],
) -> Result<String>
where
    R: CommandRunner,
    S: AsRef<str>,
{
    let command = source.command(flags);
    match cache.get_or_fetch(runner, &command).await {
        Ok(output) => Ok(output.trim().to_string()),
        Err(Error::Driver(e)) => Err(ConfigError::Fetch {
            message: e.to_string(),
        }
        .into()),
        Err(e) => Err(e),
    }
}
