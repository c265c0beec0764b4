//! Command output cache for one run.
//!
//! Fetching the running configuration is the slowest read a run does and
//! several steps need it. The cache is owned by the caller and lives only
//! as long as they keep it.

use std::collections::HashMap;

use log::debug;

use crate::driver::{Command, CommandRunner};
use crate::error::Result;

/// Outputs keyed by command text with whitespace collapsed.
#[derive(Debug, Default, Clone)]
pub struct ResponseCache {
    entries: HashMap<String, String>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, command: &str) -> Option<&str> {
        self.entries.get(&normalize(command)).map(String::as_str)
    }

    pub fn insert(&mut self, command: &str, output: impl Into<String>) {
        self.entries.insert(normalize(command), output.into());
    }

    pub fn contains(&self, command: &str) -> bool {
        self.entries.contains_key(&normalize(command))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Cached output of `command`, running it on a miss.
    ///
    /// A failed response is returned as an error and not cached.
    pub async fn get_or_fetch<R: CommandRunner>(&mut self, runner: &mut R, command: &str) -> Result<String> {
        let key = normalize(command);
        if let Some(output) = self.entries.get(&key) {
            debug!("cache hit for {:?}", key);
            return Ok(output.clone());
        }

        let response = runner.run_command(&Command::new(key.clone())).await?.into_checked()?;
        self.entries.insert(key, response.result.clone());
        Ok(response.result)
    }
}

fn normalize(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}
