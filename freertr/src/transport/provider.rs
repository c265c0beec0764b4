//! Connection provider options with environment fallbacks.
//!
//! A provider is the flat set of connection options an inventory entry
//! carries. Credentials that are not given explicitly are taken from the
//! environment:
//!
//! | option        | variable                  |
//! |---------------|---------------------------|
//! | `username`    | `FREERTR_NET_USERNAME`    |
//! | `password`    | `FREERTR_NET_PASSWORD`    |
//! | `ssh_keyfile` | `FREERTR_NET_SSH_KEYFILE` |
//! | `authorize`   | `FREERTR_NET_AUTHORIZE`   |
//! | `auth_pass`   | `FREERTR_NET_AUTH_PASS`   |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::driver::DriverBuilder;
use crate::error::{DriverError, Result};

pub const ENV_USERNAME: &str = "FREERTR_NET_USERNAME";
pub const ENV_PASSWORD: &str = "FREERTR_NET_PASSWORD";
pub const ENV_SSH_KEYFILE: &str = "FREERTR_NET_SSH_KEYFILE";
pub const ENV_AUTHORIZE: &str = "FREERTR_NET_AUTHORIZE";
pub const ENV_AUTH_PASS: &str = "FREERTR_NET_AUTH_PASS";

const DEFAULT_PORT: u16 = 22;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection options for one router.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssh_keyfile: Option<PathBuf>,
    /// Enter privileged mode with `enable` after login.
    pub authorize: Option<bool>,
    /// Password for `enable`.
    pub auth_pass: Option<String>,
    /// Command timeout in seconds.
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    /// Fill unset credentials from the process environment.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fill unset credentials from `lookup`.
    pub fn with_fallback<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.username.is_none() {
            self.username = lookup(ENV_USERNAME);
        }
        if self.password.is_none() {
            self.password = lookup(ENV_PASSWORD);
        }
        if self.ssh_keyfile.is_none() {
            self.ssh_keyfile = lookup(ENV_SSH_KEYFILE).map(PathBuf::from);
        }
        if self.authorize.is_none() {
            self.authorize = lookup(ENV_AUTHORIZE).map(|v| parse_bool(&v));
        }
        if self.auth_pass.is_none() {
            self.auth_pass = lookup(ENV_AUTH_PASS);
        }
        self
    }

    /// Port, defaulting to 22.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Command timeout, defaulting to 30 seconds.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Turn these options into a driver builder.
    ///
    /// A password takes precedence over a key file when both are set.
    pub fn into_builder(self) -> Result<DriverBuilder> {
        let port = self.port();
        let timeout = self.timeout();

        let host = self.host.ok_or_else(|| DriverError::InvalidConfig {
            message: "provider host is required".to_string(),
        })?;

        let mut builder = DriverBuilder::new(host).port(port).timeout(timeout);

        if let Some(username) = self.username {
            builder = builder.username(username);
        }

        if let Some(password) = self.password {
            builder = builder.password(password);
        } else if let Some(key) = self.ssh_keyfile {
            builder = builder.private_key(key);
        }

        if self.authorize.unwrap_or(false) {
            builder = builder.authorize(self.auth_pass);
        }

        Ok(builder)
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("ssh_keyfile", &self.ssh_keyfile)
            .field("authorize", &self.authorize)
            .field("auth_pass", &self.auth_pass.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "y"
    )
}
