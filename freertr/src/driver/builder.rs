//! Builder for the FreeRTR CLI driver.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::cli::CliDriver;
use crate::channel::DEFAULT_SEARCH_DEPTH;
use crate::error::{DriverError, Result};
use crate::platform::{PlatformDefinition, freertr};
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for [`CliDriver`].
///
/// # Example
///
/// ```rust,no_run
/// use freertr::DriverBuilder;
///
/// # async fn example() -> Result<(), freertr::Error> {
/// let mut driver = DriverBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .authorize(Some("enable-secret".to_string()))
///     .build()?;
/// driver.open().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    custom_platform: Option<PlatformDefinition>,
    timeout: Duration,
    terminal_size: Option<(u32, u32)>,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    authorize: bool,
    enable_password: Option<SecretString>,
    search_depth: usize,
}

impl DriverBuilder {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            custom_platform: None,
            timeout: Duration::from_secs(30),
            terminal_size: None,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            authorize: false,
            enable_password: None,
            search_depth: DEFAULT_SEARCH_DEPTH,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Enter privileged mode after login, answering the password prompt
    /// with `enable_password` when the router asks for one.
    pub fn authorize(mut self, enable_password: Option<String>) -> Self {
        self.authorize = true;
        self.enable_password = enable_password.map(SecretString::from);
        self
    }

    /// Replace the built-in FreeRTR dialect.
    pub fn custom_platform(mut self, platform: PlatformDefinition) -> Self {
        self.custom_platform = Some(platform);
        self
    }

    /// Connect and per-command timeout (default: 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the terminal size announced by the platform.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_size = Some((width, height));
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Bytes at the end of the output searched for the prompt.
    pub fn search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    /// Build the driver without connecting.
    pub fn build(self) -> Result<CliDriver> {
        let username = self.username.ok_or_else(|| DriverError::InvalidConfig {
            message: "username is required".to_string(),
        })?;

        let platform = match self.custom_platform {
            Some(platform) => platform,
            None => freertr::platform()?,
        };

        let (terminal_width, terminal_height) = self
            .terminal_size
            .unwrap_or((platform.terminal_width, platform.terminal_height));

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width,
            terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        CliDriver::new(ssh_config, platform)
            .map(|driver| {
                driver
                    .with_search_depth(self.search_depth)
                    .with_authorize(self.authorize, self.enable_password)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_required() {
        let result = DriverBuilder::new("rtr1").password("x").build();
        assert!(matches!(
            result,
            Err(crate::Error::Driver(DriverError::InvalidConfig { .. }))
        ));
    }

    #[test]
    fn test_build_uses_freertr_platform() {
        let driver = DriverBuilder::new("rtr1")
            .username("admin")
            .password("x")
            .build()
            .unwrap();
        assert_eq!(driver.platform().name, "freertr");
        assert!(!driver.is_open());
        assert_eq!(driver.ssh_config().terminal_width, 255);
    }

    #[test]
    fn test_terminal_size_override() {
        let driver = DriverBuilder::new("rtr1")
            .username("admin")
            .terminal_size(132, 50)
            .build()
            .unwrap();
        assert_eq!(driver.ssh_config().terminal_width, 132);
        assert_eq!(driver.ssh_config().terminal_height, 50);
    }
}
