//! Configuration mode as an RAII guard.
//!
//! FreeRTR applies configuration lines as they are entered; there is no
//! candidate to commit or discard. The guard only makes sure the driver
//! leaves configuration mode and returns to where it started:
//! - The guard holds `&mut CliDriver`, so nothing else can use the driver
//! - `commit()` and `detach()` consume the guard
//!
//! # Example
//!
//! ```rust,no_run
//! use freertr::DriverBuilder;
//!
//! # async fn example() -> Result<(), freertr::Error> {
//! let mut driver = DriverBuilder::new("192.168.1.1")
//!     .username("admin")
//!     .password("secret")
//!     .build()?;
//! driver.open().await?;
//!
//! let mut session = driver.config_session().await?;
//! session.send_command("hostname rtr1").await?;
//! session.commit().await?;
//! # Ok(())
//! # }
//! ```

use log::warn;

use super::CommandRunner;
use super::cli::CliDriver;
use super::command::Command;
use super::response::Response;
use crate::error::Result;

/// Name of the configuration privilege level.
pub const CONFIG_PRIVILEGE: &str = "configuration";

/// Open configuration session.
pub struct ConfigSession<'a> {
    driver: &'a mut CliDriver,
    original_privilege: String,
    consumed: bool,
}

impl<'a> ConfigSession<'a> {
    /// Enter configuration mode.
    pub async fn new(driver: &'a mut CliDriver) -> Result<Self> {
        let original_privilege = driver
            .current_privilege()
            .unwrap_or(driver.platform().default_privilege.as_str())
            .to_string();

        driver.acquire_privilege(CONFIG_PRIVILEGE).await?;

        Ok(Self {
            driver,
            original_privilege,
            consumed: false,
        })
    }

    /// Send one configuration line.
    pub async fn send_command(&mut self, line: &str) -> Result<Response> {
        self.driver.send_command(line).await
    }

    /// Send a line that may answer a prompt.
    pub async fn run_command(&mut self, command: &Command) -> Result<Response> {
        self.driver.run_command(command).await
    }

    /// Leave configuration mode and restore the starting privilege level.
    pub async fn commit(mut self) -> Result<()> {
        self.consumed = true;
        let target = if self.original_privilege == CONFIG_PRIVILEGE {
            self.driver.platform().default_privilege.clone()
        } else {
            self.original_privilege.clone()
        };
        self.driver.acquire_privilege(&target).await
    }

    /// Release the guard and stay in configuration mode.
    pub fn detach(mut self) {
        self.consumed = true;
    }
}

impl Drop for ConfigSession<'_> {
    fn drop(&mut self) {
        if !self.consumed {
            warn!("configuration session dropped while still in configuration mode");
        }
    }
}
