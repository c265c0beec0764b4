//! # freertr
//!
//! Async SSH facts and configuration management for FreeRTR routers.
//!
//! The crate talks to a router's CLI over SSH and turns `show` output into
//! structured facts, diffs candidate configuration against the running one
//! and pushes the difference.
//!
//! ## Features
//!
//! - Async SSH connections via russh
//! - Scrapli-style tail search for prompts
//! - Privilege navigation between exec and configuration modes
//! - Fact subsets: identity, hardware, interfaces, LLDP, routing, config
//! - Indentation-aware configuration diff with line, strict and exact matching
//! - Read-only command execution with `wait_for` polling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use freertr::{ConfigRequest, DriverBuilder, ResponseCache};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), freertr::Error> {
//!     let mut driver = DriverBuilder::new("192.168.1.1")
//!         .username("admin")
//!         .password("secret")
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     let facts = freertr::gather_facts(&mut driver, &["default"]).await?;
//!     println!("{:?}", facts.get("net_version"));
//!
//!     let request = ConfigRequest::lines(["description uplink"]).parents(["interface ethernet1"]);
//!     let mut cache = ResponseCache::new();
//!     let outcome = freertr::apply_config(&mut driver, &mut cache, &request).await?;
//!     println!("sent {:?}", outcome.commands);
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod apply;
pub mod cache;
pub mod channel;
pub mod commands;
pub mod config;
pub mod driver;
pub mod error;
pub mod facts;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use apply::{ConfigOutcome, ConfigRequest, apply_config};
pub use cache::ResponseCache;
pub use commands::{CommandOutcome, CommandRequest};
pub use config::{DiffOptions, MatchMode, NetworkConfig, ReplaceMode};
pub use driver::{
    CliDriver, Command, CommandRunner, DriverBuilder, InteractiveEvent, InteractiveResult, Response,
};
pub use error::{Error, Result};
pub use facts::{Facts, gather_facts};
pub use platform::{PlatformDefinition, PrivilegeLevel};
pub use transport::{AuthMethod, ProviderConfig, SshConfig};
