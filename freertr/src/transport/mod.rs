//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management,
//! handling connection setup, authentication, and channel creation.

pub mod config;
pub mod provider;
mod ssh;

pub use config::{AuthMethod, HostKeyVerification, SshConfig};
pub use provider::ProviderConfig;
pub use ssh::SshTransport;
