//! Error types for freertr.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for freertr operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform definition errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Configuration model and apply errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Fact gathering errors
    #[error("Facts error: {0}")]
    Facts(#[from] FactsError),

    /// Command module errors
    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// Host key differs from the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// Host is not in known_hosts and strict checking is enabled
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Channel layer errors (pattern matching, PTY operations).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Pattern matching timed out
    #[error("Pattern not found within {0:?}")]
    PatternTimeout(Duration),

    /// Channel closed unexpectedly
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Driver layer errors (command execution, privilege escalation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// The device reported a failure for a command
    #[error("Command '{command}' failed: {message}")]
    CommandFailed { command: String, message: String },

    /// Failed to acquire target privilege level
    #[error("Failed to acquire privilege level '{target}'")]
    PrivilegeAcquisitionFailed { target: String },

    /// Invalid configuration in the driver builder
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Unknown privilege level detected
    #[error("Unknown privilege level from prompt: '{prompt}'")]
    UnknownPrivilege { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },
}

/// Platform definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },
}

/// Configuration model, diff and apply errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A parent path was requested that does not exist in the configuration
    #[error("Path does not exist in config: {path:?}")]
    PathNotFound { path: Vec<String> },

    /// Two request options that cannot be combined were both set
    #[error("Parameters are mutually exclusive: {first}, {second}")]
    MutuallyExclusive {
        first: &'static str,
        second: &'static str,
    },

    /// Unrecognised match/replace/update/source keyword
    #[error("Invalid value '{value}' for {option}, expected one of: {expected}")]
    InvalidOption {
        option: &'static str,
        value: String,
        expected: &'static str,
    },

    /// The configuration could not be fetched from the device
    #[error("Unable to retrieve current config: {message}")]
    Fetch { message: String },

    /// Writing a configuration backup failed
    #[error("Failed to write backup to {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fact gathering errors.
#[derive(Error, Debug)]
pub enum FactsError {
    /// Unknown name in gather_subset
    #[error("Bad subset '{name}', valid subsets are: {valid}")]
    UnknownSubset { name: String, valid: String },
}

/// Command module errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// A configuration-mode command was submitted for read-only execution
    #[error("Configuration mode command '{command}' is not supported here, use the config apply path instead")]
    ConfigModeNotAllowed { command: String },

    /// A wait_for expression could not be parsed
    #[error("Invalid conditional '{expression}': {reason}")]
    InvalidConditional { expression: String, reason: String },

    /// wait_for conditions were still unmet after the last retry
    #[error("One or more conditional statements have not been satisfied: {failed:?}")]
    ConditionsNotMet { failed: Vec<String> },
}

/// Result type alias using freertr's Error.
pub type Result<T> = std::result::Result<T, Error>;
