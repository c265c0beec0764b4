//! Configuration line model, diff and retrieval.
//!
//! # Example
//!
//! ```rust
//! use freertr::config::{DiffOptions, NetworkConfig};
//!
//! let running = NetworkConfig::parse("interface ethernet1\n mtu 1500\n", 1);
//!
//! let mut candidate = NetworkConfig::new(1);
//! candidate.add(&["mtu 9000"], &["interface ethernet1"]);
//!
//! let diff = candidate.difference(&running, &DiffOptions::default());
//! assert_eq!(diff.commands(), vec!["interface ethernet1", "mtu 9000"]);
//! ```

mod diff;
mod fetch;
mod line;

pub use diff::{ConfigObjects, DiffOptions, DumpFormat, END_MARKER, MatchMode, ReplaceMode};
pub use fetch::{ConfigSource, get_config};
pub use line::{COMMENT_TOKENS, ConfigLine, NetworkConfig};
