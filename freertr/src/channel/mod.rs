//! Channel layer for pattern matching and PTY operations.
//!
//! This module handles the interactive shell session,
//! including tail-only prompt detection and ANSI stripping.

mod buffer;
mod patterns;
mod pty;

pub use buffer::PatternBuffer;
pub use patterns::{combine_patterns, compile_prompt_pattern};
pub use pty::{DEFAULT_SEARCH_DEPTH, PtyChannel};
