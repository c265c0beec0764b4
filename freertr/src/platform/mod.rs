//! Platform definitions.
//!
//! This module describes the FreeRTR CLI dialect: prompt patterns,
//! privilege levels and the output markers of a failed command.

mod definition;
pub mod freertr;
mod privilege_level;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;
