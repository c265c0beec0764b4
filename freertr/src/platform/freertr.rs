//! FreeRTR platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! rtr1>                   # exec
//! rtr1#                   # privilege_exec
//! rtr1(cfg)#              # configuration
//! rtr1(cfg-if)#           # configuration sub-block
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├─────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │   disable   │       #        │        end           │   (cfg*)#     │
//! └──────┘◄────────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```

use super::{PlatformDefinition, PrivilegeLevel};
use crate::error::{PlatformError, Result};

pub const PLATFORM_NAME: &str = "freertr";

/// Prompt suffix shown while any configuration block is open.
pub const CONFIG_PROMPT_SUFFIX: &str = ")#";

const EXEC_PROMPT: &str = r"(?m)^[\w.\-@/:]{1,63}>\s?$";
const PRIVILEGE_EXEC_PROMPT: &str = r"(?m)^[\w.\-@/:]{1,63}#\s?$";
const CONFIGURATION_PROMPT: &str = r"(?m)^[\w.\-@/:]{1,63}\([\w.\-@/:+]{1,63}\)#\s?$";
const ENABLE_PASSWORD_PROMPT: &str = r"(?mi)^password:\s?$";

/// Create the FreeRTR platform definition.
pub fn platform() -> Result<PlatformDefinition> {
    let invalid = |e: regex::Error| PlatformError::InvalidDefinition {
        message: e.to_string(),
    };

    let exec = PrivilegeLevel::new("exec", EXEC_PROMPT).map_err(invalid)?;

    let privilege_exec = PrivilegeLevel::new("privilege_exec", PRIVILEGE_EXEC_PROMPT)
        .map_err(invalid)?
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(ENABLE_PASSWORD_PROMPT)
        .map_err(invalid)?;

    let configuration = PrivilegeLevel::new("configuration", CONFIGURATION_PROMPT)
        .map_err(invalid)?
        .with_parent("privilege_exec")
        .with_escalate("configure terminal")
        .with_deescalate("end");

    Ok(PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_failure_pattern("% bad")
        .with_failure_pattern("% unknown")
        .with_failure_pattern("% error")
        .with_failure_pattern("% invalid")
        .with_failure_pattern("% not allowed")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 255")
        .with_terminal_size(255, 24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freertr_platform() {
        let platform = platform().unwrap();
        assert_eq!(platform.name, "freertr");
        assert_eq!(platform.privilege_levels.len(), 3);
        assert_eq!(platform.default_privilege, "privilege_exec");
    }

    #[test]
    fn test_exec_prompt_match() {
        let platform = platform().unwrap();
        let exec = platform.get_privilege("exec").unwrap();
        assert!(exec.matches("rtr1>"));
        assert!(exec.matches("sdn-sc-05.ultra.org> "));
        assert!(!exec.matches("rtr1#"));
    }

    #[test]
    fn test_privilege_exec_prompt_match() {
        let platform = platform().unwrap();
        let level = platform.get_privilege("privilege_exec").unwrap();
        assert!(level.matches("rtr1#"));
        assert!(level.matches("output line\nrtr1# "));
        assert!(!level.matches("rtr1(cfg)#"));
        assert!(!level.matches("rtr1(cfg-if)#"));
    }

    #[test]
    fn test_configuration_prompt_match() {
        let platform = platform().unwrap();
        let level = platform.get_privilege("configuration").unwrap();
        assert!(level.matches("rtr1(cfg)#"));
        assert!(level.matches("rtr1(cfg-if)#"));
        assert!(level.matches("rtr1(cfg-router)# "));
        assert!(!level.matches("rtr1#"));
        assert!(!level.matches("rtr1>"));
    }

    #[test]
    fn test_privilege_graph() {
        let platform = platform().unwrap();

        let exec = platform.get_privilege("exec").unwrap();
        assert!(exec.previous_priv.is_none());

        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        assert_eq!(priv_exec.previous_priv.as_deref(), Some("exec"));
        assert_eq!(priv_exec.escalate_command.as_deref(), Some("enable"));
        assert!(priv_exec.escalate_auth);

        let config = platform.get_privilege("configuration").unwrap();
        assert_eq!(config.previous_priv.as_deref(), Some("privilege_exec"));
        assert_eq!(config.escalate_command.as_deref(), Some("configure terminal"));
        assert_eq!(config.deescalate_command.as_deref(), Some("end"));
    }

    #[test]
    fn test_failure_patterns() {
        let platform = platform().unwrap();
        assert!(platform.detect_failure("% bad command: conf").is_some());
        assert!(platform.detect_failure("% unknown keyword").is_some());
        assert!(platform.detect_failure("ethernet1 is up").is_none());
    }

    #[test]
    fn test_on_open_commands() {
        let platform = platform().unwrap();
        assert_eq!(
            platform.on_open_commands,
            vec!["terminal length 0".to_string(), "terminal width 255".to_string()]
        );
    }
}
