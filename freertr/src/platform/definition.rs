//! Platform definition: prompts, privilege levels and failure markers.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::privilege_level::PrivilegeLevel;
use crate::channel::combine_patterns;

/// Everything the driver needs to know about a CLI dialect.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name.
    pub name: String,

    /// Privilege levels, in prompt-matching order.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Level the driver settles in after login.
    pub default_privilege: String,

    /// Output substrings that mark a command as failed.
    pub failed_when_contains: Vec<String>,

    /// Commands to run when the session is opened.
    pub on_open_commands: Vec<String>,

    pub terminal_width: u32,
    pub terminal_height: u32,
}

impl PlatformDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            failed_when_contains: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
        }
    }

    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// A single pattern matching the prompt of any privilege level.
    pub fn prompt_pattern(&self) -> Result<Regex, regex::Error> {
        combine_patterns(self.privilege_levels.values().map(|level| &level.pattern))
    }

    /// Strip the command echo and the trailing prompt from raw output.
    ///
    /// Line endings are normalised to `\n`.
    pub fn normalize_output(&self, raw: &str, command: &str) -> String {
        let text = raw.replace("\r\n", "\n").replace('\r', "");

        let body = match text.find('\n') {
            Some(pos) if text[..pos].trim_end().ends_with(command.trim()) => &text[pos + 1..],
            _ => text.as_str(),
        };

        match memchr::memrchr(b'\n', body.as_bytes()) {
            Some(pos) => body[..pos].to_string(),
            None => String::new(),
        }
    }

    /// The first failure marker contained in `output`, if any.
    pub fn detect_failure(&self, output: &str) -> Option<String> {
        self.failed_when_contains
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform() -> PlatformDefinition {
        PlatformDefinition::new("test")
            .with_privilege(PrivilegeLevel::new("exec", r"(?m)^\w+>\s?$").unwrap())
            .with_privilege(PrivilegeLevel::new("priv", r"(?m)^\w+#\s?$").unwrap())
            .with_failure_pattern("% bad")
    }

    #[test]
    fn test_normalize_strips_echo_and_prompt() {
        let raw = "show platform\r\nfreeRouter v1,\r\nname: r1\r\nr1#";
        assert_eq!(
            platform().normalize_output(raw, "show platform"),
            "freeRouter v1,\nname: r1"
        );
    }

    #[test]
    fn test_normalize_without_echo() {
        let raw = "line one\nline two\nr1#";
        assert_eq!(platform().normalize_output(raw, "show x"), "line one\nline two");
    }

    #[test]
    fn test_normalize_prompt_only() {
        assert_eq!(platform().normalize_output("r1#", "end"), "");
    }

    #[test]
    fn test_detect_failure() {
        let p = platform();
        assert_eq!(p.detect_failure("% bad command"), Some("% bad".to_string()));
        assert_eq!(p.detect_failure("all good"), None);
    }

    #[test]
    fn test_prompt_pattern_combines_levels() {
        let pattern = platform().prompt_pattern().unwrap();
        assert!(pattern.is_match(b"output\nr1>"));
        assert!(pattern.is_match(b"output\nr1#"));
        assert!(!pattern.is_match(b"output\nr1$"));
    }
}
