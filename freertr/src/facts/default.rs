//! Device identity from `show platform`.

use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;

use super::FactGroup;
use super::pattern::FieldRule;
use crate::driver::{Command, CommandRunner};
use crate::error::Result;
use crate::platform::freertr::PLATFORM_NAME;

pub const SHOW_PLATFORM: &str = "show platform";

static VERSION: Lazy<FieldRule> = Lazy::new(|| FieldRule::new("version", &[r"freeRouter (\S+),"]));
static HWID: Lazy<FieldRule> = Lazy::new(|| FieldRule::new("hwid", &[r"hwid: (\S+)"]));
static HOSTNAME: Lazy<FieldRule> =
    Lazy::new(|| FieldRule::new("hostname", &[r"(?m)^name: (\S+)", r"name: (\S+)"]));

/// Router identity. Missing anchors leave a field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub version: String,
    pub hwid: String,
    pub hostname: String,
    pub network_os: String,
}

impl DeviceInfo {
    /// Parse `show platform` output.
    pub fn parse(output: &str) -> Self {
        Self {
            version: VERSION.extract_or_empty(output),
            hwid: HWID.extract_or_empty(output),
            hostname: HOSTNAME.extract_or_empty(output),
            network_os: PLATFORM_NAME.to_string(),
        }
    }

    /// Run `show platform` and parse it.
    pub async fn probe<R: CommandRunner>(runner: &mut R) -> Result<Self> {
        let output = runner
            .run_commands(&[Command::new(SHOW_PLATFORM)], false)
            .await?;
        Ok(Self::parse(output.first().map(String::as_str).unwrap_or_default()))
    }

    pub(crate) fn into_group(self) -> FactGroup {
        let mut group = FactGroup::new();
        group.insert("version".into(), Value::String(self.version));
        group.insert("hwid".into(), Value::String(self.hwid));
        group.insert("hostname".into(), Value::String(self.hostname));
        group
    }
}
