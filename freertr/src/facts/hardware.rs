//! Memory and CPU counters from `show platform`.

use once_cell::sync::Lazy;
use serde_json::Value;

use super::FactGroup;
use super::pattern::FieldRule;

static MEMORY: Lazy<FieldRule> = Lazy::new(|| {
    FieldRule::new("mem", &[r"(?m)^mem: \S+=(\S+), \S+=(\S+), \S+=(\S+)"])
});
static CPU: Lazy<FieldRule> = Lazy::new(|| FieldRule::new("cpu", &[r"(?m)^cpu: (\d+)\*(\S+)"]));

/// Parse the hardware group.
///
/// Memory figures are kept as the router prints them (`2147m`). Keys are
/// only present when their line was found.
pub fn parse(output: &str) -> FactGroup {
    let mut group = FactGroup::new();

    if let Some(caps) = MEMORY.captures(output) {
        for (key, idx) in [("memfree_mb", 1), ("memtotal_mb", 2), ("memused_mb", 3)] {
            let value = caps.get(idx).map(|m| m.as_str()).unwrap_or_default();
            group.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    if let Some(caps) = CPU.captures(output) {
        let count: u64 = caps
            .get(1)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        group.insert("cpu_count".to_string(), Value::from(count));
        group.insert(
            "cpu_arch".to_string(),
            Value::String(caps.get(2).map(|m| m.as_str()).unwrap_or_default().to_string()),
        );
    }

    group
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_and_cpu() {
        let output = "name: rare\nmem: free=100m, max=2147m, used=306m\ncpu: 16*amd64\n";
        let group = parse(output);
        assert_eq!(group["memfree_mb"], "100m");
        assert_eq!(group["memtotal_mb"], "2147m");
        assert_eq!(group["memused_mb"], "306m");
        assert_eq!(group["cpu_count"], 16);
        assert_eq!(group["cpu_arch"], "amd64");
    }

    #[test]
    fn test_missing_lines_leave_group_empty() {
        assert!(parse("freeRouter v1,\n").is_empty());
    }

    #[test]
    fn test_memory_must_start_line() {
        assert!(parse("total mem: a=1, b=2, c=3").is_empty());
    }
}
