//! LLDP neighbors: one summary table plus one detail query per row.

use indexmap::IndexMap;
use log::debug;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::interfaces::normalize_mac;
use super::pattern::FieldRule;
use crate::driver::{Command, CommandRunner};
use crate::error::Result;

pub const SHOW_LLDP_NEIGHBOR: &str = "show lldp neighbor";

static PEER: Lazy<FieldRule> = Lazy::new(|| FieldRule::new("peer", &[r"peer *(\S+)$"]));
static PORT_ID: Lazy<FieldRule> = Lazy::new(|| FieldRule::new("port id", &[r"port id *(.*)$"]));

/// One LLDP neighbor seen on a local port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LldpNeighbor {
    pub local_port_id: String,
    pub remote_system_name: String,
    pub remote_chassis_id: String,
    pub remote_port_id: String,
}

/// Local ports of the summary rows, in order, duplicates included.
///
/// Rows need at least five columns; the `interface ...` header row is
/// skipped.
fn summary_rows(output: &str) -> impl Iterator<Item = Vec<&str>> {
    output
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|columns| columns.len() >= 5 && columns[0] != "interface")
}

/// A summary row: the local port and the neighbor's system name.
///
/// The first row for a port wins.
pub fn parse_summary(output: &str) -> IndexMap<String, LldpNeighbor> {
    let mut neighbors = IndexMap::new();

    for columns in summary_rows(output) {
        neighbors
            .entry(columns[0].to_string())
            .or_insert_with(|| LldpNeighbor {
                local_port_id: columns[0].to_string(),
                remote_system_name: columns[1].to_string(),
                ..Default::default()
            });
    }

    neighbors
}

/// Fill chassis and port ids from `show lldp detail <port>` output.
pub fn apply_detail(neighbor: &mut LldpNeighbor, output: &str) {
    for line in output.lines().filter(|l| !l.is_empty()) {
        if let Some(peer) = PEER.extract(line) {
            neighbor.remote_chassis_id = normalize_mac(peer).unwrap_or_default();
        }
        if let Some(port) = PORT_ID.extract(line) {
            neighbor.remote_port_id = port.to_string();
        }
    }
}

/// Parse the summary and query the detail of every row.
///
/// Each summary row gets its own `show lldp detail <port>`, even when a
/// port repeats; later details for a port overwrite earlier ones.
pub async fn collect<R: CommandRunner>(
    runner: &mut R,
    summary: &str,
) -> Result<IndexMap<String, LldpNeighbor>> {
    let mut neighbors = parse_summary(summary);

    for columns in summary_rows(summary) {
        let port = columns[0];
        let command = Command::new(format!("show lldp detail {}", port));
        let detail = runner.run_commands(&[command], false).await?;
        if let Some(neighbor) = neighbors.get_mut(port) {
            apply_detail(neighbor, detail.first().map(String::as_str).unwrap_or_default());
        }
    }

    debug!("collected {} lldp neighbors", neighbors.len());
    Ok(neighbors)
}
