//! Per-VRF routing tables.

use indexmap::IndexMap;
use serde::Serialize;

use crate::driver::{Command, CommandRunner};
use crate::error::Result;

pub const SHOW_VRF_ROUTING: &str = "show vrf routing";

/// One route row, columns keyed by the table header, plus `vrf`.
pub type Route = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    pub fn route_command(self, vrf: &str) -> String {
        format!("show {} route {}", self.as_str(), vrf)
    }
}

/// Routes of every VRF, grouped by address family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoutingTables {
    pub ipv4: Vec<Route>,
    pub ipv6: Vec<Route>,
}

/// VRF names from `show vrf routing`: first column after the two header lines.
pub fn parse_vrf_names(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(2)
        .filter_map(|line| line.split(' ').next())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zip each row of a route table against its header row.
pub fn parse_route_table(output: &str, vrf: &str) -> Vec<Route> {
    let mut lines = output.lines();
    let Some(header) = lines.next() else {
        return vec![];
    };
    let keys: Vec<&str> = header.split_whitespace().collect();

    lines
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let mut route: Route = keys
                .iter()
                .zip(line.split_whitespace())
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect();
            route.insert("vrf".to_string(), vrf.to_string());
            route
        })
        .collect()
}

/// Query the route tables of every VRF listed in `vrf_output`.
pub async fn collect<R: CommandRunner>(runner: &mut R, vrf_output: &str) -> Result<RoutingTables> {
    let vrfs = parse_vrf_names(vrf_output);
    let mut tables = RoutingTables::default();

    for family in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
        for vrf in &vrfs {
            let command = Command::new(family.route_command(vrf));
            let output = runner.run_commands(&[command], false).await?;
            let routes = parse_route_table(output.first().map(String::as_str).unwrap_or_default(), vrf);
            match family {
                AddressFamily::Ipv4 => tables.ipv4.extend(routes),
                AddressFamily::Ipv6 => tables.ipv6.extend(routes),
            }
        }
    }

    Ok(tables)
}
