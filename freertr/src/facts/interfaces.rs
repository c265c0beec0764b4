//! Interface records from `show interfaces` and the address tables.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::Serialize;

use super::pattern::FieldRule;

pub const SHOW_INTERFACES: &str = "show interfaces";
pub const SHOW_IPV4_INTERFACE: &str = "show ipv4 interface";
pub const SHOW_IPV6_INTERFACE: &str = "show ipv6 interface";

static HEADER: Lazy<FieldRule> =
    Lazy::new(|| FieldRule::new("interface", &[r"^([A-Za-z0-9.]+) is ([A-Za-z]+)"]));

static DESCRIPTION: Lazy<FieldRule> =
    Lazy::new(|| FieldRule::new("description", &[r"(?m)description: (.+)$"]));
static TYPE: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("type"));
static HWADDR: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("hwaddr"));
static MTU: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("mtu"));
static BANDWIDTH: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("bw"));
static VRF: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("vrf"));
static IPV4: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("ipv4 address"));
static IPV6: Lazy<FieldRule> = Lazy::new(|| FieldRule::attribute("ipv6 address"));

/// One interface as reported by `show interfaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    /// Operational state from the header line (`up`, `down`, `admin`).
    pub state: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Colon-separated hardware address, empty when the router reports none.
    pub mac: String,
    pub mtu: u32,
    /// Bandwidth in mbps.
    pub speed: u64,
    pub vrf: String,
    pub ipv4: String,
    pub ipv6: String,
    /// VLAN tag of a sub-interface (`sdn1.3600`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlanid: Option<String>,
    /// Physical interface of a sub-interface.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Indented detail lines of the record, as printed.
    pub unparsed: String,
}

impl InterfaceRecord {
    fn from_block(name: &str, state: &str, detail: &[&str]) -> Self {
        let unparsed = detail.join("\n");
        let (parent, vlanid) = split_subinterface(name);

        Self {
            state: state.to_string(),
            description: DESCRIPTION.extract_or_empty(&unparsed),
            kind: TYPE.extract_or_empty(&unparsed),
            mac: HWADDR.extract(&unparsed).and_then(normalize_mac).unwrap_or_default(),
            mtu: MTU.extract(&unparsed).and_then(|v| v.parse().ok()).unwrap_or(0),
            speed: BANDWIDTH.extract(&unparsed).and_then(parse_bandwidth).unwrap_or(0),
            vrf: VRF.extract_or_empty(&unparsed),
            ipv4: IPV4.extract_or_empty(&unparsed),
            ipv6: IPV6.extract_or_empty(&unparsed),
            vlanid,
            parent,
            unparsed,
        }
    }
}

/// Parse `show interfaces` into records keyed by name.
///
/// A record starts at a non-indented `<name> is <state>` line and collects
/// the indented lines that follow. Lines before the first header and
/// repeated headers for a known name are ignored.
pub fn parse_interfaces(output: &str) -> IndexMap<String, InterfaceRecord> {
    let mut blocks: IndexMap<String, (String, Vec<&str>)> = IndexMap::new();
    let mut current: Option<String> = None;

    for line in output.lines().filter(|l| !l.is_empty()) {
        if line.starts_with(' ') {
            if let Some(name) = current.as_deref() {
                if let Some(block) = blocks.get_mut(name) {
                    block.1.push(line);
                }
            }
            continue;
        }

        if let Some(caps) = HEADER.captures(line) {
            let name = caps[1].to_string();
            let state = caps[2].to_string();
            blocks.entry(name.clone()).or_insert_with(|| (state, vec![]));
            current = Some(name);
        }
    }

    blocks
        .into_iter()
        .map(|(name, (state, detail))| {
            let record = InterfaceRecord::from_block(&name, &state, &detail);
            (name, record)
        })
        .collect()
}

/// `address/mask` for every four-column row of an address table.
pub fn parse_addresses(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                ["interface", ..] => None,
                [_, _, address, mask] => Some(format!("{}/{}", address, mask)),
                _ => None,
            }
        })
        .collect()
}

/// `0015.180b.6038` to `00:15:18:0b:60:38`. The literal `none` means absent.
pub fn normalize_mac(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "none" {
        return None;
    }

    let digits: Vec<char> = raw.chars().filter(|c| *c != '.').collect();
    Some(
        digits
            .chunks(2)
            .map(|pair| pair.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join(":"),
    )
}

/// Bandwidth in whole mbps: `8000kbps` is 8, `2gbps` is 2000.
pub fn parse_bandwidth(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let split = raw.len().checked_sub(4)?;
    let (value, unit) = (raw.get(..split)?, raw.get(split..)?);
    let value: u64 = value.parse().ok()?;

    match unit {
        "kbps" => Some(value / 1000),
        "mbps" => Some(value),
        "gbps" => value.checked_mul(1000),
        _ => None,
    }
}

/// `(parent, vlanid)` of a dotted sub-interface name.
fn split_subinterface(name: &str) -> (Option<String>, Option<String>) {
    let Some((parent, _)) = name.split_once('.') else {
        return (None, None);
    };

    let vlanid = name
        .rsplit_once('.')
        .map(|(_, tail)| tail.chars().take_while(char::is_ascii_digit).collect::<String>());

    (Some(parent.to_string()), vlanid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERFACES: &str = "\
ethernet1 is up (since 12:34:56, 3 changes)
 description: out of band management port
 type is ethernet, hwaddr=0001.0bad.c0de, mtu=1500, bw=100mbps, vrf=oob
 ipv4 address=172.16.1.225/23, mask=255.255.254.0, ifcid=12345
 ipv6 address=fe80::201:bff:fead:c0de/64, mask=ffff:ffff:ffff:ffff::, ifcid=67890
 received 1000 packets (64000 bytes)
sdn1 is up, promisc (since 1d02h, 1 changes)
 type is sdn, hwaddr=0015.180b.6038, mtu=1496, bw=8000kbps, vrf=CORE
sdn1.3600 is down (since never)
 type is sdn, hwaddr=none, mtu=1496, bw=2gbps
loopback0 is admin
";

    #[test]
    fn test_parse_ethernet_record() {
        let records = parse_interfaces(INTERFACES);
        let eth = &records["ethernet1"];
        assert_eq!(eth.state, "up");
        assert_eq!(eth.description, "out of band management port");
        assert_eq!(eth.kind, "ethernet");
        assert_eq!(eth.mac, "00:01:0b:ad:c0:de");
        assert_eq!(eth.mtu, 1500);
        assert_eq!(eth.speed, 100);
        assert_eq!(eth.vrf, "oob");
        assert_eq!(eth.ipv4, "172.16.1.225/23");
        assert_eq!(eth.ipv6, "fe80::201:bff:fead:c0de/64");
        assert!(eth.vlanid.is_none());
        assert!(eth.unparsed.contains("received 1000 packets"));
    }

    #[test]
    fn test_parse_subinterface() {
        let records = parse_interfaces(INTERFACES);
        let sub = &records["sdn1.3600"];
        assert_eq!(sub.state, "down");
        assert_eq!(sub.vlanid.as_deref(), Some("3600"));
        assert_eq!(sub.parent.as_deref(), Some("sdn1"));
        assert_eq!(sub.mac, "");
        assert_eq!(sub.speed, 2000);
        assert_eq!(sub.vrf, "");
    }

    #[test]
    fn test_record_order_and_empty_block() {
        let records = parse_interfaces(INTERFACES);
        let names: Vec<&str> = records.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["ethernet1", "sdn1", "sdn1.3600", "loopback0"]);

        let lo = &records["loopback0"];
        assert_eq!(lo.state, "admin");
        assert_eq!(lo.mtu, 0);
        assert_eq!(lo.unparsed, "");
    }

    #[test]
    fn test_bandwidth_units() {
        assert_eq!(parse_bandwidth("8000kbps"), Some(8));
        assert_eq!(parse_bandwidth("8999kbps"), Some(8));
        assert_eq!(parse_bandwidth("100mbps"), Some(100));
        assert_eq!(parse_bandwidth("2gbps"), Some(2000));
        assert_eq!(parse_bandwidth("fast"), None);
        assert_eq!(parse_bandwidth("10bps"), None);
    }

    #[test]
    fn test_normalize_mac() {
        assert_eq!(normalize_mac("0015.180b.6038").as_deref(), Some("00:15:18:0b:60:38"));
        assert_eq!(normalize_mac("none"), None);
        assert_eq!(normalize_mac(""), None);
    }

    #[test]
    fn test_parse_addresses() {
        let output = "\
interface  ifcid  address       mask
ethernet1  12345  172.16.1.225  255.255.254.0
sdn1       67890  10.8.14.2     255.255.255.0 extra

";
        assert_eq!(parse_addresses(output), vec!["172.16.1.225/255.255.254.0"]);
    }
}
