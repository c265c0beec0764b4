//! Device facts scraped from CLI output.
//!
//! Facts come in independent subsets. Each subset issues its own commands
//! and parses only its own replies:
//!
//! | subset       | commands                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | `default`    | `show platform`                                                 |
//! | `hardware`   | `show platform`                                                 |
//! | `interfaces` | `show interfaces`, `show ipv4/ipv6 interface`, `show lldp ...`  |
//! | `routing`    | `show vrf routing`, `show ipv4/ipv6 route <vrf>`                |
//! | `config`     | `show running-config`                                           |
//!
//! # Example
//!
//! ```rust,no_run
//! use freertr::DriverBuilder;
//! use freertr::facts::gather_facts;
//!
//! # async fn example() -> Result<(), freertr::Error> {
//! let mut driver = DriverBuilder::new("rtr1").username("admin").password("x").build()?;
//! driver.open().await?;
//!
//! let facts = gather_facts(&mut driver, &["interfaces"]).await?;
//! println!("{}", facts.get("net_hostname").unwrap_or(&serde_json::Value::Null));
//! # Ok(())
//! # }
//! ```

mod default;
mod hardware;
mod interfaces;
mod lldp;
mod pattern;
mod routing;

pub use default::DeviceInfo;
pub use interfaces::{InterfaceRecord, normalize_mac, parse_addresses, parse_bandwidth, parse_interfaces};
pub use lldp::LldpNeighbor;
pub use pattern::FieldRule;
pub use routing::{AddressFamily, Route, RoutingTables};

use std::collections::BTreeSet;

use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::driver::{CommandRunner, to_commands};
use crate::error::{FactsError, Result};

/// Facts of one subset, keyed without the `net_` prefix.
pub type FactGroup = IndexMap<String, Value>;

/// Prefix of every key in [`Facts`].
pub const FACT_PREFIX: &str = "net_";

/// Subset request used when the caller names none.
pub const DEFAULT_GATHER_SUBSET: &[&str] = &["!config"];

/// A named group of facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactSubset {
    Default,
    Hardware,
    Interfaces,
    Routing,
    Config,
}

/// Subset name lookup table, in collection order.
pub const FACT_SUBSETS: &[(&str, FactSubset)] = &[
    ("default", FactSubset::Default),
    ("hardware", FactSubset::Hardware),
    ("interfaces", FactSubset::Interfaces),
    ("routing", FactSubset::Routing),
    ("config", FactSubset::Config),
];

impl FactSubset {
    pub fn from_name(name: &str) -> Option<Self> {
        FACT_SUBSETS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, subset)| *subset)
    }

    pub fn name(self) -> &'static str {
        FACT_SUBSETS
            .iter()
            .find(|(_, subset)| *subset == self)
            .map(|(n, _)| *n)
            .unwrap_or_default()
    }

    /// Commands issued up front; LLDP detail and per-VRF route queries
    /// follow from their replies.
    pub fn commands(self) -> &'static [&'static str] {
        match self {
            FactSubset::Default | FactSubset::Hardware => &[default::SHOW_PLATFORM],
            FactSubset::Interfaces => &[
                interfaces::SHOW_INTERFACES,
                interfaces::SHOW_IPV4_INTERFACE,
                interfaces::SHOW_IPV6_INTERFACE,
                lldp::SHOW_LLDP_NEIGHBOR,
            ],
            FactSubset::Routing => &[routing::SHOW_VRF_ROUTING],
            FactSubset::Config => &["show running-config"],
        }
    }

    /// Run this subset's commands and parse the replies.
    ///
    /// Command failures reported in the output do not abort collection;
    /// unparsable text leaves fields empty.
    pub async fn populate<R: CommandRunner>(self, runner: &mut R) -> Result<FactGroup> {
        let replies = runner.run_commands(&to_commands(self.commands().iter().copied()), false).await?;
        let reply = |idx: usize| replies.get(idx).map(String::as_str).unwrap_or_default();

        let group = match self {
            FactSubset::Default => DeviceInfo::parse(reply(0)).into_group(),
            FactSubset::Hardware => hardware::parse(reply(0)),
            FactSubset::Interfaces => {
                let mut group = FactGroup::new();
                group.insert("interfaces".into(), to_value(&parse_interfaces(reply(0))));
                group.insert("all_ipv4_addresses".into(), to_value(&parse_addresses(reply(1))));
                group.insert("all_ipv6_addresses".into(), to_value(&parse_addresses(reply(2))));
                let neighbors = lldp::collect(runner, reply(3)).await?;
                group.insert("neighbors".into(), to_value(&neighbors));
                group
            }
            FactSubset::Routing => {
                let tables = routing::collect(runner, reply(0)).await?;
                let mut group = FactGroup::new();
                group.insert("routing".into(), to_value(&tables));
                group
            }
            FactSubset::Config => {
                let mut group = FactGroup::new();
                group.insert("config".into(), Value::String(reply(0).to_string()));
                group
            }
        };

        debug!("{} facts: {} keys", self.name(), group.len());
        Ok(group)
    }
}

/// Resolve a `gather_subset` request into the subsets to run.
///
/// Entries are subset names, `all`, `!name` or `!all`. When nothing is
/// selected explicitly every subset runs; exclusions are then removed and
/// `default` is always added back.
pub fn resolve_subsets<S: AsRef<str>>(requested: &[S]) -> Result<BTreeSet<FactSubset>> {
    let all = || FACT_SUBSETS.iter().map(|(_, subset)| *subset);
    let mut run = BTreeSet::new();
    let mut exclude = BTreeSet::new();

    for entry in requested {
        let entry = entry.as_ref().trim();
        let (negated, name) = match entry.strip_prefix('!') {
            Some(name) => (true, name),
            None => (false, entry),
        };

        if name == "all" {
            if negated {
                exclude.extend(all());
            } else {
                run.extend(all());
            }
            continue;
        }

        let subset = FactSubset::from_name(name).ok_or_else(|| FactsError::UnknownSubset {
            name: name.to_string(),
            valid: FACT_SUBSETS.iter().map(|(n, _)| *n).collect::<Vec<_>>().join(", "),
        })?;

        if negated {
            exclude.insert(subset);
        } else {
            run.insert(subset);
        }
    }

    if run.is_empty() {
        run.extend(all());
    }
    run.retain(|subset| !exclude.contains(subset));
    run.insert(FactSubset::Default);
    Ok(run)
}

/// Flat fact mapping, every key prefixed with `net_`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Facts(IndexMap<String, Value>);

impl Facts {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.0
    }

    fn merge(&mut self, group: FactGroup) {
        for (key, value) in group {
            self.0.insert(format!("{}{}", FACT_PREFIX, key), value);
        }
    }
}

/// Collect the requested subsets. An empty request means
/// [`DEFAULT_GATHER_SUBSET`].
pub async fn gather_facts<R, S>(runner: &mut R, gather_subset: &[S]) -> Result<Facts>
where
    R: CommandRunner,
    S: AsRef<str>,
{
    let subsets = if gather_subset.is_empty() {
        resolve_subsets(DEFAULT_GATHER_SUBSET)?
    } else {
        resolve_subsets(gather_subset)?
    };

    let mut facts = Facts::default();
    facts.merge(FactGroup::from([(
        "gather_subset".to_string(),
        Value::from(subsets.iter().map(|s| s.name()).collect::<Vec<_>>()),
    )]));

    for subset in subsets {
        facts.merge(subset.populate(runner).await?);
    }

    Ok(facts)
}

fn to_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &BTreeSet<FactSubset>) -> Vec<&'static str> {
        set.iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_default_request_excludes_config() {
        let set = resolve_subsets(DEFAULT_GATHER_SUBSET).unwrap();
        assert_eq!(names(&set), vec!["default", "hardware", "interfaces", "routing"]);
    }

    #[test]
    fn test_single_subset_adds_default() {
        let set = resolve_subsets(&["hardware"]).unwrap();
        assert_eq!(names(&set), vec!["default", "hardware"]);
    }

    #[test]
    fn test_exclude_all_keeps_default() {
        let set = resolve_subsets(&["!all"]).unwrap();
        assert_eq!(names(&set), vec!["default"]);
    }

    #[test]
    fn test_all_minus_routing() {
        let set = resolve_subsets(&["all", "!routing"]).unwrap();
        assert_eq!(names(&set), vec!["default", "hardware", "interfaces", "config"]);
    }

    #[test]
    fn test_unknown_subset() {
        match resolve_subsets(&["bogus"]) {
            Err(crate::Error::Facts(FactsError::UnknownSubset { name, valid })) => {
                assert_eq!(name, "bogus");
                assert!(valid.contains("interfaces"));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(resolve_subsets(&["!bogus"]).is_err());
    }

    #[test]
    fn test_table_round_trip() {
        for (name, subset) in FACT_SUBSETS {
            assert_eq!(FactSubset::from_name(name), Some(*subset));
            assert_eq!(subset.name(), *name);
        }
    }

    #[test]
    fn test_merge_prefixes_keys() {
        let mut facts = Facts::default();
        facts.merge(FactGroup::from([("hostname".to_string(), Value::from("rare"))]));
        assert_eq!(facts.get("net_hostname"), Some(&Value::from("rare")));
        assert!(!facts.contains_key("hostname"));
    }
}
