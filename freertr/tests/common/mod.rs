//! Scripted command runner for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use freertr::{Command, CommandRunner, Response, Result};

/// Answers commands from a table of canned outputs and records every call.
///
/// Unknown commands succeed with empty output.
#[derive(Debug, Default)]
pub struct FixtureRunner {
    outputs: HashMap<String, String>,
    failures: HashMap<String, String>,
    pub calls: Vec<Command>,
}

impl FixtureRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command: &str, output: &str) -> Self {
        self.outputs.insert(command.to_string(), output.to_string());
        self
    }

    /// Make `command` come back with a failure marker.
    pub fn with_failure(mut self, command: &str, message: &str) -> Self {
        self.failures.insert(command.to_string(), message.to_string());
        self
    }

    pub fn sent(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.command.as_str()).collect()
    }

    pub fn count(&self, command: &str) -> usize {
        self.calls.iter().filter(|c| c.command == command).count()
    }
}

impl CommandRunner for FixtureRunner {
    async fn run_command(&mut self, command: &Command) -> Result<Response> {
        self.calls.push(command.clone());
        let text = command.text();

        if let Some(message) = self.failures.get(text) {
            return Ok(Response::new(text, message.as_str(), message.as_str(), "rtr#", Duration::ZERO)
                .with_failure("% "));
        }

        let output = self.outputs.get(text).cloned().unwrap_or_default();
        Ok(Response::new(text, output.clone(), output, "rtr#", Duration::ZERO))
    }
}

pub const SHOW_PLATFORM: &str = "\
freeRouter v23.4.21-cur, done by cs@nop.
place on the web: http://www.freertr.org/
name: rare
hwid: accton_as9516_32d
mem: free=1021m, max=2147m, used=1126m
cpu: 16*amd64
";

pub const SHOW_INTERFACES: &str = "\
ethernet1 is up (since 12:34:56, 3 changes)
 description: out of band management port
 type is ethernet, hwaddr=0001.0bad.c0de, mtu=1500, bw=100mbps, vrf=oob
 ipv4 address=172.16.1.225/23, mask=255.255.254.0, ifcid=12345
 received 1000 packets (64000 bytes)
sdn1.3600 is down (since never)
 type is sdn, hwaddr=none, mtu=1496, bw=2gbps
";

pub const SHOW_IPV4_INTERFACE: &str = "\
interface  ifcid  address       mask
ethernet1  12345  172.16.1.225  255.255.254.0
";

pub const SHOW_IPV6_INTERFACE: &str = "\
interface  ifcid  address       mask
ethernet1  67890  fe80::201:bff:fead:c0de  ffff:ffff:ffff:ffff::
";

pub const SHOW_LLDP_NEIGHBOR: &str = "\
interface  hostname             iface      ipv4      ipv6
ethernet1  sdn-sc-05.ultra.org  Ethernet1  10.0.0.2  fd00::2
";

pub const SHOW_LLDP_DETAIL: &str = "\
 peer                 b859.9fed.298e
 system name          sdn-sc-05.ultra.org
 port id              Ethernet1
";

pub const SHOW_VRF_ROUTING: &str = "\
name   rd    interfaces
----   --    ----------
CORE   1:1   3
";

pub const SHOW_IPV4_ROUTE: &str = "\
typ  prefix        metric  iface  hop   time
C    10.8.14.0/24  0/0     sdn1   null  1d02h
";

pub const SHOW_IPV6_ROUTE: &str = "\
typ  prefix      metric  iface  hop   time
C    fd00::/64   0/0     sdn1   null  1d02h
";

pub const RUNNING_CONFIG: &str = "\
hostname rare
!
interface ethernet1
 description out of band management port
 vrf forwarding oob
 ipv4 address 172.16.1.225 255.255.254.0
 exit
!
end
";

/// A runner that knows every read the facts subsets make.
pub fn router() -> FixtureRunner {
    FixtureRunner::new()
        .with_output("show platform", SHOW_PLATFORM)
        .with_output("show interfaces", SHOW_INTERFACES)
        .with_output("show ipv4 interface", SHOW_IPV4_INTERFACE)
        .with_output("show ipv6 interface", SHOW_IPV6_INTERFACE)
        .with_output("show lldp neighbor", SHOW_LLDP_NEIGHBOR)
        .with_output("show lldp detail ethernet1", SHOW_LLDP_DETAIL)
        .with_output("show vrf routing", SHOW_VRF_ROUTING)
        .with_output("show ipv4 route CORE", SHOW_IPV4_ROUTE)
        .with_output("show ipv6 route CORE", SHOW_IPV6_ROUTE)
        .with_output("show running-config", RUNNING_CONFIG)
}
