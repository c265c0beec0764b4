mod common;

use common::router;
use freertr::facts::{DeviceInfo, gather_facts};
use serde_json::json;

#[tokio::test]
async fn test_default_request_skips_config() {
    let mut runner = router();
    let facts = gather_facts(&mut runner, &[] as &[&str]).await.unwrap();

    assert_eq!(
        facts.get("net_gather_subset"),
        Some(&json!(["default", "hardware", "interfaces", "routing"]))
    );
    assert!(!facts.contains_key("net_config"));
    assert_eq!(runner.count("show running-config"), 0);
    assert!(facts.keys().all(|k| k.starts_with("net_")));
}

#[tokio::test]
async fn test_identity_and_hardware() {
    let mut runner = router();
    let facts = gather_facts(&mut runner, &["hardware"]).await.unwrap();

    assert_eq!(facts.get("net_version"), Some(&json!("v23.4.21-cur")));
    assert_eq!(facts.get("net_hwid"), Some(&json!("accton_as9516_32d")));
    assert_eq!(facts.get("net_hostname"), Some(&json!("rare")));
    assert_eq!(facts.get("net_memtotal_mb"), Some(&json!("2147m")));
    assert_eq!(facts.get("net_cpu_count"), Some(&json!(16)));
}

#[tokio::test]
async fn test_interfaces_subset() {
    let mut runner = router();
    let facts = gather_facts(&mut runner, &["interfaces"]).await.unwrap();

    let eth = &facts.get("net_interfaces").unwrap()["ethernet1"];
    assert_eq!(eth["state"], "up");
    assert_eq!(eth["type"], "ethernet");
    assert_eq!(eth["mac"], "00:01:0b:ad:c0:de");
    assert_eq!(eth["mtu"], 1500);
    assert_eq!(eth["speed"], 100);
    assert_eq!(eth["vrf"], "oob");

    let sub = &facts.get("net_interfaces").unwrap()["sdn1.3600"];
    assert_eq!(sub["mac"], "");
    assert_eq!(sub["parent"], "sdn1");
    assert_eq!(sub["speed"], 2000);

    assert_eq!(
        facts.get("net_all_ipv4_addresses"),
        Some(&json!(["172.16.1.225/255.255.254.0"]))
    );

    let neighbor = &facts.get("net_neighbors").unwrap()["ethernet1"];
    assert_eq!(neighbor["remote_system_name"], "sdn-sc-05.ultra.org");
    assert_eq!(neighbor["remote_chassis_id"], "b8:59:9f:ed:29:8e");
    assert_eq!(neighbor["remote_port_id"], "Ethernet1");
    assert_eq!(runner.count("show lldp detail ethernet1"), 1);
}

#[tokio::test]
async fn test_routing_subset_queries_each_vrf() {
    let mut runner = router();
    let facts = gather_facts(&mut runner, &["routing"]).await.unwrap();

    let routing = facts.get("net_routing").unwrap();
    assert_eq!(routing["ipv4"][0]["prefix"], "10.8.14.0/24");
    assert_eq!(routing["ipv4"][0]["vrf"], "CORE");
    assert_eq!(routing["ipv6"][0]["prefix"], "fd00::/64");

    let sent = runner.sent();
    let v4 = sent.iter().position(|c| *c == "show ipv4 route CORE").unwrap();
    let v6 = sent.iter().position(|c| *c == "show ipv6 route CORE").unwrap();
    assert!(v4 < v6);
}

#[tokio::test]
async fn test_config_subset() {
    let mut runner = router();
    let facts = gather_facts(&mut runner, &["config"]).await.unwrap();
    let config = facts.get("net_config").unwrap().as_str().unwrap();
    assert!(config.contains("interface ethernet1"));
}

#[tokio::test]
async fn test_unknown_subset_sends_nothing() {
    let mut runner = router();
    assert!(gather_facts(&mut runner, &["bogus"]).await.is_err());
    assert!(runner.calls.is_empty());
}

#[tokio::test]
async fn test_missing_anchor_is_empty() {
    let mut runner = common::FixtureRunner::new().with_output("show platform", "freeRouter 1.2.3,\nname: R1\n");
    let info = DeviceInfo::probe(&mut runner).await.unwrap();
    assert_eq!(info.version, "1.2.3");
    assert_eq!(info.hwid, "");
    assert_eq!(info.hostname, "R1");
}
