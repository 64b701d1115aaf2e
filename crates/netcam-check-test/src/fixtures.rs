//! Test fixtures for EOS device runs
//!
//! Canned eAPI payloads for a small leaf switch (`leaf1`) and the design
//! that matches it exactly. Tests start from these and break one thing.

use crate::mock_session::MockDevice;
use netcam_check_common::{record, ExpectedRecord, TopicId};
use serde_json::{json, Value};

/// Host name of the canned leaf switch.
pub const LEAF1: &str = "leaf1";

const GBIT: u64 = 1_000_000_000;

/// `show version`
pub fn show_version(model: &str) -> Value {
    json!({
        "modelName": model,
        "version": "4.28.3M",
        "serialNumber": "JPE00000001",
        "systemMacAddress": "00:1c:73:00:00:01"
    })
}

/// One `show interfaces status` entry.
pub fn interface_status(connected: bool, desc: &str, gbps: u64) -> Value {
    json!({
        "linkStatus": if connected { "connected" } else { "notconnect" },
        "lineProtocolStatus": if connected { "up" } else { "down" },
        "description": desc,
        "bandwidth": gbps * GBIT
    })
}

/// One `show ip interface brief` entry.
pub fn ip_interface(address: &str, mask_len: u8, up: bool) -> Value {
    json!({
        "interfaceAddress": {"ipAddr": {"address": address, "maskLen": mask_len}},
        "lineProtocolStatus": if up { "up" } else { "down" }
    })
}

/// One `show lldp neighbors` entry.
pub fn lldp_neighbor(port: &str, device: &str, neighbor_port: &str) -> Value {
    json!({"port": port, "neighborDevice": device, "neighborPort": neighbor_port})
}

/// Payloads and design for `leaf1`.
pub mod leaf1 {
    use super::*;

    pub fn show_interfaces_status() -> Value {
        json!({"interfaceStatuses": {
            "Ethernet1": interface_status(true, "server1", 10),
            "Ethernet2": interface_status(true, "server2", 10),
            "Ethernet49/1": interface_status(true, "spine1 Ethernet1/1", 100),
            "Ethernet50/1": interface_status(true, "spine2 Ethernet1/1", 100),
            "Port-Channel1": interface_status(true, "servers", 20)
        }})
    }

    pub fn show_vlan_brief() -> Value {
        json!({"vlans": {
            "1": {"status": "active", "interfaces": {}},
            "10": {"status": "active", "interfaces": {"Cpu": {}, "Port-Channel1": {}}}
        }})
    }

    pub fn show_ip_interface_brief() -> Value {
        json!({"interfaces": {
            "Ethernet49/1": ip_interface("10.1.0.1", 31, true),
            "Ethernet50/1": ip_interface("10.1.0.3", 31, true),
            "Loopback0": ip_interface("10.255.0.1", 32, true),
            "Vlan10": ip_interface("10.10.0.1", 24, true)
        }})
    }

    pub fn show_inventory() -> Value {
        json!({"xcvrSlots": {
            "1": {"modelName": "SFP-10G-SR"},
            "2": {"modelName": "SFP-10G-SR"},
            "49": {"modelName": "QSFP-100G-LR4-AR"},
            "50": {"modelName": "QSFP-100G-LR4"}
        }})
    }

    pub fn show_interfaces_hardware() -> Value {
        json!({"interfaces": {
            "Ethernet1": {"transceiverType": "10GBASE-SR"},
            "Ethernet2": {"transceiverType": "10GBASE-SR"},
            "Ethernet49/1": {"transceiverType": "100GBASE-AR4"},
            "Ethernet50/1": {"transceiverType": "100GBASE-LR"}
        }})
    }

    pub fn show_lacp_interface() -> Value {
        json!({"portChannels": {
            "Port-Channel1": {"interfaces": {
                "Ethernet1": {"actorPortStatus": "bundled"},
                "Ethernet2": {"actorPortStatus": "bundled"}
            }}
        }})
    }

    pub fn show_lldp_neighbors() -> Value {
        json!({"lldpNeighbors": [
            lldp_neighbor("Ethernet49/1", "spine1.dc1.example.net", "Ethernet1/1"),
            lldp_neighbor("Ethernet50/1", "spine2.dc1.example.net", "Ethernet1/1")
        ]})
    }

    pub fn show_vlan() -> Value {
        json!({"vlans": {
            "1": {"name": "default", "status": "active", "interfaces": {}},
            "10": {"name": "servers", "status": "active", "interfaces": {
                "Cpu": {}, "Port-Channel1": {}
            }}
        }})
    }

    pub fn show_vlan_configured_ports() -> Value {
        json!({"vlans": {"10": {"interfaces": {"Port-Channel1": {}}}}})
    }

    pub fn show_interfaces_switchport() -> Value {
        json!({"switchports": {
            "Port-Channel1": {"switchportInfo": {
                "mode": "trunk",
                "accessVlanId": 1,
                "trunkingNativeVlanId": 1,
                "trunkAllowedVlans": "10"
            }}
        }})
    }

    /// A mock device answering every command the EOS topics issue.
    pub fn device() -> MockDevice {
        MockDevice::new(LEAF1)
            .respond("show version", show_version("DCS-7050SX3-48YC12-F"))
            .respond("show interfaces status", show_interfaces_status())
            .respond("show vlan brief", show_vlan_brief())
            .respond("show ip interface brief", show_ip_interface_brief())
            .respond("show inventory", show_inventory())
            .respond("show interfaces hardware", show_interfaces_hardware())
            .respond("show lacp interface", show_lacp_interface())
            .respond("show lldp neighbors", show_lldp_neighbors())
            .respond("show vlan", show_vlan())
            .respond("show vlan configured-ports", show_vlan_configured_ports())
            .respond("show interfaces switchport", show_interfaces_switchport())
    }

    /// Design records that match [`device`] exactly.
    pub fn design() -> Vec<(TopicId, Vec<ExpectedRecord>)> {
        vec![
            (
                TopicId::Device,
                vec![record!("system", "product_model" => "DCS-7050SX3-48YC12")],
            ),
            (
                TopicId::Interfaces,
                vec![
                    record!("Ethernet1", "used" => true, "desc" => "server1", "speed" => "10G"),
                    record!("Ethernet2", "used" => true, "desc" => "server2", "speed" => "10G"),
                    record!("Ethernet49/1", "used" => true, "oper_up" => true, "speed" => "100G"),
                    record!("Ethernet50/1", "used" => true, "oper_up" => true, "speed" => "100G"),
                    record!("Port-Channel1", "used" => true, "desc" => "servers"),
                    record!("Vlan10", "used" => true, "oper_up" => true, "desc" => "servers"),
                    record!("Loopback0", "used" => true, "oper_up" => true),
                ],
            ),
            (
                TopicId::Transceivers,
                vec![
                    record!("Ethernet1", "model" => "SFP-10G-SR", "type" => "10GBASE-SR"),
                    record!("Ethernet2", "model" => "SFP-10G-SR", "type" => "10GBASE-SR"),
                    record!("Ethernet49/1", "model" => "QSFP-100G-LR4", "type" => "100GBASE-LR"),
                    record!("Ethernet50/1", "model" => "QSFP-100G-LR4", "type" => "100GBASE-LR"),
                ],
            ),
            (
                TopicId::Lags,
                vec![record!(
                    "Port-Channel1",
                    "enabled" => true,
                    "interfaces" => vec!["Ethernet1", "Ethernet2"]
                )],
            ),
            (
                TopicId::Cabling,
                vec![
                    record!("Ethernet49/1", "device" => "spine1", "port_id" => "Et1/1"),
                    record!("Ethernet50/1", "device" => "spine2", "port_id" => "Et1/1"),
                ],
            ),
            (
                TopicId::IpAddrs,
                vec![
                    record!("Ethernet49/1", "if_ipaddr" => "10.1.0.1/31", "oper_up" => true),
                    record!("Ethernet50/1", "if_ipaddr" => "10.1.0.3/31", "oper_up" => true),
                    record!("Loopback0", "if_ipaddr" => "10.255.0.1/32", "oper_up" => true),
                    record!("Vlan10", "if_ipaddr" => "10.10.0.1/24", "oper_up" => true),
                ],
            ),
            (
                TopicId::Vlans,
                vec![record!(
                    "10",
                    "name" => "servers",
                    "oper_up" => true,
                    "interfaces" => vec!["Port-Channel1", "Vlan10"]
                )],
            ),
            (
                TopicId::Switchports,
                vec![record!(
                    "Port-Channel1",
                    "mode" => "trunk",
                    "native_vlan" => 1,
                    "trunk_allowed_vlans" => vec![10]
                )],
            ),
        ]
    }

    /// Design records for one topic.
    pub fn design_for(topic: TopicId) -> Vec<ExpectedRecord> {
        design()
            .into_iter()
            .find(|(t, _)| *t == topic)
            .map(|(_, records)| records)
            .unwrap_or_default()
    }
}
