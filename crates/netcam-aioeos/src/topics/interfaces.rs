//! `interfaces` topic: admin/oper state, description and speed per interface.

use super::{json_at, object_at, reserved_or_compare, str_field, TopicHandler, FLAG_FORCED_UNUSED};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use eos_types::{InterfaceKind, InterfaceName, Speed};
use netcam_check_common::{Disposition, FieldRule, Mismatch, Record, TopicId, TopicRules};
use serde_json::Value;
use std::collections::HashSet;

/// Physical ports come from `show interfaces status`, SVIs from
/// `show vlan brief` (a VLAN with a `Cpu` member has an SVI) and loopbacks
/// from `show ip interface brief`.
///
/// Description mismatches are notes, except on ports forced unused. Speed
/// is not held against a port that is down.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfacesTopic;

impl TopicRules for InterfacesTopic {
    fn topic(&self) -> TopicId {
        TopicId::Interfaces
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "speed" => FieldRule::Speed,
            _ => FieldRule::Exact,
        }
    }

    fn compare(&self, field: &str, expected: &Value, actual: &Value) -> bool {
        // SVIs and loopbacks report neither description nor speed
        if matches!(field, "desc" | "speed") && actual.is_null() {
            return true;
        }
        self.field_rule(field).matches(expected, actual)
    }

    fn waive(&self, expected: &Record, actual: &Record, mismatch: &Mismatch) -> Option<String> {
        match mismatch.field.as_str() {
            "desc" if !expected.has_flag(FLAG_FORCED_UNUSED) => {
                Some(format!("description mismatch: {}", mismatch))
            }
            "speed" if actual.get_bool("oper_up") == Some(false) => {
                Some(format!("speed not checked, interface is down: {}", mismatch))
            }
            _ => None,
        }
    }

    fn disposition(&self, expected: &Record) -> Disposition {
        reserved_or_compare(expected)
    }

    fn effective_expected(&self, expected: &Record) -> Option<Record> {
        expected
            .has_flag(FLAG_FORCED_UNUSED)
            .then(|| expected.clone().with_field("used", false))
    }
}

impl TopicHandler for InterfacesTopic {
    fn commands(&self) -> Vec<Command> {
        vec![
            Command::json("show interfaces status"),
            Command::json("show vlan brief"),
            Command::json("show ip interface brief"),
        ]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let statuses = object_at(topic, json_at(topic, responses, 0)?, "interfaceStatuses")?;
        let vlans = object_at(topic, json_at(topic, responses, 1)?, "vlans")?;
        let ip_ifaces = object_at(topic, json_at(topic, responses, 2)?, "interfaces")?;

        let mut records = Vec::with_capacity(statuses.len());
        let mut seen = HashSet::new();

        for (name, status) in statuses {
            let bandwidth = status.get("bandwidth").and_then(Value::as_u64).unwrap_or(0);
            seen.insert(name.clone());
            records.push(
                Record::new(name.as_str())
                    .with_field("used", str_field(status, "linkStatus") != "disabled")
                    .with_field("oper_up", str_field(status, "lineProtocolStatus") == "up")
                    .with_field("desc", str_field(status, "description"))
                    .with_field("speed", Speed::from_bits(bandwidth).to_string()),
            );
        }

        for (vlan_id, vlan) in vlans {
            let has_cpu = vlan
                .get("interfaces")
                .and_then(Value::as_object)
                .map(|members| members.contains_key("Cpu"))
                .unwrap_or(false);
            let svi = format!("Vlan{}", vlan_id);
            if !has_cpu || !seen.insert(svi.clone()) {
                continue;
            }
            records.push(
                Record::new(svi)
                    .with_field("used", true)
                    .with_field("oper_up", str_field(vlan, "status") == "active"),
            );
        }

        for (name, iface) in ip_ifaces {
            let is_loopback = name
                .parse::<InterfaceName>()
                .map(|n| n.kind() == InterfaceKind::Loopback)
                .unwrap_or(false);
            if !is_loopback || !seen.insert(name.clone()) {
                continue;
            }
            records.push(
                Record::new(name.as_str())
                    .with_field("used", true)
                    .with_field("oper_up", str_field(iface, "lineProtocolStatus") == "up"),
            );
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcam_check_common::{record, run_checks, CheckResult, CheckStatus, TopicPolicy};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn responses() -> Vec<RawResponse> {
        vec![
            RawResponse::Json(json!({"interfaceStatuses": {
                "Ethernet1": {
                    "linkStatus": "connected",
                    "lineProtocolStatus": "up",
                    "description": "uplink spine1",
                    "bandwidth": 10_000_000_000u64
                },
                "Ethernet2": {
                    "linkStatus": "notconnect",
                    "lineProtocolStatus": "down",
                    "description": "server",
                    "bandwidth": 1_000_000_000u64
                },
                "Ethernet3": {
                    "linkStatus": "disabled",
                    "lineProtocolStatus": "down",
                    "description": "",
                    "bandwidth": 10_000_000_000u64
                }
            }})),
            RawResponse::Json(json!({"vlans": {
                "10": {"status": "active", "interfaces": {"Cpu": {}, "Ethernet2": {}}},
                "20": {"status": "active", "interfaces": {"Ethernet2": {}}}
            }})),
            RawResponse::Json(json!({"interfaces": {
                "Loopback0": {"lineProtocolStatus": "up"},
                "Vlan10": {"lineProtocolStatus": "up"}
            }})),
        ]
    }

    fn check(expected: &[Record]) -> Vec<CheckResult> {
        let actual = InterfacesTopic.normalize(&responses()).unwrap();
        run_checks("leaf1", &InterfacesTopic, &TopicPolicy::default(), expected, &actual).unwrap()
    }

    #[test]
    fn test_normalize() {
        let records = InterfacesTopic.normalize(&responses()).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec!["Ethernet1", "Ethernet2", "Ethernet3", "Vlan10", "Loopback0"]
        );
        assert_eq!(records[0].get_str("speed"), Some("10G"));
        assert_eq!(records[2].get_bool("used"), Some(false));
        assert_eq!(records[3].get_bool("oper_up"), Some(true));
    }

    #[test]
    fn test_speed_mismatch_on_up_port_fails() {
        let expected = vec![record!("Ethernet1", "used" => true, "speed" => "25G")];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Fail);
        assert_eq!(results[0].mismatches[0].field, "speed");
    }

    #[test]
    fn test_speed_mismatch_on_down_port_waived() {
        let expected = vec![record!("Ethernet2", "used" => true, "speed" => "10G")];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert_eq!(results[0].notes.len(), 1);
    }

    #[test]
    fn test_description_mismatch_is_note() {
        let expected = vec![record!("Ethernet1", "desc" => "uplink spine2")];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert!(results[0].notes[0].contains("desc"));
    }

    #[test]
    fn test_forced_unused() {
        // Ethernet3 is disabled, so a forced-unused design passes even if it says used
        let expected = vec![record!("Ethernet3", "used" => true).with_flag(FLAG_FORCED_UNUSED)];
        assert_eq!(check(&expected)[0].status, CheckStatus::Pass);

        let expected =
            vec![record!("Ethernet1", "desc" => "old").with_flag(FLAG_FORCED_UNUSED)];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Fail);
        let fields: Vec<&str> = results[0].mismatches.iter().map(|m| m.field.as_str()).collect();
        assert_eq!(fields, vec!["desc", "used"]);
    }

    #[test]
    fn test_svi_and_loopback() {
        let expected = vec![
            record!("Vlan10", "used" => true, "oper_up" => true, "desc" => "users"),
            record!("Loopback0", "used" => true, "oper_up" => true),
            record!("Vlan20", "used" => true),
        ];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert_eq!(results[1].status, CheckStatus::Pass);
        assert_eq!(results[2].status, CheckStatus::Fail);
    }

    #[test]
    fn test_reserved_is_info() {
        let expected = vec![record!("Ethernet1", "speed" => "100G").with_flag("reserved")];
        let results = check(&expected);
        assert_eq!(results[0].status, CheckStatus::Info);
    }

    #[test]
    fn test_missing_status_object() {
        let mut bad = responses();
        bad[0] = RawResponse::Json(json!({}));
        assert!(InterfacesTopic.normalize(&bad).is_err());
    }
}
