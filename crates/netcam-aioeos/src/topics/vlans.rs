//! `vlans` topic: VLAN name, state and member interfaces.

use super::{json_at, object_at, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use eos_types::VlanId;
use netcam_check_common::{FieldRule, Mismatch, Record, TopicId, TopicRules};
use serde_json::Value;

/// Members come from `show vlan` merged with `show vlan configured-ports`,
/// since ports with no link are only listed by the latter. MLAG peer
/// links are dropped and the `Cpu` member stands for the VLAN's SVI.
#[derive(Debug, Clone, Copy)]
pub struct VlansTopic {
    check_vlan1: bool,
    exclusive_members: bool,
}

impl VlansTopic {
    pub fn new(check_vlan1: bool, exclusive_members: bool) -> Self {
        Self {
            check_vlan1,
            exclusive_members,
        }
    }
}

impl Default for VlansTopic {
    fn default() -> Self {
        Self::new(false, true)
    }
}

impl TopicRules for VlansTopic {
    fn topic(&self) -> TopicId {
        TopicId::Vlans
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "interfaces" if self.exclusive_members => FieldRule::InterfaceList,
            "interfaces" => FieldRule::InterfaceSubset,
            _ => FieldRule::Exact,
        }
    }

    fn compare(&self, field: &str, expected: &Value, actual: &Value) -> bool {
        // an unnamed design VLAN accepts any name
        if field == "name" && expected.as_str().map(str::is_empty).unwrap_or(false) {
            return true;
        }
        self.field_rule(field).matches(expected, actual)
    }

    fn waive(&self, _expected: &Record, _actual: &Record, mismatch: &Mismatch) -> Option<String> {
        (mismatch.field == "name").then(|| format!("VLAN name mismatch: {}", mismatch))
    }
}

impl TopicHandler for VlansTopic {
    fn commands(&self) -> Vec<Command> {
        vec![
            Command::json("show vlan"),
            Command::json("show vlan configured-ports"),
        ]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let vlans = object_at(topic, json_at(topic, responses, 0)?, "vlans")?;
        let configured = object_at(topic, json_at(topic, responses, 1)?, "vlans")?;

        let mut records = Vec::with_capacity(vlans.len());
        for (id, vlan) in vlans {
            let vlan_id: VlanId = id
                .parse()
                .map_err(|e| TopicError::parse(topic, format!("vlan '{}': {}", id, e)))?;
            if vlan_id.is_default() && !self.check_vlan1 {
                continue;
            }

            let members = member_names(vlan)
                .chain(configured.get(id).into_iter().flat_map(member_names));
            let mut interfaces: Vec<String> = Vec::new();
            for name in members {
                if name.starts_with("Peer") {
                    continue;
                }
                let name = if name == "Cpu" {
                    vlan_id.svi_name()
                } else {
                    name.to_string()
                };
                if !interfaces.contains(&name) {
                    interfaces.push(name);
                }
            }

            records.push(
                Record::new(id.as_str())
                    .with_field("name", str_field(vlan, "name"))
                    .with_field("oper_up", str_field(vlan, "status") == "active")
                    .with_field("interfaces", interfaces),
            );
        }

        Ok(records)
    }
}

fn member_names(vlan: &Value) -> impl Iterator<Item = &str> {
    vlan.get("interfaces")
        .and_then(Value::as_object)
        .into_iter()
        .flat_map(|members| members.keys().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcam_check_common::{record, run_checks, CheckResult, CheckStatus, TopicPolicy};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn responses() -> Vec<RawResponse> {
        vec![
            RawResponse::Json(json!({"vlans": {
                "1": {"name": "default", "status": "active", "interfaces": {}},
                "10": {"name": "users", "status": "active", "interfaces": {
                    "Cpu": {}, "Ethernet1": {}, "PeerEthernet1": {}
                }},
                "20": {"name": "printers", "status": "suspended", "interfaces": {"Ethernet2": {}}}
            }})),
            RawResponse::Json(json!({"vlans": {
                "10": {"interfaces": {"Ethernet3": {}, "Ethernet1": {}}}
            }})),
        ]
    }

    fn check(topic: VlansTopic, expected: &[Record]) -> Vec<CheckResult> {
        let actual = topic.normalize(&responses()).unwrap();
        run_checks("leaf1", &topic, &TopicPolicy::default(), expected, &actual).unwrap()
    }

    #[test]
    fn test_normalize_merges_configured_ports() {
        let records = VlansTopic::default().normalize(&responses()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            record!(
                "10",
                "name" => "users",
                "oper_up" => true,
                "interfaces" => vec!["Vlan10", "Ethernet1", "Ethernet3"]
            )
        );
        assert_eq!(records[1].get_bool("oper_up"), Some(false));
    }

    #[test]
    fn test_vlan1_kept_when_configured() {
        let records = VlansTopic::new(true, true).normalize(&responses()).unwrap();
        assert_eq!(records[0].key, "1");
    }

    #[test]
    fn test_name_mismatch_is_note() {
        let expected = vec![
            record!("10", "name" => "staff", "interfaces" => vec!["Vlan10", "Ethernet1", "Ethernet3"]),
            record!("20", "name" => ""),
        ];
        let results = check(VlansTopic::default(), &expected);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert_eq!(results[0].notes.len(), 1);
        assert_eq!(results[1].status, CheckStatus::Pass);
        assert!(results[1].notes.is_empty());
    }

    #[test]
    fn test_member_matching() {
        let expected = vec![record!("10", "interfaces" => vec!["Et1", "Vlan10"])];

        let results = check(VlansTopic::default(), &expected);
        assert_eq!(results[0].status, CheckStatus::Fail);

        let results = check(VlansTopic::new(false, false), &expected);
        assert_eq!(results[0].status, CheckStatus::Pass);
    }

    #[test]
    fn test_unexpected_vlan_is_info() {
        let results = check(VlansTopic::default(), &[record!("10")]);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].key, "20");
        assert_eq!(results[1].status, CheckStatus::Info);
    }
}
