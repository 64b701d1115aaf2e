//! `switchports` topic: L2 mode and VLAN assignment per port.

use super::{json_at, object_at, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use netcam_check_common::{FieldRule, Record, TopicId, TopicRules};
use serde_json::Value;

/// Access ports are checked on `access_vlan`, trunks on `native_vlan` and
/// `trunk_allowed_vlans`; only the fields the design names are compared.
/// An empty design trunk list means all VLANs are allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwitchportsTopic;

impl TopicRules for SwitchportsTopic {
    fn topic(&self) -> TopicId {
        TopicId::Switchports
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "mode" => FieldRule::CaseInsensitive,
            "trunk_allowed_vlans" => FieldRule::VlanList,
            _ => FieldRule::Exact,
        }
    }

    fn compare(&self, field: &str, expected: &Value, actual: &Value) -> bool {
        let unrestricted = Value::from("ALL");
        let expected = match expected {
            Value::Array(ids) if field == "trunk_allowed_vlans" && ids.is_empty() => &unrestricted,
            _ => expected,
        };
        self.field_rule(field).matches(expected, actual)
    }
}

impl TopicHandler for SwitchportsTopic {
    fn commands(&self) -> Vec<Command> {
        vec![Command::json("show interfaces switchport")]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let switchports = object_at(topic, json_at(topic, responses, 0)?, "switchports")?;

        let mut records = Vec::with_capacity(switchports.len());
        for (name, port) in switchports {
            let info = port.get("switchportInfo").ok_or_else(|| {
                TopicError::parse(topic, format!("{} has no switchportInfo", name))
            })?;
            let vlan = |field: &str| info.get(field).cloned().unwrap_or(Value::Null);

            records.push(
                Record::new(name.as_str())
                    .with_field("mode", str_field(info, "mode"))
                    .with_field("access_vlan", vlan("accessVlanId"))
                    .with_field("native_vlan", vlan("trunkingNativeVlanId"))
                    .with_field("trunk_allowed_vlans", str_field(info, "trunkAllowedVlans")),
            );
        }

        Ok(records)
    }
}
