//! `lags` topic: port-channels and their bundled members.

use super::{json_at, object_at, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use netcam_check_common::{FieldRule, Record, TopicId, TopicRules};
use serde_json::Value;

/// A port-channel is enabled when at least one member is bundled.
/// Members that LACP has not bundled are left out of `interfaces`, so
/// they show up as a mismatch against the design member list.
#[derive(Debug, Clone, Copy, Default)]
pub struct LagsTopic;

impl TopicRules for LagsTopic {
    fn topic(&self) -> TopicId {
        TopicId::Lags
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "interfaces" => FieldRule::InterfaceList,
            _ => FieldRule::Exact,
        }
    }
}

impl TopicHandler for LagsTopic {
    fn commands(&self) -> Vec<Command> {
        vec![Command::json("show lacp interface")]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let port_channels = object_at(topic, json_at(topic, responses, 0)?, "portChannels")?;

        Ok(port_channels
            .iter()
            .map(|(po, data)| {
                let bundled: Vec<&str> = data
                    .get("interfaces")
                    .and_then(Value::as_object)
                    .into_iter()
                    .flatten()
                    .filter(|(_, member)| str_field(member, "actorPortStatus") == "bundled")
                    .map(|(name, _)| name.as_str())
                    .collect();

                Record::new(po.as_str())
                    .with_field("enabled", !bundled.is_empty())
                    .with_field("interfaces", bundled)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcam_check_common::{record, run_checks, CheckStatus, TopicPolicy};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn responses() -> Vec<RawResponse> {
        vec![RawResponse::Json(json!({"portChannels": {
            "Port-Channel1": {"interfaces": {
                "Ethernet1": {"actorPortStatus": "bundled"},
                "Ethernet2": {"actorPortStatus": "bundled"}
            }},
            "Port-Channel2": {"interfaces": {
                "Ethernet3": {"actorPortStatus": "bundled"},
                "Ethernet4": {"actorPortStatus": "noAgg"}
            }},
            "Port-Channel3": {"interfaces": {
                "Ethernet5": {"actorPortStatus": "noAgg"}
            }}
        }}))]
    }

    #[test]
    fn test_normalize() {
        let records = LagsTopic.normalize(&responses()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[1],
            record!("Port-Channel2", "enabled" => true, "interfaces" => vec!["Ethernet3"])
        );
        assert_eq!(records[2].get_bool("enabled"), Some(false));
    }

    #[test]
    fn test_check() {
        let actual = LagsTopic.normalize(&responses()).unwrap();
        let expected = vec![
            record!("Port-Channel1", "enabled" => true, "interfaces" => vec!["Et2", "Et1"]),
            record!("Port-Channel2", "enabled" => true, "interfaces" => vec!["Ethernet3", "Ethernet4"]),
            record!("Port-Channel9", "enabled" => true),
        ];

        let results = run_checks("leaf1", &LagsTopic, &TopicPolicy::default(), &expected, &actual).unwrap();
        let statuses: Vec<CheckStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Fail, CheckStatus::Info]
        );
        assert_eq!(results[3].key, "Port-Channel3");
    }
}
