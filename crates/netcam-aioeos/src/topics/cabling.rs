//! `cabling` topic: LLDP neighbor per local port.

use super::{json_at, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use eos_types::InterfaceName;
use netcam_check_common::{FieldRule, Record, TopicId, TopicRules};
use serde_json::Value;

/// Neighbor hostnames compare without case or domain, neighbor ports
/// with short interface forms expanded.
#[derive(Debug, Clone, Copy, Default)]
pub struct CablingTopic;

impl TopicRules for CablingTopic {
    fn topic(&self) -> TopicId {
        TopicId::Cabling
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "device" => FieldRule::Hostname,
            "port_id" => FieldRule::Interface,
            _ => FieldRule::Exact,
        }
    }
}

impl TopicHandler for CablingTopic {
    fn commands(&self) -> Vec<Command> {
        vec![Command::json("show lldp neighbors")]
    }

    /// One record per LLDP entry. A port with two neighbors yields two
    /// records with the same key, which the check rejects.
    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let neighbors = json_at(topic, responses, 0)?
            .get("lldpNeighbors")
            .and_then(Value::as_array)
            .ok_or_else(|| TopicError::parse(topic, "missing list 'lldpNeighbors'"))?;

        Ok(neighbors
            .iter()
            .map(|nei| {
                let port = str_field(nei, "port");
                let key = port
                    .parse::<InterfaceName>()
                    .map(String::from)
                    .unwrap_or_else(|_| port.to_string());
                Record::new(key)
                    .with_field("device", str_field(nei, "neighborDevice"))
                    .with_field("port_id", str_field(nei, "neighborPort"))
            })
            .collect())
    }
}
