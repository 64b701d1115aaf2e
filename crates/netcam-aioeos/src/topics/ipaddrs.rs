//! `ipaddrs` topic: interface addresses and line protocol state.

use super::{json_at, object_at, str_field, TopicHandler, FLAG_RESERVED};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use netcam_check_common::{Disposition, FieldRule, Mismatch, Record, TopicId, TopicRules};
use serde_json::Value;

/// Design placeholder address for an interface whose address is not yet assigned.
pub const RESERVED_ADDRESS: &str = "is_reserved";

/// Design flag: the interface is administratively disabled.
pub const FLAG_DISABLED: &str = "disabled";

/// Only interfaces with an address (mask length other than zero) are
/// device objects for this topic.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddrsTopic;

impl TopicRules for IpAddrsTopic {
    fn topic(&self) -> TopicId {
        TopicId::IpAddrs
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "if_ipaddr" => FieldRule::IpInterface,
            _ => FieldRule::Exact,
        }
    }

    fn waive(&self, expected: &Record, _actual: &Record, mismatch: &Mismatch) -> Option<String> {
        (mismatch.field == "oper_up" && expected.has_flag(FLAG_DISABLED))
            .then(|| format!("interface is disabled in design: {}", mismatch))
    }

    fn disposition(&self, expected: &Record) -> Disposition {
        if expected.has_flag(FLAG_RESERVED) || expected.get_str("if_ipaddr") == Some(RESERVED_ADDRESS) {
            Disposition::Report("address is reserved".to_string())
        } else {
            Disposition::Compare
        }
    }
}

impl TopicHandler for IpAddrsTopic {
    fn commands(&self) -> Vec<Command> {
        vec![Command::json("show ip interface brief")]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let interfaces = object_at(topic, json_at(topic, responses, 0)?, "interfaces")?;

        let mut records = Vec::new();
        for (name, data) in interfaces {
            let Some(addr) = data.pointer("/interfaceAddress/ipAddr") else {
                return Err(TopicError::parse(topic, format!("{} has no interfaceAddress", name)));
            };
            let mask_len = addr.get("maskLen").and_then(Value::as_u64).unwrap_or(0);
            if mask_len == 0 {
                continue;
            }
            records.push(
                Record::new(name.as_str())
                    .with_field("if_ipaddr", format!("{}/{}", str_field(addr, "address"), mask_len))
                    .with_field("oper_up", str_field(data, "lineProtocolStatus") == "up"),
            );
        }

        Ok(records)
    }
}
