//! EOS topic handlers.
//!
//! Each topic knows which show commands to run, how to turn their output
//! into [`Record`]s, and (through [`TopicRules`]) how to compare those
//! records with the design. Handlers are collected in an explicit
//! [`TopicTable`] handed to the runner.

mod cabling;
mod device_info;
mod interfaces;
mod ipaddrs;
mod lags;
mod switchports;
mod transceivers;
mod vlans;

pub use cabling::CablingTopic;
pub use device_info::DeviceInfoTopic;
pub use interfaces::InterfacesTopic;
pub use ipaddrs::IpAddrsTopic;
pub use lags::LagsTopic;
pub use switchports::SwitchportsTopic;
pub use transceivers::TransceiversTopic;
pub use vlans::VlansTopic;

use crate::config::PluginConfig;
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use netcam_check_common::{Disposition, Record, TopicId, TopicRules};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Design flag: report the object as INFO without comparing it.
pub const FLAG_RESERVED: &str = "reserved";

/// Design flag: the port is deliberately shut down.
pub const FLAG_FORCED_UNUSED: &str = "forced_unused";

/// Fetch-and-normalize half of a topic; comparison comes from [`TopicRules`].
pub trait TopicHandler: TopicRules {
    /// Read-only commands whose responses [`TopicHandler::normalize`] consumes, in order.
    fn commands(&self) -> Vec<Command>;

    /// Builds actual records from the responses to [`TopicHandler::commands`].
    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError>;
}

/// Topic handlers available to a run, keyed by topic.
#[derive(Clone, Default)]
pub struct TopicTable {
    handlers: BTreeMap<TopicId, Arc<dyn TopicHandler>>,
}

impl TopicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// All EOS topic handlers, configured from `config`.
    pub fn eos(config: &PluginConfig) -> Self {
        let mut table = Self::new();
        table.insert(Arc::new(DeviceInfoTopic));
        table.insert(Arc::new(InterfacesTopic));
        table.insert(Arc::new(TransceiversTopic::new(
            config.transceivers.models.clone(),
        )));
        table.insert(Arc::new(LagsTopic));
        table.insert(Arc::new(CablingTopic));
        table.insert(Arc::new(IpAddrsTopic));
        table.insert(Arc::new(VlansTopic::new(
            config.vlans.check_vlan1,
            config.vlans.exclusive_members,
        )));
        table.insert(Arc::new(SwitchportsTopic));
        table
    }

    /// Registers `handler` under its own topic, replacing any previous one.
    pub fn insert(&mut self, handler: Arc<dyn TopicHandler>) {
        self.handlers.insert(handler.topic(), handler);
    }

    pub fn get(&self, topic: TopicId) -> Option<Arc<dyn TopicHandler>> {
        self.handlers.get(&topic).cloned()
    }

    pub fn topics(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.handlers.keys().copied()
    }
}

/// INFO for reserved design objects, otherwise compare.
pub(crate) fn reserved_or_compare(expected: &Record) -> Disposition {
    if expected.has_flag(FLAG_RESERVED) {
        Disposition::Report("interface is in reserved state".to_string())
    } else {
        Disposition::Compare
    }
}

/// The JSON body of response `idx`.
pub(crate) fn json_at(topic: TopicId, responses: &[RawResponse], idx: usize) -> Result<&Value, TopicError> {
    responses
        .get(idx)
        .ok_or_else(|| TopicError::parse(topic, format!("missing response {}", idx)))?
        .as_json()
        .ok_or_else(|| TopicError::parse(topic, format!("response {} is not JSON", idx)))
}

/// The object at `field` of `value`.
pub(crate) fn object_at<'a>(
    topic: TopicId,
    value: &'a Value,
    field: &str,
) -> Result<&'a Map<String, Value>, TopicError> {
    value
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| TopicError::parse(topic, format!("missing object '{}'", field)))
}

pub(crate) fn str_field<'a>(value: &'a Value, field: &str) -> &'a str {
    value.get(field).and_then(Value::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eos_table_has_every_topic() {
        let table = TopicTable::eos(&PluginConfig::default());
        let topics: Vec<TopicId> = table.topics().collect();
        assert_eq!(topics, TopicId::ALL.to_vec());
        for topic in TopicId::ALL {
            let handler = table.get(topic).unwrap();
            assert_eq!(handler.topic(), topic);
            assert!(!handler.commands().is_empty());
        }
    }

    #[test]
    fn test_json_helpers() {
        let responses = vec![
            RawResponse::Json(json!({"vlans": {"10": {"name": "users"}}})),
            RawResponse::Text("hostname leaf1".to_string()),
        ];
        let body = json_at(TopicId::Vlans, &responses, 0).unwrap();
        assert_eq!(object_at(TopicId::Vlans, body, "vlans").unwrap().len(), 1);
        assert!(object_at(TopicId::Vlans, body, "interfaces").is_err());
        assert!(json_at(TopicId::Vlans, &responses, 1).is_err());
        assert!(json_at(TopicId::Vlans, &responses, 2).is_err());
        assert_eq!(str_field(&json!({"name": "users"}), "name"), "users");
        assert_eq!(str_field(&json!({}), "name"), "");
    }
}
