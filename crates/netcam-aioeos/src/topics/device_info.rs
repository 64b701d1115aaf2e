//! `device` topic: platform identity from `show version`.

use super::{json_at, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use netcam_check_common::{FieldRule, Record, TopicId, TopicRules};

/// Key of the single record this topic produces.
pub const DEVICE_KEY: &str = "system";

/// Checks the product model, and optionally OS version and serial number.
///
/// The model compares over the length of the shorter string so that a
/// design model without the airflow suffix (`-F`, `-R`) still matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceInfoTopic;

impl TopicRules for DeviceInfoTopic {
    fn topic(&self) -> TopicId {
        TopicId::Device
    }

    fn field_rule(&self, field: &str) -> FieldRule {
        match field {
            "product_model" => FieldRule::Prefix,
            _ => FieldRule::Exact,
        }
    }
}

impl TopicHandler for DeviceInfoTopic {
    fn commands(&self) -> Vec<Command> {
        vec![Command::json("show version")]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let version = json_at(self.topic(), responses, 0)?;
        let model = str_field(version, "modelName");
        if model.is_empty() {
            return Err(TopicError::parse(self.topic(), "show version has no modelName"));
        }

        Ok(vec![Record::new(DEVICE_KEY)
            .with_field("product_model", model)
            .with_field("os_version", str_field(version, "version"))
            .with_field("serial_number", str_field(version, "serialNumber"))
            .with_field("system_mac", str_field(version, "systemMacAddress"))])
    }
}
