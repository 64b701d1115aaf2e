//! `transceivers` topic: optic model and type per port.

use super::{json_at, object_at, reserved_or_compare, str_field, TopicHandler};
use crate::error::TopicError;
use eos_eapi::{Command, RawResponse};
use eos_types::InterfaceName;
use netcam_check_common::{Disposition, Record, TopicId, TopicRules};
use serde_json::Value;
use std::collections::BTreeMap;

/// Arista-branded media types and the standard type they stand for.
const TYPE_ALIASES: [(&str, &str); 3] = [
    ("100GBASE-AR4", "100GBASE-LR"),
    ("10GBASE-AR", "10GBASE-LR"),
    ("10GBASE-CRA", "10GBASE-CR"),
];

/// Vendor-neutral AOC models report a length suffix the design omits.
const AOC_MODEL_PREFIX: &str = "AOC-S-S-10G";

/// EOS keys its transceiver inventory by front-panel port number, so each
/// primary-lane interface in `show interfaces hardware` is joined with
/// `xcvrSlots.<port>` from `show inventory`. Ports without an installed
/// optic produce no record.
#[derive(Debug, Clone, Default)]
pub struct TransceiversTopic {
    /// Device model to design model, from `[transceivers.models]`.
    models: BTreeMap<String, String>,
}

impl TransceiversTopic {
    pub fn new(models: BTreeMap<String, String>) -> Self {
        Self { models }
    }

    /// Returns true if a device-reported model satisfies the design model.
    pub fn model_matches(&self, expected: &str, measured: &str) -> bool {
        if expected.starts_with(AOC_MODEL_PREFIX) {
            return measured.starts_with(AOC_MODEL_PREFIX);
        }
        let measured = measured.strip_suffix("-AR").unwrap_or(measured);
        let measured = self.models.get(measured).map(String::as_str).unwrap_or(measured);
        expected == measured
    }

    pub fn type_matches(expected: &str, measured: &str) -> bool {
        let measured = TYPE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == measured)
            .map(|(_, standard)| *standard)
            .unwrap_or(measured);
        expected == measured
    }
}

impl TopicRules for TransceiversTopic {
    fn topic(&self) -> TopicId {
        TopicId::Transceivers
    }

    fn compare(&self, field: &str, expected: &Value, actual: &Value) -> bool {
        match (field, expected.as_str(), actual.as_str()) {
            ("model", Some(e), Some(a)) => self.model_matches(e, a),
            ("type", Some(e), Some(a)) => Self::type_matches(e, a),
            _ => self.field_rule(field).matches(expected, actual),
        }
    }

    fn disposition(&self, expected: &Record) -> Disposition {
        reserved_or_compare(expected)
    }
}

impl TopicHandler for TransceiversTopic {
    fn commands(&self) -> Vec<Command> {
        vec![
            Command::json("show inventory"),
            Command::json("show interfaces hardware"),
        ]
    }

    fn normalize(&self, responses: &[RawResponse]) -> Result<Vec<Record>, TopicError> {
        let topic = self.topic();
        let slots = object_at(topic, json_at(topic, responses, 0)?, "xcvrSlots")?;
        let hardware = object_at(topic, json_at(topic, responses, 1)?, "interfaces")?;

        let mut records = Vec::new();
        for (name, hw) in hardware {
            let Ok(ifname) = name.parse::<InterfaceName>() else {
                continue;
            };
            if !ifname.is_primary_lane() {
                continue;
            }
            let Some(port) = ifname.port_number() else {
                continue;
            };
            let model = slots.get(port).map(|slot| str_field(slot, "modelName")).unwrap_or_default();
            if model.is_empty() {
                continue;
            }
            records.push(
                Record::new(name.as_str())
                    .with_field("model", model)
                    .with_field("type", str_field(hw, "transceiverType")),
            );
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netcam_check_common::{record, run_checks, CheckStatus, TopicPolicy};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn responses() -> Vec<RawResponse> {
        vec![
            RawResponse::Json(json!({"xcvrSlots": {
                "49": {"modelName": "QSFP-100G-LR4-AR"},
                "50": {"modelName": ""},
                "1": {"modelName": "AOC-S-S-10G-3M"}
            }})),
            RawResponse::Json(json!({"interfaces": {
                "Ethernet1": {"transceiverType": "10GBASE-CRA"},
                "Ethernet49/1": {"transceiverType": "100GBASE-AR4"},
                "Ethernet49/2": {"transceiverType": "100GBASE-AR4"},
                "Ethernet50/1": {"transceiverType": ""}
            }})),
        ]
    }

    #[test]
    fn test_normalize_joins_inventory() {
        let records = TransceiversTopic::default().normalize(&responses()).unwrap();
        assert_eq!(
            records,
            vec![
                record!("Ethernet1", "model" => "AOC-S-S-10G-3M", "type" => "10GBASE-CRA"),
                record!("Ethernet49/1", "model" => "QSFP-100G-LR4-AR", "type" => "100GBASE-AR4"),
            ]
        );
    }

    #[test]
    fn test_model_matching() {
        let topic = TransceiversTopic::new(BTreeMap::from([(
            "QSFP-100G-LR4".to_string(),
            "QSFP100-LR4".to_string(),
        )]));
        assert!(topic.model_matches("AOC-S-S-10G-1M", "AOC-S-S-10G-3M"));
        assert!(topic.model_matches("QSFP100-LR4", "QSFP-100G-LR4-AR"));
        assert!(topic.model_matches("QSFP100-LR4", "QSFP-100G-LR4"));
        assert!(!topic.model_matches("QSFP-100G-LR4", "QSFP-100G-LR4-AR"));

        let plain = TransceiversTopic::default();
        assert!(plain.model_matches("QSFP-100G-LR4", "QSFP-100G-LR4-AR"));
        assert!(!plain.model_matches("SFP-10G-SR", "SFP-10G-LR"));
    }

    #[test]
    fn test_type_aliases() {
        assert!(TransceiversTopic::type_matches("100GBASE-LR", "100GBASE-AR4"));
        assert!(TransceiversTopic::type_matches("10GBASE-CR", "10GBASE-CRA"));
        assert!(TransceiversTopic::type_matches("10GBASE-SR", "10GBASE-SR"));
        assert!(!TransceiversTopic::type_matches("10GBASE-SR", "10GBASE-AR"));
    }

    #[test]
    fn test_check() {
        let topic = TransceiversTopic::default();
        let actual = topic.normalize(&responses()).unwrap();
        let expected = vec![
            record!("Ethernet49/1", "model" => "QSFP-100G-LR4", "type" => "100GBASE-LR"),
            record!("Ethernet1", "model" => "AOC-S-S-10G-1M", "type" => "10GBASE-SR"),
            record!("Ethernet50/1", "model" => "QSFP-100G-SR4", "type" => "100GBASE-SR4"),
            record!("Ethernet2", "model" => "SFP-10G-SR").with_flag("reserved"),
        ];

        let results = run_checks("leaf1", &topic, &TopicPolicy::default(), &expected, &actual).unwrap();
        let statuses: Vec<CheckStatus> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![CheckStatus::Pass, CheckStatus::Fail, CheckStatus::Fail, CheckStatus::Info]
        );
        assert_eq!(results[1].mismatches[0].field, "type");
    }
}
