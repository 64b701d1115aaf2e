//! Check topics, design services and per-topic check policy.

use crate::error::CheckError;
use crate::result::CheckStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A named category of device state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicId {
    Device,
    Interfaces,
    Transceivers,
    Lags,
    Cabling,
    #[serde(rename = "ipaddrs")]
    IpAddrs,
    Vlans,
    Switchports,
}

impl TopicId {
    pub const ALL: [TopicId; 8] = [
        TopicId::Device,
        TopicId::Interfaces,
        TopicId::Transceivers,
        TopicId::Lags,
        TopicId::Cabling,
        TopicId::IpAddrs,
        TopicId::Vlans,
        TopicId::Switchports,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TopicId::Device => "device",
            TopicId::Interfaces => "interfaces",
            TopicId::Transceivers => "transceivers",
            TopicId::Lags => "lags",
            TopicId::Cabling => "cabling",
            TopicId::IpAddrs => "ipaddrs",
            TopicId::Vlans => "vlans",
            TopicId::Switchports => "switchports",
        }
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TopicId {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        TopicId::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| CheckError::UnknownTopic(s.to_string()))
    }
}

/// A group of topics validated together for one design service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignService {
    Topology,
    Vlans,
}

impl DesignService {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DesignService::Topology => "topology",
            DesignService::Vlans => "vlans",
        }
    }

    /// Topics checked by this service, in report order.
    pub const fn topics(&self) -> &'static [TopicId] {
        match self {
            DesignService::Topology => &[
                TopicId::Device,
                TopicId::Interfaces,
                TopicId::Transceivers,
                TopicId::Cabling,
                TopicId::IpAddrs,
                TopicId::Lags,
            ],
            DesignService::Vlans => &[TopicId::Vlans, TopicId::Switchports],
        }
    }
}

impl fmt::Display for DesignService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DesignService {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "topology" => Ok(DesignService::Topology),
            "vlans" => Ok(DesignService::Vlans),
            _ => Err(CheckError::UnknownService(s.to_string())),
        }
    }
}

/// How to report device objects that the design does not mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Emit an INFO result.
    #[default]
    Info,
    /// Emit a SKIP result.
    Skip,
}

impl ExtraPolicy {
    pub const fn status(&self) -> CheckStatus {
        match self {
            ExtraPolicy::Info => CheckStatus::Info,
            ExtraPolicy::Skip => CheckStatus::Skip,
        }
    }
}

/// Per-topic check policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopicPolicy {
    #[serde(default)]
    pub extra_objects: ExtraPolicy,

    /// Fields excluded from comparison entirely.
    #[serde(default)]
    pub ignore_fields: BTreeSet<String>,

    /// Status used for missing or mismatching objects.
    #[serde(default = "default_failure_status")]
    pub failure_status: CheckStatus,
}

fn default_failure_status() -> CheckStatus {
    CheckStatus::Fail
}

impl Default for TopicPolicy {
    fn default() -> Self {
        Self {
            extra_objects: ExtraPolicy::default(),
            ignore_fields: BTreeSet::new(),
            failure_status: default_failure_status(),
        }
    }
}

impl TopicPolicy {
    pub fn ignores(&self, field: &str) -> bool {
        self.ignore_fields.contains(field)
    }

    /// Builder-style helper to mark a field ignored.
    pub fn with_ignored(mut self, field: impl Into<String>) -> Self {
        self.ignore_fields.insert(field.into());
        self
    }

    pub fn with_extra_objects(mut self, policy: ExtraPolicy) -> Self {
        self.extra_objects = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_topic_round_trip_names() {
        for topic in TopicId::ALL {
            assert_eq!(topic.as_str().parse::<TopicId>().unwrap(), topic);
        }
        assert_eq!("IPADDRS".parse::<TopicId>().unwrap(), TopicId::IpAddrs);
        assert!("mlags".parse::<TopicId>().is_err());
    }

    #[test]
    fn test_topic_serde_names() {
        let json = serde_json::to_string(&TopicId::IpAddrs).unwrap();
        assert_eq!(json, "\"ipaddrs\"");
    }

    #[test]
    fn test_service_topics() {
        let topology = DesignService::Topology.topics();
        assert_eq!(topology.len(), 6);
        assert!(topology.contains(&TopicId::Cabling));
        assert!(!topology.contains(&TopicId::Vlans));

        assert_eq!(
            DesignService::Vlans.topics(),
            &[TopicId::Vlans, TopicId::Switchports]
        );
        assert_eq!(
            "Topology".parse::<DesignService>().unwrap(),
            DesignService::Topology
        );
    }

    #[test]
    fn test_policy_defaults() {
        let policy = TopicPolicy::default();
        assert_eq!(policy.extra_objects, ExtraPolicy::Info);
        assert_eq!(policy.failure_status, CheckStatus::Fail);
        assert!(!policy.ignores("desc"));

        let policy = policy.with_ignored("desc");
        assert!(policy.ignores("desc"));
    }

    #[test]
    fn test_policy_deserialize() {
        let policy: TopicPolicy = serde_json::from_str(
            r#"{"extra_objects": "skip", "ignore_fields": ["desc"], "failure_status": "INFO"}"#,
        )
        .unwrap();
        assert_eq!(policy.extra_objects, ExtraPolicy::Skip);
        assert!(policy.ignores("desc"));
        assert_eq!(policy.failure_status, CheckStatus::Info);

        let err = serde_json::from_str::<TopicPolicy>(r#"{"extra": "skip"}"#);
        assert!(err.is_err());
    }
}
