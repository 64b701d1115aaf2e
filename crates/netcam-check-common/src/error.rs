//! Error types for check execution and design lookup.

use crate::topic::TopicId;
use std::fmt;
use thiserror::Error;

/// Which side of a comparison a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSide {
    Expected,
    Actual,
}

impl fmt::Display for RecordSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSide::Expected => f.write_str("expected"),
            RecordSide::Actual => f.write_str("actual"),
        }
    }
}

/// Errors raised while reconciling a topic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// Two records on one side share a natural key.
    #[error("duplicate {side} key '{key}' in topic {topic}")]
    DuplicateKey {
        topic: TopicId,
        key: String,
        side: RecordSide,
    },

    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    #[error("unknown design service: {0}")]
    UnknownService(String),
}

impl CheckError {
    /// Creates a duplicate key error.
    pub fn duplicate_key(topic: TopicId, key: impl Into<String>, side: RecordSide) -> Self {
        Self::DuplicateKey {
            topic,
            key: key.into(),
            side,
        }
    }
}

/// Errors from a design expectation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The design has no entry for this device.
    #[error("device '{0}' not found in design")]
    UnknownDevice(String),

    /// The design source could not be read.
    #[error("failed to load design from {path}: {message}")]
    Load {
        path: String,
        message: String,
    },

    /// The design source was read but holds invalid data.
    #[error("invalid design data: {message}")]
    Invalid {
        message: String,
    },
}

impl ProviderError {
    pub fn load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_key_display() {
        let err = CheckError::duplicate_key(TopicId::Cabling, "Ethernet1", RecordSide::Actual);
        assert_eq!(
            err.to_string(),
            "duplicate actual key 'Ethernet1' in topic cabling"
        );
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::UnknownDevice("leaf9".to_string());
        assert_eq!(err.to_string(), "device 'leaf9' not found in design");

        let err = ProviderError::load("design.json", "No such file");
        assert!(err.to_string().contains("design.json"));
    }
}
