//! Error types for the EOS plugin.

use eos_eapi::TransportError;
use netcam_check_common::{ProviderError, TopicId};
use std::io;
use thiserror::Error;

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

/// Errors raised while loading or validating plugin configuration.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl PluginError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Why one topic produced no results.
#[derive(Debug, Error)]
pub enum TopicError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Device output did not have the expected shape.
    #[error("cannot parse {topic} data: {message}")]
    Parse { topic: TopicId, message: String },

    #[error("fetch cancelled by run timeout")]
    TimedOut,

    /// No handler is registered for this topic.
    #[error("topic {0} is not supported")]
    NotSupported(TopicId),

    #[error("design unavailable: {0}")]
    Design(#[from] ProviderError),
}

impl TopicError {
    pub fn parse(topic: TopicId, message: impl Into<String>) -> Self {
        Self::Parse {
            topic,
            message: message.into(),
        }
    }
}

/// Cause of a failed device run.
#[derive(Debug, Error)]
pub enum RunCause {
    #[error("connection failed: {0}")]
    Connect(#[source] TransportError),

    #[error("no requested topic could be fetched")]
    NoTopicAvailable,

    #[error("run timed out")]
    TimedOut,
}

/// Fatal outcome of a device run.
#[derive(Debug, Error)]
#[error("run for device '{device_id}' failed: {cause}")]
pub struct RunError {
    pub device_id: String,
    #[source]
    pub cause: RunCause,
}

impl RunError {
    pub fn new(device_id: impl Into<String>, cause: RunCause) -> Self {
        Self {
            device_id: device_id.into(),
            cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_display() {
        let err = PluginError::MissingEnv("NETWORK_USERNAME".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: NETWORK_USERNAME"
        );
    }

    #[test]
    fn test_run_error_display() {
        let err = RunError::new(
            "leaf1",
            RunCause::Connect(TransportError::auth("leaf1")),
        );
        assert_eq!(
            err.to_string(),
            "run for device 'leaf1' failed: connection failed: Authentication failed for leaf1"
        );
    }

    #[test]
    fn test_topic_error_display() {
        let err = TopicError::parse(TopicId::Lags, "missing portChannels");
        assert_eq!(err.to_string(), "cannot parse lags data: missing portChannels");

        let err: TopicError = TransportError::auth("leaf1").into();
        assert_eq!(err.to_string(), "Authentication failed for leaf1");
    }
}
