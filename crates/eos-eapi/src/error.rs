//! Error types for device transport.

use crate::command::Channel;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors raised while talking to a device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The device could not be reached.
    #[error("Failed to connect to {host}: {message}")]
    Connection { host: String, message: String },

    /// The device rejected the credentials.
    #[error("Authentication failed for {host}")]
    Auth { host: String },

    /// No response within the request timeout.
    #[error("Request to {host} timed out after {timeout:?}")]
    Timeout { host: String, timeout: Duration },

    /// The device ran the batch but a command returned an error.
    #[error("Command '{command}' failed (code {code}): {message}")]
    Command {
        command: String,
        code: i64,
        message: String,
    },

    /// The channel cannot render this command in the requested format.
    #[error("Command '{command}' is not supported over {channel}")]
    Unsupported { command: String, channel: Channel },

    /// The response could not be understood.
    #[error("Protocol error from {host}: {message}")]
    Protocol { host: String, message: String },

    /// The session has no such channel configured.
    #[error("{channel} channel not available for {host}")]
    ChannelUnavailable { host: String, channel: Channel },

    /// The local `ssh` client could not be spawned.
    #[error("Failed to execute shell command '{command}': {message}")]
    ShellExec { command: String, message: String },

    /// The remote shell command exited non-zero.
    #[error("Shell command failed: '{command}' (exit code {exit_code}): {output}")]
    ShellCommandFailed {
        command: String,
        exit_code: i32,
        output: String,
    },

    /// The session was already released.
    #[error("Session to {host} is closed")]
    Closed { host: String },
}

impl TransportError {
    pub fn connection(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn auth(host: impl Into<String>) -> Self {
        Self::Auth { host: host.into() }
    }

    pub fn timeout(host: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            host: host.into(),
            timeout,
        }
    }

    pub fn protocol(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Protocol {
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn unsupported(command: impl Into<String>, channel: Channel) -> Self {
        Self::Unsupported {
            command: command.into(),
            channel,
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Connection { .. } | TransportError::Timeout { .. }
        )
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, TransportError::Unsupported { .. })
    }
}
