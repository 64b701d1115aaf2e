//! Commands, channels and raw responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Output format requested from the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "text",
        }
    }
}

/// One read-only CLI command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
    pub cmd: String,
    pub format: OutputFormat,
}

impl Command {
    pub fn json(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            format: OutputFormat::Json,
        }
    }

    pub fn text(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            format: OutputFormat::Text,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cmd)
    }
}

/// Path a command travels to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// eAPI JSON-RPC.
    Rpc,
    /// SSH CLI session.
    Shell,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Rpc => f.write_str("eapi"),
            Channel::Shell => f.write_str("ssh"),
        }
    }
}

/// Unparsed output of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Json(Value),
    Text(String),
}

impl RawResponse {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RawResponse::Json(value) => Some(value),
            RawResponse::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RawResponse::Json(_) => None,
            RawResponse::Text(text) => Some(text),
        }
    }
}
