//! Check results and status dominance.

use crate::topic::TopicId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Reason attached to an expected object absent from the device.
pub const REASON_MISSING: &str = "missing on device";

/// Reason attached to a device object absent from the design.
pub const REASON_UNEXPECTED: &str = "unexpected object present";

/// Outcome of one check.
///
/// Variants are declared in dominance order, so `Ord` ranks severity:
/// `Pass < Skip < Info < Fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    #[serde(alias = "pass")]
    Pass,
    #[serde(alias = "skip")]
    Skip,
    #[serde(alias = "info")]
    Info,
    #[serde(alias = "fail")]
    Fail,
}

impl CheckStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Skip => "SKIP",
            CheckStatus::Info => "INFO",
            CheckStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the most severe status, or `Pass` for an empty set.
pub fn worst(statuses: impl IntoIterator<Item = CheckStatus>) -> CheckStatus {
    statuses.into_iter().max().unwrap_or(CheckStatus::Pass)
}

/// One field that differs between design and device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub field: String,
    pub expected: Value,
    pub actual: Value,
}

impl Mismatch {
    pub fn new(field: impl Into<String>, expected: impl Into<Value>, actual: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, actual {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Outcome of comparing one keyed object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub device: String,
    pub topic: TopicId,
    pub key: String,
    pub status: CheckStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<Mismatch>,

    /// Observations that do not affect status (waived mismatches, warnings).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl CheckResult {
    pub fn new(
        device: impl Into<String>,
        topic: TopicId,
        key: impl Into<String>,
        status: CheckStatus,
    ) -> Self {
        Self {
            device: device.into(),
            topic,
            key: key.into(),
            status,
            reason: None,
            mismatches: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_mismatches(mut self, mismatches: Vec<Mismatch>) -> Self {
        self.mismatches = mismatches;
        self
    }

    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Synthetic FAIL standing in for a topic whose records collided on a key.
    pub fn duplicate_key(device: impl Into<String>, topic: TopicId, key: impl Into<String>) -> Self {
        let key = key.into();
        let reason = format!("duplicate key '{}' in {} data", key, topic);
        Self::new(device, topic, key, CheckStatus::Fail).with_reason(reason)
    }
}
