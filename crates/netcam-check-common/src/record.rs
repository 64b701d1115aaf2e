//! Keyed state records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Field name to value map. Insertion order is preserved.
pub type Fields = serde_json::Map<String, Value>;

/// One object of device state, identified by a natural key.
///
/// The same shape carries both design expectations and live device state.
/// Flags are design annotations (`reserved`, `forced_unused`) that steer how
/// a topic treats the record; they are never compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Record {
    pub key: String,

    #[serde(default)]
    pub fields: Fields,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub flags: BTreeSet<String>,
}

/// A design-time expectation.
pub type ExpectedRecord = Record;

/// A record built from live device state.
pub type ActualRecord = Record;

impl Record {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            fields: Fields::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Sets a field, returning the record (builder style).
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.fields.get(field).and_then(Value::as_bool)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }
}

/// Builds a [`Record`] from a key and field/value pairs.
///
/// ```
/// use netcam_check_common::record;
///
/// let rec = record!("Ethernet1", "speed" => "10G", "enabled" => true);
/// assert_eq!(rec.get_str("speed"), Some("10G"));
/// ```
#[macro_export]
macro_rules! record {
    ($key:expr $(, $field:expr => $value:expr)* $(,)?) => {
        $crate::Record::new($key)$(.with_field($field, $value))*
    };
}
