//! JSON design expectation file.
//!
//! ```json
//! {"devices": {"sw1": {"address": "10.0.0.1",
//!   "topics": {"interfaces": [{"key": "Ethernet1", "fields": {"speed": "10G"}}]}}}}
//! ```

use async_trait::async_trait;
use netcam_check_common::{DesignProvider, ExpectedRecord, ProviderError, Record, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Expected state of one device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignDevice {
    /// Management address; the device name is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Expected records by topic name.
    #[serde(default)]
    pub topics: BTreeMap<String, Vec<Record>>,
}

/// A design file: expected records for every device it names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesignFile {
    #[serde(default)]
    pub devices: BTreeMap<String, DesignDevice>,
}

impl DesignFile {
    /// Reads and validates a design file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ProviderError::load(path.display().to_string(), e.to_string()))?;
        let design = Self::from_json(&content)
            .map_err(|e| ProviderError::load(path.display().to_string(), e.to_string()))?;
        info!(path = %path.display(), devices = design.devices.len(), "Loaded design");
        Ok(design)
    }

    pub fn from_json(content: &str) -> Result<Self, ProviderError> {
        let design: Self =
            serde_json::from_str(content).map_err(|e| ProviderError::invalid(e.to_string()))?;
        design.validate()?;
        Ok(design)
    }

    /// Every topic name must be a known topic.
    pub fn validate(&self) -> Result<(), ProviderError> {
        for (name, device) in &self.devices {
            for topic in device.topics.keys() {
                topic
                    .parse::<TopicId>()
                    .map_err(|e| ProviderError::invalid(format!("device '{}': {}", name, e)))?;
            }
        }
        Ok(())
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.devices.keys().map(String::as_str)
    }
}

#[async_trait]
impl DesignProvider for DesignFile {
    async fn get_expected(
        &self,
        device_id: &str,
        topic: TopicId,
    ) -> Result<Vec<ExpectedRecord>, ProviderError> {
        let device = self
            .devices
            .get(device_id)
            .ok_or_else(|| ProviderError::UnknownDevice(device_id.to_string()))?;
        let records = device.topics.get(topic.as_str()).cloned().unwrap_or_default();
        debug!(device = %device_id, topic = %topic, records = records.len(), "Design lookup");
        Ok(records)
    }

    fn device_address(&self, device_id: &str) -> Option<String> {
        self.devices.get(device_id)?.address.clone()
    }
}
