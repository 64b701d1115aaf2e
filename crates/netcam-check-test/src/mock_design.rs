//! In-memory design provider

use async_trait::async_trait;
use netcam_check_common::{DesignProvider, ExpectedRecord, ProviderError, TopicId};
use std::collections::{HashMap, HashSet};

/// Design held in memory, keyed by device and topic.
///
/// Devices must be registered with [`InMemoryDesign::with_device`] or a
/// topic; unknown devices fail the way a real design lookup does.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDesign {
    devices: HashMap<String, Option<String>>,
    records: HashMap<(String, TopicId), Vec<ExpectedRecord>>,
    broken: HashSet<(String, TopicId)>,
}

impl InMemoryDesign {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: impl Into<String>, address: Option<&str>) -> Self {
        self.devices.insert(device.into(), address.map(str::to_string));
        self
    }

    pub fn with_topic(
        mut self,
        device: impl Into<String>,
        topic: TopicId,
        records: Vec<ExpectedRecord>,
    ) -> Self {
        let device = device.into();
        self.devices.entry(device.clone()).or_insert(None);
        self.records.insert((device, topic), records);
        self
    }

    /// Every topic in `topics` for `device`.
    pub fn with_topics(
        self,
        device: &str,
        topics: impl IntoIterator<Item = (TopicId, Vec<ExpectedRecord>)>,
    ) -> Self {
        topics
            .into_iter()
            .fold(self, |design, (topic, records)| design.with_topic(device, topic, records))
    }

    /// Lookups of `topic` for `device` fail with an invalid-design error.
    pub fn with_broken_topic(mut self, device: impl Into<String>, topic: TopicId) -> Self {
        self.broken.insert((device.into(), topic));
        self
    }
}

#[async_trait]
impl DesignProvider for InMemoryDesign {
    async fn get_expected(
        &self,
        device_id: &str,
        topic: TopicId,
    ) -> Result<Vec<ExpectedRecord>, ProviderError> {
        if !self.devices.contains_key(device_id) {
            return Err(ProviderError::UnknownDevice(device_id.to_string()));
        }
        let key = (device_id.to_string(), topic);
        if self.broken.contains(&key) {
            return Err(ProviderError::invalid(format!("{} design is corrupt", topic)));
        }
        Ok(self.records.get(&key).cloned().unwrap_or_default())
    }

    fn device_address(&self, device_id: &str) -> Option<String> {
        self.devices.get(device_id).cloned().flatten()
    }
}
