//! Design expectation provider interface.

use crate::error::ProviderError;
use crate::record::ExpectedRecord;
use crate::topic::TopicId;
use async_trait::async_trait;

/// Supplies the expected state of a device, derived from a design model.
///
/// Implementations must be deterministic for a given design revision:
/// repeated calls return the same records in the same order.
#[async_trait]
pub trait DesignProvider: Send + Sync {
    async fn get_expected(
        &self,
        device_id: &str,
        topic: TopicId,
    ) -> Result<Vec<ExpectedRecord>, ProviderError>;

    /// Management address for `device_id`, when the design records one.
    fn device_address(&self, _device_id: &str) -> Option<String> {
        None
    }
}
