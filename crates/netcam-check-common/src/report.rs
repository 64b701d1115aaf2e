//! Per-device result aggregation.

use crate::result::{worst, CheckResult, CheckStatus};
use crate::topic::TopicId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a topic produced during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TopicOutcome {
    Checked { results: Vec<CheckResult> },
    /// The topic's state could not be fetched or its design was unreadable.
    Unavailable { reason: String },
}

impl TopicOutcome {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        TopicOutcome::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Results for a single topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicReport {
    pub topic: TopicId,
    #[serde(flatten)]
    pub outcome: TopicOutcome,
}

impl TopicReport {
    /// Worst member status. An unavailable topic counts as SKIP.
    pub fn status(&self) -> CheckStatus {
        match &self.outcome {
            TopicOutcome::Checked { results } => worst(results.iter().map(|r| r.status)),
            TopicOutcome::Unavailable { .. } => CheckStatus::Skip,
        }
    }

    pub fn results(&self) -> &[CheckResult] {
        match &self.outcome {
            TopicOutcome::Checked { results } => results,
            TopicOutcome::Unavailable { .. } => &[],
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self.outcome, TopicOutcome::Unavailable { .. })
    }
}

/// Per-topic counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub pass_count: usize,
    pub fail_count: usize,
    pub info_count: usize,
    pub skip_count: usize,
    pub unavailable: bool,
}

/// Every check result for one device, grouped by topic in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceReport {
    pub device: String,
    pub status: CheckStatus,
    pub topics: Vec<TopicReport>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
}

/// Folds topic outcomes into a device report.
///
/// Topic order is preserved. The overall status is the worst topic status.
pub fn aggregate(
    device: impl Into<String>,
    outcomes: impl IntoIterator<Item = (TopicId, TopicOutcome)>,
) -> DeviceReport {
    let topics: Vec<TopicReport> = outcomes
        .into_iter()
        .map(|(topic, outcome)| TopicReport { topic, outcome })
        .collect();
    let status = worst(topics.iter().map(TopicReport::status));

    DeviceReport {
        device: device.into(),
        status,
        topics,
        generated_at: None,
    }
}

impl DeviceReport {
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.generated_at = Some(at);
        self
    }

    pub fn topic(&self, topic: TopicId) -> Option<&TopicReport> {
        self.topics.iter().find(|t| t.topic == topic)
    }

    /// All check results, in report order.
    pub fn results(&self) -> impl Iterator<Item = &CheckResult> {
        self.topics.iter().flat_map(TopicReport::results)
    }

    pub fn is_fail(&self) -> bool {
        self.status == CheckStatus::Fail
    }

    pub fn to_summary(&self) -> BTreeMap<TopicId, TopicSummary> {
        self.topics
            .iter()
            .map(|report| {
                let mut summary = TopicSummary {
                    unavailable: report.is_unavailable(),
                    ..TopicSummary::default()
                };
                for result in report.results() {
                    match result.status {
                        CheckStatus::Pass => summary.pass_count += 1,
                        CheckStatus::Fail => summary.fail_count += 1,
                        CheckStatus::Info => summary.info_count += 1,
                        CheckStatus::Skip => summary.skip_count += 1,
                    }
                }
                (report.topic, summary)
            })
            .collect()
    }
}
