//! Verification helpers for device reports
//!
//! Assertion helpers returning [`VerifyResult`] so failures name the topic
//! and key that differed.

use netcam_check_common::{CheckResult, CheckStatus, DeviceReport, TopicId};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Topic '{0}' missing from report")]
    TopicMissing(TopicId),

    #[error("No result for {topic}:{key}")]
    ResultMissing { topic: TopicId, key: String },

    #[error("Status mismatch for {target}: expected {expected}, got {actual}")]
    StatusMismatch {
        target: String,
        expected: CheckStatus,
        actual: CheckStatus,
    },

    #[error("Topic '{0}' was expected to be unavailable")]
    NotUnavailable(TopicId),

    #[error("Expected {expected} results for topic '{topic}', found {actual}")]
    ResultCountMismatch {
        topic: TopicId,
        expected: usize,
        actual: usize,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Device report verification helper
pub struct ReportVerifier<'a> {
    report: &'a DeviceReport,
}

impl<'a> ReportVerifier<'a> {
    pub fn new(report: &'a DeviceReport) -> Self {
        Self { report }
    }

    /// Verify the overall device status
    pub fn assert_status(&self, expected: CheckStatus) -> VerifyResult<()> {
        check_status(self.report.device.clone(), expected, self.report.status)
    }

    /// Verify a topic's worst status (an unavailable topic counts as SKIP)
    pub fn assert_topic_status(&self, topic: TopicId, expected: CheckStatus) -> VerifyResult<()> {
        let report = self
            .report
            .topic(topic)
            .ok_or(VerificationError::TopicMissing(topic))?;
        check_status(topic.to_string(), expected, report.status())
    }

    /// Verify the status of the result for one key
    pub fn assert_result(&self, topic: TopicId, key: &str, expected: CheckStatus) -> VerifyResult<&'a CheckResult> {
        let result = self.result(topic, key)?;
        check_status(format!("{}:{}", topic, key), expected, result.status)?;
        Ok(result)
    }

    /// Look up the result for one key
    pub fn result(&self, topic: TopicId, key: &str) -> VerifyResult<&'a CheckResult> {
        let report = self
            .report
            .topic(topic)
            .ok_or(VerificationError::TopicMissing(topic))?;
        report
            .results()
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| VerificationError::ResultMissing {
                topic,
                key: key.to_string(),
            })
    }

    pub fn assert_unavailable(&self, topic: TopicId) -> VerifyResult<()> {
        let report = self
            .report
            .topic(topic)
            .ok_or(VerificationError::TopicMissing(topic))?;
        if report.is_unavailable() {
            Ok(())
        } else {
            Err(VerificationError::NotUnavailable(topic))
        }
    }

    pub fn assert_result_count(&self, topic: TopicId, expected: usize) -> VerifyResult<()> {
        let report = self
            .report
            .topic(topic)
            .ok_or(VerificationError::TopicMissing(topic))?;
        let actual = report.results().len();
        if actual == expected {
            Ok(())
        } else {
            Err(VerificationError::ResultCountMismatch {
                topic,
                expected,
                actual,
            })
        }
    }

    /// Verify every result of every topic passed
    pub fn assert_all_pass(&self) -> VerifyResult<()> {
        for result in self.report.results() {
            check_status(
                format!("{}:{}", result.topic, result.key),
                CheckStatus::Pass,
                result.status,
            )?;
        }
        for topic in &self.report.topics {
            if topic.is_unavailable() {
                return Err(VerificationError::StatusMismatch {
                    target: topic.topic.to_string(),
                    expected: CheckStatus::Pass,
                    actual: CheckStatus::Skip,
                });
            }
        }
        Ok(())
    }
}

fn check_status(target: String, expected: CheckStatus, actual: CheckStatus) -> VerifyResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(VerificationError::StatusMismatch {
            target,
            expected,
            actual,
        })
    }
}
