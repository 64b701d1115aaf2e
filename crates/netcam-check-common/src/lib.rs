//! Reconciliation engine shared by netcam device plugins.
//!
//! This crate compares design expectations against live device state:
//!
//! - [`Record`]: one keyed object, either expected (design) or actual (device)
//! - [`TopicRules`]: per-topic equality strategy built from [`FieldRule`]s
//! - [`run_checks`]: the check executor, one [`CheckResult`] per key
//! - [`DeviceReport`]: per-device aggregation with dominance-ordered status
//! - [`DesignProvider`]: source of expected records
//!
//! # Flow
//!
//! 1. A plugin fetches actual records per [`TopicId`]
//! 2. The [`DesignProvider`] supplies expected records for the same topic
//! 3. [`run_checks`] diffs them under the topic's [`TopicPolicy`]
//! 4. [`aggregate`] folds every topic outcome into a [`DeviceReport`]
//!
//! # Example
//!
//! ```
//! use netcam_check_common::{record, run_checks, CheckStatus, TopicId, TopicPolicy, TopicRules};
//!
//! struct Plain;
//! impl TopicRules for Plain {
//!     fn topic(&self) -> TopicId { TopicId::Lags }
//! }
//!
//! let expected = vec![record!("Port-Channel1", "enabled" => true)];
//! let actual = vec![record!("Port-Channel1", "enabled" => true)];
//! let results = run_checks("sw1", &Plain, &TopicPolicy::default(), &expected, &actual).unwrap();
//! assert_eq!(results[0].status, CheckStatus::Pass);
//! ```

mod error;
mod executor;
mod provider;
mod record;
mod report;
mod result;
mod rules;
mod topic;

pub use error::{CheckError, ProviderError, RecordSide};
pub use executor::run_checks;
pub use provider::DesignProvider;
pub use record::{ActualRecord, ExpectedRecord, Fields, Record};
pub use report::{aggregate, DeviceReport, TopicOutcome, TopicReport, TopicSummary};
pub use result::{worst, CheckResult, CheckStatus, Mismatch, REASON_MISSING, REASON_UNEXPECTED};
pub use rules::{Disposition, FieldRule, TopicRules};
pub use topic::{DesignService, ExtraPolicy, TopicId, TopicPolicy};

/// Result type alias for check operations.
pub type CheckOutcome<T> = Result<T, CheckError>;
