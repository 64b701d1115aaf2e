//! Device run orchestration.
//!
//! A run connects to one device, fetches every requested topic
//! concurrently together with its design expectations, checks each topic
//! and folds the outcomes into a [`DeviceReport`]. Topic failures become
//! `Unavailable` outcomes; the run itself only fails when it cannot
//! connect or when no topic produced device data.

use crate::config::PluginConfig;
use crate::error::{RunCause, RunError, TopicError};
use crate::fetcher::StateFetcher;
use crate::topics::{TopicHandler, TopicTable};
use chrono::Utc;
use eos_eapi::{Connector, Credentials, Session, Target};
use futures::stream::{FuturesUnordered, StreamExt};
use netcam_check_common::{
    aggregate, run_checks, ActualRecord, CheckError, CheckResult, DesignProvider, DeviceReport,
    ExpectedRecord, ProviderError, TopicId, TopicOutcome, TopicRules,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of one device run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Fetching,
    Checking,
    Aggregated,
    /// Terminal: no report was produced.
    Failed,
}

impl RunState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RunState::Pending => "PENDING",
            RunState::Fetching => "FETCHING",
            RunState::Checking => "CHECKING",
            RunState::Aggregated => "AGGREGATED",
            RunState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one topic's fetch phase produced.
struct Fetched {
    actual: Result<Vec<ActualRecord>, TopicError>,
    expected: Result<Vec<ExpectedRecord>, ProviderError>,
}

/// Closes the session when dropped without an explicit release, so a
/// cancelled run still gives the session back.
struct SessionGuard {
    session: Option<Arc<dyn Session>>,
}

impl SessionGuard {
    fn new(session: Arc<dyn Session>) -> Self {
        Self {
            session: Some(session),
        }
    }

    async fn release(mut self) {
        if let Some(session) = self.session.take() {
            close_session(session).await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(close_session(session));
            }
            Err(_) => warn!(host = %session.host(), "No runtime to close session on"),
        }
    }
}

async fn close_session(session: Arc<dyn Session>) {
    match session.close().await {
        Ok(()) => debug!(host = %session.host(), "Session released"),
        Err(e) => warn!(host = %session.host(), error = %e, "Failed to close session"),
    }
}

/// The EOS validation plugin.
///
/// Holds the pieces a run needs: how to reach devices, where the design
/// comes from, which topic handlers exist and the plugin configuration.
pub struct EosPlugin {
    connector: Arc<dyn Connector>,
    provider: Arc<dyn DesignProvider>,
    table: TopicTable,
    config: PluginConfig,
    credentials: Credentials,
}

impl EosPlugin {
    /// Creates a plugin with every EOS topic handler.
    pub fn new(
        config: PluginConfig,
        credentials: Credentials,
        connector: Arc<dyn Connector>,
        provider: Arc<dyn DesignProvider>,
    ) -> Self {
        Self {
            table: TopicTable::eos(&config),
            connector,
            provider,
            config,
            credentials,
        }
    }

    /// Replaces the topic table.
    pub fn with_table(mut self, table: TopicTable) -> Self {
        self.table = table;
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    fn target(&self, device_id: &str) -> Target {
        let host = self
            .provider
            .device_address(device_id)
            .unwrap_or_else(|| device_id.to_string());
        let mut target = Target::new(host, self.credentials.clone()).with_timeout(self.config.timeout());
        target.verify_tls = self.config.verify_tls;
        target.shell = self.config.shell;
        target
    }

    /// Validates one device against its design.
    ///
    /// An empty `topics` slice runs every topic in the table. The report
    /// lists every requested topic in request order.
    ///
    /// # Errors
    ///
    /// Returns [`RunError`] if the device cannot be reached, if no topic
    /// produced device data, or if the run deadline passes while
    /// `fail_on_timeout` is set.
    #[instrument(skip_all, fields(device = %device_id))]
    pub async fn run(&self, device_id: &str, topics: &[TopicId]) -> Result<DeviceReport, RunError> {
        let deadline = deadline_after(self.config.run_timeout());
        let topics: Vec<TopicId> = if topics.is_empty() {
            self.table.topics().collect()
        } else {
            dedup(topics)
        };
        let mut state = RunState::Pending;
        info!(state = %state, topics = topics.len(), "Starting device run");

        let target = self.target(device_id);
        let session = match timeout_at(deadline, self.connector.connect(&target)).await {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                transition(&mut state, RunState::Failed);
                warn!(host = %target.host, error = %e, "Connect failed");
                return Err(RunError::new(device_id, RunCause::Connect(e)));
            }
            Err(_) => {
                transition(&mut state, RunState::Failed);
                return Err(RunError::new(device_id, RunCause::TimedOut));
            }
        };
        let guard = SessionGuard::new(Arc::clone(&session));

        let result = self.run_session(device_id, &topics, session, deadline, &mut state).await;
        guard.release().await;

        if result.is_err() {
            transition(&mut state, RunState::Failed);
        }
        result
    }

    async fn run_session(
        &self,
        device_id: &str,
        topics: &[TopicId],
        session: Arc<dyn Session>,
        deadline: Instant,
        state: &mut RunState,
    ) -> Result<DeviceReport, RunError> {
        transition(state, RunState::Fetching);
        let fetcher = StateFetcher::new(session);
        let handlers: Vec<(TopicId, Option<Arc<dyn TopicHandler>>)> =
            topics.iter().map(|&t| (t, self.table.get(t))).collect();

        let mut pending: FuturesUnordered<_> = handlers
            .iter()
            .filter_map(|(topic, handler)| handler.as_ref().map(|h| (*topic, h)))
            .map(|(topic, handler)| {
                let fetcher = &fetcher;
                async move {
                    let (actual, expected) = futures::join!(
                        fetcher.fetch_topic(handler.as_ref()),
                        self.provider.get_expected(device_id, topic)
                    );
                    (topic, Fetched { actual, expected })
                }
            })
            .collect();

        let mut fetched: HashMap<TopicId, Fetched> = HashMap::with_capacity(topics.len());
        let mut timed_out = false;
        loop {
            match timeout_at(deadline, pending.next()).await {
                Ok(Some((topic, outcome))) => {
                    fetched.insert(topic, outcome);
                }
                Ok(None) => break,
                Err(_) => {
                    timed_out = true;
                    break;
                }
            }
        }
        drop(pending);

        if timed_out {
            warn!(
                finished = fetched.len(),
                requested = topics.len(),
                "Run deadline passed, outstanding fetches cancelled"
            );
            if self.config.fail_on_timeout {
                return Err(RunError::new(device_id, RunCause::TimedOut));
            }
        }

        if !fetched.values().any(|f| f.actual.is_ok()) {
            return Err(RunError::new(device_id, RunCause::NoTopicAvailable));
        }

        transition(state, RunState::Checking);
        let outcomes: Vec<(TopicId, TopicOutcome)> = handlers
            .iter()
            .map(|(topic, handler)| {
                let outcome = match handler {
                    None => unavailable(*topic, TopicError::NotSupported(*topic)),
                    Some(handler) => match fetched.remove(topic) {
                        None => unavailable(*topic, TopicError::TimedOut),
                        Some(f) => self.check_topic(device_id, handler.as_ref(), f),
                    },
                };
                (*topic, outcome)
            })
            .collect();

        let report = aggregate(device_id, outcomes).with_timestamp(Utc::now());
        transition(state, RunState::Aggregated);
        info!(status = %report.status, "Device run complete");
        Ok(report)
    }

    fn check_topic(&self, device_id: &str, handler: &dyn TopicHandler, fetched: Fetched) -> TopicOutcome {
        let topic = handler.topic();
        let actual = match fetched.actual {
            Ok(records) => records,
            Err(e) => return unavailable(topic, e),
        };
        let expected = match fetched.expected {
            Ok(records) => records,
            Err(e) => return unavailable(topic, TopicError::Design(e)),
        };

        let policy = self.config.policy(topic);
        match run_checks(device_id, handler, &policy, &expected, &actual) {
            Ok(results) => TopicOutcome::Checked { results },
            Err(CheckError::DuplicateKey { key, side, .. }) => {
                warn!(topic = %topic, key = %key, side = %side, "Duplicate key, topic failed");
                TopicOutcome::Checked {
                    results: vec![CheckResult::duplicate_key(device_id, topic, key)],
                }
            }
            Err(e) => TopicOutcome::unavailable(e.to_string()),
        }
    }
}

fn transition(state: &mut RunState, next: RunState) {
    debug!(from = %state, to = %next, "Run state");
    *state = next;
}

fn unavailable(topic: TopicId, err: TopicError) -> TopicOutcome {
    warn!(topic = %topic, error = %err, "Topic unavailable");
    TopicOutcome::unavailable(err.to_string())
}

/// Deadline `timeout` from now, clamped to a far-future instant on overflow.
fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .unwrap_or_else(|| now + Duration::from_secs(30 * 365 * 86_400))
}

fn dedup(topics: &[TopicId]) -> Vec<TopicId> {
    let mut out = Vec::with_capacity(topics.len());
    for topic in topics {
        if !out.contains(topic) {
            out.push(*topic);
        }
    }
    out
}
