//! Device state fetcher.
//!
//! Runs each topic's command batch against the run's session and hands
//! the responses to the topic's normalizer. Responses are cached for the
//! lifetime of the fetcher, so topics that share a command (`show vlan`,
//! `show ip interface brief`) only issue it once when fetched one after
//! the other.

use crate::error::TopicError;
use crate::topics::TopicHandler;
use eos_eapi::{Channel, Command, RawResponse, Session, TransportError, TransportResult};
use futures::future::join_all;
use netcam_check_common::{ActualRecord, TopicId, TopicRules};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Fetches and normalizes device state for one run.
pub struct StateFetcher {
    session: Arc<dyn Session>,
    cache: Mutex<HashMap<Command, RawResponse>>,
}

impl StateFetcher {
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self {
            session,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetches every topic concurrently. One topic failing does not affect
    /// the others; results come back in the order of `handlers`.
    pub async fn fetch(
        &self,
        handlers: &[Arc<dyn TopicHandler>],
    ) -> Vec<(TopicId, Result<Vec<ActualRecord>, TopicError>)> {
        join_all(handlers.iter().map(|handler| async move {
            (handler.topic(), self.fetch_topic(handler.as_ref()).await)
        }))
        .await
    }

    /// Runs one topic's commands and normalizes the responses.
    #[instrument(skip(self, handler), fields(host = %self.session.host(), topic = %handler.topic()))]
    pub async fn fetch_topic(&self, handler: &dyn TopicHandler) -> Result<Vec<ActualRecord>, TopicError> {
        let commands = handler.commands();
        let responses = self.execute(&commands).await?;
        let records = handler.normalize(&responses)?;
        debug!(records = records.len(), "Topic fetched");
        Ok(records)
    }

    /// Executes `commands`, serving cached responses and falling back to
    /// the shell channel when eAPI cannot render a command as JSON.
    async fn execute(&self, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        let missing: Vec<Command> = {
            let cache = self.cache.lock();
            commands
                .iter()
                .filter(|cmd| !cache.contains_key(*cmd))
                .cloned()
                .collect()
        };

        if !missing.is_empty() {
            let responses = self.execute_uncached(&missing).await?;
            let mut cache = self.cache.lock();
            for (cmd, response) in missing.into_iter().zip(responses) {
                cache.insert(cmd, response);
            }
        } else {
            debug!(commands = commands.len(), "Served from cache");
        }

        let cache = self.cache.lock();
        commands
            .iter()
            .map(|cmd| {
                cache.get(cmd).cloned().ok_or_else(|| {
                    TransportError::protocol(self.session.host(), format!("no response for '{}'", cmd))
                })
            })
            .collect()
    }

    async fn execute_uncached(&self, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        match self.session.execute(Channel::Rpc, commands).await {
            Err(err) if err.is_unsupported() && self.session.has_channel(Channel::Shell) => {
                info!(
                    host = %self.session.host(),
                    error = %err,
                    "Command not supported over eAPI, retrying over SSH"
                );
                self.session.execute(Channel::Shell, commands).await
            }
            Err(err) => {
                warn!(host = %self.session.host(), error = %err, "Command batch failed");
                Err(err)
            }
            Ok(responses) => Ok(responses),
        }
    }
}
