//! Scriptable mock transport
//!
//! A [`MockConnector`] holds one [`MockDevice`] script per host. Sessions it
//! opens answer commands from the script and record every batch they
//! execute, so tests can assert on traffic and on session release.

use async_trait::async_trait;
use eos_eapi::{Channel, Command, Connector, RawResponse, Session, Target, TransportError, TransportResult};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Scripted behavior of one device.
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    host: String,
    responses: HashMap<String, RawResponse>,
    unsupported_rpc: HashSet<String>,
    failures: HashMap<String, TransportError>,
    delays: HashMap<String, Duration>,
    connect_error: Option<TransportError>,
    no_shell: bool,
}

impl MockDevice {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Answer `cmd` with a JSON body.
    pub fn respond(mut self, cmd: impl Into<String>, body: Value) -> Self {
        self.responses.insert(cmd.into(), RawResponse::Json(body));
        self
    }

    pub fn respond_text(mut self, cmd: impl Into<String>, text: impl Into<String>) -> Self {
        self.responses.insert(cmd.into(), RawResponse::Text(text.into()));
        self
    }

    /// eAPI rejects `cmd` as not convertible to JSON; the shell still answers it.
    pub fn unsupported_on_rpc(mut self, cmd: impl Into<String>) -> Self {
        self.unsupported_rpc.insert(cmd.into());
        self
    }

    /// Any batch containing `cmd` fails with `error`.
    pub fn fail(mut self, cmd: impl Into<String>, error: TransportError) -> Self {
        self.failures.insert(cmd.into(), error);
        self
    }

    /// Any batch containing `cmd` takes at least `delay`.
    pub fn delay(mut self, cmd: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(cmd.into(), delay);
        self
    }

    pub fn refuse_connect(mut self, error: TransportError) -> Self {
        self.connect_error = Some(error);
        self
    }

    pub fn without_shell(mut self) -> Self {
        self.no_shell = true;
        self
    }

    fn answer(&self, channel: Channel, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        commands
            .iter()
            .map(|cmd| {
                if let Some(err) = self.failures.get(&cmd.cmd) {
                    return Err(err.clone());
                }
                if channel == Channel::Rpc && self.unsupported_rpc.contains(&cmd.cmd) {
                    return Err(TransportError::unsupported(cmd.cmd.as_str(), channel));
                }
                self.responses
                    .get(&cmd.cmd)
                    .cloned()
                    .ok_or_else(|| TransportError::Command {
                        command: cmd.cmd.clone(),
                        code: 1002,
                        message: "invalid command".to_string(),
                    })
            })
            .collect()
    }
}

/// Traffic and lifecycle observed for one host.
#[derive(Debug, Default)]
struct DeviceLog {
    executed: Mutex<Vec<(Channel, Vec<String>)>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
}

/// Connector whose sessions are driven by [`MockDevice`] scripts.
#[derive(Debug, Default)]
pub struct MockConnector {
    devices: HashMap<String, Arc<MockDevice>>,
    logs: HashMap<String, Arc<DeviceLog>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, device: MockDevice) -> Self {
        let host = device.host.clone();
        self.logs.insert(host.clone(), Arc::new(DeviceLog::default()));
        self.devices.insert(host, Arc::new(device));
        self
    }

    /// Every batch executed against `host`, with its channel.
    pub fn executed(&self, host: &str) -> Vec<(Channel, Vec<String>)> {
        self.logs
            .get(host)
            .map(|log| log.executed.lock().clone())
            .unwrap_or_default()
    }

    /// Number of times `cmd` was sent to `host` over `channel`.
    pub fn command_count(&self, host: &str, channel: Channel, cmd: &str) -> usize {
        self.executed(host)
            .iter()
            .filter(|(ch, _)| *ch == channel)
            .flat_map(|(_, cmds)| cmds)
            .filter(|c| *c == cmd)
            .count()
    }

    pub fn connect_count(&self, host: &str) -> usize {
        self.logs
            .get(host)
            .map(|log| log.connects.load(Ordering::Acquire))
            .unwrap_or(0)
    }

    /// Returns true if every session opened to `host` has been closed.
    pub fn all_closed(&self, host: &str) -> bool {
        self.logs
            .get(host)
            .map(|log| log.connects.load(Ordering::Acquire) == log.closes.load(Ordering::Acquire))
            .unwrap_or(true)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, target: &Target) -> TransportResult<Arc<dyn Session>> {
        let (Some(device), Some(log)) = (self.devices.get(&target.host), self.logs.get(&target.host))
        else {
            return Err(TransportError::connection(&target.host, "no route to host"));
        };
        if let Some(err) = &device.connect_error {
            return Err(err.clone());
        }

        log.connects.fetch_add(1, Ordering::AcqRel);
        debug!(host = %target.host, "Mock session opened");
        Ok(Arc::new(MockSession {
            device: Arc::clone(device),
            log: Arc::clone(log),
            closed: AtomicBool::new(false),
        }))
    }
}

struct MockSession {
    device: Arc<MockDevice>,
    log: Arc<DeviceLog>,
    closed: AtomicBool,
}

#[async_trait]
impl Session for MockSession {
    fn host(&self) -> &str {
        &self.device.host
    }

    fn has_channel(&self, channel: Channel) -> bool {
        channel == Channel::Rpc || !self.device.no_shell
    }

    async fn execute(&self, channel: Channel, commands: &[Command]) -> TransportResult<Vec<RawResponse>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed {
                host: self.device.host.clone(),
            });
        }
        if !self.has_channel(channel) {
            return Err(TransportError::ChannelUnavailable {
                host: self.device.host.clone(),
                channel,
            });
        }

        self.log
            .executed
            .lock()
            .push((channel, commands.iter().map(|c| c.cmd.clone()).collect()));

        let delay = commands
            .iter()
            .filter_map(|c| self.device.delays.get(&c.cmd))
            .max()
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.device.answer(channel, commands)
    }

    async fn close(&self) -> TransportResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.log.closes.fetch_add(1, Ordering::AcqRel);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eos_eapi::Credentials;
    use serde_json::json;

    fn target(host: &str) -> Target {
        Target::new(host, Credentials::new("admin", "pw"))
    }

    fn connector() -> MockConnector {
        MockConnector::new().with_device(
            MockDevice::new("leaf1")
                .respond("show version", json!({"modelName": "DCS-7050SX3-48YC12"}))
                .unsupported_on_rpc("show lldp neighbors")
                .respond("show lldp neighbors", json!({"lldpNeighbors": []})),
        )
    }

    #[test]
    fn test_scripted_responses() {
        tokio_test::block_on(async {
            let connector = connector();
            let session = connector.connect(&target("leaf1")).await.unwrap();

            let out = session
                .execute(Channel::Rpc, &[Command::json("show version")])
                .await
                .unwrap();
            assert_eq!(out[0].as_json().unwrap()["modelName"], "DCS-7050SX3-48YC12");

            let err = session
                .execute(Channel::Rpc, &[Command::json("show lldp neighbors")])
                .await
                .unwrap_err();
            assert!(err.is_unsupported());
            assert!(session
                .execute(Channel::Shell, &[Command::json("show lldp neighbors")])
                .await
                .is_ok());

            assert_eq!(connector.command_count("leaf1", Channel::Rpc, "show version"), 1);
            assert!(!connector.all_closed("leaf1"));
            session.close().await.unwrap();
            assert!(connector.all_closed("leaf1"));
        });
    }

    #[test]
    fn test_unknown_host_refused() {
        tokio_test::block_on(async {
            let err = connector().connect(&target("leaf9")).await.err().unwrap();
            assert!(err.is_retryable());
        });
    }
}
