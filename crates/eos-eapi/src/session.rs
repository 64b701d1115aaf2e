//! Device sessions and the connector that opens them.

use crate::client::EapiClient;
use crate::command::{Channel, Command, RawResponse};
use crate::error::{TransportError, TransportResult};
use crate::retry::{with_retry, RetryPolicy};
use crate::shell::SshShell;
use async_trait::async_trait;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Login credentials. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how to reach one device.
#[derive(Debug, Clone)]
pub struct Target {
    /// Hostname or management address.
    pub host: String,
    pub credentials: Credentials,
    /// Per-request timeout.
    pub timeout: Duration,
    pub port: Option<u16>,
    pub verify_tls: bool,
    /// Open the SSH channel alongside eAPI.
    pub shell: bool,
}

impl Target {
    pub fn new(host: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            host: host.into(),
            credentials,
            timeout: Duration::from_secs(60),
            port: None,
            verify_tls: false,
            shell: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A live connection to one device.
///
/// `execute` preserves request order in its responses. Implementations must
/// tolerate concurrent `execute` calls from several topics of one run.
#[async_trait]
pub trait Session: Send + Sync {
    fn host(&self) -> &str;

    fn has_channel(&self, channel: Channel) -> bool;

    async fn execute(
        &self,
        channel: Channel,
        commands: &[Command],
    ) -> TransportResult<Vec<RawResponse>>;

    /// Releases the session. Closing twice is not an error.
    async fn close(&self) -> TransportResult<()>;
}

/// Opens sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &Target) -> TransportResult<Arc<dyn Session>>;
}

/// Session backed by eAPI, with an optional SSH channel.
#[derive(Debug)]
pub struct EosSession {
    rpc: EapiClient,
    shell: Option<SshShell>,
    retry: RetryPolicy,
    closed: AtomicBool,
}

impl EosSession {
    pub fn new(rpc: EapiClient, shell: Option<SshShell>, retry: RetryPolicy) -> Self {
        Self {
            rpc,
            shell,
            retry,
            closed: AtomicBool::new(false),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl Session for EosSession {
    fn host(&self) -> &str {
        self.rpc.host()
    }

    fn has_channel(&self, channel: Channel) -> bool {
        match channel {
            Channel::Rpc => true,
            Channel::Shell => self.shell.is_some(),
        }
    }

    async fn execute(
        &self,
        channel: Channel,
        commands: &[Command],
    ) -> TransportResult<Vec<RawResponse>> {
        if self.is_closed() {
            return Err(TransportError::Closed {
                host: self.host().to_string(),
            });
        }

        match channel {
            Channel::Rpc => with_retry(&self.retry, "runCmds", || self.rpc.run_cmds(commands)).await,
            Channel::Shell => {
                let shell = self.shell.as_ref().ok_or_else(|| TransportError::ChannelUnavailable {
                    host: self.host().to_string(),
                    channel,
                })?;
                with_retry(&self.retry, "ssh", || shell.run(commands)).await
            }
        }
    }

    async fn close(&self) -> TransportResult<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            debug!(host = %self.host(), "Session closed");
        }
        Ok(())
    }
}

/// Connector for real devices.
///
/// Opening a session probes the device with `show version` so that
/// unreachable hosts and bad credentials fail at connect time.
#[derive(Debug, Clone, Default)]
pub struct EapiConnector {
    retry: RetryPolicy,
}

impl EapiConnector {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }
}

#[async_trait]
impl Connector for EapiConnector {
    #[instrument(skip(self, target), fields(host = %target.host))]
    async fn connect(&self, target: &Target) -> TransportResult<Arc<dyn Session>> {
        let rpc = EapiClient::new(
            &target.host,
            target.port,
            &target.credentials.username,
            target.credentials.password(),
            target.timeout,
            target.verify_tls,
        )?;

        let probe = [Command::json("show version")];
        with_retry(&self.retry, "connect", || rpc.run_cmds(&probe)).await?;

        let shell = target
            .shell
            .then(|| SshShell::new(&target.host, &target.credentials.username, target.timeout));

        info!(host = %target.host, shell = target.shell, "Connected to device");
        Ok(Arc::new(EosSession::new(rpc, shell, self.retry)))
    }
}
