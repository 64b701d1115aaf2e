//! Plugin configuration.
//!
//! Loads and validates the plugin configuration from a TOML file. Every
//! key has a default, so an empty file (or none at all) is a valid
//! configuration. Unknown keys are rejected.

use crate::error::{PluginError, Result};
use eos_eapi::{Credentials, RetryPolicy};
use netcam_check_common::{CheckStatus, TopicId, TopicPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Upper bound for `timeout` and `run_timeout`, in seconds (one day).
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Names of the environment variables holding device credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_env_username")]
    pub username: String,

    #[serde(default = "default_env_password")]
    pub password: String,
}

/// Retry of transient transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

/// VLAN topic options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VlanCheckConfig {
    /// Keep VLAN 1 in device data. Dropped by default since every switch has it.
    #[serde(default)]
    pub check_vlan1: bool,

    /// Member interface lists must match exactly; otherwise the design
    /// list only has to be present.
    #[serde(default = "default_true")]
    pub exclusive_members: bool,
}

/// Transceiver topic options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransceiverConfig {
    /// Device-reported model to design model aliases.
    #[serde(default)]
    pub models: BTreeMap<String, String>,
}

/// Complete plugin configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginConfig {
    #[serde(default)]
    pub env: EnvConfig,

    /// Per-request transport timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Whole-device run deadline in seconds.
    #[serde(default = "default_run_timeout")]
    pub run_timeout: u64,

    /// Escalate a run-level timeout to a failed run instead of marking
    /// unfinished topics unavailable.
    #[serde(default)]
    pub fail_on_timeout: bool,

    #[serde(default)]
    pub verify_tls: bool,

    /// Open the SSH channel for commands eAPI cannot render.
    #[serde(default = "default_true")]
    pub shell: bool,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub vlans: VlanCheckConfig,

    #[serde(default)]
    pub transceivers: TransceiverConfig,

    /// Check policy by topic name.
    #[serde(default)]
    pub topics: BTreeMap<String, TopicPolicy>,
}

// Default functions
fn default_env_username() -> String {
    "NETWORK_USERNAME".to_string()
}

fn default_env_password() -> String {
    "NETWORK_PASSWORD".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_run_timeout() -> u64 {
    300
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

// Default implementations
impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            username: default_env_username(),
            password: default_env_password(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl Default for VlanCheckConfig {
    fn default() -> Self {
        Self {
            check_vlan1: false,
            exclusive_members: default_true(),
        }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            env: EnvConfig::default(),
            timeout: default_timeout(),
            run_timeout: default_run_timeout(),
            fail_on_timeout: false,
            verify_tls: false,
            shell: default_true(),
            retry: RetryConfig::default(),
            vlans: VlanCheckConfig::default(),
            transceivers: TransceiverConfig::default(),
            topics: BTreeMap::new(),
        }
    }
}

impl PluginConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| {
                PluginError::config(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(PluginError::Io(e)),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| PluginError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            Duration::from_millis(self.retry.backoff_ms),
        )
    }

    /// Check policy for `topic`, or the default policy.
    pub fn policy(&self, topic: TopicId) -> TopicPolicy {
        self.topics
            .get(topic.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Reads credentials from the environment variables named in `[env]`.
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup` instead of the process environment.
    pub fn credentials_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Credentials> {
        let username = lookup(&self.env.username)
            .ok_or_else(|| PluginError::MissingEnv(self.env.username.clone()))?;
        let password = lookup(&self.env.password)
            .ok_or_else(|| PluginError::MissingEnv(self.env.password.clone()))?;
        Ok(Credentials::new(username, password))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.timeout == 0 || self.timeout > MAX_TIMEOUT_SECS {
            return Err(PluginError::config(format!(
                "timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if self.run_timeout == 0 || self.run_timeout > MAX_TIMEOUT_SECS {
            return Err(PluginError::config(format!(
                "run_timeout must be between 1 and {} seconds",
                MAX_TIMEOUT_SECS
            )));
        }

        if self.retry.max_attempts == 0 {
            return Err(PluginError::config("retry.max_attempts must be >= 1"));
        }

        if self.env.username.is_empty() || self.env.password.is_empty() {
            return Err(PluginError::config("env variable names must not be empty"));
        }

        for (name, policy) in &self.topics {
            name.parse::<TopicId>()
                .map_err(|e| PluginError::config(format!("[topics.{}]: {}", name, e)))?;
            if policy.failure_status == CheckStatus::Pass {
                return Err(PluginError::config(format!(
                    "[topics.{}]: failure_status must not be PASS",
                    name
                )));
            }
        }

        Ok(())
    }
}
