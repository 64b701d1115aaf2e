//! Arista EOS design validation plugin.
//!
//! Validates a switch's live state against its design: each topic's show
//! commands are fetched over eAPI (or the SSH shell for commands eAPI
//! cannot render), normalized into records and reconciled against the
//! records a [`DesignProvider`](netcam_check_common::DesignProvider)
//! expects.
//!
//! # Topics
//!
//! | Topic | Commands | Key |
//! |-------|----------|-----|
//! | device | `show version` | `system` |
//! | interfaces | `show interfaces status`, `show vlan brief`, `show ip interface brief` | interface |
//! | transceivers | `show inventory`, `show interfaces hardware` | interface |
//! | lags | `show lacp interface` | port-channel |
//! | cabling | `show lldp neighbors` | local port |
//! | ipaddrs | `show ip interface brief` | interface |
//! | vlans | `show vlan`, `show vlan configured-ports` | VLAN id |
//! | switchports | `show interfaces switchport` | interface |
//!
//! # Example
//!
//! ```ignore
//! use netcam_aioeos::{DesignFile, EosPlugin, PluginConfig};
//!
//! let config = PluginConfig::load_or_default("netcam.toml")?;
//! let design = Arc::new(DesignFile::load("design.json")?);
//! let connector = Arc::new(EapiConnector::new(config.retry_policy()));
//! let plugin = EosPlugin::new(config.clone(), config.credentials()?, connector, design);
//! let report = plugin.run("leaf1", &[]).await?;
//! ```

pub mod config;
pub mod design;
pub mod error;
pub mod fetcher;
pub mod runner;
pub mod topics;

pub use config::PluginConfig;
pub use design::{DesignDevice, DesignFile};
pub use error::{PluginError, Result, RunCause, RunError, TopicError};
pub use fetcher::StateFetcher;
pub use runner::{EosPlugin, RunState};
pub use topics::{TopicHandler, TopicTable};
