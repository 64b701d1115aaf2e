//! Transport layer for Arista EOS devices.
//!
//! Two channels reach a device:
//!
//! - [`EapiClient`]: JSON-RPC `runCmds` over HTTPS (the eAPI command channel)
//! - [`SshShell`]: the system `ssh` client, for commands eAPI cannot render
//!
//! A [`Connector`] opens a [`Session`] that owns both channels for the
//! duration of one device run. Callers hold the session as
//! `Arc<dyn Session>` so tests can substitute a scripted implementation.
//!
//! # Example
//!
//! ```ignore
//! use eos_eapi::{Channel, Command, Connector, Credentials, EapiConnector, Target};
//!
//! let target = Target::new("leaf1.example.net", Credentials::new("admin", "secret"));
//! let session = EapiConnector::default().connect(&target).await?;
//! let responses = session
//!     .execute(Channel::Rpc, &[Command::json("show version")])
//!     .await?;
//! session.close().await?;
//! ```

mod client;
mod command;
mod error;
mod retry;
mod session;
pub mod shell;

pub use client::EapiClient;
pub use command::{Channel, Command, OutputFormat, RawResponse};
pub use error::{TransportError, TransportResult};
pub use retry::{with_retry, RetryPolicy};
pub use session::{Connector, Credentials, EapiConnector, EosSession, Session, Target};
pub use shell::SshShell;
