//! Test infrastructure for netcam device plugins
//!
//! Provides:
//! - Canned EOS eAPI payloads and a matching design for a small leaf switch
//! - A scriptable mock `Connector`/`Session` pair
//! - An in-memory design provider
//! - Report verification helpers

pub mod fixtures;
mod mock_design;
mod mock_session;
mod verification;

pub use mock_design::InMemoryDesign;
pub use mock_session::{MockConnector, MockDevice};
pub use verification::*;
