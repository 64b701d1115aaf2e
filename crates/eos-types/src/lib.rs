//! Common EOS types for device-state validation.
//!
//! This crate provides type-safe representations of the network primitives
//! that appear in Arista EOS command output and in design expectations:
//!
//! - [`VlanId`] and [`VlanList`]: IEEE 802.1Q identifiers and EOS range strings
//! - [`Speed`]: port speeds in Mbps, parsed from "10G"-style strings
//! - [`InterfaceName`]: EOS interface names with short-form expansion
//! - [`IpInterface`]: an interface address with its prefix length
//! - [`hostname_matches`]: LLDP neighbor hostname comparison

mod interface;
mod ip;
mod speed;
mod vlan;

pub use interface::{hostname_matches, InterfaceKind, InterfaceName};
pub use ip::IpInterface;
pub use speed::Speed;
pub use vlan::{VlanId, VlanList};

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IP interface address: {0}")]
    InvalidIpInterface(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid VLAN list: {0}")]
    InvalidVlanList(String),

    #[error("invalid port speed: {0}")]
    InvalidSpeed(String),

    #[error("invalid interface name: {0}")]
    InvalidInterfaceName(String),
}
