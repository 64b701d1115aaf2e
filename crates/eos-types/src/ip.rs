//! Interface IP addresses in `address/prefix` form.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// An address assigned to an interface together with its prefix length.
///
/// Unlike a network prefix, the host bits are significant: `10.0.0.1/31`
/// and `10.0.0.0/31` are different interface addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpInterface {
    address: IpAddr,
    prefix_len: u8,
}

impl IpInterface {
    /// Creates a new interface address.
    ///
    /// # Errors
    ///
    /// Returns an error if the prefix length is invalid for the address type
    /// (>32 for IPv4, >128 for IPv6).
    pub fn new(address: IpAddr, prefix_len: u8) -> Result<Self, ParseError> {
        let max_len = if address.is_ipv4() { 32 } else { 128 };
        if prefix_len > max_len {
            return Err(ParseError::InvalidIpInterface(format!(
                "prefix length {} exceeds maximum {} for address type",
                prefix_len, max_len
            )));
        }
        Ok(IpInterface {
            address,
            prefix_len,
        })
    }

    pub const fn address(&self) -> IpAddr {
        self.address
    }

    pub const fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// EOS reports `0.0.0.0/0` for interfaces without an address.
    pub fn is_unassigned(&self) -> bool {
        self.address.is_unspecified() && self.prefix_len == 0
    }
}

impl fmt::Display for IpInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

impl FromStr for IpInterface {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidIpInterface(s.to_string());
        let (addr, len) = s.trim().split_once('/').ok_or_else(invalid)?;
        let address: IpAddr = addr.parse().map_err(|_| invalid())?;
        let prefix_len: u8 = len.parse().map_err(|_| invalid())?;
        IpInterface::new(address, prefix_len)
    }
}

impl TryFrom<String> for IpInterface {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<IpInterface> for String {
    fn from(ip: IpInterface) -> String {
        ip.to_string()
    }
}
