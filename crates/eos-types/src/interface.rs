//! EOS interface names.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Interface classification derived from the name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InterfaceKind {
    Ethernet,
    PortChannel,
    Vlan,
    Loopback,
    Management,
    Other,
}

impl InterfaceKind {
    /// Canonical EOS name prefix, or `None` for unrecognized interfaces.
    pub const fn prefix(&self) -> Option<&'static str> {
        match self {
            InterfaceKind::Ethernet => Some("Ethernet"),
            InterfaceKind::PortChannel => Some("Port-Channel"),
            InterfaceKind::Vlan => Some("Vlan"),
            InterfaceKind::Loopback => Some("Loopback"),
            InterfaceKind::Management => Some("Management"),
            InterfaceKind::Other => None,
        }
    }

    /// Returns true for front-panel and management ports.
    pub const fn is_physical(&self) -> bool {
        matches!(self, InterfaceKind::Ethernet | InterfaceKind::Management)
    }
}

const KINDS: [InterfaceKind; 5] = [
    InterfaceKind::Ethernet,
    InterfaceKind::PortChannel,
    InterfaceKind::Vlan,
    InterfaceKind::Loopback,
    InterfaceKind::Management,
];

/// An interface name in canonical long form.
///
/// Short forms used by LLDP peers and operators (`Et1/1`, `Po10`,
/// `eth3`, `Lo0`) expand to the EOS spelling, so two names that refer to
/// the same interface compare equal.
///
/// # Examples
///
/// ```
/// use eos_types::InterfaceName;
///
/// let short: InterfaceName = "Et49/1".parse().unwrap();
/// let long: InterfaceName = "Ethernet49/1".parse().unwrap();
/// assert_eq!(short, long);
/// assert_eq!(short.as_str(), "Ethernet49/1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterfaceName {
    kind: InterfaceKind,
    name: String,
}

impl InterfaceName {
    pub fn kind(&self) -> InterfaceKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The numeric part after the kind prefix (`49/1` for `Ethernet49/1`).
    pub fn suffix(&self) -> &str {
        match self.kind.prefix() {
            Some(prefix) => &self.name[prefix.len()..],
            None => &self.name,
        }
    }

    /// Front-panel port number for Ethernet interfaces (`49` for `Ethernet49/1`).
    pub fn port_number(&self) -> Option<&str> {
        if self.kind != InterfaceKind::Ethernet {
            return None;
        }
        self.suffix().split('/').next().filter(|p| !p.is_empty())
    }

    /// Returns true unless this is a secondary lane of a broken-out port.
    pub fn is_primary_lane(&self) -> bool {
        match self.suffix().split('/').nth(1) {
            Some(lane) => lane == "1",
            None => true,
        }
    }

    fn sort_key(&self) -> Vec<u64> {
        self.suffix()
            .split(|c: char| !c.is_ascii_digit())
            .filter(|p| !p.is_empty())
            .filter_map(|p| p.parse().ok())
            .collect()
    }
}

impl FromStr for InterfaceName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::InvalidInterfaceName(s.to_string()));
        }

        let split = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (alpha, rest) = s.split_at(split);
        let alpha_lower = alpha.to_ascii_lowercase();

        // "Et", "Eth", "Ethernet" all expand; a single letter is ambiguous.
        let kind = if alpha_lower.len() >= 2 && !rest.is_empty() {
            KINDS.into_iter().find(|kind| {
                kind.prefix()
                    .map(|p| p.to_ascii_lowercase().starts_with(&alpha_lower))
                    .unwrap_or(false)
            })
        } else {
            None
        };

        Ok(match kind.and_then(|k| k.prefix().map(|p| (k, p))) {
            Some((kind, prefix)) => InterfaceName {
                kind,
                name: format!("{}{}", prefix, rest),
            },
            None => InterfaceName {
                kind: InterfaceKind::Other,
                name: s.to_string(),
            },
        })
    }
}

impl TryFrom<String> for InterfaceName {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<InterfaceName> for String {
    fn from(name: InterfaceName) -> String {
        name.name
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Ord for InterfaceName {
    /// Natural order: by kind, then numerically by each port component.
    fn cmp(&self, other: &Self) -> Ordering {
        self.kind
            .cmp(&other.kind)
            .then_with(|| self.sort_key().cmp(&other.sort_key()))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for InterfaceName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares LLDP neighbor hostnames, ignoring case and any domain suffix.
pub fn hostname_matches(expected: &str, actual: &str) -> bool {
    fn short(name: &str) -> &str {
        name.trim().split('.').next().unwrap_or_default()
    }
    let (expected, actual) = (short(expected), short(actual));
    !expected.is_empty() && expected.eq_ignore_ascii_case(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> InterfaceName {
        s.parse().unwrap()
    }

    #[test]
    fn test_short_forms_expand() {
        assert_eq!(name("Et1").as_str(), "Ethernet1");
        assert_eq!(name("eth49/1").as_str(), "Ethernet49/1");
        assert_eq!(name("Po10").as_str(), "Port-Channel10");
        assert_eq!(name("port-channel10").as_str(), "Port-Channel10");
        assert_eq!(name("Lo0").as_str(), "Loopback0");
        assert_eq!(name("Ma1").as_str(), "Management1");
        assert_eq!(name("Vl100").as_str(), "Vlan100");
    }

    #[test]
    fn test_unknown_names_kept() {
        let other = name("Tunnel5");
        assert_eq!(other.kind(), InterfaceKind::Other);
        assert_eq!(other.as_str(), "Tunnel5");

        let cpu = name("Cpu");
        assert_eq!(cpu.kind(), InterfaceKind::Other);
        assert!("  ".parse::<InterfaceName>().is_err());
    }

    #[test]
    fn test_kind_and_port() {
        let et = name("Ethernet49/2");
        assert_eq!(et.kind(), InterfaceKind::Ethernet);
        assert!(et.kind().is_physical());
        assert_eq!(et.port_number(), Some("49"));
        assert!(!et.is_primary_lane());
        assert!(name("Ethernet49/1").is_primary_lane());
        assert!(name("Ethernet7").is_primary_lane());
        assert_eq!(name("Port-Channel1").port_number(), None);
    }

    #[test]
    fn test_natural_ordering() {
        let mut names = vec![
            name("Ethernet10"),
            name("Loopback0"),
            name("Ethernet2"),
            name("Port-Channel1"),
            name("Ethernet1/2"),
        ];
        names.sort();
        let sorted: Vec<&str> = names.iter().map(InterfaceName::as_str).collect();
        assert_eq!(
            sorted,
            vec![
                "Ethernet1/2",
                "Ethernet2",
                "Ethernet10",
                "Port-Channel1",
                "Loopback0"
            ]
        );
    }

    #[test]
    fn test_hostname_matches() {
        assert!(hostname_matches("leaf1", "LEAF1.dc1.example.com"));
        assert!(hostname_matches("spine1.example.com", "spine1"));
        assert!(!hostname_matches("leaf1", "leaf2"));
        assert!(!hostname_matches("", ""));
    }
}
