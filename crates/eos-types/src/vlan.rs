//! VLAN identifiers and EOS VLAN range lists.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// IEEE 802.1Q VLAN identifier (1-4094).
///
/// # Examples
///
/// ```
/// use eos_types::VlanId;
///
/// let vlan: VlanId = "Vlan100".parse().unwrap();
/// assert_eq!(vlan.as_u16(), 100);
/// assert!(VlanId::new(4095).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Minimum valid VLAN ID.
    pub const MIN: u16 = 1;

    /// Maximum valid VLAN ID.
    pub const MAX: u16 = 4094;

    /// Creates a new VLAN ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the VLAN ID is not in the valid range (1-4094).
    pub const fn new(id: u16) -> Result<Self, ParseError> {
        if id >= Self::MIN && id <= Self::MAX {
            Ok(VlanId(id))
        } else {
            Err(ParseError::InvalidVlanId(id))
        }
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns true if this is the default VLAN (VLAN 1).
    pub const fn is_default(&self) -> bool {
        self.0 == 1
    }

    /// Name of the SVI that routes this VLAN ("Vlan100").
    pub fn svi_name(&self) -> String {
        format!("Vlan{}", self.0)
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for VlanId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Handle "Vlan100" format
        let id_str = if s.to_ascii_lowercase().starts_with("vlan") {
            s.get(4..).unwrap_or_default()
        } else {
            s
        };

        let id: u16 = id_str.parse().map_err(|_| ParseError::InvalidVlanId(0))?;

        VlanId::new(id)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = ParseError;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        VlanId::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> u16 {
        vlan.0
    }
}

/// A set of VLANs as EOS reports them on trunk ports.
///
/// EOS prints trunk allowed VLANs either as `ALL` or as a compressed range
/// string such as `14,16,25-26`. `NONE` and the empty string both mean no
/// VLANs are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlanList {
    All,
    Ids(BTreeSet<VlanId>),
}

impl VlanList {
    pub fn empty() -> Self {
        VlanList::Ids(BTreeSet::new())
    }
}

impl FromIterator<VlanId> for VlanList {
    fn from_iter<T: IntoIterator<Item = VlanId>>(iter: T) -> Self {
        VlanList::Ids(iter.into_iter().collect())
    }
}

impl FromStr for VlanList {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(VlanList::All);
        }
        if s.is_empty() || s.eq_ignore_ascii_case("none") {
            return Ok(VlanList::empty());
        }

        let mut ids = BTreeSet::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((lo, hi)) => {
                    let lo: VlanId = lo
                        .parse()
                        .map_err(|_| ParseError::InvalidVlanList(s.to_string()))?;
                    let hi: VlanId = hi
                        .parse()
                        .map_err(|_| ParseError::InvalidVlanList(s.to_string()))?;
                    if lo > hi {
                        return Err(ParseError::InvalidVlanList(s.to_string()));
                    }
                    for id in lo.as_u16()..=hi.as_u16() {
                        ids.insert(VlanId(id));
                    }
                }
                None => {
                    let id: VlanId = part
                        .parse()
                        .map_err(|_| ParseError::InvalidVlanList(s.to_string()))?;
                    ids.insert(id);
                }
            }
        }

        Ok(VlanList::Ids(ids))
    }
}

impl fmt::Display for VlanList {
    /// Formats in the compressed EOS range syntax.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = match self {
            VlanList::All => return f.write_str("ALL"),
            VlanList::Ids(ids) if ids.is_empty() => return f.write_str("NONE"),
            VlanList::Ids(ids) => ids,
        };

        let mut ranges: Vec<(u16, u16)> = Vec::new();
        for id in ids.iter().map(VlanId::as_u16) {
            match ranges.last_mut() {
                Some((_, hi)) if *hi + 1 == id => *hi = id,
                _ => ranges.push((id, id)),
            }
        }

        let parts: Vec<String> = ranges
            .into_iter()
            .map(|(lo, hi)| {
                if lo == hi {
                    lo.to_string()
                } else {
                    format!("{}-{}", lo, hi)
                }
            })
            .collect();
        f.write_str(&parts.join(","))
    }
}
