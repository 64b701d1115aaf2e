//! Port speed with unit normalization.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Port speed, stored in Mbps.
///
/// Designs write speeds as `"10G"` or `"100M"`; EOS reports interface
/// bandwidth in bits per second. Both normalize to the same value.
///
/// # Examples
///
/// ```
/// use eos_types::Speed;
///
/// let design: Speed = "10G".parse().unwrap();
/// assert_eq!(design, Speed::from_bits(10_000_000_000));
/// assert_eq!(design.to_string(), "10G");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Speed(u64);

impl Speed {
    pub const fn from_mbps(mbps: u64) -> Self {
        Speed(mbps)
    }

    pub const fn from_bits(bits: u64) -> Self {
        Speed(bits / 1_000_000)
    }

    pub const fn as_mbps(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 0 && self.0 % 1000 == 0 {
            write!(f, "{}G", self.0 / 1000)
        } else {
            write!(f, "{}M", self.0)
        }
    }
}

impl FromStr for Speed {
    type Err = ParseError;

    /// Accepts `10G`, `10g`, `10Gbps`, `100M`, `2.5G` and bare Mbps integers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidSpeed(s.to_string());
        let lower = s.trim().to_ascii_lowercase();
        let lower = lower.strip_suffix("bps").unwrap_or(&lower);

        let (number, multiplier) = if let Some(n) = lower.strip_suffix('g') {
            (n, 1000.0)
        } else if let Some(n) = lower.strip_suffix('m') {
            (n, 1.0)
        } else {
            (lower, 1.0)
        };

        let value: f64 = number.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid());
        }

        Ok(Speed((value * multiplier).round() as u64))
    }
}
