//! Per-topic equality strategies.

use crate::record::Record;
use crate::result::Mismatch;
use crate::topic::TopicId;
use eos_types::{hostname_matches, InterfaceName, IpInterface, Speed, VlanId, VlanList};
use serde_json::Value;

/// How a single field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Values equal, or scalars with the same text form (`10` == `"10"`).
    Exact,
    CaseInsensitive,
    /// Port speeds after unit normalization (`"10G"` == `10000`).
    Speed,
    /// Lists with the same elements regardless of order.
    UnorderedList,
    /// Every expected list element is present in the actual list.
    Subset,
    /// Lists of interface names, short forms expanded, order ignored.
    InterfaceList,
    /// Expected interface names are a subset of the actual ones.
    InterfaceSubset,
    /// Strings agree over the length of the shorter one, ignoring case.
    Prefix,
    /// VLAN sets, from id lists or EOS range strings.
    VlanList,
    /// Interface addresses compared semantically.
    IpInterface,
    /// A single interface name, short forms expanded.
    Interface,
    /// Hostnames ignoring case and domain.
    Hostname,
}

impl FieldRule {
    /// Returns true if `actual` satisfies `expected` under this rule.
    ///
    /// Rules that cannot interpret a value fall back to [`FieldRule::Exact`].
    pub fn matches(&self, expected: &Value, actual: &Value) -> bool {
        let parsed = match self {
            FieldRule::Exact => None,
            FieldRule::CaseInsensitive => both(expected, actual, text)
                .map(|(e, a)| e.eq_ignore_ascii_case(&a)),
            FieldRule::Speed => both(expected, actual, speed).map(|(e, a)| e == a),
            FieldRule::UnorderedList => both(expected, actual, text_list).map(|(mut e, mut a)| {
                e.sort();
                a.sort();
                e == a
            }),
            FieldRule::Subset => {
                both(expected, actual, text_list).map(|(e, a)| e.iter().all(|x| a.contains(x)))
            }
            FieldRule::InterfaceList => {
                both(expected, actual, interface_list).map(|(mut e, mut a)| {
                    e.sort();
                    a.sort();
                    e == a
                })
            }
            FieldRule::InterfaceSubset => both(expected, actual, interface_list)
                .map(|(e, a)| e.iter().all(|x| a.contains(x))),
            FieldRule::Prefix => both(expected, actual, text).map(|(e, a)| prefix_match(&e, &a)),
            FieldRule::VlanList => both(expected, actual, vlan_list).map(|(e, a)| e == a),
            FieldRule::IpInterface => both(expected, actual, |v| {
                text(v).and_then(|s| s.parse::<IpInterface>().ok())
            })
            .map(|(e, a)| e == a),
            FieldRule::Interface => both(expected, actual, |v| {
                text(v).and_then(|s| s.parse::<InterfaceName>().ok())
            })
            .map(|(e, a)| e == a),
            FieldRule::Hostname => {
                both(expected, actual, text).map(|(e, a)| hostname_matches(&e, &a))
            }
        };

        parsed.unwrap_or_else(|| exact(expected, actual))
    }
}

fn both<T>(expected: &Value, actual: &Value, f: impl Fn(&Value) -> Option<T>) -> Option<(T, T)> {
    Some((f(expected)?, f(actual)?))
}

fn exact(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (scalar_text(expected), scalar_text(actual)) {
        (Some(e), Some(a)) => e == a,
        _ => false,
    }
}

fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}

fn text_list(v: &Value) -> Option<Vec<String>> {
    v.as_array()?.iter().map(scalar_text).collect()
}

fn interface_list(v: &Value) -> Option<Vec<String>> {
    let names = text_list(v)?;
    Some(
        names
            .into_iter()
            .map(|n| n.parse::<InterfaceName>().map(String::from).unwrap_or(n))
            .collect(),
    )
}

fn speed(v: &Value) -> Option<Speed> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_u64().map(Speed::from_mbps),
        _ => None,
    }
}

fn vlan_list(v: &Value) -> Option<VlanList> {
    match v {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => {
            let id = u16::try_from(n.as_u64()?).ok()?;
            VlanId::new(id).ok().map(|id| std::iter::once(id).collect())
        }
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Number(n) => VlanId::new(u16::try_from(n.as_u64()?).ok()?).ok(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
            .collect::<Option<VlanList>>(),
        _ => None,
    }
}

fn prefix_match(expected: &str, actual: &str) -> bool {
    let len = expected.len().min(actual.len());
    len > 0
        && match (expected.get(..len), actual.get(..len)) {
            (Some(e), Some(a)) => e.eq_ignore_ascii_case(a),
            _ => false,
        }
}

/// What the executor does with an expected record before comparing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Compare fields normally.
    Compare,
    /// Report INFO with this reason instead of comparing.
    Report(String),
    /// Report SKIP with this reason instead of comparing.
    Skip(String),
}

/// Topic-specific comparison strategy.
///
/// Each topic supplies its field rules and may override how individual
/// fields compare, which mismatches are tolerated, and which expected
/// records are reported without comparison.
pub trait TopicRules: Send + Sync {
    fn topic(&self) -> TopicId;

    /// Rule for `field`. Unlisted fields compare exactly.
    fn field_rule(&self, _field: &str) -> FieldRule {
        FieldRule::Exact
    }

    /// Compares one field of the expected record with the actual value.
    fn compare(&self, field: &str, expected: &Value, actual: &Value) -> bool {
        self.field_rule(field).matches(expected, actual)
    }

    /// Returns a note if this mismatch should not count against the record.
    fn waive(&self, _expected: &Record, _actual: &Record, _mismatch: &Mismatch) -> Option<String> {
        None
    }

    fn disposition(&self, _expected: &Record) -> Disposition {
        Disposition::Compare
    }

    /// A rewritten expectation to compare in place of `expected`, if the
    /// topic derives some expected values from design flags.
    fn effective_expected(&self, _expected: &Record) -> Option<Record> {
        None
    }
}
