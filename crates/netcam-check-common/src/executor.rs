//! Check executor: diffs expected records against actual records.

use crate::error::{CheckError, RecordSide};
use crate::record::Record;
use crate::result::{CheckResult, CheckStatus, Mismatch, REASON_MISSING, REASON_UNEXPECTED};
use crate::rules::{Disposition, TopicRules};
use crate::topic::{TopicId, TopicPolicy};
use crate::CheckOutcome;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Compares one topic's expected records with the records read from the device.
///
/// Produces exactly one result per expected key, in expected order, followed
/// by one result per device object the design does not mention, in fetch
/// order. Fields listed in the policy's `ignore_fields` are never compared.
///
/// # Errors
///
/// Returns [`CheckError::DuplicateKey`] if either side holds two records
/// with the same key.
pub fn run_checks<R: TopicRules + ?Sized>(
    device: &str,
    rules: &R,
    policy: &TopicPolicy,
    expected: &[Record],
    actual: &[Record],
) -> CheckOutcome<Vec<CheckResult>> {
    let topic = rules.topic();

    let actual_index = index_by_key(topic, actual, RecordSide::Actual)?;
    index_by_key(topic, expected, RecordSide::Expected)?;

    let mut consumed = vec![false; actual.len()];
    let mut results = Vec::with_capacity(expected.len() + actual.len());

    for exp in expected {
        let found = actual_index.get(exp.key.as_str()).copied();
        if let Some(idx) = found {
            consumed[idx] = true;
        }

        match rules.disposition(exp) {
            Disposition::Report(reason) => {
                results.push(
                    CheckResult::new(device, topic, &exp.key, CheckStatus::Info).with_reason(reason),
                );
                continue;
            }
            Disposition::Skip(reason) => {
                results.push(
                    CheckResult::new(device, topic, &exp.key, CheckStatus::Skip).with_reason(reason),
                );
                continue;
            }
            Disposition::Compare => {}
        }

        let Some(act) = found.map(|idx| &actual[idx]) else {
            results.push(
                CheckResult::new(device, topic, &exp.key, policy.failure_status)
                    .with_reason(REASON_MISSING),
            );
            continue;
        };

        let effective = rules.effective_expected(exp);
        let (mismatches, notes) =
            compare_fields(rules, policy, effective.as_ref().unwrap_or(exp), act);
        let result = if mismatches.is_empty() {
            CheckResult::new(device, topic, &exp.key, CheckStatus::Pass)
        } else {
            debug!(
                device = %device,
                topic = %topic,
                key = %exp.key,
                mismatches = mismatches.len(),
                "Field mismatch"
            );
            CheckResult::new(device, topic, &exp.key, policy.failure_status)
                .with_mismatches(mismatches)
        };
        results.push(result.with_notes(notes));
    }

    let extra_status = policy.extra_objects.status();
    for (act, _) in actual.iter().zip(&consumed).filter(|(_, used)| !**used) {
        results.push(
            CheckResult::new(device, topic, &act.key, extra_status).with_reason(REASON_UNEXPECTED),
        );
    }

    Ok(results)
}

fn index_by_key<'a>(
    topic: TopicId,
    records: &'a [Record],
    side: RecordSide,
) -> CheckOutcome<HashMap<&'a str, usize>> {
    let mut index = HashMap::with_capacity(records.len());
    for (idx, rec) in records.iter().enumerate() {
        if index.insert(rec.key.as_str(), idx).is_some() {
            return Err(CheckError::duplicate_key(topic, &rec.key, side));
        }
    }
    Ok(index)
}

fn compare_fields<R: TopicRules + ?Sized>(
    rules: &R,
    policy: &TopicPolicy,
    expected: &Record,
    actual: &Record,
) -> (Vec<Mismatch>, Vec<String>) {
    let mut mismatches = Vec::new();
    let mut notes = Vec::new();

    for (field, exp_value) in &expected.fields {
        if policy.ignores(field) {
            continue;
        }
        let act_value = actual.get(field).unwrap_or(&Value::Null);
        if rules.compare(field, exp_value, act_value) {
            continue;
        }

        let mismatch = Mismatch::new(field.as_str(), exp_value.clone(), act_value.clone());
        match rules.waive(expected, actual, &mismatch) {
            Some(note) => notes.push(note),
            None => mismatches.push(mismatch),
        }
    }

    (mismatches, notes)
}
