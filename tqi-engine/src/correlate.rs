//! Test-case ID extraction and per-ID failure rollups.
//!
//! Tag strings carry management-tool case IDs of the form `C12345` (one
//! letter, four or five digits). IDs are matched as whole tokens, so
//! `REGRESSION2024` and `C123456` are not IDs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use tqi_common::{TestCaseCorrelation, TestCaseId, TestOutcome};

use crate::classify::classify_failure;
use crate::normalize::{normalize_reason, reason_or_unknown};

static CASE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][0-9]{4,5}$").expect("valid literal regex"));

/// Pull every case ID token out of a tag string, first-seen order, deduped.
pub fn extract_case_ids(tags: &str) -> Vec<TestCaseId> {
    let mut ids: Vec<TestCaseId> = Vec::new();
    for token in tags.split(|c: char| !c.is_ascii_alphanumeric()) {
        if !token.is_empty()
            && CASE_ID_RE.is_match(token)
            && !ids.iter().any(|id| id.as_str() == token)
        {
            ids.push(TestCaseId::new(token));
        }
    }
    ids
}

/// Roll failing outcomes up per referenced case ID.
///
/// Sorted by failure count descending, then ID ascending.
pub fn correlate_case_ids(outcomes: &[TestOutcome]) -> Vec<TestCaseCorrelation> {
    let mut by_id: BTreeMap<TestCaseId, Vec<&TestOutcome>> = BTreeMap::new();
    for outcome in outcomes.iter().filter(|o| !o.is_passing()) {
        for id in extract_case_ids(&outcome.tags) {
            by_id.entry(id).or_default().push(outcome);
        }
    }

    let mut correlations: Vec<TestCaseCorrelation> = by_id
        .into_iter()
        .map(|(id, failures)| {
            let primary_reason = primary_reason(&failures);
            let category = classify_failure(&primary_reason, "");
            let mut affected_suites: Vec<String> =
                failures.iter().map(|o| o.suite.clone()).collect();
            affected_suites.sort_unstable();
            affected_suites.dedup();
            TestCaseCorrelation {
                id,
                failures: failures.len(),
                affected_suites,
                primary_reason,
                category,
            }
        })
        .collect();
    // BTreeMap gave ID-ascending order; the stable sort keeps it for ties.
    correlations.sort_by(|a, b| b.failures.cmp(&a.failures));
    correlations
}

/// Most frequent normalized reason, earliest occurrence winning ties.
fn primary_reason(failures: &[&TestOutcome]) -> String {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for outcome in failures {
        let reason = normalize_reason(reason_or_unknown(&outcome.failure_reason));
        match counts.iter_mut().find(|(r, _)| *r == reason) {
            Some((_, n)) => *n += 1,
            None => counts.push((reason, 1)),
        }
    }

    let mut best: Option<&(String, usize)> = None;
    for entry in &counts {
        if best.is_none_or(|b| entry.1 > b.1) {
            best = Some(entry);
        }
    }
    best.map(|(reason, _)| reason.clone()).unwrap_or_default()
}
