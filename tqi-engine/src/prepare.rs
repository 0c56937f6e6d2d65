//! Batch preparation: duplicate resolution and suite rollups.
//!
//! Retried tests can appear several times in one batch under the same
//! (suite, test, parameter) identity. The latest occurrence wins, and the
//! surviving records keep the first-seen order of their identities so every
//! later stage sees a deterministic sequence.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tqi_common::{RunSummary, SuiteSummary, TestOutcome, TestStatus};

/// Resolve duplicate identities, latest occurrence winning.
///
/// Returns the surviving outcomes (first-seen identity order) and the
/// number of records dropped.
pub fn dedupe_latest(outcomes: &[TestOutcome]) -> (Vec<TestOutcome>, usize) {
    let mut latest_index: HashMap<tqi_common::OutcomeKey, usize> = HashMap::new();
    let mut key_order = Vec::new();

    for (idx, outcome) in outcomes.iter().enumerate() {
        match latest_index.entry(outcome.key()) {
            Entry::Vacant(entry) => {
                key_order.push(outcome.key());
                entry.insert(idx);
            }
            Entry::Occupied(mut entry) => {
                entry.insert(idx);
            }
        }
    }

    let dropped = outcomes.len() - key_order.len();
    let deduped = key_order
        .iter()
        .filter_map(|key| latest_index.get(key).map(|&idx| outcomes[idx].clone()))
        .collect();
    (deduped, dropped)
}

/// Aggregate counts for the whole (already deduplicated) run.
pub fn run_summary(outcomes: &[TestOutcome], duplicates_dropped: usize) -> RunSummary {
    let total = outcomes.len();
    let passed = outcomes.iter().filter(|o| o.is_passing()).count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Failed)
        .count();
    let broken = outcomes
        .iter()
        .filter(|o| o.status == TestStatus::Broken)
        .count();
    let suite_count = {
        let mut suites: Vec<&str> = outcomes.iter().map(|o| o.suite.as_str()).collect();
        suites.sort_unstable();
        suites.dedup();
        suites.len()
    };

    RunSummary {
        total,
        passed,
        failed,
        broken,
        pass_rate_pct: rate_pct(passed, total),
        failure_rate_pct: rate_pct(failed + broken, total),
        total_duration_ms: outcomes.iter().map(|o| o.duration_ms).sum(),
        suite_count,
        duplicate_outcomes_dropped: duplicates_dropped,
    }
}

/// Per-suite rollups, sorted by suite name.
pub fn suite_summaries(outcomes: &[TestOutcome]) -> Vec<SuiteSummary> {
    let mut by_suite: std::collections::BTreeMap<&str, (usize, usize, usize, u64)> =
        std::collections::BTreeMap::new();

    for outcome in outcomes {
        let entry = by_suite.entry(outcome.suite.as_str()).or_default();
        match outcome.status {
            TestStatus::Passed => entry.0 += 1,
            TestStatus::Failed => entry.1 += 1,
            TestStatus::Broken => entry.2 += 1,
        }
        entry.3 += outcome.duration_ms;
    }

    by_suite
        .into_iter()
        .map(|(suite, (passed, failed, broken, duration))| {
            let total = passed + failed + broken;
            SuiteSummary {
                suite: suite.to_string(),
                total,
                passed,
                failed,
                broken,
                pass_rate_pct: rate_pct(passed, total),
                total_duration_ms: duration,
            }
        })
        .collect()
}

/// Share of `part` in `total` as a percentage; 0 when `total` is 0.
pub fn rate_pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
