//! Flaky-test detection over historical status sequences.
//!
//! A test is flaky when its status keeps flipping across recent runs. The
//! signal is the share of adjacent transitions in a bounded window of the
//! most recent executions; a steady failure is not flaky, only an
//! oscillating one is.

use std::collections::{BTreeMap, HashSet};

use tqi_common::{AnalysisConfig, FlakyAnalysis, FlakyTest, HistoricalRun, Priority, TestOutcome};

/// Inconsistency above this flags a test as flaky.
const FLAKY_RATE_THRESHOLD_PCT: f64 = 30.0;
/// Inconsistency at or above this is high priority outright.
const HIGH_PRIORITY_RATE_PCT: f64 = 60.0;
/// Inconsistency at or above this is at least medium priority.
const MEDIUM_PRIORITY_RATE_PCT: f64 = 45.0;

/// Detect flaky tests among those present in the current run. Empty
/// history yields an empty result.
pub fn detect_flaky_tests(
    outcomes: &[TestOutcome],
    history: &[HistoricalRun],
    config: &AnalysisConfig,
) -> FlakyAnalysis {
    if history.is_empty() {
        return FlakyAnalysis::default();
    }

    let window = config.historical_runs_to_compare as usize;
    let min_samples = config.flaky_test_threshold as usize;

    // Retired tests linger in history; only tests that ran now are judged.
    let current: HashSet<(&str, &str)> = outcomes
        .iter()
        .map(|o| (o.suite.as_str(), o.test.as_str()))
        .collect();

    let mut by_test: BTreeMap<(&str, &str), Vec<&HistoricalRun>> = BTreeMap::new();
    for run in history {
        let key = (run.suite.as_str(), run.test.as_str());
        if current.contains(&key) {
            by_test.entry(key).or_default().push(run);
        }
    }

    let mut evaluated_tests = 0;
    let mut tests = Vec::new();
    for ((suite, test), mut runs) in by_test {
        // Newest first; the stable sort keeps input order within one day.
        runs.sort_by(|a, b| b.executed_on.cmp(&a.executed_on));
        runs.truncate(window);
        if runs.len() < min_samples {
            continue;
        }
        evaluated_tests += 1;

        runs.reverse();
        let samples = runs.len();
        let transitions = runs
            .windows(2)
            .filter(|pair| pair[0].status != pair[1].status)
            .count();
        let inconsistency_pct = transitions as f64 / samples as f64 * 100.0;
        if inconsistency_pct <= FLAKY_RATE_THRESHOLD_PCT {
            continue;
        }

        tests.push(FlakyTest {
            suite: suite.to_string(),
            test: test.to_string(),
            samples,
            transitions,
            inconsistency_pct,
            priority: priority_for(inconsistency_pct, config.is_critical_suite(suite)),
        });
    }

    tests.sort_by(|a, b| {
        b.inconsistency_pct
            .partial_cmp(&a.inconsistency_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.suite.cmp(&b.suite))
            .then_with(|| a.test.cmp(&b.test))
    });

    FlakyAnalysis {
        tests,
        evaluated_tests,
    }
}

fn priority_for(rate_pct: f64, critical_suite: bool) -> Priority {
    if rate_pct >= HIGH_PRIORITY_RATE_PCT || critical_suite {
        Priority::High
    } else if rate_pct >= MEDIUM_PRIORITY_RATE_PCT {
        Priority::Medium
    } else {
        Priority::Low
    }
}
