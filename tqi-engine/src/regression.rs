//! Regression detection against the most recent prior run.
//!
//! History is grouped by execution date; the latest date group mirrors the
//! batch under analysis, so the baseline is the second most recent group.
//! Currently failing tests that passed at the baseline are new failures;
//! tests present in both runs with a large duration increase are
//! performance regressions.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tqi_common::{
    AnalysisConfig, HistoricalRun, NewFailure, PerformanceRegression, RegressionAnalysis,
    Severity, TestOutcome,
};

use crate::normalize::{reason_or_unknown, step_or_unknown};

/// Diff the current batch against the baseline run. Histories with fewer
/// than two date groups carry no baseline and yield an empty result.
pub fn detect_regressions(
    outcomes: &[TestOutcome],
    history: &[HistoricalRun],
    config: &AnalysisConfig,
) -> RegressionAnalysis {
    let Some(baseline_date) = baseline_date(history) else {
        return RegressionAnalysis::default();
    };

    let mut baseline: HashMap<(&str, &str), &HistoricalRun> = HashMap::new();
    for run in history.iter().filter(|r| r.executed_on == baseline_date) {
        // Retries within the baseline day: latest occurrence wins.
        baseline.insert((run.suite.as_str(), run.test.as_str()), run);
    }

    // Failure record up to and including the baseline, for severity grading.
    let failed_before: HashSet<(&str, &str)> = history
        .iter()
        .filter(|r| r.executed_on <= baseline_date && !r.status.is_passing())
        .map(|r| (r.suite.as_str(), r.test.as_str()))
        .collect();

    let mut new_failures = Vec::new();
    let mut seen_failures: HashSet<(&str, &str)> = HashSet::new();
    for outcome in outcomes.iter().filter(|o| !o.is_passing()) {
        let key = (outcome.suite.as_str(), outcome.test.as_str());
        if !seen_failures.insert(key) {
            continue;
        }
        if let Some(previous) = baseline.get(&key)
            && previous.status.is_passing()
        {
            new_failures.push(NewFailure {
                suite: outcome.suite.clone(),
                test: outcome.test.clone(),
                previous_status: previous.status,
                current_status: outcome.status,
                failure_reason: reason_or_unknown(&outcome.failure_reason).to_string(),
                failing_step: step_or_unknown(&outcome.failing_step).to_string(),
                severity: failure_severity(config, &outcome.suite, failed_before.contains(&key)),
            });
        }
    }
    new_failures.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.suite.cmp(&b.suite))
            .then_with(|| a.test.cmp(&b.test))
    });

    let threshold_pct = config.performance_degradation_threshold_pct;
    let mut performance_regressions = Vec::new();
    let mut seen_perf: HashSet<(&str, &str)> = HashSet::new();
    for outcome in outcomes {
        let key = (outcome.suite.as_str(), outcome.test.as_str());
        if !seen_perf.insert(key) {
            continue;
        }
        if let Some(previous) = baseline.get(&key)
            && previous.duration_ms > 0
        {
            let change_pct = (outcome.duration_ms as f64 - previous.duration_ms as f64)
                / previous.duration_ms as f64
                * 100.0;
            if change_pct > threshold_pct {
                performance_regressions.push(PerformanceRegression {
                    suite: outcome.suite.clone(),
                    test: outcome.test.clone(),
                    baseline_ms: previous.duration_ms,
                    current_ms: outcome.duration_ms,
                    change_pct,
                    severity: degradation_severity(change_pct, threshold_pct),
                });
            }
        }
    }
    performance_regressions.sort_by(|a, b| {
        b.change_pct
            .partial_cmp(&a.change_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.suite.cmp(&b.suite))
            .then_with(|| a.test.cmp(&b.test))
    });

    RegressionAnalysis {
        baseline_date: Some(baseline_date),
        new_failures,
        performance_regressions,
    }
}

/// Second most recent execution date in the history, if any.
fn baseline_date(history: &[HistoricalRun]) -> Option<NaiveDate> {
    let mut dates: Vec<NaiveDate> = history.iter().map(|r| r.executed_on).collect();
    dates.sort_unstable();
    dates.dedup();
    if dates.len() < 2 {
        return None;
    }
    Some(dates[dates.len() - 2])
}

fn failure_severity(config: &AnalysisConfig, suite: &str, failed_before: bool) -> Severity {
    if config.is_critical_suite(suite) {
        Severity::Critical
    } else if !failed_before {
        // A test with a spotless record breaking is a stronger signal than
        // one that has failed on and off.
        Severity::High
    } else {
        Severity::Medium
    }
}

fn degradation_severity(change_pct: f64, threshold_pct: f64) -> Severity {
    if change_pct >= threshold_pct * 3.0 {
        Severity::High
    } else if change_pct >= threshold_pct * 2.0 {
        Severity::Medium
    } else {
        Severity::Low
    }
}
