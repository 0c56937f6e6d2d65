//! Per-suite stability scoring.
//!
//! A suite's score starts at its current-run pass rate and is penalized by
//! the standard deviation of its historical per-day pass rates. A suite
//! that is green today but has swung between green and red all week scores
//! well below a consistently green one.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tqi_common::{
    AnalysisConfig, HistoricalRun, ReliabilityBand, StabilityAnalysis, SuiteStability, TestOutcome,
};

use crate::prepare::rate_pct;

/// Suites scoring below this are flagged unstable.
const UNSTABLE_SUITE_THRESHOLD: f64 = 70.0;

/// Score every suite present in the current run.
pub fn score_stability(
    outcomes: &[TestOutcome],
    history: &[HistoricalRun],
    config: &AnalysisConfig,
) -> StabilityAnalysis {
    let mut current: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for outcome in outcomes {
        let entry = current.entry(outcome.suite.as_str()).or_default();
        if outcome.is_passing() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let mut daily: BTreeMap<&str, BTreeMap<NaiveDate, (usize, usize)>> = BTreeMap::new();
    for run in history {
        let entry = daily
            .entry(run.suite.as_str())
            .or_default()
            .entry(run.executed_on)
            .or_default();
        if run.status.is_passing() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let mut suites = Vec::with_capacity(current.len());
    let mut unstable_suites = Vec::new();
    for (suite, (passed, total)) in &current {
        let current_pass_rate_pct = rate_pct(*passed, *total);

        let day_rates: Vec<f64> = daily
            .get(suite)
            .map(|days| {
                days.values()
                    .map(|(passed, total)| rate_pct(*passed, *total))
                    .collect()
            })
            .unwrap_or_default();
        let historical_std_dev_pct = population_std_dev(&day_rates);

        let score = (current_pass_rate_pct - historical_std_dev_pct).clamp(0.0, 100.0);
        let unstable = score < UNSTABLE_SUITE_THRESHOLD;
        if unstable {
            unstable_suites.push((*suite).to_string());
        }

        suites.push(SuiteStability {
            suite: (*suite).to_string(),
            score,
            current_pass_rate_pct,
            historical_std_dev_pct,
            sampled_days: day_rates.len(),
            unstable,
            reliability: ReliabilityBand::from_pass_rate(current_pass_rate_pct, &config.reliability),
        });
    }

    let overall_score = if suites.is_empty() {
        // An empty run carries no instability signal.
        100.0
    } else {
        suites.iter().map(|s| s.score).sum::<f64>() / suites.len() as f64
    };

    StabilityAnalysis {
        suites,
        overall_score,
        unstable_suites,
    }
}

fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqi_common::TestStatus;

    fn outcome(suite: &str, status: TestStatus) -> TestOutcome {
        TestOutcome {
            suite: suite.to_string(),
            test: "t".to_string(),
            parameter: String::new(),
            status,
            duration_raw: String::new(),
            duration_ms: 10,
            failing_step: String::new(),
            failure_reason: String::new(),
            tags: String::new(),
            screenshot: None,
        }
    }

    fn run_on(suite: &str, status: TestStatus, date: &str) -> HistoricalRun {
        HistoricalRun {
            suite: suite.to_string(),
            test: "t".to_string(),
            status,
            duration_ms: 10,
            executed_on: date.parse().unwrap(),
            build_id: "b1".to_string(),
            environment: "ci".to_string(),
        }
    }

    #[test]
    fn clean_suite_without_history_scores_full() {
        let outcomes = vec![outcome("s", TestStatus::Passed), outcome("s", TestStatus::Passed)];
        let analysis = score_stability(&outcomes, &[], &AnalysisConfig::default());
        assert_eq!(analysis.suites.len(), 1);
        let suite = &analysis.suites[0];
        assert!((suite.score - 100.0).abs() < f64::EPSILON);
        assert_eq!(suite.sampled_days, 0);
        assert!(!suite.unstable);
        assert_eq!(suite.reliability, ReliabilityBand::Excellent);
        assert!((analysis.overall_score - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn historical_variance_penalizes_a_green_suite() {
        let outcomes = vec![outcome("s", TestStatus::Passed)];
        // One fully green day, one fully red day: std dev of [100, 0] is 50.
        let history = vec![
            run_on("s", TestStatus::Passed, "2024-03-01"),
            run_on("s", TestStatus::Failed, "2024-03-02"),
        ];
        let analysis = score_stability(&outcomes, &history, &AnalysisConfig::default());
        let suite = &analysis.suites[0];
        assert!((suite.current_pass_rate_pct - 100.0).abs() < f64::EPSILON);
        assert!((suite.historical_std_dev_pct - 50.0).abs() < 1e-9);
        assert!((suite.score - 50.0).abs() < 1e-9);
        assert_eq!(suite.sampled_days, 2);
        assert!(suite.unstable);
        assert_eq!(analysis.unstable_suites, vec!["s"]);
    }

    #[test]
    fn steady_history_leaves_the_score_alone() {
        let outcomes = vec![outcome("s", TestStatus::Passed)];
        let history = vec![
            run_on("s", TestStatus::Passed, "2024-03-01"),
            run_on("s", TestStatus::Passed, "2024-03-02"),
            run_on("s", TestStatus::Passed, "2024-03-03"),
        ];
        let analysis = score_stability(&outcomes, &history, &AnalysisConfig::default());
        assert!((analysis.suites[0].score - 100.0).abs() < f64::EPSILON);
        assert_eq!(analysis.suites[0].sampled_days, 3);
    }

    #[test]
    fn score_floors_at_zero() {
        let outcomes = vec![outcome("s", TestStatus::Failed), outcome("s", TestStatus::Passed)];
        let history = vec![
            run_on("s", TestStatus::Passed, "2024-03-01"),
            run_on("s", TestStatus::Failed, "2024-03-02"),
        ];
        let analysis = score_stability(&outcomes, &history, &AnalysisConfig::default());
        // Base 50 minus std dev 50.
        assert!((analysis.suites[0].score - 0.0).abs() < 1e-9);
    }

    #[test]
    fn overall_score_is_the_suite_mean() {
        let outcomes = vec![
            outcome("green", TestStatus::Passed),
            outcome("red", TestStatus::Failed),
        ];
        let analysis = score_stability(&outcomes, &[], &AnalysisConfig::default());
        assert!((analysis.overall_score - 50.0).abs() < f64::EPSILON);
        assert_eq!(analysis.unstable_suites, vec!["red"]);
    }

    #[test]
    fn empty_run_scores_clean() {
        let analysis = score_stability(&[], &[], &AnalysisConfig::default());
        assert!(analysis.suites.is_empty());
        assert!((analysis.overall_score - 100.0).abs() < f64::EPSILON);
        assert!(analysis.unstable_suites.is_empty());
    }

    #[test]
    fn history_for_absent_suites_is_ignored() {
        let outcomes = vec![outcome("present", TestStatus::Passed)];
        let history = vec![run_on("retired", TestStatus::Failed, "2024-03-01")];
        let analysis = score_stability(&outcomes, &history, &AnalysisConfig::default());
        assert_eq!(analysis.suites.len(), 1);
        assert_eq!(analysis.suites[0].suite, "present");
        assert_eq!(analysis.suites[0].sampled_days, 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn status_of(code: u8) -> TestStatus {
            match code % 3 {
                0 => TestStatus::Passed,
                1 => TestStatus::Failed,
                _ => TestStatus::Broken,
            }
        }

        proptest! {
            #[test]
            fn scores_always_land_in_range(
                statuses in prop::collection::vec(any::<u8>(), 0..40),
                history in prop::collection::vec((1_u32..=28, any::<u8>()), 0..60),
            ) {
                let outcomes: Vec<TestOutcome> = statuses
                    .into_iter()
                    .enumerate()
                    .map(|(i, code)| outcome(if i % 2 == 0 { "a" } else { "b" }, status_of(code)))
                    .collect();
                let runs: Vec<HistoricalRun> = history
                    .into_iter()
                    .map(|(day, code)| {
                        run_on(
                            if day % 2 == 0 { "a" } else { "b" },
                            status_of(code),
                            &format!("2024-03-{day:02}"),
                        )
                    })
                    .collect();

                let analysis = score_stability(&outcomes, &runs, &AnalysisConfig::default());
                for suite in &analysis.suites {
                    prop_assert!((0.0..=100.0).contains(&suite.score));
                }
                prop_assert!((0.0..=100.0).contains(&analysis.overall_score));
            }
        }
    }
}
