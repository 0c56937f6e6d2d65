//! Duration banding and the slowest-tests list.

use tqi_common::{AnalysisConfig, DurationBand, PerformanceOverview, SlowTest, TestOutcome};

/// Most entries kept in the slowest-tests list.
const MAX_SLOW_TESTS: usize = 10;

/// Band every outcome by duration and keep the slowest few.
pub fn summarize_performance(
    outcomes: &[TestOutcome],
    config: &AnalysisConfig,
) -> PerformanceOverview {
    let mut overview = PerformanceOverview::default();
    let mut banded: Vec<SlowTest> = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        let band = DurationBand::from_duration_ms(outcome.duration_ms, &config.performance);
        match band {
            DurationBand::Critical => overview.critical_count += 1,
            DurationBand::Slow => overview.slow_count += 1,
            DurationBand::Moderate => overview.moderate_count += 1,
            DurationBand::Fast => overview.fast_count += 1,
        }
        banded.push(SlowTest {
            suite: outcome.suite.clone(),
            test: outcome.test.clone(),
            duration_ms: outcome.duration_ms,
            band,
        });
    }

    banded.sort_by(|a, b| {
        b.duration_ms
            .cmp(&a.duration_ms)
            .then_with(|| a.suite.cmp(&b.suite))
            .then_with(|| a.test.cmp(&b.test))
    });
    banded.truncate(MAX_SLOW_TESTS);
    overview.slowest = banded;
    overview
}
