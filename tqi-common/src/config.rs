//! Analysis configuration.
//!
//! All thresholds the engine consults live here, with serde defaults so a
//! partial (or empty) configuration document deserializes into something
//! usable. The engine itself treats the configuration as already validated;
//! callers that accept untrusted configuration run [`AnalysisConfig::validate`]
//! and, when they want to proceed anyway, [`AnalysisConfig::normalized`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Duration thresholds (milliseconds) delimiting runtime bands.
///
/// A duration at or above `critical_ms` bands Critical, at or above
/// `high_ms` Slow, at or above `medium_ms` Moderate, otherwise Fast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceThresholds {
    #[serde(default = "default_critical_ms")]
    pub critical_ms: u64,
    #[serde(default = "default_high_ms")]
    pub high_ms: u64,
    #[serde(default = "default_medium_ms")]
    pub medium_ms: u64,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            critical_ms: default_critical_ms(),
            high_ms: default_high_ms(),
            medium_ms: default_medium_ms(),
        }
    }
}

/// Pass-rate thresholds (percent) delimiting suite reliability bands.
///
/// A pass rate below `unreliable_pct` bands Unreliable, below `poor_pct`
/// Poor, below `good_pct` Good, otherwise Excellent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReliabilityThresholds {
    #[serde(default = "default_unreliable_pct")]
    pub unreliable_pct: f64,
    #[serde(default = "default_poor_pct")]
    pub poor_pct: f64,
    #[serde(default = "default_good_pct")]
    pub good_pct: f64,
}

impl Default for ReliabilityThresholds {
    fn default() -> Self {
        Self {
            unreliable_pct: default_unreliable_pct(),
            poor_pct: default_poor_pct(),
            good_pct: default_good_pct(),
        }
    }
}

/// Immutable configuration for one analysis invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisConfig {
    /// Minimum historical samples a test needs before flakiness is scored.
    #[serde(default = "default_flaky_test_threshold")]
    pub flaky_test_threshold: u32,
    /// Suites treated as critical: regressions in them are Critical, and the
    /// risk assessment scans them for critical issues. Matched by exact name.
    #[serde(default)]
    pub critical_suites: Vec<String>,
    /// Duration growth (percent vs. baseline) above which a test counts as a
    /// performance regression.
    #[serde(default = "default_performance_degradation_pct")]
    pub performance_degradation_threshold_pct: f64,
    /// Non-passing count at which a critical suite raises a critical issue.
    #[serde(default = "default_critical_failure_threshold")]
    pub critical_failure_threshold: u32,
    /// How many recent historical executions the flaky window holds.
    #[serde(default = "default_historical_runs_to_compare")]
    pub historical_runs_to_compare: u32,
    #[serde(default)]
    pub performance: PerformanceThresholds,
    #[serde(default)]
    pub reliability: ReliabilityThresholds,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            flaky_test_threshold: default_flaky_test_threshold(),
            critical_suites: Vec::new(),
            performance_degradation_threshold_pct: default_performance_degradation_pct(),
            critical_failure_threshold: default_critical_failure_threshold(),
            historical_runs_to_compare: default_historical_runs_to_compare(),
            performance: PerformanceThresholds::default(),
            reliability: ReliabilityThresholds::default(),
        }
    }
}

impl AnalysisConfig {
    /// Exact-name membership test against `critical_suites`.
    pub fn is_critical_suite(&self, suite: &str) -> bool {
        self.critical_suites.iter().any(|s| s == suite)
    }

    /// Check the configuration for values that would degrade or disable
    /// parts of the analysis. Nothing here is fatal; the warnings exist so
    /// a caller can surface them before running with [`normalized`] values.
    ///
    /// [`normalized`]: AnalysisConfig::normalized
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.flaky_test_threshold == 0 {
            warnings.push(ConfigWarning::new(
                "flaky_test_threshold",
                "a zero sample minimum scores flakiness from a single execution",
                WarningSeverity::Warning,
            ));
        }
        if self.historical_runs_to_compare == 0 {
            warnings.push(ConfigWarning::new(
                "historical_runs_to_compare",
                "a zero-length window disables flaky detection entirely",
                WarningSeverity::Warning,
            ));
        } else if self.historical_runs_to_compare < self.flaky_test_threshold {
            warnings.push(ConfigWarning::new(
                "historical_runs_to_compare",
                "window is smaller than flaky_test_threshold, so no test can ever qualify",
                WarningSeverity::Warning,
            ));
        }
        if !self.performance_degradation_threshold_pct.is_finite()
            || self.performance_degradation_threshold_pct <= 0.0
        {
            warnings.push(ConfigWarning::new(
                "performance_degradation_threshold_pct",
                "must be a positive finite percentage",
                WarningSeverity::Warning,
            ));
        }
        if self.critical_failure_threshold == 0 {
            warnings.push(ConfigWarning::new(
                "critical_failure_threshold",
                "a zero threshold flags every configured critical suite, failing or not",
                WarningSeverity::Warning,
            ));
        }
        if self
            .critical_suites
            .iter()
            .any(|s| s.trim().is_empty())
        {
            warnings.push(ConfigWarning::new(
                "critical_suites",
                "contains blank suite names; they can never match",
                WarningSeverity::Info,
            ));
        }

        let p = &self.performance;
        if p.medium_ms == 0 || p.medium_ms > p.high_ms || p.high_ms > p.critical_ms {
            warnings.push(ConfigWarning::new(
                "performance",
                "thresholds must satisfy 0 < medium_ms <= high_ms <= critical_ms",
                WarningSeverity::Warning,
            ));
        }

        let r = &self.reliability;
        let ordered = r.unreliable_pct > 0.0
            && r.unreliable_pct < r.poor_pct
            && r.poor_pct < r.good_pct
            && r.good_pct <= 100.0;
        if !(r.unreliable_pct.is_finite() && r.poor_pct.is_finite() && r.good_pct.is_finite())
            || !ordered
        {
            warnings.push(ConfigWarning::new(
                "reliability",
                "thresholds must satisfy 0 < unreliable_pct < poor_pct < good_pct <= 100",
                WarningSeverity::Warning,
            ));
        }

        warnings
    }

    /// Return a copy with every value that [`validate`] would warn about
    /// replaced by a usable one: out-of-range values revert to their
    /// documented defaults, blank critical-suite entries are dropped, and a
    /// window smaller than the sample minimum is raised to it. Values that
    /// validate cleanly pass through untouched.
    ///
    /// [`validate`]: AnalysisConfig::validate
    pub fn normalized(&self) -> Self {
        let defaults = Self::default();
        let mut cfg = self.clone();

        if cfg.flaky_test_threshold == 0 {
            cfg.flaky_test_threshold = defaults.flaky_test_threshold;
        }
        if cfg.historical_runs_to_compare == 0 {
            cfg.historical_runs_to_compare = defaults.historical_runs_to_compare;
        }
        if cfg.historical_runs_to_compare < cfg.flaky_test_threshold {
            cfg.historical_runs_to_compare = cfg.flaky_test_threshold;
        }
        if !cfg.performance_degradation_threshold_pct.is_finite()
            || cfg.performance_degradation_threshold_pct <= 0.0
        {
            cfg.performance_degradation_threshold_pct =
                defaults.performance_degradation_threshold_pct;
        }
        if cfg.critical_failure_threshold == 0 {
            cfg.critical_failure_threshold = defaults.critical_failure_threshold;
        }
        cfg.critical_suites.retain(|s| !s.trim().is_empty());

        let p = &cfg.performance;
        if p.medium_ms == 0 || p.medium_ms > p.high_ms || p.high_ms > p.critical_ms {
            cfg.performance = defaults.performance;
        }
        let r = &cfg.reliability;
        let ordered = r.unreliable_pct > 0.0
            && r.unreliable_pct < r.poor_pct
            && r.poor_pct < r.good_pct
            && r.good_pct <= 100.0;
        if !(r.unreliable_pct.is_finite() && r.poor_pct.is_finite() && r.good_pct.is_finite())
            || !ordered
        {
            cfg.reliability = defaults.reliability;
        }

        cfg
    }
}

/// Severity of a configuration warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Worth surfacing; analysis is unaffected.
    Info,
    /// The value degrades or disables part of the analysis.
    Warning,
}

/// A single finding from [`AnalysisConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ConfigWarning {
    fn new(field: &str, message: &str, severity: WarningSeverity) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

fn default_flaky_test_threshold() -> u32 {
    4
}

fn default_performance_degradation_pct() -> f64 {
    20.0
}

fn default_critical_failure_threshold() -> u32 {
    3
}

fn default_historical_runs_to_compare() -> u32 {
    10
}

fn default_critical_ms() -> u64 {
    60_000
}

fn default_high_ms() -> u64 {
    30_000
}

fn default_medium_ms() -> u64 {
    10_000
}

fn default_unreliable_pct() -> f64 {
    70.0
}

fn default_poor_pct() -> f64 {
    85.0
}

fn default_good_pct() -> f64 {
    95.0
}
