//! Rule outcomes and the summary of a full validation run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Truncated integer percent of `used / capacity`, 0 when capacity is 0.
/// Computed in `i128` and clamped back into `i64`.
pub(crate) fn utilization_percent(used: i64, capacity: i64) -> i64 {
    if capacity == 0 {
        return 0;
    }
    let percent = i128::from(used) * 100 / i128::from(capacity);
    percent.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

/// Exact comparison of `used / capacity` against `percent`%.
pub(crate) fn compare_ratio(used: i64, capacity: i64, percent: i64) -> Ordering {
    (i128::from(used) * 100).cmp(&(i128::from(capacity) * i128::from(percent)))
}

// =============================================================================
// Rule Result
// =============================================================================

/// Outcome of one rule. `passed` is derived: true iff `errors` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleResult {
    pub rule_name: String,
    pub passed: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl RuleResult {
    pub fn pass(rule_name: impl Into<String>) -> Self {
        RuleResult {
            rule_name: rule_name.into(),
            passed: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn fail(rule_name: impl Into<String>, error: impl Into<String>) -> Self {
        RuleResult::pass(rule_name).with_error(error)
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self.passed = false;
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// =============================================================================
// Validation Summary
// =============================================================================

/// Aggregate capacity figures captured from the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityMetrics {
    pub total_power_draw_watts: i64,
    pub total_psu_capacity_watts: i64,
    pub total_rack_units_used: i64,
    pub rack_capacity_units: i64,
}

/// One full pipeline run over a configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub configuration_id: String,
    pub valid: bool,
    pub rule_results: Vec<RuleResult>,
    #[serde(flatten)]
    pub metrics: CapacityMetrics,
    pub power_utilization_percent: i64,
    pub rack_utilization_percent: i64,
    pub validated_at: DateTime<Utc>,
}

impl ValidationSummary {
    /// `valid` is the AND of every rule's `passed` flag; an empty run is valid.
    pub fn new(
        configuration_id: impl Into<String>,
        rule_results: Vec<RuleResult>,
        metrics: CapacityMetrics,
    ) -> Self {
        let valid = rule_results.iter().all(|r| r.passed);
        ValidationSummary {
            configuration_id: configuration_id.into(),
            valid,
            rule_results,
            power_utilization_percent: utilization_percent(
                metrics.total_power_draw_watts,
                metrics.total_psu_capacity_watts,
            ),
            rack_utilization_percent: utilization_percent(
                metrics.total_rack_units_used,
                metrics.rack_capacity_units,
            ),
            metrics,
            validated_at: Utc::now(),
        }
    }

    /// Errors from every failed rule, in execution order.
    pub fn all_errors(&self) -> Vec<String> {
        self.rule_results
            .iter()
            .filter(|r| !r.passed)
            .flat_map(|r| r.errors.iter().cloned())
            .collect()
    }

    /// Warnings from every rule, passed or not.
    pub fn all_warnings(&self) -> Vec<String> {
        self.rule_results
            .iter()
            .flat_map(|r| r.warnings.iter().cloned())
            .collect()
    }

    pub fn failed_rules(&self) -> Vec<&str> {
        self.rule_results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.rule_name.as_str())
            .collect()
    }

    pub fn result_for(&self, rule_name: &str) -> Option<&RuleResult> {
        self.rule_results.iter().find(|r| r.rule_name == rule_name)
    }
}
