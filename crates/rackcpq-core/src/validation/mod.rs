//! # Validation Pipeline
//!
//! Decides whether a configuration is physically and electrically
//! buildable.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  RackConfiguration + ProductCatalog                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ValidationContext::build     resolve rack + every distinct SKU once    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  rules sorted by order (stable)                                         │
//! │   ┌──────────┐ ┌──────────┐ ┌──────────┐      ┌──────────┐              │
//! │   │ order 1  │→│ order 2  │→│ order 5  │→ … → │ order 30 │              │
//! │   └────┬─────┘ └────┬─────┘ └────┬─────┘      └────┬─────┘              │
//! │        │ RuleResult │            │ Err/panic →     │                    │
//! │        ▼            ▼            ▼ failing result  ▼                    │
//! │  ValidationSummary { valid = AND(passed), results, metrics }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A broken rule never blocks the rest of the suite: its failure becomes
//! a failing [`RuleResult`] and the loop continues.
//!
//! ## Usage
//! ```rust
//! use std::collections::HashMap;
//! use rackcpq_core::{ConfigurationValidator, Product, RackConfiguration};
//!
//! let catalog: HashMap<String, Product> = HashMap::new();
//! let config = RackConfiguration::new("Empty");
//! let summary = ConfigurationValidator::default().validate(&config, &catalog);
//!
//! assert!(!summary.valid);
//! assert_eq!(summary.failed_rules(), vec!["RackRequired"]);
//! ```

pub mod context;
pub mod input;
pub mod result;
pub mod rules;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog::ProductCatalog;
use crate::configuration::RackConfiguration;
use crate::pipeline::run_isolated;
use crate::settings::ValidationSettings;

pub use context::ValidationContext;
pub use result::{CapacityMetrics, RuleResult, ValidationSummary};

/// Prefix of the error recorded when a rule itself breaks.
pub const INTERNAL_ERROR_PREFIX: &str = "Internal error during validation";

// =============================================================================
// Rule Contract
// =============================================================================

/// A rule could not produce a verdict (missing data it relies on, a bug).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuleFailure {
    message: String,
}

impl RuleFailure {
    pub fn new(message: impl Into<String>) -> Self {
        RuleFailure {
            message: message.into(),
        }
    }
}

/// One feasibility check.
///
/// Implementations read the context and return a [`RuleResult`]; they
/// never fetch data of their own. Lower `order` runs earlier.
pub trait ConfigurationRule: Send + Sync {
    fn name(&self) -> &str;

    fn order(&self) -> i32;

    fn description(&self) -> &str {
        ""
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure>;
}

// =============================================================================
// Validator
// =============================================================================

/// Runs an ordered rule set over configurations.
pub struct ConfigurationValidator {
    rules: Vec<Box<dyn ConfigurationRule>>,
}

impl ConfigurationValidator {
    /// Sorts `rules` by order once. Ties keep their given order.
    pub fn new(mut rules: Vec<Box<dyn ConfigurationRule>>) -> Self {
        rules.sort_by_key(|r| r.order());
        info!(
            rules = ?rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            "Configuration validator initialized"
        );
        ConfigurationValidator { rules }
    }

    /// The standard six rules with the given thresholds.
    pub fn with_settings(settings: &ValidationSettings) -> Self {
        Self::new(rules::default_rules(settings))
    }

    /// Builds the context from `catalog` and runs every rule.
    pub fn validate<C: ProductCatalog + ?Sized>(
        &self,
        configuration: &RackConfiguration,
        catalog: &C,
    ) -> ValidationSummary {
        let ctx = ValidationContext::build(configuration, catalog);
        self.validate_context(&ctx)
    }

    /// Runs every rule against an already-built context.
    pub fn validate_context(&self, ctx: &ValidationContext<'_>) -> ValidationSummary {
        let configuration_id = &ctx.configuration().id;
        debug!(configuration_id = %configuration_id, "Validating configuration");

        let results: Vec<RuleResult> = self
            .rules
            .iter()
            .map(|rule| {
                let result = match run_isolated(|| rule.evaluate(ctx)) {
                    Ok(result) => result,
                    Err(message) => {
                        warn!(
                            configuration_id = %configuration_id,
                            rule = rule.name(),
                            error = %message,
                            "Rule failed during validation"
                        );
                        RuleResult::fail(
                            rule.name(),
                            format!("{}: {}", INTERNAL_ERROR_PREFIX, message),
                        )
                    }
                };
                debug!(
                    rule = rule.name(),
                    passed = result.passed,
                    errors = result.errors.len(),
                    warnings = result.warnings.len(),
                    "Rule evaluated"
                );
                result
            })
            .collect();

        let summary = ValidationSummary::new(configuration_id.clone(), results, ctx.metrics());

        info!(
            configuration_id = %configuration_id,
            valid = summary.valid,
            failed = ?summary.failed_rules(),
            "Validation complete"
        );

        summary
    }

    /// Rule names in execution order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// `(name, order, description)` in execution order.
    pub fn describe_rules(&self) -> Vec<(&str, i32, &str)> {
        self.rules
            .iter()
            .map(|r| (r.name(), r.order(), r.description()))
            .collect()
    }
}

impl Default for ConfigurationValidator {
    fn default() -> Self {
        Self::with_settings(&ValidationSettings::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttributeValue, Product, ProductType};
    use crate::money::Money;
    use crate::test_support::{catalog, feasible_configuration};
    use std::collections::HashMap;

    struct Named(&'static str, i32);

    impl ConfigurationRule for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn order(&self) -> i32 {
            self.1
        }
        fn evaluate(&self, _: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
            Ok(RuleResult::pass(self.0))
        }
    }

    struct Broken;

    impl ConfigurationRule for Broken {
        fn name(&self) -> &str {
            "Broken"
        }
        fn order(&self) -> i32 {
            3
        }
        fn evaluate(&self, _: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
            Err(RuleFailure::new("attribute table unavailable"))
        }
    }

    struct Panicking;

    impl ConfigurationRule for Panicking {
        fn name(&self) -> &str {
            "Panicking"
        }
        fn order(&self) -> i32 {
            4
        }
        fn evaluate(&self, _: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
            panic!("index out of bounds")
        }
    }

    #[test]
    fn test_feasible_configuration_is_valid() {
        let config = feasible_configuration();
        let summary = ConfigurationValidator::default().validate(&config, &catalog());

        assert!(summary.valid, "errors: {:?}", summary.all_errors());
        assert_eq!(summary.rule_results.len(), 6);
        assert_eq!(summary.metrics.total_power_draw_watts, 700);
        assert_eq!(summary.metrics.total_psu_capacity_watts, 2000);
        assert_eq!(summary.metrics.rack_capacity_units, 42);
        assert_eq!(summary.power_utilization_percent, 35);
    }

    #[test]
    fn test_sorts_stably_by_order() {
        let validator = ConfigurationValidator::new(vec![
            Box::new(Named("c", 10)),
            Box::new(Named("a", 1)),
            Box::new(Named("b1", 5)),
            Box::new(Named("b2", 5)),
        ]);
        assert_eq!(validator.rule_names(), vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_failing_rules_are_isolated() {
        let mut rules = rules::default_rules(&ValidationSettings::default());
        rules.push(Box::new(Broken));
        rules.push(Box::new(Panicking));
        let validator = ConfigurationValidator::new(rules);

        let config = feasible_configuration();
        let summary = validator.validate(&config, &catalog());

        assert_eq!(summary.rule_results.len(), 8);
        assert!(!summary.valid);
        assert_eq!(summary.failed_rules(), vec!["Broken", "Panicking"]);
        assert_eq!(
            summary.result_for("Broken").unwrap().errors,
            vec!["Internal error during validation: attribute table unavailable"]
        );
        assert_eq!(
            summary.result_for("Panicking").unwrap().errors,
            vec!["Internal error during validation: index out of bounds"]
        );
        // Rules after the broken ones still ran.
        assert!(summary.result_for("RedundantPSU").is_some());
    }

    #[test]
    fn test_metrics_attached_when_rules_fail() {
        let config = RackConfiguration::new("t").with_item("SW-24", 2);
        let summary = ConfigurationValidator::default().validate(&config, &catalog());

        assert!(!summary.valid);
        assert_eq!(
            summary.failed_rules(),
            vec!["RackRequired", "MinimumPSU", "PowerBudget"]
        );
        assert_eq!(summary.metrics.total_power_draw_watts, 700);
        assert_eq!(summary.metrics.rack_capacity_units, 0);
    }

    fn with_extreme_power(draw: impl Into<AttributeValue>, capacity: i64) -> HashMap<String, Product> {
        let mut catalog = catalog();
        catalog.insert(
            "SW-HUGE".to_string(),
            Product::new("SW-HUGE", "SW-HUGE", ProductType::Switch, Money::zero())
                .with_attribute("power_draw", draw)
                .with_attribute("rack_units", 1),
        );
        catalog.insert(
            "PSU-HUGE".to_string(),
            Product::new("PSU-HUGE", "PSU-HUGE", ProductType::Psu, Money::zero())
                .with_attribute("capacity_watts", capacity)
                .with_attribute("rack_units", 1),
        );
        catalog
    }

    #[test]
    fn test_overflowing_draw_saturates_instead_of_panicking() {
        let catalog = with_extreme_power(5.0e18, 1000);
        let config = RackConfiguration::new("t")
            .with_rack("RACK-42U")
            .with_item("SW-HUGE", 2)
            .with_item("PSU-HUGE", 1);
        let summary = ConfigurationValidator::default().validate(&config, &catalog);

        assert!(!summary.valid);
        assert_eq!(summary.failed_rules(), vec!["PowerBudget"]);
        assert_eq!(summary.metrics.total_power_draw_watts, i64::MAX);
        assert_eq!(summary.power_utilization_percent, i64::MAX / 10);
        assert!(summary.result_for("PowerBudget").unwrap().errors[0]
            .starts_with("Power budget exceeded"));
    }

    #[test]
    fn test_large_feasible_draw_is_valid() {
        let catalog = with_extreme_power(100_000_000_000_000_000_i64, 200_000_000_000_000_000);
        let config = RackConfiguration::new("t")
            .with_rack("RACK-42U")
            .with_item("SW-HUGE", 1)
            .with_item("PSU-HUGE", 1);
        let summary = ConfigurationValidator::default().validate(&config, &catalog);

        assert!(summary.valid, "errors: {:?}", summary.all_errors());
        assert_eq!(summary.power_utilization_percent, 50);
        assert!(summary.all_warnings().is_empty());
    }

    #[test]
    fn test_describe_rules() {
        let validator = ConfigurationValidator::default();
        let described = validator.describe_rules();
        assert_eq!(described[0].0, "RackRequired");
        assert!(!described[0].2.is_empty());
    }
}
