//! # Feasibility Rules
//!
//! ```text
//! ┌──────┬──────────────────┬──────────────────────────────────────────────┐
//! │ Order│ Rule             │ Checks                                       │
//! ├──────┼──────────────────┼──────────────────────────────────────────────┤
//! │   1  │ RackRequired     │ rack SKU set and resolvable                  │
//! │   2  │ ComponentExists  │ every item SKU resolvable                    │
//! │   5  │ MinimumPSU       │ powered gear has at least one PSU            │
//! │  10  │ PowerBudget      │ draw ≤ PSU capacity, warn near the limit     │
//! │  20  │ RackCapacity     │ units used ≤ rack units, warn near the limit │
//! │  30  │ RedundantPSU     │ advisory only, never fails                   │
//! └──────┴──────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Threshold checks compare exact ratios by cross-multiplying in `i128`
//! (`draw × 100 ≥ capacity × 80`). The percentage shown in messages is
//! the truncated ratio and plays no part in the decision.

use crate::settings::ValidationSettings;

use super::context::ValidationContext;
use super::result::{compare_ratio, utilization_percent, RuleResult};
use super::{ConfigurationRule, RuleFailure};

/// The standard rule set, in declaration order.
pub fn default_rules(settings: &ValidationSettings) -> Vec<Box<dyn ConfigurationRule>> {
    vec![
        Box::new(RackRequiredRule),
        Box::new(ComponentExistsRule),
        Box::new(MinimumPsuRule),
        Box::new(PowerBudgetRule::new(settings.power_warning_percent)),
        Box::new(RackCapacityRule::new(settings.rack_warning_percent)),
        Box::new(RedundantPsuRule::new(
            settings.redundancy_switch_threshold,
            settings.single_psu_load_percent,
        )),
    ]
}

// =============================================================================
// Rack Required
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct RackRequiredRule;

impl ConfigurationRule for RackRequiredRule {
    fn name(&self) -> &str {
        "RackRequired"
    }

    fn order(&self) -> i32 {
        1
    }

    fn description(&self) -> &str {
        "A base rack must be selected and exist in the catalog"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        let sku = ctx
            .configuration()
            .rack_sku()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        Ok(match sku {
            None => RuleResult::fail(
                self.name(),
                "A base rack must be selected for the configuration",
            ),
            Some(sku) if ctx.rack().is_none() => {
                RuleResult::fail(self.name(), format!("Selected rack SKU is not valid: {}", sku))
            }
            Some(_) => RuleResult::pass(self.name()),
        })
    }
}

// =============================================================================
// Component Exists
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct ComponentExistsRule;

impl ConfigurationRule for ComponentExistsRule {
    fn name(&self) -> &str {
        "ComponentExists"
    }

    fn order(&self) -> i32 {
        2
    }

    fn description(&self) -> &str {
        "Every component must reference a catalog product"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        let result = ctx
            .configuration()
            .distinct_skus()
            .into_iter()
            .filter(|sku| ctx.product(sku).is_none())
            .fold(RuleResult::pass(self.name()), |acc, sku| {
                acc.with_error(format!("Product not found in catalog: {}", sku))
            });
        Ok(result)
    }
}

// =============================================================================
// Minimum PSU
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
pub struct MinimumPsuRule;

impl ConfigurationRule for MinimumPsuRule {
    fn name(&self) -> &str {
        "MinimumPSU"
    }

    fn order(&self) -> i32 {
        5
    }

    fn description(&self) -> &str {
        "Powered components need at least one PSU"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        if ctx.has_powered_components() && ctx.psu_count() == 0 {
            return Ok(RuleResult::fail(
                self.name(),
                format!(
                    "Configuration has {} switch(es) that require power, but no PSU is configured",
                    ctx.switch_count()
                ),
            ));
        }
        Ok(RuleResult::pass(self.name()))
    }
}

// =============================================================================
// Power Budget
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct PowerBudgetRule {
    warning_percent: i64,
}

impl PowerBudgetRule {
    pub fn new(warning_percent: u32) -> Self {
        PowerBudgetRule {
            warning_percent: warning_percent as i64,
        }
    }
}

impl Default for PowerBudgetRule {
    fn default() -> Self {
        PowerBudgetRule::new(ValidationSettings::default().power_warning_percent)
    }
}

impl ConfigurationRule for PowerBudgetRule {
    fn name(&self) -> &str {
        "PowerBudget"
    }

    fn order(&self) -> i32 {
        10
    }

    fn description(&self) -> &str {
        "Total power draw must not exceed total PSU capacity"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        if !ctx.has_powered_components() {
            return Ok(RuleResult::pass(self.name()));
        }

        let draw = ctx.total_power_draw();
        let capacity = ctx.total_psu_capacity();

        if capacity == 0 {
            return Ok(RuleResult::fail(
                self.name(),
                format!(
                    "Configuration requires {}W of power but no PSU is configured",
                    draw
                ),
            ));
        }

        if draw > capacity {
            return Ok(RuleResult::fail(
                self.name(),
                format!(
                    "Power budget exceeded: {}W required but only {}W available (deficit: {}W)",
                    draw,
                    capacity,
                    draw.saturating_sub(capacity)
                ),
            ));
        }

        let mut result = RuleResult::pass(self.name());
        if compare_ratio(draw, capacity, self.warning_percent).is_ge() {
            result = result.with_warning(format!(
                "Power utilization at {}% ({}W of {}W) - consider additional PSU capacity",
                utilization_percent(draw, capacity),
                draw,
                capacity
            ));
        }
        Ok(result)
    }
}

// =============================================================================
// Rack Capacity
// =============================================================================

#[derive(Debug, Clone, Copy)]
pub struct RackCapacityRule {
    warning_percent: i64,
}

impl RackCapacityRule {
    pub fn new(warning_percent: u32) -> Self {
        RackCapacityRule {
            warning_percent: warning_percent as i64,
        }
    }
}

impl Default for RackCapacityRule {
    fn default() -> Self {
        RackCapacityRule::new(ValidationSettings::default().rack_warning_percent)
    }
}

impl ConfigurationRule for RackCapacityRule {
    fn name(&self) -> &str {
        "RackCapacity"
    }

    fn order(&self) -> i32 {
        20
    }

    fn description(&self) -> &str {
        "Mounted equipment must fit in the rack"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        // Missing rack is RackRequired's finding.
        if ctx.rack().is_none() {
            return Ok(RuleResult::pass(self.name()));
        }

        let used = ctx.total_rack_units_used();
        let capacity = ctx.rack_capacity();

        if capacity == 0 {
            return Ok(RuleResult::fail(
                self.name(),
                "Rack capacity information is not available",
            ));
        }

        if used > capacity {
            return Ok(RuleResult::fail(
                self.name(),
                format!(
                    "Rack capacity exceeded: {}U required but rack only has {}U (excess: {}U)",
                    used,
                    capacity,
                    used.saturating_sub(capacity)
                ),
            ));
        }

        let mut result = RuleResult::pass(self.name());
        if compare_ratio(used, capacity, self.warning_percent).is_ge() {
            result = result.with_warning(format!(
                "Rack utilization at {}% ({}U of {}U) - limited space for expansion",
                utilization_percent(used, capacity),
                used,
                capacity
            ));
        }
        Ok(result)
    }
}

// =============================================================================
// Redundant PSU
// =============================================================================

/// Advisory only. Both warnings may fire together.
#[derive(Debug, Clone, Copy)]
pub struct RedundantPsuRule {
    switch_threshold: i64,
    single_psu_load_percent: i64,
}

impl RedundantPsuRule {
    pub fn new(switch_threshold: i64, single_psu_load_percent: u32) -> Self {
        RedundantPsuRule {
            switch_threshold,
            single_psu_load_percent: single_psu_load_percent as i64,
        }
    }
}

impl Default for RedundantPsuRule {
    fn default() -> Self {
        let settings = ValidationSettings::default();
        RedundantPsuRule::new(
            settings.redundancy_switch_threshold,
            settings.single_psu_load_percent,
        )
    }
}

impl ConfigurationRule for RedundantPsuRule {
    fn name(&self) -> &str {
        "RedundantPSU"
    }

    fn order(&self) -> i32 {
        30
    }

    fn description(&self) -> &str {
        "Recommends a second PSU for larger or heavily loaded configurations"
    }

    fn evaluate(&self, ctx: &ValidationContext<'_>) -> Result<RuleResult, RuleFailure> {
        let psus = ctx.psu_count();
        let switches = ctx.switch_count();
        let mut result = RuleResult::pass(self.name());

        if switches >= self.switch_threshold && psus < 2 {
            result = result.with_warning(format!(
                "Configuration has {} switches but only {} PSU. Consider adding a redundant PSU for high availability.",
                switches, psus
            ));
        }

        if psus == 1 && ctx.has_powered_components() {
            let draw = ctx.total_power_draw();
            let capacity = ctx.total_psu_capacity();
            if compare_ratio(draw, capacity, self.single_psu_load_percent).is_gt() {
                result = result.with_warning(format!(
                    "Single PSU at {}% utilization. Redundant PSU recommended for fault tolerance.",
                    utilization_percent(draw, capacity)
                ));
            }
        }

        Ok(result)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Product, ProductType};
    use crate::configuration::RackConfiguration;
    use crate::money::Money;
    use crate::test_support::catalog;
    use std::collections::HashMap;

    fn run(rule: &dyn ConfigurationRule, config: &RackConfiguration) -> RuleResult {
        let catalog = catalog();
        let ctx = ValidationContext::build(config, &catalog);
        rule.evaluate(&ctx).unwrap()
    }

    /// A catalog with one switch drawing `draw` watts and one PSU
    /// supplying `capacity` watts.
    fn power_fixture(draw: i64, capacity: i64) -> RuleResult {
        let switch = Product::new("SW", "Switch", ProductType::Switch, Money::zero())
            .with_attribute("power_draw", draw)
            .with_attribute("rack_units", 1);
        let psu = Product::new("PSU", "PSU", ProductType::Psu, Money::zero())
            .with_attribute("capacity_watts", capacity)
            .with_attribute("rack_units", 1);
        let mut catalog = HashMap::new();
        catalog.insert("SW".to_string(), switch);
        catalog.insert("PSU".to_string(), psu);

        let config = RackConfiguration::new("t").with_item("SW", 1).with_item("PSU", 1);
        let ctx = ValidationContext::build(&config, &catalog);
        PowerBudgetRule::default().evaluate(&ctx).unwrap()
    }

    fn rack_fixture(units_used: i64, rack_units: i64) -> RuleResult {
        let rack = Product::new("RACK", "Rack", ProductType::Rack, Money::zero())
            .with_attribute("units", rack_units);
        let shelf = Product::new("SHELF", "Shelf", ProductType::Accessory, Money::zero())
            .with_attribute("rack_units", 1);
        let mut catalog = HashMap::new();
        catalog.insert("RACK".to_string(), rack);
        catalog.insert("SHELF".to_string(), shelf);

        let config = RackConfiguration::new("t")
            .with_rack("RACK")
            .with_item("SHELF", units_used as u32);
        let ctx = ValidationContext::build(&config, &catalog);
        RackCapacityRule::default().evaluate(&ctx).unwrap()
    }

    // -------------------------------------------------------------------------
    // RackRequired / ComponentExists
    // -------------------------------------------------------------------------

    #[test]
    fn test_rack_required() {
        let r = run(&RackRequiredRule, &RackConfiguration::new("t"));
        assert_eq!(
            r.errors,
            vec!["A base rack must be selected for the configuration"]
        );

        let r = run(&RackRequiredRule, &RackConfiguration::new("t").with_rack("  "));
        assert!(!r.passed);

        let r = run(&RackRequiredRule, &RackConfiguration::new("t").with_rack("RACK-99U"));
        assert_eq!(r.errors, vec!["Selected rack SKU is not valid: RACK-99U"]);

        let r = run(&RackRequiredRule, &RackConfiguration::new("t").with_rack("RACK-42U"));
        assert!(r.passed);
    }

    #[test]
    fn test_component_exists_one_error_per_sku() {
        let config = RackConfiguration::new("t")
            .with_item("SW-24", 1)
            .with_item("GHOST-1", 1)
            .with_item("GHOST-2", 1)
            .with_item("GHOST-1", 4);
        let r = run(&ComponentExistsRule, &config);
        assert_eq!(
            r.errors,
            vec![
                "Product not found in catalog: GHOST-1",
                "Product not found in catalog: GHOST-2"
            ]
        );
    }

    // -------------------------------------------------------------------------
    // MinimumPSU
    // -------------------------------------------------------------------------

    #[test]
    fn test_minimum_psu() {
        let config = RackConfiguration::new("t").with_item("SW-24", 2);
        let r = run(&MinimumPsuRule, &config);
        assert_eq!(
            r.errors,
            vec!["Configuration has 2 switch(es) that require power, but no PSU is configured"]
        );

        let config = RackConfiguration::new("t")
            .with_item("SW-24", 2)
            .with_item("PSU-1000", 1);
        assert!(run(&MinimumPsuRule, &config).passed);

        let config = RackConfiguration::new("t").with_item("CBL-DAC", 4);
        assert!(run(&MinimumPsuRule, &config).passed);
    }

    // -------------------------------------------------------------------------
    // PowerBudget
    // -------------------------------------------------------------------------

    #[test]
    fn test_power_budget_skipped_without_powered_gear() {
        let config = RackConfiguration::new("t").with_item("CBL-DAC", 4);
        let r = run(&PowerBudgetRule::default(), &config);
        assert!(r.passed);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_power_budget_no_psu() {
        let config = RackConfiguration::new("t").with_item("SW-24", 2);
        let r = run(&PowerBudgetRule::default(), &config);
        assert_eq!(
            r.errors,
            vec!["Configuration requires 700W of power but no PSU is configured"]
        );
    }

    #[test]
    fn test_power_budget_thresholds() {
        let below = power_fixture(799, 1000);
        assert!(below.passed);
        assert!(below.warnings.is_empty());

        let at = power_fixture(800, 1000);
        assert!(at.passed);
        assert_eq!(
            at.warnings,
            vec!["Power utilization at 80% (800W of 1000W) - consider additional PSU capacity"]
        );

        let full = power_fixture(1000, 1000);
        assert!(full.passed);
        assert_eq!(full.warnings.len(), 1);

        let over = power_fixture(1250, 1000);
        assert!(!over.passed);
        assert_eq!(
            over.errors,
            vec!["Power budget exceeded: 1250W required but only 1000W available (deficit: 250W)"]
        );
    }

    #[test]
    fn test_power_budget_compares_exact_ratio() {
        // 2399/3000 = 79.97%: displayed as 79 and below the boundary.
        assert!(power_fixture(2399, 3000).warnings.is_empty());
        // 2400/3000 = 80.00% exactly.
        assert_eq!(power_fixture(2400, 3000).warnings.len(), 1);
    }

    // -------------------------------------------------------------------------
    // RackCapacity
    // -------------------------------------------------------------------------

    #[test]
    fn test_rack_capacity_without_rack_passes() {
        let config = RackConfiguration::new("t").with_item("SW-24", 50);
        assert!(run(&RackCapacityRule::default(), &config).passed);
    }

    #[test]
    fn test_rack_capacity_unknown() {
        let rack = Product::new("RACK", "Rack", ProductType::Rack, Money::zero());
        let mut catalog = HashMap::new();
        catalog.insert("RACK".to_string(), rack);
        let config = RackConfiguration::new("t").with_rack("RACK");
        let ctx = ValidationContext::build(&config, &catalog);
        let r = RackCapacityRule::default().evaluate(&ctx).unwrap();
        assert_eq!(r.errors, vec!["Rack capacity information is not available"]);
    }

    #[test]
    fn test_rack_capacity_thresholds() {
        assert!(rack_fixture(37, 42).warnings.is_empty());

        let at = rack_fixture(9, 10);
        assert!(at.passed);
        assert_eq!(
            at.warnings,
            vec!["Rack utilization at 90% (9U of 10U) - limited space for expansion"]
        );

        let over = rack_fixture(45, 42);
        assert_eq!(
            over.errors,
            vec!["Rack capacity exceeded: 45U required but rack only has 42U (excess: 3U)"]
        );
    }

    #[test]
    fn test_rack_capacity_monotonic_in_units() {
        let mut failed = false;
        for used in 0..=60 {
            let passed = rack_fixture(used, 42).passed;
            if failed {
                assert!(!passed, "passed again at {}U after failing", used);
            }
            failed = !passed;
        }
        assert!(failed);
    }

    #[test]
    fn test_vertical_psu_uses_no_rack_units() {
        let config = RackConfiguration::new("t")
            .with_rack("RACK-24U")
            .with_item("PSU-VERT", 30);
        let catalog = catalog();
        let ctx = ValidationContext::build(&config, &catalog);
        assert_eq!(ctx.total_rack_units_used(), 0);
        assert_eq!(ctx.psu_count(), 30);
        assert_eq!(ctx.total_psu_capacity(), 90_000);
        assert!(RackCapacityRule::default().evaluate(&ctx).unwrap().passed);
    }

    // -------------------------------------------------------------------------
    // RedundantPSU
    // -------------------------------------------------------------------------

    #[test]
    fn test_redundant_psu_both_warnings() {
        // 3 × 350W = 1050W on one 2000W PSU: 52%
        let config = RackConfiguration::new("t")
            .with_item("SW-24", 3)
            .with_item("PSU-2000", 1);
        let r = run(&RedundantPsuRule::default(), &config);
        assert!(r.passed);
        assert_eq!(
            r.warnings,
            vec![
                "Configuration has 3 switches but only 1 PSU. Consider adding a redundant PSU for high availability.",
                "Single PSU at 52% utilization. Redundant PSU recommended for fault tolerance."
            ]
        );
    }

    #[test]
    fn test_redundant_psu_quiet_with_two_psus() {
        let config = RackConfiguration::new("t")
            .with_item("SW-24", 4)
            .with_item("PSU-1000", 2);
        let r = run(&RedundantPsuRule::default(), &config);
        assert!(r.passed);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_redundant_psu_half_load_is_not_over() {
        // 350W on 700W: exactly 50%, not more than 50%.
        let switch = Product::new("SW", "Switch", ProductType::Switch, Money::zero())
            .with_attribute("power_draw", 350);
        let psu = Product::new("PSU", "PSU", ProductType::Psu, Money::zero())
            .with_attribute("capacity_watts", 700);
        let mut catalog = HashMap::new();
        catalog.insert("SW".to_string(), switch);
        catalog.insert("PSU".to_string(), psu);
        let config = RackConfiguration::new("t").with_item("SW", 1).with_item("PSU", 1);
        let ctx = ValidationContext::build(&config, &catalog);
        let r = RedundantPsuRule::default().evaluate(&ctx).unwrap();
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn test_default_rules_order() {
        let names: Vec<(String, i32)> = default_rules(&ValidationSettings::default())
            .iter()
            .map(|r| (r.name().to_string(), r.order()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("RackRequired".to_string(), 1),
                ("ComponentExists".to_string(), 2),
                ("MinimumPSU".to_string(), 5),
                ("PowerBudget".to_string(), 10),
                ("RackCapacity".to_string(), 20),
                ("RedundantPSU".to_string(), 30),
            ]
        );
    }
}
