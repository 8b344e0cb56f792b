//! # Pricing Strategies
//!
//! The standard strategy set, in execution order:
//!
//! | Order | Strategy        | Effect                                         |
//! |-------|-----------------|------------------------------------------------|
//! | 1     | BasePrice       | line items and subtotal                        |
//! | 10    | VolumeDiscount  | per-line discount on switches past a threshold |
//! | 20    | BundleDiscount  | order discount for a well-filled rack          |
//! | 30    | PartnerDiscount | order discount by customer tier                |
//! | 100   | SupportAddOn    | service add-on on the discounted hardware      |
//!
//! Order-level percentages are taken of the running discounted subtotal,
//! so later discounts compound on earlier ones.

use tracing::debug;

use crate::catalog::ProductType;
use crate::money::{Money, Percentage};
use crate::settings::PricingSettings;

use super::context::{CustomerTier, PricingContext};
use super::result::PricingResult;
use super::{PricingStrategy, StrategyFailure};

/// Option key that turns on the support add-on.
pub const INCLUDE_SUPPORT_OPTION: &str = "include_support";

/// Option key selecting `STANDARD` or `PREMIUM` support.
pub const SUPPORT_TIER_OPTION: &str = "support_tier";

/// The five standard strategies configured from `settings`.
pub fn default_strategies(settings: &PricingSettings) -> Vec<Box<dyn PricingStrategy>> {
    vec![
        Box::new(BasePriceStrategy),
        Box::new(VolumeDiscountStrategy::new(
            settings.volume_threshold,
            settings.volume_discount(),
        )),
        Box::new(BundleDiscountStrategy::new(
            settings.bundle_utilization_threshold,
            settings.bundle_discount(),
        )),
        Box::new(PartnerDiscountStrategy::new(
            settings.partner_discount(),
            settings.enterprise_discount(),
        )),
        Box::new(SupportAddOnStrategy::new(
            settings.support_standard(),
            settings.support_premium(),
        )),
    ]
}

// =============================================================================
// Base Price
// =============================================================================

/// Copies the context's lines into the result.
#[derive(Debug, Default)]
pub struct BasePriceStrategy;

impl PricingStrategy for BasePriceStrategy {
    fn name(&self) -> &str {
        "BasePrice"
    }

    fn order(&self) -> i32 {
        1
    }

    fn description(&self) -> &str {
        "Prices every resolved component at its catalog base price"
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure> {
        let mut next = current.clone();
        next.set_line_items(ctx.line_items.clone());
        next.record_strategy(self.name());
        Ok(next)
    }
}

// =============================================================================
// Volume Discount
// =============================================================================

/// Discounts every SWITCH line once the switch count exceeds a threshold.
#[derive(Debug)]
pub struct VolumeDiscountStrategy {
    switch_threshold: i64,
    discount: Percentage,
}

impl VolumeDiscountStrategy {
    pub fn new(switch_threshold: i64, discount: Percentage) -> Self {
        VolumeDiscountStrategy {
            switch_threshold,
            discount,
        }
    }
}

impl Default for VolumeDiscountStrategy {
    fn default() -> Self {
        let settings = PricingSettings::default();
        Self::new(settings.volume_threshold, settings.volume_discount())
    }
}

impl PricingStrategy for VolumeDiscountStrategy {
    fn name(&self) -> &str {
        "VolumeDiscount"
    }

    fn order(&self) -> i32 {
        10
    }

    fn description(&self) -> &str {
        "Percentage off switch lines when more than the threshold are purchased"
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure> {
        let switch_count = ctx.switch_quantity();
        if switch_count <= self.switch_threshold {
            return Ok(current.clone());
        }

        let mut next = current.clone();
        let reason = format!(
            "Volume discount: {} off (>{} switches)",
            self.discount, self.switch_threshold
        );

        let switch_lines: Vec<(usize, Money)> = next
            .line_items()
            .iter()
            .enumerate()
            .filter(|(_, line)| line.product_type == ProductType::Switch)
            .map(|(index, line)| (index, line.line_total.percent_of(self.discount)))
            .collect();

        let mut saved = Money::zero();
        for (index, amount) in switch_lines {
            if next.add_line_discount(index, amount, reason.clone()) {
                saved += amount;
            }
        }

        if saved.is_positive() {
            next.add_description(format!(
                "Volume discount: {} off switches (purchased {}, threshold {}) - saved {}",
                self.discount, switch_count, self.switch_threshold, saved
            ));
            next.record_strategy(self.name());
        }
        Ok(next)
    }
}

// =============================================================================
// Bundle Discount
// =============================================================================

/// Order discount when the rack is filled to at least a threshold.
#[derive(Debug)]
pub struct BundleDiscountStrategy {
    utilization_threshold: i64,
    discount: Percentage,
}

impl BundleDiscountStrategy {
    pub fn new(utilization_threshold: i64, discount: Percentage) -> Self {
        BundleDiscountStrategy {
            utilization_threshold,
            discount,
        }
    }
}

impl Default for BundleDiscountStrategy {
    fn default() -> Self {
        let settings = PricingSettings::default();
        Self::new(settings.bundle_utilization_threshold, settings.bundle_discount())
    }
}

impl PricingStrategy for BundleDiscountStrategy {
    fn name(&self) -> &str {
        "BundleDiscount"
    }

    fn order(&self) -> i32 {
        20
    }

    fn description(&self) -> &str {
        "Percentage off the order when the rack is well utilized"
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure> {
        let Some(utilization) = ctx.rack_utilization else {
            return Ok(current.clone());
        };
        if !utilization.reaches(self.utilization_threshold) {
            debug!(
                configuration_id = %ctx.configuration_id,
                units_used = utilization.units_used,
                capacity = utilization.capacity,
                "Rack below bundle threshold"
            );
            return Ok(current.clone());
        }

        let mut next = current.clone();
        let amount = next.discounted_subtotal().percent_of(self.discount);
        next.add_order_discount(amount);
        next.add_description(format!(
            "Bundle discount: {} off (rack {}% utilized, threshold {}%) - saved {}",
            self.discount,
            utilization.percent().unwrap_or(0),
            self.utilization_threshold,
            amount
        ));
        next.record_strategy(self.name());
        Ok(next)
    }
}

// =============================================================================
// Partner Discount
// =============================================================================

/// Order discount for PARTNER and ENTERPRISE customers.
#[derive(Debug)]
pub struct PartnerDiscountStrategy {
    partner: Percentage,
    enterprise: Percentage,
}

impl PartnerDiscountStrategy {
    pub fn new(partner: Percentage, enterprise: Percentage) -> Self {
        PartnerDiscountStrategy {
            partner,
            enterprise,
        }
    }
}

impl Default for PartnerDiscountStrategy {
    fn default() -> Self {
        let settings = PricingSettings::default();
        Self::new(settings.partner_discount(), settings.enterprise_discount())
    }
}

impl PricingStrategy for PartnerDiscountStrategy {
    fn name(&self) -> &str {
        "PartnerDiscount"
    }

    fn order(&self) -> i32 {
        30
    }

    fn description(&self) -> &str {
        "Tier discount for partner and enterprise customers"
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure> {
        let (label, pct) = match ctx.customer_tier {
            Some(CustomerTier::Partner) => ("Partner", self.partner),
            Some(CustomerTier::Enterprise) => ("Enterprise", self.enterprise),
            Some(CustomerTier::Standard) | None => return Ok(current.clone()),
        };

        let mut next = current.clone();
        let amount = next.discounted_subtotal().percent_of(pct);
        next.add_order_discount(amount);
        next.add_description(format!(
            "{} tier discount: {} off - saved {}",
            label, pct, amount
        ));
        next.record_strategy(self.name());
        Ok(next)
    }
}

// =============================================================================
// Support Add-On
// =============================================================================

/// 24/7 support priced as a share of the discounted hardware total.
#[derive(Debug)]
pub struct SupportAddOnStrategy {
    standard: Percentage,
    premium: Percentage,
}

impl SupportAddOnStrategy {
    pub fn new(standard: Percentage, premium: Percentage) -> Self {
        SupportAddOnStrategy { standard, premium }
    }
}

impl Default for SupportAddOnStrategy {
    fn default() -> Self {
        let settings = PricingSettings::default();
        Self::new(settings.support_standard(), settings.support_premium())
    }
}

impl PricingStrategy for SupportAddOnStrategy {
    fn name(&self) -> &str {
        "SupportAddOn"
    }

    fn order(&self) -> i32 {
        100
    }

    fn description(&self) -> &str {
        "Adds standard or premium support as a share of hardware"
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure> {
        if !ctx.options.flag(INCLUDE_SUPPORT_OPTION) {
            return Ok(current.clone());
        }

        let premium = ctx
            .options
            .text(SUPPORT_TIER_OPTION)?
            .is_some_and(|tier| tier.eq_ignore_ascii_case("PREMIUM"));
        let (label, pct) = if premium {
            ("Premium", self.premium)
        } else {
            ("Standard", self.standard)
        };

        let mut next = current.clone();
        let hardware = next.discounted_subtotal();
        let cost = hardware.percent_of(pct);
        next.set_service_add_on(cost);
        next.add_description(format!(
            "24/7 {} Support: {} of hardware ({}) = {}",
            label, pct, hardware, cost
        ));
        next.record_strategy(self.name());
        Ok(next)
    }
}
