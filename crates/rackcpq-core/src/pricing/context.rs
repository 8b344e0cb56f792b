//! Pricing inputs: resolved line items, customer tier, options.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::catalog::{Product, ProductCatalog, ProductType};
use crate::configuration::RackConfiguration;
use crate::error::ValidationError;
use crate::money::Money;

use super::StrategyFailure;

// =============================================================================
// Customer Tier
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerTier {
    Standard,
    Partner,
    Enterprise,
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CustomerTier::Standard => "STANDARD",
            CustomerTier::Partner => "PARTNER",
            CustomerTier::Enterprise => "ENTERPRISE",
        };
        f.write_str(s)
    }
}

/// Case-insensitive: `partner`, `Partner` and `PARTNER` all parse.
impl FromStr for CustomerTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STANDARD" => Ok(CustomerTier::Standard),
            "PARTNER" => Ok(CustomerTier::Partner),
            "ENTERPRISE" => Ok(CustomerTier::Enterprise),
            _ => Err(ValidationError::NotAllowed {
                field: "customer_tier".to_string(),
                allowed: vec![
                    "STANDARD".to_string(),
                    "PARTNER".to_string(),
                    "ENTERPRISE".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One priced component line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingLineItem {
    pub sku: String,
    pub name: String,
    pub product_type: ProductType,
    pub quantity: u32,
    pub unit_price: Money,
    /// unit_price × quantity
    pub line_total: Money,
    pub discount_amount: Money,
    pub discount_reason: Option<String>,
}

impl PricingLineItem {
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        product_type: ProductType,
        quantity: u32,
        unit_price: Money,
    ) -> Self {
        PricingLineItem {
            sku: sku.into(),
            name: name.into(),
            product_type,
            quantity,
            unit_price,
            line_total: unit_price.multiply_quantity(quantity as i64),
            discount_amount: Money::zero(),
            discount_reason: None,
        }
    }

    pub fn from_product(product: &Product, quantity: u32) -> Self {
        PricingLineItem::new(
            product.sku.clone(),
            product.name.clone(),
            product.product_type,
            quantity,
            product.base_price,
        )
    }

    /// Line total after this line's own discount.
    pub fn final_total(&self) -> Money {
        self.line_total - self.discount_amount
    }
}

// =============================================================================
// Options
// =============================================================================

/// Free-form pricing switches (`include_support`, `support_tier`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingOptions(BTreeMap<String, serde_json::Value>);

impl PricingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// True only for a JSON `true`; strings like `"true"` do not count.
    pub fn flag(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(serde_json::Value::Bool(true)))
    }

    /// A string option. Present but not a string is malformed.
    pub fn text(&self, key: &str) -> Result<Option<&str>, StrategyFailure> {
        match self.0.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(StrategyFailure::MalformedOption {
                key: key.to_string(),
                reason: format!("expected a string, got {}", other),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Request
// =============================================================================

/// What a caller asks to price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub configuration_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    /// Raw tier; unknown values price as if absent.
    #[serde(default)]
    pub customer_tier: Option<String>,
    #[serde(default)]
    pub options: PricingOptions,
    /// Overrides the units derived from the catalog. Leaving it out does
    /// not disable the bundle discount; the rack's own figures apply then.
    #[serde(default)]
    pub rack_units_used: Option<i64>,
    #[serde(default)]
    pub rack_capacity: Option<i64>,
}

impl PricingRequest {
    pub fn new(configuration_id: impl Into<String>) -> Self {
        PricingRequest {
            configuration_id: configuration_id.into(),
            ..Default::default()
        }
    }

    pub fn with_customer_tier(mut self, tier: impl Into<String>) -> Self {
        self.customer_tier = Some(tier.into());
        self
    }

    pub fn with_options(mut self, options: PricingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_rack_utilization(mut self, units_used: i64, capacity: i64) -> Self {
        self.rack_units_used = Some(units_used);
        self.rack_capacity = Some(capacity);
        self
    }
}

// =============================================================================
// Context
// =============================================================================

/// Rack units used against rack capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackUtilization {
    pub units_used: i64,
    pub capacity: i64,
}

impl RackUtilization {
    /// Truncated percent, unknown when capacity is not positive.
    pub fn percent(&self) -> Option<i64> {
        (self.capacity > 0).then(|| {
            let percent = i128::from(self.units_used) * 100 / i128::from(self.capacity);
            percent.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
        })
    }

    /// Exact `units_used / capacity ≥ threshold%` without rounding.
    pub fn reaches(&self, threshold_percent: i64) -> bool {
        self.capacity > 0
            && i128::from(self.units_used) * 100
                >= i128::from(threshold_percent) * i128::from(self.capacity)
    }
}

/// Everything a strategy may read, fully resolved before the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    pub configuration_id: String,
    pub customer_id: Option<String>,
    pub customer_tier: Option<CustomerTier>,
    pub line_items: Vec<PricingLineItem>,
    pub options: PricingOptions,
    pub rack_utilization: Option<RackUtilization>,
}

impl PricingContext {
    pub fn new(configuration_id: impl Into<String>, line_items: Vec<PricingLineItem>) -> Self {
        PricingContext {
            configuration_id: configuration_id.into(),
            customer_id: None,
            customer_tier: None,
            line_items,
            options: PricingOptions::default(),
            rack_utilization: None,
        }
    }

    /// Resolves a configuration into priced lines.
    ///
    /// One line per configuration item whose SKU resolves, priced at the
    /// product's base price, then the rack as a single line. Unknown SKUs
    /// are logged and left out. Utilization figures on the request win over
    /// the ones derived from the catalog.
    pub fn from_configuration<C: ProductCatalog + ?Sized>(
        configuration: &RackConfiguration,
        catalog: &C,
        request: &PricingRequest,
    ) -> Self {
        let mut line_items = Vec::with_capacity(configuration.items().len() + 1);
        let mut units_used: i64 = 0;

        for item in configuration.items() {
            match catalog.get_product_by_sku(&item.product_sku) {
                Some(product) => {
                    units_used = units_used
                        .saturating_add(product.rack_units().saturating_mul(item.quantity as i64));
                    line_items.push(PricingLineItem::from_product(&product, item.quantity));
                }
                None => warn!(
                    configuration_id = %configuration.id,
                    sku = %item.product_sku,
                    "Product not found in catalog, leaving it out of pricing"
                ),
            }
        }

        let mut derived_utilization = None;
        if let Some(rack) = configuration
            .rack_sku()
            .and_then(|sku| catalog.get_product_by_sku(sku))
        {
            derived_utilization = Some(RackUtilization {
                units_used,
                capacity: rack.total_rack_units().unwrap_or(0),
            });
            line_items.push(PricingLineItem::from_product(&rack, 1));
        }

        let customer_tier = request.customer_tier.as_deref().and_then(|raw| {
            raw.parse::<CustomerTier>()
                .map_err(|_| debug!(tier = raw, "Unknown customer tier, pricing without one"))
                .ok()
        });

        let rack_utilization = match (request.rack_units_used, request.rack_capacity) {
            (Some(units_used), Some(capacity)) => Some(RackUtilization {
                units_used,
                capacity,
            }),
            _ => derived_utilization,
        };

        PricingContext {
            configuration_id: configuration.id.clone(),
            customer_id: request
                .customer_id
                .clone()
                .or_else(|| configuration.customer_id.clone()),
            customer_tier,
            line_items,
            options: request.options.clone(),
            rack_utilization,
        }
    }

    pub fn with_customer_tier(mut self, tier: CustomerTier) -> Self {
        self.customer_tier = Some(tier);
        self
    }

    pub fn with_options(mut self, options: PricingOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_rack_utilization(mut self, units_used: i64, capacity: i64) -> Self {
        self.rack_utilization = Some(RackUtilization {
            units_used,
            capacity,
        });
        self
    }

    /// Σ quantity over SWITCH lines.
    pub fn switch_quantity(&self) -> i64 {
        self.line_items
            .iter()
            .filter(|l| l.product_type == ProductType::Switch)
            .map(|l| l.quantity as i64)
            .fold(0, i64::saturating_add)
    }

    pub fn rack_utilization_percent(&self) -> Option<i64> {
        self.rack_utilization.and_then(|u| u.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{catalog, feasible_configuration};

    #[test]
    fn test_tier_parsing_is_case_insensitive() {
        assert_eq!("partner".parse::<CustomerTier>().unwrap(), CustomerTier::Partner);
        assert_eq!("Enterprise".parse::<CustomerTier>().unwrap(), CustomerTier::Enterprise);
        assert!("gold".parse::<CustomerTier>().is_err());
    }

    #[test]
    fn test_line_item_totals() {
        let line = PricingLineItem::new("SW", "Switch", ProductType::Switch, 3, Money::from_cents(1000));
        assert_eq!(line.line_total.cents(), 3000);
        assert_eq!(line.final_total().cents(), 3000);
    }

    #[test]
    fn test_options() {
        let options = PricingOptions::new()
            .with("include_support", true)
            .with("as_string", "true")
            .with("support_tier", "PREMIUM")
            .with("bad_tier", 3);
        assert!(options.flag("include_support"));
        assert!(!options.flag("as_string"));
        assert!(!options.flag("missing"));
        assert_eq!(options.text("support_tier").unwrap(), Some("PREMIUM"));
        assert_eq!(options.text("missing").unwrap(), None);
        assert!(options.text("bad_tier").is_err());
    }

    #[test]
    fn test_from_configuration() {
        let config = feasible_configuration()
            .with_item("GHOST-1", 2)
            .for_customer("cust-9");
        let request = PricingRequest::new(config.id.clone())
            .with_customer_tier("partner")
            .with_rack_utilization(40, 42);
        let ctx = PricingContext::from_configuration(&config, &catalog(), &request);

        let skus: Vec<&str> = ctx.line_items.iter().map(|l| l.sku.as_str()).collect();
        assert_eq!(skus, vec!["SW-24", "PSU-2000", "RACK-42U"]);
        assert_eq!(ctx.line_items[2].quantity, 1);
        assert_eq!(ctx.customer_tier, Some(CustomerTier::Partner));
        assert_eq!(ctx.customer_id.as_deref(), Some("cust-9"));
        assert_eq!(ctx.switch_quantity(), 2);
        assert_eq!(ctx.rack_utilization_percent(), Some(95));
    }

    #[test]
    fn test_unknown_tier_is_absent() {
        let config = feasible_configuration();
        let request = PricingRequest::new(config.id.clone()).with_customer_tier("platinum");
        let ctx = PricingContext::from_configuration(&config, &catalog(), &request);
        assert_eq!(ctx.customer_tier, None);
        // SW-24 x2 at 1U plus PSU-2000 at 2U in a 42U rack.
        assert_eq!(
            ctx.rack_utilization,
            Some(RackUtilization {
                units_used: 4,
                capacity: 42
            })
        );
    }

    #[test]
    fn test_omitted_figures_still_qualify_for_bundle() {
        let config = RackConfiguration::new("dense")
            .with_rack("RACK-24U")
            .with_item("SW-48", 20)
            .with_item("PSU-2000", 1);
        let request = PricingRequest::new(config.id.clone());
        let ctx = PricingContext::from_configuration(&config, &catalog(), &request);

        let utilization = ctx.rack_utilization.unwrap();
        assert_eq!(utilization.percent(), Some(91));
        assert!(utilization.reaches(80));
    }

    #[test]
    fn test_no_rack_means_unknown_utilization() {
        let config = RackConfiguration::new("loose").with_item("SW-24", 1);
        let request = PricingRequest::new(config.id.clone());
        let ctx = PricingContext::from_configuration(&config, &catalog(), &request);
        assert_eq!(ctx.line_items.len(), 1);
        assert_eq!(ctx.rack_utilization, None);
        assert_eq!(ctx.rack_utilization_percent(), None);
    }

    #[test]
    fn test_rack_utilization_reaches() {
        let u = RackUtilization {
            units_used: 4,
            capacity: 5,
        };
        assert!(u.reaches(80));
        assert!(!u.reaches(81));
        assert_eq!(u.percent(), Some(80));

        let unknown = RackUtilization {
            units_used: 4,
            capacity: 0,
        };
        assert_eq!(unknown.percent(), None);
        assert!(!unknown.reaches(1));

        let huge = RackUtilization {
            units_used: i64::MAX / 2,
            capacity: i64::MAX,
        };
        assert!(huge.reaches(49));
        assert!(!huge.reaches(50));
        assert_eq!(huge.percent(), Some(49));
    }
}
