//! Read-only view over one configuration and its resolved products.

use std::collections::HashMap;
use tracing::debug;

use crate::catalog::{Product, ProductCatalog, ProductType};
use crate::configuration::{ConfigurationItem, RackConfiguration};

use super::result::CapacityMetrics;

/// Everything a rule may look at, gathered once before the run.
///
/// Unresolved SKUs are simply absent from `products`; whether that is a
/// problem is for the rules to say.
#[derive(Debug, Clone)]
pub struct ValidationContext<'a> {
    configuration: &'a RackConfiguration,
    rack: Option<Product>,
    products: HashMap<String, Product>,
}

impl<'a> ValidationContext<'a> {
    /// Resolves the rack SKU and every distinct item SKU against the
    /// catalog.
    pub fn build<C: ProductCatalog + ?Sized>(
        configuration: &'a RackConfiguration,
        catalog: &C,
    ) -> Self {
        let rack = configuration
            .rack_sku()
            .filter(|sku| !sku.trim().is_empty())
            .and_then(|sku| catalog.get_product_by_sku(sku));

        let mut products = HashMap::new();
        for sku in configuration.distinct_skus() {
            if let Some(product) = catalog.get_product_by_sku(sku) {
                products.insert(sku.to_string(), product);
            }
        }

        debug!(
            configuration_id = %configuration.id,
            resolved = products.len(),
            rack_resolved = rack.is_some(),
            "Built validation context"
        );

        ValidationContext {
            configuration,
            rack,
            products,
        }
    }

    /// Assembles a context from already-resolved data.
    pub fn from_parts(
        configuration: &'a RackConfiguration,
        rack: Option<Product>,
        products: HashMap<String, Product>,
    ) -> Self {
        ValidationContext {
            configuration,
            rack,
            products,
        }
    }

    pub fn configuration(&self) -> &RackConfiguration {
        self.configuration
    }

    pub fn rack(&self) -> Option<&Product> {
        self.rack.as_ref()
    }

    pub fn product(&self, sku: &str) -> Option<&Product> {
        self.products.get(sku)
    }

    pub fn items(&self) -> &[ConfigurationItem] {
        self.configuration.items()
    }

    /// Items paired with their resolved product, unresolved ones skipped.
    fn resolved_items(&self) -> impl Iterator<Item = (&ConfigurationItem, &Product)> + '_ {
        self.items()
            .iter()
            .filter_map(|item| self.product(&item.product_sku).map(|p| (item, p)))
    }

    /// Σ power_draw × quantity over items whose product declares a draw.
    /// Saturates at the `i64` bounds.
    pub fn total_power_draw(&self) -> i64 {
        self.resolved_items()
            .filter_map(|(item, p)| {
                p.power_draw()
                    .map(|w| w.saturating_mul(item.quantity as i64))
            })
            .fold(0, i64::saturating_add)
    }

    /// Σ capacity_watts × quantity over PSU items.
    pub fn total_psu_capacity(&self) -> i64 {
        self.resolved_items()
            .filter(|(_, p)| p.is_type(ProductType::Psu))
            .filter_map(|(item, p)| {
                p.capacity_watts()
                    .map(|w| w.saturating_mul(item.quantity as i64))
            })
            .fold(0, i64::saturating_add)
    }

    /// Σ rack_units × quantity; vertical-mount gear contributes 0.
    pub fn total_rack_units_used(&self) -> i64 {
        self.resolved_items()
            .map(|(item, p)| p.rack_units().saturating_mul(item.quantity as i64))
            .fold(0, i64::saturating_add)
    }

    /// The rack's total units, 0 when the rack or its attribute is missing.
    pub fn rack_capacity(&self) -> i64 {
        self.rack
            .as_ref()
            .and_then(Product::total_rack_units)
            .unwrap_or(0)
    }

    pub fn has_powered_components(&self) -> bool {
        self.resolved_items().any(|(_, p)| p.requires_power())
    }

    /// Σ quantity over items of the given type.
    pub fn count_by_type(&self, product_type: ProductType) -> i64 {
        self.resolved_items()
            .filter(|(_, p)| p.is_type(product_type))
            .map(|(item, _)| item.quantity as i64)
            .fold(0, i64::saturating_add)
    }

    pub fn switch_count(&self) -> i64 {
        self.count_by_type(ProductType::Switch)
    }

    pub fn psu_count(&self) -> i64 {
        self.count_by_type(ProductType::Psu)
    }

    /// Aggregate figures attached to every summary.
    pub fn metrics(&self) -> CapacityMetrics {
        CapacityMetrics {
            total_power_draw_watts: self.total_power_draw(),
            total_psu_capacity_watts: self.total_psu_capacity(),
            total_rack_units_used: self.total_rack_units_used(),
            rack_capacity_units: self.rack_capacity(),
        }
    }
}
