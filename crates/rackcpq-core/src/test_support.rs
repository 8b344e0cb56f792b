//! Small fixed catalog shared by the unit tests.

use std::collections::HashMap;

use crate::catalog::{Product, ProductType};
use crate::configuration::RackConfiguration;
use crate::money::Money;

fn product(sku: &str, product_type: ProductType, cents: i64) -> Product {
    Product::new(sku, sku, product_type, Money::from_cents(cents))
}

pub(crate) fn catalog() -> HashMap<String, Product> {
    let products = vec![
        product("RACK-42U", ProductType::Rack, 249_999).with_attribute("units", 42),
        product("RACK-24U", ProductType::Rack, 149_999).with_attribute("units", 24),
        product("SW-24", ProductType::Switch, 459_999)
            .with_attribute("power_draw", 350)
            .with_attribute("rack_units", 1),
        product("SW-48", ProductType::Switch, 729_999)
            .with_attribute("power_draw", 450)
            .with_attribute("rack_units", 1),
        product("PSU-1000", ProductType::Psu, 59_999)
            .with_attribute("capacity_watts", 1000)
            .with_attribute("rack_units", 1),
        product("PSU-2000", ProductType::Psu, 129_999)
            .with_attribute("capacity_watts", 2000)
            .with_attribute("rack_units", 2),
        product("PSU-VERT", ProductType::Psu, 249_999)
            .with_attribute("capacity_watts", 3000)
            .with_attribute("rack_units", 0),
        product("CBL-DAC", ProductType::Cable, 4_999),
    ];
    products.into_iter().map(|p| (p.sku.clone(), p)).collect()
}

/// RACK-42U with two SW-24 on one PSU-2000: 700W of 2000W, 4U of 42U.
pub(crate) fn feasible_configuration() -> RackConfiguration {
    RackConfiguration::new("Feasible")
        .with_rack("RACK-42U")
        .with_item("SW-24", 2)
        .with_item("PSU-2000", 1)
}
