//! # Sample Catalog
//!
//! Development catalog of racks, switches, PSUs, cables and transceivers.
//! Every product carries the attributes the feasibility rules read
//! (`units`, `power_draw`, `capacity_watts`, `rack_units`).
//!
//! ## Contents
//! ```text
//! RACKS      RACK-42U-STD  RACK-24U-COMPACT
//! SWITCHES   SW-CATALYST-9300-24  SW-CATALYST-9300-48
//!            SW-NEXUS-9336C  SW-MERAKI-MS250-48
//! PSUs       PSU-1000W-PLAT  PSU-2000W-TITANIUM  PSU-3000W-MODULAR (0U)
//! CABLES     CBL-DAC-10G-3M  CBL-FIBER-LC-10M
//! OPTICS     SFP-10G-SR  SFP-10G-LR  QSFP-100G-SR4
//! ```

use tracing::info;

use rackcpq_core::{AttributeValue, Money, Product, ProductType};

use crate::store::InMemoryCatalog;

fn product(
    sku: &str,
    name: &str,
    description: &str,
    product_type: ProductType,
    dollars: i64,
    cents: i64,
) -> Product {
    Product::new(sku, name, product_type, Money::from_major_minor(dollars, cents))
        .with_description(description)
}

fn ports(names: &[&str]) -> AttributeValue {
    AttributeValue::List(names.iter().map(|n| AttributeValue::from(*n)).collect())
}

fn switch(sku: &str, name: &str, description: &str, dollars: i64, cents: i64) -> Product {
    product(sku, name, description, ProductType::Switch, dollars, cents)
        .with_attribute("rack_units", 1)
        .with_compatibility_rule("min_rack_units", 1)
        .with_compatibility_rule("requires_power", true)
}

fn psu(sku: &str, name: &str, description: &str, dollars: i64, cents: i64) -> Product {
    product(sku, name, description, ProductType::Psu, dollars, cents)
        .with_attribute("voltage", 220)
}

/// Builds the sample catalog.
pub fn sample_catalog() -> Vec<Product> {
    vec![
        // === RACKS ===
        product(
            "RACK-42U-STD",
            "42U Standard Server Rack",
            "Enterprise-grade 42U server rack with cable management",
            ProductType::Rack,
            2499,
            99,
        )
        .with_attribute("units", 42)
        .with_attribute("max_weight_kg", 1000)
        .with_attribute("depth_mm", 1000)
        .with_attribute("width_mm", 600)
        .with_attribute("power_slots", 2)
        .with_compatibility_rule("max_psu", 4),
        product(
            "RACK-24U-COMPACT",
            "24U Compact Server Rack",
            "Space-efficient 24U rack for smaller deployments",
            ProductType::Rack,
            1299,
            99,
        )
        .with_attribute("units", 24)
        .with_attribute("max_weight_kg", 500)
        .with_attribute("depth_mm", 800)
        .with_attribute("width_mm", 600)
        .with_attribute("power_slots", 2)
        .with_compatibility_rule("max_psu", 2),
        // === SWITCHES ===
        switch(
            "SW-CATALYST-9300-24",
            "Catalyst 9300 24-Port Switch",
            "Enterprise-class stackable switch with 24 ports",
            4599,
            99,
        )
        .with_attribute("ports", 24)
        .with_attribute("poe", true)
        .with_attribute("poe_budget_watts", 715)
        .with_attribute("power_draw", 350)
        .with_attribute("throughput_gbps", 10)
        .with_attribute("stackable", true),
        switch(
            "SW-CATALYST-9300-48",
            "Catalyst 9300 48-Port Switch",
            "Enterprise-class stackable switch with 48 ports",
            7299,
            99,
        )
        .with_attribute("ports", 48)
        .with_attribute("poe", true)
        .with_attribute("poe_budget_watts", 980)
        .with_attribute("power_draw", 450)
        .with_attribute("throughput_gbps", 10)
        .with_attribute("stackable", true),
        switch(
            "SW-NEXUS-9336C",
            "Nexus 9336C-FX2 Data Center Switch",
            "High-performance 36-port 100G data center switch",
            24999,
            99,
        )
        .with_attribute("ports", 36)
        .with_attribute("port_speed_gbps", 100)
        .with_attribute("poe", false)
        .with_attribute("power_draw", 650)
        .with_attribute("throughput_tbps", 7.2)
        .with_attribute("stackable", false),
        switch(
            "SW-MERAKI-MS250-48",
            "Meraki MS250-48 Cloud Managed Switch",
            "Cloud-managed 48-port Gigabit switch",
            5899,
            99,
        )
        .with_attribute("ports", 48)
        .with_attribute("poe", true)
        .with_attribute("poe_budget_watts", 370)
        .with_attribute("power_draw", 180)
        .with_attribute("throughput_gbps", 1)
        .with_attribute("cloud_managed", true),
        // === PSUs ===
        psu(
            "PSU-1000W-PLAT",
            "1000W Platinum Rack PDU",
            "High-efficiency 1000W power distribution unit",
            599,
            99,
        )
        .with_attribute("capacity_watts", 1000)
        .with_attribute("efficiency", "80_PLUS_PLATINUM")
        .with_attribute("outlets", 8)
        .with_attribute("rack_units", 1)
        .with_attribute("redundant", false),
        psu(
            "PSU-2000W-TITANIUM",
            "2000W Titanium Rack PDU",
            "Enterprise 2000W power distribution unit with monitoring",
            1299,
            99,
        )
        .with_attribute("capacity_watts", 2000)
        .with_attribute("efficiency", "80_PLUS_TITANIUM")
        .with_attribute("outlets", 16)
        .with_attribute("rack_units", 2)
        .with_attribute("redundant", true)
        .with_attribute("monitoring", true),
        psu(
            "PSU-3000W-MODULAR",
            "3000W Modular PDU System",
            "Modular high-capacity power distribution for data centers",
            2499,
            99,
        )
        .with_attribute("capacity_watts", 3000)
        .with_attribute("efficiency", "80_PLUS_TITANIUM")
        .with_attribute("outlets", 24)
        // vertical mount
        .with_attribute("rack_units", 0)
        .with_attribute("redundant", true)
        .with_attribute("monitoring", true)
        .with_attribute("modular", true),
        // === CABLES ===
        product(
            "CBL-DAC-10G-3M",
            "10G DAC Cable 3M",
            "Direct Attach Copper cable for 10G connections",
            ProductType::Cable,
            49,
            99,
        )
        .with_attribute("type", "DAC")
        .with_attribute("speed_gbps", 10)
        .with_attribute("length_meters", 3)
        .with_attribute("connector", "SFP+")
        .with_compatibility_rule("compatible_ports", ports(&["SFP+", "SFP28"])),
        product(
            "CBL-FIBER-LC-10M",
            "LC Fiber Patch Cable 10M",
            "OM4 multimode fiber patch cable with LC connectors",
            ProductType::Cable,
            34,
            99,
        )
        .with_attribute("type", "FIBER")
        .with_attribute("fiber_type", "OM4")
        .with_attribute("speed_gbps", 100)
        .with_attribute("length_meters", 10)
        .with_attribute("connector", "LC"),
        // === OPTICS ===
        product(
            "SFP-10G-SR",
            "10GBASE-SR SFP+ Module",
            "10G short-range multimode fiber transceiver",
            ProductType::SfpModule,
            149,
            99,
        )
        .with_attribute("speed_gbps", 10)
        .with_attribute("type", "SR")
        .with_attribute("wavelength_nm", 850)
        .with_attribute("max_distance_m", 300)
        .with_attribute("fiber_type", "MMF")
        .with_compatibility_rule("compatible_ports", ports(&["SFP+"])),
        product(
            "SFP-10G-LR",
            "10GBASE-LR SFP+ Module",
            "10G long-range single-mode fiber transceiver",
            ProductType::SfpModule,
            299,
            99,
        )
        .with_attribute("speed_gbps", 10)
        .with_attribute("type", "LR")
        .with_attribute("wavelength_nm", 1310)
        .with_attribute("max_distance_m", 10000)
        .with_attribute("fiber_type", "SMF")
        .with_compatibility_rule("compatible_ports", ports(&["SFP+"])),
        product(
            "QSFP-100G-SR4",
            "100GBASE-SR4 QSFP28 Module",
            "100G short-range multimode fiber transceiver",
            ProductType::SfpModule,
            599,
            99,
        )
        .with_attribute("speed_gbps", 100)
        .with_attribute("type", "SR4")
        .with_attribute("wavelength_nm", 850)
        .with_attribute("max_distance_m", 100)
        .with_attribute("fiber_type", "MMF")
        .with_attribute("lanes", 4)
        .with_compatibility_rule("compatible_ports", ports(&["QSFP28", "QSFP+"])),
    ]
}

/// Loads [`sample_catalog`] into an empty catalog. Returns how many
/// products were added; a catalog that already has data is left alone.
pub fn load_sample_catalog(catalog: &InMemoryCatalog) -> usize {
    if !catalog.is_empty() {
        info!(
            products = catalog.len(),
            "Catalog already contains data, skipping sample load"
        );
        return 0;
    }

    let products = sample_catalog();
    let count = products.len();
    for product in products {
        catalog.upsert(product);
    }
    info!(products = count, "Sample catalog loaded");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackcpq_core::ProductCatalog;

    #[test]
    fn test_load_once() {
        let catalog = InMemoryCatalog::new();
        assert_eq!(load_sample_catalog(&catalog), 14);
        assert_eq!(load_sample_catalog(&catalog), 0);
        assert_eq!(catalog.len(), 14);
        assert_eq!(catalog.list_by_type(ProductType::Switch).len(), 4);
        assert_eq!(catalog.list_by_type(ProductType::SfpModule).len(), 3);
    }

    #[test]
    fn test_rule_attributes_present() {
        let catalog = InMemoryCatalog::new();
        load_sample_catalog(&catalog);

        let rack = catalog.get_product_by_sku("RACK-42U-STD").unwrap();
        assert_eq!(rack.total_rack_units(), Some(42));
        assert_eq!(rack.base_price.cents(), 249_999);

        let nexus = catalog.get_product_by_sku("SW-NEXUS-9336C").unwrap();
        assert_eq!(nexus.power_draw(), Some(650));
        assert!(nexus.requires_power());

        let vertical = catalog.get_product_by_sku("PSU-3000W-MODULAR").unwrap();
        assert_eq!(vertical.capacity_watts(), Some(3000));
        assert_eq!(vertical.rack_units(), 0);

        let cable = catalog.get_product_by_sku("CBL-DAC-10G-3M").unwrap();
        assert!(!cable.requires_power());
    }
}
