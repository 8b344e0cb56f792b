//! # rackcpq-core: Configure-Price-Quote Logic for Server Racks
//!
//! Pure domain crate: money, products, rack configurations, the two rule
//! pipelines and the quote snapshot. Nothing here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        RackCPQ Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/rackcpq-demo                            │   │
//! │  │    configure ──► validate ──► price ──► quote ──► document      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    rackcpq-service                              │   │
//! │  │    stores, services, document worker, config loading            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rackcpq-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │  catalog  │  │validation │  │  pricing  │  │   quote   │   │   │
//! │  │   │  Product  │  │   rules   │  │strategies │  │ snapshot  │   │   │
//! │  │   │  config   │  │  summary  │  │  result   │  │ numbering │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO ASYNC • NO NETWORK                                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cent money and basis-point percentages
//! - [`catalog`] - Products, typed attributes, the `ProductCatalog` lookup
//! - [`configuration`] - Rack configurations and their lifecycle
//! - [`validation`] - Feasibility rule pipeline
//! - [`pricing`] - Price adjustment strategy pipeline
//! - [`quote`] - Immutable quote snapshots
//! - [`numbering`] - Per-day quote numbers
//! - [`settings`] - Thresholds and rates for the pipelines
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use std::collections::HashMap;
//! use rackcpq_core::{
//!     ConfigurationValidator, PricingContext, PricingEngine, PricingRequest, Product,
//!     ProductType, RackConfiguration,
//! };
//! use rackcpq_core::money::Money;
//!
//! let mut catalog = HashMap::new();
//! for product in [
//!     Product::new("RACK-42U", "42U Rack", ProductType::Rack, Money::from_cents(249_999))
//!         .with_attribute("units", 42),
//!     Product::new("SW-24", "24-port switch", ProductType::Switch, Money::from_cents(459_999))
//!         .with_attribute("power_draw", 350)
//!         .with_attribute("rack_units", 1),
//!     Product::new("PSU-2000", "2kW PSU", ProductType::Psu, Money::from_cents(129_999))
//!         .with_attribute("capacity_watts", 2000)
//!         .with_attribute("rack_units", 2),
//! ] {
//!     catalog.insert(product.sku.clone(), product);
//! }
//!
//! let mut config = RackConfiguration::new("Edge POP")
//!     .with_rack("RACK-42U")
//!     .with_item("SW-24", 2)
//!     .with_item("PSU-2000", 1);
//!
//! let summary = ConfigurationValidator::default().validate(&config, &catalog);
//! assert!(summary.valid);
//! config.record_validation(&summary);
//!
//! let request = PricingRequest::new(config.id.clone()).with_customer_tier("PARTNER");
//! let ctx = PricingContext::from_configuration(&config, &catalog, &request);
//! let price = PricingEngine::default().price(&ctx);
//!
//! // $12,999.96 less 15% partner discount
//! assert_eq!(price.subtotal().cents(), 1_299_996);
//! assert_eq!(price.grand_total().cents(), 1_104_997);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod configuration;
pub mod error;
pub mod money;
pub mod numbering;
pub mod pricing;
pub mod quote;
pub mod settings;
pub mod validation;

mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{AttributeValue, Product, ProductCatalog, ProductType};
pub use configuration::{ConfigurationItem, ConfigurationStatus, RackConfiguration};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percentage};
pub use numbering::{Clock, ManualClock, QuoteNumberGenerator, SystemClock};
pub use pricing::{
    CustomerTier, PricingContext, PricingEngine, PricingLineItem, PricingOptions,
    PricingRequest, PricingResult, PricingStrategy, StrategyFailure,
};
pub use quote::{CustomerInfo, Quote, QuoteLineItem, QuoteStatus};
pub use settings::{PricingSettings, QuoteSettings, ValidationSettings};
pub use validation::{
    ConfigurationRule, ConfigurationValidator, RuleFailure, RuleResult, ValidationSummary,
};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Longest SKU accepted when adding a component.
pub const MAX_SKU_LENGTH: usize = 64;

/// Longest configuration name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Maximum quantity of a single configuration item
///
/// ## Business Reason
/// Catches fat-fingered quantities (typing 10000 instead of 10) before
/// they reach pricing.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;
