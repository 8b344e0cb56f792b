//! # RackCPQ Demo
//!
//! Runs one configuration through the whole configure/price/quote flow
//! against the sample catalog and prints what each step produced.
//!
//! ```text
//! rackcpq-demo [CONFIG_PATH]
//!
//!   CONFIG_PATH   rackcpq.toml to load (default: platform config dir)
//!   RUST_LOG      overrides [logging] filter
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use rackcpq_core::pricing::strategies::{INCLUDE_SUPPORT_OPTION, SUPPORT_TIER_OPTION};
use rackcpq_core::{PricingOptions, PricingRequest, SystemClock};
use rackcpq_service::{
    seed, AddComponent, AppConfig, Backend, CreateQuoteRequest, InMemoryCatalog,
    NewConfiguration, QuoteEvent,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = AppConfig::load(config_path).context("loading rackcpq.toml")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting RackCPQ demo");

    let catalog = InMemoryCatalog::new();
    seed::load_sample_catalog(&catalog);

    let backend = Backend::start(&config, catalog, Arc::new(SystemClock));
    let mut ready = backend.subscribe();

    // -------------------------------------------------------------------------
    // Configure
    // -------------------------------------------------------------------------
    let configuration = backend.configurations.create(NewConfiguration {
        name: "Branch Office Core".to_string(),
        description: Some("Two access switches, redundant power".to_string()),
        customer_id: Some("CUST-0042".to_string()),
        rack_sku: Some("RACK-42U-STD".to_string()),
    })?;
    let id = configuration.id.clone();

    for (sku, quantity) in [
        ("SW-CATALYST-9300-48", 6),
        ("PSU-2000W-TITANIUM", 2),
        ("CBL-DAC-10G-3M", 12),
        ("SFP-10G-SR", 4),
    ] {
        backend
            .configurations
            .add_component(&id, AddComponent::new(sku, quantity))?;
    }

    // -------------------------------------------------------------------------
    // Validate
    // -------------------------------------------------------------------------
    let summary = backend.configurations.validate(&id)?;
    println!(
        "Validation: valid={} power={}% rack={}%",
        summary.valid, summary.power_utilization_percent, summary.rack_utilization_percent
    );
    for result in &summary.rule_results {
        let state = if result.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {}", state, result.rule_name);
        for error in &result.errors {
            println!("      error: {}", error);
        }
        for warning in &result.warnings {
            println!("      warning: {}", warning);
        }
    }
    if !summary.valid {
        bail!("configuration {} is not feasible", id);
    }

    // -------------------------------------------------------------------------
    // Price
    // -------------------------------------------------------------------------
    let options = PricingOptions::new()
        .with(INCLUDE_SUPPORT_OPTION, true)
        .with(SUPPORT_TIER_OPTION, "PREMIUM");
    let price = backend.pricing.calculate_price(
        &PricingRequest::new(id.clone())
            .with_customer_tier("PARTNER")
            .with_options(options),
    )?;
    println!(
        "Pricing: subtotal={} discount={} support={} total={} {}",
        price.subtotal(),
        price.total_discount(),
        price.service_add_on(),
        price.grand_total(),
        price.currency()
    );
    for description in price.discount_descriptions() {
        println!("  {}", description);
    }

    // -------------------------------------------------------------------------
    // Quote
    // -------------------------------------------------------------------------
    let quote = backend
        .quotes
        .create_quote(CreateQuoteRequest {
            customer_name: Some("Northwind Traders".to_string()),
            customer_email: Some("procurement@northwind.example".to_string()),
            customer_tier: Some("PARTNER".to_string()),
            include_support: true,
            support_tier: Some("PREMIUM".to_string()),
            ..CreateQuoteRequest::new(id.clone())
        })
        .await?;
    println!(
        "Quote {} created: total={} expires={}",
        quote.quote_number,
        quote.grand_total,
        quote.expires_at.format("%Y-%m-%d")
    );

    let wait = config.documents.generation_delay() + Duration::from_secs(10);
    match tokio::time::timeout(wait, ready.recv()).await {
        Ok(Ok(QuoteEvent::Ready {
            quote_number,
            document_url,
            ..
        })) => println!("Quote {} document ready at {}", quote_number, document_url),
        Ok(Ok(other)) => warn!(?other, "Unexpected quote event"),
        Ok(Err(e)) => warn!(error = %e, "Document event channel closed"),
        Err(_) => warn!("Timed out waiting for the quote document"),
    }

    println!("Quote stats: {:?}", backend.quotes.stats());

    backend.shutdown().await?;
    Ok(())
}
