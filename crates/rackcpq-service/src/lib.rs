//! # rackcpq-service: Stores, Services and Document Generation
//!
//! Puts the pure pipelines from `rackcpq-core` behind shared in-memory
//! state and runs the asynchronous quote-document workflow.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rackcpq-service                                  │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │ Configuration   │  │ Pricing         │  │ Quote                   │ │
//! │  │ Service         │─►│ Service         │─►│ Service                 │ │
//! │  └────────┬────────┘  └────────┬────────┘  └────────────┬────────────┘ │
//! │           │                    │                        │ mpsc         │
//! │  ┌────────▼────────────────────▼──────┐   ┌─────────────▼────────────┐ │
//! │  │ InMemoryCatalog                    │   │ DocumentWorker           │ │
//! │  │ ConfigurationStore / QuoteStore    │◄──│ PENDING → READY          │ │
//! │  └────────────────────────────────────┘   └──────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`backend`] - Wires everything from one [`AppConfig`]
//! - [`config`] - `rackcpq.toml` loading with environment overrides
//! - [`configuration_service`] - Configuration CRUD and validation
//! - [`pricing_service`] - Pricing of stored configurations
//! - [`quote_service`] - Quote creation and lifecycle
//! - [`documents`] - Background document worker and quote events
//! - [`expiry`] - Periodic expiry of overdue quotes
//! - [`store`] - In-memory catalog, configuration and quote stores
//! - [`seed`] - Sample product catalog
//! - [`error`] - Service error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rackcpq_core::SystemClock;
//! use rackcpq_service::{seed, AppConfig, Backend, InMemoryCatalog};
//!
//! let config = AppConfig::load_or_default(None);
//! let catalog = InMemoryCatalog::new();
//! seed::load_sample_catalog(&catalog);
//!
//! let backend = Backend::start(&config, catalog, Arc::new(SystemClock));
//! let summary = backend.configurations.validate(&configuration_id)?;
//! let quote = backend.quotes.create_quote(request).await?;
//! backend.shutdown().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod config;
pub mod configuration_service;
pub mod documents;
pub mod error;
pub mod expiry;
pub mod pricing_service;
pub mod quote_service;
pub mod seed;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::Backend;
pub use config::{AppConfig, DocumentSettings, LoggingSettings};
pub use configuration_service::{
    AddComponent, ConfigurationService, ConfigurationUpdate, NewConfiguration,
};
pub use documents::{DocumentHandle, DocumentWorker, QuoteEvent};
pub use error::{ConfigError, ConfigResult, ServiceError, ServiceResult};
pub use expiry::{ExpiryHandle, ExpirySweeper};
pub use pricing_service::PricingService;
pub use quote_service::{CreateQuoteRequest, QuoteService, QuoteStats};
pub use store::{Collection, ConfigurationStore, InMemoryCatalog, QuoteStore};
