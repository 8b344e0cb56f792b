//! # Backend
//!
//! Wires the stores, the three services, the document worker and the
//! expiry sweeper from one [`AppConfig`].
//!
//! ```text
//! Backend::start(config, catalog, clock)
//!      │
//!      ├── ConfigurationStore ──┬── ConfigurationService (validator)
//!      │                        ├── PricingService (engine)
//!      ├── QuoteStore ──────────┼── QuoteService (numbers, validity)
//!      │                        │
//!      ├── DocumentWorker ◄─────┘  tokio::spawn
//!      └── ExpirySweeper (QuoteService)  tokio::spawn
//! ```

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::info;

use rackcpq_core::{Clock, ConfigurationValidator, PricingEngine};

use crate::config::AppConfig;
use crate::configuration_service::ConfigurationService;
use crate::documents::{DocumentHandle, DocumentWorker, QuoteEvent};
use crate::error::{ServiceError, ServiceResult};
use crate::expiry::{ExpiryHandle, ExpirySweeper};
use crate::pricing_service::PricingService;
use crate::quote_service::QuoteService;
use crate::store::{ConfigurationStore, InMemoryCatalog, QuoteStore};

/// A running backend. Must be started inside a tokio runtime.
pub struct Backend {
    pub catalog: InMemoryCatalog,
    pub configurations: ConfigurationService,
    pub pricing: PricingService,
    pub quotes: QuoteService,
    documents: DocumentHandle,
    worker: JoinHandle<()>,
    expiry: ExpiryHandle,
    sweeper: JoinHandle<()>,
}

impl Backend {
    /// Builds every service and spawns the document worker and the expiry
    /// sweeper.
    pub fn start(config: &AppConfig, catalog: InMemoryCatalog, clock: Arc<dyn Clock>) -> Self {
        let configuration_store = ConfigurationStore::new();
        let quote_store = QuoteStore::new();

        let (worker, documents) =
            DocumentWorker::new(quote_store.clone(), &config.documents, Arc::clone(&clock));
        let worker = tokio::spawn(worker.run());

        let configurations = ConfigurationService::new(
            configuration_store.clone(),
            catalog.clone(),
            ConfigurationValidator::with_settings(&config.validation),
        );
        let pricing = PricingService::new(
            configuration_store.clone(),
            catalog.clone(),
            PricingEngine::with_settings(&config.pricing),
        );
        let quotes = QuoteService::new(
            configuration_store,
            quote_store,
            pricing.clone(),
            &config.quotes,
            clock,
            documents.clone(),
        );

        let (sweeper, expiry) = ExpirySweeper::new(quotes.clone(), &config.quotes);
        let sweeper = tokio::spawn(sweeper.run());

        info!(
            products = catalog.len(),
            rules = configurations.rule_names().len(),
            strategies = pricing.strategy_names().len(),
            "Backend started"
        );

        Backend {
            catalog,
            configurations,
            pricing,
            quotes,
            documents,
            worker,
            expiry,
            sweeper,
        }
    }

    /// Receives every document-ready event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.documents.subscribe()
    }

    /// Stops both background tasks and waits for them to finish.
    pub async fn shutdown(self) -> ServiceResult<()> {
        self.expiry.shutdown().await?;
        self.sweeper
            .await
            .map_err(|e| ServiceError::Channel(format!("Expiry sweeper failed: {}", e)))?;
        self.documents.shutdown().await?;
        self.worker
            .await
            .map_err(|e| ServiceError::Channel(format!("Document worker failed: {}", e)))?;
        info!("Backend stopped");
        Ok(())
    }
}
