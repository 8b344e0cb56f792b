//! # Quote Document Worker
//!
//! Renders quote documents in the background and announces when they are
//! ready.
//!
//! ## Document Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Document Worker Flow                                 │
//! │                                                                         │
//! │  QuoteService::create_quote()                                          │
//! │       │                                                                 │
//! │       │ QuoteEvent::Requested (mpsc)                                    │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    DocumentWorker                               │   │
//! │  │                                                                 │   │
//! │  │  1. Mark:   PENDING → GENERATING                               │   │
//! │  │  2. Render: wait generation_delay_ms                           │   │
//! │  │  3. Mark:   GENERATING → READY, url = /quotes/{id}/pdf         │   │
//! │  │  4. Notify: QuoteEvent::Ready (broadcast)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  A quote that left PENDING/GENERATING in the meantime (rejected,       │
//! │  expired) is logged and skipped. Errors never stop the loop.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info};

use rackcpq_core::{Clock, CoreError, Quote};

use crate::config::DocumentSettings;
use crate::error::{ServiceError, ServiceResult};
use crate::store::QuoteStore;

// =============================================================================
// Events
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteEvent {
    /// A quote needs its document rendered.
    Requested {
        quote_id: String,
        quote_number: String,
        configuration_id: String,
        customer_email: Option<String>,
    },

    /// A quote document finished rendering.
    Ready {
        quote_id: String,
        quote_number: String,
        document_url: String,
    },
}

impl QuoteEvent {
    pub fn requested(quote: &Quote) -> Self {
        QuoteEvent::Requested {
            quote_id: quote.id.clone(),
            quote_number: quote.quote_number.clone(),
            configuration_id: quote.configuration_id.clone(),
            customer_email: quote.customer.email.clone(),
        }
    }

    pub fn quote_id(&self) -> &str {
        match self {
            QuoteEvent::Requested { quote_id, .. } | QuoteEvent::Ready { quote_id, .. } => quote_id,
        }
    }
}

/// Where a quote's rendered document lives.
pub fn document_url(quote_id: &str) -> String {
    format!("/quotes/{}/pdf", quote_id)
}

// =============================================================================
// Handle
// =============================================================================

/// Handle for submitting work to, listening to, and stopping the worker.
#[derive(Clone)]
pub struct DocumentHandle {
    request_tx: mpsc::Sender<QuoteEvent>,
    ready_tx: broadcast::Sender<QuoteEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl DocumentHandle {
    /// Queues a document request.
    pub async fn request(&self, event: QuoteEvent) -> ServiceResult<()> {
        self.request_tx
            .send(event)
            .await
            .map_err(|_| ServiceError::ShuttingDown)
    }

    /// Receives every `QuoteEvent::Ready` published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.ready_tx.subscribe()
    }

    /// Stops the worker after the request it is currently handling.
    pub async fn shutdown(&self) -> ServiceResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ServiceError::Channel("Shutdown channel closed".into()))
    }
}

// =============================================================================
// Worker
// =============================================================================

pub struct DocumentWorker {
    quotes: QuoteStore,
    clock: Arc<dyn Clock>,
    delay: Duration,
    request_rx: mpsc::Receiver<QuoteEvent>,
    ready_tx: broadcast::Sender<QuoteEvent>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl DocumentWorker {
    /// Creates a worker and the handle that drives it.
    pub fn new(
        quotes: QuoteStore,
        settings: &DocumentSettings,
        clock: Arc<dyn Clock>,
    ) -> (Self, DocumentHandle) {
        let capacity = settings.channel_capacity.max(1);
        let (request_tx, request_rx) = mpsc::channel(capacity);
        let (ready_tx, _) = broadcast::channel(capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let worker = DocumentWorker {
            quotes,
            clock,
            delay: settings.generation_delay(),
            request_rx,
            ready_tx: ready_tx.clone(),
            shutdown_rx,
        };

        let handle = DocumentHandle {
            request_tx,
            ready_tx,
            shutdown_tx,
        };

        (worker, handle)
    }

    /// Runs until shutdown. Spawn as a background task.
    pub async fn run(mut self) {
        info!(delay_ms = self.delay.as_millis() as u64, "Document worker starting");

        loop {
            tokio::select! {
                Some(event) = self.request_rx.recv() => {
                    if let Err(e) = self.handle(event).await {
                        error!(error = %e, "Failed to generate quote document");
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Document worker shutting down");
                    break;
                }
            }
        }

        info!("Document worker stopped");
    }

    async fn handle(&self, event: QuoteEvent) -> ServiceResult<()> {
        match event {
            QuoteEvent::Requested { quote_id, .. } => self.generate(&quote_id).await,
            QuoteEvent::Ready { quote_id, .. } => {
                debug!(quote_id = %quote_id, "Ignoring ready event on request channel");
                Ok(())
            }
        }
    }

    async fn generate(&self, quote_id: &str) -> ServiceResult<()> {
        let quote_number = self.transition(quote_id, |quote| {
            quote.start_generation()?;
            Ok(quote.quote_number.clone())
        })?;
        info!(quote_id = %quote_id, quote_number = %quote_number, "Generating quote document");

        tokio::time::sleep(self.delay).await;

        let url = document_url(quote_id);
        let generated_at = self.clock.now();
        self.transition(quote_id, |quote| quote.complete_generation(url.clone(), generated_at))?;
        info!(quote_id = %quote_id, url = %url, "Quote document ready");

        let ready = QuoteEvent::Ready {
            quote_id: quote_id.to_string(),
            quote_number,
            document_url: url,
        };
        if self.ready_tx.send(ready).is_err() {
            debug!(quote_id = %quote_id, "No listeners for document ready event");
        }
        Ok(())
    }

    fn transition<R, F>(&self, quote_id: &str, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut Quote) -> Result<R, CoreError>,
    {
        let outcome = self
            .quotes
            .update(quote_id, f)
            .ok_or_else(|| CoreError::QuoteNotFound(quote_id.to_string()))?;
        Ok(outcome?)
    }
}
