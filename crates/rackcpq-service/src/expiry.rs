//! # Quote Expiry Sweeper
//!
//! Periodically moves open quotes past their expiry date to EXPIRED.
//!
//! ```text
//! interval.tick() ──► QuoteService::expire_due_quotes()
//!                        PENDING / GENERATING / READY / SENT
//!                        with expires_at < clock.now()  ──►  EXPIRED
//! ```
//!
//! The first tick fires at startup, then every `expiry_interval_secs`.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use rackcpq_core::QuoteSettings;

use crate::error::{ServiceError, ServiceResult};
use crate::quote_service::QuoteService;

/// Stops a running [`ExpirySweeper`].
#[derive(Clone)]
pub struct ExpiryHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl ExpiryHandle {
    pub async fn shutdown(&self) -> ServiceResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ServiceError::Channel("Expiry shutdown channel closed".into()))
    }
}

pub struct ExpirySweeper {
    quotes: QuoteService,
    period: Duration,
    shutdown_rx: mpsc::Receiver<()>,
}

impl ExpirySweeper {
    pub fn new(quotes: QuoteService, settings: &QuoteSettings) -> (Self, ExpiryHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let sweeper = ExpirySweeper {
            quotes,
            period: settings.expiry_interval(),
            shutdown_rx,
        };
        (sweeper, ExpiryHandle { shutdown_tx })
    }

    /// Runs until shutdown. Spawn as a background task.
    pub async fn run(mut self) {
        info!(period_secs = self.period.as_secs(), "Quote expiry sweeper starting");

        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let expired = self.quotes.expire_due_quotes();
                    debug!(expired, "Quote expiry sweep finished");
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Quote expiry sweeper shutting down");
                    break;
                }
            }
        }
    }
}
