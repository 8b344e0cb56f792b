//! # Pricing Pipeline
//!
//! Turns a resolved [`PricingContext`] into a [`PricingResult`] by running
//! an ordered list of strategies, each of which returns the next running
//! result.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PricingContext (lines, tier, options, rack utilization)                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  empty PricingResult ──► BasePrice ──► Volume ──► Bundle ──► Partner    │
//! │                                                              │          │
//! │                                                              ▼          │
//! │                                                        SupportAddOn     │
//! │                                                              │          │
//! │  Err/panic in any strategy:                                  ▼          │
//! │    keep the previous result, record the name as skipped   result        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod result;
pub mod strategies;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::pipeline::run_isolated;
use crate::settings::PricingSettings;

pub use context::{
    CustomerTier, PricingContext, PricingLineItem, PricingOptions, PricingRequest,
    RackUtilization,
};
pub use result::PricingResult;

// =============================================================================
// Strategy Contract
// =============================================================================

/// Why a strategy could not produce its adjustment.
#[derive(Debug, Error)]
pub enum StrategyFailure {
    #[error("Malformed option {key}: {reason}")]
    MalformedOption { key: String, reason: String },

    #[error("{0}")]
    Internal(String),
}

/// One price adjustment.
///
/// Strategies read the context and the running result and hand back the
/// next result. They must not fetch data of their own.
pub trait PricingStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn order(&self) -> i32;

    fn description(&self) -> &str {
        ""
    }

    fn apply(
        &self,
        ctx: &PricingContext,
        current: &PricingResult,
    ) -> Result<PricingResult, StrategyFailure>;
}

// =============================================================================
// Engine
// =============================================================================

pub struct PricingEngine {
    strategies: Vec<Box<dyn PricingStrategy>>,
    currency: String,
}

impl PricingEngine {
    /// Sorts `strategies` by order once. Ties keep their given order.
    pub fn new(mut strategies: Vec<Box<dyn PricingStrategy>>, currency: impl Into<String>) -> Self {
        strategies.sort_by_key(|s| s.order());
        info!(
            strategies = ?strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            "Pricing engine initialized"
        );
        PricingEngine {
            strategies,
            currency: currency.into(),
        }
    }

    pub fn with_settings(settings: &PricingSettings) -> Self {
        Self::new(strategies::default_strategies(settings), settings.currency.clone())
    }

    /// Runs every strategy in order over a fresh result.
    pub fn price(&self, ctx: &PricingContext) -> PricingResult {
        debug!(
            configuration_id = %ctx.configuration_id,
            lines = ctx.line_items.len(),
            "Calculating price"
        );

        let mut current = PricingResult::new(ctx.configuration_id.clone(), self.currency.clone());

        for strategy in &self.strategies {
            match run_isolated(|| strategy.apply(ctx, &current)) {
                Ok(next) => {
                    debug!(
                        strategy = strategy.name(),
                        grand_total = %next.grand_total(),
                        "Strategy applied"
                    );
                    current = next;
                }
                Err(message) => {
                    warn!(
                        configuration_id = %ctx.configuration_id,
                        strategy = strategy.name(),
                        error = %message,
                        "Strategy failed, continuing with previous result"
                    );
                    current.record_skipped(strategy.name());
                }
            }
        }

        info!(
            configuration_id = %ctx.configuration_id,
            subtotal = %current.subtotal(),
            total_discount = %current.total_discount(),
            grand_total = %current.grand_total(),
            "Pricing complete"
        );

        current
    }

    /// Strategy names in execution order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn describe_strategies(&self) -> Vec<(&str, i32, &str)> {
        self.strategies
            .iter()
            .map(|s| (s.name(), s.order(), s.description()))
            .collect()
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::with_settings(&PricingSettings::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
