//! The running pricing result threaded through the strategies.
//!
//! ## Totals Invariant
//! ```text
//! subtotal        = Σ line_total
//! line_discount   = Σ line.discount_amount
//! total_discount  = line_discount + order_discount
//! grand_total     = subtotal - total_discount + service_add_on
//! ```
//!
//! Fields are private. Every mutator re-derives the four totals, so a
//! strategy can never leave `grand_total` stale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

use super::context::PricingLineItem;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    configuration_id: String,
    line_items: Vec<PricingLineItem>,
    subtotal: Money,
    line_discount: Money,
    order_discount: Money,
    total_discount: Money,
    service_add_on: Money,
    grand_total: Money,
    currency: String,
    applied_strategies: Vec<String>,
    skipped_strategies: Vec<String>,
    discount_descriptions: Vec<String>,
    calculated_at: DateTime<Utc>,
}

impl PricingResult {
    /// An empty result: no lines, every total zero.
    pub fn new(configuration_id: impl Into<String>, currency: impl Into<String>) -> Self {
        PricingResult {
            configuration_id: configuration_id.into(),
            line_items: Vec::new(),
            subtotal: Money::zero(),
            line_discount: Money::zero(),
            order_discount: Money::zero(),
            total_discount: Money::zero(),
            service_add_on: Money::zero(),
            grand_total: Money::zero(),
            currency: currency.into(),
            applied_strategies: Vec::new(),
            skipped_strategies: Vec::new(),
            discount_descriptions: Vec::new(),
            calculated_at: Utc::now(),
        }
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    pub fn set_line_items(&mut self, line_items: Vec<PricingLineItem>) {
        self.line_items = line_items;
        self.recalculate();
    }

    /// Adds `amount` to one line's discount. Returns false for a bad index.
    pub fn add_line_discount(&mut self, index: usize, amount: Money, reason: impl Into<String>) -> bool {
        let Some(line) = self.line_items.get_mut(index) else {
            return false;
        };
        line.discount_amount += amount;
        line.discount_reason = Some(reason.into());
        self.recalculate();
        true
    }

    /// Discount not attributable to a single line.
    pub fn add_order_discount(&mut self, amount: Money) {
        self.order_discount += amount;
        self.recalculate();
    }

    pub fn set_service_add_on(&mut self, amount: Money) {
        self.service_add_on = amount;
        self.recalculate();
    }

    pub fn record_strategy(&mut self, name: impl Into<String>) {
        self.applied_strategies.push(name.into());
    }

    pub fn record_skipped(&mut self, name: impl Into<String>) {
        self.skipped_strategies.push(name.into());
    }

    pub fn add_description(&mut self, description: impl Into<String>) {
        self.discount_descriptions.push(description.into());
    }

    fn recalculate(&mut self) {
        self.subtotal = self.line_items.iter().map(|l| l.line_total).sum();
        self.line_discount = self.line_items.iter().map(|l| l.discount_amount).sum();
        self.total_discount = self.line_discount + self.order_discount;
        self.grand_total = self.subtotal - self.total_discount + self.service_add_on;
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn configuration_id(&self) -> &str {
        &self.configuration_id
    }

    pub fn line_items(&self) -> &[PricingLineItem] {
        &self.line_items
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn line_discount(&self) -> Money {
        self.line_discount
    }

    pub fn order_discount(&self) -> Money {
        self.order_discount
    }

    pub fn total_discount(&self) -> Money {
        self.total_discount
    }

    /// Subtotal less every discount so far, the base for later percentages.
    pub fn discounted_subtotal(&self) -> Money {
        self.subtotal - self.total_discount
    }

    pub fn service_add_on(&self) -> Money {
        self.service_add_on
    }

    pub fn grand_total(&self) -> Money {
        self.grand_total
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn applied_strategies(&self) -> &[String] {
        &self.applied_strategies
    }

    pub fn skipped_strategies(&self) -> &[String] {
        &self.skipped_strategies
    }

    pub fn discount_descriptions(&self) -> &[String] {
        &self.discount_descriptions
    }

    pub fn calculated_at(&self) -> DateTime<Utc> {
        self.calculated_at
    }

    pub fn has_line_items(&self) -> bool {
        !self.line_items.is_empty()
    }
}
