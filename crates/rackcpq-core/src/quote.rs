//! # Quote Snapshots
//!
//! A quote freezes one pricing run for one configuration. After creation
//! only its status and document metadata change; it never re-reads the
//! catalog or the configuration.
//!
//! ## Lifecycle
//! ```text
//!                    request_regeneration
//!            ┌─────────────────────────────────────┐
//!            ▼                                     │
//!        PENDING ──► GENERATING ──► READY ──► SENT ┤
//!            │           │            │  │     │   │
//!            │           │            │  └──┬──┘   │
//!            │           │            │     ▼      │
//!            │           │            │  ACCEPTED  │
//!            └───────────┴────────────┴─────┬──────┘
//!                                           ▼
//!                              REJECTED  or  EXPIRED (past expires_at)
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::ProductType;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{PricingLineItem, PricingResult};

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Generating,
    Ready,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "PENDING",
            QuoteStatus::Generating => "GENERATING",
            QuoteStatus::Ready => "READY",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Rejected => "REJECTED",
            QuoteStatus::Expired => "EXPIRED",
        }
    }

    /// ACCEPTED, REJECTED or EXPIRED.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            QuoteStatus::Accepted | QuoteStatus::Rejected | QuoteStatus::Expired
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Line Items and Customer
// =============================================================================

/// A frozen pricing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteLineItem {
    pub sku: String,
    pub name: String,
    pub product_type: ProductType,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
    pub discount_amount: Money,
    pub discount_reason: Option<String>,
}

impl QuoteLineItem {
    pub fn final_total(&self) -> Money {
        self.line_total - self.discount_amount
    }
}

impl From<&PricingLineItem> for QuoteLineItem {
    fn from(line: &PricingLineItem) -> Self {
        QuoteLineItem {
            sku: line.sku.clone(),
            name: line.name.clone(),
            product_type: line.product_type,
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
            discount_amount: line.discount_amount,
            discount_reason: line.discount_reason.clone(),
        }
    }
}

/// Who the quote is for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub customer_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub quote_number: String,
    pub configuration_id: String,
    pub customer: CustomerInfo,
    pub line_items: Vec<QuoteLineItem>,
    pub subtotal: Money,
    pub total_discount: Money,
    pub service_add_on: Money,
    pub grand_total: Money,
    pub currency: String,
    pub discount_descriptions: Vec<String>,
    status: QuoteStatus,
    document_url: Option<String>,
    document_generated_at: Option<DateTime<Utc>>,
    rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    /// Snapshots `pricing` as a new PENDING quote.
    pub fn from_pricing(
        quote_number: impl Into<String>,
        customer: CustomerInfo,
        pricing: &PricingResult,
        created_at: DateTime<Utc>,
        validity: Duration,
    ) -> Self {
        Quote {
            id: Uuid::new_v4().to_string(),
            quote_number: quote_number.into(),
            configuration_id: pricing.configuration_id().to_string(),
            customer,
            line_items: pricing.line_items().iter().map(QuoteLineItem::from).collect(),
            subtotal: pricing.subtotal(),
            total_discount: pricing.total_discount(),
            service_add_on: pricing.service_add_on(),
            grand_total: pricing.grand_total(),
            currency: pricing.currency().to_string(),
            discount_descriptions: pricing.discount_descriptions().to_vec(),
            status: QuoteStatus::Pending,
            document_url: None,
            document_generated_at: None,
            rejection_reason: None,
            created_at,
            expires_at: created_at + validity,
        }
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn document_url(&self) -> Option<&str> {
        self.document_url.as_deref()
    }

    pub fn document_generated_at(&self) -> Option<DateTime<Utc>> {
        self.document_generated_at
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.customer.customer_id.as_deref()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn invalid(&self, operation: &'static str) -> CoreError {
        CoreError::InvalidQuoteStatus {
            quote_number: self.quote_number.clone(),
            current: self.status,
            operation,
        }
    }

    /// PENDING → GENERATING.
    pub fn start_generation(&mut self) -> CoreResult<()> {
        if self.status != QuoteStatus::Pending {
            return Err(self.invalid("start document generation"));
        }
        self.status = QuoteStatus::Generating;
        Ok(())
    }

    /// GENERATING → READY with the document location.
    pub fn complete_generation(
        &mut self,
        url: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> CoreResult<()> {
        if self.status != QuoteStatus::Generating {
            return Err(self.invalid("complete document generation"));
        }
        self.status = QuoteStatus::Ready;
        self.document_url = Some(url.into());
        self.document_generated_at = Some(generated_at);
        Ok(())
    }

    /// READY → SENT.
    pub fn mark_sent(&mut self) -> CoreResult<()> {
        if self.status != QuoteStatus::Ready {
            return Err(self.invalid("send"));
        }
        self.status = QuoteStatus::Sent;
        Ok(())
    }

    /// READY or SENT → ACCEPTED, unless past expiry.
    pub fn accept(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        if !matches!(self.status, QuoteStatus::Ready | QuoteStatus::Sent) {
            return Err(self.invalid("accept"));
        }
        if self.is_expired(now) {
            return Err(CoreError::QuoteExpired(self.quote_number.clone()));
        }
        self.status = QuoteStatus::Accepted;
        Ok(())
    }

    /// Anything but ACCEPTED → REJECTED.
    pub fn reject(&mut self, reason: Option<String>) -> CoreResult<()> {
        if self.status == QuoteStatus::Accepted {
            return Err(self.invalid("reject"));
        }
        self.status = QuoteStatus::Rejected;
        self.rejection_reason = reason;
        Ok(())
    }

    /// Marks an open quote past its expiry as EXPIRED. Returns whether it
    /// changed.
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        let open = matches!(
            self.status,
            QuoteStatus::Pending | QuoteStatus::Generating | QuoteStatus::Ready | QuoteStatus::Sent
        );
        if open && self.is_expired(now) {
            self.status = QuoteStatus::Expired;
            return true;
        }
        false
    }

    /// Back to PENDING with the old document dropped.
    pub fn request_regeneration(&mut self) -> CoreResult<()> {
        if self.status.is_final() {
            return Err(self.invalid("regenerate document"));
        }
        self.status = QuoteStatus::Pending;
        self.document_url = None;
        self.document_generated_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{CustomerTier, PricingContext, PricingEngine};
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    fn quote() -> Quote {
        let ctx = PricingContext::new(
            "cfg-1",
            vec![
                PricingLineItem::new("SW-24", "Switch", ProductType::Switch, 6, Money::from_cents(100_000)),
                PricingLineItem::new("RACK-42U", "Rack", ProductType::Rack, 1, Money::from_cents(400_000)),
            ],
        )
        .with_customer_tier(CustomerTier::Partner);
        let pricing = PricingEngine::default().price(&ctx);
        Quote::from_pricing(
            "QT-20260101-00001",
            CustomerInfo {
                customer_id: Some("cust-1".to_string()),
                ..Default::default()
            },
            &pricing,
            created(),
            Duration::days(30),
        )
    }

    #[test]
    fn test_snapshot_freezes_pricing() {
        let q = quote();
        assert_eq!(q.status(), QuoteStatus::Pending);
        assert_eq!(q.configuration_id, "cfg-1");
        assert_eq!(q.expires_at, created() + Duration::days(30));
        assert_eq!(q.line_items.len(), 2);
        // 10% volume on 6 switches, then 15% partner on the rest.
        assert_eq!(q.line_items[0].discount_amount.cents(), 60_000);
        assert_eq!(q.line_items[0].final_total().cents(), 540_000);
        assert_eq!(q.subtotal.cents(), 1_000_000);
        assert_eq!(q.total_discount.cents(), 201_000);
        assert_eq!(q.grand_total.cents(), 799_000);
        assert_eq!(q.discount_descriptions.len(), 2);
    }

    #[test]
    fn test_json_round_trip() {
        let q = quote();
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains("\"status\":\"PENDING\""));
        let back: Quote = serde_json::from_str(&json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn test_happy_path() {
        let mut q = quote();
        q.start_generation().unwrap();
        q.complete_generation("/quotes/x/pdf", created()).unwrap();
        assert_eq!(q.document_url(), Some("/quotes/x/pdf"));
        q.mark_sent().unwrap();
        q.accept(created() + Duration::days(2)).unwrap();
        assert_eq!(q.status(), QuoteStatus::Accepted);
        assert!(q.reject(None).is_err());
    }

    #[test]
    fn test_accept_requires_ready_and_unexpired() {
        let mut q = quote();
        let err = q.accept(created()).unwrap_err();
        assert_eq!(err.to_string(), "Quote QT-20260101-00001 is PENDING, cannot accept");

        q.start_generation().unwrap();
        q.complete_generation("/quotes/x/pdf", created()).unwrap();
        let err = q.accept(created() + Duration::days(31)).unwrap_err();
        assert!(matches!(err, CoreError::QuoteExpired(_)));
        assert_eq!(q.status(), QuoteStatus::Ready);
    }

    #[test]
    fn test_reject_keeps_reason() {
        let mut q = quote();
        q.reject(Some("budget cut".to_string())).unwrap();
        assert_eq!(q.status(), QuoteStatus::Rejected);
        assert_eq!(q.rejection_reason(), Some("budget cut"));
        assert!(q.request_regeneration().is_err());
    }

    #[test]
    fn test_expire_only_open_quotes() {
        let mut q = quote();
        assert!(!q.expire(created() + Duration::days(29)));
        assert!(q.expire(created() + Duration::days(31)));
        assert_eq!(q.status(), QuoteStatus::Expired);
        assert!(!q.expire(created() + Duration::days(40)));

        let mut rejected = quote();
        rejected.reject(None).unwrap();
        assert!(!rejected.expire(created() + Duration::days(31)));
        assert_eq!(rejected.status(), QuoteStatus::Rejected);
    }

    #[test]
    fn test_regeneration_clears_document() {
        let mut q = quote();
        q.start_generation().unwrap();
        q.complete_generation("/quotes/x/pdf", created()).unwrap();
        q.request_regeneration().unwrap();
        assert_eq!(q.status(), QuoteStatus::Pending);
        assert_eq!(q.document_url(), None);
        assert_eq!(q.document_generated_at(), None);
        assert!(q.complete_generation("/late", created()).is_err());
    }
}
