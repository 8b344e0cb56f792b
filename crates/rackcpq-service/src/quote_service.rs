//! # Quote Service
//!
//! Freezes a priced configuration into a quote and drives the quote
//! through its lifecycle.
//!
//! ## Quote Creation
//! ```text
//! create_quote(request)
//!      │
//!      ├── email malformed?             → Validation
//!      ├── configuration missing?       → ConfigurationNotFound
//!      ├── configuration not validated? → ConfigurationNotValidated
//!      ├── pricing has no line items?   → PricingUnavailable
//!      │
//!      ▼
//! number = QT-YYYYMMDD-NNNNN
//! Quote::from_pricing(..)  ── PENDING, stored
//!      │
//!      ├── configuration → QUOTED
//!      └── QuoteEvent::Requested → DocumentWorker
//! ```
//!
//! Quotes never re-read prices. Everything shown on a quote was copied
//! from the pricing result at creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use rackcpq_core::pricing::strategies::{INCLUDE_SUPPORT_OPTION, SUPPORT_TIER_OPTION};
use rackcpq_core::validation::input::validate_email;
use rackcpq_core::{
    Clock, CoreError, CoreResult, CustomerInfo, PricingOptions, PricingRequest, Quote,
    QuoteNumberGenerator, QuoteSettings, QuoteStatus, RackConfiguration,
};

use crate::documents::{DocumentHandle, QuoteEvent};
use crate::error::ServiceResult;
use crate::pricing_service::PricingService;
use crate::store::{ConfigurationStore, QuoteStore};

// =============================================================================
// Requests & Reports
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateQuoteRequest {
    pub configuration_id: String,
    /// Falls back to the configuration's customer.
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_tier: Option<String>,
    #[serde(default)]
    pub include_support: bool,
    /// STANDARD or PREMIUM.
    #[serde(default)]
    pub support_tier: Option<String>,
}

impl CreateQuoteRequest {
    pub fn new(configuration_id: impl Into<String>) -> Self {
        CreateQuoteRequest {
            configuration_id: configuration_id.into(),
            ..Default::default()
        }
    }

    fn pricing_request(&self, configuration: &RackConfiguration) -> PricingRequest {
        let mut options = PricingOptions::new();
        if self.include_support {
            options = options.with(INCLUDE_SUPPORT_OPTION, true);
        }
        if let Some(tier) = &self.support_tier {
            options = options.with(SUPPORT_TIER_OPTION, tier.as_str());
        }

        PricingRequest {
            configuration_id: configuration.id.clone(),
            customer_id: self.customer_id(configuration),
            customer_tier: self.customer_tier.clone(),
            options,
            ..Default::default()
        }
    }

    fn customer_id(&self, configuration: &RackConfiguration) -> Option<String> {
        self.customer_id
            .clone()
            .or_else(|| configuration.customer_id.clone())
    }
}

/// Quote counts by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteStats {
    pub total: usize,
    pub pending: usize,
    pub generating: usize,
    pub ready: usize,
    pub sent: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub expired: usize,
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct QuoteService {
    configurations: ConfigurationStore,
    quotes: QuoteStore,
    pricing: PricingService,
    numbers: Arc<QuoteNumberGenerator>,
    clock: Arc<dyn Clock>,
    validity: chrono::Duration,
    documents: DocumentHandle,
}

impl QuoteService {
    pub fn new(
        configurations: ConfigurationStore,
        quotes: QuoteStore,
        pricing: PricingService,
        settings: &QuoteSettings,
        clock: Arc<dyn Clock>,
        documents: DocumentHandle,
    ) -> Self {
        QuoteService {
            configurations,
            quotes,
            pricing,
            numbers: Arc::new(QuoteNumberGenerator::new(
                settings.number_prefix.clone(),
                Arc::clone(&clock),
            )),
            clock,
            validity: settings.validity(),
            documents,
        }
    }

    fn modify<R, F>(&self, id: &str, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut Quote) -> CoreResult<R>,
    {
        let outcome = self
            .quotes
            .update(id, f)
            .ok_or_else(|| CoreError::QuoteNotFound(id.to_string()))?;
        Ok(outcome?)
    }

    /// Prices a validated configuration and stores the result as a PENDING
    /// quote, then asks for its document.
    pub async fn create_quote(&self, request: CreateQuoteRequest) -> ServiceResult<Quote> {
        info!(configuration_id = %request.configuration_id, "Creating quote");

        if let Some(email) = &request.customer_email {
            validate_email(email)?;
        }

        let configuration = self
            .configurations
            .get(&request.configuration_id)
            .ok_or_else(|| CoreError::ConfigurationNotFound(request.configuration_id.clone()))?;

        if !configuration.is_validated() {
            return Err(CoreError::ConfigurationNotValidated(configuration.id.clone()).into());
        }

        let pricing = self
            .pricing
            .price_configuration(&configuration, &request.pricing_request(&configuration));
        if !pricing.has_line_items() {
            return Err(CoreError::PricingUnavailable {
                configuration_id: configuration.id.clone(),
                reason: "no component resolved to a catalog product".to_string(),
            }
            .into());
        }

        let customer = CustomerInfo {
            customer_id: request.customer_id(&configuration),
            name: request.customer_name.clone(),
            email: request.customer_email.as_deref().map(|e| e.trim().to_string()),
        };
        let quote = Quote::from_pricing(
            self.numbers.next_number(),
            customer,
            &pricing,
            self.clock.now(),
            self.validity,
        );
        self.quotes.insert(quote.id.clone(), quote.clone());
        self.configurations
            .update(&configuration.id, RackConfiguration::mark_quoted);

        info!(
            quote_id = %quote.id,
            quote_number = %quote.quote_number,
            grand_total = %quote.grand_total,
            "Quote created"
        );

        if let Err(e) = self.documents.request(QuoteEvent::requested(&quote)).await {
            warn!(
                quote_id = %quote.id,
                error = %e,
                "Could not queue document generation, quote stays PENDING"
            );
        }

        Ok(quote)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Quote> {
        Ok(self
            .quotes
            .get(id)
            .ok_or_else(|| CoreError::QuoteNotFound(id.to_string()))?)
    }

    pub fn get_by_number(&self, quote_number: &str) -> ServiceResult<Quote> {
        Ok(self
            .quotes
            .find_one(|q| q.quote_number == quote_number)
            .ok_or_else(|| CoreError::QuoteNotFound(quote_number.to_string()))?)
    }

    /// Newest first.
    pub fn list_by_customer(&self, customer_id: &str) -> Vec<Quote> {
        newest_first(self.quotes.find(|q| q.customer_id() == Some(customer_id)))
    }

    pub fn list_by_configuration(&self, configuration_id: &str) -> Vec<Quote> {
        newest_first(self.quotes.find(|q| q.configuration_id == configuration_id))
    }

    pub fn list_by_status(&self, status: QuoteStatus) -> Vec<Quote> {
        newest_first(self.quotes.find(|q| q.status() == status))
    }

    pub fn accept(&self, id: &str) -> ServiceResult<Quote> {
        let now = self.clock.now();
        let quote = self.modify(id, |quote| {
            quote.accept(now)?;
            Ok(quote.clone())
        })?;
        info!(quote_number = %quote.quote_number, "Quote accepted");
        Ok(quote)
    }

    pub fn reject(&self, id: &str, reason: Option<String>) -> ServiceResult<Quote> {
        let quote = self.modify(id, |quote| {
            quote.reject(reason)?;
            Ok(quote.clone())
        })?;
        info!(
            quote_number = %quote.quote_number,
            reason = quote.rejection_reason().unwrap_or(""),
            "Quote rejected"
        );
        Ok(quote)
    }

    pub fn mark_sent(&self, id: &str) -> ServiceResult<Quote> {
        let quote = self.modify(id, |quote| {
            quote.mark_sent()?;
            Ok(quote.clone())
        })?;
        info!(quote_number = %quote.quote_number, "Quote marked as sent");
        Ok(quote)
    }

    /// Drops the current document and queues a new one.
    pub async fn regenerate_document(&self, id: &str) -> ServiceResult<Quote> {
        let quote = self.modify(id, |quote| {
            quote.request_regeneration()?;
            Ok(quote.clone())
        })?;
        info!(quote_number = %quote.quote_number, "Document regeneration requested");
        self.documents.request(QuoteEvent::requested(&quote)).await?;
        Ok(quote)
    }

    /// Marks every open quote past its expiry as EXPIRED.
    pub fn expire_old_quotes(&self, now: DateTime<Utc>) -> usize {
        let expired = self.quotes.update_where(|quote| quote.expire(now));
        if expired > 0 {
            info!(expired, "Expired old quotes");
        }
        expired
    }

    /// Expires overdue quotes as of the service clock's current time.
    pub fn expire_due_quotes(&self) -> usize {
        self.expire_old_quotes(self.clock.now())
    }

    pub fn stats(&self) -> QuoteStats {
        let mut stats = QuoteStats::default();
        for quote in self.quotes.values() {
            stats.total += 1;
            match quote.status() {
                QuoteStatus::Pending => stats.pending += 1,
                QuoteStatus::Generating => stats.generating += 1,
                QuoteStatus::Ready => stats.ready += 1,
                QuoteStatus::Sent => stats.sent += 1,
                QuoteStatus::Accepted => stats.accepted += 1,
                QuoteStatus::Rejected => stats.rejected += 1,
                QuoteStatus::Expired => stats.expired += 1,
            }
        }
        stats
    }
}

fn newest_first(mut quotes: Vec<Quote>) -> Vec<Quote> {
    quotes.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.quote_number.cmp(&a.quote_number))
    });
    quotes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::configuration_service::{AddComponent, NewConfiguration};
    use crate::seed::load_sample_catalog;
    use crate::store::InMemoryCatalog;
    use crate::{Backend, ServiceError};
    use chrono::{Duration, TimeZone};
    use rackcpq_core::{ConfigurationStatus, ManualClock, Money, Product, ProductType};

    struct Harness {
        backend: Backend,
        catalog: InMemoryCatalog,
        clock: ManualClock,
    }

    fn harness() -> Harness {
        let catalog = InMemoryCatalog::new();
        load_sample_catalog(&catalog);
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 14, 10, 0, 0).unwrap());
        let backend = Backend::start(&AppConfig::default(), catalog.clone(), Arc::new(clock.clone()));
        Harness {
            backend,
            catalog,
            clock,
        }
    }

    fn validated_configuration(backend: &Backend) -> String {
        let configs = &backend.configurations;
        let config = configs
            .create(NewConfiguration {
                name: "Edge POP".to_string(),
                customer_id: Some("cust-7".to_string()),
                rack_sku: Some("RACK-42U-STD".to_string()),
                ..Default::default()
            })
            .unwrap();
        configs
            .add_component(&config.id, AddComponent::new("SW-CATALYST-9300-24", 2))
            .unwrap();
        configs
            .add_component(&config.id, AddComponent::new("PSU-2000W-TITANIUM", 1))
            .unwrap();
        assert!(configs.validate(&config.id).unwrap().valid);
        config.id
    }

    async fn ready_quote(h: &Harness) -> Quote {
        let id = validated_configuration(&h.backend);
        let mut ready = h.backend.subscribe();
        let quote = h
            .backend
            .quotes
            .create_quote(CreateQuoteRequest::new(id))
            .await
            .unwrap();
        let event = ready.recv().await.unwrap();
        assert_eq!(event.quote_id(), quote.id);
        h.backend.quotes.get(&quote.id).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_quote_snapshots_pricing() {
        let h = harness();
        let id = validated_configuration(&h.backend);

        let request = CreateQuoteRequest {
            customer_name: Some("Ada".to_string()),
            customer_email: Some("ada@example.com".to_string()),
            customer_tier: Some("PARTNER".to_string()),
            ..CreateQuoteRequest::new(id.clone())
        };
        let quote = h.backend.quotes.create_quote(request).await.unwrap();

        assert_eq!(quote.quote_number, "QT-20260314-00001");
        assert_eq!(quote.status(), QuoteStatus::Pending);
        assert_eq!(quote.customer_id(), Some("cust-7"));
        assert_eq!(quote.subtotal.cents(), 1_299_996);
        assert_eq!(quote.grand_total.cents(), 1_104_997);
        assert_eq!(quote.line_items.len(), 3);
        assert_eq!(quote.expires_at, quote.created_at + Duration::days(30));
        assert_eq!(
            h.backend.configurations.get(&id).unwrap().status(),
            ConfigurationStatus::Quoted
        );

        // Later catalog changes do not reach the stored quote.
        h.catalog.upsert(Product::new(
            "SW-CATALYST-9300-24",
            "Catalyst 9300 24-Port Switch",
            ProductType::Switch,
            Money::from_cents(1),
        ));
        let stored = h.backend.quotes.get(&quote.id).unwrap();
        assert_eq!(stored.line_items[0].unit_price.cents(), 459_999);
        assert_eq!(stored.grand_total.cents(), 1_104_997);
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_quote_preconditions() {
        let h = harness();
        let quotes = &h.backend.quotes;

        let err = quotes
            .create_quote(CreateQuoteRequest::new("missing"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ConfigurationNotFound(_))
        ));

        let draft = h
            .backend
            .configurations
            .create(NewConfiguration {
                name: "Draft".to_string(),
                ..Default::default()
            })
            .unwrap();
        let err = quotes
            .create_quote(CreateQuoteRequest::new(draft.id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::ConfigurationNotValidated(_))
        ));

        let id = validated_configuration(&h.backend);
        let err = quotes
            .create_quote(CreateQuoteRequest {
                customer_email: Some("not-an-email".to_string()),
                ..CreateQuoteRequest::new(id.clone())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::Validation(_))));

        for sku in ["RACK-42U-STD", "SW-CATALYST-9300-24", "PSU-2000W-TITANIUM"] {
            h.catalog.remove(sku);
        }
        let err = quotes
            .create_quote(CreateQuoteRequest::new(id))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::PricingUnavailable { .. })
        ));
        assert_eq!(quotes.stats().total, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_support_options_reach_pricing() {
        let h = harness();
        let id = validated_configuration(&h.backend);
        let quote = h
            .backend
            .quotes
            .create_quote(CreateQuoteRequest {
                include_support: true,
                support_tier: Some("STANDARD".to_string()),
                ..CreateQuoteRequest::new(id)
            })
            .await
            .unwrap();

        // 15% of 12999.96
        assert_eq!(quote.service_add_on.cents(), 194_999);
        assert_eq!(quote.grand_total.cents(), 1_299_996 + 194_999);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_lifecycle() {
        let h = harness();
        let quotes = &h.backend.quotes;
        let quote = ready_quote(&h).await;
        assert_eq!(quote.status(), QuoteStatus::Ready);
        assert_eq!(
            quote.document_url(),
            Some(format!("/quotes/{}/pdf", quote.id).as_str())
        );

        let sent = quotes.mark_sent(&quote.id).unwrap();
        assert_eq!(sent.status(), QuoteStatus::Sent);

        let accepted = quotes.accept(&quote.id).unwrap();
        assert_eq!(accepted.status(), QuoteStatus::Accepted);

        let err = quotes.reject(&quote.id, None).unwrap_err();
        assert!(err.is_precondition());
        assert!(quotes.regenerate_document(&quote.id).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_requires_ready_document() {
        let h = harness();
        let id = validated_configuration(&h.backend);
        let quote = h
            .backend
            .quotes
            .create_quote(CreateQuoteRequest::new(id))
            .await
            .unwrap();

        let err = h.backend.quotes.accept(&quote.id).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Core(CoreError::InvalidQuoteStatus {
                operation: "accept",
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let h = harness();
        let quotes = &h.backend.quotes;
        let quote = ready_quote(&h).await;

        h.clock.advance(Duration::days(31));
        let err = quotes.accept(&quote.id).unwrap_err();
        assert!(matches!(err, ServiceError::Core(CoreError::QuoteExpired(_))));

        assert_eq!(quotes.expire_old_quotes(h.clock.now()), 1);
        assert_eq!(quotes.expire_old_quotes(h.clock.now()), 0);
        assert_eq!(quotes.get(&quote.id).unwrap().status(), QuoteStatus::Expired);
        assert_eq!(quotes.list_by_status(QuoteStatus::Expired).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reject_and_regenerate() {
        let h = harness();
        let quotes = &h.backend.quotes;
        let quote = ready_quote(&h).await;

        let mut ready = h.backend.subscribe();
        let pending = quotes.regenerate_document(&quote.id).await.unwrap();
        assert_eq!(pending.status(), QuoteStatus::Pending);
        assert!(pending.document_url().is_none());
        ready.recv().await.unwrap();
        assert_eq!(quotes.get(&quote.id).unwrap().status(), QuoteStatus::Ready);

        let rejected = quotes
            .reject(&quote.id, Some("Over budget".to_string()))
            .unwrap();
        assert_eq!(rejected.status(), QuoteStatus::Rejected);
        assert_eq!(rejected.rejection_reason(), Some("Over budget"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_and_stats() {
        let h = harness();
        let quotes = &h.backend.quotes;
        let first = ready_quote(&h).await;
        let id = validated_configuration(&h.backend);
        let second = quotes
            .create_quote(CreateQuoteRequest::new(id.clone()))
            .await
            .unwrap();

        assert_eq!(second.quote_number, "QT-20260314-00002");
        assert_eq!(
            quotes.get_by_number("QT-20260314-00001").unwrap().id,
            first.id
        );
        assert!(quotes.get_by_number("QT-20260314-00099").unwrap_err().is_not_found());

        let mine: Vec<String> = quotes
            .list_by_customer("cust-7")
            .into_iter()
            .map(|q| q.quote_number)
            .collect();
        assert_eq!(mine, vec!["QT-20260314-00002", "QT-20260314-00001"]);
        assert_eq!(quotes.list_by_configuration(&id).len(), 1);

        let stats = quotes.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.ready, 1);
        assert_eq!(stats.pending + stats.generating, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quote_kept_when_worker_is_gone() {
        let h = harness();
        let id = validated_configuration(&h.backend);
        let quotes = h.backend.quotes.clone();
        h.backend.shutdown().await.unwrap();

        let quote = quotes.create_quote(CreateQuoteRequest::new(id)).await.unwrap();
        assert_eq!(quotes.get(&quote.id).unwrap().status(), QuoteStatus::Pending);
    }
}
