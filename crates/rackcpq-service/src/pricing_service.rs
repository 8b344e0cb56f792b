//! # Pricing Service
//!
//! Resolves a stored configuration against the catalog and runs the
//! strategy pipeline over it.

use std::sync::Arc;
use tracing::debug;

use rackcpq_core::{
    CoreError, PricingContext, PricingEngine, PricingRequest, PricingResult, RackConfiguration,
};

use crate::error::ServiceResult;
use crate::store::{ConfigurationStore, InMemoryCatalog};

#[derive(Clone)]
pub struct PricingService {
    configurations: ConfigurationStore,
    catalog: InMemoryCatalog,
    engine: Arc<PricingEngine>,
}

impl PricingService {
    pub fn new(
        configurations: ConfigurationStore,
        catalog: InMemoryCatalog,
        engine: PricingEngine,
    ) -> Self {
        PricingService {
            configurations,
            catalog,
            engine: Arc::new(engine),
        }
    }

    /// Prices a stored configuration. A validated configuration advances to
    /// PRICED; an unvalidated one is priced but left as it is.
    pub fn calculate_price(&self, request: &PricingRequest) -> ServiceResult<PricingResult> {
        let configuration = self
            .configurations
            .get(&request.configuration_id)
            .ok_or_else(|| CoreError::ConfigurationNotFound(request.configuration_id.clone()))?;

        let result = self.price_configuration(&configuration, request);

        let advanced = self
            .configurations
            .update(&configuration.id, RackConfiguration::mark_priced)
            .unwrap_or(false);
        debug!(
            configuration_id = %configuration.id,
            advanced,
            "Configuration priced"
        );

        Ok(result)
    }

    /// Prices `configuration` without touching the store.
    pub fn price_configuration(
        &self,
        configuration: &RackConfiguration,
        request: &PricingRequest,
    ) -> PricingResult {
        let ctx = PricingContext::from_configuration(configuration, &self.catalog, request);
        self.engine.price(&ctx)
    }

    /// Strategy names in execution order.
    pub fn strategy_names(&self) -> Vec<String> {
        self.engine
            .strategy_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration_service::{AddComponent, ConfigurationService, NewConfiguration};
    use crate::seed::load_sample_catalog;
    use rackcpq_core::{ConfigurationStatus, ConfigurationValidator, PricingOptions};

    fn services() -> (ConfigurationService, PricingService) {
        let catalog = InMemoryCatalog::new();
        load_sample_catalog(&catalog);
        let store = ConfigurationStore::new();
        (
            ConfigurationService::new(
                store.clone(),
                catalog.clone(),
                ConfigurationValidator::default(),
            ),
            PricingService::new(store, catalog, PricingEngine::default()),
        )
    }

    fn edge_rack(configs: &ConfigurationService) -> String {
        let config = configs
            .create(NewConfiguration {
                name: "Edge POP".to_string(),
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
        config.id
    }

    #[test]
    fn test_price_with_partner_tier() {
        let (configs, pricing) = services();
        let id = edge_rack(&configs);

        let result = pricing
            .calculate_price(&PricingRequest::new(id.clone()).with_customer_tier("partner"))
            .unwrap();

        // 2 x 4599.99 + 1299.99 + 2499.99
        assert_eq!(result.subtotal().cents(), 1_299_996);
        assert_eq!(result.total_discount().cents(), 194_999);
        assert_eq!(result.grand_total().cents(), 1_104_997);
        assert_eq!(result.line_items().len(), 3);
        assert_eq!(result.line_items()[2].sku, "RACK-42U-STD");
    }

    #[test]
    fn test_priced_status_only_after_validation() {
        let (configs, pricing) = services();
        let id = edge_rack(&configs);

        pricing.calculate_price(&PricingRequest::new(id.clone())).unwrap();
        assert_eq!(configs.get(&id).unwrap().status(), ConfigurationStatus::Draft);

        configs.validate(&id).unwrap();
        pricing.calculate_price(&PricingRequest::new(id.clone())).unwrap();
        assert_eq!(configs.get(&id).unwrap().status(), ConfigurationStatus::Priced);
    }

    #[test]
    fn test_support_add_on() {
        let (configs, pricing) = services();
        let id = edge_rack(&configs);

        let options = PricingOptions::new()
            .with("include_support", true)
            .with("support_tier", "premium");
        let result = pricing
            .calculate_price(&PricingRequest::new(id).with_options(options))
            .unwrap();

        // 20% of 12999.96
        assert_eq!(result.service_add_on().cents(), 259_999);
        assert_eq!(result.grand_total().cents(), 1_299_996 + 259_999);
    }

    #[test]
    fn test_unknown_configuration() {
        let (_, pricing) = services();
        let err = pricing
            .calculate_price(&PricingRequest::new("missing"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_strategy_names() {
        let (_, pricing) = services();
        assert_eq!(
            pricing.strategy_names(),
            vec![
                "BasePrice",
                "VolumeDiscount",
                "BundleDiscount",
                "PartnerDiscount",
                "SupportAddOn"
            ]
        );
    }
}
