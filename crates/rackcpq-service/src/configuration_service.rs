//! # Configuration Service
//!
//! CRUD over rack configurations plus the validation entry point.
//!
//! ## Edit/Validate Cycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  create() ──► DRAFT ──► add_component() / update() / remove_component() │
//! │                 ▲                     │                                 │
//! │                 │ any edit            ▼                                 │
//! │                 │              validate() ── invalid ──► DRAFT + errors  │
//! │                 │                     │                                 │
//! │                 │                   valid                               │
//! │                 │                     ▼                                 │
//! │                 └─────────────── VALIDATED ──► priced / quoted          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation runs inside the store's write lock, so the validation
//! result recorded by [`ConfigurationService::validate`] always belongs to
//! the item list it was computed from.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use rackcpq_core::{
    ConfigurationValidator, CoreError, CoreResult, ProductCatalog, RackConfiguration,
    ValidationSummary,
};

use crate::error::ServiceResult;
use crate::store::{ConfigurationStore, InMemoryCatalog};

// =============================================================================
// Requests
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewConfiguration {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub rack_sku: Option<String>,
}

/// Partial update. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigurationUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub rack_sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddComponent {
    pub product_sku: String,
    /// Zero or negative is treated as 1.
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub position: Option<u32>,
}

fn default_quantity() -> i64 {
    1
}

impl AddComponent {
    pub fn new(product_sku: impl Into<String>, quantity: i64) -> Self {
        AddComponent {
            product_sku: product_sku.into(),
            quantity,
            position: None,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

#[derive(Clone)]
pub struct ConfigurationService {
    configurations: ConfigurationStore,
    catalog: InMemoryCatalog,
    validator: Arc<ConfigurationValidator>,
}

impl ConfigurationService {
    pub fn new(
        configurations: ConfigurationStore,
        catalog: InMemoryCatalog,
        validator: ConfigurationValidator,
    ) -> Self {
        ConfigurationService {
            configurations,
            catalog,
            validator: Arc::new(validator),
        }
    }

    /// Runs `f` on the stored configuration under the write lock.
    fn modify<R, F>(&self, id: &str, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut RackConfiguration) -> CoreResult<R>,
    {
        let outcome = self
            .configurations
            .update(id, f)
            .ok_or_else(|| CoreError::ConfigurationNotFound(id.to_string()))?;
        Ok(outcome?)
    }

    pub fn create(&self, request: NewConfiguration) -> ServiceResult<RackConfiguration> {
        let mut configuration = RackConfiguration::new(request.name.trim());
        configuration.set_details(Some(request.name.trim().to_string()), request.description)?;
        configuration.customer_id = request.customer_id;
        configuration.set_rack_sku(request.rack_sku)?;

        info!(
            configuration_id = %configuration.id,
            name = %configuration.name,
            "Configuration created"
        );
        self.configurations
            .insert(configuration.id.clone(), configuration.clone());
        Ok(configuration)
    }

    pub fn get(&self, id: &str) -> ServiceResult<RackConfiguration> {
        Ok(self
            .configurations
            .get(id)
            .ok_or_else(|| CoreError::ConfigurationNotFound(id.to_string()))?)
    }

    /// All configurations, oldest first.
    pub fn list(&self) -> Vec<RackConfiguration> {
        let mut all = self.configurations.values();
        all.sort_by_key(|c| c.created_at);
        all
    }

    pub fn list_by_customer(&self, customer_id: &str) -> Vec<RackConfiguration> {
        let mut found = self
            .configurations
            .find(|c| c.customer_id.as_deref() == Some(customer_id));
        found.sort_by_key(|c| c.created_at);
        found
    }

    /// Applies a partial update. Only a changed rack SKU resets validation.
    pub fn update(&self, id: &str, update: ConfigurationUpdate) -> ServiceResult<RackConfiguration> {
        let updated = self.modify(id, |configuration| {
            configuration.set_details(update.name, update.description)?;
            if update.customer_id.is_some() {
                configuration.customer_id = update.customer_id;
            }
            if update.rack_sku.is_some() && update.rack_sku.as_deref() != configuration.rack_sku() {
                configuration.set_rack_sku(update.rack_sku)?;
            }
            Ok(configuration.clone())
        })?;
        debug!(configuration_id = %id, "Configuration updated");
        Ok(updated)
    }

    /// Adds a catalog product. The SKU must resolve; the product name is
    /// copied onto the item.
    pub fn add_component(
        &self,
        configuration_id: &str,
        request: AddComponent,
    ) -> ServiceResult<RackConfiguration> {
        let sku = request.product_sku.trim();
        let product = self
            .catalog
            .get_product_by_sku(sku)
            .ok_or_else(|| CoreError::ProductNotFound(sku.to_string()))?;
        let quantity = if request.quantity > 0 { request.quantity } else { 1 };

        let updated = self.modify(configuration_id, |configuration| {
            configuration.add_item(sku, Some(product.name.clone()), quantity, request.position)?;
            Ok(configuration.clone())
        })?;

        info!(
            configuration_id = %configuration_id,
            sku = %sku,
            quantity,
            "Component added"
        );
        Ok(updated)
    }

    pub fn remove_component(
        &self,
        configuration_id: &str,
        item_id: &str,
    ) -> ServiceResult<RackConfiguration> {
        let updated = self.modify(configuration_id, |configuration| {
            configuration.remove_item(item_id)?;
            Ok(configuration.clone())
        })?;
        info!(configuration_id = %configuration_id, item_id = %item_id, "Component removed");
        Ok(updated)
    }

    pub fn update_quantity(
        &self,
        configuration_id: &str,
        item_id: &str,
        quantity: i64,
    ) -> ServiceResult<RackConfiguration> {
        self.modify(configuration_id, |configuration| {
            configuration.update_item_quantity(item_id, quantity)?;
            Ok(configuration.clone())
        })
    }

    /// Runs the feasibility rules and records the outcome on the
    /// configuration.
    pub fn validate(&self, configuration_id: &str) -> ServiceResult<ValidationSummary> {
        self.modify(configuration_id, |configuration| {
            let summary = self.validator.validate(configuration, &self.catalog);
            configuration.record_validation(&summary);
            Ok(summary)
        })
    }

    /// Copies a configuration under a new id. The copy starts as DRAFT and
    /// is named `"{name} (Copy)"` unless `new_name` is given.
    pub fn duplicate(
        &self,
        configuration_id: &str,
        new_name: Option<String>,
    ) -> ServiceResult<RackConfiguration> {
        let source = self.get(configuration_id)?;
        let mut copy = source.duplicate();
        if let Some(name) = new_name {
            copy.set_details(Some(name), None)?;
        }

        info!(
            source_id = %configuration_id,
            configuration_id = %copy.id,
            "Configuration duplicated"
        );
        self.configurations.insert(copy.id.clone(), copy.clone());
        Ok(copy)
    }

    pub fn delete(&self, configuration_id: &str) -> ServiceResult<()> {
        self.configurations
            .remove(configuration_id)
            .ok_or_else(|| CoreError::ConfigurationNotFound(configuration_id.to_string()))?;
        info!(configuration_id = %configuration_id, "Configuration deleted");
        Ok(())
    }

    /// Feasibility rule names in execution order.
    pub fn rule_names(&self) -> Vec<String> {
        self.validator
            .rule_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
