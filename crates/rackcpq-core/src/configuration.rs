//! # Rack Configuration
//!
//! A named collection of catalog SKUs built around one base rack.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   DRAFT ──validate ok──► VALIDATED ──price──► PRICED ──quote──► QUOTED  │
//! │     ▲                        │                   │                 │    │
//! │     └────── add / remove / change quantity / change rack ──────────┘    │
//! │                                                                         │
//! │   QUOTED ──► ORDERED          any ──► ARCHIVED                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `validated == true` only ever holds when the last validation run passed
//! and nothing feasibility-relevant changed since. Every mutation below
//! goes through [`RackConfiguration::invalidate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::validation::input::{validate_configuration_name, validate_quantity, validate_sku};
use crate::validation::ValidationSummary;

// =============================================================================
// Status
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigurationStatus {
    #[default]
    Draft,
    Validated,
    Priced,
    Quoted,
    Ordered,
    Archived,
}

impl fmt::Display for ConfigurationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConfigurationStatus::Draft => "DRAFT",
            ConfigurationStatus::Validated => "VALIDATED",
            ConfigurationStatus::Priced => "PRICED",
            ConfigurationStatus::Quoted => "QUOTED",
            ConfigurationStatus::Ordered => "ORDERED",
            ConfigurationStatus::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Configuration Item
// =============================================================================

/// One component line: a SKU and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationItem {
    pub id: String,
    pub product_sku: String,
    /// Product name captured when the item was added.
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    /// Rack slot, 1-based from the bottom.
    #[serde(default)]
    pub position: Option<u32>,
}

impl ConfigurationItem {
    pub fn new(product_sku: impl Into<String>, quantity: u32) -> Self {
        ConfigurationItem {
            id: Uuid::new_v4().to_string(),
            product_sku: product_sku.into(),
            product_name: None,
            quantity,
            position: None,
        }
    }
}

// =============================================================================
// Rack Configuration
// =============================================================================

/// A named set of items on one rack.
///
/// `validated` implies no stored validation errors. Deserialization goes
/// through [`StoredConfiguration`] so a stored value cannot break that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredConfiguration")]
pub struct RackConfiguration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    rack_sku: Option<String>,
    #[serde(default)]
    items: Vec<ConfigurationItem>,
    #[serde(default)]
    status: ConfigurationStatus,
    #[serde(default)]
    validated: bool,
    #[serde(default)]
    validation_errors: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape of a [`RackConfiguration`], before the validation flag is
/// checked against the stored errors.
#[derive(Deserialize)]
struct StoredConfiguration {
    id: String,
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    customer_id: Option<String>,
    #[serde(default)]
    rack_sku: Option<String>,
    #[serde(default)]
    items: Vec<ConfigurationItem>,
    #[serde(default)]
    status: ConfigurationStatus,
    #[serde(default)]
    validated: bool,
    #[serde(default)]
    validation_errors: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StoredConfiguration> for RackConfiguration {
    fn from(stored: StoredConfiguration) -> Self {
        let consistent = !stored.validated || stored.validation_errors.is_empty();
        RackConfiguration {
            id: stored.id,
            name: stored.name,
            description: stored.description,
            customer_id: stored.customer_id,
            rack_sku: stored.rack_sku,
            items: stored.items,
            status: if consistent {
                stored.status
            } else {
                ConfigurationStatus::Draft
            },
            validated: stored.validated && consistent,
            validation_errors: stored.validation_errors,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

impl RackConfiguration {
    /// Creates an empty DRAFT configuration.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        RackConfiguration {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: None,
            customer_id: None,
            rack_sku: None,
            items: Vec::new(),
            status: ConfigurationStatus::Draft,
            validated: false,
            validation_errors: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn for_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_rack(mut self, rack_sku: impl Into<String>) -> Self {
        self.rack_sku = Some(rack_sku.into());
        self
    }

    /// Appends an item without input checks. Builder for fixtures and
    /// imports; interactive edits go through [`RackConfiguration::add_item`].
    pub fn with_item(mut self, product_sku: impl Into<String>, quantity: u32) -> Self {
        self.items.push(ConfigurationItem::new(product_sku, quantity));
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn rack_sku(&self) -> Option<&str> {
        self.rack_sku.as_deref()
    }

    pub fn items(&self) -> &[ConfigurationItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&ConfigurationItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn status(&self) -> ConfigurationStatus {
        self.status
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }

    /// Distinct item SKUs in first-seen order.
    pub fn distinct_skus(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            if !seen.contains(&item.product_sku.as_str()) {
                seen.push(&item.product_sku);
            }
        }
        seen
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Renames or re-describes. Does not affect feasibility.
    pub fn set_details(&mut self, name: Option<String>, description: Option<String>) -> CoreResult<()> {
        if let Some(name) = name {
            validate_configuration_name(&name)?;
            self.name = name;
        }
        if description.is_some() {
            self.description = description;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn set_rack_sku(&mut self, rack_sku: Option<String>) -> CoreResult<()> {
        if let Some(sku) = &rack_sku {
            validate_sku(sku)?;
        }
        self.rack_sku = rack_sku;
        self.invalidate();
        Ok(())
    }

    /// Adds a component line and returns its item id.
    pub fn add_item(
        &mut self,
        product_sku: &str,
        product_name: Option<String>,
        quantity: i64,
        position: Option<u32>,
    ) -> CoreResult<String> {
        validate_sku(product_sku)?;
        let quantity = validate_quantity(quantity)?;

        let mut item = ConfigurationItem::new(product_sku.trim(), quantity);
        item.product_name = product_name;
        item.position = position;
        let id = item.id.clone();

        self.items.push(item);
        self.invalidate();
        Ok(id)
    }

    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<ConfigurationItem> {
        let index = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        let removed = self.items.remove(index);
        self.invalidate();
        Ok(removed)
    }

    pub fn update_item_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        let quantity = validate_quantity(quantity)?;
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))?;
        item.quantity = quantity;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.validated = false;
        self.validation_errors.clear();
        self.status = ConfigurationStatus::Draft;
        self.updated_at = Utc::now();
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Stores the outcome of a validation run.
    pub fn record_validation(&mut self, summary: &ValidationSummary) {
        self.validated = summary.valid;
        self.validation_errors = summary.all_errors();
        self.status = if summary.valid {
            ConfigurationStatus::Validated
        } else {
            ConfigurationStatus::Draft
        };
        self.updated_at = Utc::now();
    }

    /// Advances VALIDATED → PRICED. Returns whether the status changed.
    pub fn mark_priced(&mut self) -> bool {
        self.advance(ConfigurationStatus::Validated, ConfigurationStatus::Priced)
    }

    /// Advances VALIDATED or PRICED → QUOTED.
    pub fn mark_quoted(&mut self) -> bool {
        self.advance(ConfigurationStatus::Validated, ConfigurationStatus::Quoted)
            || self.advance(ConfigurationStatus::Priced, ConfigurationStatus::Quoted)
    }

    fn advance(&mut self, from: ConfigurationStatus, to: ConfigurationStatus) -> bool {
        if self.validated && self.status == from {
            self.status = to;
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }

    /// Copy with a fresh identity: new ids, `"{name} (Copy)"`, DRAFT.
    pub fn duplicate(&self) -> RackConfiguration {
        let mut copy = RackConfiguration::new(format!("{} (Copy)", self.name));
        copy.description = self.description.clone();
        copy.customer_id = self.customer_id.clone();
        copy.rack_sku = self.rack_sku.clone();
        copy.items = self
            .items
            .iter()
            .map(|item| ConfigurationItem {
                id: Uuid::new_v4().to_string(),
                ..item.clone()
            })
            .collect();
        copy
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
