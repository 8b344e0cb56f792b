//! # Catalog Types
//!
//! Products as the pipelines see them: a SKU, a type, a price and a bag
//! of loosely typed attributes.
//!
//! ## Attribute Reads
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  attributes: { "power_draw": 350, "rack_units": 1, "poe": true }       │
//! │                                                                         │
//! │  power_draw()      → Some(350)      numeric, any representation        │
//! │  capacity_watts()  → None           absent, NOT zero                   │
//! │  rack_units()      → 1              absent would read as 0             │
//! │  requires_power()  → flag, else type == SWITCH                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product Type
// =============================================================================

/// Product category. Rules key off RACK, SWITCH and PSU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    Rack,
    Switch,
    Psu,
    Cable,
    SfpModule,
    Accessory,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Rack => "RACK",
            ProductType::Switch => "SWITCH",
            ProductType::Psu => "PSU",
            ProductType::Cable => "CABLE",
            ProductType::SfpModule => "SFP_MODULE",
            ProductType::Accessory => "ACCESSORY",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RACK" => Ok(ProductType::Rack),
            "SWITCH" => Ok(ProductType::Switch),
            "PSU" => Ok(ProductType::Psu),
            "CABLE" => Ok(ProductType::Cable),
            "SFP_MODULE" | "SFP" => Ok(ProductType::SfpModule),
            "ACCESSORY" => Ok(ProductType::Accessory),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: [
                    ProductType::Rack,
                    ProductType::Switch,
                    ProductType::Psu,
                    ProductType::Cable,
                    ProductType::SfpModule,
                    ProductType::Accessory,
                ]
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            }),
        }
    }
}

// =============================================================================
// Attribute Value
// =============================================================================

/// A loosely typed product attribute.
///
/// Numeric reads coerce between integer and float representations so a
/// catalog that stores `350.0` still yields `power_draw() == Some(350)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttributeValue>),
}

impl AttributeValue {
    /// Integer view. Floats truncate toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(v) => Some(*v),
            AttributeValue::Float(v) => Some(v.trunc() as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(v) => Some(*v as f64),
            AttributeValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Integer(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Integer(v as i64)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

// =============================================================================
// Product
// =============================================================================

fn default_currency() -> String {
    "USD".to_string()
}

fn default_active() -> bool {
    true
}

/// Read-only reference data for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub base_price: Money,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub compatibility_rules: BTreeMap<String, AttributeValue>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates an active USD product with no attributes.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        product_type: ProductType,
        base_price: Money,
    ) -> Self {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.into(),
            name: name.into(),
            description: None,
            product_type,
            base_price,
            currency: default_currency(),
            attributes: BTreeMap::new(),
            compatibility_rules: BTreeMap::new(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn with_compatibility_rule(mut self, key: &str, value: impl Into<AttributeValue>) -> Self {
        self.compatibility_rules.insert(key.to_string(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn attribute_i64(&self, key: &str) -> Option<i64> {
        self.attribute(key).and_then(AttributeValue::as_i64)
    }

    pub fn attribute_bool(&self, key: &str) -> Option<bool> {
        self.attribute(key).and_then(AttributeValue::as_bool)
    }

    pub fn is_type(&self, product_type: ProductType) -> bool {
        self.product_type == product_type
    }

    /// Watts drawn per unit, if declared.
    pub fn power_draw(&self) -> Option<i64> {
        self.attribute_i64("power_draw")
    }

    /// Watts supplied per unit, if declared (PSUs).
    pub fn capacity_watts(&self) -> Option<i64> {
        self.attribute_i64("capacity_watts")
    }

    /// Rack units consumed per unit. Vertical-mount gear declares 0;
    /// an absent attribute also reads as 0.
    pub fn rack_units(&self) -> i64 {
        self.attribute_i64("rack_units").unwrap_or(0)
    }

    /// Total units a rack provides (the rack's `units` attribute).
    pub fn total_rack_units(&self) -> Option<i64> {
        self.attribute_i64("units")
    }

    /// Whether this product needs a PSU.
    ///
    /// Reads `requires_power` from attributes, then compatibility rules;
    /// when neither declares it, switches require power and nothing else
    /// does.
    pub fn requires_power(&self) -> bool {
        self.attribute_bool("requires_power")
            .or_else(|| {
                self.compatibility_rules
                    .get("requires_power")
                    .and_then(AttributeValue::as_bool)
            })
            .unwrap_or(self.product_type == ProductType::Switch)
    }
}

// =============================================================================
// Catalog Lookup
// =============================================================================

/// SKU lookup used by context builders.
///
/// Absence is an ordinary answer. Unknown SKUs feed the Rack Required and
/// Component Exists rules rather than failing the lookup.
pub trait ProductCatalog {
    fn get_product_by_sku(&self, sku: &str) -> Option<Product>;
}

impl ProductCatalog for HashMap<String, Product> {
    fn get_product_by_sku(&self, sku: &str) -> Option<Product> {
        self.get(sku).cloned()
    }
}

impl<C: ProductCatalog + ?Sized> ProductCatalog for &C {
    fn get_product_by_sku(&self, sku: &str) -> Option<Product> {
        (**self).get_product_by_sku(sku)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
