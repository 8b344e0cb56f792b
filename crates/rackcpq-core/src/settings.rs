//! # Engine Settings
//!
//! Tunables for the rules, strategies and quote snapshots. Every field
//! carries a serde default so a partial `rackcpq.toml` section still
//! deserializes; loading the file itself happens in rackcpq-service.
//!
//! ```toml
//! [pricing]
//! volume_threshold = 5
//! volume_discount_percent = 10
//! partner_discount_percent = 15
//!
//! [validation]
//! power_warning_percent = 80
//!
//! [quotes]
//! validity_days = 30
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Percentage;

fn check_percent(field: &str, value: u32) -> Result<(), ValidationError> {
    if value > 100 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Validation Settings
// =============================================================================

/// Thresholds for the feasibility rules, as whole percents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Power Budget warns once draw reaches this share of PSU capacity.
    #[serde(default = "default_power_warning_percent")]
    pub power_warning_percent: u32,

    /// Rack Capacity warns once used units reach this share of the rack.
    #[serde(default = "default_rack_warning_percent")]
    pub rack_warning_percent: u32,

    /// Redundant PSU suggests a second PSU from this many switches up.
    #[serde(default = "default_redundancy_switch_threshold")]
    pub redundancy_switch_threshold: i64,

    /// Redundant PSU warns when a lone PSU carries more than this share.
    #[serde(default = "default_single_psu_load_percent")]
    pub single_psu_load_percent: u32,
}

fn default_power_warning_percent() -> u32 {
    80
}
fn default_rack_warning_percent() -> u32 {
    90
}
fn default_redundancy_switch_threshold() -> i64 {
    3
}
fn default_single_psu_load_percent() -> u32 {
    50
}

impl Default for ValidationSettings {
    fn default() -> Self {
        ValidationSettings {
            power_warning_percent: default_power_warning_percent(),
            rack_warning_percent: default_rack_warning_percent(),
            redundancy_switch_threshold: default_redundancy_switch_threshold(),
            single_psu_load_percent: default_single_psu_load_percent(),
        }
    }
}

impl ValidationSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_percent("validation.power_warning_percent", self.power_warning_percent)?;
        check_percent("validation.rack_warning_percent", self.rack_warning_percent)?;
        check_percent("validation.single_psu_load_percent", self.single_psu_load_percent)?;
        check_positive(
            "validation.redundancy_switch_threshold",
            self.redundancy_switch_threshold,
        )
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

/// Discount and add-on rates for the pricing strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Switch quantity that must be exceeded (strictly) for volume pricing.
    #[serde(default = "default_volume_threshold")]
    pub volume_threshold: i64,

    #[serde(default = "default_volume_discount_percent")]
    pub volume_discount_percent: u32,

    /// Rack utilization percent at which the bundle discount applies.
    #[serde(default = "default_bundle_utilization_threshold")]
    pub bundle_utilization_threshold: i64,

    #[serde(default = "default_bundle_discount_percent")]
    pub bundle_discount_percent: u32,

    #[serde(default = "default_partner_discount_percent")]
    pub partner_discount_percent: u32,

    #[serde(default = "default_enterprise_discount_percent")]
    pub enterprise_discount_percent: u32,

    #[serde(default = "default_support_standard_percent")]
    pub support_standard_percent: u32,

    #[serde(default = "default_support_premium_percent")]
    pub support_premium_percent: u32,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_volume_threshold() -> i64 {
    5
}
fn default_volume_discount_percent() -> u32 {
    10
}
fn default_bundle_utilization_threshold() -> i64 {
    80
}
fn default_bundle_discount_percent() -> u32 {
    5
}
fn default_partner_discount_percent() -> u32 {
    15
}
fn default_enterprise_discount_percent() -> u32 {
    20
}
fn default_support_standard_percent() -> u32 {
    15
}
fn default_support_premium_percent() -> u32 {
    20
}
fn default_currency() -> String {
    "USD".to_string()
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            volume_threshold: default_volume_threshold(),
            volume_discount_percent: default_volume_discount_percent(),
            bundle_utilization_threshold: default_bundle_utilization_threshold(),
            bundle_discount_percent: default_bundle_discount_percent(),
            partner_discount_percent: default_partner_discount_percent(),
            enterprise_discount_percent: default_enterprise_discount_percent(),
            support_standard_percent: default_support_standard_percent(),
            support_premium_percent: default_support_premium_percent(),
            currency: default_currency(),
        }
    }
}

impl PricingSettings {
    pub fn volume_discount(&self) -> Percentage {
        Percentage::from_whole(self.volume_discount_percent)
    }

    pub fn bundle_discount(&self) -> Percentage {
        Percentage::from_whole(self.bundle_discount_percent)
    }

    pub fn partner_discount(&self) -> Percentage {
        Percentage::from_whole(self.partner_discount_percent)
    }

    pub fn enterprise_discount(&self) -> Percentage {
        Percentage::from_whole(self.enterprise_discount_percent)
    }

    pub fn support_standard(&self) -> Percentage {
        Percentage::from_whole(self.support_standard_percent)
    }

    pub fn support_premium(&self) -> Percentage {
        Percentage::from_whole(self.support_premium_percent)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("pricing.volume_threshold", self.volume_threshold)?;
        check_positive(
            "pricing.bundle_utilization_threshold",
            self.bundle_utilization_threshold,
        )?;
        for (field, value) in [
            ("pricing.volume_discount_percent", self.volume_discount_percent),
            ("pricing.bundle_discount_percent", self.bundle_discount_percent),
            ("pricing.partner_discount_percent", self.partner_discount_percent),
            ("pricing.enterprise_discount_percent", self.enterprise_discount_percent),
            ("pricing.support_standard_percent", self.support_standard_percent),
            ("pricing.support_premium_percent", self.support_premium_percent),
        ] {
            check_percent(field, value)?;
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidFormat {
                field: "pricing.currency".to_string(),
                reason: "must be a three-letter ISO code like USD".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Quote Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSettings {
    /// Days from creation until a quote expires.
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,

    /// Leading segment of quote numbers (`QT-20260101-00001`).
    #[serde(default = "default_number_prefix")]
    pub number_prefix: String,

    /// Seconds between sweeps that expire overdue quotes.
    #[serde(default = "default_expiry_interval_secs")]
    pub expiry_interval_secs: u64,
}

fn default_validity_days() -> i64 {
    30
}
fn default_number_prefix() -> String {
    "QT".to_string()
}
fn default_expiry_interval_secs() -> u64 {
    86_400
}

impl Default for QuoteSettings {
    fn default() -> Self {
        QuoteSettings {
            validity_days: default_validity_days(),
            number_prefix: default_number_prefix(),
            expiry_interval_secs: default_expiry_interval_secs(),
        }
    }
}

impl QuoteSettings {
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::days(self.validity_days)
    }

    pub fn expiry_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.expiry_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("quotes.validity_days", self.validity_days)?;
        if self.expiry_interval_secs == 0 {
            return Err(ValidationError::MustBePositive {
                field: "quotes.expiry_interval_secs".to_string(),
            });
        }
        if self.number_prefix.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "quotes.number_prefix".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ValidationSettings::default().validate().is_ok());
        assert!(PricingSettings::default().validate().is_ok());
        assert!(QuoteSettings::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut pricing = PricingSettings::default();
        pricing.partner_discount_percent = 101;
        assert!(pricing.validate().is_err());

        let mut pricing = PricingSettings::default();
        pricing.currency = "usd".to_string();
        assert!(pricing.validate().is_err());

        let mut validation = ValidationSettings::default();
        validation.redundancy_switch_threshold = 0;
        assert!(validation.validate().is_err());

        let mut quotes = QuoteSettings::default();
        quotes.validity_days = 0;
        assert!(quotes.validate().is_err());

        let mut quotes = QuoteSettings::default();
        quotes.expiry_interval_secs = 0;
        assert!(quotes.validate().is_err());
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let pricing: PricingSettings = serde_json::from_str(r#"{"volume_threshold": 10}"#).unwrap();
        assert_eq!(pricing.volume_threshold, 10);
        assert_eq!(pricing.volume_discount_percent, 10);
        assert_eq!(pricing.enterprise_discount(), Percentage::from_whole(20));
    }
}
