//! # Application Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RACKCPQ_LOG=debug                                                  │
//! │     RACKCPQ_QUOTE_VALIDITY_DAYS=14                                     │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rackcpq/rackcpq.toml (Linux)                             │
//! │     ~/Library/Application Support/com.rackcpq.rackcpq/rackcpq.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [pricing]
//! volume_threshold = 5
//! volume_discount_percent = 10
//! bundle_utilization_threshold = 80
//! partner_discount_percent = 15
//! currency = "USD"
//!
//! [validation]
//! power_warning_percent = 80
//! rack_warning_percent = 90
//!
//! [quotes]
//! validity_days = 30
//! number_prefix = "QT"
//! expiry_interval_secs = 86400
//!
//! [documents]
//! generation_delay_ms = 3000
//! channel_capacity = 64
//!
//! [logging]
//! filter = "info,rackcpq_core=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

use rackcpq_core::{PricingSettings, QuoteSettings, ValidationError, ValidationSettings};

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Document Settings
// =============================================================================

/// Settings for the asynchronous quote document worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSettings {
    /// Simulated document rendering time (milliseconds).
    #[serde(default = "default_generation_delay_ms")]
    pub generation_delay_ms: u64,

    /// Capacity of the request channel feeding the worker.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_generation_delay_ms() -> u64 {
    3000
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            generation_delay_ms: default_generation_delay_ms(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl DocumentSettings {
    pub fn generation_delay(&self) -> Duration {
        Duration::from_millis(self.generation_delay_ms)
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub validation: ValidationSettings,

    #[serde(default)]
    pub quotes: QuoteSettings,

    #[serde(default)]
    pub documents: DocumentSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rackcpq.toml); a missing file is not an error
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if anything fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses one TOML file without applying overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validates every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.pricing.validate()?;
        self.validation.validate()?;
        self.quotes.validate()?;

        if self.documents.channel_capacity == 0 {
            return Err(ConfigError::Invalid(ValidationError::MustBePositive {
                field: "documents.channel_capacity".to_string(),
            }));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid(ValidationError::Required {
                field: "logging.filter".to_string(),
            }));
        }

        Ok(())
    }

    /// Applies `RACKCPQ_*` environment variable overrides.
    fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Applies overrides from any variable source. Unparseable numbers are
    /// rejected rather than ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(filter) = lookup("RACKCPQ_LOG") {
            debug!(filter = %filter, "Overriding log filter from environment");
            self.logging.filter = filter;
        }

        if let Some(currency) = lookup("RACKCPQ_CURRENCY") {
            self.pricing.currency = currency;
        }

        if let Some(prefix) = lookup("RACKCPQ_QUOTE_PREFIX") {
            self.quotes.number_prefix = prefix;
        }

        if let Some(days) = parse_override(&lookup, "RACKCPQ_QUOTE_VALIDITY_DAYS")? {
            debug!(days, "Overriding quote validity from environment");
            self.quotes.validity_days = days;
        }

        if let Some(secs) = parse_override(&lookup, "RACKCPQ_QUOTE_EXPIRY_INTERVAL_SECS")? {
            self.quotes.expiry_interval_secs = secs;
        }

        if let Some(pct) = parse_override(&lookup, "RACKCPQ_PARTNER_DISCOUNT_PERCENT")? {
            self.pricing.partner_discount_percent = pct;
        }

        if let Some(pct) = parse_override(&lookup, "RACKCPQ_ENTERPRISE_DISCOUNT_PERCENT")? {
            self.pricing.enterprise_discount_percent = pct;
        }

        if let Some(ms) = parse_override(&lookup, "RACKCPQ_DOCUMENT_DELAY_MS")? {
            self.documents.generation_delay_ms = ms;
        }

        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rackcpq", "rackcpq")
            .map(|dirs| dirs.config_dir().join("rackcpq.toml"))
    }
}

fn parse_override<T, F>(lookup: &F, var: &str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Environment {
                var: var.to_string(),
                reason: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.quotes.validity_days, 30);
        assert_eq!(config.documents.generation_delay(), Duration::from_secs(3));
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[pricing]\nvolume_threshold = 8\n\n[documents]\ngeneration_delay_ms = 10\n"
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pricing.volume_threshold, 8);
        assert_eq!(config.pricing.volume_discount_percent, 10);
        assert_eq!(config.documents.generation_delay_ms, 10);
        assert_eq!(config.documents.channel_capacity, 64);
        assert_eq!(config.quotes, QuoteSettings::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.pricing, PricingSettings::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rackcpq.toml");
        std::fs::write(&path, "[quotes]\nvalidity_days = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(Some(path.clone())),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "[quotes\n").unwrap();
        assert!(matches!(AppConfig::load(Some(path)), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_overrides() {
        let env = vars(&[
            ("RACKCPQ_LOG", "debug"),
            ("RACKCPQ_QUOTE_VALIDITY_DAYS", "14"),
            ("RACKCPQ_PARTNER_DISCOUNT_PERCENT", "12"),
            ("RACKCPQ_QUOTE_EXPIRY_INTERVAL_SECS", "3600"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.quotes.validity_days, 14);
        assert_eq!(config.quotes.expiry_interval_secs, 3600);
        assert_eq!(config.pricing.partner_discount_percent, 12);
        assert_eq!(config.pricing.enterprise_discount_percent, 20);
    }

    #[test]
    fn test_bad_override_is_an_error() {
        let env = vars(&[("RACKCPQ_DOCUMENT_DELAY_MS", "soon")]);
        let mut config = AppConfig::default();
        let err = config.apply_overrides(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("RACKCPQ_DOCUMENT_DELAY_MS"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        assert!(text.contains("[pricing]"));
        assert!(text.contains("[documents]"));
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
