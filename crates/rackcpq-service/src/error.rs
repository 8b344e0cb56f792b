//! # Service Error Types
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Domain         │  │  Configuration  │  │  Messaging              │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Core(..)       │  │  ConfigError    │  │  Channel                │ │
//! │  │  not found      │  │  read / parse   │  │  ShuttingDown           │ │
//! │  │  preconditions  │  │  invalid values │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use rackcpq_core::{CoreError, ValidationError};

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain failure from rackcpq-core (not found, precondition, input).
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    Channel(String),

    #[error("Document worker is shutting down")]
    ShuttingDown,
}

impl From<ValidationError> for ServiceError {
    fn from(err: ValidationError) -> Self {
        ServiceError::Core(CoreError::Validation(err))
    }
}

impl ServiceError {
    /// True for lookups of ids, numbers or SKUs that do not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::Core(
                CoreError::ConfigurationNotFound(_)
                    | CoreError::ItemNotFound(_)
                    | CoreError::ProductNotFound(_)
                    | CoreError::QuoteNotFound(_)
            )
        )
    }

    /// True when the request was well-formed but the entity's state forbids it.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ServiceError::Core(
                CoreError::ConfigurationNotValidated(_)
                    | CoreError::PricingUnavailable { .. }
                    | CoreError::QuoteExpired(_)
                    | CoreError::InvalidQuoteStatus { .. }
            )
        )
    }
}

// =============================================================================
// Configuration Loading Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid setting: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Invalid environment override {var}: {reason}")]
    Environment { var: String, reason: String },
}
