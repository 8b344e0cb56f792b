//! # Error Types
//!
//! Domain-specific error types for rackcpq-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rackcpq-core errors (this file)                                       │
//! │  ├── CoreError        - Precondition and lifecycle failures            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  Pipeline unit failures (isolated, never propagated)                   │
//! │  ├── RuleFailure      - validation::RuleFailure                        │
//! │  └── StrategyFailure  - pricing::StrategyFailure                       │
//! │                                                                         │
//! │  rackcpq-service errors (separate crate)                               │
//! │  └── ServiceError     - wraps CoreError, adds config/channel failures  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Feasibility and pricing outcomes are never errors. A configuration
//! that blows its power budget produces a `ValidationSummary` with
//! `valid == false`, not an `Err`.

use thiserror::Error;

use crate::quote::QuoteStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Caller-visible precondition failures.
///
/// Each variant aborts the single operation that raised it and nothing
/// else. Quote creation distinguishes "not found", "not validated" and
/// "pricing unavailable" so callers can tell the user which step to fix.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration id does not exist.
    #[error("Configuration not found: {0}")]
    ConfigurationNotFound(String),

    /// Configuration item id does not exist within its configuration.
    #[error("Configuration item not found: {0}")]
    ItemNotFound(String),

    /// Product SKU does not resolve in the catalog.
    ///
    /// ## When This Occurs
    /// - Adding a component whose SKU is unknown
    ///
    /// Pipelines never raise this. Inside a validation run an unknown SKU
    /// becomes a Component Exists rule error instead.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Quote id or number does not exist.
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Quote creation requested for a configuration that has not passed
    /// validation since its last mutation.
    ///
    /// ## User Workflow
    /// ```text
    /// create_quote(config-123)
    ///      │
    ///      ▼
    /// configuration.validated == false
    ///      │
    ///      ▼
    /// ConfigurationNotValidated("config-123")
    ///      │
    ///      ▼
    /// UI: "Configuration must be validated before creating a quote"
    /// ```
    #[error("Configuration must be validated before creating a quote: {0}")]
    ConfigurationNotValidated(String),

    /// Pricing produced nothing to quote.
    ///
    /// ## When This Occurs
    /// - No configuration item or rack resolved to a catalog product
    #[error("Unable to calculate pricing for configuration {configuration_id}: {reason}")]
    PricingUnavailable {
        configuration_id: String,
        reason: String,
    },

    /// Quote is past its expiry and can no longer be accepted.
    #[error("Quote {0} has expired")]
    QuoteExpired(String),

    /// Quote is not in a status that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Accepting a quote that is still PENDING or GENERATING
    /// - Rejecting a quote that was already ACCEPTED
    /// - Sending a quote whose document is not READY
    #[error("Quote {quote_number} is {current}, cannot {operation}")]
    InvalidQuoteStatus {
        quote_number: String,
        current: QuoteStatus,
        operation: &'static str,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state changes, when user input doesn't meet basic
/// shape requirements (empty SKU, zero quantity, malformed email).
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
