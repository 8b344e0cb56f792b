//! # Input Validation
//!
//! Shape checks for user input, run before anything is stored.
//!
//! These are distinct from the feasibility rules in [`super::rules`]:
//! an input error rejects the edit outright, while a feasibility problem
//! is reported as data in a `ValidationSummary`.
//!
//! ```rust
//! use rackcpq_core::validation::input::{validate_sku, validate_quantity};
//!
//! assert!(validate_sku("SW-CATALYST-9300-24").is_ok());
//! assert_eq!(validate_quantity(4).unwrap(), 4);
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_SKU_LENGTH};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validates a catalog SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Letters, numbers, hyphens and underscores only
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a configuration name: non-empty, at most 200 characters.
pub fn validate_configuration_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates a component quantity and narrows it to `u32`.
///
/// ## User Workflow
/// ```text
/// add_component(sku, qty)
///      │
///      ├── qty <= 0 at the request edge? → coerced to 1 by the caller
///      │
///      ▼
/// validate_quantity(qty) ← THIS FUNCTION
///      │
///      ├── qty <= 0       → MustBePositive
///      ├── qty > 10,000   → OutOfRange
///      └── OK             → stored on the item
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(qty as u32)
}

/// Validates a customer email: one `@` with non-empty local part and a
/// dotted domain.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return Err(invalid());
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
