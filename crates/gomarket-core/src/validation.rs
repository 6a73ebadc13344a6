//! # Validation Module
//!
//! Input validation for products entering the cart.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (TypeScript)                                      │
//! │  └── Product list only offers catalogue items                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: CartStore::add_to_cart (Rust)                                │
//! │  └── THIS MODULE: id present, price not negative                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Cart (pure)                                                  │
//! │  └── id uniqueness, quantity never below zero                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gomarket_core::validation::{validate_new_item, validate_product_id};
//! use gomarket_core::{Money, NewLineItem};
//!
//! assert!(validate_product_id("42").is_ok());
//! assert!(validate_new_item(&NewLineItem::new("", "Cap", "u", Money::zero())).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::NewLineItem;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product id accepted.
pub const MAX_PRODUCT_ID_LENGTH: usize = 256;

/// Validates a product id.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_PRODUCT_ID_LENGTH`] characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if id.chars().count() > MAX_PRODUCT_ID_LENGTH {
        return Err(ValidationError::TooLong {
            field: "id".to_string(),
            max: MAX_PRODUCT_ID_LENGTH,
        });
    }

    Ok(())
}

/// Validates a unit price: zero (free items) is fine, negative is not.
pub fn validate_unit_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::MustBeNonNegative {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a product before it is added to the cart.
pub fn validate_new_item(item: &NewLineItem) -> ValidationResult<()> {
    validate_product_id(&item.id)?;
    validate_unit_price(item.unit_price)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("1").is_ok());
        assert!(validate_product_id("a1b2-c3").is_ok());

        assert!(matches!(
            validate_product_id("   "),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            validate_product_id(&"x".repeat(MAX_PRODUCT_ID_LENGTH + 1)),
            Err(ValidationError::TooLong { max: 256, .. })
        ));
    }

    #[test]
    fn test_validate_unit_price() {
        assert!(validate_unit_price(Money::zero()).is_ok());
        assert!(validate_unit_price(Money::from_cents(1)).is_ok());
        assert!(validate_unit_price(Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_validate_new_item() {
        let ok = NewLineItem::new("1", "", "", Money::from_cents(100));
        assert!(validate_new_item(&ok).is_ok());

        let negative = NewLineItem::new("1", "Cap", "u", Money::from_cents(-100));
        let err = validate_new_item(&negative).unwrap_err();
        assert_eq!(err.to_string(), "price must not be negative");
    }
}
