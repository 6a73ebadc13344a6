//! # gomarket-core: Pure Cart Logic for GoMarket
//!
//! This crate holds the cart rules of the GoMarket storefront as pure
//! functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Storefront (mobile)                          │   │
//! │  │    Product List ──► Floating Cart ──► Cart Screen               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gomarket-cart                                │   │
//! │  │    CartStore (hydrate, persist), CartSummary                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gomarket-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │ LineItem  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │NewLineItem│  │ Currency  │  │CartTotals │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Line item types
//! - [`money`] - Money type with integer arithmetic and display formatting
//! - [`cart`] - The ordered, id-unique cart and its aggregates
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use gomarket_core::{format_value, Cart, Money, NewLineItem};
//!
//! let mut cart = Cart::new();
//! cart.add_item(NewLineItem::new("1", "Sneaker", "https://img/1.png", Money::from_cents(1000)))
//!     .unwrap();
//! cart.increment("1");
//!
//! assert_eq!(cart.total_quantity(), 2);
//! assert_eq!(format_value(cart.total_price()), "R$ 20,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartTotals, Normalization};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{format_value, CurrencyFormat, CurrencyLocale, Money};
pub use types::{LineItem, NewLineItem};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Storage key the storefront has always used for the cart's line items.
///
/// Existing installs already hold data under this key, so it must not change.
pub const DEFAULT_STORAGE_KEY: &str = "@GoMarketplace:products";
