//! # Cart Errors
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant              Raised by             Handling                    │
//! │  ───────              ─────────             ────────                    │
//! │  PersistenceRead      hydrate()             cart stays empty, warn     │
//! │  Decode               hydrate()             cart stays empty, warn     │
//! │  PersistenceWrite     every mutation        in-memory kept, warn       │
//! │  OutsideProvider      CartScope::cart()     fatal: wiring defect       │
//! │  Core(Validation)     add_to_cart()         returned, cart unchanged   │
//! │  Config / Io / Toml   CartConfig::load()    returned to the caller     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Storage failures never abort a mutation. They come back inside
//! [`Persistence::Failed`](crate::store::Persistence::Failed) and
//! [`HydrationOutcome::Failed`](crate::store::HydrationOutcome::Failed).

use gomarket_core::CoreError;
use gomarket_db::StorageError;
use thiserror::Error;

/// Result type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

#[derive(Debug, Error)]
pub enum CartError {
    // =========================================================================
    // Persistence
    // =========================================================================
    /// Hydration could not read the stored cart.
    #[error("Failed to read '{key}' from storage: {source}")]
    PersistenceRead { key: String, source: StorageError },

    /// The stored cart is not a valid line item array.
    #[error("Stored cart under '{key}' is unreadable: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },

    /// A mutation's durable write failed.
    #[error("Failed to write '{key}' to storage: {source}")]
    PersistenceWrite { key: String, source: StorageError },

    /// The cart could not be serialized.
    #[error("Failed to encode cart: {0}")]
    Encode(#[source] serde_json::Error),

    /// Opening the storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // =========================================================================
    // Wiring
    // =========================================================================
    /// A consumer asked for the cart from a scope that does not provide one.
    #[error("Cart requested outside of a scope that provides one")]
    OutsideProvider,

    // =========================================================================
    // Domain
    // =========================================================================
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Configuration
    // =========================================================================
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

impl CartError {
    /// True for storage failures the cart recovers from locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CartError::PersistenceRead { .. }
                | CartError::Decode { .. }
                | CartError::PersistenceWrite { .. }
                | CartError::Encode(_)
        )
    }
}
