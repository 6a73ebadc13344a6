//! # gomarket-cart: Cart Store & Floating Cart for GoMarket
//!
//! The state layer behind the storefront's cart: one [`CartStore`] per
//! session, hydrated from device storage and written back after every change,
//! plus the [`CartSummary`] the floating cart widget renders.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Cart Architecture                                │
//! │                                                                         │
//! │  ┌─────────────────┐     CartHandle (Arc)    ┌──────────────────────┐  │
//! │  │ Product list    │────────────────────────►│  CartStore           │  │
//! │  │ Cart screen     │   add / inc / dec       │                      │  │
//! │  └─────────────────┘                         │  Mutex<Cart>         │  │
//! │                                              │  version + watch     │  │
//! │  ┌─────────────────┐       reads             │  serialized writer   │  │
//! │  │ CartSummary     │────────────────────────►│                      │  │
//! │  │ (floating cart) │                         └──────────┬───────────┘  │
//! │  │                 │── open_cart() ──► Navigator        │              │
//! │  └─────────────────┘                                    ▼              │
//! │                                              ┌──────────────────────┐  │
//! │                                              │  KeyValueStore       │  │
//! │                                              │  (SQLite / memory)   │  │
//! │                                              └──────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`store`] - `CartStore`: hydration, mutations, persistence
//! - [`summary`] - `CartSummary`: memoized totals and the "open cart" action
//! - [`scope`] - `CartScope`: explicit provider for runtime wiring
//! - [`navigation`] - `Navigator` trait and stock implementations
//! - [`config`] - `CartConfig` (TOML + environment)
//! - [`error`] - Cart error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_cart::{CartConfig, CartStore, CartSummary, LogNavigator};
//! use gomarket_core::{Money, NewLineItem};
//! use gomarket_db::{DbConfig, SqliteStore};
//!
//! let config = CartConfig::load_or_default(None);
//! let storage = SqliteStore::new(DbConfig::new("gomarket.db")).await?;
//! let cart = CartStore::open(Arc::new(storage), &config);
//! cart.wait_ready().await;
//!
//! cart.add_to_cart(NewLineItem::new("1", "Cap", "https://...", Money::from_cents(1000))).await?;
//!
//! let summary = CartSummary::new(cart, Arc::new(LogNavigator), config.currency_format());
//! println!("{}", summary.display()); // "1 itens  R$ 10,00"
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod navigation;
pub mod scope;
pub mod store;
pub mod summary;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, DisplaySettings, PersistenceSettings, StorageSettings};
pub use error::{CartError, CartResult};
pub use navigation::{LogNavigator, Navigator, RecordingNavigator, CART_DESTINATION};
pub use scope::CartScope;
pub use store::{CartHandle, CartSnapshot, CartStore, HydrationOutcome, Persistence};
pub use summary::{CartSummary, SummaryDisplay};
