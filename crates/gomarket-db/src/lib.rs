//! # gomarket-db: Device Storage for GoMarket
//!
//! This crate provides the key-value storage the cart persists itself into.
//! On device it is backed by SQLite through sqlx; tests use an in-memory map.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GoMarket Data Flow                               │
//! │                                                                         │
//! │  CartStore::add_to_cart                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  gomarket-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ KeyValueStore │    │  SqliteStore  │    │  Migrations  │  │   │
//! │  │   │   (kv.rs)     │◄───│  (pool.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ get/set/remove│◄───│  MemoryStore  │    │ 001_kv.sql   │  │   │
//! │  │   │               │    │  (memory.rs)  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <app data dir>/gomarket.db  (table kv_store)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gomarket_db::{DbConfig, KeyValueStore, SqliteStore};
//!
//! let store = SqliteStore::new(DbConfig::new("path/to/gomarket.db")).await?;
//! store.set("@GoMarketplace:products", "[]").await?;
//! let raw = store.get("@GoMarketplace:products").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod pool;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StorageError, StorageResult};
pub use kv::KeyValueStore;
pub use memory::MemoryStore;
pub use pool::{DbConfig, SqliteStore};
