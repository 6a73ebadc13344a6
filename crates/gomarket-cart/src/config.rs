//! # Cart Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_STORAGE_KEY=@GoMarketplace:products                       │
//! │     GOMARKET_DB_PATH=/tmp/gomarket.db                                  │
//! │     GOMARKET_WRITE_RETRIES=2                                           │
//! │     GOMARKET_RETRY_BACKOFF_MS=50                                       │
//! │     GOMARKET_MAX_BACKOFF_MS=2000                                       │
//! │     GOMARKET_CURRENCY=brl                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gomarket-cart/cart.toml (Linux)                          │
//! │     ~/Library/Application Support/com.gomarket.cart/cart.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! key = "@GoMarketplace:products"
//! database_path = "/data/gomarket.db"   # optional
//!
//! [persistence]
//! write_retries = 1
//! retry_backoff_ms = 100     # first pause, doubled per attempt
//! max_backoff_ms = 2000      # cap on a single pause
//!
//! [display]
//! currency = "brl"   # brl | usd
//! ```

use backoff::ExponentialBackoff;
use gomarket_core::{CurrencyFormat, CurrencyLocale, DEFAULT_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Key the line item array is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// SQLite file. Falls back to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            key: default_storage_key(),
            database_path: None,
        }
    }
}

// =============================================================================
// Persistence Settings
// =============================================================================

/// How hard a mutation tries to make its write durable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Extra attempts after a failed write. 0 disables retrying.
    #[serde(default = "default_write_retries")]
    pub write_retries: u32,

    /// Pause before the first retry (milliseconds). Doubles per attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Longest single pause between attempts (milliseconds).
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

fn default_write_retries() -> u32 {
    1
}

fn default_retry_backoff() -> u64 {
    100
}

fn default_max_backoff() -> u64 {
    2_000
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            write_retries: default_write_retries(),
            retry_backoff_ms: default_retry_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

impl PersistenceSettings {
    /// No retries, no backoff.
    pub fn no_retry() -> Self {
        PersistenceSettings {
            write_retries: 0,
            retry_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Creates the exponential backoff for one write's retries.
    ///
    /// Never gives up on its own; the caller stops after `write_retries`.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.retry_backoff(),
            initial_interval: self.retry_backoff(),
            max_interval: self.max_backoff(),
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default)]
    pub currency: CurrencyLocale,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl CartConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.key.trim().is_empty() {
            return Err(CartError::InvalidConfig(
                "storage.key must not be empty".into(),
            ));
        }

        if self.persistence.max_backoff_ms < self.persistence.retry_backoff_ms {
            return Err(CartError::InvalidConfig(
                "persistence.max_backoff_ms must be at least retry_backoff_ms".into(),
            ));
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(CartError::InvalidConfig(
                    "storage.database_path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable source (the process environment in
    /// production, a map in tests).
    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("GOMARKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.storage.key = key;
        }

        if let Some(path) = lookup("GOMARKET_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(retries) = lookup("GOMARKET_WRITE_RETRIES") {
            match retries.parse::<u32>() {
                Ok(n) => self.persistence.write_retries = n,
                Err(_) => warn!(value = %retries, "Ignoring invalid GOMARKET_WRITE_RETRIES"),
            }
        }

        if let Some(backoff) = lookup("GOMARKET_RETRY_BACKOFF_MS") {
            match backoff.parse::<u64>() {
                Ok(ms) => self.persistence.retry_backoff_ms = ms,
                Err(_) => warn!(value = %backoff, "Ignoring invalid GOMARKET_RETRY_BACKOFF_MS"),
            }
        }

        if let Some(max) = lookup("GOMARKET_MAX_BACKOFF_MS") {
            match max.parse::<u64>() {
                Ok(ms) => self.persistence.max_backoff_ms = ms,
                Err(_) => warn!(value = %max, "Ignoring invalid GOMARKET_MAX_BACKOFF_MS"),
            }
        }

        if let Some(currency) = lookup("GOMARKET_CURRENCY") {
            match currency.parse::<CurrencyLocale>() {
                Ok(locale) => self.display.currency = locale,
                Err(e) => warn!(value = %currency, error = %e, "Ignoring invalid GOMARKET_CURRENCY"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gomarket", "cart")
            .map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The storage key.
    pub fn storage_key(&self) -> &str {
        &self.storage.key
    }

    /// Resolved database file: explicit setting, else the platform data dir.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "gomarket", "cart")
                .map(|dirs| dirs.data_dir().join("gomarket.db"))
        })
    }

    /// Currency format for displayed totals.
    pub fn currency_format(&self) -> CurrencyFormat {
        CurrencyFormat::from(self.display.currency)
    }
}
