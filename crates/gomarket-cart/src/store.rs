//! # Cart Store
//!
//! The single source of truth for the shopper's cart. Owns the in-memory
//! [`Cart`], hydrates it once from device storage, and writes the full line
//! item array back after every mutation.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_to_cart / increment / decrement / remove / clear                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Lock state (std Mutex), apply to Cart, bump version, unlock        │
//! │       │        ← synchronous: readers see the change immediately       │
//! │       ▼                                                                 │
//! │  2. Notify subscribers (watch<u64>)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Lock writer (tokio Mutex)                                          │
//! │     ├── durable version ≥ ours?  → Superseded (skip)                   │
//! │     ├── snapshot CURRENT cart, encode JSON                             │
//! │     └── storage.set(key, json)  (exponential backoff per config)       │
//! │            ├── Ok  → Saved { version }                                 │
//! │            └── Err → Failed { error }, warn!, memory untouched         │
//! │                                                                         │
//! │  Until hydration finishes, step 3 is skipped and the change reports    │
//! │  Deferred: storage still holds the saved cart, which gets merged in.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why Snapshot Under The Writer Lock?
//! Two quick taps can both finish step 1 before either write lands. Each
//! writer persists whatever the cart holds when it gets the lock, and a writer
//! that finds a newer version already durable skips. The stored copy can only
//! move forward, never back to an older cart.
//!
//! ## Hydration
//! ```text
//!   Hydrating ──hydrate()──► Ready
//!       │                      ▲
//!       ├── key absent ────────┤  Empty
//!       ├── read/decode fails ─┤  Failed (cart keeps what it has, warn!)
//!       ├── cart untouched ────┤  Loaded (stored items replace the cart)
//!       └── already mutated ───┘  Merged (stored items first, early
//!                                  changes folded on top, written back)
//! ```
//!
//! Merging follows the upsert rule: a product added while loading adds its
//! quantity to the stored line and refreshes its title, image and price. A
//! `remove` or `clear` made before hydration only affects lines that were
//! already in memory.

use backoff::backoff::Backoff;
use chrono::{DateTime, Utc};
use gomarket_core::{Cart, CoreResult, LineItem, NewLineItem};
use gomarket_db::KeyValueStore;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{CartConfig, PersistenceSettings};
use crate::error::{CartError, CartResult};

/// Shared handle to a [`CartStore`]. Consumers hold this instead of looking
/// the cart up globally.
pub type CartHandle = Arc<CartStore>;

// =============================================================================
// Outcomes
// =============================================================================

/// What happened to the durable copy after a mutation.
#[derive(Debug)]
pub enum Persistence {
    /// The cart at `version` (or newer) is now in storage.
    Saved { version: u64 },

    /// A concurrent writer already stored `version` or a newer cart.
    Superseded { version: u64 },

    /// The mutation was a no-op; nothing to write.
    Unchanged,

    /// Hydration has not finished. The change at `version` lives in memory
    /// and is written once the stored cart has been merged in.
    Deferred { version: u64 },

    /// The write failed. The in-memory cart still holds `version`.
    Failed { version: u64, error: CartError },
}

impl Persistence {
    /// True when storage holds the change, or there was nothing to hold.
    pub fn is_durable(&self) -> bool {
        matches!(
            self,
            Persistence::Saved { .. } | Persistence::Superseded { .. } | Persistence::Unchanged
        )
    }
}

/// Result of the one-time load from storage.
#[derive(Debug)]
pub enum HydrationOutcome {
    /// Stored items replaced the empty cart.
    Loaded { items: usize },

    /// Nothing stored under the key.
    Empty,

    /// Storage could not be read or parsed; the cart stays as it was.
    Failed(CartError),

    /// The cart was mutated before the load finished. The `stored` lines
    /// were kept and the `pending` in-memory lines folded into them.
    Merged { stored: usize, pending: usize },

    /// `hydrate` already ran for this store.
    AlreadyHydrated,
}

/// A consistent copy of the cart at one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub version: u64,
    pub items: Vec<LineItem>,
}

// =============================================================================
// Internal State
// =============================================================================

#[derive(Debug, Default)]
struct CartState {
    cart: Cart,
    /// Bumped on every effective change, hydration included.
    version: u64,
    /// Set once the stored cart has been folded in. Nothing is written
    /// before that.
    hydrated: bool,
}

/// An applied mutation.
#[derive(Debug, Clone, Copy)]
struct Committed {
    version: u64,
    hydrated: bool,
}

#[derive(Debug, Default)]
struct PersistTracker {
    persisted_version: u64,
}

// =============================================================================
// CartStore
// =============================================================================

/// Owns the cart and keeps it durable.
///
/// ## Thread Safety
/// - Cart state: `std::sync::Mutex`, held only while applying a change,
///   never across an `.await`
/// - Writes: `tokio::sync::Mutex`, one storage write in flight at a time
pub struct CartStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    persistence: PersistenceSettings,

    state: Mutex<CartState>,
    writer: tokio::sync::Mutex<PersistTracker>,
    persisted_version: AtomicU64,
    last_saved_at: Mutex<Option<DateTime<Utc>>>,

    changes: watch::Sender<u64>,
    ready: watch::Sender<bool>,
    hydration_started: AtomicBool,
}

impl CartStore {
    /// Creates an empty, not-yet-hydrated store.
    pub fn new(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> CartHandle {
        let (changes, _) = watch::channel(0);
        let (ready, _) = watch::channel(false);

        Arc::new(CartStore {
            storage,
            key: config.storage.key.clone(),
            persistence: config.persistence.clone(),
            state: Mutex::new(CartState::default()),
            writer: tokio::sync::Mutex::new(PersistTracker::default()),
            persisted_version: AtomicU64::new(0),
            last_saved_at: Mutex::new(None),
            changes,
            ready,
            hydration_started: AtomicBool::new(false),
        })
    }

    /// Creates a store and starts hydrating it in the background.
    ///
    /// Must be called inside a Tokio runtime. Reads before hydration finishes
    /// see only the changes made so far; await [`CartStore::wait_ready`] to
    /// avoid that.
    pub fn open(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> CartHandle {
        let store = Self::new(storage, config);
        drop(store.spawn_hydration());
        store
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Runs [`CartStore::hydrate`] on a background task.
    pub fn spawn_hydration(self: &Arc<Self>) -> JoinHandle<HydrationOutcome> {
        let store = Arc::clone(self);
        tokio::spawn(async move { store.hydrate().await })
    }

    /// Loads the stored cart. Runs at most once per store; later calls return
    /// [`HydrationOutcome::AlreadyHydrated`].
    pub async fn hydrate(&self) -> HydrationOutcome {
        if self.hydration_started.swap(true, Ordering::SeqCst) {
            return HydrationOutcome::AlreadyHydrated;
        }

        let outcome = self.load().await;
        self.ready.send_replace(true);

        match &outcome {
            HydrationOutcome::Loaded { items } => info!(key = %self.key, items, "Cart hydrated"),
            HydrationOutcome::Empty => info!(key = %self.key, "No stored cart, starting empty"),
            HydrationOutcome::Merged { stored, pending } => info!(
                key = %self.key,
                stored,
                pending,
                "Cart hydrated, merged with changes made while loading"
            ),
            HydrationOutcome::Failed(error) => {
                warn!(key = %self.key, %error, "Cart hydration failed, keeping in-memory cart")
            }
            HydrationOutcome::AlreadyHydrated => {}
        }

        outcome
    }

    async fn load(&self) -> HydrationOutcome {
        let raw = match self.storage.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.settle(None).await;
                return HydrationOutcome::Empty;
            }
            Err(source) => {
                self.settle(None).await;
                return HydrationOutcome::Failed(CartError::PersistenceRead {
                    key: self.key.clone(),
                    source,
                });
            }
        };

        let items = match decode(&self.key, &raw) {
            Ok(items) => items,
            Err(error) => {
                self.settle(None).await;
                return HydrationOutcome::Failed(error);
            }
        };

        let (cart, report) = Cart::normalized(items);
        if !report.is_clean() {
            warn!(
                merged = report.merged_duplicates,
                clamped = report.clamped_quantities,
                "Stored cart violated cart invariants, repaired"
            );
        }

        let stored = cart.line_count();
        match self.settle(Some((cart, report.is_clean()))).await {
            Some(pending) => HydrationOutcome::Merged { stored, pending },
            None => HydrationOutcome::Loaded { items: stored },
        }
    }

    /// Marks the store hydrated, folds `stored` under any changes made while
    /// loading, and brings storage up to date.
    ///
    /// `stored` is the loaded cart plus whether storage holds it verbatim.
    /// Returns how many in-memory lines were pending, or `None` if nothing
    /// changed before hydration.
    async fn settle(&self, stored: Option<(Cart, bool)>) -> Option<usize> {
        let (version, pending, in_sync) = {
            let mut state = self.lock_state();
            state.hydrated = true;

            let pending = (state.version > 0).then(|| state.cart.line_count());
            let in_sync = match (stored, pending) {
                (Some((cart, _)), Some(_)) => {
                    let early = std::mem::take(&mut state.cart).into_items();
                    let (merged, _) =
                        Cart::normalized(cart.into_items().into_iter().chain(early).collect());
                    state.cart = merged;
                    state.version += 1;
                    false
                }
                (Some((cart, clean)), None) => {
                    state.cart = cart;
                    state.version += 1;
                    clean
                }
                (None, pending) => pending.is_none(),
            };

            (state.version, pending, in_sync)
        };

        if version == 0 {
            return pending;
        }
        self.changes.send_replace(version);

        if in_sync {
            // What we just read is what storage holds.
            let mut tracker = self.writer.lock().await;
            if tracker.persisted_version < version {
                tracker.persisted_version = version;
                self.persisted_version.store(version, Ordering::SeqCst);
            }
        } else if let Persistence::Failed { error, .. } = self.persist(version).await {
            warn!(
                key = %self.key,
                version,
                %error,
                "Hydrated cart not written back; the next change retries"
            );
        }

        pending
    }

    /// True once hydration has finished, whatever its outcome.
    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Waits until hydration has finished.
    pub async fn wait_ready(&self) {
        let mut ready = self.ready.subscribe();
        // The sender lives in `self`, so the channel can't close here.
        let _ = ready.wait_for(|ready| *ready).await;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product or bumps its quantity (upsert by id).
    ///
    /// ## Behavior
    /// - Existing id: quantity + 1, title/image/price overwritten
    /// - New id: appended with quantity 1
    /// - Persists the resulting cart
    ///
    /// ## Errors
    /// Only invalid input (empty id, negative price) is an `Err`; the cart is
    /// left untouched. Storage trouble is reported in the returned
    /// [`Persistence`].
    pub async fn add_to_cart(&self, item: NewLineItem) -> CartResult<Persistence> {
        let id = item.id.clone();
        let mut added: CoreResult<i64> = Ok(0);
        let version = self.commit(|cart| {
            added = cart.add_item(item);
            added.is_ok()
        });
        let quantity = added?;

        debug!(id = %id, quantity, "add_to_cart");
        Ok(self.persist_change(version).await)
    }

    /// Increases a line's quantity by one. Unknown ids are a silent no-op.
    pub async fn increment(&self, id: &str) -> Persistence {
        let version = self.commit(|cart| cart.increment(id));
        debug!(id = %id, changed = version.is_some(), "increment");
        self.persist_change(version).await
    }

    /// Decreases a line's quantity by one, stopping at zero (the line stays).
    /// Unknown ids are a silent no-op.
    pub async fn decrement(&self, id: &str) -> Persistence {
        let version = self.commit(|cart| cart.decrement(id));
        debug!(id = %id, changed = version.is_some(), "decrement");
        self.persist_change(version).await
    }

    /// Removes a line entirely.
    pub async fn remove(&self, id: &str) -> Persistence {
        let version = self.commit(|cart| cart.remove_item(id));
        debug!(id = %id, changed = version.is_some(), "remove");
        self.persist_change(version).await
    }

    /// Empties the cart.
    pub async fn clear(&self) -> Persistence {
        let version = self.commit(Cart::clear);
        debug!(changed = version.is_some(), "clear");
        self.persist_change(version).await
    }

    /// Writes the current cart if storage holds an older one.
    ///
    /// Before hydration finishes nothing is written and a pending change
    /// reports [`Persistence::Deferred`].
    pub async fn flush(&self) -> Persistence {
        let (version, hydrated) = {
            let state = self.lock_state();
            (state.version, state.hydrated)
        };
        if version == 0 || self.persisted_version() >= version {
            return Persistence::Unchanged;
        }
        if !hydrated {
            return Persistence::Deferred { version };
        }
        self.persist(version).await
    }

    /// Applies `f` to the cart; bumps the version and notifies if it reports a
    /// change.
    fn commit<F>(&self, f: F) -> Option<Committed>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let committed = {
            let mut state = self.lock_state();
            if !f(&mut state.cart) {
                return None;
            }
            state.version += 1;
            Committed {
                version: state.version,
                hydrated: state.hydrated,
            }
        };
        self.changes.send_replace(committed.version);
        Some(committed)
    }

    async fn persist_change(&self, committed: Option<Committed>) -> Persistence {
        match committed {
            None => Persistence::Unchanged,
            Some(Committed {
                version,
                hydrated: false,
            }) => {
                debug!(version, "Cart not hydrated yet, write deferred");
                Persistence::Deferred { version }
            }
            Some(Committed { version, .. }) => self.persist(version).await,
        }
    }

    async fn persist(&self, version: u64) -> Persistence {
        let mut tracker = self.writer.lock().await;
        if tracker.persisted_version >= version {
            return Persistence::Superseded {
                version: tracker.persisted_version,
            };
        }

        let snapshot = self.snapshot();
        let payload = match encode(&snapshot.items) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "Cart could not be encoded; write skipped");
                return Persistence::Failed {
                    version: snapshot.version,
                    error,
                };
            }
        };

        let mut backoff = self.persistence.backoff();
        let mut attempt: u32 = 0;
        loop {
            match self.storage.set(&self.key, &payload).await {
                Ok(()) => {
                    tracker.persisted_version = snapshot.version;
                    self.persisted_version
                        .store(snapshot.version, Ordering::SeqCst);
                    *self
                        .last_saved_at
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Utc::now());
                    debug!(
                        version = snapshot.version,
                        items = snapshot.items.len(),
                        "Cart persisted"
                    );
                    return Persistence::Saved {
                        version: snapshot.version,
                    };
                }
                Err(source) => {
                    attempt += 1;
                    let delay = if attempt <= self.persistence.write_retries {
                        backoff.next_backoff()
                    } else {
                        None
                    };

                    if let Some(delay) = delay {
                        warn!(
                            attempt,
                            max = self.persistence.write_retries,
                            ?delay,
                            error = %source,
                            "Cart write failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let error = CartError::PersistenceWrite {
                        key: self.key.clone(),
                        source,
                    };
                    warn!(
                        version = snapshot.version,
                        %error,
                        "Cart write lost; in-memory cart is still current"
                    );
                    return Persistence::Failed {
                        version: snapshot.version,
                        error,
                    };
                }
            }
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Runs `f` with read access to the cart and the version it is at.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart, u64) -> R,
    {
        let state = self.lock_state();
        f(&state.cart, state.version)
    }

    /// The line items, in insertion order.
    pub fn items(&self) -> Vec<LineItem> {
        self.with_cart(|cart, _| cart.items().to_vec())
    }

    /// One line by product id.
    pub fn get(&self, id: &str) -> Option<LineItem> {
        self.with_cart(|cart, _| cart.get(id).cloned())
    }

    /// Items plus the version they belong to.
    pub fn snapshot(&self) -> CartSnapshot {
        self.with_cart(|cart, version| CartSnapshot {
            version,
            items: cart.items().to_vec(),
        })
    }

    /// Current cart version; 0 until the first hydration or change.
    pub fn version(&self) -> u64 {
        self.lock_state().version
    }

    /// Newest version known to be in storage.
    pub fn persisted_version(&self) -> u64 {
        self.persisted_version.load(Ordering::SeqCst)
    }

    /// When the last successful write finished.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        *self
            .last_saved_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Receives the cart version after every change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    /// The storage key this cart lives under.
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    fn lock_state(&self) -> MutexGuard<'_, CartState> {
        // Cart mutations can't panic halfway through, so a poisoned lock
        // still guards a consistent cart.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("version", &self.version())
            .field("persisted_version", &self.persisted_version())
            .field("ready", &self.is_ready())
            .finish()
    }
}

// =============================================================================
// Storage Format
// =============================================================================

fn encode(items: &[LineItem]) -> CartResult<String> {
    serde_json::to_string(items).map_err(CartError::Encode)
}

fn decode(key: &str, raw: &str) -> CartResult<Vec<LineItem>> {
    serde_json::from_str(raw).map_err(|source| CartError::Decode {
        key: key.to_string(),
        source,
    })
}
