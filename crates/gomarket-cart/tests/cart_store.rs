//! CartStore behaviour against in-memory and on-disk storage: upserts,
//! quantity changes, hydration, and what ends up durable.

use gomarket_cart::{CartConfig, CartError, CartHandle, CartStore, HydrationOutcome, Persistence};
use gomarket_core::{LineItem, Money, NewLineItem, DEFAULT_STORAGE_KEY};
use gomarket_db::{DbConfig, KeyValueStore, MemoryStore, SqliteStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn config() -> CartConfig {
    let mut config = CartConfig::default();
    config.persistence.write_retries = 0;
    config.persistence.retry_backoff_ms = 0;
    config
}

fn product(id: &str, title: &str, cents: i64) -> NewLineItem {
    NewLineItem::new(id, title, format!("https://img/{}.png", id), Money::from_cents(cents))
}

/// A hydrated store, so mutations are written straight away.
async fn ready_store(storage: Arc<MemoryStore>) -> CartHandle {
    let store = CartStore::new(storage, &config());
    store.hydrate().await;
    store
}

fn stored_items(storage: &MemoryStore) -> Vec<LineItem> {
    let raw = storage.raw(DEFAULT_STORAGE_KEY).expect("cart not stored");
    serde_json::from_str(&raw).unwrap()
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn repeated_add_upserts_with_latest_fields() {
    let store = ready_store(Arc::new(MemoryStore::new())).await;

    store.add_to_cart(product("1", "Old title", 1000)).await.unwrap();
    store.add_to_cart(product("1", "Mid title", 1100)).await.unwrap();
    store.add_to_cart(product("1", "New title", 1200)).await.unwrap();

    let items = store.items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 3);
    assert_eq!(items[0].title, "New title");
    assert_eq!(items[0].unit_price, Money::from_cents(1200));
}

#[tokio::test]
async fn increment_then_decrement_restores_quantity() {
    let store = ready_store(Arc::new(MemoryStore::new())).await;
    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();
    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();

    store.increment("1").await;
    store.decrement("1").await;
    assert_eq!(store.get("1").unwrap().quantity, 2);

    store.decrement("1").await;
    store.increment("1").await;
    assert_eq!(store.get("1").unwrap().quantity, 2);
}

#[tokio::test]
async fn unknown_id_is_a_silent_no_op() {
    let storage = Arc::new(MemoryStore::new());
    let store = ready_store(storage.clone()).await;
    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();
    let before = store.snapshot();

    assert!(matches!(store.increment("missing").await, Persistence::Unchanged));
    assert!(matches!(store.decrement("missing").await, Persistence::Unchanged));

    assert_eq!(store.snapshot(), before);
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn decrement_stops_at_zero_and_keeps_line() {
    let store = ready_store(Arc::new(MemoryStore::new())).await;
    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();

    assert!(matches!(store.decrement("1").await, Persistence::Saved { .. }));
    assert!(matches!(store.decrement("1").await, Persistence::Unchanged));

    let item = store.get("1").unwrap();
    assert_eq!(item.quantity, 0);

    assert!(matches!(store.remove("1").await, Persistence::Saved { .. }));
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn every_change_notifies_subscribers() {
    let store = ready_store(Arc::new(MemoryStore::new())).await;
    let mut changes = store.subscribe();

    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();
    assert!(changes.has_changed().unwrap());
    assert_eq!(*changes.borrow_and_update(), 1);

    store.increment("missing").await;
    assert!(!changes.has_changed().unwrap());

    store.clear().await;
    assert_eq!(*changes.borrow_and_update(), 2);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn durable_copy_reflects_post_mutation_state() {
    let storage = Arc::new(MemoryStore::new());
    let store = ready_store(storage.clone()).await;

    let result = store.add_to_cart(product("1", "Cap", 500)).await.unwrap();
    assert!(matches!(result, Persistence::Saved { version: 1 }));
    assert_eq!(stored_items(&storage), store.items());

    store.add_to_cart(product("1", "Cap", 500)).await.unwrap();
    assert_eq!(stored_items(&storage)[0].quantity, 2);
}

#[tokio::test]
async fn failed_write_keeps_memory_and_reports() {
    let storage = Arc::new(MemoryStore::new());
    let mut config = config();
    config.persistence.write_retries = 2;
    let store = CartStore::new(storage.clone(), &config);
    store.hydrate().await;

    storage.fail_writes(true);
    let result = store.add_to_cart(product("1", "Cap", 500)).await.unwrap();

    match result {
        Persistence::Failed { version, error } => {
            assert_eq!(version, 1);
            assert!(matches!(error, CartError::PersistenceWrite { .. }));
            assert!(error.is_recoverable());
        }
        other => panic!("expected a failed write, got {:?}", other),
    }
    assert_eq!(store.get("1").unwrap().quantity, 1);
    assert_eq!(store.persisted_version(), 0);
    assert!(storage.raw(DEFAULT_STORAGE_KEY).is_none());

    storage.fail_writes(false);
    assert!(matches!(store.flush().await, Persistence::Saved { version: 1 }));
    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test]
async fn queued_writer_persists_latest_and_later_ones_skip() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_write_delay(Some(Duration::from_millis(20)));
    let store = ready_store(storage.clone()).await;

    let (first, second, third) = tokio::join!(
        store.add_to_cart(product("1", "Cap", 500)),
        store.add_to_cart(product("2", "Mug", 700)),
        store.increment("1"),
    );

    assert!(matches!(first.unwrap(), Persistence::Saved { version: 1 }));
    assert!(matches!(second.unwrap(), Persistence::Saved { version: 3 }));
    assert!(matches!(third, Persistence::Superseded { version: 3 }));

    assert_eq!(storage.write_count(), 2);
    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rapid_concurrent_mutations_end_durable() {
    let storage = Arc::new(MemoryStore::new());
    storage.set_write_delay(Some(Duration::from_millis(2)));
    let store = ready_store(storage.clone()).await;

    let mut tasks = Vec::new();
    for n in 0..40 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            let id = (n % 5).to_string();
            store.add_to_cart(product(&id, "Item", 100)).await.unwrap();
            if n % 3 == 0 {
                store.decrement(&id).await;
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(store.persisted_version(), store.version());
    assert_eq!(stored_items(&storage), store.items());
}

// =============================================================================
// Hydration
// =============================================================================

#[tokio::test]
async fn hydration_loads_stored_cart_once() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"1","title":"Cap","image_url":"u","price":10,"quantity":2},
            {"id":"2","title":"Mug","image_url":"u","price":5,"quantity":3}]"#,
    ));
    let store = CartStore::new(storage.clone(), &config());
    assert!(!store.is_ready());

    assert!(matches!(store.hydrate().await, HydrationOutcome::Loaded { items: 2 }));
    assert!(store.is_ready());
    assert_eq!(store.version(), 1);
    assert_eq!(store.persisted_version(), 1);
    assert_eq!(store.get("2").unwrap().quantity, 3);

    assert!(matches!(store.hydrate().await, HydrationOutcome::AlreadyHydrated));
    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn open_hydrates_in_background() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"1","title":"Cap","image_url":"u","price":10,"quantity":2}]"#,
    ));
    let store = CartStore::open(storage, &config());

    store.wait_ready().await;
    assert_eq!(store.get("1").unwrap().quantity, 2);
}

#[tokio::test]
async fn missing_key_hydrates_empty() {
    let store = CartStore::new(Arc::new(MemoryStore::new()), &config());

    assert!(matches!(store.hydrate().await, HydrationOutcome::Empty));
    assert!(store.is_ready());
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn unreadable_storage_hydrates_empty() {
    let storage = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "[]"));
    storage.fail_reads(true);
    let store = CartStore::new(storage, &config());

    match store.hydrate().await {
        HydrationOutcome::Failed(CartError::PersistenceRead { key, .. }) => {
            assert_eq!(key, DEFAULT_STORAGE_KEY)
        }
        other => panic!("expected a read failure, got {:?}", other),
    }
    assert!(store.is_ready());
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn corrupt_storage_hydrates_empty() {
    let storage = Arc::new(MemoryStore::with_entry(DEFAULT_STORAGE_KEY, "{not json"));
    let store = CartStore::new(storage, &config());

    assert!(matches!(
        store.hydrate().await,
        HydrationOutcome::Failed(CartError::Decode { .. })
    ));
    assert!(store.items().is_empty());
}

#[tokio::test]
async fn mutation_before_hydration_merges_with_stored_cart() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"old","title":"Old","image_url":"u","price":1,"quantity":9}]"#,
    ));
    let store = CartStore::open(storage.clone(), &config());

    let early = store.add_to_cart(product("new", "New", 100)).await.unwrap();
    assert!(matches!(early, Persistence::Deferred { version: 1 }));
    assert_eq!(storage.write_count(), 0);

    store.wait_ready().await;
    assert_eq!(store.get("old").unwrap().quantity, 9);
    assert_eq!(store.get("new").unwrap().quantity, 1);
    assert_eq!(store.persisted_version(), store.version());
    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test]
async fn early_add_of_stored_product_upserts_on_hydration() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"old","title":"Old","image_url":"u","price":1,"quantity":9},
            {"id":"cap","title":"Cap","image_url":"u","price":10,"quantity":1}]"#,
    ));
    let store = CartStore::new(storage.clone(), &config());

    store.add_to_cart(product("cap", "Cap v2", 1200)).await.unwrap();
    store.add_to_cart(product("new", "New", 100)).await.unwrap();

    assert!(matches!(
        store.hydrate().await,
        HydrationOutcome::Merged {
            stored: 2,
            pending: 2
        }
    ));

    let ids: Vec<_> = store.items().into_iter().map(|item| item.id).collect();
    assert_eq!(ids, vec!["old", "cap", "new"]);
    let cap = store.get("cap").unwrap();
    assert_eq!(cap.quantity, 2);
    assert_eq!(cap.title, "Cap v2");
    assert_eq!(cap.unit_price, Money::from_cents(1200));
    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test]
async fn failed_repair_write_keeps_repaired_cart_in_memory() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"1","title":"Cap","image_url":"u","price":10,"quantity":-2}]"#,
    ));
    storage.fail_writes(true);
    let store = CartStore::new(storage.clone(), &config());

    assert!(matches!(store.hydrate().await, HydrationOutcome::Loaded { items: 1 }));
    assert_eq!(store.get("1").unwrap().quantity, 0);
    assert_eq!(store.persisted_version(), 0);

    storage.fail_writes(false);
    assert!(matches!(store.flush().await, Persistence::Saved { version: 1 }));
    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test]
async fn inconsistent_stored_cart_is_repaired() {
    let storage = Arc::new(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"1","title":"Cap","image_url":"u","price":10,"quantity":2},
            {"id":"1","title":"Cap v2","image_url":"u","price":12,"quantity":1},
            {"id":"2","title":"Mug","image_url":"u","price":5,"quantity":-4}]"#,
    ));
    let store = CartStore::new(storage.clone(), &config());

    assert!(matches!(store.hydrate().await, HydrationOutcome::Loaded { items: 2 }));

    let cap = store.get("1").unwrap();
    assert_eq!(cap.quantity, 3);
    assert_eq!(cap.title, "Cap v2");
    assert_eq!(store.get("2").unwrap().quantity, 0);

    assert_eq!(stored_items(&storage), store.items());
}

#[tokio::test]
async fn cart_survives_restart_on_sqlite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gomarket.db");

    let before = {
        let storage = SqliteStore::new(DbConfig::new(&path)).await.unwrap();
        let store = CartStore::new(Arc::new(storage), &config());
        store.hydrate().await;

        store.add_to_cart(product("b", "Second?", 250)).await.unwrap();
        store.add_to_cart(product("a", "Apple", 199)).await.unwrap();
        store.add_to_cart(product("b", "Banana", 250)).await.unwrap();
        store.decrement("a").await;
        store.items()
    };

    let storage = SqliteStore::new(DbConfig::new(&path)).await.unwrap();
    let raw = storage.get(DEFAULT_STORAGE_KEY).await.unwrap();
    assert!(raw.unwrap().contains("\"image_url\""));

    let store = CartStore::new(Arc::new(storage), &config());
    assert!(matches!(store.hydrate().await, HydrationOutcome::Loaded { items: 2 }));
    assert_eq!(store.items(), before);
}
