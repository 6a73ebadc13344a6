//! On-disk SQLite store: values survive closing and reopening the database.

use gomarket_db::{DbConfig, KeyValueStore, SqliteStore};
use tempfile::TempDir;

#[tokio::test]
async fn value_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gomarket.db");

    let store = SqliteStore::new(DbConfig::new(&path)).await.unwrap();
    store
        .set("@GoMarketplace:products", r#"[{"id":"1"}]"#)
        .await
        .unwrap();
    store.close().await;

    let reopened = SqliteStore::new(DbConfig::new(&path)).await.unwrap();
    assert_eq!(
        reopened.get("@GoMarketplace:products").await.unwrap().as_deref(),
        Some(r#"[{"id":"1"}]"#)
    );
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gomarket.db");

    let store = SqliteStore::new(DbConfig::new(&path)).await.unwrap();
    store.run_migrations().await.unwrap();
    store.run_migrations().await.unwrap();

    assert!(store.health_check().await);
}

#[tokio::test]
async fn keys_are_independent() {
    let store = SqliteStore::new(DbConfig::in_memory()).await.unwrap();

    store.set("a", "1").await.unwrap();
    store.set("b", "2").await.unwrap();
    store.remove("a").await.unwrap();

    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
}
