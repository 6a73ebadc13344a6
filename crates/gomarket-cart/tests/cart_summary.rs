//! Floating cart: totals, labels, memoization and wiring through a scope.

use gomarket_cart::{
    CartConfig, CartError, CartScope, CartStore, CartSummary, RecordingNavigator,
    CART_DESTINATION,
};
use gomarket_core::{CurrencyFormat, Money, NewLineItem, DEFAULT_STORAGE_KEY};
use gomarket_db::MemoryStore;
use std::sync::Arc;

fn brl_summary(storage: MemoryStore) -> (CartSummary, Arc<RecordingNavigator>) {
    let store = CartStore::new(Arc::new(storage), &CartConfig::default());
    let nav = Arc::new(RecordingNavigator::new());
    (
        CartSummary::new(store, nav.clone(), CurrencyFormat::brl()),
        nav,
    )
}

#[tokio::test]
async fn totals_across_lines() {
    let (summary, _) = brl_summary(MemoryStore::with_entry(
        DEFAULT_STORAGE_KEY,
        r#"[{"id":"1","title":"Cap","image_url":"u","price":10,"quantity":2},
            {"id":"2","title":"Mug","image_url":"u","price":5,"quantity":3}]"#,
    ));
    summary.cart().hydrate().await;

    assert_eq!(summary.total_item_count(), 5);
    assert_eq!(summary.total_price_amount(), Money::from_cents(3500));
    assert_eq!(summary.total_price(), "R$ 35,00");

    let display = summary.display();
    assert_eq!(display.item_count_label, "5 itens");
    assert_eq!(display.to_string(), "5 itens  R$ 35,00");
}

#[tokio::test]
async fn empty_cart_baseline() {
    let (summary, _) = brl_summary(MemoryStore::new());
    summary.cart().hydrate().await;

    assert_eq!(summary.total_item_count(), 0);
    assert_eq!(summary.total_price(), "R$ 0,00");
    assert_eq!(summary.display().item_count_label, "0 itens");
}

#[tokio::test]
async fn recomputes_only_after_a_change() {
    let (summary, _) = brl_summary(MemoryStore::new());
    let cart = summary.cart().clone();

    summary.total_price();
    summary.total_item_count();
    summary.display();
    assert_eq!(summary.recompute_count(), 1);

    cart.add_to_cart(NewLineItem::new("1", "Cap", "u", Money::from_cents(990)))
        .await
        .unwrap();
    assert_eq!(summary.recompute_count(), 1);
    assert_eq!(summary.total_price(), "R$ 9,90");
    assert_eq!(summary.total_item_count(), 1);
    assert_eq!(summary.recompute_count(), 2);

    cart.increment("missing").await;
    summary.display();
    assert_eq!(summary.recompute_count(), 2);

    cart.increment("1").await;
    assert_eq!(summary.total_price(), "R$ 19,80");
    assert_eq!(summary.recompute_count(), 3);
}

#[tokio::test]
async fn zero_quantity_lines_count_for_nothing() {
    let (summary, _) = brl_summary(MemoryStore::new());
    let cart = summary.cart().clone();

    cart.add_to_cart(NewLineItem::new("1", "Cap", "u", Money::from_cents(1000)))
        .await
        .unwrap();
    cart.decrement("1").await;

    assert_eq!(cart.items().len(), 1);
    assert_eq!(summary.total_item_count(), 0);
    assert_eq!(summary.total_price(), "R$ 0,00");
}

#[tokio::test]
async fn open_cart_navigates_to_cart_screen() {
    let (summary, nav) = brl_summary(MemoryStore::new());

    summary.open_cart();
    summary.open_cart();

    assert_eq!(nav.visited(), vec![CART_DESTINATION, CART_DESTINATION]);
}

#[tokio::test]
async fn summary_outside_a_provider_is_an_error() {
    let nav = Arc::new(RecordingNavigator::new());
    let scope = CartScope::new();

    assert!(matches!(scope.cart(), Err(CartError::OutsideProvider)));
    assert!(matches!(
        CartSummary::from_scope(&scope, nav, CurrencyFormat::brl()),
        Err(CartError::OutsideProvider)
    ));
}

#[tokio::test]
async fn summary_from_scope_shares_the_cart() {
    let store = CartStore::new(Arc::new(MemoryStore::new()), &CartConfig::default());
    let scope = CartScope::with_cart(store.clone());
    let summary =
        CartSummary::from_scope(&scope, Arc::new(RecordingNavigator::new()), CurrencyFormat::usd())
            .unwrap();

    store
        .add_to_cart(NewLineItem::new("1", "Cap", "u", Money::from_cents(123456)))
        .await
        .unwrap();

    assert_eq!(summary.total_price(), "$1,234.56");
}
