//! Integration tests for the cart over the file store.
//!
//! Each test runs in its own temporary data directory. A second
//! [`state_in`] over the same directory stands in for relaunching the app.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use eleegon_core::{CartSource, ProductId};
use eleegon_integration_tests::{line, state_in, temp_state};
use eleegon_storefront::cart::QuantityOutcome;
use eleegon_storefront::store::{FileStore, KeyValueStore, keys};

// =============================================================================
// Load and Total
// =============================================================================

#[tokio::test]
async fn test_fresh_directory_is_empty_cart() {
    let (_dir, state) = temp_state();
    assert!(state.cart().load_all().await.unwrap().is_empty());
    assert_eq!(state.cart().format_total().await, "0.00");
}

#[tokio::test]
async fn test_cart_survives_relaunch() {
    let (dir, state) = temp_state();
    state
        .cart()
        .add(line(1, CartSource::Apparel, 10, 2))
        .await
        .unwrap();
    state
        .cart()
        .add(line(1, CartSource::Electronics, 300, 1))
        .await
        .unwrap();

    let relaunched = state_in(&dir);
    let entries = relaunched.cart().load_all().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].source(), CartSource::Apparel);
    assert_eq!(entries[1].source(), CartSource::Electronics);
    assert_eq!(relaunched.cart().format_total().await, "320.00");
}

#[tokio::test]
async fn test_legacy_files_migrated_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let raw = FileStore::new(dir.path());
    raw.set(
        keys::LEGACY_APPAREL_CART,
        r#"[{"id":1,"quantity":2,"unitPrice":10,"totalPrice":20,"source":"apparel"}]"#
            .to_string(),
    )
    .await
    .unwrap();
    raw.set(keys::LEGACY_ELECTRONICS_CART, "[]".to_string())
        .await
        .unwrap();

    let state = state_in(&dir);
    let entries = state.cart().load_all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(state.cart().format_total().await, "20.00");

    // Legacy files are gone and the unified collection holds the entry
    assert!(raw.get(keys::LEGACY_APPAREL_CART).await.unwrap().is_none());
    assert!(raw.get(keys::LEGACY_ELECTRONICS_CART).await.unwrap().is_none());
    let unified: serde_json::Value =
        serde_json::from_str(&raw.get(keys::CART).await.unwrap().unwrap()).unwrap();
    assert_eq!(unified[0]["id"], 1);
    assert_eq!(unified[0]["source"], "apparel");
}

#[tokio::test]
async fn test_corrupt_entry_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let raw = FileStore::new(dir.path());
    raw.set(
        keys::CART,
        r#"[{"title":"no id"},{"id":4,"quantity":1,"unitPrice":"12.5","source":"electronics"}]"#
            .to_string(),
    )
    .await
    .unwrap();

    let state = state_in(&dir);
    let entries = state.cart().load_all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id(), ProductId::new(4));
    assert_eq!(state.cart().format_total().await, "12.50");
}

// =============================================================================
// Quantity and Removal
// =============================================================================

#[tokio::test]
async fn test_zero_quantity_requests_removal_without_writing() {
    let (dir, state) = temp_state();
    state
        .cart()
        .add(line(1, CartSource::Apparel, 10, 2))
        .await
        .unwrap();

    let outcome = state
        .cart()
        .set_quantity(ProductId::new(1), CartSource::Apparel, 0)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        QuantityOutcome::RemovalRequested {
            id: ProductId::new(1),
            source: CartSource::Apparel,
        }
    );

    let relaunched = state_in(&dir);
    let entries = relaunched.cart().load_all().await.unwrap();
    assert_eq!(entries[0].quantity(), 2);
}

#[tokio::test]
async fn test_remove_then_relaunch_is_empty() {
    let (dir, state) = temp_state();
    state
        .cart()
        .add(line(1, CartSource::Apparel, 10, 2))
        .await
        .unwrap();

    assert!(
        state
            .cart()
            .remove(ProductId::new(1), CartSource::Apparel)
            .await
            .unwrap()
    );
    assert_eq!(state.cart().format_total().await, "0.00");

    let relaunched = state_in(&dir);
    assert!(relaunched.cart().load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_quantity_change_recomputes_persisted_total() {
    let (dir, state) = temp_state();
    state
        .cart()
        .add(line(7, CartSource::Electronics, 25, 1))
        .await
        .unwrap();

    let outcome = state
        .cart()
        .set_quantity(ProductId::new(7), CartSource::Electronics, 3)
        .await
        .unwrap();
    assert!(matches!(outcome, QuantityOutcome::Updated(ref e) if e.quantity() == 3));

    let relaunched = state_in(&dir);
    relaunched.cart().load_all().await.unwrap();
    assert_eq!(relaunched.cart().format_total().await, "75.00");
    assert_eq!(relaunched.cart().summary().item_count, 1);
}

#[tokio::test]
async fn test_same_id_in_both_sources_kept_apart() {
    let (_dir, state) = temp_state();
    state
        .cart()
        .add(line(2, CartSource::Apparel, 5, 1))
        .await
        .unwrap();
    state
        .cart()
        .add(line(2, CartSource::Electronics, 50, 1))
        .await
        .unwrap();

    state
        .cart()
        .remove(ProductId::new(2), CartSource::Electronics)
        .await
        .unwrap();

    let entries = state.cart().load_all().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source(), CartSource::Apparel);
    assert_eq!(state.cart().format_total().await, "5.00");
}
