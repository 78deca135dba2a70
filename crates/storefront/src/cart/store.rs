//! Cart aggregation over the key-value store.

use std::sync::Arc;

use eleegon_core::{CartSource, Price, ProductId};
use serde::Deserialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use super::{
    CartEntry, CartError, CartSummary, NewCartLine, QuantityOutcome, StoredEntry, checked_total,
    display_order, total_of,
};
use crate::lenient;
use crate::store::{KeyValueStore, StoreError, keys, load_json, save_json};

/// Stored collection: malformed elements are dropped rather than failing the load.
#[derive(Deserialize)]
#[serde(transparent)]
struct StoredCart(#[serde(deserialize_with = "lenient::vec_skip_invalid")] Vec<StoredEntry>);

/// The cart, shared by every view that shows or changes it.
///
/// Construct one per process and hand out references. The in-memory view is
/// what screens render; every mutation also performs a full
/// read-modify-write of the persisted collection. Mutations through one
/// `CartStore` are serialized; separate processes writing the same store are
/// last-writer-wins.
///
/// Subscribers get a [`CartSummary`] after each load or mutation.
pub struct CartStore<S> {
    store: Arc<S>,
    entries: Mutex<Vec<CartEntry>>,
    summary: watch::Sender<CartSummary>,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a cart over `store`. The view is empty until [`Self::load_all`].
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        let (summary, _) = watch::channel(CartSummary::default());
        Self {
            store,
            entries: Mutex::new(Vec::new()),
            summary,
        }
    }

    /// Subscribe to cart summary changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSummary> {
        self.summary.subscribe()
    }

    /// Latest published summary.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        *self.summary.borrow()
    }

    /// Snapshot of the in-memory view.
    pub async fn entries(&self) -> Vec<CartEntry> {
        self.entries.lock().await.clone()
    }

    /// Number of distinct entries in the view.
    pub async fn item_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Sum of line totals in the view, rounded to cents.
    pub async fn total(&self) -> Price {
        total_of(&self.entries.lock().await)
    }

    /// [`Self::total`] formatted with two decimals (e.g., "20.00").
    pub async fn format_total(&self) -> String {
        self.total().await.to_string()
    }

    /// Load the persisted cart into the view.
    ///
    /// A missing or blank collection is an empty cart. Entries are returned
    /// apparel first, then electronics.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the store cannot be read or holds
    /// an undecodable value.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<CartEntry>, CartError> {
        let mut view = self.entries.lock().await;
        let mut entries = self.read_persisted().await?;
        display_order(&mut entries);
        *view = entries.clone();
        self.publish(&view);
        debug!(count = view.len(), "Cart loaded");
        Ok(entries)
    }

    /// Add a product line, merging with an existing `(id, source)` entry by
    /// adding quantities.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or
    /// [`CartError::Persistence`] if the write fails (the view is then
    /// reloaded from storage).
    #[instrument(skip(self, line), fields(id = %line.id, source = %line.source, quantity = line.quantity))]
    pub async fn add(&self, line: NewCartLine) -> Result<CartEntry, CartError> {
        let (id, source) = (line.id, line.source);
        let new_entry = CartEntry::from_line(line)?;

        let mut view = self.entries.lock().await;
        let result = self
            .modify_persisted(|items| {
                if let Some(existing) = items.iter_mut().find(|e| e.is(id, source)) {
                    let quantity = existing
                        .quantity()
                        .checked_add(new_entry.quantity())
                        .ok_or_else(|| {
                            CartError::InvalidQuantity(
                                i64::from(existing.quantity()) + i64::from(new_entry.quantity()),
                            )
                        })?;
                    existing.set_quantity(quantity)?;
                    let entry = existing.clone();
                    checked_total(items)?;
                    Ok(entry)
                } else {
                    items.push(new_entry.clone());
                    checked_total(items)?;
                    Ok(new_entry.clone())
                }
            })
            .await;

        match result {
            Ok((entry, mut items)) => {
                display_order(&mut items);
                *view = items;
                self.publish(&view);
                info!(quantity = entry.quantity(), "Added to cart");
                Ok(entry)
            }
            Err(e) => Err(self.resync(&mut view, e).await),
        }
    }

    /// Remove the entry identified by `(id, source)`.
    ///
    /// Removing an absent entry is a no-op. Returns whether the persisted
    /// collection contained the entry.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Persistence`] if the write fails. The view is
    /// then reloaded from storage so it matches what was actually saved.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: ProductId, source: CartSource) -> Result<bool, CartError> {
        let mut view = self.entries.lock().await;
        view.retain(|e| !e.is(id, source));

        let result = self
            .modify_persisted(|items| {
                let before = items.len();
                items.retain(|e| !e.is(id, source));
                Ok(items.len() != before)
            })
            .await;

        match result {
            Ok((removed, _)) => {
                self.publish(&view);
                if removed {
                    info!("Removed from cart");
                } else {
                    debug!("Nothing to remove");
                }
                Ok(removed)
            }
            Err(e) => Err(self.resync(&mut view, e).await),
        }
    }

    /// Change the quantity of `(id, source)`.
    ///
    /// A quantity below 1 is never persisted: the call returns
    /// [`QuantityOutcome::RemovalRequested`] so the caller can confirm and
    /// call [`Self::remove`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] if the quantity does not fit in
    /// a `u32`, [`CartError::Amount`] if the line or cart total would
    /// overflow, or [`CartError::Persistence`] if the write fails. On any
    /// error nothing is written and the view is reloaded from storage.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        id: ProductId,
        source: CartSource,
        new_quantity: i64,
    ) -> Result<QuantityOutcome, CartError> {
        if new_quantity < 1 {
            debug!("Quantity below 1, asking for removal confirmation");
            return Ok(QuantityOutcome::RemovalRequested { id, source });
        }
        let quantity =
            u32::try_from(new_quantity).map_err(|_| CartError::InvalidQuantity(new_quantity))?;

        let mut view = self.entries.lock().await;
        let result = self
            .modify_persisted(|items| {
                let Some(entry) = items.iter_mut().find(|e| e.is(id, source)) else {
                    return Ok(None);
                };
                entry.set_quantity(quantity)?;
                let entry = entry.clone();
                checked_total(items)?;
                Ok(Some(entry))
            })
            .await;

        match result {
            Ok((Some(entry), mut items)) => {
                display_order(&mut items);
                *view = items;
                self.publish(&view);
                Ok(QuantityOutcome::Updated(entry))
            }
            Ok((None, _)) => {
                debug!("No such cart entry");
                Ok(QuantityOutcome::NotFound)
            }
            Err(e) => Err(self.resync(&mut view, e).await),
        }
    }

    /// Read the persisted collection, migrating legacy per-catalog keys.
    ///
    /// Entries whose line total does not fit are dropped. A legacy key that
    /// cannot be decoded is left in place and skipped.
    async fn read_persisted(&self) -> Result<Vec<CartEntry>, StoreError> {
        let mut entries: Vec<CartEntry> = load_json::<_, StoredCart>(&*self.store, keys::CART)
            .await?
            .map(|StoredCart(stored)| normalize(stored, CartSource::Apparel))
            .unwrap_or_default();

        let mut migrated = Vec::new();
        for source in CartSource::ALL {
            let key = keys::legacy_cart(source);
            let stored = match load_json::<_, StoredCart>(&*self.store, key).await {
                Ok(Some(StoredCart(stored))) => stored,
                Ok(None) => continue,
                Err(e @ StoreError::Decode { .. }) => {
                    warn!(key, error = %e, "Skipping undecodable legacy cart");
                    continue;
                }
                Err(e) => return Err(e),
            };
            for entry in normalize(stored, source) {
                if !entries.iter().any(|e| e.is(entry.id(), entry.source())) {
                    entries.push(entry);
                }
            }
            migrated.push(key);
        }

        if !migrated.is_empty() {
            save_json(&*self.store, keys::CART, &entries).await?;
            for key in &migrated {
                self.store.remove(key).await?;
            }
            info!(legacy_keys = ?migrated, count = entries.len(), "Migrated legacy cart collections");
        }

        Ok(entries)
    }

    /// Full read-modify-write of the persisted collection.
    ///
    /// The write is skipped when `f` fails.
    async fn modify_persisted<T>(
        &self,
        f: impl FnOnce(&mut Vec<CartEntry>) -> Result<T, CartError>,
    ) -> Result<(T, Vec<CartEntry>), CartError> {
        let mut items = self.read_persisted().await?;
        let output = f(&mut items)?;
        save_json(&*self.store, keys::CART, &items).await?;
        Ok((output, items))
    }

    /// Reload the view after a failed mutation and hand the error back.
    async fn resync(&self, view: &mut Vec<CartEntry>, err: CartError) -> CartError {
        error!(error = %err, "Cart update failed, reloading from storage");
        match self.read_persisted().await {
            Ok(mut entries) => {
                display_order(&mut entries);
                *view = entries;
            }
            Err(reload_err) => {
                warn!(error = %reload_err, "Cart reload failed, keeping current view");
            }
        }
        self.publish(view);
        err
    }

    fn publish(&self, entries: &[CartEntry]) {
        self.summary.send_replace(CartSummary {
            item_count: entries.len(),
            total: total_of(entries),
        });
    }
}

/// Convert stored entries, dropping any whose line total overflows.
fn normalize(stored: Vec<StoredEntry>, default_source: CartSource) -> Vec<CartEntry> {
    stored
        .into_iter()
        .filter_map(|s| match s.into_entry(default_source) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Dropping stored cart entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};

    use proptest::prelude::*;
    use rust_decimal::Decimal;

    use super::*;
    use crate::store::MemoryStore;

    /// Memory store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("disk full".to_string()));
            }
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key).await
        }
    }

    fn line(id: i64, source: CartSource, unit: i64, quantity: u32) -> NewCartLine {
        NewCartLine {
            id: ProductId::new(id),
            source,
            title: format!("Product {id}"),
            image: Some(format!("https://img.example/{id}.png")),
            category: None,
            brand: None,
            description: None,
            unit_price: Price::new(Decimal::from(unit)).unwrap(),
            quantity,
        }
    }

    async fn seeded(legacy_apparel: &str, legacy_electronics: &str) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .set(keys::LEGACY_APPAREL_CART, legacy_apparel.to_string())
            .await
            .unwrap();
        store
            .set(keys::LEGACY_ELECTRONICS_CART, legacy_electronics.to_string())
            .await
            .unwrap();
        store
    }

    const ONE_JACKET: &str = r#"[{"id":1,"title":"Jacket","quantity":2,"unitPrice":10,"totalPrice":20}]"#;

    #[tokio::test]
    async fn test_load_all_empty_store() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        assert!(cart.load_all().await.unwrap().is_empty());
        assert_eq!(cart.format_total().await, "0.00");
    }

    #[tokio::test]
    async fn test_load_all_single_apparel_entry() {
        let cart = CartStore::new(seeded(ONE_JACKET, "[]").await);
        let entries = cart.load_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source(), CartSource::Apparel);
        assert_eq!(cart.format_total().await, "20.00");
    }

    #[tokio::test]
    async fn test_legacy_keys_migrated_once() {
        let store = seeded(
            ONE_JACKET,
            r#"[{"id":1,"title":"Phone","quantity":1,"unitPrice":300,"totalPrice":300}]"#,
        )
        .await;
        let cart = CartStore::new(Arc::clone(&store));

        let entries = cart.load_all().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is(ProductId::new(1), CartSource::Apparel));
        assert!(entries[1].is(ProductId::new(1), CartSource::Electronics));

        assert!(!store.contains(keys::LEGACY_APPAREL_CART).await);
        assert!(!store.contains(keys::LEGACY_ELECTRONICS_CART).await);
        assert!(store.contains(keys::CART).await);

        // Second load reads the unified key only.
        assert_eq!(cart.load_all().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_unified_entry_wins_over_legacy_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let cart = CartStore::new(Arc::clone(&store));
        cart.add(line(1, CartSource::Apparel, 5, 1)).await.unwrap();

        store
            .set(keys::LEGACY_APPAREL_CART, ONE_JACKET.to_string())
            .await
            .unwrap();
        let entries = cart.load_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].unit_price().to_string(), "5.00");
    }

    #[tokio::test]
    async fn test_add_merges_same_identity() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        cart.add(line(7, CartSource::Electronics, 100, 1)).await.unwrap();
        let merged = cart.add(line(7, CartSource::Electronics, 100, 2)).await.unwrap();
        assert_eq!(merged.quantity(), 3);
        assert_eq!(merged.total_price().to_string(), "300.00");

        cart.add(line(7, CartSource::Apparel, 20, 1)).await.unwrap();
        assert_eq!(cart.item_count().await, 2);
        assert_eq!(cart.format_total().await, "320.00");
    }

    #[tokio::test]
    async fn test_add_rejects_zero_quantity() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            cart.add(line(1, CartSource::Apparel, 1, 0)).await,
            Err(CartError::InvalidQuantity(0))
        ));
    }

    #[tokio::test]
    async fn test_set_quantity_zero_requests_removal() {
        let store = seeded(ONE_JACKET, "[]").await;
        let cart = CartStore::new(Arc::clone(&store));
        cart.load_all().await.unwrap();
        let before = store.get(keys::CART).await.unwrap();

        let outcome = cart
            .set_quantity(ProductId::new(1), CartSource::Apparel, 0)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            QuantityOutcome::RemovalRequested {
                id: ProductId::new(1),
                source: CartSource::Apparel
            }
        );
        assert_eq!(store.get(keys::CART).await.unwrap(), before);
        assert_eq!(cart.entries().await[0].quantity(), 2);
    }

    #[tokio::test]
    async fn test_set_quantity_recomputes_total() {
        let cart = CartStore::new(seeded(ONE_JACKET, "[]").await);
        cart.load_all().await.unwrap();

        let outcome = cart
            .set_quantity(ProductId::new(1), CartSource::Apparel, 5)
            .await
            .unwrap();
        let QuantityOutcome::Updated(entry) = outcome else {
            panic!("expected update, got {outcome:?}");
        };
        assert_eq!(entry.total_price().to_string(), "50.00");

        let reloaded = cart.load_all().await.unwrap();
        assert_eq!(reloaded[0].quantity(), 5);
        assert_eq!(reloaded[0].total_price().to_string(), "50.00");
    }

    #[tokio::test]
    async fn test_set_quantity_unknown_entry() {
        let cart = CartStore::new(seeded(ONE_JACKET, "[]").await);
        cart.load_all().await.unwrap();
        let outcome = cart
            .set_quantity(ProductId::new(1), CartSource::Electronics, 3)
            .await
            .unwrap();
        assert_eq!(outcome, QuantityOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_set_quantity_overflow() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            cart.set_quantity(ProductId::new(1), CartSource::Apparel, i64::MAX)
                .await,
            Err(CartError::InvalidQuantity(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_then_empty() {
        let cart = CartStore::new(seeded(ONE_JACKET, "[]").await);
        cart.load_all().await.unwrap();

        assert!(cart.remove(ProductId::new(1), CartSource::Apparel).await.unwrap());
        assert!(cart.load_all().await.unwrap().is_empty());
        assert_eq!(cart.format_total().await, "0.00");
    }

    #[tokio::test]
    async fn test_remove_missing_is_noop() {
        let store = seeded(ONE_JACKET, "[]").await;
        let cart = CartStore::new(Arc::clone(&store));
        let before = cart.load_all().await.unwrap();

        assert!(!cart.remove(ProductId::new(1), CartSource::Electronics).await.unwrap());
        assert!(!cart.remove(ProductId::new(99), CartSource::Apparel).await.unwrap());
        assert_eq!(cart.load_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_write_resyncs_view() {
        let store = Arc::new(FlakyStore::default());
        let cart = CartStore::new(Arc::clone(&store));
        cart.add(line(1, CartSource::Apparel, 10, 2)).await.unwrap();

        store.fail_writes.store(true, Ordering::SeqCst);
        let result = cart.remove(ProductId::new(1), CartSource::Apparel).await;
        assert!(matches!(result, Err(CartError::Persistence(_))));

        // The view was reloaded and still shows what storage holds.
        let view = cart.entries().await;
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].quantity(), 2);
        assert_eq!(cart.summary().item_count, 1);

        let result = cart
            .set_quantity(ProductId::new(1), CartSource::Apparel, 9)
            .await;
        assert!(matches!(result, Err(CartError::Persistence(_))));
        assert_eq!(cart.entries().await[0].quantity(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let mut rx = cart.subscribe();

        cart.add(line(1, CartSource::Apparel, 10, 2)).await.unwrap();
        assert!(rx.has_changed().unwrap());
        let summary = *rx.borrow_and_update();
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.total.to_string(), "20.00");

        cart.remove(ProductId::new(1), CartSource::Apparel).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().item_count, 0);
    }

    #[tokio::test]
    async fn test_set_quantity_rejects_overflowing_line_total() {
        let store = Arc::new(MemoryStore::new());
        let stored = r#"[{"id":1,"title":"Vault","quantity":1,"unitPrice":"70000000000000000000000000000","source":"apparel"}]"#;
        store.set(keys::CART, stored.to_string()).await.unwrap();
        let cart = CartStore::new(Arc::clone(&store));
        assert_eq!(cart.load_all().await.unwrap().len(), 1);

        let result = cart
            .set_quantity(ProductId::new(1), CartSource::Apparel, 2)
            .await;
        assert!(matches!(result, Err(CartError::Amount(_))));
        assert_eq!(store.get(keys::CART).await.unwrap().as_deref(), Some(stored));
        assert_eq!(cart.entries().await[0].quantity(), 1);

        let mut vault = line(1, CartSource::Apparel, 0, 1);
        vault.unit_price =
            Price::new(Decimal::from_str_exact("70000000000000000000000000000").unwrap()).unwrap();
        assert!(matches!(cart.add(vault).await, Err(CartError::Amount(_))));
        assert_eq!(cart.entries().await[0].quantity(), 1);
    }

    #[tokio::test]
    async fn test_overflowing_stored_entry_is_dropped() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::CART,
                r#"[{"id":1,"quantity":2,"unitPrice":"70000000000000000000000000000"},{"id":2,"quantity":1,"unitPrice":4}]"#
                    .to_string(),
            )
            .await
            .unwrap();
        let cart = CartStore::new(store);
        let entries = cart.load_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), ProductId::new(2));
    }

    #[tokio::test]
    async fn test_undecodable_legacy_key_is_skipped() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(
                keys::CART,
                r#"[{"id":1,"title":"Jacket","quantity":1,"unitPrice":10,"source":"apparel"}]"#
                    .to_string(),
            )
            .await
            .unwrap();
        store
            .set(keys::LEGACY_ELECTRONICS_CART, "{broken".to_string())
            .await
            .unwrap();
        let cart = CartStore::new(Arc::clone(&store));

        let entries = cart.load_all().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(cart.format_total().await, "10.00");
        // Left for inspection, not deleted.
        assert!(store.contains(keys::LEGACY_ELECTRONICS_CART).await);

        cart.add(line(2, CartSource::Electronics, 5, 1)).await.unwrap();
        assert_eq!(cart.load_all().await.unwrap().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_set_quantity_keeps_line_and_cart_totals(
            steps in prop::collection::vec((1i64..4, any::<bool>(), -2i64..50), 0..24)
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let (entries, formatted, expected) = runtime.block_on(async {
                let cart = CartStore::new(Arc::new(MemoryStore::new()));
                let mut expected = HashMap::new();
                for id in 1..4 {
                    for source in CartSource::ALL {
                        let unit = id * 3 + i64::from(source == CartSource::Electronics) * 7;
                        cart.add(line(id, source, unit, 1)).await.unwrap();
                        expected.insert((id, source), 1_u32);
                    }
                }

                for (id, electronics, quantity) in steps {
                    let source = if electronics {
                        CartSource::Electronics
                    } else {
                        CartSource::Apparel
                    };
                    cart.set_quantity(ProductId::new(id), source, quantity)
                        .await
                        .unwrap();
                    if quantity >= 1 {
                        expected.insert((id, source), u32::try_from(quantity).unwrap());
                    }
                }

                let entries = cart.load_all().await.unwrap();
                (entries, cart.format_total().await, expected)
            });

            prop_assert_eq!(entries.len(), expected.len());
            for entry in &entries {
                prop_assert_eq!(entry.total_price(), entry.unit_price().times(entry.quantity()));
                prop_assert_eq!(
                    Some(&entry.quantity()),
                    expected.get(&(entry.id().as_i64(), entry.source()))
                );
            }
            prop_assert_eq!(formatted, checked_total(&entries).unwrap().rounded().to_string());
        }
    }
}
