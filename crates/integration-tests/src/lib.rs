//! Integration tests for the Eleegon storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p eleegon-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart over the file store, including legacy migration
//! - `access_guard` - Login marker and guarded state over the file store
//!
//! None of the tests reach the network; catalog clients are built but only
//! used where no request is made.

use std::sync::Arc;

use eleegon_core::{CartSource, Price, ProductId};
use eleegon_storefront::cart::NewCartLine;
use eleegon_storefront::config::StorefrontConfig;
use eleegon_storefront::state::AppState;
use eleegon_storefront::store::FileStore;
use tempfile::TempDir;

/// Application state over a file store in a fresh temporary directory.
///
/// Keep the returned [`TempDir`] alive for as long as the state is used.
///
/// # Panics
///
/// Panics if the temporary directory or the HTTP client cannot be created.
#[must_use]
pub fn temp_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let state = state_in(&dir);
    (dir, state)
}

/// Application state over the file store rooted at `dir`.
///
/// Two states over the same directory behave like two launches of the app.
///
/// # Panics
///
/// Panics if the HTTP client cannot be created.
#[must_use]
pub fn state_in(dir: &TempDir) -> AppState {
    let data_dir = dir.path().to_string_lossy().into_owned();
    let config = StorefrontConfig::from_lookup(&|key| {
        (key == "ELEEGON_DATA_DIR").then(|| data_dir.clone())
    })
    .expect("default config");
    AppState::with_store(config.clone(), Arc::new(FileStore::new(config.data_dir)))
        .expect("build state")
}

/// A cart line with a whole-dollar unit price.
#[must_use]
pub fn line(id: i64, source: CartSource, unit_price: i64, quantity: u32) -> NewCartLine {
    NewCartLine {
        id: ProductId::new(id),
        source,
        title: format!("{source} {id}"),
        image: None,
        category: None,
        brand: None,
        description: None,
        unit_price: Price::saturating(unit_price.into()),
        quantity,
    }
}
