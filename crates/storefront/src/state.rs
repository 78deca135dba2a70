//! Application state shared across commands.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::{CatalogClient, CatalogError};
use crate::config::StorefrontConfig;
use crate::session::{AccessGuard, SessionStore};
use crate::store::{FileStore, KeyValueStore};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc`. There is exactly one
/// [`CartStore`] per state, so every view sees the same cart.
pub struct AppState<S = FileStore> {
    inner: Arc<AppStateInner<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AppStateInner<S> {
    config: StorefrontConfig,
    catalog: CatalogClient,
    cart: CartStore<S>,
    session: SessionStore<S>,
}

impl AppState<FileStore> {
    /// Create state backed by files under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, CatalogError> {
        let store = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_store(config, store)
    }
}

impl<S: KeyValueStore> AppState<S> {
    /// Create state over an explicit store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(config: StorefrontConfig, store: Arc<S>) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.catalog)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                cart: CartStore::new(Arc::clone(&store)),
                session: SessionStore::new(store),
                catalog,
                config,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn catalog(&self) -> &CatalogClient {
        &self.inner.catalog
    }

    /// Get a reference to the shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore<S> {
        &self.inner.cart
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore<S> {
        &self.inner.session
    }

    /// A fresh access guard for a protected view.
    #[must_use]
    pub fn guard(&self) -> AccessGuard<S> {
        AccessGuard::new(self.inner.session.clone())
    }
}
