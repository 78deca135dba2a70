//! Local key-value persistence.
//!
//! Cart contents and the session marker live in a small asynchronous
//! key-value store addressed by fixed string keys. Values are whole JSON
//! documents: every mutation reads the full value and writes it back.
//!
//! # Backends
//!
//! - [`FileStore`] - one JSON file per key under a data directory, written
//!   atomically (temp file, fsync, rename)
//! - [`MemoryStore`] - process-local map, used by tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys.
pub mod keys {
    use eleegon_core::CartSource;

    /// Key for the unified cart collection.
    pub const CART: &str = "cart";

    /// Key for the logged-in user marker.
    pub const SESSION: &str = "eleegon_user_data";

    /// Legacy key for the apparel-only cart collection.
    pub const LEGACY_APPAREL_CART: &str = "cartItems";

    /// Legacy key for the electronics-only cart collection.
    pub const LEGACY_ELECTRONICS_CART: &str = "cartElectronics";

    /// Legacy per-catalog cart key for a source.
    #[must_use]
    pub const fn legacy_cart(source: CartSource) -> &'static str {
        match source {
            CartSource::Apparel => LEGACY_APPAREL_CART,
            CartSource::Electronics => LEGACY_ELECTRONICS_CART,
        }
    }
}

/// Errors that can occur when reading or writing the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("I/O error on key {key}: {source}")]
    Io {
        /// Key being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be decoded.
    #[error("corrupt value under key {key}: {source}")]
    Decode {
        /// Key being decoded.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        /// Key being written.
        key: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Key contains characters the backend cannot address.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Backend is not available.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must treat a missing key as `Ok(None)`, never as an error.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete `key`. Deleting a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Read and decode a JSON value.
///
/// Missing keys and blank values both decode as `None`.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the stored text is not valid JSON for `T`,
/// or any error raised by the backend.
pub async fn load_json<S, T>(store: &S, key: &str) -> Result<Option<T>, StoreError>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    if raw.trim().is_empty() || raw.trim() == "null" {
        return Ok(None);
    }
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: key.to_owned(),
            source,
        })
}

/// Encode and write a JSON value.
///
/// # Errors
///
/// Returns [`StoreError::Encode`] if `value` cannot be serialized, or any
/// error raised by the backend.
pub async fn save_json<S, T>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_owned(),
        source,
    })?;
    store.set(key, raw).await
}

/// Returns true if `key` is safe to use as a file name.
pub(crate) fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key(keys::CART));
        assert!(is_valid_key(keys::SESSION));
        assert!(is_valid_key(keys::LEGACY_APPAREL_CART));
        assert!(!is_valid_key(""));
        assert!(!is_valid_key("../etc/passwd"));
        assert!(!is_valid_key("a b"));
    }

    #[tokio::test]
    async fn test_load_json_missing_and_blank() {
        let store = MemoryStore::new();
        let missing: Option<Vec<u32>> = load_json(&store, "nothing").await.unwrap();
        assert!(missing.is_none());

        store.set("blank", "  ".to_string()).await.unwrap();
        let blank: Option<Vec<u32>> = load_json(&store, "blank").await.unwrap();
        assert!(blank.is_none());

        store.set("null", "null".to_string()).await.unwrap();
        let null: Option<Vec<u32>> = load_json(&store, "null").await.unwrap();
        assert!(null.is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_json() {
        let store = MemoryStore::new();
        save_json(&store, "numbers", &vec![1_u32, 2, 3]).await.unwrap();
        let loaded: Option<Vec<u32>> = load_json(&store, "numbers").await.unwrap();
        assert_eq!(loaded, Some(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_load_json_corrupt_value() {
        let store = MemoryStore::new();
        store.set("bad", "{not json".to_string()).await.unwrap();
        let result: Result<Option<Vec<u32>>, _> = load_json(&store, "bad").await;
        assert!(matches!(result, Err(StoreError::Decode { ref key, .. }) if key == "bad"));
    }
}
