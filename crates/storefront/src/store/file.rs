//! File-backed key-value store.
//!
//! Each key maps to `<data_dir>/<key>.json`. Writes go to a sibling temp
//! file which is fsynced and renamed over the target, so a crash mid-write
//! leaves either the old or the new value, never a torn one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use super::{KeyValueStore, StoreError, is_valid_key};

/// Key-value store persisting one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `dir`.
    ///
    /// The directory is created lazily on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the value files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_key(key) {
            return Err(StoreError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn io_error(key: &str, source: std::io::Error) -> StoreError {
        StoreError::Io {
            key: key.to_owned(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Key not present");
                Ok(None)
            }
            Err(e) => Err(Self::io_error(key, e)),
        }
    }

    #[instrument(skip(self, value), fields(dir = %self.dir.display(), bytes = value.len()))]
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Self::io_error(key, e))?;
        file.write_all(value.as_bytes())
            .await
            .map_err(|e| Self::io_error(key, e))?;
        file.flush().await.map_err(|e| Self::io_error(key, e))?;
        file.sync_all().await.map_err(|e| Self::io_error(key, e))?;
        drop(file);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| Self::io_error(key, e))?;

        debug!("Value written");
        Ok(())
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(key, e)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("data"));
        assert!(store.get("cart").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_creates_dir_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data"));

        store.set("cart", "[]".to_string()).await.unwrap();
        store.set("cart", "[1]".to_string()).await.unwrap();

        assert_eq!(store.get("cart").await.unwrap().as_deref(), Some("[1]"));
        assert!(store.dir().join("cart.json").exists());
        assert!(!store.dir().join("cart.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("eleegon_user_data", "{}".to_string()).await.unwrap();
        store.remove("eleegon_user_data").await.unwrap();
        store.remove("eleegon_user_data").await.unwrap();
        assert!(store.get("eleegon_user_data").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(matches!(
            store.get("../secret").await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set("a/b", String::new()).await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
