//! Persistent key-value storage.
//!
//! Every piece of state the storefront keeps between runs (cart, session,
//! tickets, purchase history) is a JSON blob stored under a string key. The
//! [`KeyValueStore`] trait is the seam; [`MemoryStore`] backs tests and
//! [`FileStore`] backs the command line app.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use mockall::automock;
use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::auth::UserId;

/// Key holding the global cart snapshot.
pub const CART_KEY: &str = "luxeCart";

/// Key holding the signed-in user record.
pub const USER_KEY: &str = "user";

/// Key holding the `"true"` authentication flag.
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";

/// Key holding the tickets owned by `user`.
#[must_use]
pub fn tickets_key(user: UserId) -> String {
    format!("luxeTickets_{user}")
}

/// Key holding the purchase history of `user`.
#[must_use]
pub fn purchases_key(user: UserId) -> String {
    format!("luxePurchases_{user}")
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// A stored value could not be (de)serialized.
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// String-keyed storage of serialized values.
#[automock]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium can't be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and deserialize the value under `key`.
///
/// # Errors
///
/// Returns an error if the value can't be read or isn't valid JSON for `T`.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StoreError::from)
}

/// Serialize `value` and store it under `key`.
///
/// # Errors
///
/// Returns an error if the value can't be serialized or written.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;

    store.set(key, &raw)
}

/// In-process store, lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);

        Ok(())
    }
}

/// Directory-backed store with one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `base_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory can't be created.
    pub fn open(base_path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Directory the store writes into.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        self.base_path.join(format!("{file_name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");

        fs::write(&staging, value)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn memory_store_set_get_remove() -> TestResult {
        let store = MemoryStore::new();

        assert_eq!(store.get("missing")?, None);

        store.set("key", "value")?;

        assert_eq!(store.get("key")?.as_deref(), Some("value"));
        assert_eq!(store.len(), 1);

        store.remove("key")?;
        store.remove("key")?;

        assert!(store.is_empty());

        Ok(())
    }

    #[test]
    fn json_helpers_round_trip_values() -> TestResult {
        let store = MemoryStore::new();
        let sample = Sample {
            name: "neon".to_string(),
            count: 3,
        };

        save_json(&store, "sample", &sample)?;

        let loaded: Option<Sample> = load_json(&store, "sample")?;

        assert_eq!(loaded, Some(sample));

        Ok(())
    }

    #[test]
    fn load_json_surfaces_corrupt_values() -> TestResult {
        let store = MemoryStore::new();

        store.set("sample", "{not json")?;

        let result = load_json::<Sample>(&store, "sample");

        assert!(
            matches!(result, Err(StoreError::Json(_))),
            "expected Json error, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn file_store_persists_between_instances() -> TestResult {
        let dir = tempfile::tempdir()?;

        FileStore::open(dir.path())?.set(CART_KEY, "[]")?;

        let reopened = FileStore::open(dir.path())?;

        assert_eq!(reopened.get(CART_KEY)?.as_deref(), Some("[]"));

        reopened.remove(CART_KEY)?;
        reopened.remove(CART_KEY)?;

        assert_eq!(reopened.get(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn file_store_sanitizes_key_into_file_name() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path())?;

        store.set("../escape/attempt", "1")?;

        assert!(dir.path().join("___escape_attempt.json").exists());
        assert_eq!(store.get("../escape/attempt")?.as_deref(), Some("1"));

        Ok(())
    }

    #[test]
    fn user_keys_are_scoped_by_user_id() {
        let alice = UserId::for_email("alice@example.com");
        let bob = UserId::for_email("bob@example.com");

        assert_ne!(tickets_key(alice), tickets_key(bob));
        assert!(tickets_key(alice).starts_with("luxeTickets_"));
        assert!(purchases_key(alice).starts_with("luxePurchases_"));
    }
}
