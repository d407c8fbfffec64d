//! Key/value storage port.
//!
//! The identity store persists everything through a synchronous, string-keyed
//! medium with get/set/remove, the same shape as browser local storage.
//! Adapters live in `healthapp-infrastructure`.

use crate::error::Result;

/// A synchronous, string-keyed persistent medium.
pub trait KeyValueStore: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// The three keys the identity store owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// JSON array of every registered account, passwords included
    pub accounts: String,
    /// JSON object of the signed-in account without its password
    pub session_user: String,
    /// Session token string
    pub session_token: String,
}

impl StorageKeys {
    pub const DEFAULT_PREFIX: &'static str = "healthapp";

    /// Builds `<prefix>_users`, `<prefix>_user` and `<prefix>_token`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            accounts: format!("{prefix}_users"),
            session_user: format!("{prefix}_user"),
            session_token: format!("{prefix}_token"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(Self::DEFAULT_PREFIX)
    }
}

/// Journal of writes applied to a [`KeyValueStore`].
///
/// Each key's value is captured before its first write. If a later step of a
/// multi-key update fails, [`StagedWrites::rollback`] puts every touched key
/// back, so callers never leave half an update behind.
pub struct StagedWrites<'a> {
    store: &'a dyn KeyValueStore,
    journal: Vec<(String, Option<String>)>,
}

impl<'a> StagedWrites<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            journal: Vec::new(),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.remember(key)?;
        self.store.set(key, value)
    }

    /// Keeps the applied writes.
    pub fn commit(self) {}

    /// Restores every touched key to its value before the first write.
    ///
    /// Best effort: a failing restore is logged and the rest still run.
    pub fn rollback(self) {
        for (key, previous) in self.journal.into_iter().rev() {
            let restored = match previous {
                Some(value) => self.store.set(&key, &value),
                None => self.store.remove(&key),
            };
            if let Err(e) = restored {
                tracing::warn!("Failed to roll back storage key '{}': {}", key, e);
            }
        }
    }

    fn remember(&mut self, key: &str) -> Result<()> {
        if self.journal.iter().any(|(k, _)| k == key) {
            return Ok(());
        }
        let previous = self.store.get(key)?;
        self.journal.push((key.to_string(), previous));
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-crate test double; the real adapters live in infrastructure.

    use super::KeyValueStore;
    use crate::error::{HealthAppError, Result};
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    /// Map-backed store that can be told to fail writes to chosen keys.
    #[derive(Default)]
    pub struct TestStore {
        entries: Mutex<HashMap<String, String>>,
        failing: Mutex<HashSet<String>>,
    }

    impl TestStore {
        pub fn fail_writes_to(&self, key: &str) {
            self.failing.lock().unwrap().insert(key.to_string());
        }

        pub fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        pub fn put(&self, key: &str, value: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn check(&self, key: &str) -> Result<()> {
            if self.failing.lock().unwrap().contains(key) {
                return Err(HealthAppError::storage(format!("write to {key} refused")));
            }
            Ok(())
        }
    }

    impl KeyValueStore for TestStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.raw(key))
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.check(key)?;
            self.put(key, value);
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.check(key)?;
            self.entries.lock().unwrap().remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::TestStore;
    use super::*;

    #[test]
    fn test_default_keys() {
        let keys = StorageKeys::default();
        assert_eq!(keys.accounts, "healthapp_users");
        assert_eq!(keys.session_user, "healthapp_user");
        assert_eq!(keys.session_token, "healthapp_token");
    }

    #[test]
    fn test_rollback_restores_previous_values() {
        let store = TestStore::default();
        store.put("a", "old-a");

        let mut staged = StagedWrites::new(&store);
        staged.set("a", "new-a").unwrap();
        staged.set("a", "newer-a").unwrap();
        staged.set("b", "new-b").unwrap();
        staged.rollback();

        assert_eq!(store.raw("a").as_deref(), Some("old-a"));
        assert_eq!(store.raw("b"), None);
    }

    #[test]
    fn test_rollback_after_failed_step() {
        let store = TestStore::default();
        store.fail_writes_to("b");

        let mut staged = StagedWrites::new(&store);
        staged.set("a", "1").unwrap();
        assert!(staged.set("b", "2").is_err());
        staged.rollback();

        assert_eq!(store.raw("a"), None);
    }

    #[test]
    fn test_commit_keeps_writes() {
        let store = TestStore::default();
        store.put("replaced", "x");

        let mut staged = StagedWrites::new(&store);
        staged.set("kept", "1").unwrap();
        staged.set("replaced", "y").unwrap();
        staged.commit();

        assert_eq!(store.raw("kept").as_deref(), Some("1"));
        assert_eq!(store.raw("replaced").as_deref(), Some("y"));
    }
}
