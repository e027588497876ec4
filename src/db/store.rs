//! Store Module
//!
//! Concurrent key-value map with per-entry TTL and lazy expiration.

use std::collections::HashMap;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::StoreConfig;
use crate::db::stats::Counters;
use crate::db::{Entry, StoreStats};

// == Store State ==
/// Everything guarded by the store lock.
#[derive(Debug)]
pub(crate) struct State<K, V> {
    pub(crate) entries: HashMap<K, Entry<V>>,
    pub(crate) default_ttl: Duration,
}

// == Store ==
/// Thread-safe key-value store with optional per-entry TTL.
///
/// All state sits behind one reader/writer lock. Reads of live entries take
/// the shared lock; every mutation takes the exclusive lock. Expired entries
/// are dropped lazily by [`Store::get`] or in bulk by [`Store::clean_expired`].
///
/// Persistence files are resolved under `base_path`, see [`Store::persist`].
#[derive(Debug)]
pub struct Store<K, V> {
    pub(crate) state: RwLock<State<K, V>>,
    pub(crate) base_path: PathBuf,
    pub(crate) counters: Counters,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied by [`Store::set`]; zero means no expiration
    /// * `base_path` - Directory persistence filenames are resolved against
    pub fn new(default_ttl: Duration, base_path: impl Into<PathBuf>) -> Self {
        Self {
            state: RwLock::new(State {
                entries: HashMap::new(),
                default_ttl,
            }),
            base_path: base_path.into(),
            counters: Counters::default(),
        }
    }

    /// Creates an empty store from a [`StoreConfig`].
    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.default_ttl, config.base_path.clone())
    }

    // == Set ==
    /// Inserts or overwrites `key`, expiring after the default TTL.
    ///
    /// Overwriting replaces both the value and the expiration.
    pub fn set(&self, key: K, value: V) {
        let mut state = self.state.write();
        let entry = Entry::new(value, state.default_ttl);
        state.entries.insert(key, entry);
    }

    /// Inserts or overwrites `key` with its own TTL.
    ///
    /// A zero `ttl` stores an entry that never expires, whatever the default.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let entry = Entry::new(value, ttl);
        self.state.write().entries.insert(key, entry);
    }

    // == Contains ==
    /// Returns true if `key` holds a live entry.
    ///
    /// Follows the same expiration rules as [`Store::get`] without cloning
    /// the value.
    pub fn contains_key(&self, key: &K) -> bool {
        {
            let state = self.state.read();
            match state.entries.get(key) {
                None => return false,
                Some(entry) if !entry.is_expired() => return true,
                Some(_) => {}
            }
        }

        let mut state = self.state.write();
        match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => true,
            Some(_) => {
                state.entries.remove(key);
                self.counters.record_expirations(1);
                false
            }
            None => false,
        }
    }

    // == Delete ==
    /// Removes `key` if present. Deleting a missing key is a no-op.
    pub fn delete(&self, key: &K) {
        self.state.write().entries.remove(key);
    }

    // == Clear ==
    /// Discards every entry.
    pub fn clear(&self) {
        self.state.write().entries = HashMap::new();
    }

    // == Clean Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn clean_expired(&self) -> usize {
        let mut state = self.state.write();
        let now = Utc::now();

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - state.entries.len();
        drop(state);

        self.counters.record_expirations(removed);
        debug!(removed, "Swept expired entries");
        removed
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Get ==
    /// Returns a copy of the value for `key` if present and not expired.
    ///
    /// An expired entry is removed as a side effect. Removal happens under the
    /// exclusive lock after re-reading the entry, so a concurrent refresh or
    /// delete is never undone.
    pub fn get(&self, key: &K) -> Option<V> {
        {
            let state = self.state.read();
            match state.entries.get(key) {
                None => {
                    self.counters.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired() => {
                    self.counters.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Expired under the shared lock; re-validate before removing.
        let mut state = self.state.write();
        match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.counters.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                state.entries.remove(key);
                self.counters.record_expirations(1);
                self.counters.record_miss();
                debug!("Dropped expired entry on read");
                None
            }
            None => {
                self.counters.record_miss();
                None
            }
        }
    }
}

impl<K, V> Store<K, V> {
    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    /// Returns the TTL applied by `set`.
    pub fn default_ttl(&self) -> Duration {
        self.state.read().default_ttl
    }

    /// Returns the directory persistence filenames are resolved against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> StoreStats {
        self.counters.snapshot(self.len())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread::{self, sleep};

    const SHORT_TTL: Duration = Duration::from_millis(50);
    const PAST_SHORT_TTL: Duration = Duration::from_millis(120);

    fn store() -> Store<String, String> {
        Store::new(Duration::ZERO, "./data")
    }

    #[test]
    fn test_store_new() {
        let store = store();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.default_ttl(), Duration::ZERO);
        assert_eq!(store.base_path(), Path::new("./data"));
    }

    #[test]
    fn test_store_from_config() {
        let config = StoreConfig::default()
            .with_default_ttl(Duration::from_secs(5))
            .with_base_path("/tmp/cache-db");
        let store: Store<u32, u32> = Store::from_config(&config);

        assert_eq!(store.default_ttl(), Duration::from_secs(5));
        assert_eq!(store.base_path(), Path::new("/tmp/cache-db"));
    }

    #[test]
    fn test_store_set_and_get() {
        let store = store();

        store.set("key1".to_string(), "value1".to_string());

        assert_eq!(store.get(&"key1".to_string()), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = store();
        assert_eq!(store.get(&"nonexistent".to_string()), None);
    }

    #[test]
    fn test_store_accepts_non_clone_values() {
        #[derive(Debug, PartialEq)]
        struct Handle(u32);

        let store: Store<&str, Handle> = Store::new(Duration::ZERO, "data");
        store.set("a", Handle(1));
        store.set_with_ttl("b", Handle(2), SHORT_TTL);

        assert!(store.contains_key(&"a"));
        store.delete(&"a");
        assert_eq!(store.len(), 1);

        sleep(PAST_SHORT_TTL);
        assert_eq!(store.clean_expired(), 1);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_zero_values() {
        let store: Store<String, u64> = Store::new(Duration::ZERO, "data");

        store.set(String::new(), 0);

        assert_eq!(store.get(&String::new()), Some(0));
    }

    #[test]
    fn test_store_no_default_ttl_never_expires() {
        let store = store();
        store.set("key1".to_string(), "value1".to_string());

        sleep(PAST_SHORT_TTL);

        assert!(store.get(&"key1".to_string()).is_some());
        assert_eq!(store.clean_expired(), 0);
    }

    #[test]
    fn test_store_default_ttl_expiration() {
        let store: Store<String, String> = Store::new(SHORT_TTL, "data");
        store.set("key1".to_string(), "value1".to_string());

        assert!(store.get(&"key1".to_string()).is_some());

        sleep(PAST_SHORT_TTL);

        assert_eq!(store.get(&"key1".to_string()), None);
        assert!(store.is_empty(), "Expired entry should be dropped on read");
    }

    #[test]
    fn test_store_set_with_ttl_expiration() {
        let store = store();
        store.set_with_ttl("key1".to_string(), "value1".to_string(), SHORT_TTL);

        assert_eq!(store.get(&"key1".to_string()), Some("value1".to_string()));

        sleep(PAST_SHORT_TTL);

        assert_eq!(store.get(&"key1".to_string()), None);
    }

    #[test]
    fn test_store_set_with_zero_ttl_overrides_default() {
        let store: Store<String, String> = Store::new(SHORT_TTL, "data");
        store.set_with_ttl("key1".to_string(), "value1".to_string(), Duration::ZERO);

        sleep(PAST_SHORT_TTL);

        assert_eq!(store.get(&"key1".to_string()), Some("value1".to_string()));
    }

    #[test]
    fn test_store_overwrite_resets_expiration() {
        let store = store();
        store.set_with_ttl("key1".to_string(), "value1".to_string(), SHORT_TTL);
        store.set("key1".to_string(), "value2".to_string());

        sleep(PAST_SHORT_TTL);

        assert_eq!(store.get(&"key1".to_string()), Some("value2".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.delete(&"key1".to_string());

        assert!(store.is_empty());
        assert_eq!(store.get(&"key1".to_string()), None);
    }

    #[test]
    fn test_store_delete_nonexistent() {
        let store = store();
        store.delete(&"nonexistent".to_string());
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear() {
        let store = store();
        store.set("key1".to_string(), "value1".to_string());
        store.set("key2".to_string(), "value2".to_string());

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get(&"key1".to_string()), None);
        assert_eq!(store.get(&"key2".to_string()), None);
    }

    #[test]
    fn test_store_clean_expired() {
        let store = store();

        store.set_with_ttl("key1".to_string(), "value1".to_string(), SHORT_TTL);
        store.set_with_ttl("key2".to_string(), "value2".to_string(), SHORT_TTL);
        store.set_with_ttl("key3".to_string(), "value3".to_string(), Duration::from_secs(60));
        store.set("key4".to_string(), "value4".to_string());

        sleep(PAST_SHORT_TTL);

        assert_eq!(store.clean_expired(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&"key1".to_string()), None);
        assert!(store.get(&"key3".to_string()).is_some());
        assert!(store.get(&"key4".to_string()).is_some());
        assert_eq!(store.clean_expired(), 0);
    }

    #[test]
    fn test_store_contains_key() {
        let store = store();
        store.set_with_ttl("key1".to_string(), "value1".to_string(), SHORT_TTL);

        assert!(store.contains_key(&"key1".to_string()));
        assert!(!store.contains_key(&"missing".to_string()));

        sleep(PAST_SHORT_TTL);

        assert!(!store.contains_key(&"key1".to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let store = store();

        store.set("key1".to_string(), "value1".to_string());
        store.set_with_ttl("key2".to_string(), "value2".to_string(), SHORT_TTL);
        store.get(&"key1".to_string()); // hit
        store.get(&"nonexistent".to_string()); // miss

        sleep(PAST_SHORT_TTL);
        store.get(&"key2".to_string()); // expired miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_concurrent_refresh_survives_lazy_expiry() {
        let store = Arc::new(store());
        let key = "hot".to_string();

        for round in 0..20 {
            store.set_with_ttl(key.clone(), format!("old-{}", round), Duration::from_millis(1));
            sleep(Duration::from_millis(2));

            let writer = {
                let store = Arc::clone(&store);
                let key = key.clone();
                thread::spawn(move || store.set(key, format!("new-{}", round)))
            };
            let _ = store.get(&key);
            writer.join().unwrap();

            // The fresh write must never be removed by a racing lazy expiry.
            assert_eq!(store.get(&key), Some(format!("new-{}", round)));
        }
    }
}
