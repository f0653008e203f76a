//! Fixed-capacity least-recently-used cache.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use super::Cache;

/// Default capacity of the user cache.
pub const DEFAULT_USER_CACHE_SIZE: usize = 1_000;

/// Thread-safe LRU cache with a fixed capacity.
///
/// `get` promotes the entry to most recently used; `put` on a full cache
/// evicts exactly one entry, the least recently used one. Values are
/// cloned out, so keep them cheap to clone.
///
/// ```rust
/// # use huginn::cache::{Cache, LruCache};
/// let cache = LruCache::new(2);
/// cache.put(1, "one");
/// cache.put(2, "two");
/// cache.get(&1); // 1 is now most recently used
/// cache.put(3, "three"); // evicts 2
/// assert_eq!(cache.get(&2), None);
/// assert_eq!(cache.get(&1), Some("one"));
/// ```
pub struct LruCache<K, V> {
    entries: Mutex<lru::LruCache<K, V>>,
    capacity: NonZeroUsize,
}

impl<K: Hash + Eq, V: Clone> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(lru::LruCache::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains(key)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, lru::LruCache<K, V>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Hash + Eq, V: Clone> Default for LruCache<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_USER_CACHE_SIZE)
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
where
    K: Hash + Eq + Send,
    V: Clone + Send,
{
    fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    fn put(&self, key: K, value: V) {
        self.lock().put(key, value);
    }
}
