//! Bounded response caching.
//!
//! [`Cache`] is the seam the user pipeline depends on; [`LruCache`] is the
//! in-memory implementation. Entries are never invalidated explicitly: an
//! entry leaves only when capacity pressure evicts it.

pub mod memory;

pub use self::memory::{DEFAULT_USER_CACHE_SIZE, LruCache};

/// A key/value cache shared between concurrent callers.
pub trait Cache<K, V>: Send + Sync {
    /// Look up `key`, marking it most recently used on a hit.
    fn get(&self, key: &K) -> Option<V>;

    /// Insert or replace `key`, evicting the least recently used entry if
    /// the cache is full.
    fn put(&self, key: K, value: V);
}
