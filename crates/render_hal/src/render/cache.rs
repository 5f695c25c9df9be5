//! Generic content-keyed resource cache
//!
//! Maps a resource description to a shared GPU handle. Keys are hashed with
//! MurmurHash2A through [`BuildMurmurHasher`]; equal hashes with unequal keys
//! are told apart by `Eq`, so a collision never returns the wrong resource.
//!
//! The cache owns one strong reference per entry. Lookups never evict; an
//! entry goes away only on [`ResourceCache::sweep`] once no outside owner is
//! left, or on [`ResourceCache::clear`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::foundation::hash::{content_hash, BuildMurmurHasher};

/// Deduplicating map from description `K` to shared handle `Arc<V>`
pub struct ResourceCache<K, V: ?Sized> {
    entries: HashMap<K, Arc<V>, BuildMurmurHasher>,
    label: &'static str,
}

impl<K, V> ResourceCache<K, V>
where
    K: Eq + Hash + Debug,
    V: ?Sized,
{
    /// Create an empty cache with hash seed 0
    pub fn new(label: &'static str) -> Self {
        Self::with_seed(label, 0)
    }

    /// Create an empty cache whose key hashes use `seed`
    pub fn with_seed(label: &'static str, seed: u32) -> Self {
        Self {
            entries: HashMap::with_hasher(BuildMurmurHasher::with_seed(seed)),
            label,
        }
    }

    /// Content hash of `key` as this cache computes it
    pub fn key_hash(&self, key: &K) -> u32 {
        content_hash(key, self.entries.hasher().seed())
    }

    /// Shared handle for a structurally equal key, `None` on a miss
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let found = self.entries.get(key).map(Arc::clone);
        log::trace!(
            "{} cache {} [hash 0x{:08x}]",
            self.label,
            if found.is_some() { "hit" } else { "miss" },
            self.key_hash(key)
        );
        found
    }

    /// Store `handle` under `key`, returning any handle it replaces
    pub fn insert(&mut self, key: K, handle: Arc<V>) -> Option<Arc<V>> {
        log::debug!("{} cache insert [hash 0x{:08x}]", self.label, self.key_hash(&key));
        self.entries.insert(key, handle)
    }

    /// Return the cached handle for `key`, creating it with `create` on a miss
    ///
    /// `create` runs at most once. A failed creation is returned as-is and
    /// leaves the cache untouched.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, create: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<Arc<V>, E>,
    {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let handle = create(&key)?;
        self.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    /// Whether a structurally equal key is cached
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every entry no outside owner still holds
    ///
    /// Returns the number of entries removed. Entries with at least one
    /// external owner survive any number of sweeps.
    pub fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, handle| Arc::strong_count(handle) > 1);
        let removed = before - self.entries.len();
        if removed > 0 {
            log::debug!(
                "{} cache sweep released {} of {} entries",
                self.label,
                removed,
                before
            );
        }
        removed
    }

    /// Drop all entries unconditionally
    ///
    /// Handles still owned elsewhere stay alive until their owners drop them.
    pub fn clear(&mut self) {
        log::debug!("{} cache cleared ({} entries)", self.label, self.entries.len());
        self.entries.clear();
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over cached keys and handles
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Arc<V>)> {
        self.entries.iter()
    }
}

impl<K, V: ?Sized> Debug for ResourceCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("label", &self.label)
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::hash::Hasher;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Desc {
        name: String,
        level: u32,
    }

    fn desc(name: &str, level: u32) -> Desc {
        Desc {
            name: name.to_string(),
            level,
        }
    }

    /// Key whose hash ignores `id`, so distinct keys always collide
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Colliding {
        id: u32,
    }

    impl Hash for Colliding {
        fn hash<H: Hasher>(&self, state: &mut H) {
            state.write_u32(42);
        }
    }

    #[test]
    fn test_get_after_insert_with_equal_key() {
        let mut cache: ResourceCache<Desc, str> = ResourceCache::new("test");
        let handle: Arc<str> = Arc::from("gpu-object");
        cache.insert(desc("a", 1), Arc::clone(&handle));

        let found = cache.get(&desc("a", 1)).expect("structurally equal key should hit");
        assert!(Arc::ptr_eq(&found, &handle));
        assert!(cache.get(&desc("a", 2)).is_none());
    }

    #[test]
    fn test_insert_overwrites() {
        let mut cache: ResourceCache<Desc, u32> = ResourceCache::new("test");
        assert!(cache.insert(desc("a", 1), Arc::new(1)).is_none());
        let previous = cache.insert(desc("a", 1), Arc::new(2)).unwrap();
        assert_eq!(*previous, 1);
        assert_eq!(*cache.get(&desc("a", 1)).unwrap(), 2);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_collisions_resolved_by_equality() {
        let mut cache: ResourceCache<Colliding, u32> = ResourceCache::new("collide");
        assert_eq!(cache.key_hash(&Colliding { id: 1 }), cache.key_hash(&Colliding { id: 2 }));

        cache.insert(Colliding { id: 1 }, Arc::new(10));
        cache.insert(Colliding { id: 2 }, Arc::new(20));

        assert_eq!(cache.len(), 2);
        assert_eq!(*cache.get(&Colliding { id: 1 }).unwrap(), 10);
        assert_eq!(*cache.get(&Colliding { id: 2 }).unwrap(), 20);
        assert!(cache.get(&Colliding { id: 3 }).is_none());
    }

    #[test]
    fn test_get_or_try_insert_with_creates_once() {
        let mut cache: ResourceCache<Desc, u32> = ResourceCache::new("test");
        let mut calls = 0;

        let first = cache
            .get_or_try_insert_with(desc("a", 1), |_| -> Result<_, ()> {
                calls += 1;
                Ok(Arc::new(7))
            })
            .unwrap();
        let second = cache
            .get_or_try_insert_with(desc("a", 1), |_| -> Result<_, ()> {
                calls += 1;
                Ok(Arc::new(8))
            })
            .unwrap();

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_creation_is_not_cached() {
        let mut cache: ResourceCache<Desc, u32> = ResourceCache::new("test");
        let result = cache.get_or_try_insert_with(desc("bad", 0), |_| Err("compile error"));
        assert_eq!(result.unwrap_err(), "compile error");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_keeps_externally_owned() {
        let mut cache: ResourceCache<Desc, u32> = ResourceCache::new("test");
        let held = Arc::new(1);
        cache.insert(desc("held", 0), Arc::clone(&held));
        cache.insert(desc("orphan", 0), Arc::new(2));

        assert_eq!(cache.sweep(), 1);
        assert!(cache.contains(&desc("held", 0)));
        assert!(!cache.contains(&desc("orphan", 0)));

        // Repeated sweeps leave owned entries alone
        assert_eq!(cache.sweep(), 0);
        assert_eq!(cache.sweep(), 0);
        assert!(cache.contains(&desc("held", 0)));

        drop(held);
        assert_eq!(cache.sweep(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_releases_cache_reference_only() {
        let mut cache: ResourceCache<Desc, u32> = ResourceCache::new("test");
        let held = Arc::new(5);
        cache.insert(desc("held", 0), Arc::clone(&held));
        assert_eq!(Arc::strong_count(&held), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(Arc::strong_count(&held), 1);
        assert_eq!(*held, 5);
    }

    #[test]
    fn test_seed_changes_key_hash() {
        let a: ResourceCache<Desc, u32> = ResourceCache::with_seed("a", 0);
        let b: ResourceCache<Desc, u32> = ResourceCache::with_seed("b", 1);
        assert_ne!(a.key_hash(&desc("x", 1)), b.key_hash(&desc("x", 1)));
    }
}
