//! Kernel cache implementation
//!
//! Stores kernel matrix values so SMO never computes K(i,j) twice for the same
//! pair. Kernel matrices are symmetric, so off-diagonal values are stored once
//! under the canonical key (min(i,j), max(i,j)); diagonal values live in their
//! own map.
//!
//! A cache can be sliced into views. A view shares the backing maps, the
//! statistics and the lock with the cache it was sliced from, and translates
//! every index through its own mapping before handing it to the parent's
//! translation. Slicing never copies kernel values.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type IndexMap = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Backing storage shared by a cache and all of its views
#[derive(Debug, Default)]
struct CacheStore {
    diagonal: HashMap<usize, f64>,
    off_diagonal: HashMap<usize, HashMap<usize, f64>>,
    hits: u64,
    misses: u64,
}

impl CacheStore {
    fn insert(&mut self, i: usize, j: usize, value: f64) {
        if i == j {
            self.diagonal.insert(i, value);
            return;
        }
        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.off_diagonal.entry(i).or_default().insert(j, value);
    }

    fn lookup(&mut self, i: usize, j: usize) -> Option<f64> {
        let value = if i == j {
            self.diagonal.get(&i).copied()
        } else {
            let (i, j) = if i < j { (i, j) } else { (j, i) };
            self.off_diagonal
                .get(&i)
                .and_then(|inner| inner.get(&j))
                .copied()
        };
        match value {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        value
    }

    fn len(&self) -> usize {
        self.diagonal.len() + self.off_diagonal.values().map(HashMap::len).sum::<usize>()
    }
}

/// Shared, lazily populated store of kernel values
///
/// Cloning a `KernelCache` yields another handle to the same storage with the
/// same index translation.
#[derive(Clone)]
pub struct KernelCache {
    store: Arc<Mutex<CacheStore>>,
    mapper: IndexMap,
}

impl KernelCache {
    /// Create an empty cache with identity index translation
    pub fn new() -> Self {
        Self {
            store: Arc::new(Mutex::new(CacheStore::default())),
            mapper: Arc::new(|a| a),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheStore> {
        // The store only holds plain values; a panic elsewhere cannot leave it torn.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Translate a view-local index into a storage index
    pub fn translate(&self, a: usize) -> usize {
        (self.mapper)(a)
    }

    /// Store a kernel value for the unordered pair (i, j), overwriting any previous value
    pub fn add(&self, i: usize, j: usize, value: f64) {
        let (i, j) = (self.translate(i), self.translate(j));
        self.lock().insert(i, j, value);
    }

    /// Get a kernel value; `None` when the pair has not been stored yet
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        let (i, j) = (self.translate(i), self.translate(j));
        self.lock().lookup(i, j)
    }

    /// Create a view whose index `a` addresses this cache's index `index_map[a]`
    ///
    /// # Panics
    /// Lookups through the view panic if `a >= index_map.len()`.
    pub fn slice(&self, index_map: &[usize]) -> KernelCache {
        let index_map: Arc<[usize]> = Arc::from(index_map);
        self.slice_with(move |a| index_map[a])
    }

    /// Create a view that translates indices through `f` before this cache's own translation
    pub fn slice_with<F>(&self, f: F) -> KernelCache
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        let parent = Arc::clone(&self.mapper);
        KernelCache {
            store: Arc::clone(&self.store),
            mapper: Arc::new(move |a| parent(f(a))),
        }
    }

    /// Check whether two handles share the same backing storage
    pub fn shares_storage_with(&self, other: &KernelCache) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Number of stored values (shared by every view)
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the cache holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let store = self.lock();
        let total = store.hits + store.misses;
        if total == 0 {
            0.0
        } else {
            store.hits as f64 / total as f64
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let store = self.lock();
        CacheStats {
            hits: store.hits,
            misses: store.misses,
            size: store.len(),
        }
    }

    /// Remove every value and reset the statistics for all views
    pub fn clear(&self) {
        let mut store = self.lock();
        store.diagonal.clear();
        store.off_diagonal.clear();
        store.hits = 0;
        store.misses = 0;
    }
}

impl Default for KernelCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KernelCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelCache")
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}
