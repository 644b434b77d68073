//! In-memory cache of successful route searches.
//!
//! Results are keyed by the algorithmic parameters of a search (see
//! [`RouteCacheKey`]); display-only parameters such as colour and line width
//! never influence identity.
//!
//! # Locking
//!
//! The entry map sits behind a `parking_lot::RwLock`. Lookups take the read
//! lock, so concurrent readers never block each other. Recency stamps and
//! hit/miss counters are atomics, which lets a lookup record its access
//! without the write lock. `put`, `clear` and `reset_statistics` take the
//! write lock.
//!
//! # Eviction
//!
//! When an insertion pushes the entry count past the configured maximum, the
//! entry with the oldest access stamp is removed before `put` returns.
//!
//! # Invalidation
//!
//! Keys that are not scoped to a star collection cannot notice dataset
//! changes. Call [`RouteCache::clear`] when the dataset is reloaded or star
//! data is edited.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::DEFAULT_CACHE_CAPACITY;
use crate::routing::{RouteFindingOptions, RouteFindingResult};
use crate::star::{DatasetId, StarNode};

/// Distance bounds are compared in hundredths of a light-year.
const DISTANCE_PRECISION: f64 = 100.0;

/// Identity of a route search for caching purposes.
///
/// Exclusion sets are held sorted and bounds are rounded, so two option sets
/// that describe the same search always produce equal keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteCacheKey {
    origin: String,
    destination: String,
    lower_bound: i64,
    upper_bound: i64,
    max_paths: usize,
    category_exclusions: BTreeSet<String>,
    affiliation_exclusions: BTreeSet<String>,
    scope: Option<String>,
}

impl RouteCacheKey {
    /// Key derived from the algorithmic options alone.
    pub fn from_options(options: &RouteFindingOptions) -> Self {
        Self {
            origin: options.origin.clone(),
            destination: options.destination.clone(),
            lower_bound: normalize_distance(options.lower_bound),
            upper_bound: normalize_distance(options.upper_bound),
            max_paths: options.max_paths,
            category_exclusions: options.category_exclusions.clone(),
            affiliation_exclusions: options.affiliation_exclusions.clone(),
            scope: None,
        }
    }

    /// Key that additionally fingerprints the names of the available stars,
    /// for searches over a changing subset such as the stars in view.
    pub fn with_stars(options: &RouteFindingOptions, stars: &[StarNode]) -> Self {
        let mut key = Self::from_options(options);
        key.scope = Some(format!("stars:{}", star_fingerprint(stars)));
        key
    }

    /// Key that additionally includes a caller-chosen dataset identity.
    pub fn with_dataset(options: &RouteFindingOptions, dataset: &DatasetId) -> Self {
        let mut key = Self::from_options(options);
        key.scope = Some(format!("dataset:{dataset}"));
        key
    }

    pub fn lower_bound(&self) -> f64 {
        self.lower_bound as f64 / DISTANCE_PRECISION
    }

    pub fn upper_bound(&self) -> f64 {
        self.upper_bound as f64 / DISTANCE_PRECISION
    }
}

impl fmt::Display for RouteCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RouteCacheKey[{} -> {}, bounds={:.2}-{:.2}, paths={}, excl={}/{}",
            self.origin,
            self.destination,
            self.lower_bound(),
            self.upper_bound(),
            self.max_paths,
            self.category_exclusions.len(),
            self.affiliation_exclusions.len()
        )?;
        if let Some(scope) = &self.scope {
            write!(f, ", {scope}")?;
        }
        f.write_str("]")
    }
}

fn normalize_distance(distance: f64) -> i64 {
    (distance * DISTANCE_PRECISION).round() as i64
}

/// SHA-256 over the sorted star names, truncated to 16 hex digits.
fn star_fingerprint(stars: &[StarNode]) -> String {
    let mut names: Vec<&str> = stars.iter().map(|star| star.name.as_str()).collect();
    names.sort_unstable();

    let mut hasher = Sha256::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..8])
}

struct CacheEntry {
    result: RouteFindingResult,
    last_access: AtomicU64,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatistics {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStatistics {
    /// Hit percentage over all lookups, or 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            100.0 * self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RouteCache[size={}, hits={}, misses={}, hitRate={:.1}%]",
            self.size,
            self.hits,
            self.misses,
            self.hit_rate()
        )
    }
}

/// Thread-safe, size-bounded LRU cache of successful route results.
pub struct RouteCache {
    max_size: usize,
    entries: RwLock<HashMap<RouteCacheKey, CacheEntry>>,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl RouteCache {
    /// Create a cache holding at most `max_size` entries. A size of zero
    /// disables storage.
    pub fn new(max_size: usize) -> Self {
        info!(max_size, "route cache initialized");
        Self {
            max_size,
            entries: RwLock::new(HashMap::new()),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Look up a cached result, marking it most recently used.
    pub fn get(&self, key: &RouteCacheKey) -> Option<RouteFindingResult> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) => {
                entry.last_access.store(self.tick(), Ordering::Relaxed);
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "cache hit");
                Some(entry.result.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(%key, "cache miss");
                None
            }
        }
    }

    /// Store a result. Failed results are ignored. Returns whether the
    /// result was stored.
    pub fn put(&self, key: RouteCacheKey, result: RouteFindingResult) -> bool {
        if !result.is_success() {
            debug!(%key, "not caching failed result");
            return false;
        }
        if self.max_size == 0 {
            return false;
        }

        let mut entries = self.entries.write();
        let stamp = self.tick();
        debug!(%key, "caching result");
        entries.insert(
            key,
            CacheEntry {
                result,
                last_access: AtomicU64::new(stamp),
            },
        );

        while entries.len() > self.max_size {
            let Some(eldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access.load(Ordering::Relaxed))
                .map(|(key, _)| key.clone())
            else {
                break;
            };
            entries.remove(&eldest);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key = %eldest, "evicted least recently used entry");
        }
        true
    }

    /// Remove every entry. Statistics are kept.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        info!(removed, "route cache cleared");
    }

    pub fn size(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Whether `key` is cached, without touching recency or statistics.
    pub fn contains(&self, key: &RouteCacheKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Zero the hit, miss and eviction counters, keeping cached data.
    pub fn reset_statistics(&self) {
        let _entries = self.entries.write();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        debug!("cache statistics reset");
    }

    pub fn statistics(&self) -> CacheStatistics {
        let entries = self.entries.read();
        CacheStatistics {
            size: entries.len(),
            capacity: self.max_size,
            hits: self.hits(),
            misses: self.misses(),
            evictions: self.evictions(),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for RouteCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteCache")
            .field("statistics", &self.statistics())
            .finish()
    }
}
