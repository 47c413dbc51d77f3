//! Generic keyed TTL cache with a size bound enforced at cleanup.
//!
//! ## Semantics
//!
//! - An entry is valid while `now - written_at < ttl`. Expired entries read
//!   as absent but stay in the map until [`TtlCache::cleanup`] runs.
//! - The size bound is restored by `cleanup` only, oldest entries first.
//!   Inserts never evict.
//! - A fetch that returns nothing or fails is not cached.
//!
//! ## Stale writes
//!
//! Every `invalidate` and `clear` advances a generation counter before
//! removing anything. A miss remembers the generation it started under and
//! only stores its result if no invalidation happened while it was fetching,
//! so a value read before a write can never land in the cache after that
//! write's invalidation. The caller still receives the fetched value.

use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::config::CachePolicy;
use crate::error::CacheError;
use crate::registry::CleanupTarget;
use crate::stats::CacheStats;

struct CacheEntry<V> {
    value: V,
    written_at: Instant,
    /// Insertion sequence number, breaks `written_at` ties.
    seq: u64,
}

/// A bounded map from key to value plus write timestamp.
///
/// Values are cloned out on every hit, so domain caches store `Arc<T>`.
pub struct TtlCache<K, V> {
    name: String,
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    max_size: usize,
    generation: AtomicU64,
    next_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K, V> fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("size", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("max_size", &self.max_size)
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    pub fn new(name: impl Into<String>, ttl: Duration, max_size: usize) -> Self {
        Self {
            name: name.into(),
            entries: DashMap::new(),
            ttl,
            max_size,
            generation: AtomicU64::new(0),
            next_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn from_policy(name: impl Into<String>, policy: &CachePolicy) -> Self {
        Self::new(name, policy.ttl(), policy.max_entries)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_valid(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.written_at) < self.ttl
    }

    fn lookup(&self, key: &K) -> Option<V> {
        let entry = self.entries.get(key)?;
        if self.is_valid(&entry, Instant::now()) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Returns the value for `key` if a valid entry exists.
    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.lookup(key);
        let counter = if value.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Returns the cached value, or fetches and stores it on a miss.
    ///
    /// `Ok(None)` from the fetch means "does not exist" and is returned as a
    /// miss without caching. A fetch error is logged with the key and also
    /// surfaces as `None`; the next call fetches again.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Option<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
        E: fmt::Display,
    {
        if let Some(value) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(cache = %self.name, key = %key, "cache hit");
            return Some(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(cache = %self.name, key = %key, "cache miss");

        let generation = self.generation.load(Ordering::SeqCst);
        match fetch().await {
            Ok(Some(value)) => {
                if !self.store(key.clone(), value.clone(), generation) {
                    debug!(
                        cache = %self.name,
                        key = %key,
                        "Invalidated during fetch, result not cached"
                    );
                }
                Some(value)
            }
            Ok(None) => None,
            Err(error) => {
                warn!(
                    cache = %self.name,
                    key = %key,
                    error = %error,
                    "Cache fetch failed, treating as miss"
                );
                None
            }
        }
    }

    /// Stores `value` unconditionally, replacing any previous entry.
    pub fn insert(&self, key: K, value: V) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key,
            CacheEntry {
                value,
                written_at: Instant::now(),
                seq,
            },
        );
    }

    /// Inserts only if no invalidation happened since `generation` was read.
    ///
    /// The generation is checked again after the insert; if an invalidation
    /// slipped in between, the entry written here is taken out again.
    fn store(&self, key: K, value: V, generation: u64) -> bool {
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value,
                written_at: Instant::now(),
                seq,
            },
        );
        if self.generation.load(Ordering::SeqCst) != generation {
            self.entries.remove_if(&key, |_, entry| entry.seq == seq);
            return false;
        }
        true
    }

    /// Removes the entry for `key`. No-op if absent.
    pub fn invalidate(&self, key: &K) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.entries.remove(key).is_some() {
            debug!(cache = %self.name, key = %key, "Cache entry invalidated");
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.entries.clear();
        debug!(cache = %self.name, "Cache cleared");
    }

    /// Removes expired entries, then the oldest entries until the size bound
    /// holds again. Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        self.entries.retain(|_, entry| {
            if self.is_valid(entry, now) {
                true
            } else {
                removed += 1;
                false
            }
        });

        let size = self.entries.len();
        if size > self.max_size {
            let mut by_age: Vec<(Instant, u64, K)> = self
                .entries
                .iter()
                .map(|entry| (entry.written_at, entry.seq, entry.key().clone()))
                .collect();
            by_age.sort_unstable_by_key(|(written_at, seq, _)| (*written_at, *seq));

            for (_, seq, key) in by_age.into_iter().take(size - self.max_size) {
                if self
                    .entries
                    .remove_if(&key, |_, entry| entry.seq == seq)
                    .is_some()
                {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let valid_entries = self
            .entries
            .iter()
            .filter(|entry| self.is_valid(entry.value(), now))
            .count();
        CacheStats {
            size: self.entries.len(),
            valid_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> CleanupTarget for TtlCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync,
    V: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn cleanup(&self) -> Result<usize, CacheError> {
        Ok(TtlCache::cleanup(self))
    }

    fn stats(&self) -> CacheStats {
        TtlCache::stats(self)
    }

    fn clear(&self) {
        TtlCache::clear(self);
    }
}
