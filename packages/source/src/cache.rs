//! Bounded, time-limited memoisation of request results.
//!
//! Entries hold the in-flight request itself, so concurrent callers asking
//! for the same key share one outbound request. The time-to-live starts
//! when a load succeeds; a pending load never expires. Failed loads are
//! evicted as soon as they settle and never served from cache.

use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use clru::CLruCache;
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};

/// Default time-to-live for cached entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Default number of entries kept before least-recently-used eviction.
pub const DEFAULT_CAPACITY: usize = 100;

type SharedLoad<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

struct Entry<V, E>
where
    V: Clone,
    E: Clone,
{
    load: SharedLoad<V, E>,
    /// Set once the load succeeds.
    settled_at: Option<Instant>,
    generation: u64,
}

/// LRU cache of shared request futures keyed by request URL.
pub struct ResponseCache<V, E>
where
    V: Clone,
    E: Clone,
{
    ttl: Duration,
    entries: Mutex<CLruCache<String, Entry<V, E>>>,
    next_generation: AtomicU64,
}

impl<V, E> fmt::Debug for ResponseCache<V, E>
where
    V: Clone,
    E: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.lock();
        f.debug_struct("ResponseCache")
            .field("ttl", &self.ttl)
            .field("len", &entries.len())
            .field("capacity", &entries.capacity())
            .finish()
    }
}

impl<V, E> Default for ResponseCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl<V, E> ResponseCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` entries (minimum 1) for
    /// `ttl` each.
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(CLruCache::new(capacity)),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Returns the cached result for `key`, or starts `load` and caches its
    /// in-flight future.
    ///
    /// # Errors
    ///
    /// Returns the loader's error. The entry is evicted before returning.
    pub async fn get_or_load<F, Fut>(&self, key: &str, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (shared, generation) = {
            let mut entries = self.lock();
            let cached = entries
                .get(key)
                .filter(|entry| {
                    entry
                        .settled_at
                        .is_none_or(|settled| settled.elapsed() < self.ttl)
                })
                .map(|entry| (entry.load.clone(), entry.generation));

            if let Some(hit) = cached {
                log::debug!("cache hit: {key}");
                hit
            } else {
                log::debug!("cache miss: {key}");
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                let shared = load().boxed().shared();
                entries.put(
                    key.to_string(),
                    Entry {
                        load: shared.clone(),
                        settled_at: None,
                        generation,
                    },
                );
                (shared, generation)
            }
        };

        let result = shared.await;
        if result.is_ok() {
            self.mark_settled(key, generation);
        } else {
            self.evict(key, generation);
        }
        result
    }

    /// Number of entries currently held, including expired ones not yet
    /// replaced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Starts the time-to-live of a successful load. Later callers sharing
    /// the same load keep the first stamp.
    fn mark_settled(&self, key: &str, generation: u64) {
        let mut entries = self.lock();
        if let Some(entry) = entries
            .peek_mut(key)
            .filter(|entry| entry.generation == generation)
        {
            entry.settled_at.get_or_insert_with(Instant::now);
        }
    }

    /// Removes `key` only if it still holds the load identified by
    /// `generation`; a newer load for the same key is left alone.
    fn evict(&self, key: &str, generation: u64) {
        let mut entries = self.lock();
        if entries
            .peek(key)
            .is_some_and(|entry| entry.generation == generation)
        {
            log::debug!("evicting failed cache entry: {key}");
            entries.pop(key);
        }
    }
}

impl<V, E> ResponseCache<V, E>
where
    V: Clone,
    E: Clone,
{
    fn lock(&self) -> MutexGuard<'_, CLruCache<String, Entry<V, E>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
