//! Shared in-memory cache for carrier answers with TTL expiry.
//!
//! Entries hold either a value or a terminal carrier failure. A stored failure
//! is replayed to later callers until it expires, so a carrier that keeps
//! rejecting a request is not asked the same thing again on every page load.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::ShippingError;

/// Default TTL: 60 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Outcome of a cache lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheLookup<V> {
    Hit(V),
    CachedFailure(ShippingError),
    Miss,
}

#[derive(Clone, Debug)]
enum CachedOutcome<V> {
    Value(V),
    Failure(ShippingError),
}

struct Cached<V> {
    outcome: CachedOutcome<V>,
    stored_at: Instant,
}

impl<V: Clone> Cached<V> {
    fn new(outcome: CachedOutcome<V>) -> Self {
        Self {
            outcome,
            stored_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() <= ttl
    }

    fn lookup(&self) -> CacheLookup<V> {
        match &self.outcome {
            CachedOutcome::Value(value) => CacheLookup::Hit(value.clone()),
            CachedOutcome::Failure(error) => CacheLookup::CachedFailure(error.clone()),
        }
    }
}

/// What `get_or_compute` handed back without an error of its own.
#[derive(Clone, Debug, PartialEq)]
pub enum Served<V> {
    /// A stored value or a value computed by this call.
    Value(V),
    /// A carrier failure stored by an earlier call.
    ReplayedFailure(ShippingError),
}

impl<V> Served<V> {
    /// Treats a replayed failure like the original one.
    pub fn into_result(self) -> Result<V, ShippingError> {
        match self {
            Served::Value(value) => Ok(value),
            Served::ReplayedFailure(error) => Err(error),
        }
    }
}

struct Entries<V> {
    map: HashMap<String, Cached<V>>,
    last_sweep: Instant,
}

/// Cloning shares the underlying storage.
#[derive(Clone)]
pub struct RateCache<V> {
    entries: Arc<Mutex<Entries<V>>>,
    ttl: Duration,
}

impl<V: Clone> Default for RateCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> RateCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                map: HashMap::new(),
                last_sweep: Instant::now(),
            })),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Looks up `key`, dropping the entry if it has expired.
    pub async fn lookup(&self, key: &str) -> CacheLookup<V> {
        let mut entries = self.entries.lock().await;
        match entries.map.get(key) {
            Some(entry) if entry.is_fresh(self.ttl) => return entry.lookup(),
            Some(_) => {}
            None => return CacheLookup::Miss,
        }
        entries.map.remove(key);
        tracing::debug!(key, "cache entry expired");
        CacheLookup::Miss
    }

    /// Returns the cached outcome for `key` or runs `compute` and stores its outcome.
    ///
    /// A stored failure comes back as `Ok(Served::ReplayedFailure)`. `Err` is only
    /// returned for a failure of this call's `compute`: cacheable errors (terminal
    /// carrier failures) are stored under `key` first, other errors pass through
    /// uncached. The lock is not held while `compute` runs: concurrent misses may
    /// each compute, last store wins.
    pub async fn get_or_compute<F, Fut>(
        &self,
        key: &str,
        compute: F,
    ) -> Result<Served<V>, ShippingError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ShippingError>>,
    {
        match self.lookup(key).await {
            CacheLookup::Hit(value) => {
                tracing::debug!(key, "serving cached carrier result");
                return Ok(Served::Value(value));
            }
            CacheLookup::CachedFailure(error) => {
                tracing::debug!(key, error = %error, "replaying cached carrier failure");
                return Ok(Served::ReplayedFailure(error));
            }
            CacheLookup::Miss => {}
        }

        match compute().await {
            Ok(value) => {
                self.store(key, value.clone()).await;
                Ok(Served::Value(value))
            }
            Err(error) if error.is_cacheable() => {
                self.store_failure(key, error.clone()).await;
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    pub async fn store(&self, key: &str, value: V) {
        self.insert(key, CachedOutcome::Value(value)).await;
    }

    pub async fn store_failure(&self, key: &str, error: ShippingError) {
        tracing::info!(key, error = %error, "caching carrier failure");
        self.insert(key, CachedOutcome::Failure(error)).await;
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.lock().await.map.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.map.clear();
    }

    /// Number of stored entries. Expired entries count until the next sweep
    /// or until their key is looked up.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stores `outcome`, first dropping expired entries if a TTL has passed
    /// since the last sweep. Most keys carry an order number and are never
    /// looked up again once the order ships.
    async fn insert(&self, key: &str, outcome: CachedOutcome<V>) {
        let mut entries = self.entries.lock().await;
        if entries.last_sweep.elapsed() >= self.ttl {
            let ttl = self.ttl;
            let before = entries.map.len();
            entries.map.retain(|_, entry| entry.is_fresh(ttl));
            entries.last_sweep = Instant::now();
            tracing::debug!(evicted = before - entries.map.len(), "swept expired cache entries");
        }
        entries.map.insert(key.to_string(), Cached::new(outcome));
    }
}
