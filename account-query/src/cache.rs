//! Shared query cache.
//!
//! Holds the result of every query, addressed by [`QueryKey`].  One cache is
//! shared by every [`QueryClient`](crate::QueryClient) of the process.
//!
//! # Design
//!
//! Each key maps to a slot, an `Arc<OnceCell<CacheEntry>>`.  A fetch clones
//! the slot out of the map and initialises it outside any map lock, so:
//!
//! - concurrent fetches of the same key wait on the same cell and share a
//!   single network round trip,
//! - a failed fetch leaves the cell empty, so errors are never cached,
//! - writes (`set_query_data`, staleness) swap in a new slot.  Whoever
//!   swaps last wins.
//!
//! ```text
//!   DashMap<QueryKey, Slot>
//!   ┌──────────────────────────────────┐     ┌─────────────────────┐
//!   │ [devnet, VoteRecord, <pk>]       │────▶│ OnceCell<CacheEntry>│
//!   │ [devnet, VoteRecord, realm, own] │────▶│ OnceCell<CacheEntry>│
//!   └──────────────────────────────────┘     └─────────────────────┘
//! ```
//!
//! Values are type-erased (`Arc<dyn Any>`); readers name the type they
//! expect and a mismatch is reported as [`QueryError::TypeMismatch`].

use {
    crate::{error::QueryError, query_key::QueryKey},
    dashmap::DashMap,
    log::*,
    serde::{Deserialize, Serialize},
    std::{
        any::{type_name, Any},
        future::Future,
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    },
    tokio::sync::OnceCell,
};

type CachedValue = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCacheConfig {
    /// Entries older than this are refetched on the next read.  `None` keeps
    /// entries until they are invalidated.
    pub stale_after: Option<Duration>,
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedValue,
    updated_at: Instant,
}

impl CacheEntry {
    fn new(value: CachedValue) -> Self {
        Self {
            value,
            updated_at: Instant::now(),
        }
    }
}

type Slot = Arc<OnceCell<CacheEntry>>;

/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub invalidations: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    config: QueryCacheConfig,
    slots: DashMap<QueryKey, Slot>,
    counters: Counters,
}

impl QueryCache {
    pub fn new(config: QueryCacheConfig) -> Self {
        Self {
            config,
            slots: DashMap::new(),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &QueryCacheConfig {
        &self.config
    }

    fn is_stale(&self, entry: &CacheEntry) -> bool {
        self.config
            .stale_after
            .is_some_and(|stale_after| entry.updated_at.elapsed() >= stale_after)
    }

    /// Current slot for `key`, replacing a stale one.
    fn slot(&self, key: &QueryKey) -> Slot {
        let mut slot = self
            .slots
            .entry(key.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()));
        if slot.value().get().is_some_and(|entry| self.is_stale(entry)) {
            debug!("cache entry {key} is stale");
            *slot = Arc::new(OnceCell::new());
        }
        Arc::clone(slot.value())
    }

    fn downcast<V: Any + Send + Sync>(key: &QueryKey, value: &CachedValue) -> Result<Arc<V>, QueryError> {
        Arc::clone(value)
            .downcast::<V>()
            .map_err(|_| QueryError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<V>(),
            })
    }

    /// Return the cached value for `key`, running `fetch` on a miss.
    ///
    /// Concurrent callers for the same key share one `fetch`.  A failed
    /// fetch is returned to every waiter and nothing is stored.
    pub async fn fetch<V, F, Fut>(&self, key: &QueryKey, fetch: F) -> Result<Arc<V>, QueryError>
    where
        V: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, QueryError>>,
    {
        let slot = self.slot(key);
        let mut missed = false;
        let entry = slot
            .get_or_try_init(|| {
                missed = true;
                async move {
                    let value: CachedValue = Arc::new(fetch().await?);
                    Ok::<_, QueryError>(CacheEntry::new(value))
                }
            })
            .await?;

        if missed {
            debug!("cache miss {key}");
            Counters::bump(&self.counters.misses);
        } else {
            trace!("cache hit {key}");
            Counters::bump(&self.counters.hits);
        }
        Self::downcast(key, &entry.value)
    }

    /// Read a cached value without fetching.  Stale entries are still
    /// returned.
    pub fn get_query_data<V: Any + Send + Sync>(
        &self,
        key: &QueryKey,
    ) -> Result<Option<Arc<V>>, QueryError> {
        let Some(slot) = self.slots.get(key).map(|slot| Arc::clone(slot.value())) else {
            return Ok(None);
        };
        slot.get()
            .map(|entry| Self::downcast(key, &entry.value))
            .transpose()
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set_query_data<V: Any + Send + Sync>(&self, key: QueryKey, value: V) {
        let entry = CacheEntry::new(Arc::new(value));
        trace!("cache write {key}");
        self.slots
            .insert(key, Arc::new(OnceCell::new_with(Some(entry))));
        Counters::bump(&self.counters.writes);
    }

    /// Drop `prefix` and every key inside its scope.  Returns how many
    /// entries were removed.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let before = self.slots.len();
        self.slots.retain(|key, _| !key.starts_with(prefix));
        let removed = before.saturating_sub(self.slots.len());
        debug!("invalidated {removed} entries under {prefix}");
        Counters::bump(&self.counters.invalidations);
        removed
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.value().initialized())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn clear(&self) {
        self.slots.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
            entries: self.slots.len(),
        }
    }
}
