pub mod keys;
pub mod pagination;

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

pub use pagination::Pager;

// ---------------------------------------------------------------------------
// QueryKey
// ---------------------------------------------------------------------------

/// Identifies one cached request, e.g. `["sensors", {"page":2}]`.
///
/// Non-string segments are stored as JSON text, so two keys built from equal
/// values are equal. Invalidation matches on segment prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a structured segment.
    pub fn with<S: Serialize + ?Sized>(mut self, segment: &S) -> Self {
        self.0
            .push(serde_json::to_string(segment).unwrap_or_else(|_| "null".to_owned()));
        self
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// QueryCache
// ---------------------------------------------------------------------------

/// How long an entry may sit unread and stale before it is dropped.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

struct Slot {
    data: Option<Arc<dyn Any + Send + Sync>>,
    updated_at: Option<Instant>,
    last_used: Instant,
    invalidated: bool,
}

impl Slot {
    fn new() -> Self {
        Self {
            data: None,
            updated_at: None,
            last_used: Instant::now(),
            invalidated: false,
        }
    }

    fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    fn is_collectable(&self, stale_time: Duration, gc_time: Duration) -> bool {
        !self.is_fresh(stale_time) && self.last_used.elapsed() >= gc_time
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.data.is_some()
            && !self.invalidated
            && self.updated_at.is_some_and(|t| t.elapsed() < stale_time)
    }

    /// `true` when another caller stored a valid result after `since`.
    fn settled_since(&self, since: Instant) -> bool {
        self.data.is_some() && !self.invalidated && self.updated_at.is_some_and(|t| t >= since)
    }

    fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.data.as_ref()?.downcast_ref::<T>().cloned()
    }

    fn store<T: Send + Sync + 'static>(&mut self, value: T) {
        let now = Instant::now();
        self.data = Some(Arc::new(value));
        self.updated_at = Some(now);
        self.last_used = now;
        self.invalidated = false;
    }
}

/// In-memory store of query results keyed by [`QueryKey`].
///
/// Every key owns its own async mutex, held for the whole fetch, so
/// concurrent reads of one key share a single request. Results stay fresh
/// for `stale_time`; [`invalidate_queries`](Self::invalidate_queries) marks
/// them stale so the next read refetches. Writes are last-write-wins.
///
/// Entries that are stale and unused for `gc_time` are dropped whenever a
/// new key is added, or on [`collect_garbage`](Self::collect_garbage).
///
/// Wrapped in `Arc` so it can be cheaply cloned and shared across tasks.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

struct Inner {
    stale_time: Duration,
    gc_time: Duration,
    entries: RwLock<HashMap<QueryKey, Arc<Mutex<Slot>>>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration) -> Self {
        Self::with_gc_time(stale_time, DEFAULT_GC_TIME)
    }

    pub fn with_gc_time(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                stale_time,
                gc_time,
                entries: RwLock::new(HashMap::new()),
            }),
        }
    }

    async fn slot(&self, key: &QueryKey) -> Arc<Mutex<Slot>> {
        if let Some(slot) = self.inner.entries.read().await.get(key) {
            return slot.clone();
        }
        let mut entries = self.inner.entries.write().await;
        if !entries.contains_key(key) {
            self.sweep(&mut entries);
        }
        entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(Slot::new())))
            .clone()
    }

    /// Drop entries that are stale and have not been used for `gc_time`.
    /// Entries with a fetch in flight are kept. Returns the number dropped.
    pub async fn collect_garbage(&self) -> usize {
        let mut entries = self.inner.entries.write().await;
        self.sweep(&mut entries)
    }

    fn sweep(&self, entries: &mut HashMap<QueryKey, Arc<Mutex<Slot>>>) -> usize {
        let before = entries.len();
        let (stale_time, gc_time) = (self.inner.stale_time, self.inner.gc_time);
        entries.retain(|_, slot| match slot.try_lock() {
            Ok(slot) => !slot.is_collectable(stale_time, gc_time),
            Err(_) => true,
        });
        let dropped = before - entries.len();
        if dropped > 0 {
            debug!(dropped, "Collected unused queries");
        }
        dropped
    }

    /// Return the cached value for `key` when fresh, otherwise run `fetcher`
    /// and cache its result. Errors are returned and never cached.
    pub async fn fetch_query<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let requested_at = Instant::now();
        let slot = self.slot(key).await;
        let mut slot = slot.lock().await;
        slot.touch();

        if slot.is_fresh(self.inner.stale_time) || slot.settled_since(requested_at) {
            if let Some(value) = slot.get::<T>() {
                debug!(key = %key, "Query cache hit");
                return Ok(value);
            }
        }

        debug!(key = %key, "Query cache miss; fetching");
        let value = fetcher().await?;
        slot.store(value.clone());
        Ok(value)
    }

    /// Warm the cache for `key`. Failures are logged and dropped.
    pub async fn prefetch_query<T, E, F, Fut>(&self, key: &QueryKey, fetcher: F)
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(e) = self.fetch_query(key, fetcher).await {
            warn!(key = %key, error = %e, "Prefetch failed");
        }
    }

    /// Cached value for `key`, fresh or not.
    ///
    /// The value is downcast to `T`; reading with a different type than was
    /// stored (say `i64` for an `i32`) reads as a miss.
    pub async fn get_query_data<T: Clone + 'static>(&self, key: &QueryKey) -> Option<T> {
        let slot = self.inner.entries.read().await.get(key).cloned()?;
        let mut slot = slot.lock().await;
        slot.touch();
        slot.get::<T>()
    }

    pub async fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        self.slot(key).await.lock().await.store(value);
    }

    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        let Some(slot) = self.inner.entries.read().await.get(key).cloned() else {
            return false;
        };
        let fresh = slot.lock().await.is_fresh(self.inner.stale_time);
        fresh
    }

    /// Mark every entry whose key starts with `prefix` as stale.
    ///
    /// Waits for in-flight fetches of matching keys to finish first.
    /// Returns the number of entries marked.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let slots: Vec<_> = self
            .inner
            .entries
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, slot)| slot.clone())
            .collect();

        for slot in &slots {
            slot.lock().await.invalidated = true;
        }
        debug!(prefix = %prefix, count = slots.len(), "Invalidated queries");
        slots.len()
    }
}
