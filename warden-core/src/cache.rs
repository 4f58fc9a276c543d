//! TTL cache for item lookups.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::item::{Item, ItemKey};
use crate::loader::{ItemLoader, LoadFuture};

/// Default maximum number of cached items.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Expired items are swept on the first insert after this much time.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct CachedItem {
    item: Item,
    expires_at: Instant,
}

/// Wraps an [`ItemLoader`] and remembers found items for a fixed TTL.
///
/// Only hits are cached: a missing item and a backend failure always go back
/// to the inner loader on the next request. Once the cache holds
/// `max_entries` items, expired entries are swept; if it is still full the
/// new item is simply not cached.
///
/// Callers that mutate items must [`invalidate`](Self::invalidate) them, or
/// accept up to one TTL of stale ownership data.
pub struct CachedLoader<L> {
    inner: L,
    entries: DashMap<(String, ItemKey), CachedItem>,
    ttl: Duration,
    max_entries: usize,
    len: AtomicUsize,
    last_sweep: Mutex<Instant>,
}

impl<L: ItemLoader> CachedLoader<L> {
    pub fn new(inner: L, ttl_secs: u64) -> Self {
        Self::with_capacity(inner, ttl_secs, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(inner: L, ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
            len: AtomicUsize::new(0),
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    fn cached(&self, resource: &str, key: ItemKey) -> Option<Item> {
        let entry = self.entries.get(&(resource.to_string(), key))?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.item.clone())
    }

    fn remember(&self, resource: &str, key: ItemKey, item: Item) {
        if self.sweep_due() {
            self.evict_expired();
        }
        if !self.has_room() {
            return;
        }

        let entry = CachedItem {
            item,
            expires_at: Instant::now() + self.ttl,
        };
        if self.entries.insert((resource.to_string(), key), entry).is_none() {
            self.len.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A full cache gets one sweep before the insert is given up.
    fn has_room(&self) -> bool {
        if self.len() < self.max_entries {
            return true;
        }
        self.evict_expired();
        self.len() < self.max_entries
    }

    fn sweep_due(&self) -> bool {
        match self.last_sweep.lock() {
            Ok(last) => last.elapsed() >= SWEEP_INTERVAL,
            Err(_) => false,
        }
    }

    /// Remove entries matching `drop`, keeping the length counter in step.
    fn purge(&self, doomed: impl Fn(&(String, ItemKey), &CachedItem) -> bool) {
        let mut removed = 0;
        self.entries.retain(|k, v| {
            let gone = doomed(k, v);
            removed += usize::from(gone);
            !gone
        });
        self.len.fetch_sub(removed, Ordering::Relaxed);
    }

    /// Drop one cached item.
    pub fn invalidate(&self, resource: &str, key: ItemKey) {
        if self.entries.remove(&(resource.to_string(), key)).is_some() {
            self.len.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Drop every cached item of a resource type.
    pub fn invalidate_resource(&self, resource: &str) {
        self.purge(|(r, _), _| r == resource);
    }

    pub fn clear(&self) {
        self.entries.clear();
        self.len.store(0, Ordering::Relaxed);
    }

    /// Remove items whose TTL has run out.
    pub fn evict_expired(&self) {
        let now = Instant::now();
        self.purge(|_, cached| cached.expires_at <= now);
        if let Ok(mut last) = self.last_sweep.lock() {
            *last = now;
        }
    }

    /// Number of cached items, including ones that expired but were not swept.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<L: ItemLoader> ItemLoader for CachedLoader<L> {
    fn load(&self, resource: &str, key: ItemKey) -> LoadFuture<'_> {
        if let Some(item) = self.cached(resource, key) {
            tracing::trace!(resource, key, "item cache hit");
            return Box::pin(async move { Ok(Some(item)) });
        }

        let resource = resource.to_string();
        Box::pin(async move {
            let loaded = self.inner.load(&resource, key).await?;
            if let Some(item) = &loaded {
                self.remember(&resource, key, item.clone());
            }
            Ok(loaded)
        })
    }
}
