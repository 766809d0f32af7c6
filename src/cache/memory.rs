use crate::cache::CacheCost;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    cost: u64,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

struct Inner<V> {
    lru: LruCache<String, Entry<V>>,
    total_cost: u64,
}

/// In-memory LRU bounded by entry count and total cost.
///
/// With an expiration set, each entry lives that long after its last access;
/// reading an entry pushes its deadline forward.
pub struct MemoryStorage<V> {
    inner: Mutex<Inner<V>>,
    cost_limit: u64,
    expiration: Option<Duration>,
}

impl<V: CacheCost + Clone> MemoryStorage<V> {
    pub fn new(count_limit: NonZeroUsize, cost_limit: u64, expiration: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru: LruCache::new(count_limit),
                total_cost: 0,
            }),
            cost_limit,
            expiration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn deadline(&self, now: Instant) -> Option<Instant> {
        self.expiration.map(|exp| now + exp)
    }

    /// Stores `value`, evicting least recently used entries until both limits
    /// hold. Returns false when the value alone is over the cost limit.
    pub fn insert(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let cost = value.cost();
        let mut inner = self.lock();

        if cost > self.cost_limit {
            log::debug!("{key}: cost {cost} over limit {}, not cached", self.cost_limit);
            if let Some(old) = inner.lru.pop(&key) {
                inner.total_cost -= old.cost;
            }
            return false;
        }

        let entry = Entry {
            value,
            cost,
            expires_at: self.deadline(Instant::now()),
        };

        // push hands back either the replaced value or the evicted LRU entry
        if let Some((_, old)) = inner.lru.push(key, entry) {
            inner.total_cost -= old.cost;
        }
        inner.total_cost += cost;

        while inner.total_cost > self.cost_limit {
            match inner.lru.pop_lru() {
                Some((_, evicted)) => inner.total_cost -= evicted.cost,
                None => break,
            }
        }

        true
    }

    /// Returns a live entry and extends its expiration. Expired entries are
    /// dropped on the way.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let deadline = self.deadline(now);
        let mut inner = self.lock();

        match inner.lru.get_mut(key) {
            None => return None,
            Some(entry) if !entry.is_expired(now) => {
                entry.expires_at = deadline;
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        if let Some(expired) = inner.lru.pop(key) {
            inner.total_cost -= expired.cost;
        }
        None
    }

    /// Drops every expired entry. Returns how many were removed.
    pub fn remove_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();

        let expired: Vec<String> = inner
            .lru
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            if let Some(entry) = inner.lru.pop(key) {
                inner.total_cost -= entry.cost;
            }
        }

        expired.len()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.lru.clear();
        inner.total_cost = 0;
    }

    pub fn len(&self) -> usize {
        self.lock().lru.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_cost(&self) -> u64 {
        self.lock().total_cost
    }
}
