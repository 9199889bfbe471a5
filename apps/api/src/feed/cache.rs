//! Bounded LRU cache with per-entry TTL and prefix-wildcard deletes.
//!
//! One instance is built at startup and shared through `AppState`. Expiry is
//! checked lazily on read; nothing sweeps in the background.
//!
//! Each invalidation scope carries a generation counter. A reader notes the
//! generation before loading a value and stores it with `set_if_current`, so
//! a load that overlaps an invalidation never lands in the cache.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Marks a delete key as a prefix match when it is the last character.
pub const WILDCARD: char = '*';

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|at| now >= at).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub len: usize,
    pub capacity: usize,
}

struct CacheState<V> {
    entries: LruCache<String, CacheEntry<V>>,
    generations: HashMap<String, u64>,
}

impl<V> CacheState<V> {
    fn remove_matching(&mut self, key: &str) -> usize {
        match key.strip_suffix(WILDCARD) {
            Some(prefix) => {
                let doomed: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|(k, _)| k.starts_with(prefix))
                    .map(|(k, _)| k.clone())
                    .collect();
                for k in &doomed {
                    self.entries.pop(k);
                }
                doomed.len()
            }
            None => usize::from(self.entries.pop(key).is_some()),
        }
    }

    fn generation(&self, scope: &str) -> u64 {
        self.generations.get(scope).copied().unwrap_or(0)
    }
}

pub struct FeedCache<V> {
    state: Mutex<CacheState<V>>,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> FeedCache<V> {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        Self::with_clock(capacity, default_ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: usize, default_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                generations: HashMap::new(),
            }),
            default_ttl,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        // entries are plain values, so a poisoned lock still holds a usable map
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the value unless it has expired. A hit becomes most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut state = self.lock();
        if state.entries.peek(key)?.is_expired(now) {
            state.entries.pop(key);
            return None;
        }
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value` for `ttl`, or the default TTL when `None`. A zero TTL
    /// stores without expiry. Inserting a new key at capacity evicts the least
    /// recently used entry.
    #[allow(dead_code)] // feed reads go through set_if_current
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let entry = self.entry(value, ttl);
        self.lock().entries.put(key.into(), entry);
    }

    /// Like `set`, but only while `scope` is still at `generation`. Returns
    /// whether the value was stored.
    pub fn set_if_current(
        &self,
        scope: &str,
        generation: u64,
        key: impl Into<String>,
        value: V,
        ttl: Option<Duration>,
    ) -> bool {
        let entry = self.entry(value, ttl);
        let mut state = self.lock();
        if state.generation(scope) != generation {
            return false;
        }
        state.entries.put(key.into(), entry);
        true
    }

    fn entry(&self, value: V, ttl: Option<Duration>) -> CacheEntry<V> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let expires_at = (!ttl.is_zero()).then(|| self.clock.now() + ttl);
        CacheEntry { value, expires_at }
    }

    /// Deletes one key, or every key sharing the prefix when `key` ends in `*`.
    /// Returns how many entries were removed.
    pub fn delete(&self, key: &str) -> usize {
        self.lock().remove_matching(key)
    }

    /// Current generation of `scope`. Starts at zero.
    pub fn generation(&self, scope: &str) -> u64 {
        self.lock().generation(scope)
    }

    /// Makes every pending `set_if_current` for `scope` a no-op. Call before
    /// deleting the scope's keys.
    pub fn advance_generation(&self, scope: &str) {
        *self.lock().generations.entry(scope.to_string()).or_insert(0) += 1;
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            len: state.entries.len(),
            capacity: state.entries.cap().get(),
        }
    }
}

impl<V: Clone> Default for FeedCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
