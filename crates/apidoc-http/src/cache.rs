use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use apidoc_core::ParsedApiSpec;
use log::debug;

/// How long a cached spec stays fresh unless configured otherwise.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub spec: Arc<ParsedApiSpec>,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Normalized specs keyed by the URL they were fetched from.
///
/// Stale entries are not evicted on lookup; they stay until overwritten,
/// invalidated or cleared. Share one cache between loaders through an `Arc`.
#[derive(Debug)]
pub struct SpecCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Default for SpecCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl SpecCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached spec for `url`, if it is younger than the TTL.
    pub fn get(&self, url: &str) -> Option<Arc<ParsedApiSpec>> {
        let fresh = self
            .lock()
            .get(url)
            .filter(|entry| entry.timestamp.elapsed() < self.ttl)
            .map(|entry| entry.spec.clone());
        match &fresh {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("spec cache hit for {url}");
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }
        fresh
    }

    pub fn insert(&self, url: impl Into<String>, spec: Arc<ParsedApiSpec>) {
        self.lock().insert(
            url.into(),
            CacheEntry {
                spec,
                timestamp: Instant::now(),
            },
        );
    }

    /// Drop the entry for `url`. Returns whether one was present.
    pub fn invalidate(&self, url: &str) -> bool {
        self.lock().remove(url).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.lock().len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
