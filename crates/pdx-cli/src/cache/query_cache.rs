//! In-memory query result cache with time-based expiry.
//!
//! Memoizes search results for a short TTL so repeated identical queries
//! within a session skip the database round trip. The cache is owned by the
//! search service (no global state) and takes an injectable [`Clock`] so TTL
//! behavior is deterministic under test.
//!
//! Each entry schedules its own removal at insertion time rather than using
//! a global sweep; the removal task is guarded by the insertion stamp so a
//! refreshed entry is never evicted by a stale timer.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Default cache TTL in minutes
const DEFAULT_CACHE_TTL_MINUTES: i64 = 5;

/// Time source for TTL checks. Production uses [`SystemClock`]; tests inject
/// a manual clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic cache key for a `(signature, page)` pair.
pub fn cache_key(signature: &str, page: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signature.as_bytes());
    hasher.update(page.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

struct CacheEntry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// TTL-bounded map of query keys to cached results.
pub struct QueryCache<V> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<V: Clone + Send + 'static> QueryCache<V> {
    /// Create a cache with the default 5-minute TTL, overridable via
    /// `PDX_CACHE_TTL` (minutes).
    pub fn new() -> Self {
        let ttl_minutes = std::env::var("PDX_CACHE_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_MINUTES);
        Self::with_clock(Duration::minutes(ttl_minutes), Arc::new(SystemClock))
    }

    /// Create a cache with an explicit TTL and time source.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    /// Look up a key; expired entries count as misses and are dropped.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let expired = match entries.get(key) {
            Some(entry) => self.clock.now() - entry.inserted_at >= self.ttl,
            None => {
                debug!(key = %key, "Cache miss");
                return None;
            }
        };

        if expired {
            debug!(key = %key, "Cache entry expired");
            entries.remove(key);
            return None;
        }

        debug!(key = %key, "Cache hit");
        entries.get(key).map(|e| e.value.clone())
    }

    /// Store a value and schedule its own removal after the TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let inserted_at = self.clock.now();

        {
            let mut entries = match self.entries.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            entries.insert(key.clone(), CacheEntry { value, inserted_at });
        }

        // Per-entry eviction timer; only when a runtime is present so the
        // cache stays usable from synchronous unit tests.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            if let Ok(ttl) = self.ttl.to_std() {
                let entries = Arc::clone(&self.entries);
                let stamp = inserted_at;
                let timer_key = key;
                handle.spawn(async move {
                    tokio::time::sleep(ttl).await;
                    let mut entries = match entries.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    // A refreshed entry carries a newer stamp; leave it alone
                    if entries
                        .get(&timer_key)
                        .map(|e| e.inserted_at == stamp)
                        .unwrap_or(false)
                    {
                        entries.remove(&timer_key);
                    }
                });
            }
        }
    }

    /// Drop every entry. Used when a new distinct search begins and when the
    /// user resets filters.
    pub fn clear(&self) {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let count = entries.len();
        entries.clear();
        if count > 0 {
            debug!(count = count, "Cleared query cache");
        }
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = self.clock.now();
        entries
            .values()
            .filter(|e| now - e.inserted_at < self.ttl)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send + 'static> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
