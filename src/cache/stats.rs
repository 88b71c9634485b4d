//! Paged cache statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for paged cache operations
///
/// Counters are updated only by the owning cache; callers read them.
///
/// ```compile_fail
/// use rangecache::device::MemoryStore;
/// use rangecache::PagedCache;
///
/// let cache = PagedCache::new(MemoryStore::new(), 16);
/// cache.stats().record_hit();
/// ```
pub struct CacheStats {
    /// Number of non-empty reads served
    read_calls: AtomicU64,
    /// Reads satisfied without an upstream fetch
    read_hits: AtomicU64,
    /// Reads that needed an upstream fetch
    read_misses: AtomicU64,
    /// Bytes returned by upstream fetches
    fetched_bytes: AtomicU64,
    /// Upstream fetches that failed
    failed_fetches: AtomicU64,
    /// Pages marked resident
    pages_filled: AtomicU64,
}

impl CacheStats {
    /// Create new statistics
    pub fn new() -> Self {
        Self {
            read_calls: AtomicU64::new(0),
            read_hits: AtomicU64::new(0),
            read_misses: AtomicU64::new(0),
            fetched_bytes: AtomicU64::new(0),
            failed_fetches: AtomicU64::new(0),
            pages_filled: AtomicU64::new(0),
        }
    }

    /// Record a read call
    pub(crate) fn record_read(&self) {
        self.read_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache hit
    pub(crate) fn record_hit(&self) {
        self.read_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache miss
    pub(crate) fn record_miss(&self) {
        self.read_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record bytes returned by an upstream fetch
    pub(crate) fn record_fetched(&self, bytes: u64) {
        self.fetched_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a failed upstream fetch
    pub(crate) fn record_failed_fetch(&self) {
        self.failed_fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Record newly resident pages
    pub(crate) fn record_pages_filled(&self, pages: u64) {
        self.pages_filled.fetch_add(pages, Ordering::Relaxed);
    }

    /// Get the number of read calls
    pub fn read_calls(&self) -> u64 {
        self.read_calls.load(Ordering::Relaxed)
    }

    /// Get the number of cache hits
    pub fn read_hits(&self) -> u64 {
        self.read_hits.load(Ordering::Relaxed)
    }

    /// Get the number of cache misses
    pub fn read_misses(&self) -> u64 {
        self.read_misses.load(Ordering::Relaxed)
    }

    /// Get the number of bytes fetched from upstream
    pub fn fetched_bytes(&self) -> u64 {
        self.fetched_bytes.load(Ordering::Relaxed)
    }

    /// Get the number of failed upstream fetches
    pub fn failed_fetches(&self) -> u64 {
        self.failed_fetches.load(Ordering::Relaxed)
    }

    /// Get the number of pages marked resident
    pub fn pages_filled(&self) -> u64 {
        self.pages_filled.load(Ordering::Relaxed)
    }

    /// Get the hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let calls = self.read_calls.load(Ordering::Relaxed);
        if calls == 0 {
            return 0.0;
        }
        self.read_hits.load(Ordering::Relaxed) as f64 / calls as f64
    }

    /// Get a summary of all statistics
    pub fn summary(&self) -> CacheStatsSummary {
        CacheStatsSummary {
            read_calls: self.read_calls(),
            read_hits: self.read_hits(),
            read_misses: self.read_misses(),
            hit_rate: self.hit_rate(),
            fetched_bytes: self.fetched_bytes(),
            failed_fetches: self.failed_fetches(),
            pages_filled: self.pages_filled(),
        }
    }
}

impl Default for CacheStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of paged cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatsSummary {
    /// Number of read calls
    pub read_calls: u64,
    /// Number of cache hits
    pub read_hits: u64,
    /// Number of cache misses
    pub read_misses: u64,
    /// Cache hit rate
    pub hit_rate: f64,
    /// Bytes fetched from upstream
    pub fetched_bytes: u64,
    /// Failed upstream fetches
    pub failed_fetches: u64,
    /// Pages marked resident
    pub pages_filled: u64,
}
