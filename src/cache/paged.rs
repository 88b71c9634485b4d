//! Page-aligned persistent cache
//!
//! Every upstream fetch is widened to whole pages and written to a
//! [`PageStore`]; reads are always answered from the store. Residency is a
//! bitmap over page indices that only grows.

use std::io;

use parking_lot::Mutex;

use crate::cache::config::PagedCacheConfig;
use crate::cache::handler::CacheHandler;
use crate::cache::residency::PageBitmap;
use crate::cache::stats::CacheStats;
use crate::device::PageStore;
use crate::error::{ReadError, ReadResult};
use crate::source::ReadAt;
use crate::status::ReadOutcome;

/// Cache that persists page-aligned upstream fetches to a store
///
/// The resource is assumed immutable for the lifetime of the cache and its
/// size must be known up front. The residency lock is held across the whole
/// detect-missing, fetch, persist and mark sequence, so overlapping misses
/// from concurrent readers serialize and the later one finds its pages
/// resident.
///
/// Residency lives in memory only. A store reused by a new cache instance
/// starts cold and is refilled on demand.
pub struct PagedCache<D: PageStore> {
    /// Backing store for fetched pages
    store: D,
    /// Page size in bytes, fixed at construction
    page_size: u64,
    /// Total size of the cached resource
    resource_size: u64,
    /// Resident pages
    residency: Mutex<PageBitmap>,
    /// Statistics
    stats: CacheStats,
}

impl<D: PageStore> PagedCache<D> {
    /// Create a cache with the default page size
    pub fn new(store: D, resource_size: u64) -> Self {
        Self::with_config(store, resource_size, PagedCacheConfig::default())
    }

    /// Create a cache with the given configuration
    pub fn with_config(store: D, resource_size: u64, config: PagedCacheConfig) -> Self {
        Self {
            store,
            page_size: config.effective_page_size(),
            resource_size,
            residency: Mutex::new(PageBitmap::new()),
            stats: CacheStats::new(),
        }
    }

    /// Get the page size
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Get the size of the cached resource
    pub fn resource_size(&self) -> u64 {
        self.resource_size
    }

    /// Number of pages covering the resource
    pub fn page_count(&self) -> u64 {
        self.resource_size.div_ceil(self.page_size)
    }

    /// Valid bytes held by `page`; the tail page may be short
    fn page_len(&self, page: u64) -> u64 {
        let start = page * self.page_size;
        self.page_size.min(self.resource_size.saturating_sub(start))
    }

    /// Check if a page is resident
    pub fn is_resident(&self, page: u64) -> bool {
        self.residency.lock().contains(page)
    }

    /// Resident page indices in increasing order
    pub fn resident_pages(&self) -> Vec<u64> {
        self.residency.lock().iter().collect()
    }

    /// Number of resident pages
    pub fn resident_page_count(&self) -> u64 {
        self.residency.lock().len()
    }

    /// Reads served without a fetch
    pub fn hits(&self) -> u64 {
        self.stats.read_hits()
    }

    /// Reads that needed a fetch, failed fetches included
    pub fn misses(&self) -> u64 {
        self.stats.read_misses()
    }

    /// Get the statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Get the backing store
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Give the backing store back to the caller
    pub fn into_store(self) -> D {
        self.store
    }

    /// Flush the backing store
    pub fn flush(&self) -> ReadResult<()> {
        self.store.flush().map_err(ReadError::Store)
    }

    /// Serve `buf.len()` bytes at `offset`, fetching missing pages first.
    ///
    /// A zero-length read is a no-op. A read starting at or past the end of
    /// the resource returns `EndOfData(0)` without fetching. On an upstream
    /// failure the error is returned as-is and `buf` must be treated as
    /// garbage.
    pub fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Complete(0));
        }
        if offset >= self.resource_size {
            return Ok(ReadOutcome::EndOfData(0));
        }

        self.stats.record_read();

        let wanted = (buf.len() as u64).min(self.resource_size - offset);
        let start_page = offset / self.page_size;
        // Page holding the byte just past the request, clamped to the last page
        let last_page = (self.resource_size - 1) / self.page_size;
        let end_page = (offset.saturating_add(buf.len() as u64) / self.page_size).min(last_page);

        {
            let mut residency = self.residency.lock();
            match residency.missing_span(start_page, end_page) {
                None => {
                    self.stats.record_hit();
                    if tracing::enabled!(tracing::Level::TRACE) {
                        tracing::trace!(offset, len = buf.len(), "paged cache hit");
                    }
                }
                Some((first, last)) => {
                    self.stats.record_miss();
                    self.fill(&mut residency, first, last, fetcher)?;
                }
            }
        }

        self.read_back(buf, offset, wanted as usize)
    }

    /// Fetch pages `first..=last` in one upstream read and persist them.
    ///
    /// Resident pages inside the span are fetched again.
    fn fill(
        &self,
        residency: &mut PageBitmap,
        first: u64,
        last: u64,
        fetcher: &dyn ReadAt,
    ) -> ReadResult<()> {
        let fetch_offset = first * self.page_size;
        let fetch_len = (last - first) * self.page_size + self.page_len(last);
        let size = usize::try_from(fetch_len).map_err(|_| {
            ReadError::InvalidArgument(format!("fetch of {fetch_len} bytes does not fit in memory"))
        })?;

        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                first_page = first,
                last_page = last,
                offset = fetch_offset,
                size,
                "paged cache fetch"
            );
        }

        let mut buffer = vec![0u8; size];
        let fetched = match fetcher.read_at(&mut buffer, fetch_offset) {
            Ok(outcome) => outcome.bytes().min(size),
            Err(err) => {
                self.stats.record_failed_fetch();
                let partial = err.bytes_read().min(size);
                if tracing::enabled!(tracing::Level::WARN) {
                    tracing::warn!(
                        offset = fetch_offset,
                        size,
                        partial,
                        error = %err,
                        "paged cache fetch failed"
                    );
                }
                if partial > 0 {
                    // Keep complete pages that did arrive; the upstream error wins.
                    match self.store.write_at(fetch_offset, &buffer[..partial]) {
                        Ok(written) => self.mark_written(residency, first, written.min(partial)),
                        Err(store_err) => {
                            if tracing::enabled!(tracing::Level::WARN) {
                                tracing::warn!(error = %store_err, "dropping partial fetch");
                            }
                        }
                    }
                }
                return Err(err);
            }
        };

        self.stats.record_fetched(fetched as u64);

        let written = self
            .store
            .write_at(fetch_offset, &buffer[..fetched])
            .map_err(ReadError::Store)?;
        self.mark_written(residency, first, written.min(fetched));

        if written < fetched {
            if tracing::enabled!(tracing::Level::WARN) {
                tracing::warn!(offset = fetch_offset, written, fetched, "short page store write");
            }
            return Err(ReadError::Store(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("short write to page store: {written} of {fetched} bytes"),
            )));
        }

        Ok(())
    }

    /// Mark resident every page starting at `first` whose valid bytes lie
    /// entirely inside the `written` bytes persisted at its offset.
    fn mark_written(&self, residency: &mut PageBitmap, first: u64, written: usize) {
        let end = first * self.page_size + written as u64;
        let page_count = self.page_count();
        let mut filled = 0;

        let mut page = first;
        while page < page_count {
            if page * self.page_size + self.page_len(page) > end {
                break;
            }
            if residency.insert(page) {
                filled += 1;
            }
            page += 1;
        }

        self.stats.record_pages_filled(filled);
    }

    fn read_back(&self, buf: &mut [u8], offset: u64, wanted: usize) -> ReadResult<ReadOutcome> {
        let n = self
            .store
            .read_at(offset, &mut buf[..wanted])
            .map_err(ReadError::Store)?;
        Ok(ReadOutcome::from_counts(n, buf.len()))
    }
}

impl<D: PageStore> CacheHandler for PagedCache<D> {
    fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome> {
        PagedCache::get(self, buf, offset, fetcher)
    }
}

impl<D: PageStore> std::fmt::Debug for PagedCache<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedCache")
            .field("page_size", &self.page_size)
            .field("resource_size", &self.resource_size)
            .field("resident_pages", &self.resident_page_count())
            .finish()
    }
}
