//! Reader facade
//!
//! [`RangeReader`] pairs a raw upstream source with a [`CacheHandler`].
//! Without a handler every read goes straight upstream; attaching a
//! [`PagedCache`] routes reads through the page store instead.

use reqwest::blocking::Client;

use crate::cache::{CacheHandler, PagedCache, PagedCacheConfig, PassThrough};
use crate::device::PageStore;
use crate::error::ReadResult;
use crate::http::HttpRangeSource;
use crate::source::{ReadAt, SizeProbe};
use crate::status::ReadOutcome;

/// Random-access reader over a ranged upstream
pub struct RangeReader<S = HttpRangeSource> {
    source: S,
    cache: Box<dyn CacheHandler>,
}

impl RangeReader<HttpRangeSource> {
    /// Create an uncached reader for `url`
    pub fn new(url: impl Into<String>) -> ReadResult<Self> {
        Ok(Self::with_source(HttpRangeSource::new(url)?))
    }

    /// Create an uncached reader for `url` using `client` as transport
    pub fn with_client(url: impl Into<String>, client: Client) -> Self {
        Self::with_source(HttpRangeSource::with_client(url, client))
    }
}

impl<S: ReadAt + SizeProbe> RangeReader<S> {
    /// Create an uncached reader over `source`
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            cache: Box::new(PassThrough),
        }
    }

    /// Replace the caching strategy
    pub fn with_cache_handler(mut self, handler: impl CacheHandler + 'static) -> Self {
        self.cache = Box::new(handler);
        self
    }

    /// Probe the resource size and attach a [`PagedCache`] backed by `store`
    pub fn with_paged_cache<D: PageStore>(
        self,
        store: D,
        config: PagedCacheConfig,
    ) -> ReadResult<Self> {
        let size = self.source.size()?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!(
                resource_size = size,
                page_size = config.effective_page_size(),
                "attaching paged cache"
            );
        }
        Ok(self.with_cache_handler(PagedCache::with_config(store, size, config)))
    }

    /// Read `buf.len()` bytes at `offset` through the configured cache
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        self.cache.get(buf, offset, &self.source)
    }

    /// Total size of the upstream resource
    pub fn size(&self) -> ReadResult<u64> {
        self.source.size()
    }

    /// Get the raw upstream source
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ReadAt + SizeProbe> ReadAt for RangeReader<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        RangeReader::read_at(self, buf, offset)
    }
}

impl<S: ReadAt + SizeProbe> SizeProbe for RangeReader<S> {
    fn size(&self) -> ReadResult<u64> {
        RangeReader::size(self)
    }
}
