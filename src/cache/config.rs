//! Paged cache configuration

use crate::constants::DEFAULT_PAGE_SIZE;

/// Configuration for the paged cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagedCacheConfig {
    /// Page size in bytes. `0` means "unset" and resolves to
    /// [`DEFAULT_PAGE_SIZE`].
    pub page_size: u64,
}

impl Default for PagedCacheConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PagedCacheConfig {
    /// Create a configuration with the given page size
    pub fn new(page_size: u64) -> Self {
        Self { page_size }
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Page size the cache will actually use
    pub fn effective_page_size(&self) -> u64 {
        if self.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.page_size
        }
    }
}
