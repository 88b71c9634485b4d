//! rangecache - random-access reads over ranged fetches with a paged cache
//!
//! This crate provides:
//! - **`ReadAt`**: positioned reads that report end-of-data explicitly
//! - **`HttpRangeSource`**: an upstream that reads a URL with `Range` requests
//! - **`PagedCache`**: a page-aligned cache persisting fetched pages to a store
//! - **`RangeReader`**: a facade choosing between raw and cached reads
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use rangecache::cache::PagedCacheConfig;
//! use rangecache::device::FileStore;
//! use rangecache::RangeReader;
//!
//! let store = FileStore::open("/tmp/blob.cache", true)?;
//! let reader = RangeReader::new("https://example.com/blob.bin")?
//!     .with_paged_cache(store, PagedCacheConfig::default())?;
//!
//! let mut buf = vec![0u8; 4096];
//! let outcome = reader.read_at(&mut buf, 1 << 20)?;
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links, rustdoc::private_intra_doc_links)]

pub mod cache;
pub mod config;
pub mod device;
pub mod error;
pub mod http;
pub mod reader;
pub mod source;
pub mod status;

// Re-exports for convenience
pub use cache::{CacheHandler, PagedCache, PagedCacheConfig, PassThrough};
pub use error::{ReadError, ReadResult};
pub use reader::RangeReader;
pub use source::{MemorySource, ReadAt, SizeProbe};
pub use status::ReadOutcome;

/// Constants used throughout the library
pub mod constants {
    /// Page size used when none is configured (64 KiB)
    pub const DEFAULT_PAGE_SIZE: u64 = 1 << 16;
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::cache::{CacheHandler, PagedCache, PagedCacheConfig, PassThrough};
    pub use crate::device::{FileStore, MemoryStore, PageStore, SegmentedStore};
    pub use crate::error::{ReadError, ReadResult};
    pub use crate::reader::RangeReader;
    pub use crate::source::{ReadAt, SizeProbe};
    pub use crate::status::ReadOutcome;
}
