//! Read caching strategies
//!
//! This module provides the [`CacheHandler`] extension point, the
//! [`PassThrough`] strategy and the page-aligned persistent [`PagedCache`].

mod config;
mod handler;
mod paged;
mod residency;
mod stats;

pub use config::PagedCacheConfig;
pub use handler::{CacheHandler, PassThrough};
pub use paged::PagedCache;
pub use residency::PageBitmap;
pub use stats::{CacheStats, CacheStatsSummary};
