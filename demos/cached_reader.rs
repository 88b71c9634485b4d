//! Cached reader demo
//!
//! With `RANGECACHE__http__url` (or a `RANGECACHE_CONFIG` file naming a URL)
//! set, reads the remote resource through the configured cache. Otherwise
//! reads an in-memory resource through a shared `PagedCache` and prints its
//! statistics.
//!
//! ```text
//! RUST_LOG=rangecache=debug cargo run --example cached_reader
//! ```

use std::sync::Arc;

use rangecache::config::RangeCacheConfig;
use rangecache::device::MemoryStore;
use rangecache::{MemorySource, PagedCache, PagedCacheConfig, RangeReader, ReadOutcome};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RangeCacheConfig::load_from_env()?;
    if config.http.as_ref().and_then(|http| http.url.as_ref()).is_some() {
        return read_remote(&config);
    }

    read_local()
}

fn read_remote(config: &RangeCacheConfig) -> Result<(), Box<dyn std::error::Error>> {
    let reader = config.open_reader()?;
    let size = reader.size()?;
    println!("remote resource: {size} bytes");

    let mut buf = vec![0u8; 256];
    for offset in [0, size / 2, size.saturating_sub(100)] {
        let outcome = reader.read_at(&mut buf, offset)?;
        println!("read at {offset}: {outcome}");
    }

    Ok(())
}

fn read_local() -> Result<(), Box<dyn std::error::Error>> {
    let data: Vec<u8> = (0..1_000_000u32).map(|i| (i % 251) as u8).collect();
    let source = MemorySource::new(data);
    let cache = Arc::new(PagedCache::with_config(
        MemoryStore::new(),
        source.data().len() as u64,
        PagedCacheConfig::new(16 * 1024),
    ));
    let reader = RangeReader::with_source(source).with_cache_handler(cache.clone());

    let mut buf = vec![0u8; 4096];
    for offset in [0u64, 1000, 40_000, 20_000, 999_000, 1_000_000] {
        match reader.read_at(&mut buf, offset)? {
            ReadOutcome::Complete(n) => println!("read at {offset}: {n} bytes"),
            ReadOutcome::EndOfData(n) => println!("read at {offset}: {n} bytes, end of data"),
        }
    }

    let summary = cache.stats().summary();
    println!(
        "calls={} hits={} misses={} fetched_bytes={} resident_pages={}/{}",
        summary.read_calls,
        summary.read_hits,
        summary.read_misses,
        summary.fetched_bytes,
        cache.resident_page_count(),
        cache.page_count(),
    );

    Ok(())
}
