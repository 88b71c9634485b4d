//! Cache strategy extension point

use crate::error::ReadResult;
use crate::source::ReadAt;
use crate::status::ReadOutcome;

/// Strategy deciding how a read is served
///
/// `get` receives the caller's buffer and offset together with the raw
/// upstream `fetcher`. A handler may serve the read from its own storage,
/// call `fetcher` with a different (for example page-aligned) range, or call
/// it several times.
pub trait CacheHandler: Send + Sync {
    /// Serve `buf.len()` bytes at `offset`
    fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome>;
}

impl<T: CacheHandler + ?Sized> CacheHandler for Box<T> {
    fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome> {
        (**self).get(buf, offset, fetcher)
    }
}

impl<T: CacheHandler + ?Sized> CacheHandler for std::sync::Arc<T> {
    fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome> {
        (**self).get(buf, offset, fetcher)
    }
}

/// Handler that forwards every read straight to the fetcher
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl CacheHandler for PassThrough {
    fn get(&self, buf: &mut [u8], offset: u64, fetcher: &dyn ReadAt) -> ReadResult<ReadOutcome> {
        fetcher.read_at(buf, offset)
    }
}
