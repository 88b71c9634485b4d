//! Random-access sources
//!
//! [`ReadAt`] is the one capability every layer speaks: the raw HTTP
//! fetcher, the paged cache and the reader facade all read "`buf.len()` bytes
//! at `offset`" and report end-of-data through [`ReadOutcome`].

use std::sync::Arc;

use crate::error::ReadResult;
use crate::status::ReadOutcome;

/// Positioned reads against a logical byte sequence
pub trait ReadAt: Send + Sync {
    /// Read up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns [`ReadOutcome::EndOfData`] when the sequence ends before the
    /// buffer is full. Offsets at or past the end are legal and yield
    /// `EndOfData(0)`.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome>;
}

/// Total-size discovery for a source
pub trait SizeProbe {
    /// Total length of the resource in bytes
    fn size(&self) -> ReadResult<u64>;
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for Box<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for Arc<T> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        (**self).read_at(buf, offset)
    }
}

impl<T: SizeProbe + ?Sized> SizeProbe for Arc<T> {
    fn size(&self) -> ReadResult<u64> {
        (**self).size()
    }
}

/// In-memory source over an owned byte vector
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Arc<[u8]>,
}

impl MemorySource {
    /// Create a source serving `data`
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Arc::from(data.into()),
        }
    }

    /// Get the served bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl ReadAt for MemorySource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        let len = self.data.len() as u64;
        if offset >= len {
            return Ok(ReadOutcome::from_counts(0, buf.len()));
        }
        // offset < len, so it fits in usize
        let start = offset as usize;
        let end = std::cmp::min(start + buf.len(), self.data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.data[start..end]);
        Ok(ReadOutcome::from_counts(n, buf.len()))
    }
}

impl SizeProbe for MemorySource {
    fn size(&self) -> ReadResult<u64> {
        Ok(self.data.len() as u64)
    }
}
