//! Page store trait
//!
//! This module defines the positioned I/O contract the paged cache persists
//! fetched pages through.

use std::io;

/// Byte-addressable backing store with positioned read and write
///
/// Implementations must read back exactly what was last written at an
/// offset. Regions never written may read as zeros or as end-of-file; the
/// cache only reads regions it has written.
pub trait PageStore: Send + Sync + 'static {
    /// Read data from the store
    ///
    /// Reads up to `buf.len()` bytes from `offset` into `buf`. Returns fewer
    /// bytes only when the store ends first.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Write data to the store
    ///
    /// Writes `buf` to `offset` and returns the number of bytes written. A
    /// count below `buf.len()` is a short write.
    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize>;

    /// Flush buffered writes to stable storage
    fn flush(&self) -> io::Result<()>;

    /// Get the current size of the store
    fn size(&self) -> io::Result<u64>;
}

impl<T: PageStore + ?Sized> PageStore for Box<T> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_at(offset, buf)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        (**self).write_at(offset, buf)
    }

    fn flush(&self) -> io::Result<()> {
        (**self).flush()
    }

    fn size(&self) -> io::Result<u64> {
        (**self).size()
    }
}
