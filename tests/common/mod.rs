//! Shared test utilities for cache behaviour and fault injection tests.

#![allow(dead_code)]

use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use rangecache::device::PageStore;
use rangecache::{MemorySource, ReadAt, ReadError, ReadOutcome, ReadResult, SizeProbe};

/// Deterministic resource contents of `len` bytes.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Upstream that records every fetch before serving it from memory.
pub struct CountingSource {
    inner: MemorySource,
    fetches: Mutex<Vec<(u64, usize)>>,
}

impl CountingSource {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            inner: MemorySource::new(data),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// `(offset, len)` of every fetch so far.
    pub fn fetches(&self) -> Vec<(u64, usize)> {
        self.fetches.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }

    pub fn data(&self) -> &[u8] {
        self.inner.data()
    }
}

impl ReadAt for CountingSource {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        self.fetches.lock().push((offset, buf.len()));
        self.inner.read_at(buf, offset)
    }
}

impl SizeProbe for CountingSource {
    fn size(&self) -> ReadResult<u64> {
        self.inner.size()
    }
}

/// A fault-injection wrapper around an upstream source.
///
/// Allows deterministic injection of:
/// - a hard failure on the next fetch
/// - a transfer that breaks off after a number of bytes
/// - a short (truncated) but successful fetch
pub struct FaultInjectionSource<S> {
    inner: S,
    fail_next: AtomicBool,
    /// When non-zero, the next fetch delivers this many bytes then fails.
    interrupt_after: AtomicUsize,
    /// When non-zero, the next fetch returns at most this many bytes.
    truncate_to: AtomicUsize,
    calls: AtomicU64,
}

impl<S: ReadAt> FaultInjectionSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_next: AtomicBool::new(false),
            interrupt_after: AtomicUsize::new(0),
            truncate_to: AtomicUsize::new(0),
            calls: AtomicU64::new(0),
        }
    }

    pub fn inject_failure(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn inject_interrupt_after(&self, bytes: usize) {
        self.interrupt_after.store(bytes, Ordering::SeqCst);
    }

    pub fn inject_truncation(&self, bytes: usize) {
        self.truncate_to.store(bytes, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<S: ReadAt> ReadAt for FaultInjectionSource<S> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> ReadResult<ReadOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ReadError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "injected upstream failure",
            )));
        }

        let interrupt = self.interrupt_after.swap(0, Ordering::SeqCst);
        if interrupt > 0 && interrupt < buf.len() {
            let outcome = self.inner.read_at(&mut buf[..interrupt], offset)?;
            return Err(ReadError::Interrupted {
                bytes_read: outcome.bytes(),
                source: io::Error::new(io::ErrorKind::UnexpectedEof, "injected interruption"),
            });
        }

        let truncate = self.truncate_to.swap(0, Ordering::SeqCst);
        if truncate > 0 && truncate < buf.len() {
            let outcome = self.inner.read_at(&mut buf[..truncate], offset)?;
            return Ok(ReadOutcome::EndOfData(outcome.bytes()));
        }

        self.inner.read_at(buf, offset)
    }
}

/// A fault-injection wrapper around any `PageStore`.
///
/// Allows deterministic injection of:
/// - write errors at a specific operation count
/// - read errors on demand
/// - partial (truncated) writes
pub struct FaultInjectionStore<D> {
    inner: D,
    /// Total number of write_at calls observed so far.
    write_count: AtomicU64,
    /// When non-zero, the Nth write (1-based) will return an I/O error.
    fail_write_at: AtomicU64,
    /// When true, the next read_at call will return an error.
    fail_next_read: AtomicBool,
    /// When non-zero, the next write will be silently truncated to at most
    /// this many bytes (simulating a partial / torn write).
    partial_write_max: AtomicUsize,
}

impl<D: PageStore> FaultInjectionStore<D> {
    /// Wrap an existing store for fault injection.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            write_count: AtomicU64::new(0),
            fail_write_at: AtomicU64::new(0),
            fail_next_read: AtomicBool::new(false),
            partial_write_max: AtomicUsize::new(0),
        }
    }

    /// Make the Nth write (1-based) return `io::ErrorKind::Other`.
    pub fn inject_write_error_at(&self, operation_n: u64) {
        self.fail_write_at.store(operation_n, Ordering::SeqCst);
    }

    /// Make the next `read_at` call return an error.
    pub fn inject_read_error(&self) {
        self.fail_next_read.store(true, Ordering::SeqCst);
    }

    /// Make the next write silently truncate data to at most `max_bytes`.
    pub fn inject_partial_write(&self, max_bytes: usize) {
        self.partial_write_max.store(max_bytes, Ordering::SeqCst);
    }

    /// Return the total number of write_at calls observed.
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: PageStore> PageStore for FaultInjectionStore<D> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(io::Error::other("injected read error"));
        }
        self.inner.read_at(offset, buf)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        let n = self.write_count.fetch_add(1, Ordering::SeqCst) + 1;

        let target = self.fail_write_at.load(Ordering::SeqCst);
        if target != 0 && n == target {
            return Err(io::Error::other(format!(
                "injected write error at operation {n}"
            )));
        }

        let max = self.partial_write_max.swap(0, Ordering::SeqCst);
        if max > 0 && max < buf.len() {
            return self.inner.write_at(offset, &buf[..max]);
        }

        self.inner.write_at(offset, buf)
    }

    fn flush(&self) -> io::Result<()> {
        self.inner.flush()
    }

    fn size(&self) -> io::Result<u64> {
        self.inner.size()
    }
}
