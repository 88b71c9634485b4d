//! File system page stores
//!
//! This module provides file-based page store implementations.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::device::PageStore;

/// Single-file page store
///
/// Wraps a file with mutex protection so seek-then-transfer stays atomic.
pub struct FileStore {
    /// Path to the file
    path: PathBuf,
    /// The underlying file
    file: Mutex<File>,
}

impl FileStore {
    /// Open or create a file at the specified path
    pub fn open(path: impl AsRef<Path>, create: bool) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .truncate(false)
            .open(&path)?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Wrap an already open file
    ///
    /// The file must be readable and writable.
    pub fn from_file(file: File, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(file),
        }
    }

    /// Get the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PageStore for FileStore {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;

        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&self) -> io::Result<()> {
        self.file.lock().sync_all()
    }

    fn size(&self) -> io::Result<u64> {
        self.file.lock().metadata().map(|m| m.len())
    }
}

/// Segmented page store
///
/// Spreads the logical byte range over fixed-size segment files so a cached
/// resource can exceed the maximum size of a single file.
pub struct SegmentedStore {
    /// Base directory
    base_dir: PathBuf,
    /// File prefix
    prefix: String,
    /// Segment size in bytes
    segment_size: u64,
    /// Open segments
    segments: Mutex<Vec<Option<FileStore>>>,
}

impl SegmentedStore {
    /// Create a new segmented store
    pub fn new(base_dir: impl AsRef<Path>, prefix: &str, segment_size: u64) -> io::Result<Self> {
        if segment_size == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "segment size must be positive",
            ));
        }
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            prefix: prefix.to_string(),
            segment_size,
            segments: Mutex::new(Vec::new()),
        })
    }

    /// Get the segment size in bytes
    pub fn segment_size(&self) -> u64 {
        self.segment_size
    }

    /// Get the segment file path for a given segment index
    fn segment_path(&self, segment: u64) -> PathBuf {
        self.base_dir.join(format!("{}.{}", self.prefix, segment))
    }

    /// Run `op` against a segment, opening it first if needed
    fn with_segment<R>(
        &self,
        segment: u64,
        create: bool,
        op: impl FnOnce(&FileStore) -> io::Result<R>,
    ) -> io::Result<Option<R>> {
        let index = usize::try_from(segment)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "segment index overflow"))?;
        let mut segments = self.segments.lock();

        if segments.len() <= index {
            if !create && !self.segment_path(segment).exists() {
                return Ok(None);
            }
            segments.resize_with(index + 1, || None);
        }

        if segments[index].is_none() {
            let path = self.segment_path(segment);
            if !create && !path.exists() {
                return Ok(None);
            }
            segments[index] = Some(FileStore::open(path, true)?);
        }

        match segments[index].as_ref() {
            Some(file) => op(file).map(Some),
            None => Ok(None),
        }
    }
}

impl PageStore for SegmentedStore {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut total = 0usize;

        while total < buf.len() {
            let position = offset + total as u64;
            let segment = position / self.segment_size;
            let segment_offset = position % self.segment_size;
            let room = (self.segment_size - segment_offset).min((buf.len() - total) as u64) as usize;
            let chunk = &mut buf[total..total + room];

            let n = self
                .with_segment(segment, false, |file| file.read_at(segment_offset, chunk))?
                .unwrap_or(0);
            total += n;
            if n < room {
                break;
            }
        }

        Ok(total)
    }

    fn write_at(&self, offset: u64, buf: &[u8]) -> io::Result<usize> {
        let mut total = 0usize;

        while total < buf.len() {
            let position = offset + total as u64;
            let segment = position / self.segment_size;
            let segment_offset = position % self.segment_size;
            let room = (self.segment_size - segment_offset).min((buf.len() - total) as u64) as usize;
            let chunk = &buf[total..total + room];

            let n = self
                .with_segment(segment, true, |file| file.write_at(segment_offset, chunk))?
                .unwrap_or(0);
            total += n;
            if n < room {
                break;
            }
        }

        Ok(total)
    }

    fn flush(&self) -> io::Result<()> {
        let segments = self.segments.lock();

        for segment in segments.iter().flatten() {
            segment.flush()?;
        }

        Ok(())
    }

    fn size(&self) -> io::Result<u64> {
        let segments = self.segments.lock();

        let mut end = 0u64;
        for (index, segment) in segments.iter().enumerate() {
            if let Some(file) = segment {
                let len = file.size()?;
                if len > 0 {
                    end = end.max(index as u64 * self.segment_size + len);
                }
            }
        }

        Ok(end)
    }
}
