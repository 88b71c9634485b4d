//! Error types for ranged reads
//!
//! End-of-data is not an error: short reads are reported through
//! [`ReadOutcome::EndOfData`](crate::status::ReadOutcome::EndOfData). Everything in
//! [`ReadError`] is a hard failure the caller must not paper over.

use std::io;

/// Result alias used by sources, cache handlers and readers.
pub type ReadResult<T> = Result<T, ReadError>;

/// Errors returned by ranged reads.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// I/O error reported by an upstream source.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The page store failed to read or write.
    #[error("page store error: {0}")]
    Store(#[source] io::Error),

    /// The upstream transfer broke off after some bytes were delivered.
    #[error("transfer interrupted after {bytes_read} bytes: {source}")]
    Interrupted {
        /// Bytes placed in the caller's buffer before the failure.
        bytes_read: usize,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The HTTP request could not be dispatched.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a status a range read cannot use.
    #[error("unexpected http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The size probe got a missing or malformed `Content-Range` header.
    #[error("invalid Content-Range response")]
    InvalidContentRange,

    /// A request that cannot be served as asked.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ReadError {
    /// Bytes delivered into the buffer before the failure.
    ///
    /// Only [`ReadError::Interrupted`] carries a non-zero count.
    pub fn bytes_read(&self) -> usize {
        match self {
            ReadError::Interrupted { bytes_read, .. } => *bytes_read,
            _ => 0,
        }
    }

    /// Check if the error came from the page store rather than upstream.
    pub fn is_store(&self) -> bool {
        matches!(self, ReadError::Store(_))
    }
}
