//! Read outcomes
//!
//! A ranged read either fills the caller's buffer or stops early because the
//! resource has no more bytes. Both are successes; hard failures travel as
//! [`ReadError`](crate::error::ReadError).

use std::fmt;

/// Outcome of a successful positioned read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The whole buffer was filled
    Complete(usize),
    /// Fewer bytes than requested exist past the offset
    EndOfData(usize),
}

impl ReadOutcome {
    /// Classify a read of `n` bytes into a buffer of `requested` bytes
    #[inline]
    pub const fn from_counts(n: usize, requested: usize) -> Self {
        if n >= requested {
            ReadOutcome::Complete(n)
        } else {
            ReadOutcome::EndOfData(n)
        }
    }

    /// Number of bytes placed in the buffer
    #[inline]
    pub const fn bytes(&self) -> usize {
        match self {
            ReadOutcome::Complete(n) | ReadOutcome::EndOfData(n) => *n,
        }
    }

    /// Check if the buffer was filled
    #[inline]
    pub const fn is_complete(&self) -> bool {
        matches!(self, ReadOutcome::Complete(_))
    }

    /// Check if the read hit the end of the data
    #[inline]
    pub const fn is_end_of_data(&self) -> bool {
        matches!(self, ReadOutcome::EndOfData(_))
    }

    /// Get the outcome kind as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReadOutcome::Complete(_) => "Complete",
            ReadOutcome::EndOfData(_) => "EndOfData",
        }
    }
}

impl fmt::Display for ReadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.bytes())
    }
}
