//! Page residency bitmap
//!
//! One bit per page of the resource, stored as 64-page words keyed by word
//! index. Only words holding at least one resident page are allocated, so
//! memory follows what has been cached rather than the size of the resource.
//! Bits are only ever set; the cache never evicts.

use std::collections::BTreeMap;

const WORD_BITS: u64 = u64::BITS as u64;

/// Set of resident page indices
#[derive(Debug, Clone, Default)]
pub struct PageBitmap {
    words: BTreeMap<u64, u64>,
    resident: u64,
}

impl PageBitmap {
    /// Create an empty bitmap
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn locate(page: u64) -> (u64, u64) {
        (page / WORD_BITS, 1u64 << (page % WORD_BITS))
    }

    /// Check if a page is resident
    #[inline]
    pub fn contains(&self, page: u64) -> bool {
        let (word, mask) = Self::locate(page);
        self.words.get(&word).is_some_and(|w| w & mask != 0)
    }

    /// Mark a page resident. Returns `true` if it was not resident before.
    pub fn insert(&mut self, page: u64) -> bool {
        let (word, mask) = Self::locate(page);
        let slot = self.words.entry(word).or_insert(0);
        if *slot & mask != 0 {
            return false;
        }
        *slot |= mask;
        self.resident += 1;
        true
    }

    /// Number of resident pages
    pub fn len(&self) -> u64 {
        self.resident
    }

    /// Check if no page is resident
    pub fn is_empty(&self) -> bool {
        self.resident == 0
    }

    /// First and last non-resident page in `start..=end`
    pub fn missing_span(&self, start: u64, end: u64) -> Option<(u64, u64)> {
        let first = (start..=end).find(|&page| !self.contains(page))?;
        let last = (first..=end).rev().find(|&page| !self.contains(page))?;
        Some((first, last))
    }

    /// Iterate resident page indices in increasing order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.words.iter().flat_map(|(&index, &word)| {
            (0..WORD_BITS)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| index * WORD_BITS + bit)
        })
    }
}
