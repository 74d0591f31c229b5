//! Immutable snapshots of ingested bytes, consumed by a single forward cursor.

use crate::buffer::{block_aligned, RawBytes};

/// Builds a snapshot from an unconsumed `tail` followed by `fresh` bytes.
///
/// Uses one pre-sized allocation and two copies.
pub fn rescue(tail: &[u8], fresh: &[u8], block_size: usize) -> RawBytes {
    let len = tail.len() + fresh.len();
    let mut data = Vec::with_capacity(block_aligned(len, block_size.max(1)));
    data.extend_from_slice(tail);
    data.extend_from_slice(fresh);
    RawBytes::from_vec(data, block_size)
}

/// Bytes detached from the ingest layer plus a read cursor.
#[derive(Debug, Clone)]
pub struct Snapshot {
    bytes: RawBytes,
    cursor: usize,
}

impl Snapshot {
    pub fn new(bytes: RawBytes) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Current read position in bytes.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Unconsumed bytes from the cursor on.
    #[inline]
    pub fn remaining(&self) -> &[u8] {
        &self.bytes.as_slice()[self.cursor..]
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    /// Moves the cursor forward by `n` bytes, never past the end.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.cursor = (self.cursor + n).min(self.bytes.len());
    }

    /// Drops the consumed prefix so its memory can be released.
    ///
    /// Returns the number of bytes dropped.
    pub fn compact(&mut self) -> usize {
        let consumed = self.cursor;
        if consumed > 0 {
            self.bytes.reshape(consumed);
            self.cursor = 0;
        }
        consumed
    }
}
