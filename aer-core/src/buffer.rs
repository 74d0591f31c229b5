//! Block-growing byte storage and the single-buffer ingest layer.
//!
//! [`RawBytes`] tracks a logical capacity that is always a multiple of the
//! block size. [`RawIngestBuffer`] wraps it behind a lock so a producer can
//! append while a consumer detaches snapshots.

use parking_lot::Mutex;
use tracing::debug;

/// Smallest multiple of `block_size` that holds `len` bytes.
#[inline]
pub(crate) fn block_aligned(len: usize, block_size: usize) -> usize {
    len.div_ceil(block_size) * block_size
}

/// Owned, contiguous byte sequence growing in fixed block increments.
#[derive(Debug, Clone)]
pub struct RawBytes {
    data: Vec<u8>,
    capacity: usize,
    block_size: usize,
}

impl RawBytes {
    /// Creates an empty, zero-capacity byte sequence.
    pub fn new(block_size: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity: 0,
            block_size: block_size.max(1),
        }
    }

    /// Creates a byte sequence from already-owned bytes.
    pub fn from_vec(data: Vec<u8>, block_size: usize) -> Self {
        let block_size = block_size.max(1);
        let capacity = block_aligned(data.len(), block_size);
        let mut data = data;
        data.reserve_exact(capacity - data.len());
        Self {
            data,
            capacity,
            block_size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical capacity, always a block multiple.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Appends `bytes`, growing capacity to the next block multiple if needed.
    ///
    /// Returns true if the capacity grew.
    pub fn append(&mut self, bytes: &[u8]) -> bool {
        if bytes.is_empty() {
            return false;
        }
        let new_len = self.data.len() + bytes.len();
        let grew = new_len > self.capacity;
        if grew {
            self.capacity = block_aligned(new_len, self.block_size);
            self.data.reserve_exact(self.capacity - self.data.len());
        }
        self.data.extend_from_slice(bytes);
        grew
    }

    /// Replaces the content with `bytes`, sizing capacity for them alone.
    pub fn replace(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.capacity = block_aligned(bytes.len(), self.block_size);
        self.data.shrink_to(self.capacity);
        self.data.reserve_exact(self.capacity);
        self.data.extend_from_slice(bytes);
    }

    /// Drops the first `consumed` bytes and shrinks capacity to the smallest
    /// block multiple that fits the remainder.
    pub fn reshape(&mut self, consumed: usize) {
        let consumed = consumed.min(self.data.len());
        self.data.drain(..consumed);
        self.capacity = block_aligned(self.data.len(), self.block_size);
        self.data.shrink_to(self.capacity);
    }

    /// Detaches the whole content, leaving this sequence empty with zero
    /// capacity. Returns `None` if there was nothing to detach.
    pub fn take(&mut self) -> Option<RawBytes> {
        if self.data.is_empty() {
            return None;
        }
        let block_size = self.block_size;
        Some(std::mem::replace(self, RawBytes::new(block_size)))
    }

    /// Discards all content and capacity.
    pub fn reset(&mut self) {
        self.data = Vec::new();
        self.capacity = 0;
    }
}

/// A growable ingest buffer shared between one producer and one consumer.
///
/// The lock is only held for the duration of a copy or swap.
#[derive(Debug)]
pub struct RawIngestBuffer {
    inner: Mutex<RawBytes>,
}

impl RawIngestBuffer {
    pub fn new(block_size: usize) -> Self {
        Self {
            inner: Mutex::new(RawBytes::new(block_size)),
        }
    }

    /// Copies `bytes` to the end of the buffered content.
    pub fn append(&self, bytes: &[u8]) {
        let mut inner = self.inner.lock();
        if inner.append(bytes) {
            debug!(
                len = inner.len(),
                capacity = inner.capacity(),
                "ingest buffer grew"
            );
        }
    }

    /// Detaches the current content as a snapshot. `None` means no data yet.
    pub fn take_snapshot(&self) -> Option<RawBytes> {
        self.inner.lock().take()
    }

    /// Discards a consumed prefix and re-compacts the remainder.
    pub fn reshape(&self, consumed: usize) {
        let mut inner = self.inner.lock();
        inner.reshape(consumed);
        debug!(
            consumed,
            remaining = inner.len(),
            capacity = inner.capacity(),
            "ingest buffer reshaped"
        );
    }

    pub fn reset(&self) {
        self.inner.lock().reset();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }
}
