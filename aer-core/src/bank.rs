//! Circular bank of ingest buffers.
//!
//! A producer fills slots round-robin while a consumer drains the most
//! recently completed one. Every slot has its own lock; the index of the slot
//! being filled sits behind a second, independent lock so selecting the next
//! slot never waits on a slot that is being drained.

use crate::buffer::RawBytes;
use crate::snapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

#[derive(Debug)]
pub struct CircularIngestBank {
    slots: Vec<Mutex<RawBytes>>,
    filling: Mutex<usize>,
    has_data: AtomicBool,
    block_size: usize,
}

impl CircularIngestBank {
    /// Creates a bank with `slots` buffers (at least one).
    pub fn new(slots: usize, block_size: usize) -> Self {
        let slots = slots.max(1);
        Self {
            slots: (0..slots)
                .map(|_| Mutex::new(RawBytes::new(block_size)))
                .collect(),
            filling: Mutex::new(0),
            has_data: AtomicBool::new(false),
            block_size,
        }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Index of the slot the next `append` fills.
    pub fn filling_index(&self) -> usize {
        *self.filling.lock()
    }

    pub fn has_data(&self) -> bool {
        self.has_data.load(Ordering::Acquire)
    }

    /// Stores one burst of bytes in the current slot, then advances to the
    /// next slot.
    ///
    /// A drained slot is overwritten. A slot the consumer has not reached yet
    /// is extended instead, so a producer lapping the consumer loses nothing.
    pub fn append(&self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let index = *self.filling.lock();
        {
            let mut slot = self.slots[index].lock();
            if slot.is_empty() {
                slot.replace(bytes);
            } else {
                debug!(slot = index, pending = slot.len(), "producer lapped consumer");
                slot.append(bytes);
            }
        }
        {
            let mut filling = self.filling.lock();
            *filling = (*filling + 1) % self.slots.len();
        }
        self.has_data.store(true, Ordering::Release);
    }

    /// Drains the most recently completed slot into a snapshot, prefixed by
    /// the caller's unconsumed `tail`.
    ///
    /// Falls back to older non-empty slots, newest first, when the newest one
    /// was already drained. Returns `None` when no slot holds data.
    ///
    /// Every appended byte is returned exactly once, but when several slots
    /// are pending they come back newest first. A timestamp/address pair split
    /// across two such slots is then paired with the wrong timestamp.
    pub fn take_snapshot(&self, tail: &[u8]) -> Option<RawBytes> {
        if !self.has_data() {
            return None;
        }
        let n = self.slots.len();
        let newest = {
            let filling = self.filling.lock();
            (*filling + n - 1) % n
        };
        for offset in 0..n {
            let index = (newest + n - offset) % n;
            let mut slot = self.slots[index].lock();
            if slot.is_empty() {
                continue;
            }
            let bytes = snapshot::rescue(tail, slot.as_slice(), self.block_size);
            slot.reset();
            debug!(
                slot = index,
                rescued = tail.len(),
                len = bytes.len(),
                "bank snapshot taken"
            );
            return Some(bytes);
        }
        None
    }

    /// Total bytes waiting across all slots.
    pub fn pending(&self) -> usize {
        self.slots.iter().map(|slot| slot.lock().len()).sum()
    }

    /// Discards every slot and rewinds the fill index.
    pub fn reset(&self) {
        for slot in &self.slots {
            slot.lock().reset();
        }
        *self.filling.lock() = 0;
        self.has_data.store(false, Ordering::Release);
    }
}
