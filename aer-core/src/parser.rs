//! Low-level parsing of raw AER records.
//!
//! This module provides functions to extract fields from fixed-width records
//! and 32-bit protocol words using bitwise operations. All functions are pure;
//! the stateful parts (wrap accumulation, cursors) live in [`crate::decoder`].

use crate::config::{RecordWidth, UnmaskConfig};
use crate::types::Polarity;
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Unmasks an address field into `(x, y, polarity, eye)`.
///
/// The y value is returned as found on the wire; mirroring is up to the caller.
#[inline]
pub fn unmask_address(address: u32, table: &UnmaskConfig) -> (u32, u32, Polarity, u8) {
    let x = (address & table.x_mask) >> table.x_shift;
    let y = (address & table.y_mask) >> table.y_shift;
    let polarity = Polarity::from_bit((address & table.polarity_mask) >> table.polarity_shift);
    let eye = ((address & table.eye_mask) >> table.eye_shift) as u8;
    (x, y, polarity, eye)
}

// ============================================================================
// Fixed-width records
// 4 bytes: [addr lo][addr hi][ts lo][ts hi]             (little-endian)
//          ts hi bit 7 = wrap, ts hi bit 6 = wrap reset
// 6 bytes: [addr:16][ts:32]                              (big-endian)
// 8 bytes: [addr:32][ts:32]                              (big-endian)
// ============================================================================

/// Timestamp increment applied for each wrap marker in 4-byte records.
pub const FIXED_WRAP_QUANTUM: u32 = 0x4000;

const FIXED_WRAP_BIT: u8 = 0x80;
const FIXED_WRAP_RESET_BIT: u8 = 0x40;

/// Returns true if a 4-byte record is a timestamp wrap marker.
#[inline]
pub fn fixed_is_wrap(record: &[u8], width: RecordWidth) -> bool {
    width == RecordWidth::Four && record[3] & FIXED_WRAP_BIT != 0
}

/// Returns true if a 4-byte record resets the wrap accumulator.
///
/// Only meaningful when [`fixed_is_wrap`] is false.
#[inline]
pub fn fixed_is_wrap_reset(record: &[u8], width: RecordWidth) -> bool {
    width == RecordWidth::Four && record[3] & FIXED_WRAP_RESET_BIT != 0
}

/// Extracts the address field of a fixed-width record.
#[inline]
pub fn fixed_address(record: &[u8], width: RecordWidth) -> u32 {
    match width {
        RecordWidth::Four => LittleEndian::read_u16(&record[0..2]) as u32,
        RecordWidth::Six => BigEndian::read_u16(&record[0..2]) as u32,
        RecordWidth::Eight => BigEndian::read_u32(&record[0..4]),
    }
}

/// Extracts the raw (uncorrected) timestamp field of a fixed-width record.
#[inline]
pub fn fixed_timestamp(record: &[u8], width: RecordWidth) -> u32 {
    match width {
        RecordWidth::Four => LittleEndian::read_u16(&record[2..4]) as u32,
        RecordWidth::Six => BigEndian::read_u32(&record[2..6]),
        RecordWidth::Eight => BigEndian::read_u32(&record[4..8]),
    }
}

// ============================================================================
// 32-bit word protocol (little-endian words)
// Timestamp word: [31] = 1 | [30:26] control | [25:0] timestamp delta
//   control pattern 0x88000000 under mask 0xFC000000 = wrap marker
// Address word:   [31] = 1 -> malformed | [31:16] = 0x0001 -> sync | [15:0] address
// ============================================================================

/// Size of one protocol word in bytes.
pub const WORD_SIZE: usize = 4;

/// Timestamp increment applied for each wrap marker word.
pub const WORD_WRAP_QUANTUM: u32 = 0x0400_0000;

const WORD_FLAG: u32 = 0x8000_0000;
const WORD_CONTROL_MASK: u32 = 0xFC00_0000;
const WORD_WRAP_SENTINEL: u32 = 0x8800_0000;
const WORD_TIMESTAMP_MASK: u32 = 0x03FF_FFFF;
const WORD_UPPER_MASK: u32 = 0xFFFF_0000;
const WORD_SYNC_PATTERN: u32 = 0x0001_0000;
const WORD_ADDRESS_MASK: u32 = 0x0000_FFFF;

/// Reads the word at word index `index`, if fully present.
#[inline]
pub fn read_word(bytes: &[u8], index: usize) -> Option<u32> {
    let start = index.checked_mul(WORD_SIZE)?;
    let chunk = bytes.get(start..start + WORD_SIZE)?;
    Some(LittleEndian::read_u32(chunk))
}

/// Returns true if the word carries a timestamp (top bit set).
#[inline]
pub fn is_timestamp_word(word: u32) -> bool {
    word & WORD_FLAG != 0
}

/// Returns true if a timestamp word carries control bits, meaning the real
/// timestamp follows in the next word.
#[inline]
pub fn is_control_word(word: u32) -> bool {
    (word & WORD_CONTROL_MASK) > WORD_FLAG
}

/// Returns true if a control word is a wrap marker.
#[inline]
pub fn is_wrap_word(word: u32) -> bool {
    word & WORD_CONTROL_MASK == WORD_WRAP_SENTINEL
}

/// Extracts the 26-bit timestamp delta.
#[inline]
pub fn timestamp_delta(word: u32) -> u32 {
    word & WORD_TIMESTAMP_MASK
}

/// Classification of a 32-bit address word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressWord {
    /// Ordinary event; carries the low 16 address bits.
    Event(u32),
    /// Synchronisation marker; carries the low 16 address bits.
    Sync(u32),
    /// Reserved top bit set: incomplete or misaligned, retry later.
    Malformed,
    /// Unknown upper half: skip.
    Corrupted,
}

/// Classifies an address word.
#[inline]
pub fn classify_address(word: u32) -> AddressWord {
    if word & WORD_FLAG != 0 {
        return AddressWord::Malformed;
    }
    let upper = word & WORD_UPPER_MASK;
    if upper > WORD_SYNC_PATTERN {
        AddressWord::Corrupted
    } else if upper == WORD_SYNC_PATTERN {
        AddressWord::Sync(word & WORD_ADDRESS_MASK)
    } else {
        AddressWord::Event(word & WORD_ADDRESS_MASK)
    }
}
