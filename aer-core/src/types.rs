//! Core types for decoded address-event data.
//!
//! This module defines the decoded event structure and the result type returned
//! by the streaming decoder.

/// Event polarity: ON for a brightness increase, OFF for a decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Polarity {
    /// Brightness increase (+1)
    On = 1,
    /// Brightness decrease (-1)
    Off = -1,
}

impl Polarity {
    /// Maps an unmasked polarity bit to a polarity: zero is OFF, anything else ON.
    #[inline]
    pub fn from_bit(bit: u32) -> Self {
        if bit == 0 {
            Self::Off
        } else {
            Self::On
        }
    }

    /// Returns the signed value (+1 or -1).
    #[inline]
    pub fn as_i8(self) -> i8 {
        self as i8
    }
}

/// A decoded address event.
///
/// Produced only by the decoder. The timestamp is the reconstructed,
/// monotonic value (hardware counter plus wrap correction).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Pixel column
    pub x: u32,
    /// Pixel row
    pub y: u32,
    /// Brightness change direction
    pub polarity: Polarity,
    /// Stereo identifier (0 for mono sensors)
    pub eye: u8,
    /// Reconstructed timestamp
    pub timestamp: u32,
}

impl DecodedEvent {
    /// Creates a new decoded event.
    #[inline]
    pub fn new(x: u32, y: u32, polarity: Polarity, eye: u8, timestamp: u32) -> Self {
        Self {
            x,
            y,
            polarity,
            eye,
            timestamp,
        }
    }
}

/// Outcome of a single `next_event` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeResult {
    /// Nothing decodable right now; call again once more bytes were fed.
    NoData,
    /// An ordinary sensor event.
    Event(DecodedEvent),
    /// A protocol synchronisation marker carrying the unmasked address.
    SyncMarker(DecodedEvent),
}

impl DecodeResult {
    /// Returns the carried event for both ordinary events and sync markers.
    #[inline]
    pub fn event(&self) -> Option<&DecodedEvent> {
        match self {
            Self::Event(e) | Self::SyncMarker(e) => Some(e),
            Self::NoData => None,
        }
    }

    #[inline]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

/// Lifecycle phase of a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderPhase {
    /// No snapshot has been taken since construction or the last reset.
    Empty,
    /// The current snapshot still holds at least one undecoded byte.
    Decoding,
    /// The current snapshot is exhausted; a new one is needed.
    NeedSnapshot,
}

/// Running counters kept by a decoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Ordinary events emitted
    pub events: u64,
    /// Sync markers emitted
    pub sync_markers: u64,
    /// Wrap markers applied to the accumulator
    pub wraps: u64,
    /// Wrap-accumulator resets (fixed-width protocol only)
    pub wrap_resets: u64,
    /// Control timestamp words that were not wrap markers
    pub control_words: u64,
    /// Address words with the reserved top bit set
    pub malformed: u64,
    /// Address words with an unknown upper half, skipped
    pub corrupted: u64,
    /// Snapshots taken from the ingest layer
    pub snapshots: u64,
    /// Bytes carried over from an exhausted snapshot into the next one
    pub rescued_bytes: u64,
}

impl DecoderStats {
    /// Total events seen, sync markers included.
    #[inline]
    pub fn total_events(&self) -> u64 {
        self.events + self.sync_markers
    }
}

/// Result of decoding a whole recorded stream.
#[derive(Debug)]
pub struct DecodeSummary {
    /// Decoded events and sync markers in decode order
    pub events: Vec<DecodedEvent>,
    /// Decoder counters at the end of the stream
    pub stats: DecoderStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polarity_from_bit() {
        assert_eq!(Polarity::from_bit(0), Polarity::Off);
        assert_eq!(Polarity::from_bit(1), Polarity::On);
        assert_eq!(Polarity::On.as_i8(), 1);
        assert_eq!(Polarity::Off.as_i8(), -1);
    }

    #[test]
    fn test_decode_result_event_access() {
        let event = DecodedEvent::new(3, 4, Polarity::On, 1, 99);
        assert_eq!(DecodeResult::Event(event).event(), Some(&event));
        assert_eq!(DecodeResult::SyncMarker(event).event(), Some(&event));
        assert!(DecodeResult::NoData.event().is_none());
        assert!(DecodeResult::NoData.is_no_data());
    }

    #[test]
    fn test_stats_total_events() {
        let stats = DecoderStats {
            events: 10,
            sync_markers: 2,
            ..Default::default()
        };
        assert_eq!(stats.total_events(), 12);
    }
}
