//! Stateful streaming AER decoder.
//!
//! This module implements the decoding state machine that pulls snapshots
//! from the ingest layer, reconstructs monotonic timestamps from the wrapping
//! hardware counter and unmasks addresses into events.

use crate::bank::CircularIngestBank;
use crate::buffer::RawIngestBuffer;
use crate::config::{ConfigError, DecoderConfig, Protocol, RecordWidth, UnmaskConfig};
use crate::parser::{self, AddressWord, WORD_SIZE};
use crate::snapshot::{self, Snapshot};
use crate::types::{DecodeResult, DecodeSummary, DecodedEvent, DecoderPhase, DecoderStats};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Errors that can occur while decoding a recorded stream.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Chunk size used when replaying a reader through the decoder.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Ingest layer backing a decoder.
#[derive(Debug, Clone)]
enum Ingest {
    Single(Arc<RawIngestBuffer>),
    Circular(Arc<CircularIngestBank>),
}

impl Ingest {
    fn append(&self, bytes: &[u8]) {
        match self {
            Self::Single(buffer) => buffer.append(bytes),
            Self::Circular(bank) => bank.append(bytes),
        }
    }

    fn reset(&self) {
        match self {
            Self::Single(buffer) => buffer.reset(),
            Self::Circular(bank) => bank.reset(),
        }
    }
}

/// Producer handle sharing a decoder's ingest layer.
///
/// Cheap to clone and safe to move to another thread.
#[derive(Debug, Clone)]
pub struct RawFeeder {
    ingest: Ingest,
}

impl RawFeeder {
    /// Hands raw bytes to the decoder without waiting for it.
    pub fn feed_raw(&self, bytes: &[u8]) {
        self.ingest.append(bytes);
    }
}

/// Wrap correction and monotonicity state.
#[derive(Debug, Clone, Copy, Default)]
struct DecoderState {
    wrap: u32,
    last_timestamp: u32,
}

impl DecoderState {
    /// Records a freshly reconstructed timestamp, clamped to never go back.
    #[inline]
    fn observe(&mut self, timestamp: u32) -> u32 {
        if timestamp > self.last_timestamp {
            self.last_timestamp = timestamp;
        }
        self.last_timestamp
    }
}

/// Outcome of one decode attempt on the current snapshot.
enum Step {
    Emit(DecodeResult),
    /// A record was consumed without producing an event.
    Consumed,
    /// Reserved address bit set; reported as no data.
    Malformed,
    /// Not enough bytes left for a complete record.
    NeedMore,
}

/// Streaming AER decoder.
///
/// Fed through [`AerDecoder::feed_raw`] or a [`RawFeeder`], drained through
/// [`AerDecoder::next_event`]. Neither side ever blocks waiting for data.
#[derive(Debug)]
pub struct AerDecoder {
    config: DecoderConfig,
    ingest: Ingest,
    snapshot: Option<Snapshot>,
    starved: bool,
    state: DecoderState,
    stats: DecoderStats,
}

impl Default for AerDecoder {
    fn default() -> Self {
        Self::build(DecoderConfig::default())
    }
}

impl AerDecoder {
    /// Creates a decoder for a validated configuration.
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Creates a decoder for `protocol` with the default unmask table.
    pub fn with_protocol(protocol: Protocol) -> Self {
        Self::build(DecoderConfig::for_protocol(protocol))
    }

    fn build(config: DecoderConfig) -> Self {
        let ingest = match config.protocol {
            Protocol::Fixed(_) | Protocol::Word => {
                Ingest::Single(Arc::new(RawIngestBuffer::new(config.block_size)))
            }
            Protocol::WordCircular => Ingest::Circular(Arc::new(CircularIngestBank::new(
                config.bank_slots,
                config.block_size,
            ))),
        };
        Self {
            config,
            ingest,
            snapshot: None,
            starved: false,
            state: DecoderState::default(),
            stats: DecoderStats::default(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    /// Returns a producer handle for feeding bytes from another thread.
    pub fn feeder(&self) -> RawFeeder {
        RawFeeder {
            ingest: self.ingest.clone(),
        }
    }

    /// Forwards raw bytes to the ingest layer.
    pub fn feed_raw(&self, bytes: &[u8]) {
        self.ingest.append(bytes);
    }

    /// Read position inside the current snapshot, in bytes.
    pub fn current_cursor(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::cursor)
    }

    pub fn phase(&self) -> DecoderPhase {
        match &self.snapshot {
            None => DecoderPhase::Empty,
            Some(snapshot) if self.starved || snapshot.is_exhausted() => {
                DecoderPhase::NeedSnapshot
            }
            Some(_) => DecoderPhase::Decoding,
        }
    }

    /// Clears ingest and decoder state back to construction time.
    ///
    /// Must not run concurrently with a producer feeding the same decoder.
    pub fn reset(&mut self) {
        self.ingest.reset();
        self.snapshot = None;
        self.starved = false;
        self.state = DecoderState::default();
        self.stats = DecoderStats::default();
        debug!("decoder reset");
    }

    /// Releases the consumed prefix of the current snapshot once it spans at
    /// least one block. Only the fixed-width protocol compacts.
    ///
    /// Returns true if memory was released.
    pub fn reshape_if_needed(&mut self) -> bool {
        if !matches!(self.config.protocol, Protocol::Fixed(_)) {
            return false;
        }
        match self.snapshot.as_mut() {
            Some(snapshot) if snapshot.cursor() >= self.config.block_size => {
                let dropped = snapshot.compact();
                debug!(dropped, remaining = snapshot.len(), "snapshot reshaped");
                true
            }
            _ => false,
        }
    }

    /// Decodes the next event, taking a new snapshot when the current one
    /// cannot yield a complete record.
    pub fn next_event(&mut self) -> DecodeResult {
        if self.snapshot.is_none() && !self.refill() {
            return DecodeResult::NoData;
        }
        loop {
            let step = match self.config.protocol {
                Protocol::Fixed(width) => self.decode_fixed(width),
                Protocol::Word | Protocol::WordCircular => self.decode_word(),
            };
            match step {
                Step::Emit(result) => return result,
                Step::Consumed => {}
                Step::Malformed => return DecodeResult::NoData,
                Step::NeedMore => {
                    if !self.refill() {
                        return DecodeResult::NoData;
                    }
                }
            }
        }
    }

    /// Decodes until no more data is available, collecting events and sync
    /// markers into `out`. Returns the number collected.
    pub fn drain(&mut self, out: &mut Vec<DecodedEvent>) -> usize {
        let before = out.len();
        loop {
            match self.next_event() {
                DecodeResult::Event(event) | DecodeResult::SyncMarker(event) => out.push(event),
                // A malformed word leaves the decoder in `Decoding`; retry it.
                DecodeResult::NoData if self.phase() == DecoderPhase::Decoding => {}
                DecodeResult::NoData => break,
            }
        }
        out.len() - before
    }

    /// Replays a reader through the decoder chunk by chunk.
    pub fn decode_reader<R: Read>(&mut self, mut reader: R) -> Result<DecodeSummary, DecodeError> {
        let mut events = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK_SIZE];

        loop {
            let bytes_read = reader.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            self.feed_raw(&chunk[..bytes_read]);
            self.drain(&mut events);
        }

        Ok(DecodeSummary {
            events,
            stats: self.stats,
        })
    }

    /// Decodes a recorded raw dump from disk.
    pub fn decode_file<P: AsRef<Path>>(&mut self, path: P) -> Result<DecodeSummary, DecodeError> {
        let file = File::open(path.as_ref())?;
        self.decode_reader(BufReader::new(file))
    }

    /// Replaces the current snapshot with its unconsumed tail followed by
    /// freshly ingested bytes. Returns false if nothing new was available.
    fn refill(&mut self) -> bool {
        let tail: &[u8] = self.snapshot.as_ref().map_or(&[][..], Snapshot::remaining);
        let rescued = tail.len();
        let fresh = match &self.ingest {
            Ingest::Single(buffer) => buffer.take_snapshot().map(|bytes| {
                if tail.is_empty() {
                    bytes
                } else {
                    snapshot::rescue(tail, bytes.as_slice(), bytes.block_size())
                }
            }),
            Ingest::Circular(bank) => bank.take_snapshot(tail),
        };

        match fresh {
            Some(bytes) => {
                debug!(len = bytes.len(), rescued, "snapshot taken");
                self.snapshot = Some(Snapshot::new(bytes));
                self.starved = false;
                self.stats.snapshots += 1;
                self.stats.rescued_bytes += rescued as u64;
                true
            }
            None => {
                self.starved = true;
                false
            }
        }
    }

    /// Decodes one fixed-width record. Address bit 15 is only read through
    /// the eye mask; this protocol never reports sync markers.
    fn decode_fixed(&mut self, width: RecordWidth) -> Step {
        let table = self.config.unmask;
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Step::NeedMore;
        };
        let size = width.bytes();
        let remaining = snapshot.remaining();
        if remaining.len() < size {
            return Step::NeedMore;
        }
        let record = &remaining[..size];

        if parser::fixed_is_wrap(record, width) {
            snapshot.advance(size);
            self.state.wrap = self.state.wrap.wrapping_add(parser::FIXED_WRAP_QUANTUM);
            self.stats.wraps += 1;
            trace!(wrap = self.state.wrap, "timestamp wrap");
            return Step::Consumed;
        }
        if parser::fixed_is_wrap_reset(record, width) {
            snapshot.advance(size);
            self.state.wrap = 0;
            self.stats.wrap_resets += 1;
            trace!("timestamp wrap reset");
            return Step::Consumed;
        }

        let address = parser::fixed_address(record, width);
        let raw_timestamp = parser::fixed_timestamp(record, width);
        snapshot.advance(size);

        let (x, y, polarity, eye) = parser::unmask_address(address, &table);
        let y = table.max_y().saturating_sub(y);
        let timestamp = self
            .state
            .observe(raw_timestamp.wrapping_add(self.state.wrap));
        self.stats.events += 1;

        Step::Emit(DecodeResult::Event(DecodedEvent::new(
            x, y, polarity, eye, timestamp,
        )))
    }

    fn decode_word(&mut self) -> Step {
        let table = self.config.unmask;
        let Some(snapshot) = self.snapshot.as_mut() else {
            return Step::NeedMore;
        };
        let words = {
            let bytes = snapshot.remaining();
            [
                parser::read_word(bytes, 0),
                parser::read_word(bytes, 1),
                parser::read_word(bytes, 2),
            ]
        };
        let Some(first) = words[0] else {
            return Step::NeedMore;
        };

        // Timestamp words are optional; without one the previous timestamp
        // is reused and `first` is read again as the address word.
        let mut used = 0;
        if parser::is_timestamp_word(first) {
            let timestamp_word = if parser::is_control_word(first) {
                let Some(next) = words[1] else {
                    return Step::NeedMore;
                };
                if parser::is_wrap_word(first) {
                    self.state.wrap = self.state.wrap.wrapping_add(parser::WORD_WRAP_QUANTUM);
                    self.stats.wraps += 1;
                    trace!(wrap = self.state.wrap, "timestamp wrap");
                } else {
                    self.stats.control_words += 1;
                    trace!(word = first, "control word skipped");
                }
                used = 2;
                next
            } else {
                used = 1;
                first
            };
            self.state
                .observe(parser::timestamp_delta(timestamp_word).wrapping_add(self.state.wrap));
        }
        let timestamp = self.state.last_timestamp;

        let Some(address) = words[used] else {
            snapshot.advance(used * WORD_SIZE);
            return Step::NeedMore;
        };

        match parser::classify_address(address) {
            AddressWord::Malformed => {
                snapshot.advance(used * WORD_SIZE);
                self.stats.malformed += 1;
                trace!(word = address, "malformed address word");
                Step::Malformed
            }
            AddressWord::Corrupted => {
                snapshot.advance((used + 1) * WORD_SIZE);
                self.stats.corrupted += 1;
                trace!(word = address, "corrupted address word");
                Step::Consumed
            }
            AddressWord::Sync(bits) => {
                snapshot.advance((used + 1) * WORD_SIZE);
                self.stats.sync_markers += 1;
                Step::Emit(DecodeResult::SyncMarker(unmask_event(
                    bits, &table, timestamp,
                )))
            }
            AddressWord::Event(bits) => {
                snapshot.advance((used + 1) * WORD_SIZE);
                self.stats.events += 1;
                Step::Emit(DecodeResult::Event(unmask_event(bits, &table, timestamp)))
            }
        }
    }
}

#[inline]
fn unmask_event(address: u32, table: &UnmaskConfig, timestamp: u32) -> DecodedEvent {
    let (x, y, polarity, eye) = parser::unmask_address(address, table);
    DecodedEvent::new(x, y, polarity, eye, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Polarity;

    /// Encodes a default-layout address.
    fn address(x: u32, y: u32, on: bool, eye: u32) -> u32 {
        (eye << 15) | (y << 8) | (x << 1) | on as u32
    }

    fn fixed4(address: u32, timestamp: u16) -> [u8; 4] {
        let a = (address as u16).to_le_bytes();
        let t = timestamp.to_le_bytes();
        [a[0], a[1], t[0], t[1]]
    }

    fn words(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_decoder_initial_state() {
        let mut decoder = AerDecoder::default();
        assert_eq!(decoder.phase(), DecoderPhase::Empty);
        assert_eq!(decoder.current_cursor(), 0);
        assert_eq!(decoder.next_event(), DecodeResult::NoData);
        assert_eq!(decoder.phase(), DecoderPhase::Empty);
    }

    #[test]
    fn test_fixed_wrap_then_event() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Four));
        decoder.feed_raw(&[0x00, 0x00, 0x00, 0x80]);
        decoder.feed_raw(&fixed4(address(10, 20, true, 0), 500));

        let DecodeResult::Event(event) = decoder.next_event() else {
            panic!("expected an event");
        };
        assert_eq!(event.x, 10);
        assert_eq!(event.y, 127 - 20);
        assert_eq!(event.polarity, Polarity::On);
        assert_eq!(event.eye, 0);
        assert_eq!(event.timestamp, 500 + parser::FIXED_WRAP_QUANTUM);
        assert_eq!(decoder.stats().wraps, 1);
        assert_eq!(decoder.next_event(), DecodeResult::NoData);
    }

    #[test]
    fn test_fixed_wrap_reset_and_clamp() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Four));
        let mut raw = Vec::new();
        raw.extend_from_slice(&[0, 0, 0, 0x80]);
        raw.extend_from_slice(&fixed4(address(1, 1, false, 0), 100));
        raw.extend_from_slice(&[0, 0, 0, 0x40]);
        raw.extend_from_slice(&fixed4(address(2, 2, true, 0), 200));
        decoder.feed_raw(&raw);

        let first = decoder.next_event().event().copied().unwrap();
        assert_eq!(first.timestamp, 0x4000 + 100);
        assert_eq!(first.polarity, Polarity::Off);

        // The accumulator restarts but the emitted time never goes back.
        let second = decoder.next_event().event().copied().unwrap();
        assert_eq!(second.timestamp, first.timestamp);
        assert_eq!(decoder.stats().wrap_resets, 1);
    }

    #[test]
    fn test_fixed_partial_record_is_rescued() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Four));
        let record = fixed4(address(5, 6, true, 0), 42);
        decoder.feed_raw(&record[..3]);
        assert_eq!(decoder.next_event(), DecodeResult::NoData);
        assert_eq!(decoder.phase(), DecoderPhase::NeedSnapshot);

        decoder.feed_raw(&record[3..]);
        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.timestamp), (5, 42));
        assert_eq!(decoder.stats().rescued_bytes, 3);
    }

    #[test]
    fn test_fixed_eight_byte_records() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Eight));
        let mut raw = address(7, 8, true, 1).to_be_bytes().to_vec();
        raw.extend_from_slice(&123_456u32.to_be_bytes());
        decoder.feed_raw(&raw);

        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.y, event.eye), (7, 119, 1));
        assert_eq!(event.timestamp, 123_456);
    }

    #[test]
    fn test_fixed_bit15_reads_as_eye() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Four));
        decoder.feed_raw(&fixed4(address(3, 4, false, 1), 9));

        let result = decoder.next_event();
        assert!(matches!(result, DecodeResult::Event(_)));
        assert_eq!(result.event().map(|e| e.eye), Some(1));
        assert_eq!(decoder.stats().sync_markers, 0);
    }

    #[test]
    fn test_word_event_pair() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[0x8000_0064, address(30, 40, true, 1)]));

        let DecodeResult::Event(event) = decoder.next_event() else {
            panic!("expected an event");
        };
        assert_eq!((event.x, event.y, event.eye), (30, 40, 1));
        assert_eq!(event.timestamp, 100);
    }

    #[test]
    fn test_word_reuses_previous_timestamp() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[
            0x8000_0010,
            address(1, 1, true, 0),
            address(2, 2, true, 0),
        ]));

        assert_eq!(decoder.next_event().event().unwrap().timestamp, 0x10);
        let second = decoder.next_event().event().copied().unwrap();
        assert_eq!((second.x, second.timestamp), (2, 0x10));
    }

    #[test]
    fn test_word_wrap_marker() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[0x8800_0000, 0x8000_0005, address(3, 3, false, 0)]));

        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!(event.timestamp, parser::WORD_WRAP_QUANTUM + 5);
        assert_eq!(decoder.stats().wraps, 1);
    }

    #[test]
    fn test_word_sync_marker() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[0x8000_0001, 0x0001_0000 | address(4, 4, true, 0)]));

        let DecodeResult::SyncMarker(event) = decoder.next_event() else {
            panic!("expected a sync marker");
        };
        assert_eq!((event.x, event.y), (4, 4));
        assert_eq!(decoder.stats().sync_markers, 1);
    }

    #[test]
    fn test_word_malformed_address_is_retried() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[0x8000_0001, 0x8000_0002, address(9, 9, true, 0)]));

        assert_eq!(decoder.next_event(), DecodeResult::NoData);
        assert_eq!(decoder.current_cursor(), 4);
        assert_eq!(decoder.stats().malformed, 1);

        // The malformed word is re-read as a timestamp word.
        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.timestamp), (9, 2));
    }

    #[test]
    fn test_word_corrupted_address_is_skipped() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[
            0x8000_0001,
            0x0002_0000,
            0x8000_0003,
            address(6, 6, true, 0),
        ]));

        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.timestamp), (6, 3));
        assert_eq!(decoder.stats().corrupted, 1);
    }

    #[test]
    fn test_word_split_across_feeds() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        let raw = words(&[0x8000_0077, address(11, 12, true, 0)]);
        decoder.feed_raw(&raw[..6]);
        assert_eq!(decoder.next_event(), DecodeResult::NoData);

        decoder.feed_raw(&raw[6..]);
        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.y, event.timestamp), (11, 12, 0x77));
    }

    #[test]
    fn test_circular_rescue_across_rotation() {
        let mut decoder = AerDecoder::with_protocol(Protocol::WordCircular);
        let raw = words(&[0x8000_0001, address(1, 2, true, 0), 0x8000_0002, address(3, 4, true, 0)]);
        decoder.feed_raw(&raw[..12]);
        assert!(decoder.next_event().event().is_some());
        assert_eq!(decoder.next_event(), DecodeResult::NoData);

        decoder.feed_raw(&raw[12..]);
        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!((event.x, event.y, event.timestamp), (3, 4, 2));
    }

    #[test]
    fn test_circular_consumer_behind_keeps_every_address() {
        let mut decoder = AerDecoder::with_protocol(Protocol::WordCircular);
        let raw = words(&[
            0x8000_0001,
            address(1, 5, true, 0),
            0x8000_0002,
            address(2, 5, true, 0),
            0x8000_0003,
            address(3, 5, true, 0),
        ]);
        decoder.feed_raw(&raw[..12]);
        decoder.feed_raw(&raw[12..]);

        let mut events = Vec::new();
        decoder.drain(&mut events);

        // Slots drain newest first, so pairing across the split is not kept.
        let mut xs: Vec<u32> = events.iter().map(|e| e.x).collect();
        xs.sort_unstable();
        assert_eq!(xs, vec![1, 2, 3]);
        assert_eq!(decoder.stats().events, 3);
    }

    #[test]
    fn test_reset_discards_pending_data() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[
            0x8000_0001,
            address(1, 1, true, 0),
            0x8000_0002,
            address(2, 2, true, 0),
        ]));
        assert!(decoder.next_event().event().is_some());

        decoder.reset();
        assert_eq!(decoder.next_event(), DecodeResult::NoData);
        assert_eq!(decoder.phase(), DecoderPhase::Empty);
        assert_eq!(decoder.stats(), DecoderStats::default());
    }

    #[test]
    fn test_reshape_if_needed_compacts_fixed_snapshot() {
        let config = DecoderConfig {
            block_size: 8,
            ..DecoderConfig::for_protocol(Protocol::Fixed(RecordWidth::Four))
        };
        let mut decoder = AerDecoder::new(config).unwrap();
        let raw: Vec<u8> = (0..4)
            .flat_map(|i| fixed4(address(i, i, true, 0), i as u16))
            .collect();
        decoder.feed_raw(&raw);

        assert!(decoder.next_event().event().is_some());
        assert!(!decoder.reshape_if_needed());
        assert!(decoder.next_event().event().is_some());
        assert!(decoder.reshape_if_needed());
        assert_eq!(decoder.current_cursor(), 0);

        let event = decoder.next_event().event().copied().unwrap();
        assert_eq!(event.x, 2);
    }

    #[test]
    fn test_drain_continues_past_malformed_word() {
        let mut decoder = AerDecoder::with_protocol(Protocol::Word);
        decoder.feed_raw(&words(&[
            0x8000_0001,
            0x8000_0002,
            address(1, 1, true, 0),
            0x8000_0003,
            address(2, 2, true, 0),
        ]));

        let mut events = Vec::new();
        assert_eq!(decoder.drain(&mut events), 2);
        assert_eq!(events[1].timestamp, 3);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = DecoderConfig {
            bank_slots: 0,
            ..DecoderConfig::default()
        };
        assert!(matches!(
            AerDecoder::new(config),
            Err(ConfigError::ZeroBankSlots)
        ));

        let mut config = DecoderConfig::for_protocol(Protocol::Word);
        config.unmask.x_shift = 40;
        assert!(matches!(
            AerDecoder::new(config),
            Err(ConfigError::ShiftOutOfRange { field: "x", shift: 40 })
        ));
    }
}
