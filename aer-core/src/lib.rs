//! Streaming address-event (AER) decoder for neuromorphic vision sensors.
//!
//! This crate turns a continuous stream of raw bytes from a silicon retina
//! into decoded events `(x, y, polarity, eye, timestamp)` and groups decoded
//! events into short-lived spatiotemporal volumes.
//!
//! # Example
//!
//! ```
//! use aer_core::{AerDecoder, DecodeResult, Protocol, RecordWidth};
//!
//! let mut decoder = AerDecoder::with_protocol(Protocol::Fixed(RecordWidth::Four));
//! // x=10, y=20, ON, timestamp 500
//! decoder.feed_raw(&[0x15, 0x14, 0xF4, 0x01]);
//!
//! if let DecodeResult::Event(event) = decoder.next_event() {
//!     assert_eq!(event.x, 10);
//!     assert_eq!(event.y, 127 - 20);
//!     assert_eq!(event.timestamp, 500);
//! }
//! assert_eq!(decoder.next_event(), DecodeResult::NoData);
//! ```
//!
//! # Features
//!
//! - Non-blocking ingest: single growable buffer or circular bank of buffers
//! - Fixed-width (4, 6, 8 byte) and 32-bit word protocols
//! - Monotonic timestamp reconstruction across hardware counter wraps
//! - Snapshot rescue so no record is lost at a buffer boundary
//! - Volume stack with windowed lookup for downstream consumers
//! - CSV and binary output

pub mod bank;
pub mod buffer;
pub mod config;
pub mod decoder;
pub mod output;
pub mod parser;
pub mod snapshot;
pub mod types;
pub mod volume;

// Re-export commonly used types
pub use bank::CircularIngestBank;
pub use buffer::{RawBytes, RawIngestBuffer};
pub use config::{ConfigError, DecoderConfig, Protocol, RecordWidth, UnmaskConfig};
pub use decoder::{AerDecoder, DecodeError, RawFeeder};
pub use output::{FieldOrder, OutputError};
pub use snapshot::Snapshot;
pub use types::{DecodeResult, DecodeSummary, DecodedEvent, DecoderPhase, DecoderStats, Polarity};
pub use volume::{EventList, VolumeStack};
