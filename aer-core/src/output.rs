//! Output format writers for decoded AER events.
//!
//! Supports CSV with a configurable field order and a packed binary format.

use crate::types::DecodedEvent;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output writing.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Format version written in binary headers.
const BINARY_VERSION: u32 = 1;

/// A single event field selectable for output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
    Polarity,
    Eye,
    Timestamp,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Polarity => "polarity",
            Self::Eye => "eye",
            Self::Timestamp => "timestamp",
        }
    }

    fn value(self, event: &DecodedEvent) -> i64 {
        match self {
            Self::X => event.x as i64,
            Self::Y => event.y as i64,
            Self::Polarity => event.polarity.as_i8() as i64,
            Self::Eye => event.eye as i64,
            Self::Timestamp => event.timestamp as i64,
        }
    }
}

/// Ordered, duplicate-free selection of fields for CSV output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOrder {
    fields: Vec<Field>,
}

impl Default for FieldOrder {
    /// x, y, p, t
    fn default() -> Self {
        Self {
            fields: vec![Field::X, Field::Y, Field::Polarity, Field::Timestamp],
        }
    }
}

impl std::str::FromStr for FieldOrder {
    type Err = OutputError;

    /// Parses a field order from a format string like "x,y,p,t" or "t,x,y,p,e".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Vec::with_capacity(5);

        for part in s.split(',').map(|p| p.trim().to_lowercase()) {
            let field = match part.as_str() {
                "x" => Field::X,
                "y" => Field::Y,
                "p" | "pol" | "polarity" => Field::Polarity,
                "e" | "eye" => Field::Eye,
                "t" | "time" | "timestamp" => Field::Timestamp,
                _ => {
                    return Err(OutputError::InvalidFormat(format!(
                        "Unknown field: {}. Use x, y, p, e, t",
                        part
                    )))
                }
            };

            if fields.contains(&field) {
                return Err(OutputError::InvalidFormat(format!(
                    "Duplicate field: {}",
                    part
                )));
            }
            fields.push(field);
        }

        Ok(Self { fields })
    }
}

impl FieldOrder {
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the CSV header line for this field order.
    pub fn header(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// CSV output writer for decoded events.
pub struct CsvWriter<W: Write> {
    writer: BufWriter<W>,
    field_order: FieldOrder,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(writer: W, field_order: FieldOrder) -> Self {
        Self {
            writer: BufWriter::new(writer),
            field_order,
        }
    }

    /// Writes the optional geometry line followed by the column header.
    pub fn write_header(&mut self, retinal_size: Option<u32>) -> Result<(), OutputError> {
        if let Some(size) = retinal_size {
            writeln!(self.writer, "%geometry:{},{}", size, size)?;
        }
        writeln!(self.writer, "{}", self.field_order.header())?;
        Ok(())
    }

    pub fn write_events(&mut self, events: &[DecodedEvent]) -> Result<(), OutputError> {
        for event in events {
            self.write_event(event)?;
        }
        Ok(())
    }

    #[inline]
    fn write_event(&mut self, event: &DecodedEvent) -> Result<(), OutputError> {
        for (i, field) in self.field_order.fields.iter().enumerate() {
            if i > 0 {
                self.writer.write_all(b",")?;
            }
            write!(self.writer, "{}", field.value(event))?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Binary output format for decoded events.
///
/// Header: magic `AERBIN\0\0`, version (u32), retinal size (u32), event count (u64).
/// Each event is a little-endian 16-byte record:
/// - x: u32
/// - y: u32
/// - polarity: i8
/// - eye: u8
/// - padding: 2 bytes
/// - timestamp: u32
pub struct BinaryWriter<W: Write> {
    writer: BufWriter<W>,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
        }
    }

    pub fn write_header(&mut self, retinal_size: u32, event_count: u64) -> Result<(), OutputError> {
        self.writer.write_all(b"AERBIN\0\0")?;
        self.writer.write_all(&BINARY_VERSION.to_le_bytes())?;
        self.writer.write_all(&retinal_size.to_le_bytes())?;
        self.writer.write_all(&event_count.to_le_bytes())?;
        Ok(())
    }

    pub fn write_events(&mut self, events: &[DecodedEvent]) -> Result<(), OutputError> {
        for event in events {
            self.writer.write_all(&event.x.to_le_bytes())?;
            self.writer.write_all(&event.y.to_le_bytes())?;
            self.writer
                .write_all(&[event.polarity.as_i8() as u8, event.eye, 0, 0])?;
            self.writer.write_all(&event.timestamp.to_le_bytes())?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes events to a CSV file.
pub fn write_csv<P: AsRef<Path>>(
    path: P,
    events: &[DecodedEvent],
    retinal_size: Option<u32>,
    field_order: FieldOrder,
) -> Result<(), OutputError> {
    let file = File::create(path)?;
    let mut writer = CsvWriter::new(file, field_order);
    writer.write_header(retinal_size)?;
    writer.write_events(events)?;
    writer.flush()?;
    Ok(())
}

/// Writes events to a binary file.
pub fn write_binary<P: AsRef<Path>>(
    path: P,
    events: &[DecodedEvent],
    retinal_size: u32,
) -> Result<(), OutputError> {
    let file = File::create(path)?;
    let mut writer = BinaryWriter::new(file);
    writer.write_header(retinal_size, events.len() as u64)?;
    writer.write_events(events)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Polarity;
    use std::str::FromStr;

    #[test]
    fn test_field_order_parsing() {
        assert_eq!(FieldOrder::from_str("x,y,p,t").unwrap(), FieldOrder::default());
        assert_eq!(
            FieldOrder::from_str("T, X, Y, P, E").unwrap().fields(),
            &[Field::Timestamp, Field::X, Field::Y, Field::Polarity, Field::Eye]
        );
        assert_eq!(FieldOrder::from_str("t").unwrap().header(), "timestamp");
    }

    #[test]
    fn test_field_order_invalid() {
        assert!(FieldOrder::from_str("x,y,z,t").is_err());
        assert!(FieldOrder::from_str("x,x,y,t").is_err());
        assert!(FieldOrder::from_str("").is_err());
    }

    #[test]
    fn test_csv_writer() {
        let mut output = Vec::new();
        {
            let mut writer = CsvWriter::new(&mut output, FieldOrder::default());
            writer.write_header(Some(128)).unwrap();
            writer
                .write_events(&[
                    DecodedEvent::new(100, 20, Polarity::On, 0, 12345),
                    DecodedEvent::new(101, 21, Polarity::Off, 1, 12346),
                ])
                .unwrap();
            writer.flush().unwrap();
        }

        let output_str = String::from_utf8(output).unwrap();
        let lines: Vec<_> = output_str.lines().collect();
        assert_eq!(lines[0], "%geometry:128,128");
        assert_eq!(lines[1], "x,y,polarity,timestamp");
        assert_eq!(lines[2], "100,20,1,12345");
        assert_eq!(lines[3], "101,21,-1,12346");
    }

    #[test]
    fn test_csv_writer_custom_order() {
        let mut output = Vec::new();
        {
            let order = FieldOrder::from_str("t,e,x").unwrap();
            let mut writer = CsvWriter::new(&mut output, order);
            writer
                .write_events(&[DecodedEvent::new(7, 8, Polarity::On, 1, 99)])
                .unwrap();
            writer.flush().unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "99,1,7\n");
    }

    #[test]
    fn test_binary_writer_layout() {
        let mut output = Vec::new();
        {
            let mut writer = BinaryWriter::new(&mut output);
            writer.write_header(128, 1).unwrap();
            writer
                .write_events(&[DecodedEvent::new(1, 2, Polarity::Off, 1, 0x0A0B0C0D)])
                .unwrap();
            writer.flush().unwrap();
        }

        assert_eq!(output.len(), 24 + 16);
        assert_eq!(&output[0..8], b"AERBIN\0\0");
        let record = &output[24..];
        assert_eq!(&record[0..4], &1u32.to_le_bytes());
        assert_eq!(&record[4..8], &2u32.to_le_bytes());
        assert_eq!(record[8] as i8, -1);
        assert_eq!(record[9], 1);
        assert_eq!(&record[12..16], &0x0A0B0C0Du32.to_le_bytes());
    }
}
