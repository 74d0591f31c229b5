//! Decoder configuration: protocol variant, record width and the address
//! unmask table.

use std::str::FromStr;
use thiserror::Error;

/// Default ingest block size in bytes.
pub const DEFAULT_BLOCK_SIZE: usize = 65536;

/// Default number of slots in a circular ingest bank.
pub const DEFAULT_BANK_SLOTS: usize = 3;

/// Errors raised while building a decoder configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported record width: {0} bytes (expected 4, 6 or 8)")]
    RecordWidth(usize),

    #[error("Block size must be greater than zero")]
    ZeroBlockSize,

    #[error("A circular bank needs at least one slot")]
    ZeroBankSlots,

    #[error("Retinal size must be greater than zero")]
    ZeroRetinalSize,

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),

    #[error("Shift for {field} must be below 32, got {shift}")]
    ShiftOutOfRange { field: &'static str, shift: u32 },
}

/// Record width of the fixed-size protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordWidth {
    /// 16-bit address, 16-bit timestamp (little-endian, wrap markers)
    Four,
    /// 16-bit address, 32-bit timestamp (big-endian)
    Six,
    /// 32-bit address, 32-bit timestamp (big-endian)
    Eight,
}

impl RecordWidth {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            Self::Four => 4,
            Self::Six => 6,
            Self::Eight => 8,
        }
    }
}

impl TryFrom<usize> for RecordWidth {
    type Error = ConfigError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            6 => Ok(Self::Six),
            8 => Ok(Self::Eight),
            other => Err(ConfigError::RecordWidth(other)),
        }
    }
}

/// Wire protocol decoded by a [`crate::AerDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Fixed-width `[address][timestamp]` records fed through a single buffer.
    Fixed(RecordWidth),
    /// 32-bit word stream fed through a single buffer.
    Word,
    /// 32-bit word stream fed through a circular bank of buffers.
    WordCircular,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::Fixed(RecordWidth::Four)
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dvs128" | "fixed4" => Ok(Self::Fixed(RecordWidth::Four)),
            "fixed6" => Ok(Self::Fixed(RecordWidth::Six)),
            "fixed8" => Ok(Self::Fixed(RecordWidth::Eight)),
            "icub" | "word" => Ok(Self::Word),
            "icub-circular" | "word-circular" => Ok(Self::WordCircular),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}

/// Mask/shift table that turns an address field into coordinates.
///
/// Each field is extracted as `(address & mask) >> shift`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmaskConfig {
    pub x_mask: u32,
    pub x_shift: u32,
    pub y_mask: u32,
    pub y_shift: u32,
    pub polarity_mask: u32,
    pub polarity_shift: u32,
    pub eye_mask: u32,
    pub eye_shift: u32,
    /// Side length of the (square) pixel array, used to mirror y.
    pub retinal_size: u32,
}

impl Default for UnmaskConfig {
    fn default() -> Self {
        // 128x128 DVS128 / iCub address layout
        Self {
            x_mask: 0x0000_00FE,
            x_shift: 1,
            y_mask: 0x0000_7F00,
            y_shift: 8,
            polarity_mask: 0x0000_0001,
            polarity_shift: 0,
            eye_mask: 0x0000_8000,
            eye_shift: 15,
            retinal_size: 128,
        }
    }
}

impl UnmaskConfig {
    /// Largest valid row index.
    #[inline]
    pub fn max_y(&self) -> u32 {
        self.retinal_size.saturating_sub(1)
    }

    /// Rejects shifts that do not fit a 32-bit address.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let shifts = [
            ("x", self.x_shift),
            ("y", self.y_shift),
            ("polarity", self.polarity_shift),
            ("eye", self.eye_shift),
        ];
        match shifts.into_iter().find(|&(_, shift)| shift >= u32::BITS) {
            Some((field, shift)) => Err(ConfigError::ShiftOutOfRange { field, shift }),
            None => Ok(()),
        }
    }
}

/// Full decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub protocol: Protocol,
    pub unmask: UnmaskConfig,
    /// Growth increment of ingest buffers, in bytes.
    pub block_size: usize,
    /// Number of slots when `protocol` is [`Protocol::WordCircular`].
    pub bank_slots: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            unmask: UnmaskConfig::default(),
            block_size: DEFAULT_BLOCK_SIZE,
            bank_slots: DEFAULT_BANK_SLOTS,
        }
    }
}

impl DecoderConfig {
    /// Default configuration for the given protocol.
    pub fn for_protocol(protocol: Protocol) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    /// Checks the configuration for values the decoder cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        if self.bank_slots == 0 {
            return Err(ConfigError::ZeroBankSlots);
        }
        if self.unmask.retinal_size == 0 {
            return Err(ConfigError::ZeroRetinalSize);
        }
        self.unmask.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_width_try_from() {
        assert_eq!(RecordWidth::try_from(4), Ok(RecordWidth::Four));
        assert_eq!(RecordWidth::try_from(6), Ok(RecordWidth::Six));
        assert_eq!(RecordWidth::try_from(8), Ok(RecordWidth::Eight));
        assert_eq!(RecordWidth::try_from(5), Err(ConfigError::RecordWidth(5)));
    }

    #[test]
    fn test_protocol_parsing() {
        assert_eq!(
            "dvs128".parse::<Protocol>(),
            Ok(Protocol::Fixed(RecordWidth::Four))
        );
        assert_eq!(
            "FIXED8".parse::<Protocol>(),
            Ok(Protocol::Fixed(RecordWidth::Eight))
        );
        assert_eq!("icub".parse::<Protocol>(), Ok(Protocol::Word));
        assert_eq!(
            "icub-circular".parse::<Protocol>(),
            Ok(Protocol::WordCircular)
        );
        assert!("evt3".parse::<Protocol>().is_err());
    }

    #[test]
    fn test_validate() {
        assert!(DecoderConfig::default().validate().is_ok());

        let mut config = DecoderConfig::default();
        config.block_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBlockSize));

        let mut config = DecoderConfig::for_protocol(Protocol::WordCircular);
        config.bank_slots = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroBankSlots));

        let mut config = DecoderConfig::for_protocol(Protocol::Word);
        config.unmask.x_shift = 40;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ShiftOutOfRange {
                field: "x",
                shift: 40
            })
        );

        let mut config = DecoderConfig::default();
        config.unmask.eye_shift = 32;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ShiftOutOfRange { field: "eye", .. })
        ));
        config.unmask.eye_shift = 31;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_unmask_max_y() {
        assert_eq!(UnmaskConfig::default().max_y(), 127);
    }
}
