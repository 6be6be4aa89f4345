//! Core types and structures for Intel HEX records

use crate::error::{DecodeError, Result};

/// Record type carried in the `TT` field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordType {
    /// Payload bytes for the current address
    Data = 0x00,
    /// End of file
    EndOfFile = 0x01,
    /// Sets the segment base (bits 4-19) used by following data records
    ExtendedSegmentAddress = 0x02,
    /// CS:IP start address for 80x86 targets
    StartSegmentAddress = 0x03,
    /// Sets the upper 16 bits of the address used by following data records
    ExtendedLinearAddress = 0x04,
    /// EIP start address for 32-bit targets
    StartLinearAddress = 0x05,
    /// Tool-specific record, accepted and ignored
    Custom = 0x0E,
}

impl RecordType {
    /// Get the wire code of this record type
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Check if records of this type change the addressing state
    pub fn sets_address(&self) -> bool {
        matches!(
            self,
            RecordType::ExtendedSegmentAddress | RecordType::ExtendedLinearAddress
        )
    }
}

impl TryFrom<u8> for RecordType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(RecordType::Data),
            0x01 => Ok(RecordType::EndOfFile),
            0x02 => Ok(RecordType::ExtendedSegmentAddress),
            0x03 => Ok(RecordType::StartSegmentAddress),
            0x04 => Ok(RecordType::ExtendedLinearAddress),
            0x05 => Ok(RecordType::StartLinearAddress),
            0x0E => Ok(RecordType::Custom),
            _ => Err(DecodeError::unsupported_record_type(value, 0)),
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordType::Data => write!(f, "Data"),
            RecordType::EndOfFile => write!(f, "End Of File"),
            RecordType::ExtendedSegmentAddress => write!(f, "Extended Segment Address"),
            RecordType::StartSegmentAddress => write!(f, "Start Segment Address"),
            RecordType::ExtendedLinearAddress => write!(f, "Extended Linear Address"),
            RecordType::StartLinearAddress => write!(f, "Start Linear Address"),
            RecordType::Custom => write!(f, "Custom (0x0E)"),
        }
    }
}

/// How the sticky upper address combines with a record's 16-bit address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressingMode {
    /// `(high << 4) + low`, set by extended segment address records
    Segmented,
    /// `(high << 16) | low`, set by extended linear address records
    #[default]
    Linear,
}

impl AddressingMode {
    /// Combine upper and lower address parts into an absolute address
    pub fn absolute(&self, high: u16, low: u16) -> u32 {
        match self {
            AddressingMode::Segmented => ((high as u32) << 4) + low as u32,
            AddressingMode::Linear => ((high as u32) << 16) | low as u32,
        }
    }
}

impl std::fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressingMode::Segmented => write!(f, "Segmented"),
            AddressingMode::Linear => write!(f, "Linear"),
        }
    }
}

/// Outcome of the most recently accepted record
///
/// The `Display` output is a one-line trace suitable for debug printing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecordEvent {
    /// A data record at its absolute address
    Data { address: u32, payload: Vec<u8> },
    /// End of file record
    EndOfFile,
    /// New segment base, as the absolute address of offset zero
    ExtendedSegmentAddress { base: u32 },
    /// Start segment address record (payload not interpreted)
    StartSegmentAddress,
    /// New linear base, as the absolute address of offset zero
    ExtendedLinearAddress { base: u32 },
    /// Start linear address record (payload not interpreted)
    StartLinearAddress,
    /// Custom record (payload not interpreted)
    Custom,
}

impl std::fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordEvent::Data { address, payload } => {
                write!(f, "WriteData (0x{:08X}):", address)?;
                for byte in payload {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
            RecordEvent::EndOfFile => write!(f, "EOF"),
            RecordEvent::ExtendedSegmentAddress { base } => {
                write!(f, "Set Extended Segment Address:{:08X}", base)
            }
            RecordEvent::StartSegmentAddress => write!(f, "Start extended segment address"),
            RecordEvent::ExtendedLinearAddress { base } => {
                write!(f, "Set Linear Address:{:08X}", base)
            }
            RecordEvent::StartLinearAddress => write!(f, "Start linear address"),
            RecordEvent::Custom => write!(f, "Custom record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_conversion() -> Result<()> {
        assert_eq!(RecordType::try_from(0x04)?, RecordType::ExtendedLinearAddress);
        assert_eq!(RecordType::try_from(0x0E)?, RecordType::Custom);
        assert!(RecordType::try_from(0x06).is_err());
        assert!(RecordType::try_from(0x10).is_err());
        Ok(())
    }

    #[test]
    fn test_record_type_code() {
        assert_eq!(RecordType::StartLinearAddress.code(), 0x05);
        assert!(RecordType::ExtendedSegmentAddress.sets_address());
        assert!(!RecordType::StartSegmentAddress.sets_address());
    }

    #[test]
    fn test_addressing_mode_absolute() {
        assert_eq!(AddressingMode::Linear.absolute(0x1000, 0x0020), 0x1000_0020);
        assert_eq!(AddressingMode::Linear.absolute(0x0010, 0x0020), 0x0010_0020);
        assert_eq!(AddressingMode::Segmented.absolute(0x1000, 0x0020), 0x0001_0020);
        // Segment arithmetic carries past 16 bits.
        assert_eq!(AddressingMode::Segmented.absolute(0xFFFF, 0xFFFF), 0x0010_FFEF);
        assert_eq!(AddressingMode::default(), AddressingMode::Linear);
    }

    #[test]
    fn test_record_event_display() {
        let event = RecordEvent::Data {
            address: 0x0800_0010,
            payload: vec![0xDE, 0xAD, 0x01],
        };
        assert_eq!(event.to_string(), "WriteData (0x08000010):DEAD01");
        assert_eq!(
            RecordEvent::ExtendedLinearAddress { base: 0x0800_0000 }.to_string(),
            "Set Linear Address:08000000"
        );
        assert_eq!(RecordEvent::EndOfFile.to_string(), "EOF");
    }
}
