//! Error types for Intel HEX decoding

use thiserror::Error;

/// Result type for Intel HEX operations
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Reasons a record, and with it the current feed, was rejected
///
/// Every variant carries `offset`, the number of bytes consumed since the
/// decoder was last reset, counting the offending byte.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DecodeError {
    /// A byte other than `:` or a line terminator between records
    #[error("Invalid start code 0x{byte:02X} at offset {offset}")]
    InvalidStartCode { byte: u8, offset: u64 },

    /// A byte that is not a hexadecimal digit inside a record
    #[error("Invalid hex digit 0x{byte:02X} at offset {offset}")]
    InvalidHexDigit { byte: u8, offset: u64 },

    /// Record type with a nonzero high nibble or an unknown code
    #[error("Unsupported record type 0x{code:02X} at offset {offset}")]
    UnsupportedRecordType { code: u8, offset: u64 },

    /// Declared byte count does not fit the payload buffer
    #[error("Payload of {declared} bytes exceeds capacity of {capacity} at offset {offset}")]
    PayloadTooLarge {
        declared: usize,
        capacity: usize,
        offset: u64,
    },

    /// Declared byte count disagrees with the payload actually received
    #[error("Byte count {declared} does not match {received} received nibbles at offset {offset}")]
    PayloadLengthMismatch {
        declared: u8,
        received: usize,
        offset: u64,
    },

    /// Record bytes do not sum to zero
    #[error("Checksum mismatch: found 0x{found:02X}, expected 0x{expected:02X} at offset {offset}")]
    ChecksumMismatch { found: u8, expected: u8, offset: u64 },

    /// The registered consumer refused a data block
    #[error("Consumer rejected {length} bytes at 0x{address:08X} (offset {offset})")]
    ConsumerRejected {
        address: u32,
        length: usize,
        offset: u64,
    },
}

impl DecodeError {
    /// Create a new InvalidStartCode error
    pub fn invalid_start_code(byte: u8, offset: u64) -> Self {
        DecodeError::InvalidStartCode { byte, offset }
    }

    /// Create a new InvalidHexDigit error
    pub fn invalid_hex_digit(byte: u8, offset: u64) -> Self {
        DecodeError::InvalidHexDigit { byte, offset }
    }

    /// Create a new UnsupportedRecordType error
    pub fn unsupported_record_type(code: u8, offset: u64) -> Self {
        DecodeError::UnsupportedRecordType { code, offset }
    }

    /// Create a new PayloadTooLarge error
    pub fn payload_too_large(declared: usize, capacity: usize, offset: u64) -> Self {
        DecodeError::PayloadTooLarge {
            declared,
            capacity,
            offset,
        }
    }

    /// Stream offset at which the failure was detected
    pub fn offset(&self) -> u64 {
        match *self {
            DecodeError::InvalidStartCode { offset, .. }
            | DecodeError::InvalidHexDigit { offset, .. }
            | DecodeError::UnsupportedRecordType { offset, .. }
            | DecodeError::PayloadTooLarge { offset, .. }
            | DecodeError::PayloadLengthMismatch { offset, .. }
            | DecodeError::ChecksumMismatch { offset, .. }
            | DecodeError::ConsumerRejected { offset, .. } => offset,
        }
    }
}

/// Errors occurring while feeding a decoder from a reader
#[derive(Error, Debug)]
pub enum StreamError {
    /// An error from the supplied reader
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The stream contained an invalid record
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DecodeError::invalid_hex_digit(b'G', 4);
        assert!(err.to_string().contains("Invalid hex digit 0x47"));

        let err = DecodeError::ChecksumMismatch {
            found: 0xFE,
            expected: 0xFF,
            offset: 11,
        };
        assert_eq!(
            err.to_string(),
            "Checksum mismatch: found 0xFE, expected 0xFF at offset 11"
        );
    }

    #[test]
    fn test_error_offset() {
        assert_eq!(DecodeError::invalid_start_code(b'x', 0).offset(), 0);
        assert_eq!(DecodeError::payload_too_large(64, 32, 9).offset(), 9);
    }

    #[test]
    fn test_stream_error_wraps_decode() {
        let err: StreamError = DecodeError::unsupported_record_type(0x06, 8).into();
        assert!(matches!(err, StreamError::Decode(_)));
        assert!(err.to_string().contains("Unsupported record type 0x06"));
    }
}
