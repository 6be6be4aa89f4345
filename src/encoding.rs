//! Hexadecimal digit decoding, checksum arithmetic and record encoding

use crate::core::RecordType;
use crate::error::{DecodeError, Result};
use crate::format;

/// Decode a single ASCII hexadecimal digit into its nibble value
///
/// Uppercase digits are always accepted; lowercase `a`-`f` only when
/// `lowercase` is set.
pub fn hex_nibble(c: u8, lowercase: bool) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 0xA),
        b'a'..=b'f' if lowercase => Some(c - b'a' + 0xA),
        _ => None,
    }
}

/// Running mod-256 sum of the bytes of one record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Checksum(u8);

impl Checksum {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Checksum(0)
    }

    /// Fold one decoded byte into the sum
    pub fn push(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    /// Get the current sum
    pub fn value(&self) -> u8 {
        self.0
    }

    /// A complete record, checksum byte included, sums to zero
    pub fn is_valid(&self) -> bool {
        self.0 == 0
    }
}

/// Compute the two's-complement checksum byte for a record's bytes
///
/// `bytes` holds the byte count, both address bytes, the record type and
/// the payload, in wire order.
pub fn checksum(bytes: &[u8]) -> u8 {
    let mut sum = Checksum::new();
    for &byte in bytes {
        sum.push(byte);
    }
    0u8.wrapping_sub(sum.value())
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Encoder producing well-formed record lines
pub struct RecordEncoder;

impl RecordEncoder {
    /// Encode one record as `:BBAAAATT[DD...]CC` followed by CRLF
    pub fn encode(record_type: RecordType, address: u16, payload: &[u8]) -> Result<String> {
        if payload.len() > format::MAX_PAYLOAD {
            return Err(DecodeError::payload_too_large(
                payload.len(),
                format::MAX_PAYLOAD,
                0,
            ));
        }
        Ok(Self::line(record_type, address, payload))
    }

    /// Encode a data record
    pub fn data(address: u16, payload: &[u8]) -> Result<String> {
        Self::encode(RecordType::Data, address, payload)
    }

    /// Encode the end of file record, always `:00000001FF`
    pub fn end_of_file() -> String {
        Self::line(RecordType::EndOfFile, 0, &[])
    }

    /// Encode an extended segment address record for `segment`
    pub fn extended_segment_address(segment: u16) -> String {
        Self::line(
            RecordType::ExtendedSegmentAddress,
            0,
            &segment.to_be_bytes(),
        )
    }

    /// Encode an extended linear address record for the upper 16 bits `high`
    pub fn extended_linear_address(high: u16) -> String {
        Self::line(RecordType::ExtendedLinearAddress, 0, &high.to_be_bytes())
    }

    /// Payload must not exceed 255 bytes.
    fn line(record_type: RecordType, address: u16, payload: &[u8]) -> String {
        let mut bytes = Vec::with_capacity(payload.len() + 5);
        bytes.push(payload.len() as u8);
        bytes.extend_from_slice(&address.to_be_bytes());
        bytes.push(record_type.code());
        bytes.extend_from_slice(payload);
        bytes.push(checksum(&bytes));

        let mut line = String::with_capacity(bytes.len() * 2 + 3);
        line.push(format::START_CODE as char);
        for byte in bytes {
            line.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            line.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
        }
        line.push_str("\r\n");
        line
    }
}
