//! Decoding statistics

use crate::core::RecordType;
use crate::error::DecodeError;

/// Counters collected by a decoder since its last reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecoderStats {
    /// Records that passed validation
    pub records_accepted: u64,
    /// Records that failed validation or were refused by the consumer
    pub records_rejected: u64,
    /// Accepted data records
    pub data_records: u64,
    /// Accepted extended segment and extended linear address records
    pub address_records: u64,
    /// Accepted start segment, start linear and custom records
    pub other_records: u64,
    /// Payload bytes handed to the consumer
    pub bytes_delivered: u64,
    /// Whether an end of file record has been accepted
    pub eof_seen: bool,
    /// Most recent failure
    pub last_error: Option<DecodeError>,
}

impl DecoderStats {
    /// Record an accepted record of the given type
    pub fn record_success(&mut self, record_type: RecordType) {
        self.records_accepted += 1;
        match record_type {
            RecordType::Data => self.data_records += 1,
            RecordType::EndOfFile => self.eof_seen = true,
            t if t.sets_address() => self.address_records += 1,
            _ => self.other_records += 1,
        }
    }

    /// Record payload bytes accepted by the consumer
    pub fn record_delivery(&mut self, length: usize) {
        self.bytes_delivered += length as u64;
    }

    /// Record a rejected record
    pub fn record_error(&mut self, error: &DecodeError) {
        self.records_rejected += 1;
        self.last_error = Some(error.clone());
    }

    /// Ratio of rejected records to all completed or failed records
    pub fn error_rate(&self) -> f32 {
        let total = self.records_accepted + self.records_rejected;
        if total > 0 {
            self.records_rejected as f32 / total as f32
        } else {
            0.0
        }
    }

    /// Render the counters as JSON
    ///
    /// _Requires Cargo feature `serde`._
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_recording() {
        let mut stats = DecoderStats::default();
        stats.record_success(RecordType::ExtendedLinearAddress);
        stats.record_success(RecordType::Data);
        stats.record_delivery(16);
        stats.record_success(RecordType::ExtendedSegmentAddress);
        stats.record_success(RecordType::StartLinearAddress);
        stats.record_success(RecordType::EndOfFile);

        assert_eq!(stats.records_accepted, 5);
        assert_eq!(stats.other_records, 1);
        assert_eq!(stats.data_records, 1);
        assert_eq!(stats.address_records, 2);
        assert_eq!(stats.bytes_delivered, 16);
        assert!(stats.eof_seen);
        assert_eq!(stats.error_rate(), 0.0);
    }

    #[test]
    fn test_stats_error() {
        let mut stats = DecoderStats::default();
        let err = DecodeError::invalid_hex_digit(b'x', 3);
        stats.record_success(RecordType::Data);
        stats.record_error(&err);

        assert_eq!(stats.records_rejected, 1);
        assert_eq!(stats.last_error, Some(err));
        assert_eq!(stats.error_rate(), 0.5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_stats_json() -> serde_json::Result<()> {
        let mut stats = DecoderStats::default();
        stats.record_success(RecordType::EndOfFile);
        let json = stats.to_json()?;
        assert!(json.contains("\"eof_seen\":true"));
        Ok(())
    }
}
