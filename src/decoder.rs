//! Streaming record decoder
//!
//! [`Decoder`] is a finite-state machine advanced by exactly one input byte at
//! a time. It never buffers whole lines: each record is validated as its
//! checksum byte arrives, after which address records update the sticky
//! addressing state and data records are handed to the registered
//! [`DataSink`] with their absolute address.

use crate::core::{AddressingMode, RecordEvent, RecordType};
use crate::encoding::{hex_nibble, Checksum};
use crate::error::{DecodeError, Result};
use crate::format;
use crate::stats::DecoderStats;

/// Receiver for validated data records
pub trait DataSink {
    /// Accept `payload` destined for `address`; returning `false` aborts the feed
    fn on_data(&mut self, address: u32, payload: &[u8]) -> bool;
}

impl<F> DataSink for F
where
    F: FnMut(u32, &[u8]) -> bool,
{
    fn on_data(&mut self, address: u32, payload: &[u8]) -> bool {
        self(address, payload)
    }
}

/// How a successful feed ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Every byte was consumed
    Consumed,
    /// A NUL byte at index `at` ended input early
    Terminated { at: usize },
}

/// Hexadecimal fields of a record, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ByteCount,
    AddressHigh,
    AddressLow,
    RecordType,
    Data,
    Checksum,
}

/// Position in the record grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between records, waiting for `:`
    StartCode,
    /// Inside a record, assembling hex pairs for a field
    Field(Field),
}

/// Intel HEX stream decoder
pub struct Decoder<'a> {
    capacity: usize,
    lowercase: bool,

    state: State,
    high_nibble: Option<u8>,
    checksum: Checksum,
    byte_count: u8,
    address_low: u16,
    address_high: u16,
    mode: AddressingMode,
    record_type: RecordType,
    payload: Box<[u8]>,
    payload_nibbles: usize,

    consumer: Option<Box<dyn DataSink + 'a>>,

    offset: u64,
    last_record: Option<RecordType>,
    last_address: u32,
    stats: DecoderStats,
}

impl<'a> Decoder<'a> {
    /// Create a decoder with the full 255-byte payload capacity
    pub fn new() -> Self {
        DecoderBuilder::new().build()
    }

    /// Return to the initial state ahead of a new logical file
    ///
    /// Addressing state, stream offset and statistics are cleared. The
    /// registered consumer is kept.
    pub fn reset(&mut self) {
        self.state = State::StartCode;
        self.high_nibble = None;
        self.checksum = Checksum::new();
        self.address_low = 0;
        self.address_high = 0;
        self.mode = AddressingMode::default();
        self.offset = 0;
        self.last_record = None;
        self.stats = DecoderStats::default();
    }

    /// Install the receiver for data records, replacing any previous one
    pub fn register_consumer<S: DataSink + 'a>(&mut self, sink: S) {
        self.consumer = Some(Box::new(sink));
    }

    /// Stop delivering data records; they are still validated
    pub fn unregister_consumer(&mut self) {
        self.consumer = None;
    }

    /// Feed bytes, returning `false` on the first invalid record
    pub fn feed(&mut self, bytes: &[u8]) -> bool {
        self.try_feed(bytes).is_ok()
    }

    /// Feed bytes, reporting why decoding stopped
    ///
    /// A NUL byte ends processing successfully, even mid-record. After an
    /// error the decoder is left where the failure occurred; call
    /// [`reset`](Self::reset) before decoding further input.
    pub fn try_feed(&mut self, bytes: &[u8]) -> Result<FeedStatus> {
        for (at, &c) in bytes.iter().enumerate() {
            if c == format::END_OF_INPUT {
                return Ok(FeedStatus::Terminated { at });
            }
            self.offset += 1;
            if let Err(err) = self.advance(c) {
                self.stats.record_error(&err);
                return Err(err);
            }
        }
        Ok(FeedStatus::Consumed)
    }

    /// Bytes consumed since the last reset
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether the decoder is between records
    pub fn is_idle(&self) -> bool {
        self.state == State::StartCode
    }

    /// Whether an end of file record has been accepted since the last reset
    pub fn eof_seen(&self) -> bool {
        self.stats.eof_seen
    }

    /// Current addressing mode
    pub fn addressing_mode(&self) -> AddressingMode {
        self.mode
    }

    /// Upper address bits set by the last extended address record
    pub fn address_high(&self) -> u16 {
        self.address_high
    }

    /// Payload capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Counters collected since the last reset
    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }

    /// The most recently accepted record, while no newer record is in progress
    pub fn last_event(&self) -> Option<RecordEvent> {
        let record_type = self.last_record?;
        let event = match record_type {
            RecordType::Data => RecordEvent::Data {
                address: self.last_address,
                payload: self.payload[..self.payload_nibbles >> 1].to_vec(),
            },
            RecordType::EndOfFile => RecordEvent::EndOfFile,
            RecordType::ExtendedSegmentAddress => RecordEvent::ExtendedSegmentAddress {
                base: self.mode.absolute(self.address_high, 0),
            },
            RecordType::StartSegmentAddress => RecordEvent::StartSegmentAddress,
            RecordType::ExtendedLinearAddress => RecordEvent::ExtendedLinearAddress {
                base: self.mode.absolute(self.address_high, 0),
            },
            RecordType::StartLinearAddress => RecordEvent::StartLinearAddress,
            RecordType::Custom => RecordEvent::Custom,
        };
        Some(event)
    }

    /// Advance the state machine by one input byte
    fn advance(&mut self, c: u8) -> Result<()> {
        let state = self.state;
        self.state = match state {
            State::StartCode => self.on_start_code(c)?,
            State::Field(field) => match self.assemble(field, c)? {
                Some(byte) => {
                    self.checksum.push(byte);
                    self.on_byte(field, byte)?
                }
                None => State::Field(field),
            },
        };
        Ok(())
    }

    fn on_start_code(&mut self, c: u8) -> Result<State> {
        match c {
            b'\r' | b'\n' => Ok(State::StartCode),
            format::START_CODE => {
                self.high_nibble = None;
                self.checksum = Checksum::new();
                self.byte_count = 0;
                self.address_low = 0;
                self.record_type = RecordType::Data;
                self.payload_nibbles = 0;
                self.last_record = None;
                Ok(State::Field(Field::ByteCount))
            }
            _ => Err(DecodeError::invalid_start_code(c, self.offset)),
        }
    }

    /// Decode one hex digit, yielding a byte once both nibbles have arrived
    fn assemble(&mut self, field: Field, c: u8) -> Result<Option<u8>> {
        let nibble = hex_nibble(c, self.lowercase)
            .ok_or_else(|| DecodeError::invalid_hex_digit(c, self.offset))?;

        if field == Field::Data {
            self.payload_nibbles += 1;
        }

        match self.high_nibble.take() {
            Some(high) => Ok(Some((high << 4) | nibble)),
            None => {
                // Record type codes never exceed 0x0F.
                if field == Field::RecordType && nibble != 0 {
                    return Err(DecodeError::unsupported_record_type(
                        nibble << 4,
                        self.offset,
                    ));
                }
                self.high_nibble = Some(nibble);
                Ok(None)
            }
        }
    }

    fn on_byte(&mut self, field: Field, byte: u8) -> Result<State> {
        match field {
            Field::ByteCount => {
                self.byte_count = byte;
                Ok(State::Field(Field::AddressHigh))
            }
            Field::AddressHigh => {
                self.address_low = (byte as u16) << 8;
                Ok(State::Field(Field::AddressLow))
            }
            Field::AddressLow => {
                self.address_low |= byte as u16;
                Ok(State::Field(Field::RecordType))
            }
            Field::RecordType => self.on_record_type(byte),
            Field::Data => self.on_data(byte),
            Field::Checksum => self.on_checksum(byte),
        }
    }

    fn on_record_type(&mut self, code: u8) -> Result<State> {
        self.record_type = RecordType::try_from(code)
            .map_err(|_| DecodeError::unsupported_record_type(code, self.offset))?;

        if self.byte_count == 0 {
            Ok(State::Field(Field::Checksum))
        } else if self.byte_count as usize > self.capacity {
            Err(DecodeError::payload_too_large(
                self.byte_count as usize,
                self.capacity,
                self.offset,
            ))
        } else {
            Ok(State::Field(Field::Data))
        }
    }

    fn on_data(&mut self, byte: u8) -> Result<State> {
        let written = self.payload_nibbles >> 1;
        self.payload[written - 1] = byte;

        if written >= self.byte_count as usize {
            Ok(State::Field(Field::Checksum))
        } else {
            Ok(State::Field(Field::Data))
        }
    }

    fn on_checksum(&mut self, found: u8) -> Result<State> {
        // Unreachable while DATA exits on the declared count; guards the invariant.
        if (self.byte_count as usize) * 2 != self.payload_nibbles {
            return Err(DecodeError::PayloadLengthMismatch {
                declared: self.byte_count,
                received: self.payload_nibbles,
                offset: self.offset,
            });
        }

        if !self.checksum.is_valid() {
            return Err(DecodeError::ChecksumMismatch {
                found,
                expected: found.wrapping_sub(self.checksum.value()),
                offset: self.offset,
            });
        }

        self.commit()?;
        Ok(State::StartCode)
    }

    /// Apply the side effects of a validated record
    fn commit(&mut self) -> Result<()> {
        let length = self.payload_nibbles >> 1;

        match self.record_type {
            RecordType::ExtendedSegmentAddress => {
                self.address_high = self.payload_word(length);
                self.mode = AddressingMode::Segmented;
            }
            RecordType::ExtendedLinearAddress => {
                self.address_high = self.payload_word(length);
                self.mode = AddressingMode::Linear;
            }
            RecordType::Data => {
                let address = self.mode.absolute(self.address_high, self.address_low);
                self.last_address = address;
                if let Some(consumer) = self.consumer.as_mut() {
                    if !consumer.on_data(address, &self.payload[..length]) {
                        return Err(DecodeError::ConsumerRejected {
                            address,
                            length,
                            offset: self.offset,
                        });
                    }
                    self.stats.record_delivery(length);
                }
            }
            RecordType::EndOfFile
            | RecordType::StartSegmentAddress
            | RecordType::StartLinearAddress
            | RecordType::Custom => {}
        }

        self.stats.record_success(self.record_type);
        self.last_record = Some(self.record_type);
        Ok(())
    }

    /// First two payload bytes as a big-endian word, missing bytes read as zero
    fn payload_word(&self, length: usize) -> u16 {
        let payload = &self.payload[..length];
        let hi = payload.first().copied().unwrap_or(0);
        let lo = payload.get(1).copied().unwrap_or(0);
        u16::from_be_bytes([hi, lo])
    }
}

impl Default for Decoder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Decoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("capacity", &self.capacity)
            .field("state", &self.state)
            .field("mode", &self.mode)
            .field("address_high", &self.address_high)
            .field("offset", &self.offset)
            .field("has_consumer", &self.consumer.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for configuring a [`Decoder`]
pub struct DecoderBuilder {
    capacity: usize,
    lowercase: bool,
}

impl DecoderBuilder {
    /// Create a new decoder builder
    pub fn new() -> Self {
        DecoderBuilder {
            capacity: format::MAX_PAYLOAD,
            lowercase: true,
        }
    }

    /// Set the payload capacity, clamped to 255 bytes
    ///
    /// Records declaring a larger byte count are rejected.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.min(format::MAX_PAYLOAD);
        self
    }

    /// Accept or reject lowercase hex digits `a`-`f`
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    /// Build the decoder, allocating its payload buffer
    pub fn build<'a>(self) -> Decoder<'a> {
        Decoder {
            capacity: self.capacity,
            lowercase: self.lowercase,
            state: State::StartCode,
            high_nibble: None,
            checksum: Checksum::new(),
            byte_count: 0,
            address_low: 0,
            address_high: 0,
            mode: AddressingMode::default(),
            record_type: RecordType::Data,
            payload: vec![0u8; self.capacity].into_boxed_slice(),
            payload_nibbles: 0,
            consumer: None,
            offset: 0,
            last_record: None,
            last_address: 0,
            stats: DecoderStats::default(),
        }
    }
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
