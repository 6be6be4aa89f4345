//! # Intel HEX Stream Decoder
//!
//! A streaming decoder for the Intel HEX format, the line-oriented ASCII
//! encoding used for firmware images and memory dumps.
//!
//! Input is consumed one byte at a time, so it can be fed from a file, a
//! socket or any chunked source without buffering whole lines. This library
//! provides:
//!
//! - A validating record decoder with extended segment and extended linear
//!   address reconstruction
//! - Delivery of data records to a caller-supplied consumer
//! - A record encoder and checksum helpers
//! - Decoding statistics
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support
//!
//! ## Example
//!
//! ```
//! use ihex_stream::Decoder;
//!
//! let mut image = vec![0xFFu8; 0x40];
//! {
//!     let mut decoder = Decoder::new();
//!     decoder.register_consumer(|address: u32, payload: &[u8]| {
//!         let start = address as usize;
//!         match image.get_mut(start..start + payload.len()) {
//!             Some(dst) => {
//!                 dst.copy_from_slice(payload);
//!                 true
//!             }
//!             None => false,
//!         }
//!     });
//!     assert!(decoder.feed(b":0300300002337A1E\r\n:00000001FF\r\n"));
//! }
//! assert_eq!(&image[0x30..0x33], &[0x02, 0x33, 0x7A]);
//! ```

pub mod core;
pub mod decoder;
pub mod encoding;
pub mod error;
pub mod stats;
pub mod stream;

pub use crate::core::{AddressingMode, RecordEvent, RecordType};
pub use decoder::{DataSink, Decoder, DecoderBuilder, FeedStatus};
pub use encoding::RecordEncoder;
pub use error::{DecodeError, Result, StreamError};
pub use stats::DecoderStats;
pub use stream::decode_reader;

/// Intel HEX format constants
pub mod format {
    /// Marker opening every record
    pub const START_CODE: u8 = b':';

    /// Byte that ends input processing when fed
    pub const END_OF_INPUT: u8 = 0x00;

    /// Largest payload a one-byte count field can declare
    pub const MAX_PAYLOAD: usize = 255;
}
