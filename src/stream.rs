//! Reader-based feeding

use std::io::{ErrorKind, Read};

use crate::decoder::{Decoder, FeedStatus};
use crate::error::StreamError;

/// Size of the chunks pulled from the reader
pub const CHUNK_SIZE: usize = 4096;

/// Feed a decoder from a reader until end of input or a NUL sentinel
///
/// Returns the number of bytes handed to the decoder, the sentinel excluded.
/// The decoder is not reset first.
pub fn decode_reader(r: &mut impl Read, decoder: &mut Decoder<'_>) -> Result<u64, StreamError> {
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut fed = 0u64;

    loop {
        let n = match r.read(&mut chunk) {
            Ok(0) => return Ok(fed),
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };

        match decoder.try_feed(&chunk[..n])? {
            FeedStatus::Consumed => fed += n as u64,
            FeedStatus::Terminated { at } => return Ok(fed + at as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use std::io::Cursor;

    #[test]
    fn test_decode_reader() -> Result<(), StreamError> {
        let mut blocks = Vec::new();
        {
            let mut decoder = Decoder::new();
            decoder.register_consumer(|address: u32, payload: &[u8]| {
                blocks.push((address, payload.to_vec()));
                true
            });
            let input = b":020000040800F2\r\n:0300300002337A1E\r\n:00000001FF\r\n";
            let fed = decode_reader(&mut Cursor::new(&input[..]), &mut decoder)?;
            assert_eq!(fed, input.len() as u64);
            assert!(decoder.eof_seen());
        }
        assert_eq!(blocks, vec![(0x0800_0030, vec![0x02, 0x33, 0x7A])]);
        Ok(())
    }

    #[test]
    fn test_decode_reader_sentinel() -> Result<(), StreamError> {
        let mut decoder = Decoder::new();
        let input = b":00000001FF\r\n\0garbage";
        let fed = decode_reader(&mut Cursor::new(&input[..]), &mut decoder)?;
        assert_eq!(fed, 13);
        Ok(())
    }

    #[test]
    fn test_decode_reader_spans_chunks() -> Result<(), StreamError> {
        let mut input = Vec::new();
        for _ in 0..1000 {
            input.extend_from_slice(b":0300300002337A1E\r\n");
        }
        let mut count = 0;
        {
            let mut decoder = Decoder::new();
            decoder.register_consumer(|_: u32, _: &[u8]| {
                count += 1;
                true
            });
            decode_reader(&mut Cursor::new(input), &mut decoder)?;
        }
        assert_eq!(count, 1000);
        Ok(())
    }

    #[test]
    fn test_decode_reader_error() {
        let mut decoder = Decoder::new();
        let result = decode_reader(&mut Cursor::new(&b":00000001FE\r\n"[..]), &mut decoder);
        assert!(matches!(
            result,
            Err(StreamError::Decode(DecodeError::ChecksumMismatch { .. }))
        ));
    }
}
