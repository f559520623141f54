//! Length-prefixed framing for reliable message delimiting.
//!
//! Wire format:
//! ```text
//! +-----------------+------------------+
//! | LENGTH (4B BE)  | FRAME (N bytes)  |
//! +-----------------+------------------+
//! ```

use bytes::{Buf, BufMut};
use thiserror::Error;

/// Size of the length prefix on the wire.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Default upper bound on a single frame (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 1 << 24;

/// Framing error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FramingError {
    #[error("frame length {len} out of range (max: {max})")]
    LengthOutOfRange { len: usize, max: usize },

    #[error("truncated frame: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// Length-prefixed frame codec.
///
/// Declared lengths are checked against `min_frame_len..=max_frame_len`
/// before any buffer for the frame body exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthCodec {
    max_frame_len: usize,
    min_frame_len: usize,
}

impl LengthCodec {
    /// Create a new codec with the specified maximum frame size.
    ///
    /// The maximum is clamped to what a `u32` prefix can express.
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            max_frame_len: max_frame_len.min(u32::MAX as usize),
            min_frame_len: 0,
        }
    }

    /// Reject declared lengths below `min_frame_len` as truncated.
    pub fn with_min_frame_len(mut self, min_frame_len: usize) -> Self {
        self.min_frame_len = min_frame_len;
        self
    }

    pub fn max_frame_len(&self) -> usize {
        self.max_frame_len
    }

    pub fn min_frame_len(&self) -> usize {
        self.min_frame_len
    }

    /// Encode the prefix for a frame of `len` bytes.
    pub fn encode_prefix(&self, len: usize) -> Result<[u8; LENGTH_PREFIX_LEN], FramingError> {
        self.check_len(len)?;
        Ok((len as u32).to_be_bytes())
    }

    /// Decode and validate a received prefix.
    pub fn decode_prefix(&self, prefix: [u8; LENGTH_PREFIX_LEN]) -> Result<usize, FramingError> {
        let len = u32::from_be_bytes(prefix) as usize;
        self.check_len(len)?;
        Ok(len)
    }

    fn check_len(&self, len: usize) -> Result<(), FramingError> {
        if len > self.max_frame_len {
            return Err(FramingError::LengthOutOfRange {
                len,
                max: self.max_frame_len,
            });
        }
        if len < self.min_frame_len {
            return Err(FramingError::Truncated {
                expected: self.min_frame_len,
                actual: len,
            });
        }
        Ok(())
    }

    /// Encode data with length prefix.
    pub fn encode(&self, frame: &[u8]) -> Result<Vec<u8>, FramingError> {
        let prefix = self.encode_prefix(frame.len())?;
        let mut encoded = Vec::with_capacity(LENGTH_PREFIX_LEN + frame.len());
        encoded.put_slice(&prefix);
        encoded.extend_from_slice(frame);
        Ok(encoded)
    }

    /// Decode one frame from the front of `framed`.
    ///
    /// Returns the frame body and the number of bytes consumed.
    pub fn decode<'a>(&self, framed: &'a [u8]) -> Result<(&'a [u8], usize), FramingError> {
        if framed.len() < LENGTH_PREFIX_LEN {
            return Err(FramingError::Truncated {
                expected: LENGTH_PREFIX_LEN,
                actual: framed.len(),
            });
        }

        let mut buf = framed;
        let len = buf.get_u32() as usize;
        self.check_len(len)?;

        if buf.remaining() < len {
            return Err(FramingError::Truncated {
                expected: len,
                actual: buf.remaining(),
            });
        }

        Ok((&buf[..len], LENGTH_PREFIX_LEN + len))
    }
}

impl Default for LengthCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}
