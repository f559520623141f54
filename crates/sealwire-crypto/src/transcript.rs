//! Canonical byte encoding for KDF info strings and associated data.
//!
//! Each field is written as `tag (u32 BE) || len (u32 BE) || bytes`, with the
//! domain label stored first under tag 0, so the same logical inputs always
//! encode to the same bytes on both ends of a channel.

use bytes::{BufMut, BytesMut};

/// Field tags used by the envelope format.
pub mod tags {
    pub const DOMAIN: u32 = 0;
    pub const SENDER: u32 = 1;
    pub const RECEIVER: u32 = 2;
    pub const NONCE: u32 = 3;
}

/// Append-only tagged transcript.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    buf: BytesMut,
}

impl Transcript {
    /// Create a new transcript with the given domain separator.
    pub fn new(domain: &'static str) -> Self {
        let mut t = Self {
            buf: BytesMut::with_capacity(128),
        };
        t.append_bytes(tags::DOMAIN, domain.as_bytes());
        t
    }

    /// Append raw bytes with a tag.
    pub fn append_bytes(&mut self, tag: u32, data: &[u8]) -> &mut Self {
        self.buf.put_u32(tag);
        self.buf.put_u32(data.len() as u32);
        self.buf.extend_from_slice(data);
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
