//! Error type shared by key material parsing and envelope operations.

/// Errors from building key material or sealing/opening envelopes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    /// A configuration input had the wrong size or could not be used.
    #[error("invalid {field}: {reason}")]
    InvalidParameters { field: &'static str, reason: String },
    /// The authentication tag did not match; no plaintext was released.
    #[error("authentication failed")]
    AuthenticationFailed,
    /// The envelope is too short to hold a nonce and a tag.
    #[error("malformed envelope: {len} bytes, need at least {min}")]
    Malformed { len: usize, min: usize },
}

impl CryptoError {
    /// Length mismatch for a fixed-size input.
    pub(crate) fn length(field: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidParameters {
            field,
            reason: format!("expected {expected} bytes, got {actual}"),
        }
    }
}
