//! Error types surfaced by `send` and `receive`.
//!
//! Transport, crypto and framing failures pass through unchanged so callers
//! can tell a dropped connection from a tampered frame.

use thiserror::Error;

use sealwire_crypto::CryptoError;
use sealwire_transport::{FramingError, TransportError};

/// Invalid channel configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_frame_len {value} is below the {min} byte envelope minimum")]
    MaxFrameLenTooSmall { value: usize, min: usize },

    #[error("max_frame_len {value} exceeds the {max} byte length prefix limit")]
    MaxFrameLenTooLarge { value: usize, max: usize },

    #[error("symmetric parameters were not provided")]
    MissingSymmetricParameters,
}

/// Any failure of a channel operation.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Framing(#[from] FramingError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// The peer or stream went away, possibly mid-frame.
    pub fn is_closed(&self) -> bool {
        matches!(self, ClientError::Transport(TransportError::Closed))
    }

    /// A complete frame arrived but failed authentication.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, ClientError::Crypto(CryptoError::AuthenticationFailed))
    }
}
