//! Envelope cryptography for sealwire channels.
//!
//! Everything in this crate is pure: given the same identities, secret,
//! symmetric parameters and nonce, sealing produces the same bytes. Nonces
//! and any fresh key material come from the caller.

#![forbid(unsafe_code)]

pub mod error;
pub mod keys;
pub mod transcript;
pub mod envelope;
pub mod utils;

#[cfg(test)]
mod proptests;

pub use envelope::{open, seal, sealed_len, ENVELOPE_OVERHEAD, TAG_LEN};
pub use error::CryptoError;
pub use keys::{
    ChannelKeys, Nonce, PublicKey, SharedSecret, SymmetricParameters, NONCE_LEN, PUBLIC_KEY_LEN,
    SHARED_SECRET_LEN, SYMMETRIC_PARAMS_LEN,
};
