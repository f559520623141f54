//! sealwire client: one encrypted, authenticated message channel over one
//! byte transport.
//!
//! [`Client`] drives a blocking [`Transport`], [`AsyncClient`] an
//! [`AsyncTransport`]. Both run the same framing and envelope logic, so a
//! frame written by one can be read by the other.
//!
//! ```no_run
//! use sealwire_client::{Client, Nonce};
//! use sealwire_transport::MemoryTransport;
//!
//! # fn demo(keys: &[[u8; 32]; 3], params: &[u8; 160], nonce: [u8; 32]) -> Result<(), sealwire_client::ClientError> {
//! let mut client = Client::new(&keys[0], &keys[1], &keys[2], params, MemoryTransport::new())?;
//! client.send(b"hello", &Nonce::from(nonce))?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod config;
mod channel;
pub mod client;
pub mod async_client;
pub mod builder;

pub use async_client::AsyncClient;
pub use builder::ClientBuilder;
pub use client::Client;
pub use config::{ChannelConfig, Role};
pub use error::{ClientError, ConfigError};

pub use sealwire_crypto::{
    ChannelKeys, CryptoError, Nonce, PublicKey, SharedSecret, SymmetricParameters,
};
pub use sealwire_transport::{AsyncTransport, FramingError, Transport, TransportError};
