//! Blocking channel client.

use sealwire_crypto::{ChannelKeys, Nonce, PublicKey};
use sealwire_transport::{Transport, LENGTH_PREFIX_LEN};

use crate::channel::Channel;
use crate::config::ChannelConfig;
use crate::error::ClientError;

/// One end of a secure channel over a blocking [`Transport`].
///
/// `send` writes exactly one frame and flushes it. `receive` reads exactly
/// one frame. The length prefix is checked before the body buffer is
/// allocated, so a hostile peer cannot force a large allocation.
#[derive(Debug)]
pub struct Client<T> {
    channel: Channel,
    transport: T,
}

impl<T: Transport> Client<T> {
    /// Create a client from raw key material.
    ///
    /// Fails with [`sealwire_crypto::CryptoError::InvalidParameters`] if any
    /// input has the wrong size. The transport is not touched.
    pub fn new(
        receiver_public_key: &[u8],
        sender_public_key: &[u8],
        shared_secret: &[u8],
        symmetric_parameters: &[u8],
        transport: T,
    ) -> Result<Self, ClientError> {
        let keys = ChannelKeys::from_slices(
            receiver_public_key,
            sender_public_key,
            shared_secret,
            symmetric_parameters,
        )?;
        Self::with_keys(keys, ChannelConfig::default(), transport)
    }

    /// Create a client from validated keys and an explicit configuration.
    pub fn with_keys(
        keys: ChannelKeys,
        config: ChannelConfig,
        transport: T,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            channel: Channel::new(keys, config)?,
            transport,
        })
    }

    /// Seal `message` under `nonce` and write it as one frame.
    ///
    /// Nothing is written if the sealed frame would exceed the configured
    /// maximum.
    pub fn send(&mut self, message: &[u8], nonce: &Nonce) -> Result<(), ClientError> {
        let wire = self.channel.seal_wire(message, nonce)?;
        self.transport.write_all(&wire)?;
        self.transport.flush()?;
        Ok(())
    }

    /// Read one frame, verify it and return the plaintext.
    pub fn receive(&mut self) -> Result<Vec<u8>, ClientError> {
        let mut prefix = [0u8; LENGTH_PREFIX_LEN];
        self.transport.read_exact(&mut prefix)?;
        let len = self.channel.frame_len(prefix)?;

        let mut frame = vec![0u8; len];
        self.transport.read_exact(&mut frame)?;
        self.channel.open_frame(&frame)
    }
}

impl<T> Client<T> {
    pub fn sender_public_key(&self) -> &PublicKey {
        self.channel.keys().sender()
    }

    pub fn receiver_public_key(&self) -> &PublicKey {
        self.channel.keys().receiver()
    }

    pub fn config(&self) -> &ChannelConfig {
        self.channel.config()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client and hand back the transport.
    pub fn into_transport(self) -> T {
        self.transport
    }
}
