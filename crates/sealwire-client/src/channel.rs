//! Transport-independent core shared by the blocking and async clients.

use tracing::{debug, warn};

use sealwire_crypto::{sealed_len, ChannelKeys, CryptoError, Nonce};
use sealwire_transport::{LengthCodec, LENGTH_PREFIX_LEN};

use crate::config::{ChannelConfig, Role};
use crate::error::ClientError;

#[derive(Debug, Clone)]
pub(crate) struct Channel {
    keys: ChannelKeys,
    outbound: ChannelKeys,
    inbound: ChannelKeys,
    config: ChannelConfig,
    codec: LengthCodec,
}

impl Channel {
    pub(crate) fn new(keys: ChannelKeys, config: ChannelConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let (outbound, inbound) = match config.role {
            Role::Shared => (keys.clone(), keys.clone()),
            Role::Initiator => (keys.clone(), keys.reversed()),
            Role::Responder => (keys.reversed(), keys.clone()),
        };
        Ok(Self {
            codec: config.codec(),
            keys,
            outbound,
            inbound,
            config,
        })
    }

    pub(crate) fn keys(&self) -> &ChannelKeys {
        &self.keys
    }

    pub(crate) fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Seal `message` and prepend its length prefix.
    ///
    /// The size check runs before any encryption work.
    pub(crate) fn seal_wire(&self, message: &[u8], nonce: &Nonce) -> Result<Vec<u8>, ClientError> {
        let frame_len = sealed_len(message.len());
        let prefix = self.codec.encode_prefix(frame_len)?;
        let frame = self.outbound.seal(nonce, message)?;

        let mut wire = Vec::with_capacity(LENGTH_PREFIX_LEN + frame.len());
        wire.extend_from_slice(&prefix);
        wire.extend_from_slice(&frame);

        debug!(
            "sealed {} byte message into {} byte frame for {}",
            message.len(),
            frame.len(),
            hex::encode(self.outbound.receiver().as_bytes())
        );
        Ok(wire)
    }

    /// Validate a received length prefix, returning the frame length to read.
    pub(crate) fn frame_len(&self, prefix: [u8; LENGTH_PREFIX_LEN]) -> Result<usize, ClientError> {
        self.codec.decode_prefix(prefix).map_err(|e| {
            warn!("rejecting incoming frame: {}", e);
            ClientError::from(e)
        })
    }

    pub(crate) fn open_frame(&self, frame: &[u8]) -> Result<Vec<u8>, ClientError> {
        match self.inbound.open(frame) {
            Ok(message) => {
                debug!(
                    "opened {} byte frame from {}",
                    frame.len(),
                    hex::encode(self.inbound.sender().as_bytes())
                );
                Ok(message)
            }
            Err(CryptoError::AuthenticationFailed) => {
                warn!(
                    "frame from {} failed authentication",
                    hex::encode(self.inbound.sender().as_bytes())
                );
                Err(CryptoError::AuthenticationFailed.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
