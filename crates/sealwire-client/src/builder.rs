//! Builder for channel clients.

use rand_core::{CryptoRng, RngCore};

use sealwire_crypto::{ChannelKeys, CryptoError, PublicKey, SharedSecret, SymmetricParameters};
use sealwire_transport::{AsyncTransport, Transport};

use crate::async_client::AsyncClient;
use crate::client::Client;
use crate::config::{ChannelConfig, Role};
use crate::error::{ClientError, ConfigError};

/// Assembles key material and configuration for a [`Client`] or
/// [`AsyncClient`].
///
/// Symmetric parameters must be supplied, either explicitly or drawn from a
/// random source. Both peers need the same block, so random parameters
/// only make sense when they are shared with the peer afterwards.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    receiver: PublicKey,
    sender: PublicKey,
    secret: SharedSecret,
    params: Option<SymmetricParameters>,
    config: ChannelConfig,
}

impl ClientBuilder {
    pub fn new(receiver: PublicKey, sender: PublicKey, secret: SharedSecret) -> Self {
        Self {
            receiver,
            sender,
            secret,
            params: None,
            config: ChannelConfig::default(),
        }
    }

    /// Start from raw bytes, checking every size.
    pub fn from_slices(
        receiver_public_key: &[u8],
        sender_public_key: &[u8],
        shared_secret: &[u8],
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(
            PublicKey::try_from(receiver_public_key)?,
            PublicKey::try_from(sender_public_key)?,
            SharedSecret::try_from(shared_secret)?,
        ))
    }

    pub fn symmetric_parameters(mut self, params: SymmetricParameters) -> Self {
        self.params = Some(params);
        self
    }

    pub fn random_symmetric_parameters<R: RngCore + CryptoRng>(mut self, rng: &mut R) -> Self {
        self.params = Some(SymmetricParameters::random(rng));
        self
    }

    pub fn config(mut self, config: ChannelConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.config.max_frame_len = max_frame_len;
        self
    }

    /// Seal and open in one direction only. See [`Role`].
    pub fn role(mut self, role: Role) -> Self {
        self.config.role = role;
        self
    }

    /// Parameters chosen so far, if any.
    pub fn current_symmetric_parameters(&self) -> Option<&SymmetricParameters> {
        self.params.as_ref()
    }

    fn into_parts(self) -> Result<(ChannelKeys, ChannelConfig), ClientError> {
        self.config.validate()?;
        let params = self.params.ok_or(ConfigError::MissingSymmetricParameters)?;
        let keys = ChannelKeys::new(self.receiver, self.sender, self.secret, params);
        Ok((keys, self.config))
    }

    pub fn build<T: Transport>(self, transport: T) -> Result<Client<T>, ClientError> {
        let (keys, config) = self.into_parts()?;
        Client::with_keys(keys, config, transport)
    }

    pub fn build_async<T: AsyncTransport>(
        self,
        transport: T,
    ) -> Result<AsyncClient<T>, ClientError> {
        let (keys, config) = self.into_parts()?;
        AsyncClient::with_keys(keys, config, transport)
    }
}
