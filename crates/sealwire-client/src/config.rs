//! Channel configuration.
//!
//! # Example TOML
//!
//! ```toml
//! max_frame_len = 16777216
//! role = "initiator"
//! ```

use serde::{Deserialize, Serialize};

use sealwire_crypto::ENVELOPE_OVERHEAD;
use sealwire_transport::{LengthCodec, DEFAULT_MAX_FRAME_LEN};

use crate::error::ConfigError;

/// Which direction this end seals and opens in.
///
/// `Shared` seals and opens under the configured `(sender, receiver)`
/// pair, so any two ends with the same keys interoperate, including an
/// end reading back its own frames. `Initiator` seals `sender -> receiver`
/// and only opens `receiver -> sender`; `Responder` is the mirror image. A
/// frame reflected back to the end that sealed it then fails
/// authentication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Shared,
    Initiator,
    Responder,
}

/// Tunables for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Largest sealed frame accepted or produced, in bytes, excluding the
    /// length prefix.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: usize,

    #[serde(default)]
    pub role: Role,
}

fn default_max_frame_len() -> usize {
    DEFAULT_MAX_FRAME_LEN
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            max_frame_len: default_max_frame_len(),
            role: Role::default(),
        }
    }
}

impl ChannelConfig {
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            max_frame_len,
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_frame_len < ENVELOPE_OVERHEAD {
            return Err(ConfigError::MaxFrameLenTooSmall {
                value: self.max_frame_len,
                min: ENVELOPE_OVERHEAD,
            });
        }
        let max = u32::MAX as usize;
        if self.max_frame_len > max {
            return Err(ConfigError::MaxFrameLenTooLarge {
                value: self.max_frame_len,
                max,
            });
        }
        Ok(())
    }

    /// Frame codec enforcing these limits.
    pub(crate) fn codec(&self) -> LengthCodec {
        LengthCodec::new(self.max_frame_len).with_min_frame_len(ENVELOPE_OVERHEAD)
    }
}
