//! Channel key file.
//!
//! One TOML file holds everything both ends of a channel need, hex encoded:
//!
//! ```toml
//! receiver_public_key = "..."   # 32 bytes
//! sender_public_key = "..."     # 32 bytes
//! shared_secret = "..."         # 32 bytes
//! symmetric_parameters = "..."  # 160 bytes
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use x25519_dalek::StaticSecret;

use sealwire_client::{ChannelKeys, CryptoError, PublicKey, SharedSecret, SymmetricParameters};

#[derive(Debug, Error)]
pub enum KeyFileError {
    #[error("key file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse key file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize key file: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("{field} is not valid hex: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },

    #[error(transparent)]
    Invalid(#[from] CryptoError),

    #[error("refusing to overwrite existing key file {0}")]
    Exists(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFile {
    pub receiver_public_key: String,
    pub sender_public_key: String,
    pub shared_secret: String,
    pub symmetric_parameters: String,
}

/// Public half of a freshly generated key file.
#[derive(Debug, Clone, Serialize)]
pub struct KeyFileSummary {
    pub receiver_public_key: String,
    pub sender_public_key: String,
}

impl KeyFile {
    /// Fresh X25519 identities for both ends, their agreed secret and
    /// random symmetric parameters.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let sender_secret = StaticSecret::random_from_rng(&mut *rng);
        let receiver_secret = StaticSecret::random_from_rng(&mut *rng);
        let sender = PublicKey::from(&sender_secret);
        let receiver = PublicKey::from(&receiver_secret);
        let secret = SharedSecret::diffie_hellman(&sender_secret, &receiver);
        let params = SymmetricParameters::random(rng);

        Self {
            receiver_public_key: hex::encode(receiver.as_bytes()),
            sender_public_key: hex::encode(sender.as_bytes()),
            shared_secret: hex::encode(secret.as_bytes()),
            symmetric_parameters: hex::encode(params.as_bytes()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, KeyFileError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Write the key file. Existing files are only replaced with `overwrite`.
    ///
    /// On Unix the file is owner-only (0600) before any key material is
    /// written to it.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<(), KeyFileError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true);
        if overwrite {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = match options.open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(KeyFileError::Exists(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // an overwritten file keeps its old mode unless reset here
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(content.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    /// Decode and size-check every field.
    pub fn channel_keys(&self) -> Result<ChannelKeys, KeyFileError> {
        let receiver = decode("receiver_public_key", &self.receiver_public_key)?;
        let sender = decode("sender_public_key", &self.sender_public_key)?;
        let secret = decode("shared_secret", &self.shared_secret)?;
        let params = decode("symmetric_parameters", &self.symmetric_parameters)?;
        Ok(ChannelKeys::from_slices(&receiver, &sender, &secret, &params)?)
    }

    pub fn summary(&self) -> KeyFileSummary {
        KeyFileSummary {
            receiver_public_key: self.receiver_public_key.clone(),
            sender_public_key: self.sender_public_key.clone(),
        }
    }
}

fn decode(field: &'static str, value: &str) -> Result<Vec<u8>, KeyFileError> {
    hex::decode(value.trim()).map_err(|source| KeyFileError::Hex { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;
    use tempfile::TempDir;

    #[test]
    fn test_generate_produces_valid_keys() {
        let file = KeyFile::generate(&mut OsRng);
        assert_eq!(file.receiver_public_key.len(), 64);
        assert_eq!(file.symmetric_parameters.len(), 320);

        let keys = file.channel_keys().unwrap();
        assert_eq!(hex::encode(keys.receiver().as_bytes()), file.receiver_public_key);
        assert_eq!(hex::encode(keys.sender().as_bytes()), file.sender_public_key);
    }

    #[test]
    fn test_generate_is_random() {
        let a = KeyFile::generate(&mut OsRng);
        let b = KeyFile::generate(&mut OsRng);
        assert_ne!(a.shared_secret, b.shared_secret);
        assert_ne!(a.symmetric_parameters, b.symmetric_parameters);
    }

    #[test]
    fn test_save_load_and_overwrite_guard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keys.toml");
        let file = KeyFile::generate(&mut OsRng);

        file.save(&path, false).unwrap();
        assert_eq!(KeyFile::load(&path).unwrap(), file);

        let other = KeyFile::generate(&mut OsRng);
        assert!(matches!(other.save(&path, false), Err(KeyFileError::Exists(_))));
        other.save(&path, true).unwrap();
        assert_eq!(KeyFile::load(&path).unwrap(), other);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_overwrite_tightens_loose_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keys.toml");
        fs::write(&path, "stale").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let file = KeyFile::generate(&mut OsRng);
        file.save(&path, true).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(KeyFile::load(&path).unwrap(), file);
    }

    #[test]
    fn test_bad_hex_names_field() {
        let mut file = KeyFile::generate(&mut OsRng);
        file.shared_secret = "zz".to_string();
        match file.channel_keys() {
            Err(KeyFileError::Hex { field, .. }) => assert_eq!(field, "shared_secret"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        let mut file = KeyFile::generate(&mut OsRng);
        file.symmetric_parameters = "00".repeat(128);
        let err = file.channel_keys().unwrap_err();
        assert!(matches!(
            err,
            KeyFileError::Invalid(CryptoError::InvalidParameters { .. })
        ));
        assert!(err.to_string().contains("expected 160 bytes, got 128"));
    }
}
