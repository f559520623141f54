//! Key material for a sealwire channel.
//!
//! Public identities are plain values. The shared secret and the symmetric
//! parameters are zeroized on drop and never printed.

use std::fmt;

use rand_core::{CryptoRng, RngCore};
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::envelope;
use crate::error::CryptoError;
use crate::utils::constant_time_compare_array;

/// Size of a peer public identity.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Size of the pre-shared secret.
pub const SHARED_SECRET_LEN: usize = 32;
/// Size of the opaque symmetric parameter block.
pub const SYMMETRIC_PARAMS_LEN: usize = 160;
/// Size of the per-message nonce carried at the front of every envelope.
pub const NONCE_LEN: usize = 32;

fn to_array<const N: usize>(field: &'static str, bytes: &[u8]) -> Result<[u8; N], CryptoError> {
    bytes
        .try_into()
        .map_err(|_| CryptoError::length(field, N, bytes.len()))
}

/// A peer's 32-byte public identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    #[inline]
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.0
    }
}

impl From<[u8; PUBLIC_KEY_LEN]> for PublicKey {
    fn from(value: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        to_array("public key", value).map(Self)
    }
}

impl From<X25519PublicKey> for PublicKey {
    fn from(value: X25519PublicKey) -> Self {
        Self(value.to_bytes())
    }
}

impl From<&StaticSecret> for PublicKey {
    fn from(secret: &StaticSecret) -> Self {
        Self(X25519PublicKey::from(secret).to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.0))
    }
}

/// Secret both peers agreed on out of band.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret([u8; SHARED_SECRET_LEN]);

impl SharedSecret {
    /// X25519 agreement between our static secret and the peer's public key.
    pub fn diffie_hellman(local: &StaticSecret, remote: &PublicKey) -> Self {
        let remote = X25519PublicKey::from(remote.to_bytes());
        Self(local.diffie_hellman(&remote).to_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; SHARED_SECRET_LEN] {
        &self.0
    }
}

impl From<[u8; SHARED_SECRET_LEN]> for SharedSecret {
    fn from(value: [u8; SHARED_SECRET_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for SharedSecret {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        to_array("shared secret", value).map(Self)
    }
}

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare_array(&self.0, &other.0)
    }
}

impl Eq for SharedSecret {}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Opaque 160-byte configuration block for the symmetric stage.
///
/// The block is fed into key derivation as-is; no field inside it is
/// interpreted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricParameters([u8; SYMMETRIC_PARAMS_LEN]);

impl SymmetricParameters {
    /// Fresh parameters from a cryptographically secure generator.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut raw = [0u8; SYMMETRIC_PARAMS_LEN];
        rng.fill_bytes(&mut raw);
        let params = Self(raw);
        raw.zeroize();
        params
    }

    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_PARAMS_LEN] {
        &self.0
    }
}

impl Default for SymmetricParameters {
    fn default() -> Self {
        Self([0u8; SYMMETRIC_PARAMS_LEN])
    }
}

impl From<[u8; SYMMETRIC_PARAMS_LEN]> for SymmetricParameters {
    fn from(value: [u8; SYMMETRIC_PARAMS_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for SymmetricParameters {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        to_array("symmetric parameters", value).map(Self)
    }
}

impl PartialEq for SymmetricParameters {
    fn eq(&self, other: &Self) -> bool {
        constant_time_compare_array(&self.0, &other.0)
    }
}

impl Eq for SymmetricParameters {}

impl fmt::Debug for SymmetricParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricParameters(<redacted>)")
    }
}

/// Per-message nonce. Must never repeat for the same sender and secret.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_LEN]);

impl Nonce {
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut raw = [0u8; NONCE_LEN];
        rng.fill_bytes(&mut raw);
        Self(raw)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}

impl From<[u8; NONCE_LEN]> for Nonce {
    fn from(value: [u8; NONCE_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Nonce {
    type Error = CryptoError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        to_array("nonce", value).map(Self)
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", hex::encode(self.0))
    }
}

/// Everything needed to seal and open envelopes for one channel.
///
/// Built once and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ChannelKeys {
    sender: PublicKey,
    receiver: PublicKey,
    secret: SharedSecret,
    params: SymmetricParameters,
}

impl ChannelKeys {
    pub fn new(
        receiver: PublicKey,
        sender: PublicKey,
        secret: SharedSecret,
        params: SymmetricParameters,
    ) -> Self {
        Self {
            sender,
            receiver,
            secret,
            params,
        }
    }

    /// Build from raw bytes, checking every size.
    pub fn from_slices(
        receiver_public_key: &[u8],
        sender_public_key: &[u8],
        shared_secret: &[u8],
        symmetric_parameters: &[u8],
    ) -> Result<Self, CryptoError> {
        Ok(Self::new(
            PublicKey::try_from(receiver_public_key)?,
            PublicKey::try_from(sender_public_key)?,
            SharedSecret::try_from(shared_secret)?,
            SymmetricParameters::try_from(symmetric_parameters)?,
        ))
    }

    pub fn sender(&self) -> &PublicKey {
        &self.sender
    }

    pub fn receiver(&self) -> &PublicKey {
        &self.receiver
    }

    /// The same channel seen from the other direction: sender and receiver
    /// swapped, secret and parameters unchanged.
    ///
    /// Frames sealed by one orientation only open under that orientation.
    pub fn reversed(&self) -> Self {
        Self::new(
            self.sender,
            self.receiver,
            self.secret.clone(),
            self.params.clone(),
        )
    }

    /// Seal `plaintext` into `nonce || ciphertext || tag`.
    pub fn seal(&self, nonce: &Nonce, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        envelope::seal(
            &self.sender,
            &self.receiver,
            &self.secret,
            &self.params,
            nonce,
            plaintext,
        )
    }

    /// Verify and decrypt an envelope produced by [`ChannelKeys::seal`].
    pub fn open(&self, frame: &[u8]) -> Result<Vec<u8>, CryptoError> {
        envelope::open(&self.sender, &self.receiver, &self.secret, &self.params, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn test_wrong_lengths_rejected() {
        assert!(matches!(
            PublicKey::try_from(&[0u8; 31][..]),
            Err(CryptoError::InvalidParameters { field: "public key", .. })
        ));
        assert!(matches!(
            SharedSecret::try_from(&[0u8; 33][..]),
            Err(CryptoError::InvalidParameters { field: "shared secret", .. })
        ));
        assert!(matches!(
            SymmetricParameters::try_from(&[0u8; 159][..]),
            Err(CryptoError::InvalidParameters { field: "symmetric parameters", .. })
        ));
        assert!(matches!(
            Nonce::try_from(&[][..]),
            Err(CryptoError::InvalidParameters { field: "nonce", .. })
        ));
    }

    #[test]
    fn test_from_slices_checks_each_field() {
        let ok = ChannelKeys::from_slices(&[1; 32], &[2; 32], &[3; 32], &[0; 160]);
        assert!(ok.is_ok());

        let err = ChannelKeys::from_slices(&[1; 32], &[2; 32], &[3; 32], &[0; 128]).unwrap_err();
        assert_eq!(
            err,
            CryptoError::InvalidParameters {
                field: "symmetric parameters",
                reason: "expected 160 bytes, got 128".to_string(),
            }
        );
    }

    #[test]
    fn test_reversed_swaps_direction() {
        let keys = ChannelKeys::from_slices(&[1; 32], &[2; 32], &[3; 32], &[4; 160]).unwrap();
        let back = keys.reversed();
        assert_eq!(back.sender(), keys.receiver());
        assert_eq!(back.receiver(), keys.sender());
        assert_eq!(back.reversed().sender(), keys.sender());

        let nonce = Nonce::from([6; 32]);
        let frame = keys.seal(&nonce, b"one way").unwrap();
        assert_eq!(keys.open(&frame).unwrap(), b"one way");
        assert_eq!(back.open(&frame), Err(CryptoError::AuthenticationFailed));

        let reply = back.seal(&nonce, b"other way").unwrap();
        assert_eq!(back.open(&reply).unwrap(), b"other way");
        assert_eq!(keys.open(&reply), Err(CryptoError::AuthenticationFailed));
    }

    #[test]
    fn test_debug_prints_public_values_as_hex() {
        assert_eq!(
            format!("{:?}", PublicKey::from([0xab; 32])),
            format!("PublicKey({})", "ab".repeat(32))
        );
        assert_eq!(
            format!("{:?}", Nonce::from([0x01; 32])),
            format!("Nonce({})", "01".repeat(32))
        );
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let keys = ChannelKeys::from_slices(&[0xaa; 32], &[0xbb; 32], &[0xcc; 32], &[0xdd; 160])
            .unwrap();
        let printed = format!("{keys:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("cccc"));
        assert!(!printed.contains("dddd"));
        assert!(printed.contains(&"aa".repeat(32)));
    }

    #[test]
    fn test_diffie_hellman_agrees_on_both_sides() {
        let alice = StaticSecret::random_from_rng(OsRng);
        let bob = StaticSecret::random_from_rng(OsRng);

        let at_alice = SharedSecret::diffie_hellman(&alice, &PublicKey::from(&bob));
        let at_bob = SharedSecret::diffie_hellman(&bob, &PublicKey::from(&alice));
        assert_eq!(at_alice, at_bob);
    }

    #[test]
    fn test_random_parameters_differ() {
        let a = SymmetricParameters::random(&mut OsRng);
        let b = SymmetricParameters::random(&mut OsRng);
        assert_ne!(a, b);
        assert_ne!(Nonce::random(&mut OsRng), Nonce::random(&mut OsRng));
    }
}
