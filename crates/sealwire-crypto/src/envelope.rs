//! Envelope sealing for channel messages.
//!
//! Format, version 1:
//!
//! ```text
//! +-------------+---------------------+-----------+
//! | NONCE (32B) | CIPHERTEXT (N bytes)| TAG (16B) |
//! +-------------+---------------------+-----------+
//! ```
//!
//! Per-message keys come from HKDF-SHA256 with the envelope nonce as salt and
//! `shared_secret || symmetric_parameters` as input key material. The expand
//! step is bound to both public identities. The AEAD is ChaCha20Poly1305 with
//! `(sender, receiver, nonce)` as associated data.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Key, Nonce as AeadNonce,
};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::keys::{
    Nonce, PublicKey, SharedSecret, SymmetricParameters, NONCE_LEN, SHARED_SECRET_LEN,
    SYMMETRIC_PARAMS_LEN,
};
use crate::transcript::{tags, Transcript};

/// Poly1305 tag width.
pub const TAG_LEN: usize = 16;

/// Bytes an envelope adds on top of the plaintext.
pub const ENVELOPE_OVERHEAD: usize = NONCE_LEN + TAG_LEN;

const AEAD_KEY_LEN: usize = 32;
const AEAD_NONCE_LEN: usize = 12;

const KEY_LABEL: &str = "sealwire_env_v1_key";
const NONCE_LABEL: &str = "sealwire_env_v1_nonce";
const AAD_LABEL: &str = "sealwire_env_aad_v1";

/// Size of the envelope produced for a plaintext of `plaintext_len` bytes.
pub fn sealed_len(plaintext_len: usize) -> usize {
    plaintext_len.saturating_add(ENVELOPE_OVERHEAD)
}

/// Associated data binding an envelope to its sender, receiver and nonce.
pub fn envelope_aad_v1(sender: &PublicKey, receiver: &PublicKey, nonce: &Nonce) -> Vec<u8> {
    let mut t = Transcript::new(AAD_LABEL);
    t.append_bytes(tags::SENDER, sender.as_bytes());
    t.append_bytes(tags::RECEIVER, receiver.as_bytes());
    t.append_bytes(tags::NONCE, nonce.as_bytes());
    t.as_bytes().to_vec()
}

fn kdf_info(label: &'static str, sender: &PublicKey, receiver: &PublicKey) -> Transcript {
    let mut t = Transcript::new(label);
    t.append_bytes(tags::SENDER, sender.as_bytes());
    t.append_bytes(tags::RECEIVER, receiver.as_bytes());
    t
}

fn kdf_error(_: hkdf::InvalidLength) -> CryptoError {
    CryptoError::InvalidParameters {
        field: "kdf output",
        reason: "requested length exceeds HKDF-SHA256 limit".to_string(),
    }
}

/// Derive the AEAD key and nonce for one envelope.
fn derive_message_keys(
    sender: &PublicKey,
    receiver: &PublicKey,
    secret: &SharedSecret,
    params: &SymmetricParameters,
    nonce: &Nonce,
) -> Result<(Zeroizing<[u8; AEAD_KEY_LEN]>, [u8; AEAD_NONCE_LEN]), CryptoError> {
    let mut ikm = Zeroizing::new([0u8; SHARED_SECRET_LEN + SYMMETRIC_PARAMS_LEN]);
    let buf: &mut [u8; SHARED_SECRET_LEN + SYMMETRIC_PARAMS_LEN] = &mut ikm;
    buf[..SHARED_SECRET_LEN].copy_from_slice(secret.as_bytes());
    buf[SHARED_SECRET_LEN..].copy_from_slice(params.as_bytes());

    let hk = Hkdf::<Sha256>::new(Some(nonce.as_bytes()), buf.as_slice());

    let mut key = Zeroizing::new([0u8; AEAD_KEY_LEN]);
    hk.expand(
        kdf_info(KEY_LABEL, sender, receiver).as_bytes(),
        key.as_mut_slice(),
    )
    .map_err(kdf_error)?;

    let mut aead_nonce = [0u8; AEAD_NONCE_LEN];
    hk.expand(
        kdf_info(NONCE_LABEL, sender, receiver).as_bytes(),
        &mut aead_nonce,
    )
    .map_err(kdf_error)?;

    Ok((key, aead_nonce))
}

/// Seal `plaintext` for the `(sender_pub, receiver_pub)` pair.
///
/// Returns `nonce || ciphertext || tag`. Sealing the same inputs twice yields
/// identical bytes, so the caller must never reuse a nonce.
pub fn seal(
    sender_pub: &PublicKey,
    receiver_pub: &PublicKey,
    shared_secret: &SharedSecret,
    sym_params: &SymmetricParameters,
    nonce: &Nonce,
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let (key, aead_nonce) =
        derive_message_keys(sender_pub, receiver_pub, shared_secret, sym_params, nonce)?;
    let aad = envelope_aad_v1(sender_pub, receiver_pub, nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_slice()));
    let ct = cipher
        .encrypt(
            AeadNonce::from_slice(&aead_nonce),
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| CryptoError::InvalidParameters {
            field: "plaintext",
            reason: format!("{} bytes exceeds the AEAD message limit", plaintext.len()),
        })?;

    let mut out = Vec::with_capacity(NONCE_LEN + ct.len());
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(&ct);
    Ok(out)
}

/// Verify and decrypt an envelope produced by [`seal`].
///
/// The Poly1305 tag is checked in constant time before any keystream is
/// applied, so a failed open releases no plaintext.
pub fn open(
    sender_pub: &PublicKey,
    receiver_pub: &PublicKey,
    shared_secret: &SharedSecret,
    sym_params: &SymmetricParameters,
    frame: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if frame.len() < ENVELOPE_OVERHEAD {
        return Err(CryptoError::Malformed {
            len: frame.len(),
            min: ENVELOPE_OVERHEAD,
        });
    }
    let (nonce_bytes, sealed) = frame.split_at(NONCE_LEN);
    let nonce = Nonce::try_from(nonce_bytes)?;

    let (key, aead_nonce) =
        derive_message_keys(sender_pub, receiver_pub, shared_secret, sym_params, &nonce)?;
    let aad = envelope_aad_v1(sender_pub, receiver_pub, &nonce);

    let cipher = ChaCha20Poly1305::new(Key::from_slice(key.as_slice()));
    cipher
        .decrypt(
            AeadNonce::from_slice(&aead_nonce),
            Payload {
                msg: sealed,
                aad: &aad,
            },
        )
        .map_err(|_| CryptoError::AuthenticationFailed)
}
