#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::envelope::{open, seal, ENVELOPE_OVERHEAD};
    use crate::error::CryptoError;
    use crate::keys::{ChannelKeys, Nonce, PublicKey, SharedSecret, SymmetricParameters};

    fn keys(
        sender: [u8; 32],
        receiver: [u8; 32],
        secret: [u8; 32],
        params: &[u8],
    ) -> ChannelKeys {
        ChannelKeys::new(
            PublicKey::from(receiver),
            PublicKey::from(sender),
            SharedSecret::from(secret),
            SymmetricParameters::try_from(params).unwrap(),
        )
    }

    proptest! {
        #[test]
        fn prop_round_trip(
            sender in any::<[u8; 32]>(),
            receiver in any::<[u8; 32]>(),
            secret in any::<[u8; 32]>(),
            params in prop::collection::vec(any::<u8>(), 160),
            nonce in any::<[u8; 32]>(),
            message in prop::collection::vec(any::<u8>(), 0..2048),
        ) {
            let keys = keys(sender, receiver, secret, &params);
            let frame = keys.seal(&Nonce::from(nonce), &message).unwrap();
            prop_assert_eq!(frame.len(), message.len() + ENVELOPE_OVERHEAD);
            prop_assert_eq!(keys.open(&frame).unwrap(), message);
        }

        #[test]
        fn prop_any_bit_flip_after_nonce_fails(
            secret in any::<[u8; 32]>(),
            nonce in any::<[u8; 32]>(),
            message in prop::collection::vec(any::<u8>(), 0..256),
            position in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let keys = keys([1; 32], [2; 32], secret, &[9; 160]);
            let mut frame = keys.seal(&Nonce::from(nonce), &message).unwrap();

            // ciphertext and tag live after the 32-byte nonce
            let body = frame.len() - 32;
            let idx = 32 + position.index(body);
            frame[idx] ^= 1 << bit;

            prop_assert_eq!(keys.open(&frame), Err(CryptoError::AuthenticationFailed));
        }

        #[test]
        fn prop_nonce_bit_flip_fails(
            nonce in any::<[u8; 32]>(),
            idx in 0usize..32,
            bit in 0u8..8,
        ) {
            let keys = keys([1; 32], [2; 32], [3; 32], &[0; 160]);
            let mut frame = keys.seal(&Nonce::from(nonce), b"nonce bound").unwrap();
            frame[idx] ^= 1 << bit;
            prop_assert_eq!(keys.open(&frame), Err(CryptoError::AuthenticationFailed));
        }

        #[test]
        fn prop_identity_binding(
            a in any::<[u8; 32]>(),
            b in any::<[u8; 32]>(),
            c in any::<[u8; 32]>(),
            secret in any::<[u8; 32]>(),
            nonce in any::<[u8; 32]>(),
        ) {
            prop_assume!(b != c);
            let params = SymmetricParameters::default();
            let secret = SharedSecret::from(secret);
            let frame = seal(
                &PublicKey::from(a),
                &PublicKey::from(b),
                &secret,
                &params,
                &Nonce::from(nonce),
                b"bound to a and b",
            ).unwrap();

            let result = open(&PublicKey::from(a), &PublicKey::from(c), &secret, &params, &frame);
            prop_assert_eq!(result, Err(CryptoError::AuthenticationFailed));
        }

        #[test]
        fn prop_distinct_nonces_distinct_frames(
            n1 in any::<[u8; 32]>(),
            n2 in any::<[u8; 32]>(),
            message in prop::collection::vec(any::<u8>(), 0..128),
        ) {
            prop_assume!(n1 != n2);
            let keys = keys([1; 32], [2; 32], [3; 32], &[0; 160]);
            let f1 = keys.seal(&Nonce::from(n1), &message).unwrap();
            let f2 = keys.seal(&Nonce::from(n2), &message).unwrap();
            prop_assert_ne!(&f1[32..], &f2[32..]);
        }

        #[test]
        fn prop_truncated_frames_never_open(
            message in prop::collection::vec(any::<u8>(), 0..64),
            cut in 1usize..16,
        ) {
            let keys = keys([1; 32], [2; 32], [3; 32], &[0; 160]);
            let frame = keys.seal(&Nonce::from([5; 32]), &message).unwrap();
            let short = &frame[..frame.len() - cut];
            let result = keys.open(short);
            let rejected = matches!(
                result,
                Err(CryptoError::AuthenticationFailed) | Err(CryptoError::Malformed { .. })
            );
            prop_assert!(rejected);
        }
    }
}
