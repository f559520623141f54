//! Constant-time comparison helpers for secret values.

use constant_time_eq::constant_time_eq;

/// Compare two byte slices in constant time.
///
/// Slices of different lengths compare unequal; the length itself is not
/// treated as secret.
///
/// ```rust
/// use sealwire_crypto::utils::constant_time_compare;
///
/// assert!(constant_time_compare(b"secret", b"secret"));
/// assert!(!constant_time_compare(b"secret", b"Secret"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    constant_time_eq(a, b)
}

/// Compare two fixed-size arrays in constant time.
pub fn constant_time_compare_array<const N: usize>(a: &[u8; N], b: &[u8; N]) -> bool {
    constant_time_eq(a, b)
}
