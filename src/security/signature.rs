//! Request signing and nonce generation.
//!
//! The signature is `sha256(canonical_string || secret)` where the canonical
//! string embeds the hash of the request body. The server recomputes the same
//! canonical string from the body it receives, so the layout below is a wire
//! contract.

use super::digest::{HexDigest, hash_parts, hash_sha256};
use crate::config::DeviceSecret;
use crate::error::SignError;
use core::fmt::Write;
use rand_core::RngCore;

/// Capacity of the canonical string.
pub const CANONICAL_STRING_SIZE: usize = 256;

/// Method line of the canonical string.
const CANONICAL_METHOD: &str = "POST";

/// Content type line of the canonical string.
const CANONICAL_CONTENT_TYPE: &str = "application/json";

/// Canonical string that gets signed.
pub type CanonicalString = heapless::String<CANONICAL_STRING_SIZE>;

/// Build the canonical string for a hashed body.
///
/// Layout: `POST\napplication/json\n<hashed_body>`.
pub fn build_canonical_string(hashed_body: &str) -> Result<CanonicalString, SignError> {
    if hashed_body.is_empty() {
        return Err(SignError::EmptyInput);
    }
    let mut out = CanonicalString::new();
    write!(
        out,
        "{}\n{}\n{}",
        CANONICAL_METHOD, CANONICAL_CONTENT_TYPE, hashed_body
    )
    .map_err(|_| SignError::BufferFull)?;
    Ok(out)
}

/// Generate a nonce: the hash of a random 32-bit value in decimal.
///
/// Uniqueness is probabilistic only.
pub fn generate_nonce<R: RngCore + ?Sized>(rng: &mut R) -> HexDigest {
    let mut decimal = heapless::String::<10>::new();
    let _ = write!(decimal, "{}", rng.next_u32());
    // A u32 renders to at least one digit, so the input is never empty.
    hash_sha256(decimal.as_bytes()).unwrap_or_default()
}

/// Signs request bodies with the device secret.
#[derive(Debug, Clone)]
pub struct Signer {
    secret: DeviceSecret,
}

impl Signer {
    /// Create a signer owning the device secret.
    pub fn new(secret: DeviceSecret) -> Self {
        Self { secret }
    }

    /// Sign a serialized body.
    ///
    /// Hashes the body, builds the canonical string from the hash, and hashes
    /// the canonical string followed by the secret.
    pub fn sign(&self, body: &str) -> Result<HexDigest, SignError> {
        let hashed_body = hash_sha256(body.as_bytes())?;
        let canonical = build_canonical_string(&hashed_body)?;
        hash_parts(&[canonical.as_bytes(), self.secret.expose()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRng(u32);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.0
        }

        fn next_u64(&mut self) -> u64 {
            u64::from(self.0)
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    #[test]
    fn test_canonical_layout() {
        let hashed = hash_sha256(b"{}").unwrap();
        let canonical = build_canonical_string(&hashed).unwrap();
        let mut lines = canonical.split('\n');
        assert_eq!(lines.next(), Some("POST"));
        assert_eq!(lines.next(), Some("application/json"));
        assert_eq!(lines.next(), Some(hashed.as_str()));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_canonical_rejects_empty() {
        assert_eq!(build_canonical_string(""), Err(SignError::EmptyInput));
    }

    #[test]
    fn test_nonce_is_hash_of_decimal() {
        let nonce = generate_nonce(&mut FixedRng(42));
        assert_eq!(nonce, hash_sha256(b"42").unwrap());
        assert_eq!(nonce.len(), 64);
    }

    #[test]
    fn test_nonce_differs_per_draw() {
        let a = generate_nonce(&mut FixedRng(1));
        let b = generate_nonce(&mut FixedRng(2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_signature_matches_manual_computation() {
        let signer = Signer::new(DeviceSecret::new("s3cret").unwrap());
        let body = r#"{"a":"1"}"#;

        let hashed = hash_sha256(body.as_bytes()).unwrap();
        let mut canonical = CanonicalString::new();
        canonical.push_str("POST\napplication/json\n").unwrap();
        canonical.push_str(&hashed).unwrap();
        canonical.push_str("s3cret").unwrap();
        let expected = hash_sha256(canonical.as_bytes()).unwrap();

        assert_eq!(signer.sign(body).unwrap(), expected);
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = Signer::new(DeviceSecret::new("one").unwrap());
        let b = Signer::new(DeviceSecret::new("two").unwrap());
        assert_ne!(a.sign("{}").unwrap(), b.sign("{}").unwrap());
    }
}
