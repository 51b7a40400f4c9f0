//! SHA-256 hex digests.
//!
//! Every hash the terminal produces (PIN hash, body hash, nonce, signature) is a
//! SHA-256 digest rendered as 64 lowercase hex characters.

use crate::error::SignError;
use core::fmt;
use core::ops::Deref;
use sha2::{Digest, Sha256};

/// Size of a SHA-256 digest in bytes.
pub const SHA256_DIGEST_SIZE: usize = 32;

/// Length of a hex-rendered digest.
pub const HEX_DIGEST_LEN: usize = SHA256_DIGEST_SIZE * 2;

/// Lowercase hex rendering of a SHA-256 digest.
///
/// Always exactly 64 characters once produced by this module; `Default` yields
/// the empty placeholder used before a payment field is populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexDigest(heapless::String<HEX_DIGEST_LEN>);

impl HexDigest {
    fn from_bytes(digest: &[u8; SHA256_DIGEST_SIZE]) -> Self {
        let mut buf = [0u8; HEX_DIGEST_LEN];
        let mut out = heapless::String::new();
        // Output buffer is exactly twice the input length, so encoding cannot fail.
        if hex::encode_to_slice(digest, &mut buf).is_ok()
            && let Ok(text) = core::str::from_utf8(&buf)
        {
            let _ = out.push_str(text);
        }
        Self(out)
    }

    /// Digest text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// True until the digest has been computed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for HexDigest {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for HexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hash `input` and render it as lowercase hex.
///
/// Empty input is rejected: nothing the terminal signs may be empty.
pub fn hash_sha256(input: &[u8]) -> Result<HexDigest, SignError> {
    hash_parts(&[input])
}

/// Hash the concatenation of `parts` without materializing it.
///
/// Fails if the concatenation is empty.
pub fn hash_parts(parts: &[&[u8]]) -> Result<HexDigest, SignError> {
    if parts.iter().all(|p| p.is_empty()) {
        return Err(SignError::EmptyInput);
    }

    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }

    let result = hasher.finalize();
    let mut digest = [0u8; SHA256_DIGEST_SIZE];
    digest.copy_from_slice(&result);
    Ok(HexDigest::from_bytes(&digest))
}
