//! Request signing.
//!
//! This module provides:
//! - SHA-256 hex digests (`digest`)
//! - Flat JSON request bodies from ordered key/value lists (`body`)
//! - Canonical string, signature and nonce generation (`signature`)
//! - `RequestFields` trait, derived with `#[derive(RequestFields)]`
//!
//! The device secret is only ever fed into the signature hash; it is never
//! written into a body, a header or a log line.

pub mod body;
pub mod digest;
pub mod signature;

pub use body::{REQUEST_BODY_SIZE, RequestBody, build_body};
pub use digest::{HEX_DIGEST_LEN, HexDigest, hash_parts, hash_sha256};
pub use signature::{CanonicalString, Signer, build_canonical_string, generate_nonce};

/// Maximum number of fields a request record may expose.
pub const MAX_REQUEST_FIELDS: usize = 16;

/// Ordered string views of a record's fields.
pub type FieldValues<'a> = heapless::Vec<&'a str, MAX_REQUEST_FIELDS>;

/// A record that serializes to a flat, ordered key/value request body.
///
/// Derive it with `#[derive(RequestFields)]`; key order follows field
/// declaration order and `#[request(rename = "...")]` overrides a key.
pub trait RequestFields {
    /// Request keys, in body order.
    const KEYS: &'static [&'static str];

    /// Field contents, aligned with [`KEYS`](Self::KEYS).
    fn values(&self) -> FieldValues<'_>;

    /// Serialize into a request body with [`build_body`].
    fn to_body(&self) -> Result<RequestBody, crate::error::SignError> {
        build_body(Self::KEYS, &self.values())
    }
}
