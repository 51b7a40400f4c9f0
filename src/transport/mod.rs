//! Transport client boundary.
//!
//! The terminal hands a signed body to a [`Transport`] and gets back a success
//! flag plus a short, display-safe message. [`HttpClient`] implements the
//! contract over any connection that speaks `embedded_io::Read + Write`; TLS
//! lives inside the [`Connector`].

pub mod http;

pub use http::{Connector, HttpClient, MAX_REQUEST_SIZE, MAX_RESPONSE_SIZE};

use crate::config::Endpoint;

/// Longest message a reply may carry (two LCD rows).
pub const MAX_REPLY_MESSAGE: usize = 32;

/// Message shown when the server's reply is not display-safe.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// A signed request ready to send.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
    /// Target endpoint
    pub endpoint: &'a Endpoint,

    /// Hex signature (sent as the `Authorization` header)
    pub signature: &'a str,

    /// JSON body
    pub body: &'a str,
}

/// Outcome of a transport exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    /// True only for an HTTP 200 response
    pub success: bool,

    /// Display-safe message (at most [`MAX_REPLY_MESSAGE`] chars)
    pub message: heapless::String<MAX_REPLY_MESSAGE>,
}

impl TransportReply {
    /// Successful reply with message.
    pub fn accepted(message: &str) -> Self {
        Self {
            success: true,
            message: display_safe(message),
        }
    }

    /// Failed reply with message.
    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: display_safe(message),
        }
    }
}

fn display_safe(message: &str) -> heapless::String<MAX_REPLY_MESSAGE> {
    let mut out = heapless::String::new();
    if out.push_str(message).is_err() {
        out.clear();
        let _ = out.push_str(UNKNOWN_ERROR);
    }
    out
}

/// Blocking request/response transport.
///
/// `send` blocks the caller until the exchange completes or the transport's
/// own timeout expires. It cannot be interrupted once started.
pub trait Transport {
    /// Submit a signed request.
    fn send(&mut self, request: &SignedRequest<'_>) -> TransportReply;
}

/// Extract a display-safe message from a raw HTTP response.
///
/// Takes the body after the header separator (`\r\n\r\n` or `\n\n`; the whole
/// buffer if neither is present), skips leading line breaks, drops `\r`, stops
/// at the first non-ASCII byte and trims trailing line breaks. A result longer
/// than [`MAX_REPLY_MESSAGE`] becomes [`UNKNOWN_ERROR`].
pub fn sanitize_body(raw: &[u8]) -> heapless::String<MAX_REPLY_MESSAGE> {
    let is_break = |b: &u8| *b == b'\r' || *b == b'\n';

    let body = find_body(raw);
    let start = body.iter().position(|b| !is_break(b)).unwrap_or(body.len());
    let body = body.get(start..).unwrap_or(&[]);
    let end = body
        .iter()
        .position(|&b| !b.is_ascii() || b == 0)
        .unwrap_or(body.len());
    let mut body = body.get(..end).unwrap_or(&[]);
    while let [rest @ .., last] = body
        && is_break(last)
    {
        body = rest;
    }

    let mut text = heapless::String::<MAX_REPLY_MESSAGE>::new();
    for &b in body.iter().filter(|&&b| b != b'\r') {
        if text.push(char::from(b)).is_err() {
            text.clear();
            let _ = text.push_str(UNKNOWN_ERROR);
            break;
        }
    }
    text
}

fn find_body(raw: &[u8]) -> &[u8] {
    split_head(raw).map_or(raw, |(_, body)| body)
}

/// Split a raw response into header block and body at the first blank line.
pub(crate) fn split_head(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    let (pos, sep) = match find(raw, b"\r\n\r\n") {
        Some(pos) => (pos, 4),
        None => (find(raw, b"\n\n")?, 2),
    };
    Some((raw.get(..pos)?, raw.get(pos.saturating_add(sep)..)?))
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
