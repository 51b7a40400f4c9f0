//! HTTP/1.1 POST client over an `embedded_io` connection.

use super::{SignedRequest, Transport, TransportReply, find, sanitize_body, split_head};
use core::fmt::{self, Write as _};
use embedded_io::{Error as _, Read, Write};

/// Capacity of the serialized HTTP request.
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Capacity of the buffered HTTP response.
pub const MAX_RESPONSE_SIZE: usize = 2048;

const USER_AGENT: &str = concat!("pluto-terminal/", env!("CARGO_PKG_VERSION"));

const LOG_TARGET: &str = "pluto::transport";

/// Opens connections to the payment server.
///
/// Implementations own TLS and the I/O timeout: every read and write on the
/// returned connection must give up after a bounded time.
pub trait Connector {
    /// Connection type
    type Connection: Read + Write;

    /// Connector-specific error type
    type Error: fmt::Debug;

    /// Open a connection to `host:port`.
    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Connection, Self::Error>;
}

/// Blocking HTTP POST client.
#[derive(Debug)]
pub struct HttpClient<C: Connector> {
    connector: C,
}

impl<C: Connector> HttpClient<C> {
    /// Create a client over `connector`.
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Access the connector.
    pub fn connector_mut(&mut self) -> &mut C {
        &mut self.connector
    }

    fn exchange(
        &mut self,
        request: &SignedRequest<'_>,
        wire: &[u8],
    ) -> Result<heapless::Vec<u8, MAX_RESPONSE_SIZE>, &'static str> {
        let endpoint = request.endpoint;
        let mut conn = self
            .connector
            .connect(&endpoint.host, endpoint.port)
            .map_err(|e| {
                log::error!(target: LOG_TARGET, "connect to {} failed: {:?}", endpoint.host, e);
                "Connection failed"
            })?;
        log::info!(target: LOG_TARGET, "connection established to {}", endpoint.host);

        conn.write_all(wire).map_err(|e| {
            log::error!(target: LOG_TARGET, "write failed: {:?}", e.kind());
            "Send failed"
        })?;
        conn.flush().map_err(|e| {
            log::error!(target: LOG_TARGET, "flush failed: {:?}", e.kind());
            "Send failed"
        })?;
        log::info!(target: LOG_TARGET, "{} bytes written", wire.len());

        let mut response = heapless::Vec::<u8, MAX_RESPONSE_SIZE>::new();
        let mut chunk = [0u8; 256];
        loop {
            match conn.read(&mut chunk) {
                Ok(0) => {
                    log::info!(target: LOG_TARGET, "connection closed");
                    break;
                }
                Ok(n) => {
                    let data = chunk.get(..n).unwrap_or(&[]);
                    if response.extend_from_slice(data).is_err() {
                        log::error!(target: LOG_TARGET, "response buffer overflow");
                        return Err("Reply too large");
                    }
                }
                Err(e) => {
                    log::error!(
                        target: LOG_TARGET,
                        "read failed after {} bytes: {:?}",
                        response.len(),
                        e.kind()
                    );
                    return Err("Receive failed");
                }
            }
        }
        Ok(response)
    }
}

impl<C: Connector> Transport for HttpClient<C> {
    fn send(&mut self, request: &SignedRequest<'_>) -> TransportReply {
        let wire = match build_request(request) {
            Ok(wire) => wire,
            Err(_) => {
                log::error!(target: LOG_TARGET, "unable to create request");
                return TransportReply::failed("Request too large");
            }
        };

        let response = match self.exchange(request, wire.as_bytes()) {
            Ok(response) => response,
            Err(message) => return TransportReply::failed(message),
        };

        let status = parse_status(&response);
        if status.is_some() && !is_complete(&response) {
            log::error!(target: LOG_TARGET, "truncated response ({} bytes)", response.len());
            return TransportReply::failed("Receive failed");
        }

        let message = sanitize_body(&response);
        match status {
            Some(200) => TransportReply {
                success: true,
                message,
            },
            Some(code) => {
                log::warn!(target: LOG_TARGET, "server answered {}", code);
                if message.is_empty() {
                    TransportReply::failed("Request failed")
                } else {
                    TransportReply {
                        success: false,
                        message,
                    }
                }
            }
            None => {
                log::error!(target: LOG_TARGET, "no status line in response");
                TransportReply::failed("Request failed")
            }
        }
    }
}

/// Serialize the POST request.
///
/// Fails if the request would exceed [`MAX_REQUEST_SIZE`].
pub fn build_request(
    request: &SignedRequest<'_>,
) -> Result<heapless::String<MAX_REQUEST_SIZE>, fmt::Error> {
    let mut out = heapless::String::new();
    write!(
        out,
        "POST {} HTTP/1.1\r\n\
         Host: {}\r\n\
         Authorization: {}\r\n\
         User-Agent: {}\r\n\
         Connection: close\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         \r\n\
         {}",
        request.endpoint.path,
        request.endpoint.host,
        request.signature,
        USER_AGENT,
        request.body.len(),
        request.body,
    )?;
    Ok(out)
}

/// True if the header block is terminated and the body is as long as any
/// `Content-Length` header declares.
pub fn is_complete(response: &[u8]) -> bool {
    let Some((head, body)) = split_head(response) else {
        return false;
    };
    match content_length(head) {
        Some(declared) => body.len() >= declared,
        None => true,
    }
}

fn content_length(head: &[u8]) -> Option<usize> {
    let head = core::str::from_utf8(head).ok()?;
    head.lines().skip(1).find_map(|line| {
        let (name, value) = line.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Parse the status code from an `HTTP/x.y NNN ...` status line.
pub fn parse_status(response: &[u8]) -> Option<u16> {
    let line_end = find(response, b"\r\n")
        .or_else(|| find(response, b"\n"))
        .unwrap_or(response.len());
    let line = core::str::from_utf8(response.get(..line_end)?).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
