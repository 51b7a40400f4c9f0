//! Terminal configuration.
//!
//! Compile-time policy (timeouts, PIN length, currency) lives in the
//! [`TerminalConfig`] trait as associated constants. Per-device values that are
//! only known at provisioning time (server endpoint, MAC address, shared secret)
//! live in [`DeviceProfile`].

use core::fmt;
use core::time::Duration;

/// Configuration trait defining timeouts and payment policy.
///
/// All values are const (zero runtime cost).
pub trait TerminalConfig {
    /// ISO-4217 currency code sent with every payment (default: "SEK")
    const CURRENCY: &'static str;

    /// Operation tag sent with every payment (default: "send_payment")
    const OPERATION: &'static str;

    /// Number of PIN digits required before accept is honored (default: 4)
    const PIN_LENGTH: usize;

    /// How long the menu waits for a choice (default: 20s)
    const MENU_TIMEOUT: Duration;

    /// How long amount and PIN entry wait for the next key (default: 30s)
    const ENTRY_TIMEOUT: Duration;

    /// How long the card step waits for a card (default: 20s)
    const CARD_TIMEOUT: Duration;

    /// Upper bound on a reconnection attempt (default: 60s)
    const RECONNECT_WINDOW: Duration;

    /// Dwell time for status messages (default: 3s)
    const MESSAGE_DWELL: Duration;

    /// Dwell time for short confirmations (default: 1s)
    const CONFIRM_DWELL: Duration;

    /// How long a producer may block on a full queue before dropping (default: 500ms)
    const SEND_TIMEOUT: Duration;
}

/// Default configuration for a 16x2 LCD terminal with a 4x4 keypad.
///
/// - PIN_LENGTH: 4 digits
/// - MENU_TIMEOUT: 20 s
/// - ENTRY_TIMEOUT: 30 s
/// - CARD_TIMEOUT: 20 s
/// - RECONNECT_WINDOW: 60 s
/// - MESSAGE_DWELL: 3 s
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl TerminalConfig for DefaultConfig {
    const CURRENCY: &'static str = "SEK";
    const OPERATION: &'static str = "send_payment";
    const PIN_LENGTH: usize = 4;
    const MENU_TIMEOUT: Duration = Duration::from_secs(20);
    const ENTRY_TIMEOUT: Duration = Duration::from_secs(30);
    const CARD_TIMEOUT: Duration = Duration::from_secs(20);
    const RECONNECT_WINDOW: Duration = Duration::from_secs(60);
    const MESSAGE_DWELL: Duration = Duration::from_secs(3);
    const CONFIRM_DWELL: Duration = Duration::from_secs(1);
    const SEND_TIMEOUT: Duration = Duration::from_millis(500);
}

/// Payment API endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct Endpoint {
    /// Server host name (sent in the `Host` header)
    pub host: heapless::String<64>,

    /// Server port
    #[cfg_attr(feature = "serde", serde(default = "default_port"))]
    pub port: u16,

    /// Request path of the payment API
    pub path: heapless::String<128>,
}

#[cfg(feature = "serde")]
fn default_port() -> u16 {
    443
}

impl Endpoint {
    /// Create an endpoint, failing if either string exceeds its buffer.
    pub fn new(host: &str, port: u16, path: &str) -> Result<Self, crate::error::TerminalError> {
        let mut h = heapless::String::new();
        h.push_str(host)
            .map_err(|_| crate::error::TerminalError::InvalidProfile("host"))?;
        let mut p = heapless::String::new();
        p.push_str(path)
            .map_err(|_| crate::error::TerminalError::InvalidProfile("path"))?;
        Ok(Self {
            host: h,
            port,
            path: p,
        })
    }
}

/// Station MAC address, rendered as colon-separated uppercase hex.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Render as `AA:BB:CC:DD:EE:FF`.
    pub fn to_text(&self) -> heapless::String<17> {
        let mut out = heapless::String::new();
        let _ = fmt::Write::write_fmt(&mut out, format_args!("{}", self));
        out
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Shared device secret used to sign requests.
///
/// Never logged, displayed or serialized: `Debug` is redacted and there is no
/// `Display` or `Serialize` impl.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeviceSecret(heapless::String<64>);

impl DeviceSecret {
    /// Wrap a secret, failing if it is empty or longer than 64 bytes.
    pub fn new(secret: &str) -> Result<Self, crate::error::TerminalError> {
        if secret.is_empty() {
            return Err(crate::error::TerminalError::InvalidProfile("secret"));
        }
        let mut s = heapless::String::new();
        s.push_str(secret)
            .map_err(|_| crate::error::TerminalError::InvalidProfile("secret"))?;
        Ok(Self(s))
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for DeviceSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DeviceSecret(<redacted>)")
    }
}

/// Per-device provisioning values.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
pub struct DeviceProfile {
    /// Payment API endpoint
    pub endpoint: Endpoint,

    /// Station MAC address (sent as `deviceMacAddress`)
    pub mac: MacAddress,

    /// Shared signing secret
    pub secret: DeviceSecret,
}
