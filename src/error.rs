//! Error types for terminal operations.
//!
//! `TerminalError` covers device and provisioning faults. Ordinary user-driven
//! aborts (timeout, cancel, connectivity loss) are not errors; they are reported
//! as [`AbortReason`] inside a step outcome.

use core::fmt;

/// Request signing error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SignError {
    /// Hash input was empty
    EmptyInput,

    /// Key and value lists differ in length
    FieldMismatch {
        /// Number of keys
        keys: usize,
        /// Number of values
        values: usize,
    },

    /// Output would exceed the destination capacity
    BufferFull,
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignError::EmptyInput => write!(f, "Empty hash input"),
            SignError::FieldMismatch { keys, values } => {
                write!(f, "Expected {} values, got {}", keys, values)
            }
            SignError::BufferFull => write!(f, "Buffer full"),
        }
    }
}

/// Terminal error type.
///
/// Represents device, provisioning and bring-up failures. Display output names
/// the subsystem so field logs are diagnosable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalError {
    /// Display write failed
    Display,

    /// Card reader could not be enabled
    CardReader,

    /// Subsystem failed to start during bring-up
    Init {
        /// Name of the failing subsystem
        subsystem: &'static str,
    },

    /// Wall clock could not be synchronized
    TimeSync,

    /// Persistent storage access failed
    Storage,

    /// Request could not be signed
    Signing(SignError),

    /// Provisioning value out of range (names the field)
    InvalidProfile(&'static str),
}

impl fmt::Display for TerminalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminalError::Display => write!(f, "Display write failed"),
            TerminalError::CardReader => write!(f, "Card reader unavailable"),
            TerminalError::Init { subsystem } => write!(f, "Failed to start {}", subsystem),
            TerminalError::TimeSync => write!(f, "Time sync failed"),
            TerminalError::Storage => write!(f, "Storage access failed"),
            TerminalError::Signing(err) => write!(f, "Signing failed: {}", err),
            TerminalError::InvalidProfile(field) => write!(f, "Invalid profile field: {}", field),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TerminalError {}

impl From<SignError> for TerminalError {
    fn from(err: SignError) -> Self {
        TerminalError::Signing(err)
    }
}

/// Why a payment sub-step ended without completing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// No event arrived within the wait window
    Timeout,

    /// User pressed the cancel key
    Cancelled,

    /// Wi-Fi dropped during the step
    ConnectivityLost,

    /// Input was rejected (unreadable card, oversized identifier)
    InvalidInput,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::Timeout => write!(f, "Timeout"),
            AbortReason::Cancelled => write!(f, "Cancelled"),
            AbortReason::ConnectivityLost => write!(f, "Connection lost"),
            AbortReason::InvalidInput => write!(f, "Invalid input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::format;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", TerminalError::Display), "Display write failed");
        assert_eq!(
            format!("{}", TerminalError::Init { subsystem: "lcd" }),
            "Failed to start lcd"
        );
        assert_eq!(
            format!("{}", TerminalError::Signing(SignError::BufferFull)),
            "Signing failed: Buffer full"
        );
        assert_eq!(
            format!("{}", SignError::FieldMismatch { keys: 2, values: 1 }),
            "Expected 2 values, got 1"
        );
    }

    #[test]
    fn test_abort_reason_display() {
        assert_eq!(format!("{}", AbortReason::Cancelled), "Cancelled");
        assert_eq!(format!("{}", AbortReason::ConnectivityLost), "Connection lost");
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(TerminalError::TimeSync, TerminalError::TimeSync);
        assert_ne!(TerminalError::TimeSync, TerminalError::Storage);
        assert_eq!(
            TerminalError::from(SignError::EmptyInput),
            TerminalError::Signing(SignError::EmptyInput)
        );
    }
}
