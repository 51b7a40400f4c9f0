//! # pluto-terminal
//!
//! Core of an unattended point-of-sale payment terminal with zero heap allocation.
//!
//! **Key features:**
//! - **Event-driven state machine** - One consumer drives menu, amount, card, PIN and submission
//! - **Independent producers** - Keypad, card reader and Wi-Fi monitor only ever enqueue events
//! - **Signed requests** - SHA-256 body hash, canonical string and device-secret signature
//! - **Platform-agnostic devices** - Display, reader, network, transport and clock are traits
//! - **Bounded everything** - Fixed-capacity queue and buffers, every wait has a timeout
//!
//! ## Optional Features
//!
//! - `std` (default) - Thread-backed event queue and producer threads (`runtime`)
//! - `serde` - `Deserialize` for the device profile
//! - `sim` - Host simulator binary `pluto-sim`
//!
//! The library provides a `#[derive(RequestFields)]` macro for request records.
//!
//! This library is `no_std` compatible.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[cfg(feature = "std")]
extern crate std;

// Lets the derive macro name `::pluto_terminal` from inside this crate
extern crate self as pluto_terminal;

// Re-export derive macro (always available)
pub use pluto_terminal_macros::RequestFields;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod bringup;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod event;
pub mod input;
pub mod security;
pub mod terminal;
pub mod transport;

#[cfg(feature = "std")]
pub mod runtime;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Configuration
pub use config::{DefaultConfig, DeviceProfile, DeviceSecret, Endpoint, MacAddress, TerminalConfig};

// Error types
pub use error::{AbortReason, SignError, TerminalError};

// Events
pub use event::{CardId, Event, EventReceiver, EventSender, Key, KeyRole, SendError};

// Devices
pub use clock::Clock;
pub use display::{CharDisplay, Frame};
pub use input::{LinkProbe, Network};
pub use terminal::CardReader;
pub use transport::{Transport, TransportReply};

// State machine
pub use terminal::{
    Payment, PaymentOutcome, Peripherals, Platform, StepOutcome, SystemState, Terminal,
};

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
