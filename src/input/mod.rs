//! Event producers.
//!
//! Each producer owns exactly one event kind and only ever enqueues; none of
//! them render or drive the card reader.
//!
//! - `keypad`: key presses
//! - `card`: card scans and scan failures
//! - `link`: connectivity changes

pub mod card;
pub mod keypad;
pub mod link;

pub use card::{CardEventBridge, classify_uid};
pub use keypad::{KeyMap, KeypadProducer, KeypadScanner};
pub use link::{LinkMonitor, LinkProbe, Network};
