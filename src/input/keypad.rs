//! Keypad producer.
//!
//! Translates raw key characters from a matrix scanner into [`Event::KeyPress`]
//! events. The scanner itself (row/column strobing, debouncing) is the driver's
//! business; [`KeyMap`] is provided for drivers that report matrix positions.

use crate::event::{Event, EventSender, Key, SendError};

const LOG_TARGET: &str = "pluto::input";

/// Number of keypad rows.
pub const KEYPAD_ROWS: usize = 4;

/// Number of keypad columns.
pub const KEYPAD_COLS: usize = 4;

/// Character layout of a 4x4 matrix keypad, indexed `[row][col]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeyMap {
    layout: [[char; KEYPAD_COLS]; KEYPAD_ROWS],
}

impl KeyMap {
    /// Standard membrane keypad layout.
    pub const STANDARD: KeyMap = KeyMap {
        layout: [
            ['1', '2', '3', 'A'],
            ['4', '5', '6', 'B'],
            ['7', '8', '9', 'C'],
            ['*', '0', '#', 'D'],
        ],
    };

    /// Custom layout.
    pub const fn new(layout: [[char; KEYPAD_COLS]; KEYPAD_ROWS]) -> Self {
        Self { layout }
    }

    /// Key at a matrix position, if the position exists and maps to a keypad key.
    pub fn key_at(&self, row: usize, col: usize) -> Option<Key> {
        let c = *self.layout.get(row)?.get(col)?;
        Key::new(c)
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Blocking keypad scanner.
pub trait KeypadScanner {
    /// Block until the next key press and return its character.
    ///
    /// `None` means the scanner has shut down.
    fn next_key(&mut self) -> Option<char>;
}

/// Forwards scanned keys to the event queue.
#[derive(Debug)]
pub struct KeypadProducer<K: KeypadScanner, S: EventSender> {
    scanner: K,
    sender: S,
}

impl<K: KeypadScanner, S: EventSender> KeypadProducer<K, S> {
    /// Create a producer.
    pub fn new(scanner: K, sender: S) -> Self {
        Self { scanner, sender }
    }

    /// Wait for one key and forward it.
    ///
    /// Returns `false` once the scanner has shut down or the queue is closed.
    /// Unknown characters and dropped events are logged and skipped.
    pub fn pump(&mut self) -> bool {
        let Some(c) = self.scanner.next_key() else {
            return false;
        };

        let Some(event) = Event::key(c) else {
            log::warn!(target: LOG_TARGET, "keypad: ignoring unknown key {:?}", c);
            return true;
        };

        match self.sender.send(event) {
            Ok(()) => true,
            Err(SendError::Full(_)) => {
                log::warn!(target: LOG_TARGET, "keypad: queue full, key dropped");
                true
            }
            Err(SendError::Disconnected(_)) => {
                log::error!(target: LOG_TARGET, "keypad: event queue closed");
                false
            }
        }
    }

    /// Forward keys until the scanner shuts down or the queue closes.
    pub fn run(&mut self) {
        while self.pump() {}
        log::info!(target: LOG_TARGET, "keypad producer stopped");
    }
}
