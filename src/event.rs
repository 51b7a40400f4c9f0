//! Event model shared by the producers and the terminal state machine.
//!
//! Every producer translates its hardware signal into an [`Event`] and pushes it
//! through an [`EventSender`]; the terminal is the single consumer and pulls
//! events through an [`EventReceiver`]. Ordering is strict FIFO.

use core::fmt;
use core::time::Duration;

/// Fixed capacity of the event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 10;

/// Maximum length of a card identifier carried in an event.
pub const CARD_ID_MAX_LEN: usize = 29;

/// Key character on the 4x4 keypad.
///
/// Only `0-9`, `A-D`, `*` and `#` are representable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Key(char);

/// What a key means to the payment flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum KeyRole {
    /// Numeric key (carries the digit character)
    Digit(char),

    /// Confirm the current step / open a new payment ('A')
    Accept,

    /// Abort the current step ('C')
    Cancel,

    /// Remove the last character ('D')
    Delete,

    /// Decimal separator ('*')
    Decimal,

    /// No assigned meaning ('B', '#')
    Other,
}

impl Key {
    /// Accept / new payment key.
    pub const ACCEPT: Key = Key('A');
    /// Cancel key.
    pub const CANCEL: Key = Key('C');
    /// Delete key.
    pub const DELETE: Key = Key('D');
    /// Decimal separator key.
    pub const DECIMAL: Key = Key('*');

    /// Validate a keypad character.
    pub const fn new(c: char) -> Option<Self> {
        match c {
            '0'..='9' | 'A' | 'B' | 'C' | 'D' | '*' | '#' => Some(Key(c)),
            _ => None,
        }
    }

    /// The raw keypad character.
    pub const fn as_char(&self) -> char {
        self.0
    }

    /// Classify the key.
    pub const fn role(&self) -> KeyRole {
        match self.0 {
            '0'..='9' => KeyRole::Digit(self.0),
            'A' => KeyRole::Accept,
            'C' => KeyRole::Cancel,
            'D' => KeyRole::Delete,
            '*' => KeyRole::Decimal,
            _ => KeyRole::Other,
        }
    }
}

/// Card identifier as decoded by the reader.
///
/// Guaranteed non-empty, printable ASCII, at most [`CARD_ID_MAX_LEN`] chars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardId(heapless::String<CARD_ID_MAX_LEN>);

impl CardId {
    /// Validate decoded UID text.
    pub fn new(text: &str) -> Option<Self> {
        if text.is_empty() || !text.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
            return None;
        }
        let mut id = heapless::String::new();
        id.push_str(text).ok()?;
        Some(Self(id))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event delivered to the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Keypad key pressed (keypad producer)
    KeyPress(Key),

    /// Card identifier decoded (card reader producer)
    CardScanned(CardId),

    /// Card present but identifier rejected (card reader producer)
    ScanFailed,

    /// Wi-Fi link state changed (connectivity producer)
    ConnectivityChanged {
        /// New link state
        connected: bool,
    },
}

impl Event {
    /// Key press event from a raw character, if it is a keypad key.
    pub fn key(c: char) -> Option<Self> {
        Key::new(c).map(Event::KeyPress)
    }

    /// Short name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::KeyPress(_) => "key",
            Event::CardScanned(_) => "card",
            Event::ScanFailed => "scan-failed",
            Event::ConnectivityChanged { .. } => "wifi",
        }
    }
}

/// Queue send failure. The rejected event is handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// Queue stayed full for the whole send window; event dropped
    Full(Event),

    /// Consumer side is gone
    Disconnected(Event),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Full(ev) => write!(f, "Queue full, dropped {} event", ev.kind()),
            SendError::Disconnected(ev) => {
                write!(f, "Queue closed, dropped {} event", ev.kind())
            }
        }
    }
}

/// Producer side of the event queue.
///
/// Implementations must bound how long `send` blocks when the queue is full;
/// on expiry the event is dropped and returned in [`SendError::Full`].
pub trait EventSender {
    /// Push an event to the back of the queue.
    fn send(&self, event: Event) -> Result<(), SendError>;
}

/// Consumer side of the event queue.
pub trait EventReceiver {
    /// Pop the oldest event.
    ///
    /// `None` timeout blocks until an event arrives. Returns `None` when the
    /// timeout elapses (or the queue can never deliver again).
    fn receive(&mut self, timeout: Option<Duration>) -> Option<Event>;

    /// Discard every pending event.
    fn reset(&mut self);
}

impl<T: EventSender + ?Sized> EventSender for &T {
    fn send(&self, event: Event) -> Result<(), SendError> {
        (**self).send(event)
    }
}
