//! Card reader producer.
//!
//! The reader driver calls [`CardEventBridge::on_card_present`] from its own
//! callback context whenever a PICC becomes active. The bridge validates the
//! decoded UID and enqueues either [`Event::CardScanned`] or
//! [`Event::ScanFailed`]; it never touches the reader or the display.

use crate::event::{CardId, Event, EventSender};

const LOG_TARGET: &str = "pluto::input";

/// Classify decoded UID text into the event the terminal receives.
pub fn classify_uid(text: &[u8]) -> Event {
    match core::str::from_utf8(text).ok().and_then(CardId::new) {
        Some(id) => Event::CardScanned(id),
        None => Event::ScanFailed,
    }
}

/// Callback target for the card reader driver.
#[derive(Debug)]
pub struct CardEventBridge<S: EventSender> {
    sender: S,
}

impl<S: EventSender> CardEventBridge<S> {
    /// Create a bridge pushing into `sender`.
    pub fn new(sender: S) -> Self {
        Self { sender }
    }

    /// A card became active; `uid_text` is the driver's decoded identifier.
    pub fn on_card_present(&self, uid_text: &[u8]) {
        let event = classify_uid(uid_text);
        match &event {
            Event::CardScanned(id) => log::info!(target: LOG_TARGET, "card read: {}", id),
            _ => log::warn!(target: LOG_TARGET, "card rejected: unreadable identifier"),
        }

        if let Err(err) = self.sender.send(event) {
            log::warn!(target: LOG_TARGET, "card reader: {}", err);
        }
    }

    /// A card left the field.
    pub fn on_card_removed(&self) {
        log::info!(target: LOG_TARGET, "card has been removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{CARD_ID_MAX_LEN, SendError};
    extern crate std;
    use core::cell::RefCell;
    use std::vec::Vec;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<Event>>);

    impl EventSender for Recorder {
        fn send(&self, event: Event) -> Result<(), SendError> {
            self.0.borrow_mut().push(event);
            Ok(())
        }
    }

    #[test]
    fn test_printable_uid_is_scanned() {
        let recorder = Recorder::default();
        let bridge = CardEventBridge::new(&recorder);
        bridge.on_card_present(b"04 A2 1B 7C");

        let events = recorder.0.borrow();
        assert_eq!(
            events.as_slice(),
            &[Event::CardScanned(CardId::new("04 A2 1B 7C").unwrap())]
        );
    }

    #[test]
    fn test_non_printable_uid_fails() {
        assert_eq!(classify_uid(b"04\x00A2"), Event::ScanFailed);
        assert_eq!(classify_uid(&[0xc3, 0x28]), Event::ScanFailed);
        assert_eq!(classify_uid(b""), Event::ScanFailed);
    }

    #[test]
    fn test_oversized_uid_fails() {
        let long = [b'1'; CARD_ID_MAX_LEN + 1];
        assert_eq!(classify_uid(&long), Event::ScanFailed);
    }
}
