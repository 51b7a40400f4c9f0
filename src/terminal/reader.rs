//! Card reader control.

use core::fmt;

/// Contactless card reader.
///
/// Only the terminal's control thread enables or disables the reader.
/// Decoded cards arrive separately, through the event queue.
pub trait CardReader {
    /// Platform-specific error type
    type Error: fmt::Debug;

    /// Start scanning for cards.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Stop scanning.
    fn disable(&mut self);
}

/// Scanning window on a [`CardReader`].
///
/// The reader is enabled when the session starts and disabled when the
/// session is dropped, so each successful `enable` is paired with exactly one
/// `disable`.
#[derive(Debug)]
pub struct ReaderSession<'a, R: CardReader> {
    reader: &'a mut R,
}

impl<'a, R: CardReader> ReaderSession<'a, R> {
    /// Enable the reader. Nothing needs undoing if this fails.
    pub fn start(reader: &'a mut R) -> Result<Self, R::Error> {
        reader.enable()?;
        log::debug!(target: "pluto::terminal", "card reader enabled");
        Ok(Self { reader })
    }
}

impl<R: CardReader> Drop for ReaderSession<'_, R> {
    fn drop(&mut self) {
        self.reader.disable();
        log::debug!(target: "pluto::terminal", "card reader disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingReader {
        enabled: u32,
        disabled: u32,
        fail: bool,
    }

    impl CardReader for CountingReader {
        type Error = ();

        fn enable(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.enabled += 1;
            Ok(())
        }

        fn disable(&mut self) {
            self.disabled += 1;
        }
    }

    #[test]
    fn test_session_pairs_enable_and_disable() {
        let mut reader = CountingReader::default();
        {
            let _session = ReaderSession::start(&mut reader).unwrap();
        }
        assert_eq!((reader.enabled, reader.disabled), (1, 1));
    }

    #[test]
    fn test_failed_start_does_not_disable() {
        let mut reader = CountingReader {
            fail: true,
            ..Default::default()
        };
        assert!(ReaderSession::start(&mut reader).is_err());
        assert_eq!((reader.enabled, reader.disabled), (0, 0));
    }
}
