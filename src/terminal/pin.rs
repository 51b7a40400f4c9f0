//! PIN entry buffer.
//!
//! Plaintext digits live only in this buffer. [`PinBuffer::finalize`] hashes
//! them and wipes the buffer; the buffer is also wiped on drop.

use crate::error::SignError;
use crate::event::{Key, KeyRole};
use crate::security::{HexDigest, hash_sha256};

/// Storage capacity for PIN digits.
pub const PIN_CAPACITY: usize = 8;

/// Effect of a key on the PIN buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinInput {
    /// Digit added or removed; redraw
    Changed,

    /// Key had no effect
    Ignored,

    /// Accept pressed with the required number of digits
    Accept,

    /// Accept pressed before the PIN was complete
    TooShort,

    /// Cancel pressed
    Cancel,
}

/// Masked PIN accumulator.
pub struct PinBuffer {
    digits: [u8; PIN_CAPACITY],
    len: usize,
    required: usize,
}

impl PinBuffer {
    /// Buffer accepting exactly `required` digits (clamped to `1..=PIN_CAPACITY - 1`).
    pub fn new(required: usize) -> Self {
        Self {
            digits: [0; PIN_CAPACITY],
            len: 0,
            required: required.clamp(1, PIN_CAPACITY - 1),
        }
    }

    /// Digits entered so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if no digit has been entered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Digits needed before accept is honored.
    pub fn required(&self) -> usize {
        self.required
    }

    /// Apply one key.
    pub fn apply(&mut self, key: Key) -> PinInput {
        match key.role() {
            KeyRole::Digit(d) => {
                if self.len >= self.required {
                    return PinInput::Ignored;
                }
                match self.digits.get_mut(self.len) {
                    Some(slot) => {
                        *slot = d as u8;
                        self.len += 1;
                        PinInput::Changed
                    }
                    None => PinInput::Ignored,
                }
            }
            KeyRole::Delete => {
                if self.len == 0 {
                    return PinInput::Ignored;
                }
                self.len -= 1;
                if let Some(slot) = self.digits.get_mut(self.len) {
                    *slot = 0;
                }
                PinInput::Changed
            }
            KeyRole::Accept if self.len == self.required => PinInput::Accept,
            KeyRole::Accept => PinInput::TooShort,
            KeyRole::Cancel => PinInput::Cancel,
            KeyRole::Decimal | KeyRole::Other => PinInput::Ignored,
        }
    }

    /// Hash the entered digits and wipe the plaintext.
    pub fn finalize(&mut self) -> Result<HexDigest, SignError> {
        let hashed = hash_sha256(self.digits.get(..self.len).unwrap_or(&[]));
        self.wipe();
        hashed
    }

    fn wipe(&mut self) {
        self.digits.fill(0);
        self.len = 0;
    }
}

impl Drop for PinBuffer {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl core::fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PinBuffer")
            .field("len", &self.len)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate std;
    use std::format;

    fn press(pin: &mut PinBuffer, keys: &str) -> PinInput {
        let mut last = PinInput::Ignored;
        for c in keys.chars() {
            last = pin.apply(Key::new(c).unwrap());
        }
        last
    }

    #[test]
    fn test_accept_requires_full_length() {
        let mut pin = PinBuffer::new(4);
        assert_eq!(press(&mut pin, "123"), PinInput::Changed);
        assert_eq!(pin.apply(Key::ACCEPT), PinInput::TooShort);
        assert_eq!(pin.len(), 3);
        assert_eq!(press(&mut pin, "4"), PinInput::Changed);
        assert_eq!(pin.apply(Key::ACCEPT), PinInput::Accept);
    }

    #[test]
    fn test_extra_digits_ignored() {
        let mut pin = PinBuffer::new(4);
        press(&mut pin, "1234");
        assert_eq!(pin.apply(Key::new('5').unwrap()), PinInput::Ignored);
        assert_eq!(pin.len(), 4);
    }

    #[test]
    fn test_delete() {
        let mut pin = PinBuffer::new(4);
        assert_eq!(pin.apply(Key::DELETE), PinInput::Ignored);
        press(&mut pin, "12");
        assert_eq!(pin.apply(Key::DELETE), PinInput::Changed);
        assert_eq!(pin.len(), 1);
        press(&mut pin, "999");
        assert_eq!(pin.apply(Key::ACCEPT), PinInput::Accept);
        assert_eq!(
            pin.finalize().unwrap(),
            hash_sha256(b"1999").unwrap()
        );
    }

    #[test]
    fn test_non_digit_keys() {
        let mut pin = PinBuffer::new(4);
        assert_eq!(pin.apply(Key::CANCEL), PinInput::Cancel);
        assert_eq!(pin.apply(Key::DECIMAL), PinInput::Ignored);
        assert_eq!(pin.apply(Key::new('#').unwrap()), PinInput::Ignored);
        assert!(pin.is_empty());
    }

    #[test]
    fn test_finalize_hashes_and_wipes() {
        let mut pin = PinBuffer::new(4);
        press(&mut pin, "1234");
        let hashed = pin.finalize().unwrap();

        assert_eq!(
            hashed.as_str(),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
        assert!(pin.is_empty());
        assert_eq!(pin.digits, [0; PIN_CAPACITY]);
    }

    #[test]
    fn test_required_is_clamped() {
        assert_eq!(PinBuffer::new(0).required(), 1);
        assert_eq!(PinBuffer::new(32).required(), PIN_CAPACITY - 1);
    }

    #[test]
    fn test_debug_hides_digits() {
        let mut pin = PinBuffer::new(4);
        press(&mut pin, "9876");
        let debug = format!("{:?}", pin);
        assert!(!debug.contains("9876"));
        assert!(!debug.contains("57"));
    }
}
