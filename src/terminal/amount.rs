//! Amount entry buffer.

use crate::event::{Key, KeyRole};

/// Maximum visible length of an amount, separator included.
pub const MAX_AMOUNT_LEN: usize = 7;

/// Maximum digits after the separator.
pub const MAX_DECIMALS: u8 = 2;

/// Decimal separator stored in the amount.
pub const SEPARATOR: char = '.';

/// Amount string as sent to the server.
pub type Amount = heapless::String<MAX_AMOUNT_LEN>;

/// Effect of a key on the amount buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AmountInput {
    /// Buffer changed; redraw
    Changed,

    /// Key had no effect
    Ignored,

    /// Accept pressed
    Accept,

    /// Cancel pressed
    Cancel,
}

/// Editable amount.
///
/// Never empty: deleting the last character leaves `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountBuffer {
    text: Amount,
    decimals: u8,
    has_separator: bool,
}

impl AmountBuffer {
    /// Fresh buffer showing `"0"`.
    pub fn new() -> Self {
        let mut text = Amount::new();
        let _ = text.push('0');
        Self {
            text,
            decimals: 0,
            has_separator: false,
        }
    }

    /// Current text.
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    /// Digits entered after the separator.
    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Apply one key.
    pub fn apply(&mut self, key: Key) -> AmountInput {
        let changed = match key.role() {
            KeyRole::Digit(d) => self.push_digit(d),
            KeyRole::Decimal => self.push_separator(),
            KeyRole::Delete => self.delete(),
            KeyRole::Accept => return AmountInput::Accept,
            KeyRole::Cancel => return AmountInput::Cancel,
            KeyRole::Other => false,
        };
        if changed {
            AmountInput::Changed
        } else {
            AmountInput::Ignored
        }
    }

    fn push_digit(&mut self, d: char) -> bool {
        if self.text == "0" {
            // Leading zero is a placeholder
            self.text.clear();
            let _ = self.text.push(d);
            return d != '0';
        }
        if self.has_separator && self.decimals >= MAX_DECIMALS {
            return false;
        }
        if self.text.push(d).is_err() {
            return false;
        }
        if self.has_separator {
            self.decimals += 1;
        }
        true
    }

    fn push_separator(&mut self) -> bool {
        // A separator in the last slot could never be followed by a digit
        if self.has_separator || self.text.len() >= MAX_AMOUNT_LEN - 1 {
            return false;
        }
        if self.text.push(SEPARATOR).is_err() {
            return false;
        }
        self.has_separator = true;
        true
    }

    fn delete(&mut self) -> bool {
        if self.text == "0" {
            return false;
        }
        match self.text.pop() {
            Some(SEPARATOR) => {
                self.has_separator = false;
                self.decimals = 0;
            }
            Some(_) if self.has_separator => {
                self.decimals = self.decimals.saturating_sub(1);
            }
            _ => {}
        }
        if self.text.is_empty() {
            let _ = self.text.push('0');
        }
        true
    }

    /// Final amount, without a dangling separator.
    ///
    /// `None` if the amount is zero.
    pub fn finalize(&self) -> Option<Amount> {
        let text = self.text.strip_suffix(SEPARATOR).unwrap_or(&self.text);
        if text.chars().all(|c| c == '0' || c == SEPARATOR) {
            return None;
        }
        let mut out = Amount::new();
        out.push_str(text).ok()?;
        Some(out)
    }
}

impl Default for AmountBuffer {
    fn default() -> Self {
        Self::new()
    }
}
