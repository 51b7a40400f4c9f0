//! Character display abstraction.
//!
//! The terminal renders to a 2-row fixed-width character LCD. All rendering goes
//! through [`Frame`], a fully laid-out screen image; the [`CharDisplay`] trait
//! only has to copy it to the device.

pub mod format;

pub use format::{render_amount, render_message, render_pin};

use core::fmt;

/// Number of display rows.
pub const LCD_ROWS: usize = 2;

/// Number of display columns.
pub const LCD_COLUMNS: usize = 16;

/// One display row, always exactly [`LCD_COLUMNS`] characters.
pub type Row = heapless::String<LCD_COLUMNS>;

/// A complete screen image: two rows padded with spaces to full width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    rows: [Row; LCD_ROWS],
}

impl Frame {
    /// Blank frame (all spaces).
    pub fn blank() -> Self {
        Self {
            rows: [padded(""), padded("")],
        }
    }

    /// Frame with a header row and a data row. Text beyond the width is cut.
    pub fn text(top: &str, bottom: &str) -> Self {
        Self {
            rows: [padded(top), padded(bottom)],
        }
    }

    /// Row contents (`0` = header, `1` = data).
    pub fn row(&self, index: usize) -> &str {
        self.rows.get(index).map(|r| r.as_str()).unwrap_or("")
    }

    /// Both rows.
    pub fn rows(&self) -> &[Row; LCD_ROWS] {
        &self.rows
    }

    /// Overwrite a single cell. Out-of-range positions and non-ASCII are ignored.
    pub(crate) fn put(&mut self, row: usize, col: usize, c: char) {
        if !c.is_ascii() || col >= LCD_COLUMNS {
            return;
        }
        let Some(current) = self.rows.get(row) else {
            return;
        };

        let mut rebuilt = Row::new();
        for (i, existing) in current.chars().enumerate() {
            let _ = rebuilt.push(if i == col { c } else { existing });
        }
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = rebuilt;
        }
    }

    /// Write `text` into `row` starting at `col`, clipped at the right edge.
    pub(crate) fn put_str(&mut self, row: usize, col: usize, text: &str) {
        for (offset, c) in text.chars().enumerate() {
            self.put(row, col.saturating_add(offset), c);
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::blank()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.rows[0], self.rows[1])
    }
}

fn padded(text: &str) -> Row {
    let mut row = Row::new();
    for c in text.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()) {
        if row.push(c).is_err() {
            break;
        }
    }
    while row.push(' ').is_ok() {}
    row
}

/// Platform-agnostic character display.
///
/// Only the terminal's control thread touches the display; producers never
/// render.
pub trait CharDisplay {
    /// Platform-specific error type
    type Error: fmt::Debug;

    /// Blank the screen.
    fn clear(&mut self) -> Result<(), Self::Error>;

    /// Replace the screen contents with `frame`.
    fn draw(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}
