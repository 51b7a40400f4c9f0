//! Pure screen layout functions.

use super::{Frame, LCD_COLUMNS};

/// Amount entry screen.
///
/// Row 0 holds the prompt; row 1 holds `<amount> <currency>` right-aligned.
/// The amount is cut from the right if amount and currency do not fit.
pub fn render_amount(prompt: &str, amount: &str, currency: &str) -> Frame {
    let mut frame = Frame::text(prompt, "");

    let currency_len = currency.len().min(LCD_COLUMNS);
    let room = LCD_COLUMNS.saturating_sub(currency_len.saturating_add(1));
    let shown = amount.get(..amount.len().min(room)).unwrap_or("");

    let used = shown.len().saturating_add(1).saturating_add(currency_len);
    let start = LCD_COLUMNS.saturating_sub(used);
    frame.put_str(1, start, shown);
    frame.put_str(1, start.saturating_add(shown.len()).saturating_add(1), currency);
    frame
}

/// Masked PIN entry screen.
///
/// Row 0 holds the header; row 1 holds the prompt followed by one `*` per
/// entered digit. The prompt is shortened so that `max_pin_len` stars always fit.
pub fn render_pin(header: &str, prompt: &str, entered: usize, max_pin_len: usize) -> Frame {
    let mut frame = Frame::text(header, "");

    let max_pin_len = max_pin_len.min(LCD_COLUMNS);
    let prompt_room = LCD_COLUMNS.saturating_sub(max_pin_len);
    let prompt = prompt.get(..prompt.len().min(prompt_room)).unwrap_or("");
    frame.put_str(1, 0, prompt);

    for i in 0..entered.min(max_pin_len) {
        frame.put(1, prompt.len().saturating_add(i), '*');
    }
    frame
}

/// Status message screen.
///
/// An explicit `\n` splits the rows. Otherwise text longer than one row wraps
/// at the last space that keeps the first row within the display, or mid-word
/// if the first row has no space.
pub fn render_message(text: &str) -> Frame {
    if let Some((top, bottom)) = text.split_once('\n') {
        return Frame::text(top, bottom);
    }

    let Some((limit, _)) = text.char_indices().nth(LCD_COLUMNS) else {
        return Frame::text(text, "");
    };

    let (head, rest) = text.split_at(limit);
    let space = if rest.starts_with(' ') {
        Some(limit)
    } else {
        head.rfind(' ')
    };
    match space {
        Some(space) if space > 0 => {
            let (top, bottom) = text.split_at(space);
            Frame::text(top.trim_end(), bottom.trim_start())
        }
        _ => {
            let (top, bottom) = text.split_at(limit);
            Frame::text(top, bottom.trim_start())
        }
    }
}
