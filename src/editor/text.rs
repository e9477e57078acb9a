//! Text measurement utilities for line editing.
//!
//! Display width is approximated from the UTF-8 encoding: any character that
//! needs more than one byte is treated as a double-width (CJK-style) glyph.
//! This is not a Unicode width table; accented Latin letters also count as 2.

/// Returns the number of terminal columns a character occupies (1 or 2).
pub fn char_width(c: char) -> usize {
    if c.len_utf8() > 1 {
        2
    } else {
        1
    }
}

/// Returns the display width of a string.
pub fn display_width(text: &str) -> usize {
    text.chars().map(char_width).sum()
}

/// Returns the display width of a slice of characters.
pub fn chars_width(chars: &[char]) -> usize {
    chars.iter().copied().map(char_width).sum()
}

/// Find the char index where the token under completion starts.
///
/// The token starts just after the last space in the buffer, or at 0 when the
/// buffer holds a single token.
pub fn token_start(chars: &[char]) -> usize {
    chars
        .iter()
        .rposition(|&c| c == ' ')
        .map(|pos| pos + 1)
        .unwrap_or(0)
}

/// Pads `text` with spaces up to `width` display columns.
pub fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(pad))
}
