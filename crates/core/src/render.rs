//! Display rendering for tokens.
//!
//! Token bytes are decoded lossily and every character in the Unicode
//! "Other" categories we can recognise (controls, format characters,
//! surrogates, private use) is written as `\uXXXX`, so a rendered token never
//! carries raw control bytes into a text file.

use std::fmt::Write;

/// Whether `ch` should be escaped when displayed.
pub fn is_other_char(ch: char) -> bool {
    if ch.is_control() {
        return true;
    }
    matches!(
        u32::from(ch),
        // Cf
        0x00AD
            | 0x0600..=0x0605
            | 0x061C
            | 0x06DD
            | 0x070F
            | 0x0890..=0x0891
            | 0x08E2
            | 0x180E
            | 0x200B..=0x200F
            | 0x202A..=0x202E
            | 0x2060..=0x2064
            | 0x2066..=0x206F
            | 0xFEFF
            | 0xFFF9..=0xFFFB
            | 0x110BD
            | 0x110CD
            | 0x13430..=0x1343F
            | 0x1BCA0..=0x1BCA3
            | 0x1D173..=0x1D17A
            | 0xE0001
            | 0xE0020..=0xE007F
            // Co
            | 0xE000..=0xF8FF
            | 0xF0000..=0xFFFFD
            | 0x100000..=0x10FFFD
    )
}

/// Replace control-like characters with `\uXXXX` escapes.
pub fn replace_control_characters(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if is_other_char(ch) {
            // Writing to a String cannot fail
            let _ = write!(out, "\\u{:04x}", u32::from(ch));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Render token bytes for display.
pub fn render_token(bytes: &[u8]) -> String {
    replace_control_characters(&String::from_utf8_lossy(bytes))
}
