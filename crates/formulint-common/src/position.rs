//! Byte-offset to editor-coordinate conversion.
//!
//! Scanning works in byte offsets; diagnostics are reported in the hosting
//! editor's convention of 1-based lines and 1-based character columns.

/// Convert a byte offset into a 1-based `(line, column)` pair.
///
/// The offset is clamped to the text length (and snapped back to the nearest
/// char boundary), so an offset "one past the end" addresses the position
/// just after the last character (the natural spot for end-of-input
/// diagnostics).
pub fn line_col_at(text: &str, byte_offset: usize) -> (u32, u32) {
    let mut clamped = byte_offset.min(text.len());
    while clamped > 0 && !text.is_char_boundary(clamped) {
        clamped -= 1;
    }

    let mut line = 1u32;
    let mut line_start = 0usize;
    for (i, b) in text.bytes().enumerate().take(clamped) {
        if b == b'\n' {
            line += 1;
            line_start = i + 1;
        }
    }

    let column = text[line_start..clamped].chars().count() as u32 + 1;
    (line, column)
}
