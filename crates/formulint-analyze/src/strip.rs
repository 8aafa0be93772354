//! Comment removal over raw formula text.
//!
//! Two variants share one scanning pass:
//!
//! - [`strip_comments`] is layout-preserving: every comment byte becomes a
//!   space, newlines survive, and the output has the same byte length as the
//!   input, so downstream byte offsets stay valid against the original text.
//! - [`strip_comments_compact`] removes comment bytes entirely (keeping line
//!   breaks), the form submitted to the evaluation engine.
//!
//! Neither variant touches content the scan state machine classifies as
//! inside a string or sheet-name quote.

use crate::scan::ScanState;

/// Replace comment content with spaces, preserving layout.
pub fn strip_comments(text: &str) -> String {
    strip_impl(text, true)
}

/// Remove comment content entirely, keeping line breaks.
pub fn strip_comments_compact(text: &str) -> String {
    strip_impl(text, false)
}

fn strip_impl(text: &str, preserve_layout: bool) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::default();
    let mut i = 0;

    while i < bytes.len() {
        let before = state;
        let consumed = state.step(bytes, i);

        // `step` only recognizes ASCII; widen to the char boundary so the
        // slice below stays valid when a multi-byte char sits in the text.
        let mut end = (i + consumed).min(bytes.len());
        while end < bytes.len() && !text.is_char_boundary(end) {
            end += 1;
        }

        let in_comment = before.in_comment() || state.in_comment();
        if in_comment {
            for &b in &bytes[i..end] {
                if b == b'\n' {
                    out.push('\n');
                } else if preserve_layout {
                    out.push(' ');
                }
            }
        } else {
            out.push_str(&text[i..end]);
        }
        i = end;
    }

    out
}
