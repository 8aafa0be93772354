//! Line-oriented detection of text disconnected from the main expression.
//!
//! Scan state is carried across lines: a line is a legitimate continuation
//! when the previous line ended inside an unterminated string, block
//! comment, or open paren/brace, or when its own trimmed text starts with a
//! continuation token. Everything else after the expression has started is
//! stray.

use crate::scan::ScanState;

/// One stray line, in 1-based editor coordinates. `end_column` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrayLine {
    pub line_number: u32,
    pub start_column: u32,
    pub end_column: u32,
}

/// Leading tokens that tie a line to the expression above it.
fn starts_with_continuation(trimmed: &str, entry: &ScanState) -> bool {
    let Some(first) = trimmed.chars().next() else {
        return false;
    };
    match first {
        '+' | '-' | '*' | '/' | '^' | '&' | '=' | ')' => true,
        ',' => entry.paren_depth > 0,
        ':' => entry.brace_depth > 0,
        _ => false,
    }
}

/// The line's content with comment chars blanked, aligned char-for-char with
/// the original so column math holds.
fn visible_line(line: &str, state: &mut ScanState) -> String {
    let bytes = line.as_bytes();
    let mut out = String::with_capacity(line.len());
    let mut i = 0;

    while i < bytes.len() {
        let before = *state;
        let consumed = state.step(bytes, i);
        let mut end = (i + consumed).min(bytes.len());
        while end < bytes.len() && !line.is_char_boundary(end) {
            end += 1;
        }

        let in_comment = before.in_comment() || state.in_comment();
        for ch in line[i..end].chars() {
            out.push(if in_comment { ' ' } else { ch });
        }
        i = end;
    }

    state.at_line_end();
    out
}

/// Report lines whose content is disconnected from the expression being
/// built, ordered by line number.
pub fn detect_stray_lines(text: &str) -> Vec<StrayLine> {
    let mut out = Vec::new();
    let mut state = ScanState::default();
    let mut started = false;
    let mut line_number = 0u32;

    for line in text.split('\n') {
        line_number += 1;
        let entry = state;
        let visible = visible_line(line, &mut state);
        let trimmed = visible.trim();

        if !started {
            if trimmed.starts_with('=') {
                started = true;
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if entry.is_open() {
            continue;
        }
        if starts_with_continuation(trimmed, &entry) {
            continue;
        }

        let lead = visible.chars().take_while(|c| c.is_whitespace()).count() as u32;
        let content_end = visible.trim_end().chars().count() as u32;
        out.push(StrayLine {
            line_number,
            start_column: lead + 1,
            end_column: content_end + 1,
        });
    }

    out
}
