//! The scan state machine every other rule consults.
//!
//! Classifies each byte offset of raw formula text as inside/outside a
//! double-quoted string, a single-quoted sheet name, a block comment, or a
//! line comment, and tracks brace and parenthesis depth. Higher-level rules
//! never re-derive quote/comment state on their own; they drive one of these
//! left-to-right and read the flags.

/// Per-offset scanning context, threaded left-to-right over the text.
///
/// Quote and comment flags are mutually exclusive at any offset, except that
/// comment detection is suppressed while inside a quote region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    pub in_string: bool,
    pub in_sheet_name: bool,
    pub in_block_comment: bool,
    pub in_line_comment: bool,
    pub brace_depth: u32,
    pub paren_depth: u32,
}

impl ScanState {
    pub fn in_quotes(&self) -> bool {
        self.in_string || self.in_sheet_name
    }

    pub fn in_comment(&self) -> bool {
        self.in_block_comment || self.in_line_comment
    }

    /// Whether a line ending in this state forces the next line to be read
    /// as a continuation of the same expression.
    pub fn is_open(&self) -> bool {
        self.in_quotes() || self.in_block_comment || self.paren_depth > 0 || self.brace_depth > 0
    }

    /// Consume one or two bytes at `i`, returning how many were consumed.
    ///
    /// Rules in priority order: an open block comment swallows everything up
    /// to `*/`; comment openers (`/*`, `//`) are only recognized outside
    /// quotes; `"` toggles the string flag unless doubled (`""` is an escaped
    /// quote, consumed as a pair without toggling); `'` follows the same
    /// doubling rule for sheet names; braces and parens are only tracked
    /// outside quotes, and parens only while `brace_depth == 0` (array
    /// literals suppress paren counting).
    ///
    /// Total over arbitrary bytes: unknown bytes (including UTF-8
    /// continuation bytes) are consumed one at a time without touching state.
    pub fn step(&mut self, bytes: &[u8], i: usize) -> usize {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        if self.in_block_comment {
            if b == b'*' && next == Some(b'/') {
                self.in_block_comment = false;
                return 2;
            }
            return 1;
        }

        if self.in_line_comment {
            if b == b'\n' {
                self.in_line_comment = false;
            }
            return 1;
        }

        if b == b'/' && !self.in_quotes() {
            match next {
                Some(b'*') => {
                    self.in_block_comment = true;
                    return 2;
                }
                Some(b'/') => {
                    self.in_line_comment = true;
                    return 2;
                }
                _ => {}
            }
        }

        if b == b'"' && !self.in_sheet_name {
            if self.in_string && next == Some(b'"') {
                return 2;
            }
            self.in_string = !self.in_string;
            return 1;
        }

        if b == b'\'' && !self.in_string {
            if self.in_sheet_name && next == Some(b'\'') {
                return 2;
            }
            self.in_sheet_name = !self.in_sheet_name;
            return 1;
        }

        if !self.in_quotes() {
            match b {
                b'{' => self.brace_depth += 1,
                b'}' => self.brace_depth = self.brace_depth.saturating_sub(1),
                b'(' if self.brace_depth == 0 => self.paren_depth += 1,
                b')' if self.brace_depth == 0 => {
                    self.paren_depth = self.paren_depth.saturating_sub(1)
                }
                _ => {}
            }
        }

        1
    }

    /// A line break terminates a line comment (and nothing else).
    pub fn at_line_end(&mut self) {
        self.in_line_comment = false;
    }
}

/// Whether `offset` falls inside a double-quoted string literal.
///
/// Re-scans from the start of the text each call; acceptable at edit-time
/// human-interaction rates.
pub fn is_inside_quotes(text: &str, offset: usize) -> bool {
    let bytes = text.as_bytes();
    let mut state = ScanState::default();
    let mut i = 0;
    while i < bytes.len() && i < offset {
        i += state.step(bytes, i);
    }
    state.in_string
}
