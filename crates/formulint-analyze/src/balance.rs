//! Parenthesis balance over scan-state-aware text.

use crate::scan::ScanState;

/// Outcome of one balance pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceReport {
    pub open_parens: usize,
    pub close_parens: usize,
    /// Byte offset of the first `)` with no matching `(`. Recorded once;
    /// depth is clamped back to zero so one stray closer does not cascade
    /// into misreporting everything after it.
    pub first_extra_closing: Option<usize>,
    /// Byte offsets of `(` still open at end of text, outermost first.
    pub unmatched_opens: Vec<usize>,
}

impl BalanceReport {
    pub fn is_balanced(&self) -> bool {
        self.first_extra_closing.is_none() && self.unmatched_opens.is_empty()
    }
}

/// Count parens outside strings, comments, and brace literals.
///
/// Brace-literal regions are skipped entirely: parens inside `{...}` neither
/// open nor close.
pub fn analyze_balance(text: &str) -> BalanceReport {
    let bytes = text.as_bytes();
    let mut state = ScanState::default();
    let mut report = BalanceReport::default();
    let mut open_stack: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let before = state;
        let consumed = state.step(bytes, i);

        if !before.in_quotes() && !before.in_comment() && before.brace_depth == 0 {
            match bytes[i] {
                b'(' => {
                    report.open_parens += 1;
                    open_stack.push(i);
                }
                b')' => {
                    report.close_parens += 1;
                    if open_stack.pop().is_none() && report.first_extra_closing.is_none() {
                        report.first_extra_closing = Some(i);
                    }
                }
                _ => {}
            }
        }

        i += consumed;
    }

    report.unmatched_opens = open_stack;
    report
}
