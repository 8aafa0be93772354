//! The diagnostic rule engine.
//!
//! One [`Analyzer::analyze`] call is a complete, stateless pass over a text
//! snapshot: normalize, then run every rule against the comment-stripped
//! text, then (when parens are balanced) probe the external evaluation
//! engine once. The only state surviving across calls is the append-only
//! signature cache.

use rustc_hash::FxHashSet;

use formulint_common::{Diagnostic, DiagnosticCode, EvalError, FunctionCatalog};

use crate::args::{find_closing_paren, segment_arguments};
use crate::balance::analyze_balance;
use crate::refs::detect_references;
use crate::scan::ScanState;
use crate::signature::SignatureCache;
use crate::stray::detect_stray_lines;
use crate::strip::{strip_comments, strip_comments_compact};

/// Boundary to the external evaluation engine.
///
/// Implementations evaluate at a sentinel, off-grid address; the engine
/// calls [`TrialEvaluator::clear_sentinel`] after every probe, success or
/// failure, so the write never becomes user-visible.
pub trait TrialEvaluator {
    fn trial_evaluate(&mut self, formula: &str) -> Result<(), EvalError>;
    fn clear_sentinel(&mut self);
}

/// Message substrings marking an evaluation failure as a runtime condition
/// (unresolved reference, bad value, ...) rather than a structural parse
/// failure. Heuristic: a message the denylist does not anticipate may still
/// be misclassified.
const RUNTIME_ERROR_TOKENS: &[&str] = &["ref", "name", "value", "div", "num", "na", "#"];

fn is_structural_failure(err: &EvalError) -> bool {
    let lower = err.message.to_ascii_lowercase();
    !RUNTIME_ERROR_TOKENS.iter().any(|t| lower.contains(t))
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Walk back from `end` (exclusive) over word bytes.
fn word_start(bytes: &[u8], end: usize) -> usize {
    let mut s = end;
    while s > 0 && is_word_byte(bytes[s - 1]) {
        s -= 1;
    }
    s
}

/// The analysis engine for one editing session.
///
/// Owns the (read-only) function catalog, the named-range set, and the
/// per-session signature cache. Safe to call as often as the host debounces
/// to; each pass is a pure function of the text snapshot.
pub struct Analyzer {
    catalog: FunctionCatalog,
    named_ranges: FxHashSet<String>,
    signatures: SignatureCache,
}

impl Analyzer {
    pub fn new(catalog: FunctionCatalog) -> Self {
        Analyzer {
            catalog,
            named_ranges: FxHashSet::default(),
            signatures: SignatureCache::new(),
        }
    }

    /// Register user-defined names the identifier rule should accept.
    pub fn with_named_ranges<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.named_ranges = names
            .into_iter()
            .map(|n| n.into().to_ascii_uppercase())
            .collect();
        self
    }

    pub fn catalog(&self) -> &FunctionCatalog {
        &self.catalog
    }

    /// Run every rule over one text snapshot.
    ///
    /// The result is not ordered by priority; presentation layers may sort
    /// by severity then position.
    pub fn analyze(
        &mut self,
        text: &str,
        evaluator: Option<&mut dyn TrialEvaluator>,
    ) -> Vec<Diagnostic> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("analyze", bytes = text.len()).entered();

        let mut diags = Vec::new();

        let stripped = strip_comments(text);
        let trimmed = stripped.trim();
        if trimmed.is_empty() || !trimmed.starts_with('=') {
            return diags;
        }

        check_unclosed_string(text, &stripped, &mut diags);

        for stray in detect_stray_lines(text) {
            diags.push(Diagnostic::from_positions(
                DiagnosticCode::StrayText,
                stray.line_number,
                stray.start_column,
                stray.line_number,
                stray.end_column,
                "Text is not connected to the formula",
            ));
        }

        let balance = analyze_balance(&stripped);
        for &open in &balance.unmatched_opens {
            diags.push(Diagnostic::from_span(
                DiagnosticCode::MissingParenthesis,
                text,
                open + 1,
                open + 1,
                "Missing closing parenthesis",
            ));
        }
        if let Some(extra) = balance.first_extra_closing {
            diags.push(Diagnostic::from_span(
                DiagnosticCode::ExtraParenthesis,
                text,
                extra,
                extra + 1,
                "Closing parenthesis has no matching opening parenthesis",
            ));
        }
        let balanced = balance.is_balanced();

        check_punctuation(text, &stripped, balanced, &mut diags);
        check_commas(text, &stripped, balanced, &mut diags);
        self.check_calls(text, &stripped, &mut diags);
        self.check_identifiers(text, &stripped, &mut diags);

        if balanced {
            check_trial_evaluation(text, evaluator, &mut diags);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(count = diags.len(), "analysis pass complete");

        diags
    }

    /// Per-call empty-argument and arity checks for every call whose closing
    /// paren is found.
    fn check_calls(&mut self, text: &str, stripped: &str, diags: &mut Vec<Diagnostic>) {
        let bytes = stripped.as_bytes();
        let mut state = ScanState::default();
        let mut i = 0;

        while i < bytes.len() {
            let before = state;
            let consumed = state.step(bytes, i);

            if bytes[i] == b'('
                && !before.in_quotes()
                && !before.in_comment()
                && before.brace_depth == 0
            {
                let name_start = word_start(bytes, i);
                let name = &stripped[name_start..i];
                let is_call = name
                    .as_bytes()
                    .first()
                    .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_');

                if is_call
                    && let Some(close) = find_closing_paren(stripped, i)
                {
                    let interior = &stripped[i + 1..close];
                    let args = segment_arguments(interior);

                    for &idx in &args.empty_segments {
                        let seg = &args.segments[idx];
                        diags.push(Diagnostic::from_span(
                            DiagnosticCode::EmptyParameter,
                            text,
                            i + 1 + seg.start,
                            i + 1 + seg.end,
                            format!("Argument {} of {name} is empty", idx + 1),
                        ));
                    }

                    if let Some(info) = self.signatures.resolve(name, &self.catalog)
                        && !info.accepts(args.actual_count)
                    {
                        let expected = match (info.min_args, info.max_args) {
                            (min, None) => format!("at least {min}"),
                            (min, Some(max)) if min == max => format!("{min}"),
                            (min, Some(max)) => format!("between {min} and {max}"),
                        };
                        diags.push(Diagnostic::from_span(
                            DiagnosticCode::FunctionSignatureMismatch,
                            text,
                            name_start,
                            close + 1,
                            format!(
                                "{} expects {expected} argument(s), got {}",
                                info.display_name, args.actual_count
                            ),
                        ));
                    }
                }
            }

            i += consumed;
        }
    }

    /// Flag word tokens that resolve to nothing: not a call, not a known
    /// function, not a boolean, not a reference, not a named range.
    fn check_identifiers(&self, text: &str, stripped: &str, diags: &mut Vec<Diagnostic>) {
        let bytes = stripped.as_bytes();
        let refs = detect_references(stripped);
        let mut state = ScanState::default();
        let mut words: Vec<(usize, usize)> = Vec::new();
        let mut run_start: Option<usize> = None;
        let mut i = 0;

        while i < bytes.len() {
            let before = state;
            let consumed = state.step(bytes, i);
            let in_word = consumed == 1
                && is_word_byte(bytes[i])
                && !before.in_quotes()
                && !before.in_comment();

            match (in_word, run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    words.push((start, i));
                    run_start = None;
                }
                _ => {}
            }
            i += consumed;
        }
        if let Some(start) = run_start {
            words.push((start, bytes.len()));
        }

        for (start, end) in words {
            let token = &stripped[start..end];
            let first = token.as_bytes()[0];
            if !(first.is_ascii_alphabetic() || first == b'_') {
                continue;
            }
            if bytes.get(end) == Some(&b'(') {
                continue;
            }
            if self.catalog.contains(token) {
                continue;
            }
            if token.eq_ignore_ascii_case("TRUE") || token.eq_ignore_ascii_case("FALSE") {
                continue;
            }
            if refs.iter().any(|r| start >= r.start && end <= r.end) {
                continue;
            }
            if self.named_ranges.contains(&token.to_ascii_uppercase()) {
                continue;
            }
            diags.push(Diagnostic::from_span(
                DiagnosticCode::InvalidIdentifier,
                text,
                start,
                end,
                format!("Unknown name '{token}'"),
            ));
        }
    }
}

fn check_unclosed_string(text: &str, stripped: &str, diags: &mut Vec<Diagnostic>) {
    let bytes = stripped.as_bytes();
    let mut state = ScanState::default();
    let mut open_at: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let was_inside = state.in_string;
        let consumed = state.step(bytes, i);
        if !was_inside && state.in_string {
            open_at = Some(i);
        }
        i += consumed;
    }

    if state.in_string
        && let Some(open) = open_at
    {
        diags.push(Diagnostic::from_span(
            DiagnosticCode::UnclosedString,
            text,
            open,
            text.len(),
            "String literal is never closed",
        ));
    }
}

/// `VALUE.` patterns: a reference, word, or quoted string immediately
/// followed by a period. Decimal literals (`1.5`) are not offenses.
fn check_punctuation(text: &str, stripped: &str, balanced: bool, diags: &mut Vec<Diagnostic>) {
    let bytes = stripped.as_bytes();
    let mut state = ScanState::default();
    let mut periods: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let before = state;
        let consumed = state.step(bytes, i);

        if bytes[i] == b'.' && !before.in_quotes() && !before.in_comment() && i > 0 {
            let prev = bytes[i - 1];
            if prev == b'"' {
                periods.push(i);
            } else if is_word_byte(prev) {
                let start = word_start(bytes, i);
                let has_letter = stripped[start..i].bytes().any(|b| b.is_ascii_alphabetic());
                if has_letter {
                    periods.push(i);
                }
            }
        }
        i += consumed;
    }

    if periods.is_empty() {
        return;
    }

    let call_span = balanced.then(|| whole_call_span(stripped)).flatten();
    let mut seen: Vec<(usize, usize)> = Vec::new();
    for period in periods {
        let (start, end) = call_span.unwrap_or((period, period + 1));
        if seen.contains(&(start, end)) {
            continue;
        }
        seen.push((start, end));
        diags.push(Diagnostic::from_span(
            DiagnosticCode::PunctuationError,
            text,
            start,
            end,
            "Unexpected '.'; arguments are separated by ','",
        ));
    }
}

/// Span from the first function-call opener's name to the formula's last
/// closing paren.
fn whole_call_span(stripped: &str) -> Option<(usize, usize)> {
    let bytes = stripped.as_bytes();
    let mut state = ScanState::default();
    let mut first_open: Option<usize> = None;
    let mut last_close: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        let before = state;
        let consumed = state.step(bytes, i);

        if !before.in_quotes() && !before.in_comment() && before.brace_depth == 0 {
            match bytes[i] {
                b'(' if first_open.is_none() && i > 0 && is_word_byte(bytes[i - 1]) => {
                    first_open = Some(i);
                }
                b')' => last_close = Some(i),
                _ => {}
            }
        }
        i += consumed;
    }

    let open = first_open?;
    let close = last_close.filter(|&c| c > open)?;
    Some((word_start(bytes, open), close + 1))
}

fn check_commas(text: &str, stripped: &str, balanced: bool, diags: &mut Vec<Diagnostic>) {
    let bytes = stripped.as_bytes();
    let mut state = ScanState::default();
    let mut i = 0;

    while i < bytes.len() {
        let before = state;
        let consumed = state.step(bytes, i);

        if bytes[i] == b',' && !before.in_quotes() && !before.in_comment() {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            match bytes.get(j) {
                Some(b',') => diags.push(Diagnostic::from_span(
                    DiagnosticCode::DoubleComma,
                    text,
                    i,
                    j + 1,
                    "Two commas with nothing between them",
                )),
                Some(b')') => diags.push(Diagnostic::from_span(
                    DiagnosticCode::TrailingComma,
                    text,
                    i,
                    i + 1,
                    "Comma before closing parenthesis",
                )),
                _ => {}
            }
        }
        i += consumed;
    }

    // A comma that is string content (unterminated literal) is not a
    // formula-level trailing comma.
    if balanced && !state.in_quotes() {
        let trimmed = stripped.trim_end();
        if trimmed.ends_with(',') {
            let comma = trimmed.len() - 1;
            diags.push(Diagnostic::from_span(
                DiagnosticCode::EndTrailingComma,
                text,
                comma,
                comma + 1,
                "Formula ends with a comma",
            ));
        }
    }
}

fn check_trial_evaluation(
    text: &str,
    evaluator: Option<&mut dyn TrialEvaluator>,
    diags: &mut Vec<Diagnostic>,
) {
    let Some(evaluator) = evaluator else {
        return;
    };

    let compact = strip_comments_compact(text);
    let formula = compact.trim();
    if formula.is_empty() {
        return;
    }

    let result = evaluator.trial_evaluate(formula);
    evaluator.clear_sentinel();

    if let Err(err) = result
        && is_structural_failure(&err)
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(message = %err.message, "trial evaluation reported a parse failure");

        diags.push(Diagnostic::from_span(
            DiagnosticCode::SyntaxError,
            text,
            0,
            text.len(),
            format!("Formula could not be parsed: {}", err.message),
        ));
    }
}
