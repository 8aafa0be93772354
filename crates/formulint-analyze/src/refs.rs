//! Cell and range reference detection.
//!
//! Finds tokens of the shape `[Sheet!]$?A$?1` or `$?A$?1:$?B$?2`, with bare
//! or single-quoted sheet qualifiers, skipping anything inside string
//! literals. Overlapping candidates are not merged; callers needing a
//! canonical key use [`Reference::normalized_key`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::scan::is_inside_quotes;

/// A detected cell or range token.
///
/// `text` is the canonical sheet-stripped form; `start`/`end` are byte
/// offsets into the original text covering the full match including any
/// sheet qualifier. A range (`A1:B2`) is a single `Reference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Reference {
    /// Anchor-stripped, uppercased form: the key callers use to compare
    /// references detected in different spellings (`$a$1` vs `A1`).
    pub fn normalized_key(&self) -> String {
        self.text.replace('$', "").to_ascii_uppercase()
    }
}

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    // sheet qualifier (quoted or bare) then cell, optionally :cell for a range
    Regex::new(
        r"(?:(?:'(?:[^']|'')+'|[A-Za-z_][A-Za-z0-9_]*)!)?(\$?[A-Za-z]{1,3}\$?[0-9]+(?::\$?[A-Za-z]{1,3}\$?[0-9]+)?)",
    )
    .expect("reference pattern is valid")
});

/// Detect reference tokens, ordered by start offset.
pub fn detect_references(text: &str) -> Vec<Reference> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();

    for caps in REFERENCE_RE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(body) = caps.get(1) else { continue };
        let (start, end) = (whole.start(), whole.end());

        // Discard candidates embedded in a longer word (LOG10, 1E5) or
        // glued to an error literal / stray qualifier.
        if start > 0 {
            let prev = bytes[start - 1];
            if prev.is_ascii_alphanumeric() || matches!(prev, b'_' | b'$' | b'!' | b'\'') {
                continue;
            }
        }
        if end < bytes.len() {
            let next = bytes[end];
            if next.is_ascii_alphanumeric() || matches!(next, b'_' | b'(') {
                continue;
            }
        }

        if is_inside_quotes(text, start) {
            continue;
        }

        out.push(Reference {
            text: body.as_str().to_string(),
            start,
            end,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        detect_references(input)
            .into_iter()
            .map(|r| r.text)
            .collect()
    }

    #[test]
    fn plain_cells_and_anchors() {
        assert_eq!(texts("=A1+$B$2"), vec!["A1", "$B$2"]);
        let refs = detect_references("=A1+$B$2");
        assert_eq!((refs[0].start, refs[0].end), (1, 3));
        assert_eq!(refs[1].normalized_key(), "B2");
    }

    #[test]
    fn range_is_one_reference() {
        let refs = detect_references("=SUM(A1:B22)");
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].text, "A1:B22");
    }

    #[test]
    fn sheet_qualifiers_are_stripped_from_text() {
        let refs = detect_references("=Sheet2!A1+'My Sheet'!B2");
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].text, "A1");
        assert_eq!(refs[1].text, "B2");
        // span covers the qualifier
        assert_eq!(refs[0].start, 1);
        assert_eq!(refs[0].end, 10);
    }

    #[test]
    fn references_inside_strings_are_skipped() {
        assert!(detect_references("=\"see A1\"").is_empty());
        assert_eq!(texts("=\"A1\"&B2"), vec!["B2"]);
    }

    #[test]
    fn embedded_candidates_are_discarded() {
        assert!(detect_references("=LOG10(5)").is_empty());
        assert!(detect_references("=1E5+2").is_empty());
        assert!(detect_references("=TOTAL_Q1").is_empty());
    }

    #[test]
    fn ordered_by_start() {
        let refs = detect_references("=C3+A1");
        assert!(refs.windows(2).all(|w| w[0].start < w[1].start));
    }
}
