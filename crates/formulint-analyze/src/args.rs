//! Argument-list segmentation for function calls.

use smallvec::SmallVec;

use crate::scan::ScanState;

/// One comma-delimited segment of an argument list. Offsets are relative to
/// the segmented substring, not the enclosing formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSegment {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Result of segmenting one argument-list substring.
#[derive(Debug, Clone, Default)]
pub struct SegmentedArgs {
    pub segments: Vec<ParameterSegment>,
    /// Indices into `segments` whose trimmed text is empty.
    pub empty_segments: SmallVec<[usize; 4]>,
    pub actual_count: usize,
}

/// Split `params` at commas at brace depth 0 and paren depth 0, outside any
/// string, with scan state re-initialized for this substring.
///
/// An entirely empty, comma-free input yields zero segments (a truly empty
/// argument list); `,` alone yields two empty segments (two explicit empty
/// arguments).
pub fn segment_arguments(params: &str) -> SegmentedArgs {
    let bytes = params.as_bytes();
    let mut state = ScanState::default();
    let mut cuts: Vec<usize> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b','
            && !state.in_quotes()
            && !state.in_comment()
            && state.brace_depth == 0
            && state.paren_depth == 0
        {
            cuts.push(i);
        }
        i += state.step(bytes, i);
    }

    if cuts.is_empty() && params.trim().is_empty() {
        return SegmentedArgs::default();
    }

    let mut segments = Vec::with_capacity(cuts.len() + 1);
    let mut empty_segments = SmallVec::new();
    let mut seg_start = 0usize;
    for cut in cuts.into_iter().chain(std::iter::once(params.len())) {
        let text = &params[seg_start..cut];
        if text.trim().is_empty() {
            empty_segments.push(segments.len());
        }
        segments.push(ParameterSegment {
            start: seg_start,
            end: cut,
            text: text.to_string(),
        });
        seg_start = cut + 1;
    }

    let actual_count = segments.len();
    SegmentedArgs {
        segments,
        empty_segments,
        actual_count,
    }
}

/// Find the `)` matching the `(` at `open_index`, scanning forward with
/// quote- and depth-aware state. Returns `None` when the call is
/// unterminated or `open_index` does not sit on a `(`.
pub fn find_closing_paren(text: &str, open_index: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open_index) != Some(&b'(') {
        return None;
    }

    let mut state = ScanState::default();
    let mut depth = 0usize;
    let mut i = open_index;

    while i < bytes.len() {
        let before = state;
        let b = bytes[i];
        if !before.in_quotes() && !before.in_comment() && before.brace_depth == 0 {
            match b {
                b'(' => depth += 1,
                b')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        i += state.step(bytes, i);
    }

    None
}
