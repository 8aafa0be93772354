pub mod args;
pub mod balance;
pub mod engine;
pub mod refs;
pub mod scan;
pub mod signature;
pub mod stray;
pub mod strip;

pub use args::{ParameterSegment, SegmentedArgs, find_closing_paren, segment_arguments};
pub use balance::{BalanceReport, analyze_balance};
pub use engine::{Analyzer, TrialEvaluator};
pub use refs::{Reference, detect_references};
pub use scan::{ScanState, is_inside_quotes};
pub use signature::{SignatureCache, resolve_signature};
pub use stray::{StrayLine, detect_stray_lines};
pub use strip::{strip_comments, strip_comments_compact};

// Re-export common types
pub use formulint_common::{
    Diagnostic, DiagnosticCode, EvalError, FunctionCatalog, FunctionSignatureInfo, FunctionSpec,
    Severity,
};

/// One-shot convenience: analyze a single snapshot with a fresh session and
/// no evaluation probe. Hosts that analyze repeatedly should hold an
/// [`Analyzer`] instead to reuse its signature cache.
pub fn analyze(text: &str, catalog: FunctionCatalog) -> Vec<Diagnostic> {
    Analyzer::new(catalog).analyze(text, None)
}
