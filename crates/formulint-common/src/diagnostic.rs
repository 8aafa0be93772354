//! Structured findings produced by the analysis engine.
//!
//! - **`Severity`**       : error vs. warning, ordered so errors sort first
//! - **`DiagnosticCode`** : the closed set of rule identifiers
//! - **`Diagnostic`**     : one finding with its editor-coordinate range
//!
//! Diagnostics are plain values: the engine never signals a finding through
//! an `Err`, so arbitrary garbled input still yields an ordinary list.

use std::fmt;

use crate::position::line_col_at;

/// Source tag attached to every diagnostic this engine emits.
pub const DIAGNOSTIC_SOURCE: &str = "formulint";

/// How serious a finding is.
///
/// `Error` orders before `Warning` so a plain sort surfaces errors first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

/// Every rule the engine can report.
///
/// Names are CamelCase (idiomatic Rust) while `Display` renders the
/// SCREAMING_SNAKE wire form consumed by the editor layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticCode {
    UnclosedString,
    StrayText,
    PunctuationError,
    DoubleComma,
    TrailingComma,
    EndTrailingComma,
    EmptyParameter,
    FunctionSignatureMismatch,
    InvalidIdentifier,
    SyntaxError,
    MissingParenthesis,
    ExtraParenthesis,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnclosedString => "UNCLOSED_STRING",
            Self::StrayText => "STRAY_TEXT",
            Self::PunctuationError => "PUNCTUATION_ERROR",
            Self::DoubleComma => "DOUBLE_COMMA",
            Self::TrailingComma => "TRAILING_COMMA",
            Self::EndTrailingComma => "END_TRAILING_COMMA",
            Self::EmptyParameter => "EMPTY_PARAMETER",
            Self::FunctionSignatureMismatch => "FUNCTION_SIGNATURE_MISMATCH",
            Self::InvalidIdentifier => "INVALID_IDENTIFIER",
            Self::SyntaxError => "SYNTAX_ERROR",
            Self::MissingParenthesis => "MISSING_PARENTHESIS",
            Self::ExtraParenthesis => "EXTRA_PARENTHESIS",
        })
    }
}

impl DiagnosticCode {
    /// Severity a rule reports at. Fixed per code; rules never escalate.
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyParameter | Self::MissingParenthesis => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One finding, addressed in 1-based lines and 1-based character columns.
///
/// Ranges are always valid into the analyzed text: never negative, never past
/// line length + 1. Overlapping ranges across rules are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub start_line: u32,
    pub start_column: u32,
    pub end_line: u32,
    pub end_column: u32,
    pub message: String,
    pub source: &'static str,
    pub code: DiagnosticCode,
}

impl Diagnostic {
    /// Build a diagnostic from a byte span into the analyzed text.
    ///
    /// `start..end` may be zero-width (a caret position) and `end` may sit
    /// one past the final character.
    pub fn from_span(
        code: DiagnosticCode,
        text: &str,
        start: usize,
        end: usize,
        message: impl Into<String>,
    ) -> Self {
        let (start_line, start_column) = line_col_at(text, start);
        let (end_line, end_column) = line_col_at(text, end.max(start));
        Self {
            severity: code.severity(),
            start_line,
            start_column,
            end_line,
            end_column,
            message: message.into(),
            source: DIAGNOSTIC_SOURCE,
            code,
        }
    }

    /// Build a diagnostic from explicit editor coordinates (used by the
    /// line-oriented rules that already work in lines and columns).
    pub fn from_positions(
        code: DiagnosticCode,
        start_line: u32,
        start_column: u32,
        end_line: u32,
        end_column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: code.severity(),
            start_line,
            start_column,
            end_line,
            end_column,
            message: message.into(),
            source: DIAGNOSTIC_SOURCE,
            code,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}:{}-{}:{}: {}",
            self.severity,
            self.code,
            self.start_line,
            self.start_column,
            self.end_line,
            self.end_column,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_maps_to_editor_coordinates() {
        let text = "=SUM(A1)\nA2";
        let d = Diagnostic::from_span(DiagnosticCode::StrayText, text, 9, 11, "stray");
        assert_eq!((d.start_line, d.start_column), (2, 1));
        assert_eq!((d.end_line, d.end_column), (2, 3));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.source, DIAGNOSTIC_SOURCE);
    }

    #[test]
    fn warning_codes_carry_warning_severity() {
        assert_eq!(DiagnosticCode::EmptyParameter.severity(), Severity::Warning);
        assert_eq!(
            DiagnosticCode::MissingParenthesis.severity(),
            Severity::Warning
        );
        assert_eq!(DiagnosticCode::SyntaxError.severity(), Severity::Error);
    }

    #[test]
    fn display_renders_wire_form() {
        assert_eq!(
            DiagnosticCode::FunctionSignatureMismatch.to_string(),
            "FUNCTION_SIGNATURE_MISMATCH"
        );
    }
}
