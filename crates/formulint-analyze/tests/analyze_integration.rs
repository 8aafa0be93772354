use formulint_analyze::{
    Analyzer, Diagnostic, DiagnosticCode, EvalError, FunctionCatalog, FunctionSpec, Severity,
    TrialEvaluator,
};

fn catalog() -> FunctionCatalog {
    FunctionCatalog::new(vec![
        FunctionSpec::new("SUM", "SUM(number1, number2...)", "Adds numbers"),
        FunctionSpec::new(
            "IF",
            "IF(condition, value_if_true, [value_if_false])",
            "Conditional",
        ),
        FunctionSpec::new("CONCATENATE", "CONCATENATE(text1...)", "Joins text"),
        FunctionSpec::new("AVERAGE", "AVERAGE(number1, number2...)", "Mean"),
        FunctionSpec::new("PI", "PI()", "The constant"),
    ])
}

fn analyzer() -> Analyzer {
    Analyzer::new(catalog())
}

fn codes(diags: &[Diagnostic]) -> Vec<DiagnosticCode> {
    diags.iter().map(|d| d.code).collect()
}

fn count(diags: &[Diagnostic], code: DiagnosticCode) -> usize {
    diags.iter().filter(|d| d.code == code).count()
}

struct StubEvaluator {
    outcome: Result<(), EvalError>,
    probes: usize,
    clears: usize,
}

impl StubEvaluator {
    fn ok() -> Self {
        StubEvaluator {
            outcome: Ok(()),
            probes: 0,
            clears: 0,
        }
    }

    fn failing(message: &str) -> Self {
        StubEvaluator {
            outcome: Err(EvalError::new(message)),
            probes: 0,
            clears: 0,
        }
    }
}

impl TrialEvaluator for StubEvaluator {
    fn trial_evaluate(&mut self, _formula: &str) -> Result<(), EvalError> {
        self.probes += 1;
        self.outcome.clone()
    }

    fn clear_sentinel(&mut self) {
        self.clears += 1;
    }
}

#[test]
fn clean_formula_has_no_diagnostics() {
    let mut eval = StubEvaluator::ok();
    let diags = analyzer().analyze("=SUM(A1,A2)", Some(&mut eval));
    assert!(diags.is_empty(), "unexpected: {diags:?}");
    assert_eq!(eval.probes, 1);
    assert_eq!(eval.clears, 1);
}

#[test]
fn blank_and_comment_only_input_yields_nothing() {
    let mut a = analyzer();
    assert!(a.analyze("", None).is_empty());
    assert!(a.analyze("   \n ", None).is_empty());
    assert!(a.analyze("// just a comment\n/* and another */", None).is_empty());
}

#[test]
fn literal_text_without_equals_is_not_analyzed() {
    let diags = analyzer().analyze("hello world", None);
    assert!(diags.is_empty());
}

#[test]
fn period_in_closed_call_spans_the_whole_call() {
    let diags = analyzer().analyze("=SUM(A1.A2)", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::PunctuationError]);
    let d = &diags[0];
    assert_eq!((d.start_line, d.start_column), (1, 2));
    assert_eq!((d.end_line, d.end_column), (1, 12));
}

#[test]
fn period_in_unclosed_call_marks_just_the_period() {
    let diags = analyzer().analyze("=SUM(A1.A2", None);
    assert_eq!(count(&diags, DiagnosticCode::PunctuationError), 1);
    let d = diags
        .iter()
        .find(|d| d.code == DiagnosticCode::PunctuationError)
        .unwrap();
    assert_eq!((d.start_column, d.end_column), (8, 9));
    assert_eq!(count(&diags, DiagnosticCode::MissingParenthesis), 1);
}

#[test]
fn missing_closing_paren_is_a_warning_after_the_opener() {
    let diags = analyzer().analyze("=IF(TRUE,1,2", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::MissingParenthesis]);
    let d = &diags[0];
    assert_eq!(d.severity, Severity::Warning);
    assert_eq!((d.start_line, d.start_column), (1, 5));
}

#[test]
fn extra_closing_paren_is_an_error_at_the_first_unmatched_closer() {
    let diags = analyzer().analyze("=SUM(1,2))", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::ExtraParenthesis]);
    let d = &diags[0];
    assert_eq!(d.severity, Severity::Error);
    assert_eq!((d.start_column, d.end_column), (10, 11));
}

#[test]
fn trailing_empty_argument_warns_without_signature_mismatch() {
    let diags = analyzer().analyze("=CONCATENATE(\"a\",)", None);
    assert_eq!(count(&diags, DiagnosticCode::EmptyParameter), 1);
    assert_eq!(count(&diags, DiagnosticCode::FunctionSignatureMismatch), 0);
    let d = diags
        .iter()
        .find(|d| d.code == DiagnosticCode::EmptyParameter)
        .unwrap();
    assert_eq!(d.severity, Severity::Warning);
}

#[test]
fn arity_mismatch_is_reported_on_the_call() {
    let diags = analyzer().analyze("=IF(A1)", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::FunctionSignatureMismatch]);
    let d = &diags[0];
    assert_eq!((d.start_column, d.end_column), (2, 8));
    assert!(d.message.contains("IF"));

    let diags = analyzer().analyze("=IF(A1,1,2,3)", None);
    assert_eq!(count(&diags, DiagnosticCode::FunctionSignatureMismatch), 1);
}

#[test]
fn nested_call_arity_is_checked_per_call() {
    let diags = analyzer().analyze("=SUM(IF(A1),B2)", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::FunctionSignatureMismatch]);
}

#[test]
fn unknown_bare_word_is_an_invalid_identifier() {
    let diags = analyzer().analyze("=A1 foo", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::InvalidIdentifier]);
    let d = &diags[0];
    assert_eq!((d.start_column, d.end_column), (5, 8));
    assert!(d.message.contains("foo"));
}

#[test]
fn named_ranges_and_booleans_are_accepted() {
    let mut a = Analyzer::new(catalog()).with_named_ranges(["TaxRate"]);
    assert!(a.analyze("=TaxRate*2", None).is_empty());
    assert!(a.analyze("=taxrate*2", None).is_empty());
    assert!(a.analyze("=IF(TRUE,1,FALSE)", None).is_empty());
}

#[test]
fn line_break_inside_open_call_is_not_stray() {
    let diags = analyzer().analyze("=SUM(A1,\nA2)", None);
    assert!(diags.is_empty(), "unexpected: {diags:?}");
}

#[test]
fn disconnected_second_line_is_stray() {
    let diags = analyzer().analyze("=SUM(A1)\nA2", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::StrayText]);
    let d = &diags[0];
    assert_eq!((d.start_line, d.start_column), (2, 1));
    assert_eq!((d.end_line, d.end_column), (2, 3));
}

#[test]
fn unclosed_string_spans_to_end_of_text() {
    let diags = analyzer().analyze("=\"abc", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::UnclosedString]);
    let d = &diags[0];
    assert_eq!((d.start_column, d.end_column), (2, 6));
}

#[test]
fn double_and_trailing_commas() {
    let diags = analyzer().analyze("=SUM(A1,,B2)", None);
    assert_eq!(count(&diags, DiagnosticCode::DoubleComma), 1);
    assert_eq!(count(&diags, DiagnosticCode::EmptyParameter), 1);

    let diags = analyzer().analyze("=SUM(A1,B2),", None);
    assert_eq!(count(&diags, DiagnosticCode::EndTrailingComma), 1);
}

#[test]
fn comma_inside_unterminated_string_is_only_an_unclosed_string() {
    let diags = analyzer().analyze("=\"abc,", None);
    assert_eq!(codes(&diags), vec![DiagnosticCode::UnclosedString]);

    let diags = analyzer().analyze("='Sheet one,", None);
    assert_eq!(count(&diags, DiagnosticCode::EndTrailingComma), 0);
}

#[test]
fn comments_do_not_leak_into_rules() {
    let mut eval = StubEvaluator::ok();
    let diags = analyzer().analyze(
        "=SUM(A1, // args\n/* block ) \" */ A2)",
        Some(&mut eval),
    );
    assert!(diags.is_empty(), "unexpected: {diags:?}");
    assert_eq!(eval.probes, 1);
}

#[test]
fn structural_probe_failure_becomes_syntax_error() {
    let mut eval = StubEvaluator::failing("unexpected token at offset 3");
    let diags = analyzer().analyze("=SUM(A1,A2)", Some(&mut eval));
    assert_eq!(codes(&diags), vec![DiagnosticCode::SyntaxError]);
    assert_eq!(eval.clears, 1);
}

#[test]
fn runtime_probe_failure_is_swallowed() {
    for message in ["#REF! missing cell", "bad VALUE", "DIV/0", "NAME not found"] {
        let mut eval = StubEvaluator::failing(message);
        let diags = analyzer().analyze("=SUM(A1,A2)", Some(&mut eval));
        assert!(diags.is_empty(), "{message} leaked: {diags:?}");
        assert_eq!(eval.clears, 1);
    }
}

#[cfg(feature = "serde")]
#[test]
fn diagnostics_serialize_to_json() {
    let diags = analyzer().analyze("=IF(A1)", None);
    let json = serde_json::to_value(&diags).expect("diagnostics serialize");
    let first = &json[0];
    assert_eq!(first["source"], "formulint");
    assert_eq!(first["code"], "FunctionSignatureMismatch");
    assert_eq!(first["severity"], "Error");
    assert_eq!(first["start_line"], 1);
    assert_eq!(first["end_column"], 8);

    let code: DiagnosticCode =
        serde_json::from_value(first["code"].clone()).expect("code round-trips");
    assert_eq!(code, DiagnosticCode::FunctionSignatureMismatch);
}

#[test]
fn probe_is_skipped_when_parens_are_unbalanced() {
    let mut eval = StubEvaluator::failing("unexpected token");
    let diags = analyzer().analyze("=SUM(A1", Some(&mut eval));
    assert_eq!(eval.probes, 0);
    assert_eq!(count(&diags, DiagnosticCode::SyntaxError), 0);
}
