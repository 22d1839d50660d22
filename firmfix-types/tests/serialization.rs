//! Wire-shape tests for the result aggregate.

use firmfix_types::{AnalysisResult, AppliedFix, Fix, Issue, IssueKind, Severity};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;

fn syntax_error() -> Issue {
    Issue::new(IssueKind::Syntax, Severity::Error, "a.c", 1, "Missing semicolon").with_code("int x")
}

#[test]
fn issue_serializes_kind_as_type() {
    let v = serde_json::to_value(syntax_error()).unwrap();
    assert_eq!(
        v,
        json!({
            "file": "a.c",
            "line": 1,
            "column": 0,
            "message": "Missing semicolon",
            "type": "syntax",
            "severity": "error",
            "code": "int x",
        })
    );
}

#[test]
fn static_analysis_kind_is_snake_case() {
    let issue = Issue::new(
        IssueKind::StaticAnalysis,
        Severity::Warning,
        "a.c",
        10,
        "Unused variable 'x'",
    );
    let v = serde_json::to_value(issue).unwrap();
    assert_eq!(v["type"], "static_analysis");
    assert_eq!(v["severity"], "warning");
}

#[test]
fn result_uses_camel_case_summary() {
    let mut result = AnalysisResult::from_issues(vec![syntax_error()]);
    result.set_fixes(vec![Fix {
        error: syntax_error(),
        suggestion: "int x = 0;".to_string(),
        confidence: 0.8,
    }]);

    let v = serde_json::to_value(&result).unwrap();
    assert_eq!(v["summary"]["totalErrors"], 1);
    assert_eq!(v["summary"]["totalWarnings"], 0);
    assert_eq!(v["summary"]["totalFixes"], 1);
    assert_eq!(v["summary"]["errorTypes"]["syntax"], 1);
    assert_eq!(v["fixes"][0]["error"]["line"], 1);
    assert!(v.get("appliedFixes").is_none());
}

#[test]
fn applied_fixes_appear_once_set() {
    let mut result = AnalysisResult::default();
    result.set_applied_fixes(vec![AppliedFix {
        file: "a.c".to_string(),
        line: 1,
        old: "int x".to_string(),
        new: "int x = 0;".to_string(),
    }]);

    let v = serde_json::to_value(&result).unwrap();
    assert_eq!(v["appliedFixes"][0]["old"], "int x");
    assert_eq!(v["appliedFixes"][0]["new"], "int x = 0;");
}

#[test]
fn issue_deserializes_without_optional_fields() {
    let issue: Issue = serde_json::from_value(json!({
        "file": "b.h",
        "line": 0,
        "message": "m",
        "type": "quality",
        "severity": "warning"
    }))
    .unwrap();
    assert_eq!(issue.column, 0);
    assert_eq!(issue.code, "");
    assert_eq!(issue.kind, IssueKind::Quality);
}

fn arb_issue() -> impl Strategy<Value = Issue> {
    (
        prop::sample::select(IssueKind::ALL.to_vec()),
        any::<bool>(),
        0u32..5000,
    )
        .prop_map(|(kind, is_error, line)| {
            let severity = if is_error {
                Severity::Error
            } else {
                Severity::Warning
            };
            Issue::new(kind, severity, "f.c", line, "m")
        })
}

proptest! {
    /// Partitioning keeps every issue exactly once and honours severity.
    #[test]
    fn partition_is_total(issues in prop::collection::vec(arb_issue(), 0..40)) {
        let result = AnalysisResult::from_issues(issues.clone());
        prop_assert_eq!(result.errors.len() + result.warnings.len(), issues.len());
        prop_assert!(result.errors.iter().all(|i| i.severity == Severity::Error));
        prop_assert!(result.warnings.iter().all(|i| i.severity == Severity::Warning));

        let hist_total: u64 = result.summary.error_types.values().sum();
        prop_assert_eq!(hist_total, result.summary.total_errors);
    }
}
