//! Text rendering of an [`AnalysisResult`] for terminals and logs.
//!
//! Rendering is a pure function of the result: counts and per-type histograms come straight
//! from `summary`, and lists keep the order the pipeline produced.

use std::collections::BTreeMap;

use firmfix_types::{AnalysisResult, AppliedFix, Fix, Issue, IssueKind};

pub fn render_report(result: &AnalysisResult) -> String {
    let summary = &result.summary;

    let mut out = String::new();
    out.push_str("firmfix report\n");
    out.push_str("==============\n\n");
    out.push_str(&format!("Errors:   {}\n", summary.total_errors));
    out.push_str(&format!("Warnings: {}\n", summary.total_warnings));
    out.push_str(&format!("Fixes:    {}\n", summary.total_fixes));
    if let Some(applied) = &result.applied_fixes {
        out.push_str(&format!("Applied:  {}\n", applied.len()));
    }

    push_histogram(&mut out, "Errors by type", &summary.error_types);
    push_histogram(&mut out, "Warnings by type", &summary.warning_types);

    push_issues(&mut out, "Errors", &result.errors);
    push_issues(&mut out, "Warnings", &result.warnings);

    if !result.fixes.is_empty() {
        out.push_str("\nSuggested fixes:\n");
        for fix in &result.fixes {
            push_fix(&mut out, fix);
        }
    }

    if let Some(applied) = &result.applied_fixes {
        out.push_str("\nApplied fixes:\n");
        if applied.is_empty() {
            out.push_str("  (none)\n");
        }
        for fix in applied {
            push_applied(&mut out, fix);
        }
    }

    out
}

fn push_histogram(out: &mut String, title: &str, counts: &BTreeMap<IssueKind, u64>) {
    if counts.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    for (kind, count) in counts {
        out.push_str(&format!("  {:<16} {}\n", kind.as_str(), count));
    }
}

fn push_issues(out: &mut String, title: &str, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    for issue in issues {
        out.push_str(&format!(
            "  {} [{}] {}\n",
            issue.location(),
            issue.kind,
            issue.message
        ));
        if !issue.code.is_empty() {
            out.push_str(&format!("      | {}\n", issue.code.trim_end()));
        }
    }
}

fn push_fix(out: &mut String, fix: &Fix) {
    out.push_str(&format!(
        "  {}:{} (confidence {:.2})\n",
        fix.error.file, fix.error.line, fix.confidence
    ));
    for line in fix.suggestion.lines() {
        out.push_str(&format!("      {line}\n"));
    }
}

fn push_applied(out: &mut String, fix: &AppliedFix) {
    out.push_str(&format!("  {}:{}\n", fix.file, fix.line));
    out.push_str(&format!("      - {}\n", fix.old));
    for line in fix.new.lines() {
        out.push_str(&format!("      + {line}\n"));
    }
}
