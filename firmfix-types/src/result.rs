use crate::fix::{AppliedFix, Fix};
use crate::issue::{Issue, IssueKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts over an [`AnalysisResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_errors: u64,
    pub total_warnings: u64,
    pub total_fixes: u64,

    #[serde(default)]
    pub error_types: BTreeMap<IssueKind, u64>,

    #[serde(default)]
    pub warning_types: BTreeMap<IssueKind, u64>,
}

/// The aggregate handed back to callers of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub errors: Vec<Issue>,

    #[serde(default)]
    pub warnings: Vec<Issue>,

    #[serde(default)]
    pub fixes: Vec<Fix>,

    pub summary: Summary,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_fixes: Option<Vec<AppliedFix>>,
}

impl AnalysisResult {
    /// Partition issues by severity, keeping their relative order, and compute the summary.
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let (errors, warnings): (Vec<Issue>, Vec<Issue>) =
            issues.into_iter().partition(Issue::is_error);

        let mut result = Self {
            errors,
            warnings,
            ..Self::default()
        };
        result.summary = summarize(&result.errors, &result.warnings, 0);
        result
    }

    pub fn set_fixes(&mut self, fixes: Vec<Fix>) {
        self.fixes = fixes;
        self.summary.total_fixes = self.fixes.len() as u64;
    }

    pub fn set_applied_fixes(&mut self, applied: Vec<AppliedFix>) {
        self.applied_fixes = Some(applied);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

fn summarize(errors: &[Issue], warnings: &[Issue], fixes: usize) -> Summary {
    Summary {
        total_errors: errors.len() as u64,
        total_warnings: warnings.len() as u64,
        total_fixes: fixes as u64,
        error_types: histogram(errors),
        warning_types: histogram(warnings),
    }
}

fn histogram(issues: &[Issue]) -> BTreeMap<IssueKind, u64> {
    let mut out = BTreeMap::new();
    for issue in issues {
        *out.entry(issue.kind).or_insert(0) += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Severity;

    fn issue(kind: IssueKind, severity: Severity, line: u32) -> Issue {
        Issue::new(kind, severity, "a.c", line, "msg")
    }

    #[test]
    fn severity_decides_the_list() {
        let result = AnalysisResult::from_issues(vec![
            issue(IssueKind::Syntax, Severity::Error, 1),
            issue(IssueKind::Quality, Severity::Warning, 2),
            issue(IssueKind::Compilation, Severity::Error, 3),
        ]);

        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.errors.iter().all(Issue::is_error));
        assert_eq!(result.errors[0].line, 1);
        assert_eq!(result.errors[1].line, 3);
    }

    #[test]
    fn summary_histograms_per_kind() {
        let result = AnalysisResult::from_issues(vec![
            issue(IssueKind::Syntax, Severity::Error, 1),
            issue(IssueKind::Syntax, Severity::Error, 2),
            issue(IssueKind::StaticAnalysis, Severity::Warning, 3),
        ]);

        assert_eq!(result.summary.total_errors, 2);
        assert_eq!(result.summary.total_warnings, 1);
        assert_eq!(result.summary.error_types.get(&IssueKind::Syntax), Some(&2));
        assert_eq!(
            result.summary.warning_types.get(&IssueKind::StaticAnalysis),
            Some(&1)
        );
        assert!(!result.summary.error_types.contains_key(&IssueKind::Quality));
    }

    #[test]
    fn set_fixes_updates_count() {
        let mut result = AnalysisResult::from_issues(vec![issue(
            IssueKind::Syntax,
            Severity::Error,
            1,
        )]);
        let error = result.errors[0].clone();
        result.set_fixes(vec![Fix {
            error,
            suggestion: "int x;".to_string(),
            confidence: 0.8,
        }]);
        assert_eq!(result.summary.total_fixes, 1);
    }
}
