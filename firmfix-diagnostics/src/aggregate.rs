use crate::passes::DiagnosticPass;
use crate::source::SourceSet;
use firmfix_types::Issue;
use tracing::debug;

/// Runs diagnostic passes strictly in sequence over one snapshot.
pub struct Aggregator {
    passes: Vec<Box<dyn DiagnosticPass>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn with_passes(passes: Vec<Box<dyn DiagnosticPass>>) -> Self {
        Self { passes }
    }

    pub fn push(&mut self, pass: Box<dyn DiagnosticPass>) {
        self.passes.push(pass);
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Concatenate every pass's issues in pass order; within a pass, order by file then line.
    ///
    /// Issues from different passes are never merged, even when they describe the same defect.
    pub fn run(&self, sources: &SourceSet) -> Vec<Issue> {
        let mut out = Vec::new();
        for pass in &self.passes {
            let mut issues = pass.run(sources);
            issues.sort_by_key(|i| (sources.index_of(&i.file).unwrap_or(usize::MAX), i.line));
            debug!(pass = pass.name(), issues = issues.len(), "pass complete");
            out.extend(issues);
        }
        out
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceFile;
    use firmfix_types::{IssueKind, Severity};

    struct Fixed(&'static str, Vec<Issue>);

    impl DiagnosticPass for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        fn run(&self, _sources: &SourceSet) -> Vec<Issue> {
            self.1.clone()
        }
    }

    fn issue(kind: IssueKind, file: &str, line: u32) -> Issue {
        Issue::new(kind, Severity::Error, file, line, "m")
    }

    #[test]
    fn pass_order_then_file_then_line() {
        let sources = SourceSet::new(
            "/w",
            vec![SourceFile::new("b.c", ""), SourceFile::new("a.c", "")],
        );
        let aggregator = Aggregator::with_passes(vec![
            Box::new(Fixed(
                "first",
                vec![
                    issue(IssueKind::Syntax, "a.c", 2),
                    issue(IssueKind::Syntax, "b.c", 9),
                    issue(IssueKind::Syntax, "a.c", 1),
                ],
            )),
            Box::new(Fixed("second", vec![issue(IssueKind::Quality, "b.c", 1)])),
        ]);

        let got: Vec<(IssueKind, String, u32)> = aggregator
            .run(&sources)
            .into_iter()
            .map(|i| (i.kind, i.file, i.line))
            .collect();

        assert_eq!(
            got,
            vec![
                (IssueKind::Syntax, "b.c".to_string(), 9),
                (IssueKind::Syntax, "a.c".to_string(), 1),
                (IssueKind::Syntax, "a.c".to_string(), 2),
                (IssueKind::Quality, "b.c".to_string(), 1),
            ]
        );
    }

    #[test]
    fn duplicate_findings_across_passes_are_kept() {
        let sources = SourceSet::new("/w", vec![SourceFile::new("a.c", "")]);
        let aggregator = Aggregator::with_passes(vec![
            Box::new(Fixed("one", vec![issue(IssueKind::Syntax, "a.c", 1)])),
            Box::new(Fixed("two", vec![issue(IssueKind::Compilation, "a.c", 1)])),
        ]);
        assert_eq!(aggregator.run(&sources).len(), 2);
    }
}
