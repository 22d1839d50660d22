use super::{DiagnosticPass, ToolSettings};
use crate::exec::{ToolOutput, note_skipped, run_with_timeout};
use crate::matchers::{ToolDiagnostic, match_clang_tidy_line, match_cppcheck_line};
use crate::resolve::resolve_reported_path;
use crate::source::{SourceFile, SourceSet};
use firmfix_types::{Issue, IssueKind, Severity};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Forces cppcheck's `[file:line]: (severity) message` grammar regardless of its default template.
const CPPCHECK_TEMPLATE: &str = "--template=[{file}:{line}]: ({severity}) {message}";

/// Runs cppcheck, then clang-tidy, over the input files.
#[derive(Debug, Clone)]
pub struct StaticAnalysisPass {
    settings: ToolSettings,
}

impl StaticAnalysisPass {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    fn run_tool(&self, tool: &str, mut cmd: Command) -> Option<ToolOutput> {
        match run_with_timeout(&mut cmd, self.settings.analyzer_timeout) {
            Ok(output) if output.timed_out => {
                note_skipped(self.settings.verbose, tool, &"timed out");
                None
            }
            Ok(output) => Some(output),
            Err(err) => {
                note_skipped(self.settings.verbose, tool, &err);
                None
            }
        }
    }

    fn cppcheck(&self, sources: &SourceSet, paths: &[PathBuf]) -> Vec<Issue> {
        let tool = self.settings.cppcheck.as_str();
        let mut cmd = Command::new(tool);
        cmd.args([
            "--enable=all",
            "--std=c11",
            "--quiet",
            "--error-exitcode=0",
            CPPCHECK_TEMPLATE,
        ])
        .args(paths);

        self.run_tool(tool, cmd)
            .map(|out| parse_cppcheck_output(&out.combined(), sources.files()))
            .unwrap_or_default()
    }

    fn clang_tidy(&self, sources: &SourceSet, paths: &[PathBuf]) -> Vec<Issue> {
        let tool = self.settings.clang_tidy.as_str();
        let mut cmd = Command::new(tool);
        cmd.args(paths)
            .args(["--", "-std=c11", "-I"])
            .arg(sources.root().as_std_path());

        self.run_tool(tool, cmd)
            .map(|out| parse_clang_tidy_output(&out.combined(), sources.files()))
            .unwrap_or_default()
    }
}

impl DiagnosticPass for StaticAnalysisPass {
    fn name(&self) -> &'static str {
        "static_analysis"
    }

    fn run(&self, sources: &SourceSet) -> Vec<Issue> {
        if sources.is_empty() {
            return Vec::new();
        }

        let paths: Vec<PathBuf> = sources
            .files()
            .iter()
            .map(|f| sources.root().join(&f.path).into_std_path_buf())
            .collect();

        let mut issues = self.cppcheck(sources, &paths);
        let tidy = self.clang_tidy(sources, &paths);
        debug!(
            cppcheck = issues.len(),
            clang_tidy = tidy.len(),
            "static analysis pass finished"
        );
        issues.extend(tidy);
        issues
    }
}

/// Parse cppcheck output. Only `error` is an error; every other cppcheck severity is a warning.
pub fn parse_cppcheck_output(output: &str, files: &[SourceFile]) -> Vec<Issue> {
    output
        .lines()
        .filter_map(match_cppcheck_line)
        .map(|d| to_issue(d, files))
        .collect()
}

/// Parse clang-tidy output. `note:` lines attach to the previous finding and are skipped.
pub fn parse_clang_tidy_output(output: &str, files: &[SourceFile]) -> Vec<Issue> {
    output
        .lines()
        .filter_map(match_clang_tidy_line)
        .filter(|d| d.severity != "note")
        .map(|d| to_issue(d, files))
        .collect()
}

fn to_issue(d: ToolDiagnostic, files: &[SourceFile]) -> Issue {
    let severity = if d.is_error() {
        Severity::Error
    } else {
        Severity::Warning
    };
    let resolved = resolve_reported_path(&d.path, files);
    let file = resolved.map_or_else(|| d.path.clone(), |f| f.name().to_string());
    let code = resolved
        .and_then(|f| f.line(d.line))
        .map(|l| l.trim_end().to_string())
        .unwrap_or_default();

    Issue::new(IssueKind::StaticAnalysis, severity, file, d.line, d.message)
        .with_column(d.column)
        .with_code(code)
}
