use super::{DiagnosticPass, ToolSettings};
use crate::exec::{note_skipped, run_with_timeout};
use crate::matchers::match_compiler_line;
use crate::resolve::resolve_reported_path;
use crate::source::{SourceFile, SourceSet};
use camino::Utf8Path;
use firmfix_types::{Issue, IssueKind, Severity};
use fs_err as fs;
use std::process::Command;
use tracing::debug;

const UNIT_FILE_NAME: &str = "firmfix_unit.c";

/// Compiles every input as one synthetic translation unit with warnings as errors.
#[derive(Debug, Clone)]
pub struct CompilationPass {
    settings: ToolSettings,
}

impl CompilationPass {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }
}

impl DiagnosticPass for CompilationPass {
    fn name(&self) -> &'static str {
        "compilation"
    }

    fn run(&self, sources: &SourceSet) -> Vec<Issue> {
        if sources.is_empty() {
            return Vec::new();
        }

        let compiler = self.settings.compiler.as_str();
        let workdir = match tempfile::Builder::new().prefix("firmfix-").tempdir() {
            Ok(dir) => dir,
            Err(err) => {
                note_skipped(self.settings.verbose, compiler, &err);
                return Vec::new();
            }
        };

        let unit_path = workdir.path().join(UNIT_FILE_NAME);
        let obj_path = workdir.path().join("firmfix_unit.o");
        if let Err(err) = fs::write(&unit_path, build_unit(sources)) {
            note_skipped(self.settings.verbose, compiler, &err);
            return Vec::new();
        }

        let mut cmd = Command::new(compiler);
        cmd.arg("-c")
            .arg(&unit_path)
            .arg("-o")
            .arg(&obj_path)
            .args(["-std=c11", "-Wall", "-Wextra", "-Werror"])
            .arg("-I")
            .arg(sources.root().as_std_path());
        for dir in header_dirs(sources) {
            cmd.arg("-I").arg(sources.root().join(dir).into_std_path_buf());
        }

        let output = match run_with_timeout(&mut cmd, self.settings.compile_timeout) {
            Ok(output) if output.timed_out => {
                note_skipped(self.settings.verbose, compiler, &"timed out");
                return Vec::new();
            }
            Ok(output) => output,
            Err(err) => {
                note_skipped(self.settings.verbose, compiler, &err);
                return Vec::new();
            }
        };

        let issues = parse_compiler_output(&output.combined(), sources.files());
        debug!(compiler, issues = issues.len(), "compilation pass finished");
        issues
    }
}

/// Build the synthetic translation unit.
///
/// Layout: the union of every distinct `#include` line (first-seen order), then each file body
/// (headers before sources) with its own `#include` lines blanked out. Every hoisted include and
/// every body is preceded by a `#line` marker, so the compiler reports original file names and
/// line numbers, including for a missing header.
pub fn build_unit(sources: &SourceSet) -> String {
    let mut ordered: Vec<&SourceFile> = sources.files().iter().filter(|f| f.is_header()).collect();
    ordered.extend(sources.files().iter().filter(|f| !f.is_header()));

    // (directive, file of first occurrence, 1-indexed line)
    let mut includes: Vec<(&str, &SourceFile, usize)> = Vec::new();
    for file in &ordered {
        for (idx, line) in file.contents.lines().enumerate() {
            let trimmed = line.trim();
            if is_include(trimmed) && !includes.iter().any(|(seen, _, _)| *seen == trimmed) {
                includes.push((trimmed, *file, idx + 1));
            }
        }
    }

    let mut out = String::new();
    for (include, file, line) in &includes {
        out.push_str(&line_marker(*line, file));
        out.push_str(include);
        out.push('\n');
    }

    for file in &ordered {
        out.push_str(&line_marker(1, file));
        for line in file.contents.lines() {
            if !is_include(line.trim()) {
                out.push_str(line);
            }
            out.push('\n');
        }
    }

    out
}

fn line_marker(line: usize, file: &SourceFile) -> String {
    format!("#line {line} \"{}\"\n", file.name().replace('"', "\\\""))
}

/// Subdirectories holding headers, so `#include "x.h"` resolves from the unit's temp dir.
fn header_dirs(sources: &SourceSet) -> Vec<&Utf8Path> {
    let mut dirs: Vec<&Utf8Path> = sources
        .files()
        .iter()
        .filter(|f| f.is_header())
        .filter_map(|f| f.path.parent())
        .filter(|dir| !dir.as_str().is_empty())
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}

fn is_include(trimmed: &str) -> bool {
    trimmed
        .strip_prefix('#')
        .is_some_and(|rest| rest.trim_start().starts_with("include"))
}

/// Turn compiler output into compilation issues; non-matching lines are skipped.
pub fn parse_compiler_output(output: &str, files: &[SourceFile]) -> Vec<Issue> {
    output
        .lines()
        .filter_map(match_compiler_line)
        .map(|d| {
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

            Issue::new(IssueKind::Compilation, severity, file, d.line, d.message)
                .with_column(d.column)
                .with_code(code)
        })
        .collect()
}
