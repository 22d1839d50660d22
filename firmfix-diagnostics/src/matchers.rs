//! Line matchers for external tool output.
//!
//! Each matcher turns one line of captured output into a [`ToolDiagnostic`], or `None` when the line
//! does not follow the tool's grammar. Unparseable lines are skipped, never reported.

use regex::Regex;
use std::sync::LazyLock;

/// One diagnostic line, before it is resolved to an input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDiagnostic {
    pub path: String,
    pub line: u32,
    pub column: u32,
    /// Severity word as printed by the tool (`error`, `warning`, `style`, ...).
    pub severity: String,
    pub message: String,
}

impl ToolDiagnostic {
    pub fn is_error(&self) -> bool {
        matches!(self.severity.as_str(), "error" | "fatal error")
    }
}

// gcc / clang: `path:line:col: error|warning: message`
static COMPILER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+): (?P<sev>fatal error|error|warning): (?P<msg>.+)$")
        .expect("compiler line pattern")
});

// cppcheck legacy template: `[file:line]: (severity) message`
static CPPCHECK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<path>[^\]:]+):(?P<line>\d+)\]: \((?P<sev>\w+)\) (?P<msg>.+)$")
        .expect("cppcheck line pattern")
});

// clang-tidy: `file:line:col: severity: message [check-name]`
static CLANG_TIDY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>[^:\s][^:]*):(?P<line>\d+):(?P<col>\d+): (?P<sev>error|warning|note): (?P<msg>.+?)(?: \[(?P<check>[\w.,\-]+)\])?$")
        .expect("clang-tidy line pattern")
});

/// Match a compiler diagnostic line.
pub fn match_compiler_line(line: &str) -> Option<ToolDiagnostic> {
    let caps = COMPILER_LINE.captures(line.trim_end())?;
    Some(ToolDiagnostic {
        path: caps["path"].to_string(),
        line: caps["line"].parse().ok()?,
        column: caps["col"].parse().ok()?,
        severity: caps["sev"].to_string(),
        message: caps["msg"].trim().to_string(),
    })
}

/// Match a cppcheck diagnostic line. cppcheck reports no column.
pub fn match_cppcheck_line(line: &str) -> Option<ToolDiagnostic> {
    let caps = CPPCHECK_LINE.captures(line.trim_end())?;
    Some(ToolDiagnostic {
        path: caps["path"].to_string(),
        line: caps["line"].parse().ok()?,
        column: 0,
        severity: caps["sev"].to_string(),
        message: caps["msg"].trim().to_string(),
    })
}

/// Match a clang-tidy diagnostic line; the check name is appended to the message.
pub fn match_clang_tidy_line(line: &str) -> Option<ToolDiagnostic> {
    let caps = CLANG_TIDY_LINE.captures(line.trim_end())?;
    let mut message = caps["msg"].trim().to_string();
    if let Some(check) = caps.name("check") {
        message = format!("{message} [{}]", check.as_str());
    }
    Some(ToolDiagnostic {
        path: caps["path"].to_string(),
        line: caps["line"].parse().ok()?,
        column: caps["col"].parse().ok()?,
        severity: caps["sev"].to_string(),
        message,
    })
}
