use serde::{Deserialize, Serialize};
use std::fmt;

/// Which diagnostic pass produced an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Syntax,
    Compilation,
    StaticAnalysis,
    Quality,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [
        IssueKind::Syntax,
        IssueKind::Compilation,
        IssueKind::StaticAnalysis,
        IssueKind::Quality,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::Syntax => "syntax",
            IssueKind::Compilation => "compilation",
            IssueKind::StaticAnalysis => "static_analysis",
            IssueKind::Quality => "quality",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected problem in a source file.
///
/// Issues are never de-duplicated across passes: two passes reporting the same defect is
/// corroboration, and both records are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Path relative to the analyzed directory, or whatever the reporting tool printed when it
    /// could not be resolved to an input file.
    pub file: String,

    /// 1-indexed line, `0` if unknown.
    pub line: u32,

    /// 1-indexed column, `0` if unknown.
    #[serde(default)]
    pub column: u32,

    pub message: String,

    #[serde(rename = "type")]
    pub kind: IssueKind,

    pub severity: Severity,

    /// The offending source line, best effort.
    #[serde(default)]
    pub code: String,
}

impl Issue {
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        file: impl Into<String>,
        line: u32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            column: 0,
            message: message.into(),
            kind,
            severity,
            code: String::new(),
        }
    }

    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// `file:line:column` for log and report output.
    pub fn location(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.column)
    }
}
