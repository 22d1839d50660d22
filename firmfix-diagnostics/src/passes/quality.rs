use super::DiagnosticPass;
use super::scan::{BraceKind, BraceStack, scan_line};
use crate::source::{SourceFile, SourceSet};
use firmfix_types::{Issue, IssueKind, Severity};
use regex::Regex;
use std::sync::LazyLock;

/// Quality heuristics for common embedded C pitfalls. Every finding is a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityPass;

static VOLATILE_DEREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\s*\(\s*volatile\b[^)]*\*\s*\)").expect("volatile deref pattern")
});

static BITWISE_OP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<|>>|[|&^~]").expect("bitwise operator pattern"));

static UNINIT_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?:const|volatile|unsigned|signed|register)\s+)*(?:u?int(?:8|16|32|64)_t|int|char|short|long|float|double|bool|size_t)\s+\**\s*(?P<name>[A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*;$",
    )
    .expect("declaration pattern")
});

impl DiagnosticPass for QualityPass {
    fn name(&self) -> &'static str {
        "quality"
    }

    fn run(&self, sources: &SourceSet) -> Vec<Issue> {
        sources.files().iter().flat_map(check_file).collect()
    }
}

/// Run the quality heuristics over one file.
pub fn check_file(file: &SourceFile) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut in_block_comment = false;
    let mut braces = BraceStack::default();

    for (idx, raw) in file.contents.lines().enumerate() {
        let line_no = (idx + 1) as u32;
        let scan = scan_line(raw, &mut in_block_comment);
        let code = scan.code.trim();
        let region = braces.top();
        braces.feed(&scan.code);

        if code.is_empty() {
            continue;
        }

        if unparenthesized_volatile_deref(code) {
            issues.push(warning(
                file,
                line_no,
                raw,
                "Volatile pointer dereference should be wrapped in parentheses",
            ));
        }

        if region != Some(BraceKind::Aggregate)
            && let Some(caps) = UNINIT_DECL.captures(code)
        {
            issues.push(warning(
                file,
                line_no,
                raw,
                &format!("Variable '{}' is declared without an initializer", &caps["name"]),
            ));
        }
    }

    issues
}

/// `*(volatile T *)ADDR` not enclosed in its own parentheses, on a line where that matters:
/// a macro definition, or an expression that also uses bitwise operators.
fn unparenthesized_volatile_deref(code: &str) -> bool {
    let risky_context = code.starts_with("#define") || BITWISE_OP.is_match(code);
    if !risky_context {
        return false;
    }

    VOLATILE_DEREF.find_iter(code).any(|m| {
        let before = code[..m.start()].trim_end();
        !before.ends_with('(')
    })
}

fn warning(file: &SourceFile, line: u32, raw: &str, message: &str) -> Issue {
    Issue::new(IssueKind::Quality, Severity::Warning, file.name(), line, message)
        .with_code(raw.trim_end())
}
