use super::DiagnosticPass;
use super::scan::{BraceKind, BraceStack, scan_line};
use crate::source::{SourceFile, SourceSet};
use firmfix_types::{Issue, IssueKind, Severity};

/// Line-oriented syntax heuristics.
///
/// This is not a parser: it both over- and under-reports. At most one issue is raised per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxPass;

const CONTROL_KEYWORDS: &[&str] = &["if", "else", "for", "while", "do", "switch", "case", "default"];

/// Trailing characters that mean the statement deliberately continues on the next line.
const CONTINUATION_ENDINGS: &[char] = &[
    ';', '{', '}', ',', ':', '=', '+', '-', '*', '/', '%', '&', '|', '^', '<', '>', '?', '!', '(',
];

impl DiagnosticPass for SyntaxPass {
    fn name(&self) -> &'static str {
        "syntax"
    }

    fn run(&self, sources: &SourceSet) -> Vec<Issue> {
        sources.files().iter().flat_map(check_file).collect()
    }
}

/// Run the syntax heuristics over one file.
pub fn check_file(file: &SourceFile) -> Vec<Issue> {
    let lines: Vec<&str> = file.contents.lines().collect();
    let mut issues = Vec::new();
    let mut in_block_comment = false;
    let mut continued = false;
    let mut braces = BraceStack::default();

    for (idx, raw) in lines.iter().enumerate() {
        let line_no = (idx + 1) as u32;
        let was_continued = continued;
        continued = raw.trim_end().ends_with('\\');

        let scan = scan_line(raw, &mut in_block_comment);
        let code = scan.code.trim();

        // Continuation lines and the line they continue into belong to one logical line.
        if continued || was_continued || code.is_empty() {
            braces.feed(&scan.code);
            continue;
        }

        if let Some(directive) = code.strip_prefix('#') {
            if directive.trim_start().starts_with("include") && !is_complete_include(directive) {
                issues.push(issue(file, line_no, raw, "Incomplete #include directive"));
            }
            continue;
        }

        let region = braces.top();
        braces.feed(&scan.code);

        let message = if scan.unclosed_string {
            Some("Unterminated string literal".to_string())
        } else if let Some(col) = scan.open_paren {
            Some(format!("Unclosed parenthesis opened at column {col}"))
        } else if let Some(col) = scan.open_bracket {
            Some(format!("Unclosed bracket opened at column {col}"))
        } else if region != Some(BraceKind::Data)
            && missing_terminator(code, next_code_line(&lines, idx))
        {
            Some("Missing ';' at end of statement".to_string())
        } else {
            None
        };

        if let Some(message) = message {
            issues.push(issue(file, line_no, raw, &message));
        }
    }

    issues
}

fn issue(file: &SourceFile, line: u32, raw: &str, message: &str) -> Issue {
    Issue::new(IssueKind::Syntax, Severity::Error, file.name(), line, message)
        .with_code(raw.trim_end())
}

fn is_complete_include(directive: &str) -> bool {
    let rest = directive.trim_start().trim_start_matches("include").trim();
    let complete = |open: char, close: char| {
        rest.len() > 2 && rest.starts_with(open) && rest[1..].contains(close)
    };
    complete('<', '>') || complete('"', '"') || is_macro_include(rest)
}

// `#include SOME_HEADER_MACRO` is legal C.
fn is_macro_include(rest: &str) -> bool {
    rest.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && rest.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn missing_terminator(code: &str, next: Option<&str>) -> bool {
    let Some(last) = code.chars().last() else {
        return false;
    };
    if CONTINUATION_ENDINGS.contains(&last) {
        return false;
    }

    let first_word: String = code
        .trim_start_matches('}')
        .trim_start()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if CONTROL_KEYWORDS.contains(&first_word.as_str()) {
        return false;
    }

    // Function headers and type names with the brace on the following line.
    !next.is_some_and(|n| n.starts_with('{'))
}

/// The next line that holds code, ignoring blanks and whole-line comments.
fn next_code_line<'a>(lines: &[&'a str], idx: usize) -> Option<&'a str> {
    lines[idx + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with("/*") && !l.starts_with('*'))
}
