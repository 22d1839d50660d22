use std::sync::LazyLock;

use regex::Regex;

/// Echoed context prefixes, `12: ` or `=> 12: `. The colon must follow the digits directly so
/// digit-led C such as `0 : 1;` or `1 | FLAG_B,` is left alone.
static LINE_NUMBER_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:=>\s*)?\d+:(?: |$)").expect("line number prefix pattern")
});

/// Reduce a free-form model reply to candidate code.
///
/// - When the reply contains fenced code blocks, only their contents are kept and the opening
///   fence's language tag is dropped. Without fences the whole reply is used.
/// - Blank lines, block quotes (`>`) and `Note:` lines are removed.
/// - Leading line numbers are stripped, except on preprocessor lines.
///
/// The result may be empty; callers treat that as "no suggestion".
pub fn sanitize(raw: &str) -> String {
    let body = fenced_blocks(raw).unwrap_or_else(|| raw.lines().collect());

    body.into_iter()
        .map(|line| strip_line_number(line.trim_end()))
        .filter(|line| keep_line(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn fenced_blocks(raw: &str) -> Option<Vec<&str>> {
    let mut saw_fence = false;
    let mut in_fence = false;
    let mut out = Vec::new();

    for line in raw.lines() {
        if line.trim_start().starts_with("```") {
            saw_fence = true;
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            out.push(line);
        }
    }

    saw_fence.then_some(out)
}

fn keep_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('>') {
        return false;
    }
    !is_note(trimmed)
}

fn is_note(trimmed: &str) -> bool {
    let text = trimmed
        .strip_prefix("//")
        .or_else(|| trimmed.strip_prefix("/*"))
        .unwrap_or(trimmed)
        .trim_start();
    text.get(..5)
        .is_some_and(|head| head.eq_ignore_ascii_case("note:"))
}

fn strip_line_number(line: &str) -> &str {
    if line.trim_start().starts_with('#') {
        return line;
    }
    match LINE_NUMBER_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}
