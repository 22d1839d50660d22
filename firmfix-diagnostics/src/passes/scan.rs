//! Comment/string aware line scanning shared by the heuristic passes.

/// What is left of one physical line once comments and literal contents are removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LineScan {
    /// Code with comments dropped and string/char literal bodies emptied (`"..."` becomes `""`).
    pub code: String,
    pub unclosed_string: bool,
    /// Column (1-indexed) of the first `(` left open at end of line.
    pub open_paren: Option<usize>,
    /// Column (1-indexed) of the first `[` left open at end of line.
    pub open_bracket: Option<usize>,
}

/// Scan `raw`, carrying block-comment state across lines in `in_block_comment`.
pub(crate) fn scan_line(raw: &str, in_block_comment: &mut bool) -> LineScan {
    let mut out = LineScan::default();
    let mut parens: Vec<usize> = Vec::new();
    let mut brackets: Vec<usize> = Vec::new();
    let chars: Vec<char> = raw.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if *in_block_comment {
            if c == '*' && next == Some('/') {
                *in_block_comment = false;
                i += 2;
            } else {
                i += 1;
            }
            continue;
        }

        match c {
            '/' if next == Some('/') => break,
            '/' if next == Some('*') => {
                *in_block_comment = true;
                out.code.push(' ');
                i += 2;
                continue;
            }
            '"' | '\'' => {
                let quote = c;
                out.code.push(quote);
                i += 1;
                let mut closed = false;
                while i < chars.len() {
                    match chars[i] {
                        '\\' => i += 2,
                        ch if ch == quote => {
                            closed = true;
                            i += 1;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                if closed {
                    out.code.push(quote);
                } else if quote == '"' {
                    out.unclosed_string = true;
                }
                continue;
            }
            '(' => parens.push(i + 1),
            ')' => {
                parens.pop();
            }
            '[' => brackets.push(i + 1),
            ']' => {
                brackets.pop();
            }
            _ => {}
        }

        out.code.push(c);
        i += 1;
    }

    out.open_paren = parens.first().copied();
    out.open_bracket = brackets.first().copied();
    out
}

/// What a `{ ... }` region encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BraceKind {
    /// Function body or compound statement.
    Block,
    /// Initializer list or enum body.
    Data,
    /// `struct` / `union` member list.
    Aggregate,
}

/// Tracks brace nesting across lines so passes know what region a line sits in.
#[derive(Debug, Default)]
pub(crate) struct BraceStack {
    stack: Vec<BraceKind>,
    prev_code: String,
}

impl BraceStack {
    pub fn top(&self) -> Option<BraceKind> {
        self.stack.last().copied()
    }

    /// Consume the braces on one (comment-free) code line.
    pub fn feed(&mut self, code: &str) {
        let mut header_start = 0;
        for (idx, ch) in code.char_indices() {
            match ch {
                '{' => {
                    let header = code[header_start..idx].trim();
                    let header = if header.is_empty() {
                        self.prev_code.as_str()
                    } else {
                        header
                    };
                    self.stack.push(classify(header));
                    header_start = idx + 1;
                }
                '}' => {
                    self.stack.pop();
                    header_start = idx + 1;
                }
                ';' => header_start = idx + 1,
                _ => {}
            }
        }

        let trimmed = code.trim();
        if !trimmed.is_empty() {
            self.prev_code = trimmed.to_string();
        }
    }
}

fn classify(header: &str) -> BraceKind {
    let has_word = |w: &str| {
        header
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|tok| tok == w)
    };

    if header.contains('=') {
        BraceKind::Data
    } else if has_word("struct") || has_word("union") {
        BraceKind::Aggregate
    } else if has_word("enum") {
        BraceKind::Data
    } else {
        BraceKind::Block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(raw: &str) -> LineScan {
        let mut in_block = false;
        scan_line(raw, &mut in_block)
    }

    #[test]
    fn strips_line_comments_and_string_bodies() {
        let s = scan(r#"printf("a; // not a comment"); // trailing"#);
        assert_eq!(s.code, r#"printf("");"#.to_string() + " ");
        assert!(!s.unclosed_string);
        assert_eq!(s.open_paren, None);
    }

    #[test]
    fn block_comment_spans_lines() {
        let mut in_block = false;
        let first = scan_line("int a; /* start", &mut in_block);
        assert!(in_block);
        assert_eq!(first.code.trim(), "int a;");
        let second = scan_line("still comment */ int b;", &mut in_block);
        assert!(!in_block);
        assert_eq!(second.code.trim(), "int b;");
    }

    #[test]
    fn reports_open_delimiters() {
        let s = scan("foo(a, b");
        assert_eq!(s.open_paren, Some(4));
        let s = scan("buf[3 = 1;");
        assert_eq!(s.open_bracket, Some(4));
        let s = scan("x = arr[(1)];");
        assert_eq!(s.open_paren, None);
        assert_eq!(s.open_bracket, None);
    }

    #[test]
    fn unterminated_string() {
        assert!(scan(r#"puts("hello);"#).unclosed_string);
        assert!(!scan(r#"c = '"';"#).unclosed_string);
        assert!(!scan(r#"s = "esc \" quote";"#).unclosed_string);
    }

    #[test]
    fn brace_kinds() {
        let mut braces = BraceStack::default();
        braces.feed("static const uint8_t table[] = {");
        assert_eq!(braces.top(), Some(BraceKind::Data));
        braces.feed("};");
        assert_eq!(braces.top(), None);

        braces.feed("typedef struct");
        braces.feed("{");
        assert_eq!(braces.top(), Some(BraceKind::Aggregate));
        braces.feed("} uart_t;");

        braces.feed("void f(void) {");
        assert_eq!(braces.top(), Some(BraceKind::Block));
        braces.feed("if (x) { y(); }");
        assert_eq!(braces.top(), Some(BraceKind::Block));
        braces.feed("}");
        assert_eq!(braces.top(), None);
    }
}
