use firmfix_types::Issue;

use crate::context::ERROR_MARKER;

/// Build the repair prompt for one error.
///
/// `context` is the numbered window from [`render_context`](crate::render_context). An empty
/// window is replaced by a note so the model still receives the diagnostic.
pub fn build_prompt(issue: &Issue, context: &str) -> String {
    let context = if context.trim().is_empty() {
        "(source context unavailable)\n"
    } else {
        context
    };

    let mut out = String::new();
    out.push_str(
        "You are an expert embedded C developer. Fix the error reported below in a C source file.\n\n",
    );
    out.push_str(&format!("File: {}\n", issue.file));
    out.push_str(&format!("Line: {}\n", issue.line));
    out.push_str(&format!("Error: {}\n\n", issue.message));
    out.push_str(&format!(
        "Code context (the reported line is marked with {ERROR_MARKER}):\n"
    ));
    out.push_str(context);
    out.push('\n');
    out.push_str(&format!(
        "Reply with only the corrected C code that replaces line {}. \
         Do not add explanations, line numbers or markdown.\n",
        issue.line
    ));
    out
}
