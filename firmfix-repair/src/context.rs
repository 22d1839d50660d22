use firmfix_diagnostics::SourceFile;

/// Marker placed in front of the reported line.
pub(crate) const ERROR_MARKER: &str = "=>";

/// Render the lines within `radius` of `line`, numbered, with the reported line marked.
///
/// The window is clipped to the file; a line past the end yields an empty window.
pub fn render_context(file: &SourceFile, line: u32, radius: u32) -> String {
    let total = file.contents.lines().count() as u32;
    if line == 0 || line > total {
        return String::new();
    }

    let first = line.saturating_sub(radius).max(1);
    let last = line.saturating_add(radius).min(total);
    let width = last.to_string().len();

    let mut out = String::new();
    for (idx, text) in file
        .contents
        .lines()
        .enumerate()
        .skip(first as usize - 1)
        .take((last - first + 1) as usize)
    {
        let n = idx as u32 + 1;
        let marker = if n == line { ERROR_MARKER } else { "  " };
        out.push_str(&format!("{marker} {n:>width$}: {text}\n"));
    }
    out
}
