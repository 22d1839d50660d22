use crate::source::SourceFile;
use camino::Utf8Path;

/// Map a path printed by an external tool back to one of the input files.
///
/// Resolution order:
/// 1. the reported path equals an input's relative path;
/// 2. the reported path ends with an input's relative path (tools often print absolute paths);
/// 3. the reported file name equals an input's file name.
///
/// Step 3 is ambiguous when two inputs share a file name; the first one in snapshot order wins.
pub fn resolve_reported_path<'a>(reported: &str, files: &'a [SourceFile]) -> Option<&'a SourceFile> {
    let reported = reported.trim().replace('\\', "/");
    let reported = reported.strip_prefix("./").unwrap_or(&reported);
    let reported_path = Utf8Path::new(reported);

    if let Some(f) = files.iter().find(|f| f.path.as_str() == reported) {
        return Some(f);
    }

    if let Some(f) = files.iter().find(|f| reported_path.ends_with(&f.path)) {
        return Some(f);
    }

    let name = reported_path.file_name()?;
    files.iter().find(|f| f.file_name() == name)
}
