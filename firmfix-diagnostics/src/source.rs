use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use tracing::debug;

/// Extensions picked up when no explicit file list is given.
pub const SOURCE_EXTENSIONS: &[&str] = &["c", "h"];

/// One loaded input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the analyzed directory (as given, when absolute).
    pub path: Utf8PathBuf,
    pub contents: String,
}

impl SourceFile {
    pub fn new(path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }

    /// Display name used in `Issue::file`.
    pub fn name(&self) -> &str {
        self.path.as_str()
    }

    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }

    pub fn is_header(&self) -> bool {
        self.path.extension() == Some("h")
    }

    /// Content of a 1-indexed line, if it exists.
    pub fn line(&self, line: u32) -> Option<&str> {
        let idx = (line as usize).checked_sub(1)?;
        self.contents.lines().nth(idx)
    }
}

/// The immutable snapshot every diagnostic pass runs against.
#[derive(Debug, Clone)]
pub struct SourceSet {
    root: Utf8PathBuf,
    files: Vec<SourceFile>,
}

impl SourceSet {
    pub fn new(root: impl Into<Utf8PathBuf>, files: Vec<SourceFile>) -> Self {
        Self {
            root: root.into(),
            files,
        }
    }

    /// Read the given files relative to `root`. Files that cannot be read are skipped.
    pub fn load(root: &Utf8Path, paths: &[Utf8PathBuf]) -> Self {
        let mut files = Vec::with_capacity(paths.len());
        for rel in paths {
            let abs = if rel.is_absolute() {
                rel.clone()
            } else {
                root.join(rel)
            };
            match fs::read_to_string(&abs) {
                Ok(contents) => files.push(SourceFile::new(rel.clone(), contents)),
                Err(err) => debug!(file = %abs, error = %err, "skipping unreadable source"),
            }
        }
        Self::new(root.to_path_buf(), files)
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.name() == name)
    }

    /// Position of a file in the snapshot; used to keep issue order stable.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name() == name)
    }
}

/// Find `*.c` / `*.h` files under `dir`, recursively, relative to `dir` and sorted.
pub fn discover_sources(dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut out = Vec::new();
    for ext in SOURCE_EXTENSIONS {
        let pattern = dir.join(format!("**/*.{ext}"));
        let pattern_str = pattern.as_str();
        debug!(pattern = %pattern_str, "scanning for sources");

        for entry in glob(pattern_str).with_context(|| format!("glob {pattern_str}"))? {
            let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
            let Ok(path) = Utf8PathBuf::from_path_buf(path) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            let rel = path
                .strip_prefix(dir)
                .map(Utf8Path::to_path_buf)
                .unwrap_or(path);
            out.push(rel);
        }
    }

    // Deterministic order matters.
    out.sort();
    out.dedup();
    Ok(out)
}
