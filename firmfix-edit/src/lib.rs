//! Apply engine for repair suggestions.
//!
//! Each [`Fix`] replaces exactly one line, the one its error points at, with the trimmed
//! suggestion. Files are loaded lazily, edited in memory and written at most once.
//!
//! Line numbers always refer to the file as it was before the batch: a multi-line suggestion
//! occupies a single slot, so later fixes in the same file still land on their original line.

mod error;

pub use error::EditError;

use std::collections::BTreeMap;

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use firmfix_types::{AppliedFix, Fix};
use fs_err as fs;

#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Write nothing. No audit entries are produced; use [`preview_patch`] to see the change.
    pub dry_run: bool,
}

/// In-memory result of running a batch of fixes.
#[derive(Debug, Clone, Default)]
pub struct EditOutcome {
    pub applied: Vec<AppliedFix>,
    /// Contents of every loaded file, keyed by the path the fixes used.
    pub before: BTreeMap<Utf8PathBuf, String>,
    pub after: BTreeMap<Utf8PathBuf, String>,
}

impl EditOutcome {
    /// Files whose contents differ after the batch.
    pub fn changed_files(&self) -> impl Iterator<Item = (&Utf8PathBuf, &String)> {
        self.after
            .iter()
            .filter(|(path, new)| self.before.get(*path) != Some(*new))
    }
}

/// One file held in memory as line slots.
#[derive(Debug)]
struct Buffer {
    original: String,
    slots: Vec<String>,
    eol: &'static str,
    trailing_eol: bool,
}

impl Buffer {
    fn parse(contents: String) -> Self {
        let eol = if contents.contains("\r\n") { "\r\n" } else { "\n" };
        let trailing_eol = contents.ends_with('\n');
        let body = contents.strip_suffix(eol).unwrap_or(&contents);
        let slots = if body.is_empty() && trailing_eol {
            vec![String::new()]
        } else if body.is_empty() {
            Vec::new()
        } else {
            body.split(eol).map(str::to_string).collect()
        };
        Self {
            original: contents,
            slots,
            eol,
            trailing_eol,
        }
    }

    fn render(&self) -> String {
        let mut out = self.slots.join(self.eol);
        if self.trailing_eol {
            out.push_str(self.eol);
        }
        out
    }
}

/// Join `rel` onto `root`, or `None` when the result would leave `root`.
///
/// Absolute paths are accepted only below `root`. `..` components are rejected outright.
fn abs_path(root: &Utf8Path, rel: &Utf8Path) -> Option<Utf8PathBuf> {
    let rel = if rel.is_absolute() {
        rel.strip_prefix(root).ok()?
    } else {
        rel
    };
    let contained = rel
        .components()
        .all(|c| matches!(c, Utf8Component::Normal(_) | Utf8Component::CurDir));
    contained.then(|| root.join(rel))
}

fn load(root: &Utf8Path, rel: &Utf8Path) -> Result<Buffer, EditError> {
    let path = abs_path(root, rel).ok_or_else(|| EditError::OutsideRoot {
        path: rel.to_path_buf(),
    })?;
    let contents = fs::read_to_string(&path).map_err(|source| EditError::Read {
        path: path.clone(),
        source,
    })?;
    Ok(Buffer::parse(contents))
}

/// Run `fixes` in memory against the files under `root`.
///
/// Fixes whose file cannot be read, lies outside `root`, or whose line is outside the file,
/// are skipped. When two
/// fixes target the same line the later one wins and both are recorded.
pub fn execute_fixes(root: &Utf8Path, fixes: &[Fix]) -> EditOutcome {
    let mut buffers: BTreeMap<Utf8PathBuf, Option<Buffer>> = BTreeMap::new();
    let mut applied = Vec::new();

    for fix in fixes {
        let rel = Utf8PathBuf::from(&fix.error.file);
        let slot = buffers.entry(rel.clone()).or_insert_with(|| match load(root, &rel) {
            Ok(buffer) => Some(buffer),
            Err(err) => {
                tracing::debug!(error = %err, "fix target unavailable");
                None
            }
        });
        let Some(buffer) = slot.as_mut() else {
            continue;
        };

        let line = fix.error.line;
        let lines = buffer.slots.len();
        let Some(current) = (line as usize)
            .checked_sub(1)
            .and_then(|idx| buffer.slots.get_mut(idx))
        else {
            tracing::debug!(
                file = %rel,
                line,
                lines,
                "fix line out of range, skipped"
            );
            continue;
        };

        let new = fix.suggestion.trim().to_string();
        let old = std::mem::replace(current, new.clone());
        applied.push(AppliedFix {
            file: fix.error.file.clone(),
            line,
            old,
            new,
        });
    }

    let mut before = BTreeMap::new();
    let mut after = BTreeMap::new();
    for (path, buffer) in buffers {
        if let Some(buffer) = buffer {
            after.insert(path.clone(), buffer.render());
            before.insert(path, buffer.original);
        }
    }

    EditOutcome {
        applied,
        before,
        after,
    }
}

/// Apply `fixes` to the files under `root` and return the audit trail of what was written.
///
/// Each changed file is written once. A file that fails to write keeps its old contents and
/// its entries are dropped from the returned list.
pub fn apply_fixes(root: &Utf8Path, fixes: &[Fix], opts: &ApplyOptions) -> Vec<AppliedFix> {
    if opts.dry_run {
        tracing::debug!(fixes = fixes.len(), "dry run, nothing written");
        return Vec::new();
    }
    let outcome = execute_fixes(root, fixes);

    let mut failed: Vec<&Utf8PathBuf> = Vec::new();
    for (rel, contents) in outcome.changed_files() {
        let Some(path) = abs_path(root, rel) else {
            continue;
        };
        if let Err(source) = fs::write(&path, contents) {
            let err = EditError::Write { path, source };
            tracing::warn!(error = %err, "fixes for file discarded");
            failed.push(rel);
        }
    }

    outcome
        .applied
        .iter()
        .filter(|fix| !failed.iter().any(|rel| rel.as_str() == fix.file))
        .cloned()
        .collect()
}

/// Unified diff of what [`apply_fixes`] would change, without writing anything.
pub fn preview_patch(root: &Utf8Path, fixes: &[Fix]) -> String {
    let outcome = execute_fixes(root, fixes);
    render_patch(&outcome.before, &outcome.after)
}

fn render_patch(
    before: &BTreeMap<Utf8PathBuf, String>,
    after: &BTreeMap<Utf8PathBuf, String>,
) -> String {
    let mut out = String::new();
    let formatter = PatchFormatter::new();

    for (path, old) in before {
        let new = after.get(path).unwrap_or(old);
        if old == new {
            continue;
        }

        out.push_str(&format!("--- a/{0}\n+++ b/{0}\n", path));
        let patch = diffy::create_patch(old, new);
        let body = formatter.fmt_patch(&patch).to_string();
        // create_patch emits its own ---/+++ header; keep only the hunks.
        for line in body.lines().skip_while(|l| !l.starts_with("@@")) {
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}
