//! Error types for firmfix-edit.
//!
//! None of these escape [`apply_fixes`](crate::apply_fixes); they are logged and the affected
//! fixes are left out of the audit trail.

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is outside the target directory")]
    OutsideRoot { path: Utf8PathBuf },
}
