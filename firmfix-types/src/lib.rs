//! Shared DTOs for the firmfix workspace.
//!
//! # Design constraints
//! - These types are the wire shape handed to callers (`errors`, `warnings`, `fixes`, `summary`).
//! - Records are created fresh per pipeline invocation; nothing here is persisted.
//! - Prefer adding optional fields over changing semantics.

pub mod fix;
pub mod issue;
pub mod result;

pub use fix::{AppliedFix, Fix};
pub use issue::{Issue, IssueKind, Severity};
pub use result::{AnalysisResult, Summary};
