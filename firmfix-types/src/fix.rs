use crate::issue::Issue;
use serde::{Deserialize, Serialize};

/// A proposed replacement for the line an [`Issue`] points at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    /// The issue this fix addresses.
    pub error: Issue,

    /// Sanitized replacement text; may span several lines.
    pub suggestion: String,

    /// Advisory score in `[0, 1]`. Never used to gate application.
    pub confidence: f32,
}

/// Audit record of a fix that was actually written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedFix {
    pub file: String,
    pub line: u32,
    pub old: String,
    pub new: String,
}
