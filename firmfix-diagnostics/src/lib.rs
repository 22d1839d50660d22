//! Diagnostic aggregation for generated embedded C source trees.
//!
//! Four independent passes scan the same immutable [`SourceSet`] snapshot and each return their own
//! `Vec<Issue>`; the [`Aggregator`] concatenates them in pass order. External tools (compiler,
//! cppcheck, clang-tidy) are optional: a missing binary, a timeout or output that does not match the
//! expected grammar yields no issues rather than an error.
//!
//! The tool line-matchers in [`matchers`] are tied to the textual output of the tool versions they
//! were written against. They are not general-purpose parsers.

mod aggregate;
pub mod exec;
pub mod matchers;
pub mod passes;
mod resolve;
mod source;

pub use aggregate::Aggregator;
pub use exec::{ExecError, ToolOutput, run_with_timeout};
pub use passes::{
    CompilationPass, DiagnosticPass, QualityPass, StaticAnalysisPass, SyntaxPass, ToolSettings,
};
pub use resolve::resolve_reported_path;
pub use source::{SOURCE_EXTENSIONS, SourceFile, SourceSet, discover_sources};
