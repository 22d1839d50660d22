//! The four diagnostic passes.
//!
//! Each pass is self-contained: it reads the shared [`SourceSet`] snapshot and returns its own
//! issues. Passes never see each other's output.

use crate::source::SourceSet;
use firmfix_types::Issue;
use std::time::Duration;

mod compile;
mod quality;
mod scan;
mod static_analysis;
mod syntax;

pub use compile::{CompilationPass, build_unit, parse_compiler_output};
pub use quality::QualityPass;
pub use static_analysis::{StaticAnalysisPass, parse_clang_tidy_output, parse_cppcheck_output};
pub use syntax::SyntaxPass;

pub mod heuristics {
    //! Per-file entry points of the heuristic passes.
    pub use super::quality::check_file as quality_check_file;
    pub use super::syntax::check_file as syntax_check_file;
}

pub trait DiagnosticPass {
    /// Stable pass name, used in logs.
    fn name(&self) -> &'static str;

    fn run(&self, sources: &SourceSet) -> Vec<Issue>;
}

/// External tool configuration for the compiler and analyzer passes.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub compiler: String,
    pub cppcheck: String,
    pub clang_tidy: String,
    pub compile_timeout: Duration,
    pub analyzer_timeout: Duration,
    /// Log swallowed tool failures at `warn` instead of `debug`.
    pub verbose: bool,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            compiler: "gcc".to_string(),
            cppcheck: "cppcheck".to_string(),
            clang_tidy: "clang-tidy".to_string(),
            compile_timeout: Duration::from_secs(10),
            analyzer_timeout: Duration::from_secs(15),
            verbose: false,
        }
    }
}
