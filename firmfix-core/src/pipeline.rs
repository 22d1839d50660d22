//! Orchestrator façade: analyze, suggest, apply, report.

use camino::{Utf8Path, Utf8PathBuf};
use firmfix_diagnostics::{
    Aggregator, CompilationPass, QualityPass, SourceSet, StaticAnalysisPass, SyntaxPass,
    discover_sources,
};
use firmfix_edit::ApplyOptions;
use firmfix_repair::{InferencePort, SuggestionEngine};
use firmfix_types::{AnalysisResult, AppliedFix, Fix, Issue};
use tracing::{debug, info};

use crate::settings::PipelineSettings;

/// Hard failures of a run. Every other degraded path yields a well-formed result.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("target directory does not exist: {path}")]
    MissingDirectory { path: Utf8PathBuf },
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Outcome of [`Orchestrator::run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub initial: AnalysisResult,
    /// Re-analysis after the repair step, carrying its fixes and applied fixes.
    /// `None` when no repair was attempted.
    pub final_result: Option<AnalysisResult>,
}

impl RunOutcome {
    /// The most recent analysis.
    pub fn result(&self) -> &AnalysisResult {
        self.final_result.as_ref().unwrap_or(&self.initial)
    }
}

/// Sequences the diagnostic, repair and apply stages for one configuration.
///
/// Each `analyze` call replaces the errors, warnings and sources held from the previous one.
pub struct Orchestrator {
    settings: PipelineSettings,
    inference: Box<dyn InferencePort>,
    errors: Vec<Issue>,
    warnings: Vec<Issue>,
    fixes: Vec<Fix>,
    sources: Option<SourceSet>,
}

impl Orchestrator {
    pub fn new(settings: PipelineSettings, inference: Box<dyn InferencePort>) -> Self {
        Self {
            settings,
            inference,
            errors: Vec::new(),
            warnings: Vec::new(),
            fixes: Vec::new(),
            sources: None,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn errors(&self) -> &[Issue] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Issue] {
        &self.warnings
    }

    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Snapshot used by the last `analyze` call.
    pub fn sources(&self) -> Option<&SourceSet> {
        self.sources.as_ref()
    }

    fn aggregator(&self) -> Aggregator {
        let toggles = self.settings.passes;
        let tools = self.settings.tool_settings();
        let mut aggregator = Aggregator::new();
        if toggles.syntax {
            aggregator.push(Box::new(SyntaxPass));
        }
        if toggles.compilation {
            aggregator.push(Box::new(CompilationPass::new(tools.clone())));
        }
        if toggles.static_analysis {
            aggregator.push(Box::new(StaticAnalysisPass::new(tools)));
        }
        if toggles.quality {
            aggregator.push(Box::new(QualityPass));
        }
        aggregator
    }

    /// Run the enabled passes over `files`, or over every discovered source under `dir`.
    pub fn analyze(
        &mut self,
        dir: &Utf8Path,
        files: Option<&[Utf8PathBuf]>,
    ) -> Result<AnalysisResult, PipelineError> {
        if !dir.is_dir() {
            return Err(PipelineError::MissingDirectory {
                path: dir.to_path_buf(),
            });
        }

        let paths = match files {
            Some(files) => files.to_vec(),
            None => discover_sources(dir)?,
        };
        let sources = SourceSet::load(dir, &paths);

        let aggregator = self.aggregator();
        debug!(passes = ?aggregator.pass_names(), files = sources.files().len(), "analyze");
        let result = AnalysisResult::from_issues(aggregator.run(&sources));

        info!(
            dir = %dir,
            errors = result.summary.total_errors,
            warnings = result.summary.total_warnings,
            "analysis complete"
        );

        self.errors = result.errors.clone();
        self.warnings = result.warnings.clone();
        self.fixes.clear();
        self.sources = Some(sources);
        Ok(result)
    }

    /// Ask the inference service for fixes to `errors`, reading context from `sources`.
    pub fn get_fixes(&mut self, errors: &[Issue], sources: &SourceSet) -> Vec<Fix> {
        let engine = SuggestionEngine::new(self.inference.as_ref(), self.settings.repair_settings());
        let fixes = engine.suggest(errors, sources);
        info!(requested = errors.len(), produced = fixes.len(), "fix suggestions");
        self.fixes = fixes.clone();
        fixes
    }

    pub fn apply_fixes(&self, dir: &Utf8Path, fixes: &[Fix]) -> Vec<AppliedFix> {
        let opts = ApplyOptions {
            dry_run: self.settings.dry_run,
        };
        let applied = firmfix_edit::apply_fixes(dir, fixes, &opts);
        info!(
            fixes = fixes.len(),
            applied = applied.len(),
            dry_run = opts.dry_run,
            "fixes applied"
        );
        applied
    }

    pub fn report(&self, result: &AnalysisResult) -> String {
        firmfix_render::render_report(result)
    }

    /// Analyze; when auto-apply is on and errors exist, repair and analyze again.
    ///
    /// The second analysis is the true post-patch state; it may still contain errors.
    pub fn run(
        &mut self,
        dir: &Utf8Path,
        files: Option<&[Utf8PathBuf]>,
    ) -> Result<RunOutcome, PipelineError> {
        let initial = self.analyze(dir, files)?;
        if !self.settings.auto_apply || !initial.has_errors() {
            return Ok(RunOutcome {
                initial,
                final_result: None,
            });
        }

        let sources = self.sources.take().unwrap_or_else(|| SourceSet::new(dir, Vec::new()));
        let fixes = self.get_fixes(&initial.errors, &sources);
        // A dry run writes nothing, so it has no applied fixes to report.
        let applied = (!self.settings.dry_run).then(|| self.apply_fixes(dir, &fixes));

        let mut final_result = self.analyze(dir, files)?;
        final_result.set_fixes(fixes.clone());
        if let Some(applied) = applied {
            final_result.set_applied_fixes(applied);
        }
        self.fixes = fixes;

        Ok(RunOutcome {
            initial,
            final_result: Some(final_result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::PassToggles;
    use firmfix_repair::{GenerateRequest, InferenceError};

    struct Offline;

    impl InferencePort for Offline {
        fn generate(&self, _request: &GenerateRequest) -> Result<String, InferenceError> {
            Err(InferenceError::Timeout)
        }
    }

    fn orchestrator(passes: PassToggles) -> Orchestrator {
        let settings = PipelineSettings {
            passes,
            ..PipelineSettings::default()
        };
        Orchestrator::new(settings, Box::new(Offline))
    }

    #[test]
    fn all_passes_run_in_fixed_order() {
        let orch = orchestrator(PassToggles::default());
        assert_eq!(
            orch.aggregator().pass_names(),
            vec!["syntax", "compilation", "static_analysis", "quality"]
        );
    }

    #[test]
    fn disabled_passes_are_left_out() {
        let orch = orchestrator(PassToggles {
            compilation: false,
            static_analysis: false,
            ..PassToggles::default()
        });
        assert_eq!(orch.aggregator().pass_names(), vec!["syntax", "quality"]);
    }
}
