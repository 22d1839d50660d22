use firmfix_diagnostics::SourceSet;
use firmfix_types::{Fix, Issue};

use crate::client::{GenerateOptions, GenerateRequest, InferencePort};
use crate::context::render_context;
use crate::error::{FailureClass, InferenceError, classify};
use crate::prompt::build_prompt;
use crate::sanitize::sanitize;

/// Errors considered per call; the rest of the list is ignored.
pub const MAX_FIXES: usize = 5;

pub const PRIMARY_CONFIDENCE: f32 = 0.8;
pub const FALLBACK_CONFIDENCE: f32 = 0.7;

/// Which model produced a suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelRole {
    Primary,
    Fallback,
}

impl ModelRole {
    pub fn confidence(self) -> f32 {
        match self {
            ModelRole::Primary => PRIMARY_CONFIDENCE,
            ModelRole::Fallback => FALLBACK_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairSettings {
    pub primary_model: String,
    /// Tried once when the primary attempt fails with resource exhaustion or a timeout.
    pub fallback_model: Option<String>,
    pub options: GenerateOptions,
    /// Lines shown on each side of the reported line.
    pub context_radius: u32,
    pub max_fixes: usize,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            primary_model: "codellama:13b".to_string(),
            fallback_model: Some("codellama:7b".to_string()),
            options: GenerateOptions::default(),
            context_radius: 5,
            max_fixes: MAX_FIXES,
        }
    }
}

/// Result of one prompt after the retry policy ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Generated { text: String, role: ModelRole },
    /// Fallback failed too, or no fallback is configured. Move on to the next error.
    Skipped(InferenceError),
    /// Primary failed in a way a fallback would not fix. Stop the batch.
    Aborted(InferenceError),
}

/// Run `prompt` against the primary model, retrying once on the fallback model when the
/// failure is resource exhaustion or a timeout.
pub fn generate_with_fallback(
    client: &dyn InferencePort,
    settings: &RepairSettings,
    prompt: &str,
) -> Attempt {
    let primary = GenerateRequest::new(&settings.primary_model, prompt, settings.options);
    let err = match client.generate(&primary) {
        Ok(text) => {
            return Attempt::Generated {
                text,
                role: ModelRole::Primary,
            };
        }
        Err(err) => err,
    };

    match classify(&err) {
        FailureClass::ResourceExhausted | FailureClass::Timeout => {}
        FailureClass::Other => return Attempt::Aborted(err),
    }

    let Some(fallback_model) = settings.fallback_model.as_deref() else {
        return Attempt::Skipped(err);
    };
    tracing::info!(
        primary = %settings.primary_model,
        fallback = %fallback_model,
        error = %err,
        "primary model unavailable, retrying with fallback"
    );

    let fallback = GenerateRequest::new(fallback_model, prompt, settings.options);
    match client.generate(&fallback) {
        Ok(text) => Attempt::Generated {
            text,
            role: ModelRole::Fallback,
        },
        Err(err) => Attempt::Skipped(err),
    }
}

/// Produces [`Fix`] suggestions for a list of errors.
pub struct SuggestionEngine<'a> {
    client: &'a dyn InferencePort,
    settings: RepairSettings,
}

impl<'a> SuggestionEngine<'a> {
    pub fn new(client: &'a dyn InferencePort, settings: RepairSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &RepairSettings {
        &self.settings
    }

    /// Suggest fixes for the first `max_fixes` errors, in order.
    ///
    /// Errors whose reply sanitizes to nothing, or whose fallback attempt fails, produce no
    /// fix. A non-retryable primary failure ends the batch and returns what was produced.
    pub fn suggest(&self, errors: &[Issue], sources: &SourceSet) -> Vec<Fix> {
        let mut fixes = Vec::new();

        for error in errors.iter().take(self.settings.max_fixes) {
            let context = sources
                .get(&error.file)
                .map(|file| render_context(file, error.line, self.settings.context_radius))
                .unwrap_or_default();
            let prompt = build_prompt(error, &context);

            match generate_with_fallback(self.client, &self.settings, &prompt) {
                Attempt::Generated { text, role } => {
                    let suggestion = sanitize(&text);
                    if suggestion.is_empty() {
                        tracing::debug!(location = %error.location(), "empty suggestion skipped");
                        continue;
                    }
                    fixes.push(Fix {
                        error: error.clone(),
                        suggestion,
                        confidence: role.confidence(),
                    });
                }
                Attempt::Skipped(err) => {
                    tracing::warn!(location = %error.location(), error = %err, "no suggestion");
                }
                Attempt::Aborted(err) => {
                    tracing::warn!(
                        location = %error.location(),
                        error = %err,
                        produced = fixes.len(),
                        "inference failed, stopping repair batch"
                    );
                    break;
                }
            }
        }

        fixes
    }
}
