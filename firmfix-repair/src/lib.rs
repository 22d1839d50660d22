//! Repair suggestions for diagnosed errors.
//!
//! For a bounded prefix of the error list the engine renders a context window, asks a local
//! inference service for a replacement (primary model, then at most one fallback attempt on
//! resource exhaustion or timeout), and sanitizes the free-form reply into a [`Fix`].
//!
//! Failures never escape as errors: a batch that stops early returns the fixes produced so far.
//!
//! [`Fix`]: firmfix_types::Fix

mod client;
mod context;
mod engine;
mod error;
mod prompt;
mod sanitize;

pub use client::{
    DEFAULT_ENDPOINT, GenerateOptions, GenerateRequest, InferencePort, OllamaClient,
    extract_response_text,
};
pub use context::render_context;
pub use engine::{
    Attempt, FALLBACK_CONFIDENCE, MAX_FIXES, ModelRole, PRIMARY_CONFIDENCE, RepairSettings,
    SuggestionEngine, generate_with_fallback,
};
pub use error::{FailureClass, InferenceError, classify};
pub use prompt::build_prompt;
pub use sanitize::sanitize;
