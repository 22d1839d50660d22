//! Embeddable core library for firmfix.
//!
//! Provides a clap-free entry point that sequences the diagnostic passes, the repair
//! suggestion engine and the apply engine over one directory snapshot.
//!
//! The inference service is reached through the
//! [`InferencePort`](firmfix_repair::InferencePort) trait;
//! [`adapters::inference_client`] builds the default HTTP implementation.
//!
//! # Entry points
//!
//! - [`Orchestrator::analyze`](pipeline::Orchestrator::analyze) - run the enabled passes
//! - [`Orchestrator::run`](pipeline::Orchestrator::run) - analyze, repair, apply, re-analyze

pub mod adapters;
pub mod pipeline;
pub mod settings;

pub use pipeline::{Orchestrator, PipelineError, RunOutcome};
pub use settings::{PassToggles, PipelineSettings, Timeouts};

// Re-exported so embedders can supply their own inference port.
pub use firmfix_repair::{GenerateRequest, InferenceError, InferencePort};
pub use firmfix_types::{AnalysisResult, AppliedFix, Fix, Issue};
