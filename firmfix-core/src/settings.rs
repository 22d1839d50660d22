//! Clap-free run configuration for the orchestrator.

use std::time::Duration;

use firmfix_diagnostics::ToolSettings;
use firmfix_repair::{DEFAULT_ENDPOINT, GenerateOptions, MAX_FIXES, RepairSettings};

/// Which diagnostic passes run. Disabled passes contribute nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToggles {
    pub syntax: bool,
    pub compilation: bool,
    pub static_analysis: bool,
    pub quality: bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        Self {
            syntax: true,
            compilation: true,
            static_analysis: true,
            quality: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub compile: Duration,
    pub analyzer: Duration,
    pub inference: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            compile: Duration::from_secs(10),
            analyzer: Duration::from_secs(15),
            inference: Duration::from_secs(60),
        }
    }
}

/// Settings for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub passes: PassToggles,

    // Tools
    pub compiler: String,
    pub cppcheck: String,
    pub clang_tidy: String,

    // Inference
    pub endpoint: String,
    pub primary_model: String,
    pub fallback_model: Option<String>,
    pub temperature: f32,
    pub num_ctx: u32,

    pub timeouts: Timeouts,

    // Repair
    pub context_radius: u32,
    pub max_fixes: usize,
    /// Run the repair step and re-analyze when the first analysis finds errors.
    pub auto_apply: bool,
    /// Compute the audit list without writing files.
    pub dry_run: bool,

    pub verbose: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let repair = RepairSettings::default();
        Self {
            passes: PassToggles::default(),
            compiler: "gcc".to_string(),
            cppcheck: "cppcheck".to_string(),
            clang_tidy: "clang-tidy".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            primary_model: repair.primary_model,
            fallback_model: repair.fallback_model,
            temperature: 0.1,
            num_ctx: 4096,
            timeouts: Timeouts::default(),
            context_radius: 5,
            max_fixes: MAX_FIXES,
            auto_apply: false,
            dry_run: false,
            verbose: false,
        }
    }
}

impl PipelineSettings {
    pub fn tool_settings(&self) -> ToolSettings {
        ToolSettings {
            compiler: self.compiler.clone(),
            cppcheck: self.cppcheck.clone(),
            clang_tidy: self.clang_tidy.clone(),
            compile_timeout: self.timeouts.compile,
            analyzer_timeout: self.timeouts.analyzer,
            verbose: self.verbose,
        }
    }

    pub fn repair_settings(&self) -> RepairSettings {
        RepairSettings {
            primary_model: self.primary_model.clone(),
            fallback_model: self.fallback_model.clone(),
            options: GenerateOptions {
                temperature: self.temperature,
                num_ctx: self.num_ctx,
            },
            context_radius: self.context_radius,
            max_fixes: self.max_fixes,
        }
    }
}
