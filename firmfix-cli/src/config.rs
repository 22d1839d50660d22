//! Configuration file loading for firmfix.
//!
//! Discovers and loads `firmfix.toml` from the target directory and merges it with CLI
//! arguments. CLI arguments take precedence over the file, the file over built-in defaults.

use std::time::Duration;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use firmfix_core::{PassToggles, PipelineSettings};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "firmfix.toml";

/// Top-level configuration from firmfix.toml. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FirmfixConfig {
    pub passes: PassesConfig,
    pub tools: ToolsConfig,
    pub models: ModelsConfig,
    pub timeouts: TimeoutsConfig,
    pub repair: RepairConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PassesConfig {
    pub syntax: Option<bool>,
    pub compilation: Option<bool>,
    pub static_analysis: Option<bool>,
    pub quality: Option<bool>,
}

/// External tool binaries.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub compiler: Option<String>,
    pub cppcheck: Option<String>,
    pub clang_tidy: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub endpoint: Option<String>,
    pub primary: Option<String>,
    /// An empty string disables the fallback attempt.
    pub fallback: Option<String>,
    pub temperature: Option<f32>,
    pub num_ctx: Option<u32>,
}

/// Timeouts in seconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub compile: Option<u64>,
    pub analyzer: Option<u64>,
    pub inference: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RepairConfig {
    pub context_radius: Option<u32>,
    pub max_fixes: Option<usize>,
    pub auto_apply: Option<bool>,
}

/// Discover the firmfix.toml config file in `dir`.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<FirmfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<FirmfixConfig> {
    let config: FirmfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `dir`, or return the default if there is none.
pub fn load_or_default(dir: &Utf8Path) -> anyhow::Result<FirmfixConfig> {
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(FirmfixConfig::default()),
    }
}

/// Values given on the command line. `None`/`false` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub no_syntax: bool,
    pub no_compile: bool,
    pub no_static_analysis: bool,
    pub no_quality: bool,
    pub compiler: Option<String>,
    pub model: Option<String>,
    pub fallback_model: Option<String>,
    pub endpoint: Option<String>,
    pub fix: bool,
    pub dry_run: bool,
    pub verbose: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: FirmfixConfig,
}

impl ConfigMerger {
    pub fn new(config: FirmfixConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings for the `check` command.
    ///
    /// `--no-*` flags disable a pass regardless of the file; `--fix` enables repair.
    pub fn merge_check_args(self, cli: &CliOverrides) -> PipelineSettings {
        let defaults = PipelineSettings::default();
        let file = self.config;

        let pass = |disabled: bool, configured: Option<bool>, default: bool| {
            !disabled && configured.unwrap_or(default)
        };
        let passes = PassToggles {
            syntax: pass(cli.no_syntax, file.passes.syntax, defaults.passes.syntax),
            compilation: pass(
                cli.no_compile,
                file.passes.compilation,
                defaults.passes.compilation,
            ),
            static_analysis: pass(
                cli.no_static_analysis,
                file.passes.static_analysis,
                defaults.passes.static_analysis,
            ),
            quality: pass(cli.no_quality, file.passes.quality, defaults.passes.quality),
        };

        let fallback_model = cli
            .fallback_model
            .clone()
            .or(file.models.fallback)
            .or(defaults.fallback_model)
            .filter(|m| !m.trim().is_empty());

        let secs = |configured: Option<u64>, default: Duration| {
            configured.map(Duration::from_secs).unwrap_or(default)
        };

        PipelineSettings {
            passes,
            compiler: cli
                .compiler
                .clone()
                .or(file.tools.compiler)
                .unwrap_or(defaults.compiler),
            cppcheck: file.tools.cppcheck.unwrap_or(defaults.cppcheck),
            clang_tidy: file.tools.clang_tidy.unwrap_or(defaults.clang_tidy),
            endpoint: cli
                .endpoint
                .clone()
                .or(file.models.endpoint)
                .unwrap_or(defaults.endpoint),
            primary_model: cli
                .model
                .clone()
                .or(file.models.primary)
                .unwrap_or(defaults.primary_model),
            fallback_model,
            temperature: file.models.temperature.unwrap_or(defaults.temperature),
            num_ctx: file.models.num_ctx.unwrap_or(defaults.num_ctx),
            timeouts: firmfix_core::Timeouts {
                compile: secs(file.timeouts.compile, defaults.timeouts.compile),
                analyzer: secs(file.timeouts.analyzer, defaults.timeouts.analyzer),
                inference: secs(file.timeouts.inference, defaults.timeouts.inference),
            },
            context_radius: file.repair.context_radius.unwrap_or(defaults.context_radius),
            max_fixes: file.repair.max_fixes.unwrap_or(defaults.max_fixes),
            auto_apply: cli.fix || file.repair.auto_apply.unwrap_or(defaults.auto_apply),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
        }
    }
}
