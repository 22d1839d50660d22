mod config;

use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use firmfix_core::{Orchestrator, PipelineError, RunOutcome, adapters};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Default filter directive for `--verbose` when `RUST_LOG` is unset.
const VERBOSE_DIRECTIVE: &str = "firmfix=debug,firmfix_core=debug,firmfix_diagnostics=debug,\
firmfix_repair=debug,firmfix_edit=debug";

const EXIT_CLEAN: u8 = 0;
const EXIT_ERRORS_REMAIN: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "firmfix",
    version,
    about = "Diagnose and repair generated embedded C sources."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Analyze a directory of C sources and optionally apply model-suggested fixes.
    Check(CheckArgs),
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Directory containing the sources to check.
    dir: Utf8PathBuf,

    /// Analyze only these files (relative to DIR). Repeatable.
    #[arg(long = "file")]
    files: Vec<Utf8PathBuf>,

    /// Ask the model for fixes, apply them, and analyze again.
    #[arg(long, default_value_t = false)]
    fix: bool,

    /// With --fix, compute fixes and print the patch without writing files.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    #[arg(long, default_value_t = false)]
    no_syntax: bool,

    #[arg(long, default_value_t = false)]
    no_compile: bool,

    #[arg(long, default_value_t = false)]
    no_static_analysis: bool,

    #[arg(long, default_value_t = false)]
    no_quality: bool,

    /// C compiler binary.
    #[arg(long)]
    compiler: Option<String>,

    /// Primary model identifier.
    #[arg(long, env = "FIRMFIX_MODEL")]
    model: Option<String>,

    /// Fallback model tried once on resource exhaustion or timeout.
    #[arg(long, env = "FIRMFIX_FALLBACK_MODEL")]
    fallback_model: Option<String>,

    /// Inference service endpoint.
    #[arg(long, env = "FIRMFIX_ENDPOINT")]
    endpoint: Option<String>,

    /// Log skipped tools and inference attempts.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,
}

impl CheckArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            no_syntax: self.no_syntax,
            no_compile: self.no_compile,
            no_static_analysis: self.no_static_analysis,
            no_quality: self.no_quality,
            compiler: self.compiler.clone(),
            model: self.model.clone(),
            fallback_model: self.fallback_model.clone(),
            endpoint: self.endpoint.clone(),
            fix: self.fix,
            dry_run: self.dry_run,
            verbose: self.verbose,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{:?}", e);
            let code = e
                .downcast_ref::<PipelineError>()
                .map(PipelineError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<u8> {
    let cli = Cli::parse();
    let verbose = match &cli.cmd {
        Command::Check(args) => args.verbose,
    };
    init_tracing(verbose);

    match cli.cmd {
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_DIRECTIVE } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<u8> {
    if !args.dir.is_dir() {
        return Err(PipelineError::MissingDirectory {
            path: args.dir.clone(),
        }
        .into());
    }

    let file_config = config::load_or_default(&args.dir).context("load firmfix.toml config")?;
    let settings = ConfigMerger::new(file_config).merge_check_args(&args.overrides());
    debug!(?settings, "merged config");

    let client = adapters::inference_client(&settings)?;
    let dry_run = settings.dry_run;
    let mut orch = Orchestrator::new(settings, Box::new(client));

    let files = (!args.files.is_empty()).then_some(args.files.as_slice());
    let outcome = orch.run(&args.dir, files)?;

    match args.format {
        OutputFormat::Text => print_text(&orch, &outcome, &args, dry_run),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(outcome.result()).context("serialize json")?;
            println!("{json}");
        }
    }

    Ok(if outcome.result().has_errors() {
        EXIT_ERRORS_REMAIN
    } else {
        EXIT_CLEAN
    })
}

fn print_text(orch: &Orchestrator, outcome: &RunOutcome, args: &CheckArgs, dry_run: bool) {
    print!("{}", orch.report(&outcome.initial));

    let Some(final_result) = &outcome.final_result else {
        return;
    };

    if dry_run {
        let patch = firmfix_edit::preview_patch(&args.dir, &final_result.fixes);
        println!("\nPatch (dry run, not written):");
        if patch.is_empty() {
            println!("  (no changes)");
        } else {
            print!("{patch}");
        }
    }

    println!("\nAfter repair:\n");
    print!("{}", orch.report(final_result));
}
