//! `layergate` - answer access questions from a deployment file.
//!
//! The deployment file declares layers, security services and the
//! authorizations each token receives. Commands authenticate a token against
//! it and print the resulting decisions.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

const LOG_TARGETS: [&str; 4] = [
    "layergate",
    "layergate_core",
    "layergate_authorization",
    "layergate_context",
];

/// Evaluate layergate access decisions
#[derive(Parser)]
#[command(name = "layergate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Deployment file [default: layergate.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// How reports are printed
    #[arg(short = 'f', long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log nothing below errors and do not print failures
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    /// Pretty-printed JSON
    Json,
    /// JSON on a single line
    JsonCompact,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate tool, command, layer, feature and attribute decisions for a token
    Check(commands::check::CheckArgs),
    /// Show the deployment, or the security context of a token
    Inspect(commands::inspect::InspectArgs),
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };
        let directives = LOG_TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",");

        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives))
    }

    fn run(self) -> anyhow::Result<()> {
        let config = self.config.as_deref();
        match self.command {
            Commands::Check(args) => commands::check::execute(args, config, self.format),
            Commands::Inspect(args) => commands::inspect::execute(args, config, self.format),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let quiet = cli.quiet;
    if let Err(e) = cli.run() {
        if !quiet {
            eprintln!("Error: {e:#}");
        }
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
