mod commands;
mod sphere;

use clap::Parser;
use pr_core::{ConfigError, InvertorError};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

pub fn run_from_env() -> i32 {
    if let Err(error) = init_tracing() {
        eprintln!("warning: {error:#}");
    }

    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

/// Installs a stderr subscriber so stdout carries only the JSON report.
fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialise tracing subscriber: {error}"))
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "pr-invert",
    version,
    about = "P(r) inversion of small-angle scattering intensities"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Invert the scattering curve of a homogeneous sphere and report diagnostics
    Sphere(commands::SphereArgs),
    /// Print the default inversion config as JSON
    Defaults,
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Sphere(args) => commands::run_sphere_command(args),
        CliCommand::Defaults => commands::run_defaults_command(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("inversion failed: {0}")]
    Compute(#[from] InvertorError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::Config(_) => 2,
            Self::Compute(_) => 4,
            Self::Internal(_) => 1,
        }
    }
}
