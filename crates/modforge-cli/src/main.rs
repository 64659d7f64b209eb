//! # modforge-cli
//!
//! Command-line installer for forge modules.
//!
//! This is the entry point for the `modforge` binary. It parses the command
//! line, sets up logging, and dispatches to the command handlers.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::CommandContext;
use output::errors::ErrorFormatter;

/// Install forge modules and their dependencies
#[derive(Debug, Parser)]
#[command(name = "modforge", version, about = "Install forge modules")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry to install from
    #[arg(long, global = true, value_name = "URL")]
    pub registry: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install a module and its dependencies
    Install(InstallArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InstallArgs {
    /// Module to install, as owner-name or owner/name
    pub name: String,

    /// Version constraint for the module
    #[arg(long, value_name = "CONSTRAINT")]
    pub version: Option<String>,

    /// Directory to install modules into
    #[arg(long, value_name = "PATH")]
    pub dir: Option<String>,

    /// Install the module alone and overwrite an existing copy
    #[arg(short, long)]
    pub force: bool,

    /// Install the module without its dependencies
    #[arg(long)]
    pub ignore_dependencies: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    debug!("Starting modforge v{}", env!("CARGO_PKG_VERSION"));

    match run_cli(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprint!("{}", ErrorFormatter::new().format_report(&err));
            ExitCode::FAILURE
        },
    }
}

/// Run the command; `Ok(false)` is a reported failure
fn run_cli(cli: Cli) -> anyhow::Result<bool> {
    let rt = tokio::runtime::Runtime::new()?;

    rt.block_on(async {
        let ctx = CommandContext::new(cli.registry)?;
        commands::dispatch_command(cli.command, &ctx).await
    })
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("modforge={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("modforge encountered an unexpected error: {}", panic_info);
        eprintln!("modforge crashed! This is a bug.");
        eprintln!("Error: {}", panic_info);
    }));
}
