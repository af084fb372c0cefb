// Worklink CLI - headless worklog reconciliation

mod exit_codes;
mod recon;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "wlk")]
#[command(about = "Reconcile worklogs across issue-tracker instances (headless)")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Only log errors and suppress the human summary
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log engine details (fetch counts, dropped rows, snapshot contents)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a primary instance's hours against its complementary instances
    #[command(subcommand)]
    Recon(recon::ReconCommands),
}

/// Route engine `log` records to stderr. `WORKLINK_LOG` overrides the level
/// picked from `--quiet` / `--verbose`.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env("WORKLINK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        None => {
            eprintln!("Usage: wlk <command> [options]");
            eprintln!("       wlk --help for more information");
            Err(CliError::args(""))
        }
        Some(Commands::Recon(cmd)) => recon::cmd_recon(cmd, cli.quiet),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn args(msg: impl Into<String>) -> Self {
        Self::new(EXIT_USAGE, msg)
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
