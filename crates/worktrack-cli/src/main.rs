//! Worktrack CLI - track work items from the command line.
//!
//! Usage:
//!   worktrack add --title "Fix login" --type bug --priority high
//!   worktrack list --status in-progress
//!   worktrack move <ID> triaged
//!   worktrack --format json --seed items.json show <ID>

use std::io;
use std::sync::Arc;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use worktrack_cli::commands::{self, Cli};
use worktrack_cli::{Config, ErrorReporter, InMemoryOperationTracker};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);

    // Logs go to stderr so stdout stays parseable in JSON mode
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!(command = cli.command.name(), format = %config.output_format, "Starting worktrack");

    let tracker = Arc::new(InMemoryOperationTracker::new());
    let reporter = ErrorReporter::new(tracker.clone(), config.reporter_config());

    let code = match commands::open_repository(&config, &tracker, &reporter) {
        Ok(repo) => {
            let mut stdout = io::stdout().lock();
            commands::run(&cli.command, &repo, &tracker, &reporter, &mut stdout)
        }
        Err(code) => code,
    };

    std::process::exit(code);
}
