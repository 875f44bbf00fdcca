//! CLI configuration.

use std::path::PathBuf;

use crate::commands::Cli;
use crate::{OutputFormat, ReporterConfig};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rendering for results and errors.
    pub output_format: OutputFormat,

    /// Emit cause and stack detail on errors.
    pub verbose: bool,

    /// JSON file of work items loaded at start-up.
    pub seed_path: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is not set.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Text,
            verbose: false,
            seed_path: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Build configuration from parsed command-line arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            output_format: cli.format,
            verbose: cli.verbose,
            seed_path: cli.seed.clone(),
            log_filter: if cli.verbose { "debug" } else { "warn" }.to_string(),
        }
    }

    /// Reporter configuration writing to the default sinks.
    pub fn reporter_config(&self) -> ReporterConfig {
        ReporterConfig::default()
            .with_verbose(self.verbose)
            .with_output_format(self.output_format)
    }
}
