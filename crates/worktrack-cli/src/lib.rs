//! Worktrack CLI library.
//!
//! Pieces shared by the `worktrack` binary and its tests:
//! - [`reporter::ErrorReporter`]: turns command failures into a tracked
//!   record, a rendered message and an exit code
//! - [`tracking::OperationTracker`]: the operation-tracking collaborator,
//!   with an in-memory implementation
//! - [`commands`]: command dispatch over an `ItemRepository`

pub mod cause;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod reporter;
pub mod severity;
pub mod tracking;

// Re-export commonly used types
pub use cause::{Cause, ErrorCause};
pub use config::Config;
pub use error::CliError;
pub use output::{OutputFormat, OutputSink};
pub use reporter::{ErrorReporter, ReporterConfig, EXIT_FAILURE, EXIT_SUCCESS};
pub use severity::Severity;
pub use tracking::{InMemoryOperationTracker, OperationRecord, OperationStatus, OperationTracker};
