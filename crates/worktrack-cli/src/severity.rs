//! Failure severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a reported failure is.
///
/// All levels are tracked the same way; they differ only in the text
/// prefix and the `severity` field of JSON output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Caller input problems, usually aggregated per field.
    Validation,
    /// Non-fatal issue.
    Warning,
    /// Failure that stops the operation.
    #[default]
    Error,
    /// Infrastructure failure (file system, environment, ...).
    System,
    /// Access or trust problem.
    Security,
}

impl Severity {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::System => "SYSTEM",
            Self::Security => "SECURITY",
        }
    }

    /// Prefix used when rendering a message as text.
    pub fn text_prefix(&self) -> String {
        match self {
            Self::Error | Self::System | Self::Security => format!("{} ERROR: ", self.as_str()),
            Self::Warning => "WARNING: ".to_string(),
            Self::Validation => "Error: ".to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
