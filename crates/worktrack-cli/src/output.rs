//! Output formats, sinks and the JSON shape of error output.

use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use crate::CliError;

/// Destination for one fully rendered string per call.
pub type OutputSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Sink writing each string plus a newline to stderr.
pub fn stderr_sink() -> OutputSink {
    Arc::new(|line: &str| {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", line);
        let _ = stderr.flush();
    })
}

/// Output format for command results and errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Structured JSON.
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(CliError::InvalidArgument {
                name: "format".to_string(),
                reason: format!("unknown output format '{other}'"),
            }),
        }
    }
}

/// Fixed context string attached to every JSON error.
pub const ERROR_CONTEXT: &str = "Command execution error";

/// JSON error object passed to the sink.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorOutput {
    /// Always `"error"`.
    pub result: &'static str,
    pub message: String,
    pub severity: String,
    pub details: ErrorDetails,

    /// Cause kind name (verbose only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,

    /// Message of the cause's underlying source (verbose only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,

    /// Captured stack frames (verbose only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

/// `details` sub-object of [`ErrorOutput`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetails {
    pub context: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Serialize a value for output, pretty-printed when `pretty` is set.
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    // Our output types only hold strings and maps with string keys.
    rendered.unwrap_or_else(|e| format!("{{\"result\":\"error\",\"message\":\"{e}\"}}"))
}
