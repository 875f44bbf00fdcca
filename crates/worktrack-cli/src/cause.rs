//! What caused a reported failure.
//!
//! A failure is reported either with a captured Rust error or with only a
//! message. The two synthetic variants make the "no underlying error" case
//! explicit instead of inventing an error value to carry the text.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::sync::Arc;

/// Origin of a reported failure.
#[derive(Debug, Clone)]
pub enum Cause {
    /// No underlying error; the failure is described by its message only.
    Unspecified(String),

    /// Input validation failed.
    Validation(String),

    /// A captured error value.
    Error(ErrorCause),
}

/// A captured error: its concrete kind, message, direct source and the
/// backtrace at the point of capture. The backtrace is always captured,
/// independent of `RUST_BACKTRACE`, so verbose output can show it.
#[derive(Debug, Clone)]
pub struct ErrorCause {
    kind: String,
    message: String,
    source: Option<SourceSummary>,
    backtrace: Arc<Backtrace>,
}

/// Summary of an error's underlying source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    /// Kind name, when known.
    pub kind: Option<String>,
    pub message: String,
}

impl ErrorCause {
    /// Describe an error by kind name and message.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
            backtrace: Arc::new(Backtrace::force_capture()),
        }
    }

    /// Builder method to attach the underlying source.
    pub fn with_source(mut self, kind: Option<String>, message: impl Into<String>) -> Self {
        self.source = Some(SourceSummary {
            kind,
            message: message.into(),
        });
        self
    }

    /// Concrete kind name of the error.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source(&self) -> Option<&SourceSummary> {
        self.source.as_ref()
    }

    /// Captured stack frames, one per line. `None` only where the platform
    /// cannot capture backtraces.
    pub fn stack_trace(&self) -> Option<String> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(self.backtrace.to_string()),
            _ => None,
        }
    }
}

impl Cause {
    /// Capture an error value, recording its concrete type name.
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let mut captured = ErrorCause::new(std::any::type_name::<E>(), error.to_string());
        if let Some(source) = error.source() {
            captured = captured.with_source(None, source.to_string());
        }
        Self::Error(captured)
    }

    /// The failure's message.
    pub fn message(&self) -> &str {
        match self {
            Self::Unspecified(message) | Self::Validation(message) => message,
            Self::Error(e) => e.message(),
        }
    }

    /// Kind name: the error's type for captured errors, otherwise the
    /// variant name.
    pub fn kind(&self) -> &str {
        match self {
            Self::Unspecified(_) => "unspecified",
            Self::Validation(_) => "validation",
            Self::Error(e) => e.kind(),
        }
    }

    /// Message of the underlying source, if any.
    pub fn source_message(&self) -> Option<&str> {
        match self {
            Self::Error(e) => e.source().map(|s| s.message.as_str()),
            _ => None,
        }
    }

    /// Kind name of the underlying source, if known.
    pub fn source_kind(&self) -> Option<&str> {
        match self {
            Self::Error(e) => e.source().and_then(|s| s.kind.as_deref()),
            _ => None,
        }
    }

    pub fn stack_trace(&self) -> Option<String> {
        match self {
            Self::Error(e) => e.stack_trace(),
            _ => None,
        }
    }

    /// Multi-line rendering of the cause chain and stack trace, for the
    /// diagnostics stream.
    pub fn render_trace(&self) -> String {
        let mut out = format!("{}: {}", self.kind(), self.message());
        if let Some(source) = self.source_message() {
            match self.source_kind() {
                Some(kind) => out.push_str(&format!("\nCaused by: {kind}: {source}")),
                None => out.push_str(&format!("\nCaused by: {source}")),
            }
        }
        if let Some(trace) = self.stack_trace() {
            out.push('\n');
            out.push_str(trace.trim_end());
        }
        out
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl<E> From<E> for Cause
where
    E: std::error::Error + 'static,
{
    fn from(error: E) -> Self {
        Self::from_error(&error)
    }
}
