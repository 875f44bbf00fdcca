//! Standardized error reporting for CLI commands.
//!
//! Every command failure funnels through one of the `handle_*` methods of
//! [`ErrorReporter`]. Each one records the failure on the
//! [`OperationTracker`], renders a message on the configured sink and
//! returns the exit code for the command. Nothing here returns an error:
//! failures are absorbed into tracked record + message + exit code.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::output::{self, stderr_sink, ErrorDetails, ErrorOutput, OutputFormat, OutputSink};
use crate::{Cause, OperationTracker, Severity};

/// Exit code returned on success.
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code returned for every reported failure.
pub const EXIT_FAILURE: i32 = 1;

const SEVERITY_DETAIL: &str = "errorSeverity";
const UNEXPECTED_DETAIL: &str = "unexpectedError";
const VALIDATION_DETAIL_PREFIX: &str = "validationError_";

/// Reporter configuration. Built once and handed to [`ErrorReporter::new`].
#[derive(Clone)]
pub struct ReporterConfig {
    /// Emit cause and stack detail.
    pub verbose: bool,

    /// Text or JSON rendering.
    pub output_format: OutputFormat,

    /// Receives one rendered string per reported error.
    pub sink: OutputSink,

    /// Receives verbose cause chains and stack traces in text mode.
    pub diagnostics: OutputSink,
}

impl ReporterConfig {
    /// Builder method to toggle verbose output.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Builder method to set the output format.
    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    /// Builder method to set the error sink.
    pub fn with_sink(mut self, sink: OutputSink) -> Self {
        self.sink = sink;
        self
    }

    /// Builder method to set the diagnostics sink.
    pub fn with_diagnostics(mut self, diagnostics: OutputSink) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            output_format: OutputFormat::Text,
            sink: stderr_sink(),
            diagnostics: stderr_sink(),
        }
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("verbose", &self.verbose)
            .field("output_format", &self.output_format)
            .finish_non_exhaustive()
    }
}

/// Reports command outcomes to an operation tracker and an output sink.
#[derive(Clone)]
pub struct ErrorReporter {
    tracker: Arc<dyn OperationTracker>,
    config: ReporterConfig,
}

impl ErrorReporter {
    /// Create a reporter recording against `tracker`.
    pub fn new(tracker: Arc<dyn OperationTracker>, config: ReporterConfig) -> Self {
        Self { tracker, config }
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Report a command failure.
    ///
    /// When no cause is given, the failure is tracked with an
    /// [`Cause::Unspecified`] carrying `message`.
    pub fn handle_error(
        &self,
        operation_id: &str,
        command: &str,
        message: &str,
        cause: Option<Cause>,
        severity: Severity,
    ) -> i32 {
        let cause = cause.unwrap_or_else(|| Cause::Unspecified(message.to_string()));

        self.tracker.fail_operation(operation_id, &cause);
        self.tracker.track_operation_error(operation_id, command, message, &cause);
        self.track_severity(operation_id, severity);

        self.output_error(message, Some(&cause), severity);
        EXIT_FAILURE
    }

    /// Report a failure described only by a message, at [`Severity::Error`].
    pub fn handle_error_message(&self, operation_id: &str, command: &str, message: &str) -> i32 {
        self.handle_error(operation_id, command, message, None, Severity::Error)
    }

    /// Report per-field validation failures.
    pub fn handle_validation_error(
        &self,
        operation_id: &str,
        command: &str,
        errors: &BTreeMap<String, String>,
    ) -> i32 {
        let mut message = String::from("Validation errors:\n");
        for (field, error) in errors {
            message.push_str(&format!(" - {field}: {error}\n"));
        }

        let cause = Cause::Validation("Validation failed".to_string());
        self.tracker.fail_operation(operation_id, &cause);

        for (field, error) in errors {
            self.tracker.track_operation_detail(
                operation_id,
                &format!("{VALIDATION_DETAIL_PREFIX}{field}"),
                json!({ "field": field, "message": error }),
            );
        }
        self.track_severity(operation_id, Severity::Validation);

        tracing::debug!(command, fields = errors.len(), "Validation failed");
        self.output_error(&message, Some(&cause), Severity::Validation);
        EXIT_FAILURE
    }

    /// Report an error nobody anticipated. Callers normally pass
    /// [`Severity::System`].
    pub fn handle_unexpected_error(
        &self,
        operation_id: &str,
        command: &str,
        cause: Cause,
        severity: Severity,
    ) -> i32 {
        let message = format!("Unexpected error in {command}: {}", cause.message());

        let mut detail = Map::new();
        detail.insert("error_kind".into(), json!(cause.kind()));
        detail.insert("message".into(), json!(cause.message()));
        detail.insert("severity".into(), json!(severity.as_str()));
        if let Some(source) = cause.source_message() {
            detail.insert("cause".into(), json!(source));
            detail.insert("cause_kind".into(), json!(cause.source_kind()));
        }

        self.tracker
            .track_operation_detail(operation_id, UNEXPECTED_DETAIL, Value::Object(detail));
        self.track_severity(operation_id, severity);
        self.tracker.fail_operation(operation_id, &cause);

        tracing::error!(command, error = %cause, "Unexpected error");
        self.output_error(&message, Some(&cause), severity);
        EXIT_FAILURE
    }

    /// Render an error message on the sink in the configured format.
    pub fn output_error(&self, message: &str, cause: Option<&Cause>, severity: Severity) {
        match self.config.output_format {
            OutputFormat::Json => {
                let error = self.error_output(message, cause, severity);
                let rendered = output::to_json(&error, self.config.verbose);
                (self.config.sink)(&rendered);
            }
            OutputFormat::Text => {
                (self.config.sink)(&format!("{}{}", severity.text_prefix(), message));
                if self.config.verbose {
                    if let Some(cause) = cause {
                        (self.config.diagnostics)(&cause.render_trace());
                    }
                }
            }
        }
    }

    /// Report command success and forward `result` to the tracker.
    pub fn handle_success(&self, operation_id: &str, result: Value) -> i32 {
        self.tracker.complete_operation(operation_id, result);
        EXIT_SUCCESS
    }

    /// Standard result map for a successful command. Entries in `data`
    /// overwrite the defaults, `success` and `command` included.
    pub fn create_success_result(
        &self,
        command: &str,
        data: Map<String, Value>,
    ) -> Map<String, Value> {
        let mut result = Map::new();
        result.insert("success".into(), Value::Bool(true));
        result.insert("command".into(), Value::String(command.to_string()));
        result.extend(data);
        result
    }

    fn track_severity(&self, operation_id: &str, severity: Severity) {
        let name = json!(severity.as_str());
        self.tracker.track_operation_detail(operation_id, SEVERITY_DETAIL, name);
    }

    fn error_output(
        &self,
        message: &str,
        cause: Option<&Cause>,
        severity: Severity,
    ) -> ErrorOutput {
        let mut out = ErrorOutput {
            result: "error",
            message: message.to_string(),
            severity: severity.as_str().to_string(),
            details: ErrorDetails {
                context: output::ERROR_CONTEXT,
                error_message: cause.map(|c| c.message().to_string()),
            },
            error_kind: None,
            cause: None,
            stack_trace: None,
        };
        if self.config.verbose {
            if let Some(cause) = cause {
                out.error_kind = Some(cause.kind().to_string());
                out.cause = cause.source_message().map(str::to_string);
                out.stack_trace = cause.stack_trace();
            }
        }
        out
    }
}
