//! Operation tracking.
//!
//! Every CLI command runs as an *operation*: it is started, may collect
//! detail entries and errors, and ends either completed (with a result) or
//! failed (with a cause). [`OperationTracker`] is the interface the error
//! reporter records against; [`InMemoryOperationTracker`] keeps records for
//! the life of the process.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Cause;

/// Operation-tracking collaborator used by the error reporter.
pub trait OperationTracker: Send + Sync {
    /// Mark an operation failed.
    fn fail_operation(&self, operation_id: &str, cause: &Cause);

    /// Record an error raised by `command` during an operation.
    fn track_operation_error(
        &self,
        operation_id: &str,
        command: &str,
        message: &str,
        cause: &Cause,
    );

    /// Attach a named detail entry to an operation.
    fn track_operation_detail(&self, operation_id: &str, key: &str, value: Value);

    /// Mark an operation completed with `result`.
    fn complete_operation(&self, operation_id: &str, result: Value);
}

/// Lifecycle status of a tracked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    Running,
    Completed,
    Failed,
}

/// An error recorded against an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedError {
    pub command: String,
    pub message: String,
    pub error_kind: String,
}

/// Everything known about one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRecord {
    pub id: String,
    pub command: String,
    pub params: Value,
    pub status: OperationStatus,
    /// Detail entries in insertion order.
    pub details: Map<String, Value>,
    pub errors: Vec<TrackedError>,
    pub result: Option<Value>,
    /// Message of the cause the operation failed with.
    pub failure: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl OperationRecord {
    fn new(id: impl Into<String>, command: impl Into<String>, params: Value) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            params,
            status: OperationStatus::Running,
            details: Map::new(),
            errors: Vec::new(),
            result: None,
            failure: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// In-memory operation tracker.
///
/// Calls naming an operation that was never started create its record on
/// the fly, with command `"unknown"`.
#[derive(Debug, Default)]
pub struct InMemoryOperationTracker {
    operations: DashMap<String, OperationRecord>,
}

impl InMemoryOperationTracker {
    pub fn new() -> Self {
        Self {
            operations: DashMap::new(),
        }
    }

    /// Start a new operation and return its id.
    pub fn start_operation(&self, command: &str, params: Value) -> String {
        let id = Uuid::new_v4().to_string();
        info!(operation_id = %id, command, "Operation started");
        self.operations
            .insert(id.clone(), OperationRecord::new(id.clone(), command, params));
        id
    }

    /// Snapshot of an operation's record.
    pub fn get(&self, operation_id: &str) -> Option<OperationRecord> {
        self.operations
            .get(operation_id)
            .map(|entry| entry.value().clone())
    }

    /// Snapshot of every operation, oldest first.
    pub fn operations(&self) -> Vec<OperationRecord> {
        let mut records: Vec<OperationRecord> = self
            .operations
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| r.started_at);
        records
    }

    fn update(&self, operation_id: &str, f: impl FnOnce(&mut OperationRecord)) {
        let mut entry = self
            .operations
            .entry(operation_id.to_string())
            .or_insert_with(|| {
                debug!(operation_id, "Tracking call for unstarted operation");
                OperationRecord::new(operation_id, "unknown", Value::Null)
            });
        f(entry.value_mut());
    }
}

impl OperationTracker for InMemoryOperationTracker {
    fn fail_operation(&self, operation_id: &str, cause: &Cause) {
        warn!(operation_id, error = %cause, "Operation failed");
        self.update(operation_id, |record| {
            record.status = OperationStatus::Failed;
            record.failure = Some(cause.message().to_string());
            record.finished_at = Some(Utc::now());
        });
    }

    fn track_operation_error(
        &self,
        operation_id: &str,
        command: &str,
        message: &str,
        cause: &Cause,
    ) {
        debug!(operation_id, command, message, "Operation error recorded");
        self.update(operation_id, |record| {
            record.errors.push(TrackedError {
                command: command.to_string(),
                message: message.to_string(),
                error_kind: cause.kind().to_string(),
            });
        });
    }

    fn track_operation_detail(&self, operation_id: &str, key: &str, value: Value) {
        debug!(operation_id, key, "Operation detail recorded");
        self.update(operation_id, |record| {
            record.details.insert(key.to_string(), value);
        });
    }

    fn complete_operation(&self, operation_id: &str, result: Value) {
        info!(operation_id, "Operation completed");
        self.update(operation_id, |record| {
            record.status = OperationStatus::Completed;
            record.result = Some(result);
            record.finished_at = Some(Utc::now());
        });
    }
}
