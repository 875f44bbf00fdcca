//! Core domain errors.

use thiserror::Error;

use crate::WorkflowState;

/// Core domain errors for worktrack.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Work item not found.
    #[error("Work item not found: {0}")]
    ItemNotFound(String),

    /// Workflow move not allowed from the current state.
    #[error("Invalid workflow transition: {from} -> {to}")]
    InvalidTransition {
        from: WorkflowState,
        to: WorkflowState,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
