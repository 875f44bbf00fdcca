//! Type, workflow state and priority enums for work items.
//!
//! `FromStr` is lenient, for command-line input: case-insensitive, trimmed,
//! and `-` accepted in place of `_` (`"in-progress"`). `from_name` is the
//! strict lookup used by repository filters, matching only the canonical
//! name ignoring ASCII case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::CoreError;

fn normalize(s: &str) -> String {
    s.trim().to_ascii_uppercase().replace('-', "_")
}

/// Kind of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkItemType {
    /// High-level objective grouping other work.
    Goal,
    /// New capability.
    Feature,
    /// Defect report.
    #[default]
    Bug,
    /// Maintenance work with no user-visible change.
    Chore,
}

impl WorkItemType {
    pub const ALL: [WorkItemType; 4] = [Self::Goal, Self::Feature, Self::Bug, Self::Chore];

    /// Type whose canonical name equals `name`, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goal => "GOAL",
            Self::Feature => "FEATURE",
            Self::Bug => "BUG",
            Self::Chore => "CHORE",
        }
    }
}

impl fmt::Display for WorkItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkItemType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize(s);
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown work item type '{s}'")))
    }
}

/// Workflow state of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    /// Reported but not yet looked at.
    #[default]
    Found,
    /// Reviewed and accepted.
    Triaged,
    /// Scheduled for work.
    ToDo,
    /// Actively being worked on.
    InProgress,
    /// Awaiting verification.
    InTest,
    /// Finished.
    Done,
}

impl WorkflowState {
    pub const ALL: [WorkflowState; 6] = [
        Self::Found,
        Self::Triaged,
        Self::ToDo,
        Self::InProgress,
        Self::InTest,
        Self::Done,
    ];

    /// State whose canonical name equals `name`, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.as_str().eq_ignore_ascii_case(name))
    }

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "FOUND",
            Self::Triaged => "TRIAGED",
            Self::ToDo => "TO_DO",
            Self::InProgress => "IN_PROGRESS",
            Self::InTest => "IN_TEST",
            Self::Done => "DONE",
        }
    }

    /// Returns true if a work item may move from `self` to `to`.
    pub fn can_transition_to(self, to: WorkflowState) -> bool {
        use WorkflowState::*;
        matches!(
            (self, to),
            (Found, Triaged)
                | (Triaged, ToDo)
                | (ToDo, InProgress)
                | (InProgress, InTest)
                | (InTest, Done)
                | (InProgress, ToDo) // put back
                | (InTest, InProgress) // failed verification
        )
    }

    /// Returns true if no further moves are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkflowState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize(s);
        Self::ALL
            .into_iter()
            .find(|state| state.as_str() == name)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown workflow state '{s}'")))
    }
}

/// Priority of a work item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = normalize(s);
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown priority '{s}'")))
    }
}
