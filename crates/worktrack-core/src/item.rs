//! Work item record and creation request.

use crate::{CoreError, ItemId, Priority, WorkItemType, WorkflowState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A WorkItem is a unit of trackable work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Unique item identifier. Never changes after creation.
    pub id: ItemId,

    /// Short summary.
    pub title: String,

    /// Longer free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Kind of item.
    #[serde(rename = "type")]
    pub item_type: WorkItemType,

    /// Current workflow state.
    pub status: WorkflowState,

    /// Item priority.
    #[serde(default)]
    pub priority: Priority,

    /// Owner of the item, if any.
    #[serde(default)]
    pub assignee: Option<String>,

    /// When the item was created.
    pub created_at: DateTime<Utc>,

    /// When the item was last changed.
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// Build a new record from a creation request. Items start in `FOUND`.
    pub fn from_request(id: ItemId, request: WorkItemCreateRequest) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: request.title,
            description: request.description,
            item_type: request.item_type,
            status: WorkflowState::Found,
            priority: request.priority,
            assignee: request.assignee,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move the item to another workflow state.
    pub fn transition_to(&mut self, to: WorkflowState) -> Result<(), CoreError> {
        if !self.status.can_transition_to(to) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replace the assignee. `None` unassigns the item.
    pub fn assign(&mut self, assignee: Option<String>) {
        self.assignee = assignee;
        self.updated_at = Utc::now();
    }
}

/// Attributes supplied by a caller to create a WorkItem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItemCreateRequest {
    pub title: String,
    pub description: Option<String>,
    pub item_type: WorkItemType,
    pub priority: Priority,
    pub assignee: Option<String>,
}

impl WorkItemCreateRequest {
    /// Create a request with default type and priority.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            item_type: WorkItemType::default(),
            priority: Priority::default(),
            assignee: None,
        }
    }

    /// Builder method to set the item type.
    pub fn with_type(mut self, item_type: WorkItemType) -> Self {
        self.item_type = item_type;
        self
    }

    /// Builder method to set the priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Builder method to set the assignee.
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
