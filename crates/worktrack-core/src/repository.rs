//! Repository contract for work items.

use crate::{ItemId, WorkItem, WorkItemCreateRequest};

/// Storage port for work items.
///
/// Routine misses are not errors: lookups return `None` or an empty
/// vec, and deleting an unknown id does nothing. Callers decide whether
/// an absent item is a failure.
pub trait ItemRepository: Send + Sync {
    /// Insert or replace an item keyed by its id. Last write wins.
    fn save(&self, item: WorkItem) -> WorkItem;

    /// Create an item from a request under a freshly generated id.
    fn create(&self, request: WorkItemCreateRequest) -> WorkItem;

    /// Look up an item by id.
    fn find_by_id(&self, id: &ItemId) -> Option<WorkItem>;

    /// Snapshot of every stored item, in no particular order.
    fn find_all(&self) -> Vec<WorkItem>;

    /// Items whose type matches `type_name`, compared case-insensitively.
    /// An unknown type name yields an empty result.
    fn find_by_type(&self, type_name: &str) -> Vec<WorkItem>;

    /// Items whose status matches `status_name`, compared case-insensitively.
    /// An unknown status name yields an empty result.
    fn find_by_status(&self, status_name: &str) -> Vec<WorkItem>;

    /// Items whose assignee equals `assignee` exactly. `None` selects
    /// unassigned items.
    fn find_by_assignee(&self, assignee: Option<&str>) -> Vec<WorkItem>;

    /// Remove an item if present.
    fn delete_by_id(&self, id: &ItemId);
}
