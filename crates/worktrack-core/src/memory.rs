//! In-memory item repository.
//!
//! [`InMemoryItemRepository`] keeps work items in a `DashMap<ItemId, WorkItem>`.
//! Shard-level locking lets readers and writers on different keys proceed
//! in parallel, and no call holds a lock across another call. Every query
//! clones matching items out of the map, so callers never observe a live
//! view that changes while they iterate.
//!
//! State lives only as long as the process.

use dashmap::DashMap;
use tracing::debug;

use crate::{ItemId, ItemRepository, WorkItem, WorkItemCreateRequest, WorkItemType, WorkflowState};

/// Thread-safe in-memory implementation of [`ItemRepository`].
#[derive(Debug, Default)]
pub struct InMemoryItemRepository {
    items: DashMap<ItemId, WorkItem>,
}

impl InMemoryItemRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self {
            items: DashMap::new(),
        }
    }

    /// Create a repository pre-populated with `items`.
    pub fn with_items(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let repo = Self::new();
        for item in items {
            repo.items.insert(item.id, item);
        }
        repo
    }

    /// Remove every item.
    pub fn clear(&self) {
        self.items.clear();
        debug!("Cleared item repository");
    }

    /// Number of stored items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no items are stored.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn filter(&self, predicate: impl Fn(&WorkItem) -> bool) -> Vec<WorkItem> {
        self.items
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl ItemRepository for InMemoryItemRepository {
    fn save(&self, item: WorkItem) -> WorkItem {
        debug!(item_id = %item.id, status = %item.status, "Saving work item");
        self.items.insert(item.id, item.clone());
        item
    }

    fn create(&self, request: WorkItemCreateRequest) -> WorkItem {
        let item = WorkItem::from_request(ItemId::generate(), request);
        self.save(item)
    }

    fn find_by_id(&self, id: &ItemId) -> Option<WorkItem> {
        self.items.get(id).map(|entry| entry.value().clone())
    }

    fn find_all(&self) -> Vec<WorkItem> {
        self.filter(|_| true)
    }

    fn find_by_type(&self, type_name: &str) -> Vec<WorkItem> {
        match WorkItemType::from_name(type_name) {
            Some(item_type) => self.filter(|item| item.item_type == item_type),
            None => {
                debug!(type_name, "Unknown type filter, returning no items");
                Vec::new()
            }
        }
    }

    fn find_by_status(&self, status_name: &str) -> Vec<WorkItem> {
        match WorkflowState::from_name(status_name) {
            Some(status) => self.filter(|item| item.status == status),
            None => {
                debug!(status_name, "Unknown status filter, returning no items");
                Vec::new()
            }
        }
    }

    fn find_by_assignee(&self, assignee: Option<&str>) -> Vec<WorkItem> {
        self.filter(|item| item.assignee.as_deref() == assignee)
    }

    fn delete_by_id(&self, id: &ItemId) {
        if self.items.remove(id).is_some() {
            debug!(item_id = %id, "Deleted work item");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Priority;
    use std::sync::Arc;
    use std::thread;

    fn request(title: &str) -> WorkItemCreateRequest {
        WorkItemCreateRequest::new(title)
    }

    #[test]
    fn test_save_then_find_by_id() {
        let repo = InMemoryItemRepository::new();
        let item = WorkItem::from_request(ItemId::generate(), request("a"));

        let saved = repo.save(item.clone());
        assert_eq!(saved, item);
        assert_eq!(repo.find_by_id(&item.id), Some(item));
    }

    #[test]
    fn test_save_overwrites_existing_id() {
        let repo = InMemoryItemRepository::new();
        let mut item = repo.create(request("original"));
        item.title = "renamed".to_string();
        repo.save(item.clone());

        assert_eq!(repo.len(), 1);
        assert_eq!(repo.find_by_id(&item.id).unwrap().title, "renamed");
    }

    #[test]
    fn test_create_assigns_fresh_ids() {
        let repo = InMemoryItemRepository::new();
        let a = repo.create(request("a"));
        let b = repo.create(request("b"));

        assert_ne!(a.id, b.id);
        assert_eq!(a.status, WorkflowState::Found);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_find_by_id_missing_is_none() {
        let repo = InMemoryItemRepository::new();
        repo.create(request("a"));
        assert!(repo.find_by_id(&ItemId::generate()).is_none());
    }

    #[test]
    fn test_find_all_is_a_snapshot() {
        let repo = InMemoryItemRepository::new();
        repo.create(request("a"));
        repo.create(request("b"));

        let snapshot = repo.find_all();
        repo.create(request("c"));
        repo.delete_by_id(&snapshot[0].id);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_find_by_type_case_insensitive() {
        let repo = InMemoryItemRepository::new();
        repo.create(request("bug").with_type(WorkItemType::Bug));
        repo.create(request("feature").with_type(WorkItemType::Feature));

        assert_eq!(repo.find_by_type("bug").len(), 1);
        assert_eq!(repo.find_by_type("BUG").len(), 1);
        assert_eq!(repo.find_by_type("Feature")[0].title, "feature");
        assert!(repo.find_by_type("goal").is_empty());
    }

    #[test]
    fn test_unknown_filter_names_yield_empty() {
        let repo = InMemoryItemRepository::new();
        repo.create(request("a"));

        assert!(repo.find_by_type("epic").is_empty());
        assert!(repo.find_by_status("closed").is_empty());
        assert!(repo.find_by_status("").is_empty());
    }

    #[test]
    fn test_status_filter_requires_canonical_name() {
        let repo = InMemoryItemRepository::new();
        let mut item = repo.create(request("a"));
        item.transition_to(WorkflowState::Triaged).unwrap();
        item.transition_to(WorkflowState::ToDo).unwrap();
        item.transition_to(WorkflowState::InProgress).unwrap();
        repo.save(item);

        assert_eq!(repo.find_by_status("in_progress").len(), 1);
        assert_eq!(repo.find_by_status("IN_PROGRESS").len(), 1);
        assert!(repo.find_by_status("in-progress").is_empty());
        assert!(repo.find_by_status(" in_progress ").is_empty());
        assert!(repo.find_by_type(" bug ").is_empty());
    }

    #[test]
    fn test_find_by_status() {
        let repo = InMemoryItemRepository::new();
        let mut item = repo.create(request("a"));
        repo.create(request("b"));
        item.transition_to(WorkflowState::Triaged).unwrap();
        repo.save(item.clone());

        let triaged = repo.find_by_status("triaged");
        assert_eq!(triaged, vec![item]);
        assert_eq!(repo.find_by_status("found").len(), 1);
    }

    #[test]
    fn test_find_by_assignee_matches_none_and_exact() {
        let repo = InMemoryItemRepository::new();
        repo.create(request("mine").with_assignee("alice"));
        repo.create(request("theirs").with_assignee("Alice"));
        repo.create(request("nobody's"));

        let alice = repo.find_by_assignee(Some("alice"));
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].title, "mine");

        let unassigned = repo.find_by_assignee(None);
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].title, "nobody's");
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let repo = InMemoryItemRepository::new();
        let item = repo.create(request("a"));

        repo.delete_by_id(&ItemId::generate());
        assert_eq!(repo.find_all(), vec![item.clone()]);

        repo.delete_by_id(&item.id);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_clear_empties_repository() {
        let repo = InMemoryItemRepository::with_items(vec![
            WorkItem::from_request(ItemId::generate(), request("a")),
            WorkItem::from_request(ItemId::generate(), request("b").with_priority(Priority::Low)),
        ]);
        assert_eq!(repo.len(), 2);

        repo.clear();
        assert!(repo.find_all().is_empty());
    }

    #[test]
    fn test_concurrent_writers_and_readers() {
        let repo = Arc::new(InMemoryItemRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let repo = Arc::clone(&repo);
                thread::spawn(move || {
                    for i in 0..50 {
                        let item = repo.create(request(&format!("{t}-{i}")));
                        assert!(repo.find_by_id(&item.id).is_some());
                        let _ = repo.find_all();
                        if i % 2 == 0 {
                            repo.delete_by_id(&item.id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.len(), 8 * 25);
    }
}
