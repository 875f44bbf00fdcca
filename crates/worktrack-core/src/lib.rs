//! Worktrack Core Domain Types
//!
//! This crate contains the work-item domain and its repository contract:
//! - identifiers and the type/status/priority enumerations
//! - the `WorkItem` record and its creation request
//! - the `ItemRepository` trait and a thread-safe in-memory implementation
//!
//! Nothing here performs I/O.

pub mod error;
pub mod ids;
pub mod item;
pub mod memory;
pub mod repository;
pub mod status;

// Re-export commonly used types
pub use error::CoreError;
pub use ids::ItemId;
pub use item::{WorkItem, WorkItemCreateRequest};
pub use memory::InMemoryItemRepository;
pub use repository::ItemRepository;
pub use status::{Priority, WorkItemType, WorkflowState};
