//! Business Services
//!
//! This module contains the stateful and orchestrating parts of CanonCore:
//!
//! - `SelectionManager` - Selection set and selection mode over a flat list
//! - `ListOperations` - Search → filter → sort pipeline with presets
//! - `ReorderEngine` - Drag-and-drop drop resolution and dense renumbering
//! - `BulkOperations` - Validated multi-item move and sequential delete
//! - `VersionService` - Commit, checkout, restore and live snapshot sync
//! - `ContentService` - Item CRUD wired to snapshots and the query cache
//! - `QueryCache` - Injected cache with a TTL-bounded in-memory implementation
//!
//! Services coordinate between the persistence traits in [`crate::db`] and
//! the pure tree functions in [`crate::tree`]. Commit boundaries are traits
//! (`ReorderCommit`, `DeleteCommit`) so the engines can be tested against
//! fakes and wired to `ContentService` in production.

pub mod bulk_operations;
pub mod cache;
pub mod content_service;
pub mod error;
pub mod list_operations;
pub mod reorder;
pub mod selection;
pub mod version_service;

pub use bulk_operations::{
    get_available_destinations, statistics, validate_destination, validate_selection,
    BulkOperations, DeleteCommit,
};
pub use cache::{items_key, universe_prefix, InMemoryQueryCache, QueryCache};
pub use content_service::ContentService;
pub use error::CoreServiceError;
pub use list_operations::{
    common_filters, common_searches, common_sorts, filter_items, process_items, search_items,
    sort_items, FilterConfig, FilterPredicate, ListOperations, SearchConfig, SearchExtractor,
    SearchKey, SortConfig, SortDirection, SortExtractor, SortKey, SortValue,
};
pub use reorder::{
    compute_reorder, DragOutcome, DragOverHook, DragStartHook, DropPosition, DropTarget,
    ReorderCommit, ReorderEngine,
};
pub use selection::{SelectionChangeCallback, SelectionManager};
pub use version_service::VersionService;
