//! Data Models
//!
//! This module contains the data structures shared by every CanonCore component:
//!
//! - `Item` - The persisted unit of hierarchy
//! - `TreeNode` - Derived, never persisted, nested view of items
//! - `UniverseVersion` / `VersionSnapshot` - Version records and captured state
//! - `ContentPlacement` - Extra appearances of an item under other parents
//! - Bulk operation results and validation outcomes

mod bulk;
mod item;
mod placement;
mod tree_node;
mod version;

pub use bulk::{
    BulkItemError, BulkOperationResult, BulkProgress, BulkStatistics, Destination,
    ValidationResult,
};
pub use item::{Item, ItemUpdate, NewItem, ReorderUpdate};
pub use placement::ContentPlacement;
pub use tree_node::TreeNode;
pub use version::{UniverseVersion, VersionSnapshot};
