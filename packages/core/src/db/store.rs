//! Store Traits - Persistence Contracts
//!
//! The hierarchy logic never talks to a database directly. Services hold an
//! `Arc<dyn ItemStore>` / `Arc<dyn VersionStore>` and everything they persist
//! goes through these two traits.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: every method is async so embedded and hosted backends
//!    fit the same contract
//! 2. **Universe Scoped**: items are always addressed within a universe
//! 3. **Error Handling**: `anyhow::Result` so backends can attach context;
//!    `StoreError` is the root cause for the well-known failures
//! 4. **Batches**: `apply_reorder` must apply the whole batch or nothing.
//!    Stores without transactions should at least validate before writing.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::db::{ItemStore, MemoryStore};
//! use canoncore_core::models::Item;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = MemoryStore::new();
//! store.insert_item("u-1", Item::with_id("a", "A")).await?;
//! assert_eq!(store.list_items("u-1").await?.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::models::{Item, ItemUpdate, ReorderUpdate, UniverseVersion, VersionSnapshot};
use anyhow::Result;
use async_trait::async_trait;

/// Item persistence for universes
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items of a universe, in no particular order
    async fn list_items(&self, universe_id: &str) -> Result<Vec<Item>>;

    /// `Ok(None)` when the item does not exist (not an error)
    async fn get_item(&self, universe_id: &str, id: &str) -> Result<Option<Item>>;

    /// Insert one item. Fails with `StoreError::DuplicateItem` on id clash.
    async fn insert_item(&self, universe_id: &str, item: Item) -> Result<Item>;

    /// Bulk insert, stored verbatim
    async fn insert_items(&self, universe_id: &str, items: Vec<Item>) -> Result<()>;

    /// Sparse field update. Fails with `StoreError::ItemNotFound`.
    async fn update_item(&self, universe_id: &str, id: &str, update: ItemUpdate) -> Result<Item>;

    /// Apply a batch of position patches, all or nothing
    async fn apply_reorder(&self, universe_id: &str, updates: &[ReorderUpdate]) -> Result<()>;

    /// Delete an item and everything nested under it.
    ///
    /// Returns the ids removed, the item itself first.
    async fn delete_item(&self, universe_id: &str, id: &str) -> Result<Vec<String>>;

    /// Delete every item of the universe, returning how many were removed
    async fn delete_all_items(&self, universe_id: &str) -> Result<usize>;

    /// Delete-all followed by bulk insert.
    ///
    /// The default runs the two calls in sequence with no rollback; stores that
    /// can do better should override it.
    async fn replace_items(&self, universe_id: &str, items: Vec<Item>) -> Result<()> {
        self.delete_all_items(universe_id).await?;
        self.insert_items(universe_id, items).await
    }
}

/// Version records and snapshots
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Versions of a universe, in no particular order
    async fn list_versions(&self, universe_id: &str) -> Result<Vec<UniverseVersion>>;

    async fn get_version(&self, version_id: &str) -> Result<Option<UniverseVersion>>;

    async fn insert_version(&self, version: UniverseVersion) -> Result<UniverseVersion>;

    /// Flag `version_id` as current and clear the flag on its siblings.
    ///
    /// This is the single "set current" transition.
    async fn set_current_version(&self, universe_id: &str, version_id: &str) -> Result<()>;

    /// Remove a version record and its snapshot
    async fn delete_version(&self, version_id: &str) -> Result<()>;

    async fn read_snapshot(&self, version_id: &str) -> Result<Option<VersionSnapshot>>;

    /// Insert or overwrite the snapshot for `snapshot.version_id`
    async fn write_snapshot(&self, snapshot: VersionSnapshot) -> Result<()>;
}
