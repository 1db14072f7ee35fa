//! Content Service
//!
//! Orchestrates item mutations for one universe. Every mutation goes to the
//! [`ItemStore`], then the current version's snapshot is re-synced and the
//! injected [`QueryCache`] is invalidated for the universe.
//!
//! `ContentService` implements [`ReorderCommit`] and [`DeleteCommit`], so a
//! [`ReorderEngine`](crate::services::ReorderEngine) or
//! [`BulkOperations`](crate::services::BulkOperations) can commit straight
//! into it.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::db::MemoryStore;
//! use canoncore_core::models::NewItem;
//! use canoncore_core::services::ContentService;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), canoncore_core::services::CoreServiceError> {
//! let store = Arc::new(MemoryStore::new());
//! let content = ContentService::new("u-1", store.clone(), store);
//!
//! let first = content.create_item(NewItem { title: "A".into(), ..Default::default() }).await?;
//! let second = content.create_item(NewItem { title: "B".into(), ..Default::default() }).await?;
//! assert_eq!((first.order_index, second.order_index), (0, 1));
//! # Ok(())
//! # }
//! ```

use crate::db::{ItemStore, VersionStore};
use crate::models::{Destination, Item, ItemUpdate, NewItem, ReorderUpdate};
use crate::services::bulk_operations::{validate_destination, DeleteCommit};
use crate::services::cache::{items_key, universe_prefix, QueryCache};
use crate::services::error::CoreServiceError;
use crate::services::reorder::ReorderCommit;
use crate::services::version_service::VersionService;
use crate::tree::sibling_group;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

type ServiceResult<T> = Result<T, CoreServiceError>;

#[derive(Clone)]
pub struct ContentService {
    universe_id: String,
    items: Arc<dyn ItemStore>,
    versions: VersionService,
    cache: Option<Arc<dyn QueryCache>>,
}

impl ContentService {
    pub fn new(
        universe_id: impl Into<String>,
        items: Arc<dyn ItemStore>,
        versions: Arc<dyn VersionStore>,
    ) -> Self {
        Self {
            universe_id: universe_id.into(),
            versions: VersionService::new(items.clone(), versions),
            items,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.versions = self.versions.with_cache(cache.clone());
        self.cache = Some(cache);
        self
    }

    pub fn universe_id(&self) -> &str {
        &self.universe_id
    }

    /// Version engine sharing this service's stores and cache
    pub fn versions(&self) -> &VersionService {
        &self.versions
    }

    /// Items of the universe ordered by `order_index`, served from the cache
    /// when one is injected and holds a fresh entry
    pub async fn list_items(&self) -> ServiceResult<Vec<Item>> {
        let key = items_key(&self.universe_id);

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&key).await {
                match serde_json::from_value::<Vec<Item>>(cached) {
                    Ok(items) => return Ok(items),
                    Err(e) => {
                        tracing::warn!("Discarding unreadable cache entry '{}': {}", key, e);
                        cache.invalidate(&key).await;
                    }
                }
            }
        }

        let mut items = self
            .items
            .list_items(&self.universe_id)
            .await
            .map_err(|e| {
                CoreServiceError::query_failed(format!("Failed to list items: {:#}", e))
            })?;
        items.sort_by_key(|item| item.order_index);

        if let Some(cache) = &self.cache {
            cache.set(&key, serde_json::to_value(&items)?).await;
        }
        Ok(items)
    }

    pub async fn get_item(&self, id: &str) -> ServiceResult<Item> {
        self.items
            .get_item(&self.universe_id, id)
            .await?
            .ok_or_else(|| CoreServiceError::item_not_found(id))
    }

    /// Create an item at the end of its sibling group
    pub async fn create_item(&self, new_item: NewItem) -> ServiceResult<Item> {
        let siblings = self.items.list_items(&self.universe_id).await?;
        let order_index = siblings
            .iter()
            .filter(|item| item.parent_id == new_item.parent_id)
            .map(|item| item.order_index + 1)
            .max()
            .unwrap_or(0);

        let now = Utc::now();
        let item = Item {
            id: new_item
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            parent_id: new_item.parent_id,
            order_index,
            title: new_item.title,
            description: new_item.description,
            item_type: new_item.item_type,
            created_at: Some(now),
            updated_at: Some(now),
            properties: new_item.properties,
        };

        let item = self.items.insert_item(&self.universe_id, item).await?;
        tracing::info!("Created item '{}' ({})", item.title, item.id);
        self.after_mutation().await;
        Ok(item)
    }

    pub async fn update_item(&self, id: &str, update: ItemUpdate) -> ServiceResult<Item> {
        let item = self.items.update_item(&self.universe_id, id, update).await?;
        tracing::info!("Updated item '{}' ({})", item.title, item.id);
        self.after_mutation().await;
        Ok(item)
    }

    /// Delete an item and its descendants, returning every removed id
    pub async fn delete_item(&self, id: &str) -> ServiceResult<Vec<String>> {
        let removed = self.items.delete_item(&self.universe_id, id).await?;
        tracing::info!("Deleted item {} ({} removed in total)", id, removed.len());
        self.after_mutation().await;
        Ok(removed)
    }

    /// Move one item (with its subtree) to the end of `destination`, which is
    /// `"root"` or an item id
    pub async fn move_item(&self, id: &str, destination: &str) -> ServiceResult<Item> {
        let all_items = self.items.list_items(&self.universe_id).await?;
        let item = all_items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| CoreServiceError::item_not_found(id))?;

        let validation =
            validate_destination(destination, std::slice::from_ref(&item), &all_items);
        if !validation.valid {
            return Err(CoreServiceError::invalid_destination(
                validation.error.unwrap_or_default(),
            ));
        }

        let new_parent_id = Destination::parse(destination).parent_id();
        if item.parent_id == new_parent_id {
            return Ok(item);
        }
        let order_index =
            sibling_group(&all_items, new_parent_id.as_deref(), Some(id)).len() as u32;
        let update = ReorderUpdate::new(id, new_parent_id, order_index);

        self.reorder_items(std::slice::from_ref(&update)).await?;
        self.get_item(id).await
    }

    /// Apply a reorder batch. An empty batch is a no-op.
    pub async fn reorder_items(&self, updates: &[ReorderUpdate]) -> ServiceResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        self.items.apply_reorder(&self.universe_id, updates).await?;
        tracing::info!("Applied {} position updates", updates.len());
        self.after_mutation().await;
        Ok(())
    }

    /// Cache invalidation and live snapshot sync.
    ///
    /// A failed sync is logged and never fails the mutation that caused it.
    async fn after_mutation(&self) {
        if let Some(cache) = &self.cache {
            cache
                .invalidate_prefix(&universe_prefix(&self.universe_id))
                .await;
        }
        if let Err(e) = self.versions.sync_current_snapshot(&self.universe_id).await {
            tracing::error!(
                "Failed to sync current snapshot of universe '{}': {}",
                self.universe_id,
                e
            );
        }
    }
}

#[async_trait]
impl ReorderCommit for ContentService {
    async fn on_reorder(&self, updates: Vec<ReorderUpdate>) -> anyhow::Result<()> {
        Ok(self.reorder_items(&updates).await?)
    }
}

#[async_trait]
impl DeleteCommit for ContentService {
    /// Items already removed by an earlier cascading delete count as deleted
    async fn on_delete(&self, item_id: &str) -> anyhow::Result<()> {
        if self.items.get_item(&self.universe_id, item_id).await?.is_none() {
            tracing::debug!("Item {} already removed", item_id);
            return Ok(());
        }
        self.delete_item(item_id).await?;
        Ok(())
    }
}
