//! In-memory store
//!
//! Reference implementation of [`ItemStore`] and [`VersionStore`] backed by
//! `tokio::sync::RwLock`-guarded maps. Used by tests, benchmarks and embedders
//! that keep everything in process. Every successful write emits a
//! [`DomainEvent`].
//!
//! Batch writes (`apply_reorder`, `replace_items`) and the set-current
//! transition each run under one write lock, so readers never observe them
//! half applied.

use super::error::StoreError;
use super::events::DomainEvent;
use super::store::{ItemStore, VersionStore};
use crate::models::{Item, ItemUpdate, ReorderUpdate, UniverseVersion, VersionSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::{broadcast, RwLock};

/// Default broadcast capacity for store events
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 128;

pub struct MemoryStore {
    /// universe id -> items
    items: RwLock<HashMap<String, Vec<Item>>>,
    versions: RwLock<Vec<UniverseVersion>>,
    /// version id -> snapshot
    snapshots: RwLock<HashMap<String, VersionSnapshot>>,
    event_tx: broadcast::Sender<DomainEvent>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_event_capacity(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// A store whose event channel buffers `capacity` events per subscriber
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(capacity.max(1));
        Self {
            items: RwLock::new(HashMap::new()),
            versions: RwLock::new(Vec::new()),
            snapshots: RwLock::new(HashMap::new()),
            event_tx,
        }
    }

    pub fn subscribe_to_events(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores the error when nobody is subscribed
    fn emit_event(&self, event: DomainEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// `root_id` plus every item reachable through parent pointers, root first
fn collect_subtree(items: &[Item], root_id: &str) -> Vec<String> {
    let mut removed = vec![root_id.to_string()];
    let mut seen: HashSet<String> = removed.iter().cloned().collect();
    let mut cursor = 0;

    while cursor < removed.len() {
        let parent = removed[cursor].clone();
        for item in items {
            if item.parent_id.as_deref() == Some(parent.as_str()) && seen.insert(item.id.clone())
            {
                removed.push(item.id.clone());
            }
        }
        cursor += 1;
    }
    removed
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list_items(&self, universe_id: &str) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items.get(universe_id).cloned().unwrap_or_default())
    }

    async fn get_item(&self, universe_id: &str, id: &str) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .get(universe_id)
            .and_then(|list| list.iter().find(|item| item.id == id))
            .cloned())
    }

    async fn insert_item(&self, universe_id: &str, item: Item) -> Result<Item> {
        {
            let mut items = self.items.write().await;
            let list = items.entry(universe_id.to_string()).or_default();
            if list.iter().any(|existing| existing.id == item.id) {
                return Err(StoreError::duplicate_item(&item.id).into());
            }
            list.push(item.clone());
        }

        tracing::debug!("Inserted item '{}' into universe '{}'", item.id, universe_id);
        self.emit_event(DomainEvent::ItemCreated {
            universe_id: universe_id.to_string(),
            item: item.clone(),
        });
        Ok(item)
    }

    async fn insert_items(&self, universe_id: &str, new_items: Vec<Item>) -> Result<()> {
        {
            let mut items = self.items.write().await;
            let list = items.entry(universe_id.to_string()).or_default();
            let mut ids: HashSet<&str> = list.iter().map(|item| item.id.as_str()).collect();
            for item in &new_items {
                if !ids.insert(item.id.as_str()) {
                    return Err(StoreError::duplicate_item(&item.id).into());
                }
            }
            list.extend(new_items.iter().cloned());
        }

        for item in new_items {
            self.emit_event(DomainEvent::ItemCreated {
                universe_id: universe_id.to_string(),
                item,
            });
        }
        Ok(())
    }

    async fn update_item(&self, universe_id: &str, id: &str, update: ItemUpdate) -> Result<Item> {
        let updated = {
            let mut items = self.items.write().await;
            let item = items
                .get_mut(universe_id)
                .and_then(|list| list.iter_mut().find(|item| item.id == id))
                .ok_or_else(|| StoreError::item_not_found(id))?;
            update.apply_to(item);
            item.clone()
        };

        self.emit_event(DomainEvent::ItemUpdated {
            universe_id: universe_id.to_string(),
            item: updated.clone(),
        });
        Ok(updated)
    }

    async fn apply_reorder(&self, universe_id: &str, updates: &[ReorderUpdate]) -> Result<()> {
        let changed = {
            let mut items = self.items.write().await;
            let list = items.entry(universe_id.to_string()).or_default();

            let missing: Vec<&str> = updates
                .iter()
                .filter(|update| !list.iter().any(|item| item.id == update.id))
                .map(|update| update.id.as_str())
                .collect();
            if !missing.is_empty() {
                return Err(StoreError::batch_rejected(format!(
                    "unknown item ids: {}",
                    missing.join(", ")
                ))
                .into());
            }

            let mut changed = Vec::with_capacity(updates.len());
            for update in updates {
                if let Some(item) = list.iter_mut().find(|item| item.id == update.id) {
                    item.apply_position(update);
                    changed.push(item.clone());
                }
            }
            changed
        };

        tracing::debug!(
            "Applied {} position updates in universe '{}'",
            changed.len(),
            universe_id
        );
        for item in changed {
            self.emit_event(DomainEvent::ItemUpdated {
                universe_id: universe_id.to_string(),
                item,
            });
        }
        Ok(())
    }

    async fn delete_item(&self, universe_id: &str, id: &str) -> Result<Vec<String>> {
        let removed = {
            let mut items = self.items.write().await;
            let list = items
                .get_mut(universe_id)
                .filter(|list| list.iter().any(|item| item.id == id))
                .ok_or_else(|| StoreError::item_not_found(id))?;

            let removed = collect_subtree(list, id);
            let doomed: HashSet<&str> = removed.iter().map(String::as_str).collect();
            list.retain(|item| !doomed.contains(item.id.as_str()));
            removed
        };

        self.emit_event(DomainEvent::ItemDeleted {
            universe_id: universe_id.to_string(),
            id: id.to_string(),
            cascaded: removed.iter().skip(1).cloned().collect(),
        });
        Ok(removed)
    }

    async fn delete_all_items(&self, universe_id: &str) -> Result<usize> {
        let removed = {
            let mut items = self.items.write().await;
            items.remove(universe_id).map(|list| list.len()).unwrap_or(0)
        };

        self.emit_event(DomainEvent::ItemsCleared {
            universe_id: universe_id.to_string(),
            count: removed,
        });
        Ok(removed)
    }

    async fn replace_items(&self, universe_id: &str, new_items: Vec<Item>) -> Result<()> {
        let mut ids = HashSet::new();
        for item in &new_items {
            if !ids.insert(item.id.as_str()) {
                return Err(StoreError::duplicate_item(&item.id).into());
            }
        }

        let count = new_items.len();
        {
            let mut items = self.items.write().await;
            items.insert(universe_id.to_string(), new_items);
        }

        tracing::debug!("Replaced universe '{}' with {} items", universe_id, count);
        self.emit_event(DomainEvent::ItemsReplaced {
            universe_id: universe_id.to_string(),
            count,
        });
        Ok(())
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn list_versions(&self, universe_id: &str) -> Result<Vec<UniverseVersion>> {
        let versions = self.versions.read().await;
        Ok(versions
            .iter()
            .filter(|version| version.universe_id == universe_id)
            .cloned()
            .collect())
    }

    async fn get_version(&self, version_id: &str) -> Result<Option<UniverseVersion>> {
        let versions = self.versions.read().await;
        Ok(versions.iter().find(|version| version.id == version_id).cloned())
    }

    async fn insert_version(&self, version: UniverseVersion) -> Result<UniverseVersion> {
        self.versions.write().await.push(version.clone());
        self.emit_event(DomainEvent::VersionCreated {
            version: version.clone(),
        });
        Ok(version)
    }

    async fn set_current_version(&self, universe_id: &str, version_id: &str) -> Result<()> {
        {
            let mut versions = self.versions.write().await;
            let exists = versions
                .iter()
                .any(|version| version.id == version_id && version.universe_id == universe_id);
            if !exists {
                return Err(StoreError::version_not_found(version_id).into());
            }

            for version in versions
                .iter_mut()
                .filter(|version| version.universe_id == universe_id)
            {
                version.is_current = version.id == version_id;
            }
        }

        self.emit_event(DomainEvent::CurrentVersionChanged {
            universe_id: universe_id.to_string(),
            version_id: version_id.to_string(),
        });
        Ok(())
    }

    async fn delete_version(&self, version_id: &str) -> Result<()> {
        let removed = {
            let mut versions = self.versions.write().await;
            let position = versions
                .iter()
                .position(|version| version.id == version_id)
                .ok_or_else(|| StoreError::version_not_found(version_id))?;
            versions.remove(position)
        };
        self.snapshots.write().await.remove(version_id);

        self.emit_event(DomainEvent::VersionDeleted {
            universe_id: removed.universe_id,
            version_id: version_id.to_string(),
        });
        Ok(())
    }

    async fn read_snapshot(&self, version_id: &str) -> Result<Option<VersionSnapshot>> {
        Ok(self.snapshots.read().await.get(version_id).cloned())
    }

    async fn write_snapshot(&self, snapshot: VersionSnapshot) -> Result<()> {
        self.snapshots
            .write()
            .await
            .insert(snapshot.version_id.clone(), snapshot);
        Ok(())
    }
}
