//! Domain Events for stores
//!
//! Stores emit these after every successful write so view layers (tree
//! renderers, caches) can refresh without polling.
//!
//! # Architecture
//!
//! Events go out on a tokio broadcast channel. Sending with no subscribers is
//! not an error; late subscribers only see events emitted after they joined.

use crate::models::{Item, UniverseVersion};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DomainEvent {
    /// A new item was inserted
    #[serde(rename_all = "camelCase")]
    ItemCreated { universe_id: String, item: Item },

    /// An item's fields or position changed
    #[serde(rename_all = "camelCase")]
    ItemUpdated { universe_id: String, item: Item },

    /// An item (and any cascaded descendants) was removed
    #[serde(rename_all = "camelCase")]
    ItemDeleted {
        universe_id: String,
        id: String,
        cascaded: Vec<String>,
    },

    /// Every item of a universe was removed
    #[serde(rename_all = "camelCase")]
    ItemsCleared { universe_id: String, count: usize },

    /// The whole item set of a universe was swapped out (checkout)
    #[serde(rename_all = "camelCase")]
    ItemsReplaced { universe_id: String, count: usize },

    #[serde(rename_all = "camelCase")]
    VersionCreated { version: UniverseVersion },

    #[serde(rename_all = "camelCase")]
    CurrentVersionChanged {
        universe_id: String,
        version_id: String,
    },

    #[serde(rename_all = "camelCase")]
    VersionDeleted {
        universe_id: String,
        version_id: String,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &str {
        match self {
            DomainEvent::ItemCreated { .. } => "item:created",
            DomainEvent::ItemUpdated { .. } => "item:updated",
            DomainEvent::ItemDeleted { .. } => "item:deleted",
            DomainEvent::ItemsCleared { .. } => "items:cleared",
            DomainEvent::ItemsReplaced { .. } => "items:replaced",
            DomainEvent::VersionCreated { .. } => "version:created",
            DomainEvent::CurrentVersionChanged { .. } => "version:current",
            DomainEvent::VersionDeleted { .. } => "version:deleted",
        }
    }

    /// Universe the event belongs to
    pub fn universe_id(&self) -> &str {
        match self {
            DomainEvent::ItemCreated { universe_id, .. }
            | DomainEvent::ItemUpdated { universe_id, .. }
            | DomainEvent::ItemDeleted { universe_id, .. }
            | DomainEvent::ItemsCleared { universe_id, .. }
            | DomainEvent::ItemsReplaced { universe_id, .. }
            | DomainEvent::CurrentVersionChanged { universe_id, .. }
            | DomainEvent::VersionDeleted { universe_id, .. } => universe_id,
            DomainEvent::VersionCreated { version } => &version.universe_id,
        }
    }
}
