//! Item Data Structures
//!
//! `Item` is the unit of hierarchy in CanonCore. A universe owns a flat list of
//! items; the hierarchy is induced purely by `parent_id` references and sibling
//! order by `order_index`.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::models::Item;
//!
//! let season = Item::new("Season 1").with_order_index(0);
//! let episode = Item::new("Pilot")
//!     .with_parent(Some(season.id.clone()))
//!     .with_order_index(0);
//!
//! assert!(season.is_root());
//! assert_eq!(episode.parent_id.as_deref(), Some(season.id.as_str()));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A content item placed in a universe hierarchy.
///
/// # Fields
///
/// - `id`: Opaque unique identifier
/// - `parent_id`: Parent item reference (`None` means root level)
/// - `order_index`: Ascending sibling order
/// - `title` / `description`: Display text, used by search
/// - `item_type`, `created_at`, `updated_at`: Domain fields the hierarchy logic
///   never interprets but sort and filter presets can use
/// - `properties`: Any other columns, carried through unchanged
///
/// Unknown JSON fields land in `properties` and serialize back flat, so an item
/// read from the store and written into a snapshot round-trips verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub order_index: u32,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Pass-through columns (slug, universe id, ...)
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Item {
    /// Create a root-level item with a generated UUID and timestamps set to now
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            parent_id: None,
            order_index: 0,
            title: title.into(),
            description: None,
            item_type: None,
            created_at: Some(now),
            updated_at: Some(now),
            properties: Map::new(),
        }
    }

    /// Create an item with an explicit id and no timestamps
    pub fn with_id(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            order_index: 0,
            title: title.into(),
            description: None,
            item_type: None,
            created_at: None,
            updated_at: None,
            properties: Map::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: Option<String>) -> Self {
        self.parent_id = parent_id;
        self
    }

    pub fn with_order_index(mut self, order_index: u32) -> Self {
        self.order_index = order_index;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// True when the item sits at root level
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Apply a position patch, bumping `updated_at` if the item carries timestamps
    pub fn apply_position(&mut self, update: &ReorderUpdate) {
        self.parent_id = update.parent_id.clone();
        self.order_index = update.order_index;
        if self.updated_at.is_some() {
            self.updated_at = Some(Utc::now());
        }
    }

    /// Look up a field by its column name
    ///
    /// Known columns are returned as JSON values, anything else is read from
    /// `properties`. Missing values come back as `None`.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::String(self.id.clone())),
            "parent_id" => self.parent_id.clone().map(Value::String),
            "order_index" => Some(Value::from(self.order_index)),
            "title" => Some(Value::String(self.title.clone())),
            "description" => self.description.clone().map(Value::String),
            "item_type" | "type" => self.item_type.clone().map(Value::String),
            "created_at" => self.created_at.map(|t| Value::String(t.to_rfc3339())),
            "updated_at" => self.updated_at.map(|t| Value::String(t.to_rfc3339())),
            other => self.properties.get(other).cloned(),
        }
    }
}

/// A single position patch emitted by the reorder engine and bulk move.
///
/// This is the only shape the persistence layer has to apply for hierarchy
/// changes: `{id, parent_id, order_index}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReorderUpdate {
    pub id: String,
    pub parent_id: Option<String>,
    pub order_index: u32,
}

impl ReorderUpdate {
    pub fn new(id: impl Into<String>, parent_id: Option<String>, order_index: u32) -> Self {
        Self {
            id: id.into(),
            parent_id,
            order_index,
        }
    }
}

/// Parameters for creating an item through `ContentService`
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Optional id; generated when absent
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub item_type: Option<String>,
    pub parent_id: Option<String>,
    pub properties: Map<String, Value>,
}

/// Sparse update for an existing item. Only `Some` fields are written.
///
/// Position changes go through `ReorderUpdate` instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub item_type: Option<Option<String>>,
    pub properties: Option<Map<String, Value>>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_item_type(mut self, item_type: Option<String>) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// Merge these properties into the item's existing ones
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.item_type.is_none()
            && self.properties.is_none()
    }

    /// Apply to `item`, bumping `updated_at`
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(item_type) = &self.item_type {
            item.item_type = item_type.clone();
        }
        if let Some(properties) = &self.properties {
            for (key, value) in properties {
                item.properties.insert(key.clone(), value.clone());
            }
        }
        item.updated_at = Some(Utc::now());
    }
}
