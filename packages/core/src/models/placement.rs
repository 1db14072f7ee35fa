//! Multi-placement records.
//!
//! A content item can be shown under more than one parent. Each appearance is
//! a `ContentPlacement` with its own order among that parent's children.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentPlacement {
    pub content_item_id: String,
    /// `None` places the item at root level
    pub parent_id: Option<String>,
    pub order_index: u32,
}

impl ContentPlacement {
    pub fn new(
        content_item_id: impl Into<String>,
        parent_id: Option<String>,
        order_index: u32,
    ) -> Self {
        Self {
            content_item_id: content_item_id.into(),
            parent_id,
            order_index,
        }
    }
}
