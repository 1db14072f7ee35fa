//! Derived tree representation of an item list.
//!
//! `TreeNode` values are never persisted. They are rebuilt from the flat item
//! list on every read and any move produces new items or patches instead of
//! mutating a node in place.

use super::Item;
use serde::{Deserialize, Serialize};

/// An `Item` decorated with its position in the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub item: Item,

    /// Children in ascending `order_index`
    pub children: Vec<TreeNode>,

    /// Root nodes have depth 0
    pub depth: usize,

    /// Ancestor ids, root first, excluding self
    pub path: Vec<String>,

    pub has_children: bool,

    /// Only set on nodes returned by a visibility query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
}

impl TreeNode {
    /// A bare node with no children at the given depth/path
    pub fn new(item: Item, depth: usize, path: Vec<String>) -> Self {
        Self {
            item,
            children: Vec::new(),
            depth,
            path,
            has_children: false,
            is_expanded: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.item.id
    }

    pub fn push_child(&mut self, child: TreeNode) {
        self.children.push(child);
        self.has_children = true;
    }

    /// Number of nodes in this subtree, self included
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::subtree_size).sum::<usize>()
    }
}
