//! Read-only queries over a built tree.
//!
//! `TreeNavigator` owns a forest and an index from item id to the child
//! position path that reaches it (`[root_pos, child_pos, ...]`). The index is
//! built once; lookups then walk straight down in O(depth) instead of
//! searching the whole forest.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::models::Item;
//! use canoncore_core::tree::TreeNavigator;
//!
//! let items = vec![
//!     Item::with_id("book", "Book"),
//!     Item::with_id("ch1", "Chapter 1").with_parent(Some("book".into())),
//! ];
//! let nav = TreeNavigator::new(&items);
//!
//! let path: Vec<&str> = nav.get_node_path("ch1").iter().map(|n| n.id()).collect();
//! assert_eq!(path, vec!["book", "ch1"]);
//! ```

use super::builder::{build_tree, flatten_nodes};
use crate::models::{Item, TreeNode};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct TreeNavigator {
    tree: Vec<TreeNode>,
    index: HashMap<String, Vec<usize>>,
}

impl TreeNavigator {
    /// Build the tree from a flat item list and index it
    pub fn new(items: &[Item]) -> Self {
        Self::from_tree(build_tree(items))
    }

    /// Index an already built forest
    pub fn from_tree(tree: Vec<TreeNode>) -> Self {
        let mut index = HashMap::new();
        index_nodes(&tree, &mut Vec::new(), &mut index);
        Self { tree, index }
    }

    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    pub fn into_tree(self) -> Vec<TreeNode> {
        self.tree
    }

    pub fn total_nodes(&self) -> usize {
        self.index.len()
    }

    /// All nodes in pre-order
    pub fn flat_nodes(&self) -> Vec<&TreeNode> {
        flatten_nodes(&self.tree)
    }

    pub fn find_node(&self, id: &str) -> Option<&TreeNode> {
        let positions = self.index.get(id)?;
        let (first, rest) = positions.split_first()?;
        let mut node = self.tree.get(*first)?;
        for pos in rest {
            node = node.children.get(*pos)?;
        }
        Some(node)
    }

    /// Ancestors root-first followed by the node itself. Empty for unknown ids.
    pub fn get_node_path(&self, id: &str) -> Vec<&TreeNode> {
        let Some(positions) = self.index.get(id) else {
            return Vec::new();
        };

        let mut path = Vec::with_capacity(positions.len());
        let mut level: &[TreeNode] = &self.tree;
        for pos in positions {
            match level.get(*pos) {
                Some(node) => {
                    path.push(node);
                    level = &node.children;
                }
                None => return Vec::new(),
            }
        }
        path
    }

    /// Ancestors root-first, excluding the node itself
    pub fn get_node_ancestors(&self, id: &str) -> Vec<&TreeNode> {
        let mut path = self.get_node_path(id);
        path.pop();
        path
    }

    pub fn get_node_children(&self, id: &str) -> &[TreeNode] {
        self.find_node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Every transitive child in pre-order, excluding the node itself
    pub fn get_node_descendants(&self, id: &str) -> Vec<&TreeNode> {
        self.find_node(id)
            .map(|node| flatten_nodes(&node.children))
            .unwrap_or_default()
    }

    /// Visible nodes for the given expansion set (see [`get_visible_nodes`])
    pub fn visible_nodes(&self, expanded_ids: &HashSet<String>) -> Vec<TreeNode> {
        get_visible_nodes(&self.tree, expanded_ids)
    }

    /// A node is visible when every one of its ancestors is expanded
    pub fn is_node_visible(&self, id: &str, expanded_ids: &HashSet<String>) -> bool {
        match self.find_node(id) {
            Some(node) => node.path.iter().all(|ancestor| expanded_ids.contains(ancestor)),
            None => false,
        }
    }

    pub fn is_ancestor(&self, ancestor_id: &str, node_id: &str) -> bool {
        match (self.find_node(ancestor_id), self.find_node(node_id)) {
            (Some(a), Some(b)) => is_ancestor(a, b),
            _ => false,
        }
    }

    pub fn is_descendant(&self, node_id: &str, ancestor_id: &str) -> bool {
        self.is_ancestor(ancestor_id, node_id)
    }
}

fn index_nodes(
    nodes: &[TreeNode],
    prefix: &mut Vec<usize>,
    index: &mut HashMap<String, Vec<usize>>,
) {
    for (pos, node) in nodes.iter().enumerate() {
        prefix.push(pos);
        index.insert(node.item.id.clone(), prefix.clone());
        index_nodes(&node.children, prefix, index);
        prefix.pop();
    }
}

/// Pre-order list of the nodes a user can currently see.
///
/// Roots are always emitted; children only when their parent's id is in
/// `expanded_ids`. Returned nodes carry `is_expanded` and have their
/// `children` cleared, since the list itself is the rendering order.
pub fn get_visible_nodes(tree: &[TreeNode], expanded_ids: &HashSet<String>) -> Vec<TreeNode> {
    let mut visible = Vec::new();
    collect_visible(tree, expanded_ids, &mut visible);
    visible
}

fn collect_visible(nodes: &[TreeNode], expanded_ids: &HashSet<String>, out: &mut Vec<TreeNode>) {
    for node in nodes {
        let expanded = expanded_ids.contains(&node.item.id);

        let mut entry = TreeNode::new(node.item.clone(), node.depth, node.path.clone());
        entry.has_children = node.has_children;
        entry.is_expanded = Some(expanded);
        out.push(entry);

        if expanded {
            collect_visible(&node.children, expanded_ids, out);
        }
    }
}

pub fn get_leaf_nodes(tree: &[TreeNode]) -> Vec<&TreeNode> {
    flatten_nodes(tree)
        .into_iter()
        .filter(|node| node.children.is_empty())
        .collect()
}

pub fn get_nodes_at_level(tree: &[TreeNode], level: usize) -> Vec<&TreeNode> {
    flatten_nodes(tree)
        .into_iter()
        .filter(|node| node.depth == level)
        .collect()
}

/// Deepest `depth` in the forest, 0 for an empty forest
pub fn get_max_depth(tree: &[TreeNode]) -> usize {
    flatten_nodes(tree)
        .into_iter()
        .map(|node| node.depth)
        .max()
        .unwrap_or(0)
}

/// True when `ancestor` appears on `node`'s path
pub fn is_ancestor(ancestor: &TreeNode, node: &TreeNode) -> bool {
    node.path.iter().any(|id| *id == ancestor.item.id)
}

/// True when `node` sits somewhere under `ancestor`
pub fn is_descendant(node: &TreeNode, ancestor: &TreeNode) -> bool {
    node.path.iter().any(|id| *id == ancestor.item.id)
}
