//! Expanded/collapsed state for tree views.

use super::builder::flatten_nodes;
use crate::models::TreeNode;
use std::collections::HashSet;

/// Set of node ids whose children are shown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<String>,
}

impl ExpansionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    /// Flip a node, returning its new state
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.to_string());
            true
        }
    }

    pub fn expand(&mut self, id: &str) {
        self.expanded.insert(id.to_string());
    }

    pub fn collapse(&mut self, id: &str) {
        self.expanded.remove(id);
    }

    /// Expand every node that has children
    pub fn expand_all(&mut self, tree: &[TreeNode]) {
        self.expanded = flatten_nodes(tree)
            .into_iter()
            .filter(|node| node.has_children)
            .map(|node| node.item.id.clone())
            .collect();
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Expand exactly the nodes with children above `level`, so the first
    /// `level + 1` levels are visible
    pub fn expand_to_level(&mut self, tree: &[TreeNode], level: usize) {
        self.expanded = flatten_nodes(tree)
            .into_iter()
            .filter(|node| node.has_children && node.depth < level)
            .map(|node| node.item.id.clone())
            .collect();
    }

    pub fn expanded_ids(&self) -> &HashSet<String> {
        &self.expanded
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}
