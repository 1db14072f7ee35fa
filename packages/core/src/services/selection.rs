//! Selection Manager
//!
//! Tracks which items are selected in a list or tree view, plus the
//! selection-mode flag. Selection is ephemeral state and is never persisted.
//!
//! The backing collection is held flattened (pre-order for trees). Whenever
//! it is replaced, selected ids that no longer exist are dropped, so every
//! read reflects only live items.
//!
//! # Examples
//!
//! ```rust
//! use canoncore_core::models::Item;
//! use canoncore_core::services::SelectionManager;
//!
//! let items = vec![Item::with_id("a", "A"), Item::with_id("b", "B")];
//! let mut selection = SelectionManager::new(items).with_max_selection(Some(1));
//!
//! selection.select_all();
//! assert_eq!(selection.selected_count(), 1);
//! assert!(selection.is_selected("a"));
//! ```

use crate::models::{Item, TreeNode};
use crate::tree::flatten_tree;
use std::collections::HashSet;
use std::fmt;

/// Called with the new selection and the flattened items after each change
pub type SelectionChangeCallback = Box<dyn Fn(&HashSet<String>, &[Item]) + Send + Sync>;

pub struct SelectionManager {
    items: Vec<Item>,
    item_ids: HashSet<String>,
    selected: HashSet<String>,
    selection_mode: bool,
    max_selection: Option<usize>,
    on_change: Option<SelectionChangeCallback>,
}

impl fmt::Debug for SelectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionManager")
            .field("items", &self.items.len())
            .field("selected", &self.selected)
            .field("selection_mode", &self.selection_mode)
            .field("max_selection", &self.max_selection)
            .finish()
    }
}

impl SelectionManager {
    /// Manager over a flat item list
    pub fn new(items: Vec<Item>) -> Self {
        let item_ids = items.iter().map(|item| item.id.clone()).collect();
        Self {
            items,
            item_ids,
            selected: HashSet::new(),
            selection_mode: false,
            max_selection: None,
            on_change: None,
        }
    }

    /// Manager over a tree, flattened in pre-order
    pub fn from_tree(tree: &[TreeNode]) -> Self {
        Self::new(flatten_tree(tree))
    }

    /// Cap the number of selected items. `Some(0)` means no cap.
    pub fn with_max_selection(mut self, max_selection: Option<usize>) -> Self {
        self.max_selection = max_selection.filter(|max| *max > 0);
        self
    }

    pub fn with_on_change(mut self, callback: SelectionChangeCallback) -> Self {
        self.on_change = Some(callback);
        self
    }

    /// Replace the backing items and prune selected ids that disappeared
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.item_ids = items.iter().map(|item| item.id.clone()).collect();
        self.items = items;

        let before = self.selected.len();
        let live = &self.item_ids;
        self.selected.retain(|id| live.contains(id));
        if self.selected.len() != before {
            tracing::debug!(
                "Pruned {} stale ids from selection",
                before - self.selected.len()
            );
        }
    }

    pub fn set_tree(&mut self, tree: &[TreeNode]) {
        self.set_items(flatten_tree(tree));
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    fn at_capacity(&self) -> bool {
        self.max_selection
            .is_some_and(|max| self.selected.len() >= max)
    }

    fn notify(&self) {
        if let Some(callback) = &self.on_change {
            callback(&self.selected, &self.items);
        }
    }

    /// Add if absent (unless at capacity), remove if present.
    ///
    /// Ids not in the backing list are ignored.
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected.remove(id) {
            self.notify();
            return;
        }
        if !self.item_ids.contains(id) || self.at_capacity() {
            return;
        }
        self.selected.insert(id.to_string());
        self.notify();
    }

    pub fn select_item(&mut self, id: &str) {
        if self.selected.contains(id) || !self.item_ids.contains(id) || self.at_capacity() {
            return;
        }
        self.selected.insert(id.to_string());
        self.notify();
    }

    pub fn deselect_item(&mut self, id: &str) {
        if self.selected.remove(id) {
            self.notify();
        }
    }

    /// Select every item in flattened order, truncated to the cap
    pub fn select_all(&mut self) {
        let limit = self.max_selection.unwrap_or(usize::MAX);
        self.selected = self
            .items
            .iter()
            .take(limit)
            .map(|item| item.id.clone())
            .collect();
        self.notify();
    }

    /// Replace the selection with the known ids among `ids`, truncated to the cap
    pub fn select_multiple<S: AsRef<str>>(&mut self, ids: &[S]) {
        let limit = self.max_selection.unwrap_or(usize::MAX);
        let mut selected = HashSet::new();
        for id in ids.iter().map(AsRef::as_ref) {
            if selected.len() >= limit {
                break;
            }
            if self.item_ids.contains(id) {
                selected.insert(id.to_string());
            }
        }
        self.selected = selected;
        self.notify();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
        self.notify();
    }

    pub fn enter_selection_mode(&mut self) {
        self.selection_mode = true;
    }

    /// Leave selection mode, which always clears the selection
    pub fn exit_selection_mode(&mut self) {
        self.selection_mode = false;
        self.clear_selection();
    }

    pub fn is_selection_mode(&self) -> bool {
        self.selection_mode
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_ids(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Selected items in flattened order
    pub fn get_selected_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.id))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    pub fn is_all_selected(&self) -> bool {
        !self.items.is_empty() && self.selected.len() == self.items.len()
    }
}
