//! Bulk Operation Orchestrator
//!
//! Moves and deletes a multi-item selection.
//!
//! - Destinations are validated up front; a selection can never be moved into
//!   itself or into one of its own descendants.
//! - A move is one batched reorder commit, so it succeeds or fails as a whole.
//! - A delete issues one call per item, strictly in selection order. One
//!   failure does not stop the loop and is reported per item.
//!
//! Validation failures are returned as [`ValidationResult`] values and commit
//! failures as [`BulkOperationResult`] entries. Nothing here returns `Err`.

use crate::models::{
    BulkItemError, BulkOperationResult, BulkProgress, BulkStatistics, Destination, Item,
    ReorderUpdate, ValidationResult,
};
use crate::services::reorder::ReorderCommit;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Persistence hook for deleting one item
#[async_trait]
pub trait DeleteCommit: Send + Sync {
    async fn on_delete(&self, item_id: &str) -> Result<()>;
}

/// True when any ancestor of `item_id` (not the item itself) is in `selected`
fn has_selected_ancestor(
    by_id: &HashMap<&str, &Item>,
    item_id: &str,
    selected: &HashSet<&str>,
) -> bool {
    let mut current = by_id.get(item_id).and_then(|item| item.parent_id.as_deref());
    let mut steps = 0;
    while let Some(parent_id) = current {
        if selected.contains(parent_id) {
            return true;
        }
        steps += 1;
        if steps > by_id.len() {
            return false;
        }
        current = by_id.get(parent_id).and_then(|item| item.parent_id.as_deref());
    }
    false
}

fn selected_ids(selected: &[Item]) -> HashSet<&str> {
    selected.iter().map(|item| item.id.as_str()).collect()
}

fn index_items(items: &[Item]) -> HashMap<&str, &Item> {
    items.iter().map(|item| (item.id.as_str(), item)).collect()
}

/// Items the selection may be moved under.
///
/// Excludes the selected items and every descendant of a selected item. The
/// root destination is not listed; callers offer it separately.
pub fn get_available_destinations(selected: &[Item], all_items: &[Item]) -> Vec<Item> {
    let selected = selected_ids(selected);
    let by_id = index_items(all_items);

    all_items
        .iter()
        .filter(|item| !selected.contains(item.id.as_str()))
        .filter(|item| !has_selected_ancestor(&by_id, &item.id, &selected))
        .cloned()
        .collect()
}

/// Check a destination selector (`"root"` or an item id) for the selection
pub fn validate_destination(
    destination: &str,
    selected: &[Item],
    all_items: &[Item],
) -> ValidationResult {
    if destination.is_empty() {
        return ValidationResult::invalid("No destination selected");
    }

    let target_id = match Destination::parse(destination) {
        Destination::Root => return ValidationResult::ok(),
        Destination::Item(id) => id,
    };

    let selected = selected_ids(selected);
    if selected.contains(target_id.as_str()) {
        return ValidationResult::invalid("Cannot move items to themselves");
    }

    let by_id = index_items(all_items);
    if !by_id.contains_key(target_id.as_str()) {
        return ValidationResult::invalid("Destination no longer exists");
    }

    if has_selected_ancestor(&by_id, &target_id, &selected) {
        return ValidationResult::invalid("Cannot move items into their own descendants");
    }

    ValidationResult::ok()
}

pub fn validate_selection(selected: &[Item]) -> ValidationResult {
    if selected.is_empty() {
        ValidationResult::invalid("No items selected")
    } else {
        ValidationResult::ok()
    }
}

/// Counts for a confirmation prompt.
///
/// An item nested under another selected item is counted once.
pub fn statistics(selected: &[Item], all_items: &[Item]) -> BulkStatistics {
    let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in all_items {
        if let Some(parent_id) = item.parent_id.as_deref() {
            children_of.entry(parent_id).or_default().push(item.id.as_str());
        }
    }

    let mut affected: HashSet<&str> = HashSet::new();
    let mut stack: Vec<&str> = selected.iter().map(|item| item.id.as_str()).collect();
    while let Some(id) = stack.pop() {
        if !affected.insert(id) {
            continue;
        }
        if let Some(children) = children_of.get(id) {
            stack.extend(children.iter().copied());
        }
    }

    let selected_set = selected_ids(selected);
    let has_nested_items = selected
        .iter()
        .any(|item| children_of.contains_key(item.id.as_str()));

    BulkStatistics {
        selected_count: selected_set.len(),
        total_affected_count: affected.len(),
        has_nested_items,
        direct_children_count: affected.len().saturating_sub(selected_set.len()),
    }
}

/// Executes validated bulk moves and deletes against injected commits
#[derive(Clone)]
pub struct BulkOperations {
    reorder: Arc<dyn ReorderCommit>,
    delete: Arc<dyn DeleteCommit>,
}

impl BulkOperations {
    pub fn new(reorder: Arc<dyn ReorderCommit>, delete: Arc<dyn DeleteCommit>) -> Self {
        Self { reorder, delete }
    }

    /// Append the selection, in selection order, under `destination`.
    ///
    /// The new indices start at the destination's current child count. The
    /// whole selection is committed as one reorder batch; if that fails every
    /// selected item is reported as failed.
    pub async fn move_items(
        &self,
        selected: &[Item],
        all_items: &[Item],
        destination: &str,
    ) -> BulkOperationResult {
        let validation = validate_selection(selected);
        let validation = if validation.valid {
            validate_destination(destination, selected, all_items)
        } else {
            validation
        };
        if !validation.valid {
            let reason = validation.error.unwrap_or_default();
            tracing::debug!("Bulk move rejected: {}", reason);
            return BulkOperationResult::rejected(selected, reason);
        }

        let new_parent_id = Destination::parse(destination).parent_id();
        let base_index = all_items
            .iter()
            .filter(|item| item.parent_id == new_parent_id)
            .count();

        let updates: Vec<ReorderUpdate> = selected
            .iter()
            .enumerate()
            .map(|(offset, item)| {
                ReorderUpdate::new(&item.id, new_parent_id.clone(), (base_index + offset) as u32)
            })
            .collect();

        match self.reorder.on_reorder(updates).await {
            Ok(()) => {
                tracing::info!(
                    "Moved {} items to {}",
                    selected.len(),
                    Destination::parse(destination)
                );
                BulkOperationResult {
                    success: true,
                    success_count: selected.len(),
                    error_count: 0,
                    errors: Vec::new(),
                    message: None,
                }
            }
            Err(e) => {
                tracing::error!("Failed to move items: {:#}", e);
                BulkOperationResult {
                    success: false,
                    success_count: 0,
                    error_count: selected.len(),
                    errors: selected
                        .iter()
                        .map(|item| BulkItemError {
                            item_id: item.id.clone(),
                            item_title: item.title.clone(),
                            error: e.to_string(),
                        })
                        .collect(),
                    message: None,
                }
            }
        }
    }

    pub async fn delete_items(&self, selected: &[Item]) -> BulkOperationResult {
        self.delete_items_with_progress(selected, |_| {}).await
    }

    /// Delete one item at a time, reporting progress after each call
    pub async fn delete_items_with_progress<F>(
        &self,
        selected: &[Item],
        mut on_progress: F,
    ) -> BulkOperationResult
    where
        F: FnMut(BulkProgress) + Send,
    {
        let validation = validate_selection(selected);
        if !validation.valid {
            let reason = validation.error.unwrap_or_default();
            tracing::debug!("Bulk delete rejected: {}", reason);
            return BulkOperationResult::rejected(selected, reason);
        }

        let total = selected.len();
        let mut success_count = 0;
        let mut errors = Vec::new();

        for (index, item) in selected.iter().enumerate() {
            match self.delete.on_delete(&item.id).await {
                Ok(()) => success_count += 1,
                Err(e) => {
                    tracing::error!("Failed to delete item {}: {:#}", item.title, e);
                    errors.push(BulkItemError {
                        item_id: item.id.clone(),
                        item_title: item.title.clone(),
                        error: e.to_string(),
                    });
                }
            }
            on_progress(BulkProgress {
                completed: index + 1,
                total,
            });
        }

        let result = BulkOperationResult {
            success: errors.is_empty(),
            success_count,
            error_count: errors.len(),
            errors,
            message: None,
        };
        if result.success {
            tracing::info!("{}", result.summary("deleted"));
        } else {
            tracing::warn!("{}", result.summary("deleted"));
        }
        result
    }
}
