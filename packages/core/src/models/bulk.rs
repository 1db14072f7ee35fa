//! Result and validation types for bulk move / delete.

use super::Item;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a bulk move sends the selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Destination {
    /// Root level (`parent_id = None`)
    Root,
    /// Under an existing item
    Item(String),
}

impl Destination {
    /// Parse the selector value used by the destination picker. `"root"` maps to
    /// `Root`, anything else is an item id.
    pub fn parse(value: &str) -> Self {
        if value == "root" {
            Destination::Root
        } else {
            Destination::Item(value.to_string())
        }
    }

    /// The `parent_id` a moved item ends up with
    pub fn parent_id(&self) -> Option<String> {
        match self {
            Destination::Root => None,
            Destination::Item(id) => Some(id.clone()),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Root => write!(f, "root"),
            Destination::Item(id) => write!(f, "{}", id),
        }
    }
}

/// Outcome of a synchronous validation. Never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Per-item failure entry in a bulk result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemError {
    pub item_id: String,
    pub item_title: String,
    pub error: String,
}

/// Structured outcome of a bulk move or delete.
///
/// Partial failure is a normal result, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub success: bool,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<BulkItemError>,
    /// Why the request was refused before any item was attempted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BulkOperationResult {
    /// Result for a request rejected before anything was attempted.
    ///
    /// Every selected item is reported with the same reason.
    pub fn rejected(selected: &[Item], reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let errors: Vec<BulkItemError> = selected
            .iter()
            .map(|item| BulkItemError {
                item_id: item.id.clone(),
                item_title: item.title.clone(),
                error: reason.clone(),
            })
            .collect();
        Self {
            success: false,
            success_count: 0,
            error_count: errors.len(),
            errors,
            message: Some(reason),
        }
    }

    pub fn is_partial(&self) -> bool {
        self.success_count > 0 && self.error_count > 0
    }

    /// "deleted N of M" style summary
    pub fn summary(&self, verb: &str) -> String {
        let total = self.success_count + self.error_count;
        if self.error_count == 0 {
            format!(
                "Successfully {} {} item{}",
                verb,
                self.success_count,
                if self.success_count == 1 { "" } else { "s" }
            )
        } else {
            format!(
                "{} {} of {} items, {} failed",
                capitalize(verb),
                self.success_count,
                total,
                self.error_count
            )
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Incremental progress of a sequential bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkProgress {
    pub completed: usize,
    pub total: usize,
}

/// Counts shown before confirming a bulk operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatistics {
    pub selected_count: usize,
    /// Selected items plus all their descendants
    pub total_affected_count: usize,
    pub has_nested_items: bool,
    pub direct_children_count: usize,
}
