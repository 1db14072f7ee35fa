//! Drag-and-Drop Reorder Engine
//!
//! Turns a finished drag gesture into a batch of position patches and hands
//! the batch to an injected [`ReorderCommit`].
//!
//! # Drag lifecycle
//!
//! 1. `handle_drag_start` - optional caller hook, no mutation
//! 2. `handle_drag_over` - optional caller hook for live feedback, no mutation
//! 3. `handle_drag_end` - computes the patches and commits them as one batch
//!
//! # Placement rules
//!
//! - `Before` / `After` a target: the moved item joins the target's parent,
//!   directly before or after it
//! - `Inside` a target: the moved item becomes its last child
//!
//! The destination sibling group is renumbered to dense 0-based indices around
//! the moved item, and so is the group it left. Only siblings whose index
//! actually changes are patched; the moved item is always patched.
//!
//! Nothing is mutated locally. If the commit fails the error is logged and
//! reported in the [`DragOutcome`]; there is no rollback or retry.

use crate::models::{Item, ReorderUpdate};
use crate::tree::sibling_group;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const BEFORE_SUFFIX: &str = "-before-drop-zone";
const AFTER_SUFFIX: &str = "-after-drop-zone";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// Where an item was dropped
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub target_id: String,
    pub position: DropPosition,
}

impl DropTarget {
    pub fn new(target_id: impl Into<String>, position: DropPosition) -> Self {
        Self {
            target_id: target_id.into(),
            position,
        }
    }

    pub fn before(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DropPosition::Before)
    }

    pub fn after(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DropPosition::After)
    }

    pub fn inside(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DropPosition::Inside)
    }

    /// Decode a drop-zone id: `<id>-before-drop-zone`, `<id>-after-drop-zone`,
    /// or a bare `<id>` meaning inside
    pub fn parse(zone_id: &str) -> Self {
        if let Some(target) = zone_id.strip_suffix(BEFORE_SUFFIX) {
            Self::before(target)
        } else if let Some(target) = zone_id.strip_suffix(AFTER_SUFFIX) {
            Self::after(target)
        } else {
            Self::inside(zone_id)
        }
    }

    /// Inverse of [`DropTarget::parse`]
    pub fn zone_id(&self) -> String {
        match self.position {
            DropPosition::Before => format!("{}{}", self.target_id, BEFORE_SUFFIX),
            DropPosition::After => format!("{}{}", self.target_id, AFTER_SUFFIX),
            DropPosition::Inside => self.target_id.clone(),
        }
    }
}

/// Persistence hook for a reorder batch
#[async_trait]
pub trait ReorderCommit: Send + Sync {
    /// Apply every patch. Failure means none of them should be considered applied.
    async fn on_reorder(&self, updates: Vec<ReorderUpdate>) -> Result<()>;
}

/// What a drag end did
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing to do: no target, dropped on itself, unknown ids, or a cycle
    NoOp,
    Committed(Vec<ReorderUpdate>),
    /// The commit call failed; the error has already been logged
    Failed {
        updates: Vec<ReorderUpdate>,
        error: String,
    },
}

impl DragOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, DragOutcome::Committed(_))
    }
}

/// True when `candidate` is `ancestor_id` or sits below it
fn within_subtree(items: &HashMap<&str, &Item>, candidate: &str, ancestor_id: &str) -> bool {
    let mut current = Some(candidate);
    let mut steps = 0;
    while let Some(id) = current {
        if id == ancestor_id {
            return true;
        }
        // Bail out on pre-existing parent cycles
        steps += 1;
        if steps > items.len() {
            return false;
        }
        current = items.get(id).and_then(|item| item.parent_id.as_deref());
    }
    false
}

/// Compute the patch batch for dropping `active_id` on `target`.
///
/// Returns `None` when the drop is a no-op.
pub fn compute_reorder(
    items: &[Item],
    active_id: &str,
    target: &DropTarget,
) -> Option<Vec<ReorderUpdate>> {
    if target.target_id == active_id {
        return None;
    }

    let by_id: HashMap<&str, &Item> = items.iter().map(|item| (item.id.as_str(), item)).collect();
    let active = by_id.get(active_id)?;
    let Some(target_item) = by_id.get(target.target_id.as_str()) else {
        tracing::debug!("Drop target '{}' not found; ignoring drop", target.target_id);
        return None;
    };

    let new_parent_id: Option<&str> = match target.position {
        DropPosition::Before | DropPosition::After => target_item.parent_id.as_deref(),
        DropPosition::Inside => Some(target_item.id.as_str()),
    };

    if let Some(parent_id) = new_parent_id {
        if within_subtree(&by_id, parent_id, active_id) {
            tracing::warn!(
                "Refusing to move '{}' under its own descendant '{}'",
                active_id,
                parent_id
            );
            return None;
        }
    }

    let destination = sibling_group(items, new_parent_id, Some(active_id));
    let slot = match target.position {
        DropPosition::Inside => destination.len(),
        DropPosition::Before | DropPosition::After => {
            let rank = destination
                .iter()
                .position(|item| item.id == target_item.id)
                .unwrap_or(destination.len());
            if target.position == DropPosition::After {
                rank + 1
            } else {
                rank
            }
        }
    }
    .min(destination.len());

    let mut updates = vec![ReorderUpdate::new(
        active_id,
        new_parent_id.map(str::to_string),
        slot as u32,
    )];

    for (index, sibling) in destination.iter().enumerate() {
        let adjusted = (if index >= slot { index + 1 } else { index }) as u32;
        if sibling.order_index != adjusted {
            updates.push(ReorderUpdate::new(
                &sibling.id,
                sibling.parent_id.clone(),
                adjusted,
            ));
        }
    }

    let old_parent_id = active.parent_id.as_deref();
    if old_parent_id != new_parent_id {
        for (index, sibling) in sibling_group(items, old_parent_id, Some(active_id))
            .into_iter()
            .enumerate()
        {
            let index = index as u32;
            if sibling.order_index != index {
                updates.push(ReorderUpdate::new(
                    &sibling.id,
                    sibling.parent_id.clone(),
                    index,
                ));
            }
        }
    }

    tracing::debug!(
        "Planned move of '{}' to {:?}[{}] with {} sibling updates",
        active_id,
        new_parent_id,
        slot,
        updates.len() - 1
    );
    Some(updates)
}

pub type DragStartHook = Arc<dyn Fn(&str) + Send + Sync>;
pub type DragOverHook = Arc<dyn Fn(&str, Option<&DropTarget>) + Send + Sync>;

/// Drag state machine bound to a commit implementation
#[derive(Clone)]
pub struct ReorderEngine {
    commit: Arc<dyn ReorderCommit>,
    on_drag_start: Option<DragStartHook>,
    on_drag_over: Option<DragOverHook>,
}

impl ReorderEngine {
    pub fn new(commit: Arc<dyn ReorderCommit>) -> Self {
        Self {
            commit,
            on_drag_start: None,
            on_drag_over: None,
        }
    }

    pub fn with_drag_start_hook(mut self, hook: DragStartHook) -> Self {
        self.on_drag_start = Some(hook);
        self
    }

    pub fn with_drag_over_hook(mut self, hook: DragOverHook) -> Self {
        self.on_drag_over = Some(hook);
        self
    }

    pub fn handle_drag_start(&self, active_id: &str) {
        if let Some(hook) = &self.on_drag_start {
            hook(active_id);
        }
    }

    pub fn handle_drag_over(&self, active_id: &str, over: Option<&DropTarget>) {
        if let Some(hook) = &self.on_drag_over {
            hook(active_id, over);
        }
    }

    /// Compute and commit the drop of `active_id` onto `over`.
    ///
    /// `items` is the flat list the drag happened over.
    pub async fn handle_drag_end(
        &self,
        items: &[Item],
        active_id: &str,
        over: Option<&DropTarget>,
    ) -> DragOutcome {
        let Some(target) = over else {
            return DragOutcome::NoOp;
        };
        let Some(updates) = compute_reorder(items, active_id, target) else {
            return DragOutcome::NoOp;
        };

        match self.commit.on_reorder(updates.clone()).await {
            Ok(()) => {
                tracing::info!(
                    "Reordered '{}' ({} updates committed)",
                    active_id,
                    updates.len()
                );
                DragOutcome::Committed(updates)
            }
            Err(e) => {
                tracing::error!("Failed to reorder items: {:#}", e);
                DragOutcome::Failed {
                    updates,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Same as [`ReorderEngine::handle_drag_end`] for a raw drop-zone id
    pub async fn handle_drop_zone(
        &self,
        items: &[Item],
        active_id: &str,
        over_zone: Option<&str>,
    ) -> DragOutcome {
        match over_zone {
            Some(zone) if zone != active_id => {
                let target = DropTarget::parse(zone);
                self.handle_drag_end(items, active_id, Some(&target)).await
            }
            _ => DragOutcome::NoOp,
        }
    }
}
