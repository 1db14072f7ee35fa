//! Multi-placement trees.
//!
//! With placements, hierarchy comes from `ContentPlacement` records instead of
//! `Item::parent_id`. An item placed under two parents is rendered twice, each
//! copy with its own subtree. Items without any placement are not rendered.

use crate::models::{ContentPlacement, Item, TreeNode};
use std::collections::HashMap;

/// Build a forest from items and their placement records.
///
/// Each rendered copy takes the placement's `parent_id` and `order_index`.
/// A placement that would put an item inside its own rendered subtree is
/// skipped.
pub fn build_placement_tree(items: &[Item], placements: &[ContentPlacement]) -> Vec<TreeNode> {
    let items_by_id: HashMap<&str, &Item> =
        items.iter().map(|item| (item.id.as_str(), item)).collect();

    let mut by_parent: HashMap<Option<&str>, Vec<&ContentPlacement>> = HashMap::new();
    for placement in placements {
        by_parent
            .entry(placement.parent_id.as_deref())
            .or_default()
            .push(placement);
    }
    for group in by_parent.values_mut() {
        group.sort_by_key(|placement| placement.order_index);
    }

    let mut path = Vec::new();
    render_level(None, &items_by_id, &by_parent, &mut path)
}

fn render_level(
    parent_id: Option<&str>,
    items_by_id: &HashMap<&str, &Item>,
    by_parent: &HashMap<Option<&str>, Vec<&ContentPlacement>>,
    path: &mut Vec<String>,
) -> Vec<TreeNode> {
    let Some(group) = by_parent.get(&parent_id) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(group.len());
    for placement in group {
        let Some(item) = items_by_id.get(placement.content_item_id.as_str()) else {
            tracing::debug!(
                "Placement references missing item '{}'",
                placement.content_item_id
            );
            continue;
        };

        if path.iter().any(|ancestor| *ancestor == item.id) {
            tracing::warn!(
                "Placement of '{}' under '{:?}' would create a cycle; skipping",
                item.id,
                parent_id
            );
            continue;
        }

        let mut copy = (*item).clone();
        copy.parent_id = placement.parent_id.clone();
        copy.order_index = placement.order_index;

        let mut node = TreeNode::new(copy, path.len(), path.clone());
        path.push(item.id.clone());
        for child in render_level(Some(item.id.as_str()), items_by_id, by_parent, path) {
            node.push_child(child);
        }
        path.pop();

        nodes.push(node);
    }
    nodes
}

/// Number of placements per content item id
pub fn placement_counts(placements: &[ContentPlacement]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for placement in placements {
        *counts.entry(placement.content_item_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Order index for a new placement appended under `parent_id`
pub fn next_order_index(placements: &[ContentPlacement], parent_id: Option<&str>) -> u32 {
    placements
        .iter()
        .filter(|placement| placement.parent_id.as_deref() == parent_id)
        .map(|placement| placement.order_index + 1)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::flatten_nodes;

    fn placement(item: &str, parent: Option<&str>, order: u32) -> ContentPlacement {
        ContentPlacement::new(item, parent.map(str::to_string), order)
    }

    fn items() -> Vec<Item> {
        ["doctor", "s1", "s2", "companion", "unplaced"]
            .iter()
            .map(|id| Item::with_id(*id, *id))
            .collect()
    }

    #[test]
    fn test_item_rendered_under_every_parent() {
        let placements = vec![
            placement("doctor", None, 0),
            placement("s1", Some("doctor"), 0),
            placement("s2", Some("doctor"), 1),
            placement("companion", Some("s2"), 0),
            placement("companion", Some("s1"), 0),
        ];

        let tree = build_placement_tree(&items(), &placements);
        assert_eq!(tree.len(), 1);

        let seasons = &tree[0].children;
        assert_eq!(seasons[0].children[0].id(), "companion");
        assert_eq!(seasons[1].children[0].id(), "companion");
        assert_eq!(
            seasons[1].children[0].item.parent_id.as_deref(),
            Some("s2")
        );
        assert_eq!(seasons[1].children[0].depth, 2);

        let all: Vec<&str> = flatten_nodes(&tree).iter().map(|n| n.id()).collect();
        assert!(!all.contains(&"unplaced"));
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_placement_cycle_is_cut() {
        let placements = vec![
            placement("doctor", None, 0),
            placement("s1", Some("doctor"), 0),
            placement("doctor", Some("s1"), 0),
        ];

        let tree = build_placement_tree(&items(), &placements);
        assert_eq!(tree[0].subtree_size(), 2);
    }

    #[test]
    fn test_counts_and_next_index() {
        let placements = vec![
            placement("a", None, 0),
            placement("a", Some("p"), 3),
            placement("b", Some("p"), 1),
        ];

        let counts = placement_counts(&placements);
        assert_eq!(counts.get("a"), Some(&2));
        assert_eq!(counts.get("b"), Some(&1));

        assert_eq!(next_order_index(&placements, Some("p")), 4);
        assert_eq!(next_order_index(&placements, None), 1);
        assert_eq!(next_order_index(&placements, Some("empty")), 0);
    }
}
