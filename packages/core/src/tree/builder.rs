//! Tree construction from parent-pointer lists
//!
//! Builds the nested `TreeNode` view using an adjacency list: one pass groups
//! items by parent id (in `order_index` order), then a recursive walk from the
//! roots assigns depth and path. Construction never fails:
//!
//! - A dangling `parent_id` turns the item into a root.
//! - An item that names itself as parent is treated as a root.
//! - Items caught in a parent cycle are never reached from a real root; the
//!   first one encountered is promoted to a root so every item still appears
//!   exactly once.

use crate::models::{Item, TreeNode};
use std::collections::{HashMap, HashSet};

/// Convert a flat item list into a forest ordered by `order_index`.
///
/// Ties in `order_index` keep input order.
pub fn build_tree(items: &[Item]) -> Vec<TreeNode> {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by_key(|item| item.order_index);

    let known: HashSet<&str> = sorted.iter().map(|item| item.id.as_str()).collect();

    // Adjacency list: parent_id → children in sibling order
    let mut children_of: HashMap<&str, Vec<&Item>> = HashMap::new();
    let mut roots: Vec<&Item> = Vec::new();

    for &item in &sorted {
        match item.parent_id.as_deref() {
            None => roots.push(item),
            Some(parent_id) if parent_id == item.id => {
                tracing::warn!(
                    "Item '{}' references itself as parent; placing at root",
                    item.id
                );
                roots.push(item);
            }
            Some(parent_id) if known.contains(parent_id) => {
                children_of.entry(parent_id).or_default().push(item);
            }
            Some(parent_id) => {
                tracing::debug!(
                    "Item '{}' has dangling parent '{}'; placing at root",
                    item.id,
                    parent_id
                );
                roots.push(item);
            }
        }
    }

    let mut visited: HashSet<&str> = HashSet::with_capacity(sorted.len());
    let mut tree = Vec::with_capacity(roots.len());

    for root in roots {
        if let Some(node) = build_subtree(root, 0, Vec::new(), &children_of, &mut visited) {
            tree.push(node);
        }
    }

    if visited.len() < known.len() {
        for &item in &sorted {
            if visited.contains(item.id.as_str()) {
                continue;
            }
            tracing::warn!(
                "Item '{}' is part of a parent cycle; placing at root",
                item.id
            );
            if let Some(node) = build_subtree(item, 0, Vec::new(), &children_of, &mut visited) {
                tree.push(node);
            }
        }
    }

    tree
}

fn build_subtree<'a>(
    item: &'a Item,
    depth: usize,
    path: Vec<String>,
    children_of: &HashMap<&str, Vec<&'a Item>>,
    visited: &mut HashSet<&'a str>,
) -> Option<TreeNode> {
    if !visited.insert(item.id.as_str()) {
        return None;
    }

    let mut node = TreeNode::new(item.clone(), depth, path);

    if let Some(children) = children_of.get(item.id.as_str()) {
        for child in children {
            let mut child_path = node.path.clone();
            child_path.push(item.id.clone());
            if let Some(child_node) =
                build_subtree(child, depth + 1, child_path, children_of, visited)
            {
                node.push_child(child_node);
            }
        }
    }

    Some(node)
}

/// Pre-order flatten back into plain items, dropping the tree decorations.
///
/// `flatten_tree(&build_tree(items))` contains every input item exactly once.
pub fn flatten_tree(nodes: &[TreeNode]) -> Vec<Item> {
    let mut result = Vec::new();
    collect_items(nodes, &mut result);
    result
}

fn collect_items(nodes: &[TreeNode], out: &mut Vec<Item>) {
    for node in nodes {
        out.push(node.item.clone());
        collect_items(&node.children, out);
    }
}

/// Pre-order flatten keeping the decorated nodes (borrowed)
pub fn flatten_nodes(nodes: &[TreeNode]) -> Vec<&TreeNode> {
    let mut result = Vec::new();
    collect_nodes(nodes, &mut result);
    result
}

fn collect_nodes<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a TreeNode>) {
    for node in nodes {
        out.push(node);
        collect_nodes(&node.children, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, parent: Option<&str>, order: u32) -> Item {
        Item::with_id(id, id.to_uppercase())
            .with_parent(parent.map(str::to_string))
            .with_order_index(order)
    }

    fn ids(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_build_tree_nests_and_orders_children() {
        let items = vec![
            item("c2", Some("root"), 1),
            item("root", None, 0),
            item("c1", Some("root"), 0),
            item("g1", Some("c1"), 0),
        ];

        let tree = build_tree(&items);
        assert_eq!(tree.len(), 1);

        let root = &tree[0];
        assert_eq!(root.id(), "root");
        assert!(root.has_children);
        assert_eq!(root.children[0].id(), "c1");
        assert_eq!(root.children[1].id(), "c2");

        let grandchild = &root.children[0].children[0];
        assert_eq!(grandchild.depth, 2);
        assert_eq!(grandchild.path, vec!["root".to_string(), "c1".to_string()]);
        assert!(!grandchild.has_children);
    }

    #[test]
    fn test_child_listed_before_parent_still_gets_depth() {
        // The child sorts ahead of its parent by order_index
        let items = vec![
            item("parent", Some("top"), 5),
            item("top", None, 9),
            item("kid", Some("parent"), 0),
        ];

        let tree = build_tree(&items);
        let kid = &tree[0].children[0].children[0];
        assert_eq!(kid.id(), "kid");
        assert_eq!(kid.depth, 2);
        assert_eq!(kid.path, vec!["top".to_string(), "parent".to_string()]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let items = vec![item("a", None, 0), item("orphan", Some("gone"), 1)];
        let tree = build_tree(&items);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[1].id(), "orphan");
        assert_eq!(tree[1].depth, 0);
        assert!(tree[1].path.is_empty());
    }

    #[test]
    fn test_cycle_members_still_appear_once() {
        let items = vec![
            item("a", Some("b"), 0),
            item("b", Some("a"), 1),
            item("c", None, 0),
        ];

        let flat = flatten_tree(&build_tree(&items));
        let mut seen = ids(&flat);
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_round_trip_preserves_ids_and_parents() {
        let items = vec![
            item("r1", None, 0),
            item("r2", None, 1),
            item("a", Some("r1"), 0),
            item("b", Some("r1"), 1),
            item("x", Some("a"), 0),
            item("y", Some("r2"), 0),
        ];

        let flat = flatten_tree(&build_tree(&items));
        assert_eq!(ids(&flat), vec!["r1", "a", "x", "b", "r2", "y"]);

        for original in &items {
            let restored = flat.iter().find(|i| i.id == original.id).unwrap();
            assert_eq!(restored, original);
        }

        assert_eq!(build_tree(&flat), build_tree(&items));
    }

    #[test]
    fn test_flatten_nodes_is_preorder() {
        let items = vec![item("r", None, 0), item("a", Some("r"), 0), item("b", None, 1)];
        let tree = build_tree(&items);
        let order: Vec<&str> = flatten_nodes(&tree).iter().map(|n| n.id()).collect();
        assert_eq!(order, vec!["r", "a", "b"]);
    }
}
