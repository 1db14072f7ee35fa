//! Local (non-persisted) re-parenting of an item within a flat list.

use crate::models::Item;

/// Siblings under `parent_id` in ascending `order_index`, ties in input order,
/// leaving out `exclude_id`
pub fn sibling_group<'a>(
    items: &'a [Item],
    parent_id: Option<&str>,
    exclude_id: Option<&str>,
) -> Vec<&'a Item> {
    let mut siblings: Vec<&Item> = items
        .iter()
        .filter(|item| item.parent_id.as_deref() == parent_id)
        .filter(|item| Some(item.id.as_str()) != exclude_id)
        .collect();
    siblings.sort_by_key(|item| item.order_index);
    siblings
}

/// Return a new list with `node_id` placed under `new_parent_id`.
///
/// With `new_index`, the node takes that `order_index` and its new siblings
/// are renumbered densely around the slot. Without it, only the parent
/// changes. An unknown `node_id` returns the list unchanged.
pub fn move_node(
    items: &[Item],
    node_id: &str,
    new_parent_id: Option<&str>,
    new_index: Option<u32>,
) -> Vec<Item> {
    let mut updated = items.to_vec();

    let Some(node_pos) = updated.iter().position(|item| item.id == node_id) else {
        tracing::debug!("move_node: item '{}' not found", node_id);
        return updated;
    };

    if let Some(new_index) = new_index {
        let sibling_ids: Vec<String> = sibling_group(items, new_parent_id, Some(node_id))
            .into_iter()
            .map(|item| item.id.clone())
            .collect();

        for (index, sibling_id) in sibling_ids.iter().enumerate() {
            let index = index as u32;
            let adjusted = if index >= new_index { index + 1 } else { index };
            if let Some(sibling) = updated.iter_mut().find(|item| item.id == *sibling_id) {
                sibling.order_index = adjusted;
            }
        }

        updated[node_pos].order_index = new_index;
    }

    updated[node_pos].parent_id = new_parent_id.map(str::to_string);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, parent: Option<&str>, order: u32) -> Item {
        Item::with_id(id, id)
            .with_parent(parent.map(str::to_string))
            .with_order_index(order)
    }

    fn order_of(items: &[Item], id: &str) -> u32 {
        items.iter().find(|i| i.id == id).unwrap().order_index
    }

    #[test]
    fn test_move_into_slot_shifts_siblings() {
        let items = vec![
            item("p", None, 0),
            item("a", Some("p"), 0),
            item("b", Some("p"), 1),
            item("x", None, 1),
        ];

        let moved = move_node(&items, "x", Some("p"), Some(1));

        let x = moved.iter().find(|i| i.id == "x").unwrap();
        assert_eq!(x.parent_id.as_deref(), Some("p"));
        assert_eq!(x.order_index, 1);
        assert_eq!(order_of(&moved, "a"), 0);
        assert_eq!(order_of(&moved, "b"), 2);
        // Input is untouched
        assert_eq!(order_of(&items, "b"), 1);
    }

    #[test]
    fn test_move_without_index_keeps_order() {
        let items = vec![item("p", None, 0), item("x", None, 4)];
        let moved = move_node(&items, "x", Some("p"), None);
        assert_eq!(order_of(&moved, "x"), 4);
        assert_eq!(moved[1].parent_id.as_deref(), Some("p"));
    }

    #[test]
    fn test_unknown_node_is_noop() {
        let items = vec![item("a", None, 0)];
        assert_eq!(move_node(&items, "zzz", None, Some(0)), items);
    }

    #[test]
    fn test_sibling_group_sorted_and_excluding() {
        let items = vec![item("b", None, 2), item("a", None, 0), item("c", None, 1)];
        let ids: Vec<&str> = sibling_group(&items, None, Some("c"))
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
