//! Reorder Integration Tests
//!
//! Drives the reorder engine end to end against `ContentService` over a
//! `MemoryStore`, checking that every touched sibling group ends up densely
//! numbered `0..n-1`.

#[cfg(test)]
mod reorder_integration_tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use canoncore_core::db::MemoryStore;
    use canoncore_core::models::{Item, NewItem, ReorderUpdate};
    use canoncore_core::services::{
        ContentService, DragOutcome, DropTarget, ReorderCommit, ReorderEngine,
    };
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    const UNIVERSE: &str = "universe-1";

    fn new_item(id: &str, parent_id: Option<&str>) -> NewItem {
        NewItem {
            id: Some(id.to_string()),
            title: id.to_uppercase(),
            parent_id: parent_id.map(str::to_string),
            ..Default::default()
        }
    }

    /// Helper building a content service seeded with `(id, parent)` pairs
    async fn seeded(layout: &[(&str, Option<&str>)]) -> Result<ContentService> {
        let store = Arc::new(MemoryStore::new());
        let content = ContentService::new(UNIVERSE, store.clone(), store);
        for (id, parent) in layout {
            content.create_item(new_item(id, *parent)).await?;
        }
        Ok(content)
    }

    fn assert_dense(items: &[Item]) {
        let mut groups: HashMap<Option<String>, BTreeSet<u32>> = HashMap::new();
        for item in items {
            let inserted = groups
                .entry(item.parent_id.clone())
                .or_default()
                .insert(item.order_index);
            assert!(inserted, "duplicate order_index {} in group", item.order_index);
        }
        for (parent, indices) in groups {
            let expected: BTreeSet<u32> = (0..indices.len() as u32).collect();
            assert_eq!(indices, expected, "group {:?} is not dense", parent);
        }
    }

    fn order_of(items: &[Item], parent: Option<&str>) -> Vec<String> {
        let mut group: Vec<&Item> = items
            .iter()
            .filter(|item| item.parent_id.as_deref() == parent)
            .collect();
        group.sort_by_key(|item| item.order_index);
        group.into_iter().map(|item| item.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_drop_between_siblings_scenario() -> Result<()> {
        let content = seeded(&[("a", None), ("b", None), ("c", None)]).await?;
        let engine = ReorderEngine::new(Arc::new(content.clone()));

        let items = content.list_items().await?;
        let outcome = engine
            .handle_drop_zone(&items, "c", Some("a-after-drop-zone"))
            .await;

        assert_eq!(
            outcome,
            DragOutcome::Committed(vec![
                ReorderUpdate::new("c", None, 1),
                ReorderUpdate::new("b", None, 2),
            ])
        );

        let items = content.list_items().await?;
        assert_eq!(order_of(&items, None), vec!["a", "c", "b"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_every_drop_keeps_groups_dense() -> Result<()> {
        let content = seeded(&[
            ("a", None),
            ("b", None),
            ("c", None),
            ("a1", Some("a")),
            ("a2", Some("a")),
            ("a3", Some("a")),
            ("b1", Some("b")),
        ])
        .await?;
        let engine = ReorderEngine::new(Arc::new(content.clone()));

        let drops = [
            ("a2", DropTarget::before("a1")),
            ("c", DropTarget::inside("b")),
            ("a3", DropTarget::after("b1")),
            ("b1", DropTarget::before("a")),
            ("a1", DropTarget::after("c")),
            ("b", DropTarget::inside("a")),
        ];

        for (active, target) in drops {
            let items = content.list_items().await?;
            let outcome = engine.handle_drag_end(&items, active, Some(&target)).await;
            assert!(
                outcome.is_committed(),
                "drop of {} on {} did not commit: {:?}",
                active,
                target.zone_id(),
                outcome
            );
            assert_dense(&content.list_items().await?);
        }

        let items = content.list_items().await?;
        assert_eq!(order_of(&items, Some("b")), vec!["a3", "c", "a1"]);
        assert_eq!(order_of(&items, Some("a")), vec!["a2", "b"]);
        assert_eq!(order_of(&items, None), vec!["b1", "a"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_drop_into_own_descendant_is_noop() -> Result<()> {
        let content = seeded(&[("a", None), ("a1", Some("a"))]).await?;
        let engine = ReorderEngine::new(Arc::new(content.clone()));

        let items = content.list_items().await?;
        let outcome = engine
            .handle_drag_end(&items, "a", Some(&DropTarget::inside("a1")))
            .await;

        assert_eq!(outcome, DragOutcome::NoOp);
        assert_eq!(content.list_items().await?, items);
        Ok(())
    }

    struct RejectingCommit;

    #[async_trait]
    impl ReorderCommit for RejectingCommit {
        async fn on_reorder(&self, _updates: Vec<ReorderUpdate>) -> Result<()> {
            anyhow::bail!("store offline")
        }
    }

    #[tokio::test]
    async fn test_failed_commit_reports_whole_batch() -> Result<()> {
        let content = seeded(&[("a", None), ("b", None)]).await?;
        let engine = ReorderEngine::new(Arc::new(RejectingCommit));

        let items = content.list_items().await?;
        let outcome = engine
            .handle_drag_end(&items, "b", Some(&DropTarget::before("a")))
            .await;

        match outcome {
            DragOutcome::Failed { updates, error } => {
                assert_eq!(updates.len(), 2);
                assert!(error.contains("store offline"));
            }
            other => panic!("Expected Failed outcome, got {:?}", other),
        }
        assert_eq!(order_of(&content.list_items().await?, None), vec!["a", "b"]);
        Ok(())
    }
}
