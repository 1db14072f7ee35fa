//! Bulk Operation Tests
//!
//! Partial-failure deletes and cycle-safe moves against a real store. Deletes
//! go through a fault-injecting wrapper around `ContentService` so the store
//! can be inspected after a mixed outcome.

#[cfg(test)]
mod bulk_operations_tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use canoncore_core::db::{ItemStore, MemoryStore};
    use canoncore_core::models::{Item, NewItem, ReorderUpdate};
    use canoncore_core::services::{
        get_available_destinations, statistics, validate_destination, BulkOperations,
        ContentService, DeleteCommit, ReorderCommit,
    };
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    const UNIVERSE: &str = "universe-1";

    /// Forwards to `ContentService` except for ids listed in `fail_on`
    struct FaultyCommit {
        inner: ContentService,
        fail_on: HashSet<String>,
    }

    #[async_trait]
    impl DeleteCommit for FaultyCommit {
        async fn on_delete(&self, item_id: &str) -> Result<()> {
            if self.fail_on.contains(item_id) {
                anyhow::bail!("permission denied for {}", item_id);
            }
            self.inner.on_delete(item_id).await
        }
    }

    #[async_trait]
    impl ReorderCommit for FaultyCommit {
        async fn on_reorder(&self, updates: Vec<ReorderUpdate>) -> Result<()> {
            self.inner.on_reorder(updates).await
        }
    }

    async fn setup(
        layout: &[(&str, Option<&str>)],
        fail_on: &[&str],
    ) -> Result<(Arc<MemoryStore>, ContentService, BulkOperations)> {
        let store = Arc::new(MemoryStore::new());
        let content = ContentService::new(UNIVERSE, store.clone(), store.clone());
        for (id, parent) in layout {
            content
                .create_item(NewItem {
                    id: Some(id.to_string()),
                    title: format!("Item {}", id),
                    parent_id: parent.map(str::to_string),
                    ..Default::default()
                })
                .await?;
        }

        let commit = Arc::new(FaultyCommit {
            inner: content.clone(),
            fail_on: fail_on.iter().map(|id| id.to_string()).collect(),
        });
        let bulk = BulkOperations::new(commit.clone(), commit);
        Ok((store, content, bulk))
    }

    fn pick(items: &[Item], ids: &[&str]) -> Vec<Item> {
        ids.iter()
            .filter_map(|id| items.iter().find(|item| item.id == *id))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_partial_delete_failure() -> Result<()> {
        let ids = ["i1", "i2", "i3", "i4", "i5"];
        let layout: Vec<(&str, Option<&str>)> = ids.iter().map(|id| (*id, None)).collect();
        let (store, content, bulk) = setup(&layout, &["i3"]).await?;

        let selected = pick(&content.list_items().await?, &ids);
        let progress = Arc::new(Mutex::new(Vec::new()));
        let sink = progress.clone();
        let result = bulk
            .delete_items_with_progress(&selected, move |p| {
                sink.lock().unwrap().push(p.completed);
            })
            .await;

        assert!(!result.success);
        assert_eq!(result.success_count, 4);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.errors[0].item_id, "i3");
        assert_eq!(result.errors[0].item_title, "Item i3");
        assert!(result.errors[0].error.contains("permission denied"));
        assert_eq!(*progress.lock().unwrap(), vec![1, 2, 3, 4, 5]);

        for id in ["i1", "i2", "i4", "i5"] {
            assert!(store.get_item(UNIVERSE, id).await?.is_none(), "{} survived", id);
        }
        assert!(store.get_item(UNIVERSE, "i3").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_descendants_are_never_destinations() -> Result<()> {
        let (_, content, bulk) = setup(
            &[("x", None), ("y", Some("x")), ("z", Some("y")), ("w", None)],
            &[],
        )
        .await?;
        let items = content.list_items().await?;
        let selected = pick(&items, &["x"]);

        let destinations: Vec<String> = get_available_destinations(&selected, &items)
            .into_iter()
            .map(|item| item.id)
            .collect();
        assert_eq!(destinations, vec!["w"]);

        for target in ["x", "y", "z"] {
            assert!(!validate_destination(target, &selected, &items).valid);
        }
        let validation = validate_destination("z", &selected, &items);
        assert_eq!(
            validation.error.as_deref(),
            Some("Cannot move items into their own descendants")
        );

        let result = bulk.move_items(&selected, &items, "y").await;
        assert!(!result.success);
        assert_eq!(content.get_item("x").await?.parent_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_move_appends_after_existing_children() -> Result<()> {
        let (_, content, bulk) = setup(
            &[("p", None), ("p1", Some("p")), ("a", None), ("b", None)],
            &[],
        )
        .await?;
        let items = content.list_items().await?;
        let selected = pick(&items, &["b", "a"]);

        let result = bulk.move_items(&selected, &items, "p").await;
        assert!(result.success);
        assert_eq!(result.success_count, 2);

        let b = content.get_item("b").await?;
        let a = content.get_item("a").await?;
        assert_eq!((b.parent_id.as_deref(), b.order_index), (Some("p"), 1));
        assert_eq!((a.parent_id.as_deref(), a.order_index), (Some("p"), 2));
        Ok(())
    }

    #[tokio::test]
    async fn test_statistics_count_descendants_once() -> Result<()> {
        let (_, content, _) = setup(
            &[("x", None), ("y", Some("x")), ("z", Some("y")), ("w", None)],
            &[],
        )
        .await?;
        let items = content.list_items().await?;

        let stats = statistics(&pick(&items, &["x", "y", "w"]), &items);
        assert_eq!(stats.selected_count, 3);
        assert_eq!(stats.total_affected_count, 4);
        assert!(stats.has_nested_items);
        assert_eq!(stats.direct_children_count, 1);
        Ok(())
    }
}
