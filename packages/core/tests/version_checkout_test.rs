//! Version Checkout Tests
//!
//! Commit / checkout / live-sync behaviour of universe versions, driven
//! through `ContentService` so the snapshot sync side effects are included.

#[cfg(test)]
mod version_checkout_tests {
    use anyhow::Result;
    use canoncore_core::db::{ItemStore, MemoryStore, VersionStore};
    use canoncore_core::models::{Item, NewItem};
    use canoncore_core::services::{ContentService, InMemoryQueryCache};
    use std::sync::Arc;

    const UNIVERSE: &str = "universe-1";

    fn new_item(id: &str) -> NewItem {
        NewItem {
            id: Some(id.to_string()),
            title: id.to_uppercase(),
            ..Default::default()
        }
    }

    fn setup() -> (Arc<MemoryStore>, ContentService) {
        let store = Arc::new(MemoryStore::new());
        let content = ContentService::new(UNIVERSE, store.clone(), store.clone())
            .with_cache(Arc::new(InMemoryQueryCache::new()));
        (store, content)
    }

    async fn ids(content: &ContentService) -> Result<Vec<String>> {
        let mut ids: Vec<String> = content
            .list_items()
            .await?
            .into_iter()
            .map(|item| item.id)
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Items added while a version is current land in that version's live
    /// snapshot, so checking the same version out again keeps them
    #[tokio::test]
    async fn test_current_version_absorbs_items_added_after_commit() -> Result<()> {
        let (_, content) = setup();
        let versions = content.versions();

        content.create_item(new_item("p")).await?;
        content.create_item(new_item("q")).await?;
        let v1 = versions.commit_version(UNIVERSE, None).await?;
        content.create_item(new_item("r")).await?;

        versions.checkout(UNIVERSE, &v1.id).await?;
        assert_eq!(ids(&content).await?, vec!["p", "q", "r"]);

        let snapshot = versions.snapshot(&v1.id).await?.expect("v1 snapshot");
        assert_eq!(snapshot.items()?.len(), 3);
        Ok(())
    }

    /// Only a version that was not current during the edits stays frozen
    #[tokio::test]
    async fn test_checkout_of_other_version_discards_later_items() -> Result<()> {
        let (_, content) = setup();
        let versions = content.versions();

        content.create_item(new_item("p")).await?;
        content.create_item(new_item("q")).await?;
        let v1 = versions.commit_version(UNIVERSE, Some("first".into())).await?;
        let v2 = versions.commit_version(UNIVERSE, None).await?;

        versions.checkout(UNIVERSE, &v1.id).await?;
        content.create_item(new_item("r")).await?;
        assert_eq!(ids(&content).await?, vec!["p", "q", "r"]);

        versions.checkout(UNIVERSE, &v2.id).await?;
        assert_eq!(ids(&content).await?, vec!["p", "q"]);

        let current = versions.current_version(UNIVERSE).await?.map(|v| v.id);
        assert_eq!(current, Some(v2.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_is_full_replace() -> Result<()> {
        let (store, content) = setup();
        content.create_item(new_item("p")).await?;
        content.create_item(new_item("q")).await?;
        let v1 = content.versions().commit_version(UNIVERSE, None).await?;

        // Written straight to the store, so the v1 snapshot never sees it
        store
            .insert_item(UNIVERSE, Item::with_id("r", "R"))
            .await?;

        let restored = content.versions().checkout(UNIVERSE, &v1.id).await?;
        assert_eq!(restored, 2);
        assert_eq!(ids(&content).await?, vec!["p", "q"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_current_snapshot_follows_mutations() -> Result<()> {
        let (_, content) = setup();
        let versions = content.versions();

        content.create_item(new_item("p")).await?;
        let v1 = versions.commit_version(UNIVERSE, None).await?;
        content.create_item(new_item("q")).await?;
        let v2 = versions.commit_version(UNIVERSE, None).await?;
        content.create_item(new_item("r")).await?;

        let frozen = versions.snapshot(&v1.id).await?.expect("v1 snapshot");
        let live = versions.snapshot(&v2.id).await?.expect("v2 snapshot");
        assert_eq!(frozen.items()?.len(), 1);
        assert_eq!(live.items()?.len(), 3);

        content.delete_item("p").await?;
        let live = versions.snapshot(&v2.id).await?.expect("v2 snapshot");
        assert_eq!(live.items()?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_round_trips_items_verbatim() -> Result<()> {
        let (store, content) = setup();
        let mut item = new_item("p");
        item.description = Some("kept".into());
        item.properties
            .insert("era".into(), serde_json::json!({"start": 1963}));
        let created = content.create_item(item).await?;

        let v1 = content.versions().commit_version(UNIVERSE, None).await?;
        store.delete_all_items(UNIVERSE).await?;
        content.versions().checkout(UNIVERSE, &v1.id).await?;

        assert_eq!(store.get_item(UNIVERSE, "p").await?, Some(created));
        Ok(())
    }

    #[tokio::test]
    async fn test_only_one_current_version() -> Result<()> {
        let (store, content) = setup();
        let versions = content.versions();
        content.create_item(new_item("p")).await?;

        let v1 = versions.commit_version(UNIVERSE, None).await?;
        versions.commit_version(UNIVERSE, None).await?;
        versions.commit_version(UNIVERSE, None).await?;
        versions.checkout(UNIVERSE, &v1.id).await?;

        let current: Vec<String> = store
            .list_versions(UNIVERSE)
            .await?
            .into_iter()
            .filter(|version| version.is_current)
            .map(|version| version.version_name)
            .collect();
        assert_eq!(current, vec!["v1"]);
        Ok(())
    }
}
