//! Version Snapshot / Checkout
//!
//! Named, numbered versions of a universe's items.
//!
//! # State machine
//!
//! - **Commit**: read items → insert version `v<max + 1>` → set it current →
//!   write its snapshot. The steps are not atomic and a failure part way is
//!   not compensated.
//! - **Checkout**: read snapshot → replace all items with it → set the
//!   version current. Items created after the snapshot are lost.
//! - **Delete**: when the current version is deleted and exactly one version
//!   remains, that version becomes current. Refusing to delete the last
//!   version is the caller's job.
//! - **Live sync**: after every content mutation the current version's
//!   snapshot is rewritten, so only non-current versions are frozen history.
//!
//! "Set current" is a single store call (`VersionStore::set_current_version`)
//! that clears the old flag and sets the new one together.

use crate::db::{ItemStore, VersionStore};
use crate::models::{Item, UniverseVersion, VersionSnapshot};
use crate::services::cache::{universe_prefix, QueryCache};
use crate::services::error::CoreServiceError;
use std::sync::Arc;

type ServiceResult<T> = Result<T, CoreServiceError>;

#[derive(Clone)]
pub struct VersionService {
    items: Arc<dyn ItemStore>,
    versions: Arc<dyn VersionStore>,
    cache: Option<Arc<dyn QueryCache>>,
}

impl VersionService {
    pub fn new(items: Arc<dyn ItemStore>, versions: Arc<dyn VersionStore>) -> Self {
        Self {
            items,
            versions,
            cache: None,
        }
    }

    /// Invalidate this cache whenever a checkout rewrites a universe
    pub fn with_cache(mut self, cache: Arc<dyn QueryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Versions newest first
    pub async fn list_versions(&self, universe_id: &str) -> ServiceResult<Vec<UniverseVersion>> {
        let mut versions = self.versions.list_versions(universe_id).await?;
        versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
        Ok(versions)
    }

    pub async fn current_version(
        &self,
        universe_id: &str,
    ) -> ServiceResult<Option<UniverseVersion>> {
        let versions = self.versions.list_versions(universe_id).await?;
        Ok(versions.into_iter().find(|version| version.is_current))
    }

    /// `max(version_number) + 1`, or 1 for a universe without versions
    pub async fn next_version_number(&self, universe_id: &str) -> ServiceResult<u32> {
        let versions = self.versions.list_versions(universe_id).await?;
        Ok(versions
            .iter()
            .map(|version| version.version_number + 1)
            .max()
            .unwrap_or(1))
    }

    pub async fn snapshot(&self, version_id: &str) -> ServiceResult<Option<VersionSnapshot>> {
        Ok(self.versions.read_snapshot(version_id).await?)
    }

    /// Items of a universe in `order_index` order, as captured in snapshots
    async fn current_items(&self, universe_id: &str) -> ServiceResult<Vec<Item>> {
        let mut items = self
            .items
            .list_items(universe_id)
            .await
            .map_err(|e| {
                CoreServiceError::query_failed(format!("Failed to read items: {:#}", e))
            })?;
        items.sort_by_key(|item| item.order_index);
        Ok(items)
    }

    /// Capture the current items as a new current version
    pub async fn commit_version(
        &self,
        universe_id: &str,
        commit_message: Option<String>,
    ) -> ServiceResult<UniverseVersion> {
        let items = self.current_items(universe_id).await?;
        self.commit_items(universe_id, &items, commit_message).await
    }

    async fn commit_items(
        &self,
        universe_id: &str,
        items: &[Item],
        commit_message: Option<String>,
    ) -> ServiceResult<UniverseVersion> {
        let number = self.next_version_number(universe_id).await?;
        let version = UniverseVersion::new(universe_id, number).with_commit_message(commit_message);
        let snapshot = VersionSnapshot::capture(&version.id, items)?;

        let version = self.versions.insert_version(version).await?;
        self.versions
            .set_current_version(universe_id, &version.id)
            .await?;
        if let Err(e) = self.versions.write_snapshot(snapshot).await {
            tracing::error!("Snapshot write for {} failed: {:#}", version.version_name, e);
            return Err(CoreServiceError::commit_failed(format!(
                "{} was recorded without a snapshot: {}",
                version.version_name, e
            )));
        }

        tracing::info!(
            "Committed {} of universe '{}' with {} items",
            version.version_name,
            universe_id,
            items.len()
        );
        Ok(version.with_current(true))
    }

    async fn version_in_universe(
        &self,
        universe_id: &str,
        version_id: &str,
    ) -> ServiceResult<UniverseVersion> {
        match self.versions.get_version(version_id).await? {
            Some(version) if version.universe_id == universe_id => Ok(version),
            _ => Err(CoreServiceError::version_not_found(version_id)),
        }
    }

    /// Snapshot items of a version, failing when either is missing
    async fn snapshot_items(&self, version_id: &str) -> ServiceResult<Vec<Item>> {
        let snapshot = self
            .versions
            .read_snapshot(version_id)
            .await?
            .ok_or_else(|| CoreServiceError::snapshot_not_found(version_id))?;
        Ok(snapshot.items()?)
    }

    async fn invalidate_cache(&self, universe_id: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_prefix(&universe_prefix(universe_id)).await;
        }
    }

    /// Replace the universe's items with a version's snapshot and make that
    /// version current. Returns the number of restored items.
    pub async fn checkout(&self, universe_id: &str, version_id: &str) -> ServiceResult<usize> {
        let version = self.version_in_universe(universe_id, version_id).await?;
        let items = self.snapshot_items(version_id).await?;
        let count = items.len();

        self.items.replace_items(universe_id, items).await?;
        self.invalidate_cache(universe_id).await;
        self.versions
            .set_current_version(universe_id, version_id)
            .await?;

        tracing::info!(
            "Checked out {} of universe '{}' ({} items)",
            version.version_name,
            universe_id,
            count
        );
        Ok(count)
    }

    /// Restore a version's items.
    ///
    /// With `create_new_version`, the restored state is committed as a new
    /// current version and returned. Otherwise the current version's snapshot
    /// is re-synced to the restored items.
    pub async fn restore(
        &self,
        universe_id: &str,
        version_id: &str,
        create_new_version: bool,
    ) -> ServiceResult<Option<UniverseVersion>> {
        let source = self.version_in_universe(universe_id, version_id).await?;
        let items = self.snapshot_items(version_id).await?;

        self.items.replace_items(universe_id, items.clone()).await?;
        self.invalidate_cache(universe_id).await;

        if create_new_version {
            let message = format!("Restored universe to version: {}", source.version_name);
            let version = self.commit_items(universe_id, &items, Some(message)).await?;
            Ok(Some(version))
        } else {
            self.sync_current_snapshot(universe_id).await?;
            Ok(None)
        }
    }

    /// Delete a version and its snapshot.
    ///
    /// If it was current and exactly one version is left, that one becomes
    /// current.
    pub async fn delete_version(&self, universe_id: &str, version_id: &str) -> ServiceResult<()> {
        let version = self.version_in_universe(universe_id, version_id).await?;
        self.versions.delete_version(version_id).await?;
        tracing::info!(
            "Deleted {} of universe '{}'",
            version.version_name,
            universe_id
        );

        if version.is_current {
            let remaining = self.versions.list_versions(universe_id).await?;
            if let [only] = remaining.as_slice() {
                self.versions
                    .set_current_version(universe_id, &only.id)
                    .await?;
                tracing::info!("Promoted {} to current", only.version_name);
            }
        }
        Ok(())
    }

    /// Rewrite the current version's snapshot from the live items.
    ///
    /// Returns `false` when the universe has no current version.
    pub async fn sync_current_snapshot(&self, universe_id: &str) -> ServiceResult<bool> {
        let Some(current) = self.current_version(universe_id).await? else {
            tracing::debug!("Universe '{}' has no current version to sync", universe_id);
            return Ok(false);
        };

        let items = self.current_items(universe_id).await?;
        let snapshot = VersionSnapshot::capture(&current.id, &items)?;
        self.versions.write_snapshot(snapshot).await?;

        tracing::debug!(
            "Synced snapshot of {} ({} items)",
            current.version_name,
            items.len()
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const U: &str = "universe-1";

    fn service() -> (Arc<MemoryStore>, VersionService) {
        let store = Arc::new(MemoryStore::new());
        let service = VersionService::new(store.clone(), store.clone());
        (store, service)
    }

    async fn seed(store: &MemoryStore, ids: &[&str]) {
        let items = ids
            .iter()
            .enumerate()
            .map(|(i, id)| Item::with_id(*id, *id).with_order_index(i as u32))
            .collect();
        store.insert_items(U, items).await.unwrap();
    }

    #[tokio::test]
    async fn test_commit_numbers_and_flags() {
        let (store, service) = service();
        seed(&store, &["p"]).await;

        let v1 = service.commit_version(U, None).await.unwrap();
        let v2 = service
            .commit_version(U, Some("second".into()))
            .await
            .unwrap();

        assert_eq!(v1.version_name, "v1");
        assert_eq!(v2.version_number, 2);
        assert!(v2.is_current);

        let listed = service.list_versions(U).await.unwrap();
        assert_eq!(listed[0].id, v2.id);
        assert!(!listed[1].is_current);
        assert_eq!(service.next_version_number(U).await.unwrap(), 3);
        assert_eq!(service.current_version(U).await.unwrap().unwrap().id, v2.id);
    }

    #[tokio::test]
    async fn test_checkout_missing_snapshot() {
        let (store, service) = service();
        let orphan = store.insert_version(UniverseVersion::new(U, 1)).await.unwrap();

        let err = service.checkout(U, &orphan.id).await.unwrap_err();
        assert!(matches!(err, CoreServiceError::SnapshotNotFound { .. }));

        let err = service.checkout(U, "nope").await.unwrap_err();
        assert!(matches!(err, CoreServiceError::VersionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_current_promotes_last_remaining() {
        let (store, service) = service();
        seed(&store, &["p"]).await;
        let v1 = service.commit_version(U, None).await.unwrap();
        let v2 = service.commit_version(U, None).await.unwrap();

        service.delete_version(U, &v2.id).await.unwrap();

        let current = service.current_version(U).await.unwrap().unwrap();
        assert_eq!(current.id, v1.id);
    }

    #[tokio::test]
    async fn test_delete_current_with_several_left_leaves_no_current() {
        let (store, service) = service();
        seed(&store, &["p"]).await;
        service.commit_version(U, None).await.unwrap();
        service.commit_version(U, None).await.unwrap();
        let v3 = service.commit_version(U, None).await.unwrap();

        service.delete_version(U, &v3.id).await.unwrap();
        assert!(service.current_version(U).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_with_new_version() {
        let (store, service) = service();
        seed(&store, &["p", "q"]).await;
        let v1 = service.commit_version(U, None).await.unwrap();
        store.delete_item(U, "q").await.unwrap();
        service.commit_version(U, None).await.unwrap();

        let restored = service.restore(U, &v1.id, true).await.unwrap().unwrap();

        assert_eq!(restored.version_name, "v3");
        assert_eq!(
            restored.commit_message.as_deref(),
            Some("Restored universe to version: v1")
        );
        assert_eq!(store.list_items(U).await.unwrap().len(), 2);

        let snapshot = service.snapshot(&restored.id).await.unwrap().unwrap();
        assert_eq!(snapshot.items().unwrap().len(), 2);
    }

    /// Version store whose snapshot writes always fail
    struct NoSnapshots(MemoryStore);

    #[async_trait::async_trait]
    impl VersionStore for NoSnapshots {
        async fn list_versions(&self, universe_id: &str) -> anyhow::Result<Vec<UniverseVersion>> {
            self.0.list_versions(universe_id).await
        }
        async fn get_version(&self, version_id: &str) -> anyhow::Result<Option<UniverseVersion>> {
            self.0.get_version(version_id).await
        }
        async fn insert_version(&self, version: UniverseVersion) -> anyhow::Result<UniverseVersion> {
            self.0.insert_version(version).await
        }
        async fn set_current_version(&self, universe_id: &str, version_id: &str) -> anyhow::Result<()> {
            self.0.set_current_version(universe_id, version_id).await
        }
        async fn delete_version(&self, version_id: &str) -> anyhow::Result<()> {
            self.0.delete_version(version_id).await
        }
        async fn read_snapshot(&self, version_id: &str) -> anyhow::Result<Option<VersionSnapshot>> {
            self.0.read_snapshot(version_id).await
        }
        async fn write_snapshot(&self, _snapshot: VersionSnapshot) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_leaves_version_behind() {
        let items = Arc::new(MemoryStore::new());
        let versions = Arc::new(NoSnapshots(MemoryStore::new()));
        let service = VersionService::new(items, versions);

        let err = service.commit_version(U, None).await.unwrap_err();
        assert!(matches!(err, CoreServiceError::CommitFailed { .. }));

        // No compensation: the record stays, current and without a snapshot
        let current = service.current_version(U).await.unwrap().unwrap();
        assert_eq!(current.version_name, "v1");
        assert!(service.snapshot(&current.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_without_current_version() {
        let (_, service) = service();
        assert!(!service.sync_current_snapshot(U).await.unwrap());
    }
}
