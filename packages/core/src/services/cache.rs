//! Injected Query Cache
//!
//! Services that read item lists can be handed a [`QueryCache`] to avoid
//! re-reading the store on every render. The hierarchy functions themselves
//! stay cache-agnostic; only the orchestration layer (`ContentService`) reads
//! and invalidates.
//!
//! # Cache Invalidation
//!
//! - **Time-based**: entries older than the TTL are treated as misses
//! - **Event-driven**: every content mutation invalidates its universe's keys
//!
//! Values are stored as JSON so one cache can hold any query shape.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Key-value cache keyed by query name
#[async_trait]
pub trait QueryCache: Send + Sync {
    /// `None` on miss or expiry
    async fn get(&self, key: &str) -> Option<Value>;

    async fn set(&self, key: &str, value: Value);

    async fn invalidate(&self, key: &str);

    /// Drop every key starting with `prefix`
    async fn invalidate_prefix(&self, prefix: &str);
}

/// Cache key for a universe's item list
pub fn items_key(universe_id: &str) -> String {
    format!("{}items", universe_prefix(universe_id))
}

/// Cache key prefix covering every query about a universe
pub fn universe_prefix(universe_id: &str) -> String {
    format!("universe:{}:", universe_id)
}

/// TTL-bounded in-process cache
pub struct InMemoryQueryCache {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
    ttl: Duration,
}

impl Default for InMemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueryCache {
    /// Cache with a 60 second TTL
    pub fn new() -> Self {
        Self::with_ttl(Duration::from_secs(60))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of stored entries, including expired ones not yet pruned
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, stored_at)) if stored_at.elapsed() <= self.ttl => {
                    return Some(value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Re-check under the write lock, a concurrent set may have refreshed it
        let mut entries = self.entries.write().await;
        if let Some((value, stored_at)) = entries.get(key) {
            if stored_at.elapsed() <= self.ttl {
                return Some(value.clone());
            }
            entries.remove(key);
            tracing::debug!("Cache entry '{}' expired", key);
        }
        None
    }

    async fn set(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, (_, stored_at)| stored_at.elapsed() <= ttl);
        entries.insert(key.to_string(), (value, Instant::now()));
    }

    async fn invalidate(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    async fn invalidate_prefix(&self, prefix: &str) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        tracing::debug!(
            "Invalidated {} cache entries under '{}'",
            before - entries.len(),
            prefix
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let cache = InMemoryQueryCache::new();
        cache.set("items:u1", json!([1, 2])).await;

        assert_eq!(cache.get("items:u1").await, Some(json!([1, 2])));
        assert_eq!(cache.get("items:u2").await, None);

        cache.invalidate("items:u1").await;
        assert!(cache.get("items:u1").await.is_none());
    }

    #[tokio::test]
    async fn test_invalidate_prefix_only_touches_matching_keys() {
        let cache = InMemoryQueryCache::new();
        cache.set(&items_key("u1"), json!(1)).await;
        cache.set("universe:u1:tree", json!(2)).await;
        cache.set("universe:u10:items", json!(4)).await;
        cache.set(&items_key("u2"), json!(3)).await;

        cache.invalidate_prefix(&universe_prefix("u1")).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&items_key("u2")).await, Some(json!(3)));
    }

    #[test]
    fn test_expired_entries_miss() {
        let cache = InMemoryQueryCache::with_ttl(Duration::from_millis(10));
        tokio_test::block_on(cache.set("k", json!("v")));
        std::thread::sleep(Duration::from_millis(30));

        assert_eq!(tokio_test::block_on(cache.len()), 1);
        assert!(tokio_test::block_on(cache.get("k")).is_none());
        assert!(tokio_test::block_on(cache.is_empty()));
    }

    #[test]
    fn test_set_prunes_expired_entries() {
        let cache = InMemoryQueryCache::with_ttl(Duration::from_millis(10));
        tokio_test::block_on(cache.set("old-1", json!(1)));
        tokio_test::block_on(cache.set("old-2", json!(2)));
        std::thread::sleep(Duration::from_millis(30));

        tokio_test::block_on(cache.set("fresh", json!(3)));
        assert_eq!(tokio_test::block_on(cache.len()), 1);
        assert_eq!(tokio_test::block_on(cache.get("fresh")), Some(json!(3)));
    }
}
