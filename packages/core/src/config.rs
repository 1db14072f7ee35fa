/// Runtime configuration for CanonCore services
use crate::db::MemoryStore;
use crate::models::Item;
use crate::services::{common_searches, InMemoryQueryCache, SearchConfig, SelectionManager};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub const ENV_MAX_SELECTION: &str = "CANONCORE_MAX_SELECTION";
pub const ENV_EVENT_CAPACITY: &str = "CANONCORE_EVENT_CAPACITY";
pub const ENV_CACHE_TTL_SECS: &str = "CANONCORE_CACHE_TTL_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Selection cap; `None` for unlimited
    pub max_selection: Option<usize>,

    /// Capacity of the store's domain event channel
    pub event_channel_capacity: usize,

    /// Time-to-live of query cache entries, in seconds
    pub cache_ttl_secs: u64,

    /// Defaults for the title/description search preset
    pub search_case_sensitive: bool,
    pub search_exact_match: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_selection: None,
            event_channel_capacity: 128,
            cache_ttl_secs: 60,
            search_case_sensitive: false,
            search_exact_match: false,
        }
    }
}

impl CoreConfig {
    /// Defaults overridden by `CANONCORE_*` environment variables.
    ///
    /// Values that fail to parse are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CoreConfig::from_env`] with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(max) = parse_var(&lookup, ENV_MAX_SELECTION) {
            config.max_selection = Some(max);
        }
        if let Some(capacity) = parse_var(&lookup, ENV_EVENT_CAPACITY) {
            config.event_channel_capacity = capacity;
        }
        if let Some(ttl) = parse_var(&lookup, ENV_CACHE_TTL_SECS) {
            config.cache_ttl_secs = ttl;
        }

        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_selection == Some(0) {
            return Err("max_selection must be greater than 0 when set".to_string());
        }

        if self.event_channel_capacity == 0 {
            return Err("event_channel_capacity must be greater than 0".to_string());
        }

        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Title and description search with the configured matching flags
    pub fn search_config(&self) -> SearchConfig {
        common_searches::title_and_description()
            .with_case_sensitive(self.search_case_sensitive)
            .with_exact_match(self.search_exact_match)
    }

    pub fn memory_store(&self) -> MemoryStore {
        MemoryStore::with_event_capacity(self.event_channel_capacity)
    }

    pub fn query_cache(&self) -> InMemoryQueryCache {
        InMemoryQueryCache::with_ttl(self.cache_ttl())
    }

    pub fn selection_manager(&self, items: Vec<Item>) -> SelectionManager {
        SelectionManager::new(items).with_max_selection(self.max_selection)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}
