//! Version records and their snapshots.

use super::Item;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, numbered version of a universe.
///
/// At most one version per universe carries `is_current = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseVersion {
    pub id: String,
    pub universe_id: String,
    pub version_number: u32,
    pub version_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

impl UniverseVersion {
    /// New version named `v<number>`
    pub fn new(universe_id: impl Into<String>, version_number: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            universe_id: universe_id.into(),
            version_number,
            version_name: format!("v{}", version_number),
            commit_message: None,
            is_current: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_commit_message(mut self, message: Option<String>) -> Self {
        self.commit_message = message;
        self
    }

    pub fn with_current(mut self, is_current: bool) -> Self {
        self.is_current = is_current;
        self
    }
}

/// Verbatim serialized copy of a universe's items at capture time.
///
/// The snapshot attached to the current version is kept live (rewritten on
/// every content mutation); all other snapshots are historical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version_id: String,
    pub children_snapshot: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl VersionSnapshot {
    /// Serialize `items` into a snapshot for `version_id`
    pub fn capture(version_id: impl Into<String>, items: &[Item]) -> serde_json::Result<Self> {
        Ok(Self {
            version_id: version_id.into(),
            children_snapshot: serde_json::to_value(items)?,
            created_at: Utc::now(),
        })
    }

    /// Decode the captured items
    pub fn items(&self) -> serde_json::Result<Vec<Item>> {
        serde_json::from_value(self.children_snapshot.clone())
    }
}
