//! Service Layer Error Types
//!
//! Errors surfaced by the orchestration services. Validation problems are not
//! errors (they come back as `ValidationResult`), and neither is partial
//! failure of a bulk operation.

use crate::db::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreServiceError {
    /// Item not found by ID
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    #[error("Version not found: {id}")]
    VersionNotFound { id: String },

    /// A version exists but has no snapshot to check out
    #[error("Snapshot not found for version: {version_id}")]
    SnapshotNotFound { version_id: String },

    /// Destination rejected before anything was committed
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Injected commit or store call failed
    #[error("Commit failed: {context}")]
    CommitFailed { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Any other store failure
    #[error("Store operation failed: {0}")]
    Store(anyhow::Error),
}

impl CoreServiceError {
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    pub fn version_not_found(id: impl Into<String>) -> Self {
        Self::VersionNotFound { id: id.into() }
    }

    pub fn snapshot_not_found(version_id: impl Into<String>) -> Self {
        Self::SnapshotNotFound {
            version_id: version_id.into(),
        }
    }

    pub fn invalid_destination(msg: impl Into<String>) -> Self {
        Self::InvalidDestination(msg.into())
    }

    pub fn commit_failed(context: impl Into<String>) -> Self {
        Self::CommitFailed {
            context: context.into(),
        }
    }

    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }
}

/// Well-known store failures keep their meaning; anything else is wrapped
impl From<anyhow::Error> for CoreServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::ItemNotFound { id }) => Self::item_not_found(id.clone()),
            Some(StoreError::VersionNotFound { id }) => Self::version_not_found(id.clone()),
            _ => Self::Store(err),
        }
    }
}

impl From<serde_json::Error> for CoreServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization_error(err.to_string())
    }
}
