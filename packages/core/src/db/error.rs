//! Store Error Types
//!
//! Errors raised by store implementations. The store traits return
//! `anyhow::Result`, so these travel as the root cause of an `anyhow::Error`
//! and can be recovered with `downcast_ref::<StoreError>()`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No item with this id in the universe
    #[error("Item not found: {id}")]
    ItemNotFound { id: String },

    /// An item with this id already exists in the universe
    #[error("Item already exists: {id}")]
    DuplicateItem { id: String },

    #[error("Version not found: {id}")]
    VersionNotFound { id: String },

    /// A reorder batch referenced items that are not stored; nothing was applied
    #[error("Reorder batch rejected: {0}")]
    BatchRejected(String),
}

impl StoreError {
    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound { id: id.into() }
    }

    pub fn duplicate_item(id: impl Into<String>) -> Self {
        Self::DuplicateItem { id: id.into() }
    }

    pub fn version_not_found(id: impl Into<String>) -> Self {
        Self::VersionNotFound { id: id.into() }
    }

    pub fn batch_rejected(msg: impl Into<String>) -> Self {
        Self::BatchRejected(msg.into())
    }
}
