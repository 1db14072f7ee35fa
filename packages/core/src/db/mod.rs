//! Persistence Layer
//!
//! This module holds the contracts the services persist through and an
//! in-memory implementation of them:
//!
//! - `ItemStore` / `VersionStore` - async persistence traits
//! - `MemoryStore` - process-local store emitting `DomainEvent`s
//! - `StoreError` - well-known store failures
//!
//! # Architecture
//!
//! The hierarchy logic treats storage as an opaque collaborator with plain
//! read/write/delete operations. Any backend (hosted tables, SQL, a remote
//! API) can sit behind the traits.

mod error;
pub mod events;
mod memory_store;
mod store;

pub use error::StoreError;
pub use events::DomainEvent;
pub use memory_store::{MemoryStore, DEFAULT_EVENT_CHANNEL_CAPACITY};
pub use store::{ItemStore, VersionStore};
