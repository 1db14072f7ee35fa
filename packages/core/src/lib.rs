//! CanonCore Hierarchy Core
//!
//! This crate provides the tree model, ordering, selection and versioning
//! logic behind CanonCore's nested content (universes holding items holding
//! items).
//!
//! # Architecture
//!
//! - **Flat storage, derived trees**: items persist flat with `parent_id` and
//!   `order_index`; trees are rebuilt on demand and never stored
//! - **Dense sibling order**: every reorder renumbers affected sibling groups
//!   to `0..n-1`
//! - **Injected persistence**: engines commit through async traits, so any
//!   store can sit behind them
//! - **Live current snapshot**: the current version's snapshot follows every
//!   content mutation
//!
//! # Modules
//!
//! - [`models`] - Data structures (Item, TreeNode, UniverseVersion, etc.)
//! - [`tree`] - Pure tree building, navigation, expansion and local moves
//! - [`services`] - Selection, list pipeline, reorder, bulk and version services
//! - [`db`] - Persistence traits and the in-memory store
//! - [`config`] - Runtime configuration
//! - [`logging`] - Tracing bootstrap

pub mod config;
pub mod db;
pub mod logging;
pub mod models;
pub mod services;
pub mod tree;

// Re-export commonly used types
pub use config::CoreConfig;
pub use db::{ItemStore, MemoryStore, VersionStore};
pub use models::*;
pub use services::*;
pub use tree::*;
