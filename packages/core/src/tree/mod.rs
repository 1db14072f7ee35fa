//! Hierarchy computations over flat item lists
//!
//! Everything here is synchronous and pure: functions take item slices or
//! built trees and return new values. Nothing touches persistence.
//!
//! # Architecture
//!
//! - `builder` - `build_tree` / `flatten_tree` between flat lists and forests
//! - `navigator` - `TreeNavigator` path index plus visibility and depth queries
//! - `expansion` - `ExpansionState` for collapsible views
//! - `moves` - local re-parenting with sibling shifting
//! - `placement` - trees built from multi-placement records

mod builder;
mod expansion;
mod moves;
mod navigator;
mod placement;

pub use builder::{build_tree, flatten_nodes, flatten_tree};
pub use expansion::ExpansionState;
pub use moves::{move_node, sibling_group};
pub use navigator::{
    get_leaf_nodes, get_max_depth, get_nodes_at_level, get_visible_nodes, is_ancestor,
    is_descendant, TreeNavigator,
};
pub use placement::{build_placement_tree, next_order_index, placement_counts};
