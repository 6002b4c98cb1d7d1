//! Graph data structures and operations
//!
//! This module contains the waypoint graph itself plus everything that reads
//! or edits it: nearest-node lookup, the two-click connect protocol and A*
//! routing.

pub mod delta;
pub mod edge;
pub mod locator;
pub mod node;
pub mod pathfinding;
pub mod selection;
pub mod store;

// Re-export main graph types
pub use delta::GraphEvent;
pub use edge::{Edge, EdgeKey};
pub use locator::{nearest, nearest_node};
pub use node::Node;
pub use pathfinding::{find_path, route_from_point, PathFinder, Route, SearchLimits};
pub use selection::{ConnectSelection, SelectionOutcome};
pub use store::{GraphStore, SharedGraph};
