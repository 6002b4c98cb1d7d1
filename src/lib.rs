//! Waypoint Graph - 2D waypoint graphs with shortest-path routing
//!
//! Operators place named waypoints on a map image, connect them into an
//! undirected graph weighted by Euclidean distance, and ask for the shortest
//! route between two waypoints. The crate covers the graph store, nearest
//! waypoint lookup, the two-click connect protocol, A* routing, persistence,
//! GeoJSON import and projection of the graph into drawing instructions.
#![warn(missing_docs)]

// Core foundational modules
pub mod core;

// Main functional modules
pub mod graph;
pub mod render;
pub mod session;
pub mod storage;

// Re-export commonly used items for convenience
pub use crate::core::{Config, Error, GraphError, GraphResult, NodeId, Point, Result};
pub use graph::{GraphStore, Route};
pub use session::Session;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Install logging for `config`
pub fn init(config: &Config) -> Result<()> {
    crate::core::logging::init_logging(&config.logging)?;
    tracing::info!("Initializing {} v{}", NAME, VERSION);
    Ok(())
}
