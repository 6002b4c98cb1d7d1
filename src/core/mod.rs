//! Core system types and foundations
//!
//! This module contains the fundamental building blocks of the waypoint graph:
//! identifiers and geometry, error handling, configuration and logging.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used items
pub use config::{load_config_or_default, Config, GraphFormat};
pub use error::{CodecError, Error, GraphError, GraphResult, Result};
pub use types::{distance, NodeId, Point};
