//! Graph node implementation

use crate::core::types::{NodeId, Point};
use serde::{Deserialize, Serialize};

/// Waypoint placed on the reference image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node identifier
    pub id: NodeId,
    /// Fixed position in image pixel coordinates
    pub position: Point,
    /// Display name, if the waypoint was imported with one
    pub label: Option<String>,
}

impl Node {
    /// Create a new unlabelled node
    pub fn new(id: NodeId, position: Point) -> Self {
        Self {
            id,
            position,
            label: None,
        }
    }

    /// Attach a display name
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Name shown to the operator: the label when present, otherwise the id
    pub fn display_name(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }
}
