//! Graph edge implementation

use crate::core::types::NodeId;
use serde::{Deserialize, Serialize};

/// Unordered pair of distinct node ids
///
/// The smaller id is always stored first, so `(a, b)` and `(b, a)` build the
/// same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    low: NodeId,
    high: NodeId,
}

impl EdgeKey {
    /// Normalise a pair, or `None` if both ends are the same node
    pub fn new(a: NodeId, b: NodeId) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Endpoints in creation order
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.low, self.high)
    }

    /// Check whether `id` is one of the endpoints
    pub fn touches(&self, id: NodeId) -> bool {
        self.low == id || self.high == id
    }
}

/// Undirected weighted connection between two waypoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Normalised endpoints
    pub key: EdgeKey,
    /// Euclidean distance between the endpoints
    pub weight: f64,
}

impl Edge {
    /// Create a new edge
    pub fn new(key: EdgeKey, weight: f64) -> Self {
        Self { key, weight }
    }

    /// First endpoint (the older node)
    pub fn a(&self) -> NodeId {
        self.key.low
    }

    /// Second endpoint (the newer node)
    pub fn b(&self) -> NodeId {
        self.key.high
    }
}
