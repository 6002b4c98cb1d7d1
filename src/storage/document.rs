//! Serializable graph document
//!
//! The logical persisted form shared by every encoding: the id counter, then
//! one tagged record per node, then one tagged record per edge. Rebuilding a
//! store from a document validates everything the store's own invariants
//! would otherwise assume.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::error::CodecError;
use crate::core::types::{NodeId, Point};
use crate::graph::{EdgeKey, GraphStore, Node};

/// Tolerated relative difference between a stored weight and the weight
/// recomputed from positions
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Whole-graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Sequence number the next created node will receive
    pub next_seq: u64,
    /// Node records followed by edge records
    pub records: Vec<Record>,
}

/// One persisted entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Record {
    /// A waypoint
    Node {
        /// Node id
        id: NodeId,
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
        /// Optional display label
        label: Option<String>,
    },
    /// A connection
    Edge {
        /// First endpoint
        a: NodeId,
        /// Second endpoint
        b: NodeId,
        /// Euclidean weight at save time
        weight: f64,
    },
}

impl GraphDocument {
    /// Snapshot a graph
    pub fn from_graph(graph: &GraphStore) -> Self {
        let nodes = graph.nodes().map(|node| Record::Node {
            id: node.id,
            x: node.position.x,
            y: node.position.y,
            label: node.label.clone(),
        });
        let edges = graph.edges().map(|edge| Record::Edge {
            a: edge.a(),
            b: edge.b(),
            weight: edge.weight,
        });

        Self {
            next_seq: graph.next_seq(),
            records: nodes.chain(edges).collect(),
        }
    }

    /// Rebuild a fresh graph, rejecting anything inconsistent
    pub fn into_graph(self) -> Result<GraphStore, CodecError> {
        let mut graph = GraphStore::new();

        // Nodes first so edge records may appear anywhere in the list
        for record in &self.records {
            if let Record::Node { id, x, y, label } = record {
                // Neither value is ever allocated by the counter
                if id.seq() == 0 || id.seq() == u64::MAX {
                    return Err(CodecError::corrupt(format!("invalid node id {}", id)));
                }
                if !x.is_finite() || !y.is_finite() {
                    return Err(CodecError::corrupt(format!("node {} has a non-finite position", id)));
                }
                let mut node = Node::new(*id, Point::new(*x, *y));
                node.label = label.clone();
                graph
                    .insert_node(node)
                    .map_err(|dup| CodecError::corrupt(format!("duplicate node record {}", dup)))?;
            }
        }

        if self.next_seq < graph.next_seq() {
            return Err(CodecError::corrupt(format!(
                "id counter {} is behind existing node ids",
                self.next_seq
            )));
        }
        graph.reserve_ids_below(self.next_seq);

        let mut seen = HashSet::new();
        for record in &self.records {
            if let Record::Edge { a, b, weight } = record {
                let key = EdgeKey::new(*a, *b)
                    .ok_or_else(|| CodecError::corrupt(format!("self-edge on {}", a)))?;
                if !seen.insert(key) {
                    return Err(CodecError::corrupt(format!("duplicate edge {} - {}", a, b)));
                }
                for endpoint in [a, b] {
                    if !graph.contains(*endpoint) {
                        return Err(CodecError::corrupt(format!(
                            "edge {} - {} references unknown node {}",
                            a, b, endpoint
                        )));
                    }
                }
                let computed = graph
                    .add_edge(*a, *b)
                    .map_err(|e| CodecError::corrupt(e.to_string()))?;
                if !weight.is_finite()
                    || (computed - weight).abs() > WEIGHT_TOLERANCE * computed.abs().max(1.0)
                {
                    return Err(CodecError::corrupt(format!(
                        "edge {} - {} stores weight {} but positions give {}",
                        a, b, weight, computed
                    )));
                }
            }
        }

        Ok(graph)
    }
}
