//! Graph store
//!
//! The authoritative collection of waypoints and their undirected weighted
//! connections. Nodes and adjacency lists are kept in id order, and ids are
//! allocated from a counter that only moves forward, so every iteration over
//! the store runs in creation order.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::core::error::{GraphError, GraphResult};
use crate::core::types::{distance, NodeId, Point};
use crate::graph::delta::{EventBus, GraphEvent};
use crate::graph::edge::{Edge, EdgeKey};
use crate::graph::node::Node;

/// Graph store shared between threads: many readers or a single writer
pub type SharedGraph = Arc<RwLock<GraphStore>>;

/// In-memory waypoint graph
#[derive(Debug)]
pub struct GraphStore {
    /// Nodes keyed by id
    nodes: BTreeMap<NodeId, Node>,

    /// Symmetric adjacency: both directions of every edge are stored
    adjacency: BTreeMap<NodeId, BTreeMap<NodeId, f64>>,

    /// Sequence number handed to the next node
    next_seq: u64,

    /// Number of undirected edges
    edge_count: usize,

    /// Redraw listeners
    events: EventBus,
}

impl GraphStore {
    /// Create an empty graph whose first node will be `Node_1`
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            adjacency: BTreeMap::new(),
            next_seq: 1,
            edge_count: 0,
            events: EventBus::default(),
        }
    }

    /// Wrap the store for shared access
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    /// Subscribe to mutation events
    pub fn subscribe(&mut self) -> flume::Receiver<GraphEvent> {
        self.events.subscribe()
    }

    /// Add a node at `position` and return its freshly allocated id
    ///
    /// Fails with `InvalidPosition` for NaN or infinite coordinates, which
    /// could neither be measured against nor persisted.
    pub fn add_node(&mut self, position: Point) -> GraphResult<NodeId> {
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition {
                x: position.x,
                y: position.y,
            });
        }
        let id = self.allocate_id()?;
        self.nodes.insert(id, Node::new(id, position));
        self.adjacency.insert(id, BTreeMap::new());
        debug!(node = %id, x = position.x, y = position.y, "node added");
        self.events.publish(GraphEvent::NodeAdded { id, position });
        Ok(id)
    }

    /// Add a node carrying a display label
    pub fn add_labeled_node(&mut self, position: Point, label: impl Into<String>) -> GraphResult<NodeId> {
        let id = self.add_node(position)?;
        self.set_label(id, label)?;
        Ok(id)
    }

    /// Set or replace a node's display label
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> GraphResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| GraphError::unknown_node(id))?;
        let label = label.into();
        debug!(node = %id, label = %label, "node labelled");
        node.label = Some(label.clone());
        self.events.publish(GraphEvent::NodeLabelled { id, label });
        Ok(())
    }

    /// Connect two distinct nodes and return the edge weight
    ///
    /// The weight is the Euclidean distance between the stored positions.
    /// Connecting a pair that is already connected overwrites the weight
    /// instead of adding a parallel edge.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> GraphResult<f64> {
        let pa = self.position(a)?;
        let pb = self.position(b)?;
        let key = EdgeKey::new(a, b).ok_or_else(|| GraphError::degenerate_edge(a))?;
        let (a, b) = key.endpoints();
        let weight = distance(pa, pb);

        let previous = self
            .adjacency
            .entry(a)
            .or_default()
            .insert(b, weight);
        self.adjacency.entry(b).or_default().insert(a, weight);
        if previous.is_none() {
            self.edge_count += 1;
        }

        debug!(a = %a, b = %b, weight, replaced = previous.is_some(), "edge upserted");
        self.events.publish(GraphEvent::EdgeUpserted { a, b, weight });
        Ok(weight)
    }

    /// Neighbors of `id` with the connecting edge weights, in creation order
    pub fn neighbors(&self, id: NodeId) -> GraphResult<impl Iterator<Item = (NodeId, f64)> + '_> {
        self.adjacency
            .get(&id)
            .map(|list| list.iter().map(|(&n, &w)| (n, w)))
            .ok_or_else(|| GraphError::unknown_node(id))
    }

    /// Remove a node together with every edge touching it
    ///
    /// The id is not handed out again.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<Node> {
        let node = self
            .nodes
            .remove(&id)
            .ok_or_else(|| GraphError::unknown_node(id))?;
        let incident = self.adjacency.remove(&id).unwrap_or_default();
        for neighbor in incident.keys() {
            if let Some(list) = self.adjacency.get_mut(neighbor) {
                list.remove(&id);
            }
        }
        self.edge_count -= incident.len();

        debug!(node = %id, edges_removed = incident.len(), "node removed");
        self.events.publish(GraphEvent::NodeRemoved {
            id,
            edges_removed: incident.len(),
        });
        Ok(node)
    }

    /// Remove every node and edge
    ///
    /// The id counter keeps running so ids from before the reset are never
    /// reused within this store.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.adjacency.clear();
        self.edge_count = 0;
        debug!("graph cleared");
        self.events.publish(GraphEvent::Cleared);
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Check whether a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Stored position of a node
    pub fn position(&self, id: NodeId) -> GraphResult<Point> {
        self.nodes
            .get(&id)
            .map(|node| node.position)
            .ok_or_else(|| GraphError::unknown_node(id))
    }

    /// Weight of the edge between `a` and `b`, if they are connected
    pub fn weight(&self, a: NodeId, b: NodeId) -> Option<f64> {
        self.adjacency.get(&a).and_then(|list| list.get(&b)).copied()
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.values()
    }

    /// All edges, ordered by their older endpoint and then the newer one
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.adjacency.iter().flat_map(|(&a, list)| {
            list.range((std::ops::Bound::Excluded(a), std::ops::Bound::Unbounded))
                .filter_map(move |(&b, &w)| EdgeKey::new(a, b).map(|key| Edge::new(key, w)))
        })
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Sequence number the next node will receive
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// First node (in creation order) carrying `label`
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.nodes
            .values()
            .find(|node| node.label.as_deref() == Some(label))
            .map(|node| node.id)
    }

    /// Resolve an operator-supplied name: a node id first, then a label
    pub fn resolve(&self, name: &str) -> GraphResult<NodeId> {
        let name = name.trim();
        if let Ok(id) = name.parse::<NodeId>() {
            if self.contains(id) {
                return Ok(id);
            }
        }
        self.find_by_label(name)
            .ok_or_else(|| GraphError::unknown_node(name))
    }

    /// Total weight along a sequence of nodes
    ///
    /// Fails with `UnknownNode` for a missing node and `NoPath` when two
    /// consecutive nodes are not connected.
    pub fn path_weight(&self, path: &[NodeId]) -> GraphResult<f64> {
        if let Some(&missing) = path.iter().find(|id| !self.contains(**id)) {
            return Err(GraphError::unknown_node(missing));
        }
        path.windows(2).try_fold(0.0, |total, pair| {
            self.weight(pair[0], pair[1])
                .map(|w| total + w)
                .ok_or_else(|| GraphError::no_path(pair[0], pair[1]))
        })
    }

    /// Insert a node with a known id while rebuilding a decoded graph
    ///
    /// Moves the id counter past the inserted id. Fails if the id is taken.
    pub(crate) fn insert_node(&mut self, node: Node) -> Result<(), NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(node.id);
        }
        let id = node.id;
        self.next_seq = self.next_seq.max(id.seq().saturating_add(1));
        self.adjacency.insert(id, BTreeMap::new());
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Raise the id counter while rebuilding a decoded graph
    pub(crate) fn reserve_ids_below(&mut self, next_seq: u64) {
        self.next_seq = self.next_seq.max(next_seq);
    }

    fn allocate_id(&mut self) -> GraphResult<NodeId> {
        let next = self.next_seq.checked_add(1).ok_or(GraphError::IdsExhausted)?;
        let id = NodeId::from_seq(self.next_seq);
        self.next_seq = next;
        Ok(id)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for GraphStore {
    /// Copies nodes, edges and the id counter; subscribers stay with the original
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            adjacency: self.adjacency.clone(),
            next_seq: self.next_seq,
            edge_count: self.edge_count,
            events: EventBus::default(),
        }
    }
}
