//! Two-click edge commit
//!
//! Connecting waypoints takes two picks. The first pick is buffered; the
//! second commits an edge between the two and empties the buffer. Picking the
//! buffered node again is rejected with `DegenerateEdge` rather than creating
//! a self-loop, and also empties the buffer.

use tracing::debug;

use crate::core::error::{GraphError, GraphResult};
use crate::core::types::{NodeId, Point};
use crate::graph::locator::nearest;
use crate::graph::store::GraphStore;

/// Selection buffer state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectSelection {
    /// Nothing picked yet
    #[default]
    Empty,
    /// First endpoint picked, waiting for the second
    OneSelected(NodeId),
}

/// What a pick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionOutcome {
    /// The pick was buffered as the first endpoint
    Pending(NodeId),
    /// The pick completed an edge
    Committed {
        /// First endpoint picked
        a: NodeId,
        /// Second endpoint picked
        b: NodeId,
        /// Weight of the committed edge
        weight: f64,
    },
}

impl ConnectSelection {
    /// Start with an empty buffer
    pub fn new() -> Self {
        Self::Empty
    }

    /// Buffered first endpoint, if any
    pub fn pending(&self) -> Option<NodeId> {
        match self {
            Self::Empty => None,
            Self::OneSelected(id) => Some(*id),
        }
    }

    /// Drop any buffered pick
    pub fn reset(&mut self) {
        *self = Self::Empty;
    }

    /// Resolve a click to the nearest node and feed it to [`pick`](Self::pick)
    pub fn click(&mut self, graph: &mut GraphStore, point: Point) -> GraphResult<SelectionOutcome> {
        let id = nearest(graph, point)?;
        self.pick(graph, id)
    }

    /// Advance the protocol with an already resolved node
    ///
    /// A second pick always leaves the buffer empty, whether the edge was
    /// committed or rejected.
    pub fn pick(&mut self, graph: &mut GraphStore, id: NodeId) -> GraphResult<SelectionOutcome> {
        match std::mem::take(self) {
            Self::Empty => {
                if !graph.contains(id) {
                    return Err(GraphError::unknown_node(id));
                }
                debug!(node = %id, "first endpoint selected");
                *self = Self::OneSelected(id);
                Ok(SelectionOutcome::Pending(id))
            }
            Self::OneSelected(first) => {
                if first == id {
                    debug!(node = %id, "same node picked twice, selection discarded");
                    return Err(GraphError::degenerate_edge(id));
                }
                let weight = graph.add_edge(first, id)?;
                Ok(SelectionOutcome::Committed { a: first, b: id, weight })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> (GraphStore, NodeId, NodeId) {
        let mut g = GraphStore::new();
        let a = g.add_node(Point::new(0.0, 0.0)).unwrap();
        let b = g.add_node(Point::new(30.0, 40.0)).unwrap();
        (g, a, b)
    }

    #[test]
    fn two_clicks_commit_an_edge() {
        let (mut g, a, b) = two_nodes();
        let mut sel = ConnectSelection::new();

        assert_eq!(sel.click(&mut g, Point::new(1.0, 1.0)), Ok(SelectionOutcome::Pending(a)));
        assert_eq!(sel.pending(), Some(a));

        let done = sel.click(&mut g, Point::new(29.0, 41.0)).unwrap();
        assert_eq!(done, SelectionOutcome::Committed { a, b, weight: 50.0 });
        assert_eq!(sel, ConnectSelection::Empty);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn same_node_twice_is_rejected_and_clears() {
        let (mut g, a, _) = two_nodes();
        let mut sel = ConnectSelection::new();
        sel.click(&mut g, Point::new(0.0, 0.0)).unwrap();
        let err = sel.click(&mut g, Point::new(2.0, 2.0)).unwrap_err();
        assert_eq!(err, GraphError::degenerate_edge(a));
        assert_eq!(sel.pending(), None);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn click_on_empty_graph_leaves_buffer_empty() {
        let mut g = GraphStore::new();
        let mut sel = ConnectSelection::new();
        assert_eq!(sel.click(&mut g, Point::default()), Err(GraphError::EmptyGraph));
        assert_eq!(sel, ConnectSelection::Empty);
    }

    #[test]
    fn buffered_node_removed_before_commit() {
        let (mut g, a, b) = two_nodes();
        let mut sel = ConnectSelection::new();
        sel.pick(&mut g, a).unwrap();
        g.remove_node(a).unwrap();
        assert_eq!(sel.pick(&mut g, b), Err(GraphError::unknown_node(a)));
        assert_eq!(sel.pending(), None);
    }

    #[test]
    fn reset_discards_pick() {
        let (mut g, a, _) = two_nodes();
        let mut sel = ConnectSelection::new();
        sel.pick(&mut g, a).unwrap();
        sel.reset();
        assert_eq!(sel.pick(&mut g, a), Ok(SelectionOutcome::Pending(a)));
    }
}
