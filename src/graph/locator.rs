//! Nearest-node lookup
//!
//! Snaps a clicked point to the closest existing waypoint. Exact distance ties
//! go to the node created first, so the answer never depends on hash or
//! iteration order.

use crate::core::error::{GraphError, GraphResult};
use crate::core::types::{NodeId, Point};
use crate::graph::node::Node;
use crate::graph::store::GraphStore;

/// Closest node to `query` together with its distance
pub fn nearest_node(graph: &GraphStore, query: Point) -> GraphResult<(&Node, f64)> {
    let mut best: Option<(&Node, f64)> = None;
    for node in graph.nodes() {
        let d = node.position.distance_to(&query);
        // Strict comparison keeps the earlier node on ties
        match best {
            Some((_, best_d)) if !(d < best_d) => {}
            _ => best = Some((node, d)),
        }
    }
    best.ok_or(GraphError::EmptyGraph)
}

/// Id of the closest node to `query`
pub fn nearest(graph: &GraphStore, query: Point) -> GraphResult<NodeId> {
    nearest_node(graph, query).map(|(node, _)| node.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_fails() {
        let g = GraphStore::new();
        assert_eq!(nearest(&g, Point::new(1.0, 1.0)), Err(GraphError::EmptyGraph));
    }

    #[test]
    fn picks_closest() {
        let mut g = GraphStore::new();
        g.add_node(Point::new(0.0, 0.0)).unwrap();
        let far = g.add_node(Point::new(100.0, 100.0)).unwrap();
        let (node, d) = nearest_node(&g, Point::new(97.0, 96.0)).unwrap();
        assert_eq!(node.id, far);
        assert_eq!(d, 5.0);
    }

    #[test]
    fn ties_go_to_first_created() {
        let mut g = GraphStore::new();
        let left = g.add_node(Point::new(0.0, 0.0)).unwrap();
        let right = g.add_node(Point::new(10.0, 0.0)).unwrap();
        let mid = Point::new(5.0, 0.0);
        assert_eq!(nearest(&g, mid), Ok(left));

        // Removing the winner hands the tie to the survivor
        g.remove_node(left).unwrap();
        assert_eq!(nearest(&g, mid), Ok(right));
    }

    #[test]
    fn repeated_queries_agree() {
        let mut g = GraphStore::new();
        for i in 0..20 {
            g.add_node(Point::new(f64::from(i % 5) * 3.0, f64::from(i / 5) * 3.0)).unwrap();
        }
        let q = Point::new(4.5, 4.5);
        let first = nearest(&g, q).unwrap();
        for _ in 0..10 {
            assert_eq!(nearest(&g, q), Ok(first));
        }
    }
}
