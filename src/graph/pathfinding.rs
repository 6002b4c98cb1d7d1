//! A* shortest-path search
//!
//! Edge cost is the stored Euclidean weight and the heuristic is the straight
//! line distance from a node to the goal. Every edge weight is itself a
//! straight-line distance, so by the triangle inequality the heuristic never
//! exceeds the remaining path cost (admissible) and drops by at most the
//! weight of any edge taken (consistent). Search therefore returns a shortest
//! path.
//!
//! The frontier pops the lowest `g + h` first. Equal estimates go to the entry
//! discovered first, which makes results repeatable for a given graph.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::config::SearchConfig;
use crate::core::error::{GraphError, GraphResult};
use crate::core::types::{distance, NodeId, Point};
use crate::graph::locator::nearest;
use crate::graph::store::GraphStore;

/// Upper bounds on the work a single search may do
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum number of expanded nodes
    pub max_expansions: Option<usize>,
    /// Wall-clock deadline measured from the start of the search
    pub deadline: Option<Duration>,
}

/// Shortest path between two waypoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Nodes from start to goal, both included
    pub nodes: Vec<NodeId>,
    /// Sum of edge weights along the path
    pub total_weight: f64,
}

#[derive(Debug, Clone, Copy)]
struct Frontier {
    estimate: f64,
    cost: f64,
    order: u64,
    node: NodeId,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    // Reversed so the max-heap pops the smallest estimate, then the earliest discovery
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .total_cmp(&self.estimate)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl SearchLimits {
    /// No limits
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop after expanding `max` nodes
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Stop once `deadline` has elapsed
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_expansions: (config.max_expansions > 0).then_some(config.max_expansions),
            deadline: config.deadline,
        }
    }
}

impl Route {
    /// First node of the route
    pub fn start(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// Last node of the route
    pub fn goal(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Number of edges travelled
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    /// Check whether the route passes through `id`
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(&id)
    }

    /// Human readable form: display names joined by arrows
    pub fn describe(&self, graph: &GraphStore) -> String {
        self.nodes
            .iter()
            .map(|id| {
                graph
                    .node(*id)
                    .map(|node| node.display_name())
                    .unwrap_or_else(|| id.to_string())
            })
            .collect::<Vec<_>>()
            .join(" → ")
    }
}

/// A* search over a read-only graph
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g GraphStore,
    limits: SearchLimits,
}

impl<'g> PathFinder<'g> {
    /// Unbounded search over `graph`
    pub fn new(graph: &'g GraphStore) -> Self {
        Self {
            graph,
            limits: SearchLimits::unbounded(),
        }
    }

    /// Apply search limits
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Shortest path as a node sequence
    pub fn find_path(&self, start: NodeId, goal: NodeId) -> GraphResult<Vec<NodeId>> {
        self.find_route(start, goal).map(|route| route.nodes)
    }

    /// Shortest path with its total weight
    pub fn find_route(&self, start: NodeId, goal: NodeId) -> GraphResult<Route> {
        let graph = self.graph;
        graph.position(start)?;
        let goal_pos = graph.position(goal)?;

        if start == goal {
            return Ok(Route {
                nodes: vec![start],
                total_weight: 0.0,
            });
        }

        let started = Instant::now();
        let heuristic = |id: NodeId| -> GraphResult<f64> {
            graph.position(id).map(|p| distance(p, goal_pos))
        };

        let mut open = BinaryHeap::new();
        let mut best_cost: HashMap<NodeId, f64> = HashMap::new();
        let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
        let mut order = 0u64;
        let mut expanded = 0usize;

        best_cost.insert(start, 0.0);
        open.push(Frontier {
            estimate: heuristic(start)?,
            cost: 0.0,
            order,
            node: start,
        });

        while let Some(Frontier { cost, node, .. }) = open.pop() {
            // Skip entries superseded by a cheaper discovery
            if best_cost.get(&node).is_some_and(|&best| cost > best) {
                continue;
            }

            if node == goal {
                let nodes = reconstruct(&came_from, start, goal);
                debug!(from = %start, to = %goal, expanded, weight = cost, "path found");
                return Ok(Route {
                    nodes,
                    total_weight: cost,
                });
            }

            self.check_limits(expanded, started)?;
            expanded += 1;

            for (next, weight) in graph.neighbors(node)? {
                let tentative = cost + weight;
                if best_cost.get(&next).is_some_and(|&best| tentative >= best) {
                    continue;
                }
                best_cost.insert(next, tentative);
                came_from.insert(next, node);
                order += 1;
                open.push(Frontier {
                    estimate: tentative + heuristic(next)?,
                    cost: tentative,
                    order,
                    node: next,
                });
            }
        }

        debug!(from = %start, to = %goal, expanded, "goal unreachable");
        Err(GraphError::no_path(start, goal))
    }

    fn check_limits(&self, expanded: usize, started: Instant) -> GraphResult<()> {
        if let Some(budget) = self.limits.max_expansions {
            if expanded >= budget {
                info!(expanded, budget, "search budget exhausted");
                return Err(GraphError::SearchBudgetExceeded { expanded, budget });
            }
        }
        if let Some(deadline) = self.limits.deadline {
            let elapsed = started.elapsed();
            if elapsed > deadline {
                info!(elapsed_ms = elapsed.as_millis() as u64, "search deadline passed");
                return Err(GraphError::SearchDeadlineExceeded {
                    elapsed_ms: elapsed.as_millis(),
                    deadline_ms: deadline.as_millis(),
                });
            }
        }
        Ok(())
    }
}

fn reconstruct(came_from: &HashMap<NodeId, NodeId>, start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => {
                path.push(prev);
                current = prev;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

/// Shortest path between two nodes with no search limits
pub fn find_path(graph: &GraphStore, start: NodeId, goal: NodeId) -> GraphResult<Vec<NodeId>> {
    PathFinder::new(graph).find_path(start, goal)
}

/// Route from the node nearest to `point` to `goal`
pub fn route_from_point(
    graph: &GraphStore,
    point: Point,
    goal: NodeId,
    limits: SearchLimits,
) -> GraphResult<Route> {
    let start = nearest(graph, point)?;
    PathFinder::new(graph).with_limits(limits).find_route(start, goal)
}
