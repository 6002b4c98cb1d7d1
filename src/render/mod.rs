//! Render projection
//!
//! Turns a graph (and optionally a highlighted route) into a flat list of
//! drawing instructions. Projection is pure: the same graph, route and styles
//! always give the same list in the same order. Edges come first, then a
//! marker and a label per node, then the route on top.

use serde::{Deserialize, Serialize};

use crate::core::config::RenderConfig;
use crate::core::types::{NodeId, Point};
use crate::graph::GraphStore;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Color from components
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// One primitive for an external renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawInstruction {
    /// Straight segment
    Line {
        /// Start point
        from: Point,
        /// End point
        to: Point,
        /// Stroke color
        color: Rgb,
        /// Stroke width
        width: f64,
        /// Part of the highlighted route
        emphasized: bool,
    },
    /// Filled circle at a node
    Marker {
        /// Center
        at: Point,
        /// Radius
        radius: f64,
        /// Fill color
        color: Rgb,
    },
    /// Text anchored near a node
    Label {
        /// Anchor point
        at: Point,
        /// Text to draw
        text: String,
        /// Text color
        color: Rgb,
    },
}

impl DrawInstruction {
    /// Whether this is a highlighted route segment
    pub fn is_emphasized(&self) -> bool {
        matches!(self, DrawInstruction::Line { emphasized: true, .. })
    }
}

/// Project a graph and optional route into drawing instructions
///
/// Route steps whose endpoints are no longer in the graph are skipped rather
/// than drawn to a stale position.
pub fn project(graph: &GraphStore, route: Option<&[NodeId]>, style: &RenderConfig) -> Vec<DrawInstruction> {
    let mut out = Vec::with_capacity(graph.edge_count() + graph.len() * 2);

    for edge in graph.edges() {
        if let (Ok(from), Ok(to)) = (graph.position(edge.a()), graph.position(edge.b())) {
            out.push(DrawInstruction::Line {
                from,
                to,
                color: style.edge_color,
                width: style.edge_width,
                emphasized: false,
            });
        }
    }

    let (dx, dy) = style.label_offset;
    for node in graph.nodes() {
        out.push(DrawInstruction::Marker {
            at: node.position,
            radius: style.marker_radius,
            color: style.node_color,
        });
        out.push(DrawInstruction::Label {
            at: Point::new(node.position.x + dx, node.position.y + dy),
            text: node.display_name(),
            color: style.label_color,
        });
    }

    if let Some(route) = route {
        for pair in route.windows(2) {
            if let (Ok(from), Ok(to)) = (graph.position(pair[0]), graph.position(pair[1])) {
                out.push(DrawInstruction::Line {
                    from,
                    to,
                    color: style.route_color,
                    width: style.route_width,
                    emphasized: true,
                });
            }
        }
    }

    out
}

/// Serialize a drawing list as JSON
pub fn to_json(instructions: &[DrawInstruction]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(instructions)
}
