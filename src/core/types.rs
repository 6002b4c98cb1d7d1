//! Type definitions for the waypoint graph
//!
//! Node identifiers and the 2D geometry every other module measures with.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every generated node identifier
pub const NODE_ID_PREFIX: &str = "Node_";

/// Sequential node identifier rendered as `Node_<n>`
///
/// The sequence number is allocated from a monotonic counter owned by the
/// graph, so ordering by id is ordering by creation time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct NodeId(u64);

/// Position in image pixel coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// Error returned when a string is not a valid `Node_<n>` identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id: {0:?}")]
pub struct ParseNodeIdError(pub String);

impl NodeId {
    /// Create an id from its sequence number
    pub const fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    /// Sequence number this id was allocated with
    pub const fn seq(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", NODE_ID_PREFIX, self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(NODE_ID_PREFIX)
            .ok_or_else(|| ParseNodeIdError(s.to_owned()))?;
        // Reject signs and leading zeros so every id has exactly one spelling
        if digits.is_empty()
            || !digits.bytes().all(|b| b.is_ascii_digit())
            || (digits.len() > 1 && digits.starts_with('0'))
        {
            return Err(ParseNodeIdError(s.to_owned()));
        }
        digits
            .parse::<u64>()
            .map(NodeId)
            .map_err(|_| ParseNodeIdError(s.to_owned()))
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeIdVisitor;

        impl<'de> Visitor<'de> for NodeIdVisitor {
            type Value = NodeId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a node id like 'Node_1'")
            }

            fn visit_str<E>(self, value: &str) -> Result<NodeId, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(NodeIdVisitor)
    }
}

impl Point {
    /// Create a point from its coordinates
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }

    /// Check that neither coordinate is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x: f64::from(x), y: f64::from(y) }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display_and_parse() {
        let id = NodeId::from_seq(42);
        assert_eq!(id.to_string(), "Node_42");
        assert_eq!("Node_42".parse::<NodeId>(), Ok(id));
    }

    #[test]
    fn node_id_rejects_malformed() {
        for bad in ["", "Node_", "node_1", "Node_-1", "Node_01", "Node_1a", "Nodo_1"] {
            assert!(bad.parse::<NodeId>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn node_id_orders_by_creation() {
        assert!(NodeId::from_seq(2) < NodeId::from_seq(10));
    }

    #[test]
    fn node_id_serializes_as_string() {
        let json = serde_json::to_string(&NodeId::from_seq(7)).unwrap();
        assert_eq!(json, "\"Node_7\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, NodeId::from_seq(7));
    }

    #[test]
    fn euclidean_distance() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(Point::new(1.0, 1.0).distance_to(&Point::new(1.0, 1.0)), 0.0);
        assert_eq!(Point::from((10, 0)), Point::new(10.0, 0.0));
    }
}
