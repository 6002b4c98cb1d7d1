//! GeoJSON import
//!
//! Builds a graph from a FeatureCollection: every `LineString` coordinate
//! becomes a waypoint connected to the previous one, and every `Point` becomes
//! (or names) the waypoint at its coordinate. Coordinates that match exactly
//! share one waypoint, which is how separate line strings join up. The first
//! two numbers of a position are used as `(x, y)`; any altitude is ignored.

use std::collections::HashMap;
use std::io::Read;

use serde::Deserialize;
use tracing::{debug, info};

use crate::core::error::CodecError;
use crate::core::types::{NodeId, Point};
use crate::graph::GraphStore;

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Deserialize, Default)]
struct Properties {
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    LineString { coordinates: Vec<Vec<f64>> },
    #[serde(other)]
    Unsupported,
}

struct GraphBuilder {
    graph: GraphStore,
    by_position: HashMap<(u64, u64), NodeId>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            graph: GraphStore::new(),
            by_position: HashMap::new(),
        }
    }

    fn vertex(&mut self, point: Point) -> Result<NodeId, CodecError> {
        // Normalise -0.0 so it shares a vertex with 0.0
        let key = ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits());
        if let Some(&id) = self.by_position.get(&key) {
            return Ok(id);
        }
        let id = self
            .graph
            .add_node(point)
            .map_err(|e| CodecError::corrupt(e.to_string()))?;
        self.by_position.insert(key, id);
        Ok(id)
    }

    fn line(&mut self, coordinates: &[Vec<f64>]) -> Result<(), CodecError> {
        let mut previous: Option<NodeId> = None;
        for coordinate in coordinates {
            let id = self.vertex(position(coordinate)?)?;
            if let Some(prev) = previous.filter(|prev| *prev != id) {
                self.graph
                    .add_edge(prev, id)
                    .map_err(|e| CodecError::corrupt(e.to_string()))?;
            }
            previous = Some(id);
        }
        Ok(())
    }

    fn point(&mut self, coordinate: &[f64], name: Option<String>) -> Result<(), CodecError> {
        let id = self.vertex(position(coordinate)?)?;
        if let Some(name) = name {
            self.graph
                .set_label(id, name)
                .map_err(|e| CodecError::corrupt(e.to_string()))?;
        }
        Ok(())
    }
}

fn position(coordinate: &[f64]) -> Result<Point, CodecError> {
    match coordinate {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point::new(*x, *y)),
        _ => Err(CodecError::corrupt(format!(
            "invalid GeoJSON position {:?}",
            coordinate
        ))),
    }
}

/// Build a graph from GeoJSON bytes
pub fn import_geojson_slice(bytes: &[u8]) -> Result<GraphStore, CodecError> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)
        .map_err(|e| CodecError::corrupt(format!("malformed GeoJSON: {}", e)))?;

    let mut builder = GraphBuilder::new();
    for (index, feature) in collection.features.into_iter().enumerate() {
        let name = feature.properties.unwrap_or_default().name;
        match feature.geometry {
            Some(Geometry::LineString { coordinates }) => builder.line(&coordinates)?,
            Some(Geometry::Point { coordinates }) => builder.point(&coordinates, name)?,
            Some(Geometry::Unsupported) | None => {
                debug!(feature = index, "skipping feature without Point or LineString geometry");
            }
        }
    }

    let graph = builder.graph;
    info!(nodes = graph.len(), edges = graph.edge_count(), "GeoJSON imported");
    Ok(graph)
}

/// Build a graph from a GeoJSON stream
pub fn import_geojson(mut reader: impl Read) -> crate::core::Result<GraphStore> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(import_geojson_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPUS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {},
             "geometry": {"type": "LineString", "coordinates": [[0, 0], [10, 0], [10, 0], [10, 10]]}},
            {"type": "Feature", "properties": {"highway": "footway"},
             "geometry": {"type": "LineString", "coordinates": [[10, 10, 3.5], [20, 10]]}},
            {"type": "Feature", "properties": {"name": "Library"},
             "geometry": {"type": "Point", "coordinates": [20, 10]}},
            {"type": "Feature", "properties": {"name": "Fountain"},
             "geometry": {"type": "Point", "coordinates": [5, 5]}},
            {"type": "Feature", "properties": {"name": "Quad"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}},
            {"type": "Feature", "properties": null, "geometry": null}
        ]
    }"#;

    #[test]
    fn builds_shared_vertices_and_labels() {
        let g = import_geojson(CAMPUS.as_bytes()).unwrap();
        // (0,0) (10,0) (10,10) (20,10) (5,5)
        assert_eq!(g.len(), 5);
        assert_eq!(g.edge_count(), 3);

        let library = g.resolve("Library").unwrap();
        assert_eq!(g.position(library).unwrap(), Point::new(20.0, 10.0));
        let fountain = g.resolve("Fountain").unwrap();
        assert_eq!(g.neighbors(fountain).unwrap().count(), 0);

        let start = g.resolve("Node_1").unwrap();
        let path = crate::graph::find_path(&g, start, library).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(g.path_weight(&path), Ok(30.0));
    }

    #[test]
    fn repeated_coordinates_make_no_self_edge() {
        let doc = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[1,1],[1,1]]}}]}"#;
        let g = import_geojson_slice(doc.as_bytes()).unwrap();
        assert_eq!(g.len(), 1);
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn malformed_documents_are_corrupt() {
        for doc in [
            "not json",
            r#"{"type":"FeatureCollection"}"#,
            r#"{"features":[{"geometry":{"type":"Point","coordinates":[1]}}]}"#,
        ] {
            let err = import_geojson_slice(doc.as_bytes()).unwrap_err();
            assert!(matches!(err, CodecError::CorruptData(_)), "{doc}: {err}");
        }
    }
}
