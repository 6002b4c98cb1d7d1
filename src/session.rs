//! Interactive editing session
//!
//! A [`Session`] owns one graph together with the two-click selection buffer,
//! the last computed route and the configuration. Every successful mutation
//! and every successful route publishes a fresh frame to frame subscribers.
//!
//! Loads and imports build a complete graph first and swap it in only on
//! success, so a corrupt file never leaves the session half-loaded.

use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::error::{GraphResult, Result};
use crate::core::types::{NodeId, Point};
use crate::graph::{ConnectSelection, GraphStore, Node, PathFinder, Route, SearchLimits, SelectionOutcome};
use crate::render::{project, DrawInstruction};
use crate::storage;

/// One full drawing list
pub type Frame = Vec<DrawInstruction>;

/// Graph editing and routing session
#[derive(Debug)]
pub struct Session {
    graph: GraphStore,
    selection: ConnectSelection,
    route: Option<Route>,
    config: Config,
    frame_senders: Vec<flume::Sender<Frame>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Empty session with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Empty session using `config`
    pub fn with_config(config: Config) -> Self {
        Self {
            graph: GraphStore::new(),
            selection: ConnectSelection::new(),
            route: None,
            config,
            frame_senders: Vec::new(),
        }
    }

    /// Current graph
    pub fn graph(&self) -> &GraphStore {
        &self.graph
    }

    /// Active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Selection buffer
    pub fn selection(&self) -> ConnectSelection {
        self.selection
    }

    /// Last successful route, until a mutation invalidates it
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// Receive a frame after every change to the drawing
    pub fn subscribe_frames(&mut self) -> flume::Receiver<Frame> {
        let (tx, rx) = flume::unbounded();
        self.frame_senders.push(tx);
        rx
    }

    /// Current drawing list
    pub fn frame(&self) -> Frame {
        let route = self.route.as_ref().map(|r| r.nodes.as_slice());
        project(&self.graph, route, &self.config.render)
    }

    /// Create a waypoint at `point`
    pub fn add_node_at(&mut self, point: Point) -> GraphResult<NodeId> {
        let id = self.graph.add_node(point)?;
        self.publish_frame();
        Ok(id)
    }

    /// Give a waypoint a display label
    pub fn label_node(&mut self, name: &str, label: &str) -> GraphResult<NodeId> {
        let id = self.graph.resolve(name)?;
        self.graph.set_label(id, label)?;
        self.publish_frame();
        Ok(id)
    }

    /// Feed a click to the connect protocol
    pub fn connect_click(&mut self, point: Point) -> GraphResult<SelectionOutcome> {
        let outcome = self.selection.click(&mut self.graph, point)?;
        self.after_commit(outcome);
        Ok(outcome)
    }

    /// Connect two named waypoints directly, bypassing the selection buffer
    pub fn link(&mut self, a: &str, b: &str) -> GraphResult<f64> {
        let a = self.graph.resolve(a)?;
        let b = self.graph.resolve(b)?;
        let weight = self.graph.add_edge(a, b)?;
        self.after_commit(SelectionOutcome::Committed { a, b, weight });
        Ok(weight)
    }

    /// Shortest route between two named waypoints
    ///
    /// Names are node ids (`Node_3`) or labels. The session's search limits
    /// apply.
    pub fn route_between(&mut self, start: &str, goal: &str) -> GraphResult<Route> {
        let start = self.graph.resolve(start)?;
        let goal = self.graph.resolve(goal)?;
        let route = PathFinder::new(&self.graph)
            .with_limits(self.limits())
            .find_route(start, goal)?;
        Ok(self.show_route(route))
    }

    /// Shortest route from the waypoint nearest to `point`
    pub fn route_from_point(&mut self, point: Point, goal: &str) -> GraphResult<Route> {
        let goal = self.graph.resolve(goal)?;
        let route = crate::graph::route_from_point(&self.graph, point, goal, self.limits())?;
        Ok(self.show_route(route))
    }

    /// Delete a named waypoint and its edges
    pub fn remove_node(&mut self, name: &str) -> GraphResult<Node> {
        let id = self.graph.resolve(name)?;
        let node = self.graph.remove_node(id)?;
        if self.selection.pending() == Some(id) {
            self.selection.reset();
        }
        if self.route.as_ref().is_some_and(|r| r.contains(id)) {
            debug!(node = %id, "route cleared by removal");
            self.route = None;
        }
        self.publish_frame();
        Ok(node)
    }

    /// Remove every waypoint and forget the selection and route
    ///
    /// Ids handed out before the reset are not reused.
    pub fn reset(&mut self) {
        self.graph.clear();
        self.selection.reset();
        self.route = None;
        self.publish_frame();
    }

    /// Encode the graph into `writer` in the configured format
    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        storage::save_to_writer(&self.graph, writer, self.config.storage.format)
    }

    /// Replace the graph with one decoded from `reader`
    pub fn load<R: Read>(&mut self, reader: R) -> Result<()> {
        let graph = storage::load_from_reader(reader, self.config.storage.max_graph_bytes)?;
        self.replace_graph(graph);
        Ok(())
    }

    /// Write the graph to `path` in the configured format
    pub fn save_file(&self, path: impl AsRef<Path>) -> Result<()> {
        storage::save_file(&self.graph, path, self.config.storage.format)
    }

    /// Replace the graph with the one stored at `path`
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let graph = storage::load_file(path, self.config.storage.max_graph_bytes)?;
        self.replace_graph(graph);
        Ok(())
    }

    /// Replace the graph with one built from a GeoJSON FeatureCollection
    pub fn import_geojson<R: Read>(&mut self, reader: R) -> Result<()> {
        let graph = storage::import_geojson(reader)?;
        self.replace_graph(graph);
        Ok(())
    }

    fn limits(&self) -> SearchLimits {
        SearchLimits::from(&self.config.search)
    }

    fn after_commit(&mut self, outcome: SelectionOutcome) {
        if let SelectionOutcome::Committed { a, b, .. } = outcome {
            if self.route.as_ref().is_some_and(|r| r.contains(a) || r.contains(b)) {
                debug!(%a, %b, "route cleared by new edge");
                self.route = None;
            }
            self.publish_frame();
        }
    }

    fn show_route(&mut self, route: Route) -> Route {
        info!(
            route = %route.describe(&self.graph),
            weight = route.total_weight,
            "route found"
        );
        self.route = Some(route.clone());
        self.publish_frame();
        route
    }

    fn replace_graph(&mut self, graph: GraphStore) {
        self.graph = graph;
        self.selection.reset();
        self.route = None;
        self.publish_frame();
    }

    fn publish_frame(&mut self) {
        if self.frame_senders.is_empty() {
            return;
        }
        let frame = self.frame();
        self.frame_senders.retain(|tx| tx.send(frame.clone()).is_ok());
    }
}
