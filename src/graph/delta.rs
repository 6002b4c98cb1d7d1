//! Change notifications for redraw
//!
//! Every successful graph mutation is published as a [`GraphEvent`] to the
//! store's subscribers. Subscribers that hang up are dropped on the next send.

use crate::core::types::{NodeId, Point};
use serde::{Deserialize, Serialize};

/// Graph change that makes the current drawing stale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEvent {
    /// A node was created
    NodeAdded {
        /// New node
        id: NodeId,
        /// Where it was placed
        position: Point,
    },
    /// A node's display label was set
    NodeLabelled {
        /// Labelled node
        id: NodeId,
        /// New label
        label: String,
    },
    /// An edge was created or its weight overwritten
    EdgeUpserted {
        /// First endpoint
        a: NodeId,
        /// Second endpoint
        b: NodeId,
        /// Stored weight
        weight: f64,
    },
    /// A node and its incident edges were removed
    NodeRemoved {
        /// Removed node
        id: NodeId,
        /// Number of edges removed with it
        edges_removed: usize,
    },
    /// The whole graph was cleared
    Cleared,
}

/// Fan-out of graph events to any number of listeners
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    senders: Vec<flume::Sender<GraphEvent>>,
}

impl EventBus {
    /// Register a new listener
    pub(crate) fn subscribe(&mut self) -> flume::Receiver<GraphEvent> {
        let (tx, rx) = flume::unbounded();
        self.senders.push(tx);
        rx
    }

    /// Deliver an event, dropping listeners whose receiver is gone
    pub(crate) fn publish(&mut self, event: GraphEvent) {
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of live listeners
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
