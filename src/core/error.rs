//! Error types and handling for the waypoint graph
//!
//! Every failure the core can produce is a typed, recoverable value. The shell
//! decides how to present it; nothing here terminates the process.

use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Result type for graph store, locator and path finder operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Main error type for the waypoint graph
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph operation errors
    #[error("Graph operation error: {0}")]
    Graph(#[from] GraphError),

    /// Encoding/decoding errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// I/O errors from std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Graph operation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A node id (or label) is not present in the graph
    #[error("Unknown node: {id}")]
    UnknownNode {
        /// The id or name that failed to resolve
        id: String,
    },

    /// Both endpoints of an edge are the same node
    #[error("Degenerate edge: {id} cannot be connected to itself")]
    DegenerateEdge {
        /// The node that was picked twice
        id: String,
    },

    /// A node position has a NaN or infinite coordinate
    #[error("Invalid position ({x}, {y}): coordinates must be finite")]
    InvalidPosition {
        /// Horizontal coordinate
        x: f64,
        /// Vertical coordinate
        y: f64,
    },

    /// The id counter cannot allocate another node id
    #[error("Node ids exhausted")]
    IdsExhausted,

    /// A nearest-node query ran against a graph without nodes
    #[error("Graph has no nodes")]
    EmptyGraph,

    /// The goal is not reachable from the start
    #[error("No path from {from} to {to}")]
    NoPath {
        /// Start node
        from: String,
        /// Goal node
        to: String,
    },

    /// Search expanded more nodes than the configured budget
    #[error("Search aborted after expanding {expanded} nodes (budget {budget})")]
    SearchBudgetExceeded {
        /// Nodes expanded before giving up
        expanded: usize,
        /// Configured budget
        budget: usize,
    },

    /// Search ran past the configured deadline
    #[error("Search aborted after {elapsed_ms} ms (deadline {deadline_ms} ms)")]
    SearchDeadlineExceeded {
        /// Time spent before giving up
        elapsed_ms: u128,
        /// Configured deadline
        deadline_ms: u128,
    },
}

/// Encoding/decoding errors
#[derive(Error, Debug)]
pub enum CodecError {
    /// Input bytes are not a valid graph document
    #[error("Corrupt graph data: {0}")]
    CorruptData(String),

    /// Bincode serialization error
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Unsupported format
    #[error("Unsupported graph format: {0}")]
    UnsupportedFormat(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error was caused by the caller's input
    /// (unknown names, bad picks, corrupt files) rather than the environment
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Graph(_) | Error::Codec(CodecError::CorruptData(_)))
    }

    /// Check if this is a corrupt-data failure from a load
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Error::Codec(CodecError::CorruptData(_)))
    }

    /// The graph error wrapped by this error, if any
    pub fn as_graph_error(&self) -> Option<&GraphError> {
        match self {
            Error::Graph(err) => Some(err),
            _ => None,
        }
    }
}

impl GraphError {
    /// Create an unknown node error
    pub fn unknown_node(id: impl ToString) -> Self {
        Self::UnknownNode { id: id.to_string() }
    }

    /// Create a degenerate edge error
    pub fn degenerate_edge(id: impl ToString) -> Self {
        Self::DegenerateEdge { id: id.to_string() }
    }

    /// Create a no-path error
    pub fn no_path(from: impl ToString, to: impl ToString) -> Self {
        Self::NoPath {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl CodecError {
    /// Create a corrupt data error
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptData(msg.into())
    }
}
