//! Error types for graph and ansatz construction.

use thiserror::Error;

/// Errors raised while building graphs or ansatz circuits.
#[derive(Debug, Error, PartialEq)]
pub enum QaoaError {
    /// An edge connects a node to itself.
    #[error("edge ({node}, {node}) is a self-loop")]
    SelfLoop {
        /// The offending node.
        node: usize,
    },

    /// An edge endpoint is outside the node range.
    #[error("node {node} out of range for a graph with {n_nodes} nodes")]
    NodeOutOfRange {
        /// The offending node.
        node: usize,
        /// Number of nodes in the graph.
        n_nodes: usize,
    },

    /// The layer count must be positive.
    #[error("layer count p must be at least 1")]
    ZeroLayers,
}

/// Convenience alias used throughout this crate.
pub type QaoaResult<T> = Result<T, QaoaError>;
