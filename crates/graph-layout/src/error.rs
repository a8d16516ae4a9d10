use crate::NodeId;
use thiserror::Error;

/// Errors raised by [`Graph`](crate::Graph) queries and mutations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The node handle does not belong to this graph (or was removed)
    #[error("node {0:?} is not part of the graph")]
    UnknownNode(NodeId),

    /// A node was looked up by insertion index past the end
    #[error("position {index} is out of range for a graph of {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },

    /// Another node already carries an equal payload
    #[error("payload already belongs to node {0:?}")]
    DuplicatePayload(NodeId),
}

/// Errors that can occur while computing a layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The tree layout was given something that is not a rooted tree
    #[error("graph is not a tree at node {node:?}: {reason}")]
    NotATree { node: NodeId, reason: &'static str },

    /// Edges from a node to itself are not supported by any layout
    #[error("graph contains a self-loop at node {0:?}")]
    SelfLoop(NodeId),

    /// The tree is deeper than the configured guard
    #[error("tree depth {depth} exceeds the limit of {limit}")]
    TooDeep { depth: usize, limit: usize },

    /// The layout does not support the requested configuration
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
