use thiserror::Error;

/// Result alias used by every algorithm in this crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Broad category of a [`GraphError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller assembled an algorithm or query incorrectly.
    Configuration,
    /// The graph (or a value derived from it) violates a model invariant.
    Structural,
    /// The graph is well-formed but outside what the algorithm supports.
    UnsupportedGraph,
}

/// Errors raised by the graph algorithms.
///
/// "No path" and "no cycle" are ordinary results and never show up here.
/// Node and edge values are rendered with their `Debug` representation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("heuristic is not admissible: {0}")]
    NonAdmissibleHeuristic(String),
    #[error("start and goal are the same node: {0}")]
    SameEndpoints(String),
    #[error("node {0} is not a member of the graph")]
    UnknownNode(String),
    #[error("node {0} appears more than once")]
    DuplicateNode(String),
    #[error("edge {edge} references node {node}, which is not a member of the graph")]
    DanglingEdge { edge: String, node: String },
    #[error("edge {edge} connects {count} node reference(s), at least 2 are required")]
    DegenerateEdge { edge: String, count: usize },
    #[error("malformed cycle: {0}")]
    MalformedCycle(String),
    #[error("non-finite weight {weight} on {element}")]
    NonFiniteWeight { element: String, weight: f64 },
    #[error("negative cycle reachable from {0}")]
    NegativeCycle(String),
    #[error("potentials produce negative reweighted cost {cost} on edge {edge}")]
    InvalidPotential { edge: String, cost: f64 },
}

impl GraphError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GraphError::NonAdmissibleHeuristic(_)
            | GraphError::SameEndpoints(_)
            | GraphError::UnknownNode(_) => ErrorKind::Configuration,
            GraphError::DuplicateNode(_)
            | GraphError::DanglingEdge { .. }
            | GraphError::DegenerateEdge { .. }
            | GraphError::MalformedCycle(_) => ErrorKind::Structural,
            GraphError::NonFiniteWeight { .. }
            | GraphError::NegativeCycle(_)
            | GraphError::InvalidPotential { .. } => ErrorKind::UnsupportedGraph,
        }
    }

    pub(crate) fn unknown_node<N: std::fmt::Debug>(node: &N) -> Self {
        GraphError::UnknownNode(format!("{:?}", node))
    }

    pub(crate) fn same_endpoints<N: std::fmt::Debug>(node: &N) -> Self {
        GraphError::SameEndpoints(format!("{:?}", node))
    }
}
