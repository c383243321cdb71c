//! Error types for graph construction, tree splitting, recursive partitioning,
//! ReCom proposals and chain runs.
use thiserror::Error;

use crate::graph::NodeId;

/// Errors raised while building or reading a [`crate::Graph`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("node {0} declared more than once")]
    DuplicateNode(NodeId),

    #[error("edge endpoint {0} is not a declared node")]
    UnknownNode(NodeId),

    #[error("self-loop on node {0} is not allowed")]
    SelfLoop(NodeId),

    #[error("node attribute series '{0}' not found")]
    MissingSeries(String),

    #[error("node {node} has invalid population {value} in series '{series}'")]
    InvalidPopulation { node: NodeId, series: String, value: f64 },

    #[error("graph is disconnected: {reached} of {total} nodes reachable from the first node")]
    Disconnected { reached: usize, total: usize },
}

/// Errors raised by a single spanning-tree split.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SplitError {
    /// The tree has no edge whose cut lands both sides within tolerance.
    #[error("no balanced cut edge in spanning tree")]
    NoBalancedSplit,

    /// The node set handed to the sampler does not induce a connected subgraph.
    #[error("node set of size {nodes} is disconnected (spanning forest has {edges} edges)")]
    Disconnected { nodes: usize, edges: usize },
}

/// Errors raised by the recursive partitioner.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PartitionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Split(#[from] SplitError),

    /// `node_repeats` spanning trees all failed to yield a balanced cut.
    #[error("no balanced split after {node_repeats} spanning trees at depth {depth} ({remaining_nodes} nodes, population {remaining_population} left)")]
    PartitionAttemptFailed {
        depth: usize,
        node_repeats: usize,
        remaining_nodes: usize,
        remaining_population: f64,
    },

    /// Every whole-partition attempt failed.
    #[error("recursive partition failed after {attempts} attempts; last cause: {last}")]
    RuntimeFailure { attempts: usize, last: Box<PartitionError> },

    #[error("invalid assignment: {0}")]
    InvalidAssignment(String),
}

impl PartitionError {
    /// Whether a fresh whole-partition attempt may succeed after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PartitionError::PartitionAttemptFailed { .. })
    }
}

/// Errors raised while proposing a ReCom move.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecomError {
    /// Expected outcome in a random walk; the chain stays or redraws.
    #[error("proposal rejected: no balanced re-split of districts {a} and {b} after {node_repeats} spanning trees")]
    ProposalRejected { a: u32, b: u32, node_repeats: usize },

    #[error("partition has no pair of adjacent districts")]
    NoAdjacentDistricts,

    #[error("districts {a} and {b} do not share an edge")]
    NotAdjacent { a: u32, b: u32 },

    #[error("invalid ReCom parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Split(#[from] SplitError),
}

impl RecomError {
    /// Whether this error is a normal rejection rather than a fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, RecomError::ProposalRejected { .. })
    }
}

/// Errors raised by the Markov-chain driver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    #[error("invalid chain configuration: {0}")]
    InvalidConfig(String),

    #[error("initial partition violates constraint '{0}'")]
    InvalidInitialState(String),

    /// A proposal failed for a reason other than a normal rejection.
    #[error(transparent)]
    Recom(#[from] RecomError),
}
