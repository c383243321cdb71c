#![doc = "Balanced spanning-tree partitioning of districting graphs and ReCom Markov chains"]
pub mod chain;
pub mod config;
pub mod error;
pub mod graph;
pub mod partition;
pub mod tree;

#[doc(inline)]
pub use config::{ChainConfig, PartitionConfig};

#[doc(inline)]
pub use error::{ChainError, GraphError, PartitionError, RecomError, SplitError};

#[doc(inline)]
pub use graph::{Graph, GraphBuilder, NodeId, grid};

#[doc(inline)]
pub use partition::{Assignment, Partition, RecomParams, RecomProposal, recursive_tree_part};

#[doc(inline)]
pub use chain::{MarkovChain, run_ensembles};
