mod builder;
mod graph;
mod grid;
mod node_id;
mod subgraph;
mod weights;

pub use builder::GraphBuilder;
pub use graph::Graph;
pub use grid::grid;
pub use node_id::NodeId;
pub use subgraph::Subgraph;
pub use weights::WeightMatrix;
