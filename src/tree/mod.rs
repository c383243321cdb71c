mod balance;
mod bipartition;
mod spanning_tree;
mod union_find;

pub use balance::{BalanceTarget, Cut, CutChoice, PopulationBounds, balanced_cuts, find_balanced_cut};
pub use bipartition::{Bipartition, SplitParams, bipartition_tree};
pub use spanning_tree::{SpanningTree, TreeSampler};
