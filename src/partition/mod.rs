mod assignment;
mod district_sets;
mod partition;
mod recom;
mod recursive;

pub use assignment::Assignment;
pub(crate) use district_sets::DistrictSets;
pub use partition::Partition;
pub use recom::{RecomParams, RecomProposal};
pub use recursive::recursive_tree_part;
