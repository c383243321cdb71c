mod constraints;
mod ensemble;
mod markov;

pub use constraints::{Acceptance, Constraint, always_accept, contiguous, within_percent_of_ideal_population};
pub use ensemble::{EnsembleRun, districts_won, run_ensembles};
pub use markov::{ChainStats, MarkovChain};
