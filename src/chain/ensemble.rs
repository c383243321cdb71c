use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use tracing::info;

use crate::{
    chain::{Acceptance, ChainStats, Constraint, MarkovChain},
    config::ChainConfig,
    error::ChainError,
    partition::{Partition, RecomParams},
};

/// Statistics gathered by one chain of an ensemble.
#[derive(Clone, Debug)]
pub struct EnsembleRun<T> {
    pub chain: usize,
    /// One value per yielded partition.
    pub values: Vec<T>,
    pub stats: ChainStats,
    /// Set if the chain stopped early.
    pub error: Option<ChainError>,
}

/// Run `num_chains` independent chains from `initial` in parallel, chain `i` seeded with
/// `seed + i`, mapping every yielded partition through `statistic`.
#[allow(clippy::too_many_arguments)]
pub fn run_ensembles<T, F>(
    initial: &Partition,
    params: &RecomParams,
    constraints: &[Constraint],
    acceptance: &Acceptance,
    config: ChainConfig,
    num_chains: usize,
    seed: u64,
    statistic: F,
) -> Result<Vec<EnsembleRun<T>>, ChainError>
where
    T: Send,
    F: Fn(&Partition) -> T + Sync,
{
    (0..num_chains).into_par_iter()
        .map(|chain| {
            let rng = StdRng::seed_from_u64(seed.wrapping_add(chain as u64));
            let mut walk = MarkovChain::new(initial.clone(), params.clone(), constraints.to_vec(),
                acceptance.clone(), config, rng)?;

            let values = walk.by_ref().map(|partition| statistic(&partition)).collect::<Vec<_>>();
            info!(chain, steps = values.len(), accepted = walk.stats().accepted, "ensemble chain finished");

            Ok(EnsembleRun { chain, values, stats: walk.stats(), error: walk.error().cloned() })
        })
        .collect()
}

/// Number of districts where the `winner` tally exceeds the `loser` tally,
/// e.g. districts with a Republican majority.
pub fn districts_won(partition: &Partition, winner: &str, loser: &str) -> usize {
    match (partition.tallies(winner), partition.tallies(loser)) {
        (Some(w), Some(l)) => w.iter().zip(&l).filter(|(w, l)| w > l).count(),
        _ => 0,
    }
}
