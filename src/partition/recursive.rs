use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    config::PartitionConfig,
    error::{PartitionError, SplitError},
    graph::Graph,
    partition::Assignment,
    tree::{BalanceTarget, PopulationBounds, SplitParams, bipartition_tree},
};

/// Partition `graph` into `config.num_districts` contiguous districts, each with population
/// strictly within `epsilon` of the ideal, by repeatedly peeling one district off a spanning
/// tree of the unassigned remainder.
///
/// A failed split restarts the whole partition from the full graph, up to `max_attempts` times.
/// Precondition violations (bad config, missing or negative population, disconnected graph)
/// fail immediately without touching `rng`.
pub fn recursive_tree_part<R: Rng + ?Sized>(
    graph: &Graph,
    config: &PartitionConfig,
    rng: &mut R,
) -> Result<Assignment, PartitionError> {
    config.validate()?;

    let k = config.num_districts;
    let n = graph.node_count();
    if k > n {
        return Err(PartitionError::InvalidConfig(format!("cannot carve {k} districts from {n} nodes")));
    }

    let populations = graph.populations(&config.pop_col)?;
    graph.check_connected()?;

    let all_nodes = (0..n).collect::<Vec<_>>();
    let total = graph.total_population(&all_nodes, &populations);
    let ideal = config.ideal_population.unwrap_or(total / k as f64);
    if !(ideal > 0.0) {
        return Err(PartitionError::InvalidConfig(format!("ideal population must be positive, got {ideal}")));
    }

    if k == 1 {
        info!(nodes = n, population = total, "single district requested");
        return Assignment::new(vec![0; n], 1);
    }

    let bounds = PopulationBounds::around(ideal, config.epsilon);
    let params = config.split_params();

    let mut last = None;
    for attempt in 1..=config.max_attempts {
        match attempt_partition(graph, &populations, k, bounds, &params, rng) {
            Ok(districts) => {
                let assignment = Assignment::new(districts, k as u32)?;
                assignment.validate(graph, &populations, Some(bounds))?;
                info!(attempt, districts = k, cut_edges = assignment.cut_edges(graph), "recursive partition complete");
                return Ok(assignment);
            }
            Err(err) if err.is_retryable() => {
                warn!(attempt, max_attempts = config.max_attempts, error = %err, "partition attempt failed, restarting");
                last = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    let last = last.unwrap_or_else(|| unreachable!("max_attempts is validated to be at least 1"));
    Err(PartitionError::RuntimeFailure { attempts: config.max_attempts, last: Box::new(last) })
}

/// One pass over the full graph: peel `k - 1` districts, then take the remainder.
/// The last split bounds both sides, so the remainder is always a valid district.
/// Returns the district of every node.
fn attempt_partition<R: Rng + ?Sized>(
    graph: &Graph,
    populations: &[f64],
    k: usize,
    bounds: PopulationBounds,
    params: &SplitParams,
    rng: &mut R,
) -> Result<Vec<u32>, PartitionError> {
    let ideal = bounds.center();
    let mut districts = vec![u32::MAX; graph.node_count()];
    let mut remaining = (0..graph.node_count()).collect::<Vec<_>>();
    let mut remaining_population = graph.total_population(&remaining, populations);

    // Sum of (district - ideal) over peeled districts; kept within tolerance so the last one fits.
    let mut debt = 0.0;

    for depth in 0..k - 1 {
        let piece_bounds = PopulationBounds {
            min: bounds.min.max(bounds.min - debt),
            max: bounds.max.min(bounds.max - debt),
        };

        let target = if depth + 2 == k {
            BalanceTarget { piece: piece_bounds, rest: bounds }
        } else {
            BalanceTarget::peel(piece_bounds)
        };

        let split = match bipartition_tree(graph, populations, &remaining, &target, params, rng) {
            Ok(split) => split,
            Err(SplitError::NoBalancedSplit) => {
                return Err(PartitionError::PartitionAttemptFailed {
                    depth,
                    node_repeats: params.node_repeats,
                    remaining_nodes: remaining.len(),
                    remaining_population,
                });
            }
            Err(err) => return Err(err.into()),
        };

        debug!(depth, nodes = split.piece.len(), population = split.piece_population, debt, "district peeled");
        for &u in &split.piece { districts[u] = depth as u32 }
        debt += split.piece_population - ideal;
        remaining = split.rest;
        remaining_population = split.rest_population;
    }

    debug_assert!(bounds.contains(remaining_population), "final district population {remaining_population} out of bounds");
    for &u in &remaining { districts[u] = (k - 1) as u32 }
    Ok(districts)
}
