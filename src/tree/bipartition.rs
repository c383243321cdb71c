use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    error::SplitError,
    graph::Graph,
    tree::{BalanceTarget, CutChoice, TreeSampler, find_balanced_cut},
};

/// Knobs shared by every tree split.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitParams {
    /// Spanning trees to draw before giving up on a split.
    pub node_repeats: usize,
    #[serde(default)]
    pub sampler: TreeSampler,
    #[serde(default)]
    pub cut_choice: CutChoice,
}

impl Default for SplitParams {
    fn default() -> Self {
        Self { node_repeats: 1, sampler: TreeSampler::default(), cut_choice: CutChoice::default() }
    }
}

/// Two disjoint, connected node sets (graph indices) covering the input set.
#[derive(Clone, Debug, PartialEq)]
pub struct Bipartition {
    pub piece: Vec<usize>,
    pub rest: Vec<usize>,
    pub piece_population: f64,
    pub rest_population: f64,
}

/// Try to split `nodes` into a balanced (piece, rest) pair: draw a spanning tree of the
/// induced subgraph and look for an acceptable cut edge, redrawing up to `node_repeats` times.
///
/// Returns `NoBalancedSplit` once the budget is spent, or `Disconnected` immediately
/// if `nodes` does not induce a connected subgraph.
pub fn bipartition_tree<R: Rng + ?Sized>(
    graph: &Graph,
    populations: &[f64],
    nodes: &[usize],
    target: &BalanceTarget,
    params: &SplitParams,
    rng: &mut R,
) -> Result<Bipartition, SplitError> {
    assert!(params.node_repeats > 0, "node_repeats must be at least 1");

    let subgraph = graph.induced_subgraph(nodes);
    let local_populations = subgraph.nodes().iter().map(|&u| populations[u]).collect::<Vec<_>>();

    for attempt in 1..=params.node_repeats {
        let tree = params.sampler.sample(&subgraph, rng)?;

        match find_balanced_cut(&tree, &local_populations, target, params.cut_choice, rng) {
            Ok(cut) => {
                let (piece, rest) = cut.sides(&tree);
                trace!(attempt, piece = piece.len(), rest = rest.len(), "balanced cut found");
                return Ok(Bipartition {
                    piece: piece.into_iter().map(|u| subgraph.global(u)).collect(),
                    rest: rest.into_iter().map(|u| subgraph.global(u)).collect(),
                    piece_population: cut.piece_population,
                    rest_population: cut.rest_population,
                });
            }
            Err(SplitError::NoBalancedSplit) => {
                trace!(attempt, nodes = nodes.len(), "no balanced cut in spanning tree");
            }
            Err(err) => return Err(err),
        }
    }

    debug!(nodes = nodes.len(), node_repeats = params.node_repeats, "bipartition budget exhausted");
    Err(SplitError::NoBalancedSplit)
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::graph::grid;

    #[test]
    fn splits_a_grid_into_balanced_connected_halves() {
        let graph = grid(6, 6, |_, _| [("pop", 1.0)]);
        let pops = graph.populations("pop").unwrap();
        let nodes = (0..graph.node_count()).collect::<Vec<_>>();
        let params = SplitParams { node_repeats: 50, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(11);

        let split = bipartition_tree(&graph, &pops, &nodes, &BalanceTarget::pair(18.0, 0.1), &params, &mut rng).unwrap();

        assert_eq!(split.piece.len() + split.rest.len(), 36);
        assert!(split.piece_population > 16.2 && split.piece_population < 19.8);
        assert!(split.rest_population > 16.2 && split.rest_population < 19.8);
        assert_eq!(graph.total_population(&split.piece, &pops), split.piece_population);
        assert!(graph.is_connected_subset(&split.piece));
        assert!(graph.is_connected_subset(&split.rest));
    }

    #[test]
    fn operates_on_a_subset_only() {
        let graph = grid(4, 4, |_, _| [("pop", 1.0)]);
        let pops = graph.populations("pop").unwrap();
        // Top two rows.
        let nodes = (0..8).collect::<Vec<_>>();
        let params = SplitParams { node_repeats: 50, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(5);

        let split = bipartition_tree(&graph, &pops, &nodes, &BalanceTarget::pair(4.0, 0.2), &params, &mut rng).unwrap();
        let mut all = split.piece.iter().chain(&split.rest).copied().collect::<Vec<_>>();
        all.sort_unstable();
        assert_eq!(all, nodes);
        assert_eq!(split.piece.len(), 4);
    }

    #[test]
    fn exhausted_budget_reports_no_balanced_split() {
        let graph = grid(3, 1, |x, _| [("pop", if x == 0 { 90.0 } else { 5.0 })]);
        let pops = graph.populations("pop").unwrap();
        let params = SplitParams { node_repeats: 5, ..Default::default() };
        let mut rng = StdRng::seed_from_u64(2);

        let result = bipartition_tree(&graph, &pops, &[0, 1, 2], &BalanceTarget::pair(50.0, 0.01), &params, &mut rng);
        assert_eq!(result, Err(SplitError::NoBalancedSplit));
    }

    #[test]
    fn disconnected_subset_fails_fast() {
        let graph = grid(3, 1, |_, _| [("pop", 1.0)]);
        let pops = graph.populations("pop").unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        let result = bipartition_tree(&graph, &pops, &[0, 2], &BalanceTarget::pair(1.0, 0.5), &SplitParams::default(), &mut rng);
        assert_eq!(result, Err(SplitError::Disconnected { nodes: 2, edges: 0 }));
    }
}
