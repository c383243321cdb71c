use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    config::PartitionConfig,
    error::{GraphError, RecomError, SplitError},
    partition::Partition,
    tree::{BalanceTarget, SplitParams, bipartition_tree},
};

/// Parameters of a ReCom move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecomParams {
    pub pop_col: String,
    /// Target population of each re-split district.
    pub ideal_population: f64,
    pub epsilon: f64,
    pub split: SplitParams,
}

impl RecomParams {
    /// Take the population series, tolerance and split knobs from `config`.
    pub fn from_config(config: &PartitionConfig, ideal_population: f64) -> Self {
        Self {
            pop_col: config.pop_col.clone(),
            ideal_population,
            epsilon: config.epsilon,
            split: config.split_params(),
        }
    }

    /// Reject parameters under which no split can ever succeed.
    pub fn validate(&self) -> Result<(), RecomError> {
        let invalid = |msg: String| Err(RecomError::InvalidParams(msg));
        if !(self.ideal_population.is_finite() && self.ideal_population > 0.0) {
            return invalid(format!("ideal_population must be positive, got {}", self.ideal_population));
        }
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return invalid(format!("epsilon must be in (0, 1), got {}", self.epsilon));
        }
        if self.split.node_repeats == 0 { return invalid("node_repeats must be at least 1".into()) }
        Ok(())
    }
}

/// A candidate re-split of two adjacent districts. Nothing changes until it is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct RecomProposal {
    pub a: u32,
    pub b: u32,
    /// Nodes that district `a` will hold.
    pub a_nodes: Vec<usize>,
    /// Nodes that district `b` will hold.
    pub b_nodes: Vec<usize>,
    pub a_population: f64,
    pub b_population: f64,
}

impl Partition {
    /// Draw a ReCom proposal: pick an adjacent district pair uniformly at random, merge it
    /// and re-split the merged region along a balanced spanning-tree cut.
    pub fn propose_recom<R: Rng + ?Sized>(&self, params: &RecomParams, rng: &mut R) -> Result<RecomProposal, RecomError> {
        let pairs = self.adjacent_district_pairs();
        let &(a, b) = pairs.choose(rng).ok_or(RecomError::NoAdjacentDistricts)?;
        self.recombine(a, b, params, rng)
    }

    /// Merge districts `a` and `b` and re-split them with both halves within tolerance.
    /// Returns `ProposalRejected` if no balanced cut turns up within `node_repeats` trees.
    /// Bad parameters and missing, negative or non-finite populations in the merged region
    /// are reported as errors, never as rejections.
    pub fn recombine<R: Rng + ?Sized>(
        &self,
        a: u32,
        b: u32,
        params: &RecomParams,
        rng: &mut R,
    ) -> Result<RecomProposal, RecomError> {
        if !self.districts_adjacent(a, b) { return Err(RecomError::NotAdjacent { a, b }) }

        params.validate()?;

        let populations = self.graph().node_weights().column_slice(&params.pop_col)
            .ok_or_else(|| GraphError::MissingSeries(params.pop_col.clone()))?;

        let merged = self.district_nodes(a).iter()
            .chain(self.district_nodes(b))
            .copied()
            .collect::<Vec<_>>();

        if let Some(&u) = merged.iter().find(|&&u| !(populations[u].is_finite() && populations[u] >= 0.0)) {
            return Err(GraphError::InvalidPopulation {
                node: self.graph().node_id(u).clone(),
                series: params.pop_col.clone(),
                value: populations[u],
            }.into());
        }

        let target = BalanceTarget::pair(params.ideal_population, params.epsilon);
        match bipartition_tree(self.graph(), populations, &merged, &target, &params.split, rng) {
            Ok(split) => {
                trace!(a, b, a_nodes = split.piece.len(), b_nodes = split.rest.len(), "recombined districts");
                Ok(RecomProposal {
                    a,
                    b,
                    a_nodes: split.piece,
                    b_nodes: split.rest,
                    a_population: split.piece_population,
                    b_population: split.rest_population,
                })
            }
            Err(SplitError::NoBalancedSplit) => {
                Err(RecomError::ProposalRejected { a, b, node_repeats: params.split.node_repeats })
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{graph::{GraphBuilder, grid}, partition::Assignment};

    fn stripes() -> Partition {
        // 6 x 4 grid, three vertical stripes of width 2.
        let graph = grid(6, 4, |_, _| [("population", 1.0)]);
        let assignment = Assignment::new((0..24).map(|i| ((i % 6) / 2) as u32).collect(), 3).unwrap();
        Partition::new(graph, &assignment).unwrap()
    }

    fn params(node_repeats: usize) -> RecomParams {
        RecomParams {
            pop_col: "population".into(),
            ideal_population: 8.0,
            epsilon: 0.2,
            split: SplitParams { node_repeats, ..Default::default() },
        }
    }

    #[test]
    fn proposals_keep_districts_balanced_and_contiguous() {
        let partition = stripes();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..20 {
            let proposal = match partition.propose_recom(&params(20), &mut rng) {
                Ok(proposal) => proposal,
                Err(err) => { assert!(err.is_rejection(), "{err}"); continue }
            };

            assert_eq!(proposal.b, proposal.a + 1); // stripes only touch their neighbours
            assert_eq!(proposal.a_nodes.len() + proposal.b_nodes.len(), 16);
            assert!(proposal.a_population > 6.4 && proposal.a_population < 9.6);
            assert!(proposal.b_population > 6.4 && proposal.b_population < 9.6);

            let next = partition.with_proposal(&proposal);
            assert!(next.is_contiguous());
            assert_eq!(next.tallies("population").unwrap().iter().sum::<f64>(), 24.0);
        }

        // Proposals never touch the partition they came from.
        assert_eq!(partition.tallies("population"), Some(vec![8.0, 8.0, 8.0]));
    }

    #[test]
    fn non_adjacent_districts_are_refused() {
        let partition = stripes();
        let result = partition.recombine(0, 2, &params(1), &mut StdRng::seed_from_u64(0));
        assert_eq!(result, Err(RecomError::NotAdjacent { a: 0, b: 2 }));
    }

    #[test]
    fn impossible_balance_is_a_rejection() {
        let partition = stripes();
        let tight = RecomParams { ideal_population: 3.0, epsilon: 0.01, ..params(3) };
        let result = partition.recombine(0, 1, &tight, &mut StdRng::seed_from_u64(0));
        assert_eq!(result, Err(RecomError::ProposalRejected { a: 0, b: 1, node_repeats: 3 }));
    }

    #[test]
    fn single_district_has_no_pairs() {
        let graph = grid(2, 2, |_, _| [("population", 1.0)]);
        let partition = Partition::new(graph, &Assignment::new(vec![0; 4], 1).unwrap()).unwrap();
        let result = partition.propose_recom(&params(1), &mut StdRng::seed_from_u64(0));
        assert_eq!(result, Err(RecomError::NoAdjacentDistricts));
    }

    /// Path `0 - 1 - 2 - 3` split into {0, 1} and {2, 3}.
    fn path_with(populations: [Option<f64>; 4]) -> Partition {
        let mut builder = GraphBuilder::new();
        for (id, population) in populations.into_iter().enumerate() {
            builder.add_node(id, population.map(|p| ("population", p))).unwrap();
        }
        for id in 1..4usize { builder.add_edge(id - 1, id).unwrap(); }
        Partition::new(builder.build(), &Assignment::new(vec![0, 0, 1, 1], 2).unwrap()).unwrap()
    }

    fn path_params() -> RecomParams {
        RecomParams { ideal_population: 3.0, epsilon: 0.5, ..params(3) }
    }

    #[test]
    fn negative_population_is_an_error() {
        let partition = path_with([Some(2.0), Some(2.0), Some(-1.0), Some(3.0)]);
        let result = partition.recombine(0, 1, &path_params(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(RecomError::Graph(GraphError::InvalidPopulation { value, .. })) if value == -1.0));
    }

    #[test]
    fn missing_population_value_is_an_error_not_a_rejection() {
        let partition = path_with([Some(2.0), None, Some(2.0), Some(2.0)]);
        let result = partition.propose_recom(&path_params(), &mut StdRng::seed_from_u64(0));
        match result {
            Err(err @ RecomError::Graph(GraphError::InvalidPopulation { .. })) => assert!(!err.is_rejection()),
            other => panic!("expected InvalidPopulation, got {other:?}"),
        }
    }

    #[test]
    fn degenerate_params_are_rejected_up_front() {
        let partition = stripes();
        let cases = [
            params(0),
            RecomParams { epsilon: 0.0, ..params(1) },
            RecomParams { epsilon: 1.5, ..params(1) },
            RecomParams { ideal_population: 0.0, ..params(1) },
            RecomParams { ideal_population: f64::NAN, ..params(1) },
        ];
        for case in cases {
            assert!(matches!(case.validate(), Err(RecomError::InvalidParams(_))), "{case:?}");
            let result = partition.recombine(0, 1, &case, &mut StdRng::seed_from_u64(0));
            assert!(matches!(result, Err(RecomError::InvalidParams(_))), "{case:?}");
        }
        assert!(params(1).validate().is_ok());
    }

    #[test]
    fn missing_population_series_is_reported() {
        let partition = stripes();
        let missing = RecomParams { pop_col: "votes".into(), ..params(1) };
        let result = partition.recombine(0, 1, &missing, &mut StdRng::seed_from_u64(0));
        assert_eq!(result, Err(RecomError::Graph(GraphError::MissingSeries("votes".into()))));
    }
}
