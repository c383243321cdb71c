// End-to-end scenarios for recursive partitioning, ReCom proposals and chains.
use rand::{Rng, SeedableRng, rngs::StdRng};
use rstest::rstest;
use treepart::{
    ChainConfig, Graph, GraphBuilder, Partition, PartitionConfig, PartitionError, RecomParams, grid,
    chain::{MarkovChain, always_accept, contiguous, within_percent_of_ideal_population},
    recursive_tree_part,
    tree::{CutChoice, PopulationBounds, TreeSampler},
};

/// Nodes `0..n` with edges `i - 1, i` (plus `n - 1, 0` when `closed`), every node holding `population`.
fn ring_or_path(n: u32, population: f64, closed: bool) -> Graph {
    let mut builder = GraphBuilder::new();
    for id in 0..n { builder.add_node(id, [("population", population)]).unwrap(); }
    for id in 1..n { builder.add_edge(id - 1, id).unwrap(); }
    if closed { builder.add_edge(n - 1, 0u32).unwrap(); }
    builder.build()
}

#[rstest]
fn four_cycle_splits_into_adjacent_pairs(#[values(0, 1, 2, 3, 4, 5, 6, 7)] seed: u64) {
    let graph = ring_or_path(4, 1.0, true);
    let config = PartitionConfig { ideal_population: Some(2.0), epsilon: 0.5, max_attempts: 1, ..Default::default() };

    let assignment = recursive_tree_part(&graph, &config, &mut StdRng::seed_from_u64(seed)).unwrap();

    for nodes in assignment.district_nodes() {
        assert_eq!(nodes.len(), 2);
        assert!(graph.is_connected_subset(&nodes), "diagonal district {nodes:?}");
    }
}

#[rstest]
fn uniform_path_splits_into_runs_of_two(
    #[values(0, 7, 42)] seed: u64,
    #[values(TreeSampler::RandomMst, TreeSampler::Uniform)] sampler: TreeSampler,
) {
    let graph = ring_or_path(10, 10.0, false);
    let config = PartitionConfig {
        num_districts: 5,
        ideal_population: Some(20.0),
        epsilon: 0.1,
        max_attempts: 1,
        sampler,
        ..Default::default()
    };

    let assignment = recursive_tree_part(&graph, &config, &mut StdRng::seed_from_u64(seed)).unwrap();

    let mut runs = assignment.district_nodes();
    runs.sort();
    let expected = (0..5).map(|i| vec![2 * i, 2 * i + 1]).collect::<Vec<_>>();
    assert_eq!(runs, expected);
}

#[test]
fn single_district_never_samples() {
    let graph = grid(5, 5, |_, _| [("population", 3.0)]);
    let config = PartitionConfig { num_districts: 1, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(99);
    let mut fresh = StdRng::seed_from_u64(99);

    let assignment = recursive_tree_part(&graph, &config, &mut rng).unwrap();

    assert_eq!(assignment.num_districts(), 1);
    assert!(assignment.as_slice().iter().all(|&d| d == 0));
    assert_eq!(rng.random::<u64>(), fresh.random::<u64>());
}

#[test]
fn skewed_population_terminates() {
    // One node holds 90% of the population; no cut can land within 1% of half.
    let mut builder = GraphBuilder::new();
    builder.add_node("big", [("population", 900.0)]).unwrap();
    for i in 0..10 {
        builder.add_node(format!("small{i}"), [("population", 10.0)]).unwrap();
        builder.add_edge(if i == 0 { "big".to_string() } else { format!("small{}", i - 1) }, format!("small{i}")).unwrap();
    }
    let graph = builder.build();
    let config = PartitionConfig { epsilon: 0.01, node_repeats: 5, max_attempts: 10, ..Default::default() };

    let result = recursive_tree_part(&graph, &config, &mut StdRng::seed_from_u64(0));

    match result {
        Err(PartitionError::RuntimeFailure { attempts, last }) => {
            assert_eq!(attempts, 10);
            assert!(last.is_retryable());
        }
        other => panic!("expected RuntimeFailure, got {other:?}"),
    }
}

#[rstest]
fn grid_partitions_hold_every_invariant(
    #[values(1, 2, 3)] seed: u64,
    #[values(2, 5)] num_districts: usize,
    #[values(TreeSampler::RandomMst, TreeSampler::Uniform)] sampler: TreeSampler,
    #[values(CutChoice::Uniform, CutChoice::MostBalanced)] cut_choice: CutChoice,
) {
    let mut populations = StdRng::seed_from_u64(1000 + seed);
    let graph = grid(10, 10, |_, _| [("population", populations.random_range(1..=4) as f64)]);
    let config = PartitionConfig { num_districts, epsilon: 0.1, node_repeats: 10, sampler, cut_choice, ..Default::default() };

    let assignment = recursive_tree_part(&graph, &config, &mut StdRng::seed_from_u64(seed)).unwrap();

    let pops = graph.populations("population").unwrap();
    let ideal = pops.iter().sum::<f64>() / num_districts as f64;
    assert_eq!(assignment.len(), graph.node_count());
    assert_eq!(assignment.num_districts() as usize, num_districts);
    assert!(assignment.validate(&graph, &pops, Some(PopulationBounds::around(ideal, 0.1))).is_ok());
}

#[rstest]
fn spanning_trees_cover_their_node_set(
    #[values(0, 1, 2)] seed: u64,
    #[values(TreeSampler::RandomMst, TreeSampler::Uniform)] sampler: TreeSampler,
) {
    let graph = grid(7, 5, |_, _| [("population", 1.0)]);
    let nodes = (0..graph.node_count()).filter(|u| u % 7 < 4).collect::<Vec<_>>();
    let subgraph = graph.induced_subgraph(&nodes);

    let tree = sampler.sample(&subgraph, &mut StdRng::seed_from_u64(seed)).unwrap();

    assert_eq!(tree.node_count(), nodes.len());
    assert_eq!(tree.edges().count(), nodes.len() - 1);
    for (u, v) in tree.edges() {
        assert!(subgraph.neighbors(u).any(|w| w == v), "tree edge ({u}, {v}) not in subgraph");
    }
}

#[rstest]
fn recom_proposals_preserve_invariants(#[values(11, 12, 13)] seed: u64) {
    let graph = grid(8, 8, |_, _| [("population", 1.0)]);
    let config = PartitionConfig { num_districts: 4, epsilon: 0.1, node_repeats: 10, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(seed);
    let assignment = recursive_tree_part(&graph, &config, &mut rng).unwrap();
    let partition = Partition::new(graph, &assignment).unwrap();
    let params = RecomParams::from_config(&config, 16.0);
    let bounds = PopulationBounds::around(16.0, 0.1);

    let mut accepted = 0;
    for _ in 0..30 {
        match partition.propose_recom(&params, &mut rng) {
            Ok(proposal) => {
                let next = partition.with_proposal(&proposal);
                let pops = next.graph().populations("population").unwrap();
                assert!(next.to_assignment().validate(next.graph(), &pops, Some(bounds)).is_ok());
                accepted += 1;
            }
            Err(err) => assert!(err.is_rejection(), "{err}"),
        }
    }
    assert!(accepted > 0);
    assert_eq!(partition.to_assignment(), assignment);
}

#[rstest]
fn chain_states_stay_valid(#[values(21, 22)] seed: u64) {
    let graph = grid(6, 6, |x, _| [("population", 1.0), ("votes", x as f64)]);
    let config = PartitionConfig { num_districts: 3, epsilon: 0.1, node_repeats: 10, ..Default::default() };
    let mut rng = StdRng::seed_from_u64(seed);
    let assignment = recursive_tree_part(&graph, &config, &mut rng).unwrap();
    let initial = Partition::new(graph, &assignment).unwrap();
    let constraints = vec![within_percent_of_ideal_population(&initial, 0.1, "population"), contiguous()];

    let mut chain = MarkovChain::new(
        initial,
        RecomParams::from_config(&config, 12.0),
        constraints.clone(),
        always_accept(),
        ChainConfig { total_steps: 25, max_proposals_per_step: 20 },
        rng,
    ).unwrap();

    let mut count = 0;
    for state in chain.by_ref() {
        assert!(constraints.iter().all(|c| c.check(&state)));
        assert_eq!(state.tallies("votes").unwrap().iter().sum::<f64>(), 6.0 * 15.0);
        count += 1;
    }

    assert_eq!(count, 25);
    let stats = chain.stats();
    assert_eq!(stats.steps, 24);
    assert_eq!(stats.accepted + stats.held, 24);
    assert!(chain.error().is_none());
}
