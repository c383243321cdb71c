use anyhow::{Context, Result};
use treepart::{
    ChainConfig, Partition, RecomParams,
    chain::{always_accept, contiguous, districts_won, within_percent_of_ideal_population},
    recursive_tree_part, run_ensembles,
};

use crate::commands::{Seeds, build_grid, load_config, print_summary};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ChainArgs) -> Result<()> {
    let config = load_config(&args.grid)?;
    let seeds = Seeds::from_config(&config);
    let graph = build_grid(&args.grid, &config, seeds.grid);

    println!("[chain] building initial plan with {} districts", config.num_districts);
    let assignment = recursive_tree_part(&graph, &config, &mut seeds.partition_rng())?;
    print_summary(&graph, &config, &assignment)?;

    let initial = Partition::new(graph, &assignment)?;
    let ideal = initial.tallies(&config.pop_col)
        .context("population series missing from tallies")?
        .iter().sum::<f64>() / config.num_districts as f64;

    let params = RecomParams::from_config(&config, ideal);
    let constraints = [within_percent_of_ideal_population(&initial, config.epsilon, &config.pop_col), contiguous()];
    let chain_config = ChainConfig { total_steps: args.steps, max_proposals_per_step: args.max_proposals };

    println!("[chain] running {} chain(s) of {} steps", args.chains, args.steps);
    let runs = run_ensembles(&initial, &params, &constraints, &always_accept(), chain_config, args.chains, seeds.chains,
        |partition| (partition.cut_edges(), districts_won(partition, "votes_a", "votes_b")))?;

    for run in &runs {
        let cut_edges = run.values.iter().map(|&(cut, _)| cut).collect::<Vec<_>>();
        let mean = cut_edges.iter().sum::<usize>() as f64 / cut_edges.len().max(1) as f64;
        let won = run.values.last().map(|&(_, won)| won).unwrap_or_default();

        println!("chain {:>3}: cut edges min {} mean {mean:.1} max {}; final districts won by votes_a: {won}",
            run.chain,
            cut_edges.iter().min().copied().unwrap_or_default(),
            cut_edges.iter().max().copied().unwrap_or_default());
        println!("           {}", serde_json::to_string(&run.stats)?);
        println!("           rejection rate {:.1}%", 100.0 * run.stats.rejection_rate());
        if let Some(err) = &run.error { println!("           stopped early: {err}") }
    }

    Ok(())
}
