pub mod chain;
pub mod partition;

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};
use treepart::{Assignment, Graph, PartitionConfig, grid};

use crate::cli::GridArgs;

/// Population series of generated grids.
pub(crate) const POP_COL: &str = "population";

/// Read the config file (if any), then apply command-line overrides.
pub(crate) fn load_config(args: &GridArgs) -> Result<PartitionConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            PartitionConfig::from_json(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => PartitionConfig { pop_col: POP_COL.to_string(), ..Default::default() },
    };

    if let Some(districts) = args.districts { config.num_districts = districts }
    if let Some(epsilon) = args.epsilon { config.epsilon = epsilon }
    if let Some(node_repeats) = args.node_repeats { config.node_repeats = node_repeats }
    if args.seed.is_some() { config.seed = args.seed }

    config.validate()?;
    Ok(config)
}

/// Separate seeds for each random stream of a run, drawn from the configured seed
/// (or fresh entropy without one).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Seeds {
    pub grid: u64,
    pub partition: u64,
    pub chains: u64,
}

impl Seeds {
    pub(crate) fn from_config(config: &PartitionConfig) -> Self {
        let mut master = config.rng();
        Self { grid: master.random(), partition: master.random(), chains: master.random() }
    }

    /// Random source for the recursive partitioner.
    pub(crate) fn partition_rng(&self) -> StdRng { StdRng::seed_from_u64(self.partition) }
}

/// Build a `width` x `height` grid with a population series and two vote series
/// (`votes_a`, `votes_b`) that split each cell's population at random.
pub(crate) fn build_grid(args: &GridArgs, config: &PartitionConfig, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let max = args.random_population.unwrap_or(1).max(1);

    grid(args.width, args.height, |_, _| {
        let population = rng.random_range(1..=max) as f64;
        let share = rng.random::<f64>();
        [
            (config.pop_col.clone(), population),
            ("votes_a".to_string(), (population * share).round()),
            ("votes_b".to_string(), population - (population * share).round()),
        ]
    })
}

/// Write `{node id: district}` as pretty JSON.
pub(crate) fn write_plan(path: &Path, graph: &Graph, assignment: &Assignment) -> Result<()> {
    let plan = graph.node_ids().iter()
        .map(|id| id.as_str())
        .zip(assignment.as_slice().iter().copied())
        .collect::<BTreeMap<_, _>>();

    let text = serde_json::to_string_pretty(&plan)?;
    fs::write(path, text).with_context(|| format!("failed to write plan {}", path.display()))
}

/// Print per-district populations and the cut-edge count.
pub(crate) fn print_summary(graph: &Graph, config: &PartitionConfig, assignment: &Assignment) -> Result<()> {
    let populations = graph.populations(&config.pop_col)?;
    let totals = assignment.district_populations(&populations);
    let ideal = totals.iter().sum::<f64>() / totals.len() as f64;

    for (district, population) in totals.iter().enumerate() {
        println!("district {district:>3}: population {population:>10} ({:+.2}%)", 100.0 * (population - ideal) / ideal);
    }
    println!("cut edges: {}", assignment.cut_edges(graph));
    Ok(())
}
