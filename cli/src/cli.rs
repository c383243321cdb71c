use std::path::PathBuf;

/// Balanced tree partitioning of grid graphs
#[derive(clap::Parser, Debug)]
#[command(name = "treepart", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Carve a grid into balanced contiguous districts
    Partition(PartitionArgs),

    /// Partition a grid, then run ReCom chains from it
    Chain(ChainArgs),
}

#[derive(clap::Args, Debug)]
pub struct GridArgs {
    /// Grid width in cells
    #[arg(long)]
    pub width: usize,

    /// Grid height in cells
    #[arg(long)]
    pub height: usize,

    /// Number of districts (overrides the config file)
    #[arg(short, long)]
    pub districts: Option<usize>,

    /// Allowed fractional deviation from the ideal population
    #[arg(short, long)]
    pub epsilon: Option<f64>,

    /// Spanning trees drawn per split
    #[arg(long)]
    pub node_repeats: Option<usize>,

    /// Random seed for reproducible runs
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// JSON partition config; command-line flags take precedence
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Draw cell populations uniformly from 1..=MAX instead of 1 each
    #[arg(long, value_name = "MAX")]
    pub random_population: Option<u32>,
}

#[derive(clap::Args, Debug)]
pub struct PartitionArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Output plan file ({node id: district} JSON), defaults to "./plan.json"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ChainArgs {
    #[command(flatten)]
    pub grid: GridArgs,

    /// Partitions per chain, including the initial one
    #[arg(long, default_value_t = 100)]
    pub steps: usize,

    /// Independent chains to run in parallel
    #[arg(long, default_value_t = 1)]
    pub chains: usize,

    /// Proposals drawn per step before holding the chain
    #[arg(long, default_value_t = 100)]
    pub max_proposals: usize,
}
