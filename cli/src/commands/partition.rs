use anyhow::Result;
use treepart::recursive_tree_part;

use crate::commands::{Seeds, build_grid, load_config, print_summary, write_plan};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::PartitionArgs) -> Result<()> {
    let out_path = &args.output.clone().unwrap_or("./plan.json".into());
    let config = load_config(&args.grid)?;
    let seeds = Seeds::from_config(&config);
    let graph = build_grid(&args.grid, &config, seeds.grid);

    println!("[partition] carving {} districts from a {}x{} grid (epsilon {})",
        config.num_districts, args.grid.width, args.grid.height, config.epsilon);
    let assignment = recursive_tree_part(&graph, &config, &mut seeds.partition_rng())?;
    print_summary(&graph, &config, &assignment)?;

    println!("[partition] writing plan to {}", out_path.display());
    write_plan(out_path, &graph, &assignment)
}
