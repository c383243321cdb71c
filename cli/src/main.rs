mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{chain, partition};

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match &cli.command {
        Commands::Partition(args) => partition::run(&cli, args),
        Commands::Chain(args) => chain::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
