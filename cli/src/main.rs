mod cli;
mod commands;
mod logger;

use cli::{Cli, Commands};
use commands::{generate, solve};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    logger::init(cli.verbose)?;
    match &cli.command {
        Commands::Solve(args) => solve::run(&cli, args),
        Commands::Generate(args) => generate::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
