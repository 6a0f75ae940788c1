use anyhow::Result;
use clap::Parser;

use oaemap::cli::{Cli, Commands};
use oaemap::commands::{inspect, render};

fn main() -> Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Inspect(args) => inspect::run(&cli, args),
        Commands::Render(args) => render::run(&cli, args),
    }
}
