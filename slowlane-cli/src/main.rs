//! ## slowlane-cli
//! **Command-line front end for the two-server queue simulator**
//!
//! `simulate` runs one configuration (optionally replicated), `replay`
//! checks a recorded scenario, `sweep` compares threshold policies.

use clap::Parser;

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate(args) => commands::simulate(args).await,
        Commands::Replay(args) => commands::replay(args),
        Commands::Sweep(args) => commands::sweep(args).await,
    }
}
