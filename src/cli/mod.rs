//! CLI entrypoints and command routing.

pub mod init;
pub mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sysup",
    version,
    about = "Keep the system and its package managers up to date"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update the system and all enabled package managers
    #[command(alias = "u")]
    Update(update::UpdateArgs),
    /// Run the interactive setup wizard
    Init,
}

/// Entry point for the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Update(args) => update::handle_update(args),
        Command::Init => init::handle_init(),
    }
}
