//! CLI commands and argument parsing.

pub mod latest;
pub mod update;

use clap::{Parser, Subcommand};

/// Bosun - keeps add-on configs and docs in step with their upstream releases
#[derive(Parser)]
#[command(name = "bosun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Bump every add-on config to its newest image version and sync docs
    Update(update::UpdateArgs),

    /// Print the newest semver tag of one image
    Latest(latest::LatestArgs),

    /// Print version information
    Version,
}
