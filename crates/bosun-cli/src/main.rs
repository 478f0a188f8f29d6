//! Bosun CLI - keeps add-on configs and docs in sync with upstream releases.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod updater;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Status lines own stdout, diagnostics go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bosun=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Update(args) => commands::update::execute(args).await,
        Commands::Latest(args) => commands::latest::execute(&args).await,
        Commands::Version => {
            println!("bosun {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
