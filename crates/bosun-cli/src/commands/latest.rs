//! Latest command implementation.
//!
//! Prints the newest semver tag of a single image.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use bosun_core::{Credentials, ImageReference, DEFAULT_REGISTRY};
use bosun_registry::{RegistryAuth, RegistryClient, RegistryConfig};

/// Arguments for the latest command.
#[derive(Args)]
pub struct LatestArgs {
    /// Image reference (e.g., `ghcr.io/owner/app:1.0.0`)
    pub image: String,

    /// Registry host the image must live on
    #[arg(long, env = "BOSUN_REGISTRY", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Registry API base URL (defaults to `https://<registry>`)
    #[arg(long, env = "BOSUN_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "20")]
    pub timeout: u64,
}

/// Runs the latest command.
///
/// # Errors
///
/// Returns an error if the image is hosted elsewhere or the tags cannot be
/// listed.
pub async fn execute(args: &LatestArgs) -> Result<()> {
    let image = ImageReference::parse(&args.image);
    if !image.is_registry(&args.registry) {
        anyhow::bail!(
            "{} is not hosted on {} (registry {})",
            args.image,
            args.registry,
            image.registry
        );
    }

    let credentials = Credentials::from_env();
    let (username, password) = credentials
        .registry_basic()
        .map_or((None, None), |(u, p)| (Some(u), Some(p)));
    let url = args
        .registry_url
        .clone()
        .unwrap_or_else(|| format!("https://{}", args.registry));
    let config = RegistryConfig::new(url)
        .with_auth(RegistryAuth::from_parts(username, password))
        .with_timeout(Duration::from_secs(args.timeout));
    let client = RegistryClient::new(config).context("Failed to create registry client")?;

    info!(image = %image, "listing tags");
    let latest = client
        .latest_tag(&image.repository)
        .await
        .with_context(|| format!("Failed to list tags for {image}"))?;

    match latest {
        Some(tag) => println!("{tag}"),
        None => println!("{image}: no semver tags"),
    }

    Ok(())
}
