//! # Bosun Registry
//!
//! OCI registry client used by bosun to find the newest published version
//! of an add-on image.
//!
//! ## Features
//!
//! - **Tag Listing**: `GET /v2/<name>/tags/list` with `Link` header pagination
//! - **Token Exchange**: anonymous or basic-auth bearer token handshake on `401`
//! - **Version Selection**: semantic version precedence over published tags
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bosun_registry::{RegistryAuth, RegistryClient, RegistryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RegistryConfig::new("https://ghcr.io")
//!         .with_auth(RegistryAuth::None);
//!
//!     let client = RegistryClient::new(config)?;
//!     let latest = client.latest_tag("home-assistant/home-assistant").await?;
//!     println!("{latest:?}");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    RegistryClient                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Tag pages  │  │ AuthClient  │  │   VersionSelector   │  │
//! │  │  (HTTP)     │  │ (challenge) │  │   (SemVer)          │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  OCI Registry (ghcr.io)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod auth;
mod client;
mod config;
mod error;
mod oci;
mod version;

pub use auth::{AuthClient, Challenge};
pub use client::{RegistryClient, TagSource};
pub use config::{
    RegistryAuth, RegistryConfig, DEFAULT_PAGE_SIZE, DEFAULT_REGISTRY_URL, DEFAULT_TIMEOUT,
};
pub use error::{excerpt, RegistryError, BODY_EXCERPT_LEN};
pub use oci::{next_link, TagList, TokenResponse};
pub use version::{VersionCandidate, VersionSelector};
