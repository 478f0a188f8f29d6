//! # Bosun Upstream
//!
//! Mirrors an add-on's upstream documentation from GitHub.
//!
//! For a repository such as `https://github.com/foo/bar` the [`DocSyncer`]
//! copies the README and changelog from the default branch into the add-on
//! directory. Repositories without a changelog file fall back to the release
//! notes of the add-on's version, which are prepended to the local changelog.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use bosun_upstream::{DocSyncer, GitHubClient, GitHubConfig, RepoId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::new(GitHubConfig::default())?;
//!     let syncer = DocSyncer::new(client);
//!
//!     let repo = RepoId::from_url("https://github.com/foo/bar").unwrap();
//!     let report = syncer.sync(Path::new("addons/bar"), &repo, "1.2.3").await?;
//!     println!("changed: {}", report.changed());
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod client;
mod config;
mod docs;
mod error;
mod repo;

pub use client::{GitHubClient, ReleaseNotes, RemoteFile};
pub use config::{GitHubConfig, DEFAULT_API_URL, GITHUB_JSON};
pub use docs::{
    DocOrigin, DocReport, DocSource, DocStatus, DocSyncer, CHANGELOG_CANDIDATES,
    README_CANDIDATES,
};
pub use error::{Result, UpstreamError};
pub use repo::RepoId;
