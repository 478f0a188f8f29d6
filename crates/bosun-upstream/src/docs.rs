//! Mirrors upstream README and changelog files into an add-on directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bosun_core::docs::{prepend_release_notes, write_if_changed, CHANGELOG_FILE, README_FILE};

use crate::client::GitHubClient;
use crate::error::Result;
use crate::repo::RepoId;

/// README locations tried in order.
pub const README_CANDIDATES: [&str; 5] = [
    "README.md",
    "Readme.md",
    "readme.md",
    "docs/README.md",
    "docs/readme.md",
];

/// Changelog locations tried in order.
pub const CHANGELOG_CANDIDATES: [&str; 9] = [
    "CHANGELOG.md",
    "Changelog.md",
    "changelog.md",
    "docs/CHANGELOG.md",
    "docs/Changelog.md",
    "docs/changelog.md",
    "CHANGELOG",
    "Changelog",
    "changelog",
];

/// Where updated content came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocOrigin {
    /// A file on the default branch.
    File {
        /// Path within the repository.
        path: String,
    },

    /// The body of a published release.
    ReleaseNotes {
        /// Release tag.
        tag: String,
    },
}

/// Outcome for one local documentation file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocStatus {
    /// The local file was written.
    Updated(DocOrigin),

    /// Upstream content matched the local file.
    Unchanged,

    /// The changelog already has a section for the version.
    AlreadyPresent,

    /// Nothing suitable was found upstream.
    NotFound,

    /// Not attempted because the default branch could not be resolved.
    Skipped,
}

impl DocStatus {
    /// Returns true if the local file was written.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated(_))
    }
}

/// Result of syncing one add-on's documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocReport {
    /// Upstream repository.
    pub repo: RepoId,

    /// Default branch, `None` when it could not be resolved.
    pub branch: Option<String>,

    /// Version used for the release notes fallback.
    pub version: String,

    /// Local README path.
    pub readme_path: PathBuf,

    /// Local changelog path.
    pub changelog_path: PathBuf,

    /// README outcome.
    pub readme: DocStatus,

    /// Changelog outcome.
    pub changelog: DocStatus,
}

impl DocReport {
    /// Returns true if any local file was written.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.readme.is_updated() || self.changelog.is_updated()
    }

    /// Returns true if the sync was skipped for lack of a default branch.
    #[must_use]
    pub const fn skipped(&self) -> bool {
        self.branch.is_none()
    }
}

/// Something that can bring an add-on's documentation up to date.
#[async_trait]
pub trait DocSource: Send + Sync {
    /// Syncs README and changelog of `repo` into `addon_dir`.
    async fn sync_docs(
        &self,
        addon_dir: &Path,
        repo: &RepoId,
        fallback_version: &str,
    ) -> Result<DocReport>;
}

/// Syncs documentation from GitHub.
#[derive(Debug, Clone)]
pub struct DocSyncer {
    client: GitHubClient,
}

impl DocSyncer {
    /// Creates a syncer backed by the given client.
    #[must_use]
    pub const fn new(client: GitHubClient) -> Self {
        Self { client }
    }

    /// Syncs README and changelog of `repo` into `addon_dir`.
    ///
    /// The README is copied from the default branch. The changelog is copied
    /// from the default branch too; when the repository has none, the release
    /// notes of `fallback_version` are prepended to the local changelog
    /// unless it already has a section for that version.
    ///
    /// # Errors
    ///
    /// Returns an error if the default branch or release notes cannot be
    /// requested, or a local file cannot be written.
    pub async fn sync(
        &self,
        addon_dir: &Path,
        repo: &RepoId,
        fallback_version: &str,
    ) -> Result<DocReport> {
        let mut report = DocReport {
            repo: repo.clone(),
            branch: None,
            version: fallback_version.to_string(),
            readme_path: addon_dir.join(README_FILE),
            changelog_path: addon_dir.join(CHANGELOG_FILE),
            readme: DocStatus::Skipped,
            changelog: DocStatus::Skipped,
        };

        let Some(branch) = self.client.default_branch(repo).await? else {
            tracing::warn!(%repo, "default branch not found, skipping docs");
            return Ok(report);
        };

        report.readme = match self
            .client
            .fetch_first_existing(repo, &README_CANDIDATES, &branch)
            .await
        {
            Some(file) => mirror(&report.readme_path, file.path, &file.text)?,
            None => DocStatus::NotFound,
        };

        report.changelog = match self
            .client
            .fetch_first_existing(repo, &CHANGELOG_CANDIDATES, &branch)
            .await
        {
            Some(file) => mirror(&report.changelog_path, file.path, &file.text)?,
            None => match self.client.release_notes(repo, fallback_version).await? {
                Some(notes) => {
                    if prepend_release_notes(&report.changelog_path, fallback_version, &notes.body)? {
                        tracing::info!(
                            path = %report.changelog_path.display(),
                            tag = %notes.tag,
                            "prepended release notes"
                        );
                        DocStatus::Updated(DocOrigin::ReleaseNotes { tag: notes.tag })
                    } else {
                        DocStatus::AlreadyPresent
                    }
                }
                None => DocStatus::NotFound,
            },
        };

        report.branch = Some(branch);
        Ok(report)
    }
}

#[async_trait]
impl DocSource for DocSyncer {
    async fn sync_docs(
        &self,
        addon_dir: &Path,
        repo: &RepoId,
        fallback_version: &str,
    ) -> Result<DocReport> {
        self.sync(addon_dir, repo, fallback_version).await
    }
}

fn mirror(local: &Path, remote_path: String, text: &str) -> Result<DocStatus> {
    if write_if_changed(local, text)? {
        tracing::info!(path = %local.display(), from = %remote_path, "mirrored upstream file");
        Ok(DocStatus::Updated(DocOrigin::File { path: remote_path }))
    } else {
        Ok(DocStatus::Unchanged)
    }
}
