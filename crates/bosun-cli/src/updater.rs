//! Per-file update of an add-on config.
//!
//! Loads one `config.yaml`, resolves the newest published image version,
//! rewrites the `version` field when it differs and then mirrors upstream
//! docs. A failed doc sync is recorded in the report but never undoes the
//! version bump.

use std::path::{Path, PathBuf};

use anyhow::Result;
use bosun_core::{AddonConfig, ImageReference};
use bosun_registry::{TagSource, VersionSelector};
use bosun_upstream::{DocReport, DocSource, RepoId};
use tracing::{info, warn};

/// What happened to the `version` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionOutcome {
    /// Already at the newest version.
    UpToDate {
        /// Current version.
        version: String,
    },

    /// Rewritten to the newest version.
    Updated {
        /// Previous version (empty when the field was missing).
        from: String,
        /// New version.
        to: String,
    },
}

/// What happened to the add-on's docs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocsOutcome {
    /// Docs were synced (possibly without changes).
    Synced(DocReport),

    /// The sync failed; the message is kept for reporting.
    Failed(String),

    /// The `repo` field is not a GitHub repository URL.
    InvalidRepo(String),

    /// The config has no `repo` field.
    NoRepo,

    /// Doc syncing is turned off.
    Disabled,
}

/// Result of processing one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not an add-on config (not a mapping, or no `image`).
    NotAddon,

    /// An add-on that this tool does not manage.
    Skipped {
        /// Short reason shown to the user.
        reason: String,
    },

    /// Version checked and docs handled.
    Checked {
        /// Version field outcome.
        version: VersionOutcome,
        /// Docs outcome.
        docs: DocsOutcome,
    },
}

/// Report for one config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateReport {
    /// Path of the config file.
    pub path: PathBuf,

    /// What happened.
    pub outcome: Outcome,
}

impl UpdateReport {
    fn new(path: &Path, outcome: Outcome) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome,
        }
    }

    /// Returns true if the config file's version was rewritten.
    #[must_use]
    pub const fn version_changed(&self) -> bool {
        matches!(
            self.outcome,
            Outcome::Checked {
                version: VersionOutcome::Updated { .. },
                ..
            }
        )
    }

    /// Returns true if a README or changelog was written.
    #[must_use]
    pub const fn docs_changed(&self) -> bool {
        match &self.outcome {
            Outcome::Checked {
                docs: DocsOutcome::Synced(report),
                ..
            } => report.changed(),
            _ => false,
        }
    }
}

/// Updates add-on configs from a tag source and syncs their docs.
pub struct ConfigUpdater {
    registry: String,
    tags: Box<dyn TagSource>,
    docs: Option<Box<dyn DocSource>>,
    selector: VersionSelector,
}

impl ConfigUpdater {
    /// Creates an updater managing images hosted on `registry`.
    pub fn new(registry: impl Into<String>, tags: Box<dyn TagSource>) -> Self {
        Self {
            registry: registry.into(),
            tags,
            docs: None,
            selector: VersionSelector::new(),
        }
    }

    /// Enables doc syncing through the given source.
    #[must_use]
    pub fn with_docs(mut self, docs: Box<dyn DocSource>) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Processes one config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or written, or if
    /// the registry refuses to list tags. Doc sync failures are not errors.
    pub async fn update(&self, path: &Path) -> Result<UpdateReport> {
        let Some(mut config) = AddonConfig::load(path)? else {
            return Ok(UpdateReport::new(path, Outcome::NotAddon));
        };
        let Some(raw_image) = config.image() else {
            return Ok(UpdateReport::new(path, Outcome::NotAddon));
        };

        let image = ImageReference::parse(&raw_image);
        if !image.is_registry(&self.registry) {
            info!(path = %path.display(), registry = %image.registry, "unmanaged registry");
            return Ok(UpdateReport::new(
                path,
                Outcome::Skipped {
                    reason: format!("registry {}", image.registry),
                },
            ));
        }

        let tags = self.tags.list_tags(&image.repository).await?;
        let Some(latest) = self.selector.latest(&tags) else {
            info!(path = %path.display(), repository = %image.repository, "no semver tags");
            return Ok(UpdateReport::new(
                path,
                Outcome::Skipped {
                    reason: "no semver tags".to_string(),
                },
            ));
        };

        let new_version = VersionSelector::normalize(&latest).to_string();
        let current = config.version();

        let version = if current == new_version {
            VersionOutcome::UpToDate { version: current }
        } else {
            config.set_version(&new_version)?;
            config.save()?;
            info!(path = %path.display(), from = %current, to = %new_version, "updated version");
            VersionOutcome::Updated {
                from: current,
                to: new_version.clone(),
            }
        };

        let docs = self.sync_docs(&config, &new_version).await;

        Ok(UpdateReport::new(path, Outcome::Checked { version, docs }))
    }

    async fn sync_docs(&self, config: &AddonConfig, version: &str) -> DocsOutcome {
        let Some(docs) = &self.docs else {
            return DocsOutcome::Disabled;
        };
        let Some(url) = config.repo() else {
            return DocsOutcome::NoRepo;
        };
        let Some(repo) = RepoId::from_url(&url) else {
            return DocsOutcome::InvalidRepo(url);
        };

        match docs.sync_docs(config.addon_dir(), &repo, version).await {
            Ok(report) => DocsOutcome::Synced(report),
            Err(e) => {
                warn!(path = %config.path().display(), %repo, error = %e, "doc sync failed");
                DocsOutcome::Failed(e.to_string())
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeDocs, FakeTags};
    use super::*;
    use bosun_upstream::{DocOrigin, DocStatus};
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, text: &str) -> PathBuf {
        let addon = dir.path().join("app");
        std::fs::create_dir_all(&addon).unwrap();
        let path = addon.join("config.yaml");
        std::fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn test_updates_version_then_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "# managed\nimage: ghcr.io/foo/app:1.0.0\nversion: \"1.0.0\" # keep\n",
        );
        let updater = ConfigUpdater::new(
            "ghcr.io",
            Box::new(FakeTags::with("foo/app", &["latest", "v1.0.0", "v1.10.0", "v1.9.0"])),
        );

        let report = updater.update(&path).await.unwrap();
        assert!(report.version_changed());
        assert_eq!(
            report.outcome,
            Outcome::Checked {
                version: VersionOutcome::Updated {
                    from: "1.0.0".to_string(),
                    to: "1.10.0".to_string(),
                },
                docs: DocsOutcome::Disabled,
            }
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# managed\nimage: ghcr.io/foo/app:1.0.0\nversion: \"1.10.0\" # keep\n"
        );

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        let again = updater.update(&path).await.unwrap();
        assert!(!again.version_changed());
        assert!(!again.docs_changed());
        assert_eq!(
            std::fs::metadata(&path).unwrap().modified().unwrap(),
            modified
        );
    }

    #[tokio::test]
    async fn test_quoted_version_key_stays_valid() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "image: foo/app\n\"version\": \"1.0.0\"\n");
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/app", &["v1.1.0"])));

        let report = updater.update(&path).await.unwrap();
        assert!(report.version_changed());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "image: foo/app\n\"version\": \"1.1.0\"\n"
        );

        let again = updater.update(&path).await.unwrap();
        assert_eq!(
            again.outcome,
            Outcome::Checked {
                version: VersionOutcome::UpToDate {
                    version: "1.1.0".to_string()
                },
                docs: DocsOutcome::Disabled,
            }
        );
    }

    #[tokio::test]
    async fn test_missing_image_is_not_an_addon() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "name: Not an add-on\nversion: 1.0.0\n");
        let tags = FakeTags::default();
        let calls = tags.calls.clone();
        let updater = ConfigUpdater::new("ghcr.io", Box::new(tags));

        let report = updater.update(&path).await.unwrap();
        assert_eq!(report.outcome, Outcome::NotAddon);
        assert!(!report.version_changed());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_mapping_is_not_an_addon() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "- just\n- a list\n");
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::default()));

        let report = updater.update(&path).await.unwrap();
        assert_eq!(report.outcome, Outcome::NotAddon);
    }

    #[tokio::test]
    async fn test_other_registry_is_skipped_without_query() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "image: docker.io/foo/bar:1.0.0\nversion: 1.0.0\n");
        let tags = FakeTags::with("foo/bar", &["2.0.0"]);
        let calls = tags.calls.clone();
        let updater = ConfigUpdater::new("ghcr.io", Box::new(tags));

        let report = updater.update(&path).await.unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Skipped {
                reason: "registry docker.io".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_semver_tags_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "image: foo/app\nversion: 1.0.0\n");
        let updater = ConfigUpdater::new(
            "ghcr.io",
            Box::new(FakeTags::with("foo/app", &["latest", "edge"])),
        );

        let report = updater.update(&path).await.unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Skipped {
                reason: "no semver tags".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_listing_error_propagates() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "image: ghcr.io/private/app\n");
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::default()));

        let err = updater.update(&path).await.unwrap_err();
        assert!(err.to_string().contains("Authentication required for private/app"));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "image: ghcr.io/private/app\n"
        );
    }

    #[tokio::test]
    async fn test_docs_get_new_version_and_addon_dir() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "image: ghcr.io/foo/app\nversion: 1.0.0\nrepo: https://github.com/foo/app.git\n",
        );
        let docs = FakeDocs::returning(DocStatus::Updated(DocOrigin::File {
            path: "README.md".to_string(),
        }));
        let calls = docs.calls.clone();
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/app", &["v1.1.0"])))
            .with_docs(Box::new(docs));

        let report = updater.update(&path).await.unwrap();
        assert!(report.version_changed());
        assert!(report.docs_changed());
        assert_eq!(
            calls.lock().unwrap().as_slice(),
            &[("foo/app".to_string(), "1.1.0".to_string())]
        );
        match report.outcome {
            Outcome::Checked {
                docs: DocsOutcome::Synced(docs),
                ..
            } => assert_eq!(docs.readme_path, dir.path().join("app").join("README.md")),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_doc_failure_keeps_version_bump() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            "image: ghcr.io/foo/app\nversion: 1.0.0\nrepo: https://github.com/foo/app\n",
        );
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/app", &["1.2.0"])))
            .with_docs(Box::new(FakeDocs::failing()));

        let report = updater.update(&path).await.unwrap();
        assert!(report.version_changed());
        assert!(!report.docs_changed());
        assert!(matches!(
            report.outcome,
            Outcome::Checked { docs: DocsOutcome::Failed(ref msg), .. } if msg.contains("disk full")
        ));
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("version: 1.2.0"));
    }

    #[tokio::test]
    async fn test_repo_field_outcomes() {
        let dir = TempDir::new().unwrap();
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/app", &["1.0.0"])))
            .with_docs(Box::new(FakeDocs::returning(DocStatus::Unchanged)));

        let path = write_config(&dir, "image: foo/app\nversion: 1.0.0\n");
        let report = updater.update(&path).await.unwrap();
        assert!(matches!(
            report.outcome,
            Outcome::Checked { docs: DocsOutcome::NoRepo, .. }
        ));

        let path = write_config(
            &dir,
            "image: foo/app\nversion: 1.0.0\nrepo: https://gitlab.com/foo/app\n",
        );
        let report = updater.update(&path).await.unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Checked {
                version: VersionOutcome::UpToDate {
                    version: "1.0.0".to_string()
                },
                docs: DocsOutcome::InvalidRepo("https://gitlab.com/foo/app".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_version_field_is_added() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "image: foo/app\n");
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/app", &["v0.3.0"])));

        let report = updater.update(&path).await.unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Checked {
                version: VersionOutcome::Updated {
                    from: String::new(),
                    to: "0.3.0".to_string(),
                },
                docs: DocsOutcome::Disabled,
            }
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "image: foo/app\nversion: 0.3.0\n"
        );
    }
}
