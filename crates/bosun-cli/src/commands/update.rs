//! Update command implementation.
//!
//! Walks `<root>/*/<config-name>`, bumps each add-on's `version` to the
//! newest semver tag in the registry and mirrors upstream docs.

use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use bosun_core::{Credentials, CONFIG_FILE_NAME, DEFAULT_REGISTRY};
use bosun_registry::{RegistryAuth, RegistryClient, RegistryConfig};
use bosun_upstream::{
    DocOrigin, DocReport, DocStatus, DocSyncer, GitHubClient, GitHubConfig, DEFAULT_API_URL,
};

use crate::updater::{ConfigUpdater, DocsOutcome, Outcome, UpdateReport, VersionOutcome};

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// Directory holding one sub-directory per add-on
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Config file name inside each add-on directory
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    pub config_name: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "20")]
    pub timeout: u64,

    /// Registry host whose images are managed
    #[arg(long, env = "BOSUN_REGISTRY", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    /// Registry API base URL (defaults to `https://<registry>`)
    #[arg(long, env = "BOSUN_REGISTRY_URL")]
    pub registry_url: Option<String>,

    /// GitHub API base URL
    #[arg(long, env = "BOSUN_GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Only update versions, leave README and CHANGELOG alone
    #[arg(long)]
    pub no_docs: bool,

    /// Exit with an error if any config file failed
    #[arg(long)]
    pub fail_on_error: bool,
}

impl UpdateArgs {
    fn registry_url(&self) -> String {
        self.registry_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", self.registry))
    }
}

/// Counters for one batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Config files found.
    pub files: usize,
    /// Files whose version was rewritten.
    pub versions_updated: usize,
    /// Files whose README or changelog was written.
    pub docs_updated: usize,
    /// Files that failed.
    pub errors: usize,
}

/// Runs the update command.
///
/// # Errors
///
/// Returns an error if the clients cannot be built, the root cannot be
/// walked, or `--fail-on-error` is set and a config file failed.
pub async fn execute(args: UpdateArgs) -> Result<()> {
    let credentials = Credentials::from_env();
    let timeout = Duration::from_secs(args.timeout);

    let (username, password) = credentials
        .registry_basic()
        .map_or((None, None), |(u, p)| (Some(u), Some(p)));
    let registry_config = RegistryConfig::new(args.registry_url())
        .with_auth(RegistryAuth::from_parts(username, password))
        .with_timeout(timeout);
    let registry =
        RegistryClient::new(registry_config).context("Failed to create registry client")?;

    let mut updater = ConfigUpdater::new(&args.registry, Box::new(registry));
    if !args.no_docs {
        let github_config = GitHubConfig::new(&args.github_api_url)
            .with_token(credentials.github_token.as_deref())
            .with_timeout(timeout);
        let github = GitHubClient::new(github_config).context("Failed to create GitHub client")?;
        updater = updater.with_docs(Box::new(DocSyncer::new(github)));
    }

    let paths = discover(&args.root, &args.config_name)?;
    let mut out = std::io::stdout();

    if paths.is_empty() {
        writeln!(out, "No ./*/{} files found", args.config_name)?;
        return Ok(());
    }

    let summary = run_batch(&updater, &paths, &mut out).await?;

    if args.fail_on_error && summary.errors > 0 {
        anyhow::bail!("{} of {} config files failed", summary.errors, summary.files);
    }

    Ok(())
}

/// Finds `<root>/*/<config_name>` files, sorted by path.
///
/// Only immediate sub-directories are searched and hidden ones are ignored.
/// Entries that cannot be read (dangling links, unreadable directories) are
/// logged and skipped.
///
/// # Errors
///
/// Returns an error if the root directory itself cannot be read.
pub fn discover(root: &Path, config_name: &str) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(2)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to read {}", root.display()));
            }
            Err(e) => {
                warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() == 2 && entry.file_type().is_file() && entry.file_name() == config_name {
            paths.push(entry.into_path());
        }
    }

    paths.sort();
    debug!(root = %root.display(), count = paths.len(), "discovered configs");
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Updates each config in turn, printing status lines to `out`.
///
/// A failing file is reported and counted; the batch carries on.
///
/// # Errors
///
/// Returns an error only if writing to `out` fails.
pub async fn run_batch(
    updater: &ConfigUpdater,
    paths: &[PathBuf],
    out: &mut impl Write,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary {
        files: paths.len(),
        ..BatchSummary::default()
    };

    for path in paths {
        match updater.update(path).await {
            Ok(report) => {
                if report.version_changed() {
                    summary.versions_updated += 1;
                }
                if report.docs_changed() {
                    summary.docs_updated += 1;
                }
                for line in status_lines(&report) {
                    writeln!(out, "{line}")?;
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config update failed");
                summary.errors += 1;
                writeln!(out, "ERROR  {}: {e:#}", path.display())?;
            }
        }
    }

    writeln!(
        out,
        "\nDone. Updated versions: {}. Updated docs: {}.",
        summary.versions_updated, summary.docs_updated
    )?;

    Ok(summary)
}

/// Renders the user-facing status lines for one report.
#[must_use]
pub fn status_lines(report: &UpdateReport) -> Vec<String> {
    let path = report.path.display();

    match &report.outcome {
        Outcome::NotAddon => Vec::new(),
        Outcome::Skipped { reason } => vec![format!("SKIP   {path} ({reason})")],
        Outcome::Checked { version, docs } => {
            let mut lines = vec![match version {
                VersionOutcome::Updated { from, to } => format!("UPDATE {path}: {from} → {to}"),
                VersionOutcome::UpToDate { version } => format!("OK     {path} ({version})"),
            }];

            match docs {
                DocsOutcome::Synced(docs) => lines.extend(doc_lines(docs)),
                DocsOutcome::Failed(message) => {
                    lines.push(format!("DOCS   ERROR {path}: {message}"));
                }
                DocsOutcome::InvalidRepo(url) => {
                    lines.push(format!("DOCS   skip (invalid repo URL: {url})"));
                }
                DocsOutcome::NoRepo => {
                    let name = report
                        .path
                        .file_name()
                        .map_or(Cow::Borrowed(CONFIG_FILE_NAME), |n| n.to_string_lossy());
                    lines.push(format!("DOCS   skip (no repo: field in {name})"));
                }
                DocsOutcome::Disabled => {}
            }

            lines
        }
    }
}

fn doc_lines(report: &DocReport) -> Vec<String> {
    let Some(branch) = &report.branch else {
        return vec![format!(
            "DOCS   skip ({} default branch not found)",
            report.repo
        )];
    };

    let repo = &report.repo;
    let readme = report.readme_path.display();
    let changelog = report.changelog_path.display();

    let readme_line = match &report.readme {
        DocStatus::Updated(_) => format!("README    {readme} updated from {repo}@{branch}"),
        DocStatus::NotFound => format!("README    skip ({repo}@{branch} README not found)"),
        _ => format!("README    {readme} OK"),
    };

    let changelog_line = match &report.changelog {
        DocStatus::Updated(DocOrigin::File { .. }) => {
            format!("CHANGELOG {changelog} updated from {repo}@{branch}")
        }
        DocStatus::Updated(DocOrigin::ReleaseNotes { .. }) => {
            format!("CHANGELOG {changelog} updated from {repo} release notes")
        }
        DocStatus::AlreadyPresent => {
            format!("CHANGELOG {changelog} already has {}", report.version)
        }
        DocStatus::NotFound => format!(
            "CHANGELOG skip ({repo}: no changelog file and no release notes for {})",
            report.version
        ),
        DocStatus::Unchanged | DocStatus::Skipped => format!("CHANGELOG {changelog} OK"),
    };

    vec![readme_line, changelog_line]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updater::fakes::{FakeDocs, FakeTags};
    use bosun_upstream::RepoId;
    use tempfile::TempDir;

    fn addon(root: &Path, name: &str, config: &str) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, config).unwrap();
        path
    }

    fn docs_report(readme: DocStatus, changelog: DocStatus) -> DocReport {
        DocReport {
            repo: RepoId::new("foo", "app"),
            branch: Some("main".to_string()),
            version: "1.2.0".to_string(),
            readme_path: PathBuf::from("app/README.md"),
            changelog_path: PathBuf::from("app/CHANGELOG.md"),
            readme,
            changelog,
        }
    }

    #[test]
    fn test_discover_immediate_children_sorted() {
        let dir = TempDir::new().unwrap();
        let b = addon(dir.path(), "b", "image: foo/b\n");
        let a = addon(dir.path(), "a", "image: foo/a\n");
        addon(&dir.path().join("a"), "nested", "image: foo/nested\n");
        addon(dir.path(), ".hidden", "image: foo/hidden\n");
        std::fs::write(dir.path().join("config.yaml"), "image: foo/root\n").unwrap();
        std::fs::create_dir_all(dir.path().join("c")).unwrap();
        std::fs::write(dir.path().join("c").join("other.yaml"), "").unwrap();

        let paths = discover(dir.path(), "config.yaml").unwrap();
        assert_eq!(paths, vec![a, b]);
    }

    #[test]
    fn test_discover_custom_name() {
        let dir = TempDir::new().unwrap();
        addon(dir.path(), "a", "image: foo/a\n");
        let custom = dir.path().join("a").join("addon.yaml");
        std::fs::write(&custom, "image: foo/a\n").unwrap();

        assert_eq!(discover(dir.path(), "addon.yaml").unwrap(), vec![custom]);
    }

    #[test]
    fn test_discover_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        assert!(discover(&dir.path().join("missing"), "config.yaml").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_dangling_link() {
        let dir = TempDir::new().unwrap();
        let a = addon(dir.path(), "a", "image: foo/a\n");
        std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("b")).unwrap();
        let c = addon(dir.path(), "c", "image: foo/c\n");

        assert_eq!(discover(dir.path(), "config.yaml").unwrap(), vec![a, c]);
    }

    #[test]
    fn test_status_lines_name_custom_config() {
        let report = UpdateReport {
            path: PathBuf::from("app/addon.yaml"),
            outcome: Outcome::Checked {
                version: VersionOutcome::UpToDate {
                    version: "1.0.0".to_string(),
                },
                docs: DocsOutcome::NoRepo,
            },
        };
        assert_eq!(
            status_lines(&report),
            vec![
                "OK     app/addon.yaml (1.0.0)".to_string(),
                "DOCS   skip (no repo: field in addon.yaml)".to_string(),
            ]
        );
    }

    #[test]
    fn test_status_lines_version() {
        let report = UpdateReport {
            path: PathBuf::from("app/config.yaml"),
            outcome: Outcome::Checked {
                version: VersionOutcome::Updated {
                    from: "1.0.0".to_string(),
                    to: "1.2.0".to_string(),
                },
                docs: DocsOutcome::NoRepo,
            },
        };
        assert_eq!(
            status_lines(&report),
            vec![
                "UPDATE app/config.yaml: 1.0.0 → 1.2.0".to_string(),
                "DOCS   skip (no repo: field in config.yaml)".to_string(),
            ]
        );

        let report = UpdateReport {
            path: PathBuf::from("app/config.yaml"),
            outcome: Outcome::Skipped {
                reason: "registry docker.io".to_string(),
            },
        };
        assert_eq!(
            status_lines(&report),
            vec!["SKIP   app/config.yaml (registry docker.io)".to_string()]
        );
    }

    #[test]
    fn test_status_lines_docs() {
        let lines = doc_lines(&docs_report(
            DocStatus::Updated(DocOrigin::File {
                path: "README.md".to_string(),
            }),
            DocStatus::Updated(DocOrigin::ReleaseNotes {
                tag: "v1.2.0".to_string(),
            }),
        ));
        assert_eq!(
            lines,
            vec![
                "README    app/README.md updated from foo/app@main".to_string(),
                "CHANGELOG app/CHANGELOG.md updated from foo/app release notes".to_string(),
            ]
        );

        let lines = doc_lines(&docs_report(DocStatus::NotFound, DocStatus::NotFound));
        assert_eq!(
            lines,
            vec![
                "README    skip (foo/app@main README not found)".to_string(),
                "CHANGELOG skip (foo/app: no changelog file and no release notes for 1.2.0)"
                    .to_string(),
            ]
        );

        let mut skipped = docs_report(DocStatus::Skipped, DocStatus::Skipped);
        skipped.branch = None;
        assert_eq!(
            doc_lines(&skipped),
            vec!["DOCS   skip (foo/app default branch not found)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_batch_continues_after_errors() {
        let dir = TempDir::new().unwrap();
        let paths = vec![
            addon(dir.path(), "a", "image: ghcr.io/foo/a\nversion: 1.0.0\n"),
            addon(dir.path(), "b", "image: ghcr.io/private/b\nversion: 1.0.0\n"),
            addon(dir.path(), "c", "image: [unclosed\n"),
            addon(dir.path(), "d", "image: ghcr.io/foo/d\nversion: 2.0.0\n"),
            addon(dir.path(), "e", "name: not an add-on\n"),
        ];

        let mut tags = FakeTags::with("foo/a", &["v1.1.0"]);
        tags.tags.insert("foo/d".to_string(), vec!["v2.0.0".to_string()]);
        let updater = ConfigUpdater::new("ghcr.io", Box::new(tags));

        let mut out = Vec::new();
        let summary = run_batch(&updater, &paths, &mut out).await.unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                files: 5,
                versions_updated: 1,
                docs_updated: 0,
                errors: 2,
            }
        );

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("UPDATE ") && lines[0].ends_with(": 1.0.0 → 1.1.0"));
        assert!(lines[1].starts_with("ERROR  ") && lines[1].contains("Authentication required"));
        assert!(lines[2].starts_with("ERROR  "));
        assert!(lines[3].starts_with("OK     ") && lines[3].ends_with("(2.0.0)"));
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "Done. Updated versions: 1. Updated docs: 0.");
    }

    #[tokio::test]
    async fn test_batch_counts_doc_updates() {
        let dir = TempDir::new().unwrap();
        let paths = vec![addon(
            dir.path(),
            "a",
            "image: foo/a\nversion: 1.1.0\nrepo: https://github.com/foo/a\n",
        )];
        let updater = ConfigUpdater::new("ghcr.io", Box::new(FakeTags::with("foo/a", &["1.1.0"])))
            .with_docs(Box::new(FakeDocs::returning(DocStatus::Updated(
                DocOrigin::File {
                    path: "README.md".to_string(),
                },
            ))));

        let mut out = Vec::new();
        let summary = run_batch(&updater, &paths, &mut out).await.unwrap();
        assert_eq!(summary.versions_updated, 0);
        assert_eq!(summary.docs_updated, 1);

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("README    "));
        assert!(out.ends_with("Done. Updated versions: 0. Updated docs: 1.\n"));
    }

    #[test]
    fn test_registry_url_defaults_to_host() {
        let args = UpdateArgs {
            root: PathBuf::from("."),
            config_name: CONFIG_FILE_NAME.to_string(),
            timeout: 20,
            registry: "registry.example.com".to_string(),
            registry_url: None,
            github_api_url: DEFAULT_API_URL.to_string(),
            no_docs: false,
            fail_on_error: false,
        };
        assert_eq!(args.registry_url(), "https://registry.example.com");

        let args = UpdateArgs {
            registry_url: Some("http://127.0.0.1:5000".to_string()),
            ..args
        };
        assert_eq!(args.registry_url(), "http://127.0.0.1:5000");
    }
}
