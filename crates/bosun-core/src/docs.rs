//! Local documentation files mirrored from upstream.
//!
//! Both writers are idempotent: running them twice with the same input
//! leaves the file exactly as the first run did and reports no change.

use std::path::Path;

use regex::RegexBuilder;

use crate::error::{Error, Result};

/// File name of the mirrored README inside an add-on directory.
pub const README_FILE: &str = "README.md";

/// File name of the mirrored changelog inside an add-on directory.
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Writes `content` to `path` unless the file already holds exactly those bytes.
///
/// A missing file counts as different. Returns whether the file was written.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or cannot be written.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    match std::fs::read(path) {
        Ok(current) if current == content.as_bytes() => return Ok(false),
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(path, e)),
    }

    std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(true)
}

/// Prepends a `## <version>` section holding `body` to the changelog at `path`.
///
/// Nothing is written when the changelog already has a heading for this
/// version. Existing content is kept verbatim below the new section.
///
/// # Errors
///
/// Returns an error if the changelog cannot be read or written.
pub fn prepend_release_notes(path: &Path, version: &str, body: &str) -> Result<bool> {
    let existing = match std::fs::read(path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(Error::io(path, e)),
    };

    if has_release_heading(&existing, version) {
        return Ok(false);
    }

    let content = format!("## {version}\n\n{}\n\n{existing}", body.trim());
    std::fs::write(path, content).map_err(|e| Error::io(path, e))?;
    Ok(true)
}

/// Returns true if `changelog` has a level-two heading for `version`.
///
/// Matches `## 1.2.3`, `## v1.2.3`, `## [1.2.3]` and `##[V1.2.3] - date`,
/// ignoring case.
#[must_use]
pub fn has_release_heading(changelog: &str, version: &str) -> bool {
    let pattern = format!(r"^##\s*\[?v?{}\]?\b", regex::escape(version));
    RegexBuilder::new(&pattern)
        .multi_line(true)
        .case_insensitive(true)
        .build()
        .is_ok_and(|re| re.is_match(changelog))
}
