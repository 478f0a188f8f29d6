//! Add-on configuration documents.
//!
//! Each add-on directory holds a `config.yaml` with at least an `image`
//! field. The only field ever written back is `version`, and it is edited
//! in place so comments, key order and quoting survive the rewrite.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// File name of the add-on configuration document.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

const VERSION_KEY: &str = "version";

/// Ways the `version` key can be written at the start of a line.
const VERSION_KEY_SPELLINGS: [&str; 3] = ["version", "\"version\"", "'version'"];

/// Quoting style of a YAML scalar on its source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Plain,
    Single,
    Double,
}

/// A top-level `version:` line split into its editable parts.
#[derive(Debug, PartialEq, Eq)]
struct VersionLine<'a> {
    /// Byte offset of the line within the document.
    start: usize,
    /// Byte length of the line, excluding the line terminator.
    len: usize,
    /// `version:` plus the whitespace that follows it.
    prefix: &'a str,
    quote: Quote,
    /// Scalar content with the quotes removed.
    value: String,
    /// Whatever follows the scalar (spacing, comment).
    suffix: &'a str,
}

/// A loaded add-on configuration file.
#[derive(Debug, Clone)]
pub struct AddonConfig {
    path: PathBuf,
    text: String,
    data: Mapping,
}

impl AddonConfig {
    /// Loads a configuration file.
    ///
    /// Returns `Ok(None)` when the document is valid YAML but not a mapping,
    /// so directories that do not hold an add-on are skipped quietly.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(path, text)
    }

    /// Parses configuration text that was read from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Option<Self>> {
        let path = path.into();
        let text = text.into();

        let value: Value = serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
            path: path.clone(),
            source,
        })?;

        match value {
            Value::Mapping(data) => Ok(Some(Self { path, text, data })),
            _ => Ok(None),
        }
    }

    /// Returns the path this config was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the add-on directory (the config file's parent).
    #[must_use]
    pub fn addon_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Returns the current document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the `image` field, if present and non-empty.
    #[must_use]
    pub fn image(&self) -> Option<String> {
        self.scalar("image").filter(|s| !s.trim().is_empty())
    }

    /// Returns the `repo` field, if present and non-empty.
    #[must_use]
    pub fn repo(&self) -> Option<String> {
        self.scalar("repo")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Returns the current version for comparison purposes.
    ///
    /// The value is read from the source line when possible so that plain
    /// scalars such as `1.10` are not reinterpreted as numbers. Surrounding
    /// whitespace and double quotes are stripped; a missing field is `""`.
    #[must_use]
    pub fn version(&self) -> String {
        let raw = find_version_line(&self.text)
            .filter(|line| is_editable(line))
            .map(|line| line.value)
            .or_else(|| self.scalar(VERSION_KEY))
            .unwrap_or_default();

        raw.trim().trim_matches('"').to_string()
    }

    /// Sets the `version` field, editing only that line of the document.
    ///
    /// When the field is missing it is appended as a new top-level key. A
    /// `version` that cannot be edited on one line (block scalar, flow
    /// mapping) is written by re-serializing the whole document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document has to be re-serialized and that fails.
    /// The config is left untouched in that case.
    pub fn set_version(&mut self, version: &str) -> Result<()> {
        let edited = match find_version_line(&self.text) {
            Some(line) if self.can_edit_in_place(&line) => {
                let separator = if line.prefix.ends_with(':') { " " } else { "" };
                let replacement = format!(
                    "{}{separator}{}{}",
                    line.prefix,
                    quote_scalar(version, line.quote),
                    line.suffix
                );
                let mut text = self.text.clone();
                text.replace_range(line.start..line.start + line.len, &replacement);
                Some(text)
            }
            Some(_) => None,
            None if self.data.get(VERSION_KEY).is_some() => None,
            None => {
                let mut text = self.text.clone();
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&format!("{VERSION_KEY}: {version}\n"));
                Some(text)
            }
        }
        .filter(|text| self.keeps_structure(text));

        let mut data = self.data.clone();
        data.insert(
            Value::String(VERSION_KEY.to_string()),
            Value::String(version.to_string()),
        );

        let text = match edited {
            Some(text) => text,
            None => {
                tracing::warn!(
                    path = %self.path.display(),
                    "version cannot be edited in place, re-serializing document"
                );
                serde_yaml::to_string(&data).map_err(|source| Error::Serialize {
                    path: self.path.clone(),
                    source,
                })?
            }
        };

        self.data = data;
        self.text = text;
        Ok(())
    }

    /// Writes the current document text back to its file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, &self.text).map_err(|e| Error::io(&self.path, e))
    }

    fn can_edit_in_place(&self, line: &VersionLine<'_>) -> bool {
        is_editable(line)
            && !matches!(
                self.data.get(VERSION_KEY),
                Some(Value::Mapping(_) | Value::Sequence(_) | Value::Tagged(_))
            )
    }

    /// Returns true if `text` parses to this document with at most `version`
    /// changed or added.
    fn keeps_structure(&self, text: &str) -> bool {
        let Ok(Value::Mapping(edited)) = serde_yaml::from_str::<Value>(text) else {
            return false;
        };

        let added = usize::from(self.data.get(VERSION_KEY).is_none());
        edited.len() == self.data.len() + added
            && edited.get(VERSION_KEY).is_some()
            && self.data.iter().all(|(key, value)| {
                key.as_str() == Some(VERSION_KEY) || edited.get(key) == Some(value)
            })
    }

    fn scalar(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// Finds the top-level `version:` line.
fn find_version_line(text: &str) -> Option<VersionLine<'_>> {
    let mut start = 0;

    for raw_line in text.split_inclusive('\n') {
        let line = raw_line.trim_end_matches('\n').trim_end_matches('\r');
        let line_start = start;
        start += raw_line.len();

        let Some(after_key) = VERSION_KEY_SPELLINGS
            .iter()
            .find_map(|key| line.strip_prefix(*key))
        else {
            continue;
        };
        let Some(after_colon) = after_key.trim_start_matches([' ', '\t']).strip_prefix(':')
        else {
            continue;
        };
        if !(after_colon.is_empty() || after_colon.starts_with([' ', '\t'])) {
            continue;
        }

        let rest = after_colon.trim_start_matches([' ', '\t']);
        let prefix = &line[..line.len() - rest.len()];
        let (quote, value, suffix) = split_scalar(rest);

        return Some(VersionLine {
            start: line_start,
            len: line.len(),
            prefix,
            quote,
            value,
            suffix,
        });
    }

    None
}

/// Splits the text after `key:` into quoting style, unquoted value and the
/// remainder of the line.
fn split_scalar(rest: &str) -> (Quote, String, &str) {
    if let Some(inner) = rest.strip_prefix('"') {
        let mut escaped = false;
        for (i, c) in inner.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    let value = inner[..i].replace("\\\"", "\"").replace("\\\\", "\\");
                    return (Quote::Double, value, &inner[i + 1..]);
                }
                _ => escaped = false,
            }
        }
    } else if let Some(inner) = rest.strip_prefix('\'') {
        let mut chars = inner.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    chars.next();
                    continue;
                }
                return (Quote::Single, inner[..i].replace("''", "'"), &inner[i + 1..]);
            }
        }
    }

    let end = rest.find(" #").or_else(|| rest.find("\t#")).unwrap_or(rest.len());
    let value = rest[..end].trim_end();
    (Quote::Plain, value.to_string(), &rest[value.len()..])
}

/// Returns true if the scalar on this line can be replaced in place.
fn is_editable(line: &VersionLine<'_>) -> bool {
    line.quote != Quote::Plain
        || !line
            .value
            .starts_with(['|', '>', '&', '*', '[', '{', '!'])
}

fn quote_scalar(value: &str, quote: Quote) -> String {
    match quote {
        Quote::Plain => value.to_string(),
        Quote::Single => format!("'{}'", value.replace('\'', "''")),
        Quote::Double => format!(
            "\"{}\"",
            value.replace('\\', "\\\\").replace('"', "\\\"")
        ),
    }
}
