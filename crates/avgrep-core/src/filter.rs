//! Candidate-file filtering for the walker.
//!
//! A [`FilterSpec`] carries up to three pattern groups: full path, file
//! name, and extension. Within a group any pattern may match (substring
//! containment); across groups every supplied group must match. An empty
//! spec accepts everything. Directories are never filtered — the walker
//! only consults the spec at leaf files.

use std::path::Path;

use serde::Deserialize;

/// One pattern group. Deserializes from either a single string or a list
/// of strings, so a config supplying `"fileName": "report"` means the same
/// as `"fileName": ["report"]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct Patterns(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Patterns {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(s) => Self(vec![s]),
            OneOrMany::Many(v) => Self(v),
        }
    }
}

impl From<&str> for Patterns {
    fn from(s: &str) -> Self {
        Self(vec![s.to_string()])
    }
}

impl From<String> for Patterns {
    fn from(s: String) -> Self {
        Self(vec![s])
    }
}

impl From<Vec<String>> for Patterns {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl Patterns {
    /// True if the group imposes no constraint.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any pattern in the group is contained in `candidate`.
    fn matches(&self, candidate: &str) -> bool {
        self.0.iter().any(|p| candidate.contains(p.as_str()))
    }
}

/// Multi-criteria filter applied to leaf files before search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSpec {
    /// Substring patterns tested against the full path.
    #[serde(default)]
    pub path: Patterns,
    /// Substring patterns tested against the final path component.
    #[serde(default, rename = "fileName", alias = "file_name")]
    pub file_name: Patterns,
    /// Substring patterns tested against the extension, leading dot
    /// included (`.log`, not `log`).
    #[serde(default)]
    pub extension: Patterns,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, patterns: impl Into<Patterns>) -> Self {
        self.path = patterns.into();
        self
    }

    pub fn with_file_name(mut self, patterns: impl Into<Patterns>) -> Self {
        self.file_name = patterns.into();
        self
    }

    pub fn with_extension(mut self, patterns: impl Into<Patterns>) -> Self {
        self.extension = patterns.into();
        self
    }

    /// True if every group is empty — the spec accepts every file.
    pub fn is_empty(&self) -> bool {
        self.path.is_empty() && self.file_name.is_empty() && self.extension.is_empty()
    }

    /// Evaluate the conjunction of all non-empty groups against a path.
    ///
    /// Short-circuits: a supplied group with no matching pattern excludes
    /// the candidate regardless of the other groups.
    pub fn matches(&self, path: &Path) -> bool {
        if !self.path.is_empty() && !self.path.matches(&path.to_string_lossy()) {
            return false;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if !self.file_name.is_empty() && !self.file_name.matches(&file_name) {
            return false;
        }

        if !self.extension.is_empty() && !self.extension.matches(extension_of(&file_name)) {
            return false;
        }

        true
    }
}

/// Extension of a file name, leading dot included. A dotless name and a
/// leading-dot file like `.bashrc` both have no extension.
fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(i) if i > 0 => &file_name[i..],
        _ => "",
    }
}
