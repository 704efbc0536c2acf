//! Dependency descriptors.
//!
//! A Dependency names another package by repository and package name.
//! In a manifest it is written either as `name` (the repository is
//! inherited from the depending package) or as `@repo/name`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Repository name of the project itself.
pub const LOCAL_REPO: &str = "local";

/// Reasons a dependency string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyParseError {
    #[error("dependency string is empty")]
    Empty,

    #[error("dependency `{0}` contains whitespace")]
    Whitespace(String),

    #[error("dependency `{0}` names a repository but no package (expected `@repo/name`)")]
    MissingName(String),

    #[error("dependency `{0}` has an empty repository name")]
    EmptyRepo(String),

    #[error("dependency `{0}` has an empty path segment")]
    EmptySegment(String),
}

/// A reference to another package.
///
/// Equality and hashing are over (repository, name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dependency {
    /// Repository that provides the package
    repo: String,

    /// Slash-separated package name within the repository
    name: String,
}

impl Dependency {
    /// Create a dependency from an already-validated repository and name.
    pub fn new(repo: impl Into<String>, name: impl Into<String>) -> Self {
        Dependency {
            repo: repo.into(),
            name: name.into(),
        }
    }

    /// Parse a dependency string.
    ///
    /// Unqualified names take `default_repo`, normally the repository of
    /// the package that declares the dependency.
    pub fn parse(s: &str, default_repo: &str) -> Result<Self, DependencyParseError> {
        if s.trim().is_empty() {
            return Err(DependencyParseError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(DependencyParseError::Whitespace(s.to_string()));
        }

        let (repo, name) = match s.strip_prefix('@') {
            Some(rest) => {
                let (repo, name) = rest
                    .split_once('/')
                    .ok_or_else(|| DependencyParseError::MissingName(s.to_string()))?;
                if repo.is_empty() {
                    return Err(DependencyParseError::EmptyRepo(s.to_string()));
                }
                if name.is_empty() {
                    return Err(DependencyParseError::MissingName(s.to_string()));
                }
                (repo, name)
            }
            None => (default_repo, s),
        };

        if name.split('/').any(str::is_empty) {
            return Err(DependencyParseError::EmptySegment(s.to_string()));
        }

        Ok(Dependency::new(repo, name))
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the dependency points into the project's own repository.
    pub fn is_local(&self) -> bool {
        self.repo == LOCAL_REPO
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.repo, self.name)
    }
}

impl FromStr for Dependency {
    type Err = DependencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dependency::parse(s, LOCAL_REPO)
    }
}

impl Serialize for Dependency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dependency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
