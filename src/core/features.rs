//! The global feature set.
//!
//! Features are plain names. Once enabled during a resolution session a
//! feature stays enabled; the set exposes no way to remove one.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Name of the feature that pulls test sources into private include paths.
pub const TEST_FEATURE: &str = "test";

/// Append-only set of enabled feature names.
///
/// Iteration is in ascending name order, which is also the order in which
/// feature-scoped settings are merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSet {
    enabled: BTreeSet<String>,
}

impl FeatureSet {
    /// Create an empty feature set.
    pub fn new() -> Self {
        FeatureSet {
            enabled: BTreeSet::new(),
        }
    }

    /// Enable a feature. Returns true if it was not enabled before.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.enabled.insert(name.into())
    }

    /// Check whether a feature is enabled.
    pub fn contains(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Iterate over enabled feature names in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.enabled.iter().map(String::as_str)
    }

    /// Number of enabled features.
    pub fn len(&self) -> usize {
        self.enabled.len()
    }

    /// Check if no feature is enabled.
    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Whether the `test` feature is enabled.
    pub fn is_test(&self) -> bool {
        self.contains(TEST_FEATURE)
    }
}

impl<S: Into<String>> FromIterator<S> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FeatureSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<S: Into<String>> Extend<S> for FeatureSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for name in iter {
            self.insert(name);
        }
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{}", names.join(" "))
    }
}
