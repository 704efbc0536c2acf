//! Feature-conditioned package settings.
//!
//! Every package exposes a handful of string-list settings (features,
//! dependencies, flags, capabilities). Each list has base values and may
//! have additional values scoped under a feature; scoped values only
//! apply while that feature is enabled.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::features::FeatureSet;

/// The settings keys the resolution core reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Features this package enables.
    Features,
    /// Dependency descriptor strings.
    Deps,
    /// C compiler flags.
    Cflags,
    /// Linker flags.
    Lflags,
    /// Assembler flags.
    Aflags,
    /// Capabilities this package exports.
    Caps,
    /// Capabilities this package requires.
    ReqCaps,
}

impl SettingKey {
    /// Key name as written in `pkg.toml`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Features => "features",
            SettingKey::Deps => "deps",
            SettingKey::Cflags => "cflags",
            SettingKey::Lflags => "lflags",
            SettingKey::Aflags => "aflags",
            SettingKey::Caps => "caps",
            SettingKey::ReqCaps => "req_caps",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read access to a package's feature-conditioned settings.
pub trait Settings: fmt::Debug + Send + Sync {
    /// Ordered values for `key` given the currently enabled features.
    ///
    /// Base values come first, followed by the values scoped under each
    /// enabled feature in ascending feature-name order.
    fn string_list(&self, key: SettingKey, features: &FeatureSet) -> Vec<String>;
}

/// One table of string-list settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsTable {
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub deps: Vec<String>,

    #[serde(default)]
    pub cflags: Vec<String>,

    #[serde(default)]
    pub lflags: Vec<String>,

    #[serde(default)]
    pub aflags: Vec<String>,

    #[serde(default)]
    pub caps: Vec<String>,

    #[serde(default)]
    pub req_caps: Vec<String>,
}

impl SettingsTable {
    /// Values stored under a key.
    pub fn get(&self, key: SettingKey) -> &[String] {
        match key {
            SettingKey::Features => &self.features,
            SettingKey::Deps => &self.deps,
            SettingKey::Cflags => &self.cflags,
            SettingKey::Lflags => &self.lflags,
            SettingKey::Aflags => &self.aflags,
            SettingKey::Caps => &self.caps,
            SettingKey::ReqCaps => &self.req_caps,
        }
    }

    /// Mutable values stored under a key.
    pub fn get_mut(&mut self, key: SettingKey) -> &mut Vec<String> {
        match key {
            SettingKey::Features => &mut self.features,
            SettingKey::Deps => &mut self.deps,
            SettingKey::Cflags => &mut self.cflags,
            SettingKey::Lflags => &mut self.lflags,
            SettingKey::Aflags => &mut self.aflags,
            SettingKey::Caps => &mut self.caps,
            SettingKey::ReqCaps => &mut self.req_caps,
        }
    }
}

/// Base settings plus per-feature overlays, as found under `[settings]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopedSettings {
    /// Unconditioned values
    #[serde(flatten)]
    pub base: SettingsTable,

    /// Values applied while the named feature is enabled
    #[serde(default, rename = "feature")]
    pub by_feature: BTreeMap<String, SettingsTable>,
}

impl ScopedSettings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append base values for a key.
    pub fn with(mut self, key: SettingKey, values: &[&str]) -> Self {
        self.base
            .get_mut(key)
            .extend(values.iter().map(|v| v.to_string()));
        self
    }

    /// Append values for a key scoped under `feature`.
    pub fn with_feature(mut self, feature: &str, key: SettingKey, values: &[&str]) -> Self {
        self.by_feature
            .entry(feature.to_string())
            .or_default()
            .get_mut(key)
            .extend(values.iter().map(|v| v.to_string()));
        self
    }
}

impl Settings for ScopedSettings {
    fn string_list(&self, key: SettingKey, features: &FeatureSet) -> Vec<String> {
        let mut values = self.base.get(key).to_vec();

        // BTreeMap iteration gives the ascending feature order.
        for (feature, table) in &self.by_feature {
            if features.contains(feature) {
                values.extend(table.get(key).iter().cloned());
            }
        }

        values
    }
}
