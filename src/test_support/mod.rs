//! Test utilities for Keelson unit tests.
//!
//! Provides helpers for building in-memory package graphs and a
//! `Settings` wrapper that counts how often configuration is read.
//!
//! # Example
//!
//! ```rust,ignore
//! use keelson::test_support::{package_at, CountingSettings};
//!
//! let settings = Arc::new(CountingSettings::new(ScopedSettings::new()));
//! let mut project = Project::new("p", "/ws");
//! project.add_package(package_at("libs/os", settings.clone()))?;
//! // ... drive a Builder ...
//! assert_eq!(settings.reads(), 3);
//! ```

pub mod fixtures;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{FeatureSet, Package, ScopedSettings, SettingKey, Settings, LOCAL_REPO};

pub use fixtures::*;

/// Root directory used for in-memory packages.
pub const WS_ROOT: &str = "/ws";

/// A local package named `name` whose base path is `/ws/<name>`.
pub fn package_at(name: &str, settings: Arc<dyn Settings>) -> Package {
    Package::new(name, LOCAL_REPO, Path::new(WS_ROOT).join(name), settings)
}

/// A local package with the given settings and no read counting.
pub fn package(name: &str, settings: ScopedSettings) -> Package {
    package_at(name, Arc::new(settings))
}

/// Settings wrapper that counts every `string_list` call.
#[derive(Debug)]
pub struct CountingSettings {
    inner: ScopedSettings,
    reads: AtomicUsize,
    per_key: [AtomicUsize; 7],
}

impl CountingSettings {
    /// Wrap settings.
    pub fn new(inner: ScopedSettings) -> Self {
        CountingSettings {
            inner,
            reads: AtomicUsize::new(0),
            per_key: Default::default(),
        }
    }

    /// Total number of reads so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of reads of one key so far.
    pub fn reads_of(&self, key: SettingKey) -> usize {
        self.per_key[key_slot(key)].load(Ordering::SeqCst)
    }
}

fn key_slot(key: SettingKey) -> usize {
    match key {
        SettingKey::Features => 0,
        SettingKey::Deps => 1,
        SettingKey::Cflags => 2,
        SettingKey::Lflags => 3,
        SettingKey::Aflags => 4,
        SettingKey::Caps => 5,
        SettingKey::ReqCaps => 6,
    }
}

impl Settings for CountingSettings {
    fn string_list(&self, key: SettingKey, features: &FeatureSet) -> Vec<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.per_key[key_slot(key)].fetch_add(1, Ordering::SeqCst);
        self.inner.string_list(key, features)
    }
}
