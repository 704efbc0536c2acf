//! Package - a source package with its settings and location.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use semver::Version;

use crate::core::dependency::Dependency;
use crate::core::manifest::Manifest;
use crate::core::settings::Settings;

/// A source package: name, owning repository, base directory and settings.
#[derive(Debug, Clone)]
pub struct Package {
    /// Slash-separated package name
    name: String,

    /// Repository the package lives in
    repo: String,

    /// Package directory; include and source paths hang off it
    base_path: PathBuf,

    /// Declared version, if any
    version: Option<Version>,

    /// Feature-conditioned settings
    settings: Arc<dyn Settings>,
}

impl Package {
    /// Create a package from its parts.
    pub fn new(
        name: impl Into<String>,
        repo: impl Into<String>,
        base_path: impl Into<PathBuf>,
        settings: Arc<dyn Settings>,
    ) -> Self {
        Package {
            name: name.into(),
            repo: repo.into(),
            base_path: base_path.into(),
            version: None,
            settings,
        }
    }

    /// Load a package from a `pkg.toml` file belonging to `repo`.
    pub fn load(manifest_path: &Path, repo: &str) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let base_path = manifest_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self::from_manifest(manifest, repo, base_path)
    }

    /// Build a package from a parsed manifest.
    pub fn from_manifest(manifest: Manifest, repo: &str, base_path: PathBuf) -> Result<Self> {
        let version = manifest.version()?;
        let mut pkg = Package::new(
            manifest.package.name,
            repo,
            base_path,
            Arc::new(manifest.settings),
        );
        pkg.version = version;
        Ok(pkg)
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the last segment of the package name (`hw/drivers/uart` -> `uart`).
    pub fn base_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the package directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the declared version.
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Get the package settings.
    pub fn settings(&self) -> &dyn Settings {
        self.settings.as_ref()
    }

    /// A dependency descriptor that points at this package.
    pub fn as_dependency(&self) -> Dependency {
        Dependency::new(&self.repo, &self.name)
    }

    /// Get the public include directory.
    pub fn include_dir(&self) -> PathBuf {
        self.base_path.join("include")
    }

    /// Get the source directory.
    pub fn src_dir(&self) -> PathBuf {
        self.base_path.join("src")
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}/{}", self.repo, self.name)
    }
}
