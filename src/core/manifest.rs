//! pkg.toml manifest parsing and schema.
//!
//! Every package directory carries a `pkg.toml` with a `[package]` header
//! and a `[settings]` table whose string lists may be scoped under
//! features (`[settings.feature.NAME]`).

use std::path::Path;

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::core::settings::ScopedSettings;

/// File name of a package manifest.
pub const MANIFEST_NAME: &str = "pkg.toml";

/// The `[package]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Slash-separated package name, unique within its repository
    pub name: String,

    /// Optional semver version
    #[serde(default)]
    pub version: Option<String>,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,
}

/// A parsed `pkg.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageMetadata,

    #[serde(default)]
    pub settings: ScopedSettings,
}

impl Manifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))
    }

    /// Parse a manifest from a string.
    pub fn parse(contents: &str) -> Result<Self> {
        let manifest: Manifest = toml::from_str(contents)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        let name = &self.package.name;
        if name.is_empty() {
            bail!("package name cannot be empty");
        }
        if name.starts_with('@') || name.chars().any(char::is_whitespace) {
            bail!("invalid package name `{}`", name);
        }
        if name.split('/').any(str::is_empty) {
            bail!("package name `{}` has an empty path segment", name);
        }

        self.version()?;
        Ok(())
    }

    /// Get the package version, if one is declared.
    pub fn version(&self) -> Result<Option<Version>> {
        match self.package.version {
            Some(ref v) => Version::parse(v)
                .map(Some)
                .with_context(|| format!("invalid version `{}`", v)),
            None => Ok(None),
        }
    }
}
