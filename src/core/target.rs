//! Target definitions - what gets built, and for which architecture.
//!
//! A target lives at `targets/<name>/target.toml` inside the project. It
//! names the architecture, the packages the build starts from, and the
//! features enabled before resolution begins.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Directory under the project root that holds targets.
pub const TARGETS_DIR: &str = "targets";

/// File name of a target descriptor.
pub const TARGET_FILE: &str = "target.toml";

/// Target descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name
    pub name: String,

    /// Architecture name, used for `arch/<arch>` include directories
    pub arch: String,

    /// Dependency strings of the packages the build starts from
    #[serde(default)]
    pub packages: Vec<String>,

    /// Features enabled before resolution starts
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Deserialize)]
struct TargetFile {
    target: Target,
}

impl Target {
    /// Create a target with no seed packages or features.
    pub fn new(name: impl Into<String>, arch: impl Into<String>) -> Self {
        Target {
            name: name.into(),
            arch: arch.into(),
            packages: Vec::new(),
            features: Vec::new(),
        }
    }

    /// Add a seed package.
    pub fn with_package(mut self, dep: impl Into<String>) -> Self {
        self.packages.push(dep.into());
        self
    }

    /// Add a seed feature.
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.features.push(feature.into());
        self
    }

    /// Where a named target lives inside a project.
    pub fn path_in(project_root: &Path, name: &str) -> PathBuf {
        project_root.join(TARGETS_DIR).join(name).join(TARGET_FILE)
    }

    /// Load a target descriptor.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read target: {}", path.display()))?;

        Self::parse(&contents).with_context(|| format!("failed to parse target: {}", path.display()))
    }

    /// Parse a target descriptor from a string.
    pub fn parse(contents: &str) -> Result<Self> {
        let file: TargetFile = toml::from_str(contents)?;
        let target = file.target;

        if target.arch.is_empty() || target.arch.contains(['/', '\\']) {
            bail!("invalid architecture `{}`", target.arch);
        }

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_target() {
        let target = Target::parse(
            r#"
[target]
name = "blinky-nrf52"
arch = "cortex_m4"
packages = ["apps/blinky", "@core/hw/bsp/nrf52"]
features = ["BLE"]
"#,
        )
        .unwrap();

        assert_eq!(target.name, "blinky-nrf52");
        assert_eq!(target.arch, "cortex_m4");
        assert_eq!(target.packages.len(), 2);
        assert_eq!(target.features, vec!["BLE"]);
    }

    #[test]
    fn test_invalid_arch() {
        assert!(Target::parse("[target]\nname = \"t\"\narch = \"\"\n").is_err());
        assert!(Target::parse("[target]\nname = \"t\"\narch = \"a/b\"\n").is_err());
    }

    #[test]
    fn test_load_from_project_layout() {
        let tmp = TempDir::new().unwrap();
        let path = Target::path_in(tmp.path(), "sim");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[target]\nname = \"sim\"\narch = \"sim\"\n").unwrap();

        let target = Target::load(&path).unwrap();
        assert_eq!(target, Target::new("sim", "sim"));
        assert!(path.ends_with("targets/sim/target.toml"));
    }
}
