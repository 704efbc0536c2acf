//! Project - the on-disk package registry.
//!
//! A project root holds `project.toml`. The root itself is the `local`
//! repository; further repositories are listed under `[repositories]`.
//! Every directory below a repository root that contains `pkg.toml` is a
//! package.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::core::dependency::LOCAL_REPO;
use crate::core::manifest::MANIFEST_NAME;
use crate::core::registry::PackageRegistry;
use crate::core::target::{Target, TARGETS_DIR};
use crate::core::{Dependency, Package, PackageId};

/// File name of the project file.
pub const PROJECT_FILE: &str = "project.toml";

/// The `[project]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub name: String,
}

/// A parsed `project.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectMetadata,

    /// Repository name -> path relative to the project root
    #[serde(default)]
    pub repositories: BTreeMap<String, PathBuf>,
}

impl ProjectManifest {
    /// Load a project file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read project file: {}", path.display()))?;

        let manifest: ProjectManifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse project file: {}", path.display()))?;

        if manifest.repositories.contains_key(LOCAL_REPO) {
            bail!(
                "repository name `{}` is reserved for the project itself ({})",
                LOCAL_REPO,
                path.display()
            );
        }

        Ok(manifest)
    }
}

/// All packages of a project, indexed by (repository, name).
#[derive(Debug, Default)]
pub struct Project {
    name: String,
    root: PathBuf,
    packages: Vec<Package>,
    by_dependency: HashMap<Dependency, PackageId>,
}

impl Project {
    /// Create an empty project rooted at `root`.
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Project {
            name: name.into(),
            root: root.into(),
            packages: Vec::new(),
            by_dependency: HashMap::new(),
        }
    }

    /// Load a project and discover all of its packages.
    pub fn load(root: &Path) -> Result<Self> {
        let manifest = ProjectManifest::load(&root.join(PROJECT_FILE))?;
        let mut project = Project::new(&manifest.project.name, root);

        let mut repo_roots = Vec::new();
        for (repo, path) in &manifest.repositories {
            let repo_root = root.join(path);
            if !repo_root.is_dir() {
                bail!(
                    "repository `{}` not found at {}",
                    repo,
                    repo_root.display()
                );
            }
            repo_roots.push((repo.as_str(), repo_root));
        }

        let nested: Vec<PathBuf> = repo_roots.iter().map(|(_, p)| p.clone()).collect();
        project.scan_repository(LOCAL_REPO, root, &nested)?;
        for (repo, repo_root) in &repo_roots {
            project.scan_repository(repo, repo_root, &[])?;
        }

        tracing::debug!(
            "Loaded project `{}` with {} packages",
            project.name,
            project.packages.len()
        );

        Ok(project)
    }

    fn scan_repository(&mut self, repo: &str, repo_root: &Path, exclude: &[PathBuf]) -> Result<()> {
        let mut manifests = Vec::new();

        let walker = WalkDir::new(repo_root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !(is_skipped_dir(entry.path())
                        || exclude.iter().any(|p| p.as_path() == entry.path()))
            });

        for entry in walker {
            let entry = entry.with_context(|| {
                format!("failed to scan repository `{}` at {}", repo, repo_root.display())
            })?;
            if entry.file_type().is_file() && entry.file_name() == MANIFEST_NAME {
                manifests.push(entry.into_path());
            }
        }

        for path in manifests {
            let pkg = Package::load(&path, repo)?;
            self.add_package(pkg)?;
        }

        Ok(())
    }

    /// Register a package. Fails if (repository, name) is already taken.
    pub fn add_package(&mut self, pkg: Package) -> Result<PackageId> {
        let key = pkg.as_dependency();
        if let Some(&existing) = self.by_dependency.get(&key) {
            bail!(
                "package `{}` is defined twice: {} and {}",
                key,
                self.packages[existing.index()].base_path().display(),
                pkg.base_path().display()
            );
        }

        let id = PackageId::from_index(self.packages.len());
        tracing::trace!("Registered package {} as {}", key, id);
        self.packages.push(pkg);
        self.by_dependency.insert(key, id);

        Ok(id)
    }

    /// Get the project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the project root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Iterate over all packages in registration order.
    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, pkg)| (PackageId::from_index(i), pkg))
    }

    /// Path of a target file inside this project.
    pub fn target_path(&self, name: &str) -> PathBuf {
        Target::path_in(&self.root, name)
    }

    /// Load a named target of this project.
    pub fn load_target(&self, name: &str) -> Result<Target> {
        Target::load(&self.target_path(name))
    }
}

impl PackageRegistry for Project {
    fn resolve(&self, dep: &Dependency) -> Option<PackageId> {
        self.by_dependency.get(dep).copied()
    }

    fn package(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.index())
    }

    fn len(&self) -> usize {
        self.packages.len()
    }
}

fn is_skipped_dir(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name == TARGETS_DIR || name.starts_with('.'),
        None => false,
    }
}

/// Find the project root by searching upward from `start`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PROJECT_FILE).is_file() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::core::settings::ScopedSettings;

    fn write(path: &Path, contents: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn pkg_toml(name: &str) -> String {
        format!("[package]\nname = \"{}\"\n", name)
    }

    #[test]
    fn test_load_discovers_packages_in_all_repos() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            &root.join(PROJECT_FILE),
            "[project]\nname = \"blinky\"\n\n[repositories]\ncore = \"repos/core\"\n",
        );
        write(&root.join("apps/blinky").join(MANIFEST_NAME), &pkg_toml("apps/blinky"));
        write(
            &root.join("repos/core/kernel/os").join(MANIFEST_NAME),
            &pkg_toml("kernel/os"),
        );
        // Targets and hidden directories are never packages.
        write(&root.join("targets/nrf/pkg.toml"), &pkg_toml("targets/nrf"));
        write(&root.join(".cache/pkg.toml"), &pkg_toml("cache"));

        let project = Project::load(root).unwrap();
        assert_eq!(project.name(), "blinky");

        let app = project
            .resolve(&Dependency::new(LOCAL_REPO, "apps/blinky"))
            .unwrap();
        let os = project.resolve(&Dependency::new("core", "kernel/os")).unwrap();

        assert_eq!(project.package(app).unwrap().name(), "apps/blinky");
        assert_eq!(project.package(os).unwrap().repo(), "core");
        assert_eq!(
            project.package(os).unwrap().base_path(),
            root.join("repos/core/kernel/os").as_path()
        );
        assert!(project
            .resolve(&Dependency::new(LOCAL_REPO, "targets/nrf"))
            .is_none());
        assert!(project.resolve(&Dependency::new(LOCAL_REPO, "cache")).is_none());
    }

    #[test]
    fn test_local_scan_skips_repository_roots() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(
            &root.join(PROJECT_FILE),
            "[project]\nname = \"p\"\n\n[repositories]\ncore = \"repos/core\"\n",
        );
        write(&root.join("repos/core/libs/a").join(MANIFEST_NAME), &pkg_toml("libs/a"));

        let project = Project::load(root).unwrap();
        assert!(project.resolve(&Dependency::new("core", "libs/a")).is_some());
        assert!(project.resolve(&Dependency::new(LOCAL_REPO, "libs/a")).is_none());
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn test_duplicate_package_is_an_error() {
        let mut project = Project::new("p", "/p");
        let settings = Arc::new(ScopedSettings::new());
        project
            .add_package(Package::new("libs/a", LOCAL_REPO, "/p/a", settings.clone()))
            .unwrap();

        let err = project
            .add_package(Package::new("libs/a", LOCAL_REPO, "/p/b", settings))
            .unwrap_err();
        assert!(err.to_string().contains("defined twice"));
    }

    #[test]
    fn test_missing_repository_is_an_error() {
        let tmp = TempDir::new().unwrap();
        write(
            &tmp.path().join(PROJECT_FILE),
            "[project]\nname = \"p\"\n\n[repositories]\ncore = \"nowhere\"\n",
        );

        let err = Project::load(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("repository `core` not found"));
    }

    #[test]
    fn test_reserved_repository_name() {
        let tmp = TempDir::new().unwrap();
        write(
            &tmp.path().join(PROJECT_FILE),
            "[project]\nname = \"p\"\n\n[repositories]\nlocal = \".\"\n",
        );

        assert!(Project::load(tmp.path()).is_err());
    }

    #[test]
    fn test_find_project_root() {
        let tmp = TempDir::new().unwrap();
        write(&tmp.path().join(PROJECT_FILE), "[project]\nname = \"p\"\n");
        let nested = tmp.path().join("apps/blinky/src");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_project_root(&nested), Some(tmp.path().to_path_buf()));
    }
}
