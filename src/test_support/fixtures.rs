//! On-disk project fixtures.
//!
//! Writes a `project.toml`, package manifests and target files into a
//! temporary directory so loaders can be tested against real files.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::{MANIFEST_NAME, PROJECT_FILE};
use crate::core::target::Target;

/// A project laid out in a temporary directory.
pub struct ProjectFixture {
    dir: TempDir,
}

impl ProjectFixture {
    /// Create a project with the given name and no packages.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let fixture = ProjectFixture { dir };
        fixture.write(PROJECT_FILE, &format!("[project]\nname = \"{}\"\n", name));
        fixture
    }

    /// Create a project that also declares repositories (name, relative path).
    pub fn with_repositories(name: &str, repos: &[(&str, &str)]) -> Self {
        let fixture = Self::new(name);
        let mut contents = format!("[project]\nname = \"{}\"\n\n[repositories]\n", name);
        for (repo, path) in repos {
            contents.push_str(&format!("{} = \"{}\"\n", repo, path));
            std::fs::create_dir_all(fixture.root().join(path)).expect("failed to create repo");
        }
        fixture.write(PROJECT_FILE, &contents);
        fixture
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file relative to the project root.
    pub fn write(&self, rel: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("failed to write fixture file");
        path
    }

    /// Add a package at `dir` (relative to the project root) whose
    /// manifest body (everything after `[package]`) is `settings`.
    pub fn package(&self, dir: &str, name: &str, settings: &str) -> PathBuf {
        let contents = format!("[package]\nname = \"{}\"\n\n{}", name, settings);
        self.write(Path::new(dir).join(MANIFEST_NAME), &contents)
    }

    /// Add a target.
    pub fn target(&self, target: &Target) -> PathBuf {
        let mut contents = format!(
            "[target]\nname = \"{}\"\narch = \"{}\"\n",
            target.name, target.arch
        );
        contents.push_str(&format!("packages = {:?}\n", target.packages));
        contents.push_str(&format!("features = {:?}\n", target.features));

        let path = Target::path_in(self.root(), &target.name);
        let rel = path
            .strip_prefix(self.root())
            .expect("target path is inside the project")
            .to_path_buf();
        self.write(rel, &contents)
    }
}
