//! Core data structures for Keelson.
//!
//! This module contains the value types and collaborators the resolution
//! core works against:
//! - Package identity (PackageId) and source packages
//! - Dependency descriptors and the registry that resolves them
//! - Feature-conditioned settings and the global feature set
//! - Project and target descriptors

pub mod dependency;
pub mod features;
pub mod manifest;
pub mod package;
pub mod package_id;
pub mod project;
pub mod registry;
pub mod settings;
pub mod target;

pub use dependency::{Dependency, DependencyParseError, LOCAL_REPO};
pub use features::{FeatureSet, TEST_FEATURE};
pub use manifest::{Manifest, MANIFEST_NAME};
pub use package::Package;
pub use package_id::PackageId;
pub use project::{find_project_root, Project, PROJECT_FILE};
pub use registry::PackageRegistry;
pub use settings::{ScopedSettings, SettingKey, Settings};
pub use target::Target;
