//! Keelson - package resolution core for embedded C projects
//!
//! This crate discovers the packages of a project, resolves each build's
//! features and dependencies to a fixed point, and assembles the compiler
//! flags and include paths every package is built with.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities for Keelson unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory packages, a read-counting
/// settings source, and on-disk project fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildError, BuildPackage, Builder, CompilerInfo, LoadState, ResolveSummary};
pub use core::{Dependency, FeatureSet, Package, PackageId, PackageRegistry, Project, Target};

pub use util::context::GlobalContext;
