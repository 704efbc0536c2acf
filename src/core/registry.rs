//! Registry trait - the dependency-name resolver.
//!
//! A registry owns every known source package and maps dependency
//! descriptors to the identity of the package that satisfies them.

use crate::core::{Dependency, Package, PackageId};

/// A source of packages.
pub trait PackageRegistry {
    /// Map a dependency descriptor to a package identity.
    ///
    /// Returns None if no package matches.
    fn resolve(&self, dep: &Dependency) -> Option<PackageId>;

    /// Look up a package by identity.
    fn package(&self, id: PackageId) -> Option<&Package>;

    /// Number of known packages.
    fn len(&self) -> usize;

    /// Check if the registry knows no packages.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: PackageRegistry + ?Sized> PackageRegistry for &R {
    fn resolve(&self, dep: &Dependency) -> Option<PackageId> {
        (**self).resolve(dep)
    }

    fn package(&self, id: PackageId) -> Option<&Package> {
        (**self).package(id)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}
