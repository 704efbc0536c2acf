//! Package identification - WHICH source package.
//!
//! A PackageId is the index of a source package in its registry's arena.
//! Two ids are equal only if they point at the same registered package,
//! never because two packages happen to share a name or path.

use std::fmt;

/// Stable identity of a source package inside a registry.
///
/// PackageIds are cheap to copy, hash and compare. They are only
/// meaningful relative to the registry that handed them out.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(u32);

impl PackageId {
    /// Create an id from an arena index.
    pub fn from_index(index: usize) -> Self {
        PackageId(index as u32)
    }

    /// Get the arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageId({})", self.0)
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
