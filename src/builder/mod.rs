//! Build-specific package resolution.
//!
//! Wraps source packages in per-build state, drives feature and
//! dependency discovery to a fixed point, and assembles the compiler
//! info each package needs.

pub mod build_package;
pub mod compiler_info;
pub mod driver;
pub mod errors;

pub use build_package::{BuildPackage, LoadState};
pub use compiler_info::CompilerInfo;
pub use driver::{Builder, ResolveSummary};
pub use errors::BuildError;
