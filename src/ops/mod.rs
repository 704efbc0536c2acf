//! High-level operations.
//!
//! This module contains the implementation of Keelson commands.

pub mod resolve;

pub use resolve::{resolve_project, resolve_project_at, Resolution, ResolveOptions, ResolveReport};
