//! Command implementations

pub mod completions;
pub mod flags;
pub mod resolve;
pub mod tree;
