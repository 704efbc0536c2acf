//! Compiler invocation parameters for one package.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::util::hash::Fingerprint;

/// Flags and include directories used to compile one package.
///
/// Flags come from the package alone; include directories also cover the
/// public headers of every package it transitively depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerInfo {
    /// C compiler flags
    pub cflags: Vec<String>,

    /// Linker flags
    pub lflags: Vec<String>,

    /// Assembler flags
    pub aflags: Vec<String>,

    /// Include directories, in search order
    pub includes: Vec<PathBuf>,
}

impl CompilerInfo {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arguments for a C compile: cflags followed by one `-I` per include.
    pub fn compile_args(&self) -> Vec<String> {
        let mut args = self.cflags.clone();
        args.extend(
            self.includes
                .iter()
                .map(|dir| format!("-I{}", dir.display())),
        );
        args
    }

    /// Arguments for an assemble: aflags followed by one `-I` per include.
    pub fn assemble_args(&self) -> Vec<String> {
        let mut args = self.aflags.clone();
        args.extend(
            self.includes
                .iter()
                .map(|dir| format!("-I{}", dir.display())),
        );
        args
    }

    /// Stable hash over every list, for build caching.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();

        fp.update_str("cflags").update_strs(self.cflags.iter().map(String::as_str));
        fp.update_str("lflags").update_strs(self.lflags.iter().map(String::as_str));
        fp.update_str("aflags").update_strs(self.aflags.iter().map(String::as_str));
        fp.update_str("includes");
        for dir in &self.includes {
            fp.update_path(dir);
        }

        fp.finish()
    }

    /// Shortened [`CompilerInfo::fingerprint`] for display.
    pub fn short_fingerprint(&self) -> String {
        self.fingerprint()[..16].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CompilerInfo {
        CompilerInfo {
            cflags: vec!["-Os".to_string(), "-DBLE=1".to_string()],
            lflags: vec!["-Wl,--gc-sections".to_string()],
            aflags: vec!["-x".to_string(), "assembler-with-cpp".to_string()],
            includes: vec![PathBuf::from("apps/blinky/src"), PathBuf::from("libs/os/include")],
        }
    }

    #[test]
    fn test_compile_args() {
        assert_eq!(
            sample().compile_args(),
            vec![
                "-Os",
                "-DBLE=1",
                "-Iapps/blinky/src",
                "-Ilibs/os/include"
            ]
        );
        assert_eq!(sample().assemble_args()[0], "-x");
    }

    #[test]
    fn test_fingerprint_tracks_every_list() {
        let base = sample();
        assert_eq!(base.fingerprint(), sample().fingerprint());

        let mut moved = sample();
        // Same strings, different list: must not collide.
        moved.lflags.clear();
        moved.aflags.push("-Wl,--gc-sections".to_string());
        assert_ne!(base.fingerprint(), moved.fingerprint());

        let mut reordered = sample();
        reordered.includes.reverse();
        assert_ne!(base.fingerprint(), reordered.fingerprint());
    }
}
