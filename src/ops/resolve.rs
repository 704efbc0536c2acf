//! Project resolution operations.
//!
//! Loads a project and one of its targets, seeds a [`Builder`] and drives
//! it to convergence.

use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::builder::{Builder, ResolveSummary};
use crate::core::{Dependency, PackageId, PackageRegistry, Project, LOCAL_REPO};
use crate::util::diagnostic::{suggestions, UnresolvedDependencyError};
use crate::util::GlobalContext;

/// Options for resolving a project.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Target name; falls back to `[build] target` from config
    pub target: Option<String>,

    /// Extra features to enable
    pub features: Vec<String>,

    /// Extra packages to build besides the target's own
    pub packages: Vec<String>,

    /// Override `[build] verify_caps`
    pub verify_caps: Option<bool>,
}

/// A converged resolution session.
pub struct Resolution {
    /// The builder, holding every BuildPackage in its final state
    pub builder: Builder<Project>,

    /// Convergence summary
    pub summary: ResolveSummary,

    /// Ids of [`ResolveOptions::packages`], in the same order
    pub roots: Vec<PackageId>,
}

/// Serializable view of a resolution, for `--json` output.
#[derive(Debug, Serialize)]
pub struct ResolveReport {
    pub project: String,
    pub target: String,
    pub arch: String,
    pub passes: usize,
    pub packages: Vec<String>,
    pub features: Vec<String>,
}

impl Resolution {
    /// Build a report of the resolved package and feature sets.
    pub fn report(&self) -> ResolveReport {
        let target = self.builder.target();

        ResolveReport {
            project: self.builder.registry().name().to_string(),
            target: target.name.clone(),
            arch: target.arch.clone(),
            passes: self.summary.passes,
            packages: self.builder.packages().map(|p| p.to_string()).collect(),
            features: self.builder.features().iter().map(str::to_string).collect(),
        }
    }
}

/// Resolve the project containing the current directory.
pub fn resolve_project(ctx: &GlobalContext, opts: &ResolveOptions) -> Result<Resolution> {
    let root = ctx.find_project_root()?;
    resolve_project_at(ctx, &root, opts)
}

/// Resolve the project rooted at `root`.
pub fn resolve_project_at(
    ctx: &GlobalContext,
    root: &Path,
    opts: &ResolveOptions,
) -> Result<Resolution> {
    let config = ctx.load_config(root);
    let project = Project::load(root)?;

    let target_name = match opts.target.as_ref().or(config.build.target.as_ref()) {
        Some(name) => name.clone(),
        None => bail!("no target selected\n{}", suggestions::NO_TARGET),
    };
    let target = project.load_target(&target_name)?;
    tracing::info!(
        "Resolving target `{}` ({}) of project `{}`",
        target.name,
        target.arch,
        project.name()
    );

    for entry in &opts.packages {
        ensure_known(&project, entry)?;
    }

    let mut builder = Builder::new(project, target);
    for feature in config.build.features.iter().chain(&opts.features) {
        builder.add_feature(feature.as_str());
    }

    builder.seed_target()?;
    let roots = opts
        .packages
        .iter()
        .map(|entry| builder.add_dependency_root(entry))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = builder.resolve()?;

    if opts.verify_caps.unwrap_or_else(|| config.build.verify_caps()) {
        builder.verify_capabilities()?;
    }

    Ok(Resolution {
        builder,
        summary,
        roots,
    })
}

/// Fail with a suggestion-bearing error if `entry` names no package.
///
/// Malformed entries pass through; the builder reports those.
fn ensure_known(project: &Project, entry: &str) -> Result<(), UnresolvedDependencyError> {
    let Ok(dep) = Dependency::parse(entry, LOCAL_REPO) else {
        return Ok(());
    };

    if project.resolve(&dep).is_some() {
        return Ok(());
    }

    let known: Vec<String> = project.packages().map(|(_, p)| p.to_string()).collect();
    Err(UnresolvedDependencyError::new(
        entry,
        project.name(),
        known.iter().map(String::as_str),
    ))
}
