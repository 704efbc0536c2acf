//! The Builder: BuildPackage registry and resolution driver.
//!
//! The builder owns one BuildPackage per registered source package, the
//! global feature set and the target. [`Builder::resolve`] keeps loading
//! packages until a whole pass produces no new features, dependencies or
//! packages. Only after that may compiler info be assembled, since it
//! depends on the final dependency closure.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::build_package::{BuildPackage, LoadContext, LoadState, Registrations};
use crate::builder::compiler_info::CompilerInfo;
use crate::builder::errors::BuildError;
use crate::core::{Dependency, FeatureSet, Package, PackageId, PackageRegistry, Target, LOCAL_REPO};

/// Outcome of a converged resolution session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveSummary {
    /// Number of passes over the package set, including the final quiet one
    pub passes: usize,

    /// Number of registered packages
    pub packages: usize,

    /// Number of enabled features
    pub features: usize,
}

/// Resolution session over a package registry.
pub struct Builder<R> {
    registry: R,
    target: Target,
    features: FeatureSet,
    registrations: Registrations,
    packages: HashMap<PackageId, BuildPackage>,
}

impl<R: PackageRegistry> Builder<R> {
    /// Create a builder for `target`, seeding the target's features.
    pub fn new(registry: R, target: Target) -> Self {
        let features = target.features.iter().cloned().collect();

        Builder {
            registry,
            target,
            features,
            registrations: Registrations::new(),
            packages: HashMap::new(),
        }
    }

    /// Get the package registry.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// Get the target.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Get the global feature set.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    /// Enable a feature. Returns true if it was not enabled before.
    pub fn add_feature(&mut self, name: impl Into<String>) -> bool {
        self.features.insert(name)
    }

    /// Check if a source package has a BuildPackage.
    pub fn is_registered(&self, id: PackageId) -> bool {
        self.packages.contains_key(&id)
    }

    /// Get the BuildPackage for a source package.
    pub fn package(&self, id: PackageId) -> Option<&BuildPackage> {
        self.packages.get(&id)
    }

    /// Iterate over BuildPackages in registration order.
    pub fn packages(&self) -> impl Iterator<Item = &BuildPackage> {
        self.registrations
            .order()
            .iter()
            .filter_map(|id| self.packages.get(id))
    }

    /// Register a BuildPackage for a source package.
    ///
    /// Returns true if the package was not registered before.
    pub fn add_package(&mut self, id: PackageId) -> Result<bool, BuildError> {
        if self.registry.package(id).is_none() {
            return Err(BuildError::PackageNotRegistered {
                package: id.to_string(),
            });
        }

        let added = self.registrations.register(id);
        self.materialize_registrations()?;
        Ok(added)
    }

    /// Parse and resolve a dependency string, then register its package.
    ///
    /// Unqualified strings refer to the project's own repository.
    pub fn add_dependency_root(&mut self, entry: &str) -> Result<PackageId, BuildError> {
        let owner = format!("target {}", self.target.name);

        let dep = Dependency::parse(entry, LOCAL_REPO).map_err(|source| {
            BuildError::MalformedDependency {
                package: owner.clone(),
                entry: entry.to_string(),
                source,
            }
        })?;

        let id = self
            .registry
            .resolve(&dep)
            .ok_or_else(|| BuildError::DependencyResolutionFailed {
                package: owner,
                dependency: dep.to_string(),
            })?;

        self.add_package(id)?;
        Ok(id)
    }

    /// Register every package the target names.
    pub fn seed_target(&mut self) -> Result<Vec<PackageId>, BuildError> {
        let entries = self.target.packages.clone();
        entries
            .iter()
            .map(|entry| self.add_dependency_root(entry))
            .collect()
    }

    /// Create BuildPackages for identities registered since the last call.
    fn materialize_registrations(&mut self) -> Result<(), BuildError> {
        let Builder {
            registry,
            registrations,
            packages,
            ..
        } = self;

        for &id in registrations.order() {
            if packages.contains_key(&id) {
                continue;
            }

            let pkg = registry
                .package(id)
                .ok_or_else(|| BuildError::PackageNotRegistered {
                    package: id.to_string(),
                })?;
            packages.insert(id, BuildPackage::new(id, pkg.clone()));
        }

        Ok(())
    }

    /// Run one load attempt for a registered package.
    pub fn load_package(&mut self, id: PackageId) -> Result<LoadState, BuildError> {
        let state = {
            let Builder {
                registry,
                features,
                registrations,
                packages,
                ..
            } = self;

            let bpkg = packages
                .get_mut(&id)
                .ok_or_else(|| BuildError::PackageNotRegistered {
                    package: id.to_string(),
                })?;

            let mut cx = LoadContext {
                registry: &*registry,
                features,
                registrations,
            };
            bpkg.load(&mut cx)?
        };

        self.materialize_registrations()?;
        Ok(state)
    }

    /// Run one pass over every package registered when the pass starts.
    ///
    /// Returns true if the pass changed anything: a package reported
    /// pending or a new package was registered.
    pub fn resolve_pass(&mut self) -> Result<bool, BuildError> {
        let ids = self.registrations.order().to_vec();
        let known = ids.len();
        let mut pending = 0;

        for id in ids {
            if self.load_package(id)? == LoadState::Pending {
                pending += 1;
            }
        }

        let discovered = self.registrations.len() - known;
        tracing::debug!(
            "Resolution pass: {} pending, {} new packages, {} features",
            pending,
            discovered,
            self.features.len()
        );

        Ok(pending > 0 || discovered > 0)
    }

    /// Drive resolution to the global fixed point.
    ///
    /// Feature and dependency sets only grow and are bounded by what the
    /// manifests can express, so this terminates. Any error aborts the
    /// whole session.
    pub fn resolve(&mut self) -> Result<ResolveSummary, BuildError> {
        let mut passes = 0;
        loop {
            passes += 1;
            if !self.resolve_pass()? {
                break;
            }
        }

        let summary = ResolveSummary {
            passes,
            packages: self.registrations.len(),
            features: self.features.len(),
        };
        tracing::info!(
            "Resolved {} packages with {} features in {} passes",
            summary.packages,
            summary.features,
            summary.passes
        );

        Ok(summary)
    }

    fn build_package(&self, id: PackageId) -> Result<&BuildPackage, BuildError> {
        self.packages
            .get(&id)
            .ok_or_else(|| BuildError::PackageNotRegistered {
                package: self.describe(id),
            })
    }

    fn describe(&self, id: PackageId) -> String {
        self.registry
            .package(id)
            .map(Package::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Every package reachable from `id`, including `id` itself.
    ///
    /// Depth-first, each package visited once, so cycles terminate. The
    /// result is in first-discovered order: `id` first, then each
    /// dependency list in its recorded order.
    pub fn collect_deps(&self, id: PackageId) -> Result<Vec<PackageId>, BuildError> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        self.collect_deps_aux(id, &mut visited, &mut order)?;
        Ok(order)
    }

    fn collect_deps_aux(
        &self,
        id: PackageId,
        visited: &mut HashSet<PackageId>,
        order: &mut Vec<PackageId>,
    ) -> Result<(), BuildError> {
        if !visited.insert(id) {
            return Ok(());
        }

        let bpkg = self.build_package(id)?;
        order.push(id);

        for dep in bpkg.deps() {
            let dep_id =
                self.registry
                    .resolve(dep)
                    .ok_or_else(|| BuildError::DependencyResolutionFailed {
                        package: bpkg.to_string(),
                        dependency: dep.to_string(),
                    })?;

            self.collect_deps_aux(dep_id, visited, order)?;
        }

        Ok(())
    }

    /// Public include directories of a package for the target architecture.
    pub fn public_include_dirs(&self, id: PackageId) -> Result<Vec<PathBuf>, BuildError> {
        Ok(self.build_package(id)?.public_include_dirs(&self.target.arch))
    }

    /// Private include directories of a package for the target architecture.
    pub fn private_include_dirs(&self, id: PackageId) -> Result<Vec<PathBuf>, BuildError> {
        Ok(self
            .build_package(id)?
            .private_include_dirs(&self.target.arch, &self.features))
    }

    /// Include search path for compiling a package: its own private
    /// directories, then the public directories of its whole closure.
    pub fn recursive_include_paths(&self, id: PackageId) -> Result<Vec<PathBuf>, BuildError> {
        let mut incls = self.private_include_dirs(id)?;
        for dep_id in self.collect_deps(id)? {
            incls.extend(self.public_include_dirs(dep_id)?);
        }
        Ok(incls)
    }

    /// Compiler info for a loaded package, assembled on first request.
    pub fn compiler_info(&mut self, id: PackageId) -> Result<&CompilerInfo, BuildError> {
        let bpkg = self.build_package(id)?;
        if !bpkg.is_loaded() {
            return Err(BuildError::NotLoaded {
                package: bpkg.to_string(),
            });
        }

        if bpkg.compiler_info().is_none() {
            let includes = self.recursive_include_paths(id)?;
            let ci = self
                .build_package(id)?
                .assemble_compiler_info(&self.features, includes);
            tracing::debug!("{}: assembled compiler info", self.describe(id));

            if let Some(bpkg) = self.packages.get_mut(&id) {
                bpkg.cache_compiler_info(ci);
            }
        }

        let bpkg = self.build_package(id)?;
        bpkg.compiler_info().ok_or_else(|| BuildError::NotLoaded {
            package: bpkg.to_string(),
        })
    }

    /// Check that every required capability is exported by some package.
    ///
    /// Only meaningful after [`Builder::resolve`]; unloaded packages have
    /// recorded no capabilities.
    pub fn verify_capabilities(&self) -> Result<(), BuildError> {
        let mut providers: HashMap<&str, Vec<&BuildPackage>> = HashMap::new();
        for bpkg in self.packages() {
            for api in bpkg.apis() {
                providers.entry(api.as_str()).or_default().push(bpkg);
            }
        }

        let mut duplicated: Vec<_> = providers.iter().filter(|(_, p)| p.len() > 1).collect();
        duplicated.sort_by(|a, b| a.0.cmp(b.0));
        for (api, pkgs) in duplicated {
            let names: Vec<String> = pkgs.iter().map(|p| p.to_string()).collect();
            tracing::warn!(
                "capability `{}` is provided by several packages: {}",
                api,
                names.join(", ")
            );
        }

        for bpkg in self.packages() {
            for req in bpkg.req_apis() {
                if !providers.contains_key(req.as_str()) {
                    return Err(BuildError::MissingCapability {
                        package: bpkg.to_string(),
                        capability: req.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
