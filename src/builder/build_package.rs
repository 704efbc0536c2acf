//! Build-specific resolution state for one source package.
//!
//! A BuildPackage starts unloaded. Each call to [`BuildPackage::load`]
//! reads the package's features and dependencies under the current
//! global feature set; while either produces something new the package
//! stays unloaded and the caller is expected to come back later. The
//! first call that finds nothing new finalizes the package.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

use crate::builder::compiler_info::CompilerInfo;
use crate::builder::errors::BuildError;
use crate::core::{Dependency, FeatureSet, Package, PackageId, PackageRegistry, SettingKey};

/// Outcome of one load attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// New features or dependencies were found; try again later.
    Pending,
    /// The package reached its terminal state.
    Loaded,
}

impl LoadState {
    /// Check if the package is loaded.
    pub fn is_loaded(self) -> bool {
        self == LoadState::Loaded
    }
}

/// Identities registered with a builder, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registrations {
    order: Vec<PackageId>,
    known: HashSet<PackageId>,
}

impl Registrations {
    /// Create an empty registration list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an identity. Returns true if it was not registered before.
    pub fn register(&mut self, id: PackageId) -> bool {
        if self.known.insert(id) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    /// Check if an identity is registered.
    pub fn contains(&self, id: PackageId) -> bool {
        self.known.contains(&id)
    }

    /// Registered identities in registration order.
    pub fn order(&self) -> &[PackageId] {
        &self.order
    }

    /// Number of registered identities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Shared state a load attempt reads and grows.
pub struct LoadContext<'a> {
    /// Resolves dependency descriptors to package identities
    pub registry: &'a dyn PackageRegistry,

    /// Global feature set
    pub features: &'a mut FeatureSet,

    /// Packages registered with the builder
    pub registrations: &'a mut Registrations,
}

/// One source package plus its resolution state.
#[derive(Debug, Clone)]
pub struct BuildPackage {
    id: PackageId,
    pkg: Package,
    loaded: bool,
    deps: Vec<Dependency>,
    apis: Vec<String>,
    req_apis: Vec<String>,
    full_ci: Option<CompilerInfo>,
}

impl BuildPackage {
    /// Wrap a source package in fresh, unloaded state.
    pub fn new(id: PackageId, pkg: Package) -> Self {
        BuildPackage {
            id,
            pkg,
            loaded: false,
            deps: Vec::new(),
            apis: Vec::new(),
            req_apis: Vec::new(),
            full_ci: None,
        }
    }

    /// Get the source package identity.
    pub fn id(&self) -> PackageId {
        self.id
    }

    /// Get the source package.
    pub fn package(&self) -> &Package {
        &self.pkg
    }

    /// Check if resolution reached the terminal state.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Dependencies discovered so far, in discovery order.
    pub fn deps(&self) -> &[Dependency] {
        &self.deps
    }

    /// Check if a dependency is already recorded.
    pub fn has_dep(&self, dep: &Dependency) -> bool {
        self.deps.contains(dep)
    }

    /// Capabilities this package exports. Empty until loaded.
    pub fn apis(&self) -> &[String] {
        &self.apis
    }

    /// Capabilities this package requires. Empty until loaded.
    pub fn req_apis(&self) -> &[String] {
        &self.req_apis
    }

    /// The memoized compiler info, if it has been assembled.
    pub fn compiler_info(&self) -> Option<&CompilerInfo> {
        self.full_ci.as_ref()
    }

    /// Try to bring the package to its loaded state.
    ///
    /// Features are discovered first, then dependencies under the feature
    /// set that discovery produced. If neither step finds anything new the
    /// package records its capabilities and becomes loaded.
    pub fn load(&mut self, cx: &mut LoadContext<'_>) -> Result<LoadState, BuildError> {
        if self.loaded {
            return Ok(LoadState::Loaded);
        }

        let new_features = self.load_features(cx.features);
        let new_deps = self.load_deps(cx)?;

        if new_features || new_deps {
            tracing::debug!(
                "{}: pending (new features: {}, new deps: {})",
                self.pkg,
                new_features,
                new_deps
            );
            return Ok(LoadState::Pending);
        }

        // Capabilities do not feed back into the fixed point; read them once.
        let settings = self.pkg.settings();
        self.apis
            .extend(settings.string_list(SettingKey::Caps, cx.features));
        self.req_apis
            .extend(settings.string_list(SettingKey::ReqCaps, cx.features));

        self.loaded = true;
        tracing::debug!("{}: loaded with {} deps", self.pkg, self.deps.len());

        Ok(LoadState::Loaded)
    }

    fn load_features(&self, features: &mut FeatureSet) -> bool {
        let declared = self
            .pkg
            .settings()
            .string_list(SettingKey::Features, features);

        let mut found_new = false;
        for feature in declared {
            if features.insert(feature.as_str()) {
                tracing::debug!("{}: enabled feature {}", self.pkg, feature);
                found_new = true;
            }
        }

        found_new
    }

    fn load_deps(&mut self, cx: &mut LoadContext<'_>) -> Result<bool, BuildError> {
        let declared = self
            .pkg
            .settings()
            .string_list(SettingKey::Deps, cx.features);

        let mut found_new = false;
        for entry in declared {
            let dep = Dependency::parse(&entry, self.pkg.repo()).map_err(|source| {
                BuildError::MalformedDependency {
                    package: self.pkg.to_string(),
                    entry: entry.clone(),
                    source,
                }
            })?;

            let dep_id = cx.registry.resolve(&dep).ok_or_else(|| {
                BuildError::DependencyResolutionFailed {
                    package: self.pkg.to_string(),
                    dependency: dep.to_string(),
                }
            })?;

            if cx.registrations.register(dep_id) {
                tracing::debug!("{}: discovered package {}", self.pkg, dep);
                found_new = true;
            }

            if !self.has_dep(&dep) {
                self.deps.push(dep);
                found_new = true;
            }
        }

        Ok(found_new)
    }

    /// Public include directories for `arch`.
    ///
    /// `<base>/include` and `<base>/include/<base name>/arch/<arch>`.
    pub fn public_include_dirs(&self, arch: &str) -> Vec<PathBuf> {
        let include = self.pkg.include_dir();
        let arch_dir = include.join(self.pkg.base_name()).join("arch").join(arch);

        vec![include, arch_dir]
    }

    /// Private include directories for `arch`.
    ///
    /// `<base>/src` and `<base>/src/arch/<arch>`, plus the matching
    /// `src/test` pair while the `test` feature is enabled.
    pub fn private_include_dirs(&self, arch: &str, features: &FeatureSet) -> Vec<PathBuf> {
        let src = self.pkg.src_dir();

        let arch_dir = src.join("arch").join(arch);
        let mut incls = vec![src.clone(), arch_dir];

        if features.is_test() {
            let test = src.join("test");
            let test_arch = test.join("arch").join(arch);
            incls.push(test);
            incls.push(test_arch);
        }

        incls
    }

    /// Assemble compiler info from this package's own flags and the given
    /// include directories. Flags are never taken from dependencies.
    pub(crate) fn assemble_compiler_info(
        &self,
        features: &FeatureSet,
        includes: Vec<PathBuf>,
    ) -> CompilerInfo {
        let settings = self.pkg.settings();

        CompilerInfo {
            cflags: settings.string_list(SettingKey::Cflags, features),
            lflags: settings.string_list(SettingKey::Lflags, features),
            aflags: settings.string_list(SettingKey::Aflags, features),
            includes,
        }
    }

    /// Store the assembled compiler info. Keeps the first value if called twice.
    pub(crate) fn cache_compiler_info(&mut self, ci: CompilerInfo) -> &CompilerInfo {
        self.full_ci.get_or_insert(ci)
    }
}

impl fmt::Display for BuildPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pkg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Project, ScopedSettings, TEST_FEATURE};
    use crate::test_support::{package_at, CountingSettings};
    use std::sync::Arc;

    fn single(settings: ScopedSettings) -> (Project, PackageId) {
        let mut project = Project::new("p", "/ws");
        let id = project
            .add_package(package_at("libs/foo", Arc::new(settings)))
            .unwrap();
        (project, id)
    }

    fn load_once(
        bpkg: &mut BuildPackage,
        project: &Project,
        features: &mut FeatureSet,
        registrations: &mut Registrations,
    ) -> Result<LoadState, BuildError> {
        let mut cx = LoadContext {
            registry: project,
            features,
            registrations,
        };
        bpkg.load(&mut cx)
    }

    #[test]
    fn test_package_without_settings_loads_first_time() {
        let (project, id) = single(ScopedSettings::new());
        let mut bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        let state = load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
        assert_eq!(state, LoadState::Loaded);
        assert!(bpkg.is_loaded());
    }

    #[test]
    fn test_new_feature_keeps_package_pending() {
        let (project, id) = single(
            ScopedSettings::new()
                .with(SettingKey::Features, &["A"])
                .with_feature("A", SettingKey::Features, &["B"]),
        );
        let mut bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        // A is new; B is only visible once A is enabled.
        assert_eq!(
            load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap(),
            LoadState::Pending
        );
        assert!(features.contains("A"));
        assert!(!features.contains("B"));

        assert_eq!(
            load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap(),
            LoadState::Pending
        );
        assert!(features.contains("B"));

        assert_eq!(
            load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap(),
            LoadState::Loaded
        );
    }

    #[test]
    fn test_dependency_discovery_uses_updated_features() {
        let mut project = Project::new("p", "/ws");
        let app = project
            .add_package(package_at(
                "apps/app",
                Arc::new(
                    ScopedSettings::new()
                        .with(SettingKey::Features, &["X"])
                        .with_feature("X", SettingKey::Deps, &["libs/b"]),
                ),
            ))
            .unwrap();
        let b = project
            .add_package(package_at("libs/b", Arc::new(ScopedSettings::new())))
            .unwrap();

        let mut bpkg = BuildPackage::new(app, project.package(app).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();
        regs.register(app);

        let state = load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
        assert_eq!(state, LoadState::Pending);
        assert!(regs.contains(b));
        assert_eq!(bpkg.deps(), &[Dependency::new("local", "libs/b")]);
    }

    #[test]
    fn test_dependency_list_is_append_only_and_deduplicated() {
        let mut project = Project::new("p", "/ws");
        let app = project
            .add_package(package_at(
                "apps/app",
                Arc::new(
                    ScopedSettings::new()
                        .with(SettingKey::Deps, &["libs/a", "@local/libs/a"])
                        .with_feature("LATE", SettingKey::Deps, &["libs/b"]),
                ),
            ))
            .unwrap();
        project
            .add_package(package_at("libs/a", Arc::new(ScopedSettings::new())))
            .unwrap();
        project
            .add_package(package_at("libs/b", Arc::new(ScopedSettings::new())))
            .unwrap();

        let mut bpkg = BuildPackage::new(app, project.package(app).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
        assert_eq!(bpkg.deps().len(), 1);

        features.insert("LATE");
        load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
        assert_eq!(
            bpkg.deps(),
            &[
                Dependency::new("local", "libs/a"),
                Dependency::new("local", "libs/b")
            ]
        );
    }

    #[test]
    fn test_malformed_dependency() {
        let (project, id) = single(ScopedSettings::new().with(SettingKey::Deps, &["@core"]));
        let mut bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        let err = load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap_err();
        match err {
            BuildError::MalformedDependency { package, entry, .. } => {
                assert_eq!(package, "@local/libs/foo");
                assert_eq!(entry, "@core");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!bpkg.is_loaded());
    }

    #[test]
    fn test_unresolvable_dependency() {
        let (project, id) =
            single(ScopedSettings::new().with(SettingKey::Deps, &["@core/libs/missing"]));
        let mut bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        let err = load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap_err();
        assert!(matches!(
            err,
            BuildError::DependencyResolutionFailed { ref dependency, .. }
                if dependency == "@core/libs/missing"
        ));
    }

    #[test]
    fn test_loaded_package_does_not_reread_settings() {
        let settings = Arc::new(CountingSettings::new(
            ScopedSettings::new().with(SettingKey::Caps, &["console"]),
        ));
        let mut project = Project::new("p", "/ws");
        let id = project
            .add_package(package_at("libs/console", settings.clone()))
            .unwrap();
        let mut bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let mut features = FeatureSet::new();
        let mut regs = Registrations::new();

        load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
        let reads = settings.reads();
        assert!(reads > 0);
        assert_eq!(bpkg.apis(), &["console".to_string()]);

        for _ in 0..3 {
            let state = load_once(&mut bpkg, &project, &mut features, &mut regs).unwrap();
            assert_eq!(state, LoadState::Loaded);
        }
        assert_eq!(settings.reads(), reads);
        assert_eq!(bpkg.apis().len(), 1);
    }

    #[test]
    fn test_private_include_dirs() {
        let (project, id) = single(ScopedSettings::new());
        let bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());
        let base = PathBuf::from("/ws/libs/foo");

        let mut features = FeatureSet::new();
        assert_eq!(
            bpkg.private_include_dirs("cortex_m4", &features),
            vec![base.join("src"), base.join("src/arch/cortex_m4")]
        );

        features.insert(TEST_FEATURE);
        assert_eq!(
            bpkg.private_include_dirs("cortex_m4", &features),
            vec![
                base.join("src"),
                base.join("src/arch/cortex_m4"),
                base.join("src/test"),
                base.join("src/test/arch/cortex_m4"),
            ]
        );
    }

    #[test]
    fn test_public_include_dirs() {
        let (project, id) = single(ScopedSettings::new());
        let bpkg = BuildPackage::new(id, project.package(id).unwrap().clone());

        assert_eq!(
            bpkg.public_include_dirs("cortex_m4"),
            vec![
                PathBuf::from("/ws/libs/foo/include"),
                PathBuf::from("/ws/libs/foo/include/foo/arch/cortex_m4"),
            ]
        );
    }
}
