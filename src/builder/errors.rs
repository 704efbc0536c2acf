//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::core::DependencyParseError;
use crate::util::diagnostic::Diagnostic;

/// Error raised by package resolution or compiler-info assembly.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("malformed dependency `{entry}` in package `{package}`: {source}")]
    MalformedDependency {
        package: String,
        entry: String,
        #[source]
        source: DependencyParseError,
    },

    #[error("could not resolve dependency `{dependency}` of package `{package}`")]
    DependencyResolutionFailed { package: String, dependency: String },

    #[error("package `{package}` is not registered with the builder")]
    PackageNotRegistered { package: String },

    #[error("package `{package}` must be loaded before its compiler info is fetched")]
    NotLoaded { package: String },

    #[error("package `{package}` requires capability `{capability}`, which no package provides")]
    MissingCapability { package: String, capability: String },
}

impl BuildError {
    /// Name of the package the error was raised for.
    pub fn package(&self) -> &str {
        match self {
            BuildError::MalformedDependency { package, .. }
            | BuildError::DependencyResolutionFailed { package, .. }
            | BuildError::PackageNotRegistered { package }
            | BuildError::NotLoaded { package }
            | BuildError::MissingCapability { package, .. } => package,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            BuildError::MalformedDependency {
                package,
                entry,
                source,
            } => Diagnostic::error(format!("malformed dependency `{}`", entry))
                .with_context(format!("declared by `{}`", package))
                .with_context(source.to_string())
                .with_suggestion("Write dependencies as `path/to/pkg` or `@repo/path/to/pkg`"),

            BuildError::DependencyResolutionFailed {
                package,
                dependency,
            } => Diagnostic::error(format!("could not resolve dependency `{}`", dependency))
                .with_context(format!("required by `{}`", package))
                .with_suggestion("Check that the package name is spelled correctly")
                .with_suggestion(
                    "Ensure the repository is listed under [repositories] in project.toml",
                ),

            BuildError::PackageNotRegistered { package } => {
                Diagnostic::error(format!("package `{}` is not part of this build", package))
                    .with_context("the package was resolved but never registered with the builder")
            }

            BuildError::NotLoaded { package } => Diagnostic::error(format!(
                "compiler info requested for `{}` before resolution finished",
                package
            ))
            .with_suggestion("Run resolution to convergence before assembling compiler info"),

            BuildError::MissingCapability {
                package,
                capability,
            } => Diagnostic::error(format!("missing capability `{}`", capability))
                .with_context(format!("required by `{}`", package))
                .with_suggestion(format!(
                    "Add a dependency on a package that lists `{}` in its caps",
                    capability
                )),
        }
    }
}
