//! User-friendly diagnostic messages.
//!
//! Every error names its root cause, the package it was raised for, and
//! when possible a suggested fix.

use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no project file is found.
    pub const NO_PROJECT: &str = "help: Run keelson from inside a directory containing project.toml";

    /// Suggestion when no target was given or configured.
    pub const NO_TARGET: &str =
        "help: Pass `--target <name>` or set `[build] target` in .keelson/config.toml";

    /// Suggestion when a package is not found.
    pub const PACKAGE_NOT_FOUND: &str = "help: Run `keelson resolve` to see all packages";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Self::error(message)
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
            }
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  → {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// A package named on the command line could not be found.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("could not find package `{package}` in project `{project}`")]
#[diagnostic(code(keelson::resolve::not_found))]
pub struct UnresolvedDependencyError {
    pub package: String,
    pub project: String,
    #[help]
    pub suggestions: Option<String>,
}

impl UnresolvedDependencyError {
    /// Build the error, suggesting known packages that share the
    /// requested package's base name.
    pub fn new<'a>(
        package: impl Into<String>,
        project: impl Into<String>,
        known: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let package = package.into();
        let wanted = package.rsplit('/').next().unwrap_or(&package).to_string();

        let similar: Vec<&str> = known
            .into_iter()
            .filter(|name| name.rsplit('/').next() == Some(wanted.as_str()))
            .collect();

        let suggestions = if similar.is_empty() {
            None
        } else {
            Some(format!("did you mean: {}", similar.join(", ")))
        };

        UnresolvedDependencyError {
            package,
            project: project.into(),
            suggestions,
        }
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
