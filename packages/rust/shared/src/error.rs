//! Error types for docpub.
//!
//! Library crates use [`DocPubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Build-time conditions (tool failures, timeouts, unparseable log lines) are
//! not errors: they are reported as [`crate::BuildDiagnostic`] records.

use std::path::PathBuf;

/// Top-level error type for all docpub operations.
#[derive(Debug, thiserror::Error)]
pub enum DocPubError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (malformed registry, empty version list, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// A version was requested for a package with no known version source.
    #[error("unsupported package: {package}")]
    UnsupportedPackage { package: String },

    /// A version was requested for an unversioned package.
    #[error("documentation package {package} is not versioned")]
    NotVersioned { package: String },

    /// A provider package is missing from the provider registry.
    #[error("provider {package} not found in provider registry")]
    UnknownProvider { package: String },

    /// Subprocess plumbing failure (spawn, wait, kill).
    #[error("process error: {0}")]
    Process(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocPubError>;

impl DocPubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DocPubError::config("missing core version");
        assert_eq!(err.to_string(), "config error: missing core version");

        let err = DocPubError::UnsupportedPackage {
            package: "foo-bar".into(),
        };
        assert_eq!(err.to_string(), "unsupported package: foo-bar");
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DocPubError::io("/tmp/missing", source);
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing"));
        assert!(msg.contains("gone"));
    }
}
