//! Core domain types: documentation packages and the diagnostics their builds produce.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Name of the core documentation package.
pub const CORE_PACKAGE: &str = "apache-airflow";

/// Prefix shared by every provider documentation package.
pub const PROVIDER_PREFIX: &str = "apache-airflow-providers-";

/// Name of the helm chart documentation package.
pub const CHART_PACKAGE: &str = "helm-chart";

/// Packages published without a version namespace.
pub const UNVERSIONED_PACKAGES: [&str; 2] = ["apache-airflow-providers", "docker-stack"];

// ---------------------------------------------------------------------------
// PackageKind
// ---------------------------------------------------------------------------

/// Classification of a documentation package, derived once from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageKind {
    /// The core package; versioned by the core release.
    Core,
    /// A provider package; versioned through the provider registry.
    Provider,
    /// The helm chart package; versioned by the chart.
    Chart,
    /// Versioned, but with no known version source.
    GenericVersioned,
    /// Published without a version namespace.
    Unversioned,
}

impl PackageKind {
    /// Classify a package name. Unversioned names win over every other rule.
    pub fn classify(name: &str) -> Self {
        if UNVERSIONED_PACKAGES.contains(&name) {
            Self::Unversioned
        } else if name == CORE_PACKAGE {
            Self::Core
        } else if name.starts_with(PROVIDER_PREFIX) {
            Self::Provider
        } else if name == CHART_PACKAGE {
            Self::Chart
        } else {
            Self::GenericVersioned
        }
    }

    pub fn is_versioned(self) -> bool {
        !matches!(self, Self::Unversioned)
    }
}

// ---------------------------------------------------------------------------
// DocPackage
// ---------------------------------------------------------------------------

/// A named documentation package. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPackage {
    name: String,
    kind: PackageKind,
}

impl DocPackage {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let kind = PackageKind::classify(&name);
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Whether published output is namespaced by a release version.
    pub fn is_versioned(&self) -> bool {
        self.kind.is_versioned()
    }
}

impl fmt::Display for DocPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// One issue reported by the documentation compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
}

impl BuildError {
    /// A record with no location, carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            file_path: None,
            line: None,
            message: message.into(),
        }
    }
}

/// One issue reported by the spell-checker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellingError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub misspelled_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SpellingError {
    /// A record with no location, carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// A structured record describing one build or spelling issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildDiagnostic {
    Build(BuildError),
    Spelling(SpellingError),
}

impl BuildDiagnostic {
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Build(e) => e.file_path.as_ref(),
            Self::Spelling(e) => e.file_path.as_ref(),
        }
    }

    pub fn line(&self) -> Option<u32> {
        match self {
            Self::Build(e) => e.line,
            Self::Spelling(e) => e.line,
        }
    }

    /// The human-readable message, if the record carries one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Build(e) => Some(e.message.as_str()),
            Self::Spelling(e) => e.message.as_deref(),
        }
    }
}

impl From<BuildError> for BuildDiagnostic {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

impl From<SpellingError> for BuildDiagnostic {
    fn from(e: SpellingError) -> Self {
        Self::Spelling(e)
    }
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = self.file_path() {
            write!(f, "{}", path.display())?;
            if let Some(line) = self.line() {
                write!(f, ":{line}")?;
            }
            f.write_str(": ")?;
        }
        match self {
            Self::Build(e) => f.write_str(e.message.trim()),
            Self::Spelling(e) => match (&e.misspelled_word, &e.message) {
                (Some(word), _) => {
                    write!(f, "misspelled word '{word}'")?;
                    if let Some(suggestion) = &e.suggestion {
                        write!(f, " (did you mean '{suggestion}'?)")?;
                    }
                    Ok(())
                }
                (None, Some(message)) => f.write_str(message.trim()),
                (None, None) => f.write_str("unknown spelling issue"),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ProcessOutcome
// ---------------------------------------------------------------------------

/// Result of one subprocess invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code; `None` when the process timed out or was killed by a signal.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}
