//! Parsing of documentation tool output into typed diagnostics.
//!
//! Each parser is a pure `&str -> Vec<BuildDiagnostic>` function: it never
//! fails, returns nothing for empty input, and preserves the order in which
//! issues appear in the text. Lines that do not follow the expected shape
//! still produce a record carrying whatever could be extracted.

mod ansi;
mod sphinx;
mod spelling;
mod summary;

use std::path::{Path, PathBuf};

use docpub_shared::BuildDiagnostic;

pub use ansi::strip_ansi;
pub use spelling::parse_spelling_warnings;
pub use sphinx::parse_build_warnings;
pub use summary::{code_snippet, render_summary};

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A matching strategy turning captured tool output into diagnostics.
pub trait LogParser: Send + Sync {
    /// Parse the full text of a log or report.
    fn parse(&self, text: &str) -> Vec<BuildDiagnostic>;

    /// Human-readable parser name for tracing.
    fn name(&self) -> &str;
}

/// Parses the compiler's `-w` warning log (`path:line: message`).
#[derive(Debug, Clone)]
pub struct WarningLogParser {
    source_dir: PathBuf,
}

impl WarningLogParser {
    /// Relative paths in the log are resolved against `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }
}

impl LogParser for WarningLogParser {
    fn parse(&self, text: &str) -> Vec<BuildDiagnostic> {
        parse_build_warnings(text, &self.source_dir)
            .into_iter()
            .map(BuildDiagnostic::from)
            .collect()
    }

    fn name(&self) -> &str {
        "build-warnings"
    }
}

/// Parses concatenated `*.spelling` report fragments.
#[derive(Debug, Clone)]
pub struct SpellingReportParser {
    source_dir: PathBuf,
}

impl SpellingReportParser {
    /// Relative paths in the report are resolved against `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
        }
    }
}

impl LogParser for SpellingReportParser {
    fn parse(&self, text: &str) -> Vec<BuildDiagnostic> {
        parse_spelling_warnings(text, &self.source_dir)
            .into_iter()
            .map(BuildDiagnostic::from)
            .collect()
    }

    fn name(&self) -> &str {
        "spelling-report"
    }
}

/// Join a path reported by a tool onto the package source directory.
fn resolve_reported_path(source_dir: &Path, reported: &str) -> PathBuf {
    source_dir.join(reported.trim())
}
