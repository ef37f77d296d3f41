//! Shared types, error model, and configuration for docpub.
//!
//! This crate is the foundation depended on by all other docpub crates.
//! It provides:
//! - [`DocPubError`] — the unified error type
//! - Domain types ([`DocPackage`], [`PackageKind`], [`BuildDiagnostic`], [`ProcessOutcome`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, DocsConfig, VersionsConfig, config_dir, config_file_path, init_config,
    load_config, load_config_from,
};
pub use error::{DocPubError, Result};
pub use types::{
    BuildDiagnostic, BuildError, DocPackage, PackageKind, ProcessOutcome, SpellingError,
};
