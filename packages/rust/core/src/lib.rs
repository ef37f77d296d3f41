//! Documentation build and publish orchestration for docpub.
//!
//! This crate derives every path a package build touches, resolves package
//! versions, runs the documentation compiler and spell-checker as
//! subprocesses, turns their output into diagnostics, and stages finished
//! builds into a publish tree.

pub mod builder;
pub mod paths;
pub mod process;
pub mod publish;
pub mod version;

pub use builder::DocsBuilder;
pub use paths::{PathResolver, PathSet, pretty_format_path};
pub use process::{CaptureMode, CommandRunner, CommandSpec, EnvironmentOverlay, ProcessRunner};
pub use publish::{PublishDecision, PublishOutcome, publish};
pub use version::{ProviderRecord, ProviderRegistry, VersionResolver};
