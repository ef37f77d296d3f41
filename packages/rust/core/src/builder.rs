//! Build orchestration for one documentation package.
//!
//! Each phase prepares its directories, runs the external tool through a
//! [`CommandRunner`], and then parses whatever the tool left behind. Tool
//! failures never surface as errors: they become diagnostics next to the
//! parsed ones. Only filesystem preparation failures are returned as `Err`.

use std::path::Path;

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use docpub_diagnostics::{LogParser, SpellingReportParser, WarningLogParser};
use docpub_shared::{
    BuildConfig, BuildDiagnostic, BuildError, DocPackage, DocPubError, ProcessOutcome, Result,
    SpellingError,
};

use crate::paths::{PathResolver, PathSet};
use crate::process::{CaptureMode, CommandRunner, CommandSpec, EnvironmentOverlay, ProcessRunner};
use crate::publish::{self, PublishOutcome};
use crate::version::VersionResolver;

/// Extension of the per-document reports written by the spell-checker.
const SPELLING_REPORT_EXTENSION: &str = "spelling";

/// Builds, spell-checks, and publishes one documentation package.
///
/// Runs targeting the same package must be serialized by the caller: each
/// phase deletes and recreates directories derived from the package name.
pub struct DocsBuilder<R = ProcessRunner> {
    package: DocPackage,
    resolver: PathResolver,
    paths: PathSet,
    config: BuildConfig,
    runner: R,
    warning_parser: Box<dyn LogParser>,
    spelling_parser: Box<dyn LogParser>,
}

impl DocsBuilder<ProcessRunner> {
    /// Builder that runs the configured tools as real subprocesses.
    pub fn new(package: DocPackage, config: &BuildConfig) -> Self {
        Self::with_runner(package, config, ProcessRunner)
    }
}

impl<R: CommandRunner> DocsBuilder<R> {
    pub fn with_runner(package: DocPackage, config: &BuildConfig, runner: R) -> Self {
        let resolver = PathResolver::new(&config.docs_root);
        let paths = resolver.resolve(&package, None);
        Self {
            warning_parser: Box::new(WarningLogParser::new(&paths.source_dir)),
            spelling_parser: Box::new(SpellingReportParser::new(&paths.source_dir)),
            package,
            resolver,
            paths,
            config: config.clone(),
            runner,
        }
    }

    /// Replace the parsers applied to the warning log and spelling reports.
    pub fn with_parsers(
        mut self,
        warning_parser: Box<dyn LogParser>,
        spelling_parser: Box<dyn LogParser>,
    ) -> Self {
        self.warning_parser = warning_parser;
        self.spelling_parser = spelling_parser;
        self
    }

    pub fn package(&self) -> &DocPackage {
        &self.package
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// Remove artifacts of previous builds: the generated API sources and the
    /// whole build directory. Both are recreated empty.
    #[instrument(skip_all, fields(package = %self.package))]
    pub fn clean_files(&self) -> Result<()> {
        remove_dir_if_exists(&self.paths.api_dir)?;
        remove_dir_if_exists(&self.paths.build_dir)?;
        create_dir(&self.paths.api_dir)?;
        create_dir(&self.paths.build_dir)?;
        debug!(build_dir = %self.paths.build_dir.display(), "cleaned build artifacts");
        Ok(())
    }

    /// Run the spell-checker. An empty result means the check passed.
    #[instrument(skip_all, fields(package = %self.package))]
    pub async fn check_spelling(&self, verbose: bool) -> Result<Vec<BuildDiagnostic>> {
        create_dir(&self.paths.build_dir)?;
        remove_dir_if_exists(&self.paths.spelling_report_dir)?;
        create_dir(&self.paths.spelling_report_dir)?;

        let args: Vec<String> = vec![
            "-W".into(), // turn warnings into errors
            "--color".into(),
            "-T".into(), // full traceback on exception
            "-b".into(),
            "spelling".into(),
            "-c".into(),
            path_arg(&self.config.config_dir),
            "-d".into(),
            path_arg(&self.paths.doctree_dir),
            path_arg(&self.paths.source_dir),
            path_arg(&self.paths.spelling_report_dir),
        ];
        let spec = self.command(args, verbose, &self.paths.spelling_log_path);

        let mut diagnostics: Vec<BuildDiagnostic> = Vec::new();
        if let Some(message) = self.execute(&spec, "Sphinx spellcheck").await {
            diagnostics.push(SpellingError::message_only(message).into());
        }

        let report = read_spelling_reports(&self.paths.spelling_report_dir)?;
        diagnostics.extend(self.spelling_parser.parse(&report));

        if diagnostics.is_empty() {
            info!("finished spell-checking successfully");
        } else {
            warn!(errors = diagnostics.len(), "finished spell-checking with errors");
        }
        Ok(diagnostics)
    }

    /// Run the HTML build. An empty result means the build passed.
    #[instrument(skip_all, fields(package = %self.package))]
    pub async fn build(&self, verbose: bool) -> Result<Vec<BuildDiagnostic>> {
        create_dir(&self.paths.build_dir)?;
        remove_file_if_exists(&self.paths.build_warning_log_path)?;

        let mut args: Vec<String> = Vec::new();
        if self.config.html_warnings_as_errors {
            args.push("-W".into());
        }
        args.extend([
            "--color".into(),
            "-T".into(),
            "-b".into(),
            "html".into(),
            "-d".into(),
            path_arg(&self.paths.doctree_dir),
            "-c".into(),
            path_arg(&self.config.config_dir),
            "-w".into(), // write warnings (and errors) to this file
            path_arg(&self.paths.build_warning_log_path),
            path_arg(&self.paths.source_dir),
            path_arg(&self.paths.build_dir),
        ]);
        let spec = self.command(args, verbose, &self.paths.build_log_path);

        let mut diagnostics: Vec<BuildDiagnostic> = Vec::new();
        if let Some(message) = self.execute(&spec, "Sphinx").await {
            diagnostics.push(BuildError::message_only(message).into());
        }

        let warning_log = &self.paths.build_warning_log_path;
        if warning_log.is_file() {
            let text = read_lossy(warning_log)?;
            diagnostics.extend(self.warning_parser.parse(&text));
        }

        if diagnostics.is_empty() {
            info!("finished docs building successfully");
        } else {
            warn!(errors = diagnostics.len(), "finished docs building with errors");
        }
        Ok(diagnostics)
    }

    /// Copy the finished build into `destination_root`. See [`publish::publish`].
    pub fn publish(
        &self,
        versions: &VersionResolver,
        override_versioned: bool,
        destination_root: &Path,
    ) -> Result<PublishOutcome> {
        publish::publish(
            &self.package,
            &self.resolver,
            versions,
            override_versioned,
            destination_root,
        )
    }

    fn command(&self, args: Vec<String>, verbose: bool, log_path: &Path) -> CommandSpec {
        CommandSpec {
            program: self.config.sphinx_command.clone(),
            args,
            working_dir: self.paths.source_dir.clone(),
            env: EnvironmentOverlay::new().with(&self.config.package_env_var, self.package.name()),
            timeout: self.config.timeout,
            capture: if verbose {
                CaptureMode::StreamToConsole
            } else {
                CaptureMode::CaptureToFile(log_path.to_path_buf())
            },
        }
    }

    /// Run `spec`; returns a diagnostic message when the run was not a clean exit.
    async fn execute(&self, spec: &CommandSpec, tool: &str) -> Option<String> {
        match &spec.capture {
            CaptureMode::CaptureToFile(log) => info!(
                log = %log.display(),
                "running {tool}, output is hidden until an error occurs"
            ),
            CaptureMode::StreamToConsole => {
                info!(command = %spec.display_command(), "executing")
            }
        }

        match self.runner.run(spec).await {
            Ok(outcome) => failure_message(tool, &outcome, spec),
            Err(err) => {
                warn!(error = %err, "{tool} could not be run");
                Some(format!("{tool} could not be run: {err}"))
            }
        }
    }
}

/// Message for an unsuccessful outcome; `None` when the process exited zero.
fn failure_message(tool: &str, outcome: &ProcessOutcome, spec: &CommandSpec) -> Option<String> {
    if outcome.timed_out {
        return Some(format!(
            "{tool} timed out after {} seconds.",
            spec.timeout.as_secs()
        ));
    }
    match outcome.exit_code {
        Some(0) => None,
        Some(code) => Some(format!("{tool} returned non-zero exit status: {code}.")),
        None => Some(format!("{tool} was terminated by a signal.")),
    }
}

/// Concatenate every `*.spelling` fragment under `dir`, sorted by path.
fn read_spelling_reports(dir: &Path) -> Result<String> {
    let mut text = String::new();
    if !dir.is_dir() {
        return Ok(text);
    }

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            DocPubError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let is_report = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext == SPELLING_REPORT_EXTENSION);
        if !is_report {
            continue;
        }

        text.push_str(&read_lossy(entry.path())?);
        if !text.ends_with('\n') {
            text.push('\n');
        }
    }
    Ok(text)
}

fn read_lossy(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| DocPubError::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| DocPubError::io(path, e))
}

fn remove_file_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocPubError::io(path, e)),
    }
}

pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DocPubError::io(path, e)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
