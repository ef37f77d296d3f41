//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docpub_core::{DocsBuilder, PublishOutcome, VersionResolver};
use docpub_diagnostics::render_summary;
use docpub_shared::{
    AppConfig, BuildConfig, BuildDiagnostic, DocPackage, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docpub — build, spell-check, and publish documentation packages.
#[derive(Parser)]
#[command(
    name = "docpub",
    version,
    about = "Build, spell-check, and publish versioned documentation packages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to a config file (defaults to ~/.docpub/docpub.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Build and/or spell-check documentation packages.
    Build {
        /// Package(s) to build (repeatable).
        #[arg(short, long = "package", required = true)]
        packages: Vec<String>,

        /// Only build HTML, skip the spellcheck.
        #[arg(long, conflicts_with = "spellcheck_only")]
        docs_only: bool,

        /// Only run the spellcheck, skip the HTML build.
        #[arg(long)]
        spellcheck_only: bool,

        /// Remove artifacts of previous builds first.
        #[arg(long)]
        clean: bool,

        /// Stream tool output to the console instead of log files.
        #[arg(long)]
        show_output: bool,
    },

    /// Copy built packages into a publish tree.
    Publish {
        /// Package(s) to publish (repeatable).
        #[arg(short, long = "package", required = true)]
        packages: Vec<String>,

        /// Root of the publish tree (receives docs-archive/).
        #[arg(short, long)]
        destination: PathBuf,

        /// Replace already published output of versioned packages.
        #[arg(long)]
        override_versioned: bool,
    },

    /// Remove build artifacts of packages.
    Clean {
        /// Package(s) to clean (repeatable).
        #[arg(short, long = "package", required = true)]
        packages: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

/// Which build phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Phases {
    docs: bool,
    spelling: bool,
}

impl Phases {
    fn from_flags(docs_only: bool, spellcheck_only: bool) -> Self {
        Self {
            docs: !spellcheck_only,
            spelling: !docs_only,
        }
    }
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docpub=info",
        1 => "docpub=debug",
        _ => "docpub=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Build {
            packages,
            docs_only,
            spellcheck_only,
            clean,
            show_output,
        } => {
            let phases = Phases::from_flags(docs_only, spellcheck_only);
            cmd_build(config_path, &packages, phases, clean, show_output).await
        }
        Command::Publish {
            packages,
            destination,
            override_versioned,
        } => cmd_publish(config_path, &packages, &destination, override_versioned),
        Command::Clean { packages } => cmd_clean(config_path, &packages),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    Ok(match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_build(
    config_path: Option<&Path>,
    packages: &[String],
    phases: Phases,
    clean: bool,
    show_output: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let build_config = BuildConfig::from(&config);

    let mut failed: Vec<(String, Vec<BuildDiagnostic>)> = Vec::new();
    for name in packages {
        let builder = DocsBuilder::new(DocPackage::new(name.as_str()), &build_config);
        info!(package = %name, ?phases, "building documentation package");

        if clean {
            builder.clean_files()?;
        }

        let progress = CliProgress::new(show_output);
        let mut diagnostics = Vec::new();
        if phases.docs {
            progress.phase(&format!("{name}: building docs"));
            diagnostics.extend(builder.build(show_output).await?);
        }
        if phases.spelling {
            progress.phase(&format!("{name}: checking spelling"));
            diagnostics.extend(builder.check_spelling(show_output).await?);
        }
        progress.done();

        if diagnostics.is_empty() {
            println!("  {name}: ok");
        } else {
            eprint!("{}", render_summary(name, &diagnostics));
            failed.push((name.clone(), diagnostics));
        }
    }

    if failed.is_empty() {
        return Ok(());
    }
    let names: Vec<&str> = failed.iter().map(|(name, _)| name.as_str()).collect();
    Err(eyre!(
        "documentation checks failed for {} package(s): {}",
        failed.len(),
        names.join(", ")
    ))
}

fn cmd_publish(
    config_path: Option<&Path>,
    packages: &[String],
    destination: &Path,
    override_versioned: bool,
) -> Result<()> {
    let config = resolve_config(config_path)?;
    let build_config = BuildConfig::from(&config);
    let versions = VersionResolver::from_config(&config.versions);

    for name in packages {
        let builder = DocsBuilder::new(DocPackage::new(name.as_str()), &build_config);
        match builder.publish(&versions, override_versioned, destination)? {
            PublishOutcome::Published {
                output_dir,
                version,
            } => {
                let version = version.as_deref().unwrap_or("unversioned");
                println!("  {name} ({version}) -> {}", output_dir.display());
            }
            PublishOutcome::Skipped { output_dir } => {
                println!(
                    "  {name}: skipped, {} already exists (use --override-versioned to replace)",
                    output_dir.display()
                );
            }
        }
    }
    Ok(())
}

fn cmd_clean(config_path: Option<&Path>, packages: &[String]) -> Result<()> {
    let config = resolve_config(config_path)?;
    let build_config = BuildConfig::from(&config);
    for name in packages {
        DocsBuilder::new(DocPackage::new(name.as_str()), &build_config).clean_files()?;
        println!("  {name}: cleaned");
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config file created at {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while a phase runs; hidden when tool output is streamed.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(show_output: bool) -> Self {
        if show_output {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
