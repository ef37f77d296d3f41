//! Application configuration for docpub.
//!
//! User config lives at `~/.docpub/docpub.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DocPubError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "docpub.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".docpub";

// ---------------------------------------------------------------------------
// Config structs (matching docpub.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Documentation tree and tool settings.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Version sources for versioned packages.
    #[serde(default)]
    pub versions: VersionsConfig,
}

/// `[docs]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Root of the documentation tree (holds `<package>/`, `_build/`, `_doctrees/`).
    #[serde(default = "default_docs_root")]
    pub docs_root: PathBuf,

    /// Directory holding the compiler configuration. Defaults to `docs_root`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<PathBuf>,

    /// Documentation compiler executable.
    #[serde(default = "default_sphinx_command")]
    pub sphinx_command: String,

    /// Upper bound for a single build or spellcheck phase, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable carrying the package name into the compiler.
    #[serde(default = "default_package_env_var")]
    pub package_env_var: String,

    /// Pass `-W` to the HTML build as well as to the spellcheck.
    ///
    /// Off by default, so warnings in the HTML build are reported without
    /// failing it. Enable it to get the `sphinx-build -W ... -b html` command
    /// line that treats every warning as fatal.
    #[serde(default)]
    pub html_warnings_as_errors: bool,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            docs_root: default_docs_root(),
            config_dir: None,
            sphinx_command: default_sphinx_command(),
            timeout_secs: default_timeout_secs(),
            package_env_var: default_package_env_var(),
            html_warnings_as_errors: false,
        }
    }
}

fn default_docs_root() -> PathBuf {
    PathBuf::from("docs")
}
fn default_sphinx_command() -> String {
    "sphinx-build".into()
}
fn default_timeout_secs() -> u64 {
    15 * 60
}
fn default_package_env_var() -> String {
    "AIRFLOW_PACKAGE_NAME".into()
}

/// `[versions]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionsConfig {
    /// Release version of the core package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_version: Option<String>,

    /// Version of the helm chart package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_version: Option<String>,

    /// JSON file listing provider packages and their versions (newest first).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_registry: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Build config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime build configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Root of the documentation tree.
    pub docs_root: PathBuf,
    /// Directory passed to the compiler via `-c`.
    pub config_dir: PathBuf,
    /// Compiler executable.
    pub sphinx_command: String,
    /// Per-phase subprocess timeout.
    pub timeout: Duration,
    /// Environment variable carrying the package name.
    pub package_env_var: String,
    /// Whether the HTML build treats warnings as errors.
    pub html_warnings_as_errors: bool,
}

impl From<&AppConfig> for BuildConfig {
    fn from(config: &AppConfig) -> Self {
        let docs = &config.docs;
        Self {
            docs_root: docs.docs_root.clone(),
            config_dir: docs
                .config_dir
                .clone()
                .unwrap_or_else(|| docs.docs_root.clone()),
            sphinx_command: docs.sphinx_command.clone(),
            timeout: Duration::from_secs(docs.timeout_secs),
            package_env_var: docs.package_env_var.clone(),
            html_warnings_as_errors: docs.html_warnings_as_errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.docpub/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| DocPubError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.docpub/docpub.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DocPubError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DocPubError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DocPubError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| DocPubError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DocPubError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("sphinx_command"));
        assert!(toml_str.contains("AIRFLOW_PACKAGE_NAME"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.docs.timeout_secs, 900);
        assert_eq!(parsed.docs.docs_root, PathBuf::from("docs"));
        assert!(parsed.versions.core_version.is_none());
    }

    #[test]
    fn config_with_versions() {
        let toml_str = r#"
[docs]
docs_root = "/srv/docs"
timeout_secs = 60

[versions]
core_version = "2.8.1"
chart_version = "1.12.0"
provider_registry = "/srv/providers.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.docs.timeout_secs, 60);
        assert_eq!(config.versions.core_version.as_deref(), Some("2.8.1"));
        assert_eq!(
            config.versions.provider_registry,
            Some(PathBuf::from("/srv/providers.json"))
        );
    }

    #[test]
    fn build_config_defaults_config_dir_to_docs_root() {
        let mut app = AppConfig::default();
        app.docs.docs_root = PathBuf::from("/srv/docs");
        let build = BuildConfig::from(&app);
        assert_eq!(build.config_dir, PathBuf::from("/srv/docs"));
        assert_eq!(build.timeout, Duration::from_secs(900));

        app.docs.config_dir = Some(PathBuf::from("/srv/conf"));
        let build = BuildConfig::from(&app);
        assert_eq!(build.config_dir, PathBuf::from("/srv/conf"));
    }

    #[test]
    fn html_warnings_are_not_fatal_unless_enabled() {
        let config: AppConfig = toml::from_str("[docs]\n").expect("parse");
        assert!(!BuildConfig::from(&config).html_warnings_as_errors);

        let config: AppConfig =
            toml::from_str("[docs]\nhtml_warnings_as_errors = true\n").expect("parse");
        assert!(BuildConfig::from(&config).html_warnings_as_errors);
    }

    #[test]
    fn malformed_config_is_config_error() {
        let dir = std::env::temp_dir().join(format!(
            "docpub-config-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "[docs\ntimeout_secs = ").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, DocPubError::Config { .. }));
        assert!(err.to_string().contains("failed to parse"));
    }
}
