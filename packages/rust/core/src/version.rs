//! Version resolution for versioned documentation packages.
//!
//! Dispatch is by [`PackageKind`]: the core package uses the configured core
//! release, providers use the newest entry of the provider registry, and the
//! helm chart uses the configured chart version.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::debug;

use docpub_shared::{DocPackage, DocPubError, PackageKind, Result, VersionsConfig};

// ---------------------------------------------------------------------------
// Provider registry
// ---------------------------------------------------------------------------

/// One provider entry. Versions are ordered newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderRecord {
    #[serde(rename = "package-name")]
    pub package_name: String,
    #[serde(default)]
    pub versions: Vec<String>,
}

/// The loaded list of provider packages.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    records: Vec<ProviderRecord>,
}

impl ProviderRegistry {
    pub fn new(records: Vec<ProviderRecord>) -> Self {
        Self { records }
    }

    /// Load a registry from a JSON array of provider records.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DocPubError::io(path, e))?;
        let records: Vec<ProviderRecord> = serde_json::from_str(&content).map_err(|e| {
            DocPubError::validation(format!(
                "invalid provider registry {}: {e}",
                path.display()
            ))
        })?;
        debug!(path = %path.display(), providers = records.len(), "loaded provider registry");
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newest version of `package_name`.
    pub fn latest_version(&self, package_name: &str) -> Result<&str> {
        let record = self
            .records
            .iter()
            .find(|r| r.package_name == package_name)
            .ok_or_else(|| DocPubError::UnknownProvider {
                package: package_name.to_string(),
            })?;

        record.versions.first().map(String::as_str).ok_or_else(|| {
            DocPubError::validation(format!("provider {package_name} lists no versions"))
        })
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves the current version of a versioned package.
#[derive(Debug, Default)]
pub struct VersionResolver {
    core_version: Option<String>,
    chart_version: Option<String>,
    registry_path: Option<PathBuf>,
    providers: OnceLock<ProviderRegistry>,
}

impl VersionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver from the `[versions]` config section.
    /// The provider registry file is read on first provider lookup.
    pub fn from_config(config: &VersionsConfig) -> Self {
        Self {
            core_version: config.core_version.clone(),
            chart_version: config.chart_version.clone(),
            registry_path: config.provider_registry.clone(),
            providers: OnceLock::new(),
        }
    }

    pub fn with_core_version(mut self, version: impl Into<String>) -> Self {
        self.core_version = Some(version.into());
        self
    }

    pub fn with_chart_version(mut self, version: impl Into<String>) -> Self {
        self.chart_version = Some(version.into());
        self
    }

    pub fn with_providers(self, registry: ProviderRegistry) -> Self {
        Self {
            providers: OnceLock::from(registry),
            ..self
        }
    }

    /// Current version of `package`.
    ///
    /// Fails with [`DocPubError::NotVersioned`] for unversioned packages and
    /// [`DocPubError::UnsupportedPackage`] for versioned packages without a
    /// version source.
    pub fn resolve(&self, package: &DocPackage) -> Result<String> {
        let name = package.name();
        match package.kind() {
            PackageKind::Unversioned => Err(DocPubError::NotVersioned {
                package: name.to_string(),
            }),
            PackageKind::Core => self
                .core_version
                .clone()
                .ok_or_else(|| DocPubError::config("versions.core_version is not configured")),
            PackageKind::Provider => Ok(self.providers()?.latest_version(name)?.to_string()),
            PackageKind::Chart => self
                .chart_version
                .clone()
                .ok_or_else(|| DocPubError::config("versions.chart_version is not configured")),
            PackageKind::GenericVersioned => Err(DocPubError::UnsupportedPackage {
                package: name.to_string(),
            }),
        }
    }

    fn providers(&self) -> Result<&ProviderRegistry> {
        if let Some(registry) = self.providers.get() {
            return Ok(registry);
        }
        let path = self
            .registry_path
            .as_deref()
            .ok_or_else(|| DocPubError::config("versions.provider_registry is not configured"))?;
        let registry = ProviderRegistry::load(path)?;
        Ok(self.providers.get_or_init(|| registry))
    }
}
