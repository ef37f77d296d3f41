//! Deterministic path derivation for a documentation package.
//!
//! ```text
//! <docs_root>/
//! ├── <package>/                          source_dir
//! │   └── _api/                           api_dir
//! ├── _doctrees/docs/<package>/           doctree_dir
//! └── _build/docs/<package>[/stable]/     build_dir
//!     ├── output-build-<package>.log
//!     ├── warning-build-<package>.log
//!     ├── output-spelling-<package>.log
//!     └── output-spelling-results-<package>/
//! ```

use std::path::{Path, PathBuf};

use docpub_shared::DocPackage;

/// Root of the publish tree, relative to the destination root.
const PUBLISH_ROOT: &str = "docs-archive";

/// Build subdirectory used by every versioned package.
const STABLE_DIR: &str = "stable";

/// Every filesystem location used while building and publishing one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    pub source_dir: PathBuf,
    pub api_dir: PathBuf,
    pub build_dir: PathBuf,
    pub doctree_dir: PathBuf,
    pub build_log_path: PathBuf,
    pub build_warning_log_path: PathBuf,
    pub spelling_log_path: PathBuf,
    pub spelling_report_dir: PathBuf,
    /// Location under the destination root. `None` for a versioned package
    /// resolved without a version.
    pub publish_subpath: Option<PathBuf>,
}

impl PathSet {
    /// Absolute publish location under `destination_root`.
    pub fn publish_dir(&self, destination_root: &Path) -> Option<PathBuf> {
        self.publish_subpath
            .as_ref()
            .map(|sub| destination_root.join(sub))
    }
}

/// Maps packages to their [`PathSet`] under a documentation root. Pure.
#[derive(Debug, Clone)]
pub struct PathResolver {
    docs_root: PathBuf,
}

impl PathResolver {
    pub fn new(docs_root: impl Into<PathBuf>) -> Self {
        Self {
            docs_root: docs_root.into(),
        }
    }

    pub fn docs_root(&self) -> &Path {
        &self.docs_root
    }

    /// Derive all paths for `package`. `version` only affects `publish_subpath`
    /// and is ignored for unversioned packages.
    pub fn resolve(&self, package: &DocPackage, version: Option<&str>) -> PathSet {
        let name = package.name();
        let source_dir = self.docs_root.join(name);

        let mut build_dir = self.docs_root.join("_build").join("docs").join(name);
        if package.is_versioned() {
            build_dir.push(STABLE_DIR);
        }

        let publish_base = Path::new(PUBLISH_ROOT).join(name);
        let publish_subpath = match (package.is_versioned(), version) {
            (false, _) => Some(publish_base),
            (true, Some(version)) => Some(publish_base.join(version)),
            (true, None) => None,
        };

        PathSet {
            api_dir: source_dir.join("_api"),
            source_dir,
            doctree_dir: self.docs_root.join("_doctrees").join("docs").join(name),
            build_log_path: build_dir.join(format!("output-build-{name}.log")),
            build_warning_log_path: build_dir.join(format!("warning-build-{name}.log")),
            spelling_log_path: build_dir.join(format!("output-spelling-{name}.log")),
            spelling_report_dir: build_dir.join(format!("output-spelling-results-{name}")),
            build_dir,
            publish_subpath,
        }
    }
}

/// Render `path` relative to `base` when it lies beneath it (`base/rel`),
/// otherwise as-is.
pub fn pretty_format_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if !rel.as_os_str().is_empty() => {
            format!("{}/{}", base.display(), rel.display())
        }
        _ => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/docs")
    }

    #[test]
    fn versioned_layout() {
        let pkg = DocPackage::new("apache-airflow-providers-http");
        let paths = resolver().resolve(&pkg, Some("4.0.0"));

        assert_eq!(
            paths.source_dir,
            PathBuf::from("/srv/docs/apache-airflow-providers-http")
        );
        assert_eq!(
            paths.api_dir,
            PathBuf::from("/srv/docs/apache-airflow-providers-http/_api")
        );
        assert_eq!(
            paths.build_dir,
            PathBuf::from("/srv/docs/_build/docs/apache-airflow-providers-http/stable")
        );
        assert_eq!(
            paths.doctree_dir,
            PathBuf::from("/srv/docs/_doctrees/docs/apache-airflow-providers-http")
        );
        assert_eq!(
            paths.build_warning_log_path,
            paths
                .build_dir
                .join("warning-build-apache-airflow-providers-http.log")
        );
        assert_eq!(
            paths.spelling_report_dir,
            paths
                .build_dir
                .join("output-spelling-results-apache-airflow-providers-http")
        );
        assert_eq!(
            paths.publish_subpath,
            Some(PathBuf::from(
                "docs-archive/apache-airflow-providers-http/4.0.0"
            ))
        );
    }

    #[test]
    fn unversioned_layout_ignores_version() {
        let pkg = DocPackage::new("docker-stack");
        let paths = resolver().resolve(&pkg, Some("1.0.0"));
        assert_eq!(
            paths.build_dir,
            PathBuf::from("/srv/docs/_build/docs/docker-stack")
        );
        assert_eq!(
            paths.publish_subpath,
            Some(PathBuf::from("docs-archive/docker-stack"))
        );
        assert_eq!(
            paths.build_log_path,
            PathBuf::from("/srv/docs/_build/docs/docker-stack/output-build-docker-stack.log")
        );
    }

    #[test]
    fn versioned_without_version_has_no_publish_path() {
        let pkg = DocPackage::new("helm-chart");
        let paths = resolver().resolve(&pkg, None);
        assert_eq!(paths.publish_subpath, None);
        assert_eq!(paths.publish_dir(Path::new("/site")), None);
        assert!(paths.build_dir.ends_with("helm-chart/stable"));
    }

    #[test]
    fn deterministic() {
        let pkg = DocPackage::new("apache-airflow");
        let a = resolver().resolve(&pkg, Some("2.8.0"));
        let b = resolver().resolve(&pkg, Some("2.8.0"));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_packages_never_share_build_dirs() {
        let names = [
            "apache-airflow",
            "apache-airflow-providers-http",
            "apache-airflow-providers-amazon",
            "helm-chart",
            "apache-airflow-providers",
            "docker-stack",
        ];
        let dirs: Vec<PathBuf> = names
            .iter()
            .map(|n| resolver().resolve(&DocPackage::new(*n), None).build_dir)
            .collect();
        for (i, a) in dirs.iter().enumerate() {
            for b in &dirs[i + 1..] {
                assert!(!a.starts_with(b) && !b.starts_with(a), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn pretty_paths() {
        assert_eq!(
            pretty_format_path(Path::new("/site/docs-archive/x"), Path::new("/site")),
            "/site/docs-archive/x"
        );
        assert_eq!(
            pretty_format_path(Path::new("/elsewhere/x"), Path::new("/site")),
            "/elsewhere/x"
        );
    }
}
