//! Staging finished builds into the publish tree.
//!
//! Versioned output is never replaced unless explicitly requested; unversioned
//! output always is. A failed copy leaves the destination partially written.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};
use walkdir::WalkDir;

use docpub_shared::{DocPackage, DocPubError, Result};

use crate::builder::remove_dir_if_exists;
use crate::paths::{PathResolver, pretty_format_path};
use crate::version::VersionResolver;

/// Pointer file naming the current version, written next to the version dirs.
const STABLE_POINTER_FILE: &str = "stable.txt";

/// What to do with an existing publish destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishDecision {
    pub should_copy: bool,
    pub should_overwrite_existing: bool,
}

impl PublishDecision {
    pub fn decide(is_versioned: bool, destination_exists: bool, override_requested: bool) -> Self {
        match (destination_exists, is_versioned, override_requested) {
            (false, _, _) => Self {
                should_copy: true,
                should_overwrite_existing: false,
            },
            (true, true, false) => Self {
                should_copy: false,
                should_overwrite_existing: false,
            },
            (true, _, _) => Self {
                should_copy: true,
                should_overwrite_existing: true,
            },
        }
    }
}

/// Result of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Build output was copied; `version` is set for versioned packages.
    Published {
        output_dir: PathBuf,
        version: Option<String>,
    },
    /// Versioned output already existed and no override was requested.
    Skipped { output_dir: PathBuf },
}

/// Copy the build directory of `package` to
/// `destination_root/docs-archive/<package>[/<version>]`.
///
/// For versioned packages `stable.txt` one level above the output directory
/// is overwritten with the published version.
#[instrument(skip_all, fields(package = %package))]
pub fn publish(
    package: &DocPackage,
    resolver: &PathResolver,
    versions: &VersionResolver,
    override_versioned: bool,
    destination_root: &Path,
) -> Result<PublishOutcome> {
    let version = if package.is_versioned() {
        Some(versions.resolve(package)?)
    } else {
        None
    };
    let paths = resolver.resolve(package, version.as_deref());
    let output_dir = paths.publish_dir(destination_root).ok_or_else(|| {
        DocPubError::validation(format!("no publish path for package {package}"))
    })?;

    let cwd = std::env::current_dir().unwrap_or_default();
    info!(
        "copy directory: {} => {}",
        pretty_format_path(&paths.build_dir, &cwd),
        pretty_format_path(&output_dir, destination_root)
    );

    let decision =
        PublishDecision::decide(package.is_versioned(), output_dir.exists(), override_versioned);
    if !decision.should_copy {
        info!(
            output_dir = %output_dir.display(),
            "skipping previously existing output, delete it manually to regenerate"
        );
        return Ok(PublishOutcome::Skipped { output_dir });
    }
    require_build_dir(&paths.build_dir)?;
    if decision.should_overwrite_existing {
        if package.is_versioned() {
            info!(output_dir = %output_dir.display(), "overriding previously existing output");
        }
        remove_dir_if_exists(&output_dir)?;
    }

    copy_tree(&paths.build_dir, &output_dir)?;

    if let Some(version) = &version {
        let pointer = output_dir
            .parent()
            .unwrap_or(destination_root)
            .join(STABLE_POINTER_FILE);
        std::fs::write(&pointer, version).map_err(|e| DocPubError::io(&pointer, e))?;
        info!(%version, pointer = %pointer.display(), "updated stable pointer");
    }

    Ok(PublishOutcome::Published {
        output_dir,
        version,
    })
}

fn require_build_dir(build_dir: &Path) -> Result<()> {
    if build_dir.is_dir() {
        return Ok(());
    }
    Err(DocPubError::io(
        build_dir,
        std::io::Error::new(std::io::ErrorKind::NotFound, "build directory does not exist"),
    ))
}

/// Recursively copy the contents of `src` into `dst`, creating `dst`.
///
/// Symlinks are followed: the published tree holds copies of their targets.
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    require_build_dir(src)?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            DocPubError::io(path, std::io::Error::other(e.to_string()))
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| DocPubError::validation(e.to_string()))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| DocPubError::io(&target, e))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|e| DocPubError::io(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{ProviderRecord, ProviderRegistry};

    const HTTP: &str = "apache-airflow-providers-http";

    struct Fixture {
        resolver: PathResolver,
        destination: PathBuf,
    }

    fn fixture(package: &DocPackage) -> Fixture {
        let root = std::env::temp_dir().join(format!(
            "docpub-publish-test-{}",
            uuid::Uuid::now_v7()
        ));
        let resolver = PathResolver::new(root.join("docs"));
        let build_dir = resolver.resolve(package, None).build_dir;
        std::fs::create_dir_all(build_dir.join("_static")).unwrap();
        std::fs::write(build_dir.join("index.html"), "<h1>new</h1>").unwrap();
        std::fs::write(build_dir.join("_static").join("site.css"), "body{}").unwrap();

        let destination = root.join("site");
        std::fs::create_dir_all(&destination).unwrap();
        Fixture {
            resolver,
            destination,
        }
    }

    fn versions() -> VersionResolver {
        VersionResolver::new().with_providers(ProviderRegistry::new(vec![ProviderRecord {
            package_name: HTTP.into(),
            versions: vec!["4.0.0".into(), "3.0.0".into()],
        }]))
    }

    fn existing_output(destination: &Path, sub: &str) -> PathBuf {
        let dir = destination.join(sub);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("old.html"), "old").unwrap();
        dir
    }

    #[test]
    fn decisions() {
        let copy_fresh = PublishDecision {
            should_copy: true,
            should_overwrite_existing: false,
        };
        let skip = PublishDecision {
            should_copy: false,
            should_overwrite_existing: false,
        };
        let replace = PublishDecision {
            should_copy: true,
            should_overwrite_existing: true,
        };
        assert_eq!(PublishDecision::decide(true, false, false), copy_fresh);
        assert_eq!(PublishDecision::decide(false, false, true), copy_fresh);
        assert_eq!(PublishDecision::decide(true, true, false), skip);
        assert_eq!(PublishDecision::decide(true, true, true), replace);
        assert_eq!(PublishDecision::decide(false, true, false), replace);
        assert_eq!(PublishDecision::decide(false, true, true), replace);
    }

    #[test]
    fn fresh_versioned_publish_writes_stable_pointer() {
        let package = DocPackage::new(HTTP);
        let fx = fixture(&package);

        let outcome = publish(&package, &fx.resolver, &versions(), false, &fx.destination).unwrap();

        let output_dir = fx.destination.join("docs-archive").join(HTTP).join("4.0.0");
        assert_eq!(
            outcome,
            PublishOutcome::Published {
                output_dir: output_dir.clone(),
                version: Some("4.0.0".into()),
            }
        );
        assert!(output_dir.join("index.html").is_file());
        assert!(output_dir.join("_static").join("site.css").is_file());
        let stable = std::fs::read_to_string(output_dir.parent().unwrap().join("stable.txt")).unwrap();
        assert_eq!(stable, "4.0.0");
    }

    #[test]
    fn existing_versioned_output_is_kept_without_override() {
        let package = DocPackage::new(HTTP);
        let fx = fixture(&package);
        let existing = existing_output(&fx.destination, "docs-archive/apache-airflow-providers-http/4.0.0");

        let outcome = publish(&package, &fx.resolver, &versions(), false, &fx.destination).unwrap();

        assert_eq!(
            outcome,
            PublishOutcome::Skipped {
                output_dir: existing.clone()
            }
        );
        assert!(existing.join("old.html").is_file());
        assert!(!existing.join("index.html").exists());
        assert!(!existing.parent().unwrap().join("stable.txt").exists());
    }

    #[test]
    fn existing_versioned_output_is_replaced_with_override() {
        let package = DocPackage::new(HTTP);
        let fx = fixture(&package);
        let existing = existing_output(&fx.destination, "docs-archive/apache-airflow-providers-http/4.0.0");
        std::fs::write(existing.parent().unwrap().join("stable.txt"), "3.0.0-old").unwrap();

        publish(&package, &fx.resolver, &versions(), true, &fx.destination).unwrap();

        assert!(!existing.join("old.html").exists());
        assert!(existing.join("index.html").is_file());
        let stable = std::fs::read_to_string(existing.parent().unwrap().join("stable.txt")).unwrap();
        assert_eq!(stable, "4.0.0");
    }

    #[test]
    fn unversioned_output_is_always_replaced() {
        let package = DocPackage::new("docker-stack");
        for override_versioned in [false, true] {
            let fx = fixture(&package);
            let existing = existing_output(&fx.destination, "docs-archive/docker-stack");

            let outcome = publish(
                &package,
                &fx.resolver,
                &VersionResolver::new(),
                override_versioned,
                &fx.destination,
            )
            .unwrap();

            assert_eq!(
                outcome,
                PublishOutcome::Published {
                    output_dir: existing.clone(),
                    version: None,
                }
            );
            assert!(!existing.join("old.html").exists());
            assert!(existing.join("index.html").is_file());
            assert!(!existing.parent().unwrap().join("stable.txt").exists());
        }
    }

    #[test]
    fn unsupported_versioned_package_fails_before_copying() {
        let package = DocPackage::new("foo-bar");
        let fx = fixture(&package);

        let err = publish(&package, &fx.resolver, &versions(), false, &fx.destination).unwrap_err();

        assert!(matches!(err, DocPubError::UnsupportedPackage { .. }));
        assert!(!fx.destination.join("docs-archive").exists());
    }

    #[test]
    fn missing_build_dir_is_io_error() {
        let package = DocPackage::new("docker-stack");
        let fx = fixture(&package);
        std::fs::remove_dir_all(fx.resolver.resolve(&package, None).build_dir).unwrap();

        let err = publish(&package, &fx.resolver, &versions(), false, &fx.destination).unwrap_err();
        assert!(matches!(err, DocPubError::Io { .. }));
    }

    #[test]
    fn missing_build_dir_keeps_existing_output_on_override() {
        let package = DocPackage::new(HTTP);
        let fx = fixture(&package);
        std::fs::remove_dir_all(fx.resolver.resolve(&package, None).build_dir).unwrap();
        let existing = existing_output(&fx.destination, "docs-archive/apache-airflow-providers-http/4.0.0");

        let err = publish(&package, &fx.resolver, &versions(), true, &fx.destination).unwrap_err();

        assert!(matches!(err, DocPubError::Io { .. }));
        assert!(existing.join("old.html").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_entries_are_copied_as_their_targets() {
        let package = DocPackage::new("docker-stack");
        let fx = fixture(&package);
        let build_dir = fx.resolver.resolve(&package, None).build_dir;
        std::os::unix::fs::symlink(build_dir.join("_static"), build_dir.join("assets")).unwrap();
        std::os::unix::fs::symlink(build_dir.join("index.html"), build_dir.join("home.html")).unwrap();

        publish(&package, &fx.resolver, &VersionResolver::new(), false, &fx.destination).unwrap();

        let output_dir = fx.destination.join("docs-archive").join("docker-stack");
        assert!(output_dir.join("assets").join("site.css").is_file());
        let home = std::fs::read_to_string(output_dir.join("home.html")).unwrap();
        assert_eq!(home, "<h1>new</h1>");
        assert!(!std::fs::symlink_metadata(output_dir.join("assets")).unwrap().file_type().is_symlink());
    }
}
