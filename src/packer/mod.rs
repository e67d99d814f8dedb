//! Packaging orchestration
//!
//! Ties the cache, the dependency installer and the archive builder
//! together: rebuild the dependency archive only when the cache is stale,
//! then merge the application sources into a copy of it.

pub mod installer;

pub use installer::{DependencyInstaller, PipInstaller};

use crate::archive::{self, PathFilter};
use crate::cache;
use crate::config::BuildConfig;
use crate::error::{LiftError, LiftResult};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Outcome of packaging one function
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub name: String,
    pub destination: PathBuf,
    /// Whether the cached dependency archive was reused
    pub cache_hit: bool,
    /// Number of entries in the final archive
    pub entries: usize,
}

/// Builds deployable archives
pub struct Packer {
    installer: Box<dyn DependencyInstaller>,
}

impl Packer {
    /// Create a packer using the given installer
    pub fn new(installer: impl DependencyInstaller + 'static) -> Self {
        Self {
            installer: Box::new(installer),
        }
    }

    /// Name of the installer in use
    pub fn installer_name(&self) -> &'static str {
        self.installer.installer_name()
    }

    /// Package `config`, rebuilding dependencies when stale or when `force` is set
    pub async fn package(&self, config: &BuildConfig, force: bool) -> LiftResult<PackageReport> {
        let cache_hit = if force {
            debug!("Forced rebuild of dependencies for {}", config.name);
            false
        } else {
            let cfg = config.clone();
            blocking(move || Ok(cache::check_up_to_date(&cfg))).await?
        };

        if cache_hit {
            info!("Dependencies for {} are up to date", config.name);
        } else {
            self.rebuild_dependencies(config).await?;
        }

        let cfg = config.clone();
        let entries = blocking(move || assemble(&cfg)).await?;

        info!(
            "Packaged {} into {} ({} entries)",
            config.name,
            config.destination_path.display(),
            entries
        );
        Ok(PackageReport {
            name: config.name.clone(),
            destination: config.destination_path.clone(),
            cache_hit,
            entries,
        })
    }

    /// Rebuild the dependency archive and record it in the cache
    pub async fn rebuild_dependencies(&self, config: &BuildConfig) -> LiftResult<()> {
        let archive_path = cache::dependency_archive_path(config);

        match &config.requirements_path {
            None => {
                debug!("No requirements for {}, using an empty archive", config.name);
                blocking(move || archive::create_empty(&archive_path)).await?;
            }
            Some(requirements) => {
                tokio::fs::create_dir_all(&config.cache_path)
                    .await
                    .map_err(|e| {
                        LiftError::io(
                            format!("creating cache directory {}", config.cache_path.display()),
                            e,
                        )
                    })?;
                let staging = tempfile::Builder::new()
                    .prefix("install-")
                    .tempdir_in(&config.cache_path)
                    .map_err(|e| LiftError::io("creating install directory", e))?;

                info!(
                    "Installing dependencies for {} with {}",
                    config.name,
                    self.installer.installer_name()
                );
                self.installer
                    .install(config, requirements, staging.path())
                    .await?;

                let filter = PathFilter::dependencies(config);
                let installed = staging.path().to_path_buf();
                blocking(move || {
                    archive::build_from_folder(&installed, &archive_path, |p| filter.matches(p))
                })
                .await?;
            }
        }

        let cfg = config.clone();
        blocking(move || cache::bump(&cfg).map(|_| ())).await
    }
}

/// Merge the sources into a copy of the dependency archive and move it into place
///
/// Returns the number of entries in the final archive.
pub fn assemble(config: &BuildConfig) -> LiftResult<usize> {
    let dependencies = cache::dependency_archive_path(config);
    let destination = &config.destination_path;
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)
        .map_err(|e| LiftError::io(format!("creating directory {}", parent.display()), e))?;

    let work_dir = tempfile::Builder::new()
        .prefix(".lambda-lift-")
        .tempdir_in(&parent)
        .map_err(|e| LiftError::io("creating work directory", e))?;
    let work = work_dir.path().join("package.zip");

    copy_file(&dependencies, &work)?;
    let filter = PathFilter::sources();
    archive::merge_folders_into(&work, &config.source_paths, |p| filter.matches(p))?;

    fs::rename(&work, destination)
        .map_err(|e| LiftError::io(format!("moving archive to {}", destination.display()), e))?;

    Ok(archive::entry_names(destination)?.len())
}

fn copy_file(from: &Path, to: &Path) -> LiftResult<()> {
    fs::copy(from, to).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LiftError::PathNotFound(from.to_path_buf()),
        _ => LiftError::io(format!("copying {}", from.display()), e),
    })?;
    Ok(())
}

/// Run blocking filesystem work off the async runtime
///
/// Panics inside the task resume on the caller unchanged.
pub(crate) async fn blocking<T, F>(task: F) -> LiftResult<T>
where
    F: FnOnce() -> LiftResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
        Err(e) => Err(LiftError::Internal(format!("blocking task failed: {}", e))),
    }
}
