//! Dependency installation
//!
//! Resolving requirements is delegated to an external tool. The
//! `DependencyInstaller` trait lets the packer stay independent of how
//! packages end up in the target directory.

use crate::config::BuildConfig;
use crate::error::{LiftError, LiftResult};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Interpreter used when a config does not name one
pub const DEFAULT_PYTHON: &str = "python3";

/// Installs a config's requirements into a directory
#[async_trait]
pub trait DependencyInstaller: Send + Sync {
    /// Populate `target` with the packages listed in `requirements`
    async fn install(
        &self,
        config: &BuildConfig,
        requirements: &Path,
        target: &Path,
    ) -> LiftResult<()>;

    /// Human-readable installer name for display
    fn installer_name(&self) -> &'static str;
}

/// Installs wheels for the target platform with `pip install --target`
#[derive(Debug, Default)]
pub struct PipInstaller;

impl PipInstaller {
    pub fn new() -> Self {
        Self
    }

    /// Arguments passed to the interpreter
    pub fn args(config: &BuildConfig, requirements: &Path, target: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            "-r".to_string(),
            requirements.display().to_string(),
            "--target".to_string(),
            target.display().to_string(),
            "--platform".to_string(),
            config.platform.pip_platform().to_string(),
            "--only-binary=:all:".to_string(),
            "--implementation".to_string(),
            "cp".to_string(),
            "--upgrade".to_string(),
            "--quiet".to_string(),
        ]
    }
}

#[async_trait]
impl DependencyInstaller for PipInstaller {
    async fn install(
        &self,
        config: &BuildConfig,
        requirements: &Path,
        target: &Path,
    ) -> LiftResult<()> {
        let python = config.python_executable.as_deref().unwrap_or(DEFAULT_PYTHON);
        let args = Self::args(config, requirements, target);
        let command = format!("{} {}", python, args.join(" "));
        debug!("Executing: {}", command);

        let output = Command::new(python)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| LiftError::command_failed(&command, e))?;

        if !output.status.success() {
            return Err(LiftError::DependencyInstall {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        info!(
            "Installed requirements for {} ({})",
            config.name, config.platform
        );
        Ok(())
    }

    fn installer_name(&self) -> &'static str {
        "pip"
    }
}
