//! Configuration schema for lambda-lift
//!
//! Each function is described by a `lambda-lift*.toml` file. The raw file
//! layout (`RawConfig`) is deserialized first and then resolved into the
//! validated `LambdaConfig` by [`crate::config::ConfigParser`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Root structure of a `lambda-lift*.toml` file, as written on disk
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    /// General settings
    pub general: RawGeneral,

    /// Build settings (required)
    pub build: Option<RawBuild>,

    /// Deployment profiles keyed by profile name
    pub deployment: BTreeMap<String, RawDeployment>,
}

/// `[general]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawGeneral {
    /// Explicit function name; derived from the file name when absent
    pub name: Option<String>,
}

/// `[build]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawBuild {
    pub source_paths: Vec<PathBuf>,
    pub requirements_path: Option<PathBuf>,
    pub destination_path: Option<PathBuf>,
    pub cache_path: Option<PathBuf>,
    pub platform: Option<String>,
    pub python_executable: Option<String>,
    pub ignore_libraries: Vec<String>,
}

/// `[deployment.<profile>]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawDeployment {
    pub region: Option<String>,
    pub name: Option<String>,
    pub aws_profile: Option<String>,
}

/// Target architecture of the compute platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    X86,
    Arm64,
}

impl Platform {
    /// Stable tag used in fingerprints and display
    pub fn tag(&self) -> &'static str {
        match self {
            Self::X86 => "x86",
            Self::Arm64 => "arm64",
        }
    }

    /// Wheel platform tag passed to pip
    pub fn pip_platform(&self) -> &'static str {
        match self {
            Self::X86 => "manylinux2014_x86_64",
            Self::Arm64 => "manylinux2014_aarch64",
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "x86_64" => Ok(Self::X86),
            "arm64" | "aarch64" => Ok(Self::Arm64),
            other => Err(format!(
                "unknown platform {:?}, expected one of: x86, arm64",
                other
            )),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Everything needed to package one function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildConfig {
    /// Function name (artifact identity)
    pub name: String,

    /// Source directories merged into the archive root, later ones win
    pub source_paths: Vec<PathBuf>,

    /// Dependency manifest; `None` means no third-party dependencies
    pub requirements_path: Option<PathBuf>,

    /// Where the final archive is written
    pub destination_path: PathBuf,

    /// Directory holding the dependency archive and its cache marker
    pub cache_path: PathBuf,

    /// Target architecture
    pub platform: Platform,

    /// Interpreter used to run pip (defaults to `python3`)
    pub python_executable: Option<String>,

    /// Top-level libraries dropped from the dependency archive
    pub ignore_libraries: BTreeSet<String>,
}

/// A deployment target for a packaged function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentConfig {
    pub region: String,
    pub name: String,
    pub aws_profile: Option<String>,
}

/// A fully validated `lambda-lift*.toml` file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LambdaConfig {
    pub build: BuildConfig,
    pub deployments: BTreeMap<String, DeploymentConfig>,
    /// File this configuration was read from
    pub toml_path: PathBuf,
}

impl LambdaConfig {
    /// Function name
    pub fn name(&self) -> &str {
        &self.build.name
    }
}
