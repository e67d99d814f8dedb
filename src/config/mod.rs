//! Configuration loading for lambda-lift
//!
//! A function is described by a `lambda-lift.toml` or `lambda-lift-<name>.toml`
//! file. Relative paths inside the file are resolved against the directory
//! containing it.

pub mod registry;
pub mod schema;

pub use registry::ConfigRegistry;
pub use schema::{BuildConfig, DeploymentConfig, LambdaConfig, Platform};

use crate::error::{LiftError, LiftResult};
use schema::{RawBuild, RawConfig, RawDeployment};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of an unnamed configuration (name taken from the parent directory)
pub const CONFIG_FILE_NAME: &str = "lambda-lift.toml";

/// Prefix of a named configuration file (`lambda-lift-<name>.toml`)
pub const CONFIG_FILE_PREFIX: &str = "lambda-lift-";

/// Check whether a file name looks like a lambda-lift configuration
pub fn is_config_file_name(file_name: &str) -> bool {
    file_name == CONFIG_FILE_NAME
        || (file_name.starts_with(CONFIG_FILE_PREFIX) && file_name.ends_with(".toml"))
}

/// Parses and validates a single configuration file
pub struct ConfigParser {
    toml_path: PathBuf,
    base_dir: PathBuf,
}

impl ConfigParser {
    /// Create a parser for the given file
    pub fn new(toml_path: impl Into<PathBuf>) -> Self {
        let toml_path = toml_path.into();
        let base_dir = toml_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            toml_path,
            base_dir,
        }
    }

    /// Read, parse and validate the file
    pub fn parse(&self) -> LiftResult<LambdaConfig> {
        let content = fs::read_to_string(&self.toml_path).map_err(|e| {
            LiftError::io(format!("reading config {}", self.toml_path.display()), e)
        })?;

        let raw: RawConfig =
            toml::from_str(&content).map_err(|e| self.invalid(e.to_string()))?;

        let name = self.resolve_name(raw.general.name.as_deref())?;
        let build = raw
            .build
            .ok_or_else(|| self.invalid("missing [build] section"))?;
        let build = self.resolve_build(name, build)?;

        let mut deployments = BTreeMap::new();
        for (profile, deployment) in raw.deployment {
            let resolved = self.resolve_deployment(&profile, deployment)?;
            deployments.insert(profile, resolved);
        }

        debug!(
            "Parsed config {} for lambda {}",
            self.toml_path.display(),
            build.name
        );

        Ok(LambdaConfig {
            build,
            deployments,
            toml_path: self.toml_path.clone(),
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> LiftError {
        LiftError::config_invalid(&self.toml_path, reason)
    }

    /// Explicit name, else `lambda-lift-<name>.toml`, else the parent directory
    fn resolve_name(&self, explicit: Option<&str>) -> LiftResult<String> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => {
                let file_name = self
                    .toml_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                let stem = file_name.strip_suffix(".toml").unwrap_or(file_name);
                match stem.strip_prefix(CONFIG_FILE_PREFIX) {
                    Some(suffix) => suffix.to_string(),
                    None => self
                        .base_dir
                        .file_name()
                        .and_then(|n| n.to_str())
                        .map(str::to_string)
                        .ok_or_else(|| self.invalid("cannot derive a name from the file location"))?,
                }
            }
        };

        if !is_valid_name(&name) {
            return Err(self.invalid(format!(
                "invalid name {:?}: use letters, digits, '-' and '_' only",
                name
            )));
        }
        Ok(name)
    }

    fn resolve_build(&self, name: String, raw: RawBuild) -> LiftResult<BuildConfig> {
        if raw.source_paths.is_empty() {
            return Err(self.invalid("build.source_paths must list at least one directory"));
        }
        let mut source_paths = Vec::with_capacity(raw.source_paths.len());
        for path in &raw.source_paths {
            let resolved = self.base_dir.join(path);
            if !resolved.is_dir() {
                return Err(self.invalid(format!(
                    "source path {} is not a directory",
                    resolved.display()
                )));
            }
            source_paths.push(resolved);
        }

        let requirements_path = match raw.requirements_path {
            Some(path) => {
                let resolved = self.base_dir.join(path);
                if !resolved.is_file() {
                    return Err(self.invalid(format!(
                        "requirements file {} does not exist",
                        resolved.display()
                    )));
                }
                Some(resolved)
            }
            None => None,
        };

        let destination_path = raw
            .destination_path
            .map(|p| self.base_dir.join(p))
            .ok_or_else(|| self.invalid("missing build.destination_path"))?;
        if destination_path.is_dir() {
            return Err(self.invalid(format!(
                "destination {} is a directory",
                destination_path.display()
            )));
        }

        let cache_path = raw
            .cache_path
            .map(|p| self.base_dir.join(p))
            .ok_or_else(|| self.invalid("missing build.cache_path"))?;
        if cache_path.exists() && !cache_path.is_dir() {
            return Err(self.invalid(format!(
                "cache path {} is not a directory",
                cache_path.display()
            )));
        }

        let platform = raw
            .platform
            .ok_or_else(|| self.invalid("missing build.platform"))?
            .parse::<Platform>()
            .map_err(|reason| self.invalid(reason))?;

        Ok(BuildConfig {
            name,
            source_paths,
            requirements_path,
            destination_path,
            cache_path,
            platform,
            python_executable: raw.python_executable,
            ignore_libraries: raw.ignore_libraries.into_iter().collect::<BTreeSet<_>>(),
        })
    }

    fn resolve_deployment(
        &self,
        profile: &str,
        raw: RawDeployment,
    ) -> LiftResult<DeploymentConfig> {
        let region = raw
            .region
            .ok_or_else(|| self.invalid(format!("deployment.{}: missing region", profile)))?;
        let name = raw
            .name
            .ok_or_else(|| self.invalid(format!("deployment.{}: missing name", profile)))?;
        Ok(DeploymentConfig {
            region,
            name,
            aws_profile: raw.aws_profile,
        })
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL_BUILD: &str = r#"
[build]
source_paths = ["src"]
destination_path = "dist/out.zip"
cache_path = ".cache"
platform = "x86"
"#;

    fn write_config(dir: &Path, file_name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir.join("src")).unwrap();
        let path = dir.join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn name_from_explicit_field() {
        let temp = TempDir::new().unwrap();
        let content = format!("[general]\nname = \"test-name\"\n{}", MINIMAL_BUILD);
        let path = write_config(temp.path(), "lambda-lift.toml", &content);

        let config = ConfigParser::new(path).parse().unwrap();
        assert_eq!(config.name(), "test-name");
    }

    #[test]
    fn name_from_file_name() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "lambda-lift-file-name.toml", MINIMAL_BUILD);

        let config = ConfigParser::new(path).parse().unwrap();
        assert_eq!(config.name(), "file-name");
    }

    #[test]
    fn name_from_parent_dir() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested");
        let path = write_config(&dir, "lambda-lift.toml", MINIMAL_BUILD);

        let config = ConfigParser::new(path).parse().unwrap();
        assert_eq!(config.name(), "nested");
    }

    #[test]
    fn invalid_name_rejected() {
        let temp = TempDir::new().unwrap();
        let content = format!("[general]\nname = \"bad name!\"\n{}", MINIMAL_BUILD);
        let path = write_config(temp.path(), "lambda-lift.toml", &content);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(matches!(err, LiftError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("bad name!"));
    }

    #[test]
    fn paths_resolve_relative_to_file() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "lambda-lift-x.toml", MINIMAL_BUILD);

        let build = ConfigParser::new(path).parse().unwrap().build;
        assert_eq!(build.source_paths, vec![temp.path().join("src")]);
        assert_eq!(build.destination_path, temp.path().join("dist/out.zip"));
        assert_eq!(build.cache_path, temp.path().join(".cache"));
        assert!(build.requirements_path.is_none());
        assert!(build.python_executable.is_none());
        assert!(build.ignore_libraries.is_empty());
    }

    #[test]
    fn full_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("requirements.txt"), "requests\n").unwrap();
        let content = r#"
[general]
name = "sample-name"

[build]
source_paths = ["src"]
requirements_path = "requirements.txt"
destination_path = "dist/sample-name.zip"
cache_path = "cache/sample-name"
platform = "ARM64"
python_executable = "python3.14"
ignore_libraries = ["numpy", "boto3", "numpy"]

[deployment.dev]
region = "us-west-2"
name = "dev-lambda-name"
aws_profile = "dev-push"

[deployment.prod]
region = "us-west-2"
name = "prod-lambda-name"
"#;
        let path = write_config(temp.path(), "lambda-lift.toml", content);

        let config = ConfigParser::new(&path).parse().unwrap();
        assert_eq!(config.toml_path, path);
        assert_eq!(config.build.platform, Platform::Arm64);
        assert_eq!(config.build.python_executable.as_deref(), Some("python3.14"));
        assert_eq!(
            config.build.requirements_path,
            Some(temp.path().join("requirements.txt"))
        );
        let ignored: Vec<_> = config.build.ignore_libraries.iter().cloned().collect();
        assert_eq!(ignored, vec!["boto3".to_string(), "numpy".to_string()]);

        let profiles: Vec<_> = config.deployments.keys().cloned().collect();
        assert_eq!(profiles, vec!["dev".to_string(), "prod".to_string()]);
        assert_eq!(
            config.deployments["dev"].aws_profile.as_deref(),
            Some("dev-push")
        );
        assert!(config.deployments["prod"].aws_profile.is_none());
        assert_eq!(config.deployments["prod"].name, "prod-lambda-name");
    }

    #[test]
    fn missing_requirements_file_rejected() {
        let temp = TempDir::new().unwrap();
        let content = MINIMAL_BUILD.replace(
            "platform = \"x86\"",
            "platform = \"x86\"\nrequirements_path = \"nope.txt\"",
        );
        let path = write_config(temp.path(), "lambda-lift-fn.toml", &content);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(err.to_string().contains("requirements file"));
        assert!(err.to_string().contains("nope.txt"));
    }

    #[test]
    fn destination_directory_rejected() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("dist/out.zip")).unwrap();
        let path = write_config(temp.path(), "lambda-lift-fn.toml", MINIMAL_BUILD);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(matches!(err, LiftError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("is a directory"));
    }

    #[test]
    fn cache_path_file_rejected() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".cache"), "not a dir").unwrap();
        let path = write_config(temp.path(), "lambda-lift-fn.toml", MINIMAL_BUILD);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(err.to_string().contains("cache path"));
    }

    #[test]
    fn missing_platform_rejected() {
        let temp = TempDir::new().unwrap();
        let content = MINIMAL_BUILD.replace("platform = \"x86\"", "");
        let path = write_config(temp.path(), "lambda-lift-fn.toml", &content);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(err.to_string().contains("missing build.platform"));
    }

    #[test]
    fn unknown_platform_rejected() {
        let temp = TempDir::new().unwrap();
        let content = MINIMAL_BUILD.replace("\"x86\"", "\"sparc\"");
        let path = write_config(temp.path(), "lambda-lift-fn.toml", &content);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(err.to_string().contains("sparc"));
    }

    #[test]
    fn deployment_missing_region_rejected() {
        let temp = TempDir::new().unwrap();
        let content = format!("{}\n[deployment.profile1]\nname = \"lambda1\"\n", MINIMAL_BUILD);
        let path = write_config(temp.path(), "lambda-lift-fn.toml", &content);

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(err.to_string().contains("missing region"));
    }

    #[test]
    fn broken_toml_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_config(temp.path(), "lambda-lift.toml", "[build\nsource_paths = ");

        let err = ConfigParser::new(path).parse().unwrap_err();
        assert!(matches!(err, LiftError::ConfigInvalid { .. }));
    }

    #[test]
    fn config_file_names() {
        assert!(is_config_file_name("lambda-lift.toml"));
        assert!(is_config_file_name("lambda-lift-api.toml"));
        assert!(!is_config_file_name("lambda-lift.yaml"));
        assert!(!is_config_file_name("Cargo.toml"));
    }
}
