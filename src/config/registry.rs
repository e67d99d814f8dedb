//! Discovery of configuration files under a project root

use crate::config::{is_config_file_name, ConfigParser, LambdaConfig};
use crate::error::{LiftError, LiftResult};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// All configurations found under a root, keyed by function name
#[derive(Debug, Clone)]
pub struct ConfigRegistry {
    root: PathBuf,
    configs: BTreeMap<String, LambdaConfig>,
}

impl ConfigRegistry {
    /// Walk `root` and parse every `lambda-lift*.toml` file
    ///
    /// Hidden directories are skipped. Two files resolving to the same name
    /// are rejected.
    pub fn discover(root: &Path) -> LiftResult<Self> {
        if !root.is_dir() {
            return Err(LiftError::PathNotFound(root.to_path_buf()));
        }

        let mut configs: BTreeMap<String, LambdaConfig> = BTreeMap::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        for entry in walker {
            let entry = entry.map_err(|e| {
                LiftError::io(format!("scanning {} for configs", root.display()), e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_config = entry
                .file_name()
                .to_str()
                .is_some_and(is_config_file_name);
            if !is_config {
                continue;
            }

            let config = ConfigParser::new(entry.path()).parse()?;
            let name = config.name().to_string();
            if let Some(existing) = configs.get(&name) {
                return Err(LiftError::NameCollision {
                    name,
                    first: existing.toml_path.clone(),
                    second: config.toml_path,
                });
            }
            configs.insert(name, config);
        }

        debug!("Discovered {} config(s) under {}", configs.len(), root.display());
        Ok(Self {
            root: root.to_path_buf(),
            configs,
        })
    }

    /// Root directory that was scanned
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Function names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    /// Look up a configuration by name
    pub fn get(&self, name: &str) -> LiftResult<&LambdaConfig> {
        self.configs
            .get(name)
            .ok_or_else(|| LiftError::LambdaNotFound(name.to_string()))
    }

    /// All configurations in name order
    pub fn configs(&self) -> impl Iterator<Item = &LambdaConfig> {
        self.configs.values()
    }

    /// Resolve a selection of names; an empty selection with `all` picks everything
    pub fn select(&self, names: &[String], all: bool) -> LiftResult<Vec<&LambdaConfig>> {
        if self.configs.is_empty() {
            return Err(LiftError::ConfigNotFound(self.root.clone()));
        }
        if all || names.is_empty() {
            return Ok(self.configs.values().collect());
        }
        names.iter().map(|name| self.get(name)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
