//! Path predicates used when packaging
//!
//! A [`PathFilter`] decides, for a path relative to the folder being
//! archived, whether the entry is kept.

use crate::config::BuildConfig;
use std::collections::BTreeSet;
use std::path::{Component, Path};

/// Segment dropped from every archive
pub const PYCACHE_DIR: &str = "__pycache__";

/// Composable exclusion rules
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    segments: BTreeSet<String>,
    fragments: Vec<String>,
    extensions: BTreeSet<String>,
    /// Normalized library names matched against the top-level segment
    libraries: BTreeSet<String>,
}

impl PathFilter {
    /// A filter that keeps everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for application sources: no bytecode caches
    pub fn sources() -> Self {
        Self::new()
            .exclude_segment(PYCACHE_DIR)
            .exclude_extension("pyc")
    }

    /// Filter for installed dependencies: no bytecode, no ignored libraries
    pub fn dependencies(config: &BuildConfig) -> Self {
        Self::sources().ignore_libraries(config.ignore_libraries.iter())
    }

    /// Drop any path with a segment equal to `name`
    pub fn exclude_segment(mut self, name: impl Into<String>) -> Self {
        self.segments.insert(name.into());
        self
    }

    /// Drop any path with a segment containing `fragment`
    pub fn exclude_segment_containing(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Drop files with the given extension (without the dot)
    pub fn exclude_extension(mut self, ext: impl Into<String>) -> Self {
        self.extensions.insert(ext.into());
        self
    }

    /// Drop top-level packages, modules and metadata belonging to `libraries`
    ///
    /// `numpy` matches `numpy/`, `numpy.libs/`, `numpy-1.26.4.dist-info/`
    /// and `numpy.py`. Names compare case-insensitively with `-` and `.`
    /// treated as `_`.
    pub fn ignore_libraries<I, S>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.libraries
            .extend(libraries.into_iter().map(|l| normalize_library(l.as_ref())));
        self
    }

    /// Whether `relative` should be kept
    pub fn matches(&self, relative: &Path) -> bool {
        let mut segments = relative.components().filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        });

        if !self.libraries.is_empty() {
            let top = match segments.clone().next() {
                Some(top) => top,
                None => return true,
            };
            let stem = top
                .split(['.', '-'])
                .next()
                .unwrap_or_default();
            if self.libraries.contains(&normalize_library(stem)) {
                return false;
            }
        }

        let excluded = segments.any(|segment| {
            self.segments.contains(&*segment)
                || self.fragments.iter().any(|f| segment.contains(f.as_str()))
        });
        if excluded {
            return false;
        }

        match relative.extension().and_then(|e| e.to_str()) {
            Some(ext) => !self.extensions.contains(ext),
            None => true,
        }
    }
}

fn normalize_library(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '-' | '.' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}
