//! Cache marker persistence and freshness checks
//!
//! The marker records the fingerprint of the build inputs together with
//! the digest of the dependency archive as it was when the marker was
//! written. Both are recomputed on every check; nothing is kept in memory.

use crate::cache::fingerprint::{digest_file, fingerprint, Fingerprint};
use crate::config::BuildConfig;
use crate::error::{LiftError, LiftResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Current on-disk marker format
pub const MARKER_VERSION: u32 = 1;

/// Persisted record of the last successful dependency build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMarker {
    pub version: u32,
    pub fingerprint: Fingerprint,
    /// SHA-256 of the dependency archive when the marker was written
    pub archive_digest: String,
    /// Informational; never consulted when deciding freshness
    pub bumped_at: DateTime<Utc>,
}

/// Outcome of inspecting the cache for one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Marker matches both the inputs and the archive bytes
    Fresh,
    /// No dependency archive on disk
    MissingArchive,
    /// Archive exists but no marker was ever written
    MissingMarker,
    /// Marker cannot be parsed or has an unknown version
    CorruptMarker,
    /// Build inputs changed since the last bump
    InputsChanged,
    /// Archive bytes changed since the last bump
    ArchiveChanged,
    /// An input could not be read
    Unreadable,
}

impl CacheStatus {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Fresh => "fresh",
            Self::MissingArchive => "missing archive",
            Self::MissingMarker => "missing marker",
            Self::CorruptMarker => "corrupt marker",
            Self::InputsChanged => "inputs changed",
            Self::ArchiveChanged => "archive changed",
            Self::Unreadable => "unreadable input",
        };
        write!(f, "{}", text)
    }
}

/// Location of the cached dependency archive
pub fn dependency_archive_path(config: &BuildConfig) -> PathBuf {
    config
        .cache_path
        .join(format!("dependencies_{}.zip", config.name))
}

/// Location of the marker sitting next to the dependency archive
pub fn marker_path(config: &BuildConfig) -> PathBuf {
    config
        .cache_path
        .join(format!("dependencies_{}.json", config.name))
}

/// Read the marker, if present
///
/// Returns `Ok(None)` when no marker exists; parse failures are errors so
/// that callers can tell a corrupt marker from a missing one.
pub fn read_marker(config: &BuildConfig) -> LiftResult<Option<CacheMarker>> {
    let path = marker_path(config);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LiftError::io(
                format!("reading cache marker {}", path.display()),
                e,
            ))
        }
    };
    Ok(Some(serde_json::from_str(&content)?))
}

/// Decide whether the cached dependency archive can be reused
///
/// Never fails: any read or parse problem is reported as a stale status.
pub fn inspect(config: &BuildConfig) -> CacheStatus {
    let archive = dependency_archive_path(config);
    if !archive.is_file() {
        return CacheStatus::MissingArchive;
    }

    let marker = match read_marker(config) {
        Ok(Some(marker)) => marker,
        Ok(None) => return CacheStatus::MissingMarker,
        Err(LiftError::Json(e)) => {
            debug!("Cache marker for {} is corrupt: {}", config.name, e);
            return CacheStatus::CorruptMarker;
        }
        Err(e) => {
            debug!("Cache marker for {} unreadable: {}", config.name, e);
            return CacheStatus::Unreadable;
        }
    };
    if marker.version != MARKER_VERSION {
        return CacheStatus::CorruptMarker;
    }

    match fingerprint(config) {
        Ok(current) if current == marker.fingerprint => {}
        Ok(_) => return CacheStatus::InputsChanged,
        Err(e) => {
            debug!("Cannot fingerprint inputs for {}: {}", config.name, e);
            return CacheStatus::Unreadable;
        }
    }

    match digest_file(&archive) {
        Ok(digest) if digest == marker.archive_digest => CacheStatus::Fresh,
        Ok(_) => CacheStatus::ArchiveChanged,
        Err(e) => {
            debug!("Cannot digest {}: {}", archive.display(), e);
            CacheStatus::Unreadable
        }
    }
}

/// Whether the dependency archive is still valid for `config`
pub fn check_up_to_date(config: &BuildConfig) -> bool {
    let status = inspect(config);
    debug!("Dependency cache for {}: {}", config.name, status);
    status.is_fresh()
}

/// Record the current dependency archive as matching the current inputs
///
/// Must run after the archive has been (re)built. Every I/O failure is
/// returned; a marker is never written for data that could not be read.
pub fn bump(config: &BuildConfig) -> LiftResult<CacheMarker> {
    fs::create_dir_all(&config.cache_path).map_err(|e| {
        LiftError::io(
            format!("creating cache directory {}", config.cache_path.display()),
            e,
        )
    })?;

    let fingerprint =
        fingerprint(config).map_err(|e| LiftError::io("fingerprinting build inputs", e))?;
    let archive = dependency_archive_path(config);
    let archive_digest = digest_file(&archive)
        .map_err(|e| LiftError::io(format!("digesting {}", archive.display()), e))?;

    let marker = CacheMarker {
        version: MARKER_VERSION,
        fingerprint,
        archive_digest,
        bumped_at: Utc::now(),
    };

    let path = marker_path(config);
    let content = serde_json::to_string_pretty(&marker)?;
    let mut temp = NamedTempFile::new_in(&config.cache_path)
        .map_err(|e| LiftError::io("creating temporary cache marker", e))?;
    temp.write_all(content.as_bytes())
        .map_err(|e| LiftError::io("writing temporary cache marker", e))?;
    temp.persist(&path).map_err(|e| {
        LiftError::io(format!("writing cache marker {}", path.display()), e.error)
    })?;

    info!("Dependency cache for {} marked fresh", config.name);
    Ok(marker)
}

/// Remove the dependency archive and its marker
///
/// Returns whether anything was deleted.
pub fn clear(config: &BuildConfig) -> LiftResult<bool> {
    let mut removed = false;
    for path in [dependency_archive_path(config), marker_path(config)] {
        match fs::remove_file(&path) {
            Ok(()) => removed = true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(LiftError::io(format!("removing {}", path.display()), e)),
        }
    }
    if removed {
        info!("Cleared dependency cache for {}", config.name);
    }
    Ok(removed)
}
