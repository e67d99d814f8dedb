//! Fingerprinting of build inputs
//!
//! The fingerprint covers every input that influences the dependency
//! archive except the archive bytes themselves. Fields are encoded as
//! `tag || u64-le length || bytes` in a fixed order, so no two distinct
//! inputs can share an encoding.

use crate::config::BuildConfig;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

/// Hex-encoded SHA-256 of the build inputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accumulates tagged, length-prefixed fields into a SHA-256 state
struct FieldHasher {
    hasher: Sha256,
}

impl FieldHasher {
    fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    fn field(&mut self, tag: &str, bytes: &[u8]) {
        self.hasher.update(tag.as_bytes());
        self.hasher.update([0u8]);
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    /// An optional value: a presence byte, then the value when present
    fn optional(&mut self, tag: &str, bytes: Option<&[u8]>) {
        match bytes {
            Some(bytes) => {
                self.field(tag, &[1]);
                self.field(tag, bytes);
            }
            None => self.field(tag, &[0]),
        }
    }

    fn count(&mut self, tag: &str, n: usize) {
        self.field(tag, &(n as u64).to_le_bytes());
    }

    fn path(&mut self, tag: &str, path: &Path) {
        self.field(tag, path.as_os_str().as_encoded_bytes());
    }

    fn finish(self) -> Fingerprint {
        Fingerprint(hex::encode(self.hasher.finalize()))
    }
}

/// Compute the fingerprint of a build configuration
///
/// The requirements file is hashed by content. Source paths keep their
/// declared order; ignored libraries are hashed in sorted order.
pub fn fingerprint(config: &BuildConfig) -> io::Result<Fingerprint> {
    let requirements = match &config.requirements_path {
        Some(path) => Some(fs::read(path)?),
        None => None,
    };

    let mut h = FieldHasher::new();
    h.optional("requirements", requirements.as_deref());

    h.count("source_paths", config.source_paths.len());
    for path in &config.source_paths {
        h.path("source_path", path);
    }

    h.path("destination_path", &config.destination_path);
    h.path("cache_path", &config.cache_path);
    h.field("platform", config.platform.tag().as_bytes());
    h.optional(
        "python_executable",
        config.python_executable.as_deref().map(str::as_bytes),
    );

    // BTreeSet iterates in sorted order
    h.count("ignore_libraries", config.ignore_libraries.len());
    for library in &config.ignore_libraries {
        h.field("ignore_library", library.as_bytes());
    }

    Ok(h.finish())
}

/// Hex-encoded SHA-256 of a file's bytes
pub fn digest_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
