//! Dependency archive cache
//!
//! Decides whether a previously built dependency archive can be reused.
//! Freshness is derived from two digests stored in a JSON marker next to
//! the archive: a fingerprint of the build inputs and a digest of the
//! archive bytes.
//!
//! # Cache States
//!
//! | State | Meaning |
//! |-------|---------|
//! | Stale | Initial, or any digest mismatch, or unreadable marker |
//! | Fresh | Both digests match their live recomputation |
//!
//! Read problems always degrade to Stale. Write problems in [`bump`] are
//! returned to the caller.

pub mod fingerprint;
pub mod marker;

pub use fingerprint::{fingerprint, Fingerprint};
pub use marker::{
    bump, check_up_to_date, clear, dependency_archive_path, inspect, marker_path, read_marker,
    CacheMarker, CacheStatus,
};
