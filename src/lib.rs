//! lambda-lift - Serverless function packager
//!
//! Bundles application sources and their third-party dependencies into
//! deployable zip archives. Dependency archives are cached per function
//! and rebuilt only when the build inputs change.

pub mod archive;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod packer;
pub mod ui;

pub use error::{LiftError, LiftResult};
