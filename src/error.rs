//! Error types for lambda-lift
//!
//! All modules use `LiftResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for lambda-lift operations
pub type LiftResult<T> = Result<T, LiftError>;

/// All errors that can occur in lambda-lift
#[derive(Error, Debug)]
pub enum LiftError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("No lambda-lift configuration found under {0}")]
    ConfigNotFound(PathBuf),

    #[error("Lambda name {name:?} is defined by both {first} and {second}")]
    NameCollision {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Lambda not found: {0}")]
    LambdaNotFound(String),

    // Dependency resolution errors
    #[error("Dependency installation failed: {command}, stderr: {stderr}")]
    DependencyInstall { command: String, stderr: String },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Archive errors
    #[error("Archive error: {context}")]
    Archive {
        context: String,
        #[source]
        source: zip::result::ZipError,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Invalid path: {path}: {reason}")]
    PathInvalid { path: PathBuf, reason: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LiftError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an archive error with context
    pub fn archive(context: impl Into<String>, source: zip::result::ZipError) -> Self {
        Self::Archive {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config_invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => {
                Some("Create a lambda-lift.toml next to your function sources, or pass --root")
            }
            Self::NameCollision { .. } => {
                Some("Set a unique `name` in the [general] section of one of the files")
            }
            Self::LambdaNotFound(_) => Some("Run: lambda-lift list"),
            Self::DependencyInstall { .. } => {
                Some("Check requirements.txt and that pip is available for python_executable")
            }
            Self::CommandFailed { .. } => Some("Is the Python interpreter installed and on PATH?"),
            _ => None,
        }
    }
}
