//! Package model error types

use std::path::PathBuf;
use thiserror::Error;

pub type PackageResult<T> = Result<T, PackageError>;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("Failed to read manifest at {path}: {error}")]
    ManifestReadError { path: PathBuf, error: String },

    #[error("Invalid manifest: {0}")]
    ManifestParseError(#[from] toml::de::Error),

    #[error("Invalid package configuration: {0}")]
    InvalidPackage(String),

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PackageError {
    /// Create a manifest read error
    pub fn manifest_read(path: impl Into<PathBuf>, error: impl ToString) -> Self {
        Self::ManifestReadError {
            path: path.into(),
            error: error.to_string(),
        }
    }

    /// Create an I/O error with path context
    pub fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            error,
        }
    }
}

/// A non-fatal diagnostic recorded while assembling a package tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("package '{name}' at '{path}' already found, ignoring")]
    DuplicatePackage { name: String, path: String },
}
