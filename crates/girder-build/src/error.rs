//! Build-graph construction error types

use std::path::PathBuf;
use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Invalid source pattern '{pattern}' on target '{target}' in package '{package}': {error}")]
    BadPattern {
        package: String,
        target: String,
        pattern: String,
        error: regex::Error,
    },

    #[error("Output '{output}' already produced by another rule (while processing target '{target}' of package '{package}')")]
    OutputCollision {
        package: String,
        target: String,
        output: String,
    },

    #[error("I/O error at {path}: {error}")]
    IoError {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to launch build executor '{executor}': {error}")]
    ExecutorSpawn {
        executor: String,
        error: std::io::Error,
    },
}

impl BuildError {
    /// Create a bad-pattern error with target context
    pub fn bad_pattern(
        package: impl Into<String>,
        target: impl Into<String>,
        pattern: impl Into<String>,
        error: regex::Error,
    ) -> Self {
        Self::BadPattern {
            package: package.into(),
            target: target.into(),
            pattern: pattern.into(),
            error,
        }
    }

    /// Create an output-collision error with target context
    pub fn collision(
        package: impl Into<String>,
        target: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::OutputCollision {
            package: package.into(),
            target: target.into(),
            output: output.into(),
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

/// A non-fatal diagnostic recorded during graph construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("package '{name}' at '{path}' already registered, ignoring")]
    DuplicatePackage { name: String, path: String },

    #[error("output '{output}' already produced by another module, skipping conflicting rule")]
    RuleCollision { output: String },
}
