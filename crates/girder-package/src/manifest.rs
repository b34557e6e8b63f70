//! Manifest parsing and conversion to the package tree (girder.toml)
//!
//! The manifest is the declarative front-end for describing a build:
//! one document per tree, with nested `[[module]]` tables for
//! sub-packages. It is parsed once at startup and converted into an
//! immutable [`Package`] tree.

use crate::error::{PackageError, PackageResult};
use crate::package::{BinTarget, LibTarget, Linkage, Package};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional manifest file name
pub const MANIFEST_FILE: &str = "girder.toml";

/// Root manifest document (girder.toml)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub name: String,
    pub version: semver::Version,
    /// Path relative to the build root; defaults to the package name
    /// for nested modules and to the empty path for the root
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default, rename = "lib")]
    pub libs: Vec<ManifestLib>,
    #[serde(default, rename = "bin")]
    pub bins: Vec<ManifestBin>,
    #[serde(default, rename = "module")]
    pub modules: Vec<Manifest>,
}

/// A `[[lib]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestLib {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    /// Linkage version; defaults to the owning package's version
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub linkage: Option<Linkage>,
}

/// A `[[bin]]` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestBin {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl Manifest {
    /// Parse a manifest from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a manifest from a file
    pub fn from_file(path: &Path) -> PackageResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PackageError::manifest_read(path, e))?;
        Ok(Self::from_str(&content)?)
    }

    /// Serialize back to a TOML string
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Convert into the package tree. The root package keeps an empty
    /// path; nested modules default their path to their name.
    pub fn into_package(self) -> PackageResult<Package> {
        let package = self.into_package_at(PathBuf::new());
        package
            .validate()
            .map_err(PackageError::InvalidPackage)?;
        Ok(package)
    }

    fn into_package_at(self, default_path: PathBuf) -> Package {
        let version = self.version;
        let path = self.path.unwrap_or(default_path);

        let libs = self
            .libs
            .into_iter()
            .map(|lib| LibTarget {
                name: lib.name,
                sources: lib.sources,
                links: lib.links,
                version: lib.version.unwrap_or_else(|| version.to_string()),
                linkage: lib.linkage.unwrap_or(Linkage::Shared),
            })
            .collect();

        let bins = self
            .bins
            .into_iter()
            .map(|bin| BinTarget {
                name: bin.name,
                sources: bin.sources,
                links: bin.links,
            })
            .collect();

        let modules = self
            .modules
            .into_iter()
            .map(|module| {
                let default = PathBuf::from(&module.name);
                module.into_package_at(default)
            })
            .collect();

        Package {
            path,
            name: self.name,
            version,
            modules,
            libs,
            bins,
        }
    }
}
