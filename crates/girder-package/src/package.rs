//! Package tree and build target declarations
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a library artifact is linked, affecting its output naming
/// and versioning scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Linkage {
    /// Shared object with a dotted version suffix and symlink chain
    Shared,
    /// Static archive, unversioned
    Static,
}

impl Linkage {
    /// Whether this linkage produces a versioned symlink chain
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }
}

impl std::fmt::Display for Linkage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Static => write!(f, "static"),
        }
    }
}

/// A library target declared by a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibTarget {
    /// Library name, without platform prefix or extension
    pub name: String,
    /// Source patterns, each a regex matched against a file path
    /// relative to the owning package's root
    pub sources: Vec<String>,
    /// Names of libraries to link against (local or system)
    pub links: Vec<String>,
    /// Linkage version suffix, e.g. "1.2.0"; empty for unversioned
    pub version: String,
    /// Shared or static linkage
    pub linkage: Linkage,
}

impl LibTarget {
    /// Create a new shared, unversioned library target
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            links: Vec::new(),
            version: String::new(),
            linkage: Linkage::Shared,
        }
    }

    /// Set source patterns
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Set link names
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }

    /// Set the linkage version
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the linkage kind
    pub fn with_linkage(mut self, linkage: Linkage) -> Self {
        self.linkage = linkage;
        self
    }
}

/// A binary target declared by a package
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinTarget {
    /// Executable name, without platform extension
    pub name: String,
    /// Source patterns, each a regex matched against a file path
    /// relative to the owning package's root
    pub sources: Vec<String>,
    /// Names of libraries to link against (local or system)
    pub links: Vec<String>,
}

impl BinTarget {
    /// Create a new binary target
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sources: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Set source patterns
    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    /// Set link names
    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = links;
        self
    }
}

/// A named, versioned unit of source code with its own root directory,
/// potentially containing nested sub-packages.
///
/// Packages form a tree owned top-down; the root package has an empty
/// relative path and is passed explicitly wherever it is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    /// Filesystem path relative to the whole-build root; empty for
    /// the root package
    pub path: PathBuf,
    /// Package name, unique within a build
    pub name: String,
    /// Package version
    pub version: semver::Version,
    /// Child packages
    pub modules: Vec<Package>,
    /// Library targets
    pub libs: Vec<LibTarget>,
    /// Binary targets
    pub bins: Vec<BinTarget>,
}

impl Package {
    /// Create a new package with an empty path
    pub fn new(name: impl Into<String>, version: semver::Version) -> Self {
        Self {
            path: PathBuf::new(),
            name: name.into(),
            version,
            modules: Vec::new(),
            libs: Vec::new(),
            bins: Vec::new(),
        }
    }

    /// Set the path relative to the build root
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Add a child package
    pub fn with_module(mut self, module: Package) -> Self {
        self.modules.push(module);
        self
    }

    /// Add a library target
    pub fn with_lib(mut self, lib: LibTarget) -> Self {
        self.libs.push(lib);
        self
    }

    /// Add a binary target
    pub fn with_bin(mut self, bin: BinTarget) -> Self {
        self.bins.push(bin);
        self
    }

    /// Validate the package and its subtree
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Package name cannot be empty".to_string());
        }

        for lib in &self.libs {
            if lib.name.is_empty() {
                return Err(format!("Package '{}' has a library with no name", self.name));
            }
        }
        for bin in &self.bins {
            if bin.name.is_empty() {
                return Err(format!("Package '{}' has a binary with no name", self.name));
            }
        }

        for module in &self.modules {
            module.validate()?;
        }

        Ok(())
    }

    /// Total number of packages in the subtree, this one included
    pub fn count(&self) -> usize {
        1 + self.modules.iter().map(Package::count).sum::<usize>()
    }
}
