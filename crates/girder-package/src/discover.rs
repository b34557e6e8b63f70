//! Directory-based package auto-discovery
//!
//! Optional front-end for trees without a manifest: any directory
//! containing a `src` or `include` folder is taken to be a package,
//! named after the directory. Each discovered package gets a single
//! shared library target whose source patterns are the literal
//! relative paths of its C/C++ sources. `build` directories are never
//! descended into, and `*_test.*` files are excluded from library
//! sources.

use crate::error::{PackageResult, Warning};
use crate::package::{LibTarget, Package};

use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

const SRC_DIR: &str = "src";
const INCLUDE_DIR: &str = "include";
const BUILD_DIR: &str = "build";
const TEST_SUFFIX: &str = "_test";

const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "C", "c++", "cxx", "c"];

/// Options for package discovery
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    /// Name for the synthesized root package; defaults to the root
    /// directory's file name
    pub root_name: Option<String>,
    /// Version assigned to discovered packages
    pub version: semver::Version,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self {
            root_name: None,
            version: semver::Version::new(0, 0, 0),
        }
    }
}

/// Discover packages under `root` with default options
pub fn discover(root: &Path) -> PackageResult<(Package, Vec<Warning>)> {
    discover_with(root, DiscoverOptions::default())
}

/// Discover packages under `root`.
///
/// Returns a synthesized root package owning every discovered package
/// as a module, together with the warnings recorded along the way.
/// A package found at the root itself contributes its targets to the
/// root package directly.
pub fn discover_with(
    root: &Path,
    options: DiscoverOptions,
) -> PackageResult<(Package, Vec<Warning>)> {
    let mut names = HashSet::new();
    let mut warnings = Vec::new();
    let mut projects = Vec::new();

    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != BUILD_DIR);

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable entries are skipped, not fatal
            Err(_) => continue,
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        let base = entry.file_name().to_string_lossy();
        if base != SRC_DIR && base != INCLUDE_DIR {
            continue;
        }

        let package_dir = match entry.path().parent() {
            Some(parent) => parent.to_path_buf(),
            None => continue,
        };

        // An include folder next to a src folder belongs to the same
        // package; the src folder already claims it.
        if base == INCLUDE_DIR && package_dir.join(SRC_DIR).is_dir() {
            walker.skip_current_dir();
            continue;
        }

        walker.skip_current_dir();

        let name = package_name(&package_dir, root);
        let path = package_dir
            .strip_prefix(root)
            .unwrap_or(&package_dir)
            .to_path_buf();

        if !names.insert(name.clone()) {
            warnings.push(Warning::DuplicatePackage {
                name,
                path: path.to_string_lossy().into_owned(),
            });
            continue;
        }

        let sources = find_sources(&package_dir);
        let package = Package::new(&name, options.version.clone())
            .with_path(path)
            .with_lib(
                LibTarget::new(&name)
                    .with_sources(sources)
                    .with_version(options.version.to_string()),
            );
        projects.push(package);
    }

    let root_name = options
        .root_name
        .clone()
        .unwrap_or_else(|| package_name(root, root));

    let mut tree = Package::new(root_name, options.version);
    for project in projects {
        if project.path.as_os_str().is_empty() {
            // The root directory itself is a package; lift its
            // targets instead of nesting a module with an empty path.
            tree.name = project.name;
            tree.libs.extend(project.libs);
            tree.bins.extend(project.bins);
        } else {
            tree.modules.push(project);
        }
    }

    Ok((tree, warnings))
}

/// Name a package after its directory
fn package_name(dir: &Path, root: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| {
            root.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "root".to_string())
        })
}

/// Collect library source patterns for a package: literal relative
/// paths of every C/C++ file under `src`, test files excluded
fn find_sources(package_dir: &Path) -> Vec<String> {
    let src_dir = package_dir.join(SRC_DIR);
    if !src_dir.is_dir() {
        return Vec::new();
    }

    let mut sources = Vec::new();

    for entry in WalkDir::new(&src_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => {}
            _ => continue,
        }

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if stem.ends_with(TEST_SUFFIX) {
            continue;
        }

        if let Ok(relative) = path.strip_prefix(package_dir) {
            sources.push(regex::escape(&relative.to_string_lossy()));
        }
    }

    sources
}
