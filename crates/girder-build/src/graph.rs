//! Build-graph construction
//!
//! Walks a package tree depth-first, submodules before the package
//! that owns them, matching source files against each target's
//! patterns and accumulating the flat rule map the serializer emits.
//! Construction is single-threaded and synchronous; the only mutable
//! state is the accumulator map threaded through the recursion.

use crate::error::{BuildError, BuildResult, Warning};
use crate::linker;
use crate::ninja;
use crate::rules::{self, Rule, RuleKind, RuleMap};

use girder_package::{LibTarget, Package};
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::HashSet;
use std::path::PathBuf;
use walkdir::WalkDir;

const INCLUDE_PREFIX: &str = "include/";

/// The generated rule map plus the non-fatal diagnostics recorded
/// while building it
#[derive(Debug)]
pub struct Ruleset {
    pub rules: RuleMap,
    pub warnings: Vec<Warning>,
}

/// Per-target precompiled source patterns, anchored to match whole
/// relative paths
#[derive(Debug)]
struct TargetPatterns {
    target: String,
    /// Rule-map key of the link/archive rule owning matched objects
    key: String,
    patterns: Vec<Regex>,
}

/// Builds the rule map for a package tree rooted at a filesystem
/// directory
pub struct GraphBuilder {
    root_dir: PathBuf,
    seen: HashSet<String>,
}

impl GraphBuilder {
    /// Create a builder for the build rooted at `root_dir`; package
    /// paths are interpreted relative to it
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            seen: HashSet::new(),
        }
    }

    /// Generate the full rule map for the tree rooted at `package`,
    /// dependency edges included
    pub fn generate(mut self, package: &Package) -> BuildResult<Ruleset> {
        let mut rules = RuleMap::new();
        let mut warnings = Vec::new();

        self.genrules(package, &mut rules, &mut warnings)?;
        linker::link_dependencies(package, &mut rules);

        Ok(Ruleset { rules, warnings })
    }

    fn genrules(
        &mut self,
        package: &Package,
        rules: &mut RuleMap,
        warnings: &mut Vec<Warning>,
    ) -> BuildResult<()> {
        // First registration wins; a duplicate contributes no rules
        if !self.seen.insert(package.name.clone()) {
            warnings.push(Warning::DuplicatePackage {
                name: package.name.clone(),
                path: rules::path_str(&package.path),
            });
            return Ok(());
        }

        // Submodules first: their rules must exist before this
        // package's rules reference them. Each submodule's map is
        // merged so cross-module key collisions can be reported
        // instead of silently overwritten.
        for module in &package.modules {
            let mut submap = RuleMap::new();
            self.genrules(module, &mut submap, warnings)?;

            for (key, rule) in submap {
                match rules.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(rule);
                    }
                    Entry::Occupied(slot) => {
                        if *slot.get() != rule {
                            warnings.push(Warning::RuleCollision {
                                output: slot.key().clone(),
                            });
                        }
                    }
                }
            }
        }

        let incdirs = include_dirs(package);

        // Register the link rules up front so the walk below can
        // append objects to them
        for bin in &package.bins {
            insert_rule(
                rules,
                &package.name,
                &bin.name,
                rules::binary_path(&bin.name),
                Rule::new(RuleKind::Exe),
            )?;
        }
        for lib in &package.libs {
            let kind = if lib.linkage.is_shared() {
                RuleKind::Lib
            } else {
                RuleKind::Arc
            };
            insert_rule(
                rules,
                &package.name,
                &lib.name,
                rules::lib_artifact_path(lib),
                Rule::new(kind),
            )?;

            if lib.linkage.is_shared() {
                register_symlinks(rules, &package.name, lib)?;
            }
        }

        let patterns = compile_patterns(package)?;
        self.walk_sources(package, &patterns, &incdirs, rules)
    }

    /// Walk the package's source tree, adding compile and staging
    /// rules for every claimed file
    fn walk_sources(
        &self,
        package: &Package,
        patterns: &[TargetPatterns],
        incdirs: &str,
        rules: &mut RuleMap,
    ) -> BuildResult<()> {
        let package_dir = self.root_dir.join(&package.path);
        if !package_dir.is_dir() {
            // Partial trees are common during incremental development
            return Ok(());
        }

        // Build outputs are never sources
        let build_dir = self.root_dir.join(ninja::BUILD_DIR);

        let walker = WalkDir::new(&package_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.path() != build_dir.as_path());

        for entry in walker.filter_map(|e| e.ok()) {
            let file_type = entry.file_type();
            if !file_type.is_file() && !file_type.is_symlink() {
                continue;
            }

            let relative = match entry.path().strip_prefix(&package_dir) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            let relative_str = rules::path_str(&relative);
            let source = rules::path_str(&package.path.join(&relative));

            // Public headers are staged into the build tree
            if relative_str.starts_with(INCLUDE_PREFIX) {
                insert_rule(
                    rules,
                    &package.name,
                    "include",
                    rules::staged_path(&relative_str),
                    Rule::new(RuleKind::Copy).with_input(source.clone()),
                )?;
            }

            for target in patterns {
                if !target.patterns.iter().any(|re| re.is_match(&relative_str)) {
                    continue;
                }

                let object = rules::object_path(&package.path.join(&relative));
                let compile = Rule::new(rules::compile_kind(&relative))
                    .with_input(source.clone())
                    .with_var("incdirs", incdirs);

                insert_rule(rules, &package.name, &target.target, object.clone(), compile)?;

                if let Some(owner) = rules.get_mut(&target.key) {
                    owner.push_input(object);
                }
            }
        }

        Ok(())
    }
}

/// Include-directory flags for a package: its own `src` and `include`
/// plus the public `include` of every direct submodule
fn include_dirs(package: &Package) -> String {
    let mut dirs = vec![
        format!("-I{}", rules::path_str(&package.path.join("src"))),
        format!("-I{}", rules::path_str(&package.path.join("include"))),
    ];
    for module in &package.modules {
        dirs.push(format!("-I{}", rules::path_str(&module.path.join("include"))));
    }
    dirs.join(" ")
}

/// Precompile every target's source patterns, anchored to whole-path
/// matches. A pattern that fails to compile is a fatal configuration
/// error.
fn compile_patterns(package: &Package) -> BuildResult<Vec<TargetPatterns>> {
    let mut compiled = Vec::new();

    for bin in &package.bins {
        compiled.push(TargetPatterns {
            target: bin.name.clone(),
            key: rules::binary_path(&bin.name),
            patterns: compile_target_patterns(&package.name, &bin.name, &bin.sources)?,
        });
    }
    for lib in &package.libs {
        compiled.push(TargetPatterns {
            target: lib.name.clone(),
            key: rules::lib_artifact_path(lib),
            patterns: compile_target_patterns(&package.name, &lib.name, &lib.sources)?,
        });
    }

    Ok(compiled)
}

fn compile_target_patterns(
    package: &str,
    target: &str,
    sources: &[String],
) -> BuildResult<Vec<Regex>> {
    sources
        .iter()
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$"))
                .map_err(|error| BuildError::bad_pattern(package, target, pattern, error))
        })
        .collect()
}

/// Register the version-symlink chain for a shared library:
/// full version <- major version <- unversioned
fn register_symlinks(rules: &mut RuleMap, package: &str, lib: &LibTarget) -> BuildResult<()> {
    if lib.version.is_empty() {
        return Ok(());
    }

    let full = rules::shared_lib_path(&lib.name, &lib.version);
    let major = lib.version.split('.').next().unwrap_or_default();

    if major == lib.version {
        // Single-component version: no intermediate link
        return insert_rule(
            rules,
            package,
            &lib.name,
            rules::shared_lib_path(&lib.name, ""),
            Rule::new(RuleKind::Ln).with_input(full),
        );
    }

    let major_path = rules::shared_lib_path(&lib.name, major);
    insert_rule(
        rules,
        package,
        &lib.name,
        major_path.clone(),
        Rule::new(RuleKind::Ln).with_input(full),
    )?;
    insert_rule(
        rules,
        package,
        &lib.name,
        rules::shared_lib_path(&lib.name, ""),
        Rule::new(RuleKind::Ln).with_input(major_path),
    )
}

/// Insert a rule, tolerating an identical existing entry (the same
/// source claimed by several targets) but rejecting a different rule
/// under the same output path
fn insert_rule(
    rules: &mut RuleMap,
    package: &str,
    target: &str,
    key: String,
    rule: Rule,
) -> BuildResult<()> {
    match rules.entry(key) {
        Entry::Vacant(slot) => {
            slot.insert(rule);
            Ok(())
        }
        Entry::Occupied(slot) => {
            if *slot.get() == rule {
                Ok(())
            } else {
                Err(BuildError::collision(package, target, slot.key().clone()))
            }
        }
    }
}
