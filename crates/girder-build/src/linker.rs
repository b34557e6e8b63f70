//! Dependency linking pass
//!
//! Post-processes the accumulated rule map: every binary and library
//! rule gets an order-only prerequisite on each linked library that
//! resolves to a locally built artifact, plus a `-l` flag for every
//! link name. A link name with no local artifact is an external or
//! system library; it gets the flag only, and the miss is not an
//! error.

use crate::rules::{self, RuleMap};
use girder_package::Package;
use std::collections::HashSet;

/// Inject dependency edges and link flags for the whole tree.
///
/// Resolution recomputes the same naming functions the graph builder
/// registered artifacts under, so a hit is exactly "this name is
/// built locally". Duplicate package names are skipped with the same
/// first-wins rule the builder applies, so a duplicate never rewrites
/// the retained package's link line.
pub fn link_dependencies(package: &Package, rules: &mut RuleMap) {
    let mut seen = HashSet::new();
    link_package(package, rules, &mut seen);
}

fn link_package(package: &Package, rules: &mut RuleMap, seen: &mut HashSet<String>) {
    if !seen.insert(package.name.clone()) {
        return;
    }

    for module in &package.modules {
        link_package(module, rules, seen);
    }

    for bin in &package.bins {
        link_target(rules, rules::binary_path(&bin.name), &bin.links);
    }
    for lib in &package.libs {
        link_target(rules, rules::lib_artifact_path(lib), &lib.links);
    }
}

fn link_target(rules: &mut RuleMap, key: String, links: &[String]) {
    if links.is_empty() {
        return;
    }

    let mut deps = Vec::new();
    let mut flags = Vec::new();

    for link in links {
        let shared = rules::shared_lib_path(link, "");
        let archived = rules::static_lib_path(link);

        if rules.contains_key(&shared) {
            deps.push(shared);
        } else if rules.contains_key(&archived) {
            deps.push(archived);
        }
        flags.push(format!("-l{link}"));
    }

    if let Some(rule) = rules.get_mut(&key) {
        for dep in deps {
            rule.push_order_dep(dep);
        }
        rule.set_var("libs", flags.join(" "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{Rule, RuleKind};
    use girder_package::{BinTarget, LibTarget, Package};

    fn version(s: &str) -> semver::Version {
        semver::Version::parse(s).unwrap()
    }

    fn ruleset_with(keys: &[(&str, RuleKind)]) -> RuleMap {
        keys.iter()
            .map(|(key, kind)| (key.to_string(), Rule::new(*kind)))
            .collect()
    }

    #[test]
    fn test_local_link_adds_dependency_and_flag() {
        let mut rules = ruleset_with(&[
            ("${builddir}/bin/app${exeext}", RuleKind::Exe),
            ("${builddir}/lib/${libpfx}util${libext}", RuleKind::Ln),
        ]);

        let package = Package::new("app", version("0.1.0"))
            .with_bin(BinTarget::new("app").with_links(vec!["util".to_string()]));
        link_dependencies(&package, &mut rules);

        let app = rules.get("${builddir}/bin/app${exeext}").unwrap();
        assert_eq!(app.order_deps, vec!["${builddir}/lib/${libpfx}util${libext}"]);
        assert_eq!(
            app.vars,
            vec![("libs".to_string(), "-lutil".to_string())]
        );
    }

    #[test]
    fn test_external_link_gets_flag_only() {
        let mut rules = ruleset_with(&[("${builddir}/bin/app${exeext}", RuleKind::Exe)]);

        let package = Package::new("app", version("0.1.0"))
            .with_bin(BinTarget::new("app").with_links(vec!["m".to_string()]));
        link_dependencies(&package, &mut rules);

        let app = rules.get("${builddir}/bin/app${exeext}").unwrap();
        assert!(app.order_deps.is_empty());
        assert_eq!(app.vars, vec![("libs".to_string(), "-lm".to_string())]);
    }

    #[test]
    fn test_static_library_resolves_as_dependency() {
        let mut rules = ruleset_with(&[
            ("${builddir}/bin/app${exeext}", RuleKind::Exe),
            ("${builddir}/lib/${libpfx}core${arcext}", RuleKind::Arc),
        ]);

        let package = Package::new("app", version("0.1.0"))
            .with_bin(BinTarget::new("app").with_links(vec!["core".to_string()]));
        link_dependencies(&package, &mut rules);

        let app = rules.get("${builddir}/bin/app${exeext}").unwrap();
        assert_eq!(app.order_deps, vec!["${builddir}/lib/${libpfx}core${arcext}"]);
    }

    #[test]
    fn test_libraries_link_other_libraries() {
        let mut rules = ruleset_with(&[
            ("${builddir}/lib/${libpfx}hi${libext}.2.0.0", RuleKind::Lib),
            ("${builddir}/lib/${libpfx}lo${libext}", RuleKind::Ln),
        ]);

        let package = Package::new("tree", version("0.1.0")).with_lib(
            LibTarget::new("hi")
                .with_version("2.0.0")
                .with_links(vec!["lo".to_string()]),
        );
        link_dependencies(&package, &mut rules);

        let hi = rules.get("${builddir}/lib/${libpfx}hi${libext}.2.0.0").unwrap();
        assert_eq!(hi.order_deps, vec!["${builddir}/lib/${libpfx}lo${libext}"]);
        assert_eq!(hi.vars, vec![("libs".to_string(), "-llo".to_string())]);
    }

    #[test]
    fn test_duplicate_package_does_not_rewrite_retained_rule() {
        let mut rules = ruleset_with(&[("${builddir}/bin/app${exeext}", RuleKind::Exe)]);

        let package = Package::new("root", version("0.1.0"))
            .with_module(
                Package::new("app", version("0.1.0"))
                    .with_bin(BinTarget::new("app").with_links(vec!["m".to_string()])),
            )
            .with_module(
                Package::new("app", version("0.1.0"))
                    .with_path("elsewhere")
                    .with_bin(BinTarget::new("app").with_links(vec!["z".to_string()])),
            );
        link_dependencies(&package, &mut rules);

        let app = rules.get("${builddir}/bin/app${exeext}").unwrap();
        assert_eq!(app.vars, vec![("libs".to_string(), "-lm".to_string())]);
    }
}
