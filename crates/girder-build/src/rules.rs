//! Build rule map and artifact naming conventions
//!
//! The rule map is the in-memory form of the emitted build graph: a
//! mapping from output-artifact path to the rule that produces it.
//! Keys are rendered with the executor's `${...}` variables left
//! intact; the shared rules fragment defines them. A `BTreeMap` keys
//! the map so serialization order is total and stable.

use girder_package::{LibTarget, Linkage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Rule vocabulary understood by the downstream executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Compile a C++ translation unit
    Cxx,
    /// Compile a C translation unit
    Cc,
    /// Combine objects into a single relinkable object
    Lnk,
    /// Link a shared library
    Lib,
    /// Archive a static library
    Arc,
    /// Link an executable
    Exe,
    /// Versioning symlink
    Ln,
    /// Stage a file into the build tree
    Copy,
    /// Install a plain file
    InsFil,
    /// Install a library
    InsLib,
    /// Install an executable
    InsExe,
    /// Stage an artifact for distribution
    Packg,
}

impl RuleKind {
    /// The keyword spelling used in the emitted graph files
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Cxx => "cxx",
            Self::Cc => "cc",
            Self::Lnk => "lnk",
            Self::Lib => "lib",
            Self::Arc => "arc",
            Self::Exe => "exe",
            Self::Ln => "ln",
            Self::Copy => "copy",
            Self::InsFil => "insfil",
            Self::InsLib => "inslib",
            Self::InsExe => "insexe",
            Self::Packg => "packg",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One build-graph edge: the rule kind producing an output, its
/// inputs, its order-only prerequisites and its variable block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub kind: RuleKind,
    pub inputs: Vec<String>,
    /// Order-only prerequisites: must exist before this rule runs but
    /// do not themselves trigger a rebuild
    pub order_deps: Vec<String>,
    /// Variable block, emitted indented under the rule line
    pub vars: Vec<(String, String)>,
}

impl Rule {
    /// Create an empty rule of the given kind
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            inputs: Vec::new(),
            order_deps: Vec::new(),
            vars: Vec::new(),
        }
    }

    /// Add an input
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.inputs.push(input.into());
        self
    }

    /// Add a variable
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.push((key.into(), value.into()));
        self
    }

    /// Append an input unless already present
    pub fn push_input(&mut self, input: String) {
        if !self.inputs.contains(&input) {
            self.inputs.push(input);
        }
    }

    /// Append an order-only prerequisite unless already present
    pub fn push_order_dep(&mut self, dep: String) {
        if !self.order_deps.contains(&dep) {
            self.order_deps.push(dep);
        }
    }

    /// Set a variable, replacing any previous value for the key
    pub fn set_var(&mut self, key: &str, value: String) {
        if let Some(entry) = self.vars.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            self.vars.push((key.to_string(), value));
        }
    }
}

/// Mapping from output-artifact path to the rule that produces it,
/// iterated in key order for deterministic serialization
pub type RuleMap = BTreeMap<String, Rule>;

const CXX_SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc", "C", "c++", "cxx"];

/// Select the compile rule kind for a source file by extension:
/// `cc` for C sources, `cxx` otherwise
pub fn compile_kind(source: &Path) -> RuleKind {
    match source.extension().and_then(|e| e.to_str()) {
        Some("c") => RuleKind::Cc,
        Some(ext) if CXX_SOURCE_EXTENSIONS.contains(&ext) => RuleKind::Cxx,
        _ => RuleKind::Cxx,
    }
}

/// Render a path into the forward-slash string form used in rule keys
pub fn path_str(path: &Path) -> String {
    let rendered = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rendered.into_owned()
    } else {
        rendered.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Object output path for a source file given relative to the
/// whole-build root, with the source extension stripped
pub fn object_path(source: &Path) -> String {
    format!("${{builddir}}/obj/{}${{objext}}", path_str(&source.with_extension("")))
}

/// Shared library output path; `version` empty yields the unversioned
/// name used as the link-resolution key
pub fn shared_lib_path(name: &str, version: &str) -> String {
    if version.is_empty() {
        format!("${{builddir}}/lib/${{libpfx}}{name}${{libext}}")
    } else {
        format!("${{builddir}}/lib/${{libpfx}}{name}${{libext}}.{version}")
    }
}

/// Static library output path
pub fn static_lib_path(name: &str) -> String {
    format!("${{builddir}}/lib/${{libpfx}}{name}${{arcext}}")
}

/// Binary output path
pub fn binary_path(name: &str) -> String {
    format!("${{builddir}}/bin/{name}${{exeext}}")
}

/// Build-tree staging path for a file given relative to its package
/// root (public headers land under `${builddir}/include/...`)
pub fn staged_path(relative: &str) -> String {
    format!("${{builddir}}/{relative}")
}

/// The artifact path a library target links/archives into. The
/// dependency linker resolves link names by recomputing this same
/// function, so it must stay consistent with registration.
pub fn lib_artifact_path(lib: &LibTarget) -> String {
    match lib.linkage {
        Linkage::Shared => shared_lib_path(&lib.name, &lib.version),
        Linkage::Static => static_lib_path(&lib.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_rule_kind_keywords() {
        assert_eq!(RuleKind::Cxx.keyword(), "cxx");
        assert_eq!(RuleKind::Cc.keyword(), "cc");
        assert_eq!(RuleKind::Lib.keyword(), "lib");
        assert_eq!(RuleKind::Arc.keyword(), "arc");
        assert_eq!(RuleKind::Exe.keyword(), "exe");
        assert_eq!(RuleKind::Ln.keyword(), "ln");
        assert_eq!(RuleKind::InsLib.keyword(), "inslib");
        assert_eq!(RuleKind::Packg.keyword(), "packg");
    }

    #[test]
    fn test_object_path_strips_extension() {
        assert_eq!(
            object_path(&PathBuf::from("deps/util/src/util.cpp")),
            "${builddir}/obj/deps/util/src/util${objext}"
        );
    }

    #[test]
    fn test_shared_lib_path_versioning() {
        assert_eq!(
            shared_lib_path("util", "1.2.0"),
            "${builddir}/lib/${libpfx}util${libext}.1.2.0"
        );
        assert_eq!(
            shared_lib_path("util", ""),
            "${builddir}/lib/${libpfx}util${libext}"
        );
    }

    #[test]
    fn test_static_and_binary_paths() {
        assert_eq!(static_lib_path("core"), "${builddir}/lib/${libpfx}core${arcext}");
        assert_eq!(binary_path("app"), "${builddir}/bin/app${exeext}");
    }

    #[test]
    fn test_compile_kind_by_extension() {
        assert_eq!(compile_kind(Path::new("a.c")), RuleKind::Cc);
        assert_eq!(compile_kind(Path::new("a.cpp")), RuleKind::Cxx);
        assert_eq!(compile_kind(Path::new("a.cc")), RuleKind::Cxx);
        assert_eq!(compile_kind(Path::new("a.cxx")), RuleKind::Cxx);
    }

    #[test]
    fn test_rule_push_input_dedupes() {
        let mut rule = Rule::new(RuleKind::Exe);
        rule.push_input("a.o".to_string());
        rule.push_input("a.o".to_string());
        rule.push_input("b.o".to_string());
        assert_eq!(rule.inputs, vec!["a.o", "b.o"]);
    }

    #[test]
    fn test_rule_set_var_replaces() {
        let mut rule = Rule::new(RuleKind::Exe);
        rule.set_var("libs", "-la".to_string());
        rule.set_var("libs", "-lb".to_string());
        assert_eq!(rule.vars, vec![("libs".to_string(), "-lb".to_string())]);
    }

    #[test]
    fn test_lib_artifact_path_by_linkage() {
        use girder_package::LibTarget;

        let shared = LibTarget::new("util").with_version("1.2.0");
        assert_eq!(
            lib_artifact_path(&shared),
            "${builddir}/lib/${libpfx}util${libext}.1.2.0"
        );

        let fixed = LibTarget::new("core").with_linkage(Linkage::Static);
        assert_eq!(lib_artifact_path(&fixed), "${builddir}/lib/${libpfx}core${arcext}");
    }
}
