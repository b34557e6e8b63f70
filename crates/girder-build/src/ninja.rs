//! Build-graph serialization
//!
//! Renders the rule map into the textual graph files consumed by the
//! external executor: `build.ninja` for compilation and linking,
//! `install.ninja` for prefix installation and `package.ninja` for
//! distribution staging, all preceded by an include of the shared
//! rule-definitions fragment. Rendering iterates the map in key order,
//! so an unchanged tree serializes byte-identically.

use crate::error::{BuildError, BuildResult};
use crate::rules::{Rule, RuleKind, RuleMap};

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory the graph files and all artifacts are generated under
pub const BUILD_DIR: &str = "build";
/// Shared rule-definitions fragment, included by every graph file
pub const RULES_FILE: &str = "girder.ninja";
pub const BUILD_GRAPH: &str = "build.ninja";
pub const INSTALL_GRAPH: &str = "install.ninja";
pub const PACKAGE_GRAPH: &str = "package.ninja";

const OBJ_PREFIX: &str = "${builddir}/obj/";
const PREAMBLE: &str = "include girder.ninja\n\n";

/// The rule-definitions fragment: command templates, colors and path
/// variables shared by every emitted graph
pub const RULES_FRAGMENT: &str = concat!(
    r#"ninja_required_version = 1.3
builddir = build

objext = .o
arcext = .a
libext = .so
exeext =
libpfx = lib

"#,
    // terminal color variables used by rule descriptions
    "cblk = \u{1b}[30m\n",
    "cred = \u{1b}[31m\n",
    "cgrn = \u{1b}[32m\n",
    "cylw = \u{1b}[33m\n",
    "cblu = \u{1b}[34m\n",
    "cdef = \u{1b}[39m\n",
    "crst = \u{1b}[0m\n",
    r#"
cc  = cc
cxx = c++
ar  = ar

cflags   = -std=c11 -fpic -g -O2
cxxflags = -std=c++17 -fpic -g -O2
ldflags  = -O2 -L$builddir/lib -Wl,-rpath,$builddir/lib

rule cxx
  command = $cxx -MMD -MT $out -MF $out.d $cxxflags $incdirs -c -o $out $in
  description = ${cylw}CXX${crst} ${cgrn}$out${crst}
  depfile = $out.d
  deps = gcc

rule cc
  command = $cc -MMD -MT $out -MF $out.d $cflags $incdirs -c -o $out $in
  description = ${cylw}CC${crst}  ${cgrn}$out${crst}
  depfile = $out.d
  deps = gcc

rule lnk
  command = ld -r -o $out $in
  description = ${cylw}LNK${crst} ${cblu}$out${crst}

rule lib
  command = $cxx -fPIC $ldflags -shared -o $out $in -Wl,--start-group $libs -Wl,--end-group
  description = ${cylw}LIB${crst} ${cblu}$out${crst}

rule arc
  command = $ar rcs $out $in
  description = ${cylw}ARC${crst} ${cblu}$out${crst}

rule exe
  command = $cxx -fPIC $ldflags -o $out $in -Wl,--start-group $libs -Wl,--end-group
  description = ${cylw}EXE${crst} ${cblu}$out${crst}

rule ln
  command = ln -sf $$(basename $in) $out
  description = ${cylw}LN${crst}  ${cblu}$out${crst}

rule copy
  command = cp -p $in $out
  description = ${cylw}CP${crst}  $out

rule insfil
  command = install -D -m 0644 $in $out
  description = ${cylw}INS${crst} $out

rule inslib
  command = install -D -m 0755 $in $out
  description = ${cylw}INS${crst} $out

rule insexe
  command = install -D -m 0755 $in $out
  description = ${cylw}INS${crst} $out

rule packg
  command = install -D $source $out
  description = ${cylw}PKG${crst} $out
"#
);

/// Render the build graph
pub fn render_build(rules: &RuleMap) -> String {
    let mut out = String::from(PREAMBLE);

    for (output, rule) in rules {
        render_rule(&mut out, output, rule);
    }

    out
}

/// Render the install graph: every installable output copied to a
/// prefix-relative path, the install rule selected by output suffix
pub fn render_install(rules: &RuleMap) -> String {
    let mut out = String::from("include girder.ninja\nprefix = /usr/local\n\n");

    for output in rules.keys().filter(|output| installable(output)) {
        let installed = output.replacen("${builddir}", "${prefix}", 1);
        let _ = writeln!(out, "build {installed}: {} {output}", install_kind(output));
    }

    out
}

/// Render the package graph: every installable output staged into the
/// distribution tree with its source and folder recorded
pub fn render_package(rules: &RuleMap) -> String {
    let mut out = String::from("include girder.ninja\npkgdir = ${builddir}/pkg\n\n");

    for output in rules.keys().filter(|output| installable(output)) {
        let staged = output.replacen("${builddir}", "${pkgdir}", 1);
        let _ = writeln!(out, "build {staged}: packg {output}");
        let _ = writeln!(out, "  source = {output}");
        let _ = writeln!(out, "  folder = {}", folder_of(output));
    }

    out
}

fn render_rule(out: &mut String, output: &str, rule: &Rule) {
    let _ = write!(out, "build {output}: {}", rule.kind);
    for input in &rule.inputs {
        let _ = write!(out, " {input}");
    }
    if !rule.order_deps.is_empty() {
        let _ = write!(out, " |");
        for dep in &rule.order_deps {
            let _ = write!(out, " {dep}");
        }
    }
    out.push('\n');

    for (key, value) in &rule.vars {
        if value.is_empty() {
            let _ = writeln!(out, "  {key} =");
        } else {
            let _ = writeln!(out, "  {key} = {value}");
        }
    }
}

/// Object files are intermediate and never installed
fn installable(output: &str) -> bool {
    !output.starts_with(OBJ_PREFIX)
}

fn install_kind(output: &str) -> RuleKind {
    if output.contains("${libext}") {
        RuleKind::InsLib
    } else if output.ends_with("${exeext}") {
        RuleKind::InsExe
    } else {
        RuleKind::InsFil
    }
}

/// Prefix-relative folder an output lives in, for packaging metadata
fn folder_of(output: &str) -> String {
    let relative = output.strip_prefix("${builddir}/").unwrap_or(output);
    match Path::new(relative).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            parent.to_string_lossy().into_owned()
        }
        _ => ".".to_string(),
    }
}

/// Writes the rule-definitions fragment and the three graph files
/// under a build directory
pub struct NinjaWriter {
    build_dir: PathBuf,
}

impl NinjaWriter {
    /// Create a writer targeting the given build directory
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    /// Path of the main build graph file
    pub fn build_graph_path(&self) -> PathBuf {
        self.build_dir.join(BUILD_GRAPH)
    }

    /// Path of the install graph file
    pub fn install_graph_path(&self) -> PathBuf {
        self.build_dir.join(INSTALL_GRAPH)
    }

    /// Path of the package graph file
    pub fn package_graph_path(&self) -> PathBuf {
        self.build_dir.join(PACKAGE_GRAPH)
    }

    /// Write the rules fragment and all three graphs
    pub fn write_all(&self, rules: &RuleMap) -> BuildResult<()> {
        fs::create_dir_all(&self.build_dir)
            .map_err(|e| BuildError::io(&self.build_dir, e))?;

        self.write(&self.build_dir.join(RULES_FILE), RULES_FRAGMENT)?;
        self.write(&self.build_graph_path(), &render_build(rules))?;
        self.write(&self.install_graph_path(), &render_install(rules))?;
        self.write(&self.package_graph_path(), &render_package(rules))?;

        Ok(())
    }

    fn write(&self, path: &Path, content: &str) -> BuildResult<()> {
        fs::write(path, content).map_err(|e| BuildError::io(path, e))
    }
}
