//! CLI integration tests
//!
//! Drive the girder binary against scratch projects. The executor is
//! stubbed through the NINJA environment variable so no real
//! compilation happens.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const MANIFEST: &str = r#"
name = "app"
version = "0.1.0"

[[bin]]
name = "app"
sources = ['src/main\.cpp']
links = ["util"]

[[module]]
name = "util"
version = "1.2.0"
path = "deps/util"

[[module.lib]]
name = "util"
sources = ['src/util\.cpp']
"#;

fn scratch_project() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("girder.toml"), MANIFEST).unwrap();
    for (path, content) in [
        ("src/main.cpp", "int main() { return 0; }\n"),
        ("deps/util/src/util.cpp", "int util() { return 1; }\n"),
    ] {
        let full = dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }
    dir
}

fn girder() -> Command {
    Command::cargo_bin("girder").unwrap()
}

#[test]
fn test_configure_emits_graph_files() {
    let dir = scratch_project();

    girder()
        .args(["configure", "--root"])
        .arg(dir.path())
        .assert()
        .success();

    let graph = fs::read_to_string(dir.path().join("build/build.ninja")).unwrap();
    assert!(graph.contains("build ${builddir}/bin/app${exeext}: exe"));
    assert!(graph.contains("libs = -lutil"));
    assert!(dir.path().join("build/girder.ninja").exists());
    assert!(dir.path().join("build/install.ninja").exists());
    assert!(dir.path().join("build/package.ninja").exists());
}

#[test]
fn test_missing_manifest_fails_with_context() {
    let dir = tempfile::tempdir().unwrap();

    girder()
        .args(["configure", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("girder.toml"));
}

#[test]
fn test_discover_mode_needs_no_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("util/src/util.cpp");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(source, "int util() { return 1; }\n").unwrap();

    girder()
        .args(["configure", "--discover", "--root"])
        .arg(dir.path())
        .assert()
        .success();

    let graph = fs::read_to_string(dir.path().join("build/build.ninja")).unwrap();
    assert!(graph.contains("${libpfx}util${libext}"));
}

#[test]
fn test_build_propagates_executor_exit_code() {
    let dir = scratch_project();

    girder()
        .args(["build", "--root"])
        .arg(dir.path())
        .env("NINJA", "true")
        .assert()
        .success();

    girder()
        .args(["build", "--root"])
        .arg(dir.path())
        .env("NINJA", "false")
        .assert()
        .code(1);
}

#[test]
fn test_default_command_is_build() {
    let dir = scratch_project();

    girder()
        .arg("--root")
        .arg(dir.path())
        .env("NINJA", "true")
        .assert()
        .success();

    assert!(dir.path().join("build/build.ninja").exists());
}

#[test]
fn test_bad_pattern_reports_package_and_target() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("girder.toml"),
        r#"
name = "broken"
version = "0.1.0"

[[bin]]
name = "tool"
sources = ['src/(']
"#,
    )
    .unwrap();

    girder()
        .args(["configure", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("tool"))
        .stderr(predicate::str::contains("broken"));
}
