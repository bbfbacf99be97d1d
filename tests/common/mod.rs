//! Shared test helpers for doctree integration tests.
//!
//! All tests use temp directories: each gets its own workspace via
//! `setup_workspace()` and drives the real binary against it.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// Create a workspace with `lerna.json` listing `packages/*` and one
/// directory per `(dir, name)` pair, each with a `package.json`.
pub fn setup_workspace(packages: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write(
        &dir.path().join("lerna.json"),
        r#"{ "packages": ["packages/*"], "version": "independent" }"#,
    );
    for (pkg_dir, name) in packages {
        write(
            &dir.path().join("packages").join(pkg_dir).join("package.json"),
            &format!(r#"{{ "name": "{name}", "version": "0.0.0" }}"#),
        );
    }
    dir
}

/// Write a file, creating parent directories.
pub fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().expect("path has parent")).expect("mkdir");
    std::fs::write(path, contents).expect("write file");
}

/// Absolute path of a file inside a package of the workspace.
pub fn src(root: &Path, pkg_dir: &str, file: &str) -> PathBuf {
    root.join("packages").join(pkg_dir).join(file)
}

/// A file node with one declaration per entry in `decls`.
pub fn file_node(path: &Path, decls: &[(&str, &str)]) -> serde_json::Value {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let children: Vec<serde_json::Value> = decls
        .iter()
        .map(|(decl, kind)| {
            serde_json::json!({ "name": decl, "kind": kind, "sourcePath": path })
        })
        .collect();
    serde_json::json!({
        "name": name,
        "kind": "external-module",
        "sourcePath": path,
        "children": children,
    })
}

/// Write a forest document with the given top-level nodes; returns its path.
pub fn write_forest(dir: &Path, nodes: Vec<serde_json::Value>) -> PathBuf {
    let path = dir.join("forest.json");
    let doc = serde_json::json!({ "name": "workspace", "children": nodes });
    write(&path, &serde_json::to_string_pretty(&doc).expect("serialize forest"));
    path
}

/// Run doctree in `dir` with the given args.
pub fn doctree_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_doctree"))
        .args(args)
        .current_dir(dir)
        .env_remove("DOCTREE_CWD")
        .env("DOCTREE_LOG", "warn")
        .stdin(Stdio::null())
        .output()
        .expect("failed to execute doctree")
}

/// Run doctree and assert it succeeds. Returns stdout as string.
pub fn doctree_ok(dir: &Path, args: &[&str]) -> String {
    let out = doctree_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "doctree {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run doctree and assert it fails. Returns stderr as string.
pub fn doctree_fails(dir: &Path, args: &[&str]) -> String {
    let out = doctree_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected doctree {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}

/// Names of the top-level nodes in a JSON forest.
pub fn top_level_names(forest: &serde_json::Value) -> Vec<String> {
    forest["children"]
        .as_array()
        .map(|children| {
            children
                .iter()
                .filter_map(|c| c["name"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}
