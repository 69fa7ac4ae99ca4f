//! Edge case and error handling tests for gofunc


use assert_cmd::Command;
use harness::{GoTree, run_gofunc};
use predicates::prelude::*;

fn gofunc(tree: &GoTree) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gofunc"));
    cmd.current_dir(tree.path())
        .env_remove("GOROOT")
        .env_remove("GOFUNC_PKG_ROOT")
        .env_remove("FORCE_COLOR")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Usage Errors
// ============================================================================

#[test]
fn test_dump_conflicts_with_package() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["--dump", "app", "fmt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_all_fields_requires_dump() {
    let tree = GoTree::new();
    gofunc(&tree).args(["--all-fields", "app"]).assert().code(2);
}

#[test]
fn test_too_many_arguments() {
    let tree = GoTree::new();
    gofunc(&tree).args(["app", "fmt", "extra"]).assert().code(2);
}

#[test]
fn test_invalid_exclude_pattern() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["-I", "[", "app"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gofunc: invalid --exclude pattern"));
}

// ============================================================================
// Package Root Errors
// ============================================================================

#[test]
fn test_missing_pkg_root() {
    let tree = GoTree::new();
    gofunc(&tree)
        .arg("app")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("gofunc: no package root"));
}

#[test]
fn test_empty_goroot_is_not_a_root() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["app"])
        .env("GOROOT", "")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no package root"));
}

#[test]
fn test_unknown_import_aborts() {
    let tree = GoTree::new();
    tree.add_file("third/main.go", "package main\n\nimport \"github.com/x/y\"\n");

    gofunc(&tree)
        .args(["third", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gofunc: cannot read directory").and(predicate::str::contains("github.com")));
}

#[test]
fn test_missing_base_directory() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["nowhere", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nowhere"));
}

#[test]
fn test_base_path_is_a_file() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["--dump", "app/main.go"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read directory"));
}

// ============================================================================
// Syntax Errors
// ============================================================================

#[test]
fn test_syntax_error_names_file_and_line() {
    let tree = GoTree::new();
    tree.add_file("src/broken/b.go", "package broken\n\nfunc F() {\n\tx := \n}\n");

    gofunc(&tree)
        .args([".", "broken", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .code(1)
        .stderr(predicate::str::is_match(r"gofunc: .*b\.go:\d+:\d+: ").unwrap());
}

#[test]
fn test_error_after_imports_does_not_stop_import_listing() {
    let tree = GoTree::new();
    tree.add_file(
        "half/main.go",
        "package main\n\nimport \"strings\"\n\nfunc main() {\n\tstrings.Split(\n}\n",
    );

    gofunc(&tree)
        .args(["half", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Join\nSplit\n");
}

#[test]
fn test_dump_reports_syntax_error() {
    let tree = GoTree::new();
    tree.add_file("bad/main.go", "package main\n\nfunc main( {\n}\n");

    gofunc(&tree)
        .args(["--dump", "bad"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("main.go:"));
}

// ============================================================================
// File Selection
// ============================================================================

#[test]
fn test_test_files_are_skipped() {
    let tree = GoTree::new();
    tree.add_file("src/strings/strings_test.go", "package strings\n\nfunc TestSplit() {\n}\n");

    let src = tree.src();
    let (stdout, _stderr, success) = run_gofunc(tree.path(), &[".", "strings", "--pkg-root", src.to_str().unwrap()]);
    assert!(success);
    assert!(!stdout.contains("TestSplit"), "{}", stdout);
}

#[test]
fn test_exclude_pattern() {
    let tree = GoTree::new();
    tree.add_file("src/strings/zz_generated.go", "package strings\n\nfunc Generated() {\n}\n");

    gofunc(&tree)
        .args([".", "strings", "-I", "zz_*.go", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Join\nSplit\n");
}

#[test]
fn test_subdirectories_are_not_scanned() {
    let tree = GoTree::new();
    tree.add_file("src/strings/internal/x.go", "package internal\n\nfunc Hidden() {\n}\n");

    gofunc(&tree)
        .args([".", "strings", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::contains("Hidden").not());
}

#[test]
fn test_non_go_files_are_ignored() {
    let tree = GoTree::new();
    tree.add_file("src/strings/README.md", "# not go\n");
    tree.add_file("src/strings/strings.go.orig", "garbage {");

    gofunc(&tree)
        .args([".", "strings", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Join\nSplit\n");
}

#[test]
fn test_several_packages_in_one_directory_are_merged() {
    let tree = GoTree::new();
    tree.add_file("src/mixed/a.go", "package a\n\nfunc A() {\n}\n");
    tree.add_file("src/mixed/b.go", "package b\n\nfunc B() {\n}\n");

    gofunc(&tree)
        .args([".", "mixed", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("A\nB\n");
}

// ============================================================================
// Empty Input
// ============================================================================

#[test]
fn test_directory_without_go_files() {
    let tree = GoTree::new();
    tree.add_file("empty/notes.txt", "nothing here");

    gofunc(&tree)
        .args(["empty", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("no imports found"));
}

#[test]
fn test_quiet_hides_warnings() {
    let tree = GoTree::new();
    tree.add_file("empty/notes.txt", "nothing here");

    gofunc(&tree)
        .args(["-q", "empty", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_package_without_functions() {
    let tree = GoTree::new();
    tree.add_file("src/consts/c.go", "package consts\n\nconst Pi = 3.14\n\nvar x, y = 1, 2\n");

    gofunc(&tree)
        .args([".", "consts", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_file_with_only_package_clause() {
    let tree = GoTree::new();
    tree.add_file("src/bare/doc.go", "// Package bare does nothing.\npackage bare\n");

    gofunc(&tree)
        .args([".", "bare", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ============================================================================
// Logging and Color
// ============================================================================

#[test]
fn test_verbose_logs_parsing() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["-v", ".", "strings", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stderr(predicate::str::contains("parsing directory"));
}

#[test]
fn test_color_always() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args(["--color", "always", ".", "strings", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").and(predicate::str::contains("Split")));
}

#[test]
fn test_color_auto_is_off_when_piped() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args([".", "strings", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b[").not());
}

#[test]
fn test_no_color_env_beats_force_color() {
    let tree = GoTree::new();
    gofunc(&tree)
        .args([".", "strings", "--pkg-root"])
        .arg(tree.src())
        .env("NO_COLOR", "1")
        .env("FORCE_COLOR", "1")
        .assert()
        .success()
        .stdout("Join\nSplit\n");
}

// ============================================================================
// Unusual Go Sources
// ============================================================================

#[test]
fn test_methods_and_generics_free_code() {
    let tree = GoTree::new();
    tree.add_file(
        "src/shapes/shapes.go",
        "package shapes\n\ntype Rect struct {\n\tW, H float64\n}\n\nfunc (r Rect) Area() float64 {\n\treturn r.W * r.H\n}\n\nfunc (r *Rect) scale(f float64) {\n\tr.W *= f\n\tr.H *= f\n}\n\nfunc New(w, h float64) *Rect {\n\treturn &Rect{W: w, H: h}\n}\n",
    );

    gofunc(&tree)
        .args([".", "shapes", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Area\nNew\n");

    gofunc(&tree)
        .args(["-a", ".", "shapes", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Area\nNew\nscale\n");
}

#[test]
fn test_unicode_identifiers() {
    let tree = GoTree::new();
    tree.add_file("src/uni/u.go", "package uni\n\nfunc Größe() {\n}\n\nfunc ñandú() {\n}\n");

    gofunc(&tree)
        .args([".", "uni", "--pkg-root"])
        .arg(tree.src())
        .assert()
        .success()
        .stdout("Größe\n");
}
