//! Test utilities for creating temporary Go package trees.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding Go source files.
///
/// Files may live in subdirectories, which lets one fixture act as a package
/// root with several packages. The directory is removed when dropped.
pub struct TestPackage {
    dir: TempDir,
}

impl TestPackage {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a subdirectory (a package under this root).
    pub fn subdir(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Add a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Add a Go file declaring `package` with the given imports and
    /// empty functions.
    pub fn add_go_file(&self, path: &str, package: &str, imports: &[&str], funcs: &[&str]) -> PathBuf {
        self.add_file(path, &go_source(package, imports, funcs))
    }
}

impl Default for TestPackage {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of a minimal Go file.
pub fn go_source(package: &str, imports: &[&str], funcs: &[&str]) -> String {
    let mut src = format!("package {}\n\n", package);
    if !imports.is_empty() {
        src.push_str("import (\n");
        for import in imports {
            src.push_str(&format!("\t\"{}\"\n", import));
        }
        src.push_str(")\n\n");
    }
    for func in funcs {
        src.push_str(&format!("func {}() {{\n}}\n\n", func));
    }
    src
}
