//! Directory parser
//!
//! Reads the Go files of one directory (not recursively), parses each with the
//! tree-sitter Go grammar and lowers the concrete tree into the [`ast`]
//! model. Files are grouped by their package clause.
//!
//! [`ast`]: crate::ast

mod lower;

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;
use tracing::{debug, trace};
use tree_sitter::{Language, Parser};

use crate::ast::{File, Package};
use crate::error::ParseError;

/// How much of each file to parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Every declaration.
    #[default]
    Full,
    /// Stop after the import declarations. Syntax errors past that point are
    /// not reported.
    ImportsOnly,
}

/// Whether `path` names a Go source file that is not a test.
pub fn is_go_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".go") && !name.ends_with("_test.go"))
}

/// File selection for [`parse_dir`]: Go files, minus glob exclusions
/// matched against the file name.
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    excludes: Vec<Pattern>,
}

impl FileFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_excludes(patterns: &[String]) -> Result<Self, glob::PatternError> {
        let excludes = patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<_, _>>()?;
        Ok(Self { excludes })
    }

    pub fn is_included(&self, path: &Path) -> bool {
        if !is_go_file(path) {
            return false;
        }
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy())
            .unwrap_or_default();
        !self.excludes.iter().any(|p| p.matches(&name))
    }
}

/// A reusable Go parser.
pub struct GoParser {
    parser: Parser,
}

impl GoParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language: Language = tree_sitter_go::LANGUAGE.into();
        parser.set_language(&language)?;
        Ok(Self { parser })
    }

    /// Parse the source of one file. `path` is only used in errors and
    /// positions are relative to `src`.
    pub fn parse_file(&mut self, path: &Path, src: &str, mode: ParseMode) -> Result<File, ParseError> {
        let tree = self.parser.parse(src, None).ok_or_else(|| ParseError::Syntax {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
            message: "parser produced no tree".to_string(),
        })?;
        lower::lower_file(path, src, &tree, mode)
    }
}

/// Parse a single file's source.
pub fn parse_file(path: &Path, src: &str, mode: ParseMode) -> Result<File, ParseError> {
    GoParser::new()?.parse_file(path, src, mode)
}

/// Parse every file in `dir` accepted by `filter`, grouped by package name.
///
/// Entries are read in file-name order. The first unreadable file or syntax
/// error aborts the whole directory.
pub fn parse_dir<F>(dir: &Path, filter: F, mode: ParseMode) -> Result<BTreeMap<String, Package>, ParseError>
where
    F: Fn(&Path) -> bool,
{
    let meta = fs::metadata(dir).map_err(|source| ParseError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(ParseError::ReadDir {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    debug!(dir = %dir.display(), ?mode, "parsing directory");
    let mut parser = GoParser::new()?;
    let mut packages: BTreeMap<String, Package> = BTreeMap::new();

    let walker = WalkBuilder::new(dir)
        .max_depth(Some(1))
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for entry in walker {
        let entry = entry.map_err(|err| walk_error(dir, err))?;
        let path = entry.path();
        if entry.depth() == 0 || !path.is_file() {
            continue;
        }
        if !filter(path) {
            trace!(file = %path.display(), "skipped");
            continue;
        }

        let src = fs::read_to_string(path).map_err(|source| ParseError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file = parser.parse_file(path, &src, mode)?;
        trace!(
            file = %path.display(),
            package = %file.name.name,
            decls = file.decls.len(),
            "parsed"
        );

        packages
            .entry(file.name.name.clone())
            .or_insert_with_key(|name| Package {
                name: name.clone(),
                files: BTreeMap::new(),
            })
            .files
            .insert(path.to_path_buf(), file);
    }

    debug!(dir = %dir.display(), packages = packages.len(), "parsed directory");
    Ok(packages)
}

fn walk_error(dir: &Path, err: ignore::Error) -> ParseError {
    let message = err.to_string();
    let source = err.into_io_error().unwrap_or_else(|| io::Error::other(message));
    ParseError::ReadDir {
        path: dir.to_path_buf(),
        source,
    }
}

/// Directory of the package with import path `pkg` under `root`.
pub fn package_dir(root: &Path, pkg: &str) -> PathBuf {
    pkg.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |dir, part| dir.join(part))
}
