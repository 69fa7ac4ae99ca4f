//! Error types for parsing and printing
//!
//! Two kinds of failure leave the library: syntax/I-O errors raised while
//! reading a directory of sources, and sink errors raised while printing a
//! value. Anything else is a bug and panics.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while reading and parsing a directory of Go sources.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A syntax error at a known location.
    #[error("{}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The directory could not be listed.
    #[error("cannot read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A source file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The Go grammar could not be loaded into the parser.
    #[error("cannot load Go grammar: {0}")]
    Language(#[from] tree_sitter::LanguageError),
}

impl ParseError {
    /// Location of a syntax error as `(line, column)`, both 1-based.
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Syntax { line, column, .. } => Some((*line, *column)),
            _ => None,
        }
    }
}

/// A failure of the output sink during [`fprint`](crate::printer::fprint).
///
/// `written` counts the bytes the sink accepted before it failed, indentation
/// included. Nothing after that point was emitted.
#[derive(Debug, Error)]
#[error("print failed after {written} bytes: {source}")]
pub struct PrintError {
    pub written: usize,
    #[source]
    pub source: io::Error,
}

impl PrintError {
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}
