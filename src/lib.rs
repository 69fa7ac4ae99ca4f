//! gofunc - list the imports and function names of Go packages, and dump
//! their syntax trees

pub mod ast;
pub mod collect;
pub mod error;
pub mod format;
pub mod inspect;
pub mod output;
pub mod parser;
pub mod printer;
pub mod string_utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use collect::{
    collect_functions, collect_functions_with, collect_imports, collect_imports_with, walk_packages,
    DumpCollector, FunctionCollector, ImportCollector,
};
pub use error::{ParseError, PrintError};
pub use format::{format_decl, format_expr, format_stmt};
pub use inspect::{Inspect, Value};
pub use output::{print_json, write_json, OutputConfig, Report, ReportFormatter};
pub use parser::{is_go_file, package_dir, parse_dir, parse_file, FileFilter, GoParser, ParseMode};
pub use printer::{fprint, not_nil_filter, print, sprint, FieldFilter};
