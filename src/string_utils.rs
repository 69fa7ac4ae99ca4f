//! String utility functions for common string operations.

use std::sync::LazyLock;

use regex::Regex;

/// Matches a run of `module::` path segments in front of a type name.
static MODULE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[a-z_][a-z0-9_]*::)+").expect("MODULE_PATH regex is invalid")
});

/// Strip the module paths from a fully qualified type name.
///
/// `std::any::type_name` spells out every path segment, which turns a dump of
/// a syntax tree into a wall of `gofunc::ast::` prefixes. Only the last
/// segment of each path is kept, generic arguments included.
///
/// # Example
///
/// ```
/// use gofunc::string_utils::short_type_name;
///
/// assert_eq!(short_type_name("gofunc::ast::Ident"), "Ident");
/// assert_eq!(
///     short_type_name("alloc::vec::Vec<alloc::rc::Rc<gofunc::ast::ImportSpec>>"),
///     "Vec<Rc<ImportSpec>>"
/// );
/// assert_eq!(short_type_name("u8"), "u8");
/// ```
pub fn short_type_name(full: &str) -> String {
    MODULE_PATH.replace_all(full, "").into_owned()
}

/// Strip the surrounding quote characters of a Go string literal.
///
/// Both interpreted (`"fmt"`) and raw (`` `fmt` ``) literals are accepted.
/// Escape sequences are left as written.
///
/// # Example
///
/// ```
/// use gofunc::string_utils::unquote;
///
/// assert_eq!(unquote("\"go/ast\""), "go/ast");
/// assert_eq!(unquote("`os`"), "os");
/// assert_eq!(unquote("plain"), "plain");
/// ```
pub fn unquote(literal: &str) -> &str {
    literal.trim_matches(|c| c == '"' || c == '`')
}

/// Whether a Go identifier is exported (starts with an upper-case letter).
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
