//! Fact collection over parsed packages
//!
//! Each collector is a [`Visitor`] that keeps walking the whole tree and
//! accumulates one kind of fact.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;

use termcolor::{Color, ColorSpec, WriteColor};

use crate::ast::{walk, Decl, Node, Package, Spec, Stmt, Visitor};
use crate::error::ParseError;
use crate::format::{format_decl, format_stmt};
use crate::parser::{is_go_file, parse_dir, ParseMode};
use crate::printer::{fprint, FieldFilter};

/// Import paths in visiting order, duplicates kept.
#[derive(Debug, Default)]
pub struct ImportCollector {
    imports: Vec<String>,
}

impl ImportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn into_imports(self) -> Vec<String> {
        self.imports
    }
}

impl Visitor for ImportCollector {
    fn visit(&mut self, node: Node<'_>) -> Option<&mut dyn Visitor> {
        if let Node::Spec(Spec::Import(spec)) = node {
            self.imports.push(spec.path().to_string());
        }
        Some(self)
    }
}

/// Distinct names of declared functions and methods.
#[derive(Debug, Default)]
pub struct FunctionCollector {
    funcs: BTreeSet<String>,
    exported_only: bool,
}

impl FunctionCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only names starting with an upper-case letter.
    pub fn exported_only() -> Self {
        Self {
            funcs: BTreeSet::new(),
            exported_only: true,
        }
    }

    pub fn funcs(&self) -> &BTreeSet<String> {
        &self.funcs
    }

    pub fn into_funcs(self) -> BTreeSet<String> {
        self.funcs
    }
}

impl Visitor for FunctionCollector {
    fn visit(&mut self, node: Node<'_>) -> Option<&mut dyn Visitor> {
        if let Node::Decl(Decl::Func(decl)) = node {
            if !self.exported_only || decl.name.is_exported() {
                self.funcs.insert(decl.name.name.clone());
            }
        }
        Some(self)
    }
}

/// Walk every package with `v`, in package-name order.
pub fn walk_packages(v: &mut dyn Visitor, packages: &BTreeMap<String, Package>) {
    for pkg in packages.values() {
        walk(v, Node::Package(pkg));
    }
}

/// Import paths of the Go files in `dir`, in file order.
pub fn collect_imports(dir: &Path) -> Result<Vec<String>, ParseError> {
    collect_imports_with(dir, is_go_file)
}

pub fn collect_imports_with<F>(dir: &Path, filter: F) -> Result<Vec<String>, ParseError>
where
    F: Fn(&Path) -> bool,
{
    let packages = parse_dir(dir, filter, ParseMode::ImportsOnly)?;
    let mut collector = ImportCollector::new();
    walk_packages(&mut collector, &packages);
    Ok(collector.into_imports())
}

/// Names of the functions declared in `dir`.
pub fn collect_functions(dir: &Path, exported_only: bool) -> Result<BTreeSet<String>, ParseError> {
    collect_functions_with(dir, is_go_file, exported_only)
}

pub fn collect_functions_with<F>(dir: &Path, filter: F, exported_only: bool) -> Result<BTreeSet<String>, ParseError>
where
    F: Fn(&Path) -> bool,
{
    let packages = parse_dir(dir, filter, ParseMode::Full)?;
    let mut collector = if exported_only {
        FunctionCollector::exported_only()
    } else {
        FunctionCollector::new()
    };
    walk_packages(&mut collector, &packages);
    Ok(collector.into_funcs())
}

/// Prints every function declaration and expression statement twice: as Go
/// source, then as a structural dump. Expression statements dump only their
/// expression.
///
/// The first write error stops the walk; it is returned by [`finish`].
///
/// [`finish`]: DumpCollector::finish
pub struct DumpCollector<'f, W> {
    out: W,
    filter: Option<&'f FieldFilter>,
    error: Option<io::Error>,
}

impl<'f, W: WriteColor> DumpCollector<'f, W> {
    pub fn new(out: W, filter: Option<&'f FieldFilter>) -> Self {
        Self {
            out,
            filter,
            error: None,
        }
    }

    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }

    fn dump(&mut self, source: &str, x: &dyn crate::inspect::Inspect) -> io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(self.out, "{}", source)?;
        self.out.reset()?;
        writeln!(self.out)?;
        fprint(&mut self.out, x, self.filter).map_err(|e| e.source)?;
        Ok(())
    }
}

impl<W: WriteColor> Visitor for DumpCollector<'_, W> {
    fn visit(&mut self, node: Node<'_>) -> Option<&mut dyn Visitor> {
        if self.error.is_some() {
            return None;
        }
        let result = match node {
            Node::Decl(decl @ Decl::Func(func)) => self.dump(&format_decl(decl), func),
            Node::Stmt(stmt @ Stmt::Expr(expr)) => self.dump(&format_stmt(stmt), &expr.x),
            _ => Ok(()),
        };
        if let Err(err) = result {
            self.error = Some(err);
            return None;
        }
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use termcolor::NoColor;

    use super::*;
    use crate::printer::not_nil_filter;
    use crate::test_utils::TestPackage;

    #[test]
    fn test_imports_keep_order_and_duplicates() {
        let pkg = TestPackage::new();
        pkg.add_go_file("a.go", "main", &["x", "y"], &[]);
        pkg.add_go_file("b.go", "main", &["x"], &[]);

        assert_eq!(collect_imports(pkg.path()).unwrap(), vec!["x", "y", "x"]);
    }

    #[test]
    fn test_imports_of_raw_and_named_specs() {
        let pkg = TestPackage::new();
        pkg.add_file(
            "main.go",
            "package main\n\nimport (\n\tf \"fmt\"\n\t_ `net/http/pprof`\n)\n",
        );
        assert_eq!(collect_imports(pkg.path()).unwrap(), vec!["fmt", "net/http/pprof"]);
    }

    #[test]
    fn test_functions_are_distinct() {
        let pkg = TestPackage::new();
        pkg.add_go_file("a.go", "p", &[], &["F", "G"]);
        pkg.add_go_file("b.go", "p", &[], &["F"]);

        let funcs = collect_functions(pkg.path(), false).unwrap();
        assert_eq!(funcs.into_iter().collect::<Vec<_>>(), vec!["F", "G"]);
    }

    #[test]
    fn test_functions_include_methods_not_literals() {
        let pkg = TestPackage::new();
        pkg.add_file(
            "t.go",
            "package p\n\ntype T int\n\nfunc (T) String() string { return \"\" }\n\nfunc run() {\n\tf := func() {}\n\tf()\n}\n",
        );
        let funcs = collect_functions(pkg.path(), false).unwrap();
        assert_eq!(funcs.into_iter().collect::<Vec<_>>(), vec!["String", "run"]);
    }

    #[test]
    fn test_exported_only() {
        let pkg = TestPackage::new();
        pkg.add_go_file("a.go", "p", &[], &["Public", "private", "Other"]);
        let funcs = collect_functions(pkg.path(), true).unwrap();
        assert_eq!(funcs.into_iter().collect::<Vec<_>>(), vec!["Other", "Public"]);
    }

    #[test]
    fn test_collect_propagates_parse_error() {
        let pkg = TestPackage::new();
        pkg.add_file("bad.go", "package p\n\nfunc {\n");
        assert!(matches!(
            collect_functions(pkg.path(), false),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn test_collector_spans_packages() {
        let pkg = TestPackage::new();
        pkg.add_go_file("a.go", "a", &["fmt"], &["A"]);
        pkg.add_go_file("b.go", "b", &["os"], &["B"]);
        let packages = parse_dir(pkg.path(), is_go_file, ParseMode::Full).unwrap();

        let mut imports = ImportCollector::new();
        walk_packages(&mut imports, &packages);
        assert_eq!(imports.imports(), ["fmt", "os"]);

        let mut funcs = FunctionCollector::new();
        walk_packages(&mut funcs, &packages);
        assert_eq!(funcs.funcs().len(), 2);
    }

    #[test]
    fn test_dump_prints_source_then_structure() {
        let pkg = TestPackage::new();
        pkg.add_file(
            "main.go",
            "package main\n\nfunc main() {\n\tprintln(\"hi\")\n}\n",
        );
        let packages = parse_dir(pkg.path(), is_go_file, ParseMode::Full).unwrap();

        let filter: &FieldFilter = &not_nil_filter;
        let mut dump = DumpCollector::new(NoColor::new(Vec::new()), Some(filter));
        walk_packages(&mut dump, &packages);
        let out = String::from_utf8(dump.finish().unwrap().into_inner()).unwrap();

        assert!(out.starts_with("func main() {\n\tprintln(\"hi\")\n}\n&FuncDecl {\n"), "{out}");
        let stmt_dump = "println(\"hi\")\n&CallExpr {\n  fun: Ident {\n";
        assert!(out.contains(stmt_dump), "{out}");
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dump_stops_on_write_error() {
        let pkg = TestPackage::new();
        pkg.add_go_file("a.go", "p", &[], &["A", "B"]);
        let packages = parse_dir(pkg.path(), is_go_file, ParseMode::Full).unwrap();

        let mut dump = DumpCollector::new(NoColor::new(Broken), None);
        walk_packages(&mut dump, &packages);
        let err = dump.finish().err().expect("write error is reported");
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
