//! Structural printing of arbitrary values
//!
//! [`fprint`] renders any [`Inspect`] value, most usefully a syntax tree, as
//! indented text:
//!
//! ```text
//! Ident {
//!   pos: Position{},
//!   name: "main",
//! }
//! ```
//!
//! References are tracked by identity. The first time a reference is seen it
//! is expanded and the line it started on is recorded; every later occurrence,
//! including one inside its own subtree, prints as `&(obj @ LINE)` instead.
//! Source positions are never expanded.
//!
//! A sink failure aborts the whole print and comes back as a [`PrintError`]
//! carrying the number of bytes written. Panics inside the traversal are not
//! caught.

mod indent;

pub use indent::IndentWriter;

use std::collections::HashMap;
use std::io::{self, Write};

use crate::ast::Position;
use crate::error::PrintError;
use crate::inspect::{Inspect, Struct, Value};

/// Decides whether a record field is printed, given its name and value.
pub type FieldFilter = dyn Fn(&str, &dyn Inspect) -> bool;

/// The default filter: print a field unless its value is nil-like.
///
/// Source positions are always printed; they are never nil, so the check is
/// only there to keep the rule explicit.
pub fn not_nil_filter(_name: &str, value: &dyn Inspect) -> bool {
    !value.is_nil() || is_position(value)
}

fn is_position(value: &dyn Inspect) -> bool {
    matches!(value.inspect(), Value::Struct(record) if record.is::<Position>())
}

/// Print `x` to `out`, followed by a newline.
///
/// Record fields for which `filter` returns false are left out; without a
/// filter every field is printed. Returns the number of bytes written.
pub fn fprint<W: Write>(
    out: W,
    x: &dyn Inspect,
    filter: Option<&FieldFilter>,
) -> Result<usize, PrintError> {
    let mut p = Printer {
        out: IndentWriter::new(out),
        filter,
        ptrmap: HashMap::new(),
    };
    let result = p.print(x).and_then(|()| p.out.write_all(b"\n"));
    match result {
        Ok(()) => Ok(p.out.written()),
        Err(source) => Err(PrintError {
            written: p.out.written(),
            source,
        }),
    }
}

/// Print `x` to standard output, skipping nil fields.
pub fn print(x: &dyn Inspect) -> Result<usize, PrintError> {
    let filter: &FieldFilter = &not_nil_filter;
    fprint(io::stdout().lock(), x, Some(filter))
}

/// Render `x` into a string, skipping nil fields.
pub fn sprint(x: &dyn Inspect) -> String {
    let filter: &FieldFilter = &not_nil_filter;
    let mut buf = Vec::new();
    fprint(&mut buf, x, Some(filter)).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&buf).into_owned()
}

struct Printer<'f, W> {
    out: IndentWriter<W>,
    filter: Option<&'f FieldFilter>,
    /// reference identity -> line it was first printed on
    ptrmap: HashMap<(usize, &'static str), usize>,
}

impl<W: Write> Printer<'_, W> {
    fn print(&mut self, x: &dyn Inspect) -> io::Result<()> {
        match x.inspect() {
            Value::Nil => write!(self.out, "nil"),

            Value::Interface(inner) => self.print(inner),

            Value::Map(map) => {
                writeln!(self.out, "{} {{", map.type_name())?;
                self.out.indent();
                for &(key, value) in map.entries() {
                    self.print(key)?;
                    write!(self.out, ": ")?;
                    self.print(value)?;
                    writeln!(self.out, ",")?;
                }
                self.out.dedent();
                write!(self.out, "}}")
            }

            Value::Pointer(ptr) => {
                write!(self.out, "&")?;
                let identity = ptr.identity();
                if let Some(line) = self.ptrmap.get(&identity) {
                    write!(self.out, "(obj @ {})", line)
                } else {
                    self.ptrmap.insert(identity, self.out.line());
                    self.print(ptr.target())
                }
            }

            Value::Bytes(bytes) => write!(self.out, "b\"{}\"", bytes.escape_ascii()),

            Value::Slice(slice) => {
                self.out.indent();
                writeln!(self.out, "{}{{", slice.type_name())?;
                for &elem in slice.elems() {
                    self.print(elem)?;
                    writeln!(self.out, ",")?;
                }
                self.out.dedent();
                write!(self.out, "}}")
            }

            Value::Struct(record) => self.print_struct(&record),

            Value::Scalar(value) => write!(self.out, "{:?}", value),
        }
    }

    fn print_struct(&mut self, record: &Struct<'_>) -> io::Result<()> {
        if record.is::<Position>() {
            return write!(self.out, "{}{{}}", record.type_name());
        }

        writeln!(self.out, "{} {{", record.type_name())?;
        self.out.indent();
        for field in record.fields() {
            if self.filter.is_none_or(|f| f(field.name, field.value)) {
                write!(self.out, "{}: ", field.name)?;
                self.print(field.value)?;
                writeln!(self.out, ",")?;
            }
        }
        self.out.dedent();
        write!(self.out, "}}")
    }
}
