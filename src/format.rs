//! Go source rendering of syntax-tree nodes
//!
//! Output follows gofmt's layout closely enough to read: tab indentation,
//! one statement per line, spaces around binary operators. Nodes kept as
//! [`RawNode`](crate::ast::RawNode) are emitted exactly as they appeared in
//! the source.

use crate::ast::*;

/// Render a declaration.
pub fn format_decl(decl: &Decl) -> String {
    let mut p = SourcePrinter::default();
    p.decl(decl);
    p.buf
}

/// Render a statement.
pub fn format_stmt(stmt: &Stmt) -> String {
    let mut p = SourcePrinter::default();
    p.stmt(stmt);
    p.buf
}

/// Render an expression.
pub fn format_expr(expr: &Expr) -> String {
    let mut p = SourcePrinter::default();
    p.expr(expr);
    p.buf
}

#[derive(Default)]
struct SourcePrinter {
    buf: String,
    depth: usize,
}

impl SourcePrinter {
    fn push(&mut self, s: &str) {
        self.buf.push_str(s);
    }

    fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.depth {
            self.buf.push('\t');
        }
    }

    fn list<T>(&mut self, items: &[T], sep: &str, mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.push(sep);
            }
            each(self, item);
        }
    }

    fn idents(&mut self, idents: &[Ident]) {
        self.list(idents, ", ", |p, id| p.push(&id.name));
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        self.list(exprs, ", ", Self::expr);
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Func(f) => self.func_decl(f),
            Decl::Gen(g) => self.gen_decl(g),
        }
    }

    fn func_decl(&mut self, f: &FuncDecl) {
        self.push("func ");
        if let Some(recv) = &f.recv {
            self.push("(");
            self.fields(recv, ", ");
            self.push(") ");
        }
        self.push(&f.name.name);
        self.signature(&f.typ);
        if let Some(body) = &f.body {
            self.push(" ");
            self.block(body);
        }
    }

    fn gen_decl(&mut self, g: &GenDecl) {
        self.push(&g.tok);
        self.push(" ");
        if g.lparen.is_none() && g.specs.len() == 1 {
            self.spec(&g.specs[0]);
            return;
        }
        self.push("(");
        self.depth += 1;
        for spec in &g.specs {
            self.newline();
            self.spec(spec);
        }
        self.depth -= 1;
        self.newline();
        self.push(")");
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(s) => {
                if let Some(name) = &s.name {
                    self.push(&name.name);
                    self.push(" ");
                }
                self.push(&s.path.value);
            }
            Spec::Value(s) => {
                self.idents(&s.names);
                if let Some(typ) = &s.typ {
                    self.push(" ");
                    self.expr(typ);
                }
                if !s.values.is_empty() {
                    self.push(" = ");
                    self.exprs(&s.values);
                }
            }
            Spec::Type(s) => {
                self.push(&s.name.name);
                self.push(if s.assign.is_some() { " = " } else { " " });
                self.expr(&s.typ);
            }
        }
    }

    fn signature(&mut self, typ: &FuncType) {
        self.push("(");
        self.fields(&typ.params, ", ");
        self.push(")");
        let Some(results) = &typ.results else {
            return;
        };
        match results.list.as_slice() {
            [] => {}
            [single] if single.names.is_empty() => {
                self.push(" ");
                self.expr(&single.typ);
            }
            _ => {
                self.push(" (");
                self.fields(results, ", ");
                self.push(")");
            }
        }
    }

    fn fields(&mut self, list: &FieldList, sep: &str) {
        self.list(&list.list, sep, |p, field| {
            if !field.names.is_empty() {
                p.idents(&field.names);
                p.push(" ");
            }
            p.expr(&field.typ);
            if let Some(tag) = &field.tag {
                p.push(" ");
                p.push(&tag.value);
            }
        });
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self, block: &BlockStmt) {
        if block.list.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.depth += 1;
        for stmt in &block.list {
            self.newline();
            self.stmt(stmt);
        }
        self.depth -= 1;
        self.newline();
        self.push("}");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(s) => self.expr(&s.x),
            Stmt::Assign(s) => {
                self.exprs(&s.lhs);
                self.push(" ");
                self.push(&s.tok);
                self.push(" ");
                self.exprs(&s.rhs);
            }
            Stmt::IncDec(s) => {
                self.expr(&s.x);
                self.push(&s.tok);
            }
            Stmt::Return(s) => {
                self.push("return");
                if !s.results.is_empty() {
                    self.push(" ");
                    self.exprs(&s.results);
                }
            }
            Stmt::Block(b) => self.block(b),
            Stmt::If(s) => self.if_stmt(s),
            Stmt::For(s) => {
                self.push("for ");
                if s.init.is_some() || s.post.is_some() {
                    if let Some(init) = &s.init {
                        self.stmt(init);
                    }
                    self.push("; ");
                    if let Some(cond) = &s.cond {
                        self.expr(cond);
                    }
                    self.push("; ");
                    if let Some(post) = &s.post {
                        self.stmt(post);
                    }
                    self.push(" ");
                } else if let Some(cond) = &s.cond {
                    self.expr(cond);
                    self.push(" ");
                }
                self.block(&s.body);
            }
            Stmt::Range(s) => {
                self.push("for ");
                if let Some(key) = &s.key {
                    self.expr(key);
                    if let Some(value) = &s.value {
                        self.push(", ");
                        self.expr(value);
                    }
                    self.push(" ");
                    self.push(s.tok.as_deref().unwrap_or("="));
                    self.push(" ");
                }
                self.push("range ");
                self.expr(&s.x);
                self.push(" ");
                self.block(&s.body);
            }
            Stmt::Go(s) => {
                self.push("go ");
                self.expr(&s.call);
            }
            Stmt::Defer(s) => {
                self.push("defer ");
                self.expr(&s.call);
            }
            Stmt::Decl(s) => self.decl(&s.decl),
            Stmt::Branch(s) => {
                self.push(&s.tok);
                if let Some(label) = &s.label {
                    self.push(" ");
                    self.push(&label.name);
                }
            }
            Stmt::Raw(raw) => self.push(&raw.text),
        }
    }

    fn if_stmt(&mut self, s: &IfStmt) {
        self.push("if ");
        if let Some(init) = &s.init {
            self.stmt(init);
            self.push("; ");
        }
        self.expr(&s.cond);
        self.push(" ");
        self.block(&s.body);
        if let Some(els) = &s.els {
            self.push(" else ");
            self.stmt(els);
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(id) => self.push(&id.name),
            Expr::BasicLit(lit) => self.push(&lit.value),
            Expr::Selector(e) => {
                self.expr(&e.x);
                self.push(".");
                self.push(&e.sel.name);
            }
            Expr::Call(e) => {
                self.expr(&e.fun);
                self.push("(");
                self.exprs(&e.args);
                if e.ellipsis.is_some() {
                    self.push("...");
                }
                self.push(")");
            }
            Expr::Star(e) => {
                self.push("*");
                self.expr(&e.x);
            }
            Expr::Unary(e) => {
                self.push(&e.op);
                self.expr(&e.x);
            }
            Expr::Binary(e) => {
                self.expr(&e.x);
                self.push(" ");
                self.push(&e.op);
                self.push(" ");
                self.expr(&e.y);
            }
            Expr::Paren(e) => {
                self.push("(");
                self.expr(&e.x);
                self.push(")");
            }
            Expr::Index(e) => {
                self.expr(&e.x);
                self.push("[");
                self.expr(&e.index);
                self.push("]");
            }
            Expr::KeyValue(e) => {
                self.expr(&e.key);
                self.push(": ");
                self.expr(&e.value);
            }
            Expr::CompositeLit(e) => {
                if let Some(typ) = &e.typ {
                    self.expr(typ);
                }
                self.push("{");
                self.exprs(&e.elts);
                self.push("}");
            }
            Expr::FuncLit(e) => {
                self.push("func");
                self.signature(&e.typ);
                self.push(" ");
                self.block(&e.body);
            }
            Expr::Ellipsis(e) => {
                self.push("...");
                if let Some(elt) = &e.elt {
                    self.expr(elt);
                }
            }
            Expr::ArrayType(e) => {
                self.push("[");
                if let Some(len) = &e.len {
                    self.expr(len);
                }
                self.push("]");
                self.expr(&e.elt);
            }
            Expr::MapType(e) => {
                self.push("map[");
                self.expr(&e.key);
                self.push("]");
                self.expr(&e.value);
            }
            Expr::FuncType(e) => {
                self.push("func");
                self.signature(e);
            }
            Expr::StructType(e) => {
                if e.fields.list.is_empty() {
                    self.push("struct{}");
                    return;
                }
                self.push("struct {");
                self.depth += 1;
                for field in &e.fields.list {
                    self.newline();
                    if !field.names.is_empty() {
                        self.idents(&field.names);
                        self.push(" ");
                    }
                    self.expr(&field.typ);
                    if let Some(tag) = &field.tag {
                        self.push(" ");
                        self.push(&tag.value);
                    }
                }
                self.depth -= 1;
                self.newline();
                self.push("}");
            }
            Expr::Raw(raw) => self.push(&raw.text),
        }
    }
}
