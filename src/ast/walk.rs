//! Depth-first traversal of a syntax tree
//!
//! A [`Visitor`] is called on a node and decides how the walk continues: it
//! returns the visitor to use for the node's children (itself, or another one
//! it owns), or `None` to skip them. [`walk`] is the only traversal; analyses
//! are written as visitors and never recurse on their own.
//!
//! Children are visited in source order. Scope objects and the per-file
//! import list are not children: they alias nodes that are reached through
//! the declarations anyway.

use super::*;

/// A borrowed syntax-tree node of any kind.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Package(&'a Package),
    File(&'a File),
    Decl(&'a Decl),
    Spec(&'a Spec),
    Stmt(&'a Stmt),
    Expr(&'a Expr),
    Ident(&'a Ident),
    BasicLit(&'a BasicLit),
    FieldList(&'a FieldList),
    Field(&'a Field),
    Block(&'a BlockStmt),
    FuncType(&'a FuncType),
}

pub trait Visitor {
    /// Visit `node`. The returned visitor, if any, is applied to each of the
    /// node's children.
    fn visit(&mut self, node: Node<'_>) -> Option<&mut dyn Visitor>;
}

/// Walk the tree rooted at `node` depth-first, starting with `v`.
pub fn walk(v: &mut dyn Visitor, node: Node<'_>) {
    let Some(w) = v.visit(node) else {
        return;
    };
    for child in node.children() {
        walk(w, child);
    }
}

impl<'a> Node<'a> {
    /// The direct children of the node, in source order.
    pub fn children(self) -> Vec<Node<'a>> {
        let mut out = Children(Vec::new());
        match self {
            Node::Package(pkg) => {
                for file in pkg.files.values() {
                    out.push(Node::File(file));
                }
            }
            Node::File(file) => {
                out.push(Node::Ident(&file.name));
                for decl in &file.decls {
                    out.push(Node::Decl(decl));
                }
            }
            Node::Decl(Decl::Gen(decl)) => {
                for spec in &decl.specs {
                    out.push(Node::Spec(spec));
                }
            }
            Node::Decl(Decl::Func(decl)) => {
                if let Some(recv) = &decl.recv {
                    out.push(Node::FieldList(recv));
                }
                out.push(Node::Ident(&decl.name));
                out.push(Node::FuncType(&decl.typ));
                if let Some(body) = &decl.body {
                    out.push(Node::Block(body));
                }
            }
            Node::Spec(Spec::Import(spec)) => {
                if let Some(name) = &spec.name {
                    out.push(Node::Ident(name));
                }
                out.push(Node::BasicLit(&spec.path));
            }
            Node::Spec(Spec::Value(spec)) => {
                out.idents(&spec.names);
                out.opt_expr(spec.typ.as_ref());
                out.exprs(&spec.values);
            }
            Node::Spec(Spec::Type(spec)) => {
                out.push(Node::Ident(&spec.name));
                out.push(Node::Expr(&spec.typ));
            }
            Node::Stmt(stmt) => stmt_children(stmt, &mut out),
            Node::Expr(expr) => expr_children(expr, &mut out),
            Node::Ident(_) | Node::BasicLit(_) => {}
            Node::FieldList(list) => {
                for field in &list.list {
                    out.push(Node::Field(field));
                }
            }
            Node::Field(field) => {
                out.idents(&field.names);
                out.push(Node::Expr(&field.typ));
                if let Some(tag) = &field.tag {
                    out.push(Node::BasicLit(tag));
                }
            }
            Node::Block(block) => {
                for stmt in &block.list {
                    out.push(Node::Stmt(stmt));
                }
            }
            Node::FuncType(typ) => {
                out.push(Node::FieldList(&typ.params));
                if let Some(results) = &typ.results {
                    out.push(Node::FieldList(results));
                }
            }
        }
        out.0
    }
}

struct Children<'a>(Vec<Node<'a>>);

impl<'a> Children<'a> {
    fn push(&mut self, node: Node<'a>) {
        self.0.push(node);
    }

    fn idents(&mut self, idents: &'a [Ident]) {
        self.0.extend(idents.iter().map(Node::Ident));
    }

    fn exprs(&mut self, exprs: &'a [Expr]) {
        self.0.extend(exprs.iter().map(Node::Expr));
    }

    fn opt_expr(&mut self, expr: Option<&'a Expr>) {
        self.0.extend(expr.map(Node::Expr));
    }

    fn opt_stmt(&mut self, stmt: Option<&'a Stmt>) {
        self.0.extend(stmt.map(Node::Stmt));
    }
}

fn stmt_children<'a>(stmt: &'a Stmt, out: &mut Children<'a>) {
    match stmt {
        Stmt::Expr(s) => out.push(Node::Expr(&s.x)),
        Stmt::Assign(s) => {
            out.exprs(&s.lhs);
            out.exprs(&s.rhs);
        }
        Stmt::IncDec(s) => out.push(Node::Expr(&s.x)),
        Stmt::Return(s) => out.exprs(&s.results),
        Stmt::Block(s) => out.push(Node::Block(s)),
        Stmt::If(s) => {
            out.opt_stmt(s.init.as_ref());
            out.push(Node::Expr(&s.cond));
            out.push(Node::Block(&s.body));
            out.opt_stmt(s.els.as_ref());
        }
        Stmt::For(s) => {
            out.opt_stmt(s.init.as_ref());
            out.opt_expr(s.cond.as_ref());
            out.opt_stmt(s.post.as_ref());
            out.push(Node::Block(&s.body));
        }
        Stmt::Range(s) => {
            out.opt_expr(s.key.as_ref());
            out.opt_expr(s.value.as_ref());
            out.push(Node::Expr(&s.x));
            out.push(Node::Block(&s.body));
        }
        Stmt::Go(s) => out.push(Node::Expr(&s.call)),
        Stmt::Defer(s) => out.push(Node::Expr(&s.call)),
        Stmt::Decl(s) => out.push(Node::Decl(&s.decl)),
        Stmt::Branch(s) => {
            if let Some(label) = &s.label {
                out.push(Node::Ident(label));
            }
        }
        Stmt::Raw(_) => {}
    }
}

fn expr_children<'a>(expr: &'a Expr, out: &mut Children<'a>) {
    match expr {
        Expr::Ident(ident) => out.push(Node::Ident(ident)),
        Expr::BasicLit(lit) => out.push(Node::BasicLit(lit)),
        Expr::Selector(e) => {
            out.push(Node::Expr(&e.x));
            out.push(Node::Ident(&e.sel));
        }
        Expr::Call(e) => {
            out.push(Node::Expr(&e.fun));
            out.exprs(&e.args);
        }
        Expr::Star(e) => out.push(Node::Expr(&e.x)),
        Expr::Unary(e) => out.push(Node::Expr(&e.x)),
        Expr::Binary(e) => {
            out.push(Node::Expr(&e.x));
            out.push(Node::Expr(&e.y));
        }
        Expr::Paren(e) => out.push(Node::Expr(&e.x)),
        Expr::Index(e) => {
            out.push(Node::Expr(&e.x));
            out.push(Node::Expr(&e.index));
        }
        Expr::KeyValue(e) => {
            out.push(Node::Expr(&e.key));
            out.push(Node::Expr(&e.value));
        }
        Expr::CompositeLit(e) => {
            out.opt_expr(e.typ.as_ref());
            out.exprs(&e.elts);
        }
        Expr::FuncLit(e) => {
            out.push(Node::FuncType(&e.typ));
            out.push(Node::Block(&e.body));
        }
        Expr::Ellipsis(e) => out.opt_expr(e.elt.as_ref()),
        Expr::ArrayType(e) => {
            out.opt_expr(e.len.as_ref());
            out.push(Node::Expr(&e.elt));
        }
        Expr::MapType(e) => {
            out.push(Node::Expr(&e.key));
            out.push(Node::Expr(&e.value));
        }
        Expr::FuncType(e) => out.push(Node::FuncType(e)),
        Expr::StructType(e) => out.push(Node::FieldList(&e.fields)),
        Expr::Raw(_) => {}
    }
}
