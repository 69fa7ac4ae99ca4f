//! Lowering of tree-sitter Go syntax trees into the [`ast`](crate::ast) model

use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use tree_sitter::{Node as TsNode, Tree};

use super::ParseMode;
use crate::ast::*;
use crate::error::ParseError;

type Result<T> = std::result::Result<T, ParseError>;

/// Longest source excerpt quoted in a syntax error.
const SNIPPET_LEN: usize = 24;

pub(super) fn lower_file(path: &Path, src: &str, tree: &Tree, mode: ParseMode) -> Result<File> {
    Lowerer {
        path,
        src,
        scope: Scope::default(),
        locals: Vec::new(),
        imports: Vec::new(),
    }
    .file(tree.root_node(), mode)
}

struct Lowerer<'s> {
    path: &'s Path,
    src: &'s str,
    /// Package-level objects of the file.
    scope: Scope,
    /// Names declared inside the function being lowered, innermost last.
    locals: Vec<HashSet<String>>,
    imports: Vec<Rc<ImportSpec>>,
}

// ============================================================================
// Tree helpers
// ============================================================================

/// Named children without comments, with list wrappers flattened.
fn named_children<'t>(node: TsNode<'t>) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    let mut out = Vec::new();
    for child in node.named_children(&mut cursor) {
        if child.is_extra() {
            continue;
        }
        let kind = child.kind();
        if kind == "statement_list" || kind.ends_with("_spec_list") {
            out.extend(named_children(child));
        } else {
            out.push(child);
        }
    }
    out
}

fn field_children<'t>(node: TsNode<'t>, name: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

/// First node in document order that is an error or was inserted by error
/// recovery.
fn first_error(node: TsNode<'_>) -> Option<TsNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error)
}

fn lit_kind(kind: &str) -> Option<LitKind> {
    match kind {
        "int_literal" => Some(LitKind::Int),
        "float_literal" => Some(LitKind::Float),
        "imaginary_literal" => Some(LitKind::Imag),
        "rune_literal" => Some(LitKind::Char),
        "interpreted_string_literal" | "raw_string_literal" => Some(LitKind::String),
        _ => None,
    }
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: TsNode<'_>) -> &'s str {
        &self.src[node.byte_range()]
    }

    fn pos(&self, node: TsNode<'_>) -> Position {
        let point = node.start_position();
        Position::new(node.start_byte(), point.row + 1, point.column + 1)
    }

    /// Position of the anonymous token `token` among the direct children.
    fn token_pos(&self, node: TsNode<'_>, token: &str) -> Option<Position> {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .find(|c| !c.is_named() && c.kind() == token);
        found.map(|c| self.pos(c))
    }

    fn error_at(&self, node: TsNode<'_>, message: impl Into<String>) -> ParseError {
        let pos = self.pos(node);
        ParseError::Syntax {
            path: self.path.to_path_buf(),
            line: pos.line,
            column: pos.column,
            message: message.into(),
        }
    }

    fn required<'t>(&self, node: TsNode<'t>, field: &str) -> Result<TsNode<'t>> {
        node.child_by_field_name(field)
            .ok_or_else(|| self.error_at(node, format!("{} without {}", node.kind(), field)))
    }

    fn first_named<'t>(&self, node: TsNode<'t>) -> Result<TsNode<'t>> {
        named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.error_at(node, format!("empty {}", node.kind())))
    }

    fn check_syntax(&self, root: TsNode<'_>, limit: usize) -> Result<()> {
        let Some(node) = first_error(root) else {
            return Ok(());
        };
        if node.start_byte() >= limit {
            return Ok(());
        }
        let message = if node.is_missing() {
            format!("missing `{}`", node.kind())
        } else {
            let line = self.text(node).lines().next().unwrap_or("").trim();
            if line.is_empty() {
                "unexpected end of file".to_string()
            } else {
                let snippet: String = line.chars().take(SNIPPET_LEN).collect();
                format!("unexpected `{}`", snippet)
            }
        };
        Err(self.error_at(node, message))
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn push_locals(&mut self) {
        self.locals.push(HashSet::new());
    }

    fn pop_locals(&mut self) {
        self.locals.pop();
    }

    fn at_top_level(&self) -> bool {
        self.locals.is_empty()
    }

    fn declare_local(&mut self, name: &str) {
        if let Some(frame) = self.locals.last_mut() {
            frame.insert(name.to_string());
        }
    }

    /// Package-level objects, so uses before the declaration resolve too.
    fn declare_package_names(&mut self, decls: &[TsNode<'_>]) {
        for &decl in decls {
            match decl.kind() {
                "function_declaration" => {
                    if let Some(name) = decl.child_by_field_name("name") {
                        let name = self.text(name);
                        if name != "init" {
                            self.insert_object(ObjKind::Fun, name);
                        }
                    }
                }
                "type_declaration" => {
                    for spec in named_children(decl) {
                        if let Some(name) = spec.child_by_field_name("name") {
                            self.insert_object(ObjKind::Typ, self.text(name));
                        }
                    }
                }
                "const_declaration" | "var_declaration" => {
                    let kind = if decl.kind() == "const_declaration" {
                        ObjKind::Con
                    } else {
                        ObjKind::Var
                    };
                    for spec in named_children(decl) {
                        for name in field_children(spec, "name") {
                            self.insert_object(kind, self.text(name));
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn insert_object(&mut self, kind: ObjKind, name: &str) {
        if name != "_" {
            self.scope.insert(Rc::new(Object::new(kind, name)));
        }
    }

    /// The object for a package-level declaration of `name`. A redeclared
    /// name gets an object of its own that is not in the scope.
    fn declare_top(&self, kind: ObjKind, name: &str) -> Option<Rc<Object>> {
        if name == "_" {
            return None;
        }
        match self.scope.lookup(name) {
            Some(obj) if obj.kind == kind && obj.decl.get().is_none() => Some(Rc::clone(obj)),
            _ => Some(Rc::new(Object::new(kind, name))),
        }
    }

    /// Identifier in a declaring position.
    fn declared_ident(&mut self, node: TsNode<'_>, kind: ObjKind) -> Ident {
        let name = self.text(node);
        let obj = if self.at_top_level() {
            self.declare_top(kind, name)
        } else {
            self.declare_local(name);
            None
        };
        Ident {
            pos: self.pos(node),
            name: name.to_string(),
            obj,
        }
    }

    /// Identifier in a using position, resolved against the file scope
    /// unless a local declaration shadows it.
    fn resolved_ident(&self, node: TsNode<'_>) -> Ident {
        let name = self.text(node);
        let shadowed = name == "_" || self.locals.iter().any(|frame| frame.contains(name));
        let obj = if shadowed {
            None
        } else {
            self.scope.lookup(name).cloned()
        };
        Ident {
            pos: self.pos(node),
            name: name.to_string(),
            obj,
        }
    }

    fn plain_ident(&self, node: TsNode<'_>) -> Ident {
        Ident::new(self.pos(node), self.text(node))
    }

    // ========================================================================
    // Files and declarations
    // ========================================================================

    fn file(mut self, root: TsNode<'_>, mode: ParseMode) -> Result<File> {
        if root.kind() != "source_file" {
            return Err(self.error_at(root, "not a Go source file"));
        }
        let top = named_children(root);

        let end = match mode {
            ParseMode::Full => top.len(),
            ParseMode::ImportsOnly => top
                .iter()
                .position(|n| !matches!(n.kind(), "package_clause" | "import_declaration"))
                .unwrap_or(top.len()),
        };
        let limit = top.get(end).map_or(usize::MAX, |n| n.start_byte());
        self.check_syntax(root, limit)?;

        let Some(&clause) = top.first().filter(|n| n.kind() == "package_clause") else {
            let found = top.first().map_or("end of file", |n| n.kind());
            let at = top.first().copied().unwrap_or(root);
            return Err(self.error_at(at, format!("expected 'package', found {}", found)));
        };
        let name = self.plain_ident(self.first_named(clause)?);

        let decl_nodes = &top[1..end];
        if mode == ParseMode::Full {
            self.declare_package_names(decl_nodes);
        }

        let mut decls = Vec::with_capacity(decl_nodes.len());
        let mut past_imports = false;
        for &node in decl_nodes {
            let decl = match node.kind() {
                "import_declaration" => {
                    if past_imports {
                        return Err(self.error_at(node, "imports must appear before other declarations"));
                    }
                    self.gen_decl(node)?
                }
                "function_declaration" | "method_declaration" => Decl::Func(self.func_decl(node)?),
                "const_declaration" | "var_declaration" | "type_declaration" => self.gen_decl(node)?,
                _ => {
                    return Err(self.error_at(node, "non-declaration statement outside function body"));
                }
            };
            past_imports |= node.kind() != "import_declaration";
            decls.push(decl);
        }

        Ok(File {
            package: self.pos(clause),
            name,
            decls,
            scope: self.scope,
            imports: self.imports,
        })
    }

    fn gen_decl(&mut self, node: TsNode<'_>) -> Result<Decl> {
        let tok = node.kind().trim_end_matches("_declaration").to_string();

        // the parens of a grouped var declaration belong to its spec list
        let mut cursor = node.walk();
        let list = node
            .named_children(&mut cursor)
            .find(|c| c.kind().ends_with("_spec_list"))
            .unwrap_or(node);
        let lparen = self.token_pos(list, "(");
        let rparen = self.token_pos(list, ")");

        let mut specs = Vec::new();
        for spec in named_children(node) {
            specs.push(match spec.kind() {
                "import_spec" => Spec::Import(self.import_spec(spec)?),
                "const_spec" => Spec::Value(self.value_spec(spec, ObjKind::Con)?),
                "var_spec" => Spec::Value(self.value_spec(spec, ObjKind::Var)?),
                "type_spec" | "type_alias" => Spec::Type(self.type_spec(spec)?),
                other => return Err(self.error_at(spec, format!("unexpected {} in {} declaration", other, tok))),
            });
        }

        Ok(Decl::Gen(Box::new(GenDecl {
            pos: self.pos(node),
            tok,
            lparen,
            specs,
            rparen,
        })))
    }

    fn import_spec(&mut self, node: TsNode<'_>) -> Result<Rc<ImportSpec>> {
        let name = node.child_by_field_name("name").map(|n| self.plain_ident(n));
        let path = self.required(node, "path")?;
        let spec = Rc::new(ImportSpec {
            name,
            path: BasicLit {
                pos: self.pos(path),
                kind: LitKind::String,
                value: self.text(path).to_string(),
            },
        });
        self.imports.push(Rc::clone(&spec));
        Ok(spec)
    }

    fn value_spec(&mut self, node: TsNode<'_>, kind: ObjKind) -> Result<Rc<ValueSpec>> {
        let typ = node
            .child_by_field_name("type")
            .map(|t| self.expr(t))
            .transpose()?;
        let values = match node.child_by_field_name("value") {
            Some(list) => self.exprs(list)?,
            None => Vec::new(),
        };
        let names = field_children(node, "name")
            .into_iter()
            .map(|n| self.declared_ident(n, kind))
            .collect();

        let spec = Rc::new(ValueSpec { names, typ, values });
        for ident in &spec.names {
            if let Some(obj) = &ident.obj {
                obj.set_decl(ObjDecl::Value(Rc::downgrade(&spec)));
            }
        }
        Ok(spec)
    }

    fn type_spec(&mut self, node: TsNode<'_>) -> Result<Rc<TypeSpec>> {
        // declared first: a type may refer to itself
        let name = self.declared_ident(self.required(node, "name")?, ObjKind::Typ);
        let assign = if node.kind() == "type_alias" {
            self.token_pos(node, "=")
        } else {
            None
        };
        let typ = self.expr(self.required(node, "type")?)?;

        let spec = Rc::new(TypeSpec { name, assign, typ });
        if let Some(obj) = &spec.name.obj {
            obj.set_decl(ObjDecl::Type(Rc::downgrade(&spec)));
        }
        Ok(spec)
    }

    fn func_decl(&mut self, node: TsNode<'_>) -> Result<Rc<FuncDecl>> {
        let name_node = self.required(node, "name")?;
        let name = self.text(name_node);
        let is_method = node.kind() == "method_declaration";
        let obj = if is_method || name == "init" {
            None
        } else {
            self.declare_top(ObjKind::Fun, name)
        };

        self.push_locals();
        let recv = node
            .child_by_field_name("receiver")
            .map(|r| self.field_list(r, true))
            .transpose();
        let rest = recv.and_then(|recv| {
            let typ = self.func_type(node, true)?;
            let body = node
                .child_by_field_name("body")
                .map(|b| self.block(b))
                .transpose()?;
            Ok((recv, typ, body))
        });
        self.pop_locals();
        let (recv, typ, body) = rest?;

        let decl = Rc::new(FuncDecl {
            recv,
            name: Ident {
                pos: self.pos(name_node),
                name: name.to_string(),
                obj,
            },
            typ,
            body,
        });
        if let Some(obj) = &decl.name.obj {
            obj.set_decl(ObjDecl::Func(Rc::downgrade(&decl)));
        }
        Ok(decl)
    }

    /// The signature of a function declaration, literal or type. Parameter
    /// names are declared in the current frame when `declare` is set.
    fn func_type(&mut self, node: TsNode<'_>, declare: bool) -> Result<FuncType> {
        let params = self.field_list(self.required(node, "parameters")?, declare)?;
        let results = match node.child_by_field_name("result") {
            Some(result) if result.kind() == "parameter_list" => Some(self.field_list(result, declare)?),
            Some(result) => Some(FieldList {
                list: vec![Field {
                    names: Vec::new(),
                    typ: self.expr(result)?,
                    tag: None,
                }],
                ..FieldList::default()
            }),
            None => None,
        };
        Ok(FuncType {
            func: self.pos(node),
            params,
            results,
        })
    }

    fn field_list(&mut self, node: TsNode<'_>, declare: bool) -> Result<FieldList> {
        let (open, close) = if node.kind() == "field_declaration_list" {
            ("{", "}")
        } else {
            ("(", ")")
        };

        let mut list = Vec::new();
        for decl in named_children(node) {
            let typ = self.expr(self.required(decl, "type")?)?;
            let typ = match decl.kind() {
                "variadic_parameter_declaration" => Expr::Ellipsis(Box::new(Ellipsis {
                    pos: self.token_pos(decl, "...").unwrap_or_else(|| self.pos(decl)),
                    elt: Some(typ),
                })),
                // embedded *T
                "field_declaration" if decl.child_by_field_name("name").is_none() => {
                    match self.token_pos(decl, "*") {
                        Some(star) => Expr::Star(Box::new(StarExpr { star, x: typ })),
                        None => typ,
                    }
                }
                _ => typ,
            };

            let mut names = Vec::new();
            for n in field_children(decl, "name") {
                if declare {
                    self.declare_local(self.text(n));
                }
                names.push(self.plain_ident(n));
            }
            let tag = decl.child_by_field_name("tag").map(|t| BasicLit {
                pos: self.pos(t),
                kind: LitKind::String,
                value: self.text(t).to_string(),
            });
            list.push(Field { names, typ, tag });
        }

        Ok(FieldList {
            opening: self.token_pos(node, open).unwrap_or_default(),
            list,
            closing: self.token_pos(node, close).unwrap_or_default(),
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn block(&mut self, node: TsNode<'_>) -> Result<BlockStmt> {
        self.push_locals();
        let list = self.stmts(node);
        self.pop_locals();
        Ok(BlockStmt {
            lbrace: self.token_pos(node, "{").unwrap_or_default(),
            list: list?,
            rbrace: self.token_pos(node, "}").unwrap_or_default(),
        })
    }

    fn stmts(&mut self, node: TsNode<'_>) -> Result<Vec<Stmt>> {
        named_children(node)
            .into_iter()
            .filter(|s| s.kind() != "empty_statement")
            .map(|s| self.stmt(s))
            .collect()
    }

    fn opt_stmt(&mut self, node: Option<TsNode<'_>>) -> Result<Option<Stmt>> {
        node.map(|n| self.stmt(n)).transpose()
    }

    fn stmt(&mut self, node: TsNode<'_>) -> Result<Stmt> {
        let stmt = match node.kind() {
            "expression_statement" => Stmt::Expr(Box::new(ExprStmt {
                x: self.expr(self.first_named(node)?)?,
            })),
            "inc_statement" | "dec_statement" => {
                let tok = if node.kind() == "inc_statement" { "++" } else { "--" };
                Stmt::IncDec(Box::new(IncDecStmt {
                    x: self.expr(self.first_named(node)?)?,
                    tok_pos: self.token_pos(node, tok).unwrap_or_default(),
                    tok: tok.to_string(),
                }))
            }
            "assignment_statement" => {
                let op = self.required(node, "operator")?;
                Stmt::Assign(Box::new(AssignStmt {
                    lhs: self.exprs(self.required(node, "left")?)?,
                    tok_pos: self.pos(op),
                    tok: self.text(op).to_string(),
                    rhs: self.exprs(self.required(node, "right")?)?,
                }))
            }
            "short_var_declaration" => {
                let rhs = self.exprs(self.required(node, "right")?)?;
                let left = self.required(node, "left")?;
                self.declare_idents(left);
                Stmt::Assign(Box::new(AssignStmt {
                    lhs: self.exprs(left)?,
                    tok_pos: self.token_pos(node, ":=").unwrap_or_default(),
                    tok: ":=".to_string(),
                    rhs,
                }))
            }
            "return_statement" => Stmt::Return(Box::new(ReturnStmt {
                ret: self.pos(node),
                results: match named_children(node).into_iter().next() {
                    Some(list) => self.exprs(list)?,
                    None => Vec::new(),
                },
            })),
            "go_statement" => Stmt::Go(Box::new(GoStmt {
                go: self.pos(node),
                call: self.expr(self.first_named(node)?)?,
            })),
            "defer_statement" => Stmt::Defer(Box::new(DeferStmt {
                defer: self.pos(node),
                call: self.expr(self.first_named(node)?)?,
            })),
            "block" => Stmt::Block(Box::new(self.block(node)?)),
            "if_statement" => {
                self.push_locals();
                let stmt = self.if_stmt(node);
                self.pop_locals();
                Stmt::If(Box::new(stmt?))
            }
            "for_statement" => {
                self.push_locals();
                let stmt = self.for_stmt(node);
                self.pop_locals();
                stmt?
            }
            "break_statement" | "continue_statement" | "goto_statement" | "fallthrough_statement" => {
                Stmt::Branch(Box::new(BranchStmt {
                    pos: self.pos(node),
                    tok: node.kind().trim_end_matches("_statement").to_string(),
                    label: named_children(node).first().map(|l| self.plain_ident(*l)),
                }))
            }
            "const_declaration" | "var_declaration" | "type_declaration" => Stmt::Decl(Box::new(DeclStmt {
                decl: self.gen_decl(node)?,
            })),
            _ => Stmt::Raw(self.raw(node)),
        };
        Ok(stmt)
    }

    /// Declare the plain identifiers of an assignment's left side as locals.
    fn declare_idents(&mut self, list: TsNode<'_>) {
        let idents = if list.kind() == "expression_list" {
            named_children(list)
        } else {
            vec![list]
        };
        for ident in idents {
            if ident.kind() == "identifier" {
                self.declare_local(self.text(ident));
            }
        }
    }

    fn if_stmt(&mut self, node: TsNode<'_>) -> Result<IfStmt> {
        let init = self.opt_stmt(node.child_by_field_name("initializer"))?;
        let cond = self.expr(self.required(node, "condition")?)?;
        let body = self.block(self.required(node, "consequence")?)?;
        let els = self.opt_stmt(node.child_by_field_name("alternative"))?;
        Ok(IfStmt {
            if_pos: self.pos(node),
            init,
            cond,
            body,
            els,
        })
    }

    fn for_stmt(&mut self, node: TsNode<'_>) -> Result<Stmt> {
        let body_node = self.required(node, "body")?;
        let header = named_children(node).into_iter().find(|c| c.id() != body_node.id());
        let for_pos = self.pos(node);

        let Some(header) = header else {
            return Ok(Stmt::For(Box::new(ForStmt {
                for_pos,
                init: None,
                cond: None,
                post: None,
                body: self.block(body_node)?,
            })));
        };

        match header.kind() {
            "for_clause" => {
                let init = self.opt_stmt(header.child_by_field_name("initializer"))?;
                let cond = header
                    .child_by_field_name("condition")
                    .map(|c| self.expr(c))
                    .transpose()?;
                let post = self.opt_stmt(header.child_by_field_name("update"))?;
                Ok(Stmt::For(Box::new(ForStmt {
                    for_pos,
                    init,
                    cond,
                    post,
                    body: self.block(body_node)?,
                })))
            }
            "range_clause" => {
                let x = self.expr(self.required(header, "right")?)?;
                let tok = self
                    .token_pos(header, ":=")
                    .map(|_| ":=")
                    .or_else(|| self.token_pos(header, "=").map(|_| "="));
                let mut lhs = match header.child_by_field_name("left") {
                    Some(left) => {
                        if tok == Some(":=") {
                            self.declare_idents(left);
                        }
                        self.exprs(left)?
                    }
                    None => Vec::new(),
                }
                .into_iter();
                Ok(Stmt::Range(Box::new(RangeStmt {
                    for_pos,
                    key: lhs.next(),
                    value: lhs.next(),
                    tok: tok.map(str::to_string),
                    x,
                    body: self.block(body_node)?,
                })))
            }
            _ => Ok(Stmt::For(Box::new(ForStmt {
                for_pos,
                init: None,
                cond: Some(self.expr(header)?),
                post: None,
                body: self.block(body_node)?,
            }))),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn exprs(&mut self, node: TsNode<'_>) -> Result<Vec<Expr>> {
        if node.kind() == "expression_list" {
            named_children(node).into_iter().map(|e| self.expr(e)).collect()
        } else {
            Ok(vec![self.expr(node)?])
        }
    }

    fn raw(&self, node: TsNode<'_>) -> RawNode {
        RawNode {
            pos: self.pos(node),
            kind: node.kind(),
            text: self.text(node).to_string(),
        }
    }

    fn expr(&mut self, node: TsNode<'_>) -> Result<Expr> {
        let kind = node.kind();
        if let Some(lit) = lit_kind(kind) {
            return Ok(Expr::BasicLit(BasicLit {
                pos: self.pos(node),
                kind: lit,
                value: self.text(node).to_string(),
            }));
        }

        let expr = match kind {
            "identifier" | "type_identifier" => Expr::Ident(self.resolved_ident(node)),
            "field_identifier" | "package_identifier" | "label_name" | "blank_identifier" | "nil"
            | "true" | "false" | "iota" => Expr::Ident(self.plain_ident(node)),
            "selector_expression" => Expr::Selector(Box::new(SelectorExpr {
                x: self.expr(self.required(node, "operand")?)?,
                sel: self.plain_ident(self.required(node, "field")?),
            })),
            "qualified_type" => Expr::Selector(Box::new(SelectorExpr {
                x: Expr::Ident(self.plain_ident(self.required(node, "package")?)),
                sel: self.plain_ident(self.required(node, "name")?),
            })),
            "call_expression" => {
                let fun = self.expr(self.required(node, "function")?)?;
                let args_node = self.required(node, "arguments")?;
                let args = named_children(args_node)
                    .into_iter()
                    .map(|a| self.expr(a))
                    .collect::<Result<_>>()?;
                Expr::Call(Box::new(CallExpr {
                    fun,
                    lparen: self.token_pos(args_node, "(").unwrap_or_default(),
                    args,
                    ellipsis: self.token_pos(args_node, "..."),
                    rparen: self.token_pos(args_node, ")").unwrap_or_default(),
                }))
            }
            "unary_expression" => {
                let op = self.required(node, "operator")?;
                let x = self.expr(self.required(node, "operand")?)?;
                if self.text(op) == "*" {
                    Expr::Star(Box::new(StarExpr { star: self.pos(op), x }))
                } else {
                    Expr::Unary(Box::new(UnaryExpr {
                        op_pos: self.pos(op),
                        op: self.text(op).to_string(),
                        x,
                    }))
                }
            }
            "binary_expression" => {
                let op = self.required(node, "operator")?;
                Expr::Binary(Box::new(BinaryExpr {
                    x: self.expr(self.required(node, "left")?)?,
                    op_pos: self.pos(op),
                    op: self.text(op).to_string(),
                    y: self.expr(self.required(node, "right")?)?,
                }))
            }
            "parenthesized_expression" | "parenthesized_type" => Expr::Paren(Box::new(ParenExpr {
                lparen: self.pos(node),
                x: self.expr(self.first_named(node)?)?,
                rparen: self.token_pos(node, ")").unwrap_or_default(),
            })),
            "index_expression" => Expr::Index(Box::new(IndexExpr {
                x: self.expr(self.required(node, "operand")?)?,
                lbrack: self.token_pos(node, "[").unwrap_or_default(),
                index: self.expr(self.required(node, "index")?)?,
                rbrack: self.token_pos(node, "]").unwrap_or_default(),
            })),
            "composite_literal" => {
                let typ = self.expr(self.required(node, "type")?)?;
                self.composite(self.required(node, "body")?, Some(typ))?
            }
            "literal_value" => self.composite(node, None)?,
            "literal_element" => self.expr(self.first_named(node)?)?,
            "keyed_element" => {
                let parts = named_children(node);
                let [key, value] = parts[..] else {
                    return Err(self.error_at(node, "keyed element without key and value"));
                };
                Expr::KeyValue(Box::new(KeyValueExpr {
                    key: self.expr(key)?,
                    colon: self.token_pos(node, ":").unwrap_or_default(),
                    value: self.expr(value)?,
                }))
            }
            "func_literal" => {
                self.push_locals();
                let lit = self.func_type(node, true).and_then(|typ| {
                    let body = self.block(self.required(node, "body")?)?;
                    Ok(FuncLit { typ, body })
                });
                self.pop_locals();
                Expr::FuncLit(Box::new(lit?))
            }
            "pointer_type" => Expr::Star(Box::new(StarExpr {
                star: self.pos(node),
                x: self.expr(self.first_named(node)?)?,
            })),
            "array_type" => Expr::ArrayType(Box::new(ArrayType {
                lbrack: self.pos(node),
                len: Some(self.expr(self.required(node, "length")?)?),
                elt: self.expr(self.required(node, "element")?)?,
            })),
            "implicit_length_array_type" => Expr::ArrayType(Box::new(ArrayType {
                lbrack: self.pos(node),
                len: Some(Expr::Ellipsis(Box::new(Ellipsis {
                    pos: self.token_pos(node, "...").unwrap_or_default(),
                    elt: None,
                }))),
                elt: self.expr(self.required(node, "element")?)?,
            })),
            "slice_type" => Expr::ArrayType(Box::new(ArrayType {
                lbrack: self.pos(node),
                len: None,
                elt: self.expr(self.required(node, "element")?)?,
            })),
            "map_type" => Expr::MapType(Box::new(MapType {
                map: self.pos(node),
                key: self.expr(self.required(node, "key")?)?,
                value: self.expr(self.required(node, "value")?)?,
            })),
            "function_type" => Expr::FuncType(Box::new(self.func_type(node, false)?)),
            "struct_type" => Expr::StructType(Box::new(StructType {
                pos: self.pos(node),
                fields: self.field_list(self.first_named(node)?, false)?,
            })),
            _ => Expr::Raw(self.raw(node)),
        };
        Ok(expr)
    }

    fn composite(&mut self, body: TsNode<'_>, typ: Option<Expr>) -> Result<Expr> {
        let elts = named_children(body)
            .into_iter()
            .map(|e| self.expr(e))
            .collect::<Result<_>>()?;
        Ok(Expr::CompositeLit(Box::new(CompositeLit {
            typ,
            lbrace: self.token_pos(body, "{").unwrap_or_default(),
            elts,
            rbrace: self.token_pos(body, "}").unwrap_or_default(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_file;
    use crate::printer::sprint;

    fn parse(src: &str) -> File {
        parse_file(Path::new("test.go"), src, ParseMode::Full).unwrap()
    }

    fn parse_err(src: &str) -> ParseError {
        parse_file(Path::new("test.go"), src, ParseMode::Full).unwrap_err()
    }

    fn func<'a>(file: &'a File, name: &str) -> &'a FuncDecl {
        file.decls
            .iter()
            .find_map(|d| match d {
                Decl::Func(f) if f.name.name == name => Some(&**f),
                _ => None,
            })
            .unwrap_or_else(|| panic!("no func {name}"))
    }

    fn body(decl: &FuncDecl) -> &[Stmt] {
        &decl.body.as_ref().unwrap().list
    }

    #[test]
    fn test_package_clause_and_position() {
        let file = parse("// header\npackage demo\n");
        assert_eq!(file.name.name, "demo");
        assert_eq!(file.package, Position::new(10, 2, 1));
        assert_eq!(file.name.pos, Position::new(18, 2, 9));
        assert!(file.decls.is_empty());
    }

    #[test]
    fn test_imports_are_shared_with_declarations() {
        let file = parse("package p\n\nimport (\n\t\"fmt\"\n\tast \"go/ast\"\n)\nimport `os`\n");
        assert_eq!(file.decls.len(), 2);
        let paths: Vec<_> = file.imports.iter().map(|i| i.path()).collect();
        assert_eq!(paths, vec!["fmt", "go/ast", "os"]);
        assert_eq!(file.imports[1].name.as_ref().map(|n| n.name.as_str()), Some("ast"));

        let Decl::Gen(group) = &file.decls[0] else {
            panic!("expected a general declaration");
        };
        assert_eq!(group.tok, "import");
        assert!(group.lparen.is_some());
        let Spec::Import(first) = &group.specs[0] else {
            panic!("expected an import spec");
        };
        assert!(Rc::ptr_eq(first, &file.imports[0]));
    }

    #[test]
    fn test_functions_and_methods() {
        let file = parse(
            "package p\n\ntype T struct{ n int }\n\nfunc (t *T) Get() int { return t.n }\n\nfunc New(n int, rest ...string) (*T, error) { return &T{n: n}, nil }\n\nfunc init() {}\n",
        );
        let get = func(&file, "Get");
        assert!(get.is_method());
        assert!(get.name.obj.is_none());

        let new = func(&file, "New");
        assert_eq!(new.typ.params.num_fields(), 2);
        assert!(matches!(new.typ.params.list[1].typ, Expr::Ellipsis(_)));
        assert_eq!(new.typ.results.as_ref().map(|r| r.list.len()), Some(2));
        let obj = new.name.obj.as_ref().expect("New is declared in the file scope");
        assert_eq!(obj.kind, ObjKind::Fun);
        assert!(obj.func_decl().is_some_and(|d| std::ptr::eq(&*d, new)));

        assert!(func(&file, "init").name.obj.is_none());
        assert!(file.scope.lookup("init").is_none());
        assert_eq!(file.scope.lookup("T").map(|o| o.kind), Some(ObjKind::Typ));
    }

    #[test]
    fn test_uses_resolve_unless_shadowed() {
        let file = parse(
            "package p\n\nfunc main() {\n\thelper()\n\thelper := 1\n\thelper++\n}\n\nfunc helper() {}\n",
        );
        let stmts = body(func(&file, "main"));
        let Stmt::Expr(call) = &stmts[0] else {
            panic!("expected an expression statement");
        };
        let Expr::Call(call) = &call.x else {
            panic!("expected a call");
        };
        let Expr::Ident(fun) = &call.fun else {
            panic!("expected an identifier");
        };
        assert!(fun.obj.is_some(), "forward reference resolves");

        let Stmt::IncDec(inc) = &stmts[2] else {
            panic!("expected ++");
        };
        let Expr::Ident(local) = &inc.x else {
            panic!("expected an identifier");
        };
        assert!(local.obj.is_none(), "local shadows the function");
    }

    #[test]
    fn test_statements() {
        let file = parse(
            "package p\n\nfunc f(xs []int) {\n\tfor i, x := range xs {\n\t\tif x > i {\n\t\t\tbreak\n\t\t}\n\t}\n\tfor i := 0; i < 3; i++ {\n\t}\n\tdefer g()\n\tgo g()\n\tvar y = 2\n\t_ = y\n\tselect {}\n}\n\nfunc g() {}\n",
        );
        let stmts = body(func(&file, "f"));
        let kinds: Vec<_> = stmts
            .iter()
            .map(|s| match s {
                Stmt::Range(_) => "range",
                Stmt::For(_) => "for",
                Stmt::Defer(_) => "defer",
                Stmt::Go(_) => "go",
                Stmt::Decl(_) => "decl",
                Stmt::Assign(_) => "assign",
                Stmt::Raw(raw) => raw.kind,
                _ => "other",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["range", "for", "defer", "go", "decl", "assign", "select_statement"]
        );

        let Stmt::Range(range) = &stmts[0] else {
            unreachable!()
        };
        assert_eq!(range.tok.as_deref(), Some(":="));
        assert!(range.key.is_some() && range.value.is_some());
        let Stmt::If(cond) = &range.body.list[0] else {
            panic!("expected if");
        };
        assert!(matches!(&cond.body.list[0], Stmt::Branch(b) if b.tok == "break"));
    }

    #[test]
    fn test_composite_literals() {
        let file = parse("package p\n\nvar m = map[string][]int{\"a\": {1, 2}}\n");
        let Decl::Gen(decl) = &file.decls[0] else {
            panic!("expected var");
        };
        let Spec::Value(spec) = &decl.specs[0] else {
            panic!("expected value spec");
        };
        let Expr::CompositeLit(lit) = &spec.values[0] else {
            panic!("expected composite literal");
        };
        assert!(matches!(lit.typ, Some(Expr::MapType(_))));
        let Expr::KeyValue(kv) = &lit.elts[0] else {
            panic!("expected key/value element");
        };
        assert!(matches!(&kv.value, Expr::CompositeLit(inner) if inner.typ.is_none() && inner.elts.len() == 2));
        assert!(spec.names[0].obj.as_ref().is_some_and(|o| o.kind == ObjKind::Var));
    }

    #[test]
    fn test_missing_package_clause() {
        let err = parse_err("func main() {}\n");
        assert!(err.to_string().contains("expected 'package'"), "{err}");
        assert_eq!(err.location(), Some((1, 1)));
    }

    #[test]
    fn test_statement_outside_function() {
        let err = parse_err("package p\n\nx := 1\n");
        assert_eq!(err.location().map(|(line, _)| line), Some(3), "{err}");
    }

    #[test]
    fn test_syntax_error_is_located() {
        let err = parse_err("package p\n\nfunc f() {\n\tif {\n}\n");
        let (line, _) = err.location().unwrap();
        assert!(line >= 3, "{err}");
        assert!(err.to_string().starts_with("test.go:"));
    }

    #[test]
    fn test_parsed_file_prints_with_back_reference() {
        let file = parse("package p\n\nfunc F() {\n\tF()\n}\n");
        let out = sprint(&file);
        assert!(out.starts_with("File {\n  package: Position{},\n"), "{out}");
        // the call's identifier and the scope refer to the declaration already printed
        assert!(out.contains("(obj @ "), "{out}");
        assert_eq!(out.matches("&FuncDecl {").count(), 1, "{out}");
    }
}
