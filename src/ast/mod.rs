//! Go syntax-tree model
//!
//! The types mirror the node kinds of a Go parser closely enough for the
//! collectors, the source formatter and the structural printer. Nodes the
//! model does not cover are kept verbatim as [`RawNode`]s.
//!
//! Import, function, value and type declarations are reference counted: the
//! file's import list shares its specs with the declarations, and the
//! package-level [`Object`]s in a file's [`Scope`] point back at the
//! declaration that introduced them. A printed file is therefore a cyclic
//! graph, not a tree.

mod scope;
pub mod walk;

pub use scope::{ObjDecl, ObjKind, Object, Scope};
pub use walk::{walk, Node, Visitor};

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use crate::{inspect_enum, inspect_scalar, inspect_struct};

// ============================================================================
// Positions and leaves
// ============================================================================

/// A location in a source file. `line` and `column` are 1-based; the column
/// counts bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Whether the position points into a file (the default does not).
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "-")
        }
    }
}

/// An identifier, with the package-level object it refers to when the name
/// resolved inside its file.
#[derive(Debug, Clone)]
pub struct Ident {
    pub pos: Position,
    pub name: String,
    pub obj: Option<Rc<Object>>,
}

impl Ident {
    pub fn new(pos: Position, name: impl Into<String>) -> Self {
        Self {
            pos,
            name: name.into(),
            obj: None,
        }
    }

    pub fn is_exported(&self) -> bool {
        crate::string_utils::is_exported(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// A literal of basic type, spelled as in the source (quotes included).
#[derive(Debug, Clone)]
pub struct BasicLit {
    pub pos: Position,
    pub kind: LitKind,
    pub value: String,
}

/// A node the model has no dedicated type for.
#[derive(Debug, Clone)]
pub struct RawNode {
    pub pos: Position,
    pub kind: &'static str,
    pub text: String,
}

// ============================================================================
// Expressions and types
// ============================================================================

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    BasicLit(BasicLit),
    Selector(Box<SelectorExpr>),
    Call(Box<CallExpr>),
    Star(Box<StarExpr>),
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Paren(Box<ParenExpr>),
    Index(Box<IndexExpr>),
    KeyValue(Box<KeyValueExpr>),
    CompositeLit(Box<CompositeLit>),
    FuncLit(Box<FuncLit>),
    Ellipsis(Box<Ellipsis>),
    ArrayType(Box<ArrayType>),
    MapType(Box<MapType>),
    FuncType(Box<FuncType>),
    StructType(Box<StructType>),
    Raw(RawNode),
}

/// `x.sel`
#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub x: Expr,
    pub sel: Ident,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub fun: Expr,
    pub lparen: Position,
    pub args: Vec<Expr>,
    /// Position of a trailing `...`, if the last argument is spread.
    pub ellipsis: Option<Position>,
    pub rparen: Position,
}

/// `*x`, either a dereference or a pointer type.
#[derive(Debug, Clone)]
pub struct StarExpr {
    pub star: Position,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op_pos: Position,
    pub op: String,
    pub x: Expr,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub x: Expr,
    pub op_pos: Position,
    pub op: String,
    pub y: Expr,
}

#[derive(Debug, Clone)]
pub struct ParenExpr {
    pub lparen: Position,
    pub x: Expr,
    pub rparen: Position,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub x: Expr,
    pub lbrack: Position,
    pub index: Expr,
    pub rbrack: Position,
}

/// `key: value` inside a composite literal.
#[derive(Debug, Clone)]
pub struct KeyValueExpr {
    pub key: Expr,
    pub colon: Position,
    pub value: Expr,
}

/// `T{elts}`; the type is absent for nested literals.
#[derive(Debug, Clone)]
pub struct CompositeLit {
    pub typ: Option<Expr>,
    pub lbrace: Position,
    pub elts: Vec<Expr>,
    pub rbrace: Position,
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub typ: FuncType,
    pub body: BlockStmt,
}

/// `...T` in a variadic parameter list.
#[derive(Debug, Clone)]
pub struct Ellipsis {
    pub pos: Position,
    pub elt: Option<Expr>,
}

/// `[len]elt`, or `[]elt` when `len` is absent.
#[derive(Debug, Clone)]
pub struct ArrayType {
    pub lbrack: Position,
    pub len: Option<Expr>,
    pub elt: Expr,
}

#[derive(Debug, Clone)]
pub struct MapType {
    pub map: Position,
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub func: Position,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub pos: Position,
    pub fields: FieldList,
}

/// A parenthesized or braced list of fields: parameters, results, receivers
/// and struct members.
#[derive(Debug, Clone, Default)]
pub struct FieldList {
    pub opening: Position,
    pub list: Vec<Field>,
    pub closing: Position,
}

impl FieldList {
    /// Number of declared entries, counting each name separately.
    pub fn num_fields(&self) -> usize {
        self.list.iter().map(|f| f.names.len().max(1)).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub names: Vec<Ident>,
    pub typ: Expr,
    pub tag: Option<BasicLit>,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Box<ExprStmt>),
    Assign(Box<AssignStmt>),
    IncDec(Box<IncDecStmt>),
    Return(Box<ReturnStmt>),
    Block(Box<BlockStmt>),
    If(Box<IfStmt>),
    For(Box<ForStmt>),
    Range(Box<RangeStmt>),
    Go(Box<GoStmt>),
    Defer(Box<DeferStmt>),
    Decl(Box<DeclStmt>),
    Branch(Box<BranchStmt>),
    Raw(RawNode),
}

/// An expression evaluated for its effect, typically a call.
#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub x: Expr,
}

/// `lhs tok rhs`, where `tok` is `=`, `:=` or an operator assignment.
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub tok_pos: Position,
    pub tok: String,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub x: Expr,
    pub tok_pos: Position,
    pub tok: String,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub ret: Position,
    pub results: Vec<Expr>,
}

#[derive(Debug, Clone, Default)]
pub struct BlockStmt {
    pub lbrace: Position,
    pub list: Vec<Stmt>,
    pub rbrace: Position,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub if_pos: Position,
    pub init: Option<Stmt>,
    pub cond: Expr,
    pub body: BlockStmt,
    /// Either a block or another `if`.
    pub els: Option<Stmt>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub for_pos: Position,
    pub init: Option<Stmt>,
    pub cond: Option<Expr>,
    pub post: Option<Stmt>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone)]
pub struct RangeStmt {
    pub for_pos: Position,
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `=` or `:=`; absent for `for range x`.
    pub tok: Option<String>,
    pub x: Expr,
    pub body: BlockStmt,
}

#[derive(Debug, Clone)]
pub struct GoStmt {
    pub go: Position,
    pub call: Expr,
}

#[derive(Debug, Clone)]
pub struct DeferStmt {
    pub defer: Position,
    pub call: Expr,
}

/// A `const`, `var` or `type` declaration inside a function body.
#[derive(Debug, Clone)]
pub struct DeclStmt {
    pub decl: Decl,
}

/// `break`, `continue`, `goto` or `fallthrough`.
#[derive(Debug, Clone)]
pub struct BranchStmt {
    pub pos: Position,
    pub tok: String,
    pub label: Option<Ident>,
}

// ============================================================================
// Declarations
// ============================================================================

#[derive(Debug, Clone)]
pub enum Decl {
    Gen(Box<GenDecl>),
    Func(Rc<FuncDecl>),
}

/// An `import`, `const`, `var` or `type` declaration with one or more specs.
#[derive(Debug, Clone)]
pub struct GenDecl {
    pub pos: Position,
    pub tok: String,
    pub lparen: Option<Position>,
    pub specs: Vec<Spec>,
    pub rparen: Option<Position>,
}

#[derive(Debug, Clone)]
pub enum Spec {
    Import(Rc<ImportSpec>),
    Value(Rc<ValueSpec>),
    Type(Rc<TypeSpec>),
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Local name: an identifier, `.` or `_`.
    pub name: Option<Ident>,
    pub path: BasicLit,
}

impl ImportSpec {
    /// The import path without its quotes.
    pub fn path(&self) -> &str {
        crate::string_utils::unquote(&self.path.value)
    }
}

/// One line of a `const` or `var` declaration.
#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub typ: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// Position of `=` for an alias.
    pub assign: Option<Position>,
    pub typ: Expr,
}

/// A function or method declaration. `body` is absent for functions
/// implemented outside Go.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub typ: FuncType,
    pub body: Option<BlockStmt>,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }
}

// ============================================================================
// Files and packages
// ============================================================================

#[derive(Debug, Clone)]
pub struct File {
    /// Position of the `package` keyword.
    pub package: Position,
    pub name: Ident,
    pub decls: Vec<Decl>,
    /// Package-level objects declared in this file.
    pub scope: Scope,
    /// Every import of the file, shared with the import declarations.
    pub imports: Vec<Rc<ImportSpec>>,
}

/// The files of one directory that share a package clause, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct Package {
    pub name: String,
    pub files: BTreeMap<PathBuf, File>,
}

// ============================================================================
// Printing
// ============================================================================

inspect_scalar!(LitKind);

inspect_struct!(Position { offset, line, column });
inspect_struct!(Ident { pos, name, obj });
inspect_struct!(BasicLit { pos, kind, value });
inspect_struct!(RawNode { pos, kind, text });

inspect_enum!(Expr {
    Ident,
    BasicLit,
    Selector,
    Call,
    Star,
    Unary,
    Binary,
    Paren,
    Index,
    KeyValue,
    CompositeLit,
    FuncLit,
    Ellipsis,
    ArrayType,
    MapType,
    FuncType,
    StructType,
    Raw,
});
inspect_struct!(SelectorExpr { x, sel });
inspect_struct!(CallExpr { fun, lparen, args, ellipsis, rparen });
inspect_struct!(StarExpr { star, x });
inspect_struct!(UnaryExpr { op_pos, op, x });
inspect_struct!(BinaryExpr { x, op_pos, op, y });
inspect_struct!(ParenExpr { lparen, x, rparen });
inspect_struct!(IndexExpr { x, lbrack, index, rbrack });
inspect_struct!(KeyValueExpr { key, colon, value });
inspect_struct!(CompositeLit { typ, lbrace, elts, rbrace });
inspect_struct!(FuncLit { typ, body });
inspect_struct!(Ellipsis { pos, elt });
inspect_struct!(ArrayType { lbrack, len, elt });
inspect_struct!(MapType { map, key, value });
inspect_struct!(FuncType { func, params, results });
inspect_struct!(StructType { pos, fields });
inspect_struct!(FieldList { opening, list, closing });
inspect_struct!(Field { names, typ, tag });

inspect_enum!(Stmt {
    Expr,
    Assign,
    IncDec,
    Return,
    Block,
    If,
    For,
    Range,
    Go,
    Defer,
    Decl,
    Branch,
    Raw,
});
inspect_struct!(ExprStmt { x });
inspect_struct!(AssignStmt { lhs, tok_pos, tok, rhs });
inspect_struct!(IncDecStmt { x, tok_pos, tok });
inspect_struct!(ReturnStmt { ret, results });
inspect_struct!(BlockStmt { lbrace, list, rbrace });
inspect_struct!(IfStmt { if_pos, init, cond, body, els });
inspect_struct!(ForStmt { for_pos, init, cond, post, body });
inspect_struct!(RangeStmt { for_pos, key, value, tok, x, body });
inspect_struct!(GoStmt { go, call });
inspect_struct!(DeferStmt { defer, call });
inspect_struct!(DeclStmt { decl });
inspect_struct!(BranchStmt { pos, tok, label });

inspect_enum!(Decl { Gen, Func });
inspect_struct!(GenDecl { pos, tok, lparen, specs, rparen });
inspect_enum!(Spec { Import, Value, Type });
inspect_struct!(ImportSpec { name, path });
inspect_struct!(ValueSpec { names, typ, values });
inspect_struct!(TypeSpec { name, assign, typ });
inspect_struct!(FuncDecl { recv, name, typ, body });

inspect_struct!(File { package, name, decls, scope, imports });
inspect_struct!(Package { name, files });
