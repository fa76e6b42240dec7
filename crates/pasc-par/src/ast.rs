//! The abstract syntax tree. Every node owns its children; there are no
//! cycles (contrast the scope tree and call stack, which use non-owning
//! parent links — see `pasc-sem` and `pasc-eval`).

use pasc_util::Span;

/// `+`/`-` as a unary prefix operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryArithOp {
    Plus,
    Minus,
}

/// `+`/`-`/`*`/`DIV`/`/` as a binary operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinArithOp {
    Add,
    Sub,
    Mul,
    IntDiv,
    FloatDiv,
}

/// `=`, `<>`, `<`, `>`, `<=`, `>=`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

/// `AND`/`OR`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// A numeric literal, already distinguishing int from real at parse time
/// (the lexer has already done the work of telling them apart).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NumLit {
    Int(i64),
    Real(f64),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(NumLit, Span),
    Var(String, Span),
    UnaryArith(UnaryArithOp, Box<Expr>, Span),
    BinArith(Box<Expr>, BinArithOp, Box<Expr>, Span),
    Compare(Box<Expr>, CompareOp, Box<Expr>, Span),
    BoolBin(Box<Expr>, BoolOp, Box<Expr>, Span),
    BoolNot(Box<Expr>, Span),
    Call(String, Vec<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Num(_, s)
            | Expr::Var(_, s)
            | Expr::UnaryArith(_, _, s)
            | Expr::BinArith(_, _, _, s)
            | Expr::Compare(_, _, _, s)
            | Expr::BoolBin(_, _, _, s)
            | Expr::BoolNot(_, s)
            | Expr::Call(_, _, s) => *s,
        }
    }
}

/// `TO`/`DOWNTO`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForDirection {
    To,
    Downto,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    NoOp,
    Assign(String, Expr, Span),
    Compound(Vec<Stmt>),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    For(String, Expr, Expr, ForDirection, Box<Stmt>, Span),
    /// `exprs`, whether this is `WRITELN` (true, appends newline) or
    /// `PRINT` (false).
    Print(Vec<Expr>, bool),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub type_name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: String,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decl {
    Var(VarDecl),
    Func(FuncDecl),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub decls: Vec<Decl>,
    pub compound: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub name: String,
    pub block: Block,
}
