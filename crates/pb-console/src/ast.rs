//! Syntax tree for console commands

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Bool(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A statement: evaluated for effect, produces no value.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `let name = expr` binds (or rebinds) a session variable.
    Let { name: String, expr: Expr },
    /// `name = expr` reassigns an existing binding.
    Assign { name: String, expr: Expr },
    /// A bare expression; its value is discarded.
    Expr(Expr),
}
