//! Interactive command console with two-stage evaluation
//!
//! Commands are tried as a single expression first; if that fails they are
//! retried as a statement sequence, and if both fail the expression-mode
//! error is the one surfaced. The evaluator is sandboxed: its only reachable
//! resources are the display channel, the clipboard service, and a read-only
//! view of the application state through registered builtins.

pub mod ast;
pub mod console;
pub mod eval;
pub mod lexer;
pub mod parse;

use thiserror::Error;

pub use console::CommandConsole;
pub use eval::{EvalSession, EvalValue};

/// Errors raised by command evaluation, in either mode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("'{0}' is not defined")]
    UndefinedVariable(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name}() expects {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("type error: {0}")]
    Type(String),

    #[error("division by zero")]
    DivideByZero,
}
