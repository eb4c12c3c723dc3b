//! Sandboxed evaluator for console commands
//!
//! Evaluation may suspend: builtins are awaited, so a command can wait on
//! asynchronous sub-operations before yielding a result or failing.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use indexmap::IndexMap;
use pb_core::AppState;
use pb_data::{format_number, Record, Value};
use serde::ser::{Serialize, Serializer};

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::parse::{parse_expression, parse_statements};
use crate::EvalError;

/// A value produced by the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Num(f64),
    Str(String),
    Bool(bool),
    List(Vec<EvalValue>),
    Record(IndexMap<String, EvalValue>),
    /// No value produced (void); never printed on success.
    Unit,
}

impl EvalValue {
    pub fn is_unit(&self) -> bool {
        matches!(self, EvalValue::Unit)
    }

    /// Compound values pretty-print structurally; scalars coerce plainly.
    pub fn is_compound(&self) -> bool {
        matches!(self, EvalValue::List(_) | EvalValue::Record(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EvalValue::Num(_) => "number",
            EvalValue::Str(_) => "string",
            EvalValue::Bool(_) => "boolean",
            EvalValue::List(_) => "list",
            EvalValue::Record(_) => "record",
            EvalValue::Unit => "undefined",
        }
    }
}

impl fmt::Display for EvalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalValue::Num(n) => f.write_str(&format_number(*n)),
            EvalValue::Str(s) => f.write_str(s),
            EvalValue::Bool(b) => write!(f, "{b}"),
            EvalValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            EvalValue::Record(fields) => {
                f.write_str("{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            EvalValue::Unit => f.write_str("undefined"),
        }
    }
}

impl Serialize for EvalValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EvalValue::Num(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                serializer.serialize_i64(*n as i64)
            }
            EvalValue::Num(n) => serializer.serialize_f64(*n),
            EvalValue::Str(s) => serializer.serialize_str(s),
            EvalValue::Bool(b) => serializer.serialize_bool(*b),
            EvalValue::List(items) => serializer.collect_seq(items),
            EvalValue::Record(fields) => serializer.collect_map(fields),
            EvalValue::Unit => serializer.serialize_unit(),
        }
    }
}

impl From<&Value> for EvalValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Number(n) => EvalValue::Num(*n),
            Value::Text(s) => EvalValue::Str(s.clone()),
        }
    }
}

impl From<&Record> for EvalValue {
    fn from(record: &Record) -> Self {
        EvalValue::Record(
            record
                .iter()
                .map(|(k, v)| (k.to_string(), EvalValue::from(v)))
                .collect(),
        )
    }
}

type EvalFuture<'a> = Pin<Box<dyn Future<Output = Result<EvalValue, EvalError>> + Send + 'a>>;

/// Per-console evaluation environment: session variable bindings plus a
/// read-only view of the application state for the registered builtins.
pub struct EvalSession {
    vars: AHashMap<String, EvalValue>,
    state: Arc<AppState>,
}

impl EvalSession {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            vars: AHashMap::new(),
            state,
        }
    }

    /// Expression mode: the whole input is one value-producing expression.
    pub async fn eval_expression(&self, src: &str) -> Result<EvalValue, EvalError> {
        let expr = parse_expression(src)?;
        self.eval_expr(&expr).await
    }

    /// Statement mode: a `;`-separated sequence evaluated for effect.
    pub async fn eval_statements(&mut self, src: &str) -> Result<(), EvalError> {
        let stmts = parse_statements(src)?;
        for stmt in &stmts {
            match stmt {
                Stmt::Let { name, expr } => {
                    let value = self.eval_expr(expr).await?;
                    self.vars.insert(name.clone(), value);
                }
                Stmt::Assign { name, expr } => {
                    if !self.vars.contains_key(name) {
                        return Err(EvalError::UndefinedVariable(name.clone()));
                    }
                    let value = self.eval_expr(expr).await?;
                    self.vars.insert(name.clone(), value);
                }
                Stmt::Expr(expr) => {
                    self.eval_expr(expr).await?;
                }
            }
        }
        Ok(())
    }

    fn eval_expr<'a>(&'a self, expr: &'a Expr) -> EvalFuture<'a> {
        Box::pin(async move {
            match expr {
                Expr::Number(n) => Ok(EvalValue::Num(*n)),
                Expr::Str(s) => Ok(EvalValue::Str(s.clone())),
                Expr::Bool(b) => Ok(EvalValue::Bool(*b)),
                Expr::Var(name) => self
                    .vars
                    .get(name)
                    .cloned()
                    .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),
                Expr::Unary { op, expr } => {
                    let value = self.eval_expr(expr).await?;
                    self.eval_unary(*op, value)
                }
                Expr::Binary { op, lhs, rhs } => {
                    let lhs = self.eval_expr(lhs).await?;
                    let rhs = self.eval_expr(rhs).await?;
                    self.eval_binary(*op, lhs, rhs)
                }
                Expr::Call { name, args } => {
                    let mut values = Vec::with_capacity(args.len());
                    for arg in args {
                        values.push(self.eval_expr(arg).await?);
                    }
                    self.call_builtin(name, values).await
                }
            }
        })
    }

    fn eval_unary(&self, op: UnaryOp, value: EvalValue) -> Result<EvalValue, EvalError> {
        match (op, value) {
            (UnaryOp::Neg, EvalValue::Num(n)) => Ok(EvalValue::Num(-n)),
            (UnaryOp::Not, EvalValue::Bool(b)) => Ok(EvalValue::Bool(!b)),
            (UnaryOp::Neg, other) => {
                Err(EvalError::Type(format!("cannot negate a {}", other.type_name())))
            }
            (UnaryOp::Not, other) => Err(EvalError::Type(format!(
                "'!' expects a boolean, got a {}",
                other.type_name()
            ))),
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        lhs: EvalValue,
        rhs: EvalValue,
    ) -> Result<EvalValue, EvalError> {
        use EvalValue::{Bool, Num, Str};
        match op {
            BinaryOp::Add => match (lhs, rhs) {
                (Num(a), Num(b)) => Ok(Num(a + b)),
                // String concatenation when either side is a string
                (Str(a), b) => Ok(Str(format!("{a}{b}"))),
                (a, Str(b)) => Ok(Str(format!("{a}{b}"))),
                (a, b) => Err(EvalError::Type(format!(
                    "cannot add {} and {}",
                    a.type_name(),
                    b.type_name()
                ))),
            },
            BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                let (a, b) = self.numeric_operands(op, lhs, rhs)?;
                match op {
                    BinaryOp::Sub => Ok(Num(a - b)),
                    BinaryOp::Mul => Ok(Num(a * b)),
                    BinaryOp::Div if b == 0.0 => Err(EvalError::DivideByZero),
                    BinaryOp::Div => Ok(Num(a / b)),
                    BinaryOp::Rem if b == 0.0 => Err(EvalError::DivideByZero),
                    BinaryOp::Rem => Ok(Num(a % b)),
                    _ => unreachable!(),
                }
            }
            BinaryOp::Eq => Ok(Bool(lhs == rhs)),
            BinaryOp::Ne => Ok(Bool(lhs != rhs)),
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
                let ordering = match (&lhs, &rhs) {
                    (Num(a), Num(b)) => a.partial_cmp(b),
                    (Str(a), Str(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let ordering = ordering.ok_or_else(|| {
                    EvalError::Type(format!(
                        "cannot compare {} and {}",
                        lhs.type_name(),
                        rhs.type_name()
                    ))
                })?;
                Ok(Bool(match op {
                    BinaryOp::Lt => ordering.is_lt(),
                    BinaryOp::Le => ordering.is_le(),
                    BinaryOp::Gt => ordering.is_gt(),
                    BinaryOp::Ge => ordering.is_ge(),
                    _ => unreachable!(),
                }))
            }
        }
    }

    fn numeric_operands(
        &self,
        op: BinaryOp,
        lhs: EvalValue,
        rhs: EvalValue,
    ) -> Result<(f64, f64), EvalError> {
        match (lhs, rhs) {
            (EvalValue::Num(a), EvalValue::Num(b)) => Ok((a, b)),
            (a, b) => {
                let symbol = match op {
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    BinaryOp::Rem => "%",
                    _ => "?",
                };
                Err(EvalError::Type(format!(
                    "'{symbol}' expects numbers, got {} and {}",
                    a.type_name(),
                    b.type_name()
                )))
            }
        }
    }

    async fn call_builtin(
        &self,
        name: &str,
        args: Vec<EvalValue>,
    ) -> Result<EvalValue, EvalError> {
        match name {
            "rows" => {
                expect_arity(name, "0", &args, |n| n == 0)?;
                Ok(EvalValue::Num(self.state.snapshot().data.len() as f64))
            }
            "columns" => {
                expect_arity(name, "0", &args, |n| n == 0)?;
                let snapshot = self.state.snapshot();
                let columns = snapshot
                    .data
                    .first()
                    .map(|record| {
                        record
                            .field_names()
                            .map(|n| EvalValue::Str(n.to_string()))
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(EvalValue::List(columns))
            }
            "head" => {
                expect_arity(name, "1", &args, |n| n == 1)?;
                let count = num_arg(name, &args, 0)?;
                let count = count.max(0.0) as usize;
                let snapshot = self.state.snapshot();
                Ok(EvalValue::List(
                    snapshot.data.iter().take(count).map(EvalValue::from).collect(),
                ))
            }
            "source" => {
                expect_arity(name, "0", &args, |n| n == 0)?;
                let origin = self.state.snapshot().origin;
                Ok(EvalValue::Str(
                    origin.map(|o| o.as_str().to_string()).unwrap_or_default(),
                ))
            }
            "name" => {
                expect_arity(name, "0", &args, |n| n == 0)?;
                Ok(EvalValue::Str(
                    self.state.snapshot().name.clone().unwrap_or_default(),
                ))
            }
            "sqrt" => {
                expect_arity(name, "1", &args, |n| n == 1)?;
                let x = num_arg(name, &args, 0)?;
                if x < 0.0 {
                    return Err(EvalError::Type("sqrt of a negative number".to_string()));
                }
                Ok(EvalValue::Num(x.sqrt()))
            }
            "abs" => {
                expect_arity(name, "1", &args, |n| n == 1)?;
                Ok(EvalValue::Num(num_arg(name, &args, 0)?.abs()))
            }
            "round" => {
                expect_arity(name, "1", &args, |n| n == 1)?;
                Ok(EvalValue::Num(num_arg(name, &args, 0)?.round()))
            }
            "min" | "max" => {
                expect_arity(name, "at least 1", &args, |n| n >= 1)?;
                let mut best = num_arg(name, &args, 0)?;
                for i in 1..args.len() {
                    let next = num_arg(name, &args, i)?;
                    best = if name == "min" {
                        best.min(next)
                    } else {
                        best.max(next)
                    };
                }
                Ok(EvalValue::Num(best))
            }
            "sleep" => {
                expect_arity(name, "1", &args, |n| n == 1)?;
                let ms = num_arg(name, &args, 0)?.max(0.0);
                tokio::time::sleep(Duration::from_millis(ms as u64)).await;
                Ok(EvalValue::Unit)
            }
            other => Err(EvalError::UnknownFunction(other.to_string())),
        }
    }
}

fn expect_arity(
    name: &str,
    expected: &str,
    args: &[EvalValue],
    ok: impl Fn(usize) -> bool,
) -> Result<(), EvalError> {
    if ok(args.len()) {
        Ok(())
    } else {
        Err(EvalError::Arity {
            name: name.to_string(),
            expected: expected.to_string(),
            got: args.len(),
        })
    }
}

fn num_arg(name: &str, args: &[EvalValue], idx: usize) -> Result<f64, EvalError> {
    match &args[idx] {
        EvalValue::Num(n) => Ok(*n),
        other => Err(EvalError::Type(format!(
            "{name}() expects a number, got a {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::DatasetOrigin;
    use pb_data::parse_delimited;

    fn session() -> EvalSession {
        EvalSession::new(Arc::new(AppState::new()))
    }

    fn session_with(text: &str) -> EvalSession {
        let state = Arc::new(AppState::new());
        state.adopt(parse_delimited(text), DatasetOrigin::Builtin, "Test");
        EvalSession::new(state)
    }

    #[tokio::test]
    async fn arithmetic_with_precedence() {
        let s = session();
        assert_eq!(
            s.eval_expression("1 + 2 * 3").await.unwrap(),
            EvalValue::Num(7.0)
        );
        assert_eq!(
            s.eval_expression("(1 + 2) * 3").await.unwrap(),
            EvalValue::Num(9.0)
        );
        assert_eq!(
            s.eval_expression("-2 + 5 % 3").await.unwrap(),
            EvalValue::Num(0.0)
        );
    }

    #[tokio::test]
    async fn string_concatenation() {
        let s = session();
        assert_eq!(
            s.eval_expression("\"v=\" + 2").await.unwrap(),
            EvalValue::Str("v=2".to_string())
        );
    }

    #[tokio::test]
    async fn comparisons_and_equality() {
        let s = session();
        assert_eq!(
            s.eval_expression("1 < 2").await.unwrap(),
            EvalValue::Bool(true)
        );
        assert_eq!(
            s.eval_expression("\"a\" == \"b\"").await.unwrap(),
            EvalValue::Bool(false)
        );
        assert_eq!(
            s.eval_expression("1 == \"1\"").await.unwrap(),
            EvalValue::Bool(false)
        );
    }

    #[tokio::test]
    async fn division_by_zero_is_an_error() {
        let s = session();
        assert_eq!(
            s.eval_expression("1 / 0").await.unwrap_err(),
            EvalError::DivideByZero
        );
    }

    #[tokio::test]
    async fn undefined_variable() {
        let s = session();
        assert_eq!(
            s.eval_expression("undeclaredVar").await.unwrap_err(),
            EvalError::UndefinedVariable("undeclaredVar".to_string())
        );
    }

    #[tokio::test]
    async fn let_bindings_persist_and_reassign() {
        let mut s = session();
        s.eval_statements("let x = 1; x = x + 1").await.unwrap();
        assert_eq!(s.eval_expression("x").await.unwrap(), EvalValue::Num(2.0));

        // Reassigning an unbound name fails
        let err = s.eval_statements("y = 1").await.unwrap_err();
        assert_eq!(err, EvalError::UndefinedVariable("y".to_string()));
    }

    #[tokio::test]
    async fn dataset_builtins_read_the_active_snapshot() {
        let s = session_with("a,b\n1,2\n3,x");
        assert_eq!(s.eval_expression("rows()").await.unwrap(), EvalValue::Num(2.0));
        assert_eq!(
            s.eval_expression("columns()").await.unwrap(),
            EvalValue::List(vec![
                EvalValue::Str("a".to_string()),
                EvalValue::Str("b".to_string())
            ])
        );
        assert_eq!(
            s.eval_expression("source()").await.unwrap(),
            EvalValue::Str("builtin".to_string())
        );
        assert_eq!(
            s.eval_expression("name()").await.unwrap(),
            EvalValue::Str("Test".to_string())
        );

        match s.eval_expression("head(1)").await.unwrap() {
            EvalValue::List(items) => {
                assert_eq!(items.len(), 1);
                match &items[0] {
                    EvalValue::Record(fields) => {
                        assert_eq!(fields.get("a"), Some(&EvalValue::Num(1.0)));
                    }
                    other => panic!("expected a record, got {other:?}"),
                }
            }
            other => panic!("expected a list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn builtins_without_a_dataset_are_total() {
        let s = session();
        assert_eq!(s.eval_expression("rows()").await.unwrap(), EvalValue::Num(0.0));
        assert_eq!(
            s.eval_expression("columns()").await.unwrap(),
            EvalValue::List(Vec::new())
        );
        assert_eq!(
            s.eval_expression("source()").await.unwrap(),
            EvalValue::Str(String::new())
        );
    }

    #[tokio::test]
    async fn numeric_builtins() {
        let s = session();
        assert_eq!(s.eval_expression("sqrt(9)").await.unwrap(), EvalValue::Num(3.0));
        assert_eq!(
            s.eval_expression("min(3, 1, 2)").await.unwrap(),
            EvalValue::Num(1.0)
        );
        assert_eq!(
            s.eval_expression("max(3, 1, 2)").await.unwrap(),
            EvalValue::Num(3.0)
        );
        assert!(matches!(
            s.eval_expression("sqrt(-1)").await.unwrap_err(),
            EvalError::Type(_)
        ));
        assert!(matches!(
            s.eval_expression("sqrt(1, 2)").await.unwrap_err(),
            EvalError::Arity { .. }
        ));
        assert!(matches!(
            s.eval_expression("nosuch()").await.unwrap_err(),
            EvalError::UnknownFunction(_)
        ));
    }

    #[tokio::test]
    async fn sleep_suspends_and_produces_no_value() {
        let s = session();
        let value = s.eval_expression("sleep(1)").await.unwrap();
        assert!(value.is_unit());
    }

    #[tokio::test]
    async fn compound_values_serialize_structurally() {
        let s = session_with("a,b\n1,x");
        let value = s.eval_expression("head(1)").await.unwrap();
        let pretty = serde_json::to_string_pretty(&value).unwrap();
        assert!(pretty.contains("\"a\": 1"));
        assert!(pretty.contains("\"b\": \"x\""));
    }
}
