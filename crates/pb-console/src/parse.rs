//! Recursive-descent parser for expressions and statement sequences

use crate::ast::{BinaryOp, Expr, Stmt, UnaryOp};
use crate::lexer::{lex, Token};
use crate::EvalError;

/// Parse the whole input as exactly one expression.
pub fn parse_expression(src: &str) -> Result<Expr, EvalError> {
    let mut parser = Parser::new(lex(src)?);
    let expr = parser.expr()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse the whole input as a `;`-separated statement sequence. A trailing
/// semicolon is allowed.
pub fn parse_statements(src: &str) -> Result<Vec<Stmt>, EvalError> {
    let mut parser = Parser::new(lex(src)?);
    let mut stmts = vec![parser.stmt()?];
    loop {
        if parser.eat(&Token::Semi) {
            if parser.at_end() {
                break;
            }
            stmts.push(parser.stmt()?);
        } else if parser.at_end() {
            break;
        } else {
            return Err(parser.unexpected("';' or end of input"));
        }
    }
    Ok(stmts)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn expect(&mut self, token: Token, wanted: &str) -> Result<(), EvalError> {
        if self.eat(&token) {
            Ok(())
        } else {
            Err(self.unexpected(wanted))
        }
    }

    fn expect_end(&self) -> Result<(), EvalError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(EvalError::Parse(format!(
                "unexpected {} after expression",
                token.describe()
            ))),
        }
    }

    fn unexpected(&self, wanted: &str) -> EvalError {
        match self.peek() {
            Some(token) => EvalError::Parse(format!(
                "expected {wanted}, found {}",
                token.describe()
            )),
            None => EvalError::Parse(format!("expected {wanted}, found end of input")),
        }
    }

    fn stmt(&mut self) -> Result<Stmt, EvalError> {
        if self.eat(&Token::Let) {
            let name = self.ident("variable name")?;
            self.expect(Token::Assign, "'='")?;
            let expr = self.expr()?;
            return Ok(Stmt::Let { name, expr });
        }

        // `name = expr` reassignment; `name ==` is an expression instead
        if let (Some(Token::Ident(_)), Some(Token::Assign)) = (self.peek(), self.peek_at(1)) {
            let name = self.ident("variable name")?;
            self.advance(); // '='
            let expr = self.expr()?;
            return Ok(Stmt::Assign { name, expr });
        }

        Ok(Stmt::Expr(self.expr()?))
    }

    fn ident(&mut self, wanted: &str) -> Result<String, EvalError> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.advance() {
                Some(Token::Ident(name)) => Ok(name),
                _ => unreachable!(),
            },
            _ => Err(self.unexpected(wanted)),
        }
    }

    fn expr(&mut self) -> Result<Expr, EvalError> {
        self.equality()
    }

    fn equality(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.comparison()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinaryOp::Eq,
                Some(Token::NotEq) => BinaryOp::Ne,
                _ => break,
            };
            self.advance();
            let rhs = self.comparison()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => break,
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr, EvalError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Some(Token::Minus) => Some(UnaryOp::Neg),
            Some(Token::Bang) => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let expr = self.unary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::True) => Ok(Expr::Bool(true)),
            Some(Token::False) => Ok(Expr::Bool(false)),
            Some(Token::LParen) => {
                let expr = self.expr()?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let mut args = Vec::new();
                    if !self.eat(&Token::RParen) {
                        loop {
                            args.push(self.expr()?);
                            if self.eat(&Token::RParen) {
                                break;
                            }
                            self.expect(Token::Comma, "',' or ')'")?;
                        }
                    }
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Some(token) => Err(EvalError::Parse(format!(
                "expected an expression, found {}",
                token.describe()
            ))),
            None => Err(EvalError::Parse(
                "expected an expression, found end of input".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precedence() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary {
                op: BinaryOp::Add,
                lhs: Box::new(Expr::Number(1.0)),
                rhs: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    lhs: Box::new(Expr::Number(2.0)),
                    rhs: Box::new(Expr::Number(3.0)),
                }),
            }
        );
    }

    #[test]
    fn expression_mode_rejects_statements() {
        assert!(parse_expression("let x = 1;").is_err());
        assert!(parse_expression("1 + 1;").is_err());
        assert!(parse_expression("x = 2").is_err());
    }

    #[test]
    fn statement_mode_accepts_sequences() {
        let stmts = parse_statements("let x = 1; x = x + 1; x * 2;").unwrap();
        assert_eq!(stmts.len(), 3);
        assert!(matches!(stmts[0], Stmt::Let { .. }));
        assert!(matches!(stmts[1], Stmt::Assign { .. }));
        assert!(matches!(stmts[2], Stmt::Expr(_)));
    }

    #[test]
    fn equality_is_not_assignment() {
        let stmts = parse_statements("x == 2").unwrap();
        assert!(matches!(stmts[0], Stmt::Expr(_)));
    }

    #[test]
    fn parses_calls_with_arguments() {
        let expr = parse_expression("min(1, 2 + 3)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "min");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn reports_trailing_garbage() {
        let err = parse_expression("1 2").unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)));
    }
}
