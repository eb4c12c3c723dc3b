//! Tokenizer for the console grammar

use crate::EvalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    Ident(String),
    Let,
    True,
    False,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    LParen,
    RParen,
    Comma,
    Semi,
    Assign,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Bang,
}

impl Token {
    /// Short description for parse error messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {n}"),
            Token::Str(_) => "string literal".to_string(),
            Token::Ident(name) => format!("'{name}'"),
            Token::Let => "'let'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semi => "';'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::EqEq => "'=='".to_string(),
            Token::NotEq => "'!='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::Bang => "'!'".to_string(),
        }
    }
}

pub fn lex(src: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => tokens.push(lex_number(&mut chars)?),
            '"' => tokens.push(lex_string(&mut chars)?),
            c if c.is_alphabetic() || c == '_' => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        word.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(match word.as_str() {
                    "let" => Token::Let,
                    "true" => Token::True,
                    "false" => Token::False,
                    _ => Token::Ident(word),
                });
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '%' => {
                chars.next();
                tokens.push(Token::Percent);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            ';' => {
                chars.next();
                tokens.push(Token::Semi);
            }
            '=' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::EqEq);
                } else {
                    tokens.push(Token::Assign);
                }
            }
            '!' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::NotEq);
                } else {
                    tokens.push(Token::Bang);
                }
            }
            '<' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Le);
                } else {
                    tokens.push(Token::Lt);
                }
            }
            '>' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token::Ge);
                } else {
                    tokens.push(Token::Gt);
                }
            }
            other => {
                return Err(EvalError::Parse(format!("unexpected character '{other}'")));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Token, EvalError> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }
    // Optional exponent: e[+-]?digits
    if let Some(&c) = chars.peek() {
        if c == 'e' || c == 'E' {
            let mut exp = String::new();
            exp.push(c);
            chars.next();
            if let Some(&sign) = chars.peek() {
                if sign == '+' || sign == '-' {
                    exp.push(sign);
                    chars.next();
                }
            }
            let mut has_digits = false;
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() {
                    exp.push(d);
                    chars.next();
                    has_digits = true;
                } else {
                    break;
                }
            }
            if !has_digits {
                return Err(EvalError::Parse(format!("malformed number '{text}{exp}'")));
            }
            text.push_str(&exp);
        }
    }
    text.parse::<f64>()
        .map(Token::Number)
        .map_err(|_| EvalError::Parse(format!("malformed number '{text}'")))
}

fn lex_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Result<Token, EvalError> {
    chars.next(); // opening quote
    let mut text = String::new();
    loop {
        match chars.next() {
            Some('"') => return Ok(Token::Str(text)),
            Some('\\') => match chars.next() {
                Some('"') => text.push('"'),
                Some('\\') => text.push('\\'),
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some(other) => {
                    return Err(EvalError::Parse(format!("unknown escape '\\{other}'")));
                }
                None => return Err(EvalError::Parse("unterminated string".to_string())),
            },
            Some(c) => text.push(c),
            None => return Err(EvalError::Parse("unterminated string".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_arithmetic() {
        let tokens = lex("1 + 2.5 * (x - 3)").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.0),
                Token::Plus,
                Token::Number(2.5),
                Token::Star,
                Token::LParen,
                Token::Ident("x".to_string()),
                Token::Minus,
                Token::Number(3.0),
                Token::RParen,
            ]
        );
    }

    #[test]
    fn distinguishes_assign_from_equality() {
        assert_eq!(lex("=").unwrap(), vec![Token::Assign]);
        assert_eq!(lex("==").unwrap(), vec![Token::EqEq]);
        assert_eq!(lex("!=").unwrap(), vec![Token::NotEq]);
    }

    #[test]
    fn lexes_strings_with_escapes() {
        assert_eq!(
            lex(r#""a\"b\n""#).unwrap(),
            vec![Token::Str("a\"b\n".to_string())]
        );
        assert!(lex("\"open").is_err());
    }

    #[test]
    fn lexes_keywords_and_idents() {
        assert_eq!(
            lex("let foo true").unwrap(),
            vec![Token::Let, Token::Ident("foo".to_string()), Token::True]
        );
    }

    #[test]
    fn lexes_exponents() {
        assert_eq!(lex("1e3").unwrap(), vec![Token::Number(1000.0)]);
        assert_eq!(lex("2.5e-1").unwrap(), vec![Token::Number(0.25)]);
        assert!(lex("1e").is_err());
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(matches!(lex("1 @ 2"), Err(EvalError::Parse(_))));
    }
}
