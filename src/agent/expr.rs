//! Arithmetic expression parsing.
//!
//! Expressions are parsed once into an [`Expr`] tree which is then either
//! evaluated numerically (see [`super::math`]) or expanded into a polynomial
//! (see [`super::algebra`]).
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/' | '%') unary | implicit)*
//! unary   := ('-' | '+') unary | power
//! power   := atom (('^' | '**') unary)?
//! atom    := number | ident '(' sum ')' | ident | '(' sum ')'
//! ```
//!
//! `implicit` multiplication applies when an identifier or `(` directly
//! follows an operand, so `2x`, `3(x+1)` and `2pi` all parse.

use std::f64::consts::{E, PI};
use std::fmt;

use thiserror::Error;

/// Errors raised while turning text into an [`Expr`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("function '{0}' needs a parenthesised argument")]
    MissingArgument(String),
    #[error("expression is nested too deeply")]
    TooDeep,
    #[error("expression is too long")]
    TooLong,
}

/// Deepest nesting of parentheses, signs and powers accepted.
pub const MAX_DEPTH: usize = 256;

/// Most tokens accepted in one expression. Bounds the depth of the tree
/// built from long operator chains.
pub const MAX_TOKENS: usize = 2048;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

/// Supported single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ln,
    Exp,
    Abs,
}

impl Func {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sqrt" => Self::Sqrt,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "ln" | "log" => Self::Ln,
            "exp" => Self::Exp,
            "abs" => Self::Abs,
            _ => return None,
        })
    }

    /// Apply the function to a value.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sqrt => x.sqrt(),
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Ln => x.ln(),
            Self::Exp => x.exp(),
            Self::Abs => x.abs(),
        }
    }
}

/// Parsed expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Var(String),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        func: Func,
        arg: Box<Expr>,
    },
}

impl Expr {
    /// Parse an expression from text.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let tokens = tokenize(input)?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }
        if tokens.len() > MAX_TOKENS {
            return Err(ParseError::TooLong);
        }
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.sum()?;
        match parser.peek() {
            None => Ok(expr),
            Some(tok) => Err(ParseError::UnexpectedToken(tok.to_string())),
        }
    }

    fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {n}"),
            Self::Ident(name) => write!(f, "name '{name}'"),
            Self::Plus => f.write_str("'+'"),
            Self::Minus => f.write_str("'-'"),
            Self::Star => f.write_str("'*'"),
            Self::Slash => f.write_str("'/'"),
            Self::Percent => f.write_str("'%'"),
            Self::Caret => f.write_str("'^'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            // Exponent only when digits follow, so `2e` stays `2 * e`.
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    while j < chars.len() && chars[j].is_ascii_digit() {
                        j += 1;
                    }
                    i = j;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber(text.clone()))?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(Token::Ident(chars[start..i].iter().collect()));
            continue;
        }

        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 1;
                Token::Caret
            }
            '*' | '×' => Token::Star,
            '/' | '÷' => Token::Slash,
            '%' => Token::Percent,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            other => return Err(ParseError::UnexpectedChar(other)),
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, want: &Token) -> Result<(), ParseError> {
        match self.next() {
            Some(ref tok) if tok == want => Ok(()),
            Some(tok) => Err(ParseError::UnexpectedToken(tok.to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }

    fn sum(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.product()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    fn product(&mut self) -> Result<Expr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                Some(Token::Ident(_) | Token::LParen) => {
                    let rhs = self.unary()?;
                    lhs = Expr::binary(BinOp::Mul, lhs, rhs);
                    continue;
                }
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::binary(op, lhs, rhs);
        }
    }

    // Every recursive path (signs, powers, parentheses, calls) passes through
    // here, so this is the only place nesting needs counting.
    fn unary(&mut self) -> Result<Expr, ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep);
        }
        let expr = self.signed();
        self.depth -= 1;
        expr
    }

    fn signed(&mut self) -> Result<Expr, ParseError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(Token::Plus) => {
                self.pos += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr, ParseError> {
        let base = self.atom()?;
        if matches!(self.peek(), Some(Token::Caret)) {
            self.pos += 1;
            let exponent = self.unary()?;
            return Ok(Expr::binary(BinOp::Pow, base, exponent));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.next() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::LParen) => {
                let inner = self.sum()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => {
                let lower = name.to_lowercase();
                if matches!(self.peek(), Some(Token::LParen)) {
                    if let Some(func) = Func::from_name(&lower) {
                        self.pos += 1;
                        let arg = self.sum()?;
                        self.expect(&Token::RParen)?;
                        return Ok(Expr::Call {
                            func,
                            arg: Box::new(arg),
                        });
                    }
                }
                match lower.as_str() {
                    "pi" => Ok(Expr::Number(PI)),
                    "e" => Ok(Expr::Number(E)),
                    _ if Func::from_name(&lower).is_some() => {
                        Err(ParseError::MissingArgument(name))
                    }
                    _ => Ok(Expr::Var(name)),
                }
            }
            Some(tok) => Err(ParseError::UnexpectedToken(tok.to_string())),
            None => Err(ParseError::UnexpectedEnd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Expr {
        Expr::Number(n)
    }

    #[test]
    fn test_precedence() {
        let expr = Expr::parse("1 + 2 * 3").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinOp::Add, num(1.0), Expr::binary(BinOp::Mul, num(2.0), num(3.0)))
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = Expr::parse("2^3**2").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinOp::Pow, num(2.0), Expr::binary(BinOp::Pow, num(3.0), num(2.0)))
        );
    }

    #[test]
    fn test_implicit_multiplication() {
        let expr = Expr::parse("2x").unwrap();
        assert_eq!(
            expr,
            Expr::binary(BinOp::Mul, num(2.0), Expr::Var("x".to_string()))
        );
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(Expr::parse("1.5e3").unwrap(), num(1500.0));
    }

    #[test]
    fn test_function_call() {
        let expr = Expr::parse("sqrt(16)").unwrap();
        assert!(matches!(expr, Expr::Call { func: Func::Sqrt, .. }));
    }

    #[test]
    fn test_errors() {
        assert_eq!(Expr::parse("   "), Err(ParseError::Empty));
        assert_eq!(Expr::parse("2 & 3"), Err(ParseError::UnexpectedChar('&')));
        assert_eq!(Expr::parse("(1 + 2"), Err(ParseError::UnexpectedEnd));
        assert!(matches!(
            Expr::parse("1 2"),
            Err(ParseError::UnexpectedToken(_))
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let signs = format!("{}1", "-".repeat(300));
        assert_eq!(Expr::parse(&signs), Err(ParseError::TooDeep));

        let parens = format!("{}1{}", "(".repeat(1_000), ")".repeat(1_000));
        assert_eq!(Expr::parse(&parens), Err(ParseError::TooDeep));

        let powers = format!("2{}", "^2".repeat(300));
        assert_eq!(Expr::parse(&powers), Err(ParseError::TooDeep));

        let calls = format!("{}1{}", "abs(".repeat(300), ")".repeat(300));
        assert_eq!(Expr::parse(&calls), Err(ParseError::TooDeep));
    }

    #[test]
    fn test_huge_input_is_rejected() {
        let signs = format!("{}1", "-".repeat(20_000));
        assert!(Expr::parse(&signs).is_err());

        let parens = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(Expr::parse(&parens).is_err());

        let chain = format!("1{}", "+1".repeat(20_000));
        assert_eq!(Expr::parse(&chain), Err(ParseError::TooLong));
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let parens = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(Expr::parse(&parens), Ok(num(1.0)));
    }
}
