//! Numeric evaluation of arithmetic expressions.

use thiserror::Error;

use super::expr::{BinOp, Expr, ParseError};

/// Errors produced while evaluating an expression.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("unknown name '{0}'")]
    UnknownName(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not a finite number")]
    NotFinite,
}

/// Parse and evaluate `input` to a number.
pub fn evaluate(input: &str) -> Result<f64, MathError> {
    let expr = Expr::parse(input.trim())?;
    let value = eval(&expr)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MathError::NotFinite)
    }
}

/// Evaluate a parsed expression that contains no free variables.
pub fn eval(expr: &Expr) -> Result<f64, MathError> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Var(name) => Err(MathError::UnknownName(name.clone())),
        Expr::Neg(inner) => Ok(-eval(inner)?),
        Expr::Call { func, arg } => Ok(func.apply(eval(arg)?)),
        Expr::Binary { op, lhs, rhs } => {
            let a = eval(lhs)?;
            let b = eval(rhs)?;
            match op {
                BinOp::Add => Ok(a + b),
                BinOp::Sub => Ok(a - b),
                BinOp::Mul => Ok(a * b),
                BinOp::Div if b == 0.0 => Err(MathError::DivisionByZero),
                BinOp::Div => Ok(a / b),
                BinOp::Rem if b == 0.0 => Err(MathError::DivisionByZero),
                // Sign follows the divisor, matching floored modulo.
                BinOp::Rem => Ok(a - b * (a / b).floor()),
                BinOp::Pow => Ok(a.powf(b)),
            }
        }
    }
}
