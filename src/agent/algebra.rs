//! Polynomial equation solving.
//!
//! Handles the `solve ...` family of requests:
//!
//! - `solve 2x + 3 = 7`, `solve x^2 - 9 = 0 for x`, `solve x^2 - 4`
//!   (an expression without `=` is taken as `expr = 0`);
//! - `solve system: x + y = 3; x - y = 1` for linear systems.
//!
//! Single equations may be at most quadratic in one unknown and only real
//! roots are reported. Systems must be linear with a unique solution.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::expr::{BinOp, Expr, ParseError};
use super::format_solution_value;
use super::math;

const EPSILON: f64 = 1e-10;

/// Highest total degree an intermediate expansion may reach.
const MAX_DEGREE: u32 = 16;

/// Most terms an intermediate expansion may hold.
const MAX_TERMS: usize = 256;

const SYSTEM_FORMAT_HINT: &str = "System format error. Use: solve system: x+y=3; x-y=1";

static SOLVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)solve\s+(.+?)(?:\s+for\s+([a-zA-Z]\w*))?$").expect("solve pattern is valid")
});

/// Errors produced while solving an equation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlgebraError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Math(#[from] math::MathError),
    #[error("only polynomial expressions are supported")]
    NotPolynomial,
    #[error("exponents must be non-negative whole numbers")]
    BadExponent,
    #[error("nothing to solve for")]
    NoUnknowns,
    #[error("several unknowns ({0}); use 'solve system: ...' for simultaneous equations")]
    TooManyUnknowns(String),
    #[error("unknown '{0}' does not appear in the equation")]
    MissingUnknown(String),
    #[error("only equations up to degree 2 are supported")]
    DegreeTooHigh,
    #[error("the system is not linear")]
    NonLinearSystem,
    #[error("the system has infinitely many solutions")]
    Underdetermined,
    #[error("the expression is too large to expand")]
    TooComplex,
}

/// Try to answer an algebra request.
///
/// Returns `None` when the input does not look like an algebra request at
/// all; otherwise the rendered solution or error message.
pub fn solve(input: &str) -> Option<String> {
    let text = input.trim();
    let lower = text.to_lowercase();

    if lower.starts_with("solve system") {
        let Some((_, body)) = text.split_once(':') else {
            return Some(SYSTEM_FORMAT_HINT.to_string());
        };
        let equations: Vec<&str> = body
            .split(';')
            .map(str::trim)
            .filter(|eq| !eq.is_empty())
            .collect();
        if equations.iter().any(|eq| !eq.contains('=')) {
            return Some(SYSTEM_FORMAT_HINT.to_string());
        }
        return Some(match solve_system(&equations) {
            Ok(solutions) => format!("Solution: {}", render_system(&solutions)),
            Err(e) => format!("Error solving algebra: {e}"),
        });
    }

    let caps = SOLVE_PATTERN.captures(text)?;
    let equation = caps.get(1).map_or("", |m| m.as_str()).trim();
    let unknown = caps.get(2).map(|m| m.as_str());

    Some(match solve_equation(equation, unknown) {
        Ok(roots) => format!("Solution: {}", render_roots(&roots)),
        Err(e) => format!("Error solving algebra: {e}"),
    })
}

/// Solve one equation for its real roots, ascending.
pub fn solve_equation(equation: &str, unknown: Option<&str>) -> Result<Vec<f64>, AlgebraError> {
    let poly = parse_equation(equation)?;
    let unknowns = poly.unknowns();

    let var = match unknown {
        Some(name) if unknowns.contains(name) => name.to_string(),
        Some(name) => return Err(AlgebraError::MissingUnknown(name.to_string())),
        None => match unknowns.iter().next() {
            Some(name) => name.clone(),
            None => return Err(AlgebraError::NoUnknowns),
        },
    };
    if unknowns.len() > 1 {
        let names: Vec<&str> = unknowns.iter().map(String::as_str).collect();
        return Err(AlgebraError::TooManyUnknowns(names.join(", ")));
    }

    let coeffs = poly.univariate(&var);
    match coeffs.len() {
        2 => Ok(vec![-coeffs[0] / coeffs[1]]),
        3 => Ok(quadratic_roots(coeffs[2], coeffs[1], coeffs[0])),
        n if n > 3 => Err(AlgebraError::DegreeTooHigh),
        _ => Ok(Vec::new()),
    }
}

/// Solve a linear system with a unique solution.
///
/// An empty result means the system is inconsistent.
pub fn solve_system(equations: &[&str]) -> Result<Vec<BTreeMap<String, f64>>, AlgebraError> {
    let polys = equations
        .iter()
        .map(|eq| parse_equation(eq))
        .collect::<Result<Vec<_>, _>>()?;

    let mut unknowns = BTreeSet::new();
    for poly in &polys {
        if poly.degree() > 1 {
            return Err(AlgebraError::NonLinearSystem);
        }
        unknowns.extend(poly.unknowns());
    }
    if unknowns.is_empty() {
        return Err(AlgebraError::NoUnknowns);
    }
    let unknowns: Vec<String> = unknowns.into_iter().collect();

    // Augmented matrix: coefficients followed by the negated constant.
    let cols = unknowns.len();
    let mut rows: Vec<Vec<f64>> = polys
        .iter()
        .map(|poly| {
            let mut row: Vec<f64> = unknowns.iter().map(|v| poly.linear_coeff(v)).collect();
            row.push(-poly.constant());
            row
        })
        .collect();

    let mut pivot_row = 0;
    for col in 0..cols {
        let Some(best) = (pivot_row..rows.len()).max_by(|&a, &b| {
            rows[a][col].abs().total_cmp(&rows[b][col].abs())
        }) else {
            break;
        };
        if rows[best][col].abs() < EPSILON {
            continue;
        }
        rows.swap(pivot_row, best);

        let pivot = rows[pivot_row][col];
        for value in &mut rows[pivot_row] {
            *value /= pivot;
        }
        for r in 0..rows.len() {
            if r == pivot_row {
                continue;
            }
            let factor = rows[r][col];
            if factor.abs() < EPSILON {
                continue;
            }
            for c in 0..=cols {
                let delta = factor * rows[pivot_row][c];
                rows[r][c] -= delta;
            }
        }
        pivot_row += 1;
    }

    // Rows past the last pivot have only zero coefficients left; a non-zero
    // constant there is a contradiction.
    if rows[pivot_row..].iter().any(|row| row[cols].abs() > 1e-9) {
        return Ok(Vec::new());
    }
    if pivot_row < cols {
        return Err(AlgebraError::Underdetermined);
    }

    let solution = unknowns
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, rows[i][cols]))
        .collect();
    Ok(vec![solution])
}

fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < -EPSILON {
        return Vec::new();
    }
    if discriminant.abs() <= EPSILON {
        return vec![-b / (2.0 * a)];
    }
    let root = discriminant.sqrt();
    let mut roots = vec![(-b - root) / (2.0 * a), (-b + root) / (2.0 * a)];
    roots.sort_by(f64::total_cmp);
    roots
}

fn parse_equation(equation: &str) -> Result<Poly, AlgebraError> {
    match equation.split_once('=') {
        Some((lhs, rhs)) => {
            let lhs = Poly::from_expr(&Expr::parse(lhs)?)?;
            let rhs = Poly::from_expr(&Expr::parse(rhs)?)?;
            Ok(lhs.sub(&rhs))
        }
        None => Poly::from_expr(&Expr::parse(equation)?),
    }
}

fn render_roots(roots: &[f64]) -> String {
    let parts: Vec<String> = roots.iter().map(|r| format_solution_value(*r)).collect();
    format!("[{}]", parts.join(", "))
}

fn render_system(solutions: &[BTreeMap<String, f64>]) -> String {
    let parts: Vec<String> = solutions
        .iter()
        .map(|solution| {
            let pairs: Vec<String> = solution
                .iter()
                .map(|(name, value)| format!("{name}: {}", format_solution_value(*value)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

/// A monomial maps each unknown to its exponent.
type Monomial = BTreeMap<String, u32>;

/// Sparse multivariate polynomial with real coefficients.
#[derive(Debug, Clone, Default, PartialEq)]
struct Poly {
    terms: BTreeMap<Monomial, f64>,
}

impl Poly {
    fn constant_poly(value: f64) -> Self {
        let mut poly = Self::default();
        poly.add_term(Monomial::new(), value);
        poly
    }

    fn var(name: &str) -> Self {
        let mut poly = Self::default();
        poly.add_term(Monomial::from([(name.to_string(), 1)]), 1.0);
        poly
    }

    fn from_expr(expr: &Expr) -> Result<Self, AlgebraError> {
        match expr {
            Expr::Number(n) => Ok(Self::constant_poly(*n)),
            Expr::Var(name) => Ok(Self::var(name)),
            Expr::Neg(inner) => Ok(Self::from_expr(inner)?.scale(-1.0)),
            Expr::Call { func, arg } => {
                let inner = Self::from_expr(arg)?;
                let value = inner.as_constant().ok_or(AlgebraError::NotPolynomial)?;
                Ok(Self::constant_poly(func.apply(value)))
            }
            Expr::Binary { op, lhs, rhs } => {
                let a = Self::from_expr(lhs)?;
                let b = Self::from_expr(rhs)?;
                match op {
                    BinOp::Add => Ok(a.add(&b)),
                    BinOp::Sub => Ok(a.sub(&b)),
                    BinOp::Mul => a.mul(&b),
                    BinOp::Div => {
                        let divisor = b.as_constant().ok_or(AlgebraError::NotPolynomial)?;
                        if divisor == 0.0 {
                            return Err(math::MathError::DivisionByZero.into());
                        }
                        Ok(a.scale(1.0 / divisor))
                    }
                    BinOp::Rem => {
                        let (Some(x), Some(y)) = (a.as_constant(), b.as_constant()) else {
                            return Err(AlgebraError::NotPolynomial);
                        };
                        Ok(Self::constant_poly(math::eval(&Expr::Binary {
                            op: BinOp::Rem,
                            lhs: Box::new(Expr::Number(x)),
                            rhs: Box::new(Expr::Number(y)),
                        })?))
                    }
                    BinOp::Pow => {
                        let exponent = b.as_constant().ok_or(AlgebraError::BadExponent)?;
                        if let Some(base) = a.as_constant() {
                            return Ok(Self::constant_poly(base.powf(exponent)));
                        }
                        if exponent < 0.0 || exponent.fract() != 0.0 || exponent > f64::from(MAX_DEGREE) {
                            return Err(AlgebraError::BadExponent);
                        }
                        #[allow(clippy::cast_sign_loss)]
                        let exponent = exponent as u32;
                        a.pow(exponent)
                    }
                }
            }
        }
    }

    fn add_term(&mut self, monomial: Monomial, coeff: f64) {
        let entry = self.terms.entry(monomial).or_insert(0.0);
        *entry += coeff;
    }

    fn normalized(mut self) -> Self {
        self.terms.retain(|_, c| c.abs() > EPSILON);
        self
    }

    fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), *c);
        }
        out.normalized()
    }

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.scale(-1.0))
    }

    fn scale(&self, factor: f64) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(m, c)| (m.clone(), c * factor))
                .collect(),
        }
        .normalized()
    }

    fn mul(&self, other: &Self) -> Result<Self, AlgebraError> {
        if self.degree() + other.degree() > MAX_DEGREE {
            return Err(AlgebraError::DegreeTooHigh);
        }
        let mut out = Self::default();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &other.terms {
                let mut m = ma.clone();
                for (name, exp) in mb {
                    *m.entry(name.clone()).or_insert(0) += exp;
                }
                out.add_term(m, ca * cb);
            }
            if out.terms.len() > MAX_TERMS {
                return Err(AlgebraError::TooComplex);
            }
        }
        Ok(out.normalized())
    }

    fn pow(&self, exponent: u32) -> Result<Self, AlgebraError> {
        if self.degree().saturating_mul(exponent) > MAX_DEGREE {
            return Err(AlgebraError::DegreeTooHigh);
        }
        let mut out = Self::constant_poly(1.0);
        for _ in 0..exponent {
            out = out.mul(self)?;
        }
        Ok(out)
    }

    fn as_constant(&self) -> Option<f64> {
        match self.terms.len() {
            0 => Some(0.0),
            1 => self.terms.get(&Monomial::new()).copied(),
            _ => None,
        }
    }

    fn constant(&self) -> f64 {
        self.terms.get(&Monomial::new()).copied().unwrap_or(0.0)
    }

    fn unknowns(&self) -> BTreeSet<String> {
        self.terms.keys().flat_map(|m| m.keys().cloned()).collect()
    }

    fn degree(&self) -> u32 {
        self.terms
            .keys()
            .map(|m| m.values().sum())
            .max()
            .unwrap_or(0)
    }

    fn linear_coeff(&self, name: &str) -> f64 {
        let monomial = Monomial::from([(name.to_string(), 1)]);
        self.terms.get(&monomial).copied().unwrap_or(0.0)
    }

    /// Coefficients by ascending power of `name`, trailing zeros removed.
    /// Only meaningful when `name` is the sole unknown.
    fn univariate(&self, name: &str) -> Vec<f64> {
        let mut coeffs: Vec<f64> = Vec::new();
        for (m, c) in &self.terms {
            let power = m.get(name).copied().unwrap_or(0) as usize;
            if coeffs.len() <= power {
                coeffs.resize(power + 1, 0.0);
            }
            coeffs[power] += c;
        }
        while coeffs.last().is_some_and(|c| c.abs() <= EPSILON) {
            coeffs.pop();
        }
        coeffs
    }
}
