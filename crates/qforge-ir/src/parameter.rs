//! Gate parameters.
//!
//! Gate-class templates carry symbolic parameters (`theta`, ...) that are
//! replaced with concrete angles when a circuit is sampled. Rewrites that
//! combine angles (rotation merging, basis translation) build small
//! arithmetic expressions that fold back to constants.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// A symbolic or concrete gate angle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A free symbolic parameter.
    Symbol(String),
    /// The constant π.
    Pi,
    /// Negation.
    Neg(Box<ParameterExpression>),
    /// Addition.
    Add(Box<ParameterExpression>, Box<ParameterExpression>),
    /// Multiplication.
    Mul(Box<ParameterExpression>, Box<ParameterExpression>),
}

impl ParameterExpression {
    /// Create a constant parameter.
    pub fn constant(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }

    /// Create a symbolic parameter.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create a π constant.
    pub fn pi() -> Self {
        ParameterExpression::Pi
    }

    /// Check if this expression contains any free symbol.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) | ParameterExpression::Pi => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Try to evaluate as a concrete f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Pi => Some(PI),
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// Replace the symbol `name` with `value`, leaving other symbols free.
    pub fn bind(&self, name: &str, value: f64) -> Self {
        match self {
            ParameterExpression::Symbol(n) if n == name => ParameterExpression::Constant(value),
            ParameterExpression::Constant(_)
            | ParameterExpression::Pi
            | ParameterExpression::Symbol(_) => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind(name, value))),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind(name, value)),
                Box::new(b.bind(name, value)),
            ),
        }
    }

    /// Replace every free symbol with `value`.
    ///
    /// Templates in this crate carry at most one symbol per parameter slot,
    /// so binding by position is done one expression at a time.
    pub fn bind_all(&self, value: f64) -> Self {
        match self {
            ParameterExpression::Symbol(_) => ParameterExpression::Constant(value),
            ParameterExpression::Constant(_) | ParameterExpression::Pi => self.clone(),
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.bind_all(value))),
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind_all(value)),
                Box::new(b.bind_all(value)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind_all(value)),
                Box::new(b.bind_all(value)),
            ),
        }
    }

    /// Fold constant subexpressions into a single constant.
    #[must_use]
    pub fn simplify(&self) -> Self {
        if let Some(v) = self.as_f64() {
            return ParameterExpression::Constant(v);
        }
        match self {
            ParameterExpression::Neg(e) => ParameterExpression::Neg(Box::new(e.simplify())),
            ParameterExpression::Add(a, b) => {
                ParameterExpression::Add(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            ParameterExpression::Mul(a, b) => {
                ParameterExpression::Mul(Box::new(a.simplify()), Box::new(b.simplify()))
            }
            _ => self.clone(),
        }
    }
}

/// Wrap an angle into (-π, π].
///
/// Non-finite input collapses to 0.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v:.4}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
            ParameterExpression::Pi => write!(f, "π"),
            ParameterExpression::Neg(e) => write!(f, "-({e})"),
            ParameterExpression::Add(a, b) => write!(f, "({a} + {b})"),
            ParameterExpression::Mul(a, b) => write!(f, "({a} * {b})"),
        }
    }
}

impl From<f64> for ParameterExpression {
    fn from(value: f64) -> Self {
        ParameterExpression::Constant(value)
    }
}

impl std::ops::Add for ParameterExpression {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        ParameterExpression::Add(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Mul for ParameterExpression {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        ParameterExpression::Mul(Box::new(self), Box::new(rhs))
    }
}

impl std::ops::Neg for ParameterExpression {
    type Output = Self;

    fn neg(self) -> Self::Output {
        ParameterExpression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_binds_to_constant() {
        let p = ParameterExpression::symbol("theta");
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);

        let bound = p.bind_all(0.25);
        assert!(!bound.is_symbolic());
        assert_eq!(bound.as_f64(), Some(0.25));
    }

    #[test]
    fn test_shifted_symbol() {
        // theta + π, as produced by basis translation of a template
        let p = ParameterExpression::symbol("theta") + ParameterExpression::pi();
        assert!(p.is_symbolic());
        let bound = p.bind_all(1.0).simplify();
        assert!((bound.as_f64().unwrap() - (1.0 + PI)).abs() < 1e-12);
    }

    #[test]
    fn test_bind_by_name() {
        let p = ParameterExpression::symbol("theta") * ParameterExpression::symbol("phi");
        let half = p.bind("theta", 2.0);
        assert!(half.is_symbolic());
        assert_eq!(half.bind("phi", 0.5).as_f64(), Some(1.0));
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!(normalize_angle(2.0 * PI).abs() < 1e-12);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }
}
