//! Symbolic parameter expressions for variational circuits.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A symbolic or concrete gate parameter.
///
/// Variational ansatze build circuits over free symbols
/// (`gamma_0`, `beta_0`, ...) that are bound to concrete values once the
/// classical optimizer proposes a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParameterExpression {
    /// A constant numeric value.
    Constant(f64),
    /// A free symbol.
    Symbol(String),
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

    /// Create a free symbol.
    pub fn symbol(name: impl Into<String>) -> Self {
        ParameterExpression::Symbol(name.into())
    }

    /// Create an indexed symbol such as `gamma_3`.
    pub fn indexed(letter: &str, subscript: usize) -> Self {
        ParameterExpression::Symbol(format!("{letter}_{subscript}"))
    }

    /// Check whether this expression contains any free symbols.
    pub fn is_symbolic(&self) -> bool {
        match self {
            ParameterExpression::Symbol(_) => true,
            ParameterExpression::Constant(_) => false,
            ParameterExpression::Neg(e) => e.is_symbolic(),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.is_symbolic() || b.is_symbolic()
            }
        }
    }

    /// Try to evaluate as a concrete value. Returns `None` while any
    /// free symbol remains.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterExpression::Constant(v) => Some(*v),
            ParameterExpression::Symbol(_) => None,
            ParameterExpression::Neg(e) => e.as_f64().map(|v| -v),
            ParameterExpression::Add(a, b) => Some(a.as_f64()? + b.as_f64()?),
            ParameterExpression::Mul(a, b) => Some(a.as_f64()? * b.as_f64()?),
        }
    }

    /// All free symbol names, in sorted order.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        self.collect_symbols(&mut set);
        set
    }

    fn collect_symbols(&self, set: &mut BTreeSet<String>) {
        match self {
            ParameterExpression::Constant(_) => {}
            ParameterExpression::Symbol(name) => {
                set.insert(name.clone());
            }
            ParameterExpression::Neg(e) => e.collect_symbols(set),
            ParameterExpression::Add(a, b) | ParameterExpression::Mul(a, b) => {
                a.collect_symbols(set);
                b.collect_symbols(set);
            }
        }
    }

    /// Substitute every symbol found in `assignments`, returning a new
    /// expression. Symbols without an assignment are left free.
    pub fn bind(&self, assignments: &HashMap<String, f64>) -> Self {
        match self {
            ParameterExpression::Constant(_) => self.clone(),
            ParameterExpression::Symbol(name) => match assignments.get(name) {
                Some(v) => ParameterExpression::Constant(*v),
                None => self.clone(),
            },
            ParameterExpression::Neg(e) => {
                ParameterExpression::Neg(Box::new(e.bind(assignments)))
            }
            ParameterExpression::Add(a, b) => ParameterExpression::Add(
                Box::new(a.bind(assignments)),
                Box::new(b.bind(assignments)),
            ),
            ParameterExpression::Mul(a, b) => ParameterExpression::Mul(
                Box::new(a.bind(assignments)),
                Box::new(b.bind(assignments)),
            ),
        }
    }
}

impl fmt::Display for ParameterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterExpression::Constant(v) => write!(f, "{v}"),
            ParameterExpression::Symbol(name) => write!(f, "{name}"),
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
    fn test_constant() {
        let p = ParameterExpression::constant(1.5);
        assert!(!p.is_symbolic());
        assert_eq!(p.as_f64(), Some(1.5));
    }

    #[test]
    fn test_indexed_symbol() {
        let p = ParameterExpression::indexed("gamma", 2);
        assert!(p.is_symbolic());
        assert_eq!(p.as_f64(), None);
        assert!(p.symbols().contains("gamma_2"));
    }

    #[test]
    fn test_bind() {
        let p = ParameterExpression::indexed("beta", 0);
        let mut values = HashMap::new();
        values.insert("beta_0".to_string(), 0.25);
        let bound = p.bind(&values);
        assert!(!bound.is_symbolic());
        assert_eq!(bound.as_f64(), Some(0.25));
    }

    #[test]
    fn test_bind_leaves_unassigned_free() {
        let p = ParameterExpression::symbol("theta") + ParameterExpression::symbol("phi");
        let mut values = HashMap::new();
        values.insert("theta".to_string(), 1.0);
        let bound = p.bind(&values);
        assert!(bound.is_symbolic());
        assert_eq!(bound.symbols().len(), 1);
    }

    #[test]
    fn test_arithmetic() {
        let a = ParameterExpression::constant(2.0);
        let b = ParameterExpression::constant(3.0);
        assert_eq!((a.clone() + b.clone()).as_f64(), Some(5.0));
        assert_eq!((a * b).as_f64(), Some(6.0));
        assert_eq!((-ParameterExpression::constant(1.0)).as_f64(), Some(-1.0));
    }
}
