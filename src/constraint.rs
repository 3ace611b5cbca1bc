//! Linear constraints: `expr = 0`, `expr >= 0` or `expr > 0`.

use std::fmt;
use std::fmt::Write;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};

use crate::ascii::Tokens;
use crate::error::{Error, Result};
use crate::linear::LinearExpression;
use crate::variable::Variable;

/// Kind of constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `expr = 0`
    Equality,
    /// `expr >= 0`
    NonStrictInequality,
    /// `expr > 0`
    StrictInequality,
}

/// A linear constraint over exact integer coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    expr: LinearExpression,
    kind: ConstraintKind,
}

impl Constraint {
    /// Creates `expr <kind> 0`, strongly normalized.
    pub fn new(expr: LinearExpression, kind: ConstraintKind) -> Self {
        let mut c = Self { expr, kind };
        c.strong_normalize();
        c
    }

    /// `lhs == rhs`
    pub fn eq(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::Equality)
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::NonStrictInequality)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(rhs.into() - lhs.into(), ConstraintKind::NonStrictInequality)
    }

    /// `lhs > rhs`
    pub fn gt(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), ConstraintKind::StrictInequality)
    }

    /// `lhs < rhs`
    pub fn lt(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(rhs.into() - lhs.into(), ConstraintKind::StrictInequality)
    }

    /// The unsatisfiable constraint `-1 >= 0`.
    pub fn zero_dim_false() -> Self {
        Self::new(LinearExpression::constant(-1), ConstraintKind::NonStrictInequality)
    }

    /// The always-true constraint `0 = 0`.
    pub fn zero_dim_true() -> Self {
        Self::new(LinearExpression::zero(), ConstraintKind::Equality)
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expr
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn space_dimension(&self) -> usize {
        self.expr.space_dimension()
    }

    pub fn coefficient(&self, var: Variable) -> &BigInt {
        self.expr.coefficient(var)
    }

    pub fn inhomogeneous_term(&self) -> &BigInt {
        self.expr.inhomogeneous_term()
    }

    pub fn is_equality(&self) -> bool {
        self.kind == ConstraintKind::Equality
    }

    pub fn is_inequality(&self) -> bool {
        !self.is_equality()
    }

    pub fn is_strict_inequality(&self) -> bool {
        self.kind == ConstraintKind::StrictInequality
    }

    /// Whether the constraint holds everywhere.
    pub fn is_tautological(&self) -> bool {
        if !self.expr.all_homogeneous_terms_are_zero() {
            return false;
        }
        let b = self.expr.inhomogeneous_term();
        match self.kind {
            ConstraintKind::Equality => b.is_zero(),
            ConstraintKind::NonStrictInequality => !b.is_negative(),
            ConstraintKind::StrictInequality => b.is_positive(),
        }
    }

    /// Whether the constraint holds nowhere.
    pub fn is_inconsistent(&self) -> bool {
        self.expr.all_homogeneous_terms_are_zero() && !self.is_tautological()
    }

    /// Whether at most one variable has a non-zero coefficient.
    pub fn is_interval_constraint(&self) -> bool {
        self.expr.num_nonzero_coefficients() <= 1
    }

    /// Divides by the GCD of all coefficients; equalities get a positive leading coefficient.
    pub fn strong_normalize(&mut self) {
        self.expr.normalize();
        if self.is_equality() {
            self.expr.sign_normalize();
        }
    }

    pub(crate) fn set_space_dimension(&mut self, space_dim: usize) {
        self.expr.set_space_dimension(space_dim);
    }

    pub fn ascii_dump(&self) -> String {
        let tag = match self.kind {
            ConstraintKind::Equality => "=",
            ConstraintKind::NonStrictInequality => ">=",
            ConstraintKind::StrictInequality => ">",
        };
        format!("{} {}", self.expr.ascii_dump(), tag)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        let expr = LinearExpression::load_from(tokens)?;
        let kind = match tokens.next_token()? {
            "=" => ConstraintKind::Equality,
            ">=" => ConstraintKind::NonStrictInequality,
            ">" => ConstraintKind::StrictInequality,
            other => return Err(Error::malformed(format!("unknown constraint kind `{}`", other))),
        };
        Ok(Self { expr, kind })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Print `a*x op -b` rather than `a*x + b op 0`.
        let mut lhs = self.expr.clone();
        let rhs = -lhs.inhomogeneous_term().clone();
        lhs.set_inhomogeneous_term(0);
        let op = match self.kind {
            ConstraintKind::Equality => "=",
            ConstraintKind::NonStrictInequality => ">=",
            ConstraintKind::StrictInequality => ">",
        };
        write!(f, "{} {} {}", lhs, op, rhs)
    }
}

/// Ordered collection of constraints sharing a space dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSystem {
    rows: Vec<Constraint>,
    space_dim: usize,
}

impl ConstraintSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(space_dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            space_dim,
        }
    }

    /// The system `{ -1 >= 0 }` in a space of dimension `space_dim`.
    pub fn inconsistent(space_dim: usize) -> Self {
        let mut cs = Self::with_dimension(space_dim);
        cs.insert(Constraint::zero_dim_false());
        cs
    }

    pub fn space_dimension(&self) -> usize {
        self.space_dim
    }

    /// Appends `c`, growing the dimension of the system or of the row to match.
    pub fn insert(&mut self, mut c: Constraint) {
        if c.space_dimension() > self.space_dim {
            self.set_space_dimension(c.space_dimension());
        } else {
            c.set_space_dimension(self.space_dim);
        }
        self.rows.push(c);
    }

    /// Moves every row of `other` into `self`.
    pub fn insert_system(&mut self, other: ConstraintSystem) {
        if other.space_dim > self.space_dim {
            self.set_space_dimension(other.space_dim);
        }
        for c in other.rows {
            self.insert(c);
        }
    }

    pub fn set_space_dimension(&mut self, space_dim: usize) {
        debug_assert!(space_dim >= self.space_dim);
        self.space_dim = space_dim;
        for c in self.rows.iter_mut() {
            c.set_space_dimension(space_dim);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.rows.iter()
    }

    pub fn has_equalities(&self) -> bool {
        self.rows.iter().any(Constraint::is_equality)
    }

    pub fn has_strict_inequalities(&self) -> bool {
        self.rows.iter().any(Constraint::is_strict_inequality)
    }

    pub fn ascii_dump(&self) -> String {
        let mut out = format!("constraints {} dim {}\n", self.rows.len(), self.space_dim);
        for c in &self.rows {
            writeln!(out, "{}", c.ascii_dump()).ok();
        }
        out
    }

    pub fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let cs = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(cs)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("constraints")?;
        let num_rows: usize = tokens.parse()?;
        tokens.expect("dim")?;
        let space_dim: usize = tokens.parse()?;
        let mut cs = Self::with_dimension(space_dim);
        for _ in 0..num_rows {
            let c = Constraint::load_from(tokens)?;
            if c.space_dimension() != space_dim {
                return Err(Error::malformed(format!(
                    "constraint of dimension {} in a system of dimension {}",
                    c.space_dimension(),
                    space_dim
                )));
            }
            cs.rows.push(c);
        }
        Ok(cs)
    }
}

impl From<Constraint> for ConstraintSystem {
    fn from(c: Constraint) -> Self {
        let mut cs = ConstraintSystem::new();
        cs.insert(c);
        cs
    }
}

impl FromIterator<Constraint> for ConstraintSystem {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut cs = ConstraintSystem::new();
        for c in iter {
            cs.insert(c);
        }
        cs
    }
}

impl IntoIterator for ConstraintSystem {
    type Item = Constraint;
    type IntoIter = std::vec::IntoIter<Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintSystem {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for ConstraintSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "true");
        }
        for (i, c) in self.rows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}
