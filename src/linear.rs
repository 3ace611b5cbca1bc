//! Linear expressions with exact integer coefficients.
//!
//! A [`LinearExpression`] `b + a_0*x0 + ... + a_{n-1}*x{n-1}` is stored as a
//! single row: column 0 holds the inhomogeneous term `b` and column `i + 1`
//! holds the coefficient of `Variable(i)`. Every row type in the crate
//! (constraints, congruences, generators) is built on top of this layout, so
//! the row-reduction algorithms can address "column 0" uniformly.

use std::fmt;
use std::fmt::Write;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::ascii::Tokens;
use crate::coefficient::{gcd_all, ZERO};
use crate::error::{check_dimension, Error, Result};
use crate::variable::Variable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinearExpression {
    row: Vec<BigInt>,
}

impl Default for LinearExpression {
    fn default() -> Self {
        Self::zero()
    }
}

impl LinearExpression {
    /// The zero expression in the zero-dimensional space.
    pub fn zero() -> Self {
        Self {
            row: vec![BigInt::zero()],
        }
    }

    /// The zero expression in a space of dimension `space_dim`.
    pub fn with_dimension(space_dim: usize) -> Self {
        Self {
            row: vec![BigInt::zero(); space_dim + 1],
        }
    }

    pub fn constant(value: impl Into<BigInt>) -> Self {
        Self {
            row: vec![value.into()],
        }
    }

    pub fn variable(var: Variable) -> Self {
        let mut e = Self::with_dimension(var.space_dimension());
        e.row[var.id() + 1] = BigInt::one();
        e
    }

    /// Builds `inhomogeneous + sum(coefficients[i] * x_i)`.
    pub fn from_coefficients<I, T>(coefficients: I, inhomogeneous: impl Into<BigInt>) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<BigInt>,
    {
        let mut row = vec![inhomogeneous.into()];
        row.extend(coefficients.into_iter().map(Into::into));
        Self { row }
    }

    pub fn space_dimension(&self) -> usize {
        self.row.len() - 1
    }

    /// Grows (or shrinks, dropping trailing coefficients) the space dimension.
    pub fn set_space_dimension(&mut self, space_dim: usize) {
        self.row.resize(space_dim + 1, BigInt::zero());
    }

    pub fn inhomogeneous_term(&self) -> &BigInt {
        &self.row[0]
    }

    pub fn set_inhomogeneous_term(&mut self, value: impl Into<BigInt>) {
        self.row[0] = value.into();
    }

    /// Coefficient of `var`; zero past the space dimension.
    pub fn coefficient(&self, var: Variable) -> &BigInt {
        self.get(var.id() + 1)
    }

    /// Sets the coefficient of `var`, growing the space dimension if needed.
    pub fn set_coefficient(&mut self, var: Variable, value: impl Into<BigInt>) {
        if var.space_dimension() > self.space_dimension() {
            self.set_space_dimension(var.space_dimension());
        }
        self.row[var.id() + 1] = value.into();
    }

    /// Raw column access (column 0 is the inhomogeneous term); zero past the end.
    pub fn get(&self, col: usize) -> &BigInt {
        self.row.get(col).unwrap_or(&ZERO)
    }

    /// Mutable raw column access; `col` must be within the row.
    pub(crate) fn get_mut(&mut self, col: usize) -> &mut BigInt {
        &mut self.row[col]
    }

    pub(crate) fn columns(&self) -> &[BigInt] {
        &self.row
    }

    /// Homogeneous coefficients, indexed by dimension.
    pub fn homogeneous_coefficients(&self) -> &[BigInt] {
        &self.row[1..]
    }

    pub fn is_zero(&self) -> bool {
        self.row.iter().all(Zero::is_zero)
    }

    pub fn all_homogeneous_terms_are_zero(&self) -> bool {
        self.row[1..].iter().all(Zero::is_zero)
    }

    /// Index of the last variable with a non-zero coefficient.
    pub fn last_nonzero(&self) -> Option<Variable> {
        (1..self.row.len()).rev().find(|&c| !self.row[c].is_zero()).map(|c| Variable::new(c - 1))
    }

    /// Number of variables with a non-zero coefficient.
    pub fn num_nonzero_coefficients(&self) -> usize {
        self.row[1..].iter().filter(|c| !c.is_zero()).count()
    }

    /// Non-negative GCD of the homogeneous coefficients.
    pub fn homogeneous_gcd(&self) -> BigInt {
        gcd_all(&self.row[1..])
    }

    /// Non-negative GCD of every column.
    pub fn gcd(&self) -> BigInt {
        gcd_all(&self.row)
    }

    /// Full scalar product, column 0 included.
    pub fn scalar_product(&self, other: &LinearExpression) -> BigInt {
        self.row.iter().zip(other.row.iter()).map(|(a, b)| a * b).sum()
    }

    /// Scalar product of the homogeneous parts only.
    pub fn homogeneous_scalar_product(&self, other: &LinearExpression) -> BigInt {
        self.row[1..].iter().zip(other.row[1..].iter()).map(|(a, b)| a * b).sum()
    }

    /// Scalar product of the homogeneous part with a vector of coordinates.
    pub fn homogeneous_dot(&self, coords: &[BigInt]) -> BigInt {
        self.row[1..].iter().zip(coords.iter()).map(|(a, b)| a * b).sum()
    }

    /// Divides every column by `divisor`, which must divide all of them.
    pub(crate) fn exact_div_assign(&mut self, divisor: &BigInt) {
        for c in self.row.iter_mut() {
            debug_assert!((&*c % divisor).is_zero());
            *c /= divisor;
        }
    }

    /// Negates columns `start..end`.
    pub(crate) fn negate_range(&mut self, start: usize, end: usize) {
        for c in &mut self.row[start..end] {
            *c = -std::mem::take(c);
        }
    }

    /// Divides by the GCD of all columns.
    pub fn normalize(&mut self) {
        let g = self.gcd();
        if !g.is_zero() && !g.is_one() {
            self.exact_div_assign(&g);
        }
    }

    /// Makes the first non-zero homogeneous coefficient positive.
    ///
    /// Returns whether the expression was negated.
    pub fn sign_normalize(&mut self) -> bool {
        match self.row[1..].iter().find(|c| !c.is_zero()) {
            Some(first) if first.is_negative() => {
                let end = self.row.len();
                self.negate_range(0, end);
                true
            }
            _ => false,
        }
    }

    pub fn swap_space_dimensions(&mut self, v1: Variable, v2: Variable) -> Result<()> {
        const METHOD: &str = "LinearExpression::swap_space_dimensions";
        check_dimension(METHOD, "variable", self.space_dimension(), v1.space_dimension())?;
        check_dimension(METHOD, "variable", self.space_dimension(), v2.space_dimension())?;
        self.row.swap(v1.id() + 1, v2.id() + 1);
        Ok(())
    }

    /// Applies the cycle `a -> b -> c -> a` to the coefficients.
    pub fn permute_space_dimensions(&mut self, cycle: &[Variable]) -> Result<()> {
        for v in cycle {
            check_dimension(
                "LinearExpression::permute_space_dimensions",
                "variable",
                self.space_dimension(),
                v.space_dimension(),
            )?;
        }
        if cycle.len() < 2 {
            return Ok(());
        }
        // The coefficient of the last variable moves to the first one.
        let last = std::mem::take(&mut self.row[cycle[cycle.len() - 1].id() + 1]);
        for i in (1..cycle.len()).rev() {
            let value = std::mem::take(&mut self.row[cycle[i - 1].id() + 1]);
            self.row[cycle[i].id() + 1] = value;
        }
        self.row[cycle[0].id() + 1] = last;
        Ok(())
    }

    /// Removes the given dimensions, shifting the remaining ones down.
    pub fn remove_space_dimensions(&mut self, vars: &crate::variable::VariablesSet) {
        let mut col = 0;
        self.row.retain(|_| {
            let keep = col == 0 || !vars.contains(&Variable::new(col - 1));
            col += 1;
            keep
        });
    }

    /// Dumps as `size <n> c0 c1 ... c(n-1)`.
    pub fn ascii_dump(&self) -> String {
        let mut out = format!("size {}", self.row.len());
        for c in &self.row {
            write!(out, " {}", c).ok();
        }
        out
    }

    pub fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let e = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(e)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("size")?;
        let size: usize = tokens.parse()?;
        if size == 0 {
            return Err(Error::malformed("linear expression must have at least one column"));
        }
        let row = (0..size).map(|_| tokens.parse::<BigInt>()).collect::<Result<Vec<_>>>()?;
        Ok(Self { row })
    }

    fn matching_dimension(&mut self, other: &LinearExpression) {
        if other.row.len() > self.row.len() {
            self.row.resize(other.row.len(), BigInt::zero());
        }
    }
}

impl From<Variable> for LinearExpression {
    fn from(var: Variable) -> Self {
        LinearExpression::variable(var)
    }
}

macro_rules! impl_scalar_ops {
    ($($t:ty),*) => {$(
        impl From<$t> for LinearExpression {
            fn from(value: $t) -> Self {
                LinearExpression::constant(value)
            }
        }

        impl Mul<$t> for LinearExpression {
            type Output = LinearExpression;

            fn mul(mut self, rhs: $t) -> LinearExpression {
                self *= &BigInt::from(rhs);
                self
            }
        }

        impl Mul<$t> for Variable {
            type Output = LinearExpression;

            fn mul(self, rhs: $t) -> LinearExpression {
                LinearExpression::from(self) * rhs
            }
        }

        impl Mul<Variable> for $t {
            type Output = LinearExpression;

            fn mul(self, rhs: Variable) -> LinearExpression {
                LinearExpression::from(rhs) * self
            }
        }
    )*};
}

impl_scalar_ops!(i32, i64);

impl From<BigInt> for LinearExpression {
    fn from(value: BigInt) -> Self {
        LinearExpression::constant(value)
    }
}

impl fmt::Display for LinearExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, c) in self.row[1..].iter().enumerate() {
            if c.is_zero() {
                continue;
            }
            let var = Variable::new(i);
            let abs = c.abs();
            if first {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            if abs.is_one() {
                write!(f, "{}", var)?;
            } else {
                write!(f, "{}*{}", abs, var)?;
            }
            first = false;
        }
        let b = &self.row[0];
        if first {
            write!(f, "{}", b)?;
        } else if b.is_positive() {
            write!(f, " + {}", b)?;
        } else if b.is_negative() {
            write!(f, " - {}", b.abs())?;
        }
        Ok(())
    }
}

impl AddAssign<&LinearExpression> for LinearExpression {
    fn add_assign(&mut self, rhs: &LinearExpression) {
        self.matching_dimension(rhs);
        for (a, b) in self.row.iter_mut().zip(rhs.row.iter()) {
            *a += b;
        }
    }
}

impl SubAssign<&LinearExpression> for LinearExpression {
    fn sub_assign(&mut self, rhs: &LinearExpression) {
        self.matching_dimension(rhs);
        for (a, b) in self.row.iter_mut().zip(rhs.row.iter()) {
            *a -= b;
        }
    }
}

impl MulAssign<&BigInt> for LinearExpression {
    fn mul_assign(&mut self, rhs: &BigInt) {
        for a in self.row.iter_mut() {
            *a *= rhs;
        }
    }
}

impl<T: Into<LinearExpression>> Add<T> for LinearExpression {
    type Output = LinearExpression;

    fn add(mut self, rhs: T) -> LinearExpression {
        self += &rhs.into();
        self
    }
}

impl<T: Into<LinearExpression>> Sub<T> for LinearExpression {
    type Output = LinearExpression;

    fn sub(mut self, rhs: T) -> LinearExpression {
        self -= &rhs.into();
        self
    }
}

impl Neg for LinearExpression {
    type Output = LinearExpression;

    fn neg(mut self) -> LinearExpression {
        let end = self.row.len();
        self.negate_range(0, end);
        self
    }
}

impl Mul<&BigInt> for LinearExpression {
    type Output = LinearExpression;

    fn mul(mut self, rhs: &BigInt) -> LinearExpression {
        self *= rhs;
        self
    }
}

impl<T: Into<LinearExpression>> Add<T> for Variable {
    type Output = LinearExpression;

    fn add(self, rhs: T) -> LinearExpression {
        LinearExpression::from(self) + rhs
    }
}

impl<T: Into<LinearExpression>> Sub<T> for Variable {
    type Output = LinearExpression;

    fn sub(self, rhs: T) -> LinearExpression {
        LinearExpression::from(self) - rhs
    }
}

impl Neg for Variable {
    type Output = LinearExpression;

    fn neg(self) -> LinearExpression {
        -LinearExpression::from(self)
    }
}
