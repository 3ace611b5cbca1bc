//! Linear congruences: `expr ≡ 0 (mod m)`.
//!
//! A modulus of zero turns the congruence into the equality `expr = 0`.
//! Congruences with a positive modulus are called *proper*.

use std::fmt;
use std::fmt::Write;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::ascii::Tokens;
use crate::coefficient::{gcd, lcm};
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::grid_generator::{GridGenerator, GridGeneratorType};
use crate::linear::LinearExpression;
use crate::normalize::LatticeRow;
use crate::variable::Variable;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Congruence {
    expr: LinearExpression,
    modulus: BigInt,
}

impl Congruence {
    /// Creates `expr ≡ 0 (mod |modulus|)`, normalized.
    pub fn new(expr: LinearExpression, modulus: impl Into<BigInt>) -> Self {
        let mut cg = Self {
            expr,
            modulus: modulus.into().abs(),
        };
        cg.strong_normalize();
        cg
    }

    /// `lhs ≡ rhs (mod modulus)`
    pub fn modular(
        lhs: impl Into<LinearExpression>,
        rhs: impl Into<LinearExpression>,
        modulus: impl Into<BigInt>,
    ) -> Self {
        Self::new(lhs.into() - rhs.into(), modulus)
    }

    /// `lhs = rhs`
    pub fn equality(lhs: impl Into<LinearExpression>, rhs: impl Into<LinearExpression>) -> Self {
        Self::new(lhs.into() - rhs.into(), 0)
    }

    /// The congruence `1 ≡ 0 (mod 1)`, satisfied by every point.
    pub fn zero_dim_integrality() -> Self {
        Self {
            expr: LinearExpression::constant(1),
            modulus: BigInt::one(),
        }
    }

    /// The unsatisfiable equality `1 = 0`.
    pub fn zero_dim_false() -> Self {
        Self {
            expr: LinearExpression::constant(1),
            modulus: BigInt::zero(),
        }
    }

    /// Builds a congruence without normalizing it.
    pub(crate) fn from_parts(expr: LinearExpression, modulus: BigInt) -> Self {
        debug_assert!(!modulus.is_negative());
        Self { expr, modulus }
    }

    /// The equality corresponding to an equality constraint.
    pub fn from_equality_constraint(c: &Constraint) -> Option<Self> {
        c.is_equality().then(|| Self::new(c.expression().clone(), 0))
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expr
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
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
        self.modulus.is_zero()
    }

    pub fn is_proper_congruence(&self) -> bool {
        self.modulus.is_positive()
    }

    /// Whether the congruence holds everywhere.
    pub fn is_tautological(&self) -> bool {
        if !self.expr.all_homogeneous_terms_are_zero() {
            return false;
        }
        let b = self.expr.inhomogeneous_term();
        if self.is_equality() {
            b.is_zero()
        } else {
            b.is_multiple_of(&self.modulus)
        }
    }

    /// Whether the congruence holds nowhere.
    pub fn is_inconsistent(&self) -> bool {
        self.expr.all_homogeneous_terms_are_zero() && !self.is_tautological()
    }

    /// Divides expression and modulus by their common GCD; reduces the inhomogeneous term.
    ///
    /// Equalities get a positive leading coefficient; the inhomogeneous term of a
    /// proper congruence ends up in `[0, m)`.
    pub fn strong_normalize(&mut self) {
        let g = gcd(&self.expr.gcd(), &self.modulus);
        if !g.is_zero() && !g.is_one() {
            self.expr.exact_div_assign(&g);
            self.modulus /= &g;
        }
        if self.is_equality() {
            self.expr.sign_normalize();
        } else {
            let b = self.expr.inhomogeneous_term().mod_floor(&self.modulus);
            self.expr.set_inhomogeneous_term(b);
        }
    }

    /// Multiplies expression and modulus by `factor > 0`.
    pub(crate) fn scale(&mut self, factor: &BigInt) {
        debug_assert!(factor.is_positive());
        self.expr *= factor;
        self.modulus *= factor;
    }

    pub(crate) fn set_space_dimension(&mut self, space_dim: usize) {
        self.expr.set_space_dimension(space_dim);
    }

    /// Whether `value` (a number, the value of `expr` somewhere) satisfies the congruence.
    fn admits(&self, value: &BigInt, scale: &BigInt) -> bool {
        // `value / scale` must be a multiple of the modulus.
        if self.is_equality() {
            value.is_zero()
        } else {
            value.is_multiple_of(&(&self.modulus * scale))
        }
    }

    /// Whether every point of the grid direction/anchor `g` is compatible with the congruence.
    ///
    /// - a point must satisfy it;
    /// - a parameter must be a step that preserves it;
    /// - a line must be orthogonal to it.
    pub fn is_satisfied_by(&self, g: &GridGenerator) -> bool {
        let dot = self.expr.homogeneous_scalar_product(g.expression());
        match g.type_() {
            GridGeneratorType::Point => {
                let d = g.expression().inhomogeneous_term();
                let value = self.expr.inhomogeneous_term() * d + dot;
                self.admits(&value, d)
            }
            GridGeneratorType::Parameter => self.admits(&dot, g.parameter_divisor()),
            GridGeneratorType::Line => dot.is_zero(),
        }
    }

    pub fn ascii_dump(&self) -> String {
        format!("{} m {}", self.expr.ascii_dump(), self.modulus)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        let expr = LinearExpression::load_from(tokens)?;
        tokens.expect("m")?;
        let modulus: BigInt = tokens.parse()?;
        if modulus.is_negative() {
            return Err(Error::malformed(format!("negative modulus {}", modulus)));
        }
        Ok(Self { expr, modulus })
    }
}

impl LatticeRow for Congruence {
    fn num_columns(&self) -> usize {
        self.expr.space_dimension() + 1
    }

    fn column(&self, col: usize) -> &BigInt {
        self.expr.get(col)
    }

    fn column_mut(&mut self, col: usize) -> &mut BigInt {
        self.expr.get_mut(col)
    }

    fn is_line_or_equality(&self) -> bool {
        self.is_equality()
    }

    fn scale(&mut self, factor: &BigInt) {
        Congruence::scale(self, factor)
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lhs = self.expr.clone();
        let rhs = -lhs.inhomogeneous_term().clone();
        lhs.set_inhomogeneous_term(0);
        if self.is_equality() {
            write!(f, "{} = {}", lhs, rhs)
        } else {
            write!(f, "{} ≡ {} (mod {})", lhs, rhs, self.modulus)
        }
    }
}

/// Ordered collection of congruences sharing a space dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CongruenceSystem {
    rows: Vec<Congruence>,
    space_dim: usize,
}

impl CongruenceSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(space_dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            space_dim,
        }
    }

    /// The system `{ 1 = 0 }` in a space of dimension `space_dim`.
    pub fn inconsistent(space_dim: usize) -> Self {
        let mut cgs = Self::with_dimension(space_dim);
        cgs.insert(Congruence::zero_dim_false());
        cgs
    }

    pub fn space_dimension(&self) -> usize {
        self.space_dim
    }

    /// Appends `cg`, growing the dimension of the system or of the row to match.
    pub fn insert(&mut self, mut cg: Congruence) {
        if cg.space_dimension() > self.space_dim {
            self.set_space_dimension(cg.space_dimension());
        } else {
            cg.set_space_dimension(self.space_dim);
        }
        self.rows.push(cg);
    }

    /// Moves every row of `other` into `self`.
    pub fn insert_system(&mut self, other: CongruenceSystem) {
        if other.space_dim > self.space_dim {
            self.set_space_dimension(other.space_dim);
        }
        for cg in other.rows {
            self.insert(cg);
        }
    }

    pub fn set_space_dimension(&mut self, space_dim: usize) {
        debug_assert!(space_dim >= self.space_dim);
        self.space_dim = space_dim;
        for cg in self.rows.iter_mut() {
            cg.set_space_dimension(space_dim);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Congruence> {
        self.rows.iter()
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Congruence> {
        &mut self.rows
    }

    pub fn num_equalities(&self) -> usize {
        self.rows.iter().filter(|cg| cg.is_equality()).count()
    }

    pub fn num_proper_congruences(&self) -> usize {
        self.rows.iter().filter(|cg| cg.is_proper_congruence()).count()
    }

    pub fn has_linear_equalities(&self) -> bool {
        self.rows.iter().any(Congruence::is_equality)
    }

    /// Rescales every proper congruence to the LCM of all moduli.
    ///
    /// Returns the common modulus (one when there is no proper congruence).
    pub fn normalize_moduli(&mut self) -> BigInt {
        let common = self
            .rows
            .iter()
            .filter(|cg| cg.is_proper_congruence())
            .fold(BigInt::one(), |acc, cg| lcm(&acc, cg.modulus()));
        for cg in self.rows.iter_mut().filter(|cg| cg.is_proper_congruence()) {
            if cg.modulus != common {
                let factor = &common / &cg.modulus;
                cg.scale(&factor);
            }
        }
        common
    }

    /// Whether the point generator `g` satisfies every row.
    pub fn is_satisfied_by(&self, g: &GridGenerator) -> bool {
        self.rows.iter().all(|cg| cg.is_satisfied_by(g))
    }

    pub fn ascii_dump(&self) -> String {
        let mut out = format!("congruences {} dim {}\n", self.rows.len(), self.space_dim);
        for cg in &self.rows {
            writeln!(out, "{}", cg.ascii_dump()).ok();
        }
        out
    }

    pub fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let cgs = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(cgs)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("congruences")?;
        let num_rows: usize = tokens.parse()?;
        tokens.expect("dim")?;
        let space_dim: usize = tokens.parse()?;
        let mut cgs = Self::with_dimension(space_dim);
        for _ in 0..num_rows {
            let cg = Congruence::load_from(tokens)?;
            if cg.space_dimension() != space_dim {
                return Err(Error::malformed(format!(
                    "congruence of dimension {} in a system of dimension {}",
                    cg.space_dimension(),
                    space_dim
                )));
            }
            cgs.rows.push(cg);
        }
        Ok(cgs)
    }
}

impl From<Congruence> for CongruenceSystem {
    fn from(cg: Congruence) -> Self {
        let mut cgs = CongruenceSystem::new();
        cgs.insert(cg);
        cgs
    }
}

impl FromIterator<Congruence> for CongruenceSystem {
    fn from_iter<I: IntoIterator<Item = Congruence>>(iter: I) -> Self {
        let mut cgs = CongruenceSystem::new();
        for cg in iter {
            cgs.insert(cg);
        }
        cgs
    }
}

impl IntoIterator for CongruenceSystem {
    type Item = Congruence;
    type IntoIter = std::vec::IntoIter<Congruence>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a CongruenceSystem {
    type Item = &'a Congruence;
    type IntoIter = std::slice::Iter<'a, Congruence>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for CongruenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "true");
        }
        for (i, cg) in self.rows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", cg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_normalization() {
        let x = Variable::new(0);
        // 4x + 6 ≡ 0 (mod 8)  ~  2x + 3 ≡ 0 (mod 4)
        let cg = Congruence::new(x * 4 + 6, 8);
        assert_eq!(cg.modulus(), &int(4));
        assert_eq!(cg.expression(), &LinearExpression::from_coefficients([2], 3));

        // x ≡ -1 (mod 3)  ~  x + 1 ≡ 0 (mod 3)
        let cg = Congruence::modular(x, -1, -3);
        assert_eq!(cg.modulus(), &int(3));
        assert_eq!(cg.inhomogeneous_term(), &int(1));

        // x ≡ 5 (mod 3)  ~  x + 1 ≡ 0 (mod 3)
        let cg2 = Congruence::modular(x, 5, 3);
        assert_eq!(cg, cg2);

        let eq = Congruence::equality(-2 * x, 4);
        assert!(eq.is_equality());
        assert_eq!(eq.expression(), &LinearExpression::from_coefficients([1], 2));
    }

    #[test]
    fn test_trivial() {
        assert!(Congruence::zero_dim_integrality().is_tautological());
        assert!(Congruence::zero_dim_false().is_inconsistent());
        assert!(Congruence::new(LinearExpression::constant(3), 2).is_inconsistent());
        assert!(Congruence::new(LinearExpression::constant(4), 2).is_tautological());
    }

    #[test]
    fn test_normalize_moduli() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut cgs: CongruenceSystem = [
            Congruence::modular(x, 0, 2),
            Congruence::modular(y, 1, 3),
            Congruence::equality(x, y),
        ]
        .into_iter()
        .collect();
        let m = cgs.normalize_moduli();
        assert_eq!(m, int(6));
        for cg in &cgs {
            assert!(cg.is_equality() || cg.modulus() == &int(6));
        }
        assert_eq!(cgs.num_equalities(), 1);
        assert_eq!(cgs.num_proper_congruences(), 2);
    }

    #[test]
    fn test_satisfied_by() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let even = Congruence::modular(x + y, 0, 2);
        let p = GridGenerator::grid_point(LinearExpression::from_coefficients([1, 3], 0), 1).unwrap();
        assert!(even.is_satisfied_by(&p));
        let p = GridGenerator::grid_point(LinearExpression::from_coefficients([1, 2], 0), 1).unwrap();
        assert!(!even.is_satisfied_by(&p));
        // (1/2, 3/2) sums to 2.
        let p = GridGenerator::grid_point(LinearExpression::from_coefficients([1, 3], 0), 2).unwrap();
        assert!(even.is_satisfied_by(&p));
        let q = GridGenerator::parameter(LinearExpression::from_coefficients([1, 1], 0), 1).unwrap();
        assert!(even.is_satisfied_by(&q));
        let q = GridGenerator::parameter(LinearExpression::from_coefficients([1, 0], 0), 1).unwrap();
        assert!(!even.is_satisfied_by(&q));
        let l = GridGenerator::grid_line(LinearExpression::from_coefficients([1, -1], 0)).unwrap();
        assert!(even.is_satisfied_by(&l));
    }

    #[test]
    fn test_ascii_round_trip() {
        let x = Variable::new(0);
        let cgs: CongruenceSystem = [Congruence::modular(x, 1, 4), Congruence::equality(x * 2, 6)]
            .into_iter()
            .collect();
        let loaded = CongruenceSystem::ascii_load(&cgs.ascii_dump()).unwrap();
        assert_eq!(loaded, cgs);
        assert!(CongruenceSystem::ascii_load("congruences 1 dim 1\nsize 2 1 1 m -2\n").is_err());
        assert!(CongruenceSystem::ascii_load("congruences 1 dim 1\nsize 2 1 1 q 2\n").is_err());
    }
}
