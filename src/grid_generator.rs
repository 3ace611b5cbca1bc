//! Grid generators: the lines, parameters and points that generate a grid.
//!
//! A grid generator is a [`LinearExpression`] plus one extra *divisor column*:
//!
//! | Type      | column 0 (inhomogeneous) | divisor column |
//! |-----------|--------------------------|----------------|
//! | Line      | 0                        | 0              |
//! | Parameter | 0                        | `d > 0`        |
//! | Point     | `d > 0`                  | 0              |
//!
//! A point `p` with divisor `d` stands for the rational point `p/d`; a
//! parameter `q` with divisor `d` for the rational direction `q/d`, which may
//! be added to a point any integer number of times; a line for a direction
//! that may be added any real number of times.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;

use crate::ascii::Tokens;
use crate::coefficient::gcd;
use crate::error::{check_dimension, Error, Result};
use crate::generator::Generator;
use crate::linear::LinearExpression;
use crate::normalize::LatticeRow;
use crate::variable::{Variable, VariablesSet};

/// The stored type of a grid generator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridGeneratorType {
    Line,
    Parameter,
    Point,
}

impl GridGeneratorType {
    fn tag(self) -> &'static str {
        match self {
            GridGeneratorType::Line => "L",
            GridGeneratorType::Parameter => "Q",
            GridGeneratorType::Point => "P",
        }
    }
}

static ZERO_DIM_POINT: Lazy<GridGenerator> = Lazy::new(|| GridGenerator {
    expr: LinearExpression::constant(1),
    divisor_column: BigInt::zero(),
    kind: GridGeneratorType::Point,
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GridGenerator {
    expr: LinearExpression,
    divisor_column: BigInt,
    kind: GridGeneratorType,
}

impl GridGenerator {
    /// A line with direction `expr`; the inhomogeneous term is ignored.
    pub fn grid_line(mut expr: LinearExpression) -> Result<Self> {
        if expr.all_homogeneous_terms_are_zero() {
            return Err(Error::invalid_argument(
                "GridGenerator::grid_line",
                "the origin cannot be a line",
            ));
        }
        expr.set_inhomogeneous_term(0);
        let mut g = Self {
            expr,
            divisor_column: BigInt::zero(),
            kind: GridGeneratorType::Line,
        };
        g.strong_normalize();
        Ok(g)
    }

    /// The parameter `expr / divisor`; the inhomogeneous term is ignored.
    pub fn parameter(mut expr: LinearExpression, divisor: impl Into<BigInt>) -> Result<Self> {
        let divisor = divisor.into();
        if divisor.is_zero() {
            return Err(Error::invalid_argument("GridGenerator::parameter", "zero divisor"));
        }
        expr.set_inhomogeneous_term(0);
        let mut g = Self {
            expr,
            divisor_column: divisor,
            kind: GridGeneratorType::Parameter,
        };
        if g.divisor_column.is_negative() {
            g.negate();
        }
        g.strong_normalize();
        Ok(g)
    }

    /// The point `expr / divisor`; the inhomogeneous term is ignored.
    pub fn grid_point(mut expr: LinearExpression, divisor: impl Into<BigInt>) -> Result<Self> {
        let divisor = divisor.into();
        if divisor.is_zero() {
            return Err(Error::invalid_argument("GridGenerator::grid_point", "zero divisor"));
        }
        expr.set_inhomogeneous_term(divisor);
        let mut g = Self {
            expr,
            divisor_column: BigInt::zero(),
            kind: GridGeneratorType::Point,
        };
        if g.expr.inhomogeneous_term().is_negative() {
            g.negate();
        }
        g.strong_normalize();
        Ok(g)
    }

    /// The parameter `expr` (divisor one).
    pub fn parameter_unit(mut expr: LinearExpression) -> Self {
        expr.set_inhomogeneous_term(0);
        let mut g = Self {
            expr,
            divisor_column: BigInt::one(),
            kind: GridGeneratorType::Parameter,
        };
        g.strong_normalize();
        g
    }

    /// The point `expr` (divisor one).
    pub fn grid_point_unit(mut expr: LinearExpression) -> Self {
        expr.set_inhomogeneous_term(1);
        Self {
            expr,
            divisor_column: BigInt::zero(),
            kind: GridGeneratorType::Point,
        }
    }

    /// The only point of the zero-dimensional space.
    pub fn zero_dim_point() -> &'static GridGenerator {
        &ZERO_DIM_POINT
    }

    /// Builds a generator from raw parts; the type invariants must already hold.
    pub(crate) fn from_parts(expr: LinearExpression, divisor_column: BigInt, kind: GridGeneratorType) -> Self {
        Self {
            expr,
            divisor_column,
            kind,
        }
    }

    fn negate(&mut self) {
        self.expr = -std::mem::take(&mut self.expr);
        self.divisor_column = -std::mem::take(&mut self.divisor_column);
    }

    pub fn type_(&self) -> GridGeneratorType {
        self.kind
    }

    pub fn is_line(&self) -> bool {
        self.kind == GridGeneratorType::Line
    }

    pub fn is_parameter(&self) -> bool {
        self.kind == GridGeneratorType::Parameter
    }

    pub fn is_point(&self) -> bool {
        self.kind == GridGeneratorType::Point
    }

    pub fn is_line_or_parameter(&self) -> bool {
        self.kind != GridGeneratorType::Point
    }

    pub fn is_parameter_or_point(&self) -> bool {
        self.kind != GridGeneratorType::Line
    }

    pub fn all_homogeneous_terms_are_zero(&self) -> bool {
        self.expr.all_homogeneous_terms_are_zero()
    }

    pub fn space_dimension(&self) -> usize {
        self.expr.space_dimension()
    }

    /// The row without its divisor column.
    pub fn expression(&self) -> &LinearExpression {
        &self.expr
    }

    pub(crate) fn expression_mut(&mut self) -> &mut LinearExpression {
        &mut self.expr
    }

    /// The divisor column: the divisor of a parameter, zero otherwise.
    pub fn parameter_divisor(&self) -> &BigInt {
        &self.divisor_column
    }

    /// Divisor of a point or parameter.
    pub fn divisor(&self) -> Result<&BigInt> {
        match self.kind {
            GridGeneratorType::Point => Ok(self.expr.inhomogeneous_term()),
            GridGeneratorType::Parameter => Ok(&self.divisor_column),
            GridGeneratorType::Line => Err(Error::invalid_argument("GridGenerator::divisor", "a line has no divisor")),
        }
    }

    /// Coefficient of `var`, which must lie in the space of the generator.
    pub fn coefficient(&self, var: Variable) -> Result<&BigInt> {
        if var.space_dimension() > self.space_dimension() {
            return Err(Error::dimension_incompatible(
                "GridGenerator::coefficient",
                "variable",
                self.space_dimension(),
                var.space_dimension(),
            ));
        }
        Ok(self.expr.coefficient(var))
    }

    /// Changes the type of the row, fixing the divisor column to match.
    ///
    /// A parameter gets `divisor`; a point or line gets zero.
    pub(crate) fn set_type(&mut self, kind: GridGeneratorType, divisor: &BigInt) {
        self.kind = kind;
        self.divisor_column = match kind {
            GridGeneratorType::Parameter => divisor.clone(),
            _ => BigInt::zero(),
        };
    }

    /// Divides every column by their positive GCD; lines also get a positive
    /// leading coefficient.
    pub fn strong_normalize(&mut self) {
        let g = gcd(&self.expr.gcd(), &self.divisor_column);
        if !g.is_zero() && !g.is_one() {
            self.expr.exact_div_assign(&g);
            self.divisor_column /= &g;
        }
        if self.is_line() {
            self.expr.sign_normalize();
        }
    }

    /// Rescales a point or parameter so that its divisor becomes `divisor`.
    ///
    /// `divisor` must be a positive multiple of the current divisor. Lines are left alone.
    pub fn scale_to_divisor(&mut self, divisor: &BigInt) -> Result<()> {
        if self.is_line() {
            return Ok(());
        }
        let current = self.divisor()?;
        if !divisor.is_positive() || !divisor.is_multiple_of(current) {
            return Err(Error::invalid_argument(
                "GridGenerator::scale_to_divisor",
                format!("{} is not a positive multiple of {}", divisor, current),
            ));
        }
        self.rescale_to_divisor(divisor);
        Ok(())
    }

    /// Unchecked [`scale_to_divisor`](Self::scale_to_divisor): `divisor` must be
    /// a positive multiple of the current divisor. Lines are left alone.
    pub(crate) fn rescale_to_divisor(&mut self, divisor: &BigInt) {
        let current = match self.kind {
            GridGeneratorType::Line => return,
            GridGeneratorType::Parameter => &self.divisor_column,
            GridGeneratorType::Point => self.expr.inhomogeneous_term(),
        };
        debug_assert!(divisor.is_positive() && divisor.is_multiple_of(current));
        let factor = divisor / current;
        if !factor.is_one() {
            self.expr *= &factor;
            self.divisor_column *= &factor;
        }
    }

    /// Syntactic equality.
    pub fn is_equal_to(&self, other: &GridGenerator) -> bool {
        self == other
    }

    /// Whether both generators denote the same geometric object.
    pub fn is_equivalent_to(&self, other: &GridGenerator) -> bool {
        if self.kind != other.kind || self.space_dimension() != other.space_dimension() {
            return false;
        }
        let mut a = self.clone();
        let mut b = other.clone();
        if !a.is_parameter() {
            a.divisor_column.set_zero();
            b.divisor_column.set_zero();
        }
        a.strong_normalize();
        b.strong_normalize();
        a.is_equal_to(&b)
    }

    fn renormalize_line(&mut self) {
        if self.is_line() {
            self.expr.sign_normalize();
        }
    }

    pub fn swap_space_dimensions(&mut self, v1: Variable, v2: Variable) -> Result<()> {
        const METHOD: &str = "GridGenerator::swap_space_dimensions";
        check_dimension(METHOD, "variable", self.space_dimension(), v1.space_dimension())?;
        check_dimension(METHOD, "variable", self.space_dimension(), v2.space_dimension())?;
        self.expr.swap_space_dimensions(v1, v2)?;
        self.renormalize_line();
        Ok(())
    }

    /// Applies the cycle `a -> b -> ... -> a` to the coordinates.
    pub fn permute_space_dimensions(&mut self, cycle: &[Variable]) -> Result<()> {
        if let Some(max) = cycle.iter().map(|v| v.space_dimension()).max() {
            check_dimension("GridGenerator::permute_space_dimensions", "variable", self.space_dimension(), max)?;
        }
        self.expr.permute_space_dimensions(cycle)?;
        self.renormalize_line();
        Ok(())
    }

    pub fn remove_space_dimensions(&mut self, vars: &VariablesSet) {
        self.expr.remove_space_dimensions(vars);
        self.renormalize_line();
    }

    pub fn set_space_dimension(&mut self, space_dim: usize) {
        self.expr.set_space_dimension(space_dim);
        self.renormalize_line();
    }

    /// The polyhedral point at the same location (points only).
    pub fn to_point(&self) -> Result<Generator> {
        if !self.is_point() {
            return Err(Error::invalid_argument("GridGenerator::to_point", "not a point"));
        }
        Generator::point(self.expr.clone(), self.expr.inhomogeneous_term().clone())
    }

    /// Dumps as `size <n+2> c0 ... c(n+1) <tag>` on one line.
    pub fn ascii_dump(&self) -> String {
        let mut out = format!("size {}", self.expr.space_dimension() + 2);
        for c in self.expr.columns() {
            out.push(' ');
            out.push_str(&c.to_string());
        }
        out.push(' ');
        out.push_str(&self.divisor_column.to_string());
        out.push(' ');
        out.push_str(self.kind.tag());
        out.push('\n');
        out
    }

    pub fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let g = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(g)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("size")?;
        let size: usize = tokens.parse()?;
        if size < 2 {
            return Err(Error::malformed(format!("grid generator of size {}", size)));
        }
        let mut cols = (0..size).map(|_| tokens.parse::<BigInt>()).collect::<Result<Vec<_>>>()?;
        let divisor_column = cols.pop().unwrap_or_default();
        let b = cols[0].clone();
        let expr = LinearExpression::from_coefficients(cols.into_iter().skip(1), b);
        let kind = match tokens.next_token()? {
            "L" => GridGeneratorType::Line,
            "Q" => GridGeneratorType::Parameter,
            "P" => GridGeneratorType::Point,
            other => return Err(Error::malformed(format!("unknown grid generator tag `{}`", other))),
        };
        let b = expr.inhomogeneous_term();
        let valid = match kind {
            GridGeneratorType::Line => {
                b.is_zero() && divisor_column.is_zero() && !expr.all_homogeneous_terms_are_zero()
            }
            GridGeneratorType::Parameter => b.is_zero() && divisor_column.is_positive(),
            GridGeneratorType::Point => b.is_positive() && divisor_column.is_zero(),
        };
        if !valid {
            return Err(Error::malformed(format!("invalid columns for a {:?}", kind)));
        }
        Ok(Self {
            expr,
            divisor_column,
            kind,
        })
    }
}

impl LatticeRow for GridGenerator {
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
        self.is_line()
    }

    fn scale(&mut self, factor: &BigInt) {
        self.expr *= factor;
        self.divisor_column *= factor;
    }
}

impl fmt::Display for GridGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, d) = match self.kind {
            GridGeneratorType::Line => ("l", None),
            GridGeneratorType::Parameter => ("q", Some(&self.divisor_column)),
            GridGeneratorType::Point => ("p", Some(self.expr.inhomogeneous_term())),
        };
        let mut h = self.expr.clone();
        h.set_inhomogeneous_term(0);
        match d {
            Some(d) if !d.is_one() && !h.all_homogeneous_terms_are_zero() => write!(f, "{}(({})/{})", tag, h, d),
            _ => write!(f, "{}({})", tag, h),
        }
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
    fn test_line_from_origin_fails() {
        let x = Variable::new(0);
        let err = GridGenerator::grid_line(x * 0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(GridGenerator::parameter(x.into(), 0).is_err());
        assert!(GridGenerator::grid_point(x.into(), 0).is_err());
    }

    #[test]
    fn test_factories_normalize() {
        let x = Variable::new(0);
        let y = Variable::new(1);

        let l = GridGenerator::grid_line(x * -2 + y * 4 + 5).unwrap();
        assert_eq!(l.expression(), &LinearExpression::from_coefficients([1, -2], 0));
        assert_eq!(l.to_string(), "l(x0 - 2*x1)");
        assert!(l.divisor().is_err());

        // Negative divisor flips every column.
        let q = GridGenerator::parameter(x * 2 - y * 4, -6).unwrap();
        assert_eq!(q.parameter_divisor(), &int(3));
        assert_eq!(q.expression(), &LinearExpression::from_coefficients([-1, 2], 0));
        assert_eq!(q.divisor().unwrap(), &int(3));

        let p = GridGenerator::grid_point(x + y * 2, 3).unwrap();
        assert_eq!(p.divisor().unwrap(), &int(3));
        assert_eq!(p.to_string(), "p((x0 + 2*x1)/3)");
        assert_eq!(GridGenerator::parameter_unit(x.into()).to_string(), "q(x0)");
    }

    #[test]
    fn test_parameter_sign_is_kept() {
        let x = Variable::new(0);
        let q = GridGenerator::parameter(x * -3, 1).unwrap();
        assert_eq!(q.coefficient(x).unwrap(), &int(-3));
        assert!(q.coefficient(Variable::new(1)).is_err());
    }

    #[test]
    fn test_strong_normalize_idempotent() {
        let x = Variable::new(0);
        let mut p = GridGenerator::grid_point_unit(x * 4);
        p.scale_to_divisor(&int(6)).unwrap();
        assert_eq!(p.expression(), &LinearExpression::from_coefficients([24], 6));
        p.strong_normalize();
        let once = p.clone();
        p.strong_normalize();
        assert_eq!(p, once);
        assert_eq!(p.expression(), &LinearExpression::from_coefficients([4], 1));
        assert!(p.scale_to_divisor(&int(0)).is_err());
    }

    #[test]
    fn test_equivalence() {
        let x = Variable::new(0);
        let a = GridGenerator::grid_point(x * 2, 2).unwrap();
        let mut b = GridGenerator::grid_point_unit(x.into());
        b.scale_to_divisor(&int(5)).unwrap();
        assert!(!a.is_equal_to(&b));
        assert!(a.is_equivalent_to(&b));

        let q = GridGenerator::parameter_unit(x.into());
        let q2 = GridGenerator::parameter(x * 2, 1).unwrap();
        assert!(!q.is_equivalent_to(&q2));
        assert!(!q.is_equivalent_to(&a));
        let l = GridGenerator::grid_line(x.into()).unwrap();
        let l2 = GridGenerator::grid_line(x * -7).unwrap();
        assert!(l.is_equivalent_to(&l2));
    }

    #[test]
    fn test_dimensions() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut l = GridGenerator::grid_line(x - y).unwrap();
        l.swap_space_dimensions(x, y).unwrap();
        // Sign normalisation flips the swapped line back to a positive lead.
        assert_eq!(l.expression(), &LinearExpression::from_coefficients([1, -1], 0));

        let mut q = GridGenerator::parameter_unit(x - y);
        q.swap_space_dimensions(x, y).unwrap();
        assert_eq!(q.expression(), &LinearExpression::from_coefficients([-1, 1], 0));

        let z = Variable::new(2);
        assert!(q.swap_space_dimensions(x, z).unwrap_err().is_invalid_argument());
        assert!(q.permute_space_dimensions(&[y, z]).unwrap_err().is_invalid_argument());
        assert_eq!(q.expression(), &LinearExpression::from_coefficients([-1, 1], 0));
        q.permute_space_dimensions(&[x, y]).unwrap();
        assert_eq!(q.expression(), &LinearExpression::from_coefficients([1, -1], 0));

        let mut p = GridGenerator::grid_point_unit(x + y * 2);
        p.set_space_dimension(3);
        assert_eq!(p.space_dimension(), 3);
        let vars = [y].into_iter().collect();
        p.remove_space_dimensions(&vars);
        assert_eq!(p.expression(), &LinearExpression::from_coefficients([1, 0], 1));
    }

    #[test]
    fn test_zero_dim_point() {
        let p = GridGenerator::zero_dim_point();
        assert!(p.is_point());
        assert_eq!(p.space_dimension(), 0);
        assert_eq!(p.to_string(), "p(0)");
    }

    #[test]
    fn test_ascii_round_trip() {
        let x = Variable::new(0);
        let q = GridGenerator::parameter(x * 3, 2).unwrap();
        let dump = q.ascii_dump();
        assert_eq!(dump, "size 3 0 3 2 Q\n");
        assert_eq!(GridGenerator::ascii_load(&dump).unwrap(), q);
        assert!(GridGenerator::ascii_load("size 3 0 3 2 X").is_err());
        assert!(GridGenerator::ascii_load("size 3 0 3 0 Q").is_err());
        assert!(GridGenerator::ascii_load("size 3 0 3").is_err());

        let l = GridGenerator::grid_line(x * -2).unwrap();
        assert_eq!(GridGenerator::ascii_load(&l.ascii_dump()).unwrap(), l);
        // The origin is not a line.
        assert!(matches!(GridGenerator::ascii_load("size 3 0 0 0 L"), Err(Error::MalformedInput(_))));
    }
}
