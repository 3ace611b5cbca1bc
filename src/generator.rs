//! Polyhedral generators: points, closure points, rays and lines.
//!
//! Numeric domains return them as optimisation witnesses and accept them in
//! `relation_with_generator`.

use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::coefficient::{lcm_denominators, scale_rational};
use crate::error::{Error, Result};
use crate::linear::LinearExpression;
use crate::variable::Variable;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeneratorKind {
    Line,
    Ray,
    Point,
    ClosurePoint,
}

/// A generator stored as one row: column 0 is the divisor of a (closure) point
/// and zero for rays and lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generator {
    expr: LinearExpression,
    kind: GeneratorKind,
}

impl Generator {
    fn with_divisor(method: &'static str, mut expr: LinearExpression, divisor: BigInt, kind: GeneratorKind) -> Result<Self> {
        if divisor.is_zero() {
            return Err(Error::invalid_argument(method, "zero divisor"));
        }
        expr.set_inhomogeneous_term(divisor);
        if expr.inhomogeneous_term().is_negative() {
            expr = -expr;
        }
        expr.normalize();
        Ok(Self { expr, kind })
    }

    fn direction(method: &'static str, mut expr: LinearExpression, kind: GeneratorKind) -> Result<Self> {
        if expr.all_homogeneous_terms_are_zero() {
            return Err(Error::invalid_argument(method, "the origin cannot be a direction"));
        }
        expr.set_inhomogeneous_term(0);
        expr.normalize();
        if kind == GeneratorKind::Line {
            expr.sign_normalize();
        }
        Ok(Self { expr, kind })
    }

    /// The point `expr / divisor`; the inhomogeneous term of `expr` is ignored.
    pub fn point(expr: LinearExpression, divisor: impl Into<BigInt>) -> Result<Self> {
        Self::with_divisor("Generator::point", expr, divisor.into(), GeneratorKind::Point)
    }

    pub fn closure_point(expr: LinearExpression, divisor: impl Into<BigInt>) -> Result<Self> {
        Self::with_divisor("Generator::closure_point", expr, divisor.into(), GeneratorKind::ClosurePoint)
    }

    pub fn ray(expr: LinearExpression) -> Result<Self> {
        Self::direction("Generator::ray", expr, GeneratorKind::Ray)
    }

    pub fn line(expr: LinearExpression) -> Result<Self> {
        Self::direction("Generator::line", expr, GeneratorKind::Line)
    }

    /// The point with the given rational coordinates.
    pub fn point_from_coordinates(coords: &[BigRational], closure: bool) -> Self {
        let divisor = lcm_denominators(coords);
        let scaled: Vec<BigInt> = coords.iter().map(|q| scale_rational(q, &divisor)).collect();
        let expr = LinearExpression::from_coefficients(scaled, divisor);
        let kind = if closure {
            GeneratorKind::ClosurePoint
        } else {
            GeneratorKind::Point
        };
        let mut g = Self { expr, kind };
        g.expr.normalize();
        g
    }

    /// The origin of a space of dimension `space_dim`.
    pub fn origin(space_dim: usize) -> Self {
        let mut expr = LinearExpression::with_dimension(space_dim);
        expr.set_inhomogeneous_term(1);
        Self {
            expr,
            kind: GeneratorKind::Point,
        }
    }

    pub fn kind(&self) -> GeneratorKind {
        self.kind
    }

    pub fn is_point(&self) -> bool {
        self.kind == GeneratorKind::Point
    }

    pub fn is_closure_point(&self) -> bool {
        self.kind == GeneratorKind::ClosurePoint
    }

    pub fn is_ray(&self) -> bool {
        self.kind == GeneratorKind::Ray
    }

    pub fn is_line(&self) -> bool {
        self.kind == GeneratorKind::Line
    }

    pub fn is_line_or_ray(&self) -> bool {
        matches!(self.kind, GeneratorKind::Line | GeneratorKind::Ray)
    }

    pub fn space_dimension(&self) -> usize {
        self.expr.space_dimension()
    }

    pub fn expression(&self) -> &LinearExpression {
        &self.expr
    }

    pub fn coefficient(&self, var: Variable) -> &BigInt {
        self.expr.coefficient(var)
    }

    /// Divisor of a (closure) point.
    pub fn divisor(&self) -> Result<&BigInt> {
        if self.is_line_or_ray() {
            return Err(Error::invalid_argument("Generator::divisor", "lines and rays have no divisor"));
        }
        Ok(self.expr.inhomogeneous_term())
    }

    /// Rational coordinates of a (closure) point, or the direction of a line or ray.
    pub fn coordinates(&self) -> Vec<BigRational> {
        let d = if self.is_line_or_ray() {
            BigInt::one()
        } else {
            self.expr.inhomogeneous_term().clone()
        };
        self.expr
            .homogeneous_coefficients()
            .iter()
            .map(|c| BigRational::new(c.clone(), d.clone()))
            .collect()
    }

    /// Exact value of `e` at a (closure) point; the homogeneous value for lines and rays.
    pub fn evaluate(&self, e: &LinearExpression) -> BigRational {
        let dot = e.homogeneous_scalar_product(&self.expr);
        if self.is_line_or_ray() {
            BigRational::from_integer(dot)
        } else {
            let d = self.expr.inhomogeneous_term();
            BigRational::new(e.inhomogeneous_term() * d + dot, d.clone())
        }
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.kind {
            GeneratorKind::Line => "l",
            GeneratorKind::Ray => "r",
            GeneratorKind::Point => "p",
            GeneratorKind::ClosurePoint => "c",
        };
        let mut h = self.expr.clone();
        h.set_inhomogeneous_term(0);
        let d = self.expr.inhomogeneous_term();
        if self.is_line_or_ray() || d.is_one() || h.all_homogeneous_terms_are_zero() {
            write!(f, "{}({})", tag, h)
        } else {
            write!(f, "{}(({})/{})", tag, h, d)
        }
    }
}
