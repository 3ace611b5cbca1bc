//! Boxes: one rational [`Interval`] per space dimension.
//!
//! Interval constraints (at most one variable) are represented exactly. Other
//! constraints can only be used through `refine_with_constraint`, which runs
//! one step of bound propagation and never loses a point.

use std::fmt;

use log::{debug, trace};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::ascii::{flag, Tokens};
use crate::congruence::{Congruence, CongruenceSystem};
use crate::constraint::{Constraint, ConstraintKind, ConstraintSystem};
use crate::domain::{Extremum, Frequency, NumericDomain};
use crate::error::{check_dimension, check_same_dimension, Error, Result};
use crate::generator::{Generator, GeneratorKind};
use crate::interval::{Boundary, Interval};
use crate::linear::LinearExpression;
use crate::relation::{GeneratorRelation, Relation};
use crate::variable::{Variable, VariablesSet};

fn rational(v: &BigInt) -> BigRational {
    BigRational::from_integer(v.clone())
}

/// `q*x - p >= 0` for a lower bound `p/q`, `p - q*x >= 0` for an upper one.
fn bound_constraint(var: Variable, b: &Boundary, lower: bool) -> Constraint {
    let mut e = LinearExpression::with_dimension(var.space_dimension());
    let (p, q) = (b.value.numer().clone(), b.value.denom().clone());
    if lower {
        e.set_coefficient(var, q);
        e.set_inhomogeneous_term(-p);
    } else {
        e.set_coefficient(var, -q);
        e.set_inhomogeneous_term(p);
    }
    let kind = if b.open {
        ConstraintKind::StrictInequality
    } else {
        ConstraintKind::NonStrictInequality
    };
    Constraint::new(e, kind)
}

/// A box of rational intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RationalBox {
    intervals: Vec<Interval>,
    empty: bool,
}

impl RationalBox {
    /// The box with the given intervals; any empty interval makes the box empty.
    pub fn from_intervals(intervals: Vec<Interval>) -> Self {
        let empty = intervals.iter().any(Interval::is_empty);
        let mut b = Self { intervals, empty };
        if empty {
            b.set_empty();
        }
        b
    }

    /// The smallest box containing every solution of `cs`.
    pub fn from_constraints(cs: &ConstraintSystem) -> Result<Self> {
        let mut b = Self::universe(cs.space_dimension());
        b.refine_with_constraints(cs)?;
        Ok(b)
    }

    /// The interval of `var`; empty when the box is empty.
    pub fn interval(&self, var: Variable) -> Result<&Interval> {
        check_dimension("RationalBox::interval", "variable", self.space_dimension(), var.space_dimension())?;
        Ok(&self.intervals[var.id()])
    }

    pub fn set_interval(&mut self, var: Variable, interval: Interval) -> Result<()> {
        check_dimension(
            "RationalBox::set_interval",
            "variable",
            self.space_dimension(),
            var.space_dimension(),
        )?;
        if self.empty {
            return Ok(());
        }
        self.intervals[var.id()] = interval;
        self.normalize_emptiness();
        Ok(())
    }

    fn set_empty(&mut self) {
        self.empty = true;
        for i in self.intervals.iter_mut() {
            *i = Interval::empty();
        }
    }

    fn normalize_emptiness(&mut self) {
        if self.intervals.iter().any(Interval::is_empty) {
            self.set_empty();
        }
    }

    /// The exact range of `expr` over a non-empty box.
    fn evaluate(&self, expr: &LinearExpression) -> Interval {
        let mut result = Interval::singleton(rational(expr.inhomogeneous_term()));
        for (i, a) in expr.homogeneous_coefficients().iter().enumerate() {
            if !a.is_zero() {
                result = result.add(&self.intervals[i].scale(&rational(a)));
            }
        }
        result
    }

    /// Applies a constraint on at most one variable exactly.
    fn apply_interval_constraint(&mut self, c: &Constraint) {
        debug_assert!(c.is_interval_constraint());
        if c.is_tautological() {
            return;
        }
        if c.is_inconsistent() {
            self.set_empty();
            return;
        }
        let Some(var) = c.expression().last_nonzero() else {
            return;
        };
        let a = rational(c.coefficient(var));
        let value = -rational(c.inhomogeneous_term()) / &a;
        let open = c.is_strict_inequality();
        let interval = &mut self.intervals[var.id()];
        match c.kind() {
            ConstraintKind::Equality => *interval = interval.meet(&Interval::singleton(value)),
            _ if a.is_positive() => interval.refine_lower(Boundary { value, open }),
            _ => interval.refine_upper(Boundary { value, open }),
        }
        self.normalize_emptiness();
    }

    /// One step of bound propagation for `c`, computed from the current bounds.
    fn propagate(&mut self, c: &Constraint) {
        let expr = c.expression();
        let mut refined = Vec::new();
        for (i, a) in expr.homogeneous_coefficients().iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            let var = Variable::new(i);
            let mut rest_expr = expr.clone();
            rest_expr.set_coefficient(var, 0);
            let rest = self.evaluate(&rest_expr);
            let a = rational(a);
            // a * x + rest ⋈ 0
            let interval = match c.kind() {
                ConstraintKind::Equality => rest.negate().scale(&a.recip()),
                kind => {
                    let Some(sup) = rest.upper() else {
                        continue;
                    };
                    let bound = Boundary {
                        value: -&sup.value / &a,
                        open: sup.open || kind == ConstraintKind::StrictInequality,
                    };
                    if a.is_positive() {
                        Interval::new(Some(bound), None)
                    } else {
                        Interval::new(None, Some(bound))
                    }
                }
            };
            trace!("propagate: {} ∈ {}", var, interval);
            refined.push((i, interval));
        }
        for (i, interval) in refined {
            self.intervals[i] = self.intervals[i].meet(&interval);
        }
        self.normalize_emptiness();
    }

    fn optimize(&self, method: &'static str, expr: &LinearExpression, maximize: bool) -> Result<Option<Extremum>> {
        check_dimension(method, "expression", self.space_dimension(), expr.space_dimension())?;
        if self.empty {
            return Ok(None);
        }
        let range = self.evaluate(expr);
        let bound = if maximize { range.upper() } else { range.lower() };
        let Some(bound) = bound.cloned() else {
            return Ok(None);
        };
        let coords: Vec<BigRational> = self
            .intervals
            .iter()
            .enumerate()
            .map(|(i, interval)| {
                let a = expr.coefficient(Variable::new(i));
                let towards_upper = if maximize { a.is_positive() } else { a.is_negative() };
                let end = if a.is_zero() {
                    None
                } else if towards_upper {
                    interval.upper()
                } else {
                    interval.lower()
                };
                end.map_or_else(|| interval.sample(), |b| b.value.clone())
            })
            .collect();
        Ok(Some(Extremum {
            value: bound.value,
            included: !bound.open,
            point: Generator::point_from_coordinates(&coords, bound.open),
        }))
    }

    /// Projects away the dimensions in `vars`.
    pub fn remove_space_dimensions(&mut self, vars: &VariablesSet) -> Result<()> {
        if let Some(last) = vars.iter().next_back() {
            check_dimension(
                "RationalBox::remove_space_dimensions",
                "variable",
                self.space_dimension(),
                last.space_dimension(),
            )?;
        }
        let mut index = 0;
        self.intervals.retain(|_| {
            let keep = !vars.contains(&Variable::new(index));
            index += 1;
            keep
        });
        Ok(())
    }
}

impl NumericDomain for RationalBox {
    fn universe(space_dim: usize) -> Self {
        Self {
            intervals: vec![Interval::universe(); space_dim],
            empty: false,
        }
    }

    fn empty(space_dim: usize) -> Self {
        Self {
            intervals: vec![Interval::empty(); space_dim],
            empty: true,
        }
    }

    fn space_dimension(&self) -> usize {
        self.intervals.len()
    }

    fn is_empty(&self) -> bool {
        self.empty
    }

    fn is_universe(&self) -> bool {
        !self.empty && self.intervals.iter().all(Interval::is_universe)
    }

    fn contains(&self, other: &Self) -> Result<bool> {
        check_same_dimension("RationalBox::contains", "box", self.space_dimension(), other.space_dimension())?;
        if other.empty {
            return Ok(true);
        }
        if self.empty {
            return Ok(false);
        }
        Ok(self.intervals.iter().zip(&other.intervals).all(|(a, b)| a.contains(b)))
    }

    fn constraints(&self) -> ConstraintSystem {
        let space_dim = self.space_dimension();
        if self.empty {
            return ConstraintSystem::inconsistent(space_dim);
        }
        let mut cs = ConstraintSystem::with_dimension(space_dim);
        for (i, interval) in self.intervals.iter().enumerate() {
            let var = Variable::new(i);
            if let Some(v) = interval.singleton_value() {
                let mut e = LinearExpression::with_dimension(space_dim);
                e.set_coefficient(var, v.denom().clone());
                e.set_inhomogeneous_term(-v.numer());
                cs.insert(Constraint::new(e, ConstraintKind::Equality));
                continue;
            }
            if let Some(l) = interval.lower() {
                cs.insert(bound_constraint(var, l, true));
            }
            if let Some(u) = interval.upper() {
                cs.insert(bound_constraint(var, u, false));
            }
        }
        cs
    }

    /// The equalities of the singleton dimensions.
    fn congruences(&self) -> CongruenceSystem {
        let space_dim = self.space_dimension();
        if self.empty {
            return CongruenceSystem::inconsistent(space_dim);
        }
        let mut cgs = CongruenceSystem::with_dimension(space_dim);
        for c in self.constraints().iter().filter(|c| c.is_equality()) {
            if let Some(cg) = Congruence::from_equality_constraint(c) {
                cgs.insert(cg);
            }
        }
        cgs
    }

    /// Adds an interval constraint; other constraints are rejected.
    fn add_constraint(&mut self, c: &Constraint) -> Result<()> {
        const METHOD: &str = "RationalBox::add_constraint";
        check_dimension(METHOD, "constraint", self.space_dimension(), c.space_dimension())?;
        if !c.is_interval_constraint() {
            return Err(Error::invalid_argument(METHOD, format!("`{}` is not an interval constraint", c)));
        }
        if !self.empty {
            self.apply_interval_constraint(c);
        }
        Ok(())
    }

    /// Adds an equality on at most one variable, or a trivial congruence.
    fn add_congruence(&mut self, cg: &Congruence) -> Result<()> {
        const METHOD: &str = "RationalBox::add_congruence";
        check_dimension(METHOD, "congruence", self.space_dimension(), cg.space_dimension())?;
        if cg.is_equality() {
            return self.add_constraint(&Constraint::new(cg.expression().clone(), ConstraintKind::Equality));
        }
        if cg.is_inconsistent() {
            self.set_empty();
            return Ok(());
        }
        if cg.is_tautological() {
            return Ok(());
        }
        Err(Error::invalid_argument(METHOD, format!("`{}` is not representable by a box", cg)))
    }

    fn refine_with_constraint(&mut self, c: &Constraint) -> Result<()> {
        check_dimension(
            "RationalBox::refine_with_constraint",
            "constraint",
            self.space_dimension(),
            c.space_dimension(),
        )?;
        if self.empty {
            return Ok(());
        }
        if c.is_interval_constraint() {
            self.apply_interval_constraint(c);
        } else {
            debug!("RationalBox::refine_with_constraint: propagating {}", c);
            self.propagate(c);
        }
        Ok(())
    }

    /// Proper congruences only matter when they hold nowhere.
    fn refine_with_congruence(&mut self, cg: &Congruence) -> Result<()> {
        check_dimension(
            "RationalBox::refine_with_congruence",
            "congruence",
            self.space_dimension(),
            cg.space_dimension(),
        )?;
        if cg.is_equality() {
            return self.refine_with_constraint(&Constraint::new(cg.expression().clone(), ConstraintKind::Equality));
        }
        if cg.is_inconsistent() {
            self.set_empty();
        }
        Ok(())
    }

    fn maximize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.optimize("RationalBox::maximize", expr, true)
    }

    fn minimize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.optimize("RationalBox::minimize", expr, false)
    }

    fn relation_with_constraint(&self, c: &Constraint) -> Result<Relation> {
        check_dimension(
            "RationalBox::relation_with_constraint",
            "constraint",
            self.space_dimension(),
            c.space_dimension(),
        )?;
        if self.empty {
            return Ok(Relation::IS_INCLUDED & Relation::SATURATES & Relation::IS_DISJOINT);
        }
        let range = self.evaluate(c.expression());
        let zero = BigRational::zero();
        if range.singleton_value() == Some(&zero) {
            return Ok(match c.kind() {
                ConstraintKind::StrictInequality => Relation::SATURATES & Relation::IS_DISJOINT,
                _ => Relation::IS_INCLUDED & Relation::SATURATES,
            });
        }
        let above = |strict: bool| {
            range
                .lower()
                .map_or(false, |l| l.value > zero || (l.value == zero && (l.open || !strict)))
        };
        let below = |strict: bool| {
            range
                .upper()
                .map_or(false, |u| u.value < zero || (u.value == zero && (u.open || !strict)))
        };
        Ok(match c.kind() {
            ConstraintKind::Equality if !range.contains_value(&zero) => Relation::IS_DISJOINT,
            ConstraintKind::Equality => Relation::STRICTLY_INTERSECTS,
            // expr >= 0
            ConstraintKind::NonStrictInequality if above(false) => Relation::IS_INCLUDED,
            ConstraintKind::NonStrictInequality if below(true) => Relation::IS_DISJOINT,
            // expr > 0
            ConstraintKind::StrictInequality if above(true) => Relation::IS_INCLUDED,
            ConstraintKind::StrictInequality if below(false) => Relation::IS_DISJOINT,
            _ => Relation::STRICTLY_INTERSECTS,
        })
    }

    fn relation_with_congruence(&self, cg: &Congruence) -> Result<Relation> {
        check_dimension(
            "RationalBox::relation_with_congruence",
            "congruence",
            self.space_dimension(),
            cg.space_dimension(),
        )?;
        if cg.is_equality() {
            return self.relation_with_constraint(&Constraint::new(cg.expression().clone(), ConstraintKind::Equality));
        }
        if self.empty {
            return Ok(Relation::IS_INCLUDED & Relation::SATURATES & Relation::IS_DISJOINT);
        }
        let range = self.evaluate(cg.expression());
        let modulus = rational(cg.modulus());
        if let Some(v) = range.singleton_value() {
            return Ok(if (v / &modulus).is_integer() {
                Relation::IS_INCLUDED
            } else {
                Relation::IS_DISJOINT
            });
        }
        if range.meets_multiple_of(&modulus) {
            Ok(Relation::STRICTLY_INTERSECTS)
        } else {
            Ok(Relation::IS_DISJOINT)
        }
    }

    /// A closure point is subsumed when it lies in the closure of the box.
    fn relation_with_generator(&self, g: &Generator) -> Result<GeneratorRelation> {
        check_dimension(
            "RationalBox::relation_with_generator",
            "generator",
            self.space_dimension(),
            g.space_dimension(),
        )?;
        if self.empty {
            return Ok(GeneratorRelation::Nothing);
        }
        let mut coords = g.coordinates();
        coords.resize(self.space_dimension(), BigRational::zero());
        let subsumed = self.intervals.iter().zip(&coords).all(|(interval, c)| match g.kind() {
            GeneratorKind::Point => interval.contains_value(c),
            GeneratorKind::ClosurePoint => interval.closure_contains_value(c),
            GeneratorKind::Line => c.is_zero() || interval.is_universe(),
            GeneratorKind::Ray => {
                c.is_zero()
                    || (c.is_positive() && interval.upper().is_none())
                    || (c.is_negative() && interval.lower().is_none())
            }
        });
        Ok(if subsumed {
            GeneratorRelation::Subsumes
        } else {
            GeneratorRelation::Nothing
        })
    }

    /// Only constant expressions have a frequency over a box.
    fn frequency(&self, expr: &LinearExpression) -> Result<Option<Frequency>> {
        check_dimension("RationalBox::frequency", "expression", self.space_dimension(), expr.space_dimension())?;
        if self.empty {
            return Ok(None);
        }
        Ok(self.evaluate(expr).singleton_value().map(|v| Frequency {
            period: BigRational::zero(),
            residue: v.clone(),
        }))
    }

    fn intersection_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension(
            "RationalBox::intersection_assign",
            "box",
            self.space_dimension(),
            other.space_dimension(),
        )?;
        if self.empty {
            return Ok(());
        }
        if other.empty {
            self.set_empty();
            return Ok(());
        }
        for (a, b) in self.intervals.iter_mut().zip(&other.intervals) {
            *a = a.meet(b);
        }
        self.normalize_emptiness();
        Ok(())
    }

    /// The interval hull.
    fn upper_bound_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension(
            "RationalBox::upper_bound_assign",
            "box",
            self.space_dimension(),
            other.space_dimension(),
        )?;
        if other.empty {
            return Ok(());
        }
        if self.empty {
            *self = other.clone();
            return Ok(());
        }
        for (a, b) in self.intervals.iter_mut().zip(&other.intervals) {
            *a = a.join(b);
        }
        Ok(())
    }

    fn affine_image(&mut self, var: Variable, expr: &LinearExpression, denominator: &BigInt) -> Result<()> {
        const METHOD: &str = "RationalBox::affine_image";
        if denominator.is_zero() {
            return Err(Error::invalid_argument(METHOD, "zero denominator"));
        }
        check_dimension(METHOD, "variable", self.space_dimension(), var.space_dimension())?;
        check_dimension(METHOD, "expression", self.space_dimension(), expr.space_dimension())?;
        if self.empty {
            return Ok(());
        }
        let image = self.evaluate(expr).scale(&rational(denominator).recip());
        debug!("RationalBox::affine_image: {} := {}", var, image);
        self.intervals[var.id()] = image;
        Ok(())
    }

    fn add_space_dimensions_and_embed(&mut self, n: usize) {
        let fill = if self.empty {
            Interval::empty()
        } else {
            Interval::universe()
        };
        self.intervals.extend(std::iter::repeat(fill).take(n));
    }

    fn remove_higher_space_dimensions(&mut self, new_dim: usize) -> Result<()> {
        check_dimension(
            "RationalBox::remove_higher_space_dimensions",
            "dimension",
            self.space_dimension(),
            new_dim,
        )?;
        self.intervals.truncate(new_dim);
        Ok(())
    }

    /// Dumps as `box dim <n> empty <0|1>`, then one interval per line.
    fn ascii_dump(&self) -> String {
        let mut out = format!("box dim {} empty {}\n", self.space_dimension(), flag(self.empty));
        for interval in &self.intervals {
            out.push_str(&interval.ascii_dump());
            out.push('\n');
        }
        out
    }

    fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("box")?;
        tokens.expect("dim")?;
        let space_dim: usize = tokens.parse()?;
        tokens.expect("empty")?;
        let empty = tokens.parse_flag()?;
        let intervals = (0..space_dim)
            .map(|_| Interval::load_from(tokens))
            .collect::<Result<Vec<_>>>()?;
        let mut b = Self::from_intervals(intervals);
        if space_dim == 0 && empty {
            b.set_empty();
        }
        if b.empty != empty {
            return Err(Error::malformed("box emptiness flag does not match its intervals"));
        }
        Ok(b)
    }
}

impl fmt::Display for RationalBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.empty {
            return write!(f, "false");
        }
        if self.is_universe() {
            return write!(f, "true");
        }
        let parts: Vec<String> = self
            .intervals
            .iter()
            .enumerate()
            .filter(|(_, i)| !i.is_universe())
            .map(|(k, i)| format!("{} ∈ {}", Variable::new(k), i))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::domain::tests::check_lattice_axioms;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn interval(lo: i64, hi: i64) -> Interval {
        Interval::closed(q(lo), q(hi))
    }

    #[test]
    fn test_add_interval_constraints() {
        let x = Variable::new(0);
        let mut b = RationalBox::universe(2);
        b.add_constraint(&Constraint::ge(x, 1)).unwrap();
        b.add_constraint(&Constraint::le(x * 2, 12)).unwrap();
        assert_eq!(b.interval(x).unwrap(), &interval(1, 6));
        assert_eq!(b.to_string(), "{x0 ∈ [1, 6]}");

        let y = Variable::new(1);
        let err = b.add_constraint(&Constraint::ge(x, y)).unwrap_err();
        assert!(err.is_invalid_argument());

        b.add_constraint(&Constraint::gt(x, 6)).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn test_refine_propagates() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut b = RationalBox::from_intervals(vec![interval(0, 10), interval(3, 5)]);
        // x + y <= 6
        b.refine_with_constraint(&Constraint::le(x + y, 6)).unwrap();
        assert_eq!(b.interval(x).unwrap(), &interval(0, 3));
        assert_eq!(b.interval(y).unwrap(), &interval(3, 5));

        // x = y + 4 has no solution with x <= 3 and y >= 3.
        b.refine_with_constraint(&Constraint::eq(x, y + 4)).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn test_constraints_round_trip() {
        let b = RationalBox::from_intervals(vec![
            Interval::new(Some(Boundary::open(q(2))), Some(Boundary::closed(q(6)))),
            Interval::singleton(BigRational::new(BigInt::from(1), BigInt::from(3))),
            Interval::universe(),
        ]);
        let cs = b.constraints();
        assert_eq!(cs.len(), 3);
        assert_eq!(RationalBox::from_constraints(&cs).unwrap(), b);
        assert_eq!(b.congruences().len(), 1);
    }

    #[test]
    fn test_optimize() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let b = RationalBox::from_intervals(vec![
            Interval::new(Some(Boundary::closed(q(0))), Some(Boundary::open(q(4)))),
            interval(-1, 1),
        ]);
        let max = b.maximize(&(x - y)).unwrap().unwrap();
        assert_eq!(max.value, q(5));
        assert!(!max.included);
        assert!(max.point.is_closure_point());
        assert_eq!(max.point.evaluate(&(x - y)), q(5));

        let min = b.minimize(&(x - y)).unwrap().unwrap();
        assert_eq!(min.value, q(-1));
        assert!(min.included);
        assert!(min.point.is_point());

        let unbounded = RationalBox::universe(2);
        assert!(unbounded.maximize(&LinearExpression::from(x)).unwrap().is_none());
        assert!(RationalBox::empty(2).minimize(&LinearExpression::from(x)).unwrap().is_none());
    }

    #[test]
    fn test_relations() {
        let x = Variable::new(0);
        let b = RationalBox::from_intervals(vec![interval(1, 6)]);
        assert_eq!(b.relation_with_constraint(&Constraint::ge(x, 1)).unwrap(), Relation::IS_INCLUDED);
        assert_eq!(b.relation_with_constraint(&Constraint::gt(x, 1)).unwrap(), Relation::STRICTLY_INTERSECTS);
        assert_eq!(b.relation_with_constraint(&Constraint::gt(x, 6)).unwrap(), Relation::IS_DISJOINT);
        assert_eq!(b.relation_with_constraint(&Constraint::eq(x, 7)).unwrap(), Relation::IS_DISJOINT);

        assert_eq!(b.relation_with_congruence(&Congruence::modular(x, 0, 2)).unwrap(), Relation::STRICTLY_INTERSECTS);
        assert_eq!(b.relation_with_congruence(&Congruence::modular(x, 0, 10)).unwrap(), Relation::IS_DISJOINT);

        let point = RationalBox::from_intervals(vec![interval(4, 4)]);
        assert_eq!(point.relation_with_congruence(&Congruence::modular(x, 0, 2)).unwrap(), Relation::IS_INCLUDED);
        assert_eq!(
            point.relation_with_constraint(&Constraint::eq(x, 4)).unwrap(),
            Relation::IS_INCLUDED & Relation::SATURATES
        );

        let p = Generator::point(LinearExpression::from_coefficients([3], 0), 1).unwrap();
        assert_eq!(b.relation_with_generator(&p).unwrap(), GeneratorRelation::Subsumes);
        let l = Generator::line(LinearExpression::from_coefficients([1], 0)).unwrap();
        assert_eq!(b.relation_with_generator(&l).unwrap(), GeneratorRelation::Nothing);
    }

    #[test]
    fn test_congruences() {
        let x = Variable::new(0);
        let mut b = RationalBox::universe(1);
        assert!(b.add_congruence(&Congruence::modular(x, 0, 2)).unwrap_err().is_invalid_argument());
        b.refine_with_congruence(&Congruence::modular(x, 0, 2)).unwrap();
        assert!(b.is_universe());
        b.refine_with_congruence(&Congruence::equality(x, 3)).unwrap();
        assert_eq!(b.frequency(&(x * 2)).unwrap().unwrap().residue, q(6));
        b.refine_with_congruence(&Congruence::modular(x * 0, 1, 2)).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn test_affine_and_dimensions() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut b = RationalBox::from_intervals(vec![interval(1, 3), interval(0, 0)]);
        b.affine_image(y, &(x * 3 + 1), &BigInt::from(2)).unwrap();
        assert_eq!(b.interval(y).unwrap(), &interval(2, 5));

        b.add_space_dimensions_and_embed(1);
        assert_eq!(b.space_dimension(), 3);
        assert!(b.interval(Variable::new(2)).unwrap().is_universe());
        b.remove_space_dimensions(&[x].into_iter().collect()).unwrap();
        assert_eq!(b.interval(x).unwrap(), &interval(2, 5));
        b.remove_higher_space_dimensions(1).unwrap();
        assert_eq!(b.space_dimension(), 1);
        assert!(b.remove_higher_space_dimensions(2).is_err());
    }

    #[test]
    fn test_lattice_axioms() {
        let samples = vec![
            RationalBox::empty(1),
            RationalBox::universe(1),
            RationalBox::from_intervals(vec![interval(0, 0)]),
            RationalBox::from_intervals(vec![interval(0, 10)]),
            RationalBox::from_intervals(vec![Interval::new(Some(Boundary::open(q(5))), None)]),
            RationalBox::from_intervals(vec![interval(10, 20)]),
        ];
        check_lattice_axioms(&samples);
    }

    #[test]
    fn test_ascii() {
        let b = RationalBox::from_intervals(vec![
            Interval::new(Some(Boundary::open(q(2))), None),
            interval(-1, 1),
        ]);
        let dump = b.ascii_dump();
        assert_eq!(dump, "box dim 2 empty 0\n( 2 +inf\n[ -1 1 ]\n");
        assert_eq!(RationalBox::ascii_load(&dump).unwrap(), b);
        let e = RationalBox::empty(1);
        assert_eq!(RationalBox::ascii_load(&e.ascii_dump()).unwrap(), e);
        assert!(RationalBox::ascii_load("box dim 1 empty 1\n-inf +inf\n").is_err());
    }
}
