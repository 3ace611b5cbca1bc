//! Reduction policies for [`ReducedProduct`](super::ReducedProduct).
//!
//! A policy only ever shrinks the components. When it finds the conjunction
//! empty it leaves both components empty, with their dimensions unchanged.

use log::{debug, trace};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::coefficient::rational_mod;
use crate::constraint::{Constraint, ConstraintKind};
use crate::domain::NumericDomain;
use crate::error::Result;
use crate::linear::LinearExpression;

/// Exchanges information between the two components of a product.
pub trait ReductionPolicy {
    fn product_reduce<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()>;
}

/// Propagates emptiness only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Smash;

/// Refines each component with the constraints of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstraintsReduction;

/// Uses the bounds of one component to pin down the congruences of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CongruencesReduction;

/// Moves inequalities of one component onto the grid points of the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapePreserving;

/// Makes both components empty if one is; returns whether they are.
fn smash<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> bool {
    if d1.is_empty() || d2.is_empty() {
        if !(d1.is_empty() && d2.is_empty()) {
            trace!("smash: propagating emptiness");
        }
        *d1 = D1::empty(d1.space_dimension());
        *d2 = D2::empty(d2.space_dimension());
        return true;
    }
    false
}

impl ReductionPolicy for Smash {
    fn product_reduce<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
        debug!("Smash::product_reduce");
        smash(d1, d2);
        Ok(())
    }
}

/// Upper limit on the rounds [`until_stable`] runs.
const MAX_ROUNDS: usize = 64;

/// Repeats `pass` until neither component shrinks any further.
///
/// Passes only ever shrink the components, so a round that leaves both
/// containing their previous value changed nothing.
fn until_stable<D1, D2, F>(name: &str, d1: &mut D1, d2: &mut D2, mut pass: F) -> Result<()>
where
    D1: NumericDomain,
    D2: NumericDomain,
    F: FnMut(&mut D1, &mut D2) -> Result<()>,
{
    for round in 0..MAX_ROUNDS {
        if smash(d1, d2) {
            return Ok(());
        }
        let (before1, before2) = (d1.clone(), d2.clone());
        pass(d1, d2)?;
        if smash(d1, d2) {
            return Ok(());
        }
        if d1.contains(&before1)? && d2.contains(&before2)? {
            trace!("{}: stable after {} rounds", name, round + 1);
            return Ok(());
        }
    }
    debug!("{}: still shrinking after {} rounds", name, MAX_ROUNDS);
    Ok(())
}

/// Refines each component once with the constraints of the other.
fn exchange_constraints<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
    d1.refine_with_constraints(&d2.minimized_constraints())?;
    if smash(d1, d2) {
        return Ok(());
    }
    d2.refine_with_constraints(&d1.minimized_constraints())
}

impl ReductionPolicy for ConstraintsReduction {
    fn product_reduce<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
        debug!("ConstraintsReduction::product_reduce");
        until_stable("ConstraintsReduction", d1, d2, exchange_constraints)
    }
}

/// Refines `dst` with the equalities of `src`, then tries to turn every proper
/// congruence of `src` into an equality using the bounds `dst` puts on it.
///
/// Returns `false` when the product was found empty.
fn reduce_congruences<S: NumericDomain, T: NumericDomain>(src: &mut S, dst: &mut T) -> Result<bool> {
    let cgs = src.minimized_congruences();
    for cg in cgs.iter().filter(|cg| cg.is_equality()) {
        dst.refine_with_congruence(cg)?;
    }
    if dst.is_empty() {
        return Ok(false);
    }

    for cg in cgs.iter().filter(|cg| cg.is_proper_congruence() && !cg.is_tautological()) {
        let expr = cg.expression();
        let (Some(max), Some(min)) = (dst.maximize(expr)?, dst.minimize(expr)?) else {
            continue;
        };
        let modulus = BigRational::from_integer(cg.modulus().clone());
        let span = &max.value - &min.value;
        let two_moduli = &modulus + &modulus;
        if span > two_moduli || (span == two_moduli && !(max.included && min.included)) {
            continue;
        }

        // Multiples k * m of the modulus within the bounds.
        let lo = &min.value / &modulus;
        let hi = &max.value / &modulus;
        let mut k_min = lo.ceil();
        if !min.included && k_min == lo {
            k_min += BigRational::one();
        }
        let mut k_max = hi.floor();
        if !max.included && k_max == hi {
            k_max -= BigRational::one();
        }

        if k_min > k_max {
            trace!("reduce_congruences: no value of {} satisfies {}", expr, cg);
            return Ok(false);
        }
        if k_min == k_max {
            let value = (k_min * &modulus).to_integer();
            let eq = Constraint::new(expr.clone() - LinearExpression::constant(value), ConstraintKind::Equality);
            trace!("reduce_congruences: {} becomes {}", cg, eq);
            src.refine_with_constraint(&eq)?;
            dst.refine_with_constraint(&eq)?;
            if src.is_empty() || dst.is_empty() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Runs [`reduce_congruences`] both ways once.
fn exchange_congruences<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
    if !reduce_congruences(d1, d2)? || !reduce_congruences(d2, d1)? {
        *d1 = D1::empty(d1.space_dimension());
        *d2 = D2::empty(d2.space_dimension());
    }
    Ok(())
}

impl ReductionPolicy for CongruencesReduction {
    fn product_reduce<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
        debug!("CongruencesReduction::product_reduce");
        until_stable("CongruencesReduction", d1, d2, exchange_congruences)
    }
}

/// Tightens each inequality of `dst` to the first value its expression takes on `src`.
fn shrink_to_frequency<S: NumericDomain, T: NumericDomain>(src: &S, dst: &mut T) -> Result<()> {
    for c in dst.minimized_constraints().iter().filter(|c| c.is_inequality()) {
        // c: e + b >= 0 (or > 0), with e homogeneous.
        let mut e = c.expression().clone();
        let b = e.inhomogeneous_term().clone();
        e.set_inhomogeneous_term(0);
        if e.all_homogeneous_terms_are_zero() {
            continue;
        }
        let Some(freq) = src.frequency(&e)? else {
            continue;
        };
        if !freq.period.is_positive() {
            continue;
        }
        let bound = -BigRational::from_integer(b);
        let mut offset = rational_mod(&(&freq.residue - &bound), &freq.period);
        if offset.is_zero() {
            if !c.is_strict_inequality() {
                continue;
            }
            offset = freq.period.clone();
        }
        // e >= bound + offset, scaled to integer coefficients.
        let value = bound + offset;
        let denom = value.denom().clone();
        let tightened = Constraint::new(
            e * &denom - LinearExpression::constant(value.numer().clone()),
            ConstraintKind::NonStrictInequality,
        );
        trace!("shrink_to_frequency: {} becomes {}", c, tightened);
        dst.refine_with_constraint(&tightened)?;
        if dst.is_empty() {
            return Ok(());
        }
    }
    Ok(())
}

/// One round of congruence pinning, frequency rounding both ways and constraint exchange.
fn preserve_shapes<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
    exchange_congruences(d1, d2)?;
    if smash(d1, d2) {
        return Ok(());
    }
    shrink_to_frequency(d1, d2)?;
    if smash(d1, d2) {
        return Ok(());
    }
    shrink_to_frequency(d2, d1)?;
    if smash(d1, d2) {
        return Ok(());
    }
    exchange_constraints(d1, d2)
}

impl ReductionPolicy for ShapePreserving {
    fn product_reduce<D1: NumericDomain, D2: NumericDomain>(d1: &mut D1, d2: &mut D2) -> Result<()> {
        debug!("ShapePreserving::product_reduce");
        until_stable("ShapePreserving", d1, d2, preserve_shapes)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::congruence::{Congruence, CongruenceSystem};
    use crate::constraint::ConstraintSystem;
    use crate::grid::Grid;
    use crate::interval::{Boundary, Interval};
    use crate::rational_box::RationalBox;
    use crate::variable::Variable;

    fn q(n: i64) -> BigRational {
        BigRational::from_integer(n.into())
    }

    fn even() -> Grid {
        Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(Variable::new(0), 0, 2)))
    }

    #[test]
    fn test_smash() {
        let mut g = even();
        let mut b = RationalBox::empty(1);
        Smash::product_reduce(&mut g, &mut b).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.space_dimension(), 1);

        let mut g = even();
        let mut b = RationalBox::universe(1);
        Smash::product_reduce(&mut g, &mut b).unwrap();
        assert!(!g.is_empty() && !b.is_empty());
    }

    #[test]
    fn test_congruences_pin_value() {
        // x even and 3 <= x < 6 leaves x = 4.
        let mut g = even();
        let mut b = RationalBox::from_intervals(vec![Interval::new(
            Some(Boundary::closed(q(3))),
            Some(Boundary::open(q(6))),
        )]);
        CongruencesReduction::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(b.interval(Variable::new(0)).unwrap(), &Interval::singleton(q(4)));
        let f = g.frequency(&LinearExpression::from(Variable::new(0))).unwrap().unwrap();
        assert!(f.period.is_zero());
        assert_eq!(f.residue, q(4));
    }

    #[test]
    fn test_congruences_leave_wide_bounds() {
        let mut g = even();
        let mut b = RationalBox::from_intervals(vec![Interval::closed(q(0), q(10))]);
        let before = b.clone();
        CongruencesReduction::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(b, before);
        assert_eq!(g, even());
    }

    #[test]
    fn test_shape_preserving_rounds_bounds() {
        // x even and 1 < x <= 7.5 becomes 2 <= x <= 6.
        let mut g = even();
        let mut b = RationalBox::from_intervals(vec![Interval::new(
            Some(Boundary::open(q(1))),
            Some(Boundary::closed(BigRational::new(15.into(), 2.into()))),
        )]);
        ShapePreserving::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(b.interval(Variable::new(0)).unwrap(), &Interval::closed(q(2), q(6)));
        assert!(!g.is_empty());
    }

    #[test]
    fn test_shape_preserving_reaches_fixpoint() {
        // 6x + y ≡ 0 (mod 12) with x integral, and x <= 1, 0 <= y <= 1.
        // Rounding y forces y = 0, which makes x even, which rounds x <= 1 down to x <= 0.
        let x = Variable::new(0);
        let y = Variable::new(1);
        let cgs: CongruenceSystem = [Congruence::modular(x * 6 + y, 0, 12), Congruence::modular(x, 0, 1)]
            .into_iter()
            .collect();
        let mut g = Grid::from_congruences(&cgs);
        let cs: ConstraintSystem = [Constraint::le(x, 1), Constraint::ge(y, 0), Constraint::le(y, 1)]
            .into_iter()
            .collect();
        let mut b = RationalBox::from_constraints(&cs).unwrap();

        ShapePreserving::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(b.interval(x).unwrap(), &Interval::new(None, Some(Boundary::closed(q(0)))));
        assert_eq!(b.interval(y).unwrap(), &Interval::singleton(q(0)));
        let f = g.frequency(&LinearExpression::from(x)).unwrap().unwrap();
        assert_eq!(f.period, q(2));

        let (g1, b1) = (g.clone(), b.clone());
        ShapePreserving::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(g, g1);
        assert_eq!(b, b1);
    }

    #[test]
    fn test_constraints_reduction_reaches_fixpoint() {
        // The grid x = y, 2x = 1 only pins y once x is known.
        let x = Variable::new(0);
        let y = Variable::new(1);
        let cgs: CongruenceSystem = [Congruence::equality(x, y), Congruence::equality(x * 2, 1)]
            .into_iter()
            .collect();
        let mut g = Grid::from_congruences(&cgs);
        let mut b = RationalBox::universe(2);
        ConstraintsReduction::product_reduce(&mut g, &mut b).unwrap();
        let half = BigRational::new(1.into(), 2.into());
        assert_eq!(b.interval(x).unwrap(), &Interval::singleton(half.clone()));
        assert_eq!(b.interval(y).unwrap(), &Interval::singleton(half));

        let before = b.clone();
        ConstraintsReduction::product_reduce(&mut g, &mut b).unwrap();
        assert_eq!(b, before);
    }
}
