//! The numeric domain interface.
//!
//! Every domain of the crate (grids, rational boxes and reduced products of
//! them) implements [`NumericDomain`], so products can nest.

use std::fmt::Debug;

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::ascii::Tokens;
use crate::congruence::{Congruence, CongruenceSystem};
use crate::constraint::{Constraint, ConstraintSystem};
use crate::error::Result;
use crate::generator::Generator;
use crate::linear::LinearExpression;
use crate::relation::{GeneratorRelation, Relation};
use crate::variable::Variable;

/// A supremum or infimum of a linear expression over a domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extremum {
    pub value: BigRational,
    /// Whether the bound is attained.
    pub included: bool,
    /// A point where the bound is attained, or a closure point approaching it.
    pub point: Generator,
}

/// The values of an expression lie in `residue + period * ℤ`.
///
/// A zero period means the expression is constant and equal to `residue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frequency {
    pub period: BigRational,
    pub residue: BigRational,
}

/// Numeric abstract domain over a space of fixed dimension.
///
/// # Lattice Properties
///
/// - `contains` is a partial order.
/// - `intersection_assign` is the meet; `upper_bound_assign` returns an upper
///   bound that need not be the least one.
/// - `empty(n)` is the bottom and `universe(n)` the top of dimension `n`.
///
/// Every operation taking another value, a constraint, a congruence or an
/// expression fails with [`Error::InvalidArgument`](crate::error::Error) when
/// the argument lives in a larger space.
pub trait NumericDomain: Clone + Debug + Sized {
    fn universe(space_dim: usize) -> Self;

    fn empty(space_dim: usize) -> Self;

    fn space_dimension(&self) -> usize;

    fn is_empty(&self) -> bool;

    fn is_universe(&self) -> bool;

    /// Whether every point of `other` belongs to `self`.
    fn contains(&self, other: &Self) -> Result<bool>;

    /// Constraints satisfied by the value (an over-approximation for
    /// domains that are not polyhedral).
    fn constraints(&self) -> ConstraintSystem;

    fn minimized_constraints(&self) -> ConstraintSystem {
        self.constraints()
    }

    /// Congruences satisfied by the value.
    fn congruences(&self) -> CongruenceSystem;

    fn minimized_congruences(&self) -> CongruenceSystem {
        self.congruences()
    }

    /// Adds `c`, which the domain must represent exactly.
    fn add_constraint(&mut self, c: &Constraint) -> Result<()>;

    fn add_constraints(&mut self, cs: &ConstraintSystem) -> Result<()> {
        for c in cs {
            self.add_constraint(c)?;
        }
        Ok(())
    }

    /// Same as [`add_constraints`](NumericDomain::add_constraints), consuming the system.
    fn add_recycled_constraints(&mut self, cs: ConstraintSystem) -> Result<()> {
        self.add_constraints(&cs)
    }

    /// Adds `cg`, which the domain must represent exactly.
    fn add_congruence(&mut self, cg: &Congruence) -> Result<()>;

    fn add_congruences(&mut self, cgs: &CongruenceSystem) -> Result<()> {
        for cg in cgs {
            self.add_congruence(cg)?;
        }
        Ok(())
    }

    fn add_recycled_congruences(&mut self, cgs: CongruenceSystem) -> Result<()> {
        self.add_congruences(&cgs)
    }

    /// Intersects with an over-approximation of `c`.
    fn refine_with_constraint(&mut self, c: &Constraint) -> Result<()>;

    fn refine_with_constraints(&mut self, cs: &ConstraintSystem) -> Result<()> {
        for c in cs {
            self.refine_with_constraint(c)?;
        }
        Ok(())
    }

    /// Intersects with an over-approximation of `cg`.
    fn refine_with_congruence(&mut self, cg: &Congruence) -> Result<()>;

    fn refine_with_congruences(&mut self, cgs: &CongruenceSystem) -> Result<()> {
        for cg in cgs {
            self.refine_with_congruence(cg)?;
        }
        Ok(())
    }

    /// Supremum of `expr`, or `None` if the value is empty or `expr` is unbounded above.
    fn maximize(&self, expr: &LinearExpression) -> Result<Option<Extremum>>;

    /// Infimum of `expr`, or `None` if the value is empty or `expr` is unbounded below.
    fn minimize(&self, expr: &LinearExpression) -> Result<Option<Extremum>>;

    fn relation_with_constraint(&self, c: &Constraint) -> Result<Relation>;

    fn relation_with_congruence(&self, cg: &Congruence) -> Result<Relation>;

    fn relation_with_generator(&self, g: &Generator) -> Result<GeneratorRelation>;

    /// Period and residue of the values of `expr`, if they are evenly spaced.
    fn frequency(&self, expr: &LinearExpression) -> Result<Option<Frequency>>;

    fn intersection_assign(&mut self, other: &Self) -> Result<()>;

    fn upper_bound_assign(&mut self, other: &Self) -> Result<()>;

    /// Assigns `expr / denominator` to `var`.
    fn affine_image(&mut self, var: Variable, expr: &LinearExpression, denominator: &BigInt) -> Result<()>;

    /// Adds `n` unconstrained dimensions after the existing ones.
    fn add_space_dimensions_and_embed(&mut self, n: usize);

    /// Projects onto the first `new_dim` dimensions.
    fn remove_higher_space_dimensions(&mut self, new_dim: usize) -> Result<()>;

    fn ascii_dump(&self) -> String;

    /// Reads a value written by [`ascii_dump`](NumericDomain::ascii_dump) from a token stream.
    fn load_from(tokens: &mut Tokens<'_>) -> Result<Self>;

    fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let d = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(d)
    }
}
