//! Reduced products of two numeric domains.
//!
//! A [`ReducedProduct`] denotes the intersection of its two components. The
//! reduction policy `R` decides how much information the components exchange;
//! it runs lazily, the first time the product is observed after a change.

pub mod policy;

use std::cell::{Cell, Ref, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use log::{debug, warn};
use num_bigint::BigInt;

use crate::ascii::{flag, Tokens};
use crate::congruence::{Congruence, CongruenceSystem};
use crate::constraint::{Constraint, ConstraintSystem};
use crate::domain::{Extremum, Frequency, NumericDomain};
use crate::error::{check_dimension, check_same_dimension, Error, Result};
use crate::generator::Generator;
use crate::grid::Grid;
use crate::linear::LinearExpression;
use crate::rational_box::RationalBox;
use crate::relation::{GeneratorRelation, Relation};
use crate::variable::Variable;

pub use self::policy::{CongruencesReduction, ConstraintsReduction, ReductionPolicy, ShapePreserving, Smash};

/// Two components plus a reduction policy.
///
/// Mutators apply to both components and mark the product dirty. Observers
/// reduce it first, which is why the components sit behind a [`RefCell`].
pub struct ReducedProduct<D1, D2, R> {
    components: RefCell<(D1, D2)>,
    reduced: Cell<bool>,
    policy: PhantomData<R>,
}

pub type SmashProduct<D1, D2> = ReducedProduct<D1, D2, Smash>;
pub type ConstraintsProduct<D1, D2> = ReducedProduct<D1, D2, ConstraintsReduction>;
pub type CongruencesProduct<D1, D2> = ReducedProduct<D1, D2, CongruencesReduction>;
pub type ShapePreservingProduct<D1, D2> = ReducedProduct<D1, D2, ShapePreserving>;

/// The product used most often: congruence information from a grid, bounds from a box.
pub type GridBox = ShapePreservingProduct<Grid, RationalBox>;

impl<D1, D2, R> ReducedProduct<D1, D2, R>
where
    D1: NumericDomain,
    D2: NumericDomain,
    R: ReductionPolicy,
{
    fn from_parts(d1: D1, d2: D2, reduced: bool) -> Self {
        Self {
            components: RefCell::new((d1, d2)),
            reduced: Cell::new(reduced),
            policy: PhantomData,
        }
    }

    /// Pairs two components of the same dimension.
    pub fn new(d1: D1, d2: D2) -> Result<Self> {
        check_same_dimension(
            "ReducedProduct::new",
            "component",
            d1.space_dimension(),
            d2.space_dimension(),
        )?;
        Ok(Self::from_parts(d1, d2, false))
    }

    /// The universe refined with `cs` in both components.
    pub fn from_constraints(cs: &ConstraintSystem) -> Result<Self> {
        let mut p = Self::universe(cs.space_dimension());
        p.refine_with_constraints(cs)?;
        Ok(p)
    }

    /// The universe refined with `cgs` in both components.
    pub fn from_congruences(cgs: &CongruenceSystem) -> Result<Self> {
        let mut p = Self::universe(cgs.space_dimension());
        p.refine_with_congruences(cgs)?;
        Ok(p)
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced.get()
    }

    /// Runs the reduction policy, unless nothing changed since the last run.
    ///
    /// An error raised by a component during reduction leaves both components empty.
    pub fn reduce(&self) {
        if self.reduced.get() {
            return;
        }
        let mut components = self.components.borrow_mut();
        let (d1, d2) = &mut *components;
        if let Err(e) = R::product_reduce(d1, d2) {
            warn!("ReducedProduct::reduce: {}; the product becomes empty", e);
            let space_dim = d1.space_dimension();
            *d1 = D1::empty(space_dim);
            *d2 = D2::empty(space_dim);
        }
        self.reduced.set(true);
    }

    /// The first component, reduced.
    pub fn domain1(&self) -> Ref<'_, D1> {
        self.reduce();
        Ref::map(self.components.borrow(), |(d1, _)| d1)
    }

    /// The second component, reduced.
    pub fn domain2(&self) -> Ref<'_, D2> {
        self.reduce();
        Ref::map(self.components.borrow(), |(_, d2)| d2)
    }

    /// Mutable access to both components; the product is reduced again on the next observation.
    pub fn components_mut(&mut self) -> (&mut D1, &mut D2) {
        self.reduced.set(false);
        let (d1, d2) = self.components.get_mut();
        (d1, d2)
    }

    /// Both components, reduced.
    pub fn into_components(self) -> (D1, D2) {
        self.reduce();
        self.components.into_inner()
    }

    fn both_mut(&mut self) -> &mut (D1, D2) {
        self.reduced.set(false);
        self.components.get_mut()
    }

    fn with_components<T>(&self, f: impl FnOnce(&D1, &D2) -> T) -> T {
        self.reduce();
        let components = self.components.borrow();
        f(&components.0, &components.1)
    }
}

/// Keeps the tighter of two bounds; `upper` selects suprema.
fn tighter(a: Option<Extremum>, b: Option<Extremum>, upper: bool) -> Option<Extremum> {
    let (a, b) = match (a, b) {
        (None, x) | (x, None) => return x,
        (Some(a), Some(b)) => (a, b),
    };
    let order = if upper {
        a.value.cmp(&b.value)
    } else {
        b.value.cmp(&a.value)
    };
    match order {
        Ordering::Less => Some(a),
        Ordering::Greater => Some(b),
        Ordering::Equal => {
            // The witness comes from a component that does not attain the bound, if any.
            let (included, point) = match (a.included, b.included) {
                (true, true) => (true, a.point),
                (false, _) => (false, a.point),
                (true, false) => (false, b.point),
            };
            Some(Extremum {
                value: a.value,
                included,
                point,
            })
        }
    }
}

/// A property holds for the product if it holds for one of the components.
fn combine_relations(r1: Relation, r2: Relation) -> Relation {
    let mut result = Relation::nothing();
    for property in [Relation::IS_INCLUDED, Relation::SATURATES, Relation::IS_DISJOINT] {
        if r1.implies(property) || r2.implies(property) {
            result &= property;
        }
    }
    result
}

impl<D1, D2, R> NumericDomain for ReducedProduct<D1, D2, R>
where
    D1: NumericDomain,
    D2: NumericDomain,
    R: ReductionPolicy,
{
    fn universe(space_dim: usize) -> Self {
        Self::from_parts(D1::universe(space_dim), D2::universe(space_dim), true)
    }

    fn empty(space_dim: usize) -> Self {
        Self::from_parts(D1::empty(space_dim), D2::empty(space_dim), true)
    }

    fn space_dimension(&self) -> usize {
        self.components.borrow().0.space_dimension()
    }

    fn is_empty(&self) -> bool {
        self.with_components(|d1, d2| d1.is_empty() || d2.is_empty())
    }

    fn is_universe(&self) -> bool {
        self.with_components(|d1, d2| d1.is_universe() && d2.is_universe())
    }

    fn contains(&self, other: &Self) -> Result<bool> {
        check_same_dimension(
            "ReducedProduct::contains",
            "product",
            self.space_dimension(),
            other.space_dimension(),
        )?;
        if other.is_empty() {
            return Ok(true);
        }
        if self.is_empty() {
            return Ok(false);
        }
        let (o1, o2) = (other.domain1(), other.domain2());
        self.with_components(|d1, d2| Ok(d1.contains(&o1)? && d2.contains(&o2)?))
    }

    /// Constraints of both components, one after the other.
    fn constraints(&self) -> ConstraintSystem {
        self.with_components(|d1, d2| {
            let mut cs = d1.constraints();
            cs.insert_system(d2.constraints());
            cs
        })
    }

    fn minimized_constraints(&self) -> ConstraintSystem {
        self.with_components(|d1, d2| {
            let mut cs = d1.minimized_constraints();
            cs.insert_system(d2.minimized_constraints());
            cs
        })
    }

    /// Congruences of both components, one after the other.
    fn congruences(&self) -> CongruenceSystem {
        self.with_components(|d1, d2| {
            let mut cgs = d1.congruences();
            cgs.insert_system(d2.congruences());
            cgs
        })
    }

    fn minimized_congruences(&self) -> CongruenceSystem {
        self.with_components(|d1, d2| {
            let mut cgs = d1.minimized_congruences();
            cgs.insert_system(d2.minimized_congruences());
            cgs
        })
    }

    fn add_constraint(&mut self, c: &Constraint) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_constraint(c)?;
        d2.add_constraint(c)
    }

    fn add_constraints(&mut self, cs: &ConstraintSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_constraints(cs)?;
        d2.add_constraints(cs)
    }

    fn add_recycled_constraints(&mut self, cs: ConstraintSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_constraints(&cs)?;
        d2.add_recycled_constraints(cs)
    }

    fn add_congruence(&mut self, cg: &Congruence) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_congruence(cg)?;
        d2.add_congruence(cg)
    }

    fn add_congruences(&mut self, cgs: &CongruenceSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_congruences(cgs)?;
        d2.add_congruences(cgs)
    }

    fn add_recycled_congruences(&mut self, cgs: CongruenceSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.add_congruences(&cgs)?;
        d2.add_recycled_congruences(cgs)
    }

    fn refine_with_constraint(&mut self, c: &Constraint) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.refine_with_constraint(c)?;
        d2.refine_with_constraint(c)
    }

    fn refine_with_constraints(&mut self, cs: &ConstraintSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.refine_with_constraints(cs)?;
        d2.refine_with_constraints(cs)
    }

    fn refine_with_congruence(&mut self, cg: &Congruence) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.refine_with_congruence(cg)?;
        d2.refine_with_congruence(cg)
    }

    fn refine_with_congruences(&mut self, cgs: &CongruenceSystem) -> Result<()> {
        let (d1, d2) = self.both_mut();
        d1.refine_with_congruences(cgs)?;
        d2.refine_with_congruences(cgs)
    }

    /// The tighter of the two suprema; attained only if both components attain it.
    fn maximize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        check_dimension("ReducedProduct::maximize", "expression", self.space_dimension(), expr.space_dimension())?;
        self.with_components(|d1, d2| Ok(tighter(d1.maximize(expr)?, d2.maximize(expr)?, true)))
    }

    fn minimize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        check_dimension("ReducedProduct::minimize", "expression", self.space_dimension(), expr.space_dimension())?;
        self.with_components(|d1, d2| Ok(tighter(d1.minimize(expr)?, d2.minimize(expr)?, false)))
    }

    fn relation_with_constraint(&self, c: &Constraint) -> Result<Relation> {
        self.with_components(|d1, d2| {
            Ok(combine_relations(d1.relation_with_constraint(c)?, d2.relation_with_constraint(c)?))
        })
    }

    fn relation_with_congruence(&self, cg: &Congruence) -> Result<Relation> {
        self.with_components(|d1, d2| {
            Ok(combine_relations(d1.relation_with_congruence(cg)?, d2.relation_with_congruence(cg)?))
        })
    }

    fn relation_with_generator(&self, g: &Generator) -> Result<GeneratorRelation> {
        self.with_components(|d1, d2| {
            if d1.relation_with_generator(g)?.is_subsumes() && d2.relation_with_generator(g)?.is_subsumes() {
                Ok(GeneratorRelation::Subsumes)
            } else {
                Ok(GeneratorRelation::Nothing)
            }
        })
    }

    /// The frequency known to the first component, else the one known to the second.
    fn frequency(&self, expr: &LinearExpression) -> Result<Option<Frequency>> {
        self.with_components(|d1, d2| match d1.frequency(expr)? {
            Some(f) => Ok(Some(f)),
            None => d2.frequency(expr),
        })
    }

    fn intersection_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension(
            "ReducedProduct::intersection_assign",
            "product",
            self.space_dimension(),
            other.space_dimension(),
        )?;
        let (o1, o2) = (other.domain1(), other.domain2());
        let (d1, d2) = self.both_mut();
        d1.intersection_assign(&o1)?;
        d2.intersection_assign(&o2)
    }

    /// Componentwise upper bound of the reduced operands.
    fn upper_bound_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension(
            "ReducedProduct::upper_bound_assign",
            "product",
            self.space_dimension(),
            other.space_dimension(),
        )?;
        self.reduce();
        let (o1, o2) = (other.domain1(), other.domain2());
        let (d1, d2) = self.both_mut();
        d1.upper_bound_assign(&o1)?;
        d2.upper_bound_assign(&o2)
    }

    fn affine_image(&mut self, var: Variable, expr: &LinearExpression, denominator: &BigInt) -> Result<()> {
        debug!("ReducedProduct::affine_image: {} := ({}) / {}", var, expr, denominator);
        let (d1, d2) = self.both_mut();
        d1.affine_image(var, expr, denominator)?;
        d2.affine_image(var, expr, denominator)
    }

    fn add_space_dimensions_and_embed(&mut self, n: usize) {
        let (d1, d2) = self.both_mut();
        d1.add_space_dimensions_and_embed(n);
        d2.add_space_dimensions_and_embed(n);
    }

    fn remove_higher_space_dimensions(&mut self, new_dim: usize) -> Result<()> {
        self.reduce();
        let (d1, d2) = self.both_mut();
        d1.remove_higher_space_dimensions(new_dim)?;
        d2.remove_higher_space_dimensions(new_dim)
    }

    /// Dumps as `product reduced <0|1>`, then both components.
    fn ascii_dump(&self) -> String {
        let components = self.components.borrow();
        format!(
            "product reduced {}\n{}{}",
            flag(self.reduced.get()),
            components.0.ascii_dump(),
            components.1.ascii_dump()
        )
    }

    fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("product")?;
        tokens.expect("reduced")?;
        let reduced = tokens.parse_flag()?;
        let d1 = D1::load_from(tokens)?;
        let d2 = D2::load_from(tokens)?;
        if d1.space_dimension() != d2.space_dimension() {
            return Err(Error::malformed(format!(
                "product components have dimensions {} and {}",
                d1.space_dimension(),
                d2.space_dimension()
            )));
        }
        Ok(Self::from_parts(d1, d2, reduced))
    }
}

impl<D1: Clone, D2: Clone, R> Clone for ReducedProduct<D1, D2, R> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            reduced: self.reduced.clone(),
            policy: PhantomData,
        }
    }
}

impl<D1: fmt::Debug, D2: fmt::Debug, R> fmt::Debug for ReducedProduct<D1, D2, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let components = self.components.borrow();
        f.debug_struct("ReducedProduct")
            .field("d1", &components.0)
            .field("d2", &components.1)
            .field("reduced", &self.reduced.get())
            .field("policy", &std::any::type_name::<R>())
            .finish()
    }
}

impl<D1, D2, R> PartialEq for ReducedProduct<D1, D2, R>
where
    D1: NumericDomain,
    D2: NumericDomain,
    R: ReductionPolicy,
{
    fn eq(&self, other: &Self) -> bool {
        self.space_dimension() == other.space_dimension()
            && matches!(self.contains(other), Ok(true))
            && matches!(other.contains(self), Ok(true))
    }
}

impl<D1, D2, R> fmt::Display for ReducedProduct<D1, D2, R>
where
    D1: NumericDomain + fmt::Display,
    D2: NumericDomain + fmt::Display,
    R: ReductionPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_components(|d1, d2| write!(f, "{} × {}", d1, d2))
    }
}
