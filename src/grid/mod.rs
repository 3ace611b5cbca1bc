//! Grids: sets of points closed under integer combinations of parameters.
//!
//! A [`Grid`] keeps both of its descriptions minimised at all times:
//!
//! - a [`CongruenceSystem`] (always ending with the integrality congruence),
//! - a [`GridGeneratorSystem`] (one point, then lines and parameters).
//!
//! Every mutation edits one view and rebuilds the other through
//! [`conversion`]. An empty grid has no generators and the congruence system
//! `1 = 0`.

mod conversion;
mod simplify;

use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, Zero};

use crate::ascii::{flag, Tokens};
use crate::coefficient::{gcd, gcd_all, rational_mod, scale_rational};
use crate::congruence::{Congruence, CongruenceSystem};
use crate::constraint::{Constraint, ConstraintKind, ConstraintSystem};
use crate::domain::{Extremum, Frequency, NumericDomain};
use crate::error::{check_dimension, check_same_dimension, Error, Result};
use crate::generator::Generator;
use crate::grid_generator::GridGenerator;
use crate::grid_generator_system::GridGeneratorSystem;
use crate::linear::LinearExpression;
use crate::relation::{GeneratorRelation, Relation};
use crate::variable::{PartialFunction, Variable, VariablesSet};

use self::conversion::{congruences_to_generators, generators_to_congruences};
use self::simplify::{simplify_congruences, simplify_generators};

/// The values taken by a linear expression over a grid.
#[derive(Debug)]
enum Values {
    Empty,
    /// Every real number.
    Dense,
    /// `base + step * ℤ`; a zero step means the single value `base`.
    Progression { base: BigRational, step: BigRational },
}

/// Whether `base + step * k` is a multiple of `modulus` for some integer `k`.
///
/// A zero modulus asks for the value zero.
fn progression_meets(base: &BigRational, step: &BigRational, modulus: &BigInt) -> bool {
    let d = base.denom().lcm(step.denom());
    let b = scale_rational(base, &d);
    let s = scale_rational(step, &d);
    if modulus.is_zero() {
        if s.is_zero() {
            b.is_zero()
        } else {
            b.is_multiple_of(&s)
        }
    } else {
        b.is_multiple_of(&gcd(&s, &(modulus * &d)))
    }
}

/// Whether `base + step * k` is a multiple of `modulus` for every integer `k`.
fn progression_within(base: &BigRational, step: &BigRational, modulus: &BigInt) -> bool {
    let d = base.denom().lcm(step.denom());
    let b = scale_rational(base, &d);
    let s = scale_rational(step, &d);
    if modulus.is_zero() {
        b.is_zero() && s.is_zero()
    } else {
        let md = modulus * &d;
        b.is_multiple_of(&md) && s.is_multiple_of(&md)
    }
}

/// A rational grid of fixed space dimension.
#[derive(Debug, Clone)]
pub struct Grid {
    space_dim: usize,
    congruences: CongruenceSystem,
    generators: GridGeneratorSystem,
}

impl Grid {
    /// Builds the grid of all solutions of `cgs`, in the space of `cgs`.
    pub fn from_congruences(cgs: &CongruenceSystem) -> Self {
        Self::rebuild_from_congruences(cgs.clone())
    }

    /// Builds the grid of all solutions of `cs`.
    ///
    /// Fails when `cs` has an inequality that is not trivially decidable.
    pub fn from_constraints(cs: &ConstraintSystem) -> Result<Self> {
        let mut grid = Self::universe(cs.space_dimension());
        grid.add_constraints(cs)?;
        Ok(grid)
    }

    /// Builds the grid generated by `gs`.
    ///
    /// A system without rows gives the empty grid; lines or parameters
    /// without a point are rejected.
    pub fn from_generators(gs: GridGeneratorSystem) -> Result<Self> {
        let space_dim = gs.space_dimension();
        if gs.is_empty() {
            return Ok(Self::empty(space_dim));
        }
        if !gs.has_points() {
            return Err(Error::invalid_argument(
                "Grid::from_generators",
                "a non-empty generator system needs a point",
            ));
        }
        Ok(Self::rebuild_from_generators(gs))
    }

    fn rebuild_from_congruences(mut cgs: CongruenceSystem) -> Self {
        let space_dim = cgs.space_dimension();
        match simplify_congruences(&mut cgs) {
            None => Self::empty(space_dim),
            Some(kinds) => {
                let generators = congruences_to_generators(&cgs, &kinds);
                Self {
                    space_dim,
                    congruences: cgs,
                    generators,
                }
            }
        }
    }

    fn rebuild_from_generators(mut gs: GridGeneratorSystem) -> Self {
        let space_dim = gs.space_dimension();
        if !gs.has_points() {
            return Self::empty(space_dim);
        }
        let kinds = simplify_generators(&mut gs);
        let congruences = generators_to_congruences(&gs, &kinds);
        Self {
            space_dim,
            congruences,
            generators: gs,
        }
    }

    /// The minimised generators; no rows when the grid is empty.
    pub fn generators(&self) -> &GridGeneratorSystem {
        &self.generators
    }

    fn point(&self) -> Option<&GridGenerator> {
        self.generators.iter().find(|g| g.is_point())
    }

    fn values_of(&self, expr: &LinearExpression) -> Values {
        let Some(point) = self.point() else {
            return Values::Empty;
        };
        if self
            .generators
            .iter()
            .any(|g| g.is_line() && !expr.homogeneous_scalar_product(g.expression()).is_zero())
        {
            return Values::Dense;
        }
        let divisor = point.expression().inhomogeneous_term().clone();
        let base = BigRational::new(
            expr.inhomogeneous_term() * &divisor + expr.homogeneous_scalar_product(point.expression()),
            divisor.clone(),
        );
        let steps: Vec<BigInt> = self
            .generators
            .iter()
            .filter(|g| g.is_parameter())
            .map(|g| expr.homogeneous_scalar_product(g.expression()))
            .collect();
        let step = BigRational::new(gcd_all(&steps), divisor);
        Values::Progression { base, step }
    }

    /// `Some(true)` if `c` holds on every point, `Some(false)` if on none.
    fn decide(&self, c: &Constraint) -> Result<Option<bool>> {
        let rel = self.relation_with_constraint(c)?;
        if rel.implies(Relation::IS_INCLUDED) {
            Ok(Some(true))
        } else if rel.implies(Relation::IS_DISJOINT) {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }

    fn set_empty(&mut self) {
        *self = Self::empty(self.space_dim);
    }

    fn extremum(&self, method: &'static str, expr: &LinearExpression) -> Result<Option<Extremum>> {
        check_dimension(method, "expression", self.space_dim, expr.space_dimension())?;
        match self.values_of(expr) {
            Values::Progression { base, step } if step.is_zero() => {
                let point = match self.point() {
                    Some(p) => p.to_point()?,
                    None => return Ok(None),
                };
                Ok(Some(Extremum {
                    value: base,
                    included: true,
                    point,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Adds `g` to the generators.
    ///
    /// Lines and parameters cannot be added to an empty grid.
    pub fn add_grid_generator(&mut self, g: &GridGenerator) -> Result<()> {
        const METHOD: &str = "Grid::add_grid_generator";
        check_dimension(METHOD, "generator", self.space_dim, g.space_dimension())?;
        if self.is_empty() && !g.is_point() {
            return Err(Error::invalid_argument(METHOD, "the grid is empty and the generator is not a point"));
        }
        let mut gs = self.generators.clone();
        gs.insert(g.clone());
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }

    /// Renames dimensions according to `pfunc`; unmapped dimensions are projected away.
    pub fn map_space_dimensions(&mut self, pfunc: &PartialFunction) -> Result<()> {
        const METHOD: &str = "Grid::map_space_dimensions";
        let new_dim = pfunc.codomain_dimension();
        check_dimension(METHOD, "codomain", self.space_dim, new_dim)?;
        debug!("Grid::map_space_dimensions: {} -> {}", self.space_dim, new_dim);
        if self.is_empty() {
            *self = Self::empty(new_dim);
            return Ok(());
        }
        let mut gs = self.generators.clone();
        gs.map_space_dimensions(pfunc)?;
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }

    /// Projects away the dimensions in `vars`.
    pub fn remove_space_dimensions(&mut self, vars: &VariablesSet) -> Result<()> {
        if let Some(last) = vars.iter().next_back() {
            check_dimension(
                "Grid::remove_space_dimensions",
                "variable",
                self.space_dim,
                last.space_dimension(),
            )?;
        }
        if vars.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = Self::empty(self.space_dim - vars.len());
            return Ok(());
        }
        let mut gs = self.generators.clone();
        gs.remove_space_dimensions(vars)?;
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }
}

impl NumericDomain for Grid {
    fn universe(space_dim: usize) -> Self {
        Self::rebuild_from_congruences(CongruenceSystem::with_dimension(space_dim))
    }

    fn empty(space_dim: usize) -> Self {
        Self {
            space_dim,
            congruences: CongruenceSystem::inconsistent(space_dim),
            generators: GridGeneratorSystem::with_dimension(space_dim),
        }
    }

    fn space_dimension(&self) -> usize {
        self.space_dim
    }

    fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    fn is_universe(&self) -> bool {
        !self.is_empty() && self.congruences.iter().all(Congruence::is_tautological)
    }

    fn contains(&self, other: &Self) -> Result<bool> {
        check_same_dimension("Grid::contains", "grid", self.space_dim, other.space_dim)?;
        if other.is_empty() {
            return Ok(true);
        }
        if self.is_empty() {
            return Ok(false);
        }
        Ok(other.generators.iter().all(|g| self.congruences.is_satisfied_by(g)))
    }

    /// The equalities of the grid.
    fn constraints(&self) -> ConstraintSystem {
        if self.is_empty() {
            return ConstraintSystem::inconsistent(self.space_dim);
        }
        let mut cs = ConstraintSystem::with_dimension(self.space_dim);
        for cg in self.congruences.iter().filter(|cg| cg.is_equality()) {
            cs.insert(Constraint::new(cg.expression().clone(), ConstraintKind::Equality));
        }
        cs
    }

    fn congruences(&self) -> CongruenceSystem {
        self.congruences.clone()
    }

    fn minimized_congruences(&self) -> CongruenceSystem {
        if self.is_empty() {
            return CongruenceSystem::inconsistent(self.space_dim);
        }
        let mut cgs = CongruenceSystem::with_dimension(self.space_dim);
        for cg in self.congruences.iter().filter(|cg| !cg.is_tautological()) {
            let mut cg = cg.clone();
            cg.strong_normalize();
            cgs.insert(cg);
        }
        cgs
    }

    /// Adds an equality, or an inequality whose truth is constant over the grid.
    fn add_constraint(&mut self, c: &Constraint) -> Result<()> {
        const METHOD: &str = "Grid::add_constraint";
        check_dimension(METHOD, "constraint", self.space_dim, c.space_dimension())?;
        if let Some(cg) = Congruence::from_equality_constraint(c) {
            return self.add_congruence(&cg);
        }
        match self.decide(c)? {
            Some(true) => Ok(()),
            Some(false) => {
                self.set_empty();
                Ok(())
            }
            None => Err(Error::invalid_argument(METHOD, format!("`{}` is not representable by a grid", c))),
        }
    }

    fn add_congruence(&mut self, cg: &Congruence) -> Result<()> {
        check_dimension("Grid::add_congruence", "congruence", self.space_dim, cg.space_dimension())?;
        if self.is_empty() {
            return Ok(());
        }
        let mut cgs = self.congruences.clone();
        cgs.insert(cg.clone());
        *self = Self::rebuild_from_congruences(cgs);
        Ok(())
    }

    fn add_congruences(&mut self, cgs: &CongruenceSystem) -> Result<()> {
        check_dimension("Grid::add_congruences", "system", self.space_dim, cgs.space_dimension())?;
        if self.is_empty() || cgs.is_empty() {
            return Ok(());
        }
        let mut all = self.congruences.clone();
        all.insert_system(cgs.clone());
        *self = Self::rebuild_from_congruences(all);
        Ok(())
    }

    /// Equalities are added; inequalities only when decided by the grid.
    fn refine_with_constraint(&mut self, c: &Constraint) -> Result<()> {
        check_dimension("Grid::refine_with_constraint", "constraint", self.space_dim, c.space_dimension())?;
        if let Some(cg) = Congruence::from_equality_constraint(c) {
            return self.add_congruence(&cg);
        }
        if self.decide(c)? == Some(false) {
            self.set_empty();
        }
        Ok(())
    }

    fn refine_with_congruence(&mut self, cg: &Congruence) -> Result<()> {
        self.add_congruence(cg)
    }

    /// Bounded only when `expr` is constant over the grid.
    fn maximize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.extremum("Grid::maximize", expr)
    }

    fn minimize(&self, expr: &LinearExpression) -> Result<Option<Extremum>> {
        self.extremum("Grid::minimize", expr)
    }

    fn relation_with_constraint(&self, c: &Constraint) -> Result<Relation> {
        check_dimension("Grid::relation_with_constraint", "constraint", self.space_dim, c.space_dimension())?;
        let (base, step) = match self.values_of(c.expression()) {
            Values::Empty => return Ok(Relation::IS_INCLUDED & Relation::SATURATES & Relation::IS_DISJOINT),
            Values::Dense => return Ok(Relation::STRICTLY_INTERSECTS),
            Values::Progression { base, step } => (base, step),
        };
        if !step.is_zero() {
            if c.is_equality() && !progression_meets(&base, &step, &BigInt::zero()) {
                return Ok(Relation::IS_DISJOINT);
            }
            return Ok(Relation::STRICTLY_INTERSECTS);
        }
        Ok(match c.kind() {
            ConstraintKind::Equality if base.is_zero() => Relation::IS_INCLUDED & Relation::SATURATES,
            ConstraintKind::Equality => Relation::IS_DISJOINT,
            ConstraintKind::NonStrictInequality if base.is_zero() => Relation::IS_INCLUDED & Relation::SATURATES,
            ConstraintKind::StrictInequality if base.is_zero() => Relation::SATURATES & Relation::IS_DISJOINT,
            _ if base.is_positive() => Relation::IS_INCLUDED,
            _ => Relation::IS_DISJOINT,
        })
    }

    fn relation_with_congruence(&self, cg: &Congruence) -> Result<Relation> {
        check_dimension("Grid::relation_with_congruence", "congruence", self.space_dim, cg.space_dimension())?;
        let (base, step) = match self.values_of(cg.expression()) {
            Values::Empty => return Ok(Relation::IS_INCLUDED & Relation::SATURATES & Relation::IS_DISJOINT),
            Values::Dense => return Ok(Relation::STRICTLY_INTERSECTS),
            Values::Progression { base, step } => (base, step),
        };
        let modulus = cg.modulus();
        if progression_within(&base, &step, modulus) {
            if cg.is_equality() {
                return Ok(Relation::IS_INCLUDED & Relation::SATURATES);
            }
            return Ok(Relation::IS_INCLUDED);
        }
        if !progression_meets(&base, &step, modulus) {
            return Ok(Relation::IS_DISJOINT);
        }
        Ok(Relation::STRICTLY_INTERSECTS)
    }

    /// A ray is treated as the line through it.
    fn relation_with_generator(&self, g: &Generator) -> Result<GeneratorRelation> {
        check_dimension("Grid::relation_with_generator", "generator", self.space_dim, g.space_dimension())?;
        if self.is_empty() {
            return Ok(GeneratorRelation::Nothing);
        }
        let gg = if g.is_line_or_ray() {
            GridGenerator::grid_line(g.expression().clone())?
        } else {
            GridGenerator::grid_point(g.expression().clone(), g.divisor()?.clone())?
        };
        if self.congruences.is_satisfied_by(&gg) {
            Ok(GeneratorRelation::Subsumes)
        } else {
            Ok(GeneratorRelation::Nothing)
        }
    }

    fn frequency(&self, expr: &LinearExpression) -> Result<Option<Frequency>> {
        check_dimension("Grid::frequency", "expression", self.space_dim, expr.space_dimension())?;
        Ok(match self.values_of(expr) {
            Values::Progression { base, step } if step.is_zero() => Some(Frequency {
                period: step,
                residue: base,
            }),
            Values::Progression { base, step } => Some(Frequency {
                residue: rational_mod(&base, &step),
                period: step,
            }),
            _ => None,
        })
    }

    fn intersection_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension("Grid::intersection_assign", "grid", self.space_dim, other.space_dim)?;
        if self.is_empty() {
            return Ok(());
        }
        if other.is_empty() {
            self.set_empty();
            return Ok(());
        }
        let mut cgs = self.congruences.clone();
        cgs.insert_system(other.congruences.clone());
        *self = Self::rebuild_from_congruences(cgs);
        Ok(())
    }

    /// The smallest grid containing both.
    fn upper_bound_assign(&mut self, other: &Self) -> Result<()> {
        check_same_dimension("Grid::upper_bound_assign", "grid", self.space_dim, other.space_dim)?;
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other.clone();
            return Ok(());
        }
        let mut gs = self.generators.clone();
        gs.insert_system(other.generators.clone());
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }

    fn affine_image(&mut self, var: Variable, expr: &LinearExpression, denominator: &BigInt) -> Result<()> {
        if self.is_empty() {
            // Arguments are still validated.
            let mut gs = GridGeneratorSystem::with_dimension(self.space_dim);
            return gs.affine_image(var, expr, denominator);
        }
        let mut gs = self.generators.clone();
        gs.affine_image(var, expr, denominator)?;
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }

    fn add_space_dimensions_and_embed(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if self.is_empty() {
            *self = Self::empty(self.space_dim + n);
            return;
        }
        let mut gs = self.generators.clone();
        gs.add_universe_rows_and_columns(n);
        *self = Self::rebuild_from_generators(gs);
    }

    fn remove_higher_space_dimensions(&mut self, new_dim: usize) -> Result<()> {
        check_dimension("Grid::remove_higher_space_dimensions", "dimension", self.space_dim, new_dim)?;
        if new_dim == self.space_dim {
            return Ok(());
        }
        if self.is_empty() {
            *self = Self::empty(new_dim);
            return Ok(());
        }
        let mut gs = self.generators.clone();
        gs.remove_higher_space_dimensions(new_dim)?;
        *self = Self::rebuild_from_generators(gs);
        Ok(())
    }

    /// Dumps as `grid dim <n> empty <0|1>`, then the congruences, then the generators.
    fn ascii_dump(&self) -> String {
        format!(
            "grid dim {} empty {}\n{}{}",
            self.space_dim,
            flag(self.is_empty()),
            self.congruences.ascii_dump(),
            self.generators.ascii_dump()
        )
    }

    /// Both views are read; they must describe the same grid.
    fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        tokens.expect("grid")?;
        tokens.expect("dim")?;
        let space_dim: usize = tokens.parse()?;
        tokens.expect("empty")?;
        let empty = tokens.parse_flag()?;
        let cgs = CongruenceSystem::load_from(tokens)?;
        let gs = GridGeneratorSystem::load_from(tokens)?;
        if cgs.space_dimension() != space_dim || gs.space_dimension() != space_dim {
            return Err(Error::malformed(format!(
                "grid of dimension {} holds systems of dimension {} and {}",
                space_dim,
                cgs.space_dimension(),
                gs.space_dimension()
            )));
        }
        let from_congruences = Self::rebuild_from_congruences(cgs);
        let from_generators = Self::from_generators(gs).map_err(|e| Error::malformed(e.to_string()))?;
        if from_congruences.is_empty() != empty || from_congruences != from_generators {
            return Err(Error::malformed("congruences and generators describe different grids"));
        }
        Ok(from_congruences)
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.space_dim == other.space_dim
            && matches!(self.contains(other), Ok(true))
            && matches!(other.contains(self), Ok(true))
    }
}

impl Eq for Grid {}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "false");
        }
        let cgs = self.minimized_congruences();
        if cgs.is_empty() {
            return write!(f, "true");
        }
        write!(f, "{}", cgs)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::domain::tests::check_lattice_axioms;

    fn q(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn expr(c: &[i64]) -> LinearExpression {
        LinearExpression::from_coefficients(c.iter().copied(), 0)
    }

    #[test]
    fn test_universe_and_empty() {
        let u = Grid::universe(2);
        assert!(u.is_universe());
        assert!(!u.is_empty());
        assert_eq!(u.generators().num_lines(), 2);
        assert_eq!(u.to_string(), "true");

        let e = Grid::empty(2);
        assert!(e.is_empty());
        assert!(!e.is_universe());
        assert_eq!(e.to_string(), "false");
        assert!(u.contains(&e).unwrap());
        assert!(!e.contains(&u).unwrap());
    }

    #[test]
    fn test_zero_dimension() {
        let u = Grid::universe(0);
        assert!(u.is_universe());
        assert_eq!(u.generators().len(), 1);
        assert_ne!(u, Grid::empty(0));
    }

    #[test]
    fn test_from_generators() {
        let gs: GridGeneratorSystem = [
            GridGenerator::grid_point_unit(expr(&[0, 0])),
            GridGenerator::grid_point_unit(expr(&[3, 0])),
            GridGenerator::grid_point_unit(expr(&[0, 3])),
        ]
        .into_iter()
        .collect();
        let grid = Grid::from_generators(gs).unwrap();
        assert_eq!(grid.generators().len(), 3);
        assert_eq!(grid.generators().num_parameters(), 2);
        let x = Variable::new(0);
        let y = Variable::new(1);
        let expected: CongruenceSystem = [Congruence::modular(x, 0, 3), Congruence::modular(y, 0, 3)]
            .into_iter()
            .collect();
        assert_eq!(grid, Grid::from_congruences(&expected));

        let lonely = GridGeneratorSystem::from(GridGenerator::parameter_unit(expr(&[1, 0])));
        assert!(Grid::from_generators(lonely).unwrap_err().is_invalid_argument());
        assert!(Grid::from_generators(GridGeneratorSystem::with_dimension(3)).unwrap().is_empty());
    }

    #[test]
    fn test_add_constraint() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut grid = Grid::universe(2);
        grid.add_constraint(&Constraint::eq(x, y * 2)).unwrap();
        assert_eq!(grid.generators().num_lines(), 1);
        assert_eq!(grid.constraints().len(), 1);

        // x - 2y >= 0 holds everywhere.
        grid.add_constraint(&Constraint::ge(x, y * 2)).unwrap();
        // x >= 0 does not.
        let err = grid.add_constraint(&Constraint::ge(x, 0)).unwrap_err();
        assert!(err.is_invalid_argument());
        // but refining with it is a no-op.
        let before = grid.clone();
        grid.refine_with_constraint(&Constraint::ge(x, 0)).unwrap();
        assert_eq!(grid, before);

        grid.add_constraint(&Constraint::gt(x, y * 2)).unwrap();
        assert!(grid.is_empty());
    }

    #[test]
    fn test_add_congruence() {
        let x = Variable::new(0);
        let mut grid = Grid::universe(1);
        grid.add_congruence(&Congruence::modular(x, 0, 2)).unwrap();
        grid.add_congruence(&Congruence::modular(x, 0, 3)).unwrap();
        let f = grid.frequency(&LinearExpression::from(x)).unwrap().unwrap();
        assert_eq!(f.period, q(6, 1));
        assert!(f.residue.is_zero());

        grid.add_congruence(&Congruence::modular(x, 1, 4)).unwrap();
        assert!(grid.is_empty());
        assert!(grid.constraints().iter().any(Constraint::is_inconsistent));
    }

    #[test]
    fn test_frequency_and_maximize() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let cgs: CongruenceSystem = [Congruence::modular(x, 1, 4), Congruence::equality(y, 5)]
            .into_iter()
            .collect();
        let grid = Grid::from_congruences(&cgs);

        let f = grid.frequency(&(x + y)).unwrap().unwrap();
        assert_eq!(f.period, q(4, 1));
        assert_eq!(f.residue, q(2, 1));

        assert!(grid.maximize(&LinearExpression::from(x)).unwrap().is_none());
        let m = grid.maximize(&LinearExpression::from(y)).unwrap().unwrap();
        assert_eq!(m.value, q(5, 1));
        assert!(m.included);
        assert_eq!(m.point.evaluate(&LinearExpression::from(y)), q(5, 1));

        let f = grid.frequency(&(y * 2)).unwrap().unwrap();
        assert!(f.period.is_zero());
        assert_eq!(f.residue, q(10, 1));

        // Lines make every value reachable.
        let loose = Grid::universe(2);
        assert!(loose.frequency(&LinearExpression::from(x)).unwrap().is_none());
    }

    #[test]
    fn test_relations() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let cgs: CongruenceSystem = [Congruence::modular(x, 0, 2), Congruence::equality(y, 1)]
            .into_iter()
            .collect();
        let grid = Grid::from_congruences(&cgs);

        let rel = grid.relation_with_congruence(&Congruence::modular(x, 0, 4)).unwrap();
        assert_eq!(rel, Relation::STRICTLY_INTERSECTS);
        let rel = grid.relation_with_congruence(&Congruence::modular(x, 1, 2)).unwrap();
        assert_eq!(rel, Relation::IS_DISJOINT);
        let rel = grid.relation_with_congruence(&Congruence::modular(x, 0, 1)).unwrap();
        assert_eq!(rel, Relation::IS_INCLUDED);
        let rel = grid.relation_with_congruence(&Congruence::equality(y, 1)).unwrap();
        assert!(rel.implies(Relation::IS_INCLUDED & Relation::SATURATES));

        assert_eq!(grid.relation_with_constraint(&Constraint::eq(x, 1)).unwrap(), Relation::IS_DISJOINT);
        assert_eq!(grid.relation_with_constraint(&Constraint::eq(x, 4)).unwrap(), Relation::STRICTLY_INTERSECTS);
        assert_eq!(grid.relation_with_constraint(&Constraint::ge(y, 0)).unwrap(), Relation::IS_INCLUDED);
        assert_eq!(
            grid.relation_with_constraint(&Constraint::gt(y, 1)).unwrap(),
            Relation::SATURATES & Relation::IS_DISJOINT
        );

        let inside = Generator::point(expr(&[4, 1]), 1).unwrap();
        let outside = Generator::point(expr(&[1, 1]), 1).unwrap();
        assert_eq!(grid.relation_with_generator(&inside).unwrap(), GeneratorRelation::Subsumes);
        assert_eq!(grid.relation_with_generator(&outside).unwrap(), GeneratorRelation::Nothing);
        let ray = Generator::ray(expr(&[0, 1])).unwrap();
        assert_eq!(grid.relation_with_generator(&ray).unwrap(), GeneratorRelation::Nothing);

        let empty = Grid::empty(2);
        assert_eq!(
            empty.relation_with_constraint(&Constraint::eq(x, 1)).unwrap(),
            Relation::IS_INCLUDED & Relation::SATURATES & Relation::IS_DISJOINT
        );
    }

    #[test]
    fn test_join_and_meet() {
        let x = Variable::new(0);
        let a = Grid::from_congruences(&CongruenceSystem::from(Congruence::equality(x, 0)));
        let b = Grid::from_congruences(&CongruenceSystem::from(Congruence::equality(x, 4)));
        let mut join = a.clone();
        join.upper_bound_assign(&b).unwrap();
        assert_eq!(join, Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(x, 0, 4))));

        let mut meet = a.clone();
        meet.intersection_assign(&b).unwrap();
        assert!(meet.is_empty());

        let samples = vec![a, b, join, meet, Grid::universe(1), Grid::empty(1)];
        check_lattice_axioms(&samples);
    }

    #[test]
    fn test_affine_image() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        // x ≡ 0 (mod 2), y = 0; then y := (x + 1) / 2.
        let cgs: CongruenceSystem = [Congruence::modular(x, 0, 2), Congruence::equality(y, 0)]
            .into_iter()
            .collect();
        let mut grid = Grid::from_congruences(&cgs);
        grid.affine_image(y, &(x + 1), &BigInt::from(2)).unwrap();
        let f = grid.frequency(&LinearExpression::from(y)).unwrap().unwrap();
        assert_eq!(f.period, q(1, 1));
        assert_eq!(f.residue, q(1, 2));

        let err = grid.affine_image(y, &LinearExpression::from(x), &BigInt::zero()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_dimensions() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut grid = Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(x, 0, 3)));
        grid.add_space_dimensions_and_embed(1);
        assert_eq!(grid.space_dimension(), 2);
        assert_eq!(grid.relation_with_congruence(&Congruence::modular(x, 0, 3)).unwrap(), Relation::IS_INCLUDED);
        assert!(grid.frequency(&LinearExpression::from(y)).unwrap().is_none());

        let mut swapped = grid.clone();
        let mut pfunc = PartialFunction::new();
        pfunc.insert(0, 1).unwrap();
        pfunc.insert(1, 0).unwrap();
        swapped.map_space_dimensions(&pfunc).unwrap();
        assert_eq!(
            swapped.relation_with_congruence(&Congruence::modular(y, 0, 3)).unwrap(),
            Relation::IS_INCLUDED
        );

        let mut removed = grid.clone();
        removed.remove_space_dimensions(&[x].into_iter().collect()).unwrap();
        assert!(removed.is_universe());

        grid.remove_higher_space_dimensions(1).unwrap();
        assert_eq!(grid, Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(x, 0, 3))));
        assert!(grid.remove_higher_space_dimensions(2).is_err());
    }

    #[test]
    fn test_ascii_round_trip() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let cgs: CongruenceSystem = [Congruence::modular(x + y, 1, 3), Congruence::equality(x * 2, y)]
            .into_iter()
            .collect();
        let grid = Grid::from_congruences(&cgs);
        let dump = grid.ascii_dump();
        assert!(dump.starts_with("grid dim 2 empty 0"));
        assert_eq!(Grid::ascii_load(&dump).unwrap(), grid);

        let empty = Grid::empty(2);
        assert!(Grid::ascii_load(&empty.ascii_dump()).unwrap().is_empty());

        let tampered = dump.replacen("empty 0", "empty 1", 1);
        assert!(matches!(Grid::ascii_load(&tampered), Err(Error::MalformedInput(_))));
        assert!(matches!(Grid::ascii_load("grid dim"), Err(Error::MalformedInput(_))));
    }
}
