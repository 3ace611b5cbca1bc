//! Ordered systems of grid generators.

use std::fmt;

use log::debug;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::ascii::{flag, Tokens};
use crate::coefficient::lcm;
use crate::error::{check_dimension, Error, Result};
use crate::grid_generator::{GridGenerator, GridGeneratorType};
use crate::linear::LinearExpression;
use crate::variable::{PartialFunction, Variable, VariablesSet};

/// Insertion-ordered grid generators sharing one space dimension.
///
/// # Invariants
///
/// - every row has dimension `space_dim`;
/// - `sorted` implies lines come first, then parameters, then points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridGeneratorSystem {
    rows: Vec<GridGenerator>,
    space_dim: usize,
    sorted: bool,
}

impl GridGeneratorSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(space_dim: usize) -> Self {
        Self {
            rows: Vec::new(),
            space_dim,
            sorted: false,
        }
    }

    /// Generators of the whole space: the origin plus one line per dimension.
    pub fn universe(space_dim: usize) -> Self {
        let mut gs = Self::with_dimension(space_dim);
        gs.insert(GridGenerator::grid_point_unit(LinearExpression::with_dimension(space_dim)));
        gs.add_universe_lines(0, space_dim);
        gs
    }

    pub fn space_dimension(&self) -> usize {
        self.space_dim
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridGenerator> {
        self.rows.iter()
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<GridGenerator> {
        self.sorted = false;
        &mut self.rows
    }

    /// Appends `g`, growing the dimension of the system or of the row to match.
    ///
    /// A parameter with no homogeneous term only grows the dimension.
    pub fn insert(&mut self, mut g: GridGenerator) {
        if g.space_dimension() > self.space_dim {
            self.set_space_dimension(g.space_dimension());
        } else if g.space_dimension() < self.space_dim {
            g.set_space_dimension(self.space_dim);
        }
        if g.is_parameter() && g.all_homogeneous_terms_are_zero() {
            return;
        }
        if self.sorted {
            if let Some(last) = self.rows.last() {
                self.sorted = last.type_() <= g.type_();
            }
        }
        self.rows.push(g);
    }

    /// Moves every row of `other` into `self`.
    pub fn insert_system(&mut self, other: GridGeneratorSystem) {
        if other.space_dim > self.space_dim {
            self.set_space_dimension(other.space_dim);
        }
        for g in other.rows {
            self.insert(g);
        }
    }

    /// Grows the space dimension; never shrinks.
    pub fn set_space_dimension(&mut self, space_dim: usize) {
        debug_assert!(space_dim >= self.space_dim);
        if space_dim <= self.space_dim {
            return;
        }
        for g in self.rows.iter_mut() {
            g.set_space_dimension(space_dim);
        }
        self.space_dim = space_dim;
    }

    fn add_universe_lines(&mut self, from: usize, to: usize) {
        for i in from..to {
            let mut e = LinearExpression::with_dimension(self.space_dim);
            e.set_coefficient(Variable::new(i), 1);
            self.rows.push(GridGenerator::from_parts(e, BigInt::zero(), GridGeneratorType::Line));
        }
        self.sorted = false;
    }

    /// Adds `n` dimensions, each generated by a new line.
    pub fn add_universe_rows_and_columns(&mut self, n: usize) {
        let old = self.space_dim;
        self.set_space_dimension(old + n);
        self.add_universe_lines(old, old + n);
    }

    /// Sorts rows as lines, then parameters, then points.
    pub fn sort_rows(&mut self) {
        self.rows.sort_by_key(|g| g.type_());
        self.sorted = true;
    }

    pub fn num_lines(&self) -> usize {
        if self.sorted {
            self.rows.iter().take_while(|g| g.is_line()).count()
        } else {
            self.rows.iter().filter(|g| g.is_line()).count()
        }
    }

    pub fn num_parameters(&self) -> usize {
        if self.sorted {
            self.rows
                .iter()
                .skip_while(|g| g.is_line())
                .take_while(|g| g.is_parameter())
                .count()
        } else {
            self.rows.iter().filter(|g| g.is_parameter()).count()
        }
    }

    pub fn has_points(&self) -> bool {
        if self.sorted {
            self.rows.last().map_or(false, GridGenerator::is_point)
        } else {
            self.rows.iter().any(GridGenerator::is_point)
        }
    }

    /// Rescales every point and parameter to the LCM of their divisors, which is returned.
    pub fn normalize_divisors(&mut self) -> BigInt {
        let divisor = self
            .rows
            .iter()
            .filter_map(|g| g.divisor().ok())
            .fold(BigInt::one(), |acc, d| lcm(&acc, d));
        for g in self.rows.iter_mut() {
            g.rescale_to_divisor(&divisor);
        }
        divisor
    }

    /// Applies `var := expr / denominator` to every row.
    ///
    /// When the map is not invertible, lines and parameters that collapse onto
    /// the origin are dropped.
    pub fn affine_image(&mut self, var: Variable, expr: &LinearExpression, denominator: &BigInt) -> Result<()> {
        const METHOD: &str = "GridGeneratorSystem::affine_image";
        if denominator.is_zero() {
            return Err(Error::invalid_argument(METHOD, "zero denominator"));
        }
        check_dimension(METHOD, "variable", self.space_dim, var.space_dimension())?;
        check_dimension(METHOD, "expression", self.space_dim, expr.space_dimension())?;
        debug!("affine image {} := ({}) / {} on {} rows", var, expr, denominator, self.rows.len());

        let (expr, denominator) = if denominator.is_negative() {
            (-expr.clone(), -denominator)
        } else {
            (expr.clone(), denominator.clone())
        };
        let col = var.id() + 1;
        for g in self.rows.iter_mut() {
            let value = expr.scalar_product(g.expression());
            if !denominator.is_one() {
                *g.expression_mut() *= &denominator;
                if g.is_parameter() {
                    let d = g.parameter_divisor() * &denominator;
                    g.set_type(GridGeneratorType::Parameter, &d);
                }
            }
            *g.expression_mut().get_mut(col) = value;
            if g.is_line() {
                g.strong_normalize();
            }
        }
        if expr.coefficient(var).is_zero() {
            self.remove_invalid_lines_and_parameters();
        }
        self.sorted = false;
        Ok(())
    }

    fn remove_invalid_lines_and_parameters(&mut self) {
        self.rows
            .retain(|g| g.is_point() || !g.all_homogeneous_terms_are_zero());
    }

    /// Renames dimensions according to `pfunc`; unmapped dimensions are projected away.
    pub fn map_space_dimensions(&mut self, pfunc: &PartialFunction) -> Result<()> {
        if pfunc.is_permutation_of(self.space_dim) {
            let cycles = pfunc.cycles(self.space_dim);
            debug!("map_space_dimensions: {} cycles", cycles.len());
            for cycle in cycles {
                let cycle: Vec<Variable> = cycle.into_iter().map(Variable::new).collect();
                for g in self.rows.iter_mut() {
                    g.permute_space_dimensions(&cycle)?;
                }
            }
            self.sorted = false;
            return Ok(());
        }

        let new_dim = pfunc.codomain_dimension();
        debug!("map_space_dimensions: {} -> {} dimensions", self.space_dim, new_dim);
        self.normalize_divisors();
        let old_dim = self.space_dim;
        let rows = std::mem::take(&mut self.rows);
        for g in rows {
            let mut e = LinearExpression::with_dimension(new_dim);
            e.set_inhomogeneous_term(g.expression().inhomogeneous_term().clone());
            for i in 0..old_dim {
                if let Some(j) = pfunc.maps(i) {
                    e.set_coefficient(Variable::new(j), g.expression().coefficient(Variable::new(i)).clone());
                }
            }
            let mut projected = GridGenerator::from_parts(e, g.parameter_divisor().clone(), g.type_());
            if projected.is_line() {
                if projected.all_homogeneous_terms_are_zero() {
                    continue;
                }
                projected.strong_normalize();
            } else if projected.is_parameter() && projected.all_homogeneous_terms_are_zero() {
                continue;
            }
            self.rows.push(projected);
        }
        self.space_dim = new_dim;
        self.sorted = false;
        Ok(())
    }

    /// Projects away the dimensions in `vars`.
    pub fn remove_space_dimensions(&mut self, vars: &VariablesSet) -> Result<()> {
        if let Some(last) = vars.iter().next_back() {
            check_dimension(
                "GridGeneratorSystem::remove_space_dimensions",
                "variable",
                self.space_dim,
                last.space_dimension(),
            )?;
        }
        if vars.is_empty() {
            return Ok(());
        }
        self.map_space_dimensions(&PartialFunction::compacting(self.space_dim, vars))
    }

    /// Keeps only the first `new_dim` dimensions.
    pub fn remove_higher_space_dimensions(&mut self, new_dim: usize) -> Result<()> {
        check_dimension(
            "GridGeneratorSystem::remove_higher_space_dimensions",
            "dimension",
            self.space_dim,
            new_dim,
        )?;
        if new_dim == self.space_dim {
            return Ok(());
        }
        let vars: VariablesSet = (new_dim..self.space_dim).map(Variable::new).collect();
        self.map_space_dimensions(&PartialFunction::compacting(self.space_dim, &vars))
    }

    /// Dumps as `<rows> x <columns>`, `sorted <0|1>`, then one row per line.
    pub fn ascii_dump(&self) -> String {
        let mut out = format!("{} x {}\nsorted {}\n", self.rows.len(), self.space_dim + 2, flag(self.sorted));
        for g in &self.rows {
            out.push_str(&g.ascii_dump());
        }
        out
    }

    pub fn ascii_load(text: &str) -> Result<Self> {
        let mut tokens = Tokens::new(text);
        let gs = Self::load_from(&mut tokens)?;
        tokens.finish()?;
        Ok(gs)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        let num_rows: usize = tokens.parse()?;
        tokens.expect("x")?;
        let num_columns: usize = tokens.parse()?;
        if num_columns < 2 {
            return Err(Error::malformed(format!("grid generator system with {} columns", num_columns)));
        }
        tokens.expect("sorted")?;
        let sorted = tokens.parse_flag()?;
        let space_dim = num_columns - 2;
        let mut rows = Vec::with_capacity(num_rows);
        for _ in 0..num_rows {
            let g = GridGenerator::load_from(tokens)?;
            if g.space_dimension() != space_dim {
                return Err(Error::malformed(format!(
                    "grid generator with {} columns in a system of {} columns",
                    g.space_dimension() + 2,
                    num_columns
                )));
            }
            if g.is_parameter() && g.all_homogeneous_terms_are_zero() {
                return Err(Error::malformed("zero parameter in a grid generator system"));
            }
            rows.push(g);
        }
        let gs = Self { rows, space_dim, sorted };
        if sorted && gs.rows.windows(2).any(|w| w[0].type_() > w[1].type_()) {
            return Err(Error::malformed("rows are flagged as sorted but are not"));
        }
        Ok(gs)
    }
}

impl From<GridGenerator> for GridGeneratorSystem {
    fn from(g: GridGenerator) -> Self {
        let mut gs = GridGeneratorSystem::new();
        gs.insert(g);
        gs
    }
}

impl FromIterator<GridGenerator> for GridGeneratorSystem {
    fn from_iter<I: IntoIterator<Item = GridGenerator>>(iter: I) -> Self {
        let mut gs = GridGeneratorSystem::new();
        for g in iter {
            gs.insert(g);
        }
        gs
    }
}

impl IntoIterator for GridGeneratorSystem {
    type Item = GridGenerator;
    type IntoIter = std::vec::IntoIter<GridGenerator>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a GridGeneratorSystem {
    type Item = &'a GridGenerator;
    type IntoIter = std::slice::Iter<'a, GridGenerator>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for GridGeneratorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "false");
        }
        for (i, g) in self.rows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", g)?;
        }
        Ok(())
    }
}
