//! Conversion between the congruence and generator views of a grid.
//!
//! Both directions read a minimised (triangular) system column by column and
//! compute the dual basis exactly over the rationals:
//!
//! - congruences to generators: with `C` the lower-triangular matrix whose
//!   row `j` is the congruence pivoting on column `j` (divided by its modulus),
//!   the columns of `C⁻¹` are the point (column 0), the parameters (proper
//!   congruence columns) and the lines (virtual columns);
//! - generators to congruences: with `B` the upper-triangular matrix whose
//!   row `j` is the generator pivoting on column `j` (divided by its divisor),
//!   the columns of `B⁻¹` are the proper congruences (parameter columns) and
//!   the equalities (virtual columns).
//!
//! Missing pivots are filled with unit rows, which keeps both matrices
//! invertible. Results are minimised again before they are returned.

use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};

use crate::coefficient::{lcm_denominators, scale_rational};
use crate::congruence::{Congruence, CongruenceSystem};
use crate::grid::simplify::{simplify_congruences, simplify_generators};
use crate::grid_generator::{GridGenerator, GridGeneratorType};
use crate::grid_generator_system::GridGeneratorSystem;
use crate::linear::LinearExpression;
use crate::normalize::{DimensionKind, LatticeRow};

type Matrix = Vec<Vec<BigRational>>;

fn unit_row(size: usize, j: usize) -> Vec<BigRational> {
    let mut row = vec![BigRational::zero(); size];
    row[j] = BigRational::one();
    row
}

/// Scales a rational vector to integers with the smallest positive factor.
fn to_integers(v: &[BigRational]) -> (Vec<BigInt>, BigInt) {
    let factor = lcm_denominators(v);
    (v.iter().map(|q| scale_rational(q, &factor)).collect(), factor)
}

/// Column `j` of the inverse of the lower-triangular `c`, by forward substitution.
fn lower_inverse_column(c: &Matrix, j: usize) -> Vec<BigRational> {
    let size = c.len();
    let mut b = vec![BigRational::zero(); size];
    b[j] = c[j][j].recip();
    for i in j + 1..size {
        let sum: BigRational = (j..i).map(|k| &c[i][k] * &b[k]).sum();
        b[i] = -sum / &c[i][i];
    }
    b
}

/// Column `i` of the inverse of the upper-triangular `b`, by back substitution.
fn upper_inverse_column(b: &Matrix, i: usize) -> Vec<BigRational> {
    let size = b.len();
    let mut c = vec![BigRational::zero(); size];
    c[i] = b[i][i].recip();
    for j in (0..i).rev() {
        let sum: BigRational = (j + 1..=i).map(|k| &b[j][k] * &c[k]).sum();
        c[j] = -sum / &b[j][j];
    }
    c
}

/// Generators of the grid defined by a minimised, consistent congruence system.
pub(crate) fn congruences_to_generators(cgs: &CongruenceSystem, kinds: &[DimensionKind]) -> GridGeneratorSystem {
    let space_dim = cgs.space_dimension();
    let size = space_dim + 1;
    debug!("congruences_to_generators: {} congruences, dimension {}", cgs.len(), space_dim);

    // Rows are stored from the last pivot column down to column 0.
    let mut c: Matrix = vec![Vec::new(); size];
    let mut rows = cgs.iter();
    for j in (0..size).rev() {
        if kinds[j] == DimensionKind::Virtual {
            c[j] = unit_row(size, j);
            continue;
        }
        let Some(cg) = rows.next() else {
            c[j] = unit_row(size, j);
            continue;
        };
        c[j] = (0..size)
            .map(|k| {
                let value = BigRational::from_integer(cg.column(k).clone());
                if cg.is_proper_congruence() {
                    value / BigRational::from_integer(cg.modulus().clone())
                } else {
                    value
                }
            })
            .collect();
    }

    // Column 0 of C⁻¹ is scaled so that the point has `x0 = 1`.
    let point: Vec<BigRational> = lower_inverse_column(&c, 0).iter().map(|q| q * &c[0][0]).collect();
    let mut parameters = Vec::new();
    let mut lines = Vec::new();
    for j in 1..size {
        match kinds[j] {
            DimensionKind::ParameterOrCongruence => parameters.push(lower_inverse_column(&c, j)),
            DimensionKind::Virtual => lines.push(lower_inverse_column(&c, j)),
            DimensionKind::LineOrEquality => {}
        }
    }

    let divisor = lcm_denominators(point.iter().chain(parameters.iter().flatten()));
    let homogeneous = |v: &[BigRational], factor: &BigInt| -> LinearExpression {
        LinearExpression::from_coefficients(v[1..].iter().map(|q| scale_rational(q, factor)), 0)
    };

    let mut gs = GridGeneratorSystem::with_dimension(space_dim);
    let mut point_expr = homogeneous(&point, &divisor);
    point_expr.set_inhomogeneous_term(divisor.clone());
    gs.insert(GridGenerator::from_parts(point_expr, BigInt::zero(), GridGeneratorType::Point));
    for q in &parameters {
        gs.insert(GridGenerator::from_parts(
            homogeneous(q, &divisor),
            divisor.clone(),
            GridGeneratorType::Parameter,
        ));
    }
    for l in &lines {
        let (ints, _) = to_integers(l);
        let expr = LinearExpression::from_coefficients(ints.into_iter().skip(1), 0);
        let mut line = GridGenerator::from_parts(expr, BigInt::zero(), GridGeneratorType::Line);
        line.strong_normalize();
        gs.insert(line);
    }

    simplify_generators(&mut gs);
    gs
}

/// Congruences of the grid generated by a minimised generator system.
pub(crate) fn generators_to_congruences(gs: &GridGeneratorSystem, kinds: &[DimensionKind]) -> CongruenceSystem {
    let space_dim = gs.space_dimension();
    let size = space_dim + 1;
    debug!("generators_to_congruences: {} generators, dimension {}", gs.len(), space_dim);

    // Rows are stored from column 0 up to the last pivot column.
    let mut b: Matrix = vec![Vec::new(); size];
    let mut rows = gs.iter();
    for j in 0..size {
        if kinds[j] == DimensionKind::Virtual {
            b[j] = unit_row(size, j);
            continue;
        }
        let Some(g) = rows.next() else {
            b[j] = unit_row(size, j);
            continue;
        };
        let divisor = match g.type_() {
            GridGeneratorType::Point => g.column(0).clone(),
            GridGeneratorType::Parameter => g.parameter_divisor().clone(),
            GridGeneratorType::Line => BigInt::one(),
        };
        b[j] = (0..size)
            .map(|k| BigRational::new(g.column(k).clone(), divisor.clone()))
            .collect();
    }

    let mut cgs = CongruenceSystem::with_dimension(space_dim);
    for i in 1..size {
        let modular = match kinds[i] {
            DimensionKind::ParameterOrCongruence => true,
            DimensionKind::Virtual => false,
            DimensionKind::LineOrEquality => continue,
        };
        let c = upper_inverse_column(&b, i);
        let (ints, factor) = to_integers(&c);
        let mut ints = ints.into_iter();
        let inhomogeneous = ints.next().unwrap_or_default();
        let expr = LinearExpression::from_coefficients(ints, inhomogeneous);
        let modulus = if modular { factor } else { BigInt::zero() };
        cgs.insert(Congruence::new(expr, modulus));
    }

    if simplify_congruences(&mut cgs).is_none() {
        // The generators always describe a non-empty grid.
        debug!("generators_to_congruences: unexpected empty result");
    }
    cgs
}
