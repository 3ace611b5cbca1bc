//! Canonicalisation of the congruence and generator views of a grid.
//!
//! Both routines put a system in triangular form with the primitives of
//! [`normalize`](crate::normalize) and report, per column, what kind of row
//! pivots on it. The conversion routines rely on that layout.

use log::{debug, trace};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::congruence::{Congruence, CongruenceSystem};
use crate::grid_generator::GridGeneratorType;
use crate::grid_generator_system::GridGeneratorSystem;
use crate::linear::LinearExpression;
use crate::normalize::{
    negate_columns, pair_mut, reduce_line_with_line, reduce_pc_with_pc, reduce_reduced, reduce_with_line_or_equality,
    DimensionKind, LatticeRow,
};

/// Minimises a generator system that contains at least one point.
///
/// Afterwards row 0 is the single point; every other row is a line or a
/// parameter sharing the divisor of the point. Row `k` pivots on the `k`-th
/// non-virtual column (column 0 being the divisor).
pub(crate) fn simplify_generators(gs: &mut GridGeneratorSystem) -> Vec<DimensionKind> {
    debug_assert!(gs.has_points());
    let num_columns = gs.space_dimension() + 1;
    gs.normalize_divisors();
    debug!("simplify_generators: {} rows, {} columns", gs.len(), num_columns);

    let rows = gs.rows_mut();
    let num_rows = rows.len();
    let mut kinds = vec![DimensionKind::Virtual; num_columns];
    let mut pivot_index = 0;

    for dim in 0..num_columns {
        let Some(found) = (pivot_index..num_rows).find(|&i| !rows[i].column(dim).is_zero()) else {
            continue;
        };
        rows.swap(found, pivot_index);
        let mut pivot_is_line = rows[pivot_index].is_line();

        for row_index in found + 1..num_rows {
            if rows[row_index].column(dim).is_zero() {
                continue;
            }
            if rows[row_index].is_line() {
                if pivot_is_line {
                    let (row, pivot) = pair_mut(rows, row_index, pivot_index);
                    reduce_line_with_line(row, pivot, dim, dim, num_columns);
                } else {
                    rows.swap(row_index, pivot_index);
                    pivot_is_line = true;
                    reduce_with_line_or_equality(rows, row_index, pivot_index, dim, dim, num_columns);
                }
            } else if pivot_is_line {
                reduce_with_line_or_equality(rows, row_index, pivot_index, dim, dim, num_columns);
            } else {
                let (row, pivot) = pair_mut(rows, row_index, pivot_index);
                reduce_pc_with_pc(row, pivot, dim, dim, num_columns);
            }
        }

        kinds[dim] = if pivot_is_line {
            DimensionKind::LineOrEquality
        } else {
            DimensionKind::ParameterOrCongruence
        };
        if rows[pivot_index].column(dim).is_negative() {
            negate_columns(&mut rows[pivot_index], dim, num_columns);
        }
        reduce_reduced(rows, dim, pivot_index, dim, num_columns, &kinds, true);
        trace!("simplify_generators: column {} pivots on row {} ({:?})", dim, pivot_index, kinds[dim]);
        pivot_index += 1;
    }

    rows.truncate(pivot_index);

    let system_divisor: BigInt = rows.first().map(|p| p.column(0).clone()).unwrap_or_default();
    for (i, g) in rows.iter_mut().enumerate() {
        if i == 0 {
            g.set_type(GridGeneratorType::Point, &system_divisor);
        } else if !g.is_line() {
            g.set_type(GridGeneratorType::Parameter, &system_divisor);
        }
    }
    kinds
}

/// Minimises a congruence system.
///
/// The integrality congruence is added, so that column 0 always has a pivot.
/// Returns `None` (leaving the system as `1 = 0`) when the system has no
/// solution. Otherwise row `k` pivots on the `k`-th non-virtual column counted
/// from the last one, and the final row is the integrality congruence.
pub(crate) fn simplify_congruences(cgs: &mut CongruenceSystem) -> Option<Vec<DimensionKind>> {
    let space_dim = cgs.space_dimension();
    let num_columns = space_dim + 1;
    let modulus = cgs.normalize_moduli();
    let mut integrality = LinearExpression::with_dimension(space_dim);
    integrality.set_inhomogeneous_term(modulus.clone());
    cgs.insert(Congruence::from_parts(integrality, modulus));
    debug!("simplify_congruences: {} rows, {} columns", cgs.len(), num_columns);

    let rows = cgs.rows_mut();
    let num_rows = rows.len();
    let mut kinds = vec![DimensionKind::Virtual; num_columns];
    let mut pivot_index = 0;

    for dim in (0..num_columns).rev() {
        let Some(found) = (pivot_index..num_rows).find(|&i| !rows[i].column(dim).is_zero()) else {
            continue;
        };
        rows.swap(found, pivot_index);
        let mut pivot_is_equality = rows[pivot_index].is_equality();

        for row_index in found + 1..num_rows {
            if rows[row_index].column(dim).is_zero() {
                continue;
            }
            if rows[row_index].is_equality() {
                if pivot_is_equality {
                    let (row, pivot) = pair_mut(rows, row_index, pivot_index);
                    reduce_line_with_line(row, pivot, dim, 0, dim + 1);
                } else {
                    rows.swap(row_index, pivot_index);
                    pivot_is_equality = true;
                    reduce_with_line_or_equality(rows, row_index, pivot_index, dim, 0, dim + 1);
                }
            } else if pivot_is_equality {
                reduce_with_line_or_equality(rows, row_index, pivot_index, dim, 0, dim + 1);
            } else {
                let (row, pivot) = pair_mut(rows, row_index, pivot_index);
                reduce_pc_with_pc(row, pivot, dim, 0, dim + 1);
            }
        }

        kinds[dim] = if pivot_is_equality {
            DimensionKind::LineOrEquality
        } else {
            DimensionKind::ParameterOrCongruence
        };
        if rows[pivot_index].column(dim).is_negative() {
            negate_columns(&mut rows[pivot_index], 0, dim + 1);
        }
        reduce_reduced(rows, dim, pivot_index, 0, dim + 1, &kinds, false);
        trace!("simplify_congruences: column {} pivots on row {} ({:?})", dim, pivot_index, kinds[dim]);
        pivot_index += 1;
    }

    rows.truncate(pivot_index);

    let consistent = match rows.last() {
        Some(last) => {
            kinds[0] != DimensionKind::Virtual
                && last.is_proper_congruence()
                && last.column(0).is_multiple_of(last.modulus())
        }
        None => false,
    };
    if !consistent {
        debug!("simplify_congruences: no solution");
        *cgs = CongruenceSystem::inconsistent(space_dim);
        return None;
    }
    Some(kinds)
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::grid_generator::GridGenerator;
    use crate::variable::Variable;

    fn int(v: i64) -> BigInt {
        BigInt::from(v)
    }

    #[test]
    fn test_three_points() {
        let e = |c: [i64; 2]| LinearExpression::from_coefficients(c, 0);
        let mut gs: GridGeneratorSystem = [
            GridGenerator::grid_point_unit(e([0, 0])),
            GridGenerator::grid_point_unit(e([3, 0])),
            GridGenerator::grid_point_unit(e([0, 3])),
        ]
        .into_iter()
        .collect();
        let kinds = simplify_generators(&mut gs);
        assert_eq!(kinds, vec![DimensionKind::ParameterOrCongruence; 3]);
        assert_eq!(gs.len(), 3);
        let rows: Vec<_> = gs.iter().cloned().collect();
        assert!(rows[0].is_equivalent_to(&GridGenerator::grid_point_unit(e([0, 0]))));
        assert!(rows[1].is_equivalent_to(&GridGenerator::parameter_unit(e([3, 0]))));
        assert!(rows[2].is_equivalent_to(&GridGenerator::parameter_unit(e([0, 3]))));
    }

    #[test]
    fn test_points_and_line() {
        let e = |c: [i64; 2]| LinearExpression::from_coefficients(c, 0);
        let mut gs: GridGeneratorSystem = [
            GridGenerator::grid_point(e([1, 1]), 2).unwrap(),
            GridGenerator::parameter(e([1, 0]), 1).unwrap(),
            GridGenerator::grid_line(e([1, 1])).unwrap(),
        ]
        .into_iter()
        .collect();
        let kinds = simplify_generators(&mut gs);
        assert_eq!(
            kinds,
            vec![
                DimensionKind::ParameterOrCongruence,
                DimensionKind::LineOrEquality,
                DimensionKind::ParameterOrCongruence
            ]
        );
        assert_eq!(gs.num_lines(), 1);
        assert_eq!(gs.num_parameters(), 1);
        let point = gs.iter().next().unwrap();
        assert!(point.is_point());
        for g in gs.iter().skip(1).filter(|g| g.is_parameter()) {
            assert_eq!(g.divisor().unwrap(), point.divisor().unwrap());
        }
    }

    #[test]
    fn test_congruences_integrality() {
        let x = Variable::new(0);
        let mut cgs = CongruenceSystem::from(Congruence::modular(x, 1, 4));
        let kinds = simplify_congruences(&mut cgs).unwrap();
        assert_eq!(kinds, vec![DimensionKind::ParameterOrCongruence; 2]);
        assert_eq!(cgs.len(), 2);
        let last = cgs.iter().last().unwrap();
        assert_eq!(last.modulus(), &int(4));
        assert_eq!(last.inhomogeneous_term(), &int(4));
    }

    #[test]
    fn test_congruences_empty() {
        let x = Variable::new(0);
        // x ≡ 0 (mod 2) and x ≡ 1 (mod 4)
        let mut cgs: CongruenceSystem = [Congruence::modular(x, 0, 2), Congruence::modular(x, 1, 4)]
            .into_iter()
            .collect();
        assert!(simplify_congruences(&mut cgs).is_none());
        assert_eq!(cgs.len(), 1);
        assert!(cgs.iter().next().unwrap().is_inconsistent());

        // 0 = 1
        let mut cgs = CongruenceSystem::from(Congruence::equality(x * 0, 1));
        assert!(simplify_congruences(&mut cgs).is_none());

        // 2x = 1 is the single rational point 1/2.
        let mut cgs = CongruenceSystem::from(Congruence::equality(x * 2, 1));
        assert!(simplify_congruences(&mut cgs).is_some());
    }

    #[test]
    fn test_congruences_equalities() {
        let x = Variable::new(0);
        let y = Variable::new(1);
        let mut cgs: CongruenceSystem = [
            Congruence::equality(x, y),
            Congruence::equality(x * 2, y * 2),
            Congruence::modular(x + y, 0, 2),
        ]
        .into_iter()
        .collect();
        let kinds = simplify_congruences(&mut cgs).unwrap();
        assert_eq!(kinds[2], DimensionKind::LineOrEquality);
        assert_eq!(cgs.num_equalities(), 1);
        assert_eq!(cgs.len(), 3);
    }
}
