//! Unimodular row reduction shared by the congruence and generator views of a grid.
//!
//! Both views are integer matrices whose rows are either "exact" (lines,
//! equalities) or "modular" (parameters and points, proper congruences).
//! Exact rows may be scaled freely; a modular row may only be replaced by
//! an integer unimodular combination of modular rows, or have a rational
//! multiple of an exact row added to it. Every primitive below respects
//! those rules, so the denoted grid never changes.
//!
//! Column 0 is always the inhomogeneous term (the point divisor for
//! generators). Generator systems are triangularised left to right, so row
//! `k` has its pivot at the `k`-th non-virtual column and zeros before it;
//! congruence systems are triangularised right to left.

use log::trace;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::coefficient::{exact_div, gcd, gcdext};

/// What the pivot row of one column is, once a system is in triangular form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DimensionKind {
    /// Pivot is a line (generators) or an equality (congruences).
    LineOrEquality,
    /// Pivot is a parameter or point (generators) or a proper congruence.
    ParameterOrCongruence,
    /// No row has its pivot in this column.
    Virtual,
}

/// A row that the normaliser can operate on.
pub trait LatticeRow {
    /// Number of columns taking part in the reduction (column 0 included).
    fn num_columns(&self) -> usize;

    fn column(&self, col: usize) -> &BigInt;

    fn column_mut(&mut self, col: usize) -> &mut BigInt;

    /// Whether the row is a line or an equality.
    fn is_line_or_equality(&self) -> bool;

    /// Multiplies every entry of the row (modulus and divisor included) by `factor > 0`.
    fn scale(&mut self, factor: &BigInt);
}

/// Mutable references to two distinct rows.
pub(crate) fn pair_mut<R>(rows: &mut [R], i: usize, j: usize) -> (&mut R, &mut R) {
    assert_ne!(i, j);
    if i < j {
        let (head, tail) = rows.split_at_mut(j);
        (&mut head[i], &mut tail[0])
    } else {
        let (head, tail) = rows.split_at_mut(i);
        (&mut tail[0], &mut head[j])
    }
}

/// `row[c] += k * pivot[c]` for `c` in `start..end`.
fn add_multiple<R: LatticeRow>(row: &mut R, pivot: &R, k: &BigInt, start: usize, end: usize) {
    for col in start..end {
        let delta = k * pivot.column(col);
        if !delta.is_zero() {
            *row.column_mut(col) += delta;
        }
    }
}

/// Negates columns `start..end` of `row`.
pub(crate) fn negate_columns<R: LatticeRow>(row: &mut R, start: usize, end: usize) {
    for col in start..end {
        let c = row.column_mut(col);
        *c = -std::mem::take(c);
    }
}

/// Replaces the modular rows `row` and `pivot` by a unimodular combination such
/// that `pivot[col]` becomes `gcd(pivot[col], row[col])` and `row[col]` becomes zero.
///
/// Only columns `start..end` are combined.
pub fn reduce_pc_with_pc<R: LatticeRow>(row: &mut R, pivot: &mut R, col: usize, start: usize, end: usize) {
    let p = pivot.column(col).clone();
    let r = row.column(col).clone();
    let (g, s, t) = gcdext(&p, &r);
    // `g == s*p + t*r`; the matrix [[s, t], [-r/g, p/g]] has determinant one.
    let reduced_p = exact_div(&p, &g);
    let reduced_r = exact_div(&r, &g);
    for j in start..end {
        let old_pivot = pivot.column(j).clone();
        let old_row = row.column(j).clone();
        *pivot.column_mut(j) = &s * &old_pivot + &t * &old_row;
        *row.column_mut(j) = &reduced_p * &old_row - &reduced_r * &old_pivot;
    }
    trace!("reduce_pc_with_pc: col {} gcd {}", col, g);
}

/// Eliminates column `col` of the exact row `row` using the exact row `pivot`.
///
/// Only columns `start..end` are combined.
pub fn reduce_line_with_line<R: LatticeRow>(row: &mut R, pivot: &R, col: usize, start: usize, end: usize) {
    let p = pivot.column(col);
    let r = row.column(col);
    let g = gcd(p, r);
    let reduced_p = exact_div(p, &g);
    let reduced_r = exact_div(r, &g);
    for j in start..end {
        let value = &reduced_p * row.column(j) - &reduced_r * pivot.column(j);
        *row.column_mut(j) = value;
    }
    trace!("reduce_line_with_line: col {}", col);
}

/// Eliminates column `col` of the modular row `rows[row_index]` using the exact
/// row `rows[pivot_index]`.
///
/// Every modular row of `rows` is scaled by the same positive factor first,
/// so that the common divisor (or common modulus) of the system is kept.
pub fn reduce_with_line_or_equality<R: LatticeRow>(
    rows: &mut [R],
    row_index: usize,
    pivot_index: usize,
    col: usize,
    start: usize,
    end: usize,
) {
    let p = rows[pivot_index].column(col).clone();
    let r = rows[row_index].column(col).clone();
    let g = gcd(&p, &r);
    let mut reduced_p = exact_div(&p, &g);
    let mut reduced_r = exact_div(&r, &g);
    if reduced_p.is_negative() {
        reduced_p = -reduced_p;
        reduced_r = -reduced_r;
    }
    if !reduced_p.is_one() {
        for other in rows.iter_mut().filter(|other| !other.is_line_or_equality()) {
            other.scale(&reduced_p);
        }
    }
    let (row, pivot) = pair_mut(rows, row_index, pivot_index);
    add_multiple(row, pivot, &-reduced_r, start, end);
    trace!("reduce_with_line_or_equality: col {} factor {}", col, reduced_p);
}

/// Reduces the rows preceding `rows[pivot_index]` modulo the pivot.
///
/// With `p = pivot[dim]`, every preceding row `r` that the pivot may act on
/// gets `q` copies of the pivot subtracted, `q` chosen so that the new
/// `r[dim]` lies in `(-⌈|p|/2⌉, ⌈|p|/2⌉]`. Only columns `start..end` change.
///
/// A line or equality pivot acts on every preceding row; a modular pivot acts
/// only on modular rows. The kind of each preceding row is read from `kinds`
/// by walking away from `dim` over virtual columns: towards column 0 for
/// generator systems, towards the last column for congruence systems.
pub fn reduce_reduced<R: LatticeRow>(
    rows: &mut [R],
    dim: usize,
    pivot_index: usize,
    start: usize,
    end: usize,
    kinds: &[DimensionKind],
    generators: bool,
) {
    let (head, tail) = rows.split_at_mut(pivot_index);
    let pivot = &tail[0];
    let p = pivot.column(dim);
    if p.is_zero() {
        return;
    }
    let p_abs = p.abs();
    let half = (&p_abs + 1u32) / 2u32;
    let pivot_is_exact = kinds[dim] == DimensionKind::LineOrEquality;

    let mut kinds_index = dim;
    for row_index in (0..pivot_index).rev() {
        if generators {
            kinds_index -= 1;
            while kinds[kinds_index] == DimensionKind::Virtual {
                kinds_index -= 1;
            }
        } else {
            kinds_index += 1;
            while kinds[kinds_index] == DimensionKind::Virtual {
                kinds_index += 1;
            }
        }
        if !pivot_is_exact && kinds[kinds_index] != DimensionKind::ParameterOrCongruence {
            continue;
        }
        let row = &mut head[row_index];
        let value = row.column(dim);
        if value.is_zero() {
            continue;
        }
        let mut remainder = value.mod_floor(&p_abs);
        if remainder > half {
            remainder -= &p_abs;
        }
        let q = exact_div(&(value - &remainder), p);
        if !q.is_zero() {
            add_multiple(row, pivot, &-q, start, end);
        }
    }
}
