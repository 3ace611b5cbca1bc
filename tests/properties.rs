//! Property-based tests for grids, boxes and their reduced products.

use num_bigint::BigInt;
use num_rational::BigRational;
use proptest::prelude::*;

use exact_domains::congruence::{Congruence, CongruenceSystem};
use exact_domains::domain::NumericDomain;
use exact_domains::generator::Generator;
use exact_domains::grid::Grid;
use exact_domains::grid_generator::GridGenerator;
use exact_domains::grid_generator_system::GridGeneratorSystem;
use exact_domains::interval::{Boundary, Interval};
use exact_domains::linear::LinearExpression;
use exact_domains::product::{CongruencesReduction, ConstraintsReduction, ReductionPolicy, ShapePreserving};
use exact_domains::rational_box::RationalBox;
use exact_domains::relation::GeneratorRelation;
use exact_domains::variable::Variable;

fn q(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn small_expr(dim: usize) -> impl Strategy<Value = LinearExpression> {
    prop::collection::vec(-6i64..=6, dim).prop_map(|c| LinearExpression::from_coefficients(c, 0))
}

/// `x ≡ residue (mod modulus)` in one dimension.
fn grid_1d() -> impl Strategy<Value = Grid> {
    (-6i64..=6, 1i64..=6).prop_map(|(residue, modulus)| {
        Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(Variable::new(0), residue, modulus)))
    })
}

/// A box in one dimension with integer bounds, possibly open or missing.
fn box_1d() -> impl Strategy<Value = RationalBox> {
    let bound = prop::option::weighted(0.8, (-15i64..=15, any::<bool>()));
    (bound.clone(), bound).prop_map(|(lo, hi)| {
        let boundary = |(v, open): (i64, bool)| if open { Boundary::open(q(v)) } else { Boundary::closed(q(v)) };
        RationalBox::from_intervals(vec![Interval::new(lo.map(boundary), hi.map(boundary))])
    })
}

/// A grid in two dimensions given by up to three congruences.
fn grid_2d() -> impl Strategy<Value = Grid> {
    prop::collection::vec((small_expr(2), -4i64..=4, 0i64..=5), 0..=3).prop_map(|rows| {
        let mut cgs = CongruenceSystem::with_dimension(2);
        for (expr, rhs, modulus) in rows {
            cgs.insert(Congruence::modular(expr, rhs, modulus));
        }
        Grid::from_congruences(&cgs)
    })
}

/// A box in two dimensions with integer bounds, possibly open or missing.
fn box_2d() -> impl Strategy<Value = RationalBox> {
    (box_1d(), box_1d()).prop_map(|(bx, by)| {
        let interval = |b: &RationalBox| b.interval(Variable::new(0)).unwrap().clone();
        if bx.is_empty() || by.is_empty() {
            return RationalBox::empty(2);
        }
        RationalBox::from_intervals(vec![interval(&bx), interval(&by)])
    })
}

fn contains_point<D: NumericDomain>(d: &D, value: i64) -> bool {
    contains_coordinates(d, &[q(value)])
}

fn contains_coordinates<D: NumericDomain>(d: &D, coords: &[BigRational]) -> bool {
    let point = Generator::point_from_coordinates(coords, false);
    matches!(d.relation_with_generator(&point), Ok(GeneratorRelation::Subsumes))
}

/// Points with half-integer coordinates in `[-3, 3]²`.
fn half_points() -> impl Iterator<Item = [BigRational; 2]> {
    let half = |v: i64| BigRational::new(BigInt::from(v), BigInt::from(2));
    (-6i64..=6).flat_map(move |vx| (-6i64..=6).map(move |vy| [half(vx), half(vy)]))
}

fn reduced<R: ReductionPolicy>(g: &Grid, b: &RationalBox) -> (Grid, RationalBox) {
    let (mut g, mut b) = (g.clone(), b.clone());
    R::product_reduce(&mut g, &mut b).unwrap();
    (g, b)
}

fn all_reductions(g: &Grid, b: &RationalBox) -> [(Grid, RationalBox); 3] {
    [
        reduced::<ConstraintsReduction>(g, b),
        reduced::<CongruencesReduction>(g, b),
        reduced::<ShapePreserving>(g, b),
    ]
}

fn assert_idempotent<R: ReductionPolicy>(g: &Grid, b: &RationalBox) -> Result<(), TestCaseError> {
    let once = reduced::<R>(g, b);
    let twice = reduced::<R>(&once.0, &once.1);
    prop_assert_eq!(&twice, &once, "{} and {}", g, b);
    Ok(())
}

proptest! {
    #[test]
    fn strong_normalize_is_idempotent(expr in small_expr(3), divisor in 1i64..=5) {
        let mut g = GridGenerator::parameter(expr, divisor).unwrap();
        g.strong_normalize();
        let once = g.clone();
        g.strong_normalize();
        prop_assert_eq!(g, once);
    }

    #[test]
    fn grid_dump_load_round_trip(grid in grid_2d()) {
        let back = Grid::ascii_load(&grid.ascii_dump()).unwrap();
        prop_assert_eq!(&back, &grid);

        let gs = GridGeneratorSystem::ascii_load(&grid.generators().ascii_dump()).unwrap();
        prop_assert_eq!(gs.len(), grid.generators().len());
        for (a, b) in gs.iter().zip(grid.generators()) {
            prop_assert!(a.is_equivalent_to(b));
        }
    }

    #[test]
    fn grid_views_agree(grid in grid_2d()) {
        for g in grid.generators() {
            prop_assert!(grid.congruences().is_satisfied_by(g));
        }
        let rebuilt = Grid::from_generators(grid.generators().clone()).unwrap();
        prop_assert_eq!(rebuilt, grid);
    }

    #[test]
    fn box_dump_load_round_trip(b in box_1d()) {
        let back = RationalBox::ascii_load(&b.ascii_dump()).unwrap();
        prop_assert_eq!(back, b);
    }

    #[test]
    fn reduction_is_idempotent(g in grid_1d(), b in box_1d()) {
        assert_idempotent::<ConstraintsReduction>(&g, &b)?;
        assert_idempotent::<CongruencesReduction>(&g, &b)?;
        assert_idempotent::<ShapePreserving>(&g, &b)?;
    }

    #[test]
    fn reduction_is_idempotent_2d(g in grid_2d(), b in box_2d()) {
        assert_idempotent::<ConstraintsReduction>(&g, &b)?;
        assert_idempotent::<CongruencesReduction>(&g, &b)?;
        assert_idempotent::<ShapePreserving>(&g, &b)?;
    }

    #[test]
    fn reduction_is_sound(g in grid_1d(), b in box_1d()) {
        for (rg, rb) in all_reductions(&g, &b) {
            for value in -20i64..=20 {
                let before = contains_point(&g, value) && contains_point(&b, value);
                let after = contains_point(&rg, value) && contains_point(&rb, value);
                prop_assert_eq!(before, after, "point {} in {} and {}", value, g, b);
            }
        }
    }

    #[test]
    fn reduction_is_sound_2d(g in grid_2d(), b in box_2d()) {
        for (rg, rb) in all_reductions(&g, &b) {
            for point in half_points() {
                let before = contains_coordinates(&g, &point) && contains_coordinates(&b, &point);
                let after = contains_coordinates(&rg, &point) && contains_coordinates(&rb, &point);
                prop_assert_eq!(before, after, "({}, {}) in {} and {}", &point[0], &point[1], g, b);
            }
        }
    }

    #[test]
    fn reduction_only_shrinks(g in grid_1d(), b in box_1d()) {
        for (rg, rb) in all_reductions(&g, &b) {
            prop_assert!(g.contains(&rg).unwrap());
            prop_assert!(b.contains(&rb).unwrap());
            prop_assert_eq!(rg.space_dimension(), 1);
            prop_assert_eq!(rb.space_dimension(), 1);
        }
    }

    #[test]
    fn reduction_only_shrinks_2d(g in grid_2d(), b in box_2d()) {
        for (rg, rb) in all_reductions(&g, &b) {
            prop_assert!(g.contains(&rg).unwrap());
            prop_assert!(b.contains(&rb).unwrap());
            prop_assert_eq!(rg.space_dimension(), 2);
            prop_assert_eq!(rb.space_dimension(), 2);
        }
    }
}
