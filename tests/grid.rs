use num_bigint::BigInt;
use num_rational::BigRational;
use test_log::test;

use exact_domains::congruence::{Congruence, CongruenceSystem};
use exact_domains::constraint::Constraint;
use exact_domains::domain::NumericDomain;
use exact_domains::grid::Grid;
use exact_domains::grid_generator::GridGenerator;
use exact_domains::grid_generator_system::GridGeneratorSystem;
use exact_domains::linear::LinearExpression;
use exact_domains::relation::Relation;
use exact_domains::variable::Variable;

fn expr(coefficients: &[i64]) -> LinearExpression {
    LinearExpression::from_coefficients(coefficients.iter().copied(), 0)
}

fn q(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

#[test]
fn test_line_without_direction_is_rejected() {
    let x = Variable::new(0);
    let err = GridGenerator::grid_line(0 * x).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_three_points_minimize_to_point_and_two_parameters() {
    let gs: GridGeneratorSystem = [
        GridGenerator::grid_point_unit(expr(&[0, 0])),
        GridGenerator::grid_point_unit(expr(&[3, 0])),
        GridGenerator::grid_point_unit(expr(&[0, 3])),
    ]
    .into_iter()
    .collect();
    let grid = Grid::from_generators(gs).unwrap();
    let minimal = grid.generators();

    assert_eq!(minimal.len(), 3);
    assert_eq!(minimal.iter().filter(|g| g.is_point()).count(), 1);
    assert_eq!(minimal.num_parameters(), 2);
    assert_eq!(minimal.num_lines(), 0);

    let expected = [
        GridGenerator::parameter_unit(expr(&[3, 0])),
        GridGenerator::parameter_unit(expr(&[0, 3])),
    ];
    for p in minimal.iter().filter(|g| g.is_parameter()) {
        assert!(expected.iter().any(|e| p.is_equivalent_to(e)), "unexpected parameter {}", p);
    }

    let x = Variable::new(0);
    let y = Variable::new(1);
    let cgs: CongruenceSystem = [Congruence::modular(x, 0, 3), Congruence::modular(y, 0, 3)]
        .into_iter()
        .collect();
    assert_eq!(grid, Grid::from_congruences(&cgs));
}

#[test]
fn test_both_views_agree() {
    let x = Variable::new(0);
    let y = Variable::new(1);
    // x ≡ 1 (mod 4), x + y ≡ 0 (mod 6), z unconstrained.
    let mut cgs = CongruenceSystem::with_dimension(3);
    cgs.insert(Congruence::modular(x, 1, 4));
    cgs.insert(Congruence::modular(x + y, 0, 6));
    let grid = Grid::from_congruences(&cgs);
    assert_eq!(grid.space_dimension(), 3);
    assert_eq!(grid.generators().num_lines(), 1);

    for g in grid.generators() {
        assert!(cgs.is_satisfied_by(g), "{} violates {}", g, cgs);
    }
    let rebuilt = Grid::from_generators(grid.generators().clone()).unwrap();
    assert_eq!(rebuilt, grid);
}

#[test]
fn test_generators_without_point_are_rejected() {
    let gs: GridGeneratorSystem = [GridGenerator::parameter_unit(expr(&[1]))].into_iter().collect();
    assert!(Grid::from_generators(gs).unwrap_err().is_invalid_argument());

    let empty = Grid::from_generators(GridGeneratorSystem::with_dimension(2)).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.space_dimension(), 2);
}

#[test]
fn test_inconsistent_congruences() {
    let x = Variable::new(0);
    let cgs: CongruenceSystem = [Congruence::modular(x, 0, 2), Congruence::modular(x, 1, 4)]
        .into_iter()
        .collect();
    let grid = Grid::from_congruences(&cgs);
    assert!(grid.is_empty());
    assert!(grid.generators().is_empty());
    assert_eq!(grid.to_string(), "false");
}

#[test]
fn test_constraints_on_grids() {
    let x = Variable::new(0);
    let y = Variable::new(1);
    let mut grid = Grid::from_constraints(&[Constraint::eq(y, x * 2)].into_iter().collect()).unwrap();
    grid.add_congruence(&Congruence::modular(x, 0, 5)).unwrap();

    assert_eq!(grid.relation_with_congruence(&Congruence::modular(y, 0, 10)).unwrap(), Relation::IS_INCLUDED);
    assert!(grid.relation_with_constraint(&Constraint::eq(y, 3)).unwrap().implies(Relation::IS_DISJOINT));
    assert!(grid.add_constraint(&Constraint::ge(x, 0)).unwrap_err().is_invalid_argument());

    let f = grid.frequency(&(x + y)).unwrap().unwrap();
    assert_eq!(f.period, q(15));
    assert_eq!(f.residue, q(0));

    // Fixing x pins y.
    grid.refine_with_constraint(&Constraint::eq(x, 5)).unwrap();
    let max = grid.maximize(&LinearExpression::from(y)).unwrap().unwrap();
    assert_eq!(max.value, q(10));
    assert!(max.included);
}

#[test]
fn test_ascii_round_trip() {
    let x = Variable::new(0);
    let y = Variable::new(1);
    let cgs: CongruenceSystem = [Congruence::modular(x * 2 + y, 1, 3), Congruence::equality(y, 7)]
        .into_iter()
        .collect();
    let grid = Grid::from_congruences(&cgs);
    let dump = grid.ascii_dump();
    assert!(dump.starts_with("grid dim 2 empty 0\n"));
    assert_eq!(Grid::ascii_load(&dump).unwrap(), grid);

    let gs_dump = grid.generators().ascii_dump();
    let gs = GridGeneratorSystem::ascii_load(&gs_dump).unwrap();
    assert_eq!(gs.len(), grid.generators().len());
    for (a, b) in gs.iter().zip(grid.generators()) {
        assert!(a.is_equivalent_to(b));
    }

    let truncated = &dump[..dump.len() - 4];
    assert!(Grid::ascii_load(truncated).is_err());
}
