//! # exact-domains: Exact Grids and Reduced Products
//!
//! **`exact-domains`** implements numeric abstract domains over exact integer
//! and rational arithmetic, for static analysis and linear optimisation.
//!
//! ## What is a grid?
//!
//! A grid is a set of points closed under integer combinations of its
//! *parameters* and real combinations of its *lines*, anchored at a *point*.
//! It has two descriptions:
//!
//! - **congruences**, like `x ≡ 1 (mod 3)` or `y = 2x`;
//! - **generators**, like "the point `(1, 2)` plus integer multiples of `(3, 6)`".
//!
//! Both are kept in a canonical minimal form, so either can be read at any time.
//!
//! ## Key Features
//!
//! - **Exact**: coefficients are [`BigInt`](num_bigint::BigInt), bounds are
//!   [`BigRational`](num_rational::BigRational). Nothing overflows or rounds.
//! - **Canonical lattices**: [`normalize`] brings generator rows to a unique
//!   reduced form; [`grid`] keeps the congruence and generator views consistent.
//! - **Composable**: every domain implements [`NumericDomain`](domain::NumericDomain),
//!   and [`ReducedProduct`](product::ReducedProduct) combines any two of them
//!   under a compile-time [`ReductionPolicy`](product::ReductionPolicy).
//!
//! ## Basic Usage
//!
//! ```rust
//! use exact_domains::congruence::{Congruence, CongruenceSystem};
//! use exact_domains::constraint::Constraint;
//! use exact_domains::domain::NumericDomain;
//! use exact_domains::grid::Grid;
//! use exact_domains::linear::LinearExpression;
//! use exact_domains::product::GridBox;
//! use exact_domains::rational_box::RationalBox;
//! use exact_domains::variable::Variable;
//!
//! # fn main() -> exact_domains::error::Result<()> {
//! let x = Variable::new(0);
//!
//! // x is even...
//! let grid = Grid::from_congruences(&CongruenceSystem::from(Congruence::modular(x, 0, 2)));
//! let mut p = GridBox::new(grid, RationalBox::universe(1))?;
//!
//! // ...and 1 < x < 7...
//! p.refine_with_constraint(&Constraint::gt(x, 1))?;
//! p.refine_with_constraint(&Constraint::lt(x, 7))?;
//!
//! // ...so the product knows 2 <= x <= 6.
//! let max = p.maximize(&LinearExpression::from(x))?.unwrap();
//! assert_eq!(max.value.to_string(), "6");
//! assert!(max.included);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Components
//!
//! - **[`grid_generator`]**, **[`grid_generator_system`]**: the generator view of a grid.
//! - **[`normalize`]**: unimodular row reduction of lattice bases.
//! - **[`grid`]**: the [`Grid`](grid::Grid) domain.
//! - **[`rational_box`]**: boxes of rational [`interval`]s.
//! - **[`product`]**: reduced products and their reduction policies.
//!
//! Values can be dumped to a plain-text format and loaded back with
//! [`ascii_dump`](domain::NumericDomain::ascii_dump) and
//! [`ascii_load`](domain::NumericDomain::ascii_load).

pub mod ascii;
pub mod coefficient;
pub mod congruence;
pub mod constraint;
pub mod domain;
pub mod error;
pub mod generator;
pub mod grid;
pub mod grid_generator;
pub mod grid_generator_system;
pub mod interval;
pub mod linear;
pub mod normalize;
pub mod product;
pub mod rational_box;
pub mod relation;
pub mod variable;
