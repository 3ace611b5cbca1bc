//! Relations between a domain value and a constraint, congruence or generator.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign};

/// Conjunction of assertions about a domain value `D` and a constraint or congruence `c`.
///
/// - `IS_DISJOINT`: no point of `D` satisfies `c`.
/// - `STRICTLY_INTERSECTS`: `D` has points on both sides of `c`.
/// - `IS_INCLUDED`: every point of `D` satisfies `c`.
/// - `SATURATES`: every point of `D` lies on the hyperplane of `c`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Relation(u8);

impl Relation {
    pub const NOTHING: Relation = Relation(0);
    pub const IS_DISJOINT: Relation = Relation(1);
    pub const STRICTLY_INTERSECTS: Relation = Relation(2);
    pub const IS_INCLUDED: Relation = Relation(4);
    pub const SATURATES: Relation = Relation(8);

    pub fn nothing() -> Self {
        Self::NOTHING
    }

    /// Whether every assertion of `other` is also asserted by `self`.
    pub fn implies(self, other: Relation) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_nothing(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u8 {
        self.0
    }
}

/// Conjunction of assertions.
impl BitAnd for Relation {
    type Output = Relation;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn bitand(self, rhs: Relation) -> Relation {
        Relation(self.0 | rhs.0)
    }
}

impl BitAndAssign for Relation {
    #[allow(clippy::suspicious_op_assign_impl)]
    fn bitand_assign(&mut self, rhs: Relation) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            return write!(f, "nothing");
        }
        let names = [
            (Relation::IS_DISJOINT, "is_disjoint"),
            (Relation::STRICTLY_INTERSECTS, "strictly_intersects"),
            (Relation::IS_INCLUDED, "is_included"),
            (Relation::SATURATES, "saturates"),
        ];
        let mut first = true;
        for (rel, name) in names {
            if self.implies(rel) {
                if !first {
                    write!(f, " & ")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Relation between a domain value and a generator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeneratorRelation {
    Nothing,
    /// Adding the generator would not change the domain value.
    Subsumes,
}

impl GeneratorRelation {
    pub fn is_subsumes(self) -> bool {
        matches!(self, GeneratorRelation::Subsumes)
    }
}
