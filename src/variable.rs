//! Type-safe wrappers for space dimensions.
//!
//! A [`Variable`] names one coordinate (zero-based) of a vector space; a
//! [`PartialFunction`] describes how the dimensions of a space are renamed or
//! dropped by `map_space_dimensions`.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};

/// A space dimension (0-indexed).
///
/// # Invariants
///
/// - `Variable(i)` lives in every space of dimension `> i`, so its
///   [`space_dimension`][Variable::space_dimension] is `i + 1`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Variable(usize);

impl Variable {
    pub fn new(id: usize) -> Self {
        Variable(id)
    }

    /// Returns the zero-based index of the dimension.
    pub fn id(self) -> usize {
        self.0
    }

    /// The smallest space dimension containing this variable.
    pub fn space_dimension(self) -> usize {
        self.0 + 1
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

impl From<Variable> for usize {
    fn from(var: Variable) -> Self {
        var.0
    }
}

impl From<usize> for Variable {
    fn from(id: usize) -> Self {
        Variable(id)
    }
}

/// A set of dimensions, ordered by index.
pub type VariablesSet = BTreeSet<Variable>;

/// Injective partial map from the dimensions of a space to the dimensions of another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialFunction {
    map: Vec<Option<usize>>,
}

impl PartialFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the pair `i -> j`.
    ///
    /// Fails if `i` is already mapped or `j` is already in the codomain.
    pub fn insert(&mut self, i: usize, j: usize) -> Result<()> {
        if self.maps(i).is_some() {
            return Err(Error::invalid_argument(
                "PartialFunction::insert",
                format!("dimension {} is already mapped", i),
            ));
        }
        if self.map.iter().flatten().any(|&k| k == j) {
            return Err(Error::invalid_argument(
                "PartialFunction::insert",
                format!("dimension {} is already in the codomain", j),
            ));
        }
        if i >= self.map.len() {
            self.map.resize(i + 1, None);
        }
        self.map[i] = Some(j);
        Ok(())
    }

    /// Image of `i`, if any.
    pub fn maps(&self, i: usize) -> Option<usize> {
        self.map.get(i).copied().flatten()
    }

    pub fn has_empty_codomain(&self) -> bool {
        self.map.iter().all(Option::is_none)
    }

    pub fn max_in_codomain(&self) -> Option<usize> {
        self.map.iter().flatten().copied().max()
    }

    /// Number of dimensions of the target space.
    pub fn codomain_dimension(&self) -> usize {
        self.max_in_codomain().map_or(0, |m| m + 1)
    }

    /// Whether the function is a permutation of `0..space_dim`.
    pub fn is_permutation_of(&self, space_dim: usize) -> bool {
        self.codomain_dimension() == space_dim && (0..space_dim).all(|i| self.maps(i).is_some())
    }

    /// Cycles of a permutation of `0..space_dim`, fixed points omitted.
    ///
    /// Each cycle `[a, b, c]` means `a -> b -> c -> a`.
    pub fn cycles(&self, space_dim: usize) -> Vec<Vec<usize>> {
        let mut visited = vec![false; space_dim];
        let mut cycles = Vec::new();
        for start in 0..space_dim {
            if visited[start] {
                continue;
            }
            let mut cycle = vec![start];
            visited[start] = true;
            let mut next = self.maps(start).unwrap_or(start);
            while next != start && next < space_dim && !visited[next] {
                visited[next] = true;
                cycle.push(next);
                next = self.maps(next).unwrap_or(next);
            }
            if cycle.len() > 1 {
                cycles.push(cycle);
            }
        }
        cycles
    }

    /// The function that keeps every dimension not in `removed`, shifting the rest down.
    pub fn compacting(space_dim: usize, removed: &VariablesSet) -> Self {
        let mut map = Vec::with_capacity(space_dim);
        let mut next = 0;
        for i in 0..space_dim {
            if removed.contains(&Variable(i)) {
                map.push(None);
            } else {
                map.push(Some(next));
                next += 1;
            }
        }
        Self { map }
    }
}
