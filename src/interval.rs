//! Intervals of rationals with open or closed bounds.
//!
//! An [`Interval`] has an optional lower and an optional upper [`Boundary`];
//! a missing boundary means the interval is unbounded on that side. All
//! empty intervals are represented the same way, so `==` is set equality.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use crate::ascii::Tokens;
use crate::error::{Error, Result};

/// A finite end of an interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub value: BigRational,
    pub open: bool,
}

impl Boundary {
    pub fn closed(value: BigRational) -> Self {
        Self { value, open: false }
    }

    pub fn open(value: BigRational) -> Self {
        Self { value, open: true }
    }

    fn negate(&self) -> Self {
        Self {
            value: -&self.value,
            open: self.open,
        }
    }

    fn scale(&self, factor: &BigRational) -> Self {
        Self {
            value: &self.value * factor,
            open: self.open,
        }
    }

    fn add(&self, other: &Boundary) -> Self {
        Self {
            value: &self.value + &other.value,
            open: self.open || other.open,
        }
    }
}

/// Compares two lower boundaries; `Greater` means `a` excludes more.
fn cmp_lower(a: &Boundary, b: &Boundary) -> Ordering {
    a.value.cmp(&b.value).then_with(|| a.open.cmp(&b.open))
}

/// Compares two upper boundaries; `Less` means `a` excludes more.
fn cmp_upper(a: &Boundary, b: &Boundary) -> Ordering {
    a.value.cmp(&b.value).then_with(|| b.open.cmp(&a.open))
}

fn tighter_lower(a: &Option<Boundary>, b: &Option<Boundary>) -> Option<Boundary> {
    match (a, b) {
        (Some(x), Some(y)) => Some((if cmp_lower(x, y) == Ordering::Less { y } else { x }).clone()),
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (None, None) => None,
    }
}

fn tighter_upper(a: &Option<Boundary>, b: &Option<Boundary>) -> Option<Boundary> {
    match (a, b) {
        (Some(x), Some(y)) => Some((if cmp_upper(x, y) == Ordering::Greater { y } else { x }).clone()),
        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
        (None, None) => None,
    }
}

fn looser_lower(a: &Option<Boundary>, b: &Option<Boundary>) -> Option<Boundary> {
    match (a, b) {
        (Some(x), Some(y)) => Some((if cmp_lower(x, y) == Ordering::Greater { y } else { x }).clone()),
        _ => None,
    }
}

fn looser_upper(a: &Option<Boundary>, b: &Option<Boundary>) -> Option<Boundary> {
    match (a, b) {
        (Some(x), Some(y)) => Some((if cmp_upper(x, y) == Ordering::Less { y } else { x }).clone()),
        _ => None,
    }
}

/// A convex set of rationals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lower: Option<Boundary>,
    upper: Option<Boundary>,
}

impl Interval {
    /// The interval between `lower` and `upper` (`None` = unbounded).
    pub fn new(lower: Option<Boundary>, upper: Option<Boundary>) -> Self {
        let i = Self { lower, upper };
        if i.is_empty() {
            Self::empty()
        } else {
            i
        }
    }

    pub fn universe() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            lower: Some(Boundary::open(BigRational::zero())),
            upper: Some(Boundary::open(BigRational::zero())),
        }
    }

    pub fn singleton(value: BigRational) -> Self {
        Self {
            lower: Some(Boundary::closed(value.clone())),
            upper: Some(Boundary::closed(value)),
        }
    }

    /// `[lower, upper]`
    pub fn closed(lower: BigRational, upper: BigRational) -> Self {
        Self::new(Some(Boundary::closed(lower)), Some(Boundary::closed(upper)))
    }

    pub fn lower(&self) -> Option<&Boundary> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Boundary> {
        self.upper.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) => match l.value.cmp(&u.value) {
                Ordering::Greater => true,
                Ordering::Equal => l.open || u.open,
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    pub fn is_universe(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// The only element, if there is exactly one.
    pub fn singleton_value(&self) -> Option<&BigRational> {
        match (&self.lower, &self.upper) {
            (Some(l), Some(u)) if !l.open && !u.open && l.value == u.value => Some(&l.value),
            _ => None,
        }
    }

    pub fn contains_value(&self, value: &BigRational) -> bool {
        let above = match &self.lower {
            Some(l) => &l.value < value || (!l.open && &l.value == value),
            None => true,
        };
        let below = match &self.upper {
            Some(u) => value < &u.value || (!u.open && value == &u.value),
            None => true,
        };
        above && below
    }

    /// Whether `value` lies in the topological closure.
    pub fn closure_contains_value(&self, value: &BigRational) -> bool {
        !self.is_empty()
            && self.lower.as_ref().map_or(true, |l| &l.value <= value)
            && self.upper.as_ref().map_or(true, |u| value <= &u.value)
    }

    pub fn contains(&self, other: &Interval) -> bool {
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        let lower_ok = match (&self.lower, &other.lower) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => cmp_lower(a, b) != Ordering::Greater,
        };
        let upper_ok = match (&self.upper, &other.upper) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => cmp_upper(a, b) != Ordering::Less,
        };
        lower_ok && upper_ok
    }

    pub fn meet(&self, other: &Interval) -> Interval {
        Interval::new(
            tighter_lower(&self.lower, &other.lower),
            tighter_upper(&self.upper, &other.upper),
        )
    }

    /// The smallest interval containing both.
    pub fn join(&self, other: &Interval) -> Interval {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        Interval {
            lower: looser_lower(&self.lower, &other.lower),
            upper: looser_upper(&self.upper, &other.upper),
        }
    }

    /// Intersects with `{ v | v >= bound }` (or `>` for an open bound).
    pub fn refine_lower(&mut self, bound: Boundary) {
        *self = Interval::new(tighter_lower(&self.lower, &Some(bound)), self.upper.take());
    }

    /// Intersects with `{ v | v <= bound }` (or `<` for an open bound).
    pub fn refine_upper(&mut self, bound: Boundary) {
        *self = Interval::new(self.lower.take(), tighter_upper(&self.upper, &Some(bound)));
    }

    /// `{ a + b | a ∈ self, b ∈ other }`
    pub fn add(&self, other: &Interval) -> Interval {
        if self.is_empty() || other.is_empty() {
            return Interval::empty();
        }
        let lower = match (&self.lower, &other.lower) {
            (Some(a), Some(b)) => Some(a.add(b)),
            _ => None,
        };
        let upper = match (&self.upper, &other.upper) {
            (Some(a), Some(b)) => Some(a.add(b)),
            _ => None,
        };
        Interval { lower, upper }
    }

    /// `{ factor * a | a ∈ self }`
    pub fn scale(&self, factor: &BigRational) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        if factor.is_zero() {
            return Interval::singleton(BigRational::zero());
        }
        let lower = self.lower.as_ref().map(|b| b.scale(factor));
        let upper = self.upper.as_ref().map(|b| b.scale(factor));
        if factor.is_negative() {
            Interval { lower: upper, upper: lower }
        } else {
            Interval { lower, upper }
        }
    }

    pub fn negate(&self) -> Interval {
        if self.is_empty() {
            return Interval::empty();
        }
        Interval {
            lower: self.upper.as_ref().map(Boundary::negate),
            upper: self.lower.as_ref().map(Boundary::negate),
        }
    }

    /// Some element of a non-empty interval, preferring closed boundaries.
    pub fn sample(&self) -> BigRational {
        match (&self.lower, &self.upper) {
            (Some(l), _) if !l.open => l.value.clone(),
            (_, Some(u)) if !u.open => u.value.clone(),
            (Some(l), Some(u)) => (&l.value + &u.value) / BigRational::from_integer(BigInt::from(2)),
            (Some(l), None) => &l.value + BigRational::one(),
            (None, Some(u)) => &u.value - BigRational::one(),
            (None, None) => BigRational::zero(),
        }
    }

    /// Whether some multiple of `modulus > 0` lies in the interval.
    pub fn meets_multiple_of(&self, modulus: &BigRational) -> bool {
        debug_assert!(modulus.is_positive());
        if self.is_empty() {
            return false;
        }
        let (Some(l), Some(u)) = (&self.lower, &self.upper) else {
            return true;
        };
        let lo = &l.value / modulus;
        let hi = &u.value / modulus;
        let mut k_min = lo.ceil();
        if l.open && k_min == lo {
            k_min += BigRational::one();
        }
        let mut k_max = hi.floor();
        if u.open && k_max == hi {
            k_max -= BigRational::one();
        }
        k_min <= k_max
    }

    /// Dumps as `<lower> <upper>`: `-inf`, `[ v` or `( v`, then `+inf`, `v ]` or `v )`.
    pub fn ascii_dump(&self) -> String {
        let lower = match &self.lower {
            None => "-inf".to_string(),
            Some(b) => format!("{} {}", if b.open { "(" } else { "[" }, b.value),
        };
        let upper = match &self.upper {
            None => "+inf".to_string(),
            Some(b) => format!("{} {}", b.value, if b.open { ")" } else { "]" }),
        };
        format!("{} {}", lower, upper)
    }

    pub(crate) fn load_from(tokens: &mut Tokens<'_>) -> Result<Self> {
        let lower = match tokens.next_token()? {
            "-inf" => None,
            "[" => Some(Boundary::closed(tokens.parse()?)),
            "(" => Some(Boundary::open(tokens.parse()?)),
            other => return Err(Error::malformed(format!("expected a lower bound, found `{}`", other))),
        };
        let upper = match tokens.next_token()? {
            "+inf" => None,
            token => {
                let value: BigRational = token
                    .parse()
                    .map_err(|e| Error::malformed(format!("invalid bound `{}`: {}", token, e)))?;
                match tokens.next_token()? {
                    "]" => Some(Boundary::closed(value)),
                    ")" => Some(Boundary::open(value)),
                    other => return Err(Error::malformed(format!("expected `]` or `)`, found `{}`", other))),
                }
            }
        };
        Ok(Interval::new(lower, upper))
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::universe()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        match &self.lower {
            None => write!(f, "(-∞")?,
            Some(b) => write!(f, "{}{}", if b.open { "(" } else { "[" }, b.value)?,
        }
        write!(f, ", ")?;
        match &self.upper {
            None => write!(f, "+∞)"),
            Some(b) => write!(f, "{}{}", b.value, if b.open { ")" } else { "]" }),
        }
    }
}
