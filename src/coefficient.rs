//! Exact integer and rational helpers.
//!
//! Coefficients are arbitrary-precision integers ([`BigInt`]); bounds and
//! frequencies are exact rationals ([`BigRational`]).

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

pub type Coefficient = BigInt;

/// Shared zero, handed out by accessors that read past the end of a row.
pub(crate) static ZERO: BigInt = BigInt::ZERO;

/// Non-negative greatest common divisor.
pub fn gcd(a: &BigInt, b: &BigInt) -> BigInt {
    a.gcd(b)
}

/// Non-negative least common multiple; `lcm(0, x) == 0`.
pub fn lcm(a: &BigInt, b: &BigInt) -> BigInt {
    if a.is_zero() || b.is_zero() {
        return BigInt::zero();
    }
    a.lcm(b)
}

/// [Extended Euclid][ext-euclid]: returns `(g, s, t)` with `s*a + t*b == g` and `g >= 0`.
///
/// [ext-euclid]: https://en.wikipedia.org/wiki/Extended_Euclidean_algorithm
pub fn gcdext(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    let e = a.extended_gcd(b);
    if e.gcd.is_negative() {
        (-e.gcd, -e.x, -e.y)
    } else {
        (e.gcd, e.x, e.y)
    }
}

/// Division that is known to be exact.
pub fn exact_div(a: &BigInt, b: &BigInt) -> BigInt {
    debug_assert!(!b.is_zero());
    debug_assert!((a % b).is_zero(), "{} is not a multiple of {}", a, b);
    a / b
}

/// GCD of all values in the iterator (zero for an empty or all-zero iterator).
pub fn gcd_all<'a, I>(values: I) -> BigInt
where
    I: IntoIterator<Item = &'a BigInt>,
{
    let mut g = BigInt::zero();
    for v in values {
        if v.is_zero() {
            continue;
        }
        g = g.gcd(v);
        if g.is_one() {
            break;
        }
    }
    g
}

/// LCM of the denominators of all rationals in the iterator (one if empty).
pub fn lcm_denominators<'a, I>(values: I) -> BigInt
where
    I: IntoIterator<Item = &'a BigRational>,
{
    values.into_iter().fold(BigInt::one(), |acc, q| acc.lcm(q.denom()))
}

/// Integer `v * q` where `v` is known to cancel the denominator of `q`.
pub fn scale_rational(q: &BigRational, v: &BigInt) -> BigInt {
    exact_div(&(q.numer() * v), q.denom())
}

/// Smallest representative of `value` modulo `period` in `[0, period)`; `period > 0`.
pub fn rational_mod(value: &BigRational, period: &BigRational) -> BigRational {
    debug_assert!(period.is_positive());
    let k = (value / period).floor();
    value - period * k
}
