//! Exact numeric scalar model.
//!
//! `Number` is the tagged scalar used by `Constant` nodes and by the
//! coefficient slots of the n-ary containers. Arithmetic always keeps the
//! lowest variant that can represent the exact result:
//! integer + integer stays integer, integer + rational is rational, and
//! anything touching a real collapses to a real. Integer overflow promotes
//! to real instead of wrapping; callers treat that as a normal case.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::core::error::CasError;

/// A tagged numeric scalar: exact integer, exact reduced rational, or an
/// IEEE double.
///
/// Rationals are stored normalized: `gcd(numerator, denominator) == 1` and
/// the denominator is strictly positive. A rational whose denominator
/// reduces to 1 is promoted back to `Int`.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    Int(i64),
    /// Reduced rational `numerator / denominator`, denominator > 0.
    Rational(i64, i64),
    /// IEEE double-precision value.
    Real(f64),
}

fn gcd128(mut a: i128, mut b: i128) -> i128 {
    a = a.abs();
    b = b.abs();
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn ipow128(base: i128, exp: u32) -> Option<i128> {
    let mut acc: i128 = 1;
    for _ in 0..exp {
        acc = acc.checked_mul(base)?;
    }
    Some(acc)
}

/// Build the canonical number for `num / den` with `den != 0`.
/// Reduces, fixes the sign of the denominator, demotes to `Int` when the
/// denominator becomes 1 and falls back to `Real` when the reduced pair
/// does not fit in 64 bits.
fn normalized(num: i128, den: i128) -> Number {
    debug_assert!(den != 0, "normalized() requires a nonzero denominator");
    if num == 0 {
        return Number::Int(0);
    }
    let g = gcd128(num, den);
    let mut n = num / g;
    let mut d = den / g;
    if d < 0 {
        n = -n;
        d = -d;
    }
    if d == 1 {
        return match i64::try_from(n) {
            Ok(v) => Number::Int(v),
            Err(_) => Number::Real(n as f64),
        };
    }
    match (i64::try_from(n), i64::try_from(d)) {
        (Ok(n64), Ok(d64)) => Number::Rational(n64, d64),
        _ => Number::Real(n as f64 / d as f64),
    }
}

impl Number {
    /// Exact rational constructor.
    ///
    /// # Errors
    /// `DivisionByZero` when `den == 0`.
    pub fn rational(num: i64, den: i64) -> Result<Number, CasError> {
        if den == 0 {
            return Err(CasError::DivisionByZero {
                op: "rational constructor",
            });
        }
        Ok(normalized(num as i128, den as i128))
    }

    /// The numerator/denominator view: `Int(n)` reads as `n/1`.
    /// `None` for reals.
    fn as_ratio(&self) -> Option<(i128, i128)> {
        match *self {
            Number::Int(n) => Some((n as i128, 1)),
            Number::Rational(n, d) => Some((n as i128, d as i128)),
            Number::Real(_) => None,
        }
    }

    /// Lossy conversion to `f64`.
    pub fn to_f64(&self) -> f64 {
        match *self {
            Number::Int(n) => n as f64,
            Number::Rational(n, d) => n as f64 / d as f64,
            Number::Real(x) => x,
        }
    }

    /// The exact integer value, if this number is one.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(n) => Some(n),
            Number::Rational(..) => None,
            Number::Real(x) => {
                if x.fract() == 0.0 && x >= i64::MIN as f64 && x <= i64::MAX as f64 {
                    Some(x as i64)
                } else {
                    None
                }
            }
        }
    }

    /// True for exact integers and for reals with zero fractional part.
    pub fn is_integer(&self) -> bool {
        match *self {
            Number::Int(_) => true,
            Number::Rational(..) => false,
            Number::Real(x) => x.fract() == 0.0 && x.is_finite(),
        }
    }

    /// True when the value is exactly one.
    pub fn is_one(&self) -> bool {
        match *self {
            Number::Int(n) => n == 1,
            Number::Rational(..) => false,
            Number::Real(x) => x == 1.0,
        }
    }

    /// True when the value is exactly minus one.
    pub fn is_neg_one(&self) -> bool {
        match *self {
            Number::Int(n) => n == -1,
            Number::Rational(..) => false,
            Number::Real(x) => x == -1.0,
        }
    }

    /// True when the value is strictly positive.
    pub fn is_positive(&self) -> bool {
        match *self {
            Number::Int(n) => n > 0,
            Number::Rational(n, _) => n > 0,
            Number::Real(x) => x > 0.0,
        }
    }

    /// True when the value is strictly negative.
    pub fn is_negative(&self) -> bool {
        match *self {
            Number::Int(n) => n < 0,
            Number::Rational(n, _) => n < 0,
            Number::Real(x) => x < 0.0,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Number {
        if self.is_negative() { -*self } else { *self }
    }

    /// Exact division.
    ///
    /// # Errors
    /// `DivisionByZero` when `rhs` is zero.
    pub fn div(&self, rhs: &Number) -> Result<Number, CasError> {
        if rhs.is_zero() {
            return Err(CasError::DivisionByZero {
                op: "number division",
            });
        }
        match (self.as_ratio(), rhs.as_ratio()) {
            (Some((an, ad)), Some((bn, bd))) => Ok(normalized(an * bd, ad * bn)),
            _ => Ok(Number::Real(self.to_f64() / rhs.to_f64())),
        }
    }

    /// Exponentiation with the promotion rules of the number model:
    /// integer base and nonnegative integer exponent stay integer,
    /// a negative integer exponent yields a rational, and anything
    /// involving a real (or a fractional exponent) yields a real.
    /// `pow(0, 0)` is 1 by convention.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero base raised to a negative exponent.
    pub fn pow(&self, exp: &Number) -> Result<Number, CasError> {
        if exp.is_zero() {
            return Ok(Number::Int(1));
        }
        if self.is_zero() {
            if exp.is_negative() {
                return Err(CasError::DivisionByZero { op: "number pow" });
            }
            return Ok(Number::Int(0));
        }
        if let (Some((bn, bd)), Number::Int(k)) = (self.as_ratio(), *exp)
            && let Ok(mag) = u32::try_from(k.unsigned_abs())
        {
            let powed = ipow128(bn, mag).zip(ipow128(bd, mag));
            return match powed {
                Some((pn, pd)) => {
                    if k >= 0 {
                        Ok(normalized(pn, pd))
                    } else {
                        Ok(normalized(pd, pn))
                    }
                }
                // Exact power overflowed 128 bits; fall back to floats.
                None => Ok(Number::Real(self.to_f64().powf(k as f64))),
            };
        }
        Ok(Number::Real(self.to_f64().powf(exp.to_f64())))
    }

    /// Stable content hash used by the structural hashing of `Constant`
    /// nodes and coefficient slots.
    pub(crate) fn content_hash(&self) -> u64 {
        use crate::core::hash::combine;
        match *self {
            Number::Int(n) => combine(0x51, n as u64),
            Number::Rational(n, d) => combine(combine(0x52, n as u64), d as u64),
            Number::Real(x) => combine(0x53, x.to_bits()),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_add(b) {
                Some(s) => Number::Int(s),
                None => Number::Real(a as f64 + b as f64),
            },
            _ => match (self.as_ratio(), rhs.as_ratio()) {
                (Some((an, ad)), Some((bn, bd))) => normalized(an * bd + bn * ad, ad * bd),
                _ => Number::Real(self.to_f64() + rhs.to_f64()),
            },
        }
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self + (-rhs)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        match (self, rhs) {
            (Number::Int(a), Number::Int(b)) => match a.checked_mul(b) {
                Some(p) => Number::Int(p),
                None => Number::Real(a as f64 * b as f64),
            },
            _ => match (self.as_ratio(), rhs.as_ratio()) {
                (Some((an, ad)), Some((bn, bd))) => normalized(an * bn, ad * bd),
                _ => Number::Real(self.to_f64() * rhs.to_f64()),
            },
        }
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Int(n) => match n.checked_neg() {
                Some(m) => Number::Int(m),
                None => Number::Real(-(n as f64)),
            },
            Number::Rational(n, d) => Number::Rational(-n, d),
            Number::Real(x) => Number::Real(-x),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_ratio(), other.as_ratio()) {
            // Exact comparison through cross-multiplication; denominators
            // are positive by construction.
            (Some((an, ad)), Some((bn, bd))) => an * bd == bn * ad,
            // A real operand promotes the rational side to IEEE semantics.
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.as_ratio(), other.as_ratio()) {
            (Some((an, ad)), Some((bn, bd))) => (an * bd).partial_cmp(&(bn * ad)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl Zero for Number {
    fn zero() -> Self {
        Number::Int(0)
    }

    fn is_zero(&self) -> bool {
        match *self {
            Number::Int(n) => n == 0,
            // Normalized rationals never hold zero.
            Number::Rational(..) => false,
            Number::Real(x) => x == 0.0,
        }
    }
}

impl One for Number {
    fn one() -> Self {
        Number::Int(1)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Int(n)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::Real(x)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(n) => write!(f, "{n}"),
            Number::Rational(n, d) => write!(f, "{n}/{d}"),
            Number::Real(x) => write!(f, "{x}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_stays_exact() {
        let a = Number::Int(2) + Number::Int(3);
        assert_eq!(a, Number::Int(5));
        assert_eq!(Number::Int(4) * Number::Int(-6), Number::Int(-24));
    }

    #[test]
    fn rational_normalization() {
        let r = Number::rational(4, -6).unwrap();
        assert_eq!(r, Number::Rational(-2, 3));
        // denominator 1 demotes to Int
        assert_eq!(Number::rational(8, 4).unwrap(), Number::Int(2));
    }

    #[test]
    fn division_promotes_to_rational() {
        let q = Number::Int(1).div(&Number::Int(3)).unwrap();
        assert_eq!(q, Number::Rational(1, 3));
        assert!(Number::Int(1).div(&Number::Int(0)).is_err());
    }

    #[test]
    fn overflow_promotes_to_real() {
        let big = Number::Int(i64::MAX);
        match big + Number::Int(1) {
            Number::Real(_) => {}
            other => panic!("expected Real, got {other:?}"),
        }
    }

    #[test]
    fn pow_rules() {
        assert_eq!(
            Number::Int(2).pow(&Number::Int(10)).unwrap(),
            Number::Int(1024)
        );
        assert_eq!(
            Number::Int(2).pow(&Number::Int(-2)).unwrap(),
            Number::Rational(1, 4)
        );
        // 0^0 = 1 by convention
        assert_eq!(Number::Int(0).pow(&Number::Int(0)).unwrap(), Number::Int(1));
        assert!(Number::Int(0).pow(&Number::Int(-1)).is_err());
    }

    #[test]
    fn cross_variant_comparison() {
        assert_eq!(Number::Int(1), Number::Real(1.0));
        assert_eq!(Number::Rational(1, 2), Number::Real(0.5));
        assert!(Number::Rational(1, 3) < Number::Rational(1, 2));
        assert!(Number::Int(2) > Number::Rational(3, 2));
    }
}
