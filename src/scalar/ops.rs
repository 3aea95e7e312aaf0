//! Operator overloading for scalar expressions.
//!
//! The operators are sugar over the fallible factory API. Multiplication,
//! division and subtraction delegate to factories that can reject invalid
//! input (division by a numeric zero); the operator impls surface those
//! as panics, which keeps expression-building code readable.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::core::error::CasError;
use crate::scalar::ScalarExpr;

#[track_caller]
pub(crate) fn expect_ok<T>(result: Result<T, CasError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{err}"),
    }
}

macro_rules! impl_scalar_binary {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = ScalarExpr;
            fn add(self, rhs: $rhs) -> ScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                a.add_expr(&b)
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = ScalarExpr;
            fn sub(self, rhs: $rhs) -> ScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                a.sub_expr(&b)
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = ScalarExpr;
            /// # Panics
            /// Panics when the underlying factory rejects the operands.
            fn mul(self, rhs: $rhs) -> ScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.mul_expr(&b))
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = ScalarExpr;
            /// # Panics
            /// Panics on division by a numeric zero.
            fn div(self, rhs: $rhs) -> ScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.div_expr(&b))
            }
        }
    };
}

impl_scalar_binary!(ScalarExpr, ScalarExpr, |s: ScalarExpr| s, |r: ScalarExpr| r);
impl_scalar_binary!(ScalarExpr, &ScalarExpr, |s: ScalarExpr| s, |r: &ScalarExpr| r.clone());
impl_scalar_binary!(&ScalarExpr, ScalarExpr, |s: &ScalarExpr| s.clone(), |r: ScalarExpr| r);
impl_scalar_binary!(&ScalarExpr, &ScalarExpr, |s: &ScalarExpr| s.clone(), |r: &ScalarExpr| r.clone());
impl_scalar_binary!(ScalarExpr, f64, |s: ScalarExpr| s, |r: f64| ScalarExpr::constant(r));
impl_scalar_binary!(&ScalarExpr, f64, |s: &ScalarExpr| s.clone(), |r: f64| ScalarExpr::constant(r));
impl_scalar_binary!(ScalarExpr, i64, |s: ScalarExpr| s, |r: i64| ScalarExpr::constant(r));
impl_scalar_binary!(&ScalarExpr, i64, |s: &ScalarExpr| s.clone(), |r: i64| ScalarExpr::constant(r));
impl_scalar_binary!(f64, ScalarExpr, |s: f64| ScalarExpr::constant(s), |r: ScalarExpr| r);
impl_scalar_binary!(f64, &ScalarExpr, |s: f64| ScalarExpr::constant(s), |r: &ScalarExpr| r.clone());
impl_scalar_binary!(i64, ScalarExpr, |s: i64| ScalarExpr::constant(s), |r: ScalarExpr| r);
impl_scalar_binary!(i64, &ScalarExpr, |s: i64| ScalarExpr::constant(s), |r: &ScalarExpr| r.clone());

impl Neg for ScalarExpr {
    type Output = ScalarExpr;
    fn neg(self) -> ScalarExpr {
        self.neg_expr()
    }
}

impl Neg for &ScalarExpr {
    type Output = ScalarExpr;
    fn neg(self) -> ScalarExpr {
        self.neg_expr()
    }
}
