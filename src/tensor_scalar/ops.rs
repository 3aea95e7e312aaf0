//! Operator overloading for tensor-to-scalar expressions, including the
//! cross-domain combinations with plain scalars.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::scalar::ScalarExpr;
use crate::scalar::ops::expect_ok;
use crate::tensor_scalar::TensorScalarExpr;

macro_rules! impl_t2s_pair {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = TensorScalarExpr;
            fn add(self, rhs: $rhs) -> TensorScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                a.add_expr(&b)
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = TensorScalarExpr;
            fn sub(self, rhs: $rhs) -> TensorScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                a.sub_expr(&b)
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = TensorScalarExpr;
            /// # Panics
            /// Panics when the underlying factory rejects the operands.
            fn mul(self, rhs: $rhs) -> TensorScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.mul_expr(&b))
            }
        }
        impl Div<$rhs> for $lhs {
            type Output = TensorScalarExpr;
            /// # Panics
            /// Panics on division by the zero reduction.
            fn div(self, rhs: $rhs) -> TensorScalarExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.div_expr(&b))
            }
        }
    };
}

impl_t2s_pair!(TensorScalarExpr, TensorScalarExpr, |s: TensorScalarExpr| s, |r: TensorScalarExpr| r);
impl_t2s_pair!(
    TensorScalarExpr,
    &TensorScalarExpr,
    |s: TensorScalarExpr| s,
    |r: &TensorScalarExpr| r.clone()
);
impl_t2s_pair!(
    &TensorScalarExpr,
    TensorScalarExpr,
    |s: &TensorScalarExpr| s.clone(),
    |r: TensorScalarExpr| r
);
impl_t2s_pair!(
    &TensorScalarExpr,
    &TensorScalarExpr,
    |s: &TensorScalarExpr| s.clone(),
    |r: &TensorScalarExpr| r.clone()
);
impl_t2s_pair!(
    TensorScalarExpr,
    ScalarExpr,
    |s: TensorScalarExpr| s,
    |r: ScalarExpr| TensorScalarExpr::wrap(&r)
);
impl_t2s_pair!(
    &TensorScalarExpr,
    &ScalarExpr,
    |s: &TensorScalarExpr| s.clone(),
    |r: &ScalarExpr| TensorScalarExpr::wrap(r)
);
impl_t2s_pair!(
    ScalarExpr,
    TensorScalarExpr,
    |s: ScalarExpr| TensorScalarExpr::wrap(&s),
    |r: TensorScalarExpr| r
);
impl_t2s_pair!(
    &ScalarExpr,
    &TensorScalarExpr,
    |s: &ScalarExpr| TensorScalarExpr::wrap(s),
    |r: &TensorScalarExpr| r.clone()
);
impl_t2s_pair!(
    TensorScalarExpr,
    f64,
    |s: TensorScalarExpr| s,
    |r: f64| TensorScalarExpr::constant(r)
);
impl_t2s_pair!(
    TensorScalarExpr,
    i64,
    |s: TensorScalarExpr| s,
    |r: i64| TensorScalarExpr::constant(r)
);
impl_t2s_pair!(
    f64,
    TensorScalarExpr,
    |s: f64| TensorScalarExpr::constant(s),
    |r: TensorScalarExpr| r
);
impl_t2s_pair!(
    i64,
    TensorScalarExpr,
    |s: i64| TensorScalarExpr::constant(s),
    |r: TensorScalarExpr| r
);

impl Neg for TensorScalarExpr {
    type Output = TensorScalarExpr;
    fn neg(self) -> TensorScalarExpr {
        self.neg_expr()
    }
}

impl Neg for &TensorScalarExpr {
    type Output = TensorScalarExpr;
    fn neg(self) -> TensorScalarExpr {
        self.neg_expr()
    }
}
