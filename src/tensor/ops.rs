//! Operator overloading for tensor expressions.
//!
//! Sugar over the fallible factories: shape mismatches surface as panics
//! with the factory's error message.

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::scalar::ScalarExpr;
use crate::scalar::ops::expect_ok;
use crate::tensor::TensorExpr;
use crate::tensor_scalar::TensorScalarExpr;

macro_rules! impl_tensor_pair {
    ($lhs:ty, $rhs:ty, $to_lhs:expr, $to_rhs:expr) => {
        impl Add<$rhs> for $lhs {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on (dim, rank) mismatch.
            fn add(self, rhs: $rhs) -> TensorExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.add_expr(&b))
            }
        }
        impl Sub<$rhs> for $lhs {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on (dim, rank) mismatch.
            fn sub(self, rhs: $rhs) -> TensorExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.sub_expr(&b))
            }
        }
        impl Mul<$rhs> for $lhs {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on dimension mismatch or non-rank-2 operands.
            fn mul(self, rhs: $rhs) -> TensorExpr {
                let (a, b) = ($to_lhs(self), $to_rhs(rhs));
                expect_ok(a.mul_expr(&b))
            }
        }
    };
}

impl_tensor_pair!(TensorExpr, TensorExpr, |s: TensorExpr| s, |r: TensorExpr| r);
impl_tensor_pair!(TensorExpr, &TensorExpr, |s: TensorExpr| s, |r: &TensorExpr| r.clone());
impl_tensor_pair!(&TensorExpr, TensorExpr, |s: &TensorExpr| s.clone(), |r: TensorExpr| r);
impl_tensor_pair!(&TensorExpr, &TensorExpr, |s: &TensorExpr| s.clone(), |r: &TensorExpr| r.clone());

macro_rules! impl_scalar_times_tensor {
    ($scalar:ty, $to_scalar:expr) => {
        impl Mul<TensorExpr> for $scalar {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the coefficient merge fails.
            fn mul(self, rhs: TensorExpr) -> TensorExpr {
                expect_ok(rhs.scalar_mul(&$to_scalar(self)))
            }
        }
        impl Mul<&TensorExpr> for $scalar {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the coefficient merge fails.
            fn mul(self, rhs: &TensorExpr) -> TensorExpr {
                expect_ok(rhs.scalar_mul(&$to_scalar(self)))
            }
        }
    };
}

impl_scalar_times_tensor!(ScalarExpr, |s: ScalarExpr| s);
impl_scalar_times_tensor!(&ScalarExpr, |s: &ScalarExpr| s.clone());
impl_scalar_times_tensor!(f64, ScalarExpr::constant);
impl_scalar_times_tensor!(i64, ScalarExpr::constant);

macro_rules! impl_tensor_scalar_rhs {
    ($rhs:ty, $to_rhs:expr) => {
        impl Mul<$rhs> for TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the coefficient merge fails.
            fn mul(self, rhs: $rhs) -> TensorExpr {
                expect_ok(self.scalar_mul(&$to_rhs(rhs)))
            }
        }
        impl Mul<$rhs> for &TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the coefficient merge fails.
            fn mul(self, rhs: $rhs) -> TensorExpr {
                expect_ok(self.scalar_mul(&$to_rhs(rhs)))
            }
        }
        impl Div<$rhs> for TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on division by a numeric zero.
            fn div(self, rhs: $rhs) -> TensorExpr {
                expect_ok(self.scalar_div(&$to_rhs(rhs)))
            }
        }
        impl Div<$rhs> for &TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on division by a numeric zero.
            fn div(self, rhs: $rhs) -> TensorExpr {
                expect_ok(self.scalar_div(&$to_rhs(rhs)))
            }
        }
    };
}

impl_tensor_scalar_rhs!(ScalarExpr, |s: ScalarExpr| s);
impl_tensor_scalar_rhs!(&ScalarExpr, |s: &ScalarExpr| s.clone());
impl_tensor_scalar_rhs!(f64, ScalarExpr::constant);
impl_tensor_scalar_rhs!(i64, ScalarExpr::constant);

macro_rules! impl_tensor_field_ops {
    ($field:ty, $to_field:expr) => {
        impl Div<$field> for TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on division by the zero reduction.
            fn div(self, rhs: $field) -> TensorExpr {
                expect_ok(self.field_div(&$to_field(rhs)))
            }
        }
        impl Div<$field> for &TensorExpr {
            type Output = TensorExpr;
            /// # Panics
            /// Panics on division by the zero reduction.
            fn div(self, rhs: $field) -> TensorExpr {
                expect_ok(self.field_div(&$to_field(rhs)))
            }
        }
        impl Mul<TensorExpr> for $field {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the field merge fails.
            fn mul(self, rhs: TensorExpr) -> TensorExpr {
                expect_ok(rhs.field_mul(&$to_field(self)))
            }
        }
        impl Mul<&TensorExpr> for $field {
            type Output = TensorExpr;
            /// # Panics
            /// Panics when the field merge fails.
            fn mul(self, rhs: &TensorExpr) -> TensorExpr {
                expect_ok(rhs.field_mul(&$to_field(self)))
            }
        }
    };
}

impl_tensor_field_ops!(TensorScalarExpr, |f: TensorScalarExpr| f);
impl_tensor_field_ops!(&TensorScalarExpr, |f: &TensorScalarExpr| f.clone());

impl Neg for TensorExpr {
    type Output = TensorExpr;
    fn neg(self) -> TensorExpr {
        self.neg_expr()
    }
}

impl Neg for &TensorExpr {
    type Output = TensorExpr;
    fn neg(self) -> TensorExpr {
        self.neg_expr()
    }
}
