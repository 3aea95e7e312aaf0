//! Tensor-to-scalar expression domain: reductions of tensors to scalars
//! (trace, determinant, norm, full contractions) and their algebra.
//!
//! Scalar coefficients embed through `ScalarWrapper` and `WithScalarMul`;
//! the n-ary sum merges like terms by their coefficient-stripped core, the
//! n-ary product merges powers of equal bases.
//!
//! # Example
//! ```
//! use symtensor::{TensorExpr, trace};
//!
//! let x = TensorExpr::symbol("doc_t2s_X", 3, 2).unwrap();
//! let tr = trace(&x).unwrap();
//! assert_eq!((tr.clone() + tr).to_string(), "2*tr(doc_t2s_X)");
//! ```

pub(crate) mod diff;
mod display;
mod ops;
pub(crate) mod simplify;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::AnyExpr;
use crate::core::error::CasError;
use crate::core::hash::{combine, commutative, ordered};
use crate::core::nary::NaryMap;
use crate::core::number::Number;
use crate::scalar::ScalarExpr;
use crate::tensor::TensorExpr;

// =============================================================================
// KINDS
// =============================================================================

/// The structure of a tensor-to-scalar expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorScalarKind {
    /// The zero reduction.
    Zero,
    /// The unit reduction.
    One,
    /// A plain scalar expression lifted into the domain.
    ScalarWrapper(ScalarExpr),
    /// Trace of a rank-2 tensor.
    Trace(TensorExpr),
    /// Determinant of a rank-2 tensor.
    Det(TensorExpr),
    /// Frobenius norm.
    Norm(TensorExpr),
    /// Full self-contraction `t : t`.
    Dot(TensorExpr),
    /// Natural logarithm.
    Log(TensorScalarExpr),
    /// Negation.
    Neg(TensorScalarExpr),
    /// Exponentiation.
    Pow {
        /// The base.
        base: TensorScalarExpr,
        /// The exponent.
        exp: TensorScalarExpr,
    },
    /// Full contraction of two same-shape tensors.
    InnerToScalar {
        /// Left operand.
        lhs: TensorExpr,
        /// Right operand.
        rhs: TensorExpr,
    },
    /// Symbolic scalar coefficient times a reduction.
    WithScalarMul {
        /// The scalar coefficient.
        scalar: ScalarExpr,
        /// The reduction.
        expr: TensorScalarExpr,
    },
    /// Reduction divided by a symbolic scalar.
    WithScalarDiv {
        /// The reduction.
        expr: TensorScalarExpr,
        /// The scalar divisor.
        scalar: ScalarExpr,
    },
    /// Symbolic scalar divided by a reduction.
    ScalarDivT2s {
        /// The scalar numerator.
        scalar: ScalarExpr,
        /// The reduction divisor.
        expr: TensorScalarExpr,
    },
    /// N-ary sum.
    Add(NaryMap<TensorScalarExpr>),
    /// N-ary product.
    Mul(NaryMap<TensorScalarExpr>),
}

// =============================================================================
// NODE AND HANDLE
// =============================================================================

#[derive(Debug)]
pub(crate) struct TensorScalarNode {
    kind: TensorScalarKind,
    hash: u64,
}

/// Handle to an immutable tensor-to-scalar expression node.
#[derive(Debug, Clone)]
pub struct TensorScalarExpr(Arc<TensorScalarNode>);

impl PartialEq for TensorScalarExpr {
    fn eq(&self, other: &Self) -> bool {
        if self.0.hash != other.0.hash {
            return false;
        }
        self.0.kind == other.0.kind
    }
}

impl std::hash::Hash for TensorScalarExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

const TAG_ZERO: u64 = 0x0301;
const TAG_ONE: u64 = 0x0302;
const TAG_WRAPPER: u64 = 0x0303;
const TAG_TRACE: u64 = 0x0304;
const TAG_DET: u64 = 0x0305;
const TAG_NORM: u64 = 0x0306;
const TAG_DOT: u64 = 0x0307;
const TAG_LOG: u64 = 0x0308;
const TAG_NEG: u64 = 0x0309;
const TAG_POW: u64 = 0x030a;
const TAG_INNER: u64 = 0x030b;
const TAG_WITH_SCALAR_MUL: u64 = 0x030c;
const TAG_WITH_SCALAR_DIV: u64 = 0x030d;
const TAG_SCALAR_DIV_T2S: u64 = 0x030e;
const TAG_ADD: u64 = 0x030f;
const TAG_MUL: u64 = 0x0310;

fn compute_hash(kind: &TensorScalarKind) -> u64 {
    match kind {
        TensorScalarKind::Zero => ordered(TAG_ZERO, []),
        TensorScalarKind::One => ordered(TAG_ONE, []),
        TensorScalarKind::ScalarWrapper(s) => combine(TAG_WRAPPER, s.content_hash()),
        TensorScalarKind::Trace(t) => combine(TAG_TRACE, t.content_hash()),
        TensorScalarKind::Det(t) => combine(TAG_DET, t.content_hash()),
        TensorScalarKind::Norm(t) => combine(TAG_NORM, t.content_hash()),
        TensorScalarKind::Dot(t) => combine(TAG_DOT, t.content_hash()),
        TensorScalarKind::Log(g) => combine(TAG_LOG, g.content_hash()),
        TensorScalarKind::Neg(g) => combine(TAG_NEG, g.content_hash()),
        TensorScalarKind::Pow { base, exp } => {
            ordered(TAG_POW, [base.content_hash(), exp.content_hash()])
        }
        TensorScalarKind::InnerToScalar { lhs, rhs } => {
            commutative(TAG_INNER, [lhs.content_hash(), rhs.content_hash()])
        }
        TensorScalarKind::WithScalarMul { scalar, expr } => ordered(
            TAG_WITH_SCALAR_MUL,
            [scalar.content_hash(), expr.content_hash()],
        ),
        TensorScalarKind::WithScalarDiv { expr, scalar } => ordered(
            TAG_WITH_SCALAR_DIV,
            [expr.content_hash(), scalar.content_hash()],
        ),
        TensorScalarKind::ScalarDivT2s { scalar, expr } => ordered(
            TAG_SCALAR_DIV_T2S,
            [scalar.content_hash(), expr.content_hash()],
        ),
        TensorScalarKind::Add(map) => {
            commutative(TAG_ADD, map.values().map(TensorScalarExpr::content_hash))
        }
        TensorScalarKind::Mul(map) => {
            commutative(TAG_MUL, map.values().map(TensorScalarExpr::content_hash))
        }
    }
}

impl TensorScalarExpr {
    pub(crate) fn from_kind(kind: TensorScalarKind) -> TensorScalarExpr {
        let hash = compute_hash(&kind);
        TensorScalarExpr(Arc::new(TensorScalarNode { kind, hash }))
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The node's structure.
    pub fn kind(&self) -> &TensorScalarKind {
        &self.0.kind
    }

    /// The cached structural hash.
    pub fn content_hash(&self) -> u64 {
        self.0.hash
    }

    /// True when this is the zero reduction.
    pub fn is_zero_expr(&self) -> bool {
        matches!(self.kind(), TensorScalarKind::Zero)
    }

    /// True when this is the unit reduction.
    pub fn is_one_expr(&self) -> bool {
        matches!(self.kind(), TensorScalarKind::One)
    }

    /// The numeric value, if this node is constant.
    pub fn as_constant(&self) -> Option<Number> {
        match self.kind() {
            TensorScalarKind::Zero => Some(Number::Int(0)),
            TensorScalarKind::One => Some(Number::Int(1)),
            TensorScalarKind::ScalarWrapper(s) => s.as_constant(),
            _ => None,
        }
    }

    /// Immediate subexpressions, in deterministic order.
    pub fn children(&self) -> Vec<AnyExpr> {
        match self.kind() {
            TensorScalarKind::Zero | TensorScalarKind::One => Vec::new(),
            TensorScalarKind::ScalarWrapper(s) => vec![AnyExpr::Scalar(s.clone())],
            TensorScalarKind::Trace(t)
            | TensorScalarKind::Det(t)
            | TensorScalarKind::Norm(t)
            | TensorScalarKind::Dot(t) => vec![AnyExpr::Tensor(t.clone())],
            TensorScalarKind::Log(g) | TensorScalarKind::Neg(g) => {
                vec![AnyExpr::TensorScalar(g.clone())]
            }
            TensorScalarKind::Pow { base, exp } => vec![
                AnyExpr::TensorScalar(base.clone()),
                AnyExpr::TensorScalar(exp.clone()),
            ],
            TensorScalarKind::InnerToScalar { lhs, rhs } => {
                vec![AnyExpr::Tensor(lhs.clone()), AnyExpr::Tensor(rhs.clone())]
            }
            TensorScalarKind::WithScalarMul { scalar, expr } => vec![
                AnyExpr::Scalar(scalar.clone()),
                AnyExpr::TensorScalar(expr.clone()),
            ],
            TensorScalarKind::WithScalarDiv { expr, scalar } => vec![
                AnyExpr::TensorScalar(expr.clone()),
                AnyExpr::Scalar(scalar.clone()),
            ],
            TensorScalarKind::ScalarDivT2s { scalar, expr } => vec![
                AnyExpr::Scalar(scalar.clone()),
                AnyExpr::TensorScalar(expr.clone()),
            ],
            TensorScalarKind::Add(map) | TensorScalarKind::Mul(map) => sorted_t2s_terms(map)
                .into_iter()
                .map(|t| AnyExpr::TensorScalar(t.clone()))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Leaf factories
    // -------------------------------------------------------------------------

    /// The zero reduction.
    pub fn zero() -> TensorScalarExpr {
        TensorScalarExpr::from_kind(TensorScalarKind::Zero)
    }

    /// The unit reduction.
    pub fn one() -> TensorScalarExpr {
        TensorScalarExpr::from_kind(TensorScalarKind::One)
    }

    /// Lift a scalar expression into the domain; zero and one normalize
    /// to the dedicated nodes.
    pub fn wrap(scalar: &ScalarExpr) -> TensorScalarExpr {
        if scalar.is_zero_expr() {
            return TensorScalarExpr::zero();
        }
        if scalar.is_one_expr() {
            return TensorScalarExpr::one();
        }
        TensorScalarExpr::from_kind(TensorScalarKind::ScalarWrapper(scalar.clone()))
    }

    /// A numeric constant reduction.
    pub fn constant(value: impl Into<Number>) -> TensorScalarExpr {
        TensorScalarExpr::wrap(&ScalarExpr::constant(value))
    }

    // -------------------------------------------------------------------------
    // Compound factories
    // -------------------------------------------------------------------------

    /// Negation.
    pub fn neg_expr(&self) -> TensorScalarExpr {
        simplify::neg(self)
    }

    /// Sum.
    pub fn add_expr(&self, rhs: &TensorScalarExpr) -> TensorScalarExpr {
        simplify::add(self, rhs)
    }

    /// Difference.
    pub fn sub_expr(&self, rhs: &TensorScalarExpr) -> TensorScalarExpr {
        simplify::add(self, &simplify::neg(rhs))
    }

    /// Product.
    ///
    /// # Errors
    /// Propagates exponent-merge failures.
    pub fn mul_expr(&self, rhs: &TensorScalarExpr) -> Result<TensorScalarExpr, CasError> {
        simplify::mul(self, rhs)
    }

    /// Quotient.
    ///
    /// # Errors
    /// `DivisionByZero` when `rhs` is the zero reduction.
    pub fn div_expr(&self, rhs: &TensorScalarExpr) -> Result<TensorScalarExpr, CasError> {
        simplify::div(self, rhs)
    }

    /// Exponentiation.
    ///
    /// # Errors
    /// `DivisionByZero` for a zero base and negative constant exponent.
    pub fn pow_expr(&self, exp: &TensorScalarExpr) -> Result<TensorScalarExpr, CasError> {
        simplify::pow(self, exp)
    }

    /// Convenience power with an integer exponent.
    ///
    /// # Errors
    /// Same as [`TensorScalarExpr::pow_expr`].
    pub fn powi(&self, exp: i64) -> Result<TensorScalarExpr, CasError> {
        simplify::pow(self, &TensorScalarExpr::constant(exp))
    }

    /// Natural logarithm.
    pub fn log(&self) -> TensorScalarExpr {
        simplify::log(self)
    }

    /// Symbolic scalar coefficient times this reduction.
    pub fn with_scalar_mul(&self, scalar: &ScalarExpr) -> TensorScalarExpr {
        simplify::with_scalar_mul(scalar, self)
    }

    /// Scalar plus this reduction.
    pub fn with_scalar_add(&self, scalar: &ScalarExpr) -> TensorScalarExpr {
        simplify::add(&TensorScalarExpr::wrap(scalar), self)
    }

    /// This reduction divided by a scalar.
    ///
    /// # Errors
    /// `DivisionByZero` for a numeric zero divisor.
    pub fn with_scalar_div(&self, scalar: &ScalarExpr) -> Result<TensorScalarExpr, CasError> {
        simplify::with_scalar_div(self, scalar)
    }

    /// A scalar divided by this reduction.
    ///
    /// # Errors
    /// `DivisionByZero` when this is the zero reduction.
    pub fn scalar_div_t2s(&self, scalar: &ScalarExpr) -> Result<TensorScalarExpr, CasError> {
        simplify::scalar_div_t2s(scalar, self)
    }
}

// =============================================================================
// CANONICAL ORDERING
// =============================================================================

fn kind_class(kind: &TensorScalarKind) -> u8 {
    match kind {
        TensorScalarKind::Zero | TensorScalarKind::One => 0,
        TensorScalarKind::ScalarWrapper(_) => 1,
        _ => 2,
    }
}

pub(crate) fn t2s_cmp(a: &TensorScalarExpr, b: &TensorScalarExpr) -> Ordering {
    let (ca, cb) = (kind_class(a.kind()), kind_class(b.kind()));
    if ca != cb {
        return ca.cmp(&cb);
    }
    a.content_hash().cmp(&b.content_hash())
}

/// Terms of an n-ary container in canonical print order.
pub(crate) fn sorted_t2s_terms(map: &NaryMap<TensorScalarExpr>) -> Vec<&TensorScalarExpr> {
    let mut terms: Vec<&TensorScalarExpr> = map.values().collect();
    terms.sort_by(|a, b| {
        let (_, core_a) = simplify::split_term(a);
        let (_, core_b) = simplify::split_term(b);
        t2s_cmp(&core_a, &core_b)
    });
    terms
}
