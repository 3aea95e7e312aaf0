#![forbid(unsafe_code)]
//! Symbolic Tensor Calculus Library
//!
//! A computer-algebra core for tensor calculus over three coupled
//! expression domains: scalars, tensors, and tensor-to-scalar reductions.
//!
//! # Features
//! - Canonicalizing constructors: every factory runs the domain-aware
//!   simplifier, so handles always refer to canonical forms
//! - Assumption propagation (sign/parity for scalars, symmetry and trace
//!   classes for tensors) with projector elimination
//! - Symbolic differentiation across domains with full index bookkeeping
//! - Exact integer/rational arithmetic with float fallback
//! - Numeric evaluation against dense row-major tensor storage
//!
//! # Usage Examples
//!
//! ## Scalar calculus
//! ```
//! use symtensor::{Differentiate, symb};
//!
//! let x = symb("lib_doc_x");
//! let e = &x * &x + x.sin();
//! let d = e.diff(&x).unwrap();
//! assert_eq!(d.to_string(), "2*lib_doc_x+cos(lib_doc_x)");
//! ```
//!
//! ## Tensor calculus with space assumptions
//! ```
//! use symtensor::{Differentiate, symb_tensor, trace};
//!
//! let c = symb_tensor("lib_doc_C", 3, 2).unwrap();
//! c.assume_symmetric().unwrap();
//! assert_eq!(c.sym().unwrap(), c);
//!
//! // d tr(C)/dC contracts the identity through the symmetric projector
//! let d = trace(&c).unwrap().diff(&c).unwrap();
//! assert_eq!(d.to_string(), "I");
//! ```

mod core;
mod diff;
mod eval;
mod latex;
mod scalar;
mod symbol;
mod tensor;
mod tensor_scalar;

#[cfg(test)]
mod tests;

pub use crate::core::{
    Assumption, AssumptionSet, CasError, EvalError, IndexSeq, NaryMap, Number, Permutation,
};
pub use diff::{Differentiate, diff};
pub use eval::{Bindings, DenseTensor, eval_scalar, eval_t2s, eval_tensor};
pub use latex::LatexConfig;
pub use scalar::{ScalarExpr, ScalarFn, ScalarKind};
pub use symbol::{SymbolId, clear_symbols, symbol_count};
pub use tensor::{
    PermClass, SpaceKind, TensorExpr, TensorKind, TensorSpace, TraceClass,
};
pub use tensor_scalar::{TensorScalarExpr, TensorScalarKind};

// =============================================================================
// DOMAINS
// =============================================================================

/// The three expression domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Scalar-valued expressions.
    Scalar,
    /// Tensor-valued expressions.
    Tensor,
    /// Reductions of tensors to scalars.
    TensorToScalar,
}

/// A handle of any domain, as yielded by `children()`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyExpr {
    /// A scalar subexpression.
    Scalar(ScalarExpr),
    /// A tensor subexpression.
    Tensor(TensorExpr),
    /// A tensor-to-scalar subexpression.
    TensorScalar(TensorScalarExpr),
}

impl AnyExpr {
    /// The domain of the wrapped handle.
    pub fn domain(&self) -> Domain {
        match self {
            AnyExpr::Scalar(_) => Domain::Scalar,
            AnyExpr::Tensor(_) => Domain::Tensor,
            AnyExpr::TensorScalar(_) => Domain::TensorToScalar,
        }
    }

    /// The wrapped handle's structural hash.
    pub fn content_hash(&self) -> u64 {
        match self {
            AnyExpr::Scalar(e) => e.content_hash(),
            AnyExpr::Tensor(e) => e.content_hash(),
            AnyExpr::TensorScalar(e) => e.content_hash(),
        }
    }
}

impl std::fmt::Display for AnyExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnyExpr::Scalar(e) => write!(f, "{e}"),
            AnyExpr::Tensor(e) => write!(f, "{e}"),
            AnyExpr::TensorScalar(e) => write!(f, "{e}"),
        }
    }
}

impl ScalarExpr {
    /// The domain of this handle.
    pub fn domain(&self) -> Domain {
        Domain::Scalar
    }
}

impl TensorExpr {
    /// The domain of this handle.
    pub fn domain(&self) -> Domain {
        Domain::Tensor
    }
}

impl TensorScalarExpr {
    /// The domain of this handle.
    pub fn domain(&self) -> Domain {
        Domain::TensorToScalar
    }
}

// =============================================================================
// FACTORY FUNCTIONS
// =============================================================================

/// The interned scalar symbol with the given name.
#[must_use]
pub fn symb(name: &str) -> ScalarExpr {
    ScalarExpr::symbol(name)
}

/// The interned tensor symbol with the given name, dimension and rank.
///
/// # Errors
/// `ShapeMismatch` when the name is already registered with a different
/// shape.
pub fn symb_tensor(name: &str, dim: usize, rank: usize) -> Result<TensorExpr, CasError> {
    TensorExpr::symbol(name, dim, rank)
}

/// A numeric scalar constant.
#[must_use]
pub fn constant(value: impl Into<Number>) -> ScalarExpr {
    ScalarExpr::constant(value)
}

/// The scalar zero.
#[must_use]
pub fn zero() -> ScalarExpr {
    ScalarExpr::zero()
}

/// The scalar one.
#[must_use]
pub fn one() -> ScalarExpr {
    ScalarExpr::one()
}

/// Scalar power.
///
/// # Errors
/// `DivisionByZero` for a zero base and a negative constant exponent.
pub fn pow(base: &ScalarExpr, exp: &ScalarExpr) -> Result<ScalarExpr, CasError> {
    base.pow_expr(exp)
}

macro_rules! free_scalar_fns {
    ($(($name:ident, $doc:literal)),* $(,)?) => {
        $(
            #[doc = $doc]
            #[must_use]
            pub fn $name(arg: &ScalarExpr) -> ScalarExpr {
                arg.$name()
            }
        )*
    };
}

free_scalar_fns![
    (sin, "Sine."),
    (cos, "Cosine."),
    (tan, "Tangent."),
    (asin, "Inverse sine."),
    (acos, "Inverse cosine."),
    (atan, "Inverse tangent."),
    (exp, "Natural exponential."),
    (log, "Natural logarithm."),
    (sqrt, "Square root."),
    (sign, "Sign function."),
    (abs, "Absolute value."),
];

// -----------------------------------------------------------------------------
// Tensor operations
// -----------------------------------------------------------------------------

/// Symmetric part of a rank-2 tensor.
///
/// # Errors
/// `NotImplemented` for non-rank-2 operands.
pub fn sym(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.sym()
}

/// Skew part of a rank-2 tensor.
///
/// # Errors
/// `NotImplemented` for non-rank-2 operands.
pub fn skew(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.skew()
}

/// Volumetric part of a rank-2 tensor.
///
/// # Errors
/// `NotImplemented` for non-rank-2 operands.
pub fn vol(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.vol()
}

/// Deviatoric part of a rank-2 tensor.
///
/// # Errors
/// `NotImplemented` for non-rank-2 operands.
pub fn dev(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.dev()
}

/// Matrix inverse.
///
/// # Errors
/// `NotImplemented` for non-rank-2 operands, `DivisionByZero` for the
/// zero tensor.
pub fn inv(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.inv()
}

/// Transpose of a rank-2 tensor.
///
/// # Errors
/// `IndexError` for non-rank-2 operands.
pub fn trans(t: &TensorExpr) -> Result<TensorExpr, CasError> {
    t.trans()
}

/// The symmetric projector `P_sym`.
#[must_use]
pub fn projector_sym(dim: usize) -> TensorExpr {
    TensorExpr::projector(SpaceKind::Sym, dim)
}

/// The skew projector `P_skew`.
#[must_use]
pub fn projector_skew(dim: usize) -> TensorExpr {
    TensorExpr::projector(SpaceKind::Skew, dim)
}

/// The volumetric projector `P_vol`.
#[must_use]
pub fn projector_vol(dim: usize) -> TensorExpr {
    TensorExpr::projector(SpaceKind::Vol, dim)
}

/// The deviatoric projector `P_dev`.
#[must_use]
pub fn projector_dev(dim: usize) -> TensorExpr {
    TensorExpr::projector(SpaceKind::Dev, dim)
}

/// The Kronecker delta.
#[must_use]
pub fn kronecker_delta(dim: usize) -> TensorExpr {
    TensorExpr::delta(dim)
}

/// The even-rank identity tensor.
///
/// # Errors
/// `InvalidExpression` for odd or zero rank.
pub fn identity_tensor(dim: usize, rank: usize) -> Result<TensorExpr, CasError> {
    TensorExpr::identity(dim, rank)
}

/// The zero tensor.
#[must_use]
pub fn tensor_zero(dim: usize, rank: usize) -> TensorExpr {
    TensorExpr::zero(dim, rank)
}

/// Contraction of matching index sequences on two tensors.
///
/// # Errors
/// `ShapeMismatch` on differing dimensions, `IndexError` on invalid
/// sequences.
pub fn inner_product(
    lhs: &TensorExpr,
    lhs_idx: impl Into<IndexSeq>,
    rhs: &TensorExpr,
    rhs_idx: impl Into<IndexSeq>,
) -> Result<TensorExpr, CasError> {
    lhs.inner_product(lhs_idx, rhs, rhs_idx)
}

/// Tensor product with explicit result-index placement.
///
/// # Errors
/// `ShapeMismatch` on differing dimensions, `IndexError` when the
/// position sequences do not cover the result indices.
pub fn outer_product(
    lhs: &TensorExpr,
    lhs_pos: impl Into<IndexSeq>,
    rhs: &TensorExpr,
    rhs_pos: impl Into<IndexSeq>,
) -> Result<TensorExpr, CasError> {
    lhs.outer_product(lhs_pos, rhs, rhs_pos)
}

/// Plain tensor product with concatenated indices.
///
/// # Errors
/// `ShapeMismatch` on differing dimensions.
pub fn otimes(lhs: &TensorExpr, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
    lhs.otimes(rhs)
}

/// The interleaved tensor product `otimesu(a, b)[i,j,k,l] = a[i,k]*b[j,l]`
/// of two rank-2 tensors.
///
/// # Errors
/// `ShapeMismatch` on differing dimensions, `IndexError` for non-rank-2
/// operands.
pub fn otimesu(lhs: &TensorExpr, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
    tensor::contract::otimesu(lhs, rhs)
}

/// Index permutation of a tensor.
///
/// # Errors
/// `IndexError` when the permutation length differs from the rank.
pub fn basis_change(t: &TensorExpr, perm: &Permutation) -> Result<TensorExpr, CasError> {
    t.basis_change(perm)
}

// -----------------------------------------------------------------------------
// Tensor-to-scalar reductions
// -----------------------------------------------------------------------------

/// Trace of a rank-2 tensor.
///
/// # Errors
/// `ShapeMismatch` for other ranks.
pub fn trace(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    tensor_scalar::simplify::trace(t)
}

/// Determinant of a rank-2 tensor.
///
/// # Errors
/// `ShapeMismatch` for other ranks.
pub fn det(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    tensor_scalar::simplify::det(t)
}

/// Frobenius norm of a tensor.
///
/// # Errors
/// Currently none; fallible for uniformity with the other reductions.
pub fn norm(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    tensor_scalar::simplify::norm(t)
}

/// Full self-contraction `t : t`.
///
/// # Errors
/// Currently none; fallible for uniformity with the other reductions.
pub fn dot(t: &TensorExpr) -> Result<TensorScalarExpr, CasError> {
    tensor_scalar::simplify::dot(t)
}

/// Full contraction of two same-shape tensors.
///
/// # Errors
/// `ShapeMismatch` when the shapes differ.
pub fn dot_product(
    lhs: &TensorExpr,
    rhs: &TensorExpr,
) -> Result<TensorScalarExpr, CasError> {
    tensor_scalar::simplify::inner_to_scalar(lhs, rhs)
}
