//! Tensor expression domain.
//!
//! Every tensor node carries its spatial dimension and rank as invariants,
//! computed from the children at construction time. Binary operators
//! require matching dimensions; contractions recompute the rank from the
//! free-index counts.
//!
//! # Example
//! ```
//! use symtensor::TensorExpr;
//!
//! let x = TensorExpr::symbol("doc_tensor_X", 3, 2).unwrap();
//! let e = (x.clone() * x.clone()).to_string();
//! assert_eq!(e, "pow(doc_tensor_X,2)");
//! ```

pub(crate) mod assume;
pub(crate) mod contract;
pub(crate) mod diff;
mod display;
mod ops;
pub(crate) mod simplify;
pub(crate) mod space;

use std::cmp::Ordering;
use std::sync::Arc;

use crate::AnyExpr;
use crate::core::assumptions::AssumptionCell;
use crate::core::error::CasError;
use crate::core::hash::{combine, commutative, hash_one, ordered};
use crate::core::index::{IndexSeq, Permutation};
use crate::core::nary::NaryMap;
use crate::scalar::ScalarExpr;
use crate::symbol::{self, SymbolId};
use crate::tensor_scalar::TensorScalarExpr;

pub use space::{PermClass, SpaceKind, TensorSpace, TraceClass};

// =============================================================================
// KINDS
// =============================================================================

/// The structure of a tensor expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorKind {
    /// A named tensor symbol.
    Symbol {
        /// Interned identity.
        id: SymbolId,
        /// Spatial dimension.
        dim: usize,
        /// Number of free indices.
        rank: usize,
    },
    /// The zero tensor of a given shape.
    Zero {
        /// Spatial dimension.
        dim: usize,
        /// Number of free indices.
        rank: usize,
    },
    /// The Kronecker delta (rank 2).
    Delta {
        /// Spatial dimension.
        dim: usize,
    },
    /// The even-rank identity tensor (products of Kronecker deltas).
    Identity {
        /// Spatial dimension.
        dim: usize,
        /// Number of free indices (even, at least 4; rank 2 normalizes to
        /// `Delta`).
        rank: usize,
    },
    /// A rank-4 projector onto one of the four canonical subspaces.
    Projector {
        /// Which subspace.
        space: SpaceKind,
        /// Spatial dimension.
        dim: usize,
    },
    /// Negation.
    Neg(TensorExpr),
    /// Matrix inverse (rank 2).
    Inv(TensorExpr),
    /// Matrix power with a scalar exponent (rank 2).
    Pow {
        /// The base tensor.
        base: TensorExpr,
        /// The scalar exponent.
        exp: ScalarExpr,
    },
    /// Index permutation; `[2,1]` on rank 2 is the transpose.
    BasisChange {
        /// The operand.
        expr: TensorExpr,
        /// The 1-based index permutation.
        perm: Permutation,
    },
    /// Symmetrization over a set of index permutations.
    Symmetry {
        /// The operand.
        expr: TensorExpr,
        /// The permutations averaged over.
        perms: Vec<Permutation>,
    },
    /// One of the functional forms `sym`, `skew`, `vol`, `dev` (rank 2).
    Part {
        /// Which part.
        space: SpaceKind,
        /// The operand.
        expr: TensorExpr,
    },
    /// Contraction of matching index sequences on two tensors.
    Inner {
        /// Left operand.
        lhs: TensorExpr,
        /// 1-based contraction positions on the left operand.
        lhs_idx: IndexSeq,
        /// Right operand.
        rhs: TensorExpr,
        /// 1-based contraction positions on the right operand.
        rhs_idx: IndexSeq,
    },
    /// Tensor product with explicit result-index placement.
    Outer {
        /// Left operand.
        lhs: TensorExpr,
        /// Result positions of the left operand's indices.
        lhs_pos: IndexSeq,
        /// Right operand.
        rhs: TensorExpr,
        /// Result positions of the right operand's indices.
        rhs_pos: IndexSeq,
    },
    /// Scalar coefficient times tensor.
    ScalarMul {
        /// The scalar coefficient.
        coeff: ScalarExpr,
        /// The tensor operand.
        expr: TensorExpr,
    },
    /// Tensor divided by a scalar.
    ScalarDiv {
        /// The tensor operand.
        expr: TensorExpr,
        /// The scalar divisor.
        coeff: ScalarExpr,
    },
    /// Tensor-to-scalar field times tensor (e.g. `det(Y) * inv(Y)`).
    FieldMul {
        /// The tensor-to-scalar coefficient.
        field: TensorScalarExpr,
        /// The tensor operand.
        expr: TensorExpr,
    },
    /// Tensor divided by a tensor-to-scalar field (e.g. `Y / norm(Y)`).
    FieldDiv {
        /// The tensor operand.
        expr: TensorExpr,
        /// The tensor-to-scalar divisor.
        field: TensorScalarExpr,
    },
    /// N-ary sum of same-shape tensors.
    Add(NaryMap<TensorExpr>),
    /// Ordered matrix product of rank-2 tensors.
    Mul(Vec<TensorExpr>),
    /// N-ary outer product with concatenated indices.
    SimpleOuter(Vec<TensorExpr>),
}

// =============================================================================
// NODE AND HANDLE
// =============================================================================

#[derive(Debug)]
pub(crate) struct TensorNode {
    kind: TensorKind,
    dim: usize,
    rank: usize,
    hash: u64,
    pub(crate) space: AssumptionCell<TensorSpace>,
}

/// Handle to an immutable tensor expression node.
#[derive(Debug, Clone)]
pub struct TensorExpr(Arc<TensorNode>);

impl PartialEq for TensorExpr {
    fn eq(&self, other: &Self) -> bool {
        if self.0.hash != other.0.hash {
            return false;
        }
        self.0.kind == other.0.kind
    }
}

impl std::hash::Hash for TensorExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash);
    }
}

const TAG_SYMBOL: u64 = 0x0201;
const TAG_ZERO: u64 = 0x0202;
const TAG_DELTA: u64 = 0x0203;
const TAG_IDENTITY: u64 = 0x0204;
const TAG_PROJECTOR: u64 = 0x0205;
const TAG_NEG: u64 = 0x0206;
const TAG_INV: u64 = 0x0207;
const TAG_POW: u64 = 0x0208;
const TAG_BASIS_CHANGE: u64 = 0x0209;
const TAG_SYMMETRY: u64 = 0x020a;
const TAG_PART: u64 = 0x020b;
const TAG_INNER: u64 = 0x020c;
const TAG_OUTER: u64 = 0x020d;
const TAG_SCALAR_MUL: u64 = 0x020e;
const TAG_SCALAR_DIV: u64 = 0x020f;
const TAG_FIELD_MUL: u64 = 0x0210;
const TAG_FIELD_DIV: u64 = 0x0211;
const TAG_ADD: u64 = 0x0212;
const TAG_MUL: u64 = 0x0213;
const TAG_SIMPLE_OUTER: u64 = 0x0214;

fn space_tag(space: SpaceKind) -> u64 {
    match space {
        SpaceKind::Sym => 1,
        SpaceKind::Skew => 2,
        SpaceKind::Vol => 3,
        SpaceKind::Dev => 4,
    }
}

fn compute_hash(kind: &TensorKind) -> u64 {
    match kind {
        TensorKind::Symbol { id, dim, rank } => ordered(
            TAG_SYMBOL,
            [hash_one(&id.name()), *dim as u64, *rank as u64],
        ),
        TensorKind::Zero { dim, rank } => ordered(TAG_ZERO, [*dim as u64, *rank as u64]),
        TensorKind::Delta { dim } => combine(TAG_DELTA, *dim as u64),
        TensorKind::Identity { dim, rank } => {
            ordered(TAG_IDENTITY, [*dim as u64, *rank as u64])
        }
        TensorKind::Projector { space, dim } => {
            ordered(TAG_PROJECTOR, [space_tag(*space), *dim as u64])
        }
        TensorKind::Neg(x) => combine(TAG_NEG, x.content_hash()),
        TensorKind::Inv(x) => combine(TAG_INV, x.content_hash()),
        TensorKind::Pow { base, exp } => {
            ordered(TAG_POW, [base.content_hash(), exp.content_hash()])
        }
        TensorKind::BasisChange { expr, perm } => {
            ordered(TAG_BASIS_CHANGE, [expr.content_hash(), perm.content_hash()])
        }
        TensorKind::Symmetry { expr, perms } => {
            let perm_hash = ordered(0, perms.iter().map(Permutation::content_hash));
            ordered(TAG_SYMMETRY, [expr.content_hash(), perm_hash])
        }
        TensorKind::Part { space, expr } => {
            ordered(TAG_PART, [space_tag(*space), expr.content_hash()])
        }
        TensorKind::Inner {
            lhs,
            lhs_idx,
            rhs,
            rhs_idx,
        } => ordered(
            TAG_INNER,
            [
                lhs.content_hash(),
                lhs_idx.content_hash(),
                rhs.content_hash(),
                rhs_idx.content_hash(),
            ],
        ),
        TensorKind::Outer {
            lhs,
            lhs_pos,
            rhs,
            rhs_pos,
        } => ordered(
            TAG_OUTER,
            [
                lhs.content_hash(),
                lhs_pos.content_hash(),
                rhs.content_hash(),
                rhs_pos.content_hash(),
            ],
        ),
        TensorKind::ScalarMul { coeff, expr } => ordered(
            TAG_SCALAR_MUL,
            [coeff.content_hash(), expr.content_hash()],
        ),
        TensorKind::ScalarDiv { expr, coeff } => ordered(
            TAG_SCALAR_DIV,
            [expr.content_hash(), coeff.content_hash()],
        ),
        TensorKind::FieldMul { field, expr } => ordered(
            TAG_FIELD_MUL,
            [field.content_hash(), expr.content_hash()],
        ),
        TensorKind::FieldDiv { expr, field } => ordered(
            TAG_FIELD_DIV,
            [expr.content_hash(), field.content_hash()],
        ),
        TensorKind::Add(map) => {
            commutative(TAG_ADD, map.values().map(TensorExpr::content_hash))
        }
        TensorKind::Mul(factors) => {
            ordered(TAG_MUL, factors.iter().map(TensorExpr::content_hash))
        }
        TensorKind::SimpleOuter(factors) => {
            commutative(TAG_SIMPLE_OUTER, factors.iter().map(TensorExpr::content_hash))
        }
    }
}

impl TensorExpr {
    pub(crate) fn from_kind(kind: TensorKind, dim: usize, rank: usize) -> TensorExpr {
        let hash = compute_hash(&kind);
        TensorExpr(Arc::new(TensorNode {
            kind,
            dim,
            rank,
            hash,
            space: AssumptionCell::new(),
        }))
    }

    pub(crate) fn from_symbol(id: SymbolId, dim: usize, rank: usize) -> TensorExpr {
        TensorExpr::from_kind(TensorKind::Symbol { id, dim, rank }, dim, rank)
    }

    pub(crate) fn node(&self) -> &TensorNode {
        &self.0
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// The node's structure.
    pub fn kind(&self) -> &TensorKind {
        &self.0.kind
    }

    /// The cached structural hash.
    pub fn content_hash(&self) -> u64 {
        self.0.hash
    }

    /// Spatial dimension.
    pub fn dim(&self) -> usize {
        self.0.dim
    }

    /// Number of free indices.
    pub fn rank(&self) -> usize {
        self.0.rank
    }

    /// (dim, rank) pair.
    pub fn shape(&self) -> (usize, usize) {
        (self.0.dim, self.0.rank)
    }

    /// True when this is a zero tensor.
    pub fn is_zero_expr(&self) -> bool {
        matches!(self.kind(), TensorKind::Zero { .. })
    }

    pub(crate) fn as_symbol(&self) -> Option<&SymbolId> {
        match self.kind() {
            TensorKind::Symbol { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Immediate subexpressions, in deterministic order.
    pub fn children(&self) -> Vec<AnyExpr> {
        match self.kind() {
            TensorKind::Symbol { .. }
            | TensorKind::Zero { .. }
            | TensorKind::Delta { .. }
            | TensorKind::Identity { .. }
            | TensorKind::Projector { .. } => Vec::new(),
            TensorKind::Neg(x)
            | TensorKind::Inv(x)
            | TensorKind::BasisChange { expr: x, .. }
            | TensorKind::Symmetry { expr: x, .. }
            | TensorKind::Part { expr: x, .. } => vec![AnyExpr::Tensor(x.clone())],
            TensorKind::Pow { base, exp } => vec![
                AnyExpr::Tensor(base.clone()),
                AnyExpr::Scalar(exp.clone()),
            ],
            TensorKind::Inner { lhs, rhs, .. } | TensorKind::Outer { lhs, rhs, .. } => {
                vec![AnyExpr::Tensor(lhs.clone()), AnyExpr::Tensor(rhs.clone())]
            }
            TensorKind::ScalarMul { coeff, expr } => vec![
                AnyExpr::Scalar(coeff.clone()),
                AnyExpr::Tensor(expr.clone()),
            ],
            TensorKind::ScalarDiv { expr, coeff } => vec![
                AnyExpr::Tensor(expr.clone()),
                AnyExpr::Scalar(coeff.clone()),
            ],
            TensorKind::FieldMul { field, expr } => vec![
                AnyExpr::TensorScalar(field.clone()),
                AnyExpr::Tensor(expr.clone()),
            ],
            TensorKind::FieldDiv { expr, field } => vec![
                AnyExpr::Tensor(expr.clone()),
                AnyExpr::TensorScalar(field.clone()),
            ],
            TensorKind::Add(map) => sorted_tensor_terms(map)
                .into_iter()
                .map(|t| AnyExpr::Tensor(t.clone()))
                .collect(),
            TensorKind::Mul(factors) | TensorKind::SimpleOuter(factors) => factors
                .iter()
                .map(|t| AnyExpr::Tensor(t.clone()))
                .collect(),
        }
    }

    // -------------------------------------------------------------------------
    // Leaf factories
    // -------------------------------------------------------------------------

    /// The interned tensor symbol with the given name and shape.
    ///
    /// # Errors
    /// `InvalidExpression` for dimension zero; `ShapeMismatch` when the
    /// name is already registered with a different shape.
    pub fn symbol(name: &str, dim: usize, rank: usize) -> Result<TensorExpr, CasError> {
        if dim == 0 {
            return Err(CasError::InvalidExpression {
                detail: format!("tensor symbol '{name}' requires dim >= 1"),
            });
        }
        symbol::intern_tensor(name, dim, rank)
    }

    /// The zero tensor of a given shape.
    pub fn zero(dim: usize, rank: usize) -> TensorExpr {
        TensorExpr::from_kind(TensorKind::Zero { dim, rank }, dim, rank)
    }

    /// The Kronecker delta (rank 2).
    pub fn delta(dim: usize) -> TensorExpr {
        TensorExpr::from_kind(TensorKind::Delta { dim }, dim, 2)
    }

    /// The identity tensor of even rank; rank 2 is the Kronecker delta.
    ///
    /// # Errors
    /// `InvalidExpression` for odd or zero rank.
    pub fn identity(dim: usize, rank: usize) -> Result<TensorExpr, CasError> {
        if rank == 0 || rank % 2 != 0 {
            return Err(CasError::InvalidExpression {
                detail: format!("identity tensor requires even rank >= 2, got {rank}"),
            });
        }
        if rank == 2 {
            return Ok(TensorExpr::delta(dim));
        }
        Ok(TensorExpr::from_kind(
            TensorKind::Identity { dim, rank },
            dim,
            rank,
        ))
    }

    /// A rank-4 projector onto one of the canonical subspaces.
    pub fn projector(space: SpaceKind, dim: usize) -> TensorExpr {
        TensorExpr::from_kind(TensorKind::Projector { space, dim }, dim, 4)
    }

    // -------------------------------------------------------------------------
    // Compound factories (all run the simplifier)
    // -------------------------------------------------------------------------

    /// Negation.
    pub fn neg_expr(&self) -> TensorExpr {
        simplify::neg(self)
    }

    /// Sum.
    ///
    /// # Errors
    /// `ShapeMismatch` unless both operands share (dim, rank).
    pub fn add_expr(&self, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
        simplify::add(self, rhs)
    }

    /// Difference.
    ///
    /// # Errors
    /// `ShapeMismatch` unless both operands share (dim, rank).
    pub fn sub_expr(&self, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
        simplify::add(self, &simplify::neg(rhs))
    }

    /// Matrix product (rank-2 operands).
    ///
    /// # Errors
    /// `ShapeMismatch` on differing dimensions, `NotImplemented` for
    /// operands that are not rank 2.
    pub fn mul_expr(&self, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
        simplify::mul(self, rhs)
    }

    /// Scalar times tensor.
    ///
    /// # Errors
    /// Propagates scalar simplification failures.
    pub fn scalar_mul(&self, coeff: &ScalarExpr) -> Result<TensorExpr, CasError> {
        simplify::scalar_mul(coeff, self)
    }

    /// Tensor divided by scalar.
    ///
    /// # Errors
    /// `DivisionByZero` when the divisor is the numeric zero.
    pub fn scalar_div(&self, coeff: &ScalarExpr) -> Result<TensorExpr, CasError> {
        simplify::scalar_div(self, coeff)
    }

    /// Tensor-to-scalar field times tensor.
    ///
    /// # Errors
    /// Propagates field simplification failures.
    pub fn field_mul(&self, field: &TensorScalarExpr) -> Result<TensorExpr, CasError> {
        simplify::field_mul(field, self)
    }

    /// Tensor divided by a tensor-to-scalar field.
    ///
    /// # Errors
    /// `DivisionByZero` when the field is the zero reduction.
    pub fn field_div(&self, field: &TensorScalarExpr) -> Result<TensorExpr, CasError> {
        simplify::field_div(self, field)
    }

    /// Matrix power with a scalar exponent.
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 bases.
    pub fn pow_expr(&self, exp: &ScalarExpr) -> Result<TensorExpr, CasError> {
        simplify::pow(self, exp)
    }

    /// Convenience power with an integer exponent.
    ///
    /// # Errors
    /// Same as [`TensorExpr::pow_expr`].
    pub fn powi(&self, exp: i64) -> Result<TensorExpr, CasError> {
        simplify::pow(self, &ScalarExpr::constant(exp))
    }

    /// Matrix inverse.
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 operands, `DivisionByZero` for the
    /// zero tensor.
    pub fn inv(&self) -> Result<TensorExpr, CasError> {
        simplify::inv(self)
    }

    /// Index permutation.
    ///
    /// # Errors
    /// `IndexError` when the permutation length differs from the rank.
    pub fn basis_change(&self, perm: &Permutation) -> Result<TensorExpr, CasError> {
        contract::basis_change(self, perm)
    }

    /// Transpose (rank 2).
    ///
    /// # Errors
    /// `IndexError` for non-rank-2 operands.
    pub fn trans(&self) -> Result<TensorExpr, CasError> {
        contract::basis_change(self, &Permutation::transpose())
    }

    /// Symmetrization over a set of permutations.
    ///
    /// # Errors
    /// `IndexError` when a permutation length differs from the rank.
    pub fn symmetry(&self, perms: Vec<Permutation>) -> Result<TensorExpr, CasError> {
        contract::symmetry(self, perms)
    }

    /// Symmetric part (rank 2).
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 operands.
    pub fn sym(&self) -> Result<TensorExpr, CasError> {
        simplify::part(SpaceKind::Sym, self)
    }

    /// Skew part (rank 2).
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 operands.
    pub fn skew(&self) -> Result<TensorExpr, CasError> {
        simplify::part(SpaceKind::Skew, self)
    }

    /// Volumetric part (rank 2).
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 operands.
    pub fn vol(&self) -> Result<TensorExpr, CasError> {
        simplify::part(SpaceKind::Vol, self)
    }

    /// Deviatoric part (rank 2).
    ///
    /// # Errors
    /// `NotImplemented` for non-rank-2 operands.
    pub fn dev(&self) -> Result<TensorExpr, CasError> {
        simplify::part(SpaceKind::Dev, self)
    }

    /// Contraction of matching index sequences.
    ///
    /// # Errors
    /// `ShapeMismatch` on differing dimensions, `IndexError` on invalid
    /// sequences.
    pub fn inner_product(
        &self,
        lhs_idx: impl Into<IndexSeq>,
        rhs: &TensorExpr,
        rhs_idx: impl Into<IndexSeq>,
    ) -> Result<TensorExpr, CasError> {
        contract::inner_product(self, &lhs_idx.into(), rhs, &rhs_idx.into())
    }

    /// Tensor product with explicit index placement.
    ///
    /// # Errors
    /// `ShapeMismatch` on differing dimensions, `IndexError` when the
    /// position sequences do not cover the result indices.
    pub fn outer_product(
        &self,
        lhs_pos: impl Into<IndexSeq>,
        rhs: &TensorExpr,
        rhs_pos: impl Into<IndexSeq>,
    ) -> Result<TensorExpr, CasError> {
        contract::outer_product(self, &lhs_pos.into(), rhs, &rhs_pos.into())
    }

    /// Plain tensor product with concatenated indices.
    ///
    /// # Errors
    /// `ShapeMismatch` on differing dimensions.
    pub fn otimes(&self, rhs: &TensorExpr) -> Result<TensorExpr, CasError> {
        contract::simple_outer(vec![self.clone(), rhs.clone()])
    }

    /// Replace a tensor symbol with a same-shape tensor expression.
    ///
    /// # Errors
    /// `InvalidExpression` when `from` is not a symbol, `ShapeMismatch`
    /// when the replacement's shape differs.
    pub fn substitute(
        &self,
        from: &TensorExpr,
        to: &TensorExpr,
    ) -> Result<TensorExpr, CasError> {
        simplify::substitute(self, from, to)
    }
}

// =============================================================================
// CANONICAL ORDERING
// =============================================================================

fn kind_class(kind: &TensorKind) -> u8 {
    match kind {
        TensorKind::Zero { .. } => 0,
        TensorKind::Delta { .. } | TensorKind::Identity { .. } => 1,
        TensorKind::Projector { .. } => 2,
        TensorKind::Symbol { .. } => 3,
        _ => 4,
    }
}

/// Deterministic ordering for printing sums: constants first, then
/// symbols alphabetically, compound terms by hash.
pub(crate) fn tensor_cmp(a: &TensorExpr, b: &TensorExpr) -> Ordering {
    let (ca, cb) = (kind_class(a.kind()), kind_class(b.kind()));
    if ca != cb {
        return ca.cmp(&cb);
    }
    match (a.kind(), b.kind()) {
        (TensorKind::Symbol { id: x, .. }, TensorKind::Symbol { id: y, .. }) => x.cmp(y),
        (
            TensorKind::Projector { space: x, .. },
            TensorKind::Projector { space: y, .. },
        ) => space_tag(*x).cmp(&space_tag(*y)),
        _ => a.content_hash().cmp(&b.content_hash()),
    }
}

/// Terms of a tensor sum in canonical print order, sorted by the
/// coefficient-stripped core.
pub(crate) fn sorted_tensor_terms(map: &NaryMap<TensorExpr>) -> Vec<&TensorExpr> {
    let mut terms: Vec<&TensorExpr> = map.values().collect();
    terms.sort_by(|a, b| {
        let (_, core_a) = simplify::split_term(a);
        let (_, core_b) = simplify::split_term(b);
        tensor_cmp(&core_a, &core_b)
    });
    terms
}
