//! Inner products, outer products and basis changes.
//!
//! The simplification here follows a two-level dispatch: the left
//! operand's kind selects a rule family, the right operand's kind selects
//! the rule, and a fallback builds the plain node. Delta absorption,
//! identity absorption and projector elimination keep derivative output
//! free of administrative contractions.

use crate::core::error::CasError;
use crate::core::index::{IndexSeq, Permutation};
use crate::tensor::simplify;
use crate::tensor::space::SpaceKind;
use crate::tensor::{TensorExpr, TensorKind};

/// Contraction of matching index sequences on two tensors. The result
/// rank is `rank_lhs + rank_rhs - 2 * |seq|`; free indices of the left
/// operand come first.
pub(crate) fn inner_product(
    lhs: &TensorExpr,
    lhs_idx: &IndexSeq,
    rhs: &TensorExpr,
    rhs_idx: &IndexSeq,
) -> Result<TensorExpr, CasError> {
    if lhs.dim() != rhs.dim() {
        return Err(CasError::shape("inner product", lhs.shape(), rhs.shape()));
    }
    if lhs_idx.len() != rhs_idx.len() {
        return Err(CasError::index(
            "inner product",
            format!(
                "sequence lengths differ: {} vs {}",
                lhs_idx.len(),
                rhs_idx.len()
            ),
        ));
    }
    lhs_idx.validate(lhs.rank(), "inner product")?;
    rhs_idx.validate(rhs.rank(), "inner product")?;

    let dim = lhs.dim();
    let rank = lhs.rank() + rhs.rank() - 2 * lhs_idx.len();

    if lhs.is_zero_expr() || rhs.is_zero_expr() {
        return Ok(TensorExpr::zero(dim, rank));
    }

    // Delta absorption: contracting one index with the Kronecker delta is
    // an index renaming that preserves free-index order.
    if matches!(lhs.kind(), TensorKind::Delta { .. })
        && (lhs_idx.as_slice() == [2] || lhs_idx.as_slice() == [1])
        && rhs_idx.as_slice() == [1]
    {
        return Ok(rhs.clone());
    }
    if matches!(rhs.kind(), TensorKind::Delta { .. })
        && lhs_idx.as_slice() == [lhs.rank()]
        && (rhs_idx.as_slice() == [1] || rhs_idx.as_slice() == [2])
    {
        return Ok(lhs.clone());
    }

    // Identity absorption: a fully contracted operand passes through the
    // identity tensor unchanged.
    if let TensorKind::Identity { rank: id_rank, .. } = rhs.kind() {
        let half = id_rank / 2;
        if lhs.rank() == half
            && lhs_idx.is_leading(half)
            && (rhs_idx.is_leading(half) || rhs_idx.is_consecutive_from(half + 1, half))
        {
            return Ok(lhs.clone());
        }
    }
    if let TensorKind::Identity { rank: id_rank, .. } = lhs.kind() {
        let half = id_rank / 2;
        if rhs.rank() == half
            && rhs_idx.is_leading(half)
            && (lhs_idx.is_leading(half) || lhs_idx.is_consecutive_from(half + 1, half))
        {
            return Ok(rhs.clone());
        }
    }

    // Projector algebra: P_a : P_b composes or vanishes.
    if let (
        TensorKind::Projector { space: a, .. },
        TensorKind::Projector { space: b, .. },
    ) = (lhs.kind(), rhs.kind())
        && lhs_idx.as_slice() == [3, 4]
        && rhs_idx.as_slice() == [1, 2]
    {
        return compose_projectors(*a, *b, dim);
    }

    // Projector elimination: P : x collapses to the functional form,
    // which in turn checks the operand's space assumptions.
    if let TensorKind::Projector { space, .. } = lhs.kind()
        && rhs.rank() == 2
        && rhs_idx.is_leading(2)
        && (lhs_idx.as_slice() == [3, 4] || lhs_idx.as_slice() == [1, 2])
    {
        return simplify::part(*space, rhs);
    }
    // Reversed normalization: x:{1,2} P:{1,2} and x:{1,2} P:{3,4} mean the
    // same contraction by the projectors' pair symmetry.
    if let TensorKind::Projector { space, .. } = rhs.kind()
        && lhs.rank() == 2
        && lhs_idx.is_leading(2)
        && (rhs_idx.as_slice() == [1, 2] || rhs_idx.as_slice() == [3, 4])
    {
        return simplify::part(*space, lhs);
    }

    Ok(TensorExpr::from_kind(
        TensorKind::Inner {
            lhs: lhs.clone(),
            lhs_idx: lhs_idx.clone(),
            rhs: rhs.clone(),
            rhs_idx: rhs_idx.clone(),
        },
        dim,
        rank,
    ))
}

/// `P_a : P_b` from the projector composition table; orthogonal pairs
/// contract to the zero tensor.
fn compose_projectors(
    a: SpaceKind,
    b: SpaceKind,
    dim: usize,
) -> Result<TensorExpr, CasError> {
    match a.compose(b) {
        Some(space) => Ok(TensorExpr::projector(space, dim)),
        None => Ok(TensorExpr::zero(dim, 4)),
    }
}

/// Tensor product with explicit result-index placement: `lhs_pos[i]` is
/// the result position of the left operand's i-th index.
pub(crate) fn outer_product(
    lhs: &TensorExpr,
    lhs_pos: &IndexSeq,
    rhs: &TensorExpr,
    rhs_pos: &IndexSeq,
) -> Result<TensorExpr, CasError> {
    if lhs.dim() != rhs.dim() {
        return Err(CasError::shape("outer product", lhs.shape(), rhs.shape()));
    }
    let rank = lhs.rank() + rhs.rank();
    if lhs_pos.len() != lhs.rank() || rhs_pos.len() != rhs.rank() {
        return Err(CasError::index(
            "outer product",
            format!(
                "position sequences must cover the operand ranks {} and {}",
                lhs.rank(),
                rhs.rank()
            ),
        ));
    }
    let mut covered = vec![false; rank];
    for &pos in lhs_pos.as_slice().iter().chain(rhs_pos.as_slice()) {
        if pos == 0 || pos > rank {
            return Err(CasError::index(
                "outer product",
                format!("result position {pos} out of range for rank {rank}"),
            ));
        }
        if covered[pos - 1] {
            return Err(CasError::index(
                "outer product",
                format!("result position {pos} assigned twice"),
            ));
        }
        covered[pos - 1] = true;
    }
    let dim = lhs.dim();
    if lhs.is_zero_expr() || rhs.is_zero_expr() {
        return Ok(TensorExpr::zero(dim, rank));
    }
    // The trivial placement is the plain tensor product.
    if lhs_pos.is_leading(lhs.rank()) && rhs_pos.is_consecutive_from(lhs.rank() + 1, rhs.rank())
    {
        return simple_outer(vec![lhs.clone(), rhs.clone()]);
    }
    Ok(TensorExpr::from_kind(
        TensorKind::Outer {
            lhs: lhs.clone(),
            lhs_pos: lhs_pos.clone(),
            rhs: rhs.clone(),
            rhs_pos: rhs_pos.clone(),
        },
        dim,
        rank,
    ))
}

/// `otimesu(a, b)[i,j,k,l] = a[i,k] * b[j,l]` for rank-2 operands; the
/// building block of the rank-4 identity and of product-rule derivatives.
pub(crate) fn otimesu(a: &TensorExpr, b: &TensorExpr) -> Result<TensorExpr, CasError> {
    outer_product(
        a,
        &IndexSeq::from([1, 3]),
        b,
        &IndexSeq::from([2, 4]),
    )
}

/// Plain n-ary tensor product with concatenated indices.
pub(crate) fn simple_outer(factors: Vec<TensorExpr>) -> Result<TensorExpr, CasError> {
    let Some(first) = factors.first() else {
        return Err(CasError::InvalidExpression {
            detail: "outer product of an empty factor list".to_owned(),
        });
    };
    let dim = first.dim();
    let mut flat: Vec<TensorExpr> = Vec::with_capacity(factors.len());
    let mut rank = 0;
    for factor in &factors {
        if factor.dim() != dim {
            return Err(CasError::shape(
                "outer product",
                (dim, rank),
                factor.shape(),
            ));
        }
        rank += factor.rank();
        match factor.kind() {
            TensorKind::SimpleOuter(inner) => flat.extend(inner.iter().cloned()),
            _ => flat.push(factor.clone()),
        }
    }
    if flat.iter().any(TensorExpr::is_zero_expr) {
        return Ok(TensorExpr::zero(dim, rank));
    }
    if flat.len() == 1 {
        return Ok(match flat.into_iter().next() {
            Some(single) => single,
            None => TensorExpr::zero(dim, rank),
        });
    }
    Ok(TensorExpr::from_kind(
        TensorKind::SimpleOuter(flat),
        dim,
        rank,
    ))
}

/// Index permutation with composition and identity unwrapping.
pub(crate) fn basis_change(
    expr: &TensorExpr,
    perm: &Permutation,
) -> Result<TensorExpr, CasError> {
    if perm.len() != expr.rank() {
        return Err(CasError::index(
            "basis change",
            format!(
                "permutation length {} does not match rank {}",
                perm.len(),
                expr.rank()
            ),
        ));
    }
    if perm.is_identity() {
        return Ok(expr.clone());
    }
    match expr.kind() {
        TensorKind::Zero { .. } | TensorKind::Delta { .. } => Ok(expr.clone()),
        // Consecutive basis changes collapse into their composition.
        TensorKind::BasisChange {
            expr: inner,
            perm: inner_perm,
        } => {
            let composed = inner_perm.compose(perm);
            basis_change(inner, &composed)
        }
        _ => {
            // The transpose of a tensor with a known permutation class
            // resolves immediately.
            if expr.rank() == 2 && perm.as_slice() == [2, 1] {
                let space = expr.space();
                if space.perm == crate::tensor::space::PermClass::Symmetric {
                    return Ok(expr.clone());
                }
                if space.perm == crate::tensor::space::PermClass::Skew {
                    return Ok(simplify::neg(expr));
                }
            }
            Ok(TensorExpr::from_kind(
                TensorKind::BasisChange {
                    expr: expr.clone(),
                    perm: perm.clone(),
                },
                expr.dim(),
                expr.rank(),
            ))
        }
    }
}

/// Symmetrization of a tensor over a set of index permutations.
pub(crate) fn symmetry(
    expr: &TensorExpr,
    perms: Vec<Permutation>,
) -> Result<TensorExpr, CasError> {
    for perm in &perms {
        if perm.len() != expr.rank() {
            return Err(CasError::index(
                "symmetry",
                format!(
                    "permutation length {} does not match rank {}",
                    perm.len(),
                    expr.rank()
                ),
            ));
        }
    }
    if perms.is_empty() || perms.iter().all(Permutation::is_identity) {
        return Ok(expr.clone());
    }
    if expr.is_zero_expr() {
        return Ok(expr.clone());
    }
    Ok(TensorExpr::from_kind(
        TensorKind::Symmetry {
            expr: expr.clone(),
            perms,
        },
        expr.dim(),
        expr.rank(),
    ))
}
