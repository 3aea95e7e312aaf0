//! Tensor differentiation.
//!
//! The derivative of a rank-R expression by a rank-A symbol is a rank
//! `R + A` tensor whose first R indices belong to the result and whose
//! last A indices belong to the argument. Product rules contract through
//! the derivative's middle indices and emit the basis change that restores
//! the index order, so terms compose correctly under further contraction.

use crate::core::error::CasError;
use crate::core::index::{IndexSeq, Permutation};
use crate::symbol::SymbolId;
use crate::tensor::space::TensorSpace;
use crate::tensor::{SpaceKind, TensorExpr, TensorKind, contract, simplify};
use crate::tensor_scalar::diff as t2s_diff;

/// Differentiate a tensor expression with respect to a tensor symbol.
pub(crate) fn diff_tensor(
    expr: &TensorExpr,
    arg: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    let Some(arg_id) = arg.as_symbol() else {
        return Err(CasError::InvalidExpression {
            detail: "tensor differentiation argument must be a tensor symbol".to_owned(),
        });
    };
    if expr.dim() != arg.dim() {
        return Err(CasError::shape("tensor diff", expr.shape(), arg.shape()));
    }
    walk(expr, arg_id, arg)
}

fn zero_result(expr: &TensorExpr, arg: &TensorExpr) -> TensorExpr {
    TensorExpr::zero(expr.dim(), expr.rank() + arg.rank())
}

/// `d(symbol)/d(symbol)`: the projector of the symbol's assumed space, or
/// the plain identity when nothing is assumed.
fn self_derivative(arg: &TensorExpr) -> Result<TensorExpr, CasError> {
    if arg.rank() != 2 {
        return TensorExpr::identity(arg.dim(), 2 * arg.rank());
    }
    let space = arg.space();
    let projector = if space == TensorSpace::SYMMETRIC {
        Some(SpaceKind::Sym)
    } else if space == TensorSpace::SKEW {
        Some(SpaceKind::Skew)
    } else if space == TensorSpace::DEVIATORIC {
        Some(SpaceKind::Dev)
    } else if space == TensorSpace::VOLUMETRIC {
        Some(SpaceKind::Vol)
    } else {
        None
    };
    match projector {
        Some(kind) => Ok(TensorExpr::projector(kind, arg.dim())),
        None => TensorExpr::identity(arg.dim(), 4),
    }
}

fn walk(
    expr: &TensorExpr,
    arg_id: &SymbolId,
    arg: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    match expr.kind() {
        TensorKind::Symbol { id, .. } => {
            if id == arg_id {
                self_derivative(arg)
            } else {
                Ok(zero_result(expr, arg))
            }
        }
        TensorKind::Zero { .. }
        | TensorKind::Delta { .. }
        | TensorKind::Identity { .. }
        | TensorKind::Projector { .. } => Ok(zero_result(expr, arg)),
        TensorKind::Neg(inner) => Ok(simplify::neg(&walk(inner, arg_id, arg)?)),
        TensorKind::Add(map) => {
            let mut acc = zero_result(expr, arg);
            for term in map.values() {
                acc = simplify::add(&acc, &walk(term, arg_id, arg)?)?;
            }
            Ok(acc)
        }
        TensorKind::ScalarMul { coeff, expr: inner } => {
            simplify::scalar_mul(coeff, &walk(inner, arg_id, arg)?)
        }
        TensorKind::ScalarDiv { expr: inner, coeff } => {
            simplify::scalar_div(&walk(inner, arg_id, arg)?, coeff)
        }
        TensorKind::FieldMul { field, expr: inner } => {
            // d(f*t) = f*dt + t (x) df
            let dt = walk(inner, arg_id, arg)?;
            let df = t2s_diff::diff_t2s(field, arg)?;
            let first = simplify::field_mul(field, &dt)?;
            let second = append_outer(inner, &df)?;
            simplify::add(&first, &second)
        }
        TensorKind::FieldDiv { expr: inner, field } => {
            // d(t/f) = dt/f - (t (x) df)/f^2
            let dt = walk(inner, arg_id, arg)?;
            let df = t2s_diff::diff_t2s(field, arg)?;
            let first = simplify::field_div(&dt, field)?;
            let squared = crate::tensor_scalar::simplify::mul(field, field)?;
            let second = simplify::field_div(&append_outer(inner, &df)?, &squared)?;
            simplify::add(&first, &simplify::neg(&second))
        }
        TensorKind::Mul(factors) => product_rule(expr, factors, arg_id, arg),
        TensorKind::Pow { base, exp } => {
            let Some(n) = exp.as_constant().and_then(|c| c.as_i64()) else {
                return Err(CasError::not_implemented(
                    "tensor diff",
                    "matrix power with a non-constant exponent",
                ));
            };
            if n < 2 {
                return Err(CasError::not_implemented(
                    "tensor diff",
                    format!("matrix power with exponent {n}"),
                ));
            }
            let factors = vec![base.clone(); n as usize];
            product_rule(expr, &factors, arg_id, arg)
        }
        TensorKind::Inv(inner) => {
            // d(t^-1) = -t^-1 * dt * t^-1
            let dt = walk(inner, arg_id, arg)?;
            if dt.is_zero_expr() {
                return Ok(zero_result(expr, arg));
            }
            let inverse = simplify::inv(inner)?;
            let sandwiched = sandwich(Some(&inverse), &dt, Some(&inverse))?;
            Ok(simplify::neg(&sandwiched))
        }
        TensorKind::BasisChange { expr: inner, perm } => {
            let dt = walk(inner, arg_id, arg)?;
            contract::basis_change(&dt, &perm.extended(arg.rank()))
        }
        TensorKind::Part { space, expr: inner } => {
            // d(P:t) = P : dt
            let dt = walk(inner, arg_id, arg)?;
            if dt.is_zero_expr() {
                return Ok(zero_result(expr, arg));
            }
            contract::inner_product(
                &TensorExpr::projector(*space, expr.dim()),
                &IndexSeq::from([3, 4]),
                &dt,
                &IndexSeq::from([1, 2]),
            )
        }
        TensorKind::Inner {
            lhs,
            lhs_idx,
            rhs,
            rhs_idx,
        } => {
            let contracted = lhs_idx.len();
            let free_lhs = lhs.rank() - contracted;
            let free_rhs = rhs.rank() - contracted;
            let mut acc = zero_result(expr, arg);

            let dl = walk(lhs, arg_id, arg)?;
            if !dl.is_zero_expr() {
                // Free indices come out as [lhs-free, arg, rhs-free];
                // restore [lhs-free, rhs-free, arg].
                let raw = contract::inner_product(&dl, lhs_idx, rhs, rhs_idx)?;
                let mut order: Vec<usize> = (1..=free_lhs).collect();
                order.extend(free_lhs + free_rhs + 1..=free_lhs + free_rhs + arg.rank());
                order.extend(free_lhs + 1..=free_lhs + free_rhs);
                let term = contract::basis_change(&raw, &Permutation::new(order)?)?;
                acc = simplify::add(&acc, &term)?;
            }

            let dr = walk(rhs, arg_id, arg)?;
            if !dr.is_zero_expr() {
                let term = contract::inner_product(lhs, lhs_idx, &dr, rhs_idx)?;
                acc = simplify::add(&acc, &term)?;
            }
            Ok(acc)
        }
        TensorKind::Outer {
            lhs,
            lhs_pos,
            rhs,
            rhs_pos,
        } => {
            let rank = expr.rank();
            let mut acc = zero_result(expr, arg);

            let dl = walk(lhs, arg_id, arg)?;
            if !dl.is_zero_expr() {
                let mut positions = lhs_pos.as_slice().to_vec();
                positions.extend(rank + 1..=rank + arg.rank());
                let term =
                    contract::outer_product(&dl, &IndexSeq::new(positions), rhs, rhs_pos)?;
                acc = simplify::add(&acc, &term)?;
            }

            let dr = walk(rhs, arg_id, arg)?;
            if !dr.is_zero_expr() {
                let mut positions = rhs_pos.as_slice().to_vec();
                positions.extend(rank + 1..=rank + arg.rank());
                let term =
                    contract::outer_product(lhs, lhs_pos, &dr, &IndexSeq::new(positions))?;
                acc = simplify::add(&acc, &term)?;
            }
            Ok(acc)
        }
        TensorKind::SimpleOuter(factors) => {
            let mut acc = zero_result(expr, arg);
            for (j, factor) in factors.iter().enumerate() {
                let df = walk(factor, arg_id, arg)?;
                if df.is_zero_expr() {
                    continue;
                }
                let term = outer_term(factors, j, &df, arg.rank())?;
                acc = simplify::add(&acc, &term)?;
            }
            Ok(acc)
        }
        TensorKind::Symmetry { .. } => Err(CasError::not_implemented(
            "tensor diff",
            "symmetrized operands",
        )),
    }
}

/// `t (x) df` with the derivative indices appended after the tensor's.
fn append_outer(t: &TensorExpr, df: &TensorExpr) -> Result<TensorExpr, CasError> {
    let r = t.rank();
    let a = df.rank();
    let lhs_pos: Vec<usize> = (1..=r).collect();
    let rhs_pos: Vec<usize> = (r + 1..=r + a).collect();
    contract::outer_product(t, &IndexSeq::new(lhs_pos), df, &IndexSeq::new(rhs_pos))
}

/// Leibniz rule for ordered matrix products of rank-2 factors.
fn product_rule(
    expr: &TensorExpr,
    factors: &[TensorExpr],
    arg_id: &SymbolId,
    arg: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    if arg.rank() != 2 || factors.iter().any(|f| f.rank() != 2) {
        return Err(CasError::not_implemented(
            "tensor diff",
            "matrix product rule requires rank-2 factors and argument",
        ));
    }
    let mut acc = zero_result(expr, arg);
    for (j, factor) in factors.iter().enumerate() {
        let df = walk(factor, arg_id, arg)?;
        if df.is_zero_expr() {
            continue;
        }
        let left = partial_product(&factors[..j])?;
        let right = partial_product(&factors[j + 1..])?;
        let term = sandwich(left.as_ref(), &df, right.as_ref())?;
        acc = simplify::add(&acc, &term)?;
    }
    Ok(acc)
}

fn partial_product(factors: &[TensorExpr]) -> Result<Option<TensorExpr>, CasError> {
    let Some(first) = factors.first() else {
        return Ok(None);
    };
    let mut acc = first.clone();
    for factor in &factors[1..] {
        acc = simplify::mul(&acc, factor)?;
    }
    Ok(Some(acc))
}

/// `L * dF * R` for a rank-4 derivative `dF` of a rank-2 factor:
/// contracts L into the derivative's first index and R into its second,
/// then restores the (result, argument) index order.
fn sandwich(
    left: Option<&TensorExpr>,
    dmid: &TensorExpr,
    right: Option<&TensorExpr>,
) -> Result<TensorExpr, CasError> {
    let mut current = match left {
        Some(l) => contract::inner_product(
            l,
            &IndexSeq::from([2]),
            dmid,
            &IndexSeq::from([1]),
        )?,
        None => dmid.clone(),
    };
    if let Some(r) = right {
        let raw = contract::inner_product(
            &current,
            &IndexSeq::from([2]),
            r,
            &IndexSeq::from([1]),
        )?;
        current = contract::basis_change(&raw, &Permutation::new([1, 3, 4, 2])?)?;
    }
    Ok(current)
}

/// One term of the outer-product Leibniz rule: factor `j` replaced by its
/// derivative, argument indices moved to the end.
fn outer_term(
    factors: &[TensorExpr],
    j: usize,
    df: &TensorExpr,
    arg_rank: usize,
) -> Result<TensorExpr, CasError> {
    let factor_rank = df.rank() - arg_rank;
    let mut current = df.clone();
    let mut rank_before_arg = factor_rank;

    // Fold the trailing factors in, keeping the argument indices last.
    if j + 1 < factors.len() {
        let right = contract::simple_outer(factors[j + 1..].to_vec())?;
        let mut lhs_pos: Vec<usize> = (1..=rank_before_arg).collect();
        let total = rank_before_arg + right.rank() + arg_rank;
        lhs_pos.extend(total - arg_rank + 1..=total);
        let rhs_pos: Vec<usize> = (rank_before_arg + 1..=rank_before_arg + right.rank()).collect();
        rank_before_arg += right.rank();
        current = contract::outer_product(
            &current,
            &IndexSeq::new(lhs_pos),
            &right,
            &IndexSeq::new(rhs_pos),
        )?;
    }
    if j > 0 {
        let left = contract::simple_outer(factors[..j].to_vec())?;
        let total = left.rank() + rank_before_arg + arg_rank;
        let lhs_pos: Vec<usize> = (1..=left.rank()).collect();
        let rhs_pos: Vec<usize> = (left.rank() + 1..=total).collect();
        current = contract::outer_product(
            &left,
            &IndexSeq::new(lhs_pos),
            &current,
            &IndexSeq::new(rhs_pos),
        )?;
    }
    Ok(current)
}
