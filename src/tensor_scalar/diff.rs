//! Differentiation of tensor-to-scalar expressions by tensor symbols.
//!
//! The derivative of a reduction by a rank-A symbol is a rank-A tensor.
//! Every reduction rule is a chain rule: the local gradient (a rank-2
//! front tensor) contracts into the operand's derivative.

use crate::core::error::CasError;
use crate::core::index::IndexSeq;
use crate::scalar::ScalarExpr;
use crate::tensor::diff::diff_tensor;
use crate::tensor::{TensorExpr, contract, simplify as tensor};
use crate::tensor_scalar::{TensorScalarExpr, TensorScalarKind, simplify as t2s};

/// Differentiate a tensor-to-scalar expression with respect to a tensor
/// symbol.
pub(crate) fn diff_t2s(
    expr: &TensorScalarExpr,
    arg: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    if arg.as_symbol().is_none() {
        return Err(CasError::InvalidExpression {
            detail: "differentiation argument must be a tensor symbol".to_owned(),
        });
    }
    walk(expr, arg)
}

fn zero_result(arg: &TensorExpr) -> TensorExpr {
    TensorExpr::zero(arg.dim(), arg.rank())
}

/// Contract a rank-r front tensor into the first r indices of a
/// derivative, leaving the argument indices free.
fn chain(front: &TensorExpr, du: &TensorExpr) -> Result<TensorExpr, CasError> {
    let r = front.rank();
    let seq: Vec<usize> = (1..=r).collect();
    contract::inner_product(
        front,
        &IndexSeq::new(seq.clone()),
        du,
        &IndexSeq::new(seq),
    )
}

fn walk(expr: &TensorScalarExpr, arg: &TensorExpr) -> Result<TensorExpr, CasError> {
    match expr.kind() {
        TensorScalarKind::Zero
        | TensorScalarKind::One
        | TensorScalarKind::ScalarWrapper(_) => Ok(zero_result(arg)),
        TensorScalarKind::Trace(u) => {
            // d tr(u) = I : du
            let du = diff_tensor(u, arg)?;
            if du.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            chain(&TensorExpr::delta(u.dim()), &du)
        }
        TensorScalarKind::Det(u) => {
            // d det(u) = det(u) * inv(trans(u)) : du
            let du = diff_tensor(u, arg)?;
            if du.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            let front = tensor::inv(&u.trans()?)?;
            let contracted = chain(&front, &du)?;
            tensor::field_mul(&t2s::det(u)?, &contracted)
        }
        TensorScalarKind::Norm(u) => {
            // d norm(u) = (u : du) / norm(u)
            let du = diff_tensor(u, arg)?;
            if du.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            let contracted = chain(u, &du)?;
            tensor::field_div(&contracted, &t2s::norm(u)?)
        }
        TensorScalarKind::Dot(u) => {
            // d (u : u) = 2 * (u : du)
            let du = diff_tensor(u, arg)?;
            if du.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            let contracted = chain(u, &du)?;
            tensor::scalar_mul(&ScalarExpr::constant(2), &contracted)
        }
        TensorScalarKind::InnerToScalar { lhs, rhs } => {
            let mut acc = zero_result(arg);
            let dl = diff_tensor(lhs, arg)?;
            if !dl.is_zero_expr() {
                acc = tensor::add(&acc, &chain(rhs, &dl)?)?;
            }
            let dr = diff_tensor(rhs, arg)?;
            if !dr.is_zero_expr() {
                acc = tensor::add(&acc, &chain(lhs, &dr)?)?;
            }
            Ok(acc)
        }
        TensorScalarKind::Log(g) => {
            // d log(g) = dg / g
            let dg = walk(g, arg)?;
            if dg.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            tensor::field_div(&dg, g)
        }
        TensorScalarKind::Neg(g) => Ok(tensor::neg(&walk(g, arg)?)),
        TensorScalarKind::Add(map) => {
            let mut acc = zero_result(arg);
            for term in map.values() {
                acc = tensor::add(&acc, &walk(term, arg)?)?;
            }
            Ok(acc)
        }
        TensorScalarKind::Mul(map) => {
            // Leibniz: each factor's derivative times the other factors.
            let factors: Vec<&TensorScalarExpr> = map.values().collect();
            let mut acc = zero_result(arg);
            for (j, factor) in factors.iter().enumerate() {
                let df = walk(factor, arg)?;
                if df.is_zero_expr() {
                    continue;
                }
                let mut rest = TensorScalarExpr::one();
                for (i, other) in factors.iter().enumerate() {
                    if i != j {
                        rest = t2s::mul(&rest, other)?;
                    }
                }
                acc = tensor::add(&acc, &tensor::field_mul(&rest, &df)?)?;
            }
            Ok(acc)
        }
        TensorScalarKind::Pow { base, exp } => diff_pow(base, exp, arg),
        TensorScalarKind::WithScalarMul { scalar, expr: g } => {
            tensor::scalar_mul(scalar, &walk(g, arg)?)
        }
        TensorScalarKind::WithScalarDiv { expr: g, scalar } => {
            tensor::scalar_div(&walk(g, arg)?, scalar)
        }
        TensorScalarKind::ScalarDivT2s { scalar, expr: g } => {
            // d (s/g) = -s * dg / g^2
            let dg = walk(g, arg)?;
            if dg.is_zero_expr() {
                return Ok(zero_result(arg));
            }
            let numerator = tensor::scalar_mul(scalar, &dg)?;
            let squared = t2s::mul(g, g)?;
            Ok(tensor::neg(&tensor::field_div(&numerator, &squared)?))
        }
    }
}

fn diff_pow(
    base: &TensorScalarExpr,
    exp: &TensorScalarExpr,
    arg: &TensorExpr,
) -> Result<TensorExpr, CasError> {
    let dg = walk(base, arg)?;
    if let Some(c) = exp.as_constant() {
        // d g^c = c * g^(c-1) * dg
        if dg.is_zero_expr() {
            return Ok(zero_result(arg));
        }
        let lowered = t2s::pow(base, &TensorScalarExpr::constant(c - crate::core::number::Number::Int(1)))?;
        let front = t2s::with_scalar_mul(&ScalarExpr::constant(c), &lowered);
        return tensor::field_mul(&front, &dg);
    }
    // d g^h = g^(h-1) * (h * dg + g * log(g) * dh)
    let dh = walk(exp, arg)?;
    let lowered = t2s::pow(
        base,
        &t2s::add(exp, &TensorScalarExpr::constant(-1)),
    )?;
    let first = tensor::field_mul(exp, &dg)?;
    let glog = t2s::mul(base, &t2s::log(base))?;
    let second = tensor::field_mul(&glog, &dh)?;
    let inner_sum = tensor::add(&first, &second)?;
    tensor::field_mul(&lowered, &inner_sum)
}
